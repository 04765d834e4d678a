//! The polling scheduler.
//!
//! Owns the background loop that fires [`SyncEngine::tick`] on a fixed
//! interval. Starting validates the configured repositories first and stays
//! idle if none survive; stopping cancels the loop without interrupting a
//! tick already in flight.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::consumer::EventConsumer;
use crate::github::GitHubApi;
use crate::types::RepoId;

use super::engine::SyncEngine;

pub struct Scheduler<A> {
    engine: Arc<SyncEngine<A>>,
    repositories: Vec<RepoId>,
    interval: Duration,
    running: Mutex<Option<CancellationToken>>,
}

impl<A: GitHubApi + 'static> Scheduler<A> {
    pub fn new(engine: Arc<SyncEngine<A>>, repositories: Vec<RepoId>, interval: Duration) -> Self {
        Scheduler {
            engine,
            repositories,
            interval,
            running: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<SyncEngine<A>> {
        &self.engine
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().expect("scheduler lock poisoned").is_some()
    }

    /// Validates the configured repositories and starts the polling loop.
    ///
    /// Returns the validated set. If nothing validates the scheduler logs
    /// and stays idle rather than spinning against dead repositories.
    /// Calling `start` while running restarts the loop.
    pub async fn start<C>(&self, consumer: C) -> Vec<RepoId>
    where
        C: EventConsumer + 'static,
    {
        self.stop();

        let valid = self.engine.validate(&self.repositories).await;
        if valid.is_empty() {
            error!("no valid repositories to monitor; polling loop not started");
            return valid;
        }

        let token = CancellationToken::new();
        *self.running.lock().expect("scheduler lock poisoned") = Some(token.clone());

        let engine = Arc::clone(&self.engine);
        let interval = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately; the
            // validation pass just reset every cursor, so consume it.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("polling loop stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        engine.tick(&consumer).await;
                    }
                }
            }
        });

        info!(
            interval_ms = self.interval.as_millis() as u64,
            repositories = valid.len(),
            "polling loop started"
        );
        valid
    }

    /// Cancels the polling loop. Idempotent; a tick in flight runs to
    /// completion.
    pub fn stop(&self) {
        if let Some(token) = self
            .running
            .lock()
            .expect("scheduler lock poisoned")
            .take()
        {
            info!("stopping polling loop");
            token.cancel();
        }
    }
}
