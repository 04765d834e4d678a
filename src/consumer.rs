//! The consumer seam.
//!
//! The engine delivers each accepted event to exactly one consumer,
//! sequentially, awaiting completion before the next event. Consumer
//! failures are logged by the dispatcher and never abort the tick.

use crate::types::ActivityEvent;

/// A consumer of classified activity events.
///
/// `handle` is awaited per event; per-repository, per-category ordering is
/// the dispatcher's responsibility, not the consumer's.
pub trait EventConsumer: Send + Sync {
    type Error: std::fmt::Display + Send;

    fn handle(
        &self,
        event: ActivityEvent,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
