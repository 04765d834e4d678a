//! The receipt printer consumer.
//!
//! Renders each event to receipt text and writes it either to stdout or to a
//! network printer speaking raw TCP (port 9100 style). One connection per
//! receipt; the printer closes the socket after the write.

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::info;

use crate::consumer::EventConsumer;
use crate::render;
use crate::types::ActivityEvent;

/// Where rendered receipts are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterTarget {
    Stdout,
    Network { host: String, port: u16 },
}

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("printer I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ReceiptPrinter {
    target: PrinterTarget,
}

impl ReceiptPrinter {
    pub fn new(target: PrinterTarget) -> Self {
        ReceiptPrinter { target }
    }
}

impl EventConsumer for ReceiptPrinter {
    type Error = PrintError;

    async fn handle(&self, event: ActivityEvent) -> Result<(), PrintError> {
        info!(
            repo = %event.repo_id(),
            category = %event.category(),
            action = event.action_name(),
            "printing receipt"
        );
        let receipt = render::render_event(&event, chrono::Utc::now());

        match &self.target {
            PrinterTarget::Stdout => {
                let mut out = tokio::io::stdout();
                out.write_all(receipt.as_bytes()).await?;
                out.write_all(b"\n").await?;
                out.flush().await?;
            }
            PrinterTarget::Network { host, port } => {
                let mut stream = TcpStream::connect((host.as_str(), *port)).await?;
                stream.write_all(receipt.as_bytes()).await?;
                stream.shutdown().await?;
            }
        }
        Ok(())
    }
}
