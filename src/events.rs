use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the services after their transactions commit.
///
/// Consumers are best-effort: a dropped or failed event never alters
/// persisted order or inventory state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),

    /// A decrement left the product at or below its reorder threshold.
    LowStock {
        product_id: Uuid,
        quantity: i32,
        min_stock: i32,
    },

    ReceiptGenerated {
        order_id: Uuid,
        receipt_id: Uuid,
    },

    /// Receipt email handed to the delivery collaborator.
    ReceiptEmailQueued {
        order_id: Uuid,
        recipient: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, recording each event. Receipt email delivery
/// and low-stock alerting integrate here; both stay decoupled from the
/// order transaction.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match event {
            Event::OrderCreated(order_id) => {
                info!(order_id = %order_id, "order created");
            }
            Event::LowStock {
                product_id,
                quantity,
                min_stock,
            } => {
                warn!(
                    product_id = %product_id,
                    quantity,
                    min_stock,
                    "stock at or below reorder threshold"
                );
            }
            Event::ReceiptGenerated {
                order_id,
                receipt_id,
            } => {
                info!(order_id = %order_id, receipt_id = %receipt_id, "receipt generated");
            }
            Event::ReceiptEmailQueued {
                order_id,
                recipient,
            } => {
                info!(order_id = %order_id, recipient = %recipient, "receipt email queued");
            }
        }
    }
}
