use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::pharmacy::VerificationStatus;

/// Domain events emitted by the write paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PharmacyRegistered(Uuid),
    PatientRegistered(Uuid),
    PharmacyVerificationChanged {
        pharmacy_id: Uuid,
        old_status: VerificationStatus,
        new_status: VerificationStatus,
    },
    InventoryItemCreated {
        pharmacy_id: Uuid,
        item_id: Uuid,
    },
    InventoryItemUpdated {
        pharmacy_id: Uuid,
        item_id: Uuid,
        stock: i32,
    },
    InventoryItemDeleted {
        pharmacy_id: Uuid,
        item_id: Uuid,
    },
}

#[derive(Clone, Debug)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "dropping domain event");
        }
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event, until every sender is gone.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::PharmacyRegistered(id) => {
                info!(pharmacy_id = %id, "pharmacy registered, awaiting verification")
            }
            Event::PatientRegistered(id) => info!(patient_id = %id, "patient registered"),
            Event::PharmacyVerificationChanged {
                pharmacy_id,
                old_status,
                new_status,
            } => info!(
                pharmacy_id = %pharmacy_id,
                from = %old_status,
                to = %new_status,
                "pharmacy verification changed"
            ),
            Event::InventoryItemCreated {
                pharmacy_id,
                item_id,
            } => info!(pharmacy_id = %pharmacy_id, item_id = %item_id, "inventory item created"),
            Event::InventoryItemUpdated {
                pharmacy_id,
                item_id,
                stock,
            } => info!(
                pharmacy_id = %pharmacy_id,
                item_id = %item_id,
                stock,
                "inventory item updated"
            ),
            Event::InventoryItemDeleted {
                pharmacy_id,
                item_id,
            } => info!(pharmacy_id = %pharmacy_id, item_id = %item_id, "inventory item deleted"),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_flow_through_channel() {
        let (sender, mut rx) = channel(4);
        let id = Uuid::new_v4();
        sender.send(Event::PharmacyRegistered(id)).await.unwrap();
        assert_eq!(rx.recv().await, Some(Event::PharmacyRegistered(id)));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (sender, rx) = channel(1);
        drop(rx);
        assert!(sender.send(Event::PatientRegistered(Uuid::nil())).await.is_err());
        sender.send_or_log(Event::PatientRegistered(Uuid::nil())).await;
    }
}
