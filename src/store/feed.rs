//! Change feed: pushes match row changes to any number of subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Table name carried by match events.
pub const MATCHES_TABLE: &str = "matches";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// One changed row. Subscribers must tolerate duplicates and reordering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_type: ChangeKind,
    pub table: String,
    pub row: serde_json::Value,
}

impl ChangeEvent {
    pub fn new<T: Serialize>(event_type: ChangeKind, table: &str, row: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            event_type,
            table: table.to_string(),
            row: serde_json::to_value(row)?,
        })
    }
}

/// Broadcast channel wrapper. Slow subscribers lose the oldest events (they see `Lagged`)
/// and should refetch the full match set.
#[derive(Clone, Debug)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Send to current subscribers; a feed with none drops the event.
    pub fn publish(&self, event: ChangeEvent) {
        if self.sender.send(event).is_err() {
            log::trace!("change event dropped: no subscribers");
        }
    }

    /// Serialize `row` and publish it. A row that cannot be serialized is logged and skipped.
    pub fn publish_row<T: Serialize>(&self, event_type: ChangeKind, table: &str, row: &T) {
        match ChangeEvent::new(event_type, table, row) {
            Ok(event) => self.publish(event),
            Err(e) => log::warn!("{:?} event on {} not published: {}", event_type, table, e),
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}
