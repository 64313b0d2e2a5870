//! Order log collaborator (spec §6, supplemented per SPEC_FULL §B).
//!
//! Every admitted order and every emitted trade is written here. The
//! Matching Engine treats this purely as a write-through sink — it never
//! reads the log back for correctness, only a recovery procedure replaying
//! the log through `place_order` does.

mod error;
#[cfg(feature = "journal")]
mod file_journal;

pub use error::JournalError;
#[cfg(feature = "journal")]
pub use file_journal::FileJournal;

use crate::order::Order;
use crate::trade::Trade;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One admitted order or emitted trade, as written to the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogEntry {
    Order(Order),
    Trade(Trade),
}

/// An append-only sink for [`LogEntry`] records, and the means to replay
/// them back in original order for book reconstruction.
pub trait OrderLog: Send + Sync {
    /// Durably appends `entry`. Must return only after `entry` is committed.
    fn append(&self, entry: &LogEntry) -> Result<(), JournalError>;

    /// Replays every entry in the order it was appended.
    fn replay(&self) -> Result<Vec<Result<LogEntry, JournalError>>, JournalError>;
}

/// A `Vec`-backed [`OrderLog`] for tests and for embedding this crate
/// without durable persistence.
#[derive(Debug, Default)]
pub struct InMemoryOrderLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl InMemoryOrderLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderLog for InMemoryOrderLog {
    fn append(&self, entry: &LogEntry) -> Result<(), JournalError> {
        self.entries
            .lock()
            .map_err(|_| JournalError::MutexPoisoned)?
            .push(entry.clone());
        Ok(())
    }

    fn replay(&self) -> Result<Vec<Result<LogEntry, JournalError>>, JournalError> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| JournalError::MutexPoisoned)?
            .iter()
            .cloned()
            .map(Ok)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderKind, Side};

    fn sample_order() -> Order {
        Order::new(
            Some("o1".to_string()),
            "BTC/USD",
            Side::Buy,
            OrderKind::Limit,
            Some(100),
            None,
            5,
            None,
            "user-1",
        )
        .unwrap()
    }

    #[test]
    fn replays_entries_in_append_order() {
        let log = InMemoryOrderLog::new();
        log.append(&LogEntry::Order(sample_order())).unwrap();
        log.append(&LogEntry::Order(sample_order())).unwrap();
        let replayed = log.replay().unwrap();
        assert_eq!(replayed.len(), 2);
        assert!(replayed.iter().all(|r| r.is_ok()));
    }
}
