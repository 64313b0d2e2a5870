//! Error types for the order log subsystem.

use std::fmt;
use std::path::PathBuf;

/// Errors that can occur appending to or replaying an [`super::OrderLog`].
#[derive(Debug)]
#[non_exhaustive]
pub enum JournalError {
    /// An I/O error occurred while reading or writing journal files.
    Io { message: String, path: Option<PathBuf> },
    /// A journal entry failed CRC32 integrity verification.
    CorruptEntry {
        offset: u64,
        expected_crc: u32,
        actual_crc: u32,
    },
    /// The journal entry payload could not be deserialized.
    DeserializationError { offset: u64, message: String },
    /// The journal entry payload could not be serialized.
    SerializationError { message: String },
    /// A segment file is too small to hold the entry being appended.
    EntryTooLarge { entry_bytes: usize, segment_size: usize },
    /// An internal mutex was poisoned (another thread panicked while
    /// holding the lock).
    MutexPoisoned,
}

impl fmt::Display for JournalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalError::Io { message, path } => {
                if let Some(p) = path {
                    write!(f, "journal I/O error at {}: {message}", p.display())
                } else {
                    write!(f, "journal I/O error: {message}")
                }
            }
            JournalError::CorruptEntry {
                offset,
                expected_crc,
                actual_crc,
            } => write!(
                f,
                "corrupt journal entry at offset {offset}: expected CRC {expected_crc:#010x}, got {actual_crc:#010x}"
            ),
            JournalError::DeserializationError { offset, message } => {
                write!(f, "journal deserialization error at offset {offset}: {message}")
            }
            JournalError::SerializationError { message } => {
                write!(f, "journal serialization error: {message}")
            }
            JournalError::EntryTooLarge {
                entry_bytes,
                segment_size,
            } => write!(
                f,
                "journal entry too large: {entry_bytes} bytes exceeds segment size {segment_size} bytes"
            ),
            JournalError::MutexPoisoned => write!(f, "journal internal mutex poisoned"),
        }
    }
}

impl std::error::Error for JournalError {}

impl From<std::io::Error> for JournalError {
    #[cold]
    fn from(err: std::io::Error) -> Self {
        JournalError::Io {
            message: err.to_string(),
            path: None,
        }
    }
}
