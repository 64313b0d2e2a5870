//! Memory-mapped, append-only, CRC32-checked file journal (feature
//! `journal`).
//!
//! # On-disk entry format (little-endian)
//!
//! ```text
//! [4 bytes: entry_length][8 bytes: sequence][N bytes: JSON payload][4 bytes: CRC32]
//! ```
//!
//! `entry_length` is the byte count following itself (8 + N + 4).
//! CRC32 covers `sequence ‖ payload` (not `entry_length`).
//!
//! Segments are pre-allocated, memory-mapped files named
//! `segment-{start_seq:020}.journal` and rotated when the active one has no
//! room left for the next entry.

use super::error::JournalError;
use super::{LogEntry, OrderLog};
use memmap2::MmapMut;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

const ENTRY_HEADER_SIZE: usize = 4 + 8;
const ENTRY_CRC_SIZE: usize = 4;
const DEFAULT_SEGMENT_SIZE: usize = 64 * 1024 * 1024;

struct SegmentWriter {
    mmap: MmapMut,
    write_pos: usize,
    capacity: usize,
    path: PathBuf,
}

impl SegmentWriter {
    fn create(path: &Path, capacity: usize) -> Result<Self, JournalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(capacity as u64)?;
        // SAFETY: the file was just created and is exclusively owned by this process.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        Ok(Self {
            mmap,
            write_pos: 0,
            capacity,
            path: path.to_path_buf(),
        })
    }

    fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.write_pos)
    }

    fn write_entry(&mut self, entry_bytes: &[u8]) -> Result<(), JournalError> {
        let end = self.write_pos + entry_bytes.len();
        self.mmap[self.write_pos..end].copy_from_slice(entry_bytes);
        self.mmap
            .flush_range(self.write_pos, entry_bytes.len())
            .map_err(|e| JournalError::Io {
                message: e.to_string(),
                path: Some(self.path.clone()),
            })?;
        self.write_pos = end;
        Ok(())
    }
}

/// A memory-mapped, append-only [`OrderLog`] with segment rotation and
/// per-entry CRC32 checksums.
///
/// Writes are serialized through an internal mutex; the expected usage is a
/// single writer (the matching engine's own thread of execution per book)
/// with occasional replay reads.
pub struct FileJournal {
    dir: PathBuf,
    writer: Mutex<SegmentWriter>,
    segment_size: usize,
    segment_start_seq: Mutex<u64>,
    next_seq: AtomicU64,
}

impl FileJournal {
    /// Opens or creates a journal in `dir`, resuming from the latest
    /// segment if one exists.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, JournalError> {
        Self::open_with_segment_size(dir, DEFAULT_SEGMENT_SIZE)
    }

    pub fn open_with_segment_size<P: AsRef<Path>>(
        dir: P,
        segment_size: usize,
    ) -> Result<Self, JournalError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut segments = list_segments(&dir)?;
        segments.sort_unstable();

        let (writer, segment_start_seq) = if let Some(&latest) = segments.last() {
            let path = segment_path(&dir, latest);
            let file = OpenOptions::new().read(true).write(true).open(&path)?;
            let capacity = file.metadata()?.len() as usize;
            // SAFETY: exclusively owned by this process, single-writer pattern.
            let mmap = unsafe { MmapMut::map_mut(&file)? };
            let write_pos = scan_write_position(&mmap);
            (
                SegmentWriter {
                    mmap,
                    write_pos,
                    capacity,
                    path,
                },
                latest,
            )
        } else {
            let path = segment_path(&dir, 0);
            (SegmentWriter::create(&path, segment_size)?, 0)
        };

        let next_seq = scan_max_sequence(&dir)?.map(|s| s + 1).unwrap_or(0);

        Ok(Self {
            dir,
            writer: Mutex::new(writer),
            segment_size,
            segment_start_seq: Mutex::new(segment_start_seq),
            next_seq: AtomicU64::new(next_seq),
        })
    }

    fn encode_entry(sequence: u64, entry: &LogEntry) -> Result<Vec<u8>, JournalError> {
        let payload = serde_json::to_vec(entry).map_err(|e| JournalError::SerializationError {
            message: e.to_string(),
        })?;
        let entry_length = (8 + payload.len() + ENTRY_CRC_SIZE) as u32;

        let mut buf = Vec::with_capacity(4 + entry_length as usize);
        buf.write_all(&entry_length.to_le_bytes()).expect("vec write cannot fail");
        buf.write_all(&sequence.to_le_bytes()).expect("vec write cannot fail");
        buf.write_all(&payload).expect("vec write cannot fail");

        let crc = crc32fast::hash(&buf[4..]);
        buf.write_all(&crc.to_le_bytes()).expect("vec write cannot fail");
        Ok(buf)
    }

    fn rotate_segment(&self, writer: &mut SegmentWriter, start_seq: u64) -> Result<(), JournalError> {
        let old_len = writer.write_pos;
        let old_path = writer.path.clone();
        writer.mmap.flush().map_err(|e| JournalError::Io {
            message: e.to_string(),
            path: Some(old_path.clone()),
        })?;

        let new_path = segment_path(&self.dir, start_seq);
        *writer = SegmentWriter::create(&new_path, self.segment_size)?;

        if let Ok(file) = OpenOptions::new().write(true).open(&old_path) {
            let _ = file.set_len(old_len as u64);
        }
        *self
            .segment_start_seq
            .lock()
            .map_err(|_| JournalError::MutexPoisoned)? = start_seq;
        Ok(())
    }
}

impl OrderLog for FileJournal {
    fn append(&self, entry: &LogEntry) -> Result<(), JournalError> {
        let sequence = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let bytes = Self::encode_entry(sequence, entry)?;

        let mut writer = self.writer.lock().map_err(|_| JournalError::MutexPoisoned)?;
        if writer.remaining() < bytes.len() {
            self.rotate_segment(&mut writer, sequence)?;
        }
        if writer.remaining() < bytes.len() {
            return Err(JournalError::EntryTooLarge {
                entry_bytes: bytes.len(),
                segment_size: self.segment_size,
            });
        }
        writer.write_entry(&bytes)
    }

    fn replay(&self) -> Result<Vec<Result<LogEntry, JournalError>>, JournalError> {
        let mut segments = list_segments(&self.dir)?;
        segments.sort_unstable();

        let mut out = Vec::new();
        for start_seq in segments {
            let path = segment_path(&self.dir, start_seq);
            let file = File::open(&path)?;
            // SAFETY: read-only mapping of a segment not concurrently truncated.
            let mmap = unsafe { memmap2::Mmap::map(&file)? };
            let mut offset = 0usize;
            while let Some(decoded) = decode_at(&mmap, offset) {
                let (result, next_offset) = decoded;
                out.push(result);
                offset = next_offset;
            }
        }
        Ok(out)
    }
}

/// Decodes one entry at `offset`, returning it along with the offset of the
/// next entry. Returns `None` at end-of-written-data (zero length prefix).
fn decode_at(data: &[u8], offset: usize) -> Option<(Result<LogEntry, JournalError>, usize)> {
    if offset + ENTRY_HEADER_SIZE > data.len() {
        return None;
    }
    let entry_length =
        u32::from_le_bytes(data[offset..offset + 4].try_into().expect("4-byte slice")) as usize;
    if entry_length == 0 {
        return None;
    }
    let entry_end = offset + 4 + entry_length;
    if entry_end > data.len() {
        return None;
    }

    let crc_start = entry_end - ENTRY_CRC_SIZE;
    let payload_start = offset + 4;
    let stored_crc = u32::from_le_bytes(
        data[crc_start..entry_end].try_into().expect("4-byte slice"),
    );
    let computed_crc = crc32fast::hash(&data[payload_start..crc_start]);

    if stored_crc != computed_crc {
        return Some((
            Err(JournalError::CorruptEntry {
                offset: offset as u64,
                expected_crc: stored_crc,
                actual_crc: computed_crc,
            }),
            entry_end,
        ));
    }

    let json_start = payload_start + 8;
    let entry: Result<LogEntry, JournalError> = serde_json::from_slice(&data[json_start..crc_start])
        .map_err(|e| JournalError::DeserializationError {
            offset: offset as u64,
            message: e.to_string(),
        });
    Some((entry, entry_end))
}

fn segment_path(dir: &Path, start_sequence: u64) -> PathBuf {
    dir.join(format!("segment-{start_sequence:020}.journal"))
}

fn list_segments(dir: &Path) -> Result<Vec<u64>, JournalError> {
    let mut seqs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if let Some(seq) = name_str
            .strip_prefix("segment-")
            .and_then(|rest| rest.strip_suffix(".journal"))
            .and_then(|seq_str| seq_str.parse::<u64>().ok())
        {
            seqs.push(seq);
        }
    }
    Ok(seqs)
}

fn scan_write_position(data: &[u8]) -> usize {
    let mut offset = 0usize;
    loop {
        if offset + 4 > data.len() {
            break;
        }
        let entry_length =
            u32::from_le_bytes(data[offset..offset + 4].try_into().expect("4-byte slice")) as usize;
        if entry_length == 0 {
            break;
        }
        let entry_end = offset + 4 + entry_length;
        if entry_end > data.len() {
            break;
        }
        offset = entry_end;
    }
    offset
}

fn scan_max_sequence(dir: &Path) -> Result<Option<u64>, JournalError> {
    let mut segments = list_segments(dir)?;
    segments.sort_unstable();
    let mut max_seq = None;
    for start_seq in segments {
        let path = segment_path(dir, start_seq);
        let file = File::open(&path)?;
        // SAFETY: read-only mapping for a scan at open time, single-writer pattern.
        let mmap = unsafe { memmap2::Mmap::map(&file)? };
        let mut offset = 0usize;
        while offset + ENTRY_HEADER_SIZE <= mmap.len() {
            let entry_length = u32::from_le_bytes(
                mmap[offset..offset + 4].try_into().expect("4-byte slice"),
            ) as usize;
            if entry_length == 0 {
                break;
            }
            let seq = u64::from_le_bytes(
                mmap[offset + 4..offset + 12].try_into().expect("8-byte slice"),
            );
            max_seq = Some(seq);
            offset += 4 + entry_length;
        }
    }
    Ok(max_seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Order, OrderKind, Side};

    fn sample_entry(id: &str) -> LogEntry {
        LogEntry::Order(
            Order::new(
                Some(id.to_string()),
                "BTC/USD",
                Side::Buy,
                OrderKind::Limit,
                Some(100),
                None,
                5,
                None,
                "user-1",
            )
            .unwrap(),
        )
    }

    #[test]
    fn write_and_replay_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FileJournal::open(dir.path()).unwrap();
        journal.append(&sample_entry("a")).unwrap();
        journal.append(&sample_entry("b")).unwrap();

        let replayed = journal.replay().unwrap();
        assert_eq!(replayed.len(), 2);
        assert!(replayed.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn reopen_resumes_sequence_and_preserves_entries() {
        let dir = tempfile::tempdir().unwrap();
        {
            let journal = FileJournal::open(dir.path()).unwrap();
            journal.append(&sample_entry("a")).unwrap();
        }
        let journal = FileJournal::open(dir.path()).unwrap();
        journal.append(&sample_entry("b")).unwrap();
        let replayed = journal.replay().unwrap();
        assert_eq!(replayed.len(), 2);
    }

    #[test]
    fn segment_rotation_preserves_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let journal = FileJournal::open_with_segment_size(dir.path(), 512).unwrap();
        for i in 0..20 {
            journal.append(&sample_entry(&format!("order-{i}"))).unwrap();
        }
        let replayed = journal.replay().unwrap();
        assert_eq!(replayed.len(), 20);
        assert!(replayed.iter().all(|r| r.is_ok()));
    }
}
