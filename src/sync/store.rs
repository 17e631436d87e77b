//! Caller-owned inbox of recovered messages and the sync watermark.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync::cursor::SyncCursor;

/// A message recovered from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedMessage {
    /// Opened plaintext, marker included.
    pub plaintext: String,
    pub source_height: u64,
    /// Block time of the source slot, if the ledger returned one.
    pub approximate_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    cursor: SyncCursor,
    messages: Vec<DecodedMessage>,
}

/// Recovered messages in traversal order, plus the watermark.
#[derive(Debug, Default)]
pub struct Inbox {
    messages: Vec<DecodedMessage>,
    cursor: SyncCursor,
    persistence_path: Option<String>,
}

impl Inbox {
    pub fn new(persistence_path: Option<String>) -> Self {
        Self {
            persistence_path,
            ..Default::default()
        }
    }

    /// Load from file if it exists, otherwise start empty.
    pub fn load_from_file(path: &str) -> std::io::Result<Self> {
        let mut inbox = Self::new(Some(path.to_string()));
        if Path::new(path).exists() {
            let reader = BufReader::new(File::open(path)?);
            let snapshot: Snapshot = serde_json::from_reader(reader)?;
            inbox.cursor = snapshot.cursor;
            inbox.messages = snapshot.messages;
            tracing::info!(
                messages = inbox.messages.len(),
                last_update = inbox.cursor.last_update,
                "Loaded inbox"
            );
        }
        Ok(inbox)
    }

    /// Save to file. No-op for an in-memory inbox.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.persistence_path {
            let writer = BufWriter::new(File::create(path)?);
            let snapshot = Snapshot {
                cursor: self.cursor,
                messages: self.messages.clone(),
            };
            serde_json::to_writer(writer, &snapshot)?;
            tracing::info!(messages = self.messages.len(), "Saved inbox");
        }
        Ok(())
    }

    /// Append a message unless the same plaintext from the same height is
    /// already stored. Returns whether it was added.
    pub fn insert(&mut self, message: DecodedMessage) -> bool {
        let exists = self.messages.iter().any(|m| {
            m.source_height == message.source_height && m.plaintext == message.plaintext
        });
        if !exists {
            self.messages.push(message);
        }
        !exists
    }

    /// Messages in traversal order.
    pub fn messages(&self) -> &[DecodedMessage] {
        &self.messages
    }

    /// Messages by ascending source height, stable within a height.
    pub fn sorted(&self) -> Vec<&DecodedMessage> {
        let mut sorted: Vec<_> = self.messages.iter().collect();
        sorted.sort_by_key(|m| m.source_height);
        sorted
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn cursor(&self) -> SyncCursor {
        self.cursor
    }

    pub(crate) fn cursor_mut(&mut self) -> &mut SyncCursor {
        &mut self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(text: &str, height: u64) -> DecodedMessage {
        DecodedMessage {
            plaintext: text.to_string(),
            source_height: height,
            approximate_time: None,
        }
    }

    #[test]
    fn test_insert_ignores_duplicates() {
        let mut inbox = Inbox::new(None);
        assert!(inbox.insert(message("a", 5)));
        assert!(!inbox.insert(message("a", 5)));
        assert!(inbox.insert(message("a", 6)));
        assert!(inbox.insert(message("b", 5)));
        assert_eq!(inbox.len(), 3);
    }

    #[test]
    fn test_sorted_by_height() {
        let mut inbox = Inbox::new(None);
        inbox.insert(message("newest", 30));
        inbox.insert(message("middle", 20));
        inbox.insert(message("oldest", 10));

        let order: Vec<_> = inbox.sorted().iter().map(|m| m.source_height).collect();
        assert_eq!(order, vec![10, 20, 30]);
        // Traversal order is kept underneath.
        assert_eq!(inbox.messages()[0].plaintext, "newest");
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inbox.json");
        let path = path.to_str().unwrap();

        let mut inbox = Inbox::new(Some(path.to_string()));
        inbox.insert(DecodedMessage {
            plaintext: "hello there".to_string(),
            source_height: 42,
            approximate_time: Utc.timestamp_millis_opt(1_700_000_000_000).single(),
        });
        inbox.cursor_mut().last_update = 42;
        inbox.save_to_file().unwrap();

        let loaded = Inbox::load_from_file(path).unwrap();
        assert_eq!(loaded.messages(), inbox.messages());
        assert_eq!(loaded.cursor().last_update, 42);
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let inbox = Inbox::load_from_file(path.to_str().unwrap()).unwrap();
        assert!(inbox.is_empty());
        assert_eq!(inbox.cursor(), SyncCursor::default());
    }
}
