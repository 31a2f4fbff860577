use async_trait::async_trait;
use time::{Date, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::LogStoreError;

use super::{
    day::{falls_on, truncate_to_millis},
    dto::{LogEntry, LogEntryInput},
    repo::LogStore,
};

/// Process-local store. Entries are kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    entries: RwLock<Vec<LogEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn insert(&self, input: LogEntryInput) -> Result<LogEntry, LogStoreError> {
        let now = truncate_to_millis(OffsetDateTime::now_utc());
        let entry = LogEntry::from_new(Uuid::new_v4(), input.validate(now)?, now);
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn find_by_date(&self, date: Date) -> Result<Vec<LogEntry>, LogStoreError> {
        let mut day: Vec<LogEntry> = self
            .entries
            .read()
            .await
            .iter()
            .filter(|e| falls_on(e.log_date, date))
            .cloned()
            .collect();
        // stable: equal timestamps keep insertion order
        day.sort_by_key(|e| e.created_at);
        Ok(day)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), LogStoreError> {
        let mut entries = self.entries.write().await;
        match entries.iter().position(|e| e.id == id) {
            Some(idx) => {
                entries.remove(idx);
                Ok(())
            }
            None => Err(LogStoreError::NotFound(id)),
        }
    }
}
