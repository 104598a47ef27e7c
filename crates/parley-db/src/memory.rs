use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::ChatStore;
use crate::models::{ChannelRow, MessageRow};

/// In-process store with the same observable semantics as the CQL tables.
/// Nothing survives a restart.
///
/// One difference: two messages with the same timestamp in the same channel
/// are both kept (ordered by arrival), where the CQL table would keep only
/// the last write for that key.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    channels: HashMap<String, ChannelRow>,
    messages: HashMap<String, BTreeMap<(DateTime<Utc>, u64), MessageRow>>,
    seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| anyhow!("memory store lock poisoned: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| anyhow!("memory store lock poisoned: {}", e))
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn channel_exists(&self, id: &str) -> Result<bool> {
        Ok(self.read()?.channels.contains_key(id))
    }

    async fn insert_channel(&self, channel: &ChannelRow) -> Result<()> {
        // Upsert, like a CQL INSERT.
        self.write()?
            .channels
            .insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn get_channel(&self, id: &str) -> Result<Option<ChannelRow>> {
        Ok(self.read()?.channels.get(id).cloned())
    }

    async fn delete_channel(&self, id: &str) -> Result<()> {
        self.write()?.channels.remove(id);
        Ok(())
    }

    async fn get_members(&self, channel_id: &str) -> Result<Option<Vec<String>>> {
        Ok(self
            .read()?
            .channels
            .get(channel_id)
            .map(|c| c.members.clone()))
    }

    async fn set_members(&self, channel_id: &str, members: &[String]) -> Result<()> {
        let mut inner = self.write()?;
        // A CQL UPDATE creates the row when it is missing.
        let channel = inner
            .channels
            .entry(channel_id.to_string())
            .or_insert_with(|| ChannelRow {
                id: channel_id.to_string(),
                owner: String::new(),
                topic: String::new(),
                members: Vec::new(),
            });
        channel.members = members.to_vec();
        Ok(())
    }

    async fn insert_message(&self, message: &MessageRow) -> Result<()> {
        let mut inner = self.write()?;
        inner.seq += 1;
        let seq = inner.seq;
        inner
            .messages
            .entry(message.channel_id.clone())
            .or_default()
            .insert((message.timestamp, seq), message.clone());
        Ok(())
    }

    async fn get_messages(
        &self,
        channel_id: &str,
        start_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<MessageRow>> {
        let inner = self.read()?;
        let Some(partition) = inner.messages.get(channel_id) else {
            return Ok(vec![]);
        };

        let rows = match start_at {
            Some(start_at) => partition
                .range((start_at, 0)..)
                .map(|(_, m)| m.clone())
                .collect(),
            None => partition.values().cloned().collect(),
        };

        Ok(rows)
    }
}
