//! In-memory guild enablement store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::application::errors::StoreError;
use crate::domain::entities::GuildRecord;
use crate::domain::traits::GuildStore;

/// Guild records kept in process memory; used by the dev console and tests
#[derive(Default)]
pub struct MemoryGuildStore {
    records: Arc<RwLock<HashMap<String, GuildRecord>>>,
    default_cogs: Vec<String>,
}

impl MemoryGuildStore {
    pub fn new(default_cogs: Vec<String>) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            default_cogs,
        }
    }
}

#[async_trait]
impl GuildStore for MemoryGuildStore {
    async fn find_one(&self, guild_id: &str) -> Result<Option<GuildRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.get(guild_id).cloned())
    }

    async fn upsert_add_to_set(&self, guild_id: &str, cog_id: &str) -> Result<GuildRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(guild_id.to_string())
            .or_insert_with(|| GuildRecord::new(guild_id));
        record.add(cog_id.to_string());
        Ok(record.clone())
    }

    async fn upsert_pull(&self, guild_id: &str, cog_id: &str) -> Result<GuildRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(guild_id.to_string())
            .or_insert_with(|| GuildRecord::new(guild_id));
        record.remove(cog_id);
        Ok(record.clone())
    }

    async fn create_with_defaults(&self, guild_id: &str) -> Result<GuildRecord, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(guild_id.to_string())
            .or_insert_with(|| GuildRecord::new(guild_id).with_cogs(self.default_cogs.iter().cloned()));
        Ok(record.clone())
    }
}
