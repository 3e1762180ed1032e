//! Guild-scoped enablement - declared intent per guild, independent of what is loaded

use std::sync::Arc;
use tracing::{error, info};

use crate::application::errors::StoreError;
use crate::domain::entities::GuildRecord;
use crate::domain::traits::GuildStore;

/// Facade over the persisted enablement store. Never consults the registry.
#[derive(Clone)]
pub struct GuildScope {
    store: Arc<dyn GuildStore>,
}

impl GuildScope {
    pub fn new(store: Arc<dyn GuildStore>) -> Self {
        Self { store }
    }

    /// Add `cog_id` to the guild's enabled set. Enabling twice is a no-op.
    pub async fn enable(&self, cog_id: &str, guild_id: &str) -> Result<GuildRecord, StoreError> {
        match self.store.upsert_add_to_set(guild_id, cog_id).await {
            Ok(record) => {
                info!("Enabled cog {} for guild {}", cog_id, guild_id);
                Ok(record)
            }
            Err(e) => {
                error!("Failed to enable cog {} for guild {}: {}", cog_id, guild_id, e);
                Err(e)
            }
        }
    }

    /// Remove `cog_id` from the guild's enabled set, creating the record if needed
    pub async fn disable(&self, cog_id: &str, guild_id: &str) -> Result<GuildRecord, StoreError> {
        match self.store.upsert_pull(guild_id, cog_id).await {
            Ok(record) => {
                info!("Disabled cog {} for guild {}", cog_id, guild_id);
                Ok(record)
            }
            Err(e) => {
                error!("Failed to disable cog {} for guild {}: {}", cog_id, guild_id, e);
                Err(e)
            }
        }
    }

    /// Fail-closed: a missing record or a store error both read as "not enabled"
    pub async fn is_enabled(&self, cog_id: &str, guild_id: &str) -> bool {
        match self.store.find_one(guild_id).await {
            Ok(Some(record)) => record.is_enabled(cog_id),
            Ok(None) => false,
            Err(e) => {
                error!("Failed to check cog status for {} in guild {}: {}", cog_id, guild_id, e);
                false
            }
        }
    }

    /// Enabled ids for a guild; empty when no record exists
    pub async fn enabled_cogs(&self, guild_id: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .store
            .find_one(guild_id)
            .await?
            .map(|r| r.cogs_enabled)
            .unwrap_or_default())
    }

    /// Seed a guild the host sees for the first time with the baseline cogs
    pub async fn ensure_guild(&self, guild_id: &str) -> Result<GuildRecord, StoreError> {
        self.store.create_with_defaults(guild_id).await
    }
}
