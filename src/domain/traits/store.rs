use async_trait::async_trait;
use crate::application::errors::StoreError;
use crate::domain::entities::GuildRecord;

/// Persistent per-guild enablement store
///
/// Implementations provide their own atomicity for the set mutations.
#[async_trait]
pub trait GuildStore: Send + Sync {
    /// Fetch the record for a guild, `None` if it was never created
    async fn find_one(&self, guild_id: &str) -> Result<Option<GuildRecord>, StoreError>;

    /// Add `cog_id` to the guild's set, creating the record if absent
    async fn upsert_add_to_set(&self, guild_id: &str, cog_id: &str) -> Result<GuildRecord, StoreError>;

    /// Remove `cog_id` from the guild's set, creating an empty record if absent
    async fn upsert_pull(&self, guild_id: &str, cog_id: &str) -> Result<GuildRecord, StoreError>;

    /// Create the record seeded with the baseline cogs unless one exists
    async fn create_with_defaults(&self, guild_id: &str) -> Result<GuildRecord, StoreError>;
}
