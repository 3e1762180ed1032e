use serde::{Deserialize, Serialize};

/// Persisted per-guild set of enabled cog ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildRecord {
    pub guild_id: String,
    pub cogs_enabled: Vec<String>,
}

impl GuildRecord {
    pub fn new(guild_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            cogs_enabled: Vec::new(),
        }
    }

    pub fn with_cogs(mut self, cogs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        for cog in cogs {
            self.add(cog.into());
        }
        self
    }

    pub fn is_enabled(&self, cog_id: &str) -> bool {
        self.cogs_enabled.iter().any(|c| c == cog_id)
    }

    /// Set semantics: adding an id twice keeps one copy
    pub fn add(&mut self, cog_id: String) {
        if !self.is_enabled(&cog_id) {
            self.cogs_enabled.push(cog_id);
        }
    }

    pub fn remove(&mut self, cog_id: &str) {
        self.cogs_enabled.retain(|c| c != cog_id);
    }
}
