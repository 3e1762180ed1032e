use std::sync::Arc;

use crate::application::errors::{BotError, ReloadError};
use crate::cogs::{CogRegistry, GuildScope};

/// Administrative operations over loaded cogs and per-guild enablement
pub struct AdminService {
    registry: Arc<CogRegistry>,
    guilds: GuildScope,
}

impl AdminService {
    pub fn new(registry: Arc<CogRegistry>) -> Self {
        let guilds = registry.host().guilds.clone();
        Self { registry, guilds }
    }

    pub fn registry(&self) -> &Arc<CogRegistry> {
        &self.registry
    }

    pub fn guilds(&self) -> &GuildScope {
        &self.guilds
    }

    /// Cogs enabled for a guild, with what the registry knows about each
    pub async fn help(&self, guild_id: &str) -> Result<String, BotError> {
        let enabled = self.guilds.enabled_cogs(guild_id).await?;
        if enabled.is_empty() {
            return Ok("No cogs are enabled in this guild.".to_string());
        }

        let mut help = "Enabled cogs:\n".to_string();
        for id in &enabled {
            match self.registry.get(id) {
                Some(cog) => help.push_str(&format!("  {} ({}) - {}\n", cog.name(), id, cog.description())),
                None => help.push_str(&format!("  {} (not loaded)\n", id)),
            }
        }
        Ok(help)
    }

    /// Commands a loaded cog owns
    pub fn cog_commands(&self, cog_id: &str) -> Result<String, BotError> {
        let cog = self
            .registry
            .get(cog_id)
            .ok_or_else(|| BotError::InvalidAction(format!("cog '{}' is not loaded", cog_id)))?;

        if cog.commands().is_empty() {
            return Ok(format!("{} has no commands.", cog.name()));
        }

        let prefix = &self.registry.host().prefix;
        let mut text = format!("Commands of {}:\n", cog.name());
        for name in cog.commands() {
            let description = cog
                .command_spec(name)
                .and_then(|c| c.description.as_deref())
                .unwrap_or("");
            text.push_str(&format!("  {}{} - {}\n", prefix, name, description));
        }
        Ok(text)
    }

    /// Every loaded cog with its enablement in `guild_id`
    pub async fn guild_overview(&self, guild_id: &str) -> Result<String, BotError> {
        let infos = self.registry.cogs_info();
        if infos.is_empty() {
            return Ok("No cogs loaded.".to_string());
        }

        let enabled = self.guilds.enabled_cogs(guild_id).await?;
        let mut text = format!("Cogs for guild {}:\n", guild_id);
        for info in infos {
            let mark = if enabled.contains(&info.id) { "on " } else { "off" };
            let degraded = if info.degraded { " [degraded]" } else { "" };
            text.push_str(&format!(
                "  [{}] {} ({}) - {} command(s), {} event(s){}\n",
                mark, info.name, info.id, info.commands, info.events, degraded
            ));
        }
        Ok(text)
    }

    /// `enable` or `disable` a cog for a guild
    pub async fn toggle(&self, guild_id: &str, cog_id: &str, action: &str) -> Result<String, BotError> {
        match action {
            "enable" => {
                self.guilds.enable(cog_id, guild_id).await?;
                Ok(format!("Enabled {} for this guild.", cog_id))
            }
            "disable" => {
                self.guilds.disable(cog_id, guild_id).await?;
                Ok(format!("Disabled {} for this guild.", cog_id))
            }
            other => Err(BotError::InvalidAction(format!(
                "'{}' (expected enable or disable)",
                other
            ))),
        }
    }

    pub async fn reload(&self, cog_id: &str) -> Result<String, BotError> {
        if !self.registry.is_loaded(cog_id) {
            return Err(ReloadError::NotLoaded(cog_id.to_string()).into());
        }
        let cog = self.registry.reload(cog_id).await?;
        Ok(format!(
            "Reloaded {} ({} command(s), {} event(s)).",
            cog.name(),
            cog.commands().len(),
            cog.binding_count()
        ))
    }

    pub async fn load(&self, cog_id: &str) -> Result<String, BotError> {
        let cog = self.registry.load_id(cog_id).await?;
        let suffix = match cog.init_error() {
            Some(e) => format!(" (init failed: {})", e),
            None => String::new(),
        };
        Ok(format!("Loaded {}{}.", cog.name(), suffix))
    }

    pub async fn unload(&self, cog_id: &str) -> Result<String, BotError> {
        self.registry.unload(cog_id).await?;
        Ok(format!("Unloaded {}.", cog_id))
    }
}
