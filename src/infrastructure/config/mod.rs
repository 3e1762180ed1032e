//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Cogs every new guild starts with
pub const DEFAULT_GUILD_COGS: [&str; 7] = [
    "moderation",
    "music",
    "economy",
    "general",
    "fun",
    "images",
    "administration",
];

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub cogs: CogsConfig,
    pub guilds: GuildsConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CogsConfig {
    pub directory: PathBuf,
    pub auto_load: bool,
    #[serde(default = "default_true")]
    pub builtin_fallback: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GuildsConfig {
    /// SQLite file; `None` keeps enablement in memory
    pub database: Option<PathBuf>,
    #[serde(default = "default_guild_cogs")]
    pub default_cogs: Vec<String>,
}

/// Identity used by the interactive console host
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub guild_id: String,
    pub user_id: String,
}

fn default_true() -> bool {
    true
}

fn default_guild_cogs() -> Vec<String> {
    DEFAULT_GUILD_COGS.iter().map(|s| s.to_string()).collect()
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            guild_id: "console".to_string(),
            user_id: "console-user".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "cogbot".to_string(),
                prefix: "/".to_string(),
            },
            cogs: CogsConfig {
                directory: PathBuf::from("./cogs"),
                auto_load: true,
                builtin_fallback: true,
            },
            guilds: GuildsConfig {
                database: Some(PathBuf::from("data/guilds.db")),
                default_cogs: default_guild_cogs(),
            },
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Defaults plus environment overrides
        let mut config = Config::default();

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            config.bot.prefix = prefix;
        }

        if let Ok(dir) = std::env::var("COGS_DIR") {
            config.cogs.directory = PathBuf::from(dir);
        }

        if let Ok(db) = std::env::var("GUILD_DB") {
            config.guilds.database = if db.is_empty() { None } else { Some(PathBuf::from(db)) };
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.console.guild_id.is_empty() {
            return Err(ConfigError::InvalidValue("console.guild-id must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let yaml = Config::default().to_yaml().unwrap();
        assert!(yaml.contains("auto-load"));
        assert!(yaml.contains("default-cogs"));

        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), yaml).unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.guilds.default_cogs.len(), 7);
        assert_eq!(config.console.guild_id, "console");
    }

    #[test]
    fn test_optional_sections_take_defaults() {
        let yaml = "bot:\n  name: test\n  prefix: '!'\ncogs:\n  directory: ./cogs\n  auto-load: false\nguilds:\n  database: null\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.cogs.builtin_fallback);
        assert!(config.guilds.database.is_none());
        assert_eq!(config.guilds.default_cogs[0], "moderation");
        assert_eq!(config.console.user_id, "console-user");
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "bot:\n  name: x\n  prefix: ''\ncogs:\n  directory: c\n  auto-load: true\nguilds:\n  database: null\n",
        )
        .unwrap();
        assert!(matches!(Config::load(tmp.path()), Err(ConfigError::InvalidValue(_))));
    }
}
