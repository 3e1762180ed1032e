//! Cogs compiled into the host binary

pub mod economy;
pub mod moderation;
pub mod music;
pub mod template;

use std::collections::BTreeMap;

use crate::cogs::source::CogLocator;
use crate::cogs::trait_def::{CogContext, CogDescriptor};
use crate::application::errors::InitError;

/// Builds a fresh descriptor each time it is called
pub type CogFactory = fn() -> CogDescriptor;

/// Factories for builtin cogs, keyed by cog id
#[derive(Clone, Default)]
pub struct BuiltinCatalog {
    factories: BTreeMap<String, CogFactory>,
}

impl BuiltinCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every cog shipped in this crate
    pub fn standard() -> Self {
        Self::new()
            .register("economy", economy::descriptor)
            .register("moderation", moderation::descriptor)
            .register("music", music::descriptor)
            .register("template", template::descriptor)
    }

    pub fn register(mut self, id: impl Into<String>, factory: CogFactory) -> Self {
        self.factories.insert(id.into(), factory);
        self
    }

    pub fn ids(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn locators(&self) -> Vec<CogLocator> {
        self.factories.keys().cloned().map(CogLocator::Builtin).collect()
    }

    pub fn build(&self, id: &str) -> Option<CogDescriptor> {
        self.factories.get(id).map(|factory| factory())
    }
}

/// Shared init hook: remember which host this instance is attached to
pub(crate) fn record_host(ctx: &CogContext) -> Result<(), InitError> {
    ctx.state.set("host", serde_json::json!(ctx.host.bot_name));
    ctx.state.set("prefix", serde_json::json!(ctx.host.prefix));
    ctx.state.set("initialized_at", serde_json::json!(chrono::Utc::now().to_rfc3339()));
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::cogs::guild_scope::GuildScope;
    use crate::cogs::trait_def::{CogContext, CogState, HostContext};
    use crate::domain::entities::{Invocation, User};
    use crate::infrastructure::storage::MemoryGuildStore;

    pub fn context(cog_id: &str) -> CogContext {
        CogContext {
            cog_id: cog_id.to_string(),
            host: HostContext {
                bot_name: "cogbot".to_string(),
                prefix: "/".to_string(),
                guilds: GuildScope::new(Arc::new(MemoryGuildStore::default())),
            },
            state: Arc::new(CogState::new()),
        }
    }

    pub fn invocation(command: &str, args: &[&str]) -> Invocation {
        Invocation::new(
            "guild-1",
            User::new("42").with_username("alice"),
            command,
            args.iter().map(|a| a.to_string()).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_ids() {
        let catalog = BuiltinCatalog::standard();
        assert_eq!(catalog.ids(), vec!["economy", "moderation", "music", "template"]);
        assert!(catalog.build("fun").is_none());
    }

    #[test]
    fn test_build_returns_fresh_descriptors() {
        let catalog = BuiltinCatalog::standard();
        for id in catalog.ids() {
            let descriptor = catalog.build(&id).unwrap();
            assert_eq!(descriptor.id, id);
            assert!(descriptor.init.is_some());
            assert!(descriptor.commands.iter().all(|c| c.invalid_reason().is_none()));
        }
    }
}
