use std::sync::Arc;

use crate::application::errors::{BotError, CommandError};
use crate::application::messaging::MessageParser;
use crate::application::services::AdminService;
use crate::domain::entities::{Content, Event, Invocation, Message, User};
use crate::domain::traits::{Bot, EventBus};

/// Routes messages from one guild to admin commands, cog commands or the event bus
pub struct MessageService<B: Bot> {
    bot: B,
    parser: MessageParser,
    admin: Arc<AdminService>,
    bus: Arc<dyn EventBus>,
}

impl<B: Bot> MessageService<B> {
    pub fn new(bot: B, parser: MessageParser, admin: Arc<AdminService>, bus: Arc<dyn EventBus>) -> Self {
        Self {
            bot,
            parser,
            admin,
            bus,
        }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    /// Parse raw input and process it
    pub async fn handle_text(&self, guild_id: &str, text: &str, sender: Option<User>) -> Result<Option<String>, BotError> {
        let message = self.parser.parse(guild_id, text, sender);
        self.process(message).await
    }

    /// Process an incoming message and return the reply, if any
    pub async fn process(&self, message: Message) -> Result<Option<String>, BotError> {
        tracing::debug!("Processing message: {:?}", message.content);

        match &message.content {
            Content::Text(_) => {
                let delivered = self.bus.emit(&Event::message_create(&message)).await;
                tracing::debug!("messageCreate delivered to {} handlers", delivered);
                Ok(None)
            }
            Content::Command { name, args } => {
                let reply = self.route_command(&message, name, args).await?;
                Ok(Some(reply))
            }
            Content::Empty => Ok(None),
        }
    }

    async fn route_command(&self, message: &Message, name: &str, args: &[String]) -> Result<String, BotError> {
        let guild = message.guild_id.as_str();
        let arg = move |i: usize| args.get(i).map(String::as_str);
        let required = move |i: usize, usage: &'static str| {
            arg(i).ok_or_else(|| BotError::Command(CommandError::InvalidArgs(format!("Usage: {}", usage))))
        };

        match name {
            "help" => match arg(0) {
                Some(cog) => self.admin.cog_commands(cog),
                None => self.admin.help(guild).await,
            },
            "cogs" => self.admin.guild_overview(guild).await,
            "reload" => self.admin.reload(required(0, "reload <cog>")?).await,
            "load" => self.admin.load(required(0, "load <cog>")?).await,
            "unload" => self.admin.unload(required(0, "unload <cog>")?).await,
            "enable" | "disable" => self.admin.toggle(guild, required(0, "enable|disable <cog>")?, name).await,
            _ => self.dispatch_cog_command(message, name).await,
        }
    }

    async fn dispatch_cog_command(&self, message: &Message, name: &str) -> Result<String, BotError> {
        let cog = self
            .admin
            .registry()
            .resolve_command(name)
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;

        if !self.admin.guilds().is_enabled(cog.id(), &message.guild_id).await {
            return Err(CommandError::Disabled(cog.id().to_string()).into());
        }

        let invocation = Invocation::from_message(message)
            .ok_or_else(|| BotError::Internal("command message without command content".to_string()))?;
        tracing::info!("Running /{} from cog {} in guild {}", name, cog.id(), message.guild_id);
        Ok(cog.execute(name, &invocation).await?)
    }

    /// Send a response message
    pub async fn respond(&self, guild_id: &str, text: &str) -> Result<String, BotError> {
        self.bot.send_message(guild_id, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cogs::{BuiltinCatalog, CogLocator, CogRegistry, GuildScope, HostContext};
    use crate::infrastructure::adapters::console::ConsoleAdapter;
    use crate::infrastructure::cogs::BuiltinSource;
    use crate::infrastructure::events::LocalEventBus;
    use crate::infrastructure::storage::MemoryGuildStore;

    async fn service() -> MessageService<ConsoleAdapter> {
        let bus = Arc::new(LocalEventBus::new());
        let host = HostContext {
            bot_name: "test".to_string(),
            prefix: "/".to_string(),
            guilds: GuildScope::new(Arc::new(MemoryGuildStore::default())),
        };
        let registry = CogRegistry::new(Arc::new(BuiltinSource::new(BuiltinCatalog::standard())), bus.clone(), host);
        for id in ["economy", "template"] {
            registry.load(&CogLocator::Builtin(id.to_string())).await.unwrap();
        }
        let admin = Arc::new(AdminService::new(Arc::new(registry)));
        MessageService::new(ConsoleAdapter::new("test"), MessageParser::new("/"), admin, bus)
    }

    #[tokio::test]
    async fn test_cog_command_requires_guild_enablement() {
        let service = service().await;
        let err = service.handle_text("g1", "/hello", None).await.unwrap_err();
        assert!(matches!(err, BotError::Command(CommandError::Disabled(_))));

        service.handle_text("g1", "/enable template", None).await.unwrap();
        let reply = service.handle_text("g1", "/hello", None).await.unwrap();
        assert_eq!(reply.as_deref(), Some("👋 Hello from the Template Cog!"));
    }

    #[tokio::test]
    async fn test_unknown_command_is_not_found() {
        let service = service().await;
        let err = service.handle_text("g1", "/nope", None).await.unwrap_err();
        assert!(matches!(err, BotError::Command(CommandError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_plain_text_reaches_event_handlers() {
        let service = service().await;
        assert!(service.handle_text("g1", "template talk", None).await.unwrap().is_none());

        let template = service.admin.registry().get("template").unwrap();
        assert_eq!(template.context().state.get("mentions"), Some(serde_json::json!(1)));
    }

    #[tokio::test]
    async fn test_admin_commands_need_arguments() {
        let service = service().await;
        let err = service.handle_text("g1", "/reload", None).await.unwrap_err();
        assert!(matches!(err, BotError::Command(CommandError::InvalidArgs(_))));
        assert!(service.handle_text("g1", "/reload economy", None).await.is_ok());
    }
}
