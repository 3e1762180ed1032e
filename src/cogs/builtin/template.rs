//! Reference cog showing every feature a cog can declare

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::{CommandError, HandlerError, InitError};
use crate::cogs::trait_def::{CogContext, CogDescriptor, CogInit, CommandSpec, EventSpec};
use crate::domain::entities::{Event, Invocation};

const VERSION: &str = "1.0.0";

pub fn descriptor() -> CogDescriptor {
    CogDescriptor::new("template")
        .with_name("Template Cog")
        .with_description("A template cog demonstrating all available features")
        .with_async_init(Arc::new(TemplateInit))
        .with_command(
            CommandSpec::new("hello")
                .with_description("Say hello from the template cog")
                .with_executor(|_: &Invocation, _: &CogContext| -> Result<String, CommandError> {
                    Ok("👋 Hello from the Template Cog!".to_string())
                }),
        )
        .with_command(
            CommandSpec::new("info")
                .with_description("Get information about this cog")
                .with_usage("info [commands|events|version]")
                .with_executor(info),
        )
        .with_event(EventSpec::new("messageCreate").with_handler(on_message))
}

/// Shows the async init form; the closure form works as well
struct TemplateInit;

#[async_trait]
impl CogInit for TemplateInit {
    async fn init(&self, ctx: &CogContext) -> Result<(), InitError> {
        super::record_host(ctx)?;
        tracing::info!("Template cog initialized for {}", ctx.host.bot_name);
        Ok(())
    }
}

fn info(invocation: &Invocation, ctx: &CogContext) -> Result<String, CommandError> {
    let reply = match invocation.arg(0) {
        None => format!(
            "ℹ️ Template Cog v{}\nUse `{}info <detail>` to get specific information.",
            VERSION, ctx.host.prefix
        ),
        Some("commands") => format!(
            "📋 Available commands:\n• `{p}hello` - Say hello\n• `{p}info` - Get cog information",
            p = ctx.host.prefix
        ),
        Some("events") => "🔔 Active events:\n• `messageCreate` - Logs messages".to_string(),
        Some("version") => format!("📦 Version: {}", VERSION),
        Some(_) => "❓ Unknown detail. Try: commands, events, or version".to_string(),
    };
    Ok(reply)
}

fn on_message(event: &Event, ctx: &CogContext) -> Result<(), HandlerError> {
    if event.user.as_ref().is_some_and(|u| u.is_bot) {
        return Ok(());
    }
    let Some(content) = event.content() else {
        return Ok(());
    };

    if content.chars().count() > 50 {
        let preview: String = content.chars().take(100).collect();
        tracing::info!("[{}] Long message: {}...", ctx.cog_id, preview);
    }
    if content.to_lowercase().contains("template") {
        let seen = ctx
            .state
            .get("mentions")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        ctx.state.set("mentions", serde_json::json!(seen + 1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cogs::builtin::testing::{context, invocation};
    use crate::cogs::trait_def::{CommandExecutor, EventHandler};
    use crate::domain::entities::Message;

    #[tokio::test]
    async fn test_info_details() {
        let info = descriptor().commands[1].executor.clone().unwrap();
        let ctx = context("template");

        let reply = info.execute(&invocation("info", &[]), &ctx).await.unwrap();
        assert!(reply.contains("v1.0.0"));
        let reply = info.execute(&invocation("info", &["commands"]), &ctx).await.unwrap();
        assert!(reply.contains("/hello"));
        let reply = info.execute(&invocation("info", &["nope"]), &ctx).await.unwrap();
        assert!(reply.starts_with("❓"));
    }

    #[tokio::test]
    async fn test_async_init_records_host() {
        let ctx = context("template");
        descriptor().init.unwrap().init(&ctx).await.unwrap();
        assert_eq!(ctx.state.get("prefix"), Some(serde_json::json!("/")));
    }

    #[tokio::test]
    async fn test_mentions_counted_in_state() {
        let ctx = context("template");
        let handler = descriptor().events[0].handler.clone().unwrap();

        let event = Event::message_create(&Message::from_text("g1", "is this the Template cog?"));
        handler.handle(&event, &ctx).await.unwrap();
        handler.handle(&event, &ctx).await.unwrap();
        handler
            .handle(&Event::message_create(&Message::from_text("g1", "hi")), &ctx)
            .await
            .unwrap();
        assert_eq!(ctx.state.get("mentions"), Some(serde_json::json!(2)));
    }
}
