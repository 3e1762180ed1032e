//! Member moderation placeholders

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::{CommandError, HandlerError};
use crate::cogs::trait_def::{CogContext, CogDescriptor, CommandSpec, EventHandler, EventSpec};
use crate::domain::entities::{Event, Invocation};

pub fn descriptor() -> CogDescriptor {
    CogDescriptor::new("moderation")
        .with_name("Moderation")
        .with_description("Moderation commands for managing server members")
        .with_init(super::record_host)
        .with_command(
            CommandSpec::new("kick")
                .with_description("Kick a member from the server")
                .with_usage("kick <user> [reason]")
                .with_executor(|inv: &Invocation, _: &CogContext| sanction("kicked", inv)),
        )
        .with_command(
            CommandSpec::new("ban")
                .with_description("Ban a member from the server")
                .with_usage("ban <user> [reason]")
                .with_executor(|inv: &Invocation, _: &CogContext| sanction("banned", inv)),
        )
        .with_event(EventSpec::new("guildMemberRemove").with_async_handler(Arc::new(MemberRemoved)))
}

fn sanction(verb: &str, invocation: &Invocation) -> Result<String, CommandError> {
    let target = invocation
        .arg(0)
        .ok_or_else(|| CommandError::InvalidArgs(format!("Usage: {} <user> [reason]", invocation.command)))?;
    let reason = if invocation.args.len() > 1 {
        invocation.args[1..].join(" ")
    } else {
        "No reason provided".to_string()
    };
    Ok(format!("Successfully {} {} for: {}", verb, target, reason))
}

/// Logs departures, but only in guilds that have moderation enabled
struct MemberRemoved;

#[async_trait]
impl EventHandler for MemberRemoved {
    async fn handle(&self, event: &Event, ctx: &CogContext) -> Result<(), HandlerError> {
        let Some(guild_id) = event.guild_id.as_deref() else {
            return Ok(());
        };
        if !ctx.host.guilds.is_enabled(&ctx.cog_id, guild_id).await {
            return Ok(());
        }

        let member = event
            .user
            .as_ref()
            .map(|u| u.display_name())
            .unwrap_or_else(|| "unknown".to_string());
        tracing::info!("Member {} left guild {}", member, guild_id);
        ctx.state.set("last_departure", serde_json::json!(member));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cogs::builtin::testing::{context, invocation};
    use crate::cogs::trait_def::CommandExecutor;
    use crate::domain::entities::{EventKind, User};

    #[tokio::test]
    async fn test_kick_reason_defaults() {
        let kick = descriptor().commands[0].executor.clone().unwrap();
        let ctx = context("moderation");

        let reply = kick.execute(&invocation("kick", &["bob"]), &ctx).await.unwrap();
        assert_eq!(reply, "Successfully kicked bob for: No reason provided");
        let reply = kick.execute(&invocation("kick", &["bob", "spam", "links"]), &ctx).await.unwrap();
        assert!(reply.ends_with("spam links"));
        assert!(kick.execute(&invocation("kick", &[]), &ctx).await.is_err());
    }

    #[tokio::test]
    async fn test_departure_logged_only_when_enabled() {
        let ctx = context("moderation");
        let event = Event::new(EventKind::GuildMemberRemove)
            .with_guild("g1")
            .with_user(User::new("7").with_username("carol"));

        MemberRemoved.handle(&event, &ctx).await.unwrap();
        assert!(ctx.state.get("last_departure").is_none());

        ctx.host.guilds.enable("moderation", "g1").await.unwrap();
        MemberRemoved.handle(&event, &ctx).await.unwrap();
        assert_eq!(ctx.state.get("last_departure"), Some(serde_json::json!("carol")));
    }
}
