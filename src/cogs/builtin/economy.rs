//! Virtual currency placeholders

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::{CommandError, HandlerError};
use crate::cogs::trait_def::{CogContext, CogDescriptor, CommandExecutor, CommandSpec, EventSpec};
use crate::domain::entities::{Event, Invocation};

pub fn descriptor() -> CogDescriptor {
    CogDescriptor::new("economy")
        .with_name("Economy")
        .with_description("Virtual economy and currency system")
        .with_init(super::record_host)
        .with_command(
            CommandSpec::new("balance")
                .with_description("Check your or another user's balance")
                .with_usage("balance [user]")
                .with_executor(balance),
        )
        .with_command(
            CommandSpec::new("daily")
                .with_description("Collect your daily reward")
                .with_async_executor(Arc::new(DailyReward)),
        )
        .with_event(EventSpec::new("messageCreate").with_handler(on_message))
}

fn balance(invocation: &Invocation, _ctx: &CogContext) -> Result<String, CommandError> {
    let target = invocation
        .arg(0)
        .map(str::to_string)
        .unwrap_or_else(|| invocation.user.display_name());
    Ok(format!("💰 {}'s balance: 1000 coins (placeholder)", target))
}

/// One reward per user per day, tracked in the instance state
struct DailyReward;

#[async_trait]
impl CommandExecutor for DailyReward {
    async fn execute(&self, invocation: &Invocation, ctx: &CogContext) -> Result<String, CommandError> {
        let today = invocation.timestamp.date_naive().to_string();
        let key = format!("daily:{}", invocation.user.id);
        if ctx.state.get(&key) == Some(serde_json::json!(today)) {
            return Ok("⏳ You already collected today's reward.".to_string());
        }
        ctx.state.set(key, serde_json::json!(today));
        Ok("🎁 Daily reward collected! +100 coins (placeholder)".to_string())
    }
}

fn on_message(event: &Event, ctx: &CogContext) -> Result<(), HandlerError> {
    if event.user.as_ref().is_some_and(|u| u.is_bot) {
        return Ok(());
    }
    if let Some(user) = &event.user {
        tracing::debug!("[{}] {} earned coins for messaging", ctx.cog_id, user);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cogs::builtin::testing::{context, invocation};
    use crate::cogs::trait_def::CogInit;

    #[tokio::test]
    async fn test_balance_defaults_to_caller() {
        let desc = descriptor();
        let balance = desc.commands[0].executor.clone().unwrap();
        let ctx = context("economy");

        let reply = balance.execute(&invocation("balance", &[]), &ctx).await.unwrap();
        assert!(reply.contains("alice"));
        let reply = balance.execute(&invocation("balance", &["bob"]), &ctx).await.unwrap();
        assert!(reply.contains("bob's balance"));
    }

    #[tokio::test]
    async fn test_daily_once_per_user_per_instance() {
        let daily = descriptor().commands[1].executor.clone().unwrap();
        let ctx = context("economy");

        let first = daily.execute(&invocation("daily", &[]), &ctx).await.unwrap();
        assert!(first.contains("+100 coins"));
        let second = daily.execute(&invocation("daily", &[]), &ctx).await.unwrap();
        assert!(second.contains("already collected"));

        // A reload starts from fresh state
        let fresh = context("economy");
        assert!(daily.execute(&invocation("daily", &[]), &fresh).await.unwrap().contains("+100 coins"));
    }

    #[tokio::test]
    async fn test_init_records_host() {
        let desc = descriptor();
        let ctx = context("economy");
        desc.init.unwrap().init(&ctx).await.unwrap();
        assert_eq!(ctx.state.get("host"), Some(serde_json::json!("cogbot")));
    }
}
