//! Music playback placeholders

use crate::application::errors::{CommandError, HandlerError};
use crate::cogs::trait_def::{CogContext, CogDescriptor, CommandSpec, EventSpec};
use crate::domain::entities::{Event, Invocation};

pub fn descriptor() -> CogDescriptor {
    CogDescriptor::new("music")
        .with_name("Music")
        .with_description("Music playback and queue management")
        .with_init(super::record_host)
        .with_command(
            CommandSpec::new("play")
                .with_description("Play a song or playlist")
                .with_usage("play <query>")
                .with_executor(play),
        )
        .with_command(
            CommandSpec::new("skip")
                .with_description("Skip the current song")
                .with_executor(|_: &Invocation, _: &CogContext| -> Result<String, CommandError> {
                    Ok("⏭️ Skip functionality coming soon!".to_string())
                }),
        )
        .with_event(EventSpec::new("voiceStateUpdate").with_handler(on_voice_state))
}

fn play(invocation: &Invocation, _ctx: &CogContext) -> Result<String, CommandError> {
    if invocation.args.is_empty() {
        return Err(CommandError::InvalidArgs("Usage: play <query>".to_string()));
    }
    Ok("🎵 Music playback coming soon! This is a placeholder command.".to_string())
}

fn on_voice_state(event: &Event, ctx: &CogContext) -> Result<(), HandlerError> {
    tracing::debug!(
        "[{}] voice state changed in guild {}",
        ctx.cog_id,
        event.guild_id.as_deref().unwrap_or("-")
    );
    Ok(())
}
