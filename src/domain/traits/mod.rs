//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod store;
pub mod event_bus;

pub use bot::{Bot, BotInfo};
pub use store::GuildStore;
pub use event_bus::{EventBus, EventListener, ListenerId};
