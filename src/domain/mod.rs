//! Domain layer - Core business objects and the seams to infrastructure
//! 
//! This layer contains:
//! - Entities: User, Message, Event, Invocation, GuildRecord
//! - Traits: Abstractions for infrastructure (Bot, GuildStore, EventBus)

pub mod entities;
pub mod traits;
