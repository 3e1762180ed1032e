//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - Services: cog administration and message routing
//! - Errors: typed failures for every lifecycle operation
//! - Messaging: message parsing

pub mod errors;
pub mod services;
pub mod messaging;
