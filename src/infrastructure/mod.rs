//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Cogs: cog sources (directories, manifests, shared libraries)
//! - Events: the in-process event bus
//! - Storage / Database: guild enablement persistence
//! - Adapters: Platform integrations (console)

pub mod adapters;
pub mod cogs;
pub mod config;
pub mod database;
pub mod events;
pub mod storage;
