//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Unload error: {0}")]
    Unload(#[from] UnloadError),

    #[error("Reload error: {0}")]
    Reload(#[from] ReloadError),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Structural failures of a single `load` call. Nothing is registered when one of these is returned.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cog not found at {0}")]
    NotFound(String),

    #[error("Invalid cog format: {0}")]
    InvalidDescriptor(String),

    #[error("Cog '{0}' is already loaded")]
    AlreadyLoaded(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Library error: {0}")]
    Library(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Whether discovery should count this as a skip rather than a failure.
    pub fn is_skip(&self) -> bool {
        matches!(self, LoadError::NotFound(_) | LoadError::AlreadyLoaded(_))
    }
}

#[derive(Error, Debug)]
pub enum UnloadError {
    #[error("Cog '{0}' is not loaded")]
    NotLoaded(String),
}

#[derive(Error, Debug)]
pub enum ReloadError {
    #[error("Cog '{0}' is not loaded")]
    NotLoaded(String),

    #[error("Cog '{id}' was unloaded but failed to load again: {source}")]
    Load {
        id: String,
        #[source]
        source: LoadError,
    },
}

/// Failure inside a cog's own `init` hook
#[derive(Error, Debug)]
#[error("{0}")]
pub struct InitError(pub String);

/// Failure inside an event handler
#[derive(Error, Debug)]
#[error("{0}")]
pub struct HandlerError(pub String);

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Cog '{0}' is not enabled in this guild")]
    Disabled(String),
}

/// Guild enablement persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Lock poisoned")]
    Poisoned,

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Best-effort cache purge outcome
#[derive(Error, Debug)]
pub enum PurgeError {
    #[error("code cache purge is not supported by this source")]
    Unsupported,

    #[error("purge failed: {0}")]
    Failed(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
