//! Cog sources - where cog code comes from and how it is (re)resolved

use async_trait::async_trait;
use libloading::Library;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::errors::{LoadError, PurgeError};
use crate::cogs::trait_def::CogDescriptor;

/// Where a cog lives. The derived id is stable across reloads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CogLocator {
    Builtin(String),
    Directory(PathBuf),
}

impl CogLocator {
    pub fn derived_id(&self) -> Option<String> {
        match self {
            CogLocator::Builtin(id) => Some(id.clone()),
            CogLocator::Directory(path) => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|s| s.to_string()),
        }
    }
}

impl fmt::Display for CogLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CogLocator::Builtin(id) => write!(f, "builtin:{}", id),
            CogLocator::Directory(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A freshly constructed descriptor plus whatever keeps its code mapped
pub struct ResolvedCog {
    pub descriptor: CogDescriptor,
    pub library: Option<Arc<Library>>,
}

impl ResolvedCog {
    pub fn builtin(descriptor: CogDescriptor) -> Self {
        Self {
            descriptor,
            library: None,
        }
    }
}

/// Pluggable loader: discovery, resolution and cache invalidation
#[async_trait]
pub trait CogSource: Send + Sync {
    /// Enumerate candidate cog locations
    async fn discover(&self) -> Result<Vec<CogLocator>, LoadError>;

    /// Construct a fresh descriptor for a locator
    async fn resolve(&self, locator: &CogLocator) -> Result<ResolvedCog, LoadError>;

    /// Forget any cached code for a locator so the next resolve sees fresh code
    fn purge(&self, locator: &CogLocator) -> Result<(), PurgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_id_uses_directory_basename() {
        let locator = CogLocator::Directory(PathBuf::from("/srv/bot/cogs/economy"));
        assert_eq!(locator.derived_id().as_deref(), Some("economy"));
        assert_eq!(CogLocator::Builtin("music".to_string()).derived_id().as_deref(), Some("music"));
        assert_eq!(CogLocator::Directory(PathBuf::from("/")).derived_id(), None);
    }
}
