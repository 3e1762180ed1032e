//! Cog manifest definition (`cog.yaml`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::LoadError;

pub const MANIFEST_FILE: &str = "cog.yaml";

/// Cog metadata read from a cog directory
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CogManifest {
    /// Cog id; a manifest without one is rejected at load time
    pub id: Option<String>,

    /// Display name
    pub name: Option<String>,

    /// Cog description
    pub description: Option<String>,

    /// Cog version
    pub version: Option<String>,

    /// Cog author
    pub author: Option<String>,

    /// Shared library exporting the cog entry symbol, relative to the cog directory
    pub library: Option<PathBuf>,

    /// Builtin cog backing this directory when no library is given
    pub builtin: Option<String>,
}

impl CogManifest {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Manifest(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::parse(&content)
            .map_err(|e| LoadError::Manifest(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}
