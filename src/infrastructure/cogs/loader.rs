//! Cog sources backed by the filesystem and by the builtin catalog

use async_trait::async_trait;
use libloading::{Library, Symbol};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::manifest::{CogManifest, MANIFEST_FILE};
use crate::application::errors::{LoadError, PurgeError};
use crate::cogs::builtin::BuiltinCatalog;
use crate::cogs::source::{CogLocator, CogSource, ResolvedCog};
use crate::cogs::trait_def::CogDescriptor;

/// Function signature exported by cog libraries
pub type CogEntryFn = unsafe extern "C" fn() -> *mut CogDescriptor;

/// Symbol name of the cog entry function
pub const ENTRY_SYMBOL: &[u8] = b"cogbot_cog_descriptor";

/// Discovers cog directories under a root and resolves them freshly on every load
pub struct DirectorySource {
    root: PathBuf,
    catalog: BuiltinCatalog,
    builtin_fallback: bool,
    libraries: Mutex<HashMap<PathBuf, Arc<Library>>>,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, catalog: BuiltinCatalog) -> Self {
        Self {
            root: root.into(),
            catalog,
            builtin_fallback: false,
            libraries: Mutex::new(HashMap::new()),
        }
    }

    /// Offer the builtin catalog when the root holds no cog directories
    pub fn with_builtin_fallback(mut self, enabled: bool) -> Self {
        self.builtin_fallback = enabled;
        self
    }

    fn scan(&self) -> Result<Vec<CogLocator>, LoadError> {
        if !self.root.exists() {
            tracing::warn!("Cogs directory not found at {}, creating...", self.root.display());
            std::fs::create_dir_all(&self.root)?;
        }

        let mut dirs = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            // Skip hidden directories
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    continue;
                }
            }

            dirs.push(path);
        }
        dirs.sort();

        tracing::info!("Found {} cog directories in {}", dirs.len(), self.root.display());
        Ok(dirs.into_iter().map(CogLocator::Directory).collect())
    }

    fn resolve_directory(&self, path: &Path) -> Result<ResolvedCog, LoadError> {
        let manifest_path = path.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Err(LoadError::NotFound(format!(
                "no {} in {}",
                MANIFEST_FILE,
                path.display()
            )));
        }
        let manifest = CogManifest::from_file(&manifest_path)?;

        if let Some(lib) = &manifest.library {
            let library = self.open_library(&path.join(lib))?;
            let descriptor = descriptor_from_library(&library)?;
            return Ok(ResolvedCog {
                descriptor,
                library: Some(library),
            });
        }

        let key = manifest
            .builtin
            .clone()
            .or_else(|| manifest.id.clone())
            .unwrap_or_default();
        let mut descriptor = self
            .catalog
            .build(&key)
            .ok_or_else(|| LoadError::NotFound(format!("builtin cog '{}' for {}", key, path.display())))?;

        // The manifest is the cog's identity
        descriptor.id = manifest.id.unwrap_or_default();
        if manifest.name.is_some() {
            descriptor.name = manifest.name;
        }
        if manifest.description.is_some() {
            descriptor.description = manifest.description;
        }
        Ok(ResolvedCog::builtin(descriptor))
    }

    fn open_library(&self, library_path: &Path) -> Result<Arc<Library>, LoadError> {
        let mut libraries = self.libraries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(library) = libraries.get(library_path) {
            return Ok(library.clone());
        }

        if !library_path.exists() {
            return Err(LoadError::NotFound(format!(
                "library {}",
                library_path.display()
            )));
        }

        let library = unsafe {
            Library::new(library_path)
                .map_err(|e| LoadError::Library(format!("Failed to load library: {}", e)))?
        };
        let library = Arc::new(library);
        libraries.insert(library_path.to_path_buf(), library.clone());
        Ok(library)
    }
}

fn descriptor_from_library(library: &Library) -> Result<CogDescriptor, LoadError> {
    let entry: Symbol<CogEntryFn> = unsafe {
        library
            .get(ENTRY_SYMBOL)
            .map_err(|e| LoadError::Library(format!("Failed to find entry symbol: {}", e)))?
    };

    let raw = unsafe { entry() };
    if raw.is_null() {
        return Err(LoadError::Library("Cog entry returned null".to_string()));
    }
    let descriptor = unsafe { Box::from_raw(raw) };
    Ok(*descriptor)
}

#[async_trait]
impl CogSource for DirectorySource {
    async fn discover(&self) -> Result<Vec<CogLocator>, LoadError> {
        let found = self.scan()?;
        if found.is_empty() && self.builtin_fallback {
            tracing::info!("No cog directories, falling back to builtin cogs");
            return Ok(self.catalog.locators());
        }
        Ok(found)
    }

    async fn resolve(&self, locator: &CogLocator) -> Result<ResolvedCog, LoadError> {
        match locator {
            CogLocator::Directory(path) => self.resolve_directory(path),
            CogLocator::Builtin(id) => self
                .catalog
                .build(id)
                .map(ResolvedCog::builtin)
                .ok_or_else(|| LoadError::NotFound(locator.to_string())),
        }
    }

    fn purge(&self, locator: &CogLocator) -> Result<(), PurgeError> {
        let CogLocator::Directory(path) = locator else {
            return Err(PurgeError::Unsupported);
        };

        let mut libraries = self
            .libraries
            .lock()
            .map_err(|_| PurgeError::Failed("library cache lock poisoned".to_string()))?;
        let before = libraries.len();
        libraries.retain(|lib_path, _| !lib_path.starts_with(path));
        if libraries.len() == before {
            // Builtin-backed directory: nothing cached to forget
            return Err(PurgeError::Unsupported);
        }
        Ok(())
    }
}

/// Source listing only the cogs compiled into the host
pub struct BuiltinSource {
    catalog: BuiltinCatalog,
}

impl BuiltinSource {
    pub fn new(catalog: BuiltinCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl CogSource for BuiltinSource {
    async fn discover(&self) -> Result<Vec<CogLocator>, LoadError> {
        Ok(self.catalog.locators())
    }

    async fn resolve(&self, locator: &CogLocator) -> Result<ResolvedCog, LoadError> {
        let CogLocator::Builtin(id) = locator else {
            return Err(LoadError::NotFound(locator.to_string()));
        };
        self.catalog
            .build(id)
            .map(ResolvedCog::builtin)
            .ok_or_else(|| LoadError::NotFound(locator.to_string()))
    }

    fn purge(&self, _locator: &CogLocator) -> Result<(), PurgeError> {
        Err(PurgeError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_cog(root: &Path, dir: &str, manifest: &str) {
        let path = root.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join(MANIFEST_FILE), manifest).unwrap();
    }

    #[tokio::test]
    async fn test_discover_creates_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("cogs");
        let source = DirectorySource::new(&root, BuiltinCatalog::standard());

        assert!(source.discover().await.unwrap().is_empty());
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_discover_skips_files_and_hidden_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        write_cog(tmp.path(), "music", "id: music\n");
        write_cog(tmp.path(), "economy", "id: economy\n");
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join("README.md"), "cogs").unwrap();

        let source = DirectorySource::new(tmp.path(), BuiltinCatalog::standard());
        let ids: Vec<String> = source
            .discover()
            .await
            .unwrap()
            .iter()
            .filter_map(CogLocator::derived_id)
            .collect();
        assert_eq!(ids, vec!["economy".to_string(), "music".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_root_falls_back_to_builtins() {
        let tmp = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(tmp.path(), BuiltinCatalog::standard()).with_builtin_fallback(true);
        let found = source.discover().await.unwrap();
        assert!(found.contains(&CogLocator::Builtin("economy".to_string())));
    }

    #[tokio::test]
    async fn test_resolve_builtin_backed_directory_applies_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        write_cog(tmp.path(), "coins", "id: coins\nname: Coins\nbuiltin: economy\n");
        let source = DirectorySource::new(tmp.path(), BuiltinCatalog::standard());

        let resolved = source
            .resolve(&CogLocator::Directory(tmp.path().join("coins")))
            .await
            .unwrap();
        assert_eq!(resolved.descriptor.id, "coins");
        assert_eq!(resolved.descriptor.display_name(), "Coins");
        assert!(resolved.descriptor.commands.iter().any(|c| c.name == "balance"));
        assert!(resolved.library.is_none());
    }

    #[tokio::test]
    async fn test_manifest_without_id_yields_invalid_descriptor() {
        let tmp = tempfile::tempdir().unwrap();
        write_cog(tmp.path(), "anon", "builtin: music\n");
        let source = DirectorySource::new(tmp.path(), BuiltinCatalog::standard());

        let resolved = source
            .resolve(&CogLocator::Directory(tmp.path().join("anon")))
            .await
            .unwrap();
        assert!(matches!(
            resolved.descriptor.validate("anon"),
            Err(LoadError::InvalidDescriptor(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_without_manifest_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        let source = DirectorySource::new(tmp.path(), BuiltinCatalog::standard());

        let err = source
            .resolve(&CogLocator::Directory(tmp.path().join("empty")))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_library_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        write_cog(tmp.path(), "native", "id: native\nlibrary: libnative.so\n");
        let source = DirectorySource::new(tmp.path(), BuiltinCatalog::standard());

        let err = source
            .resolve(&CogLocator::Directory(tmp.path().join("native")))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_purge_without_cached_code_is_unsupported() {
        let source = DirectorySource::new("/tmp/cogs", BuiltinCatalog::standard());
        assert!(matches!(
            source.purge(&CogLocator::Directory(PathBuf::from("/tmp/cogs/economy"))),
            Err(PurgeError::Unsupported)
        ));
        assert!(matches!(
            BuiltinSource::new(BuiltinCatalog::standard()).purge(&CogLocator::Builtin("economy".to_string())),
            Err(PurgeError::Unsupported)
        ));
    }

    #[tokio::test]
    async fn test_builtin_source_rejects_directories() {
        let source = BuiltinSource::new(BuiltinCatalog::standard());
        assert_eq!(source.discover().await.unwrap().len(), 4);
        assert!(source.resolve(&CogLocator::Directory(PathBuf::from("/x"))).await.is_err());
        assert!(source.resolve(&CogLocator::Builtin("music".to_string())).await.is_ok());
    }
}
