//! Cog registry - handles cog lifecycle: discovery, load, unload and hot reload

use chrono::{DateTime, Utc};
use libloading::Library;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error, info, warn};

use crate::application::errors::{CommandError, LoadError, PurgeError, ReloadError, UnloadError};
use crate::cogs::binder::{BindingHandle, HandlerBinder};
use crate::cogs::command_index::CommandIndex;
use crate::cogs::source::{CogLocator, CogSource, ResolvedCog};
use crate::cogs::trait_def::{CogContext, CogDescriptor, CogState, CommandSpec, HostContext};
use crate::domain::entities::Invocation;
use crate::domain::traits::EventBus;

/// A cog that is currently loaded, together with everything registered on its behalf.
///
/// Only `CogRegistry::unload` releases the bindings and command names recorded here.
pub struct LoadedCog {
    descriptor: CogDescriptor,
    locator: CogLocator,
    context: CogContext,
    bindings: Vec<BindingHandle>,
    commands: Vec<String>,
    init_error: Option<String>,
    loaded_at: DateTime<Utc>,
    // Declared last so cog code stays mapped until everything above is dropped
    _library: Option<Arc<Library>>,
}

impl LoadedCog {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn name(&self) -> &str {
        self.descriptor.display_name()
    }

    pub fn description(&self) -> &str {
        self.descriptor.description_or_default()
    }

    pub fn locator(&self) -> &CogLocator {
        &self.locator
    }

    pub fn descriptor(&self) -> &CogDescriptor {
        &self.descriptor
    }

    pub fn context(&self) -> &CogContext {
        &self.context
    }

    /// Command names this cog owns in the index
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Event names with a live binding
    pub fn events(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.event()).collect()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// True when the cog's init hook failed; it stays loaded but may not work
    pub fn is_degraded(&self) -> bool {
        self.init_error.is_some()
    }

    pub fn init_error(&self) -> Option<&str> {
        self.init_error.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Spec of a command this cog actually owns
    pub fn command_spec(&self, name: &str) -> Option<&CommandSpec> {
        if !self.commands.iter().any(|c| c == name) {
            return None;
        }
        self.descriptor.commands.iter().find(|c| c.name == name)
    }

    /// Run one of this cog's commands with the cog's own context
    pub async fn execute(&self, name: &str, invocation: &Invocation) -> Result<String, CommandError> {
        let executor = self
            .command_spec(name)
            .and_then(|spec| spec.executor.as_ref())
            .ok_or_else(|| CommandError::NotFound(name.to_string()))?;
        executor.execute(invocation, &self.context).await
    }

    pub fn info(&self) -> CogInfo {
        CogInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            commands: self.commands.len(),
            events: self.bindings.len(),
            degraded: self.is_degraded(),
            loaded_at: self.loaded_at,
        }
    }
}

impl fmt::Debug for LoadedCog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedCog")
            .field("id", &self.descriptor.id)
            .field("locator", &self.locator)
            .field("commands", &self.commands)
            .field("bindings", &self.bindings.len())
            .field("init_error", &self.init_error)
            .finish()
    }
}

/// Cog information for listing
#[derive(Debug, Clone, Serialize)]
pub struct CogInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub commands: usize,
    pub events: usize,
    pub degraded: bool,
    pub loaded_at: DateTime<Utc>,
}

/// Outcome of startup discovery
#[derive(Debug, Default, Clone, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl LoadReport {
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

#[derive(Default)]
struct RegistryState {
    cogs: HashMap<String, Arc<LoadedCog>>,
    order: Vec<String>,
    commands: CommandIndex,
}

/// Single source of truth for what is loaded.
///
/// Readers get `Arc<LoadedCog>` snapshots; an entry and its command names are
/// published and withdrawn under one write lock. Lifecycle operations on the
/// same id are serialized.
pub struct CogRegistry {
    source: Arc<dyn CogSource>,
    binder: HandlerBinder,
    host: HostContext,
    state: RwLock<RegistryState>,
    op_locks: OpLocks,
}

type OpLocks = Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>;

/// Held for the duration of one lifecycle operation on a cog id
struct OpGuard<'a> {
    locks: &'a OpLocks,
    id: String,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map's own reference left: nobody holds or waits on this id
        if locks.get(&self.id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&self.id);
        }
    }
}

impl CogRegistry {
    pub fn new(source: Arc<dyn CogSource>, bus: Arc<dyn EventBus>, host: HostContext) -> Self {
        Self {
            source,
            binder: HandlerBinder::new(bus),
            host,
            state: RwLock::new(RegistryState::default()),
            op_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    pub fn binder(&self) -> &HandlerBinder {
        &self.binder
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serialize lifecycle operations on `id`. The lock entry is dropped with the last holder.
    async fn op_lock(&self, id: &str) -> OpGuard<'_> {
        let lock = {
            let mut locks = self.op_locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(id.to_string()).or_default().clone()
        };
        OpGuard {
            locks: &self.op_locks,
            id: id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn op_lock_count(&self) -> usize {
        self.op_locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Discover every cog location and load each one. One bad cog never stops the rest.
    pub async fn discover_and_load_all(&self) -> LoadReport {
        let mut report = LoadReport::default();

        let locators = match self.source.discover().await {
            Ok(locators) => locators,
            Err(e) => {
                error!("Failed to discover cogs: {}", e);
                report.failed.push(("<discovery>".to_string(), e.to_string()));
                return report;
            }
        };
        info!("Found {} cog locations", locators.len());

        for locator in locators {
            match self.load(&locator).await {
                Ok(entry) => report.loaded.push(entry.id().to_string()),
                Err(e) if e.is_skip() => report.skipped.push(locator.to_string()),
                Err(e) => report.failed.push((locator.to_string(), e.to_string())),
            }
        }

        info!(
            "Cog registry initialized with {} cogs ({} skipped, {} failed)",
            self.len(),
            report.skipped_count(),
            report.failed_count()
        );
        report
    }

    /// Load the cog at `locator`. Only structural problems fail; bad event or
    /// command specs and a failing init hook are logged and skipped.
    pub async fn load(&self, locator: &CogLocator) -> Result<Arc<LoadedCog>, LoadError> {
        let derived = locator
            .derived_id()
            .ok_or_else(|| LoadError::NotFound(locator.to_string()))?;
        let _guard = self.op_lock(&derived).await;

        let result = self.load_locked(locator, &derived).await;
        if let Err(e) = &result {
            if e.is_skip() {
                warn!("Failed to load cog at {}: {}", locator, e);
            } else {
                error!("Failed to load cog at {}: {}", locator, e);
            }
        }
        result
    }

    /// Load a cog by id, looking its locator up through discovery
    pub async fn load_id(&self, id: &str) -> Result<Arc<LoadedCog>, LoadError> {
        let locator = self
            .source
            .discover()
            .await?
            .into_iter()
            .find(|l| l.derived_id().as_deref() == Some(id))
            .ok_or_else(|| LoadError::NotFound(id.to_string()))?;
        self.load(&locator).await
    }

    async fn load_locked(&self, locator: &CogLocator, derived: &str) -> Result<Arc<LoadedCog>, LoadError> {
        if self.is_loaded(derived) {
            return Err(LoadError::AlreadyLoaded(derived.to_string()));
        }

        let ResolvedCog { descriptor, library } = self.source.resolve(locator).await?;
        descriptor.validate(&locator.to_string())?;

        let id = descriptor.id.clone();
        if id != derived {
            warn!("Cog at {} declares id '{}', registering under the declared id", locator, id);
            if self.is_loaded(&id) {
                return Err(LoadError::AlreadyLoaded(id));
            }
        }

        let context = CogContext {
            cog_id: id.clone(),
            host: self.host.clone(),
            state: Arc::new(CogState::new()),
        };

        let init_error = match &descriptor.init {
            Some(init) => match init.init(&context).await {
                Ok(()) => None,
                Err(e) => {
                    warn!("Failed to initialize cog {}: {}", id, e);
                    Some(e.to_string())
                }
            },
            None => None,
        };

        let mut bindings = Vec::new();
        for spec in &descriptor.events {
            let handler = match &spec.handler {
                Some(handler) if !spec.name.is_empty() => handler.clone(),
                _ => {
                    warn!("Invalid event in cog {}: missing name or handler", id);
                    continue;
                }
            };
            bindings.push(self.binder.bind(&spec.name, handler, &context, library.clone()));
        }

        let entry = {
            let mut state = self.write_state();
            if state.cogs.contains_key(&id) {
                drop(state);
                for binding in &bindings {
                    self.binder.unbind(binding);
                }
                return Err(LoadError::AlreadyLoaded(id));
            }

            let mut commands: Vec<String> = Vec::new();
            for spec in &descriptor.commands {
                if let Some(reason) = spec.invalid_reason() {
                    warn!("Invalid command '{}' in cog {}: {}", spec.name, id, reason);
                    continue;
                }
                if commands.contains(&spec.name) {
                    warn!("Duplicate command '{}' in cog {}, keeping the first", spec.name, id);
                    continue;
                }
                if !state.commands.register(&spec.name, &id) {
                    let owner = state.commands.resolve_owner(&spec.name).unwrap_or("unknown");
                    warn!(
                        "Command '{}' from cog {} collides with cog {}, skipping",
                        spec.name, id, owner
                    );
                    continue;
                }
                commands.push(spec.name.clone());
            }

            let entry = Arc::new(LoadedCog {
                descriptor,
                locator: locator.clone(),
                context,
                bindings,
                commands,
                init_error,
                loaded_at: Utc::now(),
                _library: library,
            });
            state.cogs.insert(id.clone(), entry.clone());
            state.order.push(id.clone());
            entry
        };

        info!(
            "Loaded cog: {} ({} commands, {} events{})",
            id,
            entry.commands.len(),
            entry.bindings.len(),
            if entry.is_degraded() { ", degraded" } else { "" }
        );
        Ok(entry)
    }

    /// Unload a cog: unbind its handlers, purge cached code, withdraw its commands and entry
    pub async fn unload(&self, id: &str) -> Result<(), UnloadError> {
        let _guard = self.op_lock(id).await;
        self.unload_locked(id)
    }

    fn unload_locked(&self, id: &str) -> Result<(), UnloadError> {
        let entry = match self.get(id) {
            Some(entry) => entry,
            None => {
                warn!("Cog {} not found for unloading", id);
                return Err(UnloadError::NotLoaded(id.to_string()));
            }
        };

        for binding in &entry.bindings {
            self.binder.unbind(binding);
        }

        match self.source.purge(&entry.locator) {
            Ok(()) => debug!("Purged cached code for cog {}", id),
            Err(PurgeError::Unsupported) => debug!("Code cache purge unsupported for cog {}", id),
            Err(e) => warn!("Failed to purge cached code for cog {}: {}", id, e),
        }

        {
            let mut state = self.write_state();
            let removed = state.commands.unregister_all_owned_by(id);
            debug!("Removed {} commands owned by {}", removed, id);
            state.cogs.remove(id);
            state.order.retain(|c| c != id);
        }

        info!("Unloaded cog: {}", id);
        Ok(())
    }

    /// Unload then load from the stored locator. No rollback if the load fails.
    pub async fn reload(&self, id: &str) -> Result<Arc<LoadedCog>, ReloadError> {
        let _guard = self.op_lock(id).await;

        let locator = match self.get(id) {
            Some(entry) => entry.locator.clone(),
            None => return Err(ReloadError::NotLoaded(id.to_string())),
        };
        self.unload_locked(id)
            .map_err(|_| ReloadError::NotLoaded(id.to_string()))?;

        let derived = locator.derived_id().unwrap_or_else(|| id.to_string());
        match self.load_locked(&locator, &derived).await {
            Ok(entry) => {
                info!("Reloaded cog: {}", id);
                Ok(entry)
            }
            Err(source) => {
                error!("Failed to reload cog {}: {}, it stays unloaded", id, source);
                Err(ReloadError::Load {
                    id: id.to_string(),
                    source,
                })
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<LoadedCog>> {
        self.read_state().cogs.get(id).cloned()
    }

    /// Loaded ids in load order
    pub fn list_ids(&self) -> Vec<String> {
        self.read_state().order.clone()
    }

    pub fn is_loaded(&self, id: &str) -> bool {
        self.read_state().cogs.contains_key(id)
    }

    /// The loaded cog owning a command name
    pub fn resolve_command(&self, name: &str) -> Option<Arc<LoadedCog>> {
        let state = self.read_state();
        let owner = state.commands.resolve_owner(name)?;
        state.cogs.get(owner).cloned()
    }

    pub fn cogs_info(&self) -> Vec<CogInfo> {
        let state = self.read_state();
        state
            .order
            .iter()
            .filter_map(|id| state.cogs.get(id))
            .map(|entry| entry.info())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read_state().cogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
