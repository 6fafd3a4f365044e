//! Plugin manager - the main interface for the plugin system.
//!
//! The manager owns every registered plugin together with the hook
//! registry, drives the two-phase initialization, and carries the host
//! bookkeeping the dispatcher consults: pending input-file requests, event
//! interest, and object-destruction interest.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::component::Component;
use crate::config::ManagerConfig;
use crate::error::{PluginError, Result};
use crate::hooks::registry::HookRegistry;
use crate::hooks::types::HookType;
use crate::plugin::{Plugin, PluginEntry, PluginStats};
use crate::script::{ObjToken, ScriptItemKind};

/// Lifecycle phase of the plugin system as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Plugins may be registered; nothing is initialized yet.
    Registration,
    /// Pre-script initialization ran; input files are being loaded.
    ScriptLoading,
    /// Post-script initialization ran; normal processing.
    Running,
    /// Shutdown complete.
    Terminated,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registration => write!(f, "registration"),
            Self::ScriptLoading => write!(f, "script_loading"),
            Self::Running => write!(f, "running"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// A plugin's request to load an additional input file, queued for the
/// interpreter to drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileLoadRequest {
    /// Requesting plugin's name.
    pub plugin: String,
    /// File to load, searched along the host's standard paths.
    pub file: String,
}

pub(crate) struct PluginSlot {
    pub(crate) entry: PluginEntry,
    pub(crate) instance: Box<dyn Plugin>,
}

/// The registration surface handed to a plugin during its initialization
/// phases.
///
/// This is the only route to the shared hook registry and the host's
/// interest bookkeeping, so all of that mutation is confined to the init
/// phases by construction. In particular, an input-file request cannot be
/// made after post-script initialization because no context exists then.
pub struct PluginContext<'a> {
    entry: &'a mut PluginEntry,
    registry: &'a mut HookRegistry,
    file_requests: &'a mut Vec<FileLoadRequest>,
    requested_events: &'a mut HashSet<String>,
    requested_dtors: &'a mut HashSet<ObjToken>,
}

impl PluginContext<'_> {
    /// The initializing plugin's name.
    pub fn name(&self) -> &str {
        self.entry.name()
    }

    /// Subscribe this plugin to a hook. Hooks on the processing path
    /// trigger frequently; enable only what the plugin implements.
    pub fn enable_hook(&mut self, hook: HookType, priority: i32) {
        self.registry.enable(self.entry.name(), hook, priority);
    }

    /// Remove this plugin's subscription to a hook.
    pub fn disable_hook(&mut self, hook: HookType) {
        self.registry.disable(self.entry.name(), hook);
    }

    /// Snapshot of this plugin's current `(hook, priority)` subscriptions.
    pub fn enabled_hooks(&self) -> Vec<(HookType, i32)> {
        self.registry.enabled_for(self.entry.name())
    }

    /// Register a component. The plugin takes exclusive ownership.
    pub fn add_component(&mut self, component: Box<dyn Component>) {
        self.entry.add_component(component);
    }

    /// Declare a script-level item this plugin provides. Informational
    /// only; the plugin still registers the item with the interpreter
    /// itself. Duplicate declarations are kept, not merged.
    pub fn add_script_item(&mut self, id: impl Into<String>, kind: ScriptItemKind) {
        self.entry.add_script_item(id.into(), kind);
    }

    /// Register interest in an event so the host raises it for this
    /// plugin's queue-event hook even when no script handler exists.
    pub fn request_event(&mut self, handler: impl Into<String>) {
        self.requested_events.insert(handler.into());
    }

    /// Register interest in an object's destruction. The object-destroy
    /// hook will fire when the object runtime tears it down.
    pub fn request_obj_dtor(&mut self, obj: ObjToken) {
        self.requested_dtors.insert(obj);
    }

    /// Queue an additional input file for the host to load, as if it had
    /// been given on the command line. The file may only be queued for
    /// now and loaded later.
    pub fn load_file(&mut self, file: impl Into<String>) -> Result<()> {
        let file = file.into();
        if file.is_empty() {
            return Err(PluginError::load_request_rejected(self.entry.name(), file));
        }
        debug!(plugin = %self.entry.name(), file = %file, "queued input file");
        self.file_requests.push(FileLoadRequest {
            plugin: self.entry.name().to_string(),
            file,
        });
        Ok(())
    }
}

/// Plugin manager - the main entry point for the plugin system.
///
/// The manager handles:
/// - Plugin registration and compatibility validation
/// - The two-phase initialization and shutdown lifecycle
/// - Hook subscription bookkeeping and dispatch
/// - Host-facing interest queries (file requests, events, destructors)
pub struct PluginManager {
    config: ManagerConfig,
    pub(crate) slots: Vec<PluginSlot>,
    index: HashMap<String, usize>,
    pub(crate) registry: HookRegistry,
    phase: Phase,
    file_requests: Vec<FileLoadRequest>,
    requested_events: HashSet<String>,
    requested_dtors: HashSet<ObjToken>,
}

impl PluginManager {
    /// Create a new plugin manager.
    pub fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            index: HashMap::new(),
            registry: HookRegistry::new(),
            phase: Phase::Registration,
            file_requests: Vec::new(),
            requested_events: HashSet::new(),
            requested_dtors: HashSet::new(),
        }
    }

    // ========== Registration ==========

    /// Register a plugin: query its configuration, validate it, and take
    /// ownership. Fails if registration is already closed, the name is
    /// missing or taken, the plugin is disabled by configuration, or its
    /// API version does not match the host's.
    pub fn register(&mut self, mut plugin: Box<dyn Plugin>) -> Result<()> {
        if self.phase != Phase::Registration {
            return Err(PluginError::RegistrationClosed);
        }

        let config = plugin.configure();

        if config.name.is_empty() {
            return Err(PluginError::MissingName);
        }

        if config.api_version() != self.config.api_version {
            error!(
                plugin = %config.name,
                expected = self.config.api_version,
                found = config.api_version(),
                "refusing plugin with mismatching API version"
            );
            return Err(PluginError::api_version_mismatch(
                config.name.clone(),
                self.config.api_version,
                config.api_version(),
            ));
        }

        if !self.config.is_plugin_enabled(&config.name) {
            debug!(plugin = %config.name, "plugin is disabled, skipping");
            return Err(PluginError::Disabled(config.name));
        }

        if self.index.contains_key(&config.name) {
            return Err(PluginError::AlreadyRegistered(config.name));
        }

        info!(plugin = %config.name, version = %config.version, "registered plugin");
        self.index.insert(config.name.clone(), self.slots.len());
        self.slots.push(PluginSlot {
            entry: PluginEntry::new(config),
            instance: plugin,
        });
        Ok(())
    }

    /// Stamp a registered plugin as dynamically loaded, recording the base
    /// directory and shared-object path the loader found it at. Called by
    /// the loader exactly once per dynamic plugin, before initialization.
    pub fn mark_dynamic(
        &mut self,
        name: &str,
        directory: impl Into<PathBuf>,
        sopath: impl Into<PathBuf>,
    ) -> Result<()> {
        debug_assert!(
            self.phase == Phase::Registration,
            "loading origin stamped after initialization"
        );
        let i = *self
            .index
            .get(name)
            .ok_or_else(|| PluginError::NotFound(name.to_string()))?;
        self.slots[i].entry.mark_dynamic(directory.into(), sopath.into());
        Ok(())
    }

    // ========== Lifecycle ==========

    /// Run every plugin's pre-script initialization, in registration
    /// order. Moves the system into the script-loading phase.
    pub fn init_pre_script_all(&mut self) {
        debug_assert!(
            self.phase == Phase::Registration,
            "pre-script initialization ran twice"
        );
        self.phase = Phase::ScriptLoading;

        let PluginManager {
            slots,
            registry,
            file_requests,
            requested_events,
            requested_dtors,
            ..
        } = self;
        for slot in slots.iter_mut() {
            let PluginSlot { entry, instance } = slot;
            let mut ctx = PluginContext {
                entry: &mut *entry,
                registry: &mut *registry,
                file_requests: &mut *file_requests,
                requested_events: &mut *requested_events,
                requested_dtors: &mut *requested_dtors,
            };
            instance.init_pre_script(&mut ctx);
            entry.set_items_ready();
        }
        debug!("pre-script initialization complete");
    }

    /// Run every plugin's post-script initialization, then capture the
    /// startup hook snapshot. Moves the system into the running phase.
    pub fn init_post_script_all(&mut self) {
        debug_assert!(
            self.phase == Phase::ScriptLoading,
            "post-script initialization out of order"
        );

        let PluginManager {
            slots,
            registry,
            file_requests,
            requested_events,
            requested_dtors,
            ..
        } = self;
        for slot in slots.iter_mut() {
            let PluginSlot { entry, instance } = slot;
            let mut ctx = PluginContext {
                entry: &mut *entry,
                registry: &mut *registry,
                file_requests: &mut *file_requests,
                requested_events: &mut *requested_events,
                requested_dtors: &mut *requested_dtors,
            };
            instance.init_post_script(&mut ctx);
        }

        // The hook configuration printed for operators is the one in
        // effect at startup; later registry changes are not reflected.
        for slot in slots.iter_mut() {
            let hooks = registry.enabled_for(slot.entry.name());
            slot.entry.snapshot_hooks(hooks);
        }

        self.phase = Phase::Running;
        info!(plugins = self.slots.len(), "plugin startup complete");
    }

    /// Run every plugin's shutdown hook and close the system down.
    pub fn finish_all(&mut self) {
        debug_assert!(self.phase == Phase::Running, "shutdown out of order");
        for slot in self.slots.iter_mut() {
            slot.instance.done();
        }
        self.phase = Phase::Terminated;
        debug!("plugins finished");
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    // ========== Plugin access ==========

    /// Number of registered plugins.
    pub fn plugin_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over all plugin entries, in registration order.
    pub fn plugins(&self) -> impl Iterator<Item = &PluginEntry> {
        self.slots.iter().map(|slot| &slot.entry)
    }

    /// Look up a plugin entry by name.
    pub fn plugin(&self, name: &str) -> Option<&PluginEntry> {
        self.index.get(name).map(|&i| &self.slots[i].entry)
    }

    /// Usage statistics for a plugin.
    pub fn stats(&self, name: &str) -> Option<&PluginStats> {
        self.plugin(name).map(PluginEntry::stats)
    }

    /// A plugin's current `(hook, priority)` subscriptions.
    pub fn enabled_hooks(&self, name: &str) -> Vec<(HookType, i32)> {
        self.registry.enabled_for(name)
    }

    /// The shared hook registry, for host introspection.
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Render all plugins for diagnostics, sorted by name.
    pub fn describe_plugins(&self, verbose: bool) -> String {
        let mut entries: Vec<&PluginEntry> = self.plugins().collect();
        entries.sort_by(|a, b| a.name().cmp(b.name()));
        entries
            .iter()
            .map(|entry| entry.describe(verbose))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ========== Host bookkeeping ==========

    /// Drain the pending input-file requests plugins have queued. Called
    /// by the interpreter.
    pub fn take_file_load_requests(&mut self) -> Vec<FileLoadRequest> {
        std::mem::take(&mut self.file_requests)
    }

    /// Whether any plugin asked for an event to be raised even without a
    /// script handler for it.
    pub fn wants_event(&self, handler: &str) -> bool {
        self.requested_events.contains(handler)
    }

    /// Whether any plugin registered interest in an object's destruction.
    pub fn wants_obj_destroy(&self, token: ObjToken) -> bool {
        self.requested_dtors.contains(&token)
    }

    // ========== Dispatcher internals ==========

    pub(crate) fn enabled_order(&self, hook: HookType) -> Vec<String> {
        self.registry
            .bindings(hook)
            .iter()
            .map(|b| b.plugin.clone())
            .collect()
    }

    pub(crate) fn slot_mut(&mut self, name: &str) -> Option<&mut PluginSlot> {
        self.index.get(name).map(|&i| &mut self.slots[i])
    }

    pub(crate) fn forget_obj_dtor(&mut self, token: ObjToken) {
        self.requested_dtors.remove(&token);
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Configuration;

    struct Bare(&'static str);

    impl Plugin for Bare {
        fn configure(&mut self) -> Configuration {
            Configuration::new(self.0, "bare test plugin")
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut manager = PluginManager::default();
        manager.register(Box::new(Bare("Seine::A"))).unwrap();

        assert_eq!(manager.plugin_count(), 1);
        assert!(manager.plugin("Seine::A").is_some());
        assert!(manager.plugin("Seine::B").is_none());
    }

    #[test]
    fn test_register_duplicate() {
        let mut manager = PluginManager::default();
        manager.register(Box::new(Bare("Seine::A"))).unwrap();

        let err = manager.register(Box::new(Bare("Seine::A"))).unwrap_err();
        assert!(matches!(err, PluginError::AlreadyRegistered(_)));
    }

    #[test]
    fn test_phases() {
        let mut manager = PluginManager::default();
        assert_eq!(manager.phase(), Phase::Registration);

        manager.init_pre_script_all();
        assert_eq!(manager.phase(), Phase::ScriptLoading);

        manager.init_post_script_all();
        assert_eq!(manager.phase(), Phase::Running);

        manager.finish_all();
        assert_eq!(manager.phase(), Phase::Terminated);
    }

    #[test]
    fn test_register_after_init_is_closed() {
        let mut manager = PluginManager::default();
        manager.init_pre_script_all();

        let err = manager.register(Box::new(Bare("Seine::Late"))).unwrap_err();
        assert!(matches!(err, PluginError::RegistrationClosed));
    }
}
