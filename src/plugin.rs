//! Core plugin types and the plugin trait.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::PLUGIN_API_VERSION;
use crate::component::Component;
use crate::hooks::args::{HookArgument, HookArgumentList};
use crate::hooks::types::{EventDisposition, FuncResult, HookType, LoadFileOutcome};
use crate::manager::PluginContext;
use crate::script::{Event, Frame, Func, ObjToken, ScriptItem, ScriptItemKind, ValList};

/// A plugin's two-component version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionNumber {
    pub major: i32,
    pub minor: i32,
}

impl VersionNumber {
    /// Create a set version.
    pub fn new(major: i32, minor: i32) -> Self {
        Self { major, minor }
    }

    /// The unset version. Statically linked plugins usually leave their
    /// version unset.
    pub fn unset() -> Self {
        Self {
            major: -1,
            minor: -1,
        }
    }

    /// True if both components are non-negative.
    pub fn is_set(&self) -> bool {
        self.major >= 0 && self.minor >= 0
    }
}

impl Default for VersionNumber {
    fn default() -> Self {
        Self::unset()
    }
}

impl std::fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_set() {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "unset")
        }
    }
}

/// A plugin's static configuration, produced once by its
/// [`configure`](Plugin::configure) factory.
///
/// Building the configuration stamps it with the crate's
/// [`PLUGIN_API_VERSION`], so a plugin compiled against another release
/// carries that release's value and fails the manager's compatibility
/// check. The stamp never comes from data, so the type only serializes.
#[derive(Debug, Clone, Serialize)]
pub struct Configuration {
    /// The plugin's namespaced name (e.g. `Seine::Rpc`). Mandatory and
    /// unique per manager.
    pub name: String,
    /// A short textual description.
    pub description: String,
    /// The plugin's version. Optional; meaningful mostly for dynamically
    /// loaded plugins.
    pub version: VersionNumber,
    api_version: u32,
}

impl Configuration {
    /// Create a configuration with an unset version.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            version: VersionNumber::unset(),
            api_version: PLUGIN_API_VERSION,
        }
    }

    /// Set the plugin version.
    pub fn with_version(mut self, major: i32, minor: i32) -> Self {
        self.version = VersionNumber::new(major, minor);
        self
    }

    /// The API version this configuration was stamped with.
    pub fn api_version(&self) -> u32 {
        self.api_version
    }
}

/// Trait for plugin implementations.
///
/// A plugin extends one or more of the engine's subsystems: it may
/// contribute components, declare script-level items, and subscribe to
/// hooks into the engine's processing. Every hook method has a default
/// "not handled" / no-op body; a plugin overrides only the hooks it
/// enabled through its initialization context.
pub trait Plugin: Send {
    /// Produce the plugin's static configuration. Called exactly once by
    /// the manager, before anything else.
    fn configure(&mut self) -> Configuration;

    /// First-stage initialization, before any script is parsed. This is
    /// the documented place to enable hooks, add components, and declare
    /// script items.
    fn init_pre_script(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// Second-stage initialization, after scripts are parsed.
    fn init_post_script(&mut self, _ctx: &mut PluginContext<'_>) {}

    /// Shutdown notification. Release anything not owned through the
    /// component list.
    fn done(&mut self) {}

    /// Offered once for each input file the engine is about to load,
    /// between pre- and post-script initialization. Returning a claiming
    /// outcome stops the chain and suppresses default loading.
    fn hook_load_file(&mut self, _file: &str, _ext: &str) -> LoadFileOutcome {
        LoadFileOutcome::NotInterested
    }

    /// Offered whenever the interpreter is about to execute a script
    /// function. Returning [`FuncResult::Handled`] replaces the call; the
    /// returned value is owned by the receiver and must match the
    /// function's declared return type. `args` may be modified in place.
    fn hook_call_function(
        &mut self,
        _func: &Func,
        _frame: &Frame,
        _args: &mut ValList,
    ) -> FuncResult {
        FuncResult::Unhandled
    }

    /// Offered whenever the interpreter is about to queue an event.
    /// Claiming keeps the event; declining hands it back, possibly
    /// modified.
    fn hook_queue_event(&mut self, event: Event) -> EventDisposition {
        EventDisposition::Declined(event)
    }

    /// Called whenever the event manager drains its queue.
    fn hook_drain_events(&mut self) {}

    /// Called whenever network time advances.
    fn hook_update_network_time(&mut self, _network_time: f64) {}

    /// Called when an object registered through
    /// [`PluginContext::request_obj_dtor`] is destroyed. The token refers
    /// to an object that is already gone; use it for identity comparison
    /// only.
    fn hook_obj_dtor(&mut self, _obj: ObjToken) {}

    /// Called just before a hook point is evaluated, independent of
    /// whether any plugin implements the hook itself.
    fn meta_hook_pre(&mut self, _hook: HookType, _args: &HookArgumentList<'_>) {}

    /// Called just after a hook point was evaluated, with the effective
    /// result. The result is [`HookArgument::Void`] for hooks without a
    /// result and for unhandled points.
    fn meta_hook_post(
        &mut self,
        _hook: HookType,
        _args: &HookArgumentList<'_>,
        _result: &HookArgument<'_>,
    ) {
    }
}

/// Per-plugin usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginStats {
    /// Number of hook method invocations.
    pub hooks_invoked: u64,
    /// Number of meta-hook invocations.
    pub meta_hooks_invoked: u64,
    /// Function calls this plugin replaced.
    pub calls_intercepted: u64,
    /// Events this plugin claimed.
    pub events_claimed: u64,
    /// Input files this plugin claimed.
    pub files_claimed: u64,
    /// Last hook activity timestamp.
    pub last_activity: Option<DateTime<Utc>>,
}

impl PluginStats {
    pub(crate) fn record_hook(&mut self) {
        self.hooks_invoked += 1;
        self.last_activity = Some(Utc::now());
    }

    pub(crate) fn record_meta(&mut self) {
        self.meta_hooks_invoked += 1;
        self.last_activity = Some(Utc::now());
    }
}

/// The manager's bookkeeping for one registered plugin: identity, loading
/// origin, owned components, declared script items, stats, and the
/// startup hook snapshot. Read-only to everything outside the manager.
pub struct PluginEntry {
    config: Configuration,
    dynamic: bool,
    directory: Option<PathBuf>,
    sopath: Option<PathBuf>,
    components: Vec<Arc<dyn Component>>,
    items: Vec<ScriptItem>,
    items_ready: bool,
    startup_hooks: Option<Vec<(HookType, i32)>>,
    stats: PluginStats,
}

impl PluginEntry {
    pub(crate) fn new(config: Configuration) -> Self {
        Self {
            config,
            dynamic: false,
            directory: None,
            sopath: None,
            components: Vec::new(),
            items: Vec::new(),
            items_ready: false,
            startup_hooks: None,
            stats: PluginStats::default(),
        }
    }

    /// The plugin's namespaced name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// The plugin's description.
    pub fn description(&self) -> &str {
        &self.config.description
    }

    /// The plugin's version.
    pub fn version(&self) -> VersionNumber {
        self.config.version
    }

    /// The API version the plugin was stamped with.
    pub fn api_version(&self) -> u32 {
        self.config.api_version()
    }

    /// True if the plugin was loaded from a shared object.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    /// For dynamic plugins, the base directory it was loaded from.
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// For dynamic plugins, the full path to the shared object.
    pub fn path(&self) -> Option<&Path> {
        self.sopath.as_deref()
    }

    /// Shared handles to the registered components. The plugin keeps
    /// exclusive ownership of the set itself.
    pub fn components(&self) -> Vec<Arc<dyn Component>> {
        self.components.clone()
    }

    /// The declared script items. Only valid once pre-script
    /// initialization has run; querying earlier is a usage-contract
    /// violation.
    pub fn script_items(&self) -> &[ScriptItem] {
        debug_assert!(
            self.items_ready,
            "script items of '{}' queried before pre-script initialization",
            self.config.name
        );
        &self.items
    }

    /// Usage statistics.
    pub fn stats(&self) -> &PluginStats {
        &self.stats
    }

    /// The hook configuration captured when startup completed. Later
    /// registry changes are not reflected here.
    pub fn startup_hooks(&self) -> &[(HookType, i32)] {
        self.startup_hooks.as_deref().unwrap_or(&[])
    }

    /// Render the plugin for diagnostics: identity, and with `verbose`
    /// also components, script items, and the startup hook configuration.
    pub fn describe(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = write!(out, "{} - {}", self.name(), self.description());
        if self.config.version.is_set() {
            let _ = write!(out, " (version {})", self.config.version);
        }
        if self.dynamic {
            match &self.sopath {
                Some(path) => {
                    let _ = write!(out, " (dynamic, from {})", path.display());
                }
                None => out.push_str(" (dynamic)"),
            }
        } else {
            out.push_str(" (built-in)");
        }
        if verbose {
            for component in &self.components {
                let _ = write!(out, "\n    {}", component.describe());
            }
            for item in &self.items {
                let _ = write!(out, "\n    {item}");
            }
            for (hook, priority) in self.startup_hooks() {
                let _ = write!(out, "\n    [hook] {hook} (priority {priority})");
            }
        }
        out
    }

    pub(crate) fn mark_dynamic(&mut self, directory: PathBuf, sopath: PathBuf) {
        debug_assert!(
            !self.dynamic,
            "loading origin of '{}' stamped twice",
            self.config.name
        );
        self.dynamic = true;
        self.directory = Some(directory);
        self.sopath = Some(sopath);
    }

    pub(crate) fn add_component(&mut self, component: Box<dyn Component>) {
        self.components.push(Arc::from(component));
    }

    pub(crate) fn add_script_item(&mut self, id: String, kind: ScriptItemKind) {
        // Append-only; duplicate declarations are kept as-is.
        self.items.push(ScriptItem::new(id, kind));
    }

    pub(crate) fn set_items_ready(&mut self) {
        self.items_ready = true;
    }

    pub(crate) fn snapshot_hooks(&mut self, hooks: Vec<(HookType, i32)>) {
        self.startup_hooks = Some(hooks);
    }

    pub(crate) fn stats_mut(&mut self) -> &mut PluginStats {
        &mut self.stats
    }
}
