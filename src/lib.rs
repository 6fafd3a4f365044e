//! # Seine Plugin System
//!
//! The plugin and hook dispatch core of the Seine event engine. Plugins
//! extend the engine's processing pipeline without the engine needing
//! compile-time knowledge of them.
//!
//! ## Features
//!
//! - **Hook System**: Intercept input-file loading, script function calls,
//!   and event queuing; observe queue drains, clock updates, and object
//!   destruction
//! - **Priority Dispatch**: Deterministic, priority-ordered execution when
//!   several plugins subscribe to the same extension point
//! - **Meta Hooks**: An observability layer that wraps every hook point,
//!   whether or not any plugin implements it
//! - **Components**: Plugins contribute named capabilities (analyzers, log
//!   writers, ...) to engine subsystems
//! - **Two-Phase Init**: Pre-script and post-script initialization with an
//!   input-file loading window in between
//!
//! ## Example
//!
//! ```rust,ignore
//! use seine_plugins::{Configuration, ManagerConfig, Plugin, PluginManager};
//!
//! struct Greeter;
//!
//! impl Plugin for Greeter {
//!     fn configure(&mut self) -> Configuration {
//!         Configuration::new("Seine::Greeter", "Says hello").with_version(1, 0)
//!     }
//! }
//!
//! fn main() -> seine_plugins::Result<()> {
//!     let mut manager = PluginManager::new(ManagerConfig::default());
//!     manager.register(Box::new(Greeter))?;
//!     manager.init_pre_script_all();
//!     manager.init_post_script_all();
//!     println!("{}", manager.describe_plugins(true));
//!     manager.finish_all();
//!     Ok(())
//! }
//! ```

pub mod component;
pub mod config;
pub mod error;
pub mod hooks;
pub mod manager;
pub mod plugin;
pub mod script;

// Re-exports for convenience
pub use component::{Component, ComponentKind};
pub use config::ManagerConfig;
pub use error::{PluginError, Result};

// Hook system re-exports
pub use hooks::{
    DEFAULT_HOOK_PRIORITY, EventDisposition, FuncResult, HookArgument, HookArgumentList,
    HookBinding, HookRegistry, HookType, LoadFileOutcome, LoadFileResolution,
};

pub use manager::{FileLoadRequest, Phase, PluginContext, PluginManager};
pub use plugin::{Configuration, Plugin, PluginEntry, PluginStats, VersionNumber};
pub use script::{Event, Frame, Func, ObjToken, ScriptItem, ScriptItemKind, Val, ValList};

/// Plugin system version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// API compatibility version. A plugin is stamped with this value when its
/// [`Configuration`] is built; the manager refuses plugins whose stamp does
/// not match the version the host was configured with.
pub const PLUGIN_API_VERSION: u32 = 2;
