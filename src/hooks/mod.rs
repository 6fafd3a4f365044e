//! Hook types, arguments, registry, and the dispatch protocol.

pub mod args;
pub mod dispatcher;
pub mod registry;
pub mod types;

pub use args::{HookArgument, HookArgumentList};
pub use registry::{HookBinding, HookRegistry};
pub use types::{
    DEFAULT_HOOK_PRIORITY, EventDisposition, FuncResult, HookType, LoadFileOutcome,
    LoadFileResolution,
};
