//! Core hook types and result encodings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::script::{Event, Val};

/// Default priority used when a plugin does not care about ordering.
pub const DEFAULT_HOOK_PRIORITY: i32 = 0;

/// The extension points a plugin may subscribe to.
///
/// The set is closed and versioned together with
/// [`PLUGIN_API_VERSION`](crate::PLUGIN_API_VERSION).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookType {
    /// Intercept loading of an input file.
    LoadFile,
    /// Intercept execution of a script-level function call.
    CallFunction,
    /// Intercept queuing of an event.
    QueueEvent,
    /// Observe event queue drains.
    DrainEvents,
    /// Observe network clock advances.
    UpdateNetworkTime,
    /// Observe destruction of registered objects.
    ObjDestroy,
    /// Observe every hook point just before it is evaluated.
    MetaPre,
    /// Observe every hook point just after it is evaluated.
    MetaPost,
}

impl HookType {
    /// All hook types, in declaration order.
    pub const ALL: [HookType; 8] = [
        Self::LoadFile,
        Self::CallFunction,
        Self::QueueEvent,
        Self::DrainEvents,
        Self::UpdateNetworkTime,
        Self::ObjDestroy,
        Self::MetaPre,
        Self::MetaPost,
    ];

    /// Readable hook name.
    pub fn name(self) -> &'static str {
        match self {
            Self::LoadFile => "load_file",
            Self::CallFunction => "call_function",
            Self::QueueEvent => "queue_event",
            Self::DrainEvents => "drain_events",
            Self::UpdateNetworkTime => "update_network_time",
            Self::ObjDestroy => "obj_destroy",
            Self::MetaPre => "meta_pre",
            Self::MetaPost => "meta_post",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single plugin's answer to being offered an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFileOutcome {
    /// The plugin took over the file and loaded it successfully.
    Loaded,
    /// The plugin took over the file but failed to load it. The host
    /// treats this as fatal for the file; the plugin is expected to have
    /// surfaced a diagnostic already.
    Failed,
    /// The plugin is not interested; offer the file to the next one.
    NotInterested,
}

impl LoadFileOutcome {
    /// Integer code carried in the meta-hook result argument.
    pub fn code(self) -> i64 {
        match self {
            Self::Loaded => 1,
            Self::Failed => 0,
            Self::NotInterested => -1,
        }
    }

    /// Whether this outcome stops the dispatch chain.
    pub fn is_claiming(self) -> bool {
        !matches!(self, Self::NotInterested)
    }
}

/// Result of offering a function call to plugins.
///
/// `Handled` carries the owned return value; receiving it transfers
/// responsibility for the value to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FuncResult {
    /// No plugin replaced the call; the interpreter executes it normally.
    #[default]
    Unhandled,
    /// A plugin replaced the call and produced this return value.
    Handled(Val),
}

impl FuncResult {
    /// The not-handled result.
    pub fn unhandled() -> Self {
        Self::Unhandled
    }

    /// A handled result carrying the replacement return value.
    pub fn handled(value: Val) -> Self {
        Self::Handled(value)
    }

    /// Whether a plugin replaced the call.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    /// Consume the result, yielding the replacement value if handled.
    pub fn into_value(self) -> Option<Val> {
        match self {
            Self::Handled(value) => Some(value),
            Self::Unhandled => None,
        }
    }
}

/// A single plugin's answer to being offered a queued event.
///
/// Claiming keeps the event: ownership stays with the plugin and the host
/// must not queue it. Declining returns the event, possibly modified in
/// place, for the next plugin or the host queue.
#[derive(Debug)]
pub enum EventDisposition {
    /// The plugin took ownership of the event.
    Claimed,
    /// The plugin passed on the event.
    Declined(Event),
}

/// Aggregate outcome of dispatching an input file across all plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFileResolution {
    /// The named plugin claimed the file and loaded it.
    LoadedBy(String),
    /// The named plugin claimed the file but failed; the host must abort
    /// loading it.
    FailedBy(String),
    /// No plugin was interested; the host performs default loading.
    Unclaimed,
}

impl LoadFileResolution {
    /// Integer code carried in the meta-hook result argument.
    pub fn code(&self) -> i64 {
        match self {
            Self::LoadedBy(_) => 1,
            Self::FailedBy(_) => 0,
            Self::Unclaimed => -1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_names() {
        assert_eq!(HookType::LoadFile.to_string(), "load_file");
        assert_eq!(HookType::MetaPost.to_string(), "meta_post");
        assert_eq!(HookType::ALL.len(), 8);
    }

    #[test]
    fn test_load_outcome_codes() {
        assert_eq!(LoadFileOutcome::Loaded.code(), 1);
        assert_eq!(LoadFileOutcome::Failed.code(), 0);
        assert_eq!(LoadFileOutcome::NotInterested.code(), -1);
        assert!(LoadFileOutcome::Failed.is_claiming());
        assert!(!LoadFileOutcome::NotInterested.is_claiming());
    }

    #[test]
    fn test_func_result() {
        assert!(!FuncResult::unhandled().is_handled());
        let r = FuncResult::handled(Val::new(7));
        assert!(r.is_handled());
        assert_eq!(r.into_value(), Some(Val::new(7)));
        assert_eq!(FuncResult::unhandled().into_value(), None);
    }

    #[test]
    fn test_resolution_codes() {
        assert_eq!(LoadFileResolution::LoadedBy("p".into()).code(), 1);
        assert_eq!(LoadFileResolution::FailedBy("p".into()).code(), 0);
        assert_eq!(LoadFileResolution::Unclaimed.code(), -1);
    }
}
