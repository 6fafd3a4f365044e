//! Hook registry: which plugin subscribed to which hook, at what priority.
//!
//! The registry is owned by the plugin manager and mutated only through a
//! plugin's initialization context. Dispatch reads it as ordered snapshot
//! data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::hooks::types::HookType;

/// One plugin's subscription to one hook type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookBinding {
    /// Subscribing plugin's name.
    pub plugin: String,
    /// Execution priority; higher runs first.
    pub priority: i32,
}

/// Per-hook-type subscription lists, kept in dispatch order.
///
/// Each list is sorted by descending priority; equal priorities keep
/// registration order, so the tie-break stays consistent across dispatch
/// passes until the registry changes.
#[derive(Debug, Default)]
pub struct HookRegistry {
    bindings: HashMap<HookType, Vec<HookBinding>>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a plugin to a hook. A plugin holds at most one binding
    /// per hook type; re-enabling replaces the priority.
    pub fn enable(&mut self, plugin: &str, hook: HookType, priority: i32) {
        let list = self.bindings.entry(hook).or_default();
        list.retain(|b| b.plugin != plugin);
        list.push(HookBinding {
            plugin: plugin.to_string(),
            priority,
        });
        list.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// Remove a plugin's binding for a hook, if any.
    pub fn disable(&mut self, plugin: &str, hook: HookType) {
        if let Some(list) = self.bindings.get_mut(&hook) {
            list.retain(|b| b.plugin != plugin);
        }
    }

    /// The ordered bindings for a hook.
    pub fn bindings(&self, hook: HookType) -> &[HookBinding] {
        self.bindings.get(&hook).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether a plugin is subscribed to a hook.
    pub fn is_enabled(&self, plugin: &str, hook: HookType) -> bool {
        self.bindings(hook).iter().any(|b| b.plugin == plugin)
    }

    /// Snapshot of one plugin's `(hook, priority)` subscriptions.
    pub fn enabled_for(&self, plugin: &str) -> Vec<(HookType, i32)> {
        HookType::ALL
            .into_iter()
            .filter_map(|hook| {
                self.bindings(hook)
                    .iter()
                    .find(|b| b.plugin == plugin)
                    .map(|b| (hook, b.priority))
            })
            .collect()
    }

    /// Whether any plugin subscribed to either meta hook. Lets the
    /// dispatcher skip building argument lists on the hot path.
    pub fn has_meta_subscribers(&self) -> bool {
        !self.bindings(HookType::MetaPre).is_empty()
            || !self.bindings(HookType::MetaPost).is_empty()
    }

    /// Remove every binding a plugin holds.
    pub fn remove_plugin(&mut self, plugin: &str) {
        for list in self.bindings.values_mut() {
            list.retain(|b| b.plugin != plugin);
        }
    }

    /// Number of bindings for one hook type.
    pub fn hook_count(&self, hook: HookType) -> usize {
        self.bindings(hook).len()
    }

    /// Total number of bindings across all hook types.
    pub fn total_count(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }
}
