//! Plugin system configuration.

use serde::{Deserialize, Serialize};

use crate::PLUGIN_API_VERSION;

/// Host-side plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// API version the host expects plugins to be stamped with. Defaults to
    /// [`PLUGIN_API_VERSION`]; overridable for compatibility testing.
    #[serde(default = "default_api_version")]
    pub api_version: u32,

    /// Plugins that are explicitly disabled and must not be activated.
    #[serde(default)]
    pub disabled_plugins: Vec<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            api_version: PLUGIN_API_VERSION,
            disabled_plugins: Vec::new(),
        }
    }
}

impl ManagerConfig {
    /// Check if a plugin is enabled.
    pub fn is_plugin_enabled(&self, name: &str) -> bool {
        !self.disabled_plugins.iter().any(|d| d == name)
    }

    /// Disable a plugin by name.
    pub fn disable_plugin(&mut self, name: &str) {
        if self.is_plugin_enabled(name) {
            self.disabled_plugins.push(name.to_string());
        }
    }

    /// Re-enable a previously disabled plugin.
    pub fn enable_plugin(&mut self, name: &str) {
        self.disabled_plugins.retain(|d| d != name);
    }
}

fn default_api_version() -> u32 {
    PLUGIN_API_VERSION
}
