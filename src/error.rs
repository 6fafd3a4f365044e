//! Plugin system error types.

use thiserror::Error;

/// Plugin system errors.
#[derive(Error, Debug)]
pub enum PluginError {
    /// Plugin configuration did not provide a name.
    #[error("plugin configuration is missing a name")]
    MissingName,

    /// Plugin was compiled against a different API version.
    #[error("plugin '{plugin}' was built against API version {found}, host expects {expected}")]
    ApiVersionMismatch {
        plugin: String,
        expected: u32,
        found: u32,
    },

    /// A plugin with the same name is already registered.
    #[error("plugin already registered: {0}")]
    AlreadyRegistered(String),

    /// Plugin not found.
    #[error("plugin not found: {0}")]
    NotFound(String),

    /// Plugin is disabled by configuration.
    #[error("plugin is disabled: {0}")]
    Disabled(String),

    /// Registration attempted after initialization started.
    #[error("plugin registration is closed, manager is already initialized")]
    RegistrationClosed,

    /// An input-file load request could not be queued.
    #[error("plugin '{plugin}' could not queue input file '{file}'")]
    LoadRequestRejected { plugin: String, file: String },
}

impl PluginError {
    /// Create an API version mismatch error.
    pub fn api_version_mismatch(plugin: impl Into<String>, expected: u32, found: u32) -> Self {
        Self::ApiVersionMismatch {
            plugin: plugin.into(),
            expected,
            found,
        }
    }

    /// Create a load request rejection error.
    pub fn load_request_rejected(plugin: impl Into<String>, file: impl Into<String>) -> Self {
        Self::LoadRequestRejected {
            plugin: plugin.into(),
            file: file.into(),
        }
    }
}

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
