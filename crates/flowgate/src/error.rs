//! Startup and shutdown errors with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use flowgate_config::ConfigError;
use flowgate_core::CoreError;

pub mod exit_code {
    pub const CONFIG: i32 = 1;
    /// The gateway fell through its bootstrap or polling loop.
    pub const STOPPED: i32 = -1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Settings file not found: {path}")]
    #[diagnostic(
        code(flowgate::no_config),
        help("Pass an existing file with -c, or omit -c to use built-in defaults.")
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(
        code(flowgate::validation),
        help("Fix the value in the settings file or the FLOWGATE_* environment.")
    )]
    Validation { field: String, reason: String },

    #[error("Could not load settings")]
    #[diagnostic(code(flowgate::config))]
    Config(#[source] ConfigError),

    #[error("Gateway stopped")]
    #[diagnostic(
        code(flowgate::stopped),
        help("Check that the device-management client and server daemons are running.")
    )]
    Stopped(#[source] CoreError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoConfig { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::Stopped(_) => exit_code::STOPPED,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => Self::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::Stopped(err)
    }
}
