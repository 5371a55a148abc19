//! # Crossroads Error Types
//!
//! All errors that can occur while configuring or running a light.

use thiserror::Error;

/// Errors that can occur in the traffic light simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrossroadsError {
    /// `simulate()` was called on a light whose worker already started.
    #[error("light {0} is already simulating")]
    AlreadySimulating(String),

    /// The light was shut down while the caller was waiting.
    #[error("light {0} was shut down")]
    ShutDown(String),

    /// The OS refused to start the worker thread.
    #[error("failed to spawn worker for light {name}: {reason}")]
    WorkerSpawn {
        /// Light that failed to start.
        name: String,
        /// OS error text.
        reason: String,
    },

    /// The OS entropy source could not produce a seed.
    #[error("failed to draw a seed from the OS: {0}")]
    Entropy(String),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {reason}")]
    ConfigIo {
        /// File that was requested.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// Configuration file is not valid TOML for the expected schema.
    #[error("failed to parse config: {0}")]
    ConfigParse(String),
}

/// Result type for crossroads operations.
pub type CrossroadsResult<T> = Result<T, CrossroadsError>;
