//! # Engine Error Types
//!
//! Everything that can stop an engine from starting. Once a frame loop runs,
//! failures are logged and the frame carries on.

use std::path::PathBuf;

use halcyon_core::EcsError;
use halcyon_rendering::RenderError;
use thiserror::Error;

/// Errors raised while configuring or assembling an engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// ECS setup failed (component type limit, duplicate system, capacity).
    #[error(transparent)]
    Ecs(#[from] EcsError),

    /// Renderer setup failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`EngineConfig`](crate::EngineConfig).
    #[error("invalid engine config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration value is out of range.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
