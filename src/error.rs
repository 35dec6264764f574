//! Central error handling for the world core
//!
//! Provides a unified [`WorldError`] enum. Boundary rejections and degenerate
//! terrain normals are expected control flow and never show up here.

use std::path::PathBuf;

/// Centralized error type for world construction and frame processing
#[derive(thiserror::Error, Debug)]
pub enum WorldError {
    /// More lights were registered in a single frame than the shading stage can hold.
    #[error("exceeded maximum number of lights ({capacity})")]
    ResourceExhausted { capacity: usize },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to import asset {path:?}: {source}")]
    AssetImport {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorldError {
    pub fn configuration<T: ToString>(msg: T) -> Self {
        WorldError::Configuration(msg.to_string())
    }

    pub fn render<T: ToString>(msg: T) -> Self {
        WorldError::Render(msg.to_string())
    }

    /// Returns true for errors that must terminate the run loop
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WorldError::ResourceExhausted { .. } | WorldError::Configuration(_)
        )
    }
}

/// Result type alias for world operations
pub type WorldResult<T> = Result<T, WorldError>;
