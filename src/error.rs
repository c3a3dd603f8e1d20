//! Error types for the pagination engine

use crate::measure::BlockId;
use thiserror::Error;

/// Rejected page geometry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidGeometryError {
    /// Page width or height is zero, negative or not finite
    #[error("{field} must be a positive finite size, got {value}")]
    NonPositiveDimension { field: &'static str, value: f32 },

    /// A margin, gap or border is negative or not finite
    #[error("{field} must be a non-negative finite size, got {value}")]
    NegativeInset { field: &'static str, value: f32 },

    /// Margins and bands leave no room for content
    #[error("usable content height must be positive, got {usable}")]
    NoContentSpace { usable: f32 },

    /// Side margins leave no room for content
    #[error("content width must be positive, got {usable}")]
    NoContentWidth { usable: f32 },
}

/// Measurement could not be taken from the rendering surface.
///
/// Always transient: the pass is skipped and the previous result stays.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    /// The surface has not committed the latest content yet
    #[error("rendering surface not ready")]
    SurfaceNotReady,

    /// A block is not attached to the surface
    #[error("block {0:?} is not attached to the rendering surface")]
    BlockNotAttached(BlockId),

    /// The surface reported a height that cannot be used
    #[error("block {id:?} reported invalid height {height}")]
    InvalidHeight { id: BlockId, height: f32 },

    /// The surface reported a band height that cannot be used
    #[error("band on page {page} reported invalid height {height}")]
    InvalidBandHeight { page: usize, height: f32 },

    /// Measured bands leave no room for content on a page
    #[error("bands on page {page} leave no content height ({usable})")]
    NoContentSpace { page: usize, usable: f32 },

    /// Host-side failure
    #[error("host measurement failed: {0}")]
    Host(String),
}

/// Configuration could not be applied
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed JSON
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    /// Preset name not recognised
    #[error("unknown page preset: {0}")]
    UnknownPreset(String),

    /// Geometry rejected
    #[error(transparent)]
    Geometry(#[from] InvalidGeometryError),
}

/// Top-level engine error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] InvalidGeometryError),

    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
