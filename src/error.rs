use std::path::PathBuf;

use thiserror::Error;

use crate::weather::Weather;

/// Reasons a scene refuses to initialize.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("canvas must have a positive finite size, got {width}x{height}")]
    InvalidCanvas { width: f32, height: f32 },

    #[error("control point spacing must be positive and finite, got {0}")]
    InvalidSpacing(f32),

    #[error("water mesh needs at least 2 control points, got {0}")]
    TooFewControlPoints(usize),

    #[error("water mesh of width {width} at spacing {spacing} needs too many control points")]
    TooManyControlPoints { width: f32, spacing: f32 },

    #[error("coefficient `{name}` is out of range: {value}")]
    InvalidCoefficient { name: &'static str, value: f32 },

    #[error("duration `{name}` must be finite and non-negative, got {value}")]
    InvalidDuration { name: &'static str, value: f64 },

    #[error("initial fish range is empty ({min}..={max})")]
    InvalidFishRange { min: usize, max: usize },

    #[error("starting weather was already set")]
    WeatherAlreadySet,

    #[error("{0:?} cannot be used as a starting weather")]
    InvalidStartingWeather(Weather),

    #[error("failed to read config {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
