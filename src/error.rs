use std::io;
use thiserror::Error;

/// Errors raised by the file-facing parts of the app (config, presets, export).
#[derive(Debug, Error)]
pub enum HeartError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("GIF encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),

    #[error("could not determine the config directory")]
    NoConfigDir,

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),
}

pub type Result<T> = std::result::Result<T, HeartError>;
