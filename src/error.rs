use std::path::PathBuf;

use thiserror::Error;

use crate::scene::ScenePhase;

/// Failures raised while turning an image into a registered texture.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TextureError {
    #[error("texture `{tag}` has {channels} channel(s); only 3 (RGB) or 4 (RGBA) are supported")]
    UnsupportedChannelLayout { tag: String, channels: u8 },
    #[error("texture `{tag}` pixel buffer holds {actual} bytes, expected {expected}")]
    PixelBufferSize {
        tag: String,
        expected: usize,
        actual: usize,
    },
    #[error("cannot register texture `{tag}`: all {limit} texture units are in use")]
    SlotsExhausted { tag: String, limit: usize },
    #[error("could not upload texture `{tag}`: {message}")]
    Upload { tag: String, message: String },
    #[error("could not load image {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },
}

/// Misuse of the scene lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("{operation} is not allowed while the scene is {actual:?} (expected {expected:?})")]
    OutOfOrder {
        operation: &'static str,
        expected: ScenePhase,
        actual: ScenePhase,
    },
    #[error("scene cannot be rendered while {0:?}")]
    NotReady(ScenePhase),
    #[error("scene has been shut down")]
    Closed,
}

/// Invalid viewer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown key name `{name}` bound to {action}")]
    UnknownKey { action: &'static str, name: String },
    #[error("invalid window size `{0}`, expected WIDTHxHEIGHT")]
    WindowSize(String),
}
