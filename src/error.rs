use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("unsupported model format: {0:?}")]
    UnsupportedFormat(String),

    #[error("pipeline produced no {0} representation")]
    EmptyRepresentation(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Gltf(#[from] gltf::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn backend(message: impl Into<String>) -> Self {
        PipelineError::Backend(message.into())
    }
}
