use std::path::PathBuf;
use thiserror::Error;

/// Failures reading project files or their JSON contents
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
}

pub type CommonResult<T> = Result<T, CommonError>;
