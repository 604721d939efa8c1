use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {command} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        command: String,
        expected: usize,
    },
    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: {command} must follow {block}")]
    OutsideBlock {
        line: usize,
        command: String,
        block: &'static str,
    },
    #[error("line {line}: {message}")]
    Invalid { line: usize, message: String },
    #[error("line {line}: material '{name}' is not defined")]
    UndefinedMaterial { line: usize, name: String },
    #[error("material '{name}': {message}")]
    InvalidMaterial { name: String, message: String },
    #[error("image dimensions must be positive, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
}
