use thiserror::Error;

/// Failures surfaced by the scene layer. Graphics calls themselves are assumed
/// to succeed; only caller-supplied inputs are validated here.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("unknown subject `{0}`")]
    UnknownSubject(String),
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
}
