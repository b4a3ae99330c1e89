use thiserror::Error;

/// Failure of an optional host facility.
///
/// The sampler never propagates these: each one degrades the affected metric to its safe
/// default.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("facility is not available on this host")]
    Unsupported,
    #[error("no mark named `{0}`")]
    MissingMark(String),
    #[error("invalid reading: {0}")]
    InvalidReading(String),
}
