use thiserror::Error;

/// Rejected configuration parameters.
///
/// Validation runs before any ensemble is built or replaced, so a failed
/// construction or reconfiguration leaves prior state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("oscillator count must be at least 1 (got {0})")]
    OscillatorCount(usize),

    #[error("alpha must be positive (got {0})")]
    Alpha(f32),

    #[error("threshold must lie strictly between 0 and 1 (got {0})")]
    Threshold(f32),

    #[error("dt must be positive (got {0})")]
    Dt(f32),

    #[error("coupling strength must be non-negative (got {0})")]
    CouplingStrength(f32),

    #[error("frequency spread must be non-negative (got {0})")]
    OmegaStd(f32),
}
