//! Error types for configuration and analysis.

use thiserror::Error;

/// Result type for configuration checks.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while validating a [`crate::config::PwmConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Carrier frequency is zero, negative or not finite.
    #[error("invalid carrier frequency: {0} Hz")]
    InvalidCarrierFrequency(f64),

    /// No modulation modes configured.
    #[error("mode frequency list is empty")]
    NoModes,

    /// A modulation frequency is zero, negative or not finite.
    #[error("invalid modulation frequency for mode {mode}: {freq} Hz")]
    InvalidModeFrequency {
        /// Index of the offending mode.
        mode: usize,
        /// The invalid frequency.
        freq: f64,
    },

    /// Mode-switch period is zero, negative or not finite.
    #[error("invalid mode switch period: {0} ms")]
    InvalidModeSwitchPeriod(f64),

    /// Simulation duration is zero, negative or not finite.
    #[error("invalid duration: {0} seconds")]
    InvalidDuration(f64),

    /// Duty bounds are inverted or exceed the 8-bit full scale.
    #[error("invalid duty range: {min}..={max} (full scale {full_scale})")]
    InvalidDutyRange {
        /// Lower bound.
        min: u8,
        /// Upper bound.
        max: u8,
        /// Full-scale value the bounds are measured against.
        full_scale: u8,
    },

    /// Duty table must hold at least one entry.
    #[error("duty table size must be non-zero")]
    EmptyTable,

    /// Oversampling factor must be at least one.
    #[error("oversample factor must be non-zero")]
    InvalidOversample,

    /// Duration and sample rate give too few or too many samples.
    #[error("run would produce {requested} samples, expected {min}..={max}")]
    InvalidSampleCount {
        /// Sample count implied by the configuration.
        requested: f64,
        /// Fewest samples accepted.
        min: usize,
        /// Most samples accepted.
        max: usize,
    },
}

/// Errors raised by the spectral analysis routines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Not enough samples for the requested transform.
    #[error("need at least {needed} samples, got {got}")]
    TooShort {
        /// Minimum sample count.
        needed: usize,
        /// Samples provided.
        got: usize,
    },

    /// Sample rate is zero, negative or not finite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
}
