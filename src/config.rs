//! Simulation parameters
//!
//! Defaults reproduce the ESP32 variable-duty generator: a 25 kHz carrier whose
//! duty cycle is refreshed at 1-6 kHz, switching rate every 200 ms.

use crate::error::{ConfigError, ConfigResult};
use crate::gen::duty_table::scale_duty;

/// Full-scale value of a raw duty table entry (8-bit).
pub const DUTY_FULL_SCALE: u8 = 255;

/// Fewest samples a run may produce; the spectrum needs three.
pub const MIN_SAMPLES: usize = 3;

/// Most samples a run may produce before the time axis allocation overflows.
pub const MAX_SAMPLES: usize = isize::MAX as usize / std::mem::size_of::<f64>();

/// Resolution of the LEDC duty register emulated by [`FirmwareTiming`].
pub const LEDC_DUTY_RESOLUTION_BITS: u32 = 10;

/// Timing model for the duty-update timer and duty quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirmwareTiming {
    /// Exact intervals (1e6 / f microseconds) and fractions (value / 255).
    #[default]
    Ideal,
    /// Whole-microsecond intervals and 10-bit LEDC duty quantization,
    /// matching what the firmware actually programs.
    Ledc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PwmConfig {
    /// Carrier (base PWM) frequency in Hz
    pub carrier_hz: f64,
    /// Duty refresh rate per mode in Hz, cycled in order
    pub mode_frequencies: Vec<f64>,
    /// Time spent in each mode in milliseconds
    pub mode_switch_ms: f64,
    /// Lower bound of raw duty values (inclusive, out of 255)
    pub duty_min: u8,
    /// Upper bound of raw duty values (inclusive, out of 255)
    pub duty_max: u8,
    /// Number of entries in the random duty table
    pub table_size: usize,
    /// Simulated duration in seconds
    pub duration_s: f64,
    /// Samples per carrier period
    pub oversample: u32,
    /// Seed for the duty table generator
    pub seed: u64,
    pub timing: FirmwareTiming,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            carrier_hz: 25_000.0,
            mode_frequencies: vec![1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0],
            mode_switch_ms: 200.0,
            duty_min: 51,
            duty_max: 204,
            table_size: 4096,
            duration_s: 1.5,
            oversample: 20,
            seed: 42,
            timing: FirmwareTiming::Ideal,
        }
    }
}

impl PwmConfig {
    pub fn with_carrier(mut self, carrier_hz: f64) -> Self {
        self.carrier_hz = carrier_hz;
        self
    }

    pub fn with_mode_frequencies(mut self, frequencies: Vec<f64>) -> Self {
        self.mode_frequencies = frequencies;
        self
    }

    pub fn with_mode_switch_ms(mut self, period_ms: f64) -> Self {
        self.mode_switch_ms = period_ms;
        self
    }

    pub fn with_duty_range(mut self, min: u8, max: u8) -> Self {
        self.duty_min = min;
        self.duty_max = max;
        self
    }

    pub fn with_table_size(mut self, size: usize) -> Self {
        self.table_size = size;
        self
    }

    pub fn with_duration(mut self, duration_s: f64) -> Self {
        self.duration_s = duration_s;
        self
    }

    pub fn with_oversample(mut self, oversample: u32) -> Self {
        self.oversample = oversample;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_timing(mut self, timing: FirmwareTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Check every parameter, failing on the first bad one
    pub fn validate(&self) -> ConfigResult<()> {
        if !is_positive(self.carrier_hz) {
            return Err(ConfigError::InvalidCarrierFrequency(self.carrier_hz));
        }
        if self.mode_frequencies.is_empty() {
            return Err(ConfigError::NoModes);
        }
        if let Some((mode, &freq)) = self
            .mode_frequencies
            .iter()
            .enumerate()
            .find(|(_, f)| !is_positive(**f))
        {
            return Err(ConfigError::InvalidModeFrequency { mode, freq });
        }
        if !is_positive(self.mode_switch_ms) {
            return Err(ConfigError::InvalidModeSwitchPeriod(self.mode_switch_ms));
        }
        if !is_positive(self.duration_s) {
            return Err(ConfigError::InvalidDuration(self.duration_s));
        }
        // u8 already caps duty_max at the full scale; only ordering can be wrong
        if self.duty_min > self.duty_max {
            return Err(ConfigError::InvalidDutyRange {
                min: self.duty_min,
                max: self.duty_max,
                full_scale: DUTY_FULL_SCALE,
            });
        }
        if self.table_size == 0 {
            return Err(ConfigError::EmptyTable);
        }
        if self.oversample == 0 {
            return Err(ConfigError::InvalidOversample);
        }
        let requested = (self.duration_s * self.sample_rate()).floor();
        if !(MIN_SAMPLES as f64..=MAX_SAMPLES as f64).contains(&requested) {
            return Err(ConfigError::InvalidSampleCount {
                requested,
                min: MIN_SAMPLES,
                max: MAX_SAMPLES,
            });
        }
        Ok(())
    }

    pub fn num_modes(&self) -> usize {
        self.mode_frequencies.len()
    }

    /// Output sample rate in Hz
    pub fn sample_rate(&self) -> f64 {
        self.carrier_hz * self.oversample as f64
    }

    /// Number of output samples for the configured duration
    pub fn num_samples(&self) -> usize {
        (self.duration_s * self.sample_rate()).floor() as usize
    }

    /// Duty refresh interval for a mode in microseconds
    pub fn update_interval_us(&self, mode: usize) -> f64 {
        let interval = 1_000_000.0 / self.mode_frequencies[mode % self.num_modes()];
        match self.timing {
            FirmwareTiming::Ideal => interval,
            FirmwareTiming::Ledc => interval.floor(),
        }
    }

    /// Lowest duty fraction the comparator can see under this timing model
    pub fn duty_min_fraction(&self) -> f64 {
        scale_duty(self.duty_min, self.timing)
    }

    /// Highest duty fraction the comparator can see under this timing model
    pub fn duty_max_fraction(&self) -> f64 {
        scale_duty(self.duty_max, self.timing)
    }

    /// Midpoint of the duty range as a fraction
    pub fn duty_midpoint(&self) -> f64 {
        (self.duty_min_fraction() + self.duty_max_fraction()) * 0.5
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(PwmConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_sample_rate() {
        let config = PwmConfig::default();
        assert_eq!(config.sample_rate(), 500_000.0);
        assert_eq!(config.num_samples(), 750_000);
    }

    #[test]
    fn test_ledc_intervals_truncate() {
        let config = PwmConfig::default().with_timing(FirmwareTiming::Ledc);
        let intervals: Vec<f64> = (0..6).map(|m| config.update_interval_us(m)).collect();
        assert_eq!(intervals, vec![1000.0, 500.0, 333.0, 250.0, 200.0, 166.0]);
    }

    #[test]
    fn test_ledc_bounds_follow_register() {
        let config = PwmConfig::default().with_timing(FirmwareTiming::Ledc);
        assert_eq!(config.duty_min_fraction(), 204.0 / 1023.0);
        assert_eq!(config.duty_max_fraction(), 818.0 / 1023.0);
    }

    #[test]
    fn test_ideal_intervals_are_exact() {
        let config = PwmConfig::default();
        assert!((config.update_interval_us(2) - 333.333_333).abs() < 1e-3);
    }
}
