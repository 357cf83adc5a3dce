// Integration tests for configuration validation

use varpwm::config::{PwmConfig, MAX_SAMPLES, MIN_SAMPLES};
use varpwm::error::ConfigError;

#[test]
fn test_default_matches_firmware_constants() {
    let config = PwmConfig::default();

    assert_eq!(config.carrier_hz, 25_000.0);
    assert_eq!(config.mode_frequencies, vec![1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0]);
    assert_eq!(config.mode_switch_ms, 200.0);
    assert_eq!((config.duty_min, config.duty_max), (51, 204));
    assert_eq!(config.table_size, 4096);
    assert_eq!(config.duration_s, 1.5);
    assert_eq!(config.seed, 42);
    assert!(config.validate().is_ok());
}

#[test]
fn test_rejects_bad_carrier() {
    for carrier in [0.0, -25_000.0, f64::NAN, f64::INFINITY] {
        let result = PwmConfig::default().with_carrier(carrier).validate();
        assert!(
            matches!(result, Err(ConfigError::InvalidCarrierFrequency(_))),
            "carrier {} should be rejected",
            carrier
        );
    }
}

#[test]
fn test_rejects_empty_mode_list() {
    let result = PwmConfig::default().with_mode_frequencies(Vec::new()).validate();
    assert_eq!(result, Err(ConfigError::NoModes));
}

#[test]
fn test_rejects_bad_mode_frequency() {
    let result = PwmConfig::default()
        .with_mode_frequencies(vec![1000.0, 2000.0, 0.0])
        .validate();
    assert_eq!(
        result,
        Err(ConfigError::InvalidModeFrequency { mode: 2, freq: 0.0 })
    );
}

#[test]
fn test_rejects_bad_switch_period() {
    let result = PwmConfig::default().with_mode_switch_ms(-1.0).validate();
    assert_eq!(result, Err(ConfigError::InvalidModeSwitchPeriod(-1.0)));
}

#[test]
fn test_rejects_bad_duration() {
    let result = PwmConfig::default().with_duration(0.0).validate();
    assert_eq!(result, Err(ConfigError::InvalidDuration(0.0)));
}

#[test]
fn test_rejects_inverted_duty_range() {
    let result = PwmConfig::default().with_duty_range(204, 51).validate();
    assert_eq!(
        result,
        Err(ConfigError::InvalidDutyRange {
            min: 204,
            max: 51,
            full_scale: 255
        })
    );
}

#[test]
fn test_accepts_full_duty_range() {
    assert!(PwmConfig::default().with_duty_range(0, 255).validate().is_ok());
}

#[test]
fn test_rejects_empty_table_and_zero_oversample() {
    assert_eq!(
        PwmConfig::default().with_table_size(0).validate(),
        Err(ConfigError::EmptyTable)
    );
    assert_eq!(
        PwmConfig::default().with_oversample(0).validate(),
        Err(ConfigError::InvalidOversample)
    );
}

#[test]
fn test_error_messages_are_readable() {
    let err = PwmConfig::default().with_duration(-2.0).validate().unwrap_err();
    assert_eq!(err.to_string(), "invalid duration: -2 seconds");
}

#[test]
fn test_duty_fraction_helpers() {
    let config = PwmConfig::default();
    assert!((config.duty_min_fraction() - 0.2).abs() < 1e-12);
    assert!((config.duty_max_fraction() - 0.8).abs() < 1e-12);
    assert!((config.duty_midpoint() - 0.5).abs() < 1e-12);
}

#[test]
fn test_rejects_unallocatable_sample_count() {
    let result = PwmConfig::default().with_duration(1e13).validate();
    assert!(
        matches!(result, Err(ConfigError::InvalidSampleCount { .. })),
        "got {:?}",
        result
    );
}

#[test]
fn test_rejects_too_few_samples() {
    // 2 us at 500 kHz is a single sample
    let result = PwmConfig::default().with_duration(2e-6).validate();
    assert_eq!(
        result,
        Err(ConfigError::InvalidSampleCount {
            requested: 1.0,
            min: MIN_SAMPLES,
            max: MAX_SAMPLES
        })
    );
}

#[test]
fn test_accepts_minimum_sample_count() {
    // 3 samples at 500 kHz
    assert!(PwmConfig::default().with_duration(6e-6).validate().is_ok());
}
