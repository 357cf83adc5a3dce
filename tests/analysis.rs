// Integration tests for statistics, FFT spectrum and spectrogram

use approx::assert_relative_eq;
use varpwm::analysis::{self, mode_switch_markers, Spectrum, SpectrogramAnalyzer, WaveformStats};
use varpwm::config::PwmConfig;
use varpwm::error::AnalysisError;
use varpwm::gen::generate_waveform;

/// Square wave with `period` samples, high for the first half
fn square(len: usize, period: usize) -> Vec<f32> {
    (0..len)
        .map(|i| if i % period < period / 2 { 1.0 } else { 0.0 })
        .collect()
}

#[test]
fn test_stats_of_generated_waveform() {
    let waveform = generate_waveform(&PwmConfig::default().with_duration(0.2)).unwrap();
    let stats = WaveformStats::from_samples(&waveform.samples).unwrap();

    assert_eq!(stats.count, waveform.len());
    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.max, 1.0);
    assert_relative_eq!(stats.mean, waveform.high_fraction(), epsilon = 1e-9);
    // Binary signal: mean of squares equals the mean
    assert_relative_eq!(stats.rms, stats.mean.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_spectrum_peaks_at_carrier() {
    let waveform = generate_waveform(&PwmConfig::default().with_duration(0.01)).unwrap();
    let spectrum = Spectrum::compute(&waveform.samples, waveform.sample_rate).unwrap();

    assert_relative_eq!(spectrum.bin_width, 100.0, epsilon = 1e-3);
    let (freq, db) = spectrum.peak_in_band(20_000.0, 30_000.0).unwrap();
    assert_relative_eq!(freq, 25_000.0, epsilon = 1.0);
    assert_eq!(spectrum.magnitude_at(25_000.0), Some(db));
}

#[test]
fn test_spectrum_excludes_dc_and_negative_bins() {
    let samples = square(1000, 10);
    let spectrum = Spectrum::compute(&samples, 1000.0).unwrap();

    assert_eq!(spectrum.len(), 499);
    assert_relative_eq!(spectrum.frequencies[0], 1.0);
    assert_relative_eq!(*spectrum.frequencies.last().unwrap(), 499.0);

    let (freq, _) = spectrum.peak_in_band(1.0, 499.0).unwrap();
    assert_relative_eq!(freq, 100.0);
}

#[test]
fn test_spectrum_up_to_limits_range() {
    let samples = square(1000, 10);
    let spectrum = Spectrum::compute(&samples, 1000.0).unwrap();
    let (freqs, mags) = spectrum.up_to(250.0);

    assert_eq!(freqs.len(), 250);
    assert_eq!(mags.len(), 250);
    assert!(freqs.iter().all(|&f| f <= 250.0));
}

#[test]
fn test_spectrum_rejects_bad_input() {
    assert_eq!(
        Spectrum::compute(&[1.0, 0.0], 1000.0),
        Err(AnalysisError::TooShort { needed: 3, got: 2 })
    );
    assert_eq!(
        Spectrum::compute(&[1.0, 0.0, 1.0, 0.0], 0.0),
        Err(AnalysisError::InvalidSampleRate(0.0))
    );
}

#[test]
fn test_spectrogram_geometry_for_default_run() {
    let analyzer = SpectrogramAnalyzer::with_segment_duration(500_000.0, 0.05);

    assert_eq!(analyzer.fft_size(), 25_000);
    assert_eq!(analyzer.hop_size(), 21_875);
    assert_eq!(analyzer.num_bins(), 12_501);
    assert_eq!(analyzer.num_segments(750_000), 34);
    assert_relative_eq!(analyzer.bin_to_frequency(1), 20.0);
}

#[test]
fn test_spectrogram_tracks_tone() {
    // 1 kHz square at 10 kHz sampling
    let samples = square(10_000, 10);
    let mut analyzer = SpectrogramAnalyzer::new(1000, 10_000.0);
    let spectrogram = analyzer.process(&samples).unwrap();

    assert_eq!(spectrogram.num_segments(), 11);
    assert_eq!(spectrogram.frequencies.len(), 501);
    assert_relative_eq!(spectrogram.times[0], 0.05);
    assert_relative_eq!(spectrogram.times[1] - spectrogram.times[0], 0.0875, epsilon = 1e-6);

    for column in &spectrogram.power_db {
        let peak_bin = column
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(bin, _)| bin)
            .unwrap();
        assert_eq!(peak_bin, 100, "fundamental should sit at 1 kHz");
    }

    let (lo, hi) = spectrogram.power_range().unwrap();
    assert!(lo < hi);
}

#[test]
fn test_spectrogram_rejects_short_input() {
    let mut analyzer = SpectrogramAnalyzer::new(1000, 10_000.0);
    assert_eq!(
        analyzer.process(&[0.0; 999]).unwrap_err(),
        AnalysisError::TooShort {
            needed: 1000,
            got: 999
        }
    );
}

#[test]
fn test_mode_switch_markers() {
    let config = PwmConfig::default();
    let markers = mode_switch_markers(&config);

    assert_eq!(markers.len(), 7);
    let modes: Vec<usize> = markers.iter().map(|m| m.mode).collect();
    assert_eq!(modes, vec![1, 2, 3, 4, 5, 0, 1]);
    assert_relative_eq!(markers[0].time_s, 0.2);
    assert_relative_eq!(markers[6].time_s, 1.4, epsilon = 1e-12);
}

#[test]
fn test_analyze_short_run() {
    let waveform = generate_waveform(&PwmConfig::default().with_duration(0.125)).unwrap();
    let result = analysis::analyze(&waveform).unwrap();

    assert_eq!(result.stats.count, 62_500);
    assert_eq!(result.spectrogram.num_segments(), 2);
    assert!(result.spectrum.peak_in_band(20_000.0, 30_000.0).is_some());
}

#[test]
fn test_analyze_run_shorter_than_one_segment() {
    // 40 ms is below the 50 ms segment, the segment shrinks to the whole run
    let waveform = generate_waveform(&PwmConfig::default().with_duration(0.04)).unwrap();
    let result = analysis::analyze(&waveform).unwrap();

    assert_eq!(result.stats.count, 20_000);
    assert_eq!(result.spectrogram.num_segments(), 1);
    assert_eq!(result.spectrogram.frequencies.len(), 10_001);
    assert_relative_eq!(result.spectrogram.times[0], 0.02, epsilon = 1e-6);
    assert_relative_eq!(result.spectrogram.frequencies[1], 25.0, epsilon = 1e-3);
}

#[test]
fn test_analyze_tiny_run() {
    let waveform = generate_waveform(&PwmConfig::default().with_duration(0.01)).unwrap();
    let result = analysis::analyze(&waveform).unwrap();
    assert_eq!(result.spectrogram.num_segments(), 1);
    assert!(result.spectrum.peak_in_band(20_000.0, 30_000.0).is_some());
}
