//! Statistics and spectral analysis of rendered waveforms

pub mod spectrogram;
pub mod spectrum;
pub mod stats;

pub use spectrogram::{Spectrogram, SpectrogramAnalyzer};
pub use spectrum::Spectrum;
pub use stats::WaveformStats;

use crate::config::PwmConfig;
use crate::error::AnalysisError;
use crate::gen::waveform::{ModeSwitch, Waveform};

/// Spectrogram segment length used by [`analyze`]
pub const SPECTROGRAM_SEGMENT_S: f32 = 0.05;

/// Nominal mode-switch instants within the configured duration
pub fn mode_switch_markers(config: &PwmConfig) -> Vec<ModeSwitch> {
    let period_s = config.mode_switch_ms / 1000.0;
    let n = config.num_modes().max(1);
    (1usize..)
        .map(|k| (k, k as f64 * period_s))
        .take_while(|&(_, t)| t < config.duration_s)
        .map(|(k, time_s)| ModeSwitch { time_s, mode: k % n })
        .collect()
}

/// Everything the plots need, computed from one waveform
pub struct Analysis {
    pub stats: WaveformStats,
    pub spectrum: Spectrum,
    pub spectrogram: Spectrogram,
}

/// Run statistics, FFT and spectrogram over a waveform
pub fn analyze(waveform: &Waveform) -> Result<Analysis, AnalysisError> {
    let stats = WaveformStats::from_samples(&waveform.samples)
        .ok_or(AnalysisError::TooShort { needed: 1, got: 0 })?;
    let spectrum = Spectrum::compute(&waveform.samples, waveform.sample_rate)?;
    let sample_rate = waveform.sample_rate as f32;
    let mut analyzer = SpectrogramAnalyzer::with_segment_duration(sample_rate, SPECTROGRAM_SEGMENT_S);
    // Runs shorter than one segment get a single segment spanning the run
    if analyzer.fft_size() > waveform.len() {
        analyzer = SpectrogramAnalyzer::new(waveform.len(), sample_rate);
    }
    let spectrogram = analyzer.process(&waveform.samples)?;

    Ok(Analysis {
        stats,
        spectrum,
        spectrogram,
    })
}
