use crate::error::AnalysisError;
use rustfft::{num_complex::Complex, FftPlanner};

/// Power spectral density over time, [time][frequency] in dB
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    /// Segment centre times in seconds
    pub times: Vec<f32>,
    /// Bin frequencies in Hz, DC to Nyquist
    pub frequencies: Vec<f32>,
    pub power_db: Vec<Vec<f32>>,
}

impl Spectrogram {
    pub fn num_segments(&self) -> usize {
        self.times.len()
    }

    /// Number of bins at or below `max_hz`
    pub fn bins_up_to(&self, max_hz: f32) -> usize {
        self.frequencies.partition_point(|&f| f <= max_hz)
    }

    /// (min, max) over all cells, for colour scaling
    pub fn power_range(&self) -> Option<(f32, f32)> {
        self.power_db
            .iter()
            .flatten()
            .fold(None, |range, &p| match range {
                None => Some((p, p)),
                Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
            })
    }
}

/// Fraction of each segment tapered by the default window
pub const TUKEY_ALPHA: f32 = 0.25;

/// Periodic Tukey window: cosine tapers over `alpha * len / 2` samples at each
/// end, flat in between. `alpha = 0` is rectangular, `alpha = 1` is Hann.
fn tukey_window(len: usize, alpha: f32) -> Vec<f32> {
    if len <= 1 || alpha <= 0.0 {
        return vec![1.0; len];
    }
    let alpha = alpha.min(1.0);
    // Periodic form: symmetric window of len + 1 points with the last dropped
    let span = len as f32;
    let width = (alpha * span / 2.0).floor() as usize;
    (0..len)
        .map(|n| {
            let x = 2.0 * n as f32 / (alpha * span);
            if n <= width {
                0.5 * (1.0 + (std::f32::consts::PI * (x - 1.0)).cos())
            } else if n >= len - width {
                0.5 * (1.0 + (std::f32::consts::PI * (x + 1.0 - 2.0 / alpha)).cos())
            } else {
                1.0
            }
        })
        .collect()
}

/// Spectrogram analyzer using overlapping Tukey-windowed FFT segments
pub struct SpectrogramAnalyzer {
    fft_size: usize,
    hop_size: usize,
    sample_rate: f32,
    planner: FftPlanner<f32>,
    window: Vec<f32>,
    // Density scale 1 / (fs * sum(w^2))
    scale: f32,
}

impl SpectrogramAnalyzer {
    /// Segments of `fft_size` samples overlapping by one eighth
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft_size = fft_size.max(1);
        let window = tukey_window(fft_size, TUKEY_ALPHA);
        let window_power: f32 = window.iter().map(|w| w * w).sum();

        Self {
            fft_size,
            hop_size: fft_size - fft_size / 8,
            sample_rate,
            planner: FftPlanner::new(),
            window,
            scale: 1.0 / (sample_rate * window_power.max(f32::MIN_POSITIVE)),
        }
    }

    /// Segment length chosen as a duration, e.g. 0.05 for 50 ms
    pub fn with_segment_duration(sample_rate: f32, seconds: f32) -> Self {
        Self::new((sample_rate * seconds).round() as usize, sample_rate)
    }

    pub fn window(&self) -> &[f32] {
        &self.window
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Get the frequency for a given bin index
    pub fn bin_to_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate / self.fft_size as f32
    }

    /// Get the number of frequency bins (DC through Nyquist)
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// How many full segments fit in `len` samples
    pub fn num_segments(&self, len: usize) -> usize {
        if len < self.fft_size {
            0
        } else {
            (len - self.fft_size) / self.hop_size + 1
        }
    }

    /// One-sided PSD of a single segment in dB. `segment` must hold `fft_size` samples.
    pub fn analyze_segment(&mut self, segment: &[f32]) -> Vec<f32> {
        debug_assert_eq!(segment.len(), self.fft_size);

        // Remove the segment mean before windowing
        let mean = segment.iter().sum::<f32>() / segment.len() as f32;
        let mut buffer: Vec<Complex<f32>> = segment
            .iter()
            .zip(&self.window)
            .map(|(&sample, &w)| Complex::new((sample - mean) * w, 0.0))
            .collect();

        let fft = self.planner.plan_fft_forward(self.fft_size);
        fft.process(&mut buffer);

        let num_bins = self.num_bins();
        let has_nyquist = self.fft_size % 2 == 0;
        buffer[..num_bins]
            .iter()
            .enumerate()
            .map(|(bin, c)| {
                let mut power = c.norm_sqr() * self.scale;
                // Fold negative frequencies onto the positive side
                let edge = bin == 0 || (has_nyquist && bin == num_bins - 1);
                if !edge {
                    power *= 2.0;
                }
                10.0 * (power + 1e-10).log10()
            })
            .collect()
    }

    /// Analyze a whole recording
    pub fn process(&mut self, samples: &[f32]) -> Result<Spectrogram, AnalysisError> {
        let segments = self.num_segments(samples.len());
        if segments == 0 {
            return Err(AnalysisError::TooShort {
                needed: self.fft_size,
                got: samples.len(),
            });
        }

        log::info!(
            "Computing spectrogram: {} segments of {} samples",
            segments,
            self.fft_size
        );

        let mut times = Vec::with_capacity(segments);
        let mut power_db = Vec::with_capacity(segments);
        for seg in 0..segments {
            let start = seg * self.hop_size;
            power_db.push(self.analyze_segment(&samples[start..start + self.fft_size]));
            times.push((start as f32 + self.fft_size as f32 / 2.0) / self.sample_rate);
        }

        Ok(Spectrogram {
            times,
            frequencies: (0..self.num_bins()).map(|b| self.bin_to_frequency(b)).collect(),
            power_db,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tukey_tapers_and_flat_top() {
        let w = tukey_window(2000, 0.25);
        assert_eq!(w.len(), 2000);
        assert!(w[0].abs() < 1e-6);
        // Taper half-way points sit a quarter of the taper in from each end
        assert!((w[125] - 0.5).abs() < 1e-4, "w[125] = {}", w[125]);
        assert!((w[1875] - 0.5).abs() < 1e-4, "w[1875] = {}", w[1875]);
        assert!(w[250..=1750].iter().all(|&v| (v - 1.0).abs() < 1e-6));
        assert!(w[1999] > 0.0 && w[1999] < w[1875]);
    }

    #[test]
    fn test_tukey_limits() {
        assert_eq!(tukey_window(4, 0.0), vec![1.0; 4]);
        assert_eq!(tukey_window(1, 0.25), vec![1.0]);

        // alpha = 1 reduces to the periodic Hann window
        let hann = tukey_window(8, 1.0);
        for (i, &v) in hann.iter().enumerate() {
            let expected = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / 8.0).cos());
            assert!((v - expected).abs() < 1e-6, "bin {}: {} vs {}", i, v, expected);
        }
    }

    #[test]
    fn test_default_segment_window() {
        let analyzer = SpectrogramAnalyzer::new(25_000, 500_000.0);
        let w = analyzer.window();
        assert_eq!(w[12_500], 1.0);
        assert!(w[0].abs() < 1e-6);
        assert!((w[1562] - 0.5).abs() < 1e-3, "w[1562] = {}", w[1562]);
    }
}
