use crate::error::AnalysisError;
use rustfft::{num_complex::Complex, FftPlanner};

/// dB floor offset so silent bins stay finite
const DB_FLOOR: f32 = 1e-10;

/// One-sided magnitude spectrum of a full waveform
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    /// Bin centre frequencies in Hz (strictly positive)
    pub frequencies: Vec<f32>,
    /// Bin magnitudes in dB
    pub magnitudes_db: Vec<f32>,
    /// Frequency spacing between bins in Hz
    pub bin_width: f32,
}

impl Spectrum {
    /// FFT the whole sequence and keep the positive-frequency half
    pub fn compute(samples: &[f32], sample_rate: f64) -> Result<Self, AnalysisError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(AnalysisError::InvalidSampleRate(sample_rate));
        }
        let n = samples.len();
        if n < 3 {
            return Err(AnalysisError::TooShort { needed: 3, got: n });
        }

        log::info!("Computing {}-point FFT", n);

        let mut buffer: Vec<Complex<f32>> =
            samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let bin_width = (sample_rate / n as f64) as f32;
        // Bins 1..=(n-1)/2 are the strictly positive frequencies
        let last_bin = (n - 1) / 2;
        let frequencies = (1..=last_bin).map(|k| k as f32 * bin_width).collect();
        let magnitudes_db = buffer[1..=last_bin]
            .iter()
            .map(|c| 20.0 * (c.norm() + DB_FLOOR).log10())
            .collect();

        Ok(Self {
            frequencies,
            magnitudes_db,
            bin_width,
        })
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Loudest bin with `low_hz <= f <= high_hz`, as (frequency, dB)
    pub fn peak_in_band(&self, low_hz: f32, high_hz: f32) -> Option<(f32, f32)> {
        self.frequencies
            .iter()
            .zip(&self.magnitudes_db)
            .filter(|&(&f, _)| f >= low_hz && f <= high_hz)
            .map(|(&f, &db)| (f, db))
            .fold(None, |best: Option<(f32, f32)>, candidate| match best {
                Some(b) if b.1 >= candidate.1 => Some(b),
                _ => Some(candidate),
            })
    }

    /// Magnitude in dB of the bin nearest to `freq_hz`
    pub fn magnitude_at(&self, freq_hz: f32) -> Option<f32> {
        if self.is_empty() || freq_hz < 0.0 {
            return None;
        }
        let bin = ((freq_hz / self.bin_width).round() as usize).max(1);
        self.magnitudes_db.get(bin - 1).copied()
    }

    /// Bins at or below `max_hz`, for plotting
    pub fn up_to(&self, max_hz: f32) -> (&[f32], &[f32]) {
        let end = self.frequencies.partition_point(|&f| f <= max_hz);
        (&self.frequencies[..end], &self.magnitudes_db[..end])
    }
}
