/// Summary statistics of a sample sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub rms: f64,
}

impl WaveformStats {
    /// Compute statistics in one pass. Returns `None` for an empty slice.
    pub fn from_samples(samples: &[f32]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for &s in samples {
            let s = s as f64;
            sum += s;
            sum_sq += s * s;
            min = min.min(s);
            max = max.max(s);
        }

        let n = samples.len() as f64;
        Some(Self {
            count: samples.len(),
            mean: sum / n,
            min,
            max,
            rms: (sum_sq / n).sqrt(),
        })
    }

    /// Mean expressed as a duty-cycle percentage
    pub fn duty_percent(&self) -> f64 {
        self.mean * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_stats() {
        assert!(WaveformStats::from_samples(&[]).is_none());
    }

    #[test]
    fn test_binary_rms_is_sqrt_of_mean() {
        let stats = WaveformStats::from_samples(&[1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(stats.mean, 0.375);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
        assert!((stats.rms - 0.375f64.sqrt()).abs() < 1e-12);
    }
}
