/// A mode-switch event observed during synthesis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeSwitch {
    /// Time of the first sample in the new mode
    pub time_s: f64,
    /// Mode index entered
    pub mode: usize,
}

/// Rendered PWM output: binary samples on a uniform time axis
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub sample_rate: f64,
    pub times: Vec<f64>,
    pub samples: Vec<f32>,
    pub mode_switches: Vec<ModeSwitch>,
    /// How many times the duty cycle was reloaded from the table
    pub duty_updates: usize,
}

impl Waveform {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Covered duration in seconds
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate
    }

    /// Time axis and samples for all `t < until_s`
    pub fn head(&self, until_s: f64) -> (&[f64], &[f32]) {
        let end = self.times.partition_point(|&t| t < until_s);
        (&self.times[..end], &self.samples[..end])
    }

    /// Fraction of samples that are high
    pub fn high_fraction(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let high = self.samples.iter().filter(|&&s| s > 0.5).count();
        high as f64 / self.samples.len() as f64
    }
}
