//! Variable-duty PWM synthesizer
//!
//! Two timers run against simulated time: the mode-switch timer steps through
//! the modulation frequencies at a fixed period, and the duty-update timer
//! pulls the next table entry at the rate of the active mode. Each output
//! sample compares the carrier phase against the current duty fraction.

use crate::config::PwmConfig;
use crate::error::ConfigResult;
use crate::gen::duty_table::DutyTable;
use crate::gen::waveform::{ModeSwitch, Waveform};

/// Fixed timing parameters derived from a [`PwmConfig`]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthParams {
    pub carrier_hz: f64,
    pub mode_switch_ms: f64,
    /// Duty refresh interval per mode in microseconds
    pub update_intervals_us: Vec<f64>,
}

impl SynthParams {
    pub fn from_config(config: &PwmConfig) -> Self {
        Self {
            carrier_hz: config.carrier_hz,
            mode_switch_ms: config.mode_switch_ms,
            update_intervals_us: (0..config.num_modes())
                .map(|mode| config.update_interval_us(mode))
                .collect(),
        }
    }

    pub fn num_modes(&self) -> usize {
        self.update_intervals_us.len()
    }
}

/// Mutable synthesis state, advanced one sample at a time by [`SynthState::step`]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthState {
    /// Index of the active modulation frequency
    pub mode: usize,
    /// Next table entry to load
    pub sequence_index: usize,
    /// Duty fraction currently applied to the carrier
    pub duty: f64,
    pub last_mode_switch_ms: f64,
    pub last_update_us: f64,
}

/// Outcome of a single synthesis step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Output level, 0.0 or 1.0
    pub level: f32,
    /// Mode entered during this step, if the switch timer fired
    pub switched_to: Option<usize>,
    pub duty_updated: bool,
}

impl SynthState {
    /// Mode 0, both timers at zero, duty preloaded from the first table entry
    pub fn new(table: &DutyTable) -> Self {
        Self {
            mode: 0,
            sequence_index: 0,
            duty: table.fraction_at(0),
            last_mode_switch_ms: 0.0,
            last_update_us: 0.0,
        }
    }

    /// Advance to `time_s` and produce the sample at that instant.
    /// Times must be non-decreasing across calls.
    pub fn step(&mut self, time_s: f64, params: &SynthParams, table: &DutyTable) -> Step {
        let t_ms = time_s * 1000.0;
        let mut switched_to = None;

        // The switch timer advances by whole periods so the mode stays locked
        // to floor(t / period), however coarse the sampling.
        while t_ms - self.last_mode_switch_ms >= params.mode_switch_ms {
            self.last_mode_switch_ms += params.mode_switch_ms;
            self.mode = (self.mode + 1) % params.num_modes();
            switched_to = Some(self.mode);
        }

        // The update timer restarts from the observed time, no drift correction.
        let t_us = time_s * 1_000_000.0;
        let interval_us = params.update_intervals_us[self.mode];
        let duty_updated = t_us - self.last_update_us >= interval_us;
        if duty_updated {
            self.last_update_us = t_us;
            self.duty = table.fraction_at(self.sequence_index);
            self.sequence_index = (self.sequence_index + 1) % table.len();
        }

        let phase = (time_s * params.carrier_hz).fract();
        let level = if phase < self.duty { 1.0 } else { 0.0 };

        Step {
            level,
            switched_to,
            duty_updated,
        }
    }
}

/// Sample-accurate PWM generator
pub struct PwmSynth {
    sample_rate: f64,
    params: SynthParams,
    table: DutyTable,
    state: SynthState,
    mode_switches: Vec<ModeSwitch>,
    duty_updates: usize,
}

impl PwmSynth {
    /// Create a synthesizer with a freshly generated duty table.
    /// The config is validated first.
    pub fn new(config: &PwmConfig) -> ConfigResult<Self> {
        config.validate()?;
        Self::with_table(config, DutyTable::generate(config))
    }

    /// Create a synthesizer around an existing table.
    /// The config is validated first; only its table settings are ignored.
    pub fn with_table(config: &PwmConfig, table: DutyTable) -> ConfigResult<Self> {
        config.validate()?;
        let state = SynthState::new(&table);
        Ok(Self {
            sample_rate: config.sample_rate(),
            params: SynthParams::from_config(config),
            table,
            state,
            mode_switches: Vec::new(),
            duty_updates: 0,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn table(&self) -> &DutyTable {
        &self.table
    }

    pub fn state(&self) -> &SynthState {
        &self.state
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    /// Current modulation frequency's update interval in microseconds
    pub fn current_interval_us(&self) -> f64 {
        self.params.update_intervals_us[self.state.mode]
    }

    /// Restart from time zero with the same table
    pub fn reset(&mut self) {
        self.state = SynthState::new(&self.table);
        self.mode_switches.clear();
        self.duty_updates = 0;
    }

    /// Generate one sample at `current_time` seconds
    pub fn tick(&mut self, current_time: f64) -> f32 {
        let step = self.state.step(current_time, &self.params, &self.table);

        if let Some(mode) = step.switched_to {
            log::debug!(
                "t={:.4}s switching to mode {} (update every {:.1} us)",
                current_time,
                mode,
                self.params.update_intervals_us[mode]
            );
            self.mode_switches.push(ModeSwitch {
                time_s: current_time,
                mode,
            });
        }
        if step.duty_updated {
            self.duty_updates += 1;
        }

        step.level
    }

    /// Render `num_samples` samples starting at time zero.
    /// Consumes the synthesizer's event history.
    pub fn render(&mut self, num_samples: usize) -> Waveform {
        self.reset();

        let mut times = Vec::with_capacity(num_samples);
        let mut samples = Vec::with_capacity(num_samples);
        let progress_every = (num_samples / 20).max(1);

        log::info!(
            "Generating {:.3}s waveform at {} Hz ({} samples)",
            num_samples as f64 / self.sample_rate,
            self.sample_rate,
            num_samples
        );

        for i in 0..num_samples {
            let t = i as f64 / self.sample_rate;
            samples.push(self.tick(t));
            times.push(t);

            if i % progress_every == 0 {
                log::info!(
                    "t={:.2}s mode {} ({:.0} Hz updates)",
                    t,
                    self.state.mode,
                    1_000_000.0 / self.current_interval_us()
                );
            }
        }

        log::info!(
            "Waveform generation complete: {} mode switches, {} duty updates",
            self.mode_switches.len(),
            self.duty_updates
        );

        Waveform {
            sample_rate: self.sample_rate,
            times,
            samples,
            mode_switches: std::mem::take(&mut self.mode_switches),
            duty_updates: self.duty_updates,
        }
    }
}

/// Validate `config`, build the table and render the full duration
pub fn generate_waveform(config: &PwmConfig) -> ConfigResult<Waveform> {
    let mut synth = PwmSynth::new(config)?;
    Ok(synth.render(config.num_samples()))
}
