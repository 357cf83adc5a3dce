//! Variable-duty PWM simulator
//!
//! Synthesizes the output of a fixed-carrier PWM generator whose duty cycle is
//! reloaded from a seeded random table at a rate that steps through a list of
//! modulation frequencies, then analyzes the result (statistics, FFT and
//! spectrogram) and describes the plots.
//!
//! ```no_run
//! use varpwm::config::PwmConfig;
//! use varpwm::gen::generate_waveform;
//!
//! let waveform = generate_waveform(&PwmConfig::default()).unwrap();
//! println!("{} mode switches", waveform.mode_switches.len());
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod gen;
pub mod utils;
pub mod visualization;

pub use config::{FirmwareTiming, PwmConfig};
pub use error::{AnalysisError, ConfigError};
pub use gen::{generate_waveform, DutyTable, PwmSynth, SynthState, Waveform};
