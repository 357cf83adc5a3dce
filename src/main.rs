/* Command-line front end for the variable-duty PWM simulator.
Generates the waveform, prints its statistics and, with the `visualization`
feature, opens a plot window (Tab switches figures, Esc quits).
*/

use clap::Parser;
use varpwm::analysis::{self, Analysis};
use varpwm::config::{FirmwareTiming, PwmConfig, DUTY_FULL_SCALE};
use varpwm::gen::generate_waveform;
use varpwm::utils::init_logger;
use varpwm::visualization::{analysis_figure, spectrogram_figure, Figure};

#[derive(Parser, Debug)]
#[command(author, version, about = "Variable duty cycle PWM generator simulator")]
struct Args {
    /// Carrier frequency in Hz
    #[arg(long, default_value_t = 25_000.0)]
    carrier: f64,
    /// Duty refresh rates per mode in Hz, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [1000.0, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0])]
    modes: Vec<f64>,
    /// Time spent in each mode in milliseconds
    #[arg(long, default_value_t = 200.0)]
    mode_switch_ms: f64,
    /// Lowest raw duty value (out of 255)
    #[arg(long, default_value_t = 51)]
    duty_min: u8,
    /// Highest raw duty value (out of 255)
    #[arg(long, default_value_t = 204)]
    duty_max: u8,
    #[arg(long, default_value_t = 4096)]
    table_size: usize,
    /// Simulated duration in seconds
    #[arg(long, default_value_t = 1.5)]
    duration: f64,
    /// Samples per carrier period
    #[arg(long, default_value_t = 20)]
    oversample: u32,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Emulate firmware timing: whole-microsecond intervals and 10-bit duty
    #[arg(long)]
    ledc: bool,
    /// Print statistics only, don't open the plot window
    #[arg(long)]
    headless: bool,
    /// Log every mode switch
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> PwmConfig {
        PwmConfig::default()
            .with_carrier(self.carrier)
            .with_mode_frequencies(self.modes.clone())
            .with_mode_switch_ms(self.mode_switch_ms)
            .with_duty_range(self.duty_min, self.duty_max)
            .with_table_size(self.table_size)
            .with_duration(self.duration)
            .with_oversample(self.oversample)
            .with_seed(self.seed)
            .with_timing(if self.ledc {
                FirmwareTiming::Ledc
            } else {
                FirmwareTiming::Ideal
            })
    }
}

fn print_banner(config: &PwmConfig) {
    println!("{}", "=".repeat(60));
    println!("Variable Duty Cycle PWM Generator Simulator");
    println!("{}", "=".repeat(60));
    println!("Configuration:");
    println!("  PWM Carrier Frequency: {} Hz", config.carrier_hz);
    println!("  Modulation Frequencies: {:?} Hz", config.mode_frequencies);
    println!("  Mode Switch Interval: {} ms", config.mode_switch_ms);
    println!(
        "  Duty Cycle Range: {:.1}% - {:.1}% (raw {}..={} of {})",
        config.duty_min_fraction() * 100.0,
        config.duty_max_fraction() * 100.0,
        config.duty_min,
        config.duty_max,
        DUTY_FULL_SCALE
    );
    println!("  Simulation Duration: {} seconds", config.duration_s);
    println!("  Sampling Rate: {} Hz", config.sample_rate());
    println!("  Timing Model: {:?}", config.timing);
    println!("{}", "=".repeat(60));
}

fn print_results(config: &PwmConfig, analysis: &Analysis, mode_switches: usize, duty_updates: usize) {
    let stats = &analysis.stats;
    println!();
    println!("Waveform Statistics:");
    println!("  Average Duty Cycle: {:.2}%", stats.duty_percent());
    println!("  Min Value: {:.3}", stats.min);
    println!("  Max Value: {:.3}", stats.max);
    println!("  RMS Value: {:.3}", stats.rms);
    println!("  Mode Switches: {}", mode_switches);
    println!("  Duty Updates: {}", duty_updates);

    let carrier = config.carrier_hz as f32;
    if let Some((freq, db)) = analysis.spectrum.peak_in_band(carrier * 0.8, carrier * 1.2) {
        println!("  Carrier Peak: {:.1} Hz at {:.1} dB", freq, db);
    }
    for &mode_hz in &config.mode_frequencies {
        if let Some(db) = analysis.spectrum.magnitude_at(mode_hz as f32) {
            println!("  {:>6.0} Hz component: {:.1} dB", mode_hz, db);
        }
    }
    println!(
        "  Spectrogram: {} segments x {} bins",
        analysis.spectrogram.num_segments(),
        analysis.spectrogram.frequencies.len()
    );
}

fn print_captions(figures: &[Figure]) {
    for figure in figures {
        println!();
        println!("{}", figure.title);
        for caption in &figure.captions {
            println!("  {}", caption);
        }
    }
}

#[cfg(feature = "visualization")]
fn show(figures: Vec<Figure>) -> anyhow::Result<()> {
    let mut window = varpwm::visualization::PlotWindow::new(figures, 1600, 1000)?;
    println!();
    println!("Tab: next figure, Esc: quit");
    window.run();
    Ok(())
}

#[cfg(not(feature = "visualization"))]
fn show(_figures: Vec<Figure>) -> anyhow::Result<()> {
    println!();
    println!("Plot window requires the 'visualization' feature.");
    println!("Run with: cargo run --release --features visualization");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let config = args.to_config();
    config.validate()?;
    print_banner(&config);

    let waveform = generate_waveform(&config)?;
    let analysis = analysis::analyze(&waveform)?;
    print_results(
        &config,
        &analysis,
        waveform.mode_switches.len(),
        waveform.duty_updates,
    );

    let figures = vec![
        analysis_figure(&config, &waveform, &analysis.spectrum),
        spectrogram_figure(&config, &analysis.spectrogram),
    ];
    print_captions(&figures);

    if args.headless {
        return Ok(());
    }
    show(figures)
}
