//! Console logging for the simulator binary

use log::LevelFilter;

/// Initialize the logger at INFO, or DEBUG when `verbose` is set.
/// The RUST_LOG environment variable still takes precedence for module filters.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // try_init so repeated calls (tests, embedding) don't panic
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.module_path().unwrap_or("varpwm"),
                record.args()
            )
        })
        .try_init();
}
