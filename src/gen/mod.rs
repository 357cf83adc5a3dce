pub mod duty_table;
pub mod pwm;
pub mod waveform;

pub use self::duty_table::*;
pub use self::pwm::*;
pub use self::waveform::*;
