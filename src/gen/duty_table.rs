//! Seeded random duty-cycle table
//!
//! The table is filled once from a PCG32 stream so that a given seed always
//! produces the same duty sequence.

use crate::config::{FirmwareTiming, PwmConfig, DUTY_FULL_SCALE, LEDC_DUTY_RESOLUTION_BITS};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Create the generator used for table filling
pub fn create_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Convert a raw 8-bit duty value into a fraction of the carrier period
pub fn scale_duty(value: u8, timing: FirmwareTiming) -> f64 {
    match timing {
        FirmwareTiming::Ideal => value as f64 / DUTY_FULL_SCALE as f64,
        FirmwareTiming::Ledc => {
            let register_max = (1u32 << LEDC_DUTY_RESOLUTION_BITS) - 1;
            // Integer division, same as the register write
            let code = value as u32 * register_max / DUTY_FULL_SCALE as u32;
            code as f64 / register_max as f64
        }
    }
}

/// Immutable table of raw duty values in `[duty_min, duty_max]`
#[derive(Debug, Clone, PartialEq)]
pub struct DutyTable {
    values: Vec<u8>,
    timing: FirmwareTiming,
}

impl DutyTable {
    /// Fill a table of `config.table_size` entries from `config.seed`
    pub fn generate(config: &PwmConfig) -> Self {
        let mut rng = create_rng(config.seed);
        let values = (0..config.table_size)
            .map(|_| rng.gen_range(config.duty_min..=config.duty_max))
            .collect();

        Self {
            values,
            timing: config.timing,
        }
    }

    /// Build a table from explicit values. Returns `None` for an empty list.
    pub fn from_values(values: Vec<u8>, timing: FirmwareTiming) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self { values, timing })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn timing(&self) -> FirmwareTiming {
        self.timing
    }

    /// Raw value at `index`, wrapping around the table
    pub fn get(&self, index: usize) -> u8 {
        self.values[index % self.values.len()]
    }

    /// Scale a raw value using this table's timing model
    pub fn scale(&self, value: u8) -> f64 {
        scale_duty(value, self.timing)
    }

    /// Duty fraction at `index`, wrapping around the table
    pub fn fraction_at(&self, index: usize) -> f64 {
        self.scale(self.get(index))
    }

    /// Mean raw value, useful as the expected long-run duty
    pub fn mean(&self) -> f64 {
        let sum: u64 = self.values.iter().map(|&v| v as u64).sum();
        sum as f64 / self.values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ideal_scaling() {
        assert_eq!(scale_duty(0, FirmwareTiming::Ideal), 0.0);
        assert_eq!(scale_duty(255, FirmwareTiming::Ideal), 1.0);
        assert!((scale_duty(51, FirmwareTiming::Ideal) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_ledc_scaling_matches_register() {
        // 51 * 1023 / 255 = 204 (truncated), 204 * 1023 / 255 = 818
        assert_eq!(scale_duty(51, FirmwareTiming::Ledc), 204.0 / 1023.0);
        assert_eq!(scale_duty(204, FirmwareTiming::Ledc), 818.0 / 1023.0);
        assert_eq!(scale_duty(255, FirmwareTiming::Ledc), 1.0);
    }

    #[test]
    fn test_get_wraps() {
        let table = DutyTable::from_values(vec![10, 20, 30], FirmwareTiming::Ideal).unwrap();
        assert_eq!(table.get(0), 10);
        assert_eq!(table.get(3), 10);
        assert_eq!(table.get(5), 30);
    }

    #[test]
    fn test_empty_values_rejected() {
        assert!(DutyTable::from_values(Vec::new(), FirmwareTiming::Ideal).is_none());
    }
}
