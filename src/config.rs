//! Synthesizer configuration

use crate::{
    constants::*,
    divider,
    errors::*,
    frequency::{CrystalFrequency, Frequency, Ppm},
};

/// Run time settings.
///
/// Defaults are the factory settings of a fresh unit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Crystal (or DDS reference clock) frequency
    pub crystal: CrystalFrequency,

    /// Smooth tune tolerance, 0 always reprograms the dividers.
    /// Not a literal ppm window, see [`Ppm`].
    pub smooth_tune_ppm: Ppm,

    /// Frequency programmed when the chip first shows up on the bus
    pub startup_frequency: Frequency,

    /// 7 bit bus address of the chip
    pub i2c_address: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            crystal: CrystalFrequency(DEFAULT_XTAL),
            smooth_tune_ppm: Ppm(DEFAULT_SMOOTH_TUNE_PPM),
            startup_frequency: Frequency(DEFAULT_FREQ),
            i2c_address: DEFAULT_I2C_ADDRESS,
        }
    }
}

impl Config {
    pub fn with_crystal(mut self, crystal: CrystalFrequency) -> Self {
        self.crystal = crystal;
        self
    }

    pub fn with_smooth_tune(mut self, ppm: Ppm) -> Self {
        self.smooth_tune_ppm = ppm;
        self
    }

    pub fn with_startup_frequency(mut self, f: Frequency) -> Self {
        self.startup_frequency = f;
        self
    }

    pub fn with_i2c_address(mut self, address: u8) -> Self {
        self.i2c_address = address;
        self
    }

    /// Check the settings before they are handed to the controller.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.crystal.is_valid() {
            return Err(Error::InvalidCrystalFrequency);
        }
        if divider::search(self.startup_frequency).is_none() {
            return Err(Error::InvalidStartupFrequency);
        }
        Ok(())
    }
}
