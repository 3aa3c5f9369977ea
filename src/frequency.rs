//! Fixed point frequency types

use core::fmt;

use crate::constants::*;

/// Output frequency, MHz in 11.21 fixed point.
///
/// 1 LSB is 2^-21 MHz, about 0.477 Hz.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Frequency(pub u32);

impl Frequency {
    /// Number of fraction bits
    pub const FRACTION_BITS: u32 = 21;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Frequency(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Nearest 11.21 value to `hz`
    pub fn from_hz(hz: u32) -> Self {
        let scaled = (u64::from(hz) << Self::FRACTION_BITS) + 500_000;
        Frequency((scaled / 1_000_000) as u32)
    }

    /// Nearest 11.21 value to `mhz`
    pub fn from_mhz(mhz: f64) -> Self {
        Frequency((mhz * (1u32 << Self::FRACTION_BITS) as f64 + 0.5) as u32)
    }

    /// Frequency rounded to whole Hz
    pub fn to_hz(self) -> u32 {
        ((u64::from(self.0) * 1_000_000 + (1 << (Self::FRACTION_BITS - 1))) >> Self::FRACTION_BITS) as u32
    }

    /// Integer MHz part
    #[inline]
    pub const fn whole_mhz(self) -> u32 {
        self.0 >> Self::FRACTION_BITS
    }

    /// Absolute difference in 11.21 units
    #[inline]
    pub fn abs_diff(self, other: Frequency) -> u32 {
        if self.0 > other.0 { self.0 - other.0 } else { other.0 - self.0 }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hz = self.to_hz();
        write!(f, "{}.{:06} MHz", hz / 1_000_000, hz % 1_000_000)
    }
}


/// Crystal (reference) frequency, MHz in 8.24 fixed point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CrystalFrequency(pub u32);

impl CrystalFrequency {
    /// Number of fraction bits
    pub const FRACTION_BITS: u32 = 24;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        CrystalFrequency(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Nearest 8.24 value to `hz`
    pub fn from_hz(hz: u32) -> Self {
        let scaled = (u64::from(hz) << Self::FRACTION_BITS) + 500_000;
        CrystalFrequency((scaled / 1_000_000) as u32)
    }

    /// Nearest 8.24 value to `mhz`
    pub fn from_mhz(mhz: f64) -> Self {
        CrystalFrequency((mhz * (1u32 << Self::FRACTION_BITS) as f64 + 0.5) as u32)
    }

    /// Integer MHz part
    #[inline]
    pub const fn whole_mhz(self) -> u32 {
        self.0 >> Self::FRACTION_BITS
    }

    /// True if this is a usable reference.
    /// Everything downstream divides by the crystal frequency.
    pub fn is_valid(self) -> bool {
        (XTAL_MIN_MHZ..=XTAL_MAX_MHZ).contains(&self.whole_mhz())
    }
}

impl Default for CrystalFrequency {
    fn default() -> Self {
        CrystalFrequency(DEFAULT_XTAL)
    }
}


/// Smooth tune tolerance. 0 disables smooth tuning.
///
/// A tuning constant, not a literal ppm window: the allowed step is
/// `whole MHz × value / 15` in 11.21 units, so the real window is about
/// value / 31.5 ppm (3500 is roughly ±111 ppm, ±11 kHz at 100 MHz).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ppm(pub u16);

impl Ppm {
    #[inline]
    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }
}
