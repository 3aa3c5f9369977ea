//! Synthesizer backend interface

use crate::{
    errors::*,
    frequency::{CrystalFrequency, Frequency},
};

/// A frequency source the controller can drive.
///
/// A full load may change every setting of the part; a fractional load only
/// touches the fine tuning value and must not glitch the output. Parts that
/// never glitch can implement both the same way.
pub trait Synthesizer {
    /// Coarse setting kept from a full load and reused by fractional loads
    type Dividers: Copy + core::fmt::Debug;

    /// Coarse setting for `target`, `None` if the part can't produce it
    fn plan(&self, target: Frequency, xtal: CrystalFrequency) -> Option<Self::Dividers>;

    /// Program everything
    fn load_full(
        &mut self,
        target: Frequency,
        dividers: Self::Dividers,
        xtal: CrystalFrequency,
    ) -> Result<(), Error>;

    /// Retune within the window of the last full load
    fn load_fractional(
        &mut self,
        target: Frequency,
        dividers: Self::Dividers,
        xtal: CrystalFrequency,
    ) -> Result<(), Error>;
}
