//! AD9850 DDS backend
//!
//! f OUT = W × CLKIN / 2^32
//!
//! The 40 bit serial word is the 32 bit tuning word followed by the
//! control / phase byte, each byte LSB first, shifted in on the rising edge
//! of W_CLK and applied by a pulse on FQ_UD.

use embedded_hal::digital::v2::OutputPin;

use crate::{
    errors::*,
    fixed::div_round_half_up,
    frequency::{CrystalFrequency, Frequency},
    synth::Synthesizer,
};

/// Tuning word for `target` from a `clock` reference.
///
/// W = f OUT × 2^32 / CLKIN, with the output in 11.21 and the clock in 8.24
/// that is a 2^35 scale. `None` at or above half the clock.
pub fn tuning_word(target: Frequency, clock: CrystalFrequency) -> Option<u32> {
    let w = div_round_half_up(u64::from(target.raw()), clock.raw(), 32 + 3);
    if w < (1 << 31) {
        Some(w as u32)
    } else {
        None
    }
}


/// AD9850 device, serial load mode
pub struct Ad9850<DATA, WCLK, FQUD> {
    data: DATA,
    w_clk: WCLK,
    fq_ud: FQUD,
    control: u8,
    word: u32,
}

impl<DATA, WCLK, FQUD> Ad9850<DATA, WCLK, FQUD>
where DATA: OutputPin,
      WCLK: OutputPin,
      FQUD: OutputPin,
{
    /// Creates the device, pins are not touched.
    ///
    /// `data` - D7 serial data
    /// `w_clk` - word load clock
    /// `fq_ud` - frequency update
    ///
    pub fn new(data: DATA, w_clk: WCLK, fq_ud: FQUD) -> Self {
        Ad9850 { data, w_clk, fq_ud, control: 0, word: 0 }
    }

    /// Give back the pins
    pub fn release(self) -> (DATA, WCLK, FQUD) {
        (self.data, self.w_clk, self.fq_ud)
    }

    /// Control / phase byte sent after the tuning word
    pub fn set_control(&mut self, control: u8) {
        self.control = control;
    }

    /// Last loaded tuning word
    pub fn word(&self) -> u32 {
        self.word
    }

    /// Switches the part from parallel to serial load mode.
    /// Needs D2 = 1, D1 = 1, D0 = 0 strapped on the board.
    pub fn enable_serial(&mut self) -> Result<(), Error> {
        self.pulse_w_clk()?;
        self.pulse_fq_ud()
    }

    /// Shifts in the tuning word and control byte and applies them.
    pub fn load(&mut self, word: u32) -> Result<(), Error> {
        for b in word.to_le_bytes().iter() {
            self.output_byte(*b)?;
        }
        self.output_byte(self.control)?;
        self.pulse_fq_ud()?;
        self.word = word;
        Ok(())
    }

    fn output_byte(&mut self, mut b: u8) -> Result<(), Error> {
        for _ in 0..8 {
            if b & 1 == 1 {
                self.data.set_high().map_err(|_| Error::Pin)?;
            } else {
                self.data.set_low().map_err(|_| Error::Pin)?;
            }
            self.pulse_w_clk()?;
            b >>= 1;
        }
        Ok(())
    }

    #[inline(always)]
    fn pulse_w_clk(&mut self) -> Result<(), Error> {
        self.w_clk.set_high().map_err(|_| Error::Pin)?;
        self.w_clk.set_low().map_err(|_| Error::Pin)
    }

    #[inline(always)]
    fn pulse_fq_ud(&mut self) -> Result<(), Error> {
        self.fq_ud.set_high().map_err(|_| Error::Pin)?;
        self.fq_ud.set_low().map_err(|_| Error::Pin)
    }
}


impl<DATA, WCLK, FQUD> Synthesizer for Ad9850<DATA, WCLK, FQUD>
where DATA: OutputPin,
      WCLK: OutputPin,
      FQUD: OutputPin,
{
    type Dividers = ();

    fn plan(&self, target: Frequency, xtal: CrystalFrequency) -> Option<()> {
        tuning_word(target, xtal).map(|_| ())
    }

    fn load_full(&mut self, target: Frequency, _: (), xtal: CrystalFrequency) -> Result<(), Error> {
        let word = tuning_word(target, xtal).ok_or(Error::UnrepresentableFrequency)?;
        self.load(word)
    }

    /// Phase continuous anyway
    fn load_fractional(&mut self, target: Frequency, d: (), xtal: CrystalFrequency) -> Result<(), Error> {
        self.load_full(target, d, xtal)
    }
}
