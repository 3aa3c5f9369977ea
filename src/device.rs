//! Si570 bus protocol

use log::trace;

use crate::{
    bus::BusTransaction,
    config::Config,
    constants::*,
    divider::{self, DividerPair},
    errors::*,
    frequency::{CrystalFrequency, Frequency},
    register::RegisterImage,
    synth::Synthesizer,
};

/// Si570 device
pub struct Si570<B> {
    bus: B,
    address: u8,
    image: RegisterImage,
}


impl<B> Si570<B>
where B: BusTransaction,
{
    /// Creates the device, nothing is sent.
    ///
    /// `bus` - two wire bus to the chip
    /// `address` - 7 bit bus address, 0x55 on most parts
    ///
    pub fn new(bus: B, address: u8) -> Self {
        Si570 { bus, address, image: RegisterImage::default() }
    }

    /// Creates the device at the configured bus address.
    pub fn from_config(bus: B, config: &Config) -> Self {
        Self::new(bus, config.i2c_address)
    }

    /// Give back the bus
    pub fn release(self) -> B {
        self.bus
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Last computed frequency control registers
    pub fn image(&self) -> RegisterImage {
        self.image
    }

    /// Runs `f` between a start and a stop condition.
    /// The stop is always sent, a failing byte ends the transaction early.
    fn transaction<T, F>(&mut self, f: F) -> Result<T, Error>
    where F: FnOnce(&mut B, u8) -> Result<T, B::Error>,
    {
        self.bus.start();
        let res = f(&mut self.bus, self.address << 1);
        self.bus.stop();

        match res {
            Ok(v) if !self.bus.had_error() => Ok(v),
            _ => Err(Error::BusTransaction),
        }
    }

    /// Writes a single register.
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        trace!("si570 reg {} <- {:#04x}", reg, value);
        self.transaction(|bus, addr| {
            bus.write_byte(addr)?;
            bus.write_byte(reg)?;
            bus.write_byte(value)
        })
    }

    /// Stops the DCO from following register changes.
    #[inline]
    pub fn freeze_dco(&mut self) -> Result<(), Error> {
        self.write_register(REG_FREEZE_DCO, FREEZE_DCO)
    }

    #[inline]
    pub fn unfreeze_dco(&mut self) -> Result<(), Error> {
        self.write_register(REG_FREEZE_DCO, 0)
    }

    /// Strobes NewFreq, the chip recalibrates to the new divider / RFREQ values.
    #[inline]
    pub fn new_frequency(&mut self) -> Result<(), Error> {
        self.write_register(REG_RESET_FREEZE_MEMCTRL, NEW_FREQ)
    }

    /// Writes registers 7..=12 in one block.
    pub fn write_image(&mut self, image: &RegisterImage) -> Result<(), Error> {
        let bytes = image.to_bytes();
        trace!("si570 regs 7..12 <- {:02x?}", bytes);
        self.transaction(|bus, addr| {
            bus.write_byte(addr)?;
            bus.write_byte(REG_RFREQ_BLOCK)?;
            for b in bytes.iter() {
                bus.write_byte(*b)?;
            }
            Ok(())
        })
    }

    /// Reads registers 7..=12 back from the chip.
    pub fn read_image(&mut self) -> Result<RegisterImage, Error> {
        let bytes = self.transaction(|bus, addr| {
            bus.write_byte(addr)?;
            bus.write_byte(REG_RFREQ_BLOCK)?;
            bus.start();
            bus.write_byte(addr | 1)?;

            let mut bytes = [0u8; RegisterImage::LEN];
            bus.read_bytes(&mut bytes)?;
            Ok(bytes)
        })?;
        trace!("si570 regs 7..12 -> {:02x?}", bytes);
        Ok(RegisterImage::from_bytes(bytes))
    }

    /// Full load: freeze the DCO, write the block, unfreeze, apply.
    /// Stops at the first failing step.
    pub fn load(&mut self, image: &RegisterImage) -> Result<(), Error> {
        self.freeze_dco()?;
        self.write_image(image)?;
        self.unfreeze_dco()?;
        self.new_frequency()
    }
}


impl<B> Synthesizer for Si570<B>
where B: BusTransaction,
{
    type Dividers = DividerPair;

    fn plan(&self, target: Frequency, _xtal: CrystalFrequency) -> Option<DividerPair> {
        divider::search(target)
    }

    fn load_full(
        &mut self,
        target: Frequency,
        dividers: DividerPair,
        xtal: CrystalFrequency,
    ) -> Result<(), Error> {
        self.image = RegisterImage::encode(target, dividers, xtal);
        let image = self.image;
        self.load(&image)
    }

    /// Small RFREQ changes are applied by the chip without a glitch,
    /// no freeze or NewFreq strobe.
    fn load_fractional(
        &mut self,
        target: Frequency,
        dividers: DividerPair,
        xtal: CrystalFrequency,
    ) -> Result<(), Error> {
        self.image = RegisterImage::encode(target, dividers, xtal);
        let image = self.image;
        self.write_image(&image)
    }
}
