//! Two wire bus capabilities
//!
//! The synthesizer only talks to the chip through [`BusTransaction`], a byte
//! level start / write / read / stop interface, and checks that the chip is
//! powered through [`BusPresence`]. Adapters for embedded-hal I2C
//! peripherals and input pins are provided.

use embedded_hal::{
    blocking::i2c::{Read, Write, WriteRead},
    digital::v2::InputPin,
};

/// Byte level bus transaction
pub trait BusTransaction {
    type Error;

    /// Start condition. A start inside an open transaction is a repeated start.
    /// Opening a new transaction clears the error flag.
    fn start(&mut self);

    /// Send one byte, the first byte after a start is the address byte
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Receive one byte, `last` NACKs it to end the read
    fn read_byte(&mut self, last: bool) -> Result<u8, Self::Error>;

    /// Receive `buffer.len()` bytes, NACKing the last one
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let last = buffer.len().saturating_sub(1);
        for (i, b) in buffer.iter_mut().enumerate() {
            *b = self.read_byte(i == last)?;
        }
        Ok(())
    }

    /// Stop condition, always leaves the bus idle
    fn stop(&mut self);

    /// True if anything failed since the transaction was opened
    fn had_error(&self) -> bool;
}

/// Chip power / bus pull-up check
pub trait BusPresence {
    fn is_present(&self) -> bool;
}


/// [`I2cBus`] failure
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum I2cBusError<E> {
    /// The I2C peripheral failed
    I2c(E),
    /// Bytes out of order, e.g. a read after a write address or a too long write
    Sequence,
}

/// Largest write segment buffered between start and stop:
/// register address plus the 6 byte frequency block.
const SEGMENT_LEN: usize = 8;

/// [`BusTransaction`] over an embedded-hal blocking I2C peripheral.
///
/// Written bytes are collected and sent as one `write` when the transaction
/// is stopped. A write segment followed by a repeated start and a read of the
/// same device becomes one `write_read`, so the register pointer write and
/// the read share a transaction.
pub struct I2cBus<I2C> {
    i2c: I2C,
    /// Address byte of the current segment
    address: Option<u8>,
    /// Device the buffered write segment goes to
    target: Option<u8>,
    segment: [u8; SEGMENT_LEN],
    len: usize,
    open: bool,
    error: bool,
}

impl<I2C, E> I2cBus<I2C>
where I2C: Write<Error = E> + Read<Error = E> + WriteRead<Error = E>,
{
    pub fn new(i2c: I2C) -> Self {
        I2cBus {
            i2c,
            address: None,
            target: None,
            segment: [0; SEGMENT_LEN],
            len: 0,
            open: false,
            error: false,
        }
    }

    /// Give back the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Sends the buffered write segment on its own
    fn flush(&mut self) {
        if let Some(device) = self.target.take() {
            if self.len > 0 && !self.error {
                if self.i2c.write(device, &self.segment[..self.len]).is_err() {
                    self.error = true;
                }
            }
        }
        self.len = 0;
    }
}

impl<I2C, E> BusTransaction for I2cBus<I2C>
where I2C: Write<Error = E> + Read<Error = E> + WriteRead<Error = E>,
{
    type Error = I2cBusError<E>;

    fn start(&mut self) {
        if !self.open {
            self.error = false;
            self.target = None;
            self.len = 0;
        }
        // on a repeated start the write segment stays buffered for a read
        self.open = true;
        self.address = None;
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        match self.address {
            None => {
                if byte & 1 == 0 {
                    self.flush();
                    self.target = Some(byte >> 1);
                }
                self.address = Some(byte);
                Ok(())
            }
            Some(addr) if addr & 1 == 0 && self.len < SEGMENT_LEN => {
                self.segment[self.len] = byte;
                self.len += 1;
                Ok(())
            }
            Some(_) => {
                self.error = true;
                Err(I2cBusError::Sequence)
            }
        }
    }

    fn read_byte(&mut self, _last: bool) -> Result<u8, Self::Error> {
        let mut b = [0u8; 1];
        self.read_bytes(&mut b)?;
        Ok(b[0])
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let device = match self.address {
            Some(addr) if addr & 1 == 1 => addr >> 1,
            _ => {
                self.error = true;
                return Err(I2cBusError::Sequence);
            }
        };

        let res = if self.target == Some(device) && self.len > 0 {
            let res = self.i2c.write_read(device, &self.segment[..self.len], buffer);
            self.target = None;
            self.len = 0;
            res
        } else {
            self.flush();
            self.i2c.read(device, buffer)
        };

        res.map_err(|e| {
            self.error = true;
            I2cBusError::I2c(e)
        })
    }

    fn stop(&mut self) {
        self.flush();
        self.open = false;
        self.address = None;
    }

    fn had_error(&self) -> bool {
        self.error
    }
}


/// [`BusPresence`] from an input pin that reads high when the chip is powered,
/// e.g. the SCL line with its pull-up on the chip supply.
pub struct PinPresence<P> {
    pin: P,
}

impl<P> PinPresence<P>
where P: InputPin,
{
    pub fn new(pin: P) -> Self {
        PinPresence { pin }
    }

    pub fn release(self) -> P {
        self.pin
    }
}

impl<P> BusPresence for PinPresence<P>
where P: InputPin,
{
    fn is_present(&self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}
