//! Errors

use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// No valid divider pair (or DDS tuning word) exists for the requested frequency
    UnrepresentableFrequency,

    /// A byte level bus operation failed or the transaction reported an error
    BusTransaction,

    /// Bus presence check failed, nothing was sent
    BusAbsent,

    /// GPIO pin error
    Pin,

    /// Crystal / reference clock outside of the supported range
    InvalidCrystalFrequency,

    /// Configured startup frequency can't be synthesized
    InvalidStartupFrequency,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::UnrepresentableFrequency => "frequency out of synthesizer range",
            Error::BusTransaction => "bus transaction failed",
            Error::BusAbsent => "bus not present",
            Error::Pin => "pin error",
            Error::InvalidCrystalFrequency => "invalid crystal frequency",
            Error::InvalidStartupFrequency => "invalid startup frequency",
        };
        f.write_str(msg)
    }
}
