//! Constants

/// Minimum internal oscillator (DCO) frequency, MHz
pub const DCO_MIN_MHZ: u16 = 4850;

/// Maximum internal oscillator (DCO) frequency, MHz.
/// Not enforced by the divider search, kept for callers that want to range check.
pub const DCO_MAX_MHZ: u16 = 5670;

/// High speed divider values in search order.
/// 8 and 10 are not implemented by the chip.
pub const HS_DIV_VALUES: [u8; 6] = [11, 9, 7, 6, 5, 4];

/// Largest N1 output divider
pub const N1_MAX: u8 = 128;

/// First register of the 6 byte HS_DIV / N1 / RFREQ block
pub const REG_RFREQ_BLOCK: u8 = 7;

/// Reset / Freeze M / Memory control register
pub const REG_RESET_FREEZE_MEMCTRL: u8 = 135;

/// Freeze DCO register
pub const REG_FREEZE_DCO: u8 = 137;

/// NewFreq bit of register 135, applies the new RFREQ / divider block
pub const NEW_FREQ: u8 = 0x40;

/// Freeze DCO bit of register 137
pub const FREEZE_DCO: u8 = 0x10;

/// Default 7 bit bus address
pub const DEFAULT_I2C_ADDRESS: u8 = 0x55;

/// Nominal crystal, 114.285 MHz in 8.24 fixed point
pub const DEFAULT_XTAL: u32 = 1_917_384_130;

/// Startup frequency, 28.2 MHz (4 x 7.050 MHz) in 11.21 fixed point
pub const DEFAULT_FREQ: u32 = 59_139_686;

/// Smooth tune window
pub const DEFAULT_SMOOTH_TUNE_PPM: u16 = 3500;

/// Lowest crystal / DDS clock accepted by the configuration, MHz
pub const XTAL_MIN_MHZ: u32 = 1;

/// Highest crystal / DDS clock accepted by the configuration, MHz
pub const XTAL_MAX_MHZ: u32 = 255;
