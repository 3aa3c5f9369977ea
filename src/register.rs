//! Si570 frequency control registers 7 to 12
//!
//! ```text
//! reg  7: HS_DIV[2:0] N1[6:2]
//! reg  8: N1[1:0]     RFREQ[37:32]
//! reg  9: RFREQ[31:24]
//! reg 10: RFREQ[23:16]
//! reg 11: RFREQ[15:8]
//! reg 12: RFREQ[7:0]
//! ```
//!
//! The six registers are kept as one 48 bit word, register 7 in the top byte.

use core::convert::TryFrom;

use crate::{
    divider::DividerPair,
    fixed::*,
    frequency::{CrystalFrequency, Frequency},
};

/// Bit operations on the 48 bit register word
pub trait BitField {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;

    #[inline]
    fn mask() -> u64 {
        !(0xFFFF_FFFF_FFFF_FFFFu64 << Self::num_bits())
    }
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
    ($n:ident, $nb:tt, $off:tt) => {
        impl BitField for $n {
            #[inline] fn num_bits() -> u8 { $nb }
            #[inline] fn offset() -> u8 { $off }
        }
    }
}

/// Raw register field boilerplate
macro_rules! gen_bitfield_struct {
    ($(#[$meta:meta])*, $n:ident, $v:ty, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $n(pub $v);

        gen_bitfield_impl!($n, $nb, $off);

        impl From<u64> for $n { #[inline] fn from(x: u64) -> Self { $n(x as $v) } }
        impl From<$n> for u64 { #[inline] fn from(x: $n) -> u64 { x.0 as u64 } }
    };
}


gen_bitfield_struct!(
    /// High speed divider, register value is HS_DIV - 4.
    /// 0b100 and 0b110 (8 and 10) are not implemented.
    , HsDivField, u8, 3, 45
);

gen_bitfield_struct!(
    /// Output divider, register value is N1 - 1.
    /// Spans registers 7 and 8.
    , N1Field, u8, 7, 38
);

gen_bitfield_struct!(
    /// Reference frequency multiplier, 12.28 fixed point.
    /// f DCO = f XTAL × RFREQ
    , Rfreq, u64, 38, 0
);


/// Registers 7..=12 as written to / read from the chip
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct RegisterImage {
    /// Register word, register 7 in bits 47:40
    pub w: u64,
}

impl RegisterImage {
    /// Number of registers in the block
    pub const LEN: usize = 6;

    /// Get register bitfield value
    #[inline]
    pub fn get<F>(&self) -> F
    where F: BitField + From<u64>
    {
        F::from((self.w >> F::offset()) & F::mask())
    }

    /// Update register bitfield
    #[inline]
    pub fn set<F>(mut self, f: F) -> Self
    where F: BitField + Into<u64>
    {
        let fbits = (f.into() & F::mask()) << F::offset();
        let rbits = self.w & !(F::mask() << F::offset());
        self.w = rbits | fbits;
        self
    }

    /// Image from register bytes, register 7 first
    pub fn from_bytes(b: [u8; Self::LEN]) -> Self {
        let w = b.iter().fold(0u64, |w, &x| (w << 8) | u64::from(x));
        RegisterImage { w }
    }

    /// Register bytes in bus order, register 7 first
    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut b = [0u8; Self::LEN];
        for (i, x) in b.iter_mut().enumerate() {
            *x = (self.w >> (8 * (Self::LEN - 1 - i))) as u8;
        }
        b
    }

    /// HS_DIV value (not the register field)
    #[inline]
    pub fn hs_div(&self) -> u8 {
        self.get::<HsDivField>().0 + 4
    }

    /// N1 value (not the register field)
    #[inline]
    pub fn n1(&self) -> u8 {
        self.get::<N1Field>().0 + 1
    }

    /// Divider pair if the image holds a legal one
    pub fn dividers(&self) -> Option<DividerPair> {
        DividerPair::new(self.n1(), self.hs_div())
    }

    /// Register image for `target` using `dividers`.
    ///
    /// RFREQ = f OUT × N1 × HS_DIV / f XTAL
    ///
    /// With the output frequency in 11.21 and the crystal in 8.24 the plain
    /// quotient is in units of 2^-3, so the 12.28 result is scaled by 2^31.
    /// The product is at most 48 bits, the quotient is rounded half up.
    ///
    /// The resulting DCO frequency is not range checked.
    pub fn encode(target: Frequency, dividers: DividerPair, xtal: CrystalFrequency) -> Self {
        let product = mul_accurate(dividers.total(), target.raw());
        let rfreq = div_round_half_up(product, xtal.raw(), 3 + 28);

        RegisterImage::default()
            .set(HsDivField(dividers.hs_div() - 4))
            .set(N1Field(dividers.n1() - 1))
            .set(Rfreq(rfreq))
    }

    /// Output frequency programmed by this image.
    ///
    /// f OUT = f XTAL × RFREQ / (N1 × HS_DIV)
    ///
    /// 8.24 × 12.28 is a 20.52 product, shifting out 31 bits leaves 19.21 which
    /// is divided by the total divider and rounded half up to 11.21.
    /// Doesn't validate the dividers, 8 and 10 decode as written.
    ///
    /// `None` if the result doesn't fit 11.21, i.e. 2048 MHz and above.
    pub fn decode(&self, xtal: CrystalFrequency) -> Option<Frequency> {
        let rfreq: Rfreq = self.get();
        let total = u32::from(self.n1()) * u32::from(self.hs_div());
        let dco = mul_wide_shr(xtal.raw(), rfreq.0, 31);
        u32::try_from(div_round_half_up(dco, total, 0)).ok().map(Frequency)
    }
}
