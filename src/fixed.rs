//! Fixed point multiply / divide primitives.
//!
//! All frequency conversions go through these so that encoding a register
//! image and decoding it again agree bit for bit.

/// Exact 16 x 32 bit product, the result always fits in 48 bits.
#[inline]
pub fn mul_accurate(multiplicand: u16, multiplier: u32) -> u64 {
    u64::from(multiplicand) * u64::from(multiplier)
}

/// `floor(multiplicand * multiplier / 2^shift)` for a multiplier wider than 32 bits.
///
/// The multiplier is split into two 32 bit halves so that no intermediate
/// needs more than 64 bits:
/// `a * (hi * 2^32 + lo) >> s == (a * hi) << (32 - s) + (a * lo) >> s`.
///
/// `shift` must not exceed 32 and `multiplicand * (multiplier >> 32)` must
/// fit in `64 - (32 - shift)` bits.
#[inline]
pub fn mul_wide_shr(multiplicand: u32, multiplier: u64, shift: u32) -> u64 {
    debug_assert!(shift <= 32);
    let a = u64::from(multiplicand);
    let hi = a * (multiplier >> 32);
    let lo = a * (multiplier & 0xFFFF_FFFF);
    (hi << (32 - shift)) + (lo >> shift)
}

/// Restoring binary long division of `dividend * 2^scale` by `divisor`,
/// rounded half up.
///
/// Runs a fixed `64 + scale + 1` shift/subtract steps: one per dividend bit,
/// one per scale bit and one extra quotient bit which is added to the
/// truncated result. Ties therefore always round up, never to even.
///
/// The quotient must fit in 63 bits. A zero divisor doesn't trap, it
/// produces an all ones quotient.
pub fn div_round_half_up(dividend: u64, divisor: u32, scale: u32) -> u64 {
    let divisor = u64::from(divisor);
    let mut remainder: u64 = 0;
    let mut quotient: u64 = 0;

    for step in 0..(u64::BITS + scale + 1) {
        let bit = if step < u64::BITS {
            (dividend >> (u64::BITS - 1 - step)) & 1
        } else {
            0
        };
        remainder = (remainder << 1) | bit;
        quotient <<= 1;
        if remainder >= divisor {
            remainder -= divisor;
            quotient |= 1;
        }
    }

    (quotient >> 1) + (quotient & 1)
}
