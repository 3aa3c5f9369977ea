//! Output divider selection
//!
//! The DCO runs between 4850 and 5670 MHz and is divided down to the output
//! frequency by two cascaded dividers:
//! f OUT = f DCO / (HS_DIV × N1)
//!
//! The search picks the pair with the smallest total division that still keeps
//! the DCO at or above its minimum, i.e. the lowest usable DCO frequency.
//!
//! NOTE: this only works for the "B" and "C" speed grades. The frequency gaps
//! of the "A" grade parts are not checked.

use crate::{constants::*, frequency::Frequency};

/// HS_DIV / N1 divider pair
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DividerPair {
    n1: u8,
    hs_div: u8,
}

impl DividerPair {
    /// Valid pair or `None`.
    /// HS_DIV must be one of 4, 5, 6, 7, 9, 11; N1 must be 1 or even, up to 128.
    pub fn new(n1: u8, hs_div: u8) -> Option<Self> {
        let n1_ok = n1 == 1 || (n1 >= 2 && n1 % 2 == 0 && n1 <= N1_MAX);
        let hs_ok = HS_DIV_VALUES.contains(&hs_div);
        if n1_ok && hs_ok {
            Some(DividerPair { n1, hs_div })
        } else {
            None
        }
    }

    /// N1, low speed divider
    #[inline]
    pub fn n1(self) -> u8 {
        self.n1
    }

    /// HS_DIV, high speed divider
    #[inline]
    pub fn hs_div(self) -> u8 {
        self.hs_div
    }

    /// Total division N1 × HS_DIV
    #[inline]
    pub fn total(self) -> u16 {
        u16::from(self.n1) * u16::from(self.hs_div)
    }
}


/// Find the divider pair with the lowest DCO frequency for `target`.
///
/// Returns `None` when no legal pair exists, which happens below 3.5 MHz.
pub fn search(target: Frequency) -> Option<DividerPair> {
    // 11.3 bits, the rest of the fraction isn't needed for the estimate
    let coarse = target.raw() >> 18;
    if coarse == 0 {
        return None;
    }

    // Total division needed, 16.0 bits = 13.3 bits / 11.3 bits.
    // The remainder is dropped so this is one too low unless it divides exactly,
    // the +1 below always rounds up past DCO_MIN.
    let n0 = (u32::from(DCO_MIN_MHZ) << 3) / coarse;

    let mut best: Option<DividerPair> = None;
    for &hs_div in HS_DIV_VALUES.iter() {
        let mut n1 = n0 / u32::from(hs_div) + 1;
        if n1 > u32::from(N1_MAX) {
            continue;
        }

        // only 1 and even N1 values are implemented
        if n1 != 1 && n1 % 2 == 1 {
            n1 += 1;
        }

        let candidate = DividerPair { n1: n1 as u8, hs_div };
        match best {
            // ties go to the lower HS_DIV
            Some(b) if b.total() < candidate.total() => {}
            _ => best = Some(candidate),
        }
    }

    best
}


#[cfg(test)]
mod tests {
    use super::*;

    fn mhz(f: f64) -> Frequency {
        Frequency::from_mhz(f)
    }

    fn dco_mhz(f: f64, d: DividerPair) -> f64 {
        f * d.total() as f64
    }

    #[test]
    fn startup_frequency() {
        let d = search(Frequency(DEFAULT_FREQ)).unwrap();
        assert_eq!(d.hs_div(), 4);
        assert_eq!(d.n1(), 44);
        assert_eq!(d.total(), 176);
    }

    #[test]
    fn known_dividers() {
        let cases = [
            (3.5, 126, 11),
            (10.0, 54, 9),
            (50.0, 14, 7),
            (160.0, 8, 4),
            (280.0, 2, 9),
            (810.0, 1, 6),
            (1417.5, 1, 4),
        ];
        for &(f, n1, hs_div) in cases.iter() {
            let d = search(mhz(f)).unwrap();
            assert_eq!((d.n1(), d.hs_div()), (n1, hs_div), "{} MHz", f);
        }
    }

    #[test]
    fn dco_never_below_minimum() {
        let mut f = 3.5;
        while f < 1400.0 {
            let d = search(mhz(f)).unwrap();
            assert!(dco_mhz(f, d) >= DCO_MIN_MHZ as f64, "{} MHz -> {:?}", f, d);
            f += 0.73;
        }
    }

    #[test]
    fn too_low_is_unrepresentable() {
        assert_eq!(search(Frequency(0)), None);
        assert_eq!(search(mhz(0.1)), None);
        assert_eq!(search(mhz(0.2)), None);
        assert_eq!(search(mhz(3.49)), None);
        assert!(search(mhz(3.5)).is_some());
    }

    #[test]
    fn pair_validation() {
        assert!(DividerPair::new(1, 4).is_some());
        assert!(DividerPair::new(128, 11).is_some());
        assert!(DividerPair::new(3, 4).is_none());
        assert!(DividerPair::new(130, 4).is_none());
        assert!(DividerPair::new(2, 8).is_none());
        assert!(DividerPair::new(2, 10).is_none());
        assert!(DividerPair::new(0, 5).is_none());
    }
}
