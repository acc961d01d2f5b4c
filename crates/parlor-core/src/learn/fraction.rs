use core::cmp::Ordering;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Exact non-negative rational kept in lowest terms.
///
/// Comparisons cross-multiply in `u128`, so equal ratios compare equal on
/// every platform regardless of how they were produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fraction {
    numer: u64,
    denom: u64,
}

impl Fraction {
    pub const ZERO: Fraction = Fraction { numer: 0, denom: 1 };
    pub const ONE: Fraction = Fraction { numer: 1, denom: 1 };
    pub const HALF: Fraction = Fraction { numer: 1, denom: 2 };

    /// Returns `None` for a zero denominator.
    pub fn new(numer: u64, denom: u64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let divisor = gcd(numer, denom);
        Some(Self {
            numer: numer / divisor,
            denom: denom / divisor,
        })
    }

    pub const fn numer(self) -> u64 {
        self.numer
    }

    pub const fn denom(self) -> u64 {
        self.denom
    }

    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Sum of fractions, reduced after each step.
    pub fn sum(values: impl IntoIterator<Item = Fraction>) -> Option<Fraction> {
        let mut acc = Fraction::ZERO;
        for value in values {
            let divisor = gcd(acc.denom, value.denom);
            let denom = (acc.denom / divisor).checked_mul(value.denom)?;
            let left = acc.numer.checked_mul(denom / acc.denom)?;
            let right = value.numer.checked_mul(denom / value.denom)?;
            acc = Fraction::new(left.checked_add(right)?, denom)?;
        }
        Some(acc)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a.max(1)
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = u128::from(self.numer) * u128::from(other.denom);
        let right = u128::from(other.numer) * u128::from(self.denom);
        left.cmp(&right)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Fraction;

    #[test]
    fn reduces_to_lowest_terms() {
        let f = Fraction::new(4, 6).unwrap();
        assert_eq!((f.numer(), f.denom()), (2, 3));
        assert_eq!(f.to_string(), "2/3");
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert!(Fraction::new(1, 0).is_none());
    }

    #[test]
    fn zero_numerator_normalizes_denominator() {
        let f = Fraction::new(0, 9).unwrap();
        assert_eq!(f, Fraction::ZERO);
        assert_eq!(f.denom(), 1);
    }

    #[test]
    fn ordering_uses_exact_cross_products() {
        let third = Fraction::new(1, 3).unwrap();
        let two_sixths = Fraction::new(2, 6).unwrap();
        assert_eq!(third, two_sixths);
        assert!(Fraction::new(2, 3).unwrap() > Fraction::HALF);
        assert!(Fraction::new(u64::MAX - 1, u64::MAX).unwrap() < Fraction::ONE);
    }

    #[test]
    fn sum_of_thirds_is_one() {
        let parts = [
            Fraction::new(1, 3).unwrap(),
            Fraction::new(1, 6).unwrap(),
            Fraction::HALF,
        ];
        assert_eq!(Fraction::sum(parts), Some(Fraction::ONE));
    }
}
