use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};
use thiserror::Error;

/// Exact rational number `numer / denom`.
///
/// The denominator is always strictly positive and the pair is always reduced to
/// lowest terms, so two equal values have identical representations and the
/// derived equality is exact. Zero is stored as `0/1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numer: BigInt,
    denom: BigInt,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRationalError {
    #[error("Invalid rational literal: {0:?}")]
    Invalid(String),
    #[error("Zero denominator in {0:?}")]
    ZeroDenominator(String),
}

impl Rational {
    /// Builds `numer / denom` in lowest terms.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    pub fn new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Self {
        Self::checked_new(numer, denom).expect("rational with zero denominator")
    }

    /// Like [`Rational::new`] but returns `None` for a zero denominator.
    pub fn checked_new(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> Option<Self> {
        let numer = numer.into();
        let denom = denom.into();
        if denom.is_zero() {
            return None;
        }
        Some(Self::reduced(numer, denom))
    }

    fn reduced(mut numer: BigInt, mut denom: BigInt) -> Self {
        if numer.is_zero() {
            return Self::zero();
        }
        if denom.is_negative() {
            numer = -numer;
            denom = -denom;
        }
        let common = numer.gcd(&denom);
        if !common.is_one() {
            numer /= &common;
            denom /= &common;
        }
        Self { numer, denom }
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self {
            numer: value.into(),
            denom: BigInt::one(),
        }
    }

    pub fn numer(&self) -> &BigInt {
        &self.numer
    }

    pub fn denom(&self) -> &BigInt {
        &self.denom
    }

    pub fn is_integer(&self) -> bool {
        self.denom.is_one()
    }

    pub fn is_positive(&self) -> bool {
        self.numer.is_positive()
    }

    pub fn is_negative(&self) -> bool {
        self.numer.is_negative()
    }

    /// `1 / self`.
    ///
    /// # Panics
    ///
    /// Panics if `self` is zero.
    pub fn recip(&self) -> Self {
        Self::new(self.denom.clone(), self.numer.clone())
    }

    pub fn abs(&self) -> Self {
        Self {
            numer: self.numer.abs(),
            denom: self.denom.clone(),
        }
    }

    /// Lossy conversion for reporting. Never used for comparisons or pivoting.
    pub fn to_f64(&self) -> f64 {
        match (self.numer.to_f64(), self.denom.to_f64()) {
            (Some(n), Some(d)) if n.is_finite() && d.is_finite() => n / d,
            _ => {
                // Both parts overflow f64; scale them down together first.
                let shift = self.numer.bits().max(self.denom.bits()).saturating_sub(1000);
                let n = (&self.numer >> shift).to_f64().unwrap_or(0.0);
                let d = (&self.denom >> shift).to_f64().unwrap_or(f64::INFINITY);
                n / d
            }
        }
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self {
            numer: BigInt::zero(),
            denom: BigInt::one(),
        }
    }

    fn is_zero(&self) -> bool {
        self.numer.is_zero()
    }
}

impl One for Rational {
    fn one() -> Self {
        Self::from_integer(1)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Self::from_integer(value)
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Self::from_integer(value)
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Signs decide most comparisons without touching the magnitudes.
        let sign = |r: &Rational| {
            if r.numer.is_negative() {
                -1
            } else if r.numer.is_zero() {
                0
            } else {
                1
            }
        };
        match sign(self).cmp(&sign(other)) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        if self.denom == other.denom {
            return self.numer.cmp(&other.numer);
        }
        // Denominators are positive, so cross-multiplying preserves the order.
        (&self.numer * &other.denom).cmp(&(&other.numer * &self.denom))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom.is_one() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl FromStr for Rational {
    type Err = ParseRationalError;

    /// Parses `int` or `int/int`, each part with an optional leading `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let parse_part = |part: &str| {
            let digits = part.strip_prefix('-').unwrap_or(part);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseRationalError::Invalid(s.to_string()));
            }
            part.parse::<BigInt>()
                .map_err(|_| ParseRationalError::Invalid(s.to_string()))
        };

        match text.split_once('/') {
            None => Ok(Self::from_integer(parse_part(text)?)),
            Some((numer, denom)) => {
                let numer = parse_part(numer)?;
                let denom = parse_part(denom)?;
                Self::checked_new(numer, denom)
                    .ok_or_else(|| ParseRationalError::ZeroDenominator(s.to_string()))
            }
        }
    }
}

impl Add<&Rational> for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        if self.denom == rhs.denom {
            return Rational::reduced(&self.numer + &rhs.numer, self.denom.clone());
        }
        Rational::reduced(
            &self.numer * &rhs.denom + &rhs.numer * &self.denom,
            &self.denom * &rhs.denom,
        )
    }
}

impl Sub<&Rational> for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        if self.denom == rhs.denom {
            return Rational::reduced(&self.numer - &rhs.numer, self.denom.clone());
        }
        Rational::reduced(
            &self.numer * &rhs.denom - &rhs.numer * &self.denom,
            &self.denom * &rhs.denom,
        )
    }
}

impl Mul<&Rational> for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        Rational::reduced(&self.numer * &rhs.numer, &self.denom * &rhs.denom)
    }
}

impl Div<&Rational> for &Rational {
    type Output = Rational;

    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    fn div(self, rhs: &Rational) -> Rational {
        assert!(!rhs.is_zero(), "division of a rational by zero");
        Rational::reduced(&self.numer * &rhs.denom, &self.denom * &rhs.numer)
    }
}

macro_rules! forward_owned_binop {
    ($imp:ident, $method:ident) => {
        impl $imp<Rational> for Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Rational {
                (&self).$method(&rhs)
            }
        }

        impl $imp<&Rational> for Rational {
            type Output = Rational;

            fn $method(self, rhs: &Rational) -> Rational {
                (&self).$method(rhs)
            }
        }

        impl $imp<Rational> for &Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Rational {
                self.$method(&rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);
forward_owned_binop!(Div, div);

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numer: -self.numer,
            denom: self.denom,
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            numer: -&self.numer,
            denom: self.denom.clone(),
        }
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Rational>>(iter: I) -> Rational {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Rational>>(iter: I) -> Rational {
        iter.fold(Rational::zero(), |acc, x| acc + x)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Rational {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Rational {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: i64, d: i64) -> Rational {
        Rational::new(n, d)
    }

    #[test]
    fn test_normalization() {
        assert_eq!(r(-4, 6).to_string(), "-2/3");
        assert_eq!(r(1, -6).to_string(), "-1/6");
        assert_eq!(r(64, 16).to_string(), "4");
        assert_eq!(r(-3, -9).to_string(), "1/3");

        let zero = r(0, -17);
        assert_eq!(zero, Rational::zero());
        assert_eq!(zero.denom(), &BigInt::one());
    }

    #[test]
    fn test_denominator_positive_and_reduced() {
        for (n, d) in [(6, -4), (-10, 25), (0, 3), (7, 1), (-12, -18), (100, 7)] {
            let value = r(n, d);
            assert!(value.denom().is_positive(), "{value}");
            assert!(value.numer().gcd(value.denom()).is_one(), "{value}");
        }
    }

    #[test]
    fn test_zero_denominator() {
        assert!(Rational::checked_new(3, 0).is_none());
        assert!(std::panic::catch_unwind(|| Rational::new(1, 0)).is_err());
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(r(12, 5) + r(16, 6), r(76, 15));
        assert_eq!(r(-4, 6) + r(7, -9), r(-13, 9));
        assert_eq!(r(1, 2) - r(1, 3), r(1, 6));
        assert_eq!(r(2, 3) * r(9, 4), r(3, 2));
        assert_eq!(r(2, 3) / r(-4, 9), r(-3, 2));
        assert_eq!(-r(5, 7), r(-5, 7));
        assert_eq!(r(-5, 7).abs(), r(5, 7));
        assert_eq!(r(-5, 7).recip(), r(-7, 5));
    }

    #[test]
    fn test_divide_then_multiply_is_identity() {
        let values = [r(3, 4), r(-7, 2), r(0, 1), r(22, 7), r(-1, 1000)];
        let divisors = [r(1, 3), r(-5, 8), r(9, 1), r(-13, 17)];
        for a in &values {
            for b in &divisors {
                assert_eq!(&(a / b) * b, a.clone(), "{a} / {b} * {b}");
            }
        }
    }

    #[test]
    fn test_ordering_is_exact() {
        assert!(r(-1, 2) < r(0, 1));
        assert!(r(-1, 2) < r(-1, 3));
        assert!(r(1, 3) < r(1, 2));
        assert!(r(2, 4) <= r(1, 2));
        assert!(r(5, 3) > r(3, 2));
        // Differ only past f64 precision.
        let a = Rational::new(BigInt::from(10).pow(20) + 1, BigInt::from(10).pow(20));
        let b = Rational::one();
        assert!(a > b);
        assert_eq!(a.to_f64(), b.to_f64());
    }

    #[test]
    fn test_parse() {
        assert_eq!("5".parse::<Rational>().unwrap(), r(5, 1));
        assert_eq!("-3/4".parse::<Rational>().unwrap(), r(-3, 4));
        assert_eq!("6/-8".parse::<Rational>().unwrap(), r(-3, 4));
        assert_eq!(" 10/4 ".parse::<Rational>().unwrap(), r(5, 2));
        assert!(matches!("1/0".parse::<Rational>(), Err(ParseRationalError::ZeroDenominator(_))));
        assert!(matches!("1.5".parse::<Rational>(), Err(ParseRationalError::Invalid(_))));
        assert!(matches!("-".parse::<Rational>(), Err(ParseRationalError::Invalid(_))));
        assert!(matches!("1/2/3".parse::<Rational>(), Err(ParseRationalError::Invalid(_))));
        assert!(matches!("+4".parse::<Rational>(), Err(ParseRationalError::Invalid(_))));
    }

    #[test]
    fn test_to_f64() {
        assert_eq!(r(1, 4).to_f64(), 0.25);
        assert_eq!(r(-3, 2).to_f64(), -1.5);
        let scale = BigInt::from(10).pow(400);
        let huge = Rational::new(BigInt::from(3) * &scale, scale);
        assert!((huge.to_f64() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sum() {
        let total: Rational = [r(1, 2), r(1, 3), r(1, 6)].iter().sum();
        assert_eq!(total, Rational::one());
    }
}
