//! Tagged numbers: exact rationals or IEEE doubles.
//!
//! Every lower prevision picks one [`NumberKind`] at construction and all
//! arithmetic between its operands stays inside that kind. Mixing kinds is
//! rejected with [`NumberError::KindMismatch`] instead of silently promoting.

use num::bigint::BigInt;
use num::rational::BigRational;
use num::{One, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Numeric representation chosen for a lower prevision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberKind {
    /// Exact arbitrary-precision rationals.
    Fraction,
    /// IEEE 754 double precision.
    #[default]
    Float,
}

impl NumberKind {
    pub const ALL: &'static [NumberKind] = &[NumberKind::Fraction, NumberKind::Float];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumberKind::Fraction => "fraction",
            NumberKind::Float => "float",
        }
    }

    /// Parse a kind name, accepting a few aliases.
    pub fn parse(s: &str) -> Option<NumberKind> {
        match s.trim().to_lowercase().as_str() {
            "fraction" | "exact" | "rational" => Some(NumberKind::Fraction),
            "float" | "f64" | "double" => Some(NumberKind::Float),
            _ => None,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, NumberKind::Fraction)
    }
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NumberKind {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NumberKind::parse(s).ok_or_else(|| NumberError::UnknownKind(s.to_string()))
    }
}

/// Errors raised by [`Number`] arithmetic and parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumberError {
    #[error("number kind mismatch: {left} vs {right}")]
    KindMismatch { left: NumberKind, right: NumberKind },

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot parse {input:?} as {kind} number")]
    Parse { input: String, kind: NumberKind },

    #[error("non-finite value {0} has no exact representation")]
    NonFinite(f64),

    #[error("unknown number kind {0:?} (expected fraction or float)")]
    UnknownKind(String),
}

/// A value of one [`NumberKind`].
#[derive(Debug, Clone)]
pub enum Number {
    Fraction(BigRational),
    Float(f64),
}

impl Number {
    pub fn zero(kind: NumberKind) -> Number {
        match kind {
            NumberKind::Fraction => Number::Fraction(BigRational::zero()),
            NumberKind::Float => Number::Float(0.0),
        }
    }

    pub fn one(kind: NumberKind) -> Number {
        match kind {
            NumberKind::Fraction => Number::Fraction(BigRational::one()),
            NumberKind::Float => Number::Float(1.0),
        }
    }

    pub fn from_i64(kind: NumberKind, value: i64) -> Number {
        match kind {
            NumberKind::Fraction => Number::Fraction(BigRational::from_integer(BigInt::from(value))),
            NumberKind::Float => Number::Float(value as f64),
        }
    }

    /// `numer / denom` in the requested kind.
    pub fn from_ratio(kind: NumberKind, numer: i64, denom: i64) -> Result<Number, NumberError> {
        if denom == 0 {
            return Err(NumberError::DivisionByZero);
        }
        Ok(match kind {
            NumberKind::Fraction => Number::Fraction(BigRational::new(
                BigInt::from(numer),
                BigInt::from(denom),
            )),
            NumberKind::Float => Number::Float(numer as f64 / denom as f64),
        })
    }

    /// Convert a double. Exact numbers use the shortest decimal that
    /// round-trips, so `0.1` becomes `1/10` rather than its binary expansion.
    pub fn from_f64(kind: NumberKind, value: f64) -> Result<Number, NumberError> {
        if !value.is_finite() {
            return Err(NumberError::NonFinite(value));
        }
        match kind {
            NumberKind::Float => Ok(Number::Float(value)),
            NumberKind::Fraction => parse_decimal(&format!("{}", value))
                .map(Number::Fraction)
                .ok_or(NumberError::Parse {
                    input: value.to_string(),
                    kind,
                }),
        }
    }

    /// Wrap an exact rational, converting when the kind is float.
    pub fn from_rational(kind: NumberKind, value: BigRational) -> Number {
        match kind {
            NumberKind::Fraction => Number::Fraction(value),
            NumberKind::Float => Number::Float(rational_to_f64(&value)),
        }
    }

    /// Parse `"3/10"`, `"0.3"`, `"-2"` or `"1e-3"`.
    pub fn parse(kind: NumberKind, input: &str) -> Result<Number, NumberError> {
        let text = input.trim();
        let err = || NumberError::Parse {
            input: input.to_string(),
            kind,
        };
        if let Some((numer, denom)) = text.split_once('/') {
            let numer = parse_decimal(numer.trim()).ok_or_else(err)?;
            let denom = parse_decimal(denom.trim()).ok_or_else(err)?;
            if denom.is_zero() {
                return Err(NumberError::DivisionByZero);
            }
            return Ok(Number::from_rational(kind, numer / denom));
        }
        match kind {
            NumberKind::Fraction => parse_decimal(text).map(Number::Fraction).ok_or_else(err),
            NumberKind::Float => match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Number::Float(v)),
                _ => Err(err()),
            },
        }
    }

    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Fraction(_) => NumberKind::Fraction,
            Number::Float(_) => NumberKind::Float,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Fraction(r) => rational_to_f64(r),
            Number::Float(v) => *v,
        }
    }

    /// Exact value; floats convert through their binary expansion.
    pub fn to_rational(&self) -> Result<BigRational, NumberError> {
        match self {
            Number::Fraction(r) => Ok(r.clone()),
            Number::Float(v) => BigRational::from_float(*v).ok_or(NumberError::NonFinite(*v)),
        }
    }

    /// Re-express in another kind.
    pub fn convert(&self, kind: NumberKind) -> Result<Number, NumberError> {
        match (self, kind) {
            (Number::Fraction(_), NumberKind::Fraction) | (Number::Float(_), NumberKind::Float) => {
                Ok(self.clone())
            }
            (Number::Fraction(r), NumberKind::Float) => Ok(Number::Float(rational_to_f64(r))),
            (Number::Float(v), NumberKind::Fraction) => Number::from_f64(kind, *v),
        }
    }

    fn mismatch(&self, other: &Number) -> NumberError {
        NumberError::KindMismatch {
            left: self.kind(),
            right: other.kind(),
        }
    }

    pub fn try_add(&self, other: &Number) -> Result<Number, NumberError> {
        match (self, other) {
            (Number::Fraction(a), Number::Fraction(b)) => Ok(Number::Fraction(a + b)),
            (Number::Float(a), Number::Float(b)) => Ok(Number::Float(a + b)),
            _ => Err(self.mismatch(other)),
        }
    }

    pub fn try_sub(&self, other: &Number) -> Result<Number, NumberError> {
        match (self, other) {
            (Number::Fraction(a), Number::Fraction(b)) => Ok(Number::Fraction(a - b)),
            (Number::Float(a), Number::Float(b)) => Ok(Number::Float(a - b)),
            _ => Err(self.mismatch(other)),
        }
    }

    pub fn try_mul(&self, other: &Number) -> Result<Number, NumberError> {
        match (self, other) {
            (Number::Fraction(a), Number::Fraction(b)) => Ok(Number::Fraction(a * b)),
            (Number::Float(a), Number::Float(b)) => Ok(Number::Float(a * b)),
            _ => Err(self.mismatch(other)),
        }
    }

    pub fn try_div(&self, other: &Number) -> Result<Number, NumberError> {
        match (self, other) {
            (Number::Fraction(a), Number::Fraction(b)) => {
                if b.is_zero() {
                    return Err(NumberError::DivisionByZero);
                }
                Ok(Number::Fraction(a / b))
            }
            (Number::Float(a), Number::Float(b)) => {
                if *b == 0.0 {
                    return Err(NumberError::DivisionByZero);
                }
                Ok(Number::Float(a / b))
            }
            _ => Err(self.mismatch(other)),
        }
    }

    /// Order two numbers of the same kind; floats within `tolerance` are equal.
    pub fn compare(&self, other: &Number, tolerance: f64) -> Result<Ordering, NumberError> {
        match (self, other) {
            (Number::Fraction(a), Number::Fraction(b)) => Ok(a.cmp(b)),
            (Number::Float(a), Number::Float(b)) => {
                if (a - b).abs() <= tolerance {
                    Ok(Ordering::Equal)
                } else if a < b {
                    Ok(Ordering::Less)
                } else {
                    Ok(Ordering::Greater)
                }
            }
            _ => Err(self.mismatch(other)),
        }
    }

    /// Sign relative to zero, floats within `tolerance` counting as zero.
    pub fn signum(&self, tolerance: f64) -> Ordering {
        match self {
            Number::Fraction(r) => r.cmp(&BigRational::zero()),
            Number::Float(v) => {
                if v.abs() <= tolerance {
                    Ordering::Equal
                } else if *v < 0.0 {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
        }
    }

    pub fn is_zero(&self, tolerance: f64) -> bool {
        self.signum(tolerance) == Ordering::Equal
    }

    /// Exactly zero, no tolerance.
    pub fn is_exact_zero(&self) -> bool {
        match self {
            Number::Fraction(r) => r.is_zero(),
            Number::Float(v) => *v == 0.0,
        }
    }

    pub fn abs(&self) -> Number {
        match self {
            Number::Fraction(r) => Number::Fraction(r.abs()),
            Number::Float(v) => Number::Float(v.abs()),
        }
    }

    /// Smaller of two same-kind numbers.
    pub fn try_min(&self, other: &Number) -> Result<Number, NumberError> {
        Ok(match self.compare(other, 0.0)? {
            Ordering::Greater => other.clone(),
            _ => self.clone(),
        })
    }

    /// Larger of two same-kind numbers.
    pub fn try_max(&self, other: &Number) -> Result<Number, NumberError> {
        Ok(match self.compare(other, 0.0)? {
            Ordering::Less => other.clone(),
            _ => self.clone(),
        })
    }
}

impl std::ops::Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Fraction(r) => Number::Fraction(-r),
            Number::Float(v) => Number::Float(-v),
        }
    }
}

impl std::ops::Neg for &Number {
    type Output = Number;

    fn neg(self) -> Number {
        -(self.clone())
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Fraction(a), Number::Fraction(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => float_bits(*a) == float_bits(*b),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Number::Fraction(r) => {
                0u8.hash(state);
                r.hash(state);
            }
            Number::Float(v) => {
                1u8.hash(state);
                float_bits(*v).hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Fraction(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// -0.0 and 0.0 hash and compare equal.
fn float_bits(v: f64) -> u64 {
    if v == 0.0 {
        0
    } else {
        v.to_bits()
    }
}

/// Lossy conversion of an exact rational to the nearest double.
pub fn rational_to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or_else(|| {
        let numer = r.numer().to_f64().unwrap_or(f64::NAN);
        let denom = r.denom().to_f64().unwrap_or(f64::NAN);
        numer / denom
    })
}

/// Parse a plain decimal such as `-12.5e-3` into an exact rational.
fn parse_decimal(text: &str) -> Option<BigRational> {
    let text = text.trim();
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(idx) => (&text[..idx], text[idx + 1..].parse::<i32>().ok()?),
        None => (text, 0),
    };
    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let all_digits = format!("{}{}", int_part, frac_part);
    let mut numer = BigInt::from_str(&all_digits).ok()?;
    if negative {
        numer = -numer;
    }
    let scale = exponent - frac_part.len() as i32;
    let ten = BigInt::from(10u32);
    let value = if scale >= 0 {
        BigRational::from_integer(numer * num::pow(ten, scale as usize))
    } else {
        BigRational::new(numer, num::pow(ten, (-scale) as usize))
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frac(n: i64, d: i64) -> Number {
        Number::from_ratio(NumberKind::Fraction, n, d).unwrap()
    }

    #[test]
    fn test_kind_parse_aliases() {
        assert_eq!(NumberKind::parse("exact"), Some(NumberKind::Fraction));
        assert_eq!(NumberKind::parse("F64"), Some(NumberKind::Float));
        assert_eq!(NumberKind::parse("decimal"), None);
        assert!("nope".parse::<NumberKind>().is_err());
    }

    #[test]
    fn test_parse_decimal_is_exact() {
        let n = Number::parse(NumberKind::Fraction, "0.1").unwrap();
        assert_eq!(n, frac(1, 10));
        let n = Number::parse(NumberKind::Fraction, "-2.5e-1").unwrap();
        assert_eq!(n, frac(-1, 4));
        let n = Number::parse(NumberKind::Fraction, "3/12").unwrap();
        assert_eq!(n, frac(1, 4));
        assert_eq!(n.to_string(), "1/4");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Number::parse(NumberKind::Fraction, "abc").is_err());
        assert!(Number::parse(NumberKind::Fraction, ".").is_err());
        assert!(Number::parse(NumberKind::Float, "1/0").is_err());
        assert!(Number::parse(NumberKind::Float, "inf").is_err());
    }

    #[test]
    fn test_from_f64_uses_shortest_decimal() {
        let n = Number::from_f64(NumberKind::Fraction, 0.2).unwrap();
        assert_eq!(n, frac(1, 5));
        assert!(Number::from_f64(NumberKind::Fraction, f64::NAN).is_err());
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        let a = Number::one(NumberKind::Fraction);
        let b = Number::one(NumberKind::Float);
        assert!(matches!(
            a.try_add(&b),
            Err(NumberError::KindMismatch { .. })
        ));
        assert!(a.compare(&b, 0.0).is_err());
    }

    #[test]
    fn test_division_by_zero() {
        let a = Number::one(NumberKind::Float);
        let z = Number::zero(NumberKind::Float);
        assert_eq!(a.try_div(&z), Err(NumberError::DivisionByZero));
        assert!(Number::from_ratio(NumberKind::Fraction, 1, 0).is_err());
    }

    #[test]
    fn test_float_compare_tolerance() {
        let a = Number::Float(0.1 + 0.2);
        let b = Number::Float(0.3);
        assert_eq!(a.compare(&b, 1e-9).unwrap(), Ordering::Equal);
        assert_eq!(a.compare(&b, 0.0).unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_negative_zero_equal() {
        assert_eq!(Number::Float(-0.0), Number::Float(0.0));
        assert_eq!(-Number::zero(NumberKind::Fraction), Number::zero(NumberKind::Fraction));
    }

    #[test]
    fn test_display_integer_fraction() {
        assert_eq!(Number::from_i64(NumberKind::Fraction, -3).to_string(), "-3");
        assert_eq!(Number::Float(0.5).to_string(), "0.5");
    }
}
