//! Ordered-field abstraction shared by the LP and vertex solvers.
//!
//! The solvers are written once over [`Field`] and instantiated for exact
//! `BigRational` arithmetic and for `f64` with an absolute pivot epsilon.

use super::number::{Number, NumberError, NumberKind};
use num::bigint::BigInt;
use num::rational::BigRational;
use num::{Integer, One, Zero};
use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Absolute epsilon for float sign tests inside the solvers.
pub const PIVOT_EPSILON: f64 = 1e-9;

/// Minimal ordered field used by `simplex` and `polytope`.
pub trait Field:
    Clone
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    const KIND: NumberKind;

    fn zero() -> Self;
    fn one() -> Self;
    fn from_i64(value: i64) -> Self;

    fn is_zero(&self) -> bool;
    fn is_positive(&self) -> bool;
    fn is_negative(&self) -> bool;

    /// Compare with the field's notion of equality.
    fn compare(&self, other: &Self) -> Ordering {
        let diff = self.clone() - other.clone();
        if diff.is_positive() {
            Ordering::Greater
        } else if diff.is_negative() {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    fn magnitude(&self) -> Self {
        if self.is_negative() {
            -self.clone()
        } else {
            self.clone()
        }
    }

    fn from_number(value: &Number) -> Result<Self, NumberError>;
    fn into_number(self) -> Number;

    /// Scale a direction vector to a canonical representative.
    fn normalize(values: &mut [Self]);
}

impl Field for f64 {
    const KIND: NumberKind = NumberKind::Float;

    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn from_i64(value: i64) -> Self {
        value as f64
    }

    fn is_zero(&self) -> bool {
        self.abs() <= PIVOT_EPSILON
    }

    fn is_positive(&self) -> bool {
        *self > PIVOT_EPSILON
    }

    fn is_negative(&self) -> bool {
        *self < -PIVOT_EPSILON
    }

    fn from_number(value: &Number) -> Result<Self, NumberError> {
        Ok(value.to_f64())
    }

    fn into_number(self) -> Number {
        Number::Float(self)
    }

    fn normalize(values: &mut [Self]) {
        let scale = values.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()));
        if scale > PIVOT_EPSILON {
            for v in values.iter_mut() {
                *v /= scale;
                if v.abs() <= PIVOT_EPSILON {
                    *v = 0.0;
                }
            }
        }
    }
}

impl Field for BigRational {
    const KIND: NumberKind = NumberKind::Fraction;

    fn zero() -> Self {
        <BigRational as Zero>::zero()
    }

    fn one() -> Self {
        <BigRational as One>::one()
    }

    fn from_i64(value: i64) -> Self {
        BigRational::from_integer(BigInt::from(value))
    }

    fn is_zero(&self) -> bool {
        <BigRational as Zero>::is_zero(self)
    }

    fn is_positive(&self) -> bool {
        num::Signed::is_positive(self)
    }

    fn is_negative(&self) -> bool {
        num::Signed::is_negative(self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    fn from_number(value: &Number) -> Result<Self, NumberError> {
        value.to_rational()
    }

    fn into_number(self) -> Number {
        Number::Fraction(self)
    }

    // Divide by the gcd of numerators after clearing denominators.
    fn normalize(values: &mut [Self]) {
        let mut lcm = BigInt::one();
        for v in values.iter() {
            lcm = lcm.lcm(v.denom());
        }
        let mut gcd = BigInt::zero();
        for v in values.iter() {
            let scaled = v.numer() * (&lcm / v.denom());
            gcd = gcd.gcd(&scaled);
        }
        if gcd.is_zero() {
            return;
        }
        let factor = BigRational::new(lcm, gcd);
        for v in values.iter_mut() {
            *v = &*v * &factor;
        }
    }
}

/// Best rational approximation of `x` with denominator at most
/// `max_denominator`, by continued-fraction convergents and semiconvergents.
pub fn snap_rational(x: f64, max_denominator: u64) -> Option<BigRational> {
    let exact = BigRational::from_float(x)?;
    let max_den = BigInt::from(max_denominator.max(1));
    if exact.denom() <= &max_den {
        return Some(exact);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (
        BigInt::zero(),
        BigInt::one(),
        BigInt::one(),
        BigInt::zero(),
    );
    let mut n = exact.numer().clone();
    let mut d = exact.denom().clone();
    loop {
        let a = n.div_floor(&d);
        let q2 = &q0 + &a * &q1;
        if q2 > max_den {
            break;
        }
        let p2 = &p0 + &a * &p1;
        p0 = std::mem::replace(&mut p1, p2);
        q0 = std::mem::replace(&mut q1, q2);
        let rem = &n - &a * &d;
        n = std::mem::replace(&mut d, rem);
        if d.is_zero() {
            break;
        }
    }
    let k = (&max_den - &q0).div_floor(&q1);
    let bound1 = BigRational::new(&p0 + &k * &p1, &q0 + &k * &q1);
    let bound2 = BigRational::new(p1, q1);
    let dist1 = num::Signed::abs(&(&bound2 - &exact));
    let dist2 = num::Signed::abs(&(&bound1 - &exact));
    if dist1 <= dist2 {
        Some(bound2)
    } else {
        Some(bound1)
    }
}

/// Snap `x` and report the result in the requested kind.
pub fn snap_number(kind: NumberKind, x: f64, max_denominator: u64) -> Result<Number, NumberError> {
    match kind {
        NumberKind::Float => Ok(Number::Float(x)),
        NumberKind::Fraction => snap_rational(x, max_denominator)
            .map(Number::Fraction)
            .ok_or(NumberError::NonFinite(x)),
    }
}
