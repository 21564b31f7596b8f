//! Numeric tower: exact integers and exact rationals.
//!
//! Arithmetic on two integers stays an integer. As soon as a rational is
//! involved the integer side is promoted and the result is a rational.
//! Division always yields a rational.

use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::Value;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(BigInt),
    Float(BigRational),
}

impl Number {
    pub fn from_value(value: &Value, operation: &str) -> RuntimeResult<Self> {
        match value {
            Value::Integer(n) => Ok(Number::Integer(n.clone())),
            Value::Float(r) => Ok(Number::Float(r.clone())),
            other => Err(RuntimeError::type_error(
                "number",
                other.type_name(),
                operation,
            )),
        }
    }

    pub fn to_rational(&self) -> BigRational {
        match self {
            Number::Integer(n) => BigRational::from_integer(n.clone()),
            Number::Float(r) => r.clone(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Integer(n) => n.is_zero(),
            Number::Float(r) => r.is_zero(),
        }
    }

    pub fn negate(self) -> Number {
        match self {
            Number::Integer(n) => Number::Integer(-n),
            Number::Float(r) => Number::Float(-r),
        }
    }

    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(a + b),
            (a, b) => Number::Float(a.to_rational() + b.to_rational()),
        }
    }

    pub fn sub(self, other: Number) -> Number {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(a - b),
            (a, b) => Number::Float(a.to_rational() - b.to_rational()),
        }
    }

    pub fn mul(self, other: Number) -> Number {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Number::Integer(a * b),
            (a, b) => Number::Float(a.to_rational() * b.to_rational()),
        }
    }

    pub fn div(self, other: Number) -> RuntimeResult<Number> {
        if other.is_zero() {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Number::Float(self.to_rational() / other.to_rational()))
    }

    pub fn compare(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a.cmp(b),
            (a, b) => a.to_rational().cmp(&b.to_rational()),
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Integer(n) => Value::Integer(n),
            Number::Float(r) => Value::Float(r),
        }
    }
}

/// Decimal rendering of a rational with at most `digits` fractional digits.
///
/// Expansions that terminate within `digits` are printed exactly, longer ones
/// are rounded half away from zero. Trailing zeros are dropped but one
/// fractional digit is always kept.
pub fn format_rational(value: &BigRational, digits: usize) -> String {
    let scale = num_traits::pow(BigInt::from(10u32), digits);
    let scaled = (value.abs() * BigRational::from_integer(scale.clone())).round();
    let scaled = scaled.to_integer();

    let whole = &scaled / &scale;
    let fraction = &scaled % &scale;

    let mut fraction = format!("{:0>width$}", fraction.to_string(), width = digits);
    while fraction.len() > 1 && fraction.ends_with('0') {
        fraction.pop();
    }
    if fraction.is_empty() {
        fraction.push('0');
    }

    let sign = if value.is_negative() && !scaled.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, whole, fraction)
}
