use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use gc::Finalize;

use num::{BigInt, Integer, One, Signed, ToPrimitive, Zero};

/// An exact integer of unbounded size.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Finalize)]
pub struct Number(BigInt);

// A BigInt owns no Gc pointers.
unsafe impl gc::Trace for Number {
    gc::unsafe_empty_trace!();
}

impl Number {
    pub fn from_bigint(n: BigInt) -> Number {
        Number(n)
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }

    /// Parses a run of decimal digits as produced by the reader.
    pub fn from_digits(digits: &str) -> Option<Number> {
        BigInt::parse_bytes(digits.as_bytes(), 10).map(Number)
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Truncating division, `None` on a zero divisor.
    pub fn checked_quotient(&self, other: &Number) -> Option<Number> {
        if other.is_zero() {
            None
        } else {
            Some(Number(&self.0 / &other.0))
        }
    }

    /// Remainder with the sign of the dividend, `None` on a zero divisor.
    pub fn checked_remainder(&self, other: &Number) -> Option<Number> {
        if other.is_zero() {
            None
        } else {
            Some(Number(&self.0 % &other.0))
        }
    }

    pub fn is_even(&self) -> bool {
        self.0.is_even()
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Number {
        Number(BigInt::from(n))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! impl_binary_ops {
    { $(($optrait:ident, $opname:ident)),* } => {
        $(
            impl<'a, 'b> $optrait<&'b Number> for &'a Number {
                type Output = Number;

                fn $opname(self, other: &'b Number) -> Number {
                    Number($optrait::$opname(&self.0, &other.0))
                }
            }

            impl $optrait<Number> for Number {
                type Output = Number;

                fn $opname(self, other: Number) -> Number {
                    $optrait::$opname(&self, &other)
                }
            }
        )*
    }
}

impl_binary_ops! {
    (Add, add),
    (Sub, sub),
    (Mul, mul)
}

impl<'a> Neg for &'a Number {
    type Output = Number;

    fn neg(self) -> Number {
        Number(-&self.0)
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        -&self
    }
}

impl Zero for Number {
    fn zero() -> Number {
        Number(BigInt::zero())
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for Number {
    fn one() -> Number {
        Number(BigInt::one())
    }
}

#[test]
fn test_digits_beyond_i64() {
    let n = Number::from_digits("123456789012345678901234567890").unwrap();
    assert_eq!(n.to_i64(), None);
    assert_eq!(n.to_string(), "123456789012345678901234567890");
}

#[test]
fn test_arithmetic() {
    let x = Number::from(7);
    let y = Number::from(-3);
    assert_eq!(&x + &y, Number::from(4));
    assert_eq!(&x * &y, Number::from(-21));
    assert_eq!(-&x, Number::from(-7));
    assert_eq!(x.checked_quotient(&y), Some(Number::from(-2)));
    assert_eq!(x.checked_remainder(&y), Some(Number::from(1)));
    assert_eq!(x.checked_quotient(&Number::zero()), None);
}
