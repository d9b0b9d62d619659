// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [6.1.6.1 The Number Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-number-type)
//!
//! Numbers are IEEE-754 binary64 values carried inline. `+0` and `-0` are
//! distinguished bit-exactly; the derived `PartialEq` gives the IEEE `==`
//! semantics used by `Number::equal`, while `same_value` compares bits.

use crate::ecmascript::execution::Agent;
use crate::ecmascript::types::String;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Number(f64);

impl Number {
    pub const fn nan() -> Self {
        Number(f64::NAN)
    }

    pub const fn pos_zero() -> Self {
        Number(0.0)
    }

    pub const fn neg_zero() -> Self {
        Number(-0.0)
    }

    pub const fn pos_inf() -> Self {
        Number(f64::INFINITY)
    }

    pub const fn neg_inf() -> Self {
        Number(f64::NEG_INFINITY)
    }

    pub const fn into_f64(self) -> f64 {
        self.0
    }

    pub fn is_nan(self) -> bool {
        self.0.is_nan()
    }

    pub fn is_pos_zero(self) -> bool {
        self.0.to_bits() == 0.0f64.to_bits()
    }

    pub fn is_neg_zero(self) -> bool {
        self.0.to_bits() == (-0.0f64).to_bits()
    }

    pub fn is_pos_infinity(self) -> bool {
        self.0 == f64::INFINITY
    }

    pub fn is_neg_infinity(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn is_integer(self) -> bool {
        self.0.is_finite() && self.0.trunc() == self.0
    }

    /// ### [6.1.6.1.1 Number::unaryMinus ( x )](https://tc39.es/ecma262/#sec-numeric-types-number-unaryMinus)
    pub fn unary_minus(self) -> Self {
        // 1. If x is NaN, return NaN.
        // 2. Return the result of negating x.
        Number(-self.0)
    }

    /// ### [6.1.6.1.3 Number::exponentiate ( base, exponent )](https://tc39.es/ecma262/#sec-numeric-types-number-exponentiate)
    pub fn exponentiate(self, exponent: Self) -> Self {
        let base = self.0;
        let exponent = exponent.0;
        // 1. If exponent is NaN, return NaN.
        if exponent.is_nan() {
            return Number::nan();
        }
        // 2. If exponent is either +0𝔽 or -0𝔽, return 1𝔽.
        if exponent == 0.0 {
            return Number(1.0);
        }
        // 9. If base < -0𝔽 and exponent is not an integral Number, return NaN.
        // Note: `f64::powf` returns NaN here already; the remaining steps
        // coincide with IEEE pow except for the NaN base short-circuit, which
        // also coincides.
        Number(base.powf(exponent))
    }

    /// ### [6.1.6.1.12 Number::lessThan ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-number-lessThan)
    ///
    /// Returns `None` for the specification's *undefined* result (a NaN
    /// operand).
    pub fn less_than(self, y: Self) -> Option<bool> {
        // 1. If x is NaN, return undefined.
        // 2. If y is NaN, return undefined.
        if self.0.is_nan() || y.0.is_nan() {
            return None;
        }
        // 3-12. IEEE ordering; +0 and -0 compare equal, infinities order.
        Some(self.0 < y.0)
    }

    /// ### [6.1.6.1.13 Number::equal ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-number-equal)
    pub fn equal(self, y: Self) -> bool {
        // 1. If x is NaN, return false.
        // 2. If y is NaN, return false.
        // 3. If x is y, return true.
        // 4. If x is +0𝔽 and y is -0𝔽, return true.
        // 5. If x is -0𝔽 and y is +0𝔽, return true.
        // 6. Return false.
        self.0 == y.0
    }

    /// ### [6.1.6.1.14 Number::sameValue ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-number-sameValue)
    pub fn same_value(self, y: Self) -> bool {
        // 1. If x is NaN and y is NaN, return true.
        if self.0.is_nan() && y.0.is_nan() {
            return true;
        }
        // 2. If x is +0𝔽 and y is -0𝔽, return false.
        // 3. If x is -0𝔽 and y is +0𝔽, return false.
        // 4. If x is y, return true.
        // 5. Return false.
        self.0.to_bits() == y.0.to_bits()
    }

    /// ### [6.1.6.1.15 Number::sameValueZero ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-number-sameValueZero)
    pub fn same_value_zero(self, y: Self) -> bool {
        // 1. If x is NaN and y is NaN, return true.
        if self.0.is_nan() && y.0.is_nan() {
            return true;
        }
        // 2. If x is +0𝔽 and y is -0𝔽, return true.
        // 3. If x is -0𝔽 and y is +0𝔽, return true.
        // 4. If x is y, return true.
        // 5. Return false.
        self.0 == y.0
    }

    /// ### [6.1.6.1.20 Number::toString ( x, radix )](https://tc39.es/ecma262/#sec-numeric-types-number-tostring)
    ///
    /// Base-10 only. Output for finite values is the host's shortest
    /// round-tripping decimal form, with an integer fast path; `NaN`,
    /// `Infinity` and `-Infinity` are spelled per the specification.
    pub fn to_display_string(self, agent: &mut Agent) -> String {
        String::from_string(agent, self.to_rust_string())
    }

    pub(crate) fn to_rust_string(self) -> std::string::String {
        let x = self.0;
        // 1. If x is NaN, return "NaN".
        if x.is_nan() {
            return "NaN".to_string();
        }
        // 2. If x is either +0𝔽 or -0𝔽, return "0".
        if x == 0.0 {
            return "0".to_string();
        }
        // 3. If x < -0𝔽, return the string-concatenation of "-" and
        //    Number::toString(-x, radix).
        // 4. If x is +∞𝔽, return "Infinity".
        if x == f64::INFINITY {
            return "Infinity".to_string();
        }
        if x == f64::NEG_INFINITY {
            return "-Infinity".to_string();
        }
        if x.trunc() == x && x.abs() < 1e21 {
            return format!("{}", x as i64);
        }
        let formatted = format!("{}", x);
        // Rust spells the exponent as `e21`; the specification requires
        // `e+21` for positive exponents.
        if let Some(pos) = formatted.find('e') {
            if formatted.as_bytes().get(pos + 1) != Some(&b'-') {
                let (mantissa, exponent) = formatted.split_at(pos + 1);
                return format!("{}+{}", mantissa, exponent);
            }
        }
        formatted
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number(value as f64)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number(value as f64)
    }
}

impl super::IntoValue for Number {
    fn into_value(self) -> super::Value {
        super::Value::Number(self)
    }
}

#[cfg(test)]
mod tests {
    use super::Number;

    #[test]
    fn same_value_distinguishes_zeroes() {
        assert!(Number::nan().same_value(Number::nan()));
        assert!(!Number::pos_zero().same_value(Number::neg_zero()));
        assert!(Number::pos_zero().same_value_zero(Number::neg_zero()));
        assert!(!Number::nan().equal(Number::nan()));
        assert!(Number::pos_zero().equal(Number::neg_zero()));
    }

    #[test]
    fn display_strings() {
        assert_eq!(Number::nan().to_rust_string(), "NaN");
        assert_eq!(Number::pos_inf().to_rust_string(), "Infinity");
        assert_eq!(Number::neg_inf().to_rust_string(), "-Infinity");
        assert_eq!(Number::neg_zero().to_rust_string(), "0");
        assert_eq!(Number::from(3.25).to_rust_string(), "3.25");
        assert_eq!(Number::from(4294967295.0f64).to_rust_string(), "4294967295");
    }
}
