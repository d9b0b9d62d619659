// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [6.1.6.2 The BigInt Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-bigint-type)
//!
//! Arbitrary-precision integers backed by `num_bigint::BigInt`. The host
//! operators implement two's-complement semantics for the bitwise operations,
//! consistent with the specification for mathematical integers.

use num_bigint::Sign;
use num_traits::{FromPrimitive, Pow, Signed, ToPrimitive, Zero};

use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::String;
use crate::heap::indexes::BigIntIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct BigInt(pub(crate) BigIntIndex);

#[derive(Debug, Clone)]
pub struct BigIntHeapData {
    pub(crate) data: num_bigint::BigInt,
}

impl BigInt {
    pub(crate) fn from_num_bigint(agent: &mut Agent, data: num_bigint::BigInt) -> Self {
        agent.heap.bigints.push(Some(BigIntHeapData { data }));
        BigInt(BigIntIndex::last(&agent.heap.bigints))
    }

    pub fn from_i64(agent: &mut Agent, value: i64) -> Self {
        Self::from_num_bigint(agent, num_bigint::BigInt::from(value))
    }

    pub fn from_u64(agent: &mut Agent, value: u64) -> Self {
        Self::from_num_bigint(agent, num_bigint::BigInt::from(value))
    }

    /// Parse a BigInt literal body (without the trailing `n`), honouring
    /// `0x`/`0o`/`0b` prefixes.
    pub(crate) fn parse_literal(agent: &mut Agent, literal: &str) -> Option<Self> {
        let (digits, radix) = match literal.as_bytes() {
            [b'0', b'x' | b'X', ..] => (&literal[2..], 16),
            [b'0', b'o' | b'O', ..] => (&literal[2..], 8),
            [b'0', b'b' | b'B', ..] => (&literal[2..], 2),
            _ => (literal, 10),
        };
        let digits: std::string::String = digits.chars().filter(|c| *c != '_').collect();
        let data = num_bigint::BigInt::parse_bytes(digits.as_bytes(), radix)?;
        Some(Self::from_num_bigint(agent, data))
    }

    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub(crate) fn is_zero(self, agent: &Agent) -> bool {
        agent[self].data.is_zero()
    }

    pub fn to_f64(self, agent: &Agent) -> f64 {
        agent[self].data.to_f64().unwrap_or(f64::NAN)
    }

    /// ### [6.1.6.2.1 BigInt::unaryMinus ( x )](https://tc39.es/ecma262/#sec-numeric-types-bigint-unaryMinus)
    pub(crate) fn unary_minus(agent: &mut Agent, x: Self) -> Self {
        let data = -&agent[x].data;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.2 BigInt::bitwiseNOT ( x )](https://tc39.es/ecma262/#sec-numeric-types-bigint-bitwiseNOT)
    pub(crate) fn bitwise_not(agent: &mut Agent, x: Self) -> Self {
        // 1. Return -x - 1ℤ.
        let data = -&agent[x].data - 1;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.3 BigInt::exponentiate ( base, exponent )](https://tc39.es/ecma262/#sec-numeric-types-bigint-exponentiate)
    pub(crate) fn exponentiate(agent: &mut Agent, base: Self, exponent: Self) -> JsResult<Self> {
        // 1. If exponent < 0ℤ, throw a RangeError exception.
        if agent[exponent].data.is_negative() {
            return Err(agent.throw_exception(
                ExceptionType::RangeError,
                "Exponent must be non-negative",
            ));
        }
        let Some(exponent) = agent[exponent].data.to_u32() else {
            return Err(
                agent.throw_exception(ExceptionType::RangeError, "Exponent over bounds")
            );
        };
        // 2. If base is 0ℤ and exponent is 0ℤ, return 1ℤ.
        // 3. Return base raised to the power exponent.
        let data = Pow::pow(&agent[base].data, exponent);
        Ok(Self::from_num_bigint(agent, data))
    }

    /// ### [6.1.6.2.4 BigInt::multiply ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-multiply)
    pub(crate) fn multiply(agent: &mut Agent, x: Self, y: Self) -> Self {
        let data = &agent[x].data * &agent[y].data;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.5 BigInt::divide ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-divide)
    pub(crate) fn divide(agent: &mut Agent, x: Self, y: Self) -> JsResult<Self> {
        // 1. If y is 0ℤ, throw a RangeError exception.
        if agent[y].data.is_zero() {
            return Err(agent.throw_exception(ExceptionType::RangeError, "Division by zero"));
        }
        // 2. Let quotient be ℝ(x) / ℝ(y).
        // 3. Return ℤ(truncate(quotient)).
        let data = &agent[x].data / &agent[y].data;
        Ok(Self::from_num_bigint(agent, data))
    }

    /// ### [6.1.6.2.6 BigInt::remainder ( n, d )](https://tc39.es/ecma262/#sec-numeric-types-bigint-remainder)
    pub(crate) fn remainder(agent: &mut Agent, n: Self, d: Self) -> JsResult<Self> {
        // 1. If d is 0ℤ, throw a RangeError exception.
        if agent[d].data.is_zero() {
            return Err(agent.throw_exception(ExceptionType::RangeError, "Division by zero"));
        }
        // 2. If n is 0ℤ, return 0ℤ.
        // 3. Let quotient be ℝ(n) / ℝ(d).
        // 4. Let q be ℤ(truncate(quotient)).
        // 5. Return n - (d × q). The sign follows n.
        let data = &agent[n].data % &agent[d].data;
        Ok(Self::from_num_bigint(agent, data))
    }

    /// ### [6.1.6.2.7 BigInt::add ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-add)
    pub(crate) fn add(agent: &mut Agent, x: Self, y: Self) -> Self {
        let data = &agent[x].data + &agent[y].data;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.8 BigInt::subtract ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-subtract)
    pub(crate) fn subtract(agent: &mut Agent, x: Self, y: Self) -> Self {
        let data = &agent[x].data - &agent[y].data;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.9 BigInt::leftShift ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-leftShift)
    pub(crate) fn left_shift(agent: &mut Agent, x: Self, y: Self) -> JsResult<Self> {
        let Some(shift) = agent[y].data.to_i64() else {
            return Err(agent.throw_exception(ExceptionType::RangeError, "Shift count over bounds"));
        };
        let data = if shift < 0 {
            &agent[x].data >> (-shift) as u64
        } else {
            &agent[x].data << shift as u64
        };
        Ok(Self::from_num_bigint(agent, data))
    }

    /// ### [6.1.6.2.10 BigInt::signedRightShift ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-signedRightShift)
    pub(crate) fn signed_right_shift(agent: &mut Agent, x: Self, y: Self) -> JsResult<Self> {
        // 1. Return BigInt::leftShift(x, -y).
        let Some(shift) = agent[y].data.to_i64() else {
            return Err(agent.throw_exception(ExceptionType::RangeError, "Shift count over bounds"));
        };
        let data = if shift < 0 {
            &agent[x].data << (-shift) as u64
        } else {
            &agent[x].data >> shift as u64
        };
        Ok(Self::from_num_bigint(agent, data))
    }

    /// ### [6.1.6.2.11 BigInt::unsignedRightShift ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-unsignedRightShift)
    pub(crate) fn unsigned_right_shift(agent: &mut Agent, _x: Self, _y: Self) -> JsResult<Self> {
        // 1. Throw a TypeError exception.
        Err(agent.throw_exception(
            ExceptionType::TypeError,
            "BigInts have no unsigned right shift, use >> instead",
        ))
    }

    /// ### [6.1.6.2.12 BigInt::lessThan ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-lessThan)
    pub(crate) fn less_than(agent: &Agent, x: Self, y: Self) -> bool {
        agent[x].data < agent[y].data
    }

    /// ### [6.1.6.2.13 BigInt::equal ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-equal)
    pub(crate) fn equal(agent: &Agent, x: Self, y: Self) -> bool {
        x == y || agent[x].data == agent[y].data
    }

    /// ### [6.1.6.2.18 BigInt::bitwiseAND ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-bitwiseAND)
    pub(crate) fn bitwise_and(agent: &mut Agent, x: Self, y: Self) -> Self {
        let data = &agent[x].data & &agent[y].data;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.19 BigInt::bitwiseXOR ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-bitwiseXOR)
    pub(crate) fn bitwise_xor(agent: &mut Agent, x: Self, y: Self) -> Self {
        let data = &agent[x].data ^ &agent[y].data;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.20 BigInt::bitwiseOR ( x, y )](https://tc39.es/ecma262/#sec-numeric-types-bigint-bitwiseOR)
    pub(crate) fn bitwise_or(agent: &mut Agent, x: Self, y: Self) -> Self {
        let data = &agent[x].data | &agent[y].data;
        Self::from_num_bigint(agent, data)
    }

    /// ### [6.1.6.2.21 BigInt::toString ( x, radix )](https://tc39.es/ecma262/#sec-numeric-types-bigint-tostring)
    pub(crate) fn to_display_string(self, agent: &mut Agent) -> String {
        let string = agent[self].data.to_str_radix(10);
        String::from_string(agent, string)
    }

    /// Compare a BigInt with a Number for loose equality. NaN and infinite
    /// numbers never equal a BigInt; otherwise the mathematical values are
    /// compared.
    pub(crate) fn equal_to_f64(agent: &Agent, x: Self, y: f64) -> bool {
        if !y.is_finite() || y.trunc() != y {
            return false;
        }
        let data = &agent[x].data;
        match num_bigint::BigInt::from_f64(y) {
            Some(y) => *data == y,
            None => false,
        }
    }
}

/// Sign helper for inspection output.
pub(crate) fn is_negative(agent: &Agent, x: BigInt) -> bool {
    agent[x].data.sign() == Sign::Minus
}

impl core::ops::Index<BigInt> for Agent {
    type Output = BigIntHeapData;

    fn index(&self, index: BigInt) -> &Self::Output {
        self.heap
            .bigints
            .get(index.get_index())
            .expect("BigInt out of bounds")
            .as_ref()
            .expect("BigInt slot empty")
    }
}

impl HeapMark for BigInt {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.bigints.push(*self);
    }
}

impl super::IntoValue for BigInt {
    fn into_value(self) -> super::Value {
        super::Value::BigInt(self)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;

    #[test]
    fn host_bitwise_operators_are_twos_complement() {
        // Spot-check the negative-operand cases against the two's-complement
        // semantics the language requires.
        assert_eq!(BigInt::from(-1) & BigInt::from(0xff), BigInt::from(0xff));
        assert_eq!(BigInt::from(-2) | BigInt::from(1), BigInt::from(-1));
        assert_eq!(BigInt::from(-1) ^ BigInt::from(-1), BigInt::from(0));
        assert_eq!(BigInt::from(-9) >> 1u64, BigInt::from(-5));
    }
}
