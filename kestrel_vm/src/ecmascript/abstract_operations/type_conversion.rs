// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.1 Type Conversion](https://tc39.es/ecma262/#sec-type-conversion)
//!
//! The ECMAScript language implicitly performs automatic type conversion as
//! needed. The conversion abstract operations are polymorphic; they can
//! accept a value of any ECMAScript language type.

use num_traits::ToPrimitive;

use super::operations_on_objects::{call_function, get, get_method};
use super::testing_and_comparison::is_callable;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::builtins::primitive_objects::{PrimitiveObject, PrimitiveObjectData};
use crate::ecmascript::types::{
    BigInt, Function, Number, Object, PropertyKey, String, Symbol, Value,
};
use crate::heap::WellKnownSymbolIndexes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    String,
    Number,
}

/// ### [7.1.1 ToPrimitive ( input \[ , preferredType \] )](https://tc39.es/ecma262/#sec-toprimitive)
///
/// Converts its input argument to a non-Object type. If an object is capable
/// of converting to more than one primitive type, it may use the optional
/// hint preferredType to favour that type.
pub(crate) fn to_primitive(
    agent: &mut Agent,
    input: Value,
    preferred_type: Option<PreferredType>,
) -> JsResult<Value> {
    // 1. If input is an Object, then
    if let Ok(input) = Object::try_from(input) {
        // a. Let exoticToPrim be ? GetMethod(input, @@toPrimitive).
        let exotic_to_prim = get_method(
            agent,
            input.into(),
            PropertyKey::Symbol(WellKnownSymbolIndexes::ToPrimitive.into()),
        )?;
        // b. If exoticToPrim is not undefined, then
        if let Some(exotic_to_prim) = exotic_to_prim {
            let hint = match preferred_type {
                // i. If preferredType is not present, let hint be "default".
                None => String::from_static_str(agent, "default"),
                // ii. Else if preferredType is STRING, let hint be "string".
                Some(PreferredType::String) => String::from_static_str(agent, "string"),
                // iii. Else, let hint be "number".
                Some(PreferredType::Number) => String::from_static_str(agent, "number"),
            };
            // iv. Let result be ? Call(exoticToPrim, input, « hint »).
            let result = call_function(agent, exotic_to_prim, input.into(), Some(&[hint.into()]))?;
            // v. If result is not an Object, return result.
            if !result.is_object() {
                Ok(result)
            } else {
                // vi. Throw a TypeError exception.
                Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Cannot convert object to primitive value",
                ))
            }
        } else {
            // c. If preferredType is not present, let preferredType be
            //    NUMBER.
            // d. Return ? OrdinaryToPrimitive(input, preferredType).
            ordinary_to_primitive(
                agent,
                input,
                preferred_type.unwrap_or(PreferredType::Number),
            )
        }
    } else {
        // 2. Return input.
        Ok(input)
    }
}

/// #### [7.1.1.1 OrdinaryToPrimitive ( O, hint )](https://tc39.es/ecma262/#sec-ordinarytoprimitive)
pub(crate) fn ordinary_to_primitive(
    agent: &mut Agent,
    o: Object,
    hint: PreferredType,
) -> JsResult<Value> {
    let to_string_key = PropertyKey::from_static_str(agent, "toString");
    let value_of_key = PropertyKey::from_static_str(agent, "valueOf");
    let method_names = match hint {
        // 1. If hint is STRING, let methodNames be « "toString", "valueOf" ».
        PreferredType::String => [to_string_key, value_of_key],
        // 2. Else, let methodNames be « "valueOf", "toString" ».
        PreferredType::Number => [value_of_key, to_string_key],
    };
    // 3. For each element name of methodNames, do
    for name in method_names {
        // a. Let method be ? Get(O, name).
        let method = get(agent, o, name)?;
        // b. If IsCallable(method) is true, then
        if is_callable(method) {
            // i. Let result be ? Call(method, O).
            let method = Function::try_from(method).unwrap();
            let result = call_function(agent, method, o.into(), None)?;
            // ii. If result is not an Object, return result.
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    // 4. Throw a TypeError exception.
    Err(agent.throw_exception_with_static_message(
        ExceptionType::TypeError,
        "Cannot convert object to primitive value",
    ))
}

/// ### [7.1.2 ToBoolean ( argument )](https://tc39.es/ecma262/#sec-toboolean)
pub(crate) fn to_boolean(agent: &Agent, argument: Value) -> bool {
    match argument {
        // 1. If argument is a Boolean, return argument.
        Value::Boolean(b) => b,
        // 2. If argument is one of undefined, null, +0𝔽, -0𝔽, NaN, 0ℤ, or
        //    the empty String, return false.
        Value::Undefined | Value::Null => false,
        Value::Number(n) => !(n.is_nan() || n.into_f64() == 0.0),
        Value::String(s) => !s.is_empty(agent),
        Value::BigInt(b) => !b.is_zero(agent),
        // 3. NOTE: This step is replaced in section B.3.6.1. ([[IsHTMLDDA]]
        //    is not supported.)
        // 4. Return true.
        _ => true,
    }
}

/// ### [7.1.3 ToNumeric ( value )](https://tc39.es/ecma262/#sec-tonumeric)
///
/// Returns a Value that is guaranteed to be a Number or a BigInt.
pub(crate) fn to_numeric(agent: &mut Agent, value: Value) -> JsResult<Value> {
    // 1. Let primValue be ? ToPrimitive(value, NUMBER).
    let prim_value = to_primitive(agent, value, Some(PreferredType::Number))?;
    // 2. If primValue is a BigInt, return primValue.
    if prim_value.is_bigint() {
        return Ok(prim_value);
    }
    // 3. Return ? ToNumber(primValue).
    Ok(to_number(agent, prim_value)?.into())
}

/// ### [7.1.4 ToNumber ( argument )](https://tc39.es/ecma262/#sec-tonumber)
pub(crate) fn to_number(agent: &mut Agent, argument: Value) -> JsResult<Number> {
    match argument {
        // 1. If argument is a Number, return argument.
        Value::Number(n) => Ok(n),
        // 2. If argument is either a Symbol or a BigInt, throw a TypeError
        //    exception.
        Value::Symbol(_) => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert a Symbol to a number",
        )),
        Value::BigInt(_) => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert a BigInt to a number",
        )),
        // 3. If argument is undefined, return NaN.
        Value::Undefined => Ok(Number::nan()),
        // 4. If argument is either null or false, return +0𝔽.
        Value::Null | Value::Boolean(false) => Ok(Number::pos_zero()),
        // 5. If argument is true, return 1𝔽.
        Value::Boolean(true) => Ok(Number::from(1.0)),
        // 6. If argument is a String, return StringToNumber(argument).
        Value::String(s) => Ok(string_to_number(agent, s)),
        // 7. Assert: argument is an Object.
        _ => {
            // 8. Let primValue be ? ToPrimitive(argument, NUMBER).
            let prim_value = to_primitive(agent, argument, Some(PreferredType::Number))?;
            // 9. Assert: primValue is not an Object.
            debug_assert!(!prim_value.is_object());
            // 10. Return ? ToNumber(primValue).
            to_number(agent, prim_value)
        }
    }
}

/// ### [7.1.4.1.1 StringToNumber ( str )](https://tc39.es/ecma262/#sec-stringtonumber)
fn string_to_number(agent: &Agent, string: String) -> Number {
    let Some(text) = string.as_str(agent) else {
        // Lone surrogates never form numeric literals.
        return Number::nan();
    };
    let trimmed = text.trim_matches(is_whitespace_or_line_terminator);
    if trimmed.is_empty() {
        return Number::pos_zero();
    }
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u128::from_str_radix(hex, 16)
            .map(|v| Number::from(v as f64))
            .unwrap_or_else(|_| parse_radix_overflow(hex, 16));
    }
    if let Some(oct) = trimmed.strip_prefix("0o").or_else(|| trimmed.strip_prefix("0O")) {
        return u128::from_str_radix(oct, 8)
            .map(|v| Number::from(v as f64))
            .unwrap_or_else(|_| parse_radix_overflow(oct, 8));
    }
    if let Some(bin) = trimmed.strip_prefix("0b").or_else(|| trimmed.strip_prefix("0B")) {
        return u128::from_str_radix(bin, 2)
            .map(|v| Number::from(v as f64))
            .unwrap_or_else(|_| parse_radix_overflow(bin, 2));
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Number::pos_inf(),
        "-Infinity" => return Number::neg_inf(),
        _ => {}
    }
    trimmed.parse::<f64>().map(Number::from).unwrap_or(Number::nan())
}

fn parse_radix_overflow(digits: &str, radix: u32) -> Number {
    let mut result = 0f64;
    for ch in digits.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            return Number::nan();
        };
        result = result * radix as f64 + digit as f64;
    }
    Number::from(result)
}

fn is_whitespace_or_line_terminator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '\u{FEFF}' | '\u{2028}' | '\u{2029}')
}

/// ### [7.1.5 ToIntegerOrInfinity ( argument )](https://tc39.es/ecma262/#sec-tointegerorinfinity)
pub(crate) fn to_integer_or_infinity(agent: &mut Agent, argument: Value) -> JsResult<f64> {
    // 1. Let number be ? ToNumber(argument).
    let number = to_number(agent, argument)?.into_f64();
    // 2. If number is one of NaN, +0𝔽, or -0𝔽, return 0.
    if number.is_nan() || number == 0.0 {
        return Ok(0.0);
    }
    // 3. If number is +∞𝔽, return +∞. 4. If number is -∞𝔽, return -∞.
    // 5. Return truncate(ℝ(number)).
    Ok(number.trunc())
}

/// The pure numeric part of [7.1.6 ToInt32](https://tc39.es/ecma262/#sec-toint32).
pub(crate) fn to_int32_f64(number: f64) -> i32 {
    // 2. If number is not finite or number is either +0𝔽 or -0𝔽, return +0𝔽.
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    // 3. Let int be truncate(ℝ(number)).
    // 4. Let int32bit be int modulo 2³².
    let int32bit = number.trunc().rem_euclid(4294967296.0);
    // 5. If int32bit ≥ 2³¹, return 𝔽(int32bit - 2³²); otherwise return
    //    𝔽(int32bit).
    if int32bit >= 2147483648.0 {
        (int32bit - 4294967296.0) as i32
    } else {
        int32bit as i32
    }
}

/// The pure numeric part of [7.1.7 ToUint32](https://tc39.es/ecma262/#sec-touint32).
pub(crate) fn to_uint32_f64(number: f64) -> u32 {
    if !number.is_finite() || number == 0.0 {
        return 0;
    }
    number.trunc().rem_euclid(4294967296.0) as u32
}

/// ### [7.1.6 ToInt32 ( argument )](https://tc39.es/ecma262/#sec-toint32)
pub(crate) fn to_int32(agent: &mut Agent, argument: Value) -> JsResult<i32> {
    // 1. Let number be ? ToNumber(argument).
    let number = to_number(agent, argument)?;
    Ok(to_int32_f64(number.into_f64()))
}

/// ### [7.1.7 ToUint32 ( argument )](https://tc39.es/ecma262/#sec-touint32)
pub(crate) fn to_uint32(agent: &mut Agent, argument: Value) -> JsResult<u32> {
    // 1. Let number be ? ToNumber(argument).
    let number = to_number(agent, argument)?;
    Ok(to_uint32_f64(number.into_f64()))
}

/// ### [7.1.11 ToUint8Clamp ( argument )](https://tc39.es/ecma262/#sec-touint8clamp)
///
/// Out-of-range numbers clamp; midpoints round with banker's rounding.
pub(crate) fn to_uint8_clamp_f64(number: f64) -> u8 {
    // 2. If number is NaN, return +0𝔽.
    if number.is_nan() {
        return 0;
    }
    // 3. If ℝ(number) ≤ 0, return +0𝔽.
    if number <= 0.0 {
        return 0;
    }
    // 4. If ℝ(number) ≥ 255, return 255𝔽.
    if number >= 255.0 {
        return 255;
    }
    // 5. Let f be floor(ℝ(number)).
    // 6. If f + 0.5 < ℝ(number), return 𝔽(f + 1).
    // 7. If ℝ(number) < f + 0.5, return 𝔽(f).
    // 8. If f is odd, return 𝔽(f + 1).
    // 9. Return 𝔽(f).
    let f = number.floor();
    if f + 0.5 < number {
        (f + 1.0) as u8
    } else if number < f + 0.5 {
        f as u8
    } else if (f as u64) % 2 == 1 {
        (f + 1.0) as u8
    } else {
        f as u8
    }
}

/// ### [7.1.13 ToBigInt ( argument )](https://tc39.es/ecma262/#sec-tobigint)
pub(crate) fn to_big_int(agent: &mut Agent, argument: Value) -> JsResult<BigInt> {
    // 1. Let prim be ? ToPrimitive(argument, NUMBER).
    let prim = to_primitive(agent, argument, Some(PreferredType::Number))?;
    // 2. Return the value that prim corresponds to in Table 12.
    match prim {
        Value::BigInt(b) => Ok(b),
        Value::Boolean(b) => Ok(BigInt::from_i64(agent, b as i64)),
        Value::String(s) => {
            let text = s
                .as_str(agent)
                .map(|text| text.trim().to_string());
            let parsed = text.and_then(|text| {
                if text.is_empty() {
                    Some(BigInt::from_i64(agent, 0))
                } else {
                    BigInt::parse_literal(agent, &text)
                }
            });
            parsed.ok_or_else(|| {
                agent.throw_exception_with_static_message(
                    ExceptionType::SyntaxError,
                    "Cannot convert string to a BigInt",
                )
            })
        }
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert value to a BigInt",
        )),
    }
}

/// ### [7.1.17 ToString ( argument )](https://tc39.es/ecma262/#sec-tostring)
pub(crate) fn to_string(agent: &mut Agent, argument: Value) -> JsResult<String> {
    match argument {
        // 1. If argument is a String, return argument.
        Value::String(s) => Ok(s),
        // 2. If argument is a Symbol, throw a TypeError exception.
        Value::Symbol(_) => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert a Symbol to a string",
        )),
        // 3. If argument is undefined, return "undefined".
        Value::Undefined => Ok(String::from_static_str(agent, "undefined")),
        // 4. If argument is null, return "null".
        Value::Null => Ok(String::from_static_str(agent, "null")),
        // 5. If argument is true, return "true".
        // 6. If argument is false, return "false".
        Value::Boolean(b) => Ok(String::from_static_str(
            agent,
            if b { "true" } else { "false" },
        )),
        // 7. If argument is a Number, return Number::toString(argument, 10).
        Value::Number(n) => Ok(n.to_display_string(agent)),
        // 8. If argument is a BigInt, return BigInt::toString(argument, 10).
        Value::BigInt(b) => Ok(b.to_display_string(agent)),
        // 9. Assert: argument is an Object.
        _ => {
            // 10. Let primValue be ? ToPrimitive(argument, STRING).
            let prim_value = to_primitive(agent, argument, Some(PreferredType::String))?;
            // 11. Assert: primValue is not an Object.
            debug_assert!(!prim_value.is_object());
            // 12. Return ? ToString(primValue).
            to_string(agent, prim_value)
        }
    }
}

/// ### [7.1.18 ToObject ( argument )](https://tc39.es/ecma262/#sec-toobject)
pub(crate) fn to_object(agent: &mut Agent, argument: Value) -> JsResult<Object> {
    match argument {
        Value::Undefined | Value::Null => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert undefined or null to object",
        )),
        // Primitives box into a wrapper object whose [[XData]] internal slot
        // is set to argument.
        Value::Boolean(b) => Ok(PrimitiveObject::create(agent, PrimitiveObjectData::Boolean(b)).into()),
        Value::String(s) => Ok(PrimitiveObject::create(agent, PrimitiveObjectData::String(s)).into()),
        Value::Symbol(s) => Ok(PrimitiveObject::create(agent, PrimitiveObjectData::Symbol(s)).into()),
        Value::Number(n) => Ok(PrimitiveObject::create(agent, PrimitiveObjectData::Number(n)).into()),
        Value::BigInt(b) => Ok(PrimitiveObject::create(agent, PrimitiveObjectData::BigInt(b)).into()),
        Value::PrivateName(_) => unreachable!("Private Names are not language values"),
        _ => Ok(Object::try_from(argument).unwrap()),
    }
}

/// ### [7.1.19 ToPropertyKey ( argument )](https://tc39.es/ecma262/#sec-topropertykey)
pub(crate) fn to_property_key(agent: &mut Agent, argument: Value) -> JsResult<PropertyKey> {
    // 1. Let key be ? ToPrimitive(argument, STRING).
    let key = to_primitive(agent, argument, Some(PreferredType::String))?;
    // 2. If key is a Symbol, return key.
    if let Value::Symbol(symbol) = key {
        return Ok(PropertyKey::Symbol(symbol));
    }
    // 3. Return ! ToString(key).
    let string = to_string(agent, key)?;
    Ok(PropertyKey::from_js_string(agent, string))
}

/// ### [7.1.20 ToLength ( argument )](https://tc39.es/ecma262/#sec-tolength)
pub(crate) fn to_length(agent: &mut Agent, argument: Value) -> JsResult<i64> {
    // 1. Let len be ? ToIntegerOrInfinity(argument).
    let len = to_integer_or_infinity(agent, argument)?;
    // 2. If len ≤ 0, return +0𝔽.
    if len <= 0.0 {
        return Ok(0);
    }
    // 3. Return 𝔽(min(len, 2⁵³ - 1)).
    Ok(len.min(9007199254740991.0) as i64)
}

/// ### [7.1.22 ToIndex ( value )](https://tc39.es/ecma262/#sec-toindex)
pub(crate) fn to_index(agent: &mut Agent, value: Value) -> JsResult<i64> {
    // 1. Let integer be ? ToIntegerOrInfinity(value).
    let integer = to_integer_or_infinity(agent, value)?;
    // 2. If integer is not in the inclusive interval from 0 to 2⁵³ - 1,
    //    throw a RangeError exception.
    if !(0.0..=9007199254740991.0).contains(&integer) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Index is out of range",
        ));
    }
    // 3. Return integer.
    Ok(integer as i64)
}

/// Modulo conversions for BigInt-backed typed array elements.
pub(crate) fn to_big_int64(agent: &Agent, value: BigInt) -> i64 {
    let data = &agent[value].data;
    let modulus = data.to_i64();
    match modulus {
        Some(v) => v,
        None => {
            let mask = num_bigint::BigInt::from(u64::MAX) + 1;
            let wrapped: num_bigint::BigInt = ((data % &mask) + &mask) % &mask;
            wrapped.to_u64().unwrap_or(0) as i64
        }
    }
}

pub(crate) fn to_big_uint64(agent: &Agent, value: BigInt) -> u64 {
    to_big_int64(agent, value) as u64
}

#[cfg(test)]
mod tests {
    use super::{to_int32_f64, to_uint32_f64, to_uint8_clamp_f64};

    #[test]
    fn int32_conversions() {
        assert_eq!(to_int32_f64(f64::NAN), 0);
        assert_eq!(to_int32_f64(f64::INFINITY), 0);
        assert_eq!(to_int32_f64(f64::NEG_INFINITY), 0);
        assert_eq!(to_int32_f64(4294967296.0), 0);
        assert_eq!(to_int32_f64(2147483648.0), -2147483648);
        assert_eq!(to_int32_f64(-1.5), -1);
        assert_eq!(to_uint32_f64(-1.0), 4294967295);
        // Idempotence and congruence of the conversions.
        for x in [-3.9, 0.0, -0.0, 1e10, -1e10, 2147483647.5, f64::NAN] {
            let int32 = to_int32_f64(x);
            assert_eq!(to_int32_f64(int32 as f64), int32);
            assert_eq!(to_uint32_f64(int32 as f64), to_uint32_f64(x));
        }
    }

    #[test]
    fn uint8_clamp_uses_bankers_rounding() {
        assert_eq!(to_uint8_clamp_f64(0.5), 0);
        assert_eq!(to_uint8_clamp_f64(1.5), 2);
        assert_eq!(to_uint8_clamp_f64(2.5), 2);
        assert_eq!(to_uint8_clamp_f64(2.6), 3);
        assert_eq!(to_uint8_clamp_f64(-5.0), 0);
        assert_eq!(to_uint8_clamp_f64(300.0), 255);
        assert_eq!(to_uint8_clamp_f64(f64::NAN), 0);
    }
}
