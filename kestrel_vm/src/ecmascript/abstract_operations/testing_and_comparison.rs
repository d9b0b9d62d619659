// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.2 Testing and Comparison Operations](https://tc39.es/ecma262/#sec-testing-and-comparison-operations)

use super::type_conversion::{to_number, to_numeric, to_primitive, PreferredType};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{BigInt, Function, Number, Object, Value};

/// ### [7.2.1 RequireObjectCoercible ( argument )](https://tc39.es/ecma262/#sec-requireobjectcoercible)
pub(crate) fn require_object_coercible(agent: &mut Agent, argument: Value) -> JsResult<Value> {
    if argument.is_undefined() || argument.is_null() {
        Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot convert undefined or null to object",
        ))
    } else {
        Ok(argument)
    }
}

/// ### [7.2.2 IsArray ( argument )](https://tc39.es/ecma262/#sec-isarray)
pub(crate) fn is_array(agent: &mut Agent, argument: Value) -> JsResult<bool> {
    match argument {
        // 1. If argument is not an Object, return false.
        // 2. If argument is an Array exotic object, return true.
        Value::Array(_) => Ok(true),
        // 3. If argument is a Proxy exotic object, then
        Value::Proxy(proxy) => {
            // a. Perform ? ValidateNonRevokedProxy(argument).
            let Some(target) = agent[proxy].target else {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Proxy target is revoked",
                ));
            };
            // b. Let proxyTarget be argument.[[ProxyTarget]].
            // c. Return ? IsArray(proxyTarget).
            is_array(agent, target.into())
        }
        // 4. Return false.
        _ => Ok(false),
    }
}

/// ### [7.2.3 IsCallable ( argument )](https://tc39.es/ecma262/#sec-iscallable)
///
/// NOTE: Proxies of callables are handled at the `Call` dispatch itself.
pub(crate) fn is_callable(argument: Value) -> bool {
    // 1. If argument is not an Object, return false.
    // 2. If argument has a [[Call]] internal method, return true.
    // 3. Return false.
    Function::try_from(argument).is_ok()
}

/// ### [7.2.4 IsConstructor ( argument )](https://tc39.es/ecma262/#sec-isconstructor)
pub(crate) fn is_constructor(agent: &Agent, argument: Value) -> Option<Function> {
    // 1. If argument is not an Object, return false.
    // 2. If argument has a [[Construct]] internal method, return true.
    let function = Function::try_from(argument).ok()?;
    if function.is_constructor(agent) {
        Some(function)
    } else {
        // 3. Return false.
        None
    }
}

/// ### [7.2.10 SameValue ( x, y )](https://tc39.es/ecma262/#sec-samevalue)
pub(crate) fn same_value(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        // 2. If x is a Number, return Number::sameValue(x, y).
        (Value::Number(x), Value::Number(y)) => x.same_value(y),
        // 3. Return SameValueNonNumber(x, y).
        _ => same_value_non_number(agent, x, y),
    }
}

/// ### [7.2.11 SameValueZero ( x, y )](https://tc39.es/ecma262/#sec-samevaluezero)
pub(crate) fn same_value_zero(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        // 2. If x is a Number, return Number::sameValueZero(x, y).
        (Value::Number(x), Value::Number(y)) => x.same_value_zero(y),
        // 3. Return SameValueNonNumber(x, y).
        _ => same_value_non_number(agent, x, y),
    }
}

/// ### [7.2.12 SameValueNonNumber ( x, y )](https://tc39.es/ecma262/#sec-samevaluenonnumber)
fn same_value_non_number(agent: &Agent, x: Value, y: Value) -> bool {
    match (x, y) {
        // 2. If x is either null or undefined, return true.
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        // 3. If x is a BigInt, return BigInt::equal(x, y).
        (Value::BigInt(x), Value::BigInt(y)) => BigInt::equal(agent, x, y),
        // 4. If x is a String: identical code unit sequences. String handles
        //    are interned, so handle identity is sequence equality.
        (Value::String(x), Value::String(y)) => x == y,
        // 5. If x is a Boolean, x and y are both true or both false.
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        // 6. NOTE: All other ECMAScript language values are compared by
        //    identity.
        _ => Object::try_from(x).ok().zip(Object::try_from(y).ok())
            .is_some_and(|(x, y)| x == y)
            || matches!((x, y), (Value::Symbol(a), Value::Symbol(b)) if a == b),
    }
}

/// ### [7.2.13 IsLessThan ( x, y, LeftFirst )](https://tc39.es/ecma262/#sec-islessthan)
///
/// `None` is the specification's *undefined* result.
pub(crate) fn is_less_than<const LEFT_FIRST: bool>(
    agent: &mut Agent,
    x: Value,
    y: Value,
) -> JsResult<Option<bool>> {
    // 1./2. Evaluate px and py in the operand evaluation order.
    let (px, py) = if LEFT_FIRST {
        let px = to_primitive(agent, x, Some(PreferredType::Number))?;
        let py = to_primitive(agent, y, Some(PreferredType::Number))?;
        (px, py)
    } else {
        let py = to_primitive(agent, y, Some(PreferredType::Number))?;
        let px = to_primitive(agent, x, Some(PreferredType::Number))?;
        (px, py)
    };
    // 3. If px is a String and py is a String, then
    if let (Value::String(px), Value::String(py)) = (px, py) {
        // a-e. Lexicographic comparison by code unit.
        let result = compare_strings(agent, px, py) == core::cmp::Ordering::Less;
        return Ok(Some(result));
    }
    // 4.a. If px is a BigInt and py is a String / vice versa ...
    // d. If px and py have the same numeric type, return Type(px)::lessThan.
    match (px, py) {
        (Value::BigInt(x), Value::BigInt(y)) => Ok(Some(BigInt::less_than(agent, x, y))),
        (Value::BigInt(x), _) => {
            let ny = to_number(agent, py)?.into_f64();
            if ny.is_nan() {
                return Ok(None);
            }
            Ok(Some(x.to_f64(agent) < ny))
        }
        (_, Value::BigInt(y)) => {
            let nx = to_number(agent, px)?.into_f64();
            if nx.is_nan() {
                return Ok(None);
            }
            Ok(Some(nx < y.to_f64(agent)))
        }
        _ => {
            let nx = to_numeric(agent, px)?;
            let ny = to_numeric(agent, py)?;
            match (nx, ny) {
                (Value::Number(nx), Value::Number(ny)) => Ok(nx.less_than(ny)),
                (Value::BigInt(nx), Value::BigInt(ny)) => {
                    Ok(Some(BigInt::less_than(agent, nx, ny)))
                }
                (Value::BigInt(nx), Value::Number(ny)) => {
                    let ny = ny.into_f64();
                    if ny.is_nan() {
                        Ok(None)
                    } else {
                        Ok(Some(nx.to_f64(agent) < ny))
                    }
                }
                (Value::Number(nx), Value::BigInt(ny)) => {
                    let nx = nx.into_f64();
                    if nx.is_nan() {
                        Ok(None)
                    } else {
                        Ok(Some(nx < ny.to_f64(agent)))
                    }
                }
                _ => unreachable!(),
            }
        }
    }
}

pub(crate) fn compare_strings(
    agent: &Agent,
    x: crate::ecmascript::types::String,
    y: crate::ecmascript::types::String,
) -> core::cmp::Ordering {
    if x == y {
        return core::cmp::Ordering::Equal;
    }
    let x_len = x.utf16_len(agent);
    let y_len = y.utf16_len(agent);
    for index in 0..x_len.min(y_len) {
        let cx = x.code_unit_at(agent, index);
        let cy = y.code_unit_at(agent, index);
        if cx != cy {
            return cx.cmp(&cy);
        }
    }
    x_len.cmp(&y_len)
}

/// ### [7.2.14 IsLooselyEqual ( x, y )](https://tc39.es/ecma262/#sec-islooselyequal)
pub(crate) fn is_loosely_equal(agent: &mut Agent, x: Value, y: Value) -> JsResult<bool> {
    // 1. If Type(x) is Type(y), return IsStrictlyEqual(x, y).
    if is_same_type(x, y) {
        return Ok(is_strictly_equal(agent, x, y));
    }
    match (x, y) {
        // 2. If x is null and y is undefined, return true.
        // 3. If x is undefined and y is null, return true.
        (Value::Null, Value::Undefined) | (Value::Undefined, Value::Null) => Ok(true),
        // 5. If x is a Number and y is a String, return
        //    ! IsLooselyEqual(x, ! ToNumber(y)).
        (Value::Number(_), Value::String(s)) => {
            let y = to_number(agent, s.into())?;
            is_loosely_equal(agent, x, y.into())
        }
        // 6. If x is a String and y is a Number, return
        //    ! IsLooselyEqual(! ToNumber(x), y).
        (Value::String(s), Value::Number(_)) => {
            let x = to_number(agent, s.into())?;
            is_loosely_equal(agent, x.into(), y)
        }
        // 7. If x is a BigInt and y is a String, then
        (Value::BigInt(_), Value::String(_)) | (Value::String(_), Value::BigInt(_)) => {
            let (bigint, string) = match (x, y) {
                (Value::BigInt(b), Value::String(s)) => (b, s),
                (Value::String(s), Value::BigInt(b)) => (b, s),
                _ => unreachable!(),
            };
            // a. Let n be StringToBigInt(y). b. If n is undefined, return
            //    false. c. Return ! IsLooselyEqual(x, n).
            let text = string.as_str(agent).map(|t| t.trim().to_string());
            let Some(text) = text else { return Ok(false) };
            let parsed = if text.is_empty() {
                Some(BigInt::from_i64(agent, 0))
            } else {
                BigInt::parse_literal(agent, &text)
            };
            match parsed {
                Some(parsed) => Ok(BigInt::equal(agent, bigint, parsed)),
                None => Ok(false),
            }
        }
        // 9. If x is a Boolean, return ! IsLooselyEqual(! ToNumber(x), y).
        (Value::Boolean(b), _) => {
            let x = Number::from(b as i32 as f64);
            is_loosely_equal(agent, x.into(), y)
        }
        // 10. If y is a Boolean, return ! IsLooselyEqual(x, ! ToNumber(y)).
        (_, Value::Boolean(b)) => {
            let y = Number::from(b as i32 as f64);
            is_loosely_equal(agent, x, y.into())
        }
        // 12. If x is either a Number, a BigInt, a String or a Symbol and y
        //     is an Object, return ! IsLooselyEqual(x, ? ToPrimitive(y)).
        (Value::Number(_) | Value::BigInt(_) | Value::String(_) | Value::Symbol(_), _)
            if y.is_object() =>
        {
            let py = to_primitive(agent, y, None)?;
            is_loosely_equal(agent, x, py)
        }
        // 13. The converse.
        (_, Value::Number(_) | Value::BigInt(_) | Value::String(_) | Value::Symbol(_))
            if x.is_object() =>
        {
            let px = to_primitive(agent, x, None)?;
            is_loosely_equal(agent, px, y)
        }
        // 14. If x is a BigInt and y is a Number (or vice versa): compare the
        //     mathematical values; NaN and infinities are never equal.
        (Value::BigInt(b), Value::Number(n)) | (Value::Number(n), Value::BigInt(b)) => {
            Ok(BigInt::equal_to_f64(agent, b, n.into_f64()))
        }
        // 15. Return false.
        _ => Ok(false),
    }
}

fn is_same_type(x: Value, y: Value) -> bool {
    (x.is_undefined() && y.is_undefined())
        || (x.is_null() && y.is_null())
        || (x.is_boolean() && y.is_boolean())
        || (x.is_string() && y.is_string())
        || (x.is_symbol() && y.is_symbol())
        || (x.is_number() && y.is_number())
        || (x.is_bigint() && y.is_bigint())
        || (x.is_object() && y.is_object())
}

/// ### [7.2.15 IsStrictlyEqual ( x, y )](https://tc39.es/ecma262/#sec-isstrictlyequal)
pub(crate) fn is_strictly_equal(agent: &Agent, x: Value, y: Value) -> bool {
    // 1. If Type(x) is not Type(y), return false.
    if !is_same_type(x, y) {
        return false;
    }
    match (x, y) {
        // 2. If x is a Number, return Number::equal(x, y).
        (Value::Number(x), Value::Number(y)) => x.equal(y),
        // 3. Return SameValueNonNumber(x, y).
        _ => same_value_non_number(agent, x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::DefaultHostHooks;
    use crate::ecmascript::types::IntoValue;

    #[test]
    fn same_value_number_edges() {
        let agent = Agent::new(Default::default(), &DefaultHostHooks);
        let nan = Number::nan().into_value();
        let pos_zero = Number::pos_zero().into_value();
        let neg_zero = Number::neg_zero().into_value();
        assert!(same_value(&agent, nan, nan));
        assert!(!same_value(&agent, pos_zero, neg_zero));
        assert!(same_value_zero(&agent, pos_zero, neg_zero));
        assert!(!is_strictly_equal(&agent, nan, nan));
        assert!(is_strictly_equal(&agent, pos_zero, neg_zero));
    }
}
