// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [21.2 BigInt Objects](https://tc39.es/ecma262/#sec-bigint-objects)

use crate::ecmascript::abstract_operations::type_conversion::{
    to_big_int, to_primitive, PreferredType,
};
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::primitive_objects::PrimitiveObjectData;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{BigInt, IntoValue, Object, Value};

pub(crate) struct BigIntConstructor;
impl Builtin for BigIntConstructor {
    const NAME: &'static str = "BigInt";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [21.2.1.1 BigInt ( value )](https://tc39.es/ecma262/#sec-bigint-constructor-number-value)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    // 1. If NewTarget is not undefined, throw a TypeError exception.
    if new_target.is_some() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "BigInt is not a constructor",
        ));
    }
    // 2. Let prim be ? ToPrimitive(value, NUMBER).
    let prim = to_primitive(agent, arguments.get(0), Some(PreferredType::Number))?;
    // 3. If prim is a Number, return ? NumberToBigInt(prim).
    if let Value::Number(n) = prim {
        let n = n.into_f64();
        // NumberToBigInt: 1. If number is not an integral Number, throw a
        // RangeError exception.
        if !n.is_finite() || n.trunc() != n {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Not an integer",
            ));
        }
        // 2. Return ℤ(ℝ(number)).
        return Ok(BigInt::from_i64(agent, n as i64).into_value());
    }
    // 4. Otherwise, return ? ToBigInt(prim).
    Ok(to_big_int(agent, prim)?.into_value())
}

fn this_bigint_value(agent: &mut Agent, value: Value) -> JsResult<BigInt> {
    match value {
        Value::BigInt(b) => Ok(b),
        Value::PrimitiveObject(object) => {
            if let PrimitiveObjectData::BigInt(b) = object.data(agent) {
                Ok(b)
            } else {
                Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "this is not a BigInt",
                ))
            }
        }
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a BigInt",
        )),
    }
}

struct BigIntPrototypeToString;
impl Builtin for BigIntPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_to_string);
}

/// ### [21.2.3.3 BigInt.prototype.toString ( \[ radix \] )](https://tc39.es/ecma262/#sec-bigint.prototype.tostring)
fn prototype_to_string(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    let b = this_bigint_value(agent, this_value)?;
    Ok(b.to_display_string(agent).into_value())
}

struct BigIntPrototypeValueOf;
impl Builtin for BigIntPrototypeValueOf {
    const NAME: &'static str = "valueOf";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_value_of);
}

/// ### [21.2.3.4 BigInt.prototype.valueOf ( )](https://tc39.es/ecma262/#sec-bigint.prototype.valueof)
fn prototype_value_of(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    Ok(this_bigint_value(agent, this_value)?.into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.big_int();
    let prototype = intrinsics.big_int_prototype;

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .build();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<BigIntPrototypeToString>()
        .with_builtin_function_property::<BigIntPrototypeValueOf>()
        .with_to_string_tag("BigInt")
        .build();
}
