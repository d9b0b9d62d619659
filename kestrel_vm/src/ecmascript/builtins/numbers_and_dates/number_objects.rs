// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [21.1 Number Objects](https://tc39.es/ecma262/#sec-number-objects)

use crate::ecmascript::abstract_operations::type_conversion::to_numeric;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::ordinary::get_prototype_from_constructor;
use crate::ecmascript::builtins::primitive_objects::{PrimitiveObject, PrimitiveObjectData};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics, RealmIdentifier};
use crate::ecmascript::types::{
    Function, InternalSlots, IntoValue, Number, Object, PropertyKey, Value,
};
use crate::heap::ObjectEntry;

pub(crate) struct NumberConstructor;
impl Builtin for NumberConstructor {
    const NAME: &'static str = "Number";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [21.1.1.1 Number ( value )](https://tc39.es/ecma262/#sec-number-constructor-number-value)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    let value = arguments.get(0);
    // 1. If value is present, then
    let n = if value.is_undefined() && arguments.is_empty() {
        // 2. Else, let n be +0𝔽.
        Number::pos_zero()
    } else {
        // a. Let prim be ? ToNumeric(value).
        let prim = to_numeric(agent, value)?;
        // b. If prim is a BigInt, let n be 𝔽(ℝ(prim)).
        match prim {
            Value::BigInt(b) => Number::from(b.to_f64(agent)),
            Value::Number(n) => n,
            _ => unreachable!(),
        }
    };
    // 3. If NewTarget is undefined, return n.
    let Some(new_target) = new_target else {
        return Ok(n.into_value());
    };
    // 4. Let O be ? OrdinaryCreateFromConstructor(NewTarget,
    //    "%Number.prototype%", « [[NumberData]] »).
    let new_target = Function::try_from(new_target).expect("NewTarget is a constructor");
    let prototype = get_prototype_from_constructor(agent, new_target, ProtoIntrinsics::Number)?;
    // 5. Set O.[[NumberData]] to n.
    let object = PrimitiveObject::create(agent, PrimitiveObjectData::Number(n));
    if let Some(prototype) = prototype {
        object.internal_set_prototype(agent, Some(prototype));
    }
    // 6. Return O.
    Ok(object.into_value())
}

fn this_number_value(agent: &mut Agent, value: Value) -> JsResult<Number> {
    match value {
        Value::Number(n) => Ok(n),
        Value::PrimitiveObject(object) => {
            if let PrimitiveObjectData::Number(n) = object.data(agent) {
                Ok(n)
            } else {
                Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "this is not a Number",
                ))
            }
        }
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a Number",
        )),
    }
}

struct NumberIsNan;
impl Builtin for NumberIsNan {
    const NAME: &'static str = "isNaN";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(number_is_nan);
}

/// ### [21.1.2.4 Number.isNaN ( number )](https://tc39.es/ecma262/#sec-number.isnan)
fn number_is_nan(_agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 1. If number is a Number and number is NaN, return true.
    // 2. Return false.
    Ok(matches!(arguments.get(0), Value::Number(n) if n.is_nan()).into())
}

struct NumberIsInteger;
impl Builtin for NumberIsInteger {
    const NAME: &'static str = "isInteger";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(number_is_integer);
}

/// ### [21.1.2.3 Number.isInteger ( number )](https://tc39.es/ecma262/#sec-number.isinteger)
fn number_is_integer(
    _agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    Ok(matches!(arguments.get(0), Value::Number(n) if n.is_integer()).into())
}

struct NumberPrototypeToString;
impl Builtin for NumberPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_to_string);
}

/// ### [21.1.3.6 Number.prototype.toString ( \[ radix \] )](https://tc39.es/ecma262/#sec-number.prototype.tostring)
///
/// Base 10 only; other radices are not carried.
fn prototype_to_string(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    let n = this_number_value(agent, this_value)?;
    Ok(n.to_display_string(agent).into_value())
}

struct NumberPrototypeValueOf;
impl Builtin for NumberPrototypeValueOf {
    const NAME: &'static str = "valueOf";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_value_of);
}

/// ### [21.1.3.7 Number.prototype.valueOf ( )](https://tc39.es/ecma262/#sec-number.prototype.valueof)
fn prototype_value_of(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    Ok(this_number_value(agent, this_value)?.into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.number();
    let prototype = intrinsics.number_prototype;

    let mut builder = BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .with_builtin_function_property::<NumberIsInteger>()
        .with_builtin_function_property::<NumberIsNan>();
    // 21.1.2 Value properties of the Number constructor.
    for (name, value) in [
        ("EPSILON", f64::EPSILON),
        ("MAX_SAFE_INTEGER", 9007199254740991.0),
        ("MAX_VALUE", f64::MAX),
        ("MIN_SAFE_INTEGER", -9007199254740991.0),
        ("MIN_VALUE", f64::from_bits(1)),
        ("NaN", f64::NAN),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
        ("POSITIVE_INFINITY", f64::INFINITY),
    ] {
        let key = PropertyKey::from_static_str(builder.agent(), name);
        builder = builder.with_property(ObjectEntry::new_frozen_entry(
            key,
            Value::from_f64(value),
        ));
    }
    builder.build();

    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<NumberPrototypeToString>()
        .with_builtin_function_property::<NumberPrototypeValueOf>()
        .build();
}
