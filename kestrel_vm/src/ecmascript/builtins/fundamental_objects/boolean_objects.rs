// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.3 Boolean Objects](https://tc39.es/ecma262/#sec-boolean-objects)

use crate::ecmascript::abstract_operations::type_conversion::to_boolean;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::ordinary::get_prototype_from_constructor;
use crate::ecmascript::builtins::primitive_objects::{PrimitiveObject, PrimitiveObjectData};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics, RealmIdentifier};
use crate::ecmascript::types::{
    Function, InternalSlots, IntoValue, Object, String, Value,
};

pub(crate) struct BooleanConstructor;
impl Builtin for BooleanConstructor {
    const NAME: &'static str = "Boolean";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [20.3.1.1 Boolean ( value )](https://tc39.es/ecma262/#sec-boolean-constructor-boolean-value)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    // 1. Let b be ToBoolean(value).
    let b = to_boolean(agent, arguments.get(0));
    // 2. If NewTarget is undefined, return b.
    let Some(new_target) = new_target else {
        return Ok(b.into());
    };
    // 3. Let O be ? OrdinaryCreateFromConstructor(NewTarget,
    //    "%Boolean.prototype%", « [[BooleanData]] »).
    let new_target = Function::try_from(new_target).expect("NewTarget is a constructor");
    let prototype = get_prototype_from_constructor(agent, new_target, ProtoIntrinsics::Boolean)?;
    // 4. Set O.[[BooleanData]] to b.
    let object = PrimitiveObject::create(agent, PrimitiveObjectData::Boolean(b));
    if let Some(prototype) = prototype {
        object.internal_set_prototype(agent, Some(prototype));
    }
    // 5. Return O.
    Ok(object.into_value())
}

/// ### [20.3.3.3.1 ThisBooleanValue ( value )](https://tc39.es/ecma262/#sec-thisbooleanvalue)
fn this_boolean_value(agent: &mut Agent, value: Value) -> JsResult<bool> {
    match value {
        // 1. If value is a Boolean, return value.
        Value::Boolean(b) => Ok(b),
        // 2. If value is an Object and value has a [[BooleanData]] internal
        //    slot, return its value.
        Value::PrimitiveObject(object) => {
            if let PrimitiveObjectData::Boolean(b) = object.data(agent) {
                Ok(b)
            } else {
                Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Not a Boolean or Boolean object",
                ))
            }
        }
        // 3. Throw a TypeError exception.
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Not a Boolean or Boolean object",
        )),
    }
}

struct BooleanPrototypeToString;
impl Builtin for BooleanPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(to_string);
}

/// ### [20.3.3.2 Boolean.prototype.toString ( )](https://tc39.es/ecma262/#sec-boolean.prototype.tostring)
fn to_string(agent: &mut Agent, this_value: Value, _arguments: ArgumentsList) -> JsResult<Value> {
    let b = this_boolean_value(agent, this_value)?;
    Ok(String::from_static_str(agent, if b { "true" } else { "false" }).into_value())
}

struct BooleanPrototypeValueOf;
impl Builtin for BooleanPrototypeValueOf {
    const NAME: &'static str = "valueOf";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(value_of);
}

/// ### [20.3.3.3 Boolean.prototype.valueOf ( )](https://tc39.es/ecma262/#sec-boolean.prototype.valueof)
fn value_of(agent: &mut Agent, this_value: Value, _arguments: ArgumentsList) -> JsResult<Value> {
    Ok(this_boolean_value(agent, this_value)?.into())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.boolean();
    let prototype = intrinsics.boolean_prototype;

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .build();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<BooleanPrototypeToString>()
        .with_builtin_function_property::<BooleanPrototypeValueOf>()
        .build();
}
