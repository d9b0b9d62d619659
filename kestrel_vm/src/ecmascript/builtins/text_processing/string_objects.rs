// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [22.1 String Objects](https://tc39.es/ecma262/#sec-string-objects)
//!
//! The String prototype library is out of scope; only the wrapper
//! constructor and the valueOf/toString round-trip are carried.

use crate::ecmascript::abstract_operations::type_conversion::to_string;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::ordinary::get_prototype_from_constructor;
use crate::ecmascript::builtins::primitive_objects::{PrimitiveObject, PrimitiveObjectData};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics, RealmIdentifier};
use crate::ecmascript::types::{
    Function, InternalSlots, IntoValue, Object, String, Value,
};

pub(crate) struct StringConstructor;
impl Builtin for StringConstructor {
    const NAME: &'static str = "String";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [22.1.1.1 String ( value )](https://tc39.es/ecma262/#sec-string-constructor-string-value)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    let value = arguments.get(0);
    // 1. If value is not present, let s be the empty String.
    let s = if arguments.is_empty() {
        String::EMPTY
    } else if new_target.is_none() && value.is_symbol() {
        // 2.a. If NewTarget is undefined and value is a Symbol, return
        //      SymbolDescriptiveString(value).
        let Value::Symbol(symbol) = value else {
            unreachable!()
        };
        return Ok(symbol.descriptive_string(agent).into_value());
    } else {
        // 2.b. Let s be ? ToString(value).
        to_string(agent, value)?
    };
    // 3. If NewTarget is undefined, return s.
    let Some(new_target) = new_target else {
        return Ok(s.into_value());
    };
    // 4. Return StringCreate(s, ? GetPrototypeFromConstructor(NewTarget,
    //    "%String.prototype%")).
    let new_target = Function::try_from(new_target).expect("NewTarget is a constructor");
    let prototype = get_prototype_from_constructor(agent, new_target, ProtoIntrinsics::String)?;
    let object = PrimitiveObject::create(agent, PrimitiveObjectData::String(s));
    if let Some(prototype) = prototype {
        object.internal_set_prototype(agent, Some(prototype));
    }
    Ok(object.into_value())
}

fn this_string_value(agent: &mut Agent, value: Value) -> JsResult<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::PrimitiveObject(object) => {
            if let PrimitiveObjectData::String(s) = object.data(agent) {
                Ok(s)
            } else {
                Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "this is not a String",
                ))
            }
        }
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a String",
        )),
    }
}

struct StringPrototypeToString;
impl Builtin for StringPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_to_string);
}

/// ### [22.1.3.28 String.prototype.toString ( )](https://tc39.es/ecma262/#sec-string.prototype.tostring)
fn prototype_to_string(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    Ok(this_string_value(agent, this_value)?.into_value())
}

struct StringPrototypeValueOf;
impl Builtin for StringPrototypeValueOf {
    const NAME: &'static str = "valueOf";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_value_of);
}

/// ### [22.1.3.35 String.prototype.valueOf ( )](https://tc39.es/ecma262/#sec-string.prototype.valueof)
fn prototype_value_of(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    Ok(this_string_value(agent, this_value)?.into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.string();
    let prototype = intrinsics.string_prototype;

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .build();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<StringPrototypeToString>()
        .with_builtin_function_property::<StringPrototypeValueOf>()
        .build();
}
