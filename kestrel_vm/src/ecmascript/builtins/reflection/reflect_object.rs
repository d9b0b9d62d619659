// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [28.1 The Reflect Object](https://tc39.es/ecma262/#sec-reflect-object)

use crate::ecmascript::abstract_operations::operations_on_objects::create_array_from_list;
use crate::ecmascript::abstract_operations::type_conversion::to_property_key;
use crate::ecmascript::builders::OrdinaryObjectBuilder;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{
    InternalMethods, IntoValue, Object, PropertyDescriptor, Value,
};

fn require_object(agent: &mut Agent, value: Value) -> JsResult<Object> {
    Object::try_from(value).map_err(|_| {
        agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Reflect argument must be an object",
        )
    })
}

struct ReflectGet;
impl Builtin for ReflectGet {
    const NAME: &'static str = "get";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(reflect_get);
}

/// ### [28.1.6 Reflect.get ( target, propertyKey \[ , receiver \] )](https://tc39.es/ecma262/#sec-reflect.get)
fn reflect_get(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    let target = require_object(agent, arguments.get(0))?;
    let key = to_property_key(agent, arguments.get(1))?;
    let receiver = if arguments.len() > 2 {
        arguments.get(2)
    } else {
        target.into_value()
    };
    target.internal_get(agent, key, receiver)
}

struct ReflectSet;
impl Builtin for ReflectSet {
    const NAME: &'static str = "set";
    const LENGTH: u8 = 3;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(reflect_set);
}

/// ### [28.1.12 Reflect.set ( target, propertyKey, V \[ , receiver \] )](https://tc39.es/ecma262/#sec-reflect.set)
fn reflect_set(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    let target = require_object(agent, arguments.get(0))?;
    let key = to_property_key(agent, arguments.get(1))?;
    let value = arguments.get(2);
    let receiver = if arguments.len() > 3 {
        arguments.get(3)
    } else {
        target.into_value()
    };
    Ok(target.internal_set(agent, key, value, receiver)?.into())
}

struct ReflectHas;
impl Builtin for ReflectHas {
    const NAME: &'static str = "has";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(reflect_has);
}

/// ### [28.1.9 Reflect.has ( target, propertyKey )](https://tc39.es/ecma262/#sec-reflect.has)
fn reflect_has(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    let target = require_object(agent, arguments.get(0))?;
    let key = to_property_key(agent, arguments.get(1))?;
    Ok(target.internal_has_property(agent, key)?.into())
}

struct ReflectDefineProperty;
impl Builtin for ReflectDefineProperty {
    const NAME: &'static str = "defineProperty";
    const LENGTH: u8 = 3;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(reflect_define_property);
}

/// ### [28.1.3 Reflect.defineProperty ( target, propertyKey, attributes )](https://tc39.es/ecma262/#sec-reflect.defineproperty)
fn reflect_define_property(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let target = require_object(agent, arguments.get(0))?;
    let key = to_property_key(agent, arguments.get(1))?;
    let descriptor = PropertyDescriptor::to_property_descriptor(agent, arguments.get(2))?;
    Ok(target
        .internal_define_own_property(agent, key, descriptor)?
        .into())
}

struct ReflectGetPrototypeOf;
impl Builtin for ReflectGetPrototypeOf {
    const NAME: &'static str = "getPrototypeOf";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(reflect_get_prototype_of);
}

/// ### [28.1.8 Reflect.getPrototypeOf ( target )](https://tc39.es/ecma262/#sec-reflect.getprototypeof)
fn reflect_get_prototype_of(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let target = require_object(agent, arguments.get(0))?;
    let proto = target.internal_get_prototype_of(agent)?;
    Ok(proto.map_or(Value::Null, |p| p.into_value()))
}

struct ReflectOwnKeys;
impl Builtin for ReflectOwnKeys {
    const NAME: &'static str = "ownKeys";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(reflect_own_keys);
}

/// ### [28.1.11 Reflect.ownKeys ( target )](https://tc39.es/ecma262/#sec-reflect.ownkeys)
fn reflect_own_keys(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    let target = require_object(agent, arguments.get(0))?;
    // 2. Let keys be ? target.[[OwnPropertyKeys]]().
    let keys = target.internal_own_property_keys(agent)?;
    // 3. Return CreateArrayFromList(keys).
    let key_values: Vec<Value> = keys
        .into_iter()
        .map(|key| key.into_value(agent))
        .collect();
    Ok(create_array_from_list(agent, &key_values).into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let reflect = agent[realm].intrinsics().reflect();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, reflect)
        .with_builtin_function_property::<ReflectDefineProperty>()
        .with_builtin_function_property::<ReflectGet>()
        .with_builtin_function_property::<ReflectGetPrototypeOf>()
        .with_builtin_function_property::<ReflectHas>()
        .with_builtin_function_property::<ReflectOwnKeys>()
        .with_builtin_function_property::<ReflectSet>()
        .with_to_string_tag("Reflect")
        .build();
}
