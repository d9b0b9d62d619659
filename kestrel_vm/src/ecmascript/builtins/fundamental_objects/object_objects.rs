// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.1 Object Objects](https://tc39.es/ecma262/#sec-object-objects)

use crate::ecmascript::abstract_operations::operations_on_objects::{
    define_property_or_throw, enumerable_own_keys, get, has_own_property,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::same_value;
use crate::ecmascript::abstract_operations::type_conversion::{to_object, to_property_key};
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::ordinary::{
    ordinary_create_from_constructor, ordinary_object_create_with_intrinsics,
};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics, RealmIdentifier};
use crate::ecmascript::types::{
    Function, InternalMethods, IntoValue, Object, PropertyDescriptor, PropertyKey, String, Value,
};

pub(crate) struct ObjectConstructor;

impl Builtin for ObjectConstructor {
    const NAME: &'static str = "Object";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(ObjectConstructor::constructor);
}

impl ObjectConstructor {
    /// ### [20.1.1.1 Object ( \[ value \] )](https://tc39.es/ecma262/#sec-object-value)
    fn constructor(
        agent: &mut Agent,
        _this_value: Value,
        arguments: ArgumentsList,
        new_target: Option<Object>,
    ) -> JsResult<Value> {
        let value = arguments.get(0);
        // 1. If NewTarget is neither undefined nor the active function
        //    object, then
        if let Some(new_target) = new_target {
            let active_function = agent.current_realm().intrinsics().object();
            if new_target != active_function.into() {
                // a. Return ? OrdinaryCreateFromConstructor(NewTarget,
                //    "%Object.prototype%").
                let new_target =
                    Function::try_from(new_target).expect("NewTarget is a constructor");
                return Ok(ordinary_create_from_constructor(
                    agent,
                    new_target,
                    ProtoIntrinsics::Object,
                )?
                .into_value());
            }
        }
        // 2. If value is either undefined or null, return
        //    OrdinaryObjectCreate(%Object.prototype%).
        if value.is_undefined() || value.is_null() {
            return Ok(
                ordinary_object_create_with_intrinsics(agent, Some(ProtoIntrinsics::Object))
                    .into_value(),
            );
        }
        // 3. Return ! ToObject(value).
        Ok(to_object(agent, value)?.into_value())
    }
}

struct ObjectCreate;
impl Builtin for ObjectCreate {
    const NAME: &'static str = "create";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_create);
}

/// ### [20.1.2.2 Object.create ( O, Properties )](https://tc39.es/ecma262/#sec-object.create)
fn object_create(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    let o = arguments.get(0);
    // 1. If O is not an Object and O is not null, throw a TypeError
    //    exception.
    let prototype = match o {
        Value::Null => None,
        _ => match Object::try_from(o) {
            Ok(object) => Some(object),
            Err(_) => {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Object prototype may only be an Object or null",
                ))
            }
        },
    };
    // 2. Let obj be OrdinaryObjectCreate(O).
    let obj = crate::ecmascript::types::OrdinaryObject::create_object(agent, prototype, &[]);
    // 3. If Properties is not undefined, return
    //    ? ObjectDefineProperties(obj, Properties).
    let properties = arguments.get(1);
    if !properties.is_undefined() {
        object_define_properties(agent, obj.into(), properties)?;
    }
    // 4. Return obj.
    Ok(Value::Object(obj))
}

/// ### [20.1.2.3.1 ObjectDefineProperties ( O, Properties )](https://tc39.es/ecma262/#sec-objectdefineproperties)
fn object_define_properties(agent: &mut Agent, o: Object, properties: Value) -> JsResult<()> {
    // 1. Let props be ? ToObject(Properties).
    let props = to_object(agent, properties)?;
    // 2. Let keys be ? props.[[OwnPropertyKeys]]().
    let keys = props.internal_own_property_keys(agent)?;
    // 3./4. Collect and apply the descriptors.
    let mut descriptors = Vec::new();
    for key in keys {
        let prop_desc = props.internal_get_own_property(agent, key)?;
        if let Some(prop_desc) = prop_desc {
            if prop_desc.enumerable == Some(true) {
                let desc_obj = get(agent, props, key)?;
                let descriptor = PropertyDescriptor::to_property_descriptor(agent, desc_obj)?;
                descriptors.push((key, descriptor));
            }
        }
    }
    for (key, descriptor) in descriptors {
        define_property_or_throw(agent, o, key, descriptor)?;
    }
    Ok(())
}

struct ObjectDefineProperty;
impl Builtin for ObjectDefineProperty {
    const NAME: &'static str = "defineProperty";
    const LENGTH: u8 = 3;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_define_property);
}

/// ### [20.1.2.4 Object.defineProperty ( O, P, Attributes )](https://tc39.es/ecma262/#sec-object.defineproperty)
fn object_define_property(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. If O is not an Object, throw a TypeError exception.
    let Ok(o) = Object::try_from(arguments.get(0)) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Object.defineProperty called on non-object",
        ));
    };
    // 2. Let key be ? ToPropertyKey(P).
    let key = to_property_key(agent, arguments.get(1))?;
    // 3. Let desc be ? ToPropertyDescriptor(Attributes).
    let descriptor = PropertyDescriptor::to_property_descriptor(agent, arguments.get(2))?;
    // 4. Perform ? DefinePropertyOrThrow(O, key, desc).
    define_property_or_throw(agent, o, key, descriptor)?;
    // 5. Return O.
    Ok(o.into_value())
}

struct ObjectFreeze;
impl Builtin for ObjectFreeze {
    const NAME: &'static str = "freeze";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_freeze);
}

/// ### [20.1.2.6 Object.freeze ( O )](https://tc39.es/ecma262/#sec-object.freeze)
fn object_freeze(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 1. If O is not an Object, return O.
    let Ok(o) = Object::try_from(arguments.get(0)) else {
        return Ok(arguments.get(0));
    };
    // 2. Let status be ? SetIntegrityLevel(O, FROZEN).
    // SetIntegrityLevel: prevent extensions, then make every own property
    // non-configurable (and data properties non-writable).
    let status = o.internal_prevent_extensions(agent)?;
    if !status {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Could not freeze object",
        ));
    }
    let keys = o.internal_own_property_keys(agent)?;
    for key in keys {
        let Some(current) = o.internal_get_own_property(agent, key)? else {
            continue;
        };
        let descriptor = if current.is_accessor_descriptor() {
            PropertyDescriptor {
                configurable: Some(false),
                ..Default::default()
            }
        } else {
            PropertyDescriptor {
                configurable: Some(false),
                writable: Some(false),
                ..Default::default()
            }
        };
        define_property_or_throw(agent, o, key, descriptor)?;
    }
    // 3. Return O.
    Ok(o.into_value())
}

struct ObjectGetOwnPropertyDescriptor;
impl Builtin for ObjectGetOwnPropertyDescriptor {
    const NAME: &'static str = "getOwnPropertyDescriptor";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_get_own_property_descriptor);
}

/// ### [20.1.2.8 Object.getOwnPropertyDescriptor ( O, P )](https://tc39.es/ecma262/#sec-object.getownpropertydescriptor)
fn object_get_own_property_descriptor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let obj be ? ToObject(O).
    let obj = to_object(agent, arguments.get(0))?;
    // 2. Let key be ? ToPropertyKey(P).
    let key = to_property_key(agent, arguments.get(1))?;
    // 3. Let desc be ? obj.[[GetOwnProperty]](key).
    let descriptor = obj.internal_get_own_property(agent, key)?;
    // 4. Return FromPropertyDescriptor(desc).
    let result = PropertyDescriptor::from_property_descriptor(descriptor, agent)?;
    Ok(result.map_or(Value::Undefined, |o| o.into_value()))
}

struct ObjectGetPrototypeOf;
impl Builtin for ObjectGetPrototypeOf {
    const NAME: &'static str = "getPrototypeOf";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_get_prototype_of);
}

/// ### [20.1.2.12 Object.getPrototypeOf ( O )](https://tc39.es/ecma262/#sec-object.getprototypeof)
fn object_get_prototype_of(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let obj be ? ToObject(O).
    let obj = to_object(agent, arguments.get(0))?;
    // 2. Return ? obj.[[GetPrototypeOf]]().
    let proto = obj.internal_get_prototype_of(agent)?;
    Ok(proto.map_or(Value::Null, |p| p.into_value()))
}

struct ObjectSetPrototypeOf;
impl Builtin for ObjectSetPrototypeOf {
    const NAME: &'static str = "setPrototypeOf";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_set_prototype_of);
}

/// ### [20.1.2.21 Object.setPrototypeOf ( O, proto )](https://tc39.es/ecma262/#sec-object.setprototypeof)
fn object_set_prototype_of(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let o = arguments.get(0);
    let proto = arguments.get(1);
    // 1. Set O to ? RequireObjectCoercible(O).
    crate::ecmascript::abstract_operations::testing_and_comparison::require_object_coercible(
        agent, o,
    )?;
    // 2. If proto is not an Object and proto is not null, throw a TypeError
    //    exception.
    let proto = match proto {
        Value::Null => None,
        _ => match Object::try_from(proto) {
            Ok(object) => Some(object),
            Err(_) => {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Object prototype may only be an Object or null",
                ))
            }
        },
    };
    // 3. If O is not an Object, return O.
    let Ok(o) = Object::try_from(o) else {
        return Ok(arguments.get(0));
    };
    // 4. Let status be ? O.[[SetPrototypeOf]](proto).
    let status = o.internal_set_prototype_of(agent, proto)?;
    // 5. If status is false, throw a TypeError exception.
    if !status {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Could not set prototype",
        ));
    }
    // 6. Return O.
    Ok(o.into_value())
}

struct ObjectKeys;
impl Builtin for ObjectKeys {
    const NAME: &'static str = "keys";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_keys);
}

/// ### [20.1.2.17 Object.keys ( O )](https://tc39.es/ecma262/#sec-object.keys)
fn object_keys(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 1. Let obj be ? ToObject(O).
    let obj = to_object(agent, arguments.get(0))?;
    // 2. Let keyList be ? EnumerableOwnProperties(obj, KEY).
    let keys = enumerable_own_keys(agent, obj)?;
    let key_values: Vec<Value> = keys
        .into_iter()
        .map(|key| key.into_value(agent))
        .collect();
    // 3. Return CreateArrayFromList(keyList).
    let array = crate::ecmascript::abstract_operations::operations_on_objects::create_array_from_list(
        agent,
        &key_values,
    );
    Ok(array.into_value())
}

struct ObjectIs;
impl Builtin for ObjectIs {
    const NAME: &'static str = "is";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_is);
}

/// ### [20.1.2.14 Object.is ( value1, value2 )](https://tc39.es/ecma262/#sec-object.is)
fn object_is(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 1. Return SameValue(value1, value2).
    Ok(same_value(agent, arguments.get(0), arguments.get(1)).into())
}

struct ObjectPreventExtensions;
impl Builtin for ObjectPreventExtensions {
    const NAME: &'static str = "preventExtensions";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_prevent_extensions);
}

/// ### [20.1.2.19 Object.preventExtensions ( O )](https://tc39.es/ecma262/#sec-object.preventextensions)
fn object_prevent_extensions(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let Ok(o) = Object::try_from(arguments.get(0)) else {
        return Ok(arguments.get(0));
    };
    let status = o.internal_prevent_extensions(agent)?;
    if !status {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Could not prevent extensions",
        ));
    }
    Ok(o.into_value())
}

struct ObjectPrototypeHasOwnProperty;
impl Builtin for ObjectPrototypeHasOwnProperty {
    const NAME: &'static str = "hasOwnProperty";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_prototype_has_own_property);
}

/// ### [20.1.3.2 Object.prototype.hasOwnProperty ( V )](https://tc39.es/ecma262/#sec-object.prototype.hasownproperty)
fn object_prototype_has_own_property(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let P be ? ToPropertyKey(V).
    let p = to_property_key(agent, arguments.get(0))?;
    // 2. Let O be ? ToObject(this value).
    let o = to_object(agent, this_value)?;
    // 3. Return ? HasOwnProperty(O, P).
    Ok(has_own_property(agent, o, p)?.into())
}

struct ObjectPrototypeToString;
impl Builtin for ObjectPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_prototype_to_string);
}

/// ### [20.1.3.6 Object.prototype.toString ( )](https://tc39.es/ecma262/#sec-object.prototype.tostring)
fn object_prototype_to_string(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. If the this value is undefined, return "[object Undefined]".
    // 2. If the this value is null, return "[object Null]".
    let tag = match this_value {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Array(_) => "Array",
        Value::Arguments(_) => "Arguments",
        Value::BoundFunction(_)
        | Value::BuiltinFunction(_)
        | Value::ECMAScriptFunction(_)
        | Value::PromiseResolvingFunction(_) => "Function",
        Value::Error(_) => "Error",
        Value::Boolean(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        _ => "Object",
    };
    // 14-17. Let tag be ? Get(O, @@toStringTag); if it is a String, use it.
    let result = if let Ok(o) = Object::try_from(this_value) {
        let tag_value = get(
            agent,
            o,
            PropertyKey::Symbol(crate::heap::WellKnownSymbolIndexes::ToStringTag.into()),
        )?;
        match tag_value {
            Value::String(tag) => {
                let tag = tag.to_string_lossy(agent).into_owned();
                format!("[object {}]", tag)
            }
            _ => format!("[object {}]", tag),
        }
    } else {
        format!("[object {}]", tag)
    };
    Ok(String::from_string(agent, result).into_value())
}

struct ObjectPrototypeValueOf;
impl Builtin for ObjectPrototypeValueOf {
    const NAME: &'static str = "valueOf";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(object_prototype_value_of);
}

/// ### [20.1.3.7 Object.prototype.valueOf ( )](https://tc39.es/ecma262/#sec-object.prototype.valueof)
fn object_prototype_value_of(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Return ? ToObject(this value).
    Ok(to_object(agent, this_value)?.into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let object_prototype = intrinsics.object_prototype();
    let object_constructor = intrinsics.object();

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, object_constructor)
        .with_prototype_property(object_prototype.into())
        .with_builtin_function_property::<ObjectCreate>()
        .with_builtin_function_property::<ObjectDefineProperty>()
        .with_builtin_function_property::<ObjectFreeze>()
        .with_builtin_function_property::<ObjectGetOwnPropertyDescriptor>()
        .with_builtin_function_property::<ObjectGetPrototypeOf>()
        .with_builtin_function_property::<ObjectIs>()
        .with_builtin_function_property::<ObjectKeys>()
        .with_builtin_function_property::<ObjectPreventExtensions>()
        .with_builtin_function_property::<ObjectSetPrototypeOf>()
        .build();

    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, object_prototype)
        .with_builtin_function_property::<ObjectPrototypeHasOwnProperty>()
        .with_builtin_function_property::<ObjectPrototypeToString>()
        .with_builtin_function_property::<ObjectPrototypeValueOf>()
        .build();
}
