// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [10.1 Ordinary Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)

use crate::ecmascript::abstract_operations::operations_on_objects::call_function;
use crate::ecmascript::abstract_operations::testing_and_comparison::same_value;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, Function, Object, OrdinaryObject, PropertyDescriptor,
    PropertyKey, Value,
};

/// ### [10.1.2.1 OrdinarySetPrototypeOf ( O, V )](https://tc39.es/ecma262/#sec-ordinarysetprototypeof)
pub(crate) fn ordinary_set_prototype_of(
    agent: &mut Agent,
    object: Object,
    prototype: Option<Object>,
) -> bool {
    // 1. Let current be O.[[Prototype]].
    let current = object.internal_prototype(agent);

    // 2. If SameValue(V, current) is true, return true.
    if prototype == current {
        return true;
    }

    // 3. Let extensible be O.[[Extensible]].
    // 4. If extensible is false, return false.
    if !object.internal_extensible(agent) {
        return false;
    }

    // 5. Let p be V.
    let mut p = prototype;
    // 6. Let done be false.
    // 7. Repeat, while done is false,
    while let Some(p_inner) = p {
        // b. Else if SameValue(p, O) is true, return false.
        if p_inner == object {
            return false;
        }
        // c. Else,
        // i. If p.[[GetPrototypeOf]] is not the ordinary object internal
        //    method defined in 10.1.1, set done to true.
        // NOTE: Proxies and module namespaces define their own
        // [[GetPrototypeOf]].
        if p_inner.is_proxy() || p_inner.is_module() {
            break;
        }
        // ii. Else, set p to p.[[Prototype]].
        p = p_inner.internal_prototype(agent);
    }

    // 8. Set O.[[Prototype]] to V.
    object.internal_set_prototype(agent, prototype);

    // 9. Return true.
    true
}

/// ### [10.1.5.1 OrdinaryGetOwnProperty ( O, P )](https://tc39.es/ecma262/#sec-ordinarygetownproperty)
pub(crate) fn ordinary_get_own_property(
    agent: &Agent,
    backing_object: OrdinaryObject,
    property_key: PropertyKey,
) -> Option<PropertyDescriptor> {
    // 1. If O does not have an own property with key P, return undefined.
    // 3. Let X be O's own property whose key is P.
    let x = agent[backing_object].property(property_key)?;
    // 2. Let D be a newly created Property Descriptor with no fields.
    // 4. If X is a data property, set D.[[Value]] and D.[[Writable]].
    // 5. Else, set D.[[Get]] and D.[[Set]].
    // 6. Set D.[[Enumerable]] and D.[[Configurable]].
    // 7. Return D. Stored entries are always fully populated.
    Some(x.clone())
}

/// ### [10.1.6.1 OrdinaryDefineOwnProperty ( O, P, Desc )](https://tc39.es/ecma262/#sec-ordinarydefineownproperty)
pub(crate) fn ordinary_define_own_property(
    agent: &mut Agent,
    backing_object: OrdinaryObject,
    property_key: PropertyKey,
    descriptor: PropertyDescriptor,
) -> bool {
    // 1. Let current be ? O.[[GetOwnProperty]](P).
    let current = ordinary_get_own_property(agent, backing_object, property_key);
    // 2. Let extensible be ? IsExtensible(O).
    let extensible = agent[backing_object].extensible;
    // 3. Return ValidateAndApplyPropertyDescriptor(O, P, extensible, Desc,
    //    current).
    validate_and_apply_property_descriptor(
        agent,
        Some(backing_object),
        property_key,
        extensible,
        descriptor,
        current,
    )
}

/// ### [10.1.6.2 IsCompatiblePropertyDescriptor ( Extensible, Desc, Current )](https://tc39.es/ecma262/#sec-iscompatiblepropertydescriptor)
pub(crate) fn is_compatible_property_descriptor(
    agent: &mut Agent,
    extensible: bool,
    descriptor: PropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> bool {
    // 1. Return ValidateAndApplyPropertyDescriptor(undefined, "", Extensible,
    //    Desc, Current).
    validate_and_apply_property_descriptor(
        agent,
        None,
        PropertyKey::String(crate::ecmascript::types::String::EMPTY),
        extensible,
        descriptor,
        current,
    )
}

/// ### [10.1.6.3 ValidateAndApplyPropertyDescriptor ( O, P, extensible, Desc, current )](https://tc39.es/ecma262/#sec-validateandapplypropertydescriptor)
///
/// Returns true on accept, false on reject; never throws. Throwing on a
/// false return is the caller's policy.
fn validate_and_apply_property_descriptor(
    agent: &mut Agent,
    object: Option<OrdinaryObject>,
    property_key: PropertyKey,
    extensible: bool,
    descriptor: PropertyDescriptor,
    current: Option<PropertyDescriptor>,
) -> bool {
    // 1. Assert: IsPropertyKey(P) is true.

    // 2. If current is undefined, then
    let Some(current) = current else {
        // a. If extensible is false, return false.
        if !extensible {
            return false;
        }
        // b. If O is undefined, return true.
        let Some(object) = object else {
            return true;
        };
        // c. If IsAccessorDescriptor(Desc) is true, create an own accessor
        //    property named P whose attributes are set to the value of the
        //    corresponding field in Desc if present, or to the attribute's
        //    default value otherwise.
        // d. Else, create an own data property likewise.
        agent[object].define_property(property_key, descriptor.into_fully_populated());
        // e. Return true.
        return true;
    };

    // 3. Assert: current is a fully populated Property Descriptor.
    debug_assert!(current.is_fully_populated());

    // 4. If Desc does not have any fields, return true.
    if !descriptor.has_fields() {
        return true;
    }

    // 5. If current.[[Configurable]] is false, then
    if current.configurable == Some(false) {
        // a. If Desc has a [[Configurable]] field and Desc.[[Configurable]]
        //    is true, return false.
        if descriptor.configurable == Some(true) {
            return false;
        }
        // b. If Desc has an [[Enumerable]] field and
        //    SameValue(Desc.[[Enumerable]], current.[[Enumerable]]) is false,
        //    return false.
        if descriptor.enumerable.is_some() && descriptor.enumerable != current.enumerable {
            return false;
        }
        // c. If IsGenericDescriptor(Desc) is false and
        //    SameValue(IsAccessorDescriptor(Desc), IsAccessorDescriptor(current))
        //    is false, return false.
        if !descriptor.is_generic_descriptor()
            && descriptor.is_accessor_descriptor() != current.is_accessor_descriptor()
        {
            return false;
        }
        // d. If IsAccessorDescriptor(current) is true, then
        if current.is_accessor_descriptor() {
            // i. If Desc has a [[Get]] field and SameValue(Desc.[[Get]],
            //    current.[[Get]]) is false, return false.
            if let Some(desc_get) = descriptor.get {
                if desc_get != current.get.unwrap_or(None) {
                    return false;
                }
            }
            // ii. If Desc has a [[Set]] field and SameValue(Desc.[[Set]],
            //     current.[[Set]]) is false, return false.
            if let Some(desc_set) = descriptor.set {
                if desc_set != current.set.unwrap_or(None) {
                    return false;
                }
            }
        } else if current.writable == Some(false) {
            // e. Else if current.[[Writable]] is false, then
            // i. If Desc has a [[Writable]] field and Desc.[[Writable]] is
            //    true, return false.
            if descriptor.writable == Some(true) {
                return false;
            }
            // ii. If Desc has a [[Value]] field and SameValue(Desc.[[Value]],
            //     current.[[Value]]) is false, return false.
            if let Some(desc_value) = descriptor.value {
                if !same_value(agent, desc_value, current.value.unwrap()) {
                    return false;
                }
            }
        }
    }

    // 6. If O is not undefined, then
    if let Some(object) = object {
        // a. If IsDataDescriptor(current) is true and IsAccessorDescriptor(Desc)
        //    is true, then
        if current.is_data_descriptor() && descriptor.is_accessor_descriptor() {
            // i-iii. Replace the property with an accessor property whose
            //        [[Configurable]] and [[Enumerable]] come from the
            //        existing property unless overridden, and whose [[Get]]
            //        and [[Set]] come from Desc with defaults.
            let replacement = PropertyDescriptor {
                get: Some(descriptor.get.unwrap_or(None)),
                set: Some(descriptor.set.unwrap_or(None)),
                enumerable: Some(descriptor.enumerable.unwrap_or_else(|| {
                    current.enumerable.unwrap()
                })),
                configurable: Some(descriptor.configurable.unwrap_or_else(|| {
                    current.configurable.unwrap()
                })),
                ..Default::default()
            };
            agent[object].define_property(property_key, replacement);
        } else if current.is_accessor_descriptor() && descriptor.is_data_descriptor() {
            // b. Else if IsAccessorDescriptor(current) is true and
            //    IsDataDescriptor(Desc) is true: the converse conversion.
            let replacement = PropertyDescriptor {
                value: Some(descriptor.value.unwrap_or(Value::Undefined)),
                writable: Some(descriptor.writable.unwrap_or(false)),
                enumerable: Some(descriptor.enumerable.unwrap_or_else(|| {
                    current.enumerable.unwrap()
                })),
                configurable: Some(descriptor.configurable.unwrap_or_else(|| {
                    current.configurable.unwrap()
                })),
                ..Default::default()
            };
            agent[object].define_property(property_key, replacement);
        } else {
            // c. Else, for each field of Desc, set the corresponding
            //    attribute of the property named P of object O to the value
            //    of the field.
            let merged = PropertyDescriptor {
                value: descriptor.value.or(current.value),
                writable: descriptor.writable.or(current.writable),
                get: descriptor.get.or(current.get),
                set: descriptor.set.or(current.set),
                enumerable: descriptor.enumerable.or(current.enumerable),
                configurable: descriptor.configurable.or(current.configurable),
            };
            agent[object].define_property(property_key, merged);
        }
    }

    // 7. Return true.
    true
}

/// ### [10.1.7.1 OrdinaryHasProperty ( O, P )](https://tc39.es/ecma262/#sec-ordinaryhasproperty)
pub(crate) fn ordinary_has_property(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
) -> JsResult<bool> {
    // 1. Let hasOwn be ? O.[[GetOwnProperty]](P).
    let has_own = object.internal_get_own_property(agent, property_key)?;
    // 2. If hasOwn is not undefined, return true.
    if has_own.is_some() {
        return Ok(true);
    }
    // 3. Let parent be ? O.[[GetPrototypeOf]]().
    let parent = object.internal_get_prototype_of(agent)?;
    // 4. If parent is not null, return ? parent.[[HasProperty]](P).
    if let Some(parent) = parent {
        return parent.internal_has_property(agent, property_key);
    }
    // 5. Return false.
    Ok(false)
}

/// ### [10.1.8.1 OrdinaryGet ( O, P, Receiver )](https://tc39.es/ecma262/#sec-ordinaryget)
pub(crate) fn ordinary_get(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    receiver: Value,
) -> JsResult<Value> {
    // 1. Let desc be ? O.[[GetOwnProperty]](P).
    let Some(descriptor) = object.internal_get_own_property(agent, property_key)? else {
        // 2. If desc is undefined, then
        // a. Let parent be ? O.[[GetPrototypeOf]]().
        let Some(parent) = object.internal_get_prototype_of(agent)? else {
            // b. If parent is null, return undefined.
            return Ok(Value::Undefined);
        };
        // c. Return ? parent.[[Get]](P, Receiver).
        return parent.internal_get(agent, property_key, receiver);
    };
    // 3. If IsDataDescriptor(desc) is true, return desc.[[Value]].
    if let Some(value) = descriptor.value {
        return Ok(value);
    }
    // 4. Assert: IsAccessorDescriptor(desc) is true.
    debug_assert!(descriptor.is_accessor_descriptor());
    // 5. Let getter be desc.[[Get]].
    // 6. If getter is undefined, return undefined.
    let Some(Some(getter)) = descriptor.get else {
        return Ok(Value::Undefined);
    };
    // 7. Return ? Call(getter, Receiver).
    call_function(agent, getter, receiver, None)
}

/// ### [10.1.9.1 OrdinarySet ( O, P, V, Receiver )](https://tc39.es/ecma262/#sec-ordinaryset)
/// and [10.1.9.2 OrdinarySetWithOwnDescriptor](https://tc39.es/ecma262/#sec-ordinarysetwithowndescriptor)
pub(crate) fn ordinary_set(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
    receiver: Value,
) -> JsResult<bool> {
    // 1. Let ownDesc be ? O.[[GetOwnProperty]](P).
    let own_descriptor = object.internal_get_own_property(agent, property_key)?;

    // OrdinarySetWithOwnDescriptor:
    // 1. If ownDesc is undefined, then
    let own_descriptor = if let Some(own_descriptor) = own_descriptor {
        own_descriptor
    } else {
        // a. Let parent be ? O.[[GetPrototypeOf]]().
        if let Some(parent) = object.internal_get_prototype_of(agent)? {
            // b. If parent is not null, return ? parent.[[Set]](P, V,
            //    Receiver).
            return parent.internal_set(agent, property_key, value, receiver);
        }
        // c. Else, set ownDesc to the PropertyDescriptor { [[Value]]:
        //    undefined, [[Writable]]: true, [[Enumerable]]: true,
        //    [[Configurable]]: true }.
        PropertyDescriptor::new_data_descriptor(Value::Undefined)
    };

    // 2. If IsDataDescriptor(ownDesc) is true, then
    if own_descriptor.is_data_descriptor() {
        // a. If ownDesc.[[Writable]] is false, return false.
        if own_descriptor.writable == Some(false) {
            return Ok(false);
        }
        // b. If Receiver is not an Object, return false.
        let Ok(receiver) = Object::try_from(receiver) else {
            return Ok(false);
        };
        // c. Let existingDescriptor be ? Receiver.[[GetOwnProperty]](P).
        let existing_descriptor = receiver.internal_get_own_property(agent, property_key)?;
        // d. If existingDescriptor is not undefined, then
        if let Some(existing_descriptor) = existing_descriptor {
            // i. If IsAccessorDescriptor(existingDescriptor) is true, return
            //    false.
            if existing_descriptor.is_accessor_descriptor() {
                return Ok(false);
            }
            // ii. If existingDescriptor.[[Writable]] is false, return false.
            if existing_descriptor.writable == Some(false) {
                return Ok(false);
            }
            // iii. Let valueDesc be the PropertyDescriptor { [[Value]]: V }.
            // iv. Return ? Receiver.[[DefineOwnProperty]](P, valueDesc).
            return receiver.internal_define_own_property(
                agent,
                property_key,
                PropertyDescriptor {
                    value: Some(value),
                    ..Default::default()
                },
            );
        }
        // e. Else, return ? CreateDataProperty(Receiver, P, V).
        return receiver.internal_define_own_property(
            agent,
            property_key,
            PropertyDescriptor::new_data_descriptor(value),
        );
    }

    // 3. Assert: IsAccessorDescriptor(ownDesc) is true.
    debug_assert!(own_descriptor.is_accessor_descriptor());
    // 4. Let setter be ownDesc.[[Set]].
    // 5. If setter is undefined, return false.
    let Some(Some(setter)) = own_descriptor.set else {
        return Ok(false);
    };
    // 6. Perform ? Call(setter, Receiver, « V »).
    call_function(agent, setter, receiver, Some(&[value]))?;
    // 7. Return true.
    Ok(true)
}

/// ### [10.1.10.1 OrdinaryDelete ( O, P )](https://tc39.es/ecma262/#sec-ordinarydelete)
pub(crate) fn ordinary_delete(
    agent: &mut Agent,
    backing_object: OrdinaryObject,
    property_key: PropertyKey,
) -> bool {
    // 1. Let desc be ? O.[[GetOwnProperty]](P).
    let descriptor = agent[backing_object].property(property_key);
    // 2. If desc is undefined, return true.
    let Some(descriptor) = descriptor else {
        return true;
    };
    // 3. If desc.[[Configurable]] is true, then
    if descriptor.configurable == Some(true) {
        // a. Remove the own property with key P from O.
        agent[backing_object].remove_property(property_key);
        // b. Return true.
        return true;
    }
    // 4. Return false.
    false
}

/// ### [10.1.11.1 OrdinaryOwnPropertyKeys ( O )](https://tc39.es/ecma262/#sec-ordinaryownpropertykeys)
pub(crate) fn ordinary_own_property_keys(
    agent: &Agent,
    backing_object: OrdinaryObject,
) -> Vec<PropertyKey> {
    // 1. Let keys be a new empty List.
    // 2. For each own property key P of O such that P is an array index, in
    //    ascending numeric index order, append P to keys.
    // 3. For each own property key P of O such that P is a String and P is
    //    not an array index, in ascending chronological order of property
    //    creation, append P to keys.
    // 4. For each own property key P of O such that P is a Symbol, in
    //    ascending chronological order of property creation, append P to
    //    keys.
    // 5. Return keys.
    agent[backing_object].own_property_keys()
}

/// ### [10.1.12 OrdinaryObjectCreate ( proto \[ , additionalInternalSlotsList \] )](https://tc39.es/ecma262/#sec-ordinaryobjectcreate)
pub(crate) fn ordinary_object_create_with_intrinsics(
    agent: &mut Agent,
    proto_intrinsics: Option<ProtoIntrinsics>,
) -> Object {
    let prototype = proto_intrinsics.map(|intrinsic| {
        agent
            .current_realm()
            .intrinsics()
            .get_intrinsic_default_proto(intrinsic)
    });
    // 1. Let internalSlotsList be « [[Prototype]], [[Extensible]] ».
    // 2. Let O be MakeBasicObject(internalSlotsList).
    // 3. Set O.[[Prototype]] to proto.
    // 4. Return O.
    OrdinaryObject::create_object(agent, prototype, &[]).into()
}

/// ### [10.1.13 OrdinaryCreateFromConstructor ( constructor, intrinsicDefaultProto \[ , internalSlotsList \] )](https://tc39.es/ecma262/#sec-ordinarycreatefromconstructor)
pub(crate) fn ordinary_create_from_constructor(
    agent: &mut Agent,
    constructor: Function,
    intrinsic_default_proto: ProtoIntrinsics,
) -> JsResult<Object> {
    // 1. Assert: intrinsicDefaultProto is this specification's name of an
    //    intrinsic object.
    // 2. Let proto be ? GetPrototypeFromConstructor(constructor,
    //    intrinsicDefaultProto).
    let proto = get_prototype_from_constructor(agent, constructor, intrinsic_default_proto)?;
    // 3. Return OrdinaryObjectCreate(proto, internalSlotsList).
    Ok(OrdinaryObject::create_object(agent, proto, &[]).into())
}

/// ### [10.1.14 GetPrototypeFromConstructor ( constructor, intrinsicDefaultProto )](https://tc39.es/ecma262/#sec-getprototypefromconstructor)
pub(crate) fn get_prototype_from_constructor(
    agent: &mut Agent,
    constructor: Function,
    intrinsic_default_proto: ProtoIntrinsics,
) -> JsResult<Option<Object>> {
    use crate::ecmascript::abstract_operations::operations_on_objects::get;
    use crate::ecmascript::types::IntoObject;
    // 1. Assert: intrinsicDefaultProto is this specification's name of an
    //    intrinsic object. The corresponding object must be an intrinsic
    //    that is intended to be used as the [[Prototype]] value of an object.
    // 2. Let proto be ? Get(constructor, "prototype").
    let prototype_key = PropertyKey::from_static_str(agent, "prototype");
    let proto = get(agent, constructor.into_object(), prototype_key)?;
    // 3. If proto is not an Object, then
    if let Ok(proto) = Object::try_from(proto) {
        Ok(Some(proto))
    } else {
        // a. Let realm be ? GetFunctionRealm(constructor).
        // b. Set proto to realm's intrinsic object named
        //    intrinsicDefaultProto.
        // NOTE: GetFunctionRealm is observable only through revoked proxies;
        // the constructor's realm is used directly.
        let realm = match constructor {
            Function::BuiltinFunction(f) => agent[f].realm,
            Function::ECMAScriptFunction(f) => agent[f].realm,
            _ => agent.current_realm_id(),
        };
        Ok(Some(
            agent[realm]
                .intrinsics()
                .get_intrinsic_default_proto(intrinsic_default_proto),
        ))
    }
}

/// ### [10.4.7.2 SetImmutablePrototype ( O, V )](https://tc39.es/ecma262/#sec-set-immutable-prototype)
pub(crate) fn set_immutable_prototype(
    agent: &mut Agent,
    object: Object,
    prototype: Option<Object>,
) -> JsResult<bool> {
    // 1. Let current be ? O.[[GetPrototypeOf]]().
    let current = object.internal_get_prototype_of(agent)?;
    // 2. If SameValue(V, current) is true, return true.
    // 3. Return false.
    Ok(prototype == current)
}

/// Throws a TypeError if a define was rejected; the caller's policy for
/// DefinePropertyOrThrow.
pub(crate) fn throw_property_define_failed(
    agent: &mut Agent,
    property_key: PropertyKey,
) -> crate::ecmascript::execution::agent::JsError {
    let name = property_key.as_display_string(agent);
    agent.throw_exception(
        ExceptionType::TypeError,
        format!("Cannot redefine property {}", name),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::{initialize_default_realm, Agent, DefaultHostHooks};
    use crate::ecmascript::types::{IntoValue, Number};

    fn test_agent() -> Agent {
        let mut agent = Agent::new(Default::default(), &DefaultHostHooks);
        initialize_default_realm(&mut agent);
        agent
    }

    #[test]
    fn non_configurable_non_writable_data_property_is_immutable() {
        let mut agent = test_agent();
        let object = OrdinaryObject::create_object(&mut agent, None, &[]);
        let key = PropertyKey::from_static_str(&mut agent, "x");
        let one = Number::from(1u32).into_value();
        let two = Number::from(2u32).into_value();

        assert!(ordinary_define_own_property(
            &mut agent,
            object,
            key,
            PropertyDescriptor {
                value: Some(one),
                ..Default::default()
            },
        ));
        // Defaults are all false.
        let current = ordinary_get_own_property(&agent, object, key).unwrap();
        assert_eq!(current.writable, Some(false));
        assert_eq!(current.enumerable, Some(false));
        assert_eq!(current.configurable, Some(false));

        // A changed value is rejected, a no-op accepted.
        assert!(!ordinary_define_own_property(
            &mut agent,
            object,
            key,
            PropertyDescriptor {
                value: Some(two),
                ..Default::default()
            },
        ));
        assert!(ordinary_define_own_property(
            &mut agent,
            object,
            key,
            PropertyDescriptor {
                value: Some(one),
                ..Default::default()
            },
        ));
        // Kind changes and writability promotion are rejected.
        assert!(!ordinary_define_own_property(
            &mut agent,
            object,
            key,
            PropertyDescriptor {
                get: Some(None),
                ..Default::default()
            },
        ));
        assert!(!ordinary_define_own_property(
            &mut agent,
            object,
            key,
            PropertyDescriptor {
                writable: Some(true),
                ..Default::default()
            },
        ));
    }

    #[test]
    fn own_property_keys_order() {
        let mut agent = test_agent();
        let object = OrdinaryObject::create_object(&mut agent, None, &[]);
        let b_key = PropertyKey::from_static_str(&mut agent, "b");
        let two_key = PropertyKey::from_static_str(&mut agent, "2");
        let a_key = PropertyKey::from_static_str(&mut agent, "a");
        let zero_key = PropertyKey::from_static_str(&mut agent, "0");
        for key in [b_key, two_key, a_key, zero_key] {
            assert!(ordinary_define_own_property(
                &mut agent,
                object,
                key,
                PropertyDescriptor::new_data_descriptor(Value::Undefined),
            ));
        }
        let keys = ordinary_own_property_keys(&agent, object);
        assert_eq!(keys, vec![zero_key, two_key, b_key, a_key]);
    }
}
