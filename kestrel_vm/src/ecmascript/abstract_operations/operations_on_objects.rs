// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.3 Operations on Objects](https://tc39.es/ecma262/#sec-operations-on-objects)

use super::testing_and_comparison::{is_callable, is_constructor};
use crate::ecmascript::builtins::array::array_create;
use crate::ecmascript::builtins::ordinary::throw_property_define_failed;
use crate::ecmascript::builtins::proxy::{proxy_call, proxy_construct};
use crate::ecmascript::builtins::ArgumentsList;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{
    Function, InternalMethods, InternalSlots, IntoValue, Object, PrivateElement, PrivateName,
    PropertyDescriptor, PropertyKey, Value,
};

/// ### [7.3.2 Get ( O, P )](https://tc39.es/ecma262/#sec-get-o-p)
pub(crate) fn get(agent: &mut Agent, o: Object, p: PropertyKey) -> JsResult<Value> {
    // 1. Return ? O.[[Get]](P, O).
    o.internal_get(agent, p, o.into())
}

/// ### [7.3.3 GetV ( V, P )](https://tc39.es/ecma262/#sec-getv)
pub(crate) fn get_v(agent: &mut Agent, v: Value, p: PropertyKey) -> JsResult<Value> {
    // 1. Let O be ? ToObject(V).
    let o = super::type_conversion::to_object(agent, v)?;
    // 2. Return ? O.[[Get]](P, V).
    o.internal_get(agent, p, v)
}

/// ### [7.3.4 Set ( O, P, V, Throw )](https://tc39.es/ecma262/#sec-set-o-p-v-throw)
pub(crate) fn set(
    agent: &mut Agent,
    o: Object,
    p: PropertyKey,
    v: Value,
    throw: bool,
) -> JsResult<()> {
    // 1. Let success be ? O.[[Set]](P, V, O).
    let success = o.internal_set(agent, p, v, o.into())?;
    // 2. If success is false and Throw is true, throw a TypeError exception.
    if !success && throw {
        let name = p.as_display_string(agent);
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Could not set property {}", name),
        ));
    }
    // 3. Return unused.
    Ok(())
}

/// ### [7.3.5 CreateDataProperty ( O, P, V )](https://tc39.es/ecma262/#sec-createdataproperty)
pub(crate) fn create_data_property(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
) -> JsResult<bool> {
    // 1. Let newDesc be the PropertyDescriptor { [[Value]]: V,
    //    [[Writable]]: true, [[Enumerable]]: true, [[Configurable]]: true }.
    let new_descriptor = PropertyDescriptor::new_data_descriptor(value);
    // 2. Return ? O.[[DefineOwnProperty]](P, newDesc).
    object.internal_define_own_property(agent, property_key, new_descriptor)
}

/// ### [7.3.7 CreateDataPropertyOrThrow ( O, P, V )](https://tc39.es/ecma262/#sec-createdatapropertyorthrow)
pub(crate) fn create_data_property_or_throw(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    value: Value,
) -> JsResult<()> {
    // 1. Let success be ? CreateDataProperty(O, P, V).
    let success = create_data_property(agent, object, property_key, value)?;
    // 2. If success is false, throw a TypeError exception.
    if !success {
        return Err(throw_property_define_failed(agent, property_key));
    }
    // 3. Return unused.
    Ok(())
}

/// ### [7.3.8 DefinePropertyOrThrow ( O, P, desc )](https://tc39.es/ecma262/#sec-definepropertyorthrow)
pub(crate) fn define_property_or_throw(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
    descriptor: PropertyDescriptor,
) -> JsResult<()> {
    // 1. Let success be ? O.[[DefineOwnProperty]](P, desc).
    let success = object.internal_define_own_property(agent, property_key, descriptor)?;
    // 2. If success is false, throw a TypeError exception.
    if !success {
        return Err(throw_property_define_failed(agent, property_key));
    }
    // 3. Return unused.
    Ok(())
}

/// ### [7.3.9 DeletePropertyOrThrow ( O, P )](https://tc39.es/ecma262/#sec-deletepropertyorthrow)
pub(crate) fn delete_property_or_throw(
    agent: &mut Agent,
    object: Object,
    property_key: PropertyKey,
) -> JsResult<()> {
    // 1. Let success be ? O.[[Delete]](P).
    let success = object.internal_delete(agent, property_key)?;
    // 2. If success is false, throw a TypeError exception.
    if !success {
        let name = property_key.as_display_string(agent);
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Could not delete property {}", name),
        ));
    }
    // 3. Return unused.
    Ok(())
}

/// ### [7.3.10 GetMethod ( V, P )](https://tc39.es/ecma262/#sec-getmethod)
pub(crate) fn get_method(
    agent: &mut Agent,
    v: Value,
    p: PropertyKey,
) -> JsResult<Option<Function>> {
    // 1. Let func be ? GetV(V, P).
    let func = get_v(agent, v, p)?;
    // 2. If func is either undefined or null, return undefined.
    if func.is_undefined() || func.is_null() {
        return Ok(None);
    }
    // 3. If IsCallable(func) is false, throw a TypeError exception.
    let Ok(func) = Function::try_from(func) else {
        let name = p.as_display_string(agent);
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("{} is not a function", name),
        ));
    };
    // 4. Return func.
    Ok(Some(func))
}

/// ### [7.3.11 HasProperty ( O, P )](https://tc39.es/ecma262/#sec-hasproperty)
pub(crate) fn has_property(agent: &mut Agent, o: Object, p: PropertyKey) -> JsResult<bool> {
    // 1. Return ? O.[[HasProperty]](P).
    o.internal_has_property(agent, p)
}

/// ### [7.3.12 HasOwnProperty ( O, P )](https://tc39.es/ecma262/#sec-hasownproperty)
pub(crate) fn has_own_property(agent: &mut Agent, o: Object, p: PropertyKey) -> JsResult<bool> {
    // 1. Let desc be ? O.[[GetOwnProperty]](P).
    let descriptor = o.internal_get_own_property(agent, p)?;
    // 2. If desc is undefined, return false. 3. Return true.
    Ok(descriptor.is_some())
}

/// ### [7.3.13 Call ( F, V \[ , argumentsList \] )](https://tc39.es/ecma262/#sec-call)
pub(crate) fn call(
    agent: &mut Agent,
    f: Value,
    v: Value,
    arguments_list: Option<&[Value]>,
) -> JsResult<Value> {
    // 1. If argumentsList is not present, set argumentsList to a new empty
    //    List.
    let arguments_list = arguments_list.unwrap_or(&[]);
    // 2. If IsCallable(F) is false, throw a TypeError exception.
    if let Ok(f) = Function::try_from(f) {
        // 3. Return ? F.[[Call]](V, argumentsList).
        f.internal_call(agent, v, ArgumentsList(arguments_list))
    } else if let Value::Proxy(proxy) = f {
        proxy_call(agent, proxy, v, ArgumentsList(arguments_list))
    } else {
        let name = f.string_repr(agent).to_string_lossy(agent).into_owned();
        Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("{} is not a function", name),
        ))
    }
}

/// Call for a known Function value.
pub(crate) fn call_function(
    agent: &mut Agent,
    f: Function,
    v: Value,
    arguments_list: Option<&[Value]>,
) -> JsResult<Value> {
    let arguments_list = arguments_list.unwrap_or(&[]);
    f.internal_call(agent, v, ArgumentsList(arguments_list))
}

/// ### [7.3.15 Construct ( F \[ , argumentsList \[ , newTarget \] \] )](https://tc39.es/ecma262/#sec-construct)
pub(crate) fn construct(
    agent: &mut Agent,
    f: Function,
    arguments_list: Option<&[Value]>,
    new_target: Option<Function>,
) -> JsResult<Object> {
    // 1. If newTarget is not present, set newTarget to F.
    let new_target = new_target.unwrap_or(f);
    // 2. If argumentsList is not present, set argumentsList to a new empty
    //    List.
    let arguments_list = arguments_list.unwrap_or(&[]);
    // 3. Return ? F.[[Construct]](argumentsList, newTarget).
    f.internal_construct(agent, ArgumentsList(arguments_list), new_target)
}

/// Construct dispatch for proxies with a construct trap.
pub(crate) fn construct_value(
    agent: &mut Agent,
    f: Value,
    arguments_list: Option<&[Value]>,
    new_target: Option<Value>,
) -> JsResult<Object> {
    if let Value::Proxy(proxy) = f {
        return proxy_construct(
            agent,
            proxy,
            ArgumentsList(arguments_list.unwrap_or(&[])),
            new_target.unwrap_or(f),
        );
    }
    let Some(f) = is_constructor(agent, f) else {
        let name = f.string_repr(agent).to_string_lossy(agent).into_owned();
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("{} is not a constructor", name),
        ));
    };
    let new_target = match new_target {
        Some(target) => Function::try_from(target).ok(),
        None => None,
    };
    construct(agent, f, arguments_list, new_target)
}

/// ### [7.3.19 LengthOfArrayLike ( obj )](https://tc39.es/ecma262/#sec-lengthofarraylike)
pub(crate) fn length_of_array_like(agent: &mut Agent, obj: Object) -> JsResult<i64> {
    // 1. Return ℝ(? ToLength(? Get(obj, "length"))).
    let length_key = PropertyKey::from_static_str(agent, "length");
    let length = get(agent, obj, length_key)?;
    super::type_conversion::to_length(agent, length)
}

/// ### [7.3.18 CreateArrayFromList ( elements )](https://tc39.es/ecma262/#sec-createarrayfromlist)
pub(crate) fn create_array_from_list(
    agent: &mut Agent,
    elements: &[Value],
) -> crate::ecmascript::builtins::Array {
    // 1. Let array be ! ArrayCreate(0).
    let array = array_create(agent, elements.len(), elements.len(), None)
        .expect("list length is a valid array length");
    // 2. Let n be 0.
    // 3. For each element e of elements: CreateDataPropertyOrThrow(array,
    //    ! ToString(𝔽(n)), e), then increment n.
    for (index, element) in elements.iter().enumerate() {
        agent[array].elements[index] = Some(*element);
    }
    // 4. Return array.
    array
}

/// ### [7.3.25 GetFunctionRealm ( obj )](https://tc39.es/ecma262/#sec-getfunctionrealm)
pub(crate) fn get_function_realm(agent: &Agent, function: Function) -> JsResult<RealmIdentifier> {
    // 1. If obj has a [[Realm]] internal slot, return obj.[[Realm]].
    match function {
        Function::BuiltinFunction(f) => Ok(agent[f].realm),
        Function::ECMAScriptFunction(f) => Ok(agent[f].realm),
        // 2. If obj is a bound function exotic object, return
        //    ? GetFunctionRealm(obj.[[BoundTargetFunction]]).
        Function::BoundFunction(f) => {
            get_function_realm(agent, agent[f].bound_target_function)
        }
        // 3. Perform the algorithm recursively on obj.[[ProxyTarget]] for
        //    proxies. Promise resolving functions carry no realm slot; the
        //    current realm stands in.
        Function::PromiseResolvingFunction(_) => Ok(agent.current_realm_id()),
    }
}

/// ### [7.3.26 CopyDataProperties ( target, source, excludedItems )](https://tc39.es/ecma262/#sec-copydataproperties)
pub(crate) fn copy_data_properties(
    agent: &mut Agent,
    target: Object,
    source: Value,
    excluded_items: &[PropertyKey],
) -> JsResult<()> {
    // 1. If source is either undefined or null, return unused.
    if source.is_undefined() || source.is_null() {
        return Ok(());
    }
    // 2. Let from be ! ToObject(source).
    let from = super::type_conversion::to_object(agent, source)?;
    // 3. Let keys be ? from.[[OwnPropertyKeys]]().
    let keys = from.internal_own_property_keys(agent)?;
    // 4. For each element nextKey of keys, do
    for next_key in keys {
        // a. Let excluded be false ... if SameValue(e, nextKey) is true ...
        if excluded_items.contains(&next_key) {
            continue;
        }
        // c. i. Let desc be ? from.[[GetOwnProperty]](nextKey).
        let descriptor = from.internal_get_own_property(agent, next_key)?;
        // ii. If desc is not undefined and desc.[[Enumerable]] is true, then
        if let Some(descriptor) = descriptor {
            if descriptor.enumerable == Some(true) {
                // 1. Let propValue be ? Get(from, nextKey).
                let prop_value = get(agent, from, next_key)?;
                // 2. Perform ! CreateDataPropertyOrThrow(target, nextKey,
                //    propValue).
                create_data_property_or_throw(agent, target, next_key, prop_value)?;
            }
        }
    }
    // 5. Return unused.
    Ok(())
}

/// ### [7.3.22 OrdinaryHasInstance ( C, O )](https://tc39.es/ecma262/#sec-ordinaryhasinstance)
pub(crate) fn ordinary_has_instance(agent: &mut Agent, c: Value, o: Value) -> JsResult<bool> {
    // 1. If IsCallable(C) is false, return false.
    let Ok(c) = Function::try_from(c) else {
        return Ok(false);
    };
    // 2. If C has a [[BoundTargetFunction]] internal slot, then
    if let Function::BoundFunction(c) = c {
        // a. Let BC be C.[[BoundTargetFunction]].
        let bc = agent[c].bound_target_function;
        // b. Return ? InstanceofOperator(O, BC).
        return ordinary_has_instance(agent, bc.into(), o);
    }
    // 3. If O is not an Object, return false.
    let Ok(mut o) = Object::try_from(o) else {
        return Ok(false);
    };
    // 4. Let P be ? Get(C, "prototype").
    let prototype_key = PropertyKey::from_static_str(agent, "prototype");
    let p = get(agent, c.into(), prototype_key)?;
    // 5. If P is not an Object, throw a TypeError exception.
    let Ok(p) = Object::try_from(p) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Function prototype is not an object",
        ));
    };
    // 6. Repeat,
    loop {
        // a. Set O to ? O.[[GetPrototypeOf]]().
        let Some(proto) = o.internal_get_prototype_of(agent)? else {
            // b. If O is null, return false.
            return Ok(false);
        };
        // c. If SameValue(P, O) is true, return true.
        if proto == p {
            return Ok(true);
        }
        o = proto;
    }
}

/// ### [7.3.32 PrivateElementFind ( O, P )](https://tc39.es/ecma262/#sec-privateelementfind)
pub(crate) fn private_element_find(
    agent: &Agent,
    object: Object,
    private_name: PrivateName,
) -> Option<PrivateElement> {
    // 1. If O.[[PrivateElements]] contains a PrivateElement pe such that
    //    pe.[[Key]] is P, return pe.
    let backing_object = object.get_backing_object(agent)?;
    agent[backing_object].private_element(private_name).copied()
    // 2. Return EMPTY.
}

/// ### [7.3.33 PrivateFieldAdd ( O, P, value )](https://tc39.es/ecma262/#sec-privatefieldadd)
pub(crate) fn private_field_add(
    agent: &mut Agent,
    object: Object,
    private_name: PrivateName,
    value: Value,
) -> JsResult<()> {
    // 1. If the host is a web browser: HostEnsureCanAddPrivateElement is
    //    host-defined; the default accepts.
    // 2. Let entry be PrivateElementFind(O, P).
    // 3. If entry is not EMPTY, throw a TypeError exception.
    if private_element_find(agent, object, private_name).is_some() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Private field already present on object",
        ));
    }
    // 4. Append PrivateElement { [[Key]]: P, [[Kind]]: FIELD, [[Value]]:
    //    value } to O.[[PrivateElements]].
    let backing_object = object.get_or_create_backing_object(agent);
    agent[backing_object].private_elements.push(PrivateElement::Field {
        key: private_name,
        value,
    });
    Ok(())
}

/// ### [7.3.34 PrivateMethodOrAccessorAdd ( O, method )](https://tc39.es/ecma262/#sec-privatemethodoraccessoradd)
///
/// Method and accessor elements are shared records; they are installed by
/// copy of the handle, never by cloning the closures themselves.
pub(crate) fn private_method_or_accessor_add(
    agent: &mut Agent,
    object: Object,
    method: PrivateElement,
) -> JsResult<()> {
    // 1. Assert: method.[[Kind]] is either METHOD or ACCESSOR.
    debug_assert!(!matches!(method, PrivateElement::Field { .. }));
    // 2. Let entry be PrivateElementFind(O, method.[[Key]]).
    // 3. If entry is not EMPTY, throw a TypeError exception.
    if private_element_find(agent, object, method.key()).is_some() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Private method already present on object",
        ));
    }
    // 4. Append method to O.[[PrivateElements]].
    let backing_object = object.get_or_create_backing_object(agent);
    agent[backing_object].private_elements.push(method);
    Ok(())
}

/// ### [7.3.35 PrivateGet ( O, P )](https://tc39.es/ecma262/#sec-privateget)
pub(crate) fn private_get(
    agent: &mut Agent,
    object: Object,
    private_name: PrivateName,
) -> JsResult<Value> {
    // 1. Let entry be PrivateElementFind(O, P).
    // 2. If entry is EMPTY, throw a TypeError exception.
    let Some(entry) = private_element_find(agent, object, private_name) else {
        return Err(throw_no_private_element(agent, private_name));
    };
    match entry {
        // 3. If entry.[[Kind]] is either FIELD or METHOD, return
        //    entry.[[Value]].
        PrivateElement::Field { value, .. } => Ok(value),
        PrivateElement::Method { value, .. } => Ok(value.into_value()),
        // 4. Assert: entry.[[Kind]] is ACCESSOR.
        PrivateElement::Accessor { get, .. } => {
            // 5. If entry.[[Get]] is undefined, throw a TypeError exception.
            let Some(getter) = get else {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Private accessor has no getter",
                ));
            };
            // 6. Let getter be entry.[[Get]].
            // 7. Return ? Call(getter, O).
            call_function(agent, getter, object.into(), None)
        }
    }
}

/// ### [7.3.36 PrivateSet ( O, P, value )](https://tc39.es/ecma262/#sec-privateset)
pub(crate) fn private_set(
    agent: &mut Agent,
    object: Object,
    private_name: PrivateName,
    value: Value,
) -> JsResult<()> {
    // 1. Let entry be PrivateElementFind(O, P).
    // 2. If entry is EMPTY, throw a TypeError exception.
    let Some(entry) = private_element_find(agent, object, private_name) else {
        return Err(throw_no_private_element(agent, private_name));
    };
    match entry {
        // 3. If entry.[[Kind]] is FIELD, set entry.[[Value]] to value.
        PrivateElement::Field { .. } => {
            let backing_object = object.get_or_create_backing_object(agent);
            let element = agent[backing_object]
                .private_elements
                .iter_mut()
                .find(|element| element.key() == private_name)
                .expect("entry was found above");
            *element = PrivateElement::Field {
                key: private_name,
                value,
            };
            Ok(())
        }
        // 4. Else if entry.[[Kind]] is METHOD, throw a TypeError exception.
        PrivateElement::Method { .. } => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot assign to a private method",
        )),
        // 5. Else: entry.[[Kind]] is ACCESSOR.
        PrivateElement::Accessor { set, .. } => {
            // a. If entry.[[Set]] is undefined, throw a TypeError exception.
            let Some(setter) = set else {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Private accessor has no setter",
                ));
            };
            // b. Let setter be entry.[[Set]].
            // c. Perform ? Call(setter, O, « value »).
            call_function(agent, setter, object.into(), Some(&[value]))?;
            Ok(())
        }
    }
}

fn throw_no_private_element(
    agent: &mut Agent,
    private_name: PrivateName,
) -> crate::ecmascript::execution::agent::JsError {
    let description = private_name.description(agent);
    let description = description.to_string_lossy(agent).into_owned();
    agent.throw_exception(
        ExceptionType::TypeError,
        format!("Object has no private member {}", description),
    )
}

/// ### [7.3.23 EnumerableOwnKeys ( O )](https://tc39.es/ecma262/#sec-enumerableownpropertynames)
///
/// The `key` variant of EnumerableOwnPropertyNames.
pub(crate) fn enumerable_own_keys(agent: &mut Agent, object: Object) -> JsResult<Vec<PropertyKey>> {
    // 1. Let ownKeys be ? O.[[OwnPropertyKeys]]().
    let own_keys = object.internal_own_property_keys(agent)?;
    // 2. Let results be a new empty List.
    let mut results = Vec::with_capacity(own_keys.len());
    // 3. For each element key of ownKeys, do
    for key in own_keys {
        // a. If key is a String, then
        if key.is_symbol() {
            continue;
        }
        // i. Let desc be ? O.[[GetOwnProperty]](key).
        let descriptor = object.internal_get_own_property(agent, key)?;
        // ii. If desc is not undefined and desc.[[Enumerable]] is true, then
        if let Some(descriptor) = descriptor {
            if descriptor.enumerable == Some(true) {
                results.push(key);
            }
        }
    }
    // 4. Return results.
    Ok(results)
}

/// ### [20.1.2.3.1 ObjectDefineProperties](https://tc39.es/ecma262/#sec-objectdefineproperties) helper:
/// throws if `value` is not callable when a getter/setter is extracted.
pub(crate) fn try_get_function(agent: &mut Agent, value: Value) -> JsResult<Option<Function>> {
    if value.is_undefined() {
        return Ok(None);
    }
    if !is_callable(value) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Value is not a function",
        ));
    }
    Ok(Function::try_from(value).ok())
}
