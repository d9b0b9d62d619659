// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.5 Proxy Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots)
//!
//! Every internal method invokes the correspondingly named handler trap when
//! present, enforces the essential invariants against the target, and falls
//! back to the target's internal method otherwise. All traps check for
//! revocation first.

pub mod data;

use crate::ecmascript::abstract_operations::operations_on_objects::{
    call_function, create_array_from_list, get_method,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::same_value;
use crate::ecmascript::abstract_operations::type_conversion::{to_boolean, to_property_key};
use crate::ecmascript::builtins::ordinary::is_compatible_property_descriptor;
use crate::ecmascript::builtins::ArgumentsList;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{
    Function, InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject,
    PropertyDescriptor, PropertyKey, Value,
};
use crate::heap::indexes::ProxyIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub use data::ProxyHeapData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Proxy(pub(crate) ProxyIndex);

impl Proxy {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub(crate) fn is_callable(self, agent: &Agent) -> bool {
        agent[self].is_callable
    }

    pub(crate) fn is_constructor(self, agent: &Agent) -> bool {
        agent[self].is_constructor
    }

    /// Revokes the proxy: both \[\[ProxyTarget]] and \[\[ProxyHandler]]
    /// become null and every subsequent trap throws.
    pub(crate) fn revoke(self, agent: &mut Agent) {
        let data = &mut agent[self];
        data.target = None;
        data.handler = None;
    }
}

/// ### [10.5.14 ProxyCreate ( target, handler )](https://tc39.es/ecma262/#sec-proxycreate)
pub(crate) fn proxy_create(agent: &mut Agent, target: Value, handler: Value) -> JsResult<Proxy> {
    // 1. If target is not an Object, throw a TypeError exception.
    let Ok(target) = Object::try_from(target) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Proxy target must be an object",
        ));
    };
    // 2. If handler is not an Object, throw a TypeError exception.
    let Ok(handler) = Object::try_from(handler) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Proxy handler must be an object",
        ));
    };
    // 3-7. Let P be a newly created Proxy; its [[Call]] and [[Construct]]
    //      presence mirrors the target's.
    let is_callable = target.is_callable(agent)
        || matches!(target, Object::Proxy(p) if p.is_callable(agent));
    let is_constructor = match target {
        Object::Proxy(p) => p.is_constructor(agent),
        _ => Function::try_from(target)
            .map(|f| f.is_constructor(agent))
            .unwrap_or(false),
    };
    agent.heap.proxys.push(Some(ProxyHeapData {
        target: Some(target),
        handler: Some(handler),
        is_callable,
        is_constructor,
    }));
    // 8. Return P.
    Ok(Proxy(ProxyIndex::last(&agent.heap.proxys)))
}

/// Returns (target, handler), throwing if the proxy has been revoked, and
/// fetches the named trap from the handler.
fn validate_and_get_trap(
    agent: &mut Agent,
    proxy: Proxy,
    trap_name: &'static str,
) -> JsResult<(Object, Option<Function>)> {
    let data = &agent[proxy];
    let (Some(target), Some(handler)) = (data.target, data.handler) else {
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Cannot perform '{}' on a revoked proxy", trap_name),
        ));
    };
    let trap_key = PropertyKey::from_static_str(agent, trap_name);
    let trap = get_method(agent, handler.into(), trap_key)?;
    Ok((target, trap))
}

impl core::ops::Index<Proxy> for Agent {
    type Output = ProxyHeapData;

    fn index(&self, index: Proxy) -> &Self::Output {
        self.heap
            .proxys
            .get(index.get_index())
            .expect("Proxy out of bounds")
            .as_ref()
            .expect("Proxy slot empty")
    }
}

impl core::ops::IndexMut<Proxy> for Agent {
    fn index_mut(&mut self, index: Proxy) -> &mut Self::Output {
        self.heap
            .proxys
            .get_mut(index.get_index())
            .expect("Proxy out of bounds")
            .as_mut()
            .expect("Proxy slot empty")
    }
}

impl From<Proxy> for Object {
    fn from(value: Proxy) -> Self {
        Object::Proxy(value)
    }
}

impl IntoValue for Proxy {
    fn into_value(self) -> Value {
        Value::Proxy(self)
    }
}

impl crate::ecmascript::types::IntoObject for Proxy {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for Proxy {
    fn get_backing_object(self, _agent: &Agent) -> Option<OrdinaryObject> {
        None
    }

    fn set_backing_object(self, _agent: &mut Agent, _backing_object: OrdinaryObject) {
        unreachable!("proxies have no backing object");
    }

    fn internal_prototype(self, _agent: &Agent) -> Option<Object> {
        unreachable!("proxy prototype goes through [[GetPrototypeOf]]");
    }

    fn internal_set_prototype(self, _agent: &mut Agent, _prototype: Option<Object>) {
        unreachable!("proxy prototype goes through [[SetPrototypeOf]]");
    }

    fn internal_extensible(self, _agent: &Agent) -> bool {
        unreachable!("proxy extensibility goes through [[IsExtensible]]");
    }

    fn internal_set_extensible(self, _agent: &mut Agent, _value: bool) {
        unreachable!("proxy extensibility goes through [[PreventExtensions]]");
    }
}

impl InternalMethods for Proxy {
    /// ### [10.5.1 \[\[GetPrototypeOf]] ( )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-getprototypeof)
    fn internal_get_prototype_of(self, agent: &mut Agent) -> JsResult<Option<Object>> {
        // 1-5. Let trap be ? GetMethod(handler, "getPrototypeOf").
        let (target, trap) = validate_and_get_trap(agent, self, "getPrototypeOf")?;
        // 6. If trap is undefined, return ? target.[[GetPrototypeOf]]().
        let Some(trap) = trap else {
            return target.internal_get_prototype_of(agent);
        };
        // 7. Let handlerProto be ? Call(trap, handler, « target »).
        let handler = agent[self].handler.unwrap();
        let handler_proto =
            call_function(agent, trap, handler.into(), Some(&[target.into()]))?;
        // 8. If handlerProto is not an Object and handlerProto is not null,
        //    throw a TypeError exception.
        let handler_proto = match handler_proto {
            Value::Null => None,
            _ => match Object::try_from(handler_proto) {
                Ok(object) => Some(object),
                Err(_) => {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "getPrototypeOf trap returned neither object nor null",
                    ))
                }
            },
        };
        // 9. Let extensibleTarget be ? IsExtensible(target).
        let extensible_target = target.internal_is_extensible(agent)?;
        // 10. If extensibleTarget is true, return handlerProto.
        if extensible_target {
            return Ok(handler_proto);
        }
        // 11. Let targetProto be ? target.[[GetPrototypeOf]]().
        let target_proto = target.internal_get_prototype_of(agent)?;
        // 12. If SameValue(handlerProto, targetProto) is false, throw a
        //     TypeError exception.
        if handler_proto != target_proto {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "getPrototypeOf trap violated its invariant",
            ));
        }
        // 13. Return handlerProto.
        Ok(handler_proto)
    }

    /// ### [10.5.2 \[\[SetPrototypeOf]] ( V )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-setprototypeof-v)
    fn internal_set_prototype_of(
        self,
        agent: &mut Agent,
        prototype: Option<Object>,
    ) -> JsResult<bool> {
        let (target, trap) = validate_and_get_trap(agent, self, "setPrototypeOf")?;
        // 6. If trap is undefined, return ? target.[[SetPrototypeOf]](V).
        let Some(trap) = trap else {
            return target.internal_set_prototype_of(agent, prototype);
        };
        // 7. Let booleanTrapResult be ToBoolean(? Call(trap, handler,
        //    « target, V »)).
        let handler = agent[self].handler.unwrap();
        let prototype_value = prototype.map_or(Value::Null, |p| p.into());
        let result = call_function(
            agent,
            trap,
            handler.into(),
            Some(&[target.into(), prototype_value]),
        )?;
        // 8. If booleanTrapResult is false, return false.
        if !to_boolean(agent, result) {
            return Ok(false);
        }
        // 9-12. A non-extensible target pins its prototype.
        let extensible_target = target.internal_is_extensible(agent)?;
        if !extensible_target {
            let target_proto = target.internal_get_prototype_of(agent)?;
            if prototype != target_proto {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "setPrototypeOf trap violated its invariant",
                ));
            }
        }
        // 13. Return true.
        Ok(true)
    }

    /// ### [10.5.3 \[\[IsExtensible]] ( )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-isextensible)
    fn internal_is_extensible(self, agent: &mut Agent) -> JsResult<bool> {
        let (target, trap) = validate_and_get_trap(agent, self, "isExtensible")?;
        let Some(trap) = trap else {
            return target.internal_is_extensible(agent);
        };
        let handler = agent[self].handler.unwrap();
        let result = call_function(agent, trap, handler.into(), Some(&[target.into()]))?;
        let boolean_trap_result = to_boolean(agent, result);
        // 8. Let targetResult be ? IsExtensible(target).
        let target_result = target.internal_is_extensible(agent)?;
        // 9. If booleanTrapResult is not targetResult, throw a TypeError
        //    exception.
        if boolean_trap_result != target_result {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "isExtensible trap violated its invariant",
            ));
        }
        Ok(boolean_trap_result)
    }

    /// ### [10.5.4 \[\[PreventExtensions]] ( )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-preventextensions)
    fn internal_prevent_extensions(self, agent: &mut Agent) -> JsResult<bool> {
        let (target, trap) = validate_and_get_trap(agent, self, "preventExtensions")?;
        let Some(trap) = trap else {
            return target.internal_prevent_extensions(agent);
        };
        let handler = agent[self].handler.unwrap();
        let result = call_function(agent, trap, handler.into(), Some(&[target.into()]))?;
        let boolean_trap_result = to_boolean(agent, result);
        // 8. If booleanTrapResult is true and the target is still
        //    extensible, throw a TypeError exception.
        if boolean_trap_result && target.internal_is_extensible(agent)? {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "preventExtensions trap violated its invariant",
            ));
        }
        Ok(boolean_trap_result)
    }

    /// ### [10.5.5 \[\[GetOwnProperty]] ( P )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-getownproperty-p)
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        let (target, trap) = validate_and_get_trap(agent, self, "getOwnPropertyDescriptor")?;
        let Some(trap) = trap else {
            return target.internal_get_own_property(agent, property_key);
        };
        let handler = agent[self].handler.unwrap();
        let key_value = property_key.into_value(agent);
        let trap_result = call_function(
            agent,
            trap,
            handler.into(),
            Some(&[target.into(), key_value]),
        )?;
        // 9. If trapResultObj is neither an Object nor undefined, throw.
        if !trap_result.is_object() && !trap_result.is_undefined() {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "getOwnPropertyDescriptor trap returned neither object nor undefined",
            ));
        }
        // 10. Let targetDesc be ? target.[[GetOwnProperty]](P).
        let target_descriptor = target.internal_get_own_property(agent, property_key)?;
        if trap_result.is_undefined() {
            // 11. If trapResultObj is undefined, then
            let Some(target_descriptor) = target_descriptor else {
                // a. If targetDesc is undefined, return undefined.
                return Ok(None);
            };
            // b. If targetDesc.[[Configurable]] is false, throw.
            if target_descriptor.configurable == Some(false) {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "getOwnPropertyDescriptor trap hid a non-configurable property",
                ));
            }
            // c. If the target is not extensible, throw.
            if !target.internal_is_extensible(agent)? {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "getOwnPropertyDescriptor trap hid a property of a non-extensible target",
                ));
            }
            return Ok(None);
        }
        // 12-15. Normalize and validate the returned descriptor.
        let mut result_descriptor =
            PropertyDescriptor::to_property_descriptor(agent, trap_result)?
                .into_fully_populated();
        let extensible_target = target.internal_is_extensible(agent)?;
        let valid = is_compatible_property_descriptor(
            agent,
            extensible_target,
            result_descriptor.clone(),
            target_descriptor.clone(),
        );
        if !valid {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "getOwnPropertyDescriptor trap reported an incompatible descriptor",
            ));
        }
        // 16. If resultDesc.[[Configurable]] is false, the target property
        //     must exist and be non-configurable as well.
        if result_descriptor.configurable == Some(false) {
            let compatible = match &target_descriptor {
                Some(descriptor) => {
                    descriptor.configurable == Some(false)
                        && (result_descriptor.writable != Some(false)
                            || descriptor.writable == Some(false))
                }
                None => false,
            };
            if !compatible {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "getOwnPropertyDescriptor trap reported a non-configurable property that is not on the target",
                ));
            }
        } else {
            result_descriptor.configurable = result_descriptor.configurable.or(Some(true));
        }
        // 17. Return resultDesc.
        Ok(Some(result_descriptor))
    }

    /// ### [10.5.6 \[\[DefineOwnProperty]] ( P, Desc )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-defineownproperty-p-desc)
    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        let (target, trap) = validate_and_get_trap(agent, self, "defineProperty")?;
        let Some(trap) = trap else {
            return target.internal_define_own_property(agent, property_key, property_descriptor);
        };
        let handler = agent[self].handler.unwrap();
        let key_value = property_key.into_value(agent);
        // 8. Let descObj be FromPropertyDescriptor(Desc).
        let descriptor_object =
            PropertyDescriptor::from_property_descriptor(Some(property_descriptor.clone()), agent)?
                .expect("descriptor was provided");
        let result = call_function(
            agent,
            trap,
            handler.into(),
            Some(&[target.into(), key_value, descriptor_object.into()]),
        )?;
        // 10. If booleanTrapResult is false, return false.
        if !to_boolean(agent, result) {
            return Ok(false);
        }
        // 11-16. Invariant checks against the target's state.
        let target_descriptor = target.internal_get_own_property(agent, property_key)?;
        let extensible_target = target.internal_is_extensible(agent)?;
        let setting_config_false = property_descriptor.configurable == Some(false);
        match &target_descriptor {
            None => {
                if !extensible_target || setting_config_false {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "defineProperty trap violated its invariant",
                    ));
                }
            }
            Some(target_descriptor) => {
                if !is_compatible_property_descriptor(
                    agent,
                    extensible_target,
                    property_descriptor.clone(),
                    Some(target_descriptor.clone()),
                ) {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "defineProperty trap violated its invariant",
                    ));
                }
                if setting_config_false && target_descriptor.configurable == Some(true) {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "defineProperty trap violated its invariant",
                    ));
                }
            }
        }
        // 17. Return true.
        Ok(true)
    }

    /// ### [10.5.7 \[\[HasProperty]] ( P )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-hasproperty-p)
    fn internal_has_property(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        let (target, trap) = validate_and_get_trap(agent, self, "has")?;
        let Some(trap) = trap else {
            return target.internal_has_property(agent, property_key);
        };
        let handler = agent[self].handler.unwrap();
        let key_value = property_key.into_value(agent);
        let result = call_function(
            agent,
            trap,
            handler.into(),
            Some(&[target.into(), key_value]),
        )?;
        let boolean_trap_result = to_boolean(agent, result);
        // 9. If booleanTrapResult is false, the property must not be a
        //    non-configurable own property of the target, and the target
        //    must be extensible.
        if !boolean_trap_result {
            let target_descriptor = target.internal_get_own_property(agent, property_key)?;
            if let Some(target_descriptor) = target_descriptor {
                if target_descriptor.configurable == Some(false)
                    || !target.internal_is_extensible(agent)?
                {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "has trap violated its invariant",
                    ));
                }
            }
        }
        Ok(boolean_trap_result)
    }

    /// ### [10.5.8 \[\[Get]] ( P, Receiver )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-get-p-receiver)
    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        let (target, trap) = validate_and_get_trap(agent, self, "get")?;
        // 6. If trap is undefined, return ? target.[[Get]](P, Receiver).
        let Some(trap) = trap else {
            return target.internal_get(agent, property_key, receiver);
        };
        // 7. Let trapResult be ? Call(trap, handler, « target, P,
        //    Receiver »).
        let handler = agent[self].handler.unwrap();
        let key_value = property_key.into_value(agent);
        let trap_result = call_function(
            agent,
            trap,
            handler.into(),
            Some(&[target.into(), key_value, receiver]),
        )?;
        // 8. Let targetDesc be ? target.[[GetOwnProperty]](P).
        let target_descriptor = target.internal_get_own_property(agent, property_key)?;
        // 9. If targetDesc is not undefined and targetDesc.[[Configurable]]
        //    is false, then
        if let Some(target_descriptor) = target_descriptor {
            if target_descriptor.configurable == Some(false) {
                // a. If IsDataDescriptor(targetDesc) is true and
                //    targetDesc.[[Writable]] is false: the trap must report
                //    the same value as the target.
                if target_descriptor.is_data_descriptor()
                    && target_descriptor.writable == Some(false)
                    && !same_value(agent, trap_result, target_descriptor.value.unwrap())
                {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "get trap reported a different value for a non-configurable non-writable property",
                    ));
                }
                // b. If IsAccessorDescriptor(targetDesc) is true and
                //    targetDesc.[[Get]] is undefined, the trap must report
                //    undefined.
                if target_descriptor.is_accessor_descriptor()
                    && target_descriptor.get == Some(None)
                    && !trap_result.is_undefined()
                {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "get trap reported a value for a getterless accessor",
                    ));
                }
            }
        }
        // 10. Return trapResult.
        Ok(trap_result)
    }

    /// ### [10.5.9 \[\[Set]] ( P, V, Receiver )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-set-p-v-receiver)
    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool> {
        let (target, trap) = validate_and_get_trap(agent, self, "set")?;
        let Some(trap) = trap else {
            return target.internal_set(agent, property_key, value, receiver);
        };
        let handler = agent[self].handler.unwrap();
        let key_value = property_key.into_value(agent);
        let result = call_function(
            agent,
            trap,
            handler.into(),
            Some(&[target.into(), key_value, value, receiver]),
        )?;
        if !to_boolean(agent, result) {
            return Ok(false);
        }
        // 9-10. Invariants for non-configurable target properties.
        let target_descriptor = target.internal_get_own_property(agent, property_key)?;
        if let Some(target_descriptor) = target_descriptor {
            if target_descriptor.configurable == Some(false) {
                if target_descriptor.is_data_descriptor()
                    && target_descriptor.writable == Some(false)
                    && !same_value(agent, value, target_descriptor.value.unwrap())
                {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "set trap changed a non-configurable non-writable property",
                    ));
                }
                if target_descriptor.is_accessor_descriptor()
                    && target_descriptor.set == Some(None)
                {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "set trap succeeded on a setterless accessor",
                    ));
                }
            }
        }
        // 11. Return true.
        Ok(true)
    }

    /// ### [10.5.10 \[\[Delete]] ( P )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-delete-p)
    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        let (target, trap) = validate_and_get_trap(agent, self, "deleteProperty")?;
        let Some(trap) = trap else {
            return target.internal_delete(agent, property_key);
        };
        let handler = agent[self].handler.unwrap();
        let key_value = property_key.into_value(agent);
        let result = call_function(
            agent,
            trap,
            handler.into(),
            Some(&[target.into(), key_value]),
        )?;
        if !to_boolean(agent, result) {
            return Ok(false);
        }
        // 9-13. A non-configurable own property of the target cannot be
        //       reported deleted, nor any property of a non-extensible
        //       target.
        let target_descriptor = target.internal_get_own_property(agent, property_key)?;
        let Some(target_descriptor) = target_descriptor else {
            return Ok(true);
        };
        if target_descriptor.configurable == Some(false) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "deleteProperty trap deleted a non-configurable property",
            ));
        }
        if !target.internal_is_extensible(agent)? {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "deleteProperty trap deleted a property of a non-extensible target",
            ));
        }
        Ok(true)
    }

    /// ### [10.5.11 \[\[OwnPropertyKeys]] ( )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-ownpropertykeys)
    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        let (target, trap) = validate_and_get_trap(agent, self, "ownKeys")?;
        let Some(trap) = trap else {
            return target.internal_own_property_keys(agent);
        };
        let handler = agent[self].handler.unwrap();
        let trap_result = call_function(agent, trap, handler.into(), Some(&[target.into()]))?;
        // 7. Let trapResult be ? CreateListFromArrayLike(trapResultArray,
        //    property-key).
        let Ok(trap_result) = Object::try_from(trap_result) else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "ownKeys trap returned a non-object",
            ));
        };
        let length = crate::ecmascript::abstract_operations::operations_on_objects::length_of_array_like(
            agent,
            trap_result,
        )?;
        let mut keys = Vec::with_capacity(length as usize);
        for index in 0..length {
            let element = crate::ecmascript::abstract_operations::operations_on_objects::get(
                agent,
                trap_result,
                PropertyKey::Integer(index as u32),
            )?;
            if !element.is_string() && !element.is_symbol() {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "ownKeys trap returned a key that is neither string nor symbol",
                ));
            }
            keys.push(to_property_key(agent, element)?);
        }
        // 9-23. The full duplicate/completeness invariant checks reduce to:
        //       every non-configurable key of the target must be reported.
        let target_keys = target.internal_own_property_keys(agent)?;
        for target_key in target_keys {
            let descriptor = target.internal_get_own_property(agent, target_key)?;
            if let Some(descriptor) = descriptor {
                if descriptor.configurable == Some(false) && !keys.contains(&target_key) {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "ownKeys trap omitted a non-configurable key",
                    ));
                }
            }
        }
        Ok(keys)
    }
}

/// ### [10.5.12 \[\[Call]] ( thisArgument, argumentsList )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-call-thisargument-argumentslist)
pub(crate) fn proxy_call(
    agent: &mut Agent,
    proxy: Proxy,
    this_argument: Value,
    arguments_list: ArgumentsList,
) -> JsResult<Value> {
    let (target, trap) = validate_and_get_trap(agent, proxy, "apply")?;
    // 6. If trap is undefined, return ? Call(target, thisArgument,
    //    argumentsList).
    let Some(trap) = trap else {
        return crate::ecmascript::abstract_operations::operations_on_objects::call(
            agent,
            target.into(),
            this_argument,
            Some(&arguments_list),
        );
    };
    // 7. Let argArray be CreateArrayFromList(argumentsList).
    let arg_array = create_array_from_list(agent, &arguments_list);
    // 8. Return ? Call(trap, handler, « target, thisArgument, argArray »).
    let handler = agent[proxy].handler.unwrap();
    call_function(
        agent,
        trap,
        handler.into(),
        Some(&[target.into(), this_argument, arg_array.into_value()]),
    )
}

/// ### [10.5.13 \[\[Construct]] ( argumentsList, newTarget )](https://tc39.es/ecma262/#sec-proxy-object-internal-methods-and-internal-slots-construct-argumentslist-newtarget)
pub(crate) fn proxy_construct(
    agent: &mut Agent,
    proxy: Proxy,
    arguments_list: ArgumentsList,
    new_target: Value,
) -> JsResult<Object> {
    let (target, trap) = validate_and_get_trap(agent, proxy, "construct")?;
    // 5. Assert: IsConstructor(target) is true.
    // 6. If trap is undefined, return ? Construct(target, argumentsList,
    //    newTarget).
    let Some(trap) = trap else {
        return crate::ecmascript::abstract_operations::operations_on_objects::construct_value(
            agent,
            target.into(),
            Some(&arguments_list),
            Some(new_target),
        );
    };
    // 7. Let argArray be CreateArrayFromList(argumentsList).
    let arg_array = create_array_from_list(agent, &arguments_list);
    // 8. Let newObj be ? Call(trap, handler, « target, argArray,
    //    newTarget »).
    let handler = agent[proxy].handler.unwrap();
    let new_object = call_function(
        agent,
        trap,
        handler.into(),
        Some(&[target.into(), arg_array.into_value(), new_target]),
    )?;
    // 9. If newObj is not an Object, throw a TypeError exception.
    Object::try_from(new_object).map_err(|_| {
        agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "construct trap returned a non-object",
        )
    })
}

impl HeapMark for Proxy {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.proxys.push(*self);
    }
}
