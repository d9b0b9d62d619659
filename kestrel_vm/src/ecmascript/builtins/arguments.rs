// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.4 Arguments Exotic Objects](https://tc39.es/ecma262/#sec-arguments-exotic-objects)
//!
//! An arguments exotic object's array index properties map to the formal
//! parameter bindings of an invocation of its associated function. The
//! mapping is maintained as a side table from index to formal name and is
//! severed when an index is deleted, redefined as an accessor, or made
//! non-writable.

use crate::ecmascript::builtins::ecmascript_function::ECMAScriptFunction;
use crate::ecmascript::execution::environments::EnvironmentIndex;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoObject, IntoValue, Number, Object, OrdinaryObject,
    PropertyDescriptor, PropertyKey, String, Value,
};
use crate::heap::indexes::ArgumentsIndex;
use crate::heap::mark::{HeapMark, WorkQueues};
use crate::heap::WellKnownSymbolIndexes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ArgumentsObject(pub(crate) ArgumentsIndex);

#[derive(Debug)]
pub struct ArgumentsHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[ParameterMap]]: index → formal parameter name, None once severed.
    pub(crate) parameter_map: Vec<Option<String>>,
    /// The function environment whose bindings the map reads and writes.
    pub(crate) environment: EnvironmentIndex,
}

impl ArgumentsObject {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    fn mapped_name(self, agent: &Agent, property_key: PropertyKey) -> Option<String> {
        let PropertyKey::Integer(index) = property_key else {
            return None;
        };
        agent[self]
            .parameter_map
            .get(index as usize)
            .copied()
            .flatten()
    }

    fn sever(self, agent: &mut Agent, property_key: PropertyKey) {
        if let PropertyKey::Integer(index) = property_key {
            if let Some(slot) = agent[self].parameter_map.get_mut(index as usize) {
                *slot = None;
            }
        }
    }
}

/// ### [10.4.4.6 CreateUnmappedArgumentsObject ( argumentsList )](https://tc39.es/ecma262/#sec-createunmappedargumentsobject)
pub(crate) fn create_unmapped_arguments_object(
    agent: &mut Agent,
    arguments_list: &[Value],
) -> Object {
    // 1. Let len be the number of elements in argumentsList.
    let len = arguments_list.len();
    // 2. Let obj be OrdinaryObjectCreate(%Object.prototype%, «
    //    [[ParameterMap]] »).
    // 3. Set obj.[[ParameterMap]] to undefined.
    let prototype = agent
        .current_realm()
        .intrinsics()
        .object_prototype()
        .into_object();
    let obj = OrdinaryObject::create_object(agent, Some(prototype.into()), &[]);
    // 4. Perform ! DefinePropertyOrThrow(obj, "length", PropertyDescriptor {
    //    [[Value]]: 𝔽(len), [[Writable]]: true, [[Enumerable]]: false,
    //    [[Configurable]]: true }).
    let length_key = PropertyKey::from_static_str(agent, "length");
    agent[obj].define_property(
        length_key,
        PropertyDescriptor {
            value: Some(Number::from(len as u32).into_value()),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    );
    // 5./6. For each index, perform ! CreateDataPropertyOrThrow(obj,
    //    ! ToString(𝔽(index)), val).
    for (index, value) in arguments_list.iter().enumerate() {
        agent[obj].define_property(
            PropertyKey::Integer(index as u32),
            PropertyDescriptor::new_data_descriptor(*value),
        );
    }
    // 7. Perform ! DefinePropertyOrThrow(obj, @@iterator, ...
    //    %Array.prototype.values% ...).
    let values = agent.current_realm().intrinsics().array_prototype_values();
    agent[obj].define_property(
        PropertyKey::Symbol(WellKnownSymbolIndexes::Iterator.into()),
        PropertyDescriptor {
            value: Some(values.into_value()),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    );
    // 8. Perform ! DefinePropertyOrThrow(obj, "callee", PropertyDescriptor {
    //    [[Get]]: %ThrowTypeError%, [[Set]]: %ThrowTypeError%,
    //    [[Enumerable]]: false, [[Configurable]]: false }).
    let throw_type_error = agent.current_realm().intrinsics().throw_type_error();
    let callee_key = PropertyKey::from_static_str(agent, "callee");
    agent[obj].define_property(
        callee_key,
        PropertyDescriptor {
            get: Some(Some(throw_type_error.into())),
            set: Some(Some(throw_type_error.into())),
            enumerable: Some(false),
            configurable: Some(false),
            ..Default::default()
        },
    );
    // 9. Return obj.
    Object::Object(obj)
}

/// ### [10.4.4.7 CreateMappedArgumentsObject ( func, formals, argumentsList, env )](https://tc39.es/ecma262/#sec-createmappedargumentsobject)
///
/// Only called for functions with a simple parameter list.
pub(crate) fn create_mapped_arguments_object(
    agent: &mut Agent,
    func: ECMAScriptFunction,
    formals: &[String],
    arguments_list: &[Value],
    env: EnvironmentIndex,
) -> Object {
    // 1. Assert: formals does not contain a rest parameter, any binding
    //    patterns, or any initializers.
    let len = arguments_list.len();
    // 2-11. Let obj be the arguments exotic object with a backing ordinary
    //       object holding the index, length, callee and @@iterator
    //       properties.
    let prototype = agent
        .current_realm()
        .intrinsics()
        .object_prototype()
        .into_object();
    let backing = OrdinaryObject::create_object(agent, Some(prototype.into()), &[]);
    // 16-19. Index properties; those under the formal count stay mapped.
    let mut parameter_map = vec![None; len];
    for (index, value) in arguments_list.iter().enumerate() {
        agent[backing].define_property(
            PropertyKey::Integer(index as u32),
            PropertyDescriptor::new_data_descriptor(*value),
        );
        // 19. The last formal with a given name, if within the argument
        //     count, is mapped.
        if let Some(name) = formals.get(index) {
            let is_last_occurrence = formals
                .iter()
                .enumerate()
                .all(|(other, other_name)| other_name != name || other <= index);
            if is_last_occurrence {
                parameter_map[index] = Some(*name);
            }
        }
    }
    let length_key = PropertyKey::from_static_str(agent, "length");
    agent[backing].define_property(
        length_key,
        PropertyDescriptor {
            value: Some(Number::from(len as u32).into_value()),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    );
    let values = agent.current_realm().intrinsics().array_prototype_values();
    agent[backing].define_property(
        PropertyKey::Symbol(WellKnownSymbolIndexes::Iterator.into()),
        PropertyDescriptor {
            value: Some(values.into_value()),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    );
    // 21. Perform ! DefinePropertyOrThrow(obj, "callee", PropertyDescriptor {
    //     [[Value]]: func, [[Writable]]: true, [[Enumerable]]: false,
    //     [[Configurable]]: true }).
    let callee_key = PropertyKey::from_static_str(agent, "callee");
    agent[backing].define_property(
        callee_key,
        PropertyDescriptor {
            value: Some(func.into_value()),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    );
    agent.heap.arguments.push(Some(ArgumentsHeapData {
        object_index: Some(backing),
        parameter_map,
        environment: env,
    }));
    // 22. Return obj.
    Object::Arguments(ArgumentsObject(ArgumentsIndex::last(&agent.heap.arguments)))
}

impl core::ops::Index<ArgumentsObject> for Agent {
    type Output = ArgumentsHeapData;

    fn index(&self, index: ArgumentsObject) -> &Self::Output {
        self.heap
            .arguments
            .get(index.get_index())
            .expect("Arguments out of bounds")
            .as_ref()
            .expect("Arguments slot empty")
    }
}

impl core::ops::IndexMut<ArgumentsObject> for Agent {
    fn index_mut(&mut self, index: ArgumentsObject) -> &mut Self::Output {
        self.heap
            .arguments
            .get_mut(index.get_index())
            .expect("Arguments out of bounds")
            .as_mut()
            .expect("Arguments slot empty")
    }
}

impl From<ArgumentsObject> for Object {
    fn from(value: ArgumentsObject) -> Self {
        Object::Arguments(value)
    }
}

impl IntoValue for ArgumentsObject {
    fn into_value(self) -> Value {
        Value::Arguments(self)
    }
}

impl crate::ecmascript::types::IntoObject for ArgumentsObject {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for ArgumentsObject {
    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }
}

impl InternalMethods for ArgumentsObject {
    /// ### [10.4.4.1 \[\[GetOwnProperty]] ( P )](https://tc39.es/ecma262/#sec-arguments-exotic-objects-getownproperty-p)
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        // 1. Let desc be OrdinaryGetOwnProperty(args, P).
        let backing_object = self.get_or_create_backing_object(agent);
        let Some(mut descriptor) = crate::ecmascript::builtins::ordinary::ordinary_get_own_property(
            agent,
            backing_object,
            property_key,
        ) else {
            // 2. If desc is undefined, return desc.
            return Ok(None);
        };
        // 3. Let map be args.[[ParameterMap]].
        // 4. Let isMapped be ! HasOwnProperty(map, P).
        if let Some(name) = self.mapped_name(agent, property_key) {
            // 5. If isMapped is true, set desc.[[Value]] to Get(map, P): the
            //    current value of the formal parameter binding.
            let environment = agent[self].environment;
            descriptor.value = Some(environment.get_binding_value(agent, name, false)?);
        }
        // 6. Return desc.
        Ok(Some(descriptor))
    }

    /// ### [10.4.4.2 \[\[DefineOwnProperty]] ( P, Desc )](https://tc39.es/ecma262/#sec-arguments-exotic-objects-defineownproperty-p-desc)
    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        // 1-4. Attempt the ordinary define, with newArgDesc adjusted for
        //      mapped data properties without a [[Value]].
        let is_mapped = self.mapped_name(agent, property_key);
        let mut new_descriptor = descriptor.clone();
        if let Some(name) = is_mapped {
            if descriptor.is_data_descriptor() && descriptor.value.is_none() {
                let environment = agent[self].environment;
                new_descriptor.value =
                    Some(environment.get_binding_value(agent, name, false)?);
            }
        }
        // 5. Let allowed be ! OrdinaryDefineOwnProperty(args, P, newArgDesc).
        let backing_object = self.get_or_create_backing_object(agent);
        let allowed = crate::ecmascript::builtins::ordinary::ordinary_define_own_property(
            agent,
            backing_object,
            property_key,
            new_descriptor,
        );
        // 6. If allowed is false, return false.
        if !allowed {
            return Ok(false);
        }
        // 7. If isMapped is true, then
        if let Some(name) = is_mapped {
            // a. If IsAccessorDescriptor(Desc) is true, remove the mapping.
            if descriptor.is_accessor_descriptor() {
                self.sever(agent, property_key);
            } else {
                // b. i. If Desc has a [[Value]] field, write it through to
                //       the parameter binding.
                if let Some(value) = descriptor.value {
                    let environment = agent[self].environment;
                    environment.set_mutable_binding(agent, name, value, false)?;
                }
                // b. ii. If Desc.[[Writable]] is false, remove the mapping.
                if descriptor.writable == Some(false) {
                    self.sever(agent, property_key);
                }
            }
        }
        // 8. Return true.
        Ok(true)
    }

    /// ### [10.4.4.3 \[\[Get]] ( P, Receiver )](https://tc39.es/ecma262/#sec-arguments-exotic-objects-get-p-receiver)
    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        // 2. If isMapped is true, return Get(map, P): the current binding
        //    value.
        if let Some(name) = self.mapped_name(agent, property_key) {
            let environment = agent[self].environment;
            return environment.get_binding_value(agent, name, false);
        }
        // 3. Return OrdinaryGet(args, P, Receiver).
        crate::ecmascript::builtins::ordinary::ordinary_get(
            agent,
            self.into(),
            property_key,
            receiver,
        )
    }

    /// ### [10.4.4.4 \[\[Set]] ( P, V, Receiver )](https://tc39.es/ecma262/#sec-arguments-exotic-objects-set-p-v-receiver)
    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool> {
        // 1. If SameValue(args, Receiver) is true and P is mapped, write the
        //    value through to the parameter binding.
        if receiver == Value::Arguments(self) {
            if let Some(name) = self.mapped_name(agent, property_key) {
                let environment = agent[self].environment;
                environment.set_mutable_binding(agent, name, value, false)?;
            }
        }
        // 2. Return OrdinarySet(args, P, V, Receiver).
        crate::ecmascript::builtins::ordinary::ordinary_set(
            agent,
            self.into(),
            property_key,
            value,
            receiver,
        )
    }

    /// ### [10.4.4.5 \[\[Delete]] ( P )](https://tc39.es/ecma262/#sec-arguments-exotic-objects-delete-p)
    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        let is_mapped = self.mapped_name(agent, property_key).is_some();
        // 3. Let result be ? OrdinaryDelete(args, P).
        let result = match self.get_backing_object(agent) {
            Some(backing_object) => crate::ecmascript::builtins::ordinary::ordinary_delete(
                agent,
                backing_object,
                property_key,
            ),
            None => true,
        };
        // 4. If result is true and isMapped is true, remove the mapping.
        if result && is_mapped {
            self.sever(agent, property_key);
        }
        // 5. Return result.
        Ok(result)
    }
}

impl HeapMark for ArgumentsObject {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.arguments.push(*self);
    }
}

impl HeapMark for ArgumentsHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        for name in self.parameter_map.iter().flatten() {
            name.mark_values(queues);
        }
        self.environment.mark_values(queues);
    }
}
