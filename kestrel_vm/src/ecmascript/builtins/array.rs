// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.2 Array Exotic Objects](https://tc39.es/ecma262/#sec-array-exotic-objects)
//!
//! An Array's `[[DefineOwnProperty]]` intercepts `"length"` and array index
//! keys; every other internal method is ordinary.

pub mod abstract_operations;
pub mod data;

use crate::ecmascript::builtins::ordinary::{
    is_compatible_property_descriptor, ordinary_has_property,
};
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Number, Object, OrdinaryObject,
    PropertyDescriptor, PropertyKey, Value,
};
use crate::heap::indexes::ArrayIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub use abstract_operations::{array_create, array_set_length};
pub use data::ArrayHeapData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Array(pub(crate) ArrayIndex);

impl Array {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub fn len(self, agent: &Agent) -> u32 {
        agent[self].len
    }

    pub fn is_empty(self, agent: &Agent) -> bool {
        agent[self].len == 0
    }
}

impl core::ops::Index<Array> for Agent {
    type Output = ArrayHeapData;

    fn index(&self, index: Array) -> &Self::Output {
        self.heap
            .arrays
            .get(index.get_index())
            .expect("Array out of bounds")
            .as_ref()
            .expect("Array slot empty")
    }
}

impl core::ops::IndexMut<Array> for Agent {
    fn index_mut(&mut self, index: Array) -> &mut Self::Output {
        self.heap
            .arrays
            .get_mut(index.get_index())
            .expect("Array out of bounds")
            .as_mut()
            .expect("Array slot empty")
    }
}

impl From<Array> for Object {
    fn from(value: Array) -> Self {
        Object::Array(value)
    }
}

impl IntoValue for Array {
    fn into_value(self) -> Value {
        Value::Array(self)
    }
}

impl crate::ecmascript::types::IntoObject for Array {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl TryFrom<Value> for Array {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        if let Value::Array(array) = value {
            Ok(array)
        } else {
            Err(())
        }
    }
}

impl InternalSlots for Array {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Array;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }
}

/// The fully populated descriptor of an array index property.
fn array_index_descriptor(agent: &Agent, array: Array, index: u32) -> Option<PropertyDescriptor> {
    let data = &agent[array];
    let value = data.element(index)?;
    match data.element_descriptors.get(&index) {
        Some(descriptor) => {
            let mut descriptor = descriptor.clone();
            if descriptor.is_data_descriptor() {
                descriptor.value = Some(value);
            }
            Some(descriptor)
        }
        None => Some(PropertyDescriptor {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Default::default()
        }),
    }
}

fn length_descriptor(agent: &Agent, array: Array) -> PropertyDescriptor {
    PropertyDescriptor {
        value: Some(Number::from(agent[array].len).into_value()),
        writable: Some(agent[array].len_writable),
        enumerable: Some(false),
        configurable: Some(false),
        ..Default::default()
    }
}

fn is_length_key(agent: &mut Agent, property_key: PropertyKey) -> bool {
    let length_key = PropertyKey::from_static_str(agent, "length");
    property_key == length_key
}

impl InternalMethods for Array {
    /// ### [10.4.2.1 \[\[DefineOwnProperty]] ( P, Desc )](https://tc39.es/ecma262/#sec-array-exotic-objects-defineownproperty-p-desc)
    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        // 1. If P is "length", then
        if is_length_key(agent, property_key) {
            // a. Return ? ArraySetLength(A, Desc).
            return array_set_length(agent, self, descriptor);
        }
        // 2. Else if P is an array index, then
        if let PropertyKey::Integer(index) = property_key {
            // c. Let oldLen be oldLenDesc.[[Value]]. e. Let index be
            //    ! ToUint32(P).
            let old_len = agent[self].len;
            // f. If index ≥ oldLen and oldLenDesc.[[Writable]] is false,
            //    return false.
            if index >= old_len && !agent[self].len_writable {
                return Ok(false);
            }
            // g. Let succeeded be ! OrdinaryDefineOwnProperty(A, P, Desc).
            let current = array_index_descriptor(agent, self, index);
            let extensible = self.internal_extensible(agent);
            if !is_compatible_property_descriptor(
                agent,
                extensible,
                descriptor.clone(),
                current.clone(),
            ) {
                // h. If succeeded is false, return false.
                return Ok(false);
            }
            let merged = match current {
                Some(current) => PropertyDescriptor {
                    value: descriptor.value.or(current.value),
                    writable: descriptor.writable.or(current.writable),
                    get: descriptor.get.or(current.get),
                    set: descriptor.set.or(current.set),
                    enumerable: descriptor.enumerable.or(current.enumerable),
                    configurable: descriptor.configurable.or(current.configurable),
                }
                .into_fully_populated(),
                None => descriptor.into_fully_populated(),
            };
            let is_plain_data = merged.writable == Some(true)
                && merged.enumerable == Some(true)
                && merged.configurable == Some(true)
                && merged.value.is_some();
            let data = &mut agent[self];
            let value = merged.value.unwrap_or(Value::Undefined);
            data.set_element(index, value);
            if is_plain_data {
                data.element_descriptors.remove(&index);
            } else {
                data.element_descriptors.insert(index, merged);
            }
            // i. If index ≥ oldLen, then
            if index >= old_len {
                // i. Set oldLenDesc.[[Value]] to index + 1𝔽.
                // ii. Perform ! OrdinaryDefineOwnProperty(A, "length",
                //     oldLenDesc).
                data.len = index + 1;
            }
            // j. Return true.
            return Ok(true);
        }
        // 3. Return ? OrdinaryDefineOwnProperty(A, P, Desc).
        let backing_object = self.get_or_create_backing_object(agent);
        Ok(crate::ecmascript::builtins::ordinary::ordinary_define_own_property(
            agent,
            backing_object,
            property_key,
            descriptor,
        ))
    }

    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if is_length_key(agent, property_key) {
            return Ok(Some(length_descriptor(agent, self)));
        }
        if let PropertyKey::Integer(index) = property_key {
            return Ok(array_index_descriptor(agent, self, index));
        }
        Ok(self
            .get_backing_object(agent)
            .and_then(|backing_object| {
                crate::ecmascript::builtins::ordinary::ordinary_get_own_property(
                    agent,
                    backing_object,
                    property_key,
                )
            }))
    }

    fn internal_has_property(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        if is_length_key(agent, property_key) {
            return Ok(true);
        }
        if let PropertyKey::Integer(index) = property_key {
            if agent[self].has_element(index) {
                return Ok(true);
            }
        }
        ordinary_has_property(agent, self.into(), property_key)
    }

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        // `length` is non-configurable.
        if is_length_key(agent, property_key) {
            return Ok(false);
        }
        if let PropertyKey::Integer(index) = property_key {
            if !agent[self].has_element(index) {
                return Ok(true);
            }
            let configurable = agent[self]
                .element_descriptors
                .get(&index)
                .map_or(true, |descriptor| descriptor.configurable == Some(true));
            if !configurable {
                return Ok(false);
            }
            agent[self].remove_element(index);
            return Ok(true);
        }
        match self.get_backing_object(agent) {
            Some(backing_object) => Ok(crate::ecmascript::builtins::ordinary::ordinary_delete(
                agent,
                backing_object,
                property_key,
            )),
            None => Ok(true),
        }
    }

    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        let indices = agent[self].element_indices();
        let mut keys: Vec<PropertyKey> =
            indices.into_iter().map(PropertyKey::Integer).collect();
        keys.push(PropertyKey::from_static_str(agent, "length"));
        if let Some(backing_object) = self.get_backing_object(agent) {
            keys.extend(backing_object.internal_own_property_keys(agent)?);
        }
        Ok(keys)
    }
}

impl HeapMark for Array {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.arrays.push(*self);
    }
}
