// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.3 String Exotic Objects and primitive wrappers](https://tc39.es/ecma262/#sec-primitive-objects)
//!
//! Boxed Boolean, Number, String, Symbol and BigInt values. The boxed
//! primitive lives in the wrapper's data slot (`[[BooleanData]]`,
//! `[[NumberData]]`, ...). String wrappers additionally expose their indexed
//! characters and `length`.

use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{
    BigInt, InternalMethods, InternalSlots, IntoValue, Number, Object, OrdinaryObject,
    PropertyDescriptor, PropertyKey, String, Symbol, Value,
};
use crate::heap::indexes::PrimitiveObjectIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PrimitiveObject(pub(crate) PrimitiveObjectIndex);

#[derive(Debug, Clone, Copy)]
pub enum PrimitiveObjectData {
    Boolean(bool),
    Number(Number),
    String(String),
    Symbol(Symbol),
    BigInt(BigInt),
}

#[derive(Debug)]
pub struct PrimitiveObjectHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    pub(crate) data: PrimitiveObjectData,
}

impl PrimitiveObject {
    pub(crate) fn create(agent: &mut Agent, data: PrimitiveObjectData) -> Self {
        agent
            .heap
            .primitive_objects
            .push(Some(PrimitiveObjectHeapData {
                object_index: None,
                data,
            }));
        PrimitiveObject(PrimitiveObjectIndex::last(&agent.heap.primitive_objects))
    }

    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub(crate) fn data(self, agent: &Agent) -> PrimitiveObjectData {
        agent[self].data
    }
}

impl core::ops::Index<PrimitiveObject> for Agent {
    type Output = PrimitiveObjectHeapData;

    fn index(&self, index: PrimitiveObject) -> &Self::Output {
        self.heap
            .primitive_objects
            .get(index.get_index())
            .expect("PrimitiveObject out of bounds")
            .as_ref()
            .expect("PrimitiveObject slot empty")
    }
}

impl core::ops::IndexMut<PrimitiveObject> for Agent {
    fn index_mut(&mut self, index: PrimitiveObject) -> &mut Self::Output {
        self.heap
            .primitive_objects
            .get_mut(index.get_index())
            .expect("PrimitiveObject out of bounds")
            .as_mut()
            .expect("PrimitiveObject slot empty")
    }
}

impl From<PrimitiveObject> for Object {
    fn from(value: PrimitiveObject) -> Self {
        Object::PrimitiveObject(value)
    }
}

impl IntoValue for PrimitiveObject {
    fn into_value(self) -> Value {
        Value::PrimitiveObject(self)
    }
}

impl crate::ecmascript::types::IntoObject for PrimitiveObject {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for PrimitiveObject {
    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }

    fn internal_prototype(self, agent: &Agent) -> Option<Object> {
        match self.get_backing_object(agent) {
            Some(backing_object) => agent[backing_object].prototype,
            None => {
                let intrinsics = agent.current_realm().intrinsics();
                let prototype = match agent[self].data {
                    PrimitiveObjectData::Boolean(_) => {
                        intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::Boolean)
                    }
                    PrimitiveObjectData::Number(_) => {
                        intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::Number)
                    }
                    PrimitiveObjectData::String(_) => {
                        intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::String)
                    }
                    PrimitiveObjectData::Symbol(_) => {
                        intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::Symbol)
                    }
                    PrimitiveObjectData::BigInt(_) => {
                        intrinsics.get_intrinsic_default_proto(ProtoIntrinsics::BigInt)
                    }
                };
                Some(prototype)
            }
        }
    }
}

impl InternalMethods for PrimitiveObject {
    /// ### [10.4.3.1 \[\[GetOwnProperty]] of String exotic objects](https://tc39.es/ecma262/#sec-string-exotic-objects-getownproperty-p)
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if let Some(descriptor) = string_exotic_descriptor(agent, self, property_key) {
            return Ok(Some(descriptor));
        }
        if let Some(backing_object) = self.get_backing_object(agent) {
            return backing_object.internal_get_own_property(agent, property_key);
        }
        Ok(None)
    }

    fn internal_has_property(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        if string_exotic_descriptor(agent, self, property_key).is_some() {
            return Ok(true);
        }
        crate::ecmascript::builtins::ordinary::ordinary_has_property(
            agent,
            self.into(),
            property_key,
        )
    }

    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        let mut keys = Vec::new();
        if let PrimitiveObjectData::String(string) = agent[self].data {
            let length = string.utf16_len(agent);
            keys.extend((0..length as u32).map(PropertyKey::Integer));
            let length_key = PropertyKey::from_static_str(agent, "length");
            keys.push(length_key);
        }
        if let Some(backing_object) = self.get_backing_object(agent) {
            keys.extend(backing_object.internal_own_property_keys(agent)?);
        }
        Ok(keys)
    }
}

/// The virtual indexed characters and `length` of a String wrapper.
fn string_exotic_descriptor(
    agent: &mut Agent,
    object: PrimitiveObject,
    property_key: PropertyKey,
) -> Option<PropertyDescriptor> {
    let PrimitiveObjectData::String(string) = agent[object].data else {
        return None;
    };
    match property_key {
        PropertyKey::Integer(index) => {
            let index = index as usize;
            if index >= string.utf16_len(agent) {
                return None;
            }
            let code_unit = string.code_unit_at(agent, index);
            let char_string = String::from_string(
                agent,
                std::string::String::from_utf16_lossy(&[code_unit]),
            );
            Some(PropertyDescriptor {
                value: Some(char_string.into_value()),
                writable: Some(false),
                enumerable: Some(true),
                configurable: Some(false),
                ..Default::default()
            })
        }
        PropertyKey::String(_) => {
            let length_key = PropertyKey::from_static_str(agent, "length");
            if property_key != length_key {
                return None;
            }
            let length = string.utf16_len(agent);
            Some(PropertyDescriptor {
                value: Some(Number::from(length as u32).into_value()),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(false),
                ..Default::default()
            })
        }
        PropertyKey::Symbol(_) => None,
    }
}

impl HeapMark for PrimitiveObject {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.primitive_objects.push(*self);
    }
}

impl HeapMark for PrimitiveObjectHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        match self.data {
            PrimitiveObjectData::Boolean(_) | PrimitiveObjectData::Number(_) => {}
            PrimitiveObjectData::String(string) => string.mark_values(queues),
            PrimitiveObjectData::Symbol(symbol) => symbol.mark_values(queues),
            PrimitiveObjectData::BigInt(bigint) => bigint.mark_values(queues),
        }
    }
}
