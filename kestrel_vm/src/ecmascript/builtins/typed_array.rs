// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.5 TypedArray Exotic Objects](https://tc39.es/ecma262/#sec-typedarray-exotic-objects)
//!
//! Indexed access delegates to `GetValueFromBuffer` / `SetValueInBuffer`;
//! writes to indices at or beyond the array length are ignored.

pub mod data;

use crate::ecmascript::builtins::array_buffer::abstract_operations::{
    coerce_for_element_type, get_value_from_buffer, is_detached_buffer, set_value_in_buffer,
    Ordering,
};
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Number, Object, OrdinaryObject,
    PropertyDescriptor, PropertyKey, Value,
};
use crate::heap::indexes::TypedArrayIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub use data::TypedArrayHeapData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct TypedArray(pub(crate) TypedArrayIndex);

impl TypedArray {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    /// ### [10.4.5.12 IsValidIntegerIndex ( O, index )](https://tc39.es/ecma262/#sec-isvalidintegerindex)
    fn is_valid_integer_index(self, agent: &Agent, index: u32) -> bool {
        let data = &agent[self];
        // 1. If IsDetachedBuffer(O.[[ViewedArrayBuffer]]) is true, return
        //    false.
        if agent[data.viewed_array_buffer].is_detached_buffer() {
            return false;
        }
        // 4. If ℝ(index) < 0 or ℝ(index) ≥ O.[[ArrayLength]], return false.
        (index as usize) < data.array_length
    }

    /// ### [10.4.5.15 TypedArrayGetElement ( O, index )](https://tc39.es/ecma262/#sec-typedarraygetelement)
    fn get_element(self, agent: &mut Agent, index: u32) -> Option<Value> {
        // 1. If IsValidIntegerIndex(O, index) is false, return undefined.
        if !self.is_valid_integer_index(agent, index) {
            return None;
        }
        let data = &agent[self];
        let element_type = data.element_type;
        let buffer = data.viewed_array_buffer;
        // 2. Let offset be O.[[ByteOffset]].
        // 4. Let byteIndexInBuffer be (ℝ(index) × elementSize) + offset.
        let byte_index = index as usize * element_type.size() + data.byte_offset;
        // 5. Return GetValueFromBuffer(O.[[ViewedArrayBuffer]],
        //    byteIndexInBuffer, elementType, true, UNORDERED).
        Some(get_value_from_buffer(
            agent,
            buffer,
            byte_index,
            element_type,
            true,
            Ordering::Unordered,
            None,
        ))
    }

    /// ### [10.4.5.16 TypedArraySetElement ( O, index, value )](https://tc39.es/ecma262/#sec-typedarraysetelement)
    fn set_element(self, agent: &mut Agent, index: u32, value: Value) -> JsResult<()> {
        // 1./2. Coerce the value first; the coercion is observable even when
        //       the write is ignored.
        let element_type = agent[self].element_type;
        let num_value = coerce_for_element_type(agent, element_type, value)?;
        // 3. If IsValidIntegerIndex(O, index) is true, then
        if self.is_valid_integer_index(agent, index) {
            let data = &agent[self];
            let buffer = data.viewed_array_buffer;
            let byte_index = index as usize * element_type.size() + data.byte_offset;
            // d. Perform SetValueInBuffer(O.[[ViewedArrayBuffer]],
            //    byteIndexInBuffer, elementType, numValue, true, UNORDERED).
            set_value_in_buffer(
                agent,
                buffer,
                byte_index,
                element_type,
                num_value,
                true,
                Ordering::Unordered,
                None,
            );
        }
        // 4. Return unused: out-of-range writes are ignored.
        Ok(())
    }
}

impl core::ops::Index<TypedArray> for Agent {
    type Output = TypedArrayHeapData;

    fn index(&self, index: TypedArray) -> &Self::Output {
        self.heap
            .typed_arrays
            .get(index.get_index())
            .expect("TypedArray out of bounds")
            .as_ref()
            .expect("TypedArray slot empty")
    }
}

impl core::ops::IndexMut<TypedArray> for Agent {
    fn index_mut(&mut self, index: TypedArray) -> &mut Self::Output {
        self.heap
            .typed_arrays
            .get_mut(index.get_index())
            .expect("TypedArray out of bounds")
            .as_mut()
            .expect("TypedArray slot empty")
    }
}

impl From<TypedArray> for Object {
    fn from(value: TypedArray) -> Self {
        Object::TypedArray(value)
    }
}

impl IntoValue for TypedArray {
    fn into_value(self) -> Value {
        Value::TypedArray(self)
    }
}

impl crate::ecmascript::types::IntoObject for TypedArray {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for TypedArray {
    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }
}

impl InternalMethods for TypedArray {
    /// ### [10.4.5.1 \[\[GetOwnProperty]] ( P )](https://tc39.es/ecma262/#sec-typedarray-getownproperty)
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        // 1. If P is a String and CanonicalNumericIndexString(P) is not
        //    undefined, then
        if let PropertyKey::Integer(index) = property_key {
            // b. Let value be TypedArrayGetElement(O, numericIndex).
            let Some(value) = self.get_element(agent, index) else {
                // c. If value is undefined, return undefined.
                return Ok(None);
            };
            // d. Return the PropertyDescriptor { [[Value]]: value,
            //    [[Writable]]: true, [[Enumerable]]: true,
            //    [[Configurable]]: true }.
            return Ok(Some(PropertyDescriptor {
                value: Some(value),
                writable: Some(true),
                enumerable: Some(true),
                configurable: Some(true),
                ..Default::default()
            }));
        }
        // 2. Return OrdinaryGetOwnProperty(O, P).
        Ok(self.get_backing_object(agent).and_then(|backing_object| {
            crate::ecmascript::builtins::ordinary::ordinary_get_own_property(
                agent,
                backing_object,
                property_key,
            )
        }))
    }

    /// ### [10.4.5.2 \[\[HasProperty]] ( P )](https://tc39.es/ecma262/#sec-typedarray-hasproperty)
    fn internal_has_property(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        // 1. If P is an integer index, return IsValidIntegerIndex(O, P).
        if let PropertyKey::Integer(index) = property_key {
            return Ok(self.is_valid_integer_index(agent, index));
        }
        // 2. Return ? OrdinaryHasProperty(O, P).
        crate::ecmascript::builtins::ordinary::ordinary_has_property(
            agent,
            self.into(),
            property_key,
        )
    }

    /// ### [10.4.5.3 \[\[DefineOwnProperty]] ( P, Desc )](https://tc39.es/ecma262/#sec-typedarray-defineownproperty)
    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        if let PropertyKey::Integer(index) = property_key {
            // a. If IsValidIntegerIndex(O, numericIndex) is false, return
            //    false.
            if !self.is_valid_integer_index(agent, index) {
                return Ok(false);
            }
            // b-e. Configurable, enumerable and writable must not be
            //      restricted; accessors are rejected.
            if property_descriptor.is_accessor_descriptor()
                || property_descriptor.configurable == Some(false)
                || property_descriptor.enumerable == Some(false)
                || property_descriptor.writable == Some(false)
            {
                return Ok(false);
            }
            // f. If Desc has a [[Value]] field, perform
            //    ? TypedArraySetElement(O, numericIndex, Desc.[[Value]]).
            if let Some(value) = property_descriptor.value {
                self.set_element(agent, index, value)?;
            }
            // g. Return true.
            return Ok(true);
        }
        // 2. Return ! OrdinaryDefineOwnProperty(O, P, Desc).
        let backing_object = self.get_or_create_backing_object(agent);
        Ok(crate::ecmascript::builtins::ordinary::ordinary_define_own_property(
            agent,
            backing_object,
            property_key,
            property_descriptor,
        ))
    }

    /// ### [10.4.5.4 \[\[Get]] ( P, Receiver )](https://tc39.es/ecma262/#sec-typedarray-get)
    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        // 1. If P is an integer index, return TypedArrayGetElement(O, P).
        if let PropertyKey::Integer(index) = property_key {
            return Ok(self.get_element(agent, index).unwrap_or(Value::Undefined));
        }
        // The exotic `length` getter lives on %TypedArray.prototype% in the
        // real library surface; carried virtually here.
        let length_key = PropertyKey::from_static_str(agent, "length");
        if property_key == length_key {
            return Ok(Number::from(agent[self].array_length as u32).into_value());
        }
        // 2. Return ? OrdinaryGet(O, P, Receiver).
        crate::ecmascript::builtins::ordinary::ordinary_get(
            agent,
            self.into(),
            property_key,
            receiver,
        )
    }

    /// ### [10.4.5.5 \[\[Set]] ( P, V, Receiver )](https://tc39.es/ecma262/#sec-typedarray-set)
    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool> {
        // 1. If P is an integer index and SameValue(O, Receiver) is true,
        //    perform ? TypedArraySetElement(O, P, V) and return true.
        if let PropertyKey::Integer(index) = property_key {
            if receiver == Value::TypedArray(self) {
                self.set_element(agent, index, value)?;
                return Ok(true);
            }
        }
        // 2. Return ? OrdinarySet(O, P, V, Receiver).
        crate::ecmascript::builtins::ordinary::ordinary_set(
            agent,
            self.into(),
            property_key,
            value,
            receiver,
        )
    }

    /// ### [10.4.5.6 \[\[Delete]] ( P )](https://tc39.es/ecma262/#sec-typedarray-delete)
    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        // 1. If P is an integer index: deletable only if invalid.
        if let PropertyKey::Integer(index) = property_key {
            return Ok(!self.is_valid_integer_index(agent, index));
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

    /// ### [10.4.5.7 \[\[OwnPropertyKeys]] ( )](https://tc39.es/ecma262/#sec-typedarray-ownpropertykeys)
    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        // 2. If IsDetachedBuffer(...) is false, append the integer indices
        //    in ascending order.
        let mut keys = Vec::new();
        if !is_detached_buffer(agent, agent[self].viewed_array_buffer) {
            keys.extend((0..agent[self].array_length as u32).map(PropertyKey::Integer));
        }
        // 3./4. Append the backing object's string and symbol keys.
        if let Some(backing_object) = self.get_backing_object(agent) {
            keys.extend(backing_object.internal_own_property_keys(agent)?);
        }
        Ok(keys)
    }
}

impl HeapMark for TypedArray {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.typed_arrays.push(*self);
    }
}
