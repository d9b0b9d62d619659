// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
//!
//! An object's internal-method suite is selected by its [`Object`] variant at
//! construction time. Ordinary objects and the backing storage of exotic
//! objects live in [`ObjectHeapData`], an insertion-ordered table of fully
//! populated property descriptors.

pub mod internal_methods;
pub mod internal_slots;
pub mod property_key;

use super::{PrivateElement, Value};
use crate::ecmascript::builtins::control_abstraction_objects::async_generator_objects::AsyncGenerator;
use crate::ecmascript::builtins::control_abstraction_objects::generator_objects::Generator;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_resolving_functions::PromiseResolvingFunction;
use crate::ecmascript::builtins::error::Error;
use crate::ecmascript::builtins::indexed_collections::array_objects::ArrayIterator;
use crate::ecmascript::builtins::module::Module;
use crate::ecmascript::builtins::primitive_objects::PrimitiveObject;
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::builtins::proxy::Proxy;
use crate::ecmascript::builtins::typed_array::TypedArray;
use crate::ecmascript::builtins::{
    ArgumentsObject, Array, ArrayBuffer, BoundFunction, BuiltinFunction, DataView,
    ECMAScriptFunction,
};
use crate::ecmascript::execution::Agent;
use crate::ecmascript::types::{Function, PropertyDescriptor};
use crate::heap::indexes::ObjectIndex;
use crate::heap::mark::{HeapMark, WorkQueues};
use crate::heap::ObjectEntry;

pub use internal_methods::InternalMethods;
pub use internal_slots::InternalSlots;
pub use property_key::PropertyKey;

/// An object handle. The variant tag is the object's internal-method vtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Object {
    Object(OrdinaryObject),
    BoundFunction(BoundFunction),
    BuiltinFunction(BuiltinFunction),
    ECMAScriptFunction(ECMAScriptFunction),
    PromiseResolvingFunction(PromiseResolvingFunction),
    Arguments(ArgumentsObject),
    Array(Array),
    ArrayBuffer(ArrayBuffer),
    ArrayIterator(ArrayIterator),
    AsyncGenerator(AsyncGenerator),
    DataView(DataView),
    Error(Error),
    Generator(Generator),
    Module(Module),
    PrimitiveObject(PrimitiveObject),
    Promise(Promise),
    Proxy(Proxy),
    TypedArray(TypedArray),
}

pub trait IntoObject: Sized + Copy {
    fn into_object(self) -> Object;
}

impl IntoObject for Object {
    fn into_object(self) -> Object {
        self
    }
}

/// Handle to an ordinary object's heap data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct OrdinaryObject(pub(crate) ObjectIndex);

/// A fully populated own property.
#[derive(Debug, Clone)]
pub(crate) struct PropertyEntry {
    pub(crate) key: PropertyKey,
    pub(crate) descriptor: PropertyDescriptor,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectHeapData {
    /// \[\[Extensible]]
    pub(crate) extensible: bool,
    /// \[\[Prototype]]
    pub(crate) prototype: Option<Object>,
    /// Own properties in insertion order.
    pub(crate) properties: Vec<PropertyEntry>,
    /// \[\[PrivateElements]], found by Private Name identity.
    pub(crate) private_elements: Vec<PrivateElement>,
}

impl ObjectHeapData {
    pub(crate) fn new(extensible: bool, prototype: Option<Object>) -> Self {
        ObjectHeapData {
            extensible,
            prototype,
            properties: Vec::new(),
            private_elements: Vec::new(),
        }
    }

    pub(crate) fn property(&self, key: PropertyKey) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.descriptor)
    }

    /// Insert or overwrite a fully populated property, preserving insertion
    /// order for pre-existing keys.
    pub(crate) fn define_property(&mut self, key: PropertyKey, descriptor: PropertyDescriptor) {
        debug_assert!(descriptor.is_fully_populated());
        if let Some(entry) = self.properties.iter_mut().find(|entry| entry.key == key) {
            entry.descriptor = descriptor;
        } else {
            self.properties.push(PropertyEntry { key, descriptor });
        }
    }

    pub(crate) fn remove_property(&mut self, key: PropertyKey) {
        self.properties.retain(|entry| entry.key != key);
    }

    /// Own keys in [\[\[OwnPropertyKeys]]](https://tc39.es/ecma262/#sec-ordinaryownpropertykeys)
    /// order: array indices ascending, then strings in insertion order, then
    /// symbols in insertion order.
    pub(crate) fn own_property_keys(&self) -> Vec<PropertyKey> {
        let mut integer_keys = Vec::new();
        let mut string_keys = Vec::new();
        let mut symbol_keys = Vec::new();
        for entry in &self.properties {
            match entry.key {
                PropertyKey::Integer(index) => integer_keys.push(index),
                PropertyKey::String(_) => string_keys.push(entry.key),
                PropertyKey::Symbol(_) => symbol_keys.push(entry.key),
            }
        }
        integer_keys.sort_unstable();
        let mut keys = Vec::with_capacity(self.properties.len());
        keys.extend(integer_keys.into_iter().map(PropertyKey::Integer));
        keys.append(&mut string_keys);
        keys.append(&mut symbol_keys);
        keys
    }

    pub(crate) fn private_element(&self, key: super::PrivateName) -> Option<&PrivateElement> {
        self.private_elements
            .iter()
            .find(|element| element.key() == key)
    }
}

impl OrdinaryObject {
    pub(crate) fn create_object(
        agent: &mut Agent,
        prototype: Option<Object>,
        entries: &[ObjectEntry],
    ) -> Self {
        let mut data = ObjectHeapData::new(true, prototype);
        for entry in entries {
            data.define_property(entry.key, entry.descriptor.clone().into_fully_populated());
        }
        agent.heap.objects.push(Some(data));
        OrdinaryObject(ObjectIndex::last(&agent.heap.objects))
    }

    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }
}

impl core::ops::Index<OrdinaryObject> for Agent {
    type Output = ObjectHeapData;

    fn index(&self, index: OrdinaryObject) -> &Self::Output {
        self.heap
            .objects
            .get(index.get_index())
            .expect("Object out of bounds")
            .as_ref()
            .expect("Object slot empty")
    }
}

impl core::ops::IndexMut<OrdinaryObject> for Agent {
    fn index_mut(&mut self, index: OrdinaryObject) -> &mut Self::Output {
        self.heap
            .objects
            .get_mut(index.get_index())
            .expect("Object out of bounds")
            .as_mut()
            .expect("Object slot empty")
    }
}

impl IntoObject for OrdinaryObject {
    fn into_object(self) -> Object {
        Object::Object(self)
    }
}

impl super::IntoValue for OrdinaryObject {
    fn into_value(self) -> Value {
        Value::Object(self)
    }
}

impl From<OrdinaryObject> for Object {
    fn from(value: OrdinaryObject) -> Self {
        Object::Object(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        match value {
            Object::Object(x) => Value::Object(x),
            Object::BoundFunction(x) => Value::BoundFunction(x),
            Object::BuiltinFunction(x) => Value::BuiltinFunction(x),
            Object::ECMAScriptFunction(x) => Value::ECMAScriptFunction(x),
            Object::PromiseResolvingFunction(x) => Value::PromiseResolvingFunction(x),
            Object::Arguments(x) => Value::Arguments(x),
            Object::Array(x) => Value::Array(x),
            Object::ArrayBuffer(x) => Value::ArrayBuffer(x),
            Object::ArrayIterator(x) => Value::ArrayIterator(x),
            Object::AsyncGenerator(x) => Value::AsyncGenerator(x),
            Object::DataView(x) => Value::DataView(x),
            Object::Error(x) => Value::Error(x),
            Object::Generator(x) => Value::Generator(x),
            Object::Module(x) => Value::Module(x),
            Object::PrimitiveObject(x) => Value::PrimitiveObject(x),
            Object::Promise(x) => Value::Promise(x),
            Object::Proxy(x) => Value::Proxy(x),
            Object::TypedArray(x) => Value::TypedArray(x),
        }
    }
}

impl TryFrom<Value> for Object {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::Object(x) => Ok(Object::Object(x)),
            Value::BoundFunction(x) => Ok(Object::BoundFunction(x)),
            Value::BuiltinFunction(x) => Ok(Object::BuiltinFunction(x)),
            Value::ECMAScriptFunction(x) => Ok(Object::ECMAScriptFunction(x)),
            Value::PromiseResolvingFunction(x) => Ok(Object::PromiseResolvingFunction(x)),
            Value::Arguments(x) => Ok(Object::Arguments(x)),
            Value::Array(x) => Ok(Object::Array(x)),
            Value::ArrayBuffer(x) => Ok(Object::ArrayBuffer(x)),
            Value::ArrayIterator(x) => Ok(Object::ArrayIterator(x)),
            Value::AsyncGenerator(x) => Ok(Object::AsyncGenerator(x)),
            Value::DataView(x) => Ok(Object::DataView(x)),
            Value::Error(x) => Ok(Object::Error(x)),
            Value::Generator(x) => Ok(Object::Generator(x)),
            Value::Module(x) => Ok(Object::Module(x)),
            Value::PrimitiveObject(x) => Ok(Object::PrimitiveObject(x)),
            Value::Promise(x) => Ok(Object::Promise(x)),
            Value::Proxy(x) => Ok(Object::Proxy(x)),
            Value::TypedArray(x) => Ok(Object::TypedArray(x)),
            _ => Err(()),
        }
    }
}

impl Object {
    pub fn is_proxy(self) -> bool {
        matches!(self, Object::Proxy(_))
    }

    pub fn is_module(self) -> bool {
        matches!(self, Object::Module(_))
    }

    pub(crate) fn is_callable(self, agent: &Agent) -> bool {
        match self {
            Object::BoundFunction(_)
            | Object::BuiltinFunction(_)
            | Object::ECMAScriptFunction(_)
            | Object::PromiseResolvingFunction(_) => true,
            Object::Proxy(proxy) => proxy.is_callable(agent),
            _ => false,
        }
    }
}

impl super::IntoValue for Object {
    fn into_value(self) -> Value {
        self.into()
    }
}

impl TryFrom<Object> for Function {
    type Error = ();

    fn try_from(value: Object) -> Result<Self, ()> {
        match value {
            Object::BoundFunction(x) => Ok(Function::BoundFunction(x)),
            Object::BuiltinFunction(x) => Ok(Function::BuiltinFunction(x)),
            Object::ECMAScriptFunction(x) => Ok(Function::ECMAScriptFunction(x)),
            Object::PromiseResolvingFunction(x) => Ok(Function::PromiseResolvingFunction(x)),
            _ => Err(()),
        }
    }
}

impl HeapMark for OrdinaryObject {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.objects.push(*self);
    }
}

impl HeapMark for Object {
    fn mark_values(&self, queues: &mut WorkQueues) {
        Value::from(*self).mark_values(queues);
    }
}

impl HeapMark for ObjectHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.prototype.mark_values(queues);
        for entry in &self.properties {
            entry.key.mark_values(queues);
            entry.descriptor.mark_values(queues);
        }
        self.private_elements.mark_values(queues);
    }
}
