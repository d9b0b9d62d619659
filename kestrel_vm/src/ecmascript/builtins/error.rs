// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.8 Error objects](https://tc39.es/ecma262/#sec-error-objects)

pub mod data;

use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, PropertyDescriptor,
    PropertyKey, String, Value,
};
use crate::heap::indexes::ErrorIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub use data::ErrorHeapData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Error(pub(crate) ErrorIndex);

impl Error {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    pub(crate) fn kind(self, agent: &Agent) -> ExceptionType {
        agent[self].kind
    }

    pub(crate) fn message(self, agent: &Agent) -> Option<String> {
        agent[self].message
    }

    pub(crate) fn stack(self, agent: &Agent) -> Option<String> {
        agent[self].stack
    }
}

impl core::ops::Index<Error> for Agent {
    type Output = ErrorHeapData;

    fn index(&self, index: Error) -> &Self::Output {
        self.heap
            .errors
            .get(index.get_index())
            .expect("Error out of bounds")
            .as_ref()
            .expect("Error slot empty")
    }
}

impl core::ops::IndexMut<Error> for Agent {
    fn index_mut(&mut self, index: Error) -> &mut Self::Output {
        self.heap
            .errors
            .get_mut(index.get_index())
            .expect("Error out of bounds")
            .as_mut()
            .expect("Error slot empty")
    }
}

impl From<Error> for Object {
    fn from(value: Error) -> Self {
        Object::Error(value)
    }
}

impl IntoValue for Error {
    fn into_value(self) -> Value {
        Value::Error(self)
    }
}

impl crate::ecmascript::types::IntoObject for Error {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for Error {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Error;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }

    fn create_backing_object(self, agent: &mut Agent) -> OrdinaryObject {
        debug_assert!(self.get_backing_object(agent).is_none());
        let prototype = self.internal_prototype(agent);
        let backing_object = OrdinaryObject::create_object(agent, prototype, &[]);
        let message_key = PropertyKey::from_static_str(agent, "message");
        let stack_key = PropertyKey::from_static_str(agent, "stack");
        for key in [message_key, stack_key] {
            if let Some(descriptor) = error_virtual_property(agent, self, key) {
                agent[backing_object].define_property(key, descriptor.into_fully_populated());
            }
        }
        self.set_backing_object(agent, backing_object);
        backing_object
    }

    fn internal_prototype(self, agent: &Agent) -> Option<Object> {
        match self.get_backing_object(agent) {
            Some(backing_object) => agent[backing_object].prototype,
            None => {
                let intrinsics = agent.current_realm().intrinsics();
                let proto = match agent[self].kind {
                    ExceptionType::Error => ProtoIntrinsics::Error,
                    ExceptionType::AggregateError => ProtoIntrinsics::AggregateError,
                    ExceptionType::EvalError => ProtoIntrinsics::EvalError,
                    ExceptionType::RangeError => ProtoIntrinsics::RangeError,
                    ExceptionType::ReferenceError => ProtoIntrinsics::ReferenceError,
                    ExceptionType::SyntaxError => ProtoIntrinsics::SyntaxError,
                    ExceptionType::TypeError => ProtoIntrinsics::TypeError,
                    ExceptionType::UriError => ProtoIntrinsics::UriError,
                };
                Some(intrinsics.get_intrinsic_default_proto(proto))
            }
        }
    }
}

impl InternalMethods for Error {
    /// `message` and `stack` materialize as lazily observed own properties.
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if let Some(backing_object) = self.get_backing_object(agent) {
            return backing_object.internal_get_own_property(agent, property_key);
        }
        Ok(error_virtual_property(agent, self, property_key))
    }

    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        if let Some(backing_object) = self.get_backing_object(agent) {
            return backing_object.internal_own_property_keys(agent);
        }
        let mut keys = Vec::new();
        if agent[self].message.is_some() {
            keys.push(PropertyKey::from_static_str(agent, "message"));
        }
        if agent[self].stack.is_some() {
            keys.push(PropertyKey::from_static_str(agent, "stack"));
        }
        Ok(keys)
    }
}

fn error_virtual_property(
    agent: &mut Agent,
    error: Error,
    property_key: PropertyKey,
) -> Option<PropertyDescriptor> {
    let message_key = PropertyKey::from_static_str(agent, "message");
    let stack_key = PropertyKey::from_static_str(agent, "stack");
    let value = if property_key == message_key {
        agent[error].message?.into_value()
    } else if property_key == stack_key {
        agent[error].stack?.into_value()
    } else {
        return None;
    };
    Some(PropertyDescriptor {
        value: Some(value),
        writable: Some(true),
        enumerable: Some(false),
        configurable: Some(true),
        ..Default::default()
    })
}

/// Creates a bare error object of the given kind, used by the Error
/// constructors.
pub(crate) fn error_create(
    agent: &mut Agent,
    kind: ExceptionType,
    message: Option<String>,
    cause: Option<Value>,
) -> Error {
    let stack = message.map(|message| agent.capture_stack_trace(kind, message));
    let stack = stack.map(|stack| String::from_string(agent, stack));
    let mut data = ErrorHeapData::new(kind, message, stack);
    data.cause = cause;
    agent.heap.errors.push(Some(data));
    Error(ErrorIndex::last(&agent.heap.errors))
}

impl HeapMark for Error {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.errors.push(*self);
    }
}
