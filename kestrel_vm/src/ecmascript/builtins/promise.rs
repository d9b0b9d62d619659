// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2 Promise Objects](https://tc39.es/ecma262/#sec-promise-objects)

pub mod data;

use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_capability_records::PromiseCapability;
use crate::ecmascript::execution::{Agent, ProtoIntrinsics};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, Value,
};
use crate::heap::indexes::PromiseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub use data::PromiseHeapData;
pub(crate) use data::PromiseState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Promise(pub(crate) PromiseIndex);

impl Promise {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    /// Allocates a new pending promise with the default prototype.
    pub(crate) fn new_pending(agent: &mut Agent) -> Self {
        agent.heap.promises.push(Some(PromiseHeapData {
            object_index: None,
            promise_state: PromiseState::default(),
        }));
        Promise(PromiseIndex::last(&agent.heap.promises))
    }

    /// ### [27.2.4.7.1 PromiseResolve ( C, x )](https://tc39.es/ecma262/#sec-promise-resolve)
    /// with C being the %Promise% intrinsic.
    pub(crate) fn resolve(agent: &mut Agent, x: Value) -> Promise {
        // 1. If IsPromise(x) is true, then
        if let Value::Promise(promise) = x {
            // a. ... if SameValue(xConstructor, C) is true, return x.
            // NOTE: Only native promises exist here, so the constructor
            // always matches.
            promise
        } else {
            // 2. Let promiseCapability be ? NewPromiseCapability(C).
            let capability = PromiseCapability::new(agent);
            // 3. Perform ? Call(promiseCapability.[[Resolve]], undefined,
            //    « x »).
            capability.resolve(agent, x);
            // 4. Return promiseCapability.[[Promise]].
            capability.promise()
        }
    }
}

impl core::ops::Index<Promise> for Agent {
    type Output = PromiseHeapData;

    fn index(&self, index: Promise) -> &Self::Output {
        self.heap
            .promises
            .get(index.get_index())
            .expect("Promise out of bounds")
            .as_ref()
            .expect("Promise slot empty")
    }
}

impl core::ops::IndexMut<Promise> for Agent {
    fn index_mut(&mut self, index: Promise) -> &mut Self::Output {
        self.heap
            .promises
            .get_mut(index.get_index())
            .expect("Promise out of bounds")
            .as_mut()
            .expect("Promise slot empty")
    }
}

impl From<Promise> for Object {
    fn from(value: Promise) -> Self {
        Object::Promise(value)
    }
}

impl IntoValue for Promise {
    fn into_value(self) -> Value {
        Value::Promise(self)
    }
}

impl crate::ecmascript::types::IntoObject for Promise {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for Promise {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Promise;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }
}

impl InternalMethods for Promise {}

impl HeapMark for Promise {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.promises.push(*self);
    }
}
