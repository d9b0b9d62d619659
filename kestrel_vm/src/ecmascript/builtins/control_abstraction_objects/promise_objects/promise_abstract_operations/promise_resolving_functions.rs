// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.1.3 CreateResolvingFunctions ( promise )](https://tc39.es/ecma262/#sec-createresolvingfunctions)

use super::promise_capability_records::PromiseCapability;
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::builtins::ArgumentsList;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{
    Function, InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, Value,
};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromiseResolvingFunctionType {
    Resolve,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PromiseResolvingFunction(
    pub(crate) BaseIndex<PromiseResolvingFunctionHeapData>,
);

#[derive(Debug, Clone)]
pub struct PromiseResolvingFunctionHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// The capability the pair settles; AlreadyResolved is tracked on the
    /// promise state itself.
    pub(crate) promise_capability: PromiseCapability,
    pub(crate) resolve_type: PromiseResolvingFunctionType,
}

/// The `resolve` and `reject` function pair of a new promise.
pub(crate) fn create_resolving_functions(
    agent: &mut Agent,
    promise: Promise,
) -> (PromiseResolvingFunction, PromiseResolvingFunction) {
    let promise_capability = PromiseCapability::from_promise(promise);
    agent
        .heap
        .promise_resolving_functions
        .push(Some(PromiseResolvingFunctionHeapData {
            object_index: None,
            promise_capability,
            resolve_type: PromiseResolvingFunctionType::Resolve,
        }));
    let resolve = PromiseResolvingFunction(BaseIndex::last(
        &agent.heap.promise_resolving_functions,
    ));
    agent
        .heap
        .promise_resolving_functions
        .push(Some(PromiseResolvingFunctionHeapData {
            object_index: None,
            promise_capability,
            resolve_type: PromiseResolvingFunctionType::Reject,
        }));
    let reject = PromiseResolvingFunction(BaseIndex::last(
        &agent.heap.promise_resolving_functions,
    ));
    (resolve, reject)
}

/// \[\[Call]] of a resolving function.
pub(crate) fn promise_resolving_function_call(
    agent: &mut Agent,
    function: PromiseResolvingFunction,
    arguments_list: ArgumentsList,
) -> JsResult<Value> {
    let data = &agent[function];
    let capability = data.promise_capability;
    let resolve_type = data.resolve_type;
    let argument = arguments_list.get(0);
    match resolve_type {
        PromiseResolvingFunctionType::Resolve => capability.resolve(agent, argument),
        PromiseResolvingFunctionType::Reject => capability.reject(agent, argument),
    }
    Ok(Value::Undefined)
}

impl PromiseResolvingFunction {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }
}

impl core::ops::Index<PromiseResolvingFunction> for Agent {
    type Output = PromiseResolvingFunctionHeapData;

    fn index(&self, index: PromiseResolvingFunction) -> &Self::Output {
        self.heap
            .promise_resolving_functions
            .get(index.get_index())
            .expect("PromiseResolvingFunction out of bounds")
            .as_ref()
            .expect("PromiseResolvingFunction slot empty")
    }
}

impl core::ops::IndexMut<PromiseResolvingFunction> for Agent {
    fn index_mut(&mut self, index: PromiseResolvingFunction) -> &mut Self::Output {
        self.heap
            .promise_resolving_functions
            .get_mut(index.get_index())
            .expect("PromiseResolvingFunction out of bounds")
            .as_mut()
            .expect("PromiseResolvingFunction slot empty")
    }
}

impl From<PromiseResolvingFunction> for Object {
    fn from(value: PromiseResolvingFunction) -> Self {
        Object::PromiseResolvingFunction(value)
    }
}

impl IntoValue for PromiseResolvingFunction {
    fn into_value(self) -> Value {
        Value::PromiseResolvingFunction(self)
    }
}

impl crate::ecmascript::types::IntoObject for PromiseResolvingFunction {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl crate::ecmascript::types::IntoFunction for PromiseResolvingFunction {
    fn into_function(self) -> Function {
        Function::PromiseResolvingFunction(self)
    }
}

impl From<PromiseResolvingFunction> for Function {
    fn from(value: PromiseResolvingFunction) -> Self {
        Function::PromiseResolvingFunction(value)
    }
}

impl InternalSlots for PromiseResolvingFunction {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Function;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }
}

impl InternalMethods for PromiseResolvingFunction {}

impl HeapMark for PromiseResolvingFunction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.promise_resolving_functions.push(*self);
    }
}

impl HeapMark for PromiseResolvingFunctionHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        self.promise_capability.mark_values(queues);
    }
}
