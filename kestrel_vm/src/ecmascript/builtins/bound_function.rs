// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.1 Bound Function Exotic Objects](https://tc39.es/ecma262/#sec-bound-function-exotic-objects)

use crate::ecmascript::abstract_operations::operations_on_objects::construct;
use crate::ecmascript::builtins::ArgumentsList;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{
    Function, InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, String, Value,
};
use crate::heap::indexes::BoundFunctionIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct BoundFunction(pub(crate) BoundFunctionIndex);

#[derive(Debug)]
pub struct BoundFunctionHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[BoundTargetFunction]]
    pub(crate) bound_target_function: Function,
    /// \[\[BoundThis]]
    pub(crate) bound_this: Value,
    /// \[\[BoundArguments]]
    pub(crate) bound_arguments: Box<[Value]>,
    pub(crate) name: Option<String>,
}

impl BoundFunction {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }
}

/// ### [10.4.1.3 BoundFunctionCreate ( targetFunction, boundThis, boundArgs )](https://tc39.es/ecma262/#sec-boundfunctioncreate)
pub(crate) fn bound_function_create(
    agent: &mut Agent,
    target_function: Function,
    bound_this: Value,
    bound_args: &[Value],
) -> JsResult<BoundFunction> {
    // 1. Let proto be ? targetFunction.[[GetPrototypeOf]]().
    let proto = Object::from(target_function).internal_get_prototype_of(agent)?;
    // 2. Let internalSlotsList be the list-concatenation of
    //    « [[Prototype]], [[Extensible]] » and the internal slots listed in
    //    Table 31.
    // 3. Let obj be MakeBasicObject(internalSlotsList).
    agent.heap.bound_functions.push(Some(BoundFunctionHeapData {
        object_index: None,
        // 6. Set obj.[[BoundTargetFunction]] to targetFunction.
        bound_target_function: target_function,
        // 7. Set obj.[[BoundThis]] to boundThis.
        bound_this,
        // 8. Set obj.[[BoundArguments]] to boundArgs.
        bound_arguments: bound_args.to_vec().into_boxed_slice(),
        name: None,
    }));
    let function = BoundFunction(BoundFunctionIndex::last(&agent.heap.bound_functions));
    // 4. Set obj.[[Prototype]] to proto.
    function.internal_set_prototype(agent, proto);
    // 9. Return obj.
    Ok(function)
}

/// ### [10.4.1.1 \[\[Call]] ( thisArgument, argumentsList )](https://tc39.es/ecma262/#sec-bound-function-exotic-objects-call-thisargument-argumentslist)
pub(crate) fn bound_function_call(
    agent: &mut Agent,
    function: BoundFunction,
    arguments_list: ArgumentsList,
) -> JsResult<Value> {
    let data = &agent[function];
    // 1. Let target be F.[[BoundTargetFunction]].
    let target = data.bound_target_function;
    // 2. Let boundThis be F.[[BoundThis]].
    let bound_this = data.bound_this;
    // 3. Let boundArgs be F.[[BoundArguments]].
    // 4. Let args be the list-concatenation of boundArgs and argumentsList.
    let mut args = data.bound_arguments.to_vec();
    args.extend_from_slice(&arguments_list);
    // 5. Return ? Call(target, boundThis, args).
    target.internal_call(agent, bound_this, ArgumentsList(&args))
}

/// ### [10.4.1.2 \[\[Construct]] ( argumentsList, newTarget )](https://tc39.es/ecma262/#sec-bound-function-exotic-objects-construct-argumentslist-newtarget)
pub(crate) fn bound_function_construct(
    agent: &mut Agent,
    function: BoundFunction,
    arguments_list: ArgumentsList,
    new_target: Function,
) -> JsResult<Object> {
    let data = &agent[function];
    // 1. Let target be F.[[BoundTargetFunction]].
    let target = data.bound_target_function;
    // 2. Assert: IsConstructor(target) is true.
    debug_assert!(target.is_constructor(agent));
    // 3. Let boundArgs be F.[[BoundArguments]].
    // 4. Let args be the list-concatenation of boundArgs and argumentsList.
    let mut args = data.bound_arguments.to_vec();
    args.extend_from_slice(&arguments_list);
    // 5. If SameValue(F, newTarget) is true, set newTarget to target.
    let new_target = if new_target == Function::BoundFunction(function) {
        target
    } else {
        new_target
    };
    // 6. Return ? Construct(target, args, newTarget).
    construct(agent, target, Some(&args), Some(new_target))
}

impl core::ops::Index<BoundFunction> for Agent {
    type Output = BoundFunctionHeapData;

    fn index(&self, index: BoundFunction) -> &Self::Output {
        self.heap
            .bound_functions
            .get(index.get_index())
            .expect("BoundFunction out of bounds")
            .as_ref()
            .expect("BoundFunction slot empty")
    }
}

impl core::ops::IndexMut<BoundFunction> for Agent {
    fn index_mut(&mut self, index: BoundFunction) -> &mut Self::Output {
        self.heap
            .bound_functions
            .get_mut(index.get_index())
            .expect("BoundFunction out of bounds")
            .as_mut()
            .expect("BoundFunction slot empty")
    }
}

impl From<BoundFunction> for Object {
    fn from(value: BoundFunction) -> Self {
        Object::BoundFunction(value)
    }
}

impl IntoValue for BoundFunction {
    fn into_value(self) -> Value {
        Value::BoundFunction(self)
    }
}

impl crate::ecmascript::types::IntoObject for BoundFunction {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl crate::ecmascript::types::IntoFunction for BoundFunction {
    fn into_function(self) -> Function {
        Function::BoundFunction(self)
    }
}

impl From<BoundFunction> for Function {
    fn from(value: BoundFunction) -> Self {
        Function::BoundFunction(value)
    }
}

impl InternalSlots for BoundFunction {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Function;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }
}

impl InternalMethods for BoundFunction {}

impl HeapMark for BoundFunction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.bound_functions.push(*self);
    }
}

impl HeapMark for BoundFunctionHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        self.bound_target_function.mark_values(queues);
        self.bound_this.mark_values(queues);
        self.bound_arguments.mark_values(queues);
        self.name.mark_values(queues);
    }
}
