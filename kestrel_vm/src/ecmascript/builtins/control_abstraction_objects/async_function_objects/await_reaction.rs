// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.7.5.3 Await ( value )](https://tc39.es/ecma262/#await)
//!
//! An await reaction stores the suspended VM of an async function together
//! with the execution context to restore on resume. The promise machinery
//! resumes it with the fulfilment value as a normal completion or the
//! rejection reason as a throw completion.

use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_capability_records::PromiseCapability;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_reaction_records::{
    PromiseReactionHandler, PromiseReactionType,
};
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_prototype::inner_promise_then;
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::execution::{Agent, ExecutionContext};
use crate::ecmascript::types::Value;
use crate::engine::{Executable, ExecutionResult, SuspendedVm};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub(crate) type AwaitReactionIdentifier = BaseIndex<AwaitReaction>;

#[derive(Debug)]
pub struct AwaitReaction {
    pub(crate) vm: Option<SuspendedVm>,
    pub(crate) async_executable: Option<Executable>,
    pub(crate) execution_context: Option<ExecutionContext>,
    pub(crate) return_promise_capability: PromiseCapability,
}

impl AwaitReactionIdentifier {
    pub(crate) fn resume(
        self,
        agent: &mut Agent,
        reaction_type: PromiseReactionType,
        value: Value,
    ) {
        // 3.c. Push asyncContext onto the execution context stack;
        //      asyncContext is now the running execution context.
        let execution_context = agent[self]
            .execution_context
            .take()
            .expect("await reaction was already resumed");
        agent.execution_context_stack.push(execution_context);

        // 3.d. Resume the suspended evaluation of asyncContext using
        //      NormalCompletion(v) as the result of the operation that
        //      suspended it.
        // 5.d. For rejections, resume using ThrowCompletion(reason).
        let vm = agent[self].vm.take().expect("await reaction has no VM");
        let executable = agent[self]
            .async_executable
            .expect("await reaction has no executable");
        let execution_result = match reaction_type {
            PromiseReactionType::Fulfill => vm.resume(agent, executable, value),
            PromiseReactionType::Reject => vm.resume_throw(agent, executable, value),
        };

        match execution_result {
            ExecutionResult::Return(result) => {
                // AsyncBlockStart 2.d. Remove asyncContext from the stack.
                agent.execution_context_stack.pop();
                // 2.e./2.f. Resolve the return promise with the result.
                let capability = agent[self].return_promise_capability;
                capability.resolve(agent, result);
            }
            ExecutionResult::Throw(error) => {
                agent.execution_context_stack.pop();
                // 2.g. Reject the return promise with the thrown value.
                let capability = agent[self].return_promise_capability;
                capability.reject(agent, error.value());
            }
            ExecutionResult::Await { vm, awaited_value } => {
                // Await steps 2-8: suspend again and subscribe to the new
                // awaited promise.
                agent[self].vm = Some(vm);
                agent[self].execution_context =
                    Some(agent.execution_context_stack.pop().expect("context was pushed"));
                let handler = PromiseReactionHandler::Await(self);
                // 2. Let promise be ? PromiseResolve(%Promise%, value).
                let promise = Promise::resolve(agent, awaited_value);
                // 7. Perform PerformPromiseThen(promise, onFulfilled,
                //    onRejected).
                inner_promise_then(agent, promise, handler, handler, None);
            }
            ExecutionResult::Yield { .. } => {
                unreachable!("yield is invalid inside an async function")
            }
        }
    }
}

impl core::ops::Index<AwaitReactionIdentifier> for Agent {
    type Output = AwaitReaction;

    fn index(&self, index: AwaitReactionIdentifier) -> &Self::Output {
        self.heap
            .await_reactions
            .get(index.into_index())
            .expect("AwaitReaction out of bounds")
            .as_ref()
            .expect("AwaitReaction slot empty")
    }
}

impl core::ops::IndexMut<AwaitReactionIdentifier> for Agent {
    fn index_mut(&mut self, index: AwaitReactionIdentifier) -> &mut Self::Output {
        self.heap
            .await_reactions
            .get_mut(index.into_index())
            .expect("AwaitReaction out of bounds")
            .as_mut()
            .expect("AwaitReaction slot empty")
    }
}

impl HeapMark for AwaitReaction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        if let Some(vm) = &self.vm {
            vm.mark_values(queues);
        }
        if let Some(executable) = self.async_executable {
            queues.executables.push(executable);
        }
        self.execution_context.mark_values(queues);
        self.return_promise_capability.mark_values(queues);
    }
}
