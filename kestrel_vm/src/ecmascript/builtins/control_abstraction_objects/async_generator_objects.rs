// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.6 AsyncGenerator Objects](https://tc39.es/ecma262/#sec-asyncgenerator-objects)
//!
//! Each `next`/`return`/`throw` call enqueues an AsyncGeneratorRequest with
//! its own promise capability; the body is driven one request at a time.
//! `await` inside the body suspends the VM and re-enters through the promise
//! job queue without touching the request queue.

use std::collections::VecDeque;

use super::generator_objects::VmOrArguments;
use crate::ecmascript::abstract_operations::operations_on_iterator_objects::create_iter_result_object;
use crate::ecmascript::builders::OrdinaryObjectBuilder;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_capability_records::PromiseCapability;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_reaction_records::{
    PromiseReactionHandler, PromiseReactionType,
};
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_prototype::inner_promise_then;
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, ExecutionContext, JsResult, RealmIdentifier};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, Value,
};
use crate::engine::{Executable, ExecutionResult, SuspendedVm};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct AsyncGenerator(pub(crate) BaseIndex<AsyncGeneratorHeapData>);

/// The completion a request resumes the generator with.
#[derive(Debug, Clone, Copy)]
pub(crate) enum AsyncGeneratorRequestCompletion {
    Normal(Value),
    Return(Value),
    Throw(Value),
}

/// ### [27.6.3.1 AsyncGeneratorRequest Records](https://tc39.es/ecma262/#sec-asyncgeneratorrequest-records)
#[derive(Debug)]
pub(crate) struct AsyncGeneratorRequest {
    pub(crate) completion: AsyncGeneratorRequestCompletion,
    pub(crate) capability: PromiseCapability,
}

/// \[\[AsyncGeneratorState]]
#[derive(Debug)]
pub(crate) enum AsyncGeneratorState {
    SuspendedStart {
        vm_or_args: VmOrArguments,
        executable: Executable,
        execution_context: ExecutionContext,
    },
    SuspendedYield {
        vm: SuspendedVm,
        executable: Executable,
        execution_context: ExecutionContext,
    },
    /// Running, or suspended at an `await` whose continuation is stored.
    Executing {
        executable: Executable,
        await_suspension: Option<(SuspendedVm, ExecutionContext)>,
    },
    Completed,
}

#[derive(Debug)]
pub struct AsyncGeneratorHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    pub(crate) state: Option<AsyncGeneratorState>,
    /// \[\[AsyncGeneratorQueue]]
    pub(crate) queue: VecDeque<AsyncGeneratorRequest>,
}

impl AsyncGenerator {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    /// ### [27.6.3.3 AsyncGeneratorEnqueue ( generator, completion, promiseCapability )](https://tc39.es/ecma262/#sec-asyncgeneratorenqueue)
    /// plus the resume step of AsyncGeneratorValidate callers.
    fn enqueue(
        self,
        agent: &mut Agent,
        completion: AsyncGeneratorRequestCompletion,
    ) -> Promise {
        // 1. Let promiseCapability be ! NewPromiseCapability(%Promise%).
        let capability = PromiseCapability::new(agent);
        // 2. Append the request to generator.[[AsyncGeneratorQueue]].
        agent[self].queue.push_back(AsyncGeneratorRequest {
            completion,
            capability,
        });
        // 3. If the generator is suspended, resume it with the first queued
        //    completion.
        match agent[self].state.as_ref() {
            Some(AsyncGeneratorState::SuspendedStart { .. })
            | Some(AsyncGeneratorState::SuspendedYield { .. }) => {
                self.resume_next(agent);
            }
            Some(AsyncGeneratorState::Completed) | None => {
                self.drain_completed(agent);
            }
            Some(AsyncGeneratorState::Executing { .. }) => {}
        }
        capability.promise()
    }

    /// ### [27.6.3.5 AsyncGeneratorResumeNext-style driving](https://tc39.es/ecma262/#sec-asyncgeneratorresume)
    fn resume_next(self, agent: &mut Agent) {
        let Some(request) = agent[self].queue.front() else {
            return;
        };
        let completion = request.completion;
        let state = agent[self].state.take().expect("validated state");
        match state {
            AsyncGeneratorState::SuspendedStart {
                vm_or_args,
                executable,
                execution_context,
            } => {
                match completion {
                    AsyncGeneratorRequestCompletion::Normal(value) => {
                        agent[self].state = Some(AsyncGeneratorState::Executing {
                            executable,
                            await_suspension: None,
                        });
                        agent.execution_context_stack.push(execution_context);
                        let result = match vm_or_args {
                            VmOrArguments::Arguments(args) => {
                                crate::engine::Vm::execute(agent, executable, Some(&args))
                            }
                            VmOrArguments::Vm(vm) => vm.resume(agent, executable, value),
                        };
                        let execution_context = agent
                            .execution_context_stack
                            .pop()
                            .expect("context was pushed");
                        self.handle_result(agent, result, executable, execution_context);
                    }
                    AsyncGeneratorRequestCompletion::Return(_)
                    | AsyncGeneratorRequestCompletion::Throw(_) => {
                        // A return or throw before the first resume completes
                        // the generator without running the body.
                        agent[self].state = Some(AsyncGeneratorState::Completed);
                        self.drain_completed(agent);
                    }
                }
            }
            AsyncGeneratorState::SuspendedYield {
                vm,
                executable,
                execution_context,
            } => {
                agent[self].state = Some(AsyncGeneratorState::Executing {
                    executable,
                    await_suspension: None,
                });
                agent.execution_context_stack.push(execution_context);
                let result = match completion {
                    AsyncGeneratorRequestCompletion::Normal(value) => {
                        vm.resume(agent, executable, value)
                    }
                    AsyncGeneratorRequestCompletion::Return(value) => {
                        vm.resume_return(agent, executable, value)
                    }
                    AsyncGeneratorRequestCompletion::Throw(value) => {
                        vm.resume_throw(agent, executable, value)
                    }
                };
                let execution_context = agent
                    .execution_context_stack
                    .pop()
                    .expect("context was pushed");
                self.handle_result(agent, result, executable, execution_context);
            }
            other => {
                agent[self].state = Some(other);
            }
        }
    }

    /// Resumption from an `await` inside the body, via the promise queue.
    pub(crate) fn resume_await(
        self,
        agent: &mut Agent,
        reaction_type: PromiseReactionType,
        value: Value,
    ) {
        let Some(AsyncGeneratorState::Executing {
            executable,
            await_suspension,
        }) = agent[self].state.take()
        else {
            unreachable!("await resumed a generator that is not executing");
        };
        let (vm, execution_context) =
            await_suspension.expect("await resumed without a suspension");
        agent[self].state = Some(AsyncGeneratorState::Executing {
            executable,
            await_suspension: None,
        });
        agent.execution_context_stack.push(execution_context);
        let result = match reaction_type {
            PromiseReactionType::Fulfill => vm.resume(agent, executable, value),
            PromiseReactionType::Reject => vm.resume_throw(agent, executable, value),
        };
        let execution_context = agent
            .execution_context_stack
            .pop()
            .expect("context was pushed");
        self.handle_result(agent, result, executable, execution_context);
    }

    fn handle_result(
        self,
        agent: &mut Agent,
        result: ExecutionResult,
        executable: Executable,
        execution_context: ExecutionContext,
    ) {
        match result {
            ExecutionResult::Return(value) => {
                // ### [27.6.3.2 AsyncGeneratorCompleteStep](https://tc39.es/ecma262/#sec-asyncgeneratorcompletestep)
                agent[self].state = Some(AsyncGeneratorState::Completed);
                if let Some(request) = agent[self].queue.pop_front() {
                    let result = create_iter_result_object(agent, value, true);
                    request.capability.resolve(agent, result.into());
                }
                self.drain_completed(agent);
            }
            ExecutionResult::Throw(error) => {
                agent[self].state = Some(AsyncGeneratorState::Completed);
                if let Some(request) = agent[self].queue.pop_front() {
                    request.capability.reject(agent, error.value());
                }
                self.drain_completed(agent);
            }
            ExecutionResult::Yield { vm, yielded_value } => {
                // ### [27.6.3.8 AsyncGeneratorYield](https://tc39.es/ecma262/#sec-asyncgeneratoryield)
                agent[self].state = Some(AsyncGeneratorState::SuspendedYield {
                    vm,
                    executable,
                    execution_context,
                });
                if let Some(request) = agent[self].queue.pop_front() {
                    let result = create_iter_result_object(agent, yielded_value, false);
                    request.capability.resolve(agent, result.into());
                }
                // Keep draining if further requests are already queued.
                if !agent[self].queue.is_empty() {
                    self.resume_next(agent);
                }
            }
            ExecutionResult::Await { vm, awaited_value } => {
                // ### [27.7.5.3 Await ( value )](https://tc39.es/ecma262/#await)
                agent[self].state = Some(AsyncGeneratorState::Executing {
                    executable,
                    await_suspension: Some((vm, execution_context)),
                });
                let handler = PromiseReactionHandler::AsyncGenerator(self);
                let promise = Promise::resolve(agent, awaited_value);
                inner_promise_then(agent, promise, handler, handler, None);
            }
        }
    }

    /// Settles queued requests once the generator has completed.
    fn drain_completed(self, agent: &mut Agent) {
        while let Some(request) = agent[self].queue.pop_front() {
            match request.completion {
                AsyncGeneratorRequestCompletion::Normal(_) => {
                    let result = create_iter_result_object(agent, Value::Undefined, true);
                    request.capability.resolve(agent, result.into());
                }
                AsyncGeneratorRequestCompletion::Return(value) => {
                    let result = create_iter_result_object(agent, value, true);
                    request.capability.resolve(agent, result.into());
                }
                AsyncGeneratorRequestCompletion::Throw(value) => {
                    request.capability.reject(agent, value);
                }
            }
        }
    }
}

impl core::ops::Index<AsyncGenerator> for Agent {
    type Output = AsyncGeneratorHeapData;

    fn index(&self, index: AsyncGenerator) -> &Self::Output {
        self.heap
            .async_generators
            .get(index.get_index())
            .expect("AsyncGenerator out of bounds")
            .as_ref()
            .expect("AsyncGenerator slot empty")
    }
}

impl core::ops::IndexMut<AsyncGenerator> for Agent {
    fn index_mut(&mut self, index: AsyncGenerator) -> &mut Self::Output {
        self.heap
            .async_generators
            .get_mut(index.get_index())
            .expect("AsyncGenerator out of bounds")
            .as_mut()
            .expect("AsyncGenerator slot empty")
    }
}

impl From<AsyncGenerator> for Object {
    fn from(value: AsyncGenerator) -> Self {
        Object::AsyncGenerator(value)
    }
}

impl IntoValue for AsyncGenerator {
    fn into_value(self) -> Value {
        Value::AsyncGenerator(self)
    }
}

impl crate::ecmascript::types::IntoObject for AsyncGenerator {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for AsyncGenerator {
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
            None => Some(
                agent
                    .current_realm()
                    .intrinsics()
                    .async_generator_prototype()
                    .into(),
            ),
        }
    }
}

impl InternalMethods for AsyncGenerator {}

impl HeapMark for AsyncGenerator {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.async_generators.push(*self);
    }
}

impl HeapMark for AsyncGeneratorHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        for request in &self.queue {
            match request.completion {
                AsyncGeneratorRequestCompletion::Normal(value)
                | AsyncGeneratorRequestCompletion::Return(value)
                | AsyncGeneratorRequestCompletion::Throw(value) => value.mark_values(queues),
            }
            request.capability.mark_values(queues);
        }
        match &self.state {
            Some(AsyncGeneratorState::SuspendedStart {
                vm_or_args,
                executable,
                execution_context,
            }) => {
                match vm_or_args {
                    VmOrArguments::Arguments(args) => args.mark_values(queues),
                    VmOrArguments::Vm(vm) => vm.mark_values(queues),
                }
                queues.executables.push(*executable);
                execution_context.mark_values(queues);
            }
            Some(AsyncGeneratorState::SuspendedYield {
                vm,
                executable,
                execution_context,
            }) => {
                vm.mark_values(queues);
                queues.executables.push(*executable);
                execution_context.mark_values(queues);
            }
            Some(AsyncGeneratorState::Executing {
                executable,
                await_suspension,
            }) => {
                queues.executables.push(*executable);
                if let Some((vm, execution_context)) = await_suspension {
                    vm.mark_values(queues);
                    execution_context.mark_values(queues);
                }
            }
            _ => {}
        }
    }
}

// ### [27.6.1 Properties of the AsyncGenerator Prototype Object](https://tc39.es/ecma262/#sec-properties-of-asyncgenerator-prototype)

fn this_async_generator(agent: &mut Agent, this_value: Value) -> JsResult<AsyncGenerator> {
    if let Value::AsyncGenerator(generator) = this_value {
        Ok(generator)
    } else {
        Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not an AsyncGenerator",
        ))
    }
}

struct AsyncGeneratorPrototypeNext;
impl Builtin for AsyncGeneratorPrototypeNext {
    const NAME: &'static str = "next";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_next);
}

/// ### [27.6.1.2 AsyncGenerator.prototype.next ( value )](https://tc39.es/ecma262/#sec-asyncgenerator-prototype-next)
fn prototype_next(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let generator = this_async_generator(agent, this_value)?;
    let promise = generator.enqueue(
        agent,
        AsyncGeneratorRequestCompletion::Normal(arguments.get(0)),
    );
    Ok(promise.into_value())
}

struct AsyncGeneratorPrototypeReturn;
impl Builtin for AsyncGeneratorPrototypeReturn {
    const NAME: &'static str = "return";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_return);
}

/// ### [27.6.1.3 AsyncGenerator.prototype.return ( value )](https://tc39.es/ecma262/#sec-asyncgenerator-prototype-return)
fn prototype_return(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let generator = this_async_generator(agent, this_value)?;
    let promise = generator.enqueue(
        agent,
        AsyncGeneratorRequestCompletion::Return(arguments.get(0)),
    );
    Ok(promise.into_value())
}

struct AsyncGeneratorPrototypeThrow;
impl Builtin for AsyncGeneratorPrototypeThrow {
    const NAME: &'static str = "throw";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_throw);
}

/// ### [27.6.1.4 AsyncGenerator.prototype.throw ( exception )](https://tc39.es/ecma262/#sec-asyncgenerator-prototype-throw)
fn prototype_throw(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let generator = this_async_generator(agent, this_value)?;
    let promise = generator.enqueue(
        agent,
        AsyncGeneratorRequestCompletion::Throw(arguments.get(0)),
    );
    Ok(promise.into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let function_prototype = intrinsics.async_generator_function_prototype;
    let prototype = intrinsics.async_generator_prototype();

    let prototype_key =
        crate::ecmascript::types::PropertyKey::from_static_str(agent, "prototype");
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, function_prototype)
        .with_property(crate::heap::ObjectEntry {
            key: prototype_key,
            descriptor: crate::ecmascript::types::PropertyDescriptor {
                value: Some(Value::Object(prototype)),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        })
        .with_to_string_tag("AsyncGeneratorFunction")
        .build();

    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<AsyncGeneratorPrototypeNext>()
        .with_builtin_function_property::<AsyncGeneratorPrototypeReturn>()
        .with_builtin_function_property::<AsyncGeneratorPrototypeThrow>()
        .with_to_string_tag("AsyncGenerator")
        .build();
}
