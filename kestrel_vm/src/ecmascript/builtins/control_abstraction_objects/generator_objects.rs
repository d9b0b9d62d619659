// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.5 Generator Objects](https://tc39.es/ecma262/#sec-generator-objects)
//!
//! The generator's *codeEvaluationState* is a [`SuspendedVm`]: a resumable
//! handle over the compiled body. The state machine is
//! `suspendedStart → executing → suspendedYield → completed`.

use crate::ecmascript::abstract_operations::operations_on_iterator_objects::create_iter_result_object;
use crate::ecmascript::builders::OrdinaryObjectBuilder;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::{ExceptionType, JsError};
use crate::ecmascript::execution::{Agent, ExecutionContext, JsResult, RealmIdentifier};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, Value,
};
use crate::engine::{Executable, ExecutionResult, SuspendedVm, Vm};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Generator(pub(crate) BaseIndex<GeneratorHeapData>);

/// The suspended evaluation state: the initial arguments before the first
/// resume, the suspended VM afterwards.
#[derive(Debug)]
pub(crate) enum VmOrArguments {
    Arguments(Box<[Value]>),
    Vm(SuspendedVm),
}

/// \[\[GeneratorState]]
#[derive(Debug)]
pub(crate) enum GeneratorState {
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
    Executing,
    Completed,
}

#[derive(Debug)]
pub struct GeneratorHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    pub(crate) generator_state: Option<GeneratorState>,
}

impl Generator {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    /// ### [27.5.3.3 GeneratorResume ( generator, value, generatorBrand )](https://tc39.es/ecma262/#sec-generatorresume)
    pub(crate) fn resume(self, agent: &mut Agent, value: Value) -> JsResult<Object> {
        // 1. Let state be ? GeneratorValidate(generator, generatorBrand).
        match agent[self].generator_state.as_ref() {
            Some(GeneratorState::SuspendedStart { .. })
            | Some(GeneratorState::SuspendedYield { .. }) => {
                // 3. Assert: state is either SUSPENDED-START or
                //    SUSPENDED-YIELD.
            }
            Some(GeneratorState::Executing) => {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "The generator is already running",
                ));
            }
            // 2. If state is COMPLETED, return
            //    CreateIterResultObject(undefined, true).
            Some(GeneratorState::Completed) | None => {
                return Ok(create_iter_result_object(agent, Value::Undefined, true));
            }
        }

        // 7. Set generator.[[GeneratorState]] to EXECUTING.
        let state = agent[self]
            .generator_state
            .replace(GeneratorState::Executing)
            .expect("state was just observed");
        let (vm_or_args, executable, execution_context) = match state {
            GeneratorState::SuspendedStart {
                vm_or_args,
                executable,
                execution_context,
            } => (vm_or_args, executable, execution_context),
            GeneratorState::SuspendedYield {
                vm,
                executable,
                execution_context,
            } => (VmOrArguments::Vm(vm), executable, execution_context),
            _ => unreachable!(),
        };

        // 4. Let genContext be generator.[[GeneratorContext]].
        // 5. Let methodContext be the running execution context.
        // 6. Suspend methodContext.
        // 8. Push genContext onto the execution context stack.
        agent.execution_context_stack.push(execution_context);

        // 9. Resume the suspended evaluation of genContext using
        //    NormalCompletion(value) as the result of the operation that
        //    suspended it.
        let execution_result = match vm_or_args {
            VmOrArguments::Arguments(args) => Vm::execute(agent, executable, Some(&args)),
            VmOrArguments::Vm(vm) => vm.resume(agent, executable, value),
        };

        // 10. Remove genContext from the execution context stack.
        let execution_context = agent
            .execution_context_stack
            .pop()
            .expect("generator context was pushed");

        // 11. Return ? result.
        self.handle_execution_result(agent, execution_result, executable, execution_context)
    }

    /// ### [27.5.3.4 GeneratorResumeAbrupt ( generator, abruptCompletion, generatorBrand )](https://tc39.es/ecma262/#sec-generatorresumeabrupt)
    pub(crate) fn resume_abrupt(
        self,
        agent: &mut Agent,
        is_return: bool,
        value: Value,
    ) -> JsResult<Object> {
        // 1. Let state be ? GeneratorValidate(generator, generatorBrand).
        match agent[self].generator_state.as_ref() {
            // 2. If state is SUSPENDED-START, then
            Some(GeneratorState::SuspendedStart { .. }) => {
                // a. Set generator.[[GeneratorState]] to COMPLETED.
                agent[self].generator_state = Some(GeneratorState::Completed);
                // 3. If state is COMPLETED, then return or rethrow.
                return if is_return {
                    Ok(create_iter_result_object(agent, value, true))
                } else {
                    Err(JsError::new(value))
                };
            }
            Some(GeneratorState::SuspendedYield { .. }) => {
                // 4. Assert: state is SUSPENDED-YIELD.
            }
            Some(GeneratorState::Executing) => {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "The generator is already running",
                ));
            }
            Some(GeneratorState::Completed) | None => {
                return if is_return {
                    Ok(create_iter_result_object(agent, value, true))
                } else {
                    Err(JsError::new(value))
                };
            }
        }

        // 8. Set generator.[[GeneratorState]] to EXECUTING.
        let Some(GeneratorState::SuspendedYield {
            vm,
            executable,
            execution_context,
        }) = agent[self]
            .generator_state
            .replace(GeneratorState::Executing)
        else {
            unreachable!()
        };

        // 5-9. Push genContext and resume with the abrupt completion.
        agent.execution_context_stack.push(execution_context);
        let execution_result = if is_return {
            vm.resume_return(agent, executable, value)
        } else {
            vm.resume_throw(agent, executable, value)
        };
        let execution_context = agent
            .execution_context_stack
            .pop()
            .expect("generator context was pushed");

        self.handle_execution_result(agent, execution_result, executable, execution_context)
    }

    fn handle_execution_result(
        self,
        agent: &mut Agent,
        execution_result: ExecutionResult,
        executable: Executable,
        execution_context: ExecutionContext,
    ) -> JsResult<Object> {
        match execution_result {
            ExecutionResult::Return(result_value) => {
                // GeneratorStart step 4.g: Set generator.[[GeneratorState]]
                // to COMPLETED. Once a generator enters the completed state
                // it never leaves it.
                agent[self].generator_state = Some(GeneratorState::Completed);
                // 4.l. Return CreateIterResultObject(resultValue, true).
                Ok(create_iter_result_object(agent, result_value, true))
            }
            ExecutionResult::Throw(error) => {
                agent[self].generator_state = Some(GeneratorState::Completed);
                Err(error)
            }
            ExecutionResult::Yield { vm, yielded_value } => {
                // GeneratorYield: 5. Set generator.[[GeneratorState]] to
                // SUSPENDED-YIELD; the VM is the resumable evaluation state.
                agent[self].generator_state = Some(GeneratorState::SuspendedYield {
                    vm,
                    executable,
                    execution_context,
                });
                // 8. Resume callerContext passing
                //    NormalCompletion(CreateIterResultObject(value, false)).
                Ok(create_iter_result_object(agent, yielded_value, false))
            }
            ExecutionResult::Await { .. } => {
                unreachable!("await is invalid inside a sync generator")
            }
        }
    }
}

impl core::ops::Index<Generator> for Agent {
    type Output = GeneratorHeapData;

    fn index(&self, index: Generator) -> &Self::Output {
        self.heap
            .generators
            .get(index.get_index())
            .expect("Generator out of bounds")
            .as_ref()
            .expect("Generator slot empty")
    }
}

impl core::ops::IndexMut<Generator> for Agent {
    fn index_mut(&mut self, index: Generator) -> &mut Self::Output {
        self.heap
            .generators
            .get_mut(index.get_index())
            .expect("Generator out of bounds")
            .as_mut()
            .expect("Generator slot empty")
    }
}

impl From<Generator> for Object {
    fn from(value: Generator) -> Self {
        Object::Generator(value)
    }
}

impl IntoValue for Generator {
    fn into_value(self) -> Value {
        Value::Generator(self)
    }
}

impl crate::ecmascript::types::IntoObject for Generator {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for Generator {
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
                    .generator_prototype()
                    .into(),
            ),
        }
    }
}

impl InternalMethods for Generator {}

impl HeapMark for Generator {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.generators.push(*self);
    }
}

impl HeapMark for GeneratorHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        match &self.generator_state {
            Some(GeneratorState::SuspendedStart {
                vm_or_args,
                executable,
                execution_context,
            }) => {
                if let VmOrArguments::Arguments(args) = vm_or_args {
                    args.mark_values(queues);
                }
                if let VmOrArguments::Vm(vm) = vm_or_args {
                    vm.mark_values(queues);
                }
                queues.executables.push(*executable);
                execution_context.mark_values(queues);
            }
            Some(GeneratorState::SuspendedYield {
                vm,
                executable,
                execution_context,
            }) => {
                vm.mark_values(queues);
                queues.executables.push(*executable);
                execution_context.mark_values(queues);
            }
            _ => {}
        }
    }
}

// ### [27.5.1 Properties of the Generator Prototype Object](https://tc39.es/ecma262/#sec-properties-of-generator-prototype)

struct GeneratorPrototypeNext;
impl Builtin for GeneratorPrototypeNext {
    const NAME: &'static str = "next";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(generator_prototype_next);
}

/// ### [27.5.1.2 Generator.prototype.next ( value )](https://tc39.es/ecma262/#sec-generator.prototype.next)
fn generator_prototype_next(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Return ? GeneratorResume(this value, value, EMPTY).
    let Value::Generator(generator) = this_value else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a Generator",
        ));
    };
    Ok(generator.resume(agent, arguments.get(0))?.into_value())
}

struct GeneratorPrototypeReturn;
impl Builtin for GeneratorPrototypeReturn {
    const NAME: &'static str = "return";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(generator_prototype_return);
}

/// ### [27.5.1.3 Generator.prototype.return ( value )](https://tc39.es/ecma262/#sec-generator.prototype.return)
fn generator_prototype_return(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 2. Let C be Completion Record { [[Type]]: RETURN, [[Value]]: value }.
    // 3. Return ? GeneratorResumeAbrupt(g, C, EMPTY).
    let Value::Generator(generator) = this_value else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a Generator",
        ));
    };
    Ok(generator
        .resume_abrupt(agent, true, arguments.get(0))?
        .into_value())
}

struct GeneratorPrototypeThrow;
impl Builtin for GeneratorPrototypeThrow {
    const NAME: &'static str = "throw";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(generator_prototype_throw);
}

/// ### [27.5.1.4 Generator.prototype.throw ( exception )](https://tc39.es/ecma262/#sec-generator.prototype.throw)
fn generator_prototype_throw(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 2. Let C be ThrowCompletion(exception).
    // 3. Return ? GeneratorResumeAbrupt(g, C, EMPTY).
    let Value::Generator(generator) = this_value else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a Generator",
        ));
    };
    Ok(generator
        .resume_abrupt(agent, false, arguments.get(0))?
        .into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let generator_function_prototype = intrinsics.generator_function_prototype;
    let generator_prototype = intrinsics.generator_prototype();

    // %GeneratorFunction.prototype%.prototype ↔ constructor wiring.
    let prototype_key =
        crate::ecmascript::types::PropertyKey::from_static_str(agent, "prototype");
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, generator_function_prototype)
        .with_property(crate::heap::ObjectEntry {
            key: prototype_key,
            descriptor: crate::ecmascript::types::PropertyDescriptor {
                value: Some(Value::Object(generator_prototype)),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        })
        .with_to_string_tag("GeneratorFunction")
        .build();

    let constructor_key =
        crate::ecmascript::types::PropertyKey::from_static_str(agent, "constructor");
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, generator_prototype)
        .with_property(crate::heap::ObjectEntry {
            key: constructor_key,
            descriptor: crate::ecmascript::types::PropertyDescriptor {
                value: Some(Value::Object(generator_function_prototype)),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        })
        .with_builtin_function_property::<GeneratorPrototypeNext>()
        .with_builtin_function_property::<GeneratorPrototypeReturn>()
        .with_builtin_function_property::<GeneratorPrototypeThrow>()
        .with_to_string_tag("Generator")
        .build();
}
