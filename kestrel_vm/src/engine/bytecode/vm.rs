// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The virtual machine driving compiled instruction sequences.
//!
//! A [`Vm`] is the *codeEvaluationState* of an execution context: an
//! instruction pointer plus the value, reference, iterator, exception-target
//! and completion stacks. `await` and `yield` suspend it into a
//! [`SuspendedVm`] addressable by `resume(value)`, `resume_throw(error)` and
//! `resume_return(value)`; the drivers (generators, await reactions, async
//! generators) push and pop execution contexts around each step.

use oxc_syntax::operator::BinaryOperator;

use super::executable::Executable;
use super::instructions::{ExceptionTargetKind, Instruction, MethodKind};
use super::iterator::{iterator_rest_values, ObjectPropertiesIterator, VmIterator};
use crate::ecmascript::abstract_operations::operations_on_iterator_objects::get_iterator;
use crate::ecmascript::abstract_operations::operations_on_objects::{
    call, construct, construct_value, copy_data_properties, create_array_from_list,
    create_data_property_or_throw, define_property_or_throw, get_method, has_property,
    ordinary_has_instance, private_element_find, private_method_or_accessor_add,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::{
    is_constructor, is_less_than, is_loosely_equal, is_strictly_equal,
};
use crate::ecmascript::abstract_operations::type_conversion::{
    to_boolean, to_numeric, to_object, to_primitive, to_property_key, to_string, to_uint32_f64,
    PreferredType,
};
use crate::ecmascript::builtins::arguments::{
    create_mapped_arguments_object, create_unmapped_arguments_object,
};
use crate::ecmascript::builtins::array::array_create;
use crate::ecmascript::builtins::ecmascript_function::{
    initialize_instance_elements, make_constructor, make_method, ordinary_function_create,
    set_function_name, ClassFieldDefinition, ClassFieldKey, ConstructorKind, ECMAScriptFunction,
    FunctionKind, OrdinaryFunctionCreateParams,
};
use crate::ecmascript::builtins::ordinary::get_prototype_from_constructor;
use crate::ecmascript::execution::agent::{ExceptionType, JsError};
use crate::ecmascript::execution::environments::{
    get_this_environment, new_declarative_environment, new_private_environment,
    resolve_private_identifier, EnvironmentIndex,
};
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::scripts_and_modules::module::get_import_meta;
use crate::ecmascript::scripts_and_modules::ScriptOrModule;
use crate::ecmascript::types::{
    get_this_value, get_value, initialize_referenced_binding, put_value, BigInt, Function,
    InternalMethods, InternalSlots, IntoValue, Number, Object, OrdinaryObject, PrivateElement,
    PropertyDescriptor, PropertyKey, Reference, String, Value,
};
use crate::ecmascript::types::spec::reference::{
    new_private_reference, new_property_reference, new_super_reference, Base, ReferencedName,
};
use crate::heap::mark::{HeapMark, WorkQueues};

/// The outcome of running a VM until it can run no further.
#[derive(Debug)]
pub(crate) enum ExecutionResult {
    Return(Value),
    Throw(JsError),
    Await {
        vm: SuspendedVm,
        awaited_value: Value,
    },
    Yield {
        vm: SuspendedVm,
        yielded_value: Value,
    },
}

impl ExecutionResult {
    pub(crate) fn into_js_result(self) -> JsResult<Value> {
        match self {
            ExecutionResult::Return(value) => Ok(value),
            ExecutionResult::Throw(error) => Err(error),
            _ => unreachable!("unexpected yield or await"),
        }
    }
}

/// Indicates how an instruction affects the remainder of execution.
#[must_use]
enum ContinuationKind {
    Normal,
    Return,
    Yield,
    Await,
}

/// ### [6.2.4 The Completion Record Specification Type](https://tc39.es/ecma262/#sec-completion-record-specification-type)
///
/// The abrupt completion routed through a finally block. `break` and
/// `continue` targets are resolved to jump indexes at compile time, chained
/// through every intervening finally block.
#[derive(Debug)]
enum CompletionRecord {
    Normal,
    Throw(JsError),
    Return(Value),
    /// A break or continue completion continuing at the target after
    /// passing through the remaining finally blocks.
    Jump { target: usize, remaining: u16 },
}

/// A place to jump when an exception is thrown or an abrupt completion
/// unwinds.
#[derive(Debug)]
struct ExceptionJumpTarget {
    ip: usize,
    kind: ExceptionTargetKind,
    /// The lexical environment containing the target.
    lexical_environment: EnvironmentIndex,
    stack_len: usize,
    reference_stack_len: usize,
    iterator_stack_len: usize,
    completion_stack_len: usize,
}

#[derive(Debug)]
pub(crate) struct Vm {
    ip: usize,
    stack: Vec<Value>,
    reference: Option<Reference>,
    reference_stack: Vec<Reference>,
    iterator_stack: Vec<VmIterator>,
    exception_jump_target_stack: Vec<ExceptionJumpTarget>,
    completion_stack: Vec<CompletionRecord>,
    result: Option<Value>,
    arguments: Box<[Value]>,
}

/// A suspended [`Vm`]: the resumable handle stored in generator and async
/// activation records.
#[derive(Debug)]
pub(crate) struct SuspendedVm {
    vm: Vm,
}

impl SuspendedVm {
    /// Resume with a normal completion.
    pub(crate) fn resume(
        self,
        agent: &mut Agent,
        executable: Executable,
        value: Value,
    ) -> ExecutionResult {
        let mut vm = self.vm;
        vm.result = Some(value);
        vm.inner_execute(agent, executable)
    }

    /// Resume with a throw completion.
    pub(crate) fn resume_throw(
        self,
        agent: &mut Agent,
        executable: Executable,
        error: Value,
    ) -> ExecutionResult {
        let error = JsError::new(error);
        let mut vm = self.vm;
        if !vm.handle_error(agent, error) {
            return ExecutionResult::Throw(error);
        }
        vm.inner_execute(agent, executable)
    }

    /// Resume with a return completion: open finally blocks run before the
    /// activation completes.
    pub(crate) fn resume_return(
        self,
        agent: &mut Agent,
        executable: Executable,
        value: Value,
    ) -> ExecutionResult {
        let mut vm = self.vm;
        if !vm.unwind_to_finally(agent, CompletionRecord::Return(value)) {
            return ExecutionResult::Return(value);
        }
        vm.inner_execute(agent, executable)
    }
}

impl Vm {
    fn new(arguments: Box<[Value]>) -> Self {
        Vm {
            ip: 0,
            stack: Vec::with_capacity(32),
            reference: None,
            reference_stack: Vec::new(),
            iterator_stack: Vec::new(),
            exception_jump_target_stack: Vec::new(),
            completion_stack: Vec::new(),
            result: None,
            arguments,
        }
    }

    fn suspend(self) -> SuspendedVm {
        SuspendedVm { vm: self }
    }

    /// Executes an executable from its start.
    pub(crate) fn execute(
        agent: &mut Agent,
        executable: Executable,
        arguments: Option<&[Value]>,
    ) -> ExecutionResult {
        let vm = Vm::new(arguments.unwrap_or(&[]).to_vec().into_boxed_slice());
        if agent.options.print_internals {
            eprintln!();
            eprintln!("=== Executing Executable ===");
            for (ip, instruction) in agent[executable].instructions.iter().enumerate() {
                eprintln!("  {}: {:?}", ip, instruction);
            }
            eprintln!();
        }
        vm.inner_execute(agent, executable)
    }

    fn inner_execute(mut self, agent: &mut Agent, executable: Executable) -> ExecutionResult {
        while let Some(instruction) = agent[executable].fetch_instruction(self.ip) {
            self.ip += 1;
            if agent.options.print_internals {
                eprintln!("Executing: {:?}", instruction);
            }
            match self.execute_instruction(agent, executable, &instruction) {
                Ok(ContinuationKind::Normal) => {}
                Ok(ContinuationKind::Return) => {
                    let result = self.result.take().unwrap_or(Value::Undefined);
                    return ExecutionResult::Return(result);
                }
                Ok(ContinuationKind::Yield) => {
                    let yielded_value = self.result.take().unwrap_or(Value::Undefined);
                    return ExecutionResult::Yield {
                        vm: self.suspend(),
                        yielded_value,
                    };
                }
                Ok(ContinuationKind::Await) => {
                    let awaited_value = self.result.take().unwrap_or(Value::Undefined);
                    return ExecutionResult::Await {
                        vm: self.suspend(),
                        awaited_value,
                    };
                }
                Err(error) => {
                    if !self.handle_error(agent, error) {
                        return ExecutionResult::Throw(error);
                    }
                }
            }
        }
        ExecutionResult::Return(self.result.take().unwrap_or(Value::Undefined))
    }

    /// Unwinds to the nearest exception target. Catch targets receive the
    /// exception as their result; finally targets record a throw completion
    /// for EndFinally to re-raise.
    #[must_use]
    fn handle_error(&mut self, agent: &mut Agent, error: JsError) -> bool {
        let Some(target) = self.exception_jump_target_stack.pop() else {
            return false;
        };
        self.unwind_to(agent, &target);
        match target.kind {
            ExceptionTargetKind::Catch => {
                self.result = Some(error.value());
            }
            ExceptionTargetKind::Finally => {
                self.completion_stack.push(CompletionRecord::Throw(error));
            }
        }
        self.ip = target.ip;
        true
    }

    /// Unwinds to the nearest finally target, recording the given completion
    /// for its EndFinally. Returns false when no finally remains open.
    #[must_use]
    fn unwind_to_finally(&mut self, agent: &mut Agent, completion: CompletionRecord) -> bool {
        while let Some(target) = self.exception_jump_target_stack.pop() {
            if target.kind == ExceptionTargetKind::Finally {
                self.unwind_to(agent, &target);
                self.completion_stack.push(completion);
                self.ip = target.ip;
                return true;
            }
        }
        false
    }

    fn unwind_to(&mut self, agent: &mut Agent, target: &ExceptionJumpTarget) {
        self.stack.truncate(target.stack_len);
        self.reference_stack.truncate(target.reference_stack_len);
        self.iterator_stack.truncate(target.iterator_stack_len);
        self.completion_stack.truncate(target.completion_stack_len);
        self.reference = None;
        agent
            .running_execution_context_mut()
            .ecmascript_code
            .as_mut()
            .expect("VM execution requires ECMAScript code")
            .lexical_environment = target.lexical_environment;
    }

    fn current_lexical_environment(&self, agent: &Agent) -> EnvironmentIndex {
        agent
            .running_execution_context()
            .ecmascript_code
            .as_ref()
            .expect("VM execution requires ECMAScript code")
            .lexical_environment
    }

    fn set_lexical_environment(&self, agent: &mut Agent, environment: EnvironmentIndex) {
        agent
            .running_execution_context_mut()
            .ecmascript_code
            .as_mut()
            .expect("VM execution requires ECMAScript code")
            .lexical_environment = environment;
    }

    fn take_result(&mut self) -> Value {
        self.result.take().unwrap_or(Value::Undefined)
    }

    fn identifier(&self, agent: &Agent, executable: Executable, index: u16) -> String {
        agent[executable].identifiers[index as usize]
    }

    fn pop_arguments(&mut self, count: usize) -> Vec<Value> {
        let start = self.stack.len() - count;
        self.stack.split_off(start)
    }

    fn execute_instruction(
        &mut self,
        agent: &mut Agent,
        executable: Executable,
        instruction: &Instruction,
    ) -> JsResult<ContinuationKind> {
        match instruction {
            Instruction::LoadConstant(index) => {
                self.result = Some(agent[executable].constants[*index as usize]);
            }
            Instruction::Load => {
                self.result = Some(self.stack.pop().expect("stack underflow"));
            }
            Instruction::LoadCopy => {
                self.result = Some(*self.stack.last().expect("stack underflow"));
            }
            Instruction::Store => {
                let value = self.take_result();
                self.stack.push(value);
            }
            Instruction::StoreCopy => {
                let value = self.result.unwrap_or(Value::Undefined);
                self.stack.push(value);
            }
            Instruction::UpdateEmpty => {
                let value = self.stack.pop().expect("stack underflow");
                if self.result.is_none() {
                    self.result = Some(value);
                }
            }
            Instruction::Empty => {
                self.result = None;
            }
            Instruction::Swap => {
                let len = self.stack.len();
                self.stack.swap(len - 1, len - 2);
            }
            Instruction::ResolveBinding(index) => {
                let name = self.identifier(agent, executable, *index);
                let reference =
                    crate::ecmascript::execution::agent::resolve_binding(agent, name, None)?;
                self.reference = Some(reference);
            }
            Instruction::ResolveThisBinding => {
                // ### [9.4.4 ResolveThisBinding ( )](https://tc39.es/ecma262/#sec-resolvethisbinding)
                let env = get_this_environment(agent);
                self.result = Some(env.get_this_binding(agent)?);
            }
            Instruction::GetNewTarget => {
                // ### [9.4.5 GetNewTarget ( )](https://tc39.es/ecma262/#sec-getnewtarget)
                let env = get_this_environment(agent);
                self.result = Some(match env {
                    EnvironmentIndex::Function(env) => env
                        .get_new_target(agent)
                        .map_or(Value::Undefined, |target| target.into()),
                    _ => Value::Undefined,
                });
            }
            Instruction::GetValue => {
                let reference = self.reference.take().expect("no reference to read");
                self.result = Some(get_value(agent, &reference)?);
            }
            Instruction::GetValueKeepReference => {
                let reference = self.reference.as_ref().expect("no reference to read");
                let reference = *reference;
                self.result = Some(get_value(agent, &reference)?);
                self.reference = Some(reference);
            }
            Instruction::PutValue => {
                let reference = self.reference.take().expect("no reference to write");
                let value = self.take_result();
                put_value(agent, &reference, value)?;
            }
            Instruction::InitializeReferencedBinding => {
                let reference = self.reference.take().expect("no reference to initialize");
                let value = self.take_result();
                initialize_referenced_binding(agent, &reference, value)?;
            }
            Instruction::PushReference => {
                let reference = self.reference.take().expect("no reference to stash");
                self.reference_stack.push(reference);
            }
            Instruction::PopReference => {
                self.reference = Some(
                    self.reference_stack
                        .pop()
                        .expect("reference stack underflow"),
                );
            }
            Instruction::DiscardReference => {
                self.reference_stack
                    .pop()
                    .expect("reference stack underflow");
            }
            Instruction::ClearReference => {
                self.reference = None;
            }
            Instruction::EvaluatePropertyAccessWithIdentifierKey(index) => {
                let name = self.identifier(agent, executable, *index);
                let base = self.take_result();
                let key = PropertyKey::from_js_string(agent, name);
                let strict = agent.is_strict_mode_code();
                self.reference = Some(new_property_reference(base, key, strict));
            }
            Instruction::EvaluatePropertyAccessWithExpressionKey => {
                let key = self.take_result();
                let base = self.stack.pop().expect("stack underflow");
                let key = to_property_key(agent, key)?;
                let strict = agent.is_strict_mode_code();
                self.reference = Some(new_property_reference(base, key, strict));
            }
            Instruction::MakePrivateReference(index) => {
                let description = self.identifier(agent, executable, *index);
                let private_env = agent
                    .running_execution_context()
                    .ecmascript_code
                    .as_ref()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment
                    .expect("private reference outside a class");
                let private_name = resolve_private_identifier(agent, private_env, description);
                let base = self.take_result();
                self.reference = Some(new_private_reference(base, private_name, true));
            }
            Instruction::MakeSuperPropertyReferenceWithIdentifierKey(index) => {
                let name = self.identifier(agent, executable, *index);
                let key = PropertyKey::from_js_string(agent, name);
                self.reference = Some(self.make_super_reference(agent, key)?);
            }
            Instruction::MakeSuperPropertyReferenceWithExpressionKey => {
                let key = self.take_result();
                let key = to_property_key(agent, key)?;
                self.reference = Some(self.make_super_reference(agent, key)?);
            }
            Instruction::CreateMutableBinding(index) => {
                let name = self.identifier(agent, executable, *index);
                let env = self.current_lexical_environment(agent);
                env.create_mutable_binding(agent, name, false)?;
            }
            Instruction::CreateImmutableBinding(index) => {
                let name = self.identifier(agent, executable, *index);
                let env = self.current_lexical_environment(agent);
                env.create_immutable_binding(agent, name, true)?;
            }
            Instruction::EnterDeclarativeEnvironment => {
                let outer = self.current_lexical_environment(agent);
                let env = new_declarative_environment(agent, Some(outer));
                self.set_lexical_environment(agent, EnvironmentIndex::Declarative(env));
            }
            Instruction::ExitDeclarativeEnvironment => {
                let env = self.current_lexical_environment(agent);
                let outer = env
                    .get_outer_env(agent)
                    .expect("declarative environment has an outer environment");
                self.set_lexical_environment(agent, outer);
            }
            Instruction::CreateCatchBinding(index) => {
                let name = self.identifier(agent, executable, *index);
                let outer = self.current_lexical_environment(agent);
                let env = new_declarative_environment(agent, Some(outer));
                let exception = self.take_result();
                let record = agent.heap.environments.get_declarative_environment_mut(env);
                record.create_mutable_binding(name, false);
                record.initialize_binding(name, exception);
                self.set_lexical_environment(agent, EnvironmentIndex::Declarative(env));
            }
            Instruction::ToNumeric => {
                let value = self.take_result();
                self.result = Some(to_numeric(agent, value)?);
            }
            Instruction::ToNumber => {
                let value = self.take_result();
                self.result = Some(value.to_number(agent)?.into_value());
            }
            Instruction::ToString => {
                let value = self.take_result();
                self.result = Some(to_string(agent, value)?.into_value());
            }
            Instruction::Typeof => {
                // typeof of an unresolvable reference is "undefined", not a
                // ReferenceError.
                let value = if let Some(reference) = self.reference.take() {
                    if reference.is_unresolvable_reference() {
                        Value::Undefined
                    } else {
                        get_value(agent, &reference)?
                    }
                } else {
                    self.take_result()
                };
                self.result = Some(value.typeof_string(agent).into_value());
            }
            Instruction::Delete => {
                self.result = Some(self.evaluate_delete(agent)?);
            }
            Instruction::UnaryMinus => {
                let value = self.take_result();
                self.result = Some(match value {
                    Value::Number(number) => number.unary_minus().into_value(),
                    Value::BigInt(bigint) => BigInt::unary_minus(agent, bigint).into_value(),
                    _ => unreachable!("unary minus operates on numeric values"),
                });
            }
            Instruction::BitwiseNot => {
                let value = self.take_result();
                self.result = Some(match value {
                    Value::Number(number) => {
                        let old_value =
                            crate::ecmascript::abstract_operations::type_conversion::to_int32_f64(
                                number.into_f64(),
                            );
                        Value::from_f64(!old_value as f64)
                    }
                    Value::BigInt(bigint) => BigInt::bitwise_not(agent, bigint).into_value(),
                    _ => unreachable!("bitwise not operates on numeric values"),
                });
            }
            Instruction::LogicalNot => {
                let value = self.take_result();
                self.result = Some((!to_boolean(agent, value)).into());
            }
            Instruction::IsStrictlyEqual => {
                let y = self.take_result();
                let x = self.stack.pop().expect("stack underflow");
                self.result = Some(is_strictly_equal(agent, x, y).into());
            }
            Instruction::IsLooselyEqual => {
                let y = self.take_result();
                let x = self.stack.pop().expect("stack underflow");
                self.result = Some(is_loosely_equal(agent, x, y)?.into());
            }
            Instruction::LessThan => {
                // x < y is IsLessThan(x, y, LEFT-FIRST) with undefined as
                // false.
                let y = self.take_result();
                let x = self.stack.pop().expect("stack underflow");
                let result = is_less_than::<true>(agent, x, y)?.unwrap_or(false);
                self.result = Some(result.into());
            }
            Instruction::LessThanEquals => {
                // x <= y is !IsLessThan(y, x, RIGHT-FIRST).
                let y = self.take_result();
                let x = self.stack.pop().expect("stack underflow");
                let result = is_less_than::<false>(agent, y, x)?;
                self.result = Some(matches!(result, Some(false)).into());
            }
            Instruction::GreaterThan => {
                // x > y is IsLessThan(y, x, RIGHT-FIRST).
                let y = self.take_result();
                let x = self.stack.pop().expect("stack underflow");
                let result = is_less_than::<false>(agent, y, x)?.unwrap_or(false);
                self.result = Some(result.into());
            }
            Instruction::GreaterThanEquals => {
                // x >= y is !IsLessThan(x, y, LEFT-FIRST).
                let y = self.take_result();
                let x = self.stack.pop().expect("stack underflow");
                let result = is_less_than::<true>(agent, x, y)?;
                self.result = Some(matches!(result, Some(false)).into());
            }
            Instruction::ApplyStringOrNumericBinaryOperator(operator) => {
                let rval = self.take_result();
                let lval = self.stack.pop().expect("stack underflow");
                self.result = Some(apply_string_or_numeric_binary_operator(
                    agent, lval, *operator, rval,
                )?);
            }
            Instruction::InstanceofOperator => {
                let target = self.take_result();
                let v = self.stack.pop().expect("stack underflow");
                self.result = Some(instanceof_operator(agent, v, target)?.into());
            }
            Instruction::HasProperty => {
                // ### [13.10.1 Runtime semantics of the `in` operator](https://tc39.es/ecma262/#sec-relational-operators-runtime-semantics-evaluation)
                let rval = self.take_result();
                let lval = self.stack.pop().expect("stack underflow");
                let Ok(rval) = Object::try_from(rval) else {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "Cannot use 'in' operator on a non-object",
                    ));
                };
                let key = to_property_key(agent, lval)?;
                self.result = Some(has_property(agent, rval, key)?.into());
            }
            Instruction::HasPrivateElement(index) => {
                let description = self.identifier(agent, executable, *index);
                let private_env = agent
                    .running_execution_context()
                    .ecmascript_code
                    .as_ref()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment
                    .expect("private name outside a class");
                let private_name = resolve_private_identifier(agent, private_env, description);
                let value = self.take_result();
                let Ok(object) = Object::try_from(value) else {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "Cannot use 'in' operator on a non-object",
                    ));
                };
                self.result =
                    Some(private_element_find(agent, object, private_name).is_some().into());
            }
            Instruction::Increment => {
                let value = self.take_result();
                self.result = Some(match value {
                    Value::Number(number) => Value::from_f64(number.into_f64() + 1.0),
                    Value::BigInt(bigint) => {
                        let one = BigInt::from_i64(agent, 1);
                        BigInt::add(agent, bigint, one).into_value()
                    }
                    _ => unreachable!("increment operates on numeric values"),
                });
            }
            Instruction::Decrement => {
                let value = self.take_result();
                self.result = Some(match value {
                    Value::Number(number) => Value::from_f64(number.into_f64() - 1.0),
                    Value::BigInt(bigint) => {
                        let one = BigInt::from_i64(agent, 1);
                        BigInt::subtract(agent, bigint, one).into_value()
                    }
                    _ => unreachable!("decrement operates on numeric values"),
                });
            }
            Instruction::Jump(target) => {
                self.ip = *target;
            }
            Instruction::JumpIfNot(target) => {
                let value = self.take_result();
                if !to_boolean(agent, value) {
                    self.ip = *target;
                }
            }
            Instruction::JumpIfTrue(target) => {
                let value = self.take_result();
                if to_boolean(agent, value) {
                    self.ip = *target;
                }
            }
            Instruction::JumpIfNullish(target) => {
                let value = self.result.unwrap_or(Value::Undefined);
                if value.is_undefined() || value.is_null() {
                    self.result = Some(Value::Undefined);
                    self.ip = *target;
                }
            }
            Instruction::JumpIfNotUndefined(target) => {
                let value = self.result.unwrap_or(Value::Undefined);
                if !value.is_undefined() {
                    self.ip = *target;
                }
            }
            Instruction::Return => {
                // An open finally block intercepts the return completion.
                let value = self.take_result();
                if !self.unwind_to_finally(agent, CompletionRecord::Return(value)) {
                    self.result = Some(value);
                    return Ok(ContinuationKind::Return);
                }
            }
            Instruction::Throw => {
                let value = self.take_result();
                return Err(JsError::new(value));
            }
            Instruction::ThrowError(kind, message) => {
                let message = self.identifier(agent, executable, *message);
                return Err(agent.throw_exception_with_message(*kind, message));
            }
            Instruction::PushExceptionJumpTarget(kind, ip) => {
                self.exception_jump_target_stack.push(ExceptionJumpTarget {
                    ip: *ip,
                    kind: *kind,
                    lexical_environment: self.current_lexical_environment(agent),
                    stack_len: self.stack.len(),
                    reference_stack_len: self.reference_stack.len(),
                    iterator_stack_len: self.iterator_stack.len(),
                    completion_stack_len: self.completion_stack.len(),
                });
            }
            Instruction::PopExceptionJumpTarget => {
                self.exception_jump_target_stack
                    .pop()
                    .expect("exception jump target stack underflow");
            }
            Instruction::PushCompletionNormal => {
                self.completion_stack.push(CompletionRecord::Normal);
            }
            Instruction::PushCompletionReturn => {
                let value = self.take_result();
                self.completion_stack.push(CompletionRecord::Return(value));
            }
            Instruction::PushCompletionJump(target) => {
                self.completion_stack.push(CompletionRecord::Jump {
                    target: *target,
                    remaining: 0,
                });
            }
            Instruction::EndFinally => {
                let completion = self
                    .completion_stack
                    .pop()
                    .expect("completion stack underflow");
                match completion {
                    CompletionRecord::Normal => {}
                    CompletionRecord::Jump { target, remaining } => {
                        if remaining == 0 {
                            self.ip = target;
                        } else {
                            let handled = self.unwind_to_finally(
                                agent,
                                CompletionRecord::Jump {
                                    target,
                                    remaining: remaining - 1,
                                },
                            );
                            debug_assert!(handled, "finally count was computed statically");
                        }
                    }
                    CompletionRecord::Throw(error) => return Err(error),
                    CompletionRecord::Return(value) => {
                        // A return completion continues through any enclosing
                        // finally block before completing the activation.
                        if !self.unwind_to_finally(agent, CompletionRecord::Return(value)) {
                            self.result = Some(value);
                            return Ok(ContinuationKind::Return);
                        }
                    }
                }
            }
            Instruction::ObjectCreate => {
                let object = crate::ecmascript::builtins::ordinary::ordinary_object_create_with_intrinsics(
                    agent,
                    Some(crate::ecmascript::execution::ProtoIntrinsics::Object),
                );
                self.stack.push(object.into_value());
            }
            Instruction::ObjectDefineProperty => {
                let value = self.take_result();
                let key = self.stack.pop().expect("stack underflow");
                let key = to_property_key(agent, key)?;
                let object =
                    Object::try_from(*self.stack.last().expect("stack underflow")).unwrap();
                create_data_property_or_throw(agent, object, key, value)?;
            }
            Instruction::ObjectDefineMethod(index, kind) => {
                self.define_method(agent, executable, *index, *kind, true)?;
            }
            Instruction::ObjectSetPrototype => {
                // `__proto__:` accepts only an Object or null; other values
                // are ignored.
                let value = self.take_result();
                let prototype = match value {
                    Value::Null => Some(None),
                    _ => Object::try_from(value).ok().map(Some),
                };
                if let Some(prototype) = prototype {
                    let object =
                        Object::try_from(*self.stack.last().expect("stack underflow")).unwrap();
                    object.internal_set_prototype(agent, prototype);
                }
            }
            Instruction::ArrayCreate(capacity) => {
                let array = array_create(agent, 0, *capacity as usize, None)?;
                self.stack.push(array.into_value());
            }
            Instruction::ArrayPush => {
                let value = self.take_result();
                let array = crate::ecmascript::builtins::Array::try_from(
                    *self.stack.last().expect("stack underflow"),
                )
                .expect("array literal target");
                let index = agent[array].len;
                array.internal_define_own_property(
                    agent,
                    PropertyKey::Integer(index),
                    PropertyDescriptor::new_data_descriptor(value),
                )?;
            }
            Instruction::ArrayElision => {
                let array = crate::ecmascript::builtins::Array::try_from(
                    *self.stack.last().expect("stack underflow"),
                )
                .expect("array literal target");
                agent[array].len += 1;
            }
            Instruction::CopyDataProperties => {
                let source = self.take_result();
                let target =
                    Object::try_from(*self.stack.last().expect("stack underflow")).unwrap();
                copy_data_properties(agent, target, source, &[])?;
            }
            Instruction::CopyDataPropertiesIntoObject(excluded_count) => {
                let mut excluded = Vec::with_capacity(*excluded_count as usize);
                for _ in 0..*excluded_count {
                    let key = self.stack.pop().expect("stack underflow");
                    excluded.push(to_property_key(agent, key)?);
                }
                let source = self.take_result();
                let target = crate::ecmascript::builtins::ordinary::ordinary_object_create_with_intrinsics(
                    agent,
                    Some(crate::ecmascript::execution::ProtoIntrinsics::Object),
                );
                copy_data_properties(agent, target, source, &excluded)?;
                self.result = Some(target.into_value());
            }
            Instruction::InstantiateOrdinaryFunctionExpression(index) => {
                self.result =
                    Some(self.instantiate_function_expression(agent, executable, *index, None)?);
            }
            Instruction::InstantiateArrowFunctionExpression(index) => {
                let expression = &agent[executable].arrow_function_expressions[*index as usize];
                let source_code = expression.source_code;
                // SAFETY: The AST is kept alive by the executable's source
                // code.
                let expression = unsafe { expression.expression.as_ref() };
                let env = self.current_lexical_environment(agent);
                let private_env = agent
                    .running_execution_context()
                    .ecmascript_code
                    .as_ref()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment;
                let kind = if expression.r#async {
                    FunctionKind::Async
                } else {
                    FunctionKind::Normal
                };
                let function = ordinary_function_create(
                    agent,
                    OrdinaryFunctionCreateParams {
                        function_prototype: None,
                        source_code,
                        source_text: expression.span,
                        parameters_list: &expression.params,
                        body: &expression.body,
                        is_concise_arrow_function: expression.expression,
                        kind,
                        lexical_this: true,
                        env,
                        private_env,
                    },
                );
                self.result = Some(function.into_value());
            }
            Instruction::ClassDefineConstructor {
                function_expression,
                default_constructor_bytecode,
                has_super,
            } => {
                self.class_define_constructor(
                    agent,
                    executable,
                    *function_expression,
                    *default_constructor_bytecode,
                    *has_super,
                )?;
            }
            Instruction::ClassDefineMethod {
                function_expression,
                kind,
                is_static,
            } => {
                let target_index = if *is_static { 1 } else { 2 };
                let target = Object::try_from(
                    self.stack[self.stack.len() - target_index],
                )
                .unwrap();
                self.define_method_on(agent, executable, *function_expression, *kind, target, false)?;
            }
            Instruction::ClassDefinePrivateMethod {
                function_expression,
                kind,
                is_static,
                identifier,
            } => {
                self.class_define_private_method(
                    agent,
                    executable,
                    *function_expression,
                    *kind,
                    *is_static,
                    *identifier,
                )?;
            }
            Instruction::ClassDefineField { initializer } => {
                let key = self.take_result();
                let key = to_property_key(agent, key)?;
                let constructor = self.class_constructor(agent);
                let initializer = initializer
                    .map(|index| agent[executable].class_initializer_bytecodes[index as usize]);
                let data = &mut agent[constructor];
                let mut fields = data.fields.to_vec();
                fields.push(ClassFieldDefinition {
                    key: ClassFieldKey::Property(key),
                    initializer,
                });
                data.fields = fields.into_boxed_slice();
            }
            Instruction::ClassDefinePrivateField {
                identifier,
                initializer,
            } => {
                let description = self.identifier(agent, executable, *identifier);
                let private_env = agent
                    .running_execution_context()
                    .ecmascript_code
                    .as_ref()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment
                    .expect("private field outside a class");
                let private_name = resolve_private_identifier(agent, private_env, description);
                let constructor = self.class_constructor(agent);
                let initializer = initializer
                    .map(|index| agent[executable].class_initializer_bytecodes[index as usize]);
                let data = &mut agent[constructor];
                let mut fields = data.fields.to_vec();
                fields.push(ClassFieldDefinition {
                    key: ClassFieldKey::Private(private_name),
                    initializer,
                });
                data.fields = fields.into_boxed_slice();
            }
            Instruction::ClassDefineStaticField { initializer } => {
                let key = self.take_result();
                let key = to_property_key(agent, key)?;
                let constructor = self.class_constructor(agent);
                let init_value = match initializer {
                    Some(index) => {
                        let executable =
                            agent[executable].class_initializer_bytecodes[*index as usize];
                        Vm::execute(agent, executable, None).into_js_result()?
                    }
                    None => Value::Undefined,
                };
                create_data_property_or_throw(
                    agent,
                    constructor.into(),
                    key,
                    init_value,
                )?;
            }
            Instruction::EnterClassPrivateEnvironment { start, count } => {
                let outer = agent
                    .running_execution_context()
                    .ecmascript_code
                    .as_ref()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment;
                let env = new_private_environment(agent, outer);
                for offset in 0..*count {
                    let description =
                        self.identifier(agent, executable, *start + offset);
                    let private_name =
                        crate::ecmascript::types::PrivateName::new(agent, description);
                    env.add_name(agent, description, private_name);
                }
                agent
                    .running_execution_context_mut()
                    .ecmascript_code
                    .as_mut()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment = Some(env);
            }
            Instruction::ExitClassPrivateEnvironment => {
                let env = agent
                    .running_execution_context_mut()
                    .ecmascript_code
                    .as_mut()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment
                    .expect("exiting a private environment that was never entered");
                let outer = env.outer(agent);
                agent
                    .running_execution_context_mut()
                    .ecmascript_code
                    .as_mut()
                    .expect("VM execution requires ECMAScript code")
                    .private_environment = outer;
            }
            Instruction::CreateUnmappedArgumentsObject => {
                let arguments = self.arguments.clone();
                self.result = Some(create_unmapped_arguments_object(agent, &arguments).into());
            }
            Instruction::CreateMappedArgumentsObject { start, count } => {
                let mut formals = Vec::with_capacity(*count as usize);
                for offset in 0..*count {
                    formals.push(self.identifier(agent, executable, *start + offset));
                }
                let env = self.current_lexical_environment(agent);
                let function = agent
                    .running_execution_context()
                    .function
                    .expect("mapped arguments require a function context");
                let Function::ECMAScriptFunction(function) = function else {
                    unreachable!("mapped arguments require an ECMAScript function");
                };
                let arguments = self.arguments.clone();
                self.result = Some(
                    create_mapped_arguments_object(agent, function, &formals, &arguments, env)
                        .into(),
                );
            }
            Instruction::ArgumentGet(index) => {
                self.result = Some(
                    self.arguments
                        .get(*index as usize)
                        .copied()
                        .unwrap_or(Value::Undefined),
                );
            }
            Instruction::ArgumentRest(index) => {
                let rest: Vec<Value> = self
                    .arguments
                    .get(*index as usize..)
                    .unwrap_or(&[])
                    .to_vec();
                self.result = Some(create_array_from_list(agent, &rest).into_value());
            }
            Instruction::EvaluateCall(argc) => {
                let args = self.pop_arguments(*argc as usize);
                self.evaluate_call(agent, args)?;
            }
            Instruction::EvaluateCallWithArgArray => {
                let args = self.argument_array_values(agent)?;
                self.evaluate_call(agent, args)?;
            }
            Instruction::EvaluateNew(argc) => {
                let args = self.pop_arguments(*argc as usize);
                self.evaluate_new(agent, args)?;
            }
            Instruction::EvaluateNewWithArgArray => {
                let args = self.argument_array_values(agent)?;
                self.evaluate_new(agent, args)?;
            }
            Instruction::EvaluateSuper(argc) => {
                let args = self.pop_arguments(*argc as usize);
                self.evaluate_super(agent, args)?;
            }
            Instruction::EvaluateSuperWithArgArray => {
                let args = self.argument_array_values(agent)?;
                self.evaluate_super(agent, args)?;
            }
            Instruction::GetIteratorSync => {
                let value = self.take_result();
                let iterator_record = get_iterator(agent, value, false)?;
                self.iterator_stack
                    .push(VmIterator::from_iterator_record(iterator_record));
            }
            Instruction::GetIteratorAsync => {
                let value = self.take_result();
                let iterator_record = get_iterator(agent, value, true)?;
                self.iterator_stack
                    .push(VmIterator::from_iterator_record(iterator_record));
            }
            Instruction::IteratorStepValue(target) => {
                let mut iterator = self
                    .iterator_stack
                    .pop()
                    .expect("iterator stack underflow");
                let step = iterator.step_value(agent);
                self.iterator_stack.push(iterator);
                match step? {
                    Some(value) => self.result = Some(value),
                    None => {
                        self.iterator_stack.pop();
                        self.result = None;
                        self.ip = *target;
                    }
                }
            }
            Instruction::IteratorStepValueOrUndefined => {
                let mut iterator = self
                    .iterator_stack
                    .pop()
                    .expect("iterator stack underflow");
                let step = iterator.step_value(agent);
                self.iterator_stack.push(iterator);
                self.result = Some(step?.unwrap_or(Value::Undefined));
            }
            Instruction::IteratorRestIntoArray => {
                let mut iterator = self
                    .iterator_stack
                    .pop()
                    .expect("iterator stack underflow");
                let values = iterator_rest_values(agent, &mut iterator);
                self.iterator_stack.push(iterator);
                let values = values?;
                self.result = Some(create_array_from_list(agent, &values).into_value());
            }
            Instruction::IteratorClose => {
                let iterator = self
                    .iterator_stack
                    .pop()
                    .expect("iterator stack underflow");
                iterator.close(agent)?;
            }
            Instruction::PopIterator => {
                self.iterator_stack
                    .pop()
                    .expect("iterator stack underflow");
            }
            Instruction::EnumerateObjectProperties => {
                let value = self.take_result();
                let object = to_object(agent, value)?;
                let iterator = ObjectPropertiesIterator::new(agent, object)?;
                self.iterator_stack
                    .push(VmIterator::ObjectProperties(iterator));
            }
            Instruction::JumpThroughFinally {
                target,
                finally_count,
            } => {
                debug_assert!(*finally_count >= 1);
                let handled = self.unwind_to_finally(
                    agent,
                    CompletionRecord::Jump {
                        target: *target,
                        remaining: finally_count - 1,
                    },
                );
                debug_assert!(handled, "finally count was computed statically");
            }
            Instruction::Await => return Ok(ContinuationKind::Await),
            Instruction::Yield => return Ok(ContinuationKind::Yield),
            Instruction::ImportMeta => {
                let Some(ScriptOrModule::Module(module)) =
                    crate::ecmascript::execution::agent::get_active_script_or_module(agent)
                else {
                    unreachable!("import.meta outside a module");
                };
                let import_meta = get_import_meta(agent, module);
                self.result = Some(Value::Object(import_meta));
            }
            Instruction::StringConcat(count) => {
                let mut parts = Vec::with_capacity(*count as usize + 1);
                let start = self.stack.len() - *count as usize;
                for value in self.stack.split_off(start) {
                    let Value::String(string) = value else {
                        unreachable!("string concatenation operates on strings");
                    };
                    parts.push(string);
                }
                let last = self.take_result();
                let Value::String(last) = last else {
                    unreachable!("string concatenation operates on strings");
                };
                parts.push(last);
                self.result = Some(String::concat(agent, &parts).into_value());
            }
        }
        Ok(ContinuationKind::Normal)
    }

    /// ### [13.5.1 The `delete` operator](https://tc39.es/ecma262/#sec-delete-operator-runtime-semantics-evaluation)
    fn evaluate_delete(&mut self, agent: &mut Agent) -> JsResult<Value> {
        let Some(reference) = self.reference.take() else {
            // 2.b. If ref is not a Reference Record, return true.
            return Ok(true.into());
        };
        // 3. If IsUnresolvableReference(ref) is true, return true.
        if reference.is_unresolvable_reference() {
            return Ok(true.into());
        }
        match reference.base {
            // 4. If IsPropertyReference(ref) is true, then
            Base::Value(base) => {
                if reference.is_super_reference() {
                    // a. Assert: IsSuperReference(ref) is false.
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::ReferenceError,
                        "Cannot delete a super property",
                    ));
                }
                if matches!(reference.referenced_name, ReferencedName::PrivateName(_)) {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "Cannot delete a private member",
                    ));
                }
                // c. Let baseObj be ? ToObject(ref.[[Base]]).
                let base_obj = to_object(agent, base)?;
                // d. Let deleteStatus be
                //    ? baseObj.[[Delete]](ref.[[ReferencedName]]).
                let delete_status =
                    base_obj.internal_delete(agent, reference.property_key())?;
                // e. If deleteStatus is false and ref.[[Strict]] is true,
                //    throw a TypeError exception.
                if !delete_status && reference.strict {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "Cannot delete property",
                    ));
                }
                // f. Return deleteStatus.
                Ok(delete_status.into())
            }
            // 5. Else: base is an Environment Record.
            Base::Environment(env) => {
                // b. Return ? base.DeleteBinding(ref.[[ReferencedName]]).
                Ok(env.delete_binding(agent, reference.identifier())?.into())
            }
            Base::Unresolvable => unreachable!(),
        }
    }

    /// ### [13.3.7.3 MakeSuperPropertyReference ( actualThis, propertyKey, strict )](https://tc39.es/ecma262/#sec-makesuperpropertyreference)
    fn make_super_reference(
        &mut self,
        agent: &mut Agent,
        key: PropertyKey,
    ) -> JsResult<Reference> {
        // 1. Let env be GetThisEnvironment().
        let env = get_this_environment(agent);
        let EnvironmentIndex::Function(env) = env else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::SyntaxError,
                "'super' outside of a method",
            ));
        };
        // 3. Let actualThis be ? env.GetThisBinding().
        let actual_this = env.get_this_binding(agent)?;
        // 4. Let baseValue be ? env.GetSuperBase().
        let Some(base) = env.get_super_base(agent)? else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "'super' base is not an object",
            ));
        };
        let strict = agent.is_strict_mode_code();
        Ok(new_super_reference(base, key, actual_this, strict))
    }

    /// EvaluateCall: `this` is derived from the reference the callee was
    /// read through.
    fn evaluate_call(&mut self, agent: &mut Agent, args: Vec<Value>) -> JsResult<()> {
        let func = self.stack.pop().expect("stack underflow");
        // ### [13.3.6.2 EvaluateCall ( func, ref, arguments, tailPosition )](https://tc39.es/ecma262/#sec-evaluatecall)
        let this_value = match self.reference.take() {
            Some(reference) => match reference.base {
                // 1.a. If IsPropertyReference(ref) is true, let thisValue be
                //      GetThisValue(ref).
                Base::Value(_) => get_this_value(&reference),
                // 1.b. Else: let thisValue be
                //      refEnv.WithBaseObject().
                Base::Environment(env) => env
                    .with_base_object(agent)
                    .map_or(Value::Undefined, |object| object.into()),
                Base::Unresolvable => Value::Undefined,
            },
            // 2. Else: thisValue is undefined.
            None => Value::Undefined,
        };
        self.result = Some(call(agent, func, this_value, Some(&args))?);
        Ok(())
    }

    /// ### [13.3.5.1 EvaluateNew](https://tc39.es/ecma262/#sec-evaluatenew)
    fn evaluate_new(&mut self, agent: &mut Agent, args: Vec<Value>) -> JsResult<()> {
        let constructor = self.stack.pop().expect("stack underflow");
        let result = construct_value(agent, constructor, Some(&args), None)?;
        self.result = Some(result.into());
        Ok(())
    }

    /// ### [13.3.7.1 Runtime semantics of SuperCall](https://tc39.es/ecma262/#sec-super-keyword-runtime-semantics-evaluation)
    fn evaluate_super(&mut self, agent: &mut Agent, args: Vec<Value>) -> JsResult<()> {
        // 1. Let newTarget be GetNewTarget().
        let env = get_this_environment(agent);
        let EnvironmentIndex::Function(env) = env else {
            unreachable!("super call outside a constructor");
        };
        let new_target = env.get_new_target(agent);
        // 3. Let func be GetSuperConstructor().
        let active_function = env.get_function_object(agent);
        let func = Object::from(active_function)
            .internal_get_prototype_of(agent)?;
        // 5. If IsConstructor(func) is false, throw a TypeError exception.
        let Some(func) = func else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Super constructor is not a constructor",
            ));
        };
        let Some(func) = is_constructor(agent, func.into()) else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Super constructor is not a constructor",
            ));
        };
        // 6. Let result be ? Construct(func, argList, newTarget).
        let new_target = new_target
            .and_then(|target| Function::try_from(target).ok());
        let result = construct(agent, func, Some(&args), new_target)?;
        // 8. Perform ? thisER.BindThisValue(result).
        env.bind_this_value(agent, result.into())?;
        // 10. Perform ? InitializeInstanceElements(result, F).
        initialize_instance_elements(agent, result, active_function)?;
        // 11. Return result.
        self.result = Some(result.into());
        Ok(())
    }

    fn argument_array_values(&mut self, agent: &mut Agent) -> JsResult<Vec<Value>> {
        let value = self.take_result();
        let Ok(array) = crate::ecmascript::builtins::Array::try_from(value) else {
            unreachable!("spread arguments are collected into an array");
        };
        let len = agent[array].len;
        let mut args = Vec::with_capacity(len as usize);
        for index in 0..len {
            args.push(agent[array].element(index).unwrap_or(Value::Undefined));
        }
        Ok(args)
    }

    fn instantiate_function_expression(
        &mut self,
        agent: &mut Agent,
        executable: Executable,
        index: u16,
        home_object: Option<Object>,
    ) -> JsResult<Value> {
        let expression = &agent[executable].function_expressions[index as usize];
        let source_code = expression.source_code;
        // SAFETY: The AST is kept alive by the executable's source code.
        let expression = unsafe { expression.expression.as_ref() };
        let env = self.current_lexical_environment(agent);
        let private_env = agent
            .running_execution_context()
            .ecmascript_code
            .as_ref()
            .expect("VM execution requires ECMAScript code")
            .private_environment;
        let kind = crate::ecmascript::syntax_directed_operations::function_definitions::function_kind_of(expression);
        let body = expression
            .body
            .as_ref()
            .expect("function expression has a body");
        let function = ordinary_function_create(
            agent,
            OrdinaryFunctionCreateParams {
                function_prototype:
                    crate::ecmascript::syntax_directed_operations::function_definitions::function_prototype_for_kind(
                        agent, kind,
                    ),
                source_code,
                source_text: expression.span,
                parameters_list: &expression.params,
                body,
                is_concise_arrow_function: false,
                kind,
                lexical_this: false,
                env,
                private_env,
            },
        );
        if let Some(identifier) = &expression.id {
            let name = PropertyKey::from_str(agent, identifier.name.as_str());
            set_function_name(agent, function, name, None);
        }
        if let Some(home_object) = home_object {
            make_method(agent, function, home_object);
        }
        if kind == FunctionKind::Normal && home_object.is_none() {
            make_constructor(agent, function, None, None);
        }
        Ok(function.into_value())
    }

    fn define_method(
        &mut self,
        agent: &mut Agent,
        executable: Executable,
        index: u16,
        kind: MethodKind,
        enumerable: bool,
    ) -> JsResult<()> {
        let target = Object::try_from(*self.stack.last().expect("stack underflow")).unwrap();
        self.define_method_on(agent, executable, index, kind, target, enumerable)
    }

    /// ### [15.4.4 DefineMethod and MethodDefinitionEvaluation](https://tc39.es/ecma262/#sec-runtime-semantics-methoddefinitionevaluation)
    fn define_method_on(
        &mut self,
        agent: &mut Agent,
        executable: Executable,
        index: u16,
        kind: MethodKind,
        target: Object,
        enumerable: bool,
    ) -> JsResult<()> {
        let key = self.take_result();
        let key = to_property_key(agent, key)?;
        let value = self.instantiate_method(agent, executable, index, target)?;
        let function = Function::try_from(value).expect("method is a function");
        let (name_prefix, descriptor) = match kind {
            MethodKind::Method => (
                None,
                PropertyDescriptor {
                    value: Some(value),
                    writable: Some(true),
                    enumerable: Some(enumerable),
                    configurable: Some(true),
                    ..Default::default()
                },
            ),
            MethodKind::Get => (
                Some("get"),
                PropertyDescriptor {
                    get: Some(Some(function)),
                    enumerable: Some(enumerable),
                    configurable: Some(true),
                    ..Default::default()
                },
            ),
            MethodKind::Set => (
                Some("set"),
                PropertyDescriptor {
                    set: Some(Some(function)),
                    enumerable: Some(enumerable),
                    configurable: Some(true),
                    ..Default::default()
                },
            ),
        };
        if let Function::ECMAScriptFunction(function) = function {
            set_function_name(agent, function, key, name_prefix);
        }
        define_property_or_throw(agent, target, key, descriptor)?;
        Ok(())
    }

    fn instantiate_method(
        &mut self,
        agent: &mut Agent,
        executable: Executable,
        index: u16,
        home_object: Object,
    ) -> JsResult<Value> {
        self.instantiate_function_expression(agent, executable, index, Some(home_object))
    }

    fn class_constructor(&self, agent: &Agent) -> ECMAScriptFunction {
        let Value::ECMAScriptFunction(constructor) =
            *self.stack.last().expect("stack underflow")
        else {
            unreachable!("class constructor is on the stack top");
        };
        let _ = agent;
        constructor
    }

    /// ### [15.7.14 ClassDefinitionEvaluation](https://tc39.es/ecma262/#sec-runtime-semantics-classdefinitionevaluation),
    /// constructor creation steps.
    fn class_define_constructor(
        &mut self,
        agent: &mut Agent,
        executable: Executable,
        function_expression: Option<u16>,
        default_constructor_bytecode: Option<u16>,
        has_super: bool,
    ) -> JsResult<()> {
        // 5-8. Determine protoParent and constructorParent.
        let (proto_parent, constructor_parent) = if has_super {
            let superclass = self.stack.pop().expect("stack underflow");
            if superclass.is_null() {
                (
                    None,
                    Object::try_from(
                        agent
                            .current_realm()
                            .intrinsics()
                            .get_intrinsic_default_proto(
                                crate::ecmascript::execution::ProtoIntrinsics::Function,
                            ),
                    )
                    .unwrap(),
                )
            } else {
                let Some(superclass_function) = is_constructor(agent, superclass) else {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::TypeError,
                        "Class extends value is not a constructor",
                    ));
                };
                // e.i. Let protoParent be ? Get(superclass, "prototype").
                let prototype_key = PropertyKey::from_static_str(agent, "prototype");
                let proto_parent = crate::ecmascript::abstract_operations::operations_on_objects::get(
                    agent,
                    Object::try_from(superclass).unwrap(),
                    prototype_key,
                )?;
                let proto_parent = match proto_parent {
                    Value::Null => None,
                    _ => match Object::try_from(proto_parent) {
                        Ok(object) => Some(object),
                        Err(_) => {
                            return Err(agent.throw_exception_with_static_message(
                                ExceptionType::TypeError,
                                "Class extends prototype is neither object nor null",
                            ))
                        }
                    },
                };
                (proto_parent, Object::from(superclass_function))
            }
        } else {
            (
                Some(
                    agent
                        .current_realm()
                        .intrinsics()
                        .get_intrinsic_default_proto(
                            crate::ecmascript::execution::ProtoIntrinsics::Object,
                        ),
                ),
                Object::try_from(
                    agent
                        .current_realm()
                        .intrinsics()
                        .get_intrinsic_default_proto(
                            crate::ecmascript::execution::ProtoIntrinsics::Function,
                        ),
                )
                .unwrap(),
            )
        };
        // 9. Let proto be OrdinaryObjectCreate(protoParent).
        let proto = OrdinaryObject::create_object(agent, proto_parent, &[]);
        let env = self.current_lexical_environment(agent);
        let private_env = agent
            .running_execution_context()
            .ecmascript_code
            .as_ref()
            .expect("VM execution requires ECMAScript code")
            .private_environment;
        // 12-14. Create the constructor function.
        let constructor = match function_expression {
            Some(index) => {
                let expression = &agent[executable].function_expressions[index as usize];
                let source_code = expression.source_code;
                // SAFETY: The AST is kept alive by the executable's source
                // code.
                let expression = unsafe { expression.expression.as_ref() };
                let body = expression
                    .body
                    .as_ref()
                    .expect("class constructor has a body");
                ordinary_function_create(
                    agent,
                    OrdinaryFunctionCreateParams {
                        function_prototype: Some(constructor_parent),
                        source_code,
                        source_text: expression.span,
                        parameters_list: &expression.params,
                        body,
                        is_concise_arrow_function: false,
                        kind: FunctionKind::Normal,
                        lexical_this: false,
                        env,
                        private_env,
                    },
                )
            }
            None => {
                // 14. Else: a default constructor whose compiled body calls
                //     super for derived classes and returns otherwise.
                let bytecode = default_constructor_bytecode
                    .map(|index| agent[executable].class_initializer_bytecodes[index as usize])
                    .expect("default constructors carry compiled bytecode");
                crate::ecmascript::builtins::ecmascript_function::create_default_constructor(
                    agent,
                    bytecode,
                    Some(constructor_parent),
                    env,
                    private_env,
                )
            }
        };
        // 15-17. Wire the constructor.
        make_constructor(agent, constructor, Some(false), Some(proto.into()));
        {
            // ClassDefinitionEvaluation: class bodies are strict mode code
            // and constructors carry the class's [[ConstructorKind]].
            let data = &mut agent[constructor];
            data.is_class_constructor = true;
            data.strict = true;
            data.this_mode = crate::ecmascript::builtins::ecmascript_function::ThisMode::Strict;
            data.constructor_kind = if has_super {
                ConstructorKind::Derived
            } else {
                ConstructorKind::Base
            };
            data.home_object = Some(proto.into());
        }
        // prototype.constructor is wired by MakeConstructor's caller here
        // because the prototype pre-exists.
        let constructor_key = PropertyKey::from_static_str(agent, "constructor");
        agent[proto].define_property(
            constructor_key,
            PropertyDescriptor {
                value: Some(constructor.into_value()),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            }
            .into_fully_populated(),
        );
        self.stack.push(Value::Object(proto));
        self.stack.push(constructor.into_value());
        Ok(())
    }

    fn class_define_private_method(
        &mut self,
        agent: &mut Agent,
        executable: Executable,
        function_expression: u16,
        kind: MethodKind,
        is_static: bool,
        identifier: u16,
    ) -> JsResult<()> {
        let description = self.identifier(agent, executable, identifier);
        let private_env = agent
            .running_execution_context()
            .ecmascript_code
            .as_ref()
            .expect("VM execution requires ECMAScript code")
            .private_environment
            .expect("private method outside a class");
        let private_name = resolve_private_identifier(agent, private_env, description);
        let target_index = if is_static { 1 } else { 2 };
        let target = Object::try_from(self.stack[self.stack.len() - target_index]).unwrap();
        let value = self.instantiate_method(agent, executable, function_expression, target)?;
        let function = Function::try_from(value).expect("method is a function");
        let element = match kind {
            MethodKind::Method => PrivateElement::Method {
                key: private_name,
                value: function,
            },
            MethodKind::Get => PrivateElement::Accessor {
                key: private_name,
                get: Some(function),
                set: None,
            },
            MethodKind::Set => PrivateElement::Accessor {
                key: private_name,
                get: None,
                set: Some(function),
            },
        };
        if is_static {
            let constructor = self.class_constructor(agent);
            merge_private_element(agent, Object::from(constructor), element)?;
        } else {
            let constructor = self.class_constructor(agent);
            let data = &mut agent[constructor];
            let mut methods = data.private_methods.to_vec();
            merge_private_element_into(&mut methods, element);
            data.private_methods = methods.into_boxed_slice();
        }
        Ok(())
    }
}

/// Accessor halves of the same private name merge into a single element.
fn merge_private_element_into(elements: &mut Vec<PrivateElement>, element: PrivateElement) {
    if let PrivateElement::Accessor { key, get, set } = element {
        if let Some(PrivateElement::Accessor {
            get: existing_get,
            set: existing_set,
            ..
        }) = elements
            .iter_mut()
            .find(|existing| existing.key() == key)
        {
            if let Some(get) = get {
                *existing_get = Some(get);
            }
            if let Some(set) = set {
                *existing_set = Some(set);
            }
            return;
        }
    }
    elements.push(element);
}

fn merge_private_element(
    agent: &mut Agent,
    object: Object,
    element: PrivateElement,
) -> JsResult<()> {
    if let PrivateElement::Accessor { key, get, set } = element {
        if let Some(PrivateElement::Accessor {
            get: existing_get,
            set: existing_set,
            ..
        }) = private_element_find(agent, object, key)
        {
            let merged = PrivateElement::Accessor {
                key,
                get: get.or(existing_get),
                set: set.or(existing_set),
            };
            let backing = object.get_or_create_backing_object(agent);
            let slot = agent[backing]
                .private_elements
                .iter_mut()
                .find(|existing| existing.key() == key)
                .expect("element was found above");
            *slot = merged;
            return Ok(());
        }
    }
    private_method_or_accessor_add(agent, object, element)
}

/// ### [13.15.3 ApplyStringOrNumericBinaryOperator ( lval, opText, rval )](https://tc39.es/ecma262/#sec-applystringornumericbinaryoperator)
fn apply_string_or_numeric_binary_operator(
    agent: &mut Agent,
    lval: Value,
    operator: BinaryOperator,
    rval: Value,
) -> JsResult<Value> {
    // 1. If opText is +, then
    let (lnum, rnum) = if operator == BinaryOperator::Addition {
        // a. Let lprim be ? ToPrimitive(lval).
        let lprim = to_primitive(agent, lval, None)?;
        // b. Let rprim be ? ToPrimitive(rval).
        let rprim = to_primitive(agent, rval, None)?;
        // c. If lprim is a String or rprim is a String, then
        if lprim.is_string() || rprim.is_string() {
            // i./ii. Let lstr/rstr be ? ToString(lprim/rprim).
            let lstr = to_string(agent, lprim)?;
            let rstr = to_string(agent, rprim)?;
            // iii. Return the string-concatenation of lstr and rstr.
            return Ok(String::concat(agent, &[lstr, rstr]).into_value());
        }
        // d./e. Set lval/rval to lprim/rprim and continue numerically.
        (to_numeric(agent, lprim)?, to_numeric(agent, rprim)?)
    } else {
        // 2./3. Let lnum/rnum be ? ToNumeric(lval/rval).
        (to_numeric(agent, lval)?, to_numeric(agent, rval)?)
    };
    match (lnum, rnum) {
        (Value::Number(lnum), Value::Number(rnum)) => Ok(apply_number_operator(
            agent,
            lnum.into_f64(),
            operator,
            rnum.into_f64(),
        )),
        (Value::BigInt(lnum), Value::BigInt(rnum)) => {
            apply_bigint_operator(agent, lnum, operator, rnum)
        }
        // 6. If Type(lnum) is not Type(rnum), throw a TypeError exception.
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Cannot mix BigInt and other types, use explicit conversions",
        )),
    }
}

fn apply_number_operator(
    _agent: &mut Agent,
    lnum: f64,
    operator: BinaryOperator,
    rnum: f64,
) -> Value {
    use crate::ecmascript::abstract_operations::type_conversion::to_int32_f64;
    let result = match operator {
        BinaryOperator::Addition => lnum + rnum,
        BinaryOperator::Subtraction => lnum - rnum,
        BinaryOperator::Multiplication => lnum * rnum,
        BinaryOperator::Division => lnum / rnum,
        BinaryOperator::Remainder => {
            // Number::remainder: the sign follows the dividend.
            let result = lnum % rnum;
            result
        }
        BinaryOperator::Exponential => {
            return Number::from(lnum).exponentiate(Number::from(rnum)).into_value()
        }
        // Bitwise operators coerce to Int32/Uint32; shift counts are masked
        // with 0x1F before application.
        BinaryOperator::ShiftLeft => {
            let lnum = to_int32_f64(lnum);
            let shift_count = to_uint32_f64(rnum) % 32;
            return Value::from_f64((lnum << shift_count) as f64);
        }
        BinaryOperator::ShiftRight => {
            let lnum = to_int32_f64(lnum);
            let shift_count = to_uint32_f64(rnum) % 32;
            return Value::from_f64((lnum >> shift_count) as f64);
        }
        BinaryOperator::ShiftRightZeroFill => {
            // The result of >>> is unsigned 32-bit.
            let lnum = to_uint32_f64(lnum);
            let shift_count = to_uint32_f64(rnum) % 32;
            return Value::from_f64((lnum >> shift_count) as f64);
        }
        BinaryOperator::BitwiseAnd => {
            return Value::from_f64((to_int32_f64(lnum) & to_int32_f64(rnum)) as f64)
        }
        BinaryOperator::BitwiseXOR => {
            return Value::from_f64((to_int32_f64(lnum) ^ to_int32_f64(rnum)) as f64)
        }
        BinaryOperator::BitwiseOR => {
            return Value::from_f64((to_int32_f64(lnum) | to_int32_f64(rnum)) as f64)
        }
        _ => unreachable!("non-arithmetic operator reached the arithmetic path"),
    };
    Value::from_f64(result)
}

fn apply_bigint_operator(
    agent: &mut Agent,
    lnum: BigInt,
    operator: BinaryOperator,
    rnum: BigInt,
) -> JsResult<Value> {
    Ok(match operator {
        BinaryOperator::Addition => BigInt::add(agent, lnum, rnum).into_value(),
        BinaryOperator::Subtraction => BigInt::subtract(agent, lnum, rnum).into_value(),
        BinaryOperator::Multiplication => BigInt::multiply(agent, lnum, rnum).into_value(),
        BinaryOperator::Division => BigInt::divide(agent, lnum, rnum)?.into_value(),
        BinaryOperator::Remainder => BigInt::remainder(agent, lnum, rnum)?.into_value(),
        BinaryOperator::Exponential => BigInt::exponentiate(agent, lnum, rnum)?.into_value(),
        BinaryOperator::ShiftLeft => BigInt::left_shift(agent, lnum, rnum)?.into_value(),
        BinaryOperator::ShiftRight => BigInt::signed_right_shift(agent, lnum, rnum)?.into_value(),
        BinaryOperator::ShiftRightZeroFill => {
            BigInt::unsigned_right_shift(agent, lnum, rnum)?.into_value()
        }
        BinaryOperator::BitwiseAnd => BigInt::bitwise_and(agent, lnum, rnum).into_value(),
        BinaryOperator::BitwiseXOR => BigInt::bitwise_xor(agent, lnum, rnum).into_value(),
        BinaryOperator::BitwiseOR => BigInt::bitwise_or(agent, lnum, rnum).into_value(),
        _ => unreachable!("non-arithmetic operator reached the arithmetic path"),
    })
}

/// ### [13.10.2 InstanceofOperator ( V, target )](https://tc39.es/ecma262/#sec-instanceofoperator)
fn instanceof_operator(agent: &mut Agent, v: Value, target: Value) -> JsResult<bool> {
    // 1. If target is not an Object, throw a TypeError exception.
    if !target.is_object() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Right-hand side of 'instanceof' is not an object",
        ));
    }
    // 2. Let instOfHandler be ? GetMethod(target, @@hasInstance).
    let inst_of_handler = get_method(
        agent,
        target,
        PropertyKey::Symbol(crate::heap::WellKnownSymbolIndexes::HasInstance.into()),
    )?;
    // 3. If instOfHandler is not undefined, then
    if let Some(inst_of_handler) = inst_of_handler {
        // a. Return ToBoolean(? Call(instOfHandler, target, « V »)).
        let result = crate::ecmascript::abstract_operations::operations_on_objects::call_function(
            agent,
            inst_of_handler,
            target,
            Some(&[v]),
        )?;
        return Ok(to_boolean(agent, result));
    }
    // 4./5. Return ? OrdinaryHasInstance(target, V).
    ordinary_has_instance(agent, target, v)
}

impl HeapMark for Vm {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.stack.mark_values(queues);
        for target in &self.exception_jump_target_stack {
            target.lexical_environment.mark_values(queues);
        }
        self.reference.mark_values(queues);
        self.reference_stack.mark_values(queues);
        for iterator in &self.iterator_stack {
            iterator.mark_values(queues);
        }
        for completion in &self.completion_stack {
            match completion {
                CompletionRecord::Return(value) => value.mark_values(queues),
                CompletionRecord::Throw(error) => error.value().mark_values(queues),
                CompletionRecord::Normal | CompletionRecord::Jump { .. } => {}
            }
        }
        self.result.mark_values(queues);
        self.arguments.mark_values(queues);
    }
}

impl HeapMark for SuspendedVm {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.vm.mark_values(queues);
    }
}
