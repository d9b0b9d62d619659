// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.2 ECMAScript Function Objects](https://tc39.es/ecma262/#sec-ecmascript-function-objects)

use core::ptr::NonNull;

use oxc_ast::ast;
use oxc_span::Span;

use crate::ecmascript::builtins::control_abstraction_objects::async_function_objects::await_reaction::{
    AwaitReaction, AwaitReactionIdentifier,
};
use crate::ecmascript::builtins::control_abstraction_objects::async_generator_objects::{
    AsyncGenerator, AsyncGeneratorHeapData, AsyncGeneratorState,
};
use crate::ecmascript::builtins::control_abstraction_objects::generator_objects::{
    Generator, GeneratorHeapData, GeneratorState, VmOrArguments,
};
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_capability_records::PromiseCapability;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_reaction_records::PromiseReactionHandler;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_prototype::inner_promise_then;
use crate::ecmascript::builtins::ordinary::{
    ordinary_create_from_constructor, ordinary_define_own_property,
    ordinary_object_create_with_intrinsics,
};
use crate::ecmascript::builtins::ArgumentsList;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::environments::{
    new_function_environment, EnvironmentIndex, PrivateEnvironmentIndex,
};
use crate::ecmascript::execution::{
    Agent, ECMAScriptCodeEvaluationState, ExecutionContext, JsResult, ProtoIntrinsics,
    RealmIdentifier,
};
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::scripts_and_modules::ScriptOrModule;
use crate::ecmascript::types::{
    Function, InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, PrivateElement,
    PrivateName, PropertyDescriptor, PropertyKey, String, Value,
};
use crate::engine::{Executable, ExecutionResult, Vm};
use crate::heap::indexes::ECMAScriptFunctionIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThisMode {
    Lexical,
    Strict,
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
    Base,
    Derived,
}

/// The four body kinds OrdinaryFunctionCreate can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Normal,
    Generator,
    Async,
    AsyncGenerator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ECMAScriptFunction(pub(crate) ECMAScriptFunctionIndex);

/// A class field definition record attached to a class constructor.
#[derive(Debug, Clone)]
pub(crate) struct ClassFieldDefinition {
    pub(crate) key: ClassFieldKey,
    /// Compiled initializer; absent fields initialize to undefined.
    pub(crate) initializer: Option<Executable>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ClassFieldKey {
    Property(PropertyKey),
    Private(PrivateName),
}

#[derive(Debug)]
pub struct ECMAScriptFunctionHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    pub(crate) length: u8,
    /// \[\[Environment]]
    pub(crate) environment: EnvironmentIndex,
    /// \[\[PrivateEnvironment]]
    pub(crate) private_environment: Option<PrivateEnvironmentIndex>,
    /// \[\[FormalParameters]]
    ///
    /// SAFETY: The referred AST node is kept alive by `source_code` and is
    /// never accessed mutably. None only for synthesized default class
    /// constructors, which carry pre-compiled bytecode instead.
    pub(crate) formal_parameters: Option<NonNull<ast::FormalParameters<'static>>>,
    /// \[\[ECMAScriptCode]]
    ///
    /// SAFETY: As above.
    pub(crate) ecmascript_code: Option<NonNull<ast::FunctionBody<'static>>>,
    /// A concise arrow function body is an expression, not a statement list.
    pub(crate) is_concise_arrow_function: bool,
    pub(crate) compiled_bytecode: Option<Executable>,
    pub(crate) kind: FunctionKind,
    /// \[\[ThisMode]]
    pub(crate) this_mode: ThisMode,
    /// \[\[Strict]]
    pub(crate) strict: bool,
    pub(crate) is_constructor: bool,
    /// \[\[ConstructorKind]]
    pub(crate) constructor_kind: ConstructorKind,
    pub(crate) is_class_constructor: bool,
    /// \[\[HomeObject]]
    pub(crate) home_object: Option<Object>,
    /// \[\[SourceText]]
    pub(crate) source_text: Span,
    pub(crate) source_code: SourceCode,
    /// \[\[Realm]]
    pub(crate) realm: RealmIdentifier,
    /// \[\[ScriptOrModule]]
    pub(crate) script_or_module: Option<ScriptOrModule>,
    pub(crate) name: Option<String>,
    /// \[\[Fields]]
    pub(crate) fields: Box<[ClassFieldDefinition]>,
    /// \[\[PrivateMethods]]
    pub(crate) private_methods: Box<[PrivateElement]>,
}

pub(crate) struct OrdinaryFunctionCreateParams<'a> {
    pub function_prototype: Option<Object>,
    pub source_code: SourceCode,
    pub source_text: Span,
    pub parameters_list: &'a ast::FormalParameters<'a>,
    pub body: &'a ast::FunctionBody<'a>,
    pub is_concise_arrow_function: bool,
    pub kind: FunctionKind,
    pub lexical_this: bool,
    pub env: EnvironmentIndex,
    pub private_env: Option<PrivateEnvironmentIndex>,
}

impl ECMAScriptFunction {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }
}

/// ### [10.2.3 OrdinaryFunctionCreate ( functionPrototype, sourceText, ParameterList, Body, thisMode, env, privateEnv )](https://tc39.es/ecma262/#sec-ordinaryfunctioncreate)
pub(crate) fn ordinary_function_create(
    agent: &mut Agent,
    params: OrdinaryFunctionCreateParams,
) -> ECMAScriptFunction {
    let running_context = agent.running_execution_context();
    let realm = running_context.realm;
    let script_or_module = running_context.script_or_module;
    // 9. If thisMode is LEXICAL-THIS, set F.[[ThisMode]] to LEXICAL.
    // 10. Else if Strict is true, set F.[[ThisMode]] to STRICT.
    // 11. Else, set F.[[ThisMode]] to GLOBAL.
    let strict = is_strict_body(params.body)
        || agent
            .running_execution_context()
            .ecmascript_code
            .as_ref()
            .map_or(false, |code| code.is_strict_mode);
    let this_mode = if params.lexical_this {
        ThisMode::Lexical
    } else if strict {
        ThisMode::Strict
    } else {
        ThisMode::Global
    };
    // 12-17. Set the function's fields.
    let data = ECMAScriptFunctionHeapData {
        object_index: None,
        // 19. Perform SetFunctionLength(F, len): the count of non-rest
        //     parameters without defaults.
        length: expected_argument_count(params.parameters_list),
        // 15. Set F.[[Environment]] to env.
        environment: params.env,
        // 16. Set F.[[PrivateEnvironment]] to privateEnv.
        private_environment: params.private_env,
        // 5. Set F.[[FormalParameters]] to ParameterList.
        // SAFETY: params.parameters_list lives inside source_code's arena.
        formal_parameters: Some(unsafe {
            core::mem::transmute::<NonNull<ast::FormalParameters>, NonNull<ast::FormalParameters<'static>>>(
                NonNull::from(params.parameters_list),
            )
        }),
        // 6. Set F.[[ECMAScriptCode]] to Body.
        // SAFETY: As above.
        ecmascript_code: Some(unsafe {
            core::mem::transmute::<NonNull<ast::FunctionBody>, NonNull<ast::FunctionBody<'static>>>(
                NonNull::from(params.body),
            )
        }),
        is_concise_arrow_function: params.is_concise_arrow_function,
        compiled_bytecode: None,
        kind: params.kind,
        this_mode,
        // 7. Set F.[[Strict]] to Strict.
        strict,
        is_constructor: false,
        constructor_kind: ConstructorKind::Base,
        is_class_constructor: false,
        // 14. Set F.[[HomeObject]] to undefined.
        home_object: None,
        // 4. Set F.[[SourceText]] to sourceText.
        source_text: params.source_text,
        source_code: params.source_code,
        // 17. Set F.[[Realm]] to the current Realm Record.
        realm,
        // 18. Set F.[[ScriptOrModule]] to GetActiveScriptOrModule().
        script_or_module,
        name: None,
        fields: Box::default(),
        private_methods: Box::default(),
    };
    agent.heap.ecmascript_functions.push(Some(data));
    let function =
        ECMAScriptFunction(ECMAScriptFunctionIndex::last(&agent.heap.ecmascript_functions));
    // 3. Set internalSlotsList's [[Prototype]] to functionPrototype.
    if let Some(prototype) = params.function_prototype {
        let default_proto = agent
            .current_realm()
            .intrinsics()
            .get_intrinsic_default_proto(ProtoIntrinsics::Function);
        if prototype != default_proto {
            function.internal_set_prototype(agent, Some(prototype));
        }
    }
    // 20. Return F.
    function
}

/// Creates the function object of a synthesized default class constructor.
/// It has no source AST; its behaviour is the given compiled bytecode.
pub(crate) fn create_default_constructor(
    agent: &mut Agent,
    bytecode: Executable,
    function_prototype: Option<Object>,
    env: EnvironmentIndex,
    private_env: Option<PrivateEnvironmentIndex>,
) -> ECMAScriptFunction {
    let running_context = agent.running_execution_context();
    let realm = running_context.realm;
    let script_or_module = running_context.script_or_module;
    let source_code = running_context
        .ecmascript_code
        .as_ref()
        .expect("class evaluation runs ECMAScript code")
        .source_code;
    let data = ECMAScriptFunctionHeapData {
        object_index: None,
        length: 0,
        environment: env,
        private_environment: private_env,
        formal_parameters: None,
        ecmascript_code: None,
        is_concise_arrow_function: false,
        compiled_bytecode: Some(bytecode),
        kind: FunctionKind::Normal,
        this_mode: ThisMode::Strict,
        strict: true,
        is_constructor: true,
        constructor_kind: ConstructorKind::Base,
        is_class_constructor: true,
        home_object: None,
        source_text: Span::default(),
        source_code,
        realm,
        script_or_module,
        name: None,
        fields: Box::default(),
        private_methods: Box::default(),
    };
    agent.heap.ecmascript_functions.push(Some(data));
    let function =
        ECMAScriptFunction(ECMAScriptFunctionIndex::last(&agent.heap.ecmascript_functions));
    if let Some(prototype) = function_prototype {
        let default_proto = agent
            .current_realm()
            .intrinsics()
            .get_intrinsic_default_proto(ProtoIntrinsics::Function);
        if prototype != default_proto {
            function.internal_set_prototype(agent, Some(prototype));
        }
    }
    function
}

fn is_strict_body(body: &ast::FunctionBody) -> bool {
    body.directives
        .iter()
        .any(|directive| directive.directive == "use strict")
}

fn expected_argument_count(parameters: &ast::FormalParameters) -> u8 {
    let mut count = 0u8;
    for parameter in parameters.items.iter() {
        if matches!(
            parameter.pattern.kind,
            ast::BindingPatternKind::AssignmentPattern(_)
        ) {
            break;
        }
        count = count.saturating_add(1);
    }
    count
}

/// ### [10.2.5 MakeConstructor ( F \[ , writablePrototype \[ , prototype \] \] )](https://tc39.es/ecma262/#sec-makeconstructor)
pub(crate) fn make_constructor(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    writable_prototype: Option<bool>,
    prototype: Option<Object>,
) {
    // 2. Set F.[[Constructor]] and F.[[ConstructorKind]] to BASE.
    agent[function].is_constructor = true;
    // 3. If writablePrototype is not present, set writablePrototype to true.
    let writable_prototype = writable_prototype.unwrap_or(true);
    // 4. If prototype is not present, then
    let prototype = prototype.unwrap_or_else(|| {
        // a. Set prototype to OrdinaryObjectCreate(%Object.prototype%).
        let prototype =
            ordinary_object_create_with_intrinsics(agent, Some(ProtoIntrinsics::Object));
        // b. Perform ! DefinePropertyOrThrow(prototype, "constructor",
        //    PropertyDescriptor { [[Value]]: F, [[Writable]]:
        //    writablePrototype, [[Enumerable]]: false, [[Configurable]]:
        //    true }).
        let constructor_key = PropertyKey::from_static_str(agent, "constructor");
        let backing = prototype.get_or_create_backing_object(agent);
        ordinary_define_own_property(
            agent,
            backing,
            constructor_key,
            PropertyDescriptor {
                value: Some(function.into_value()),
                writable: Some(writable_prototype),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        );
        prototype
    });
    // 5. Perform ! DefinePropertyOrThrow(F, "prototype", PropertyDescriptor {
    //    [[Value]]: prototype, [[Writable]]: writablePrototype,
    //    [[Enumerable]]: false, [[Configurable]]: false }).
    let prototype_key = PropertyKey::from_static_str(agent, "prototype");
    let backing = function.get_or_create_backing_object(agent);
    ordinary_define_own_property(
        agent,
        backing,
        prototype_key,
        PropertyDescriptor {
            value: Some(prototype.into()),
            writable: Some(writable_prototype),
            enumerable: Some(false),
            configurable: Some(false),
            ..Default::default()
        },
    );
}

/// ### [10.2.7 MakeMethod ( F, homeObject )](https://tc39.es/ecma262/#sec-makemethod)
pub(crate) fn make_method(agent: &mut Agent, function: ECMAScriptFunction, home_object: Object) {
    // 1. Set F.[[HomeObject]] to homeObject.
    agent[function].home_object = Some(home_object);
}

/// ### [10.2.9 SetFunctionName ( F, name \[ , prefix \] )](https://tc39.es/ecma262/#sec-setfunctionname)
pub(crate) fn set_function_name(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    name: PropertyKey,
    prefix: Option<&str>,
) {
    // 2. If name is a Symbol, set name to its descriptive wrapping.
    let name = match name {
        PropertyKey::Symbol(symbol) => {
            let description = symbol
                .descriptor(agent)
                .map_or_else(std::string::String::new, |d| {
                    d.to_string_lossy(agent).into_owned()
                });
            String::from_string(agent, format!("[{}]", description))
        }
        PropertyKey::String(name) => name,
        PropertyKey::Integer(index) => String::from_string(agent, index.to_string()),
    };
    // 4. If prefix is present, set name to the string-concatenation of
    //    prefix, the code unit 0x0020 (SPACE), and name.
    let name = if let Some(prefix) = prefix {
        let name = name.to_string_lossy(agent).into_owned();
        String::from_string(agent, format!("{} {}", prefix, name))
    } else {
        name
    };
    // 6. Perform ! DefinePropertyOrThrow(F, "name", ...): carried virtually.
    agent[function].name = Some(name);
}

/// ### [10.2.1.1 PrepareForOrdinaryCall ( F, newTarget )](https://tc39.es/ecma262/#sec-prepareforordinarycall)
pub(crate) fn prepare_for_ordinary_call(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    new_target: Option<Object>,
) {
    // 2. Let calleeContext be a new ECMAScript code execution context.
    // 6. Let localEnv be NewFunctionEnvironment(F, newTarget).
    let local_env = new_function_environment(agent, function, new_target);
    let data = &agent[function];
    let callee_context = ExecutionContext {
        ecmascript_code: Some(ECMAScriptCodeEvaluationState {
            // 7. Set the LexicalEnvironment of calleeContext to localEnv.
            lexical_environment: EnvironmentIndex::Function(local_env),
            // 8. Set the VariableEnvironment of calleeContext to localEnv.
            variable_environment: EnvironmentIndex::Function(local_env),
            // 9. Set the PrivateEnvironment of calleeContext to
            //    F.[[PrivateEnvironment]].
            private_environment: data.private_environment,
            is_strict_mode: data.strict,
            source_code: data.source_code,
        }),
        // 3. Set the Function of calleeContext to F.
        function: Some(Function::ECMAScriptFunction(function)),
        // 4. Let calleeRealm be F.[[Realm]]. 5. Set the Realm of
        //    calleeContext to calleeRealm.
        realm: data.realm,
        // 5½. Set the ScriptOrModule of calleeContext to
        //     F.[[ScriptOrModule]].
        script_or_module: data.script_or_module,
    };
    // 10. Push calleeContext onto the execution context stack.
    agent.execution_context_stack.push(callee_context);
}

/// ### [10.2.1.2 OrdinaryCallBindThis ( F, calleeContext, thisArgument )](https://tc39.es/ecma262/#sec-ordinarycallbindthis)
pub(crate) fn ordinary_call_bind_this(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    this_argument: Value,
) {
    // 1. Let thisMode be F.[[ThisMode]].
    let this_mode = agent[function].this_mode;
    // 2. If thisMode is LEXICAL, return unused.
    if this_mode == ThisMode::Lexical {
        return;
    }
    // 5. If thisMode is STRICT, let thisValue be thisArgument.
    let this_value = if this_mode == ThisMode::Strict {
        this_argument
    } else {
        // 6. Else,
        // a. If thisArgument is either undefined or null, then
        if this_argument.is_undefined() || this_argument.is_null() {
            // i. Let globalEnv be calleeRealm.[[GlobalEnv]].
            // iii. Let thisValue be globalEnv.[[GlobalThisValue]].
            let realm = agent[function].realm;
            let global_env = agent[realm].global_env();
            agent
                .heap
                .environments
                .get_global_environment(global_env)
                .global_this_value
                .into()
        } else {
            // b. Else, let thisValue be ! ToObject(thisArgument).
            crate::ecmascript::abstract_operations::type_conversion::to_object(
                agent,
                this_argument,
            )
            .expect("non-nullish values convert to objects")
            .into()
        }
    };
    // 7. Assert: localEnv is a Function Environment Record.
    let EnvironmentIndex::Function(local_env) = agent
        .running_execution_context()
        .ecmascript_code
        .as_ref()
        .expect("ordinary call must have ECMAScript code")
        .lexical_environment
    else {
        unreachable!()
    };
    // 9. Perform ! localEnv.BindThisValue(thisValue).
    local_env
        .bind_this_value(agent, this_value)
        .expect("this binding is uninitialized");
    // 10. Return unused.
}

/// Fetches or lazily compiles the function's body executable.
pub(crate) fn get_or_compile_bytecode(
    agent: &mut Agent,
    function: ECMAScriptFunction,
) -> Executable {
    if let Some(executable) = agent[function].compiled_bytecode {
        return executable;
    }
    let executable = Executable::compile_function_body(agent, function);
    agent[function].compiled_bytecode = Some(executable);
    executable
}

/// ### [10.2.1.4 OrdinaryCallEvaluateBody ( F, argumentsList )](https://tc39.es/ecma262/#sec-ordinarycallevaluatebody)
/// together with the EvaluateBody variants of 15.
fn ordinary_call_evaluate_body(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    arguments_list: ArgumentsList,
) -> JsResult<Value> {
    let executable = get_or_compile_bytecode(agent, function);
    match agent[function].kind {
        // 15.2.3 Runtime Semantics: EvaluateFunctionBody
        FunctionKind::Normal => {
            Vm::execute(agent, executable, Some(arguments_list.0)).into_js_result()
        }
        // 15.5.2 Runtime Semantics: EvaluateGeneratorBody
        FunctionKind::Generator => {
            // 2. Let G be ? OrdinaryCreateFromConstructor(functionObject,
            //    "%GeneratorFunction.prototype.prototype%", ...).
            let proto = crate::ecmascript::builtins::ordinary::get_prototype_from_constructor(
                agent,
                Function::ECMAScriptFunction(function),
                ProtoIntrinsics::Generator,
            )?;
            // 4. Perform GeneratorStart(G, FunctionBody): the code evaluation
            //    state is captured for later resumption.
            let execution_context = agent.running_execution_context().clone();
            agent.heap.generators.push(Some(GeneratorHeapData {
                object_index: None,
                generator_state: Some(GeneratorState::SuspendedStart {
                    vm_or_args: VmOrArguments::Arguments(
                        arguments_list.to_vec().into_boxed_slice(),
                    ),
                    executable,
                    execution_context,
                }),
            }));
            let generator = Generator(crate::heap::indexes::BaseIndex::last(
                &agent.heap.generators,
            ));
            if let Some(proto) = proto {
                generator.internal_set_prototype(agent, Some(proto));
            }
            // 5. Return Completion Record { [[Type]]: RETURN, [[Value]]: G }.
            Ok(generator.into_value())
        }
        // 15.8.4 Runtime Semantics: EvaluateAsyncFunctionBody
        FunctionKind::Async => {
            // 1. Let promiseCapability be ! NewPromiseCapability(%Promise%).
            let promise_capability = PromiseCapability::new(agent);
            // 2./3. AsyncFunctionStart(promiseCapability, FunctionBody).
            let execution_result = Vm::execute(agent, executable, Some(arguments_list.0));
            match execution_result {
                ExecutionResult::Return(result) => {
                    promise_capability.resolve(agent, result);
                }
                ExecutionResult::Throw(error) => {
                    promise_capability.reject(agent, error.value());
                }
                ExecutionResult::Await { vm, awaited_value } => {
                    // Await: stash the suspension and subscribe to the
                    // awaited promise.
                    let execution_context = agent.running_execution_context().clone();
                    agent.heap.await_reactions.push(Some(AwaitReaction {
                        vm: Some(vm),
                        async_executable: Some(executable),
                        execution_context: Some(execution_context),
                        return_promise_capability: promise_capability,
                    }));
                    let reaction =
                        AwaitReactionIdentifier::last(&agent.heap.await_reactions);
                    let handler = PromiseReactionHandler::Await(reaction);
                    let promise = crate::ecmascript::builtins::promise::Promise::resolve(
                        agent,
                        awaited_value,
                    );
                    inner_promise_then(agent, promise, handler, handler, None);
                }
                ExecutionResult::Yield { .. } => unreachable!(),
            }
            // 4. Return Completion Record { [[Type]]: RETURN, [[Value]]:
            //    promiseCapability.[[Promise]] }.
            Ok(promise_capability.promise().into_value())
        }
        // 15.6.2 Runtime Semantics: EvaluateAsyncGeneratorBody
        FunctionKind::AsyncGenerator => {
            let proto = crate::ecmascript::builtins::ordinary::get_prototype_from_constructor(
                agent,
                Function::ECMAScriptFunction(function),
                ProtoIntrinsics::AsyncGenerator,
            )?;
            let execution_context = agent.running_execution_context().clone();
            agent.heap.async_generators.push(Some(AsyncGeneratorHeapData {
                object_index: None,
                state: Some(AsyncGeneratorState::SuspendedStart {
                    vm_or_args: VmOrArguments::Arguments(
                        arguments_list.to_vec().into_boxed_slice(),
                    ),
                    executable,
                    execution_context,
                }),
                queue: Default::default(),
            }));
            let generator = AsyncGenerator(crate::heap::indexes::BaseIndex::last(
                &agent.heap.async_generators,
            ));
            if let Some(proto) = proto {
                generator.internal_set_prototype(agent, Some(proto));
            }
            Ok(generator.into_value())
        }
    }
}

/// ### [10.2.1 \[\[Call]] ( thisArgument, argumentsList )](https://tc39.es/ecma262/#sec-ecmascript-function-objects-call-thisargument-argumentslist)
pub(crate) fn ecmascript_function_call(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    this_argument: Value,
    arguments_list: ArgumentsList,
) -> JsResult<Value> {
    // 2. Let callerContext be the running execution context.
    // 3. Let calleeContext be PrepareForOrdinaryCall(F, undefined).
    prepare_for_ordinary_call(agent, function, None);
    // 4. Assert: calleeContext is now the running execution context.
    // 5. If F.[[IsClassConstructor]] is true, then
    if agent[function].is_class_constructor {
        // a. Let error be a newly created TypeError object.
        let error = agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Class constructor cannot be invoked without 'new'",
        );
        // b. Remove calleeContext from the execution context stack.
        agent.execution_context_stack.pop();
        // c. Return ThrowCompletion(error).
        return Err(error);
    }
    // 6. Perform OrdinaryCallBindThis(F, calleeContext, thisArgument).
    ordinary_call_bind_this(agent, function, this_argument);
    // 7. Let result be Completion(OrdinaryCallEvaluateBody(F,
    //    argumentsList)).
    let result = ordinary_call_evaluate_body(agent, function, arguments_list);
    // 8. Remove calleeContext from the execution context stack.
    agent.execution_context_stack.pop();
    // 9. If result is a return completion, return result.[[Value]].
    // 10. ReturnIfAbrupt(result). 11. Return undefined.
    result
}

/// ### [10.2.2 \[\[Construct]] ( argumentsList, newTarget )](https://tc39.es/ecma262/#sec-ecmascript-function-objects-construct-argumentslist-newtarget)
pub(crate) fn ecmascript_function_construct(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    arguments_list: ArgumentsList,
    new_target: Function,
) -> JsResult<Object> {
    // 2. Let kind be F.[[ConstructorKind]].
    let kind = agent[function].constructor_kind;
    // 3. If kind is BASE, then
    let this_argument = if kind == ConstructorKind::Base {
        // a. Let thisArgument be ? OrdinaryCreateFromConstructor(newTarget,
        //    "%Object.prototype%").
        Some(ordinary_create_from_constructor(
            agent,
            new_target,
            ProtoIntrinsics::Object,
        )?)
    } else {
        None
    };
    // 4. Let calleeContext be PrepareForOrdinaryCall(F, newTarget).
    prepare_for_ordinary_call(agent, function, Some(new_target.into()));
    if let Some(this_argument) = this_argument {
        // 6. If kind is BASE, then
        // a. Perform OrdinaryCallBindThis(F, calleeContext, thisArgument).
        ordinary_call_bind_this(agent, function, this_argument.into());
        // b. Let initializeResult be
        //    Completion(InitializeInstanceElements(thisArgument, F)).
        let initialize_result = initialize_instance_elements(agent, this_argument, function);
        // c. If initializeResult is an abrupt completion, then
        if let Err(error) = initialize_result {
            // i. Remove calleeContext from the execution context stack.
            agent.execution_context_stack.pop();
            // ii. Return ? initializeResult.
            return Err(error);
        }
    }
    // 7. Let constructorEnv be the LexicalEnvironment of calleeContext.
    let constructor_env = agent
        .running_execution_context()
        .ecmascript_code
        .as_ref()
        .expect("constructor call must have ECMAScript code")
        .lexical_environment;
    // 8. Let result be Completion(OrdinaryCallEvaluateBody(F,
    //    argumentsList)).
    let result = ordinary_call_evaluate_body(agent, function, arguments_list);
    // 9. Remove calleeContext from the execution context stack.
    agent.execution_context_stack.pop();
    match result {
        // 10. If result is a return completion, then
        Ok(value) => {
            // a. If result.[[Value]] is an Object, return result.[[Value]].
            if let Ok(object) = Object::try_from(value) {
                return Ok(object);
            }
            // b. If kind is BASE, return thisArgument.
            if let Some(this_argument) = this_argument {
                return Ok(this_argument);
            }
            // c. If result.[[Value]] is not undefined, throw a TypeError
            //    exception.
            if !value.is_undefined() {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "Derived constructors may only return an object or undefined",
                ));
            }
            // 12. Let thisBinding be ? constructorEnv.GetThisBinding().
            let this_binding = constructor_env.get_this_binding(agent)?;
            // 13. Assert: thisBinding is an Object. 14. Return thisBinding.
            Ok(Object::try_from(this_binding).expect("constructor this binding is an object"))
        }
        // 11. Else, ReturnIfAbrupt(result).
        Err(error) => Err(error),
    }
}

/// ### [7.3.37 InitializeInstanceElements ( O, constructor )](https://tc39.es/ecma262/#sec-initializeinstanceelements)
pub(crate) fn initialize_instance_elements(
    agent: &mut Agent,
    object: Object,
    constructor: ECMAScriptFunction,
) -> JsResult<()> {
    // 1. Let methods be the value of constructor.[[PrivateMethods]].
    // 2. For each PrivateElement method of methods, do
    //    a. Perform ? PrivateMethodOrAccessorAdd(O, method).
    // NOTE: The element records are shared across instances; only the handle
    // is copied here.
    let methods = agent[constructor].private_methods.clone();
    for method in methods.iter() {
        crate::ecmascript::abstract_operations::operations_on_objects::private_method_or_accessor_add(
            agent, object, *method,
        )?;
    }
    // 3. Let fields be the value of constructor.[[Fields]].
    let fields = agent[constructor].fields.clone();
    // 4. For each element fieldRecord of fields, do
    //    a. Perform ? DefineField(O, fieldRecord).
    for field in fields.iter() {
        define_field(agent, object, field)?;
    }
    // 5. Return unused.
    Ok(())
}

/// ### [7.3.38 DefineField ( receiver, fieldRecord )](https://tc39.es/ecma262/#sec-definefield)
fn define_field(agent: &mut Agent, receiver: Object, field: &ClassFieldDefinition) -> JsResult<()> {
    // 1. Let initValue be undefined.
    // 2. If fieldRecord.[[Initializer]] is not EMPTY, then
    let init_value = if let Some(initializer) = field.initializer {
        // a. Let initValue be ? Call(initializer, receiver): the compiled
        //    initializer runs against the constructor's environment with the
        //    receiver as its this value.
        Vm::execute(agent, initializer, None).into_js_result()?
    } else {
        Value::Undefined
    };
    match field.key {
        // 4. If fieldName is a Private Name, perform
        //    ? PrivateFieldAdd(receiver, fieldName, initValue).
        ClassFieldKey::Private(private_name) => {
            crate::ecmascript::abstract_operations::operations_on_objects::private_field_add(
                agent,
                receiver,
                private_name,
                init_value,
            )
        }
        // 5. Else, perform ? CreateDataPropertyOrThrow(receiver, fieldName,
        //    initValue).
        ClassFieldKey::Property(key) => {
            crate::ecmascript::abstract_operations::operations_on_objects::create_data_property_or_throw(
                agent, receiver, key, init_value,
            )
        }
    }
}

impl core::ops::Index<ECMAScriptFunction> for Agent {
    type Output = ECMAScriptFunctionHeapData;

    fn index(&self, index: ECMAScriptFunction) -> &Self::Output {
        self.heap
            .ecmascript_functions
            .get(index.get_index())
            .expect("ECMAScriptFunction out of bounds")
            .as_ref()
            .expect("ECMAScriptFunction slot empty")
    }
}

impl core::ops::IndexMut<ECMAScriptFunction> for Agent {
    fn index_mut(&mut self, index: ECMAScriptFunction) -> &mut Self::Output {
        self.heap
            .ecmascript_functions
            .get_mut(index.get_index())
            .expect("ECMAScriptFunction out of bounds")
            .as_mut()
            .expect("ECMAScriptFunction slot empty")
    }
}

impl From<ECMAScriptFunction> for Object {
    fn from(value: ECMAScriptFunction) -> Self {
        Object::ECMAScriptFunction(value)
    }
}

impl IntoValue for ECMAScriptFunction {
    fn into_value(self) -> Value {
        Value::ECMAScriptFunction(self)
    }
}

impl crate::ecmascript::types::IntoObject for ECMAScriptFunction {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl crate::ecmascript::types::IntoFunction for ECMAScriptFunction {
    fn into_function(self) -> Function {
        Function::ECMAScriptFunction(self)
    }
}

impl From<ECMAScriptFunction> for Function {
    fn from(value: ECMAScriptFunction) -> Self {
        Function::ECMAScriptFunction(value)
    }
}

impl InternalSlots for ECMAScriptFunction {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Function;

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
        let length_key = PropertyKey::from_static_str(agent, "length");
        let name_key = PropertyKey::from_static_str(agent, "name");
        for key in [length_key, name_key] {
            let descriptor = function_virtual_property(agent, self, key)
                .expect("virtual property must exist")
                .into_fully_populated();
            agent[backing_object].define_property(key, descriptor);
        }
        self.set_backing_object(agent, backing_object);
        backing_object
    }
}

impl InternalMethods for ECMAScriptFunction {
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if let Some(backing_object) = self.get_backing_object(agent) {
            return backing_object.internal_get_own_property(agent, property_key);
        }
        Ok(function_virtual_property(agent, self, property_key))
    }

    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        if let Some(backing_object) = self.get_backing_object(agent) {
            return backing_object.internal_own_property_keys(agent);
        }
        let length_key = PropertyKey::from_static_str(agent, "length");
        let name_key = PropertyKey::from_static_str(agent, "name");
        Ok(vec![length_key, name_key])
    }
}

fn function_virtual_property(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    property_key: PropertyKey,
) -> Option<PropertyDescriptor> {
    let length_key = PropertyKey::from_static_str(agent, "length");
    let name_key = PropertyKey::from_static_str(agent, "name");
    let value = if property_key == length_key {
        crate::ecmascript::types::Number::from(agent[function].length as u32).into_value()
    } else if property_key == name_key {
        agent[function].name.unwrap_or(String::EMPTY).into_value()
    } else {
        return None;
    };
    Some(PropertyDescriptor {
        value: Some(value),
        writable: Some(false),
        enumerable: Some(false),
        configurable: Some(true),
        ..Default::default()
    })
}

impl HeapMark for ECMAScriptFunction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.ecmascript_functions.push(*self);
    }
}

impl HeapMark for ECMAScriptFunctionHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        self.environment.mark_values(queues);
        self.private_environment.mark_values(queues);
        if let Some(executable) = self.compiled_bytecode {
            queues.executables.push(executable);
        }
        self.home_object.mark_values(queues);
        self.source_code.mark_values(queues);
        queues.realms.push(self.realm);
        self.script_or_module.mark_values(queues);
        self.name.mark_values(queues);
        for field in self.fields.iter() {
            if let ClassFieldKey::Property(key) = field.key {
                key.mark_values(queues);
            }
            if let ClassFieldKey::Private(private_name) = field.key {
                private_name.mark_values(queues);
            }
            if let Some(initializer) = field.initializer {
                queues.executables.push(initializer);
            }
        }
        self.private_methods.mark_values(queues);
    }
}
