// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
//!
//! The agent owns the heap, the execution context stack, and the job queues.
//! Exactly one agent executes at a time; all abstract operations thread an
//! explicit `&mut Agent` handle.

use std::collections::VecDeque;

use ahash::AHashMap;

use super::environments::{get_identifier_reference, EnvironmentIndex};
use super::{ExecutionContext, Realm, RealmIdentifier};
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_jobs::{
    PromiseReactionJob, PromiseResolveThenableJob,
};
use crate::ecmascript::builtins::error::data::ErrorHeapData;
use crate::ecmascript::builtins::error::Error;
use crate::ecmascript::builtins::module::Module;
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::scripts_and_modules::module::GraphLoadingStateRecord;
use crate::ecmascript::scripts_and_modules::ScriptOrModule;
use crate::ecmascript::types::{
    Function, IntoValue, Object, OrdinaryObject, PropertyKey, Reference, String, Symbol, Value,
};
use crate::heap::mark::{HeapMark, WorkQueues};
use crate::heap::indexes::ErrorIndex;
use crate::Heap;

pub type JsResult<T> = std::result::Result<T, JsError>;

/// A throw completion. The wrapped value is the thrown language value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsError(Value);

impl JsError {
    pub(crate) fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn value(self) -> Value {
        self.0
    }

    pub fn to_string(self, agent: &mut Agent) -> String {
        self.0.string_repr(agent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionType {
    Error,
    AggregateError,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    UriError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromiseRejectionOperation {
    Reject,
    Handle,
}

/// The closed set of feature flags, fixed at agent construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// `cleanup-some`
    CleanupSome,
    /// `is-usv-string`
    IsUsvString,
}

#[derive(Debug, Default)]
pub struct Options {
    /// Print compiled instructions and the executed instruction stream.
    pub print_internals: bool,
    pub features: Vec<Feature>,
}

/// ### [16.2.1.8 HostLoadImportedModule](https://tc39.es/ecma262/#sec-HostLoadImportedModule)
/// referrer argument.
#[derive(Debug, Clone, Copy)]
pub enum Referrer {
    Script(crate::ecmascript::scripts_and_modules::script::ScriptIdentifier),
    Module(Module),
    Realm(RealmIdentifier),
}

/// Payload threaded through module loading back to
/// `FinishLoadingImportedModule`.
#[derive(Debug)]
pub enum LoadPayload {
    GraphLoadingState(GraphLoadingStateRecord),
}

/// Host-defined callbacks. Embedders override the defaults they care about.
pub trait HostHooks: std::fmt::Debug {
    /// ### [19.2.1.2 HostEnsureCanCompileStrings ( calleeRealm )](https://tc39.es/ecma262/#sec-hostensurecancompilestrings)
    fn ensure_can_compile_strings(
        &self,
        _agent: &mut Agent,
        _calling_realm: RealmIdentifier,
        _eval_realm: RealmIdentifier,
    ) -> JsResult<()> {
        Ok(())
    }

    /// ### [20.2.3.5 HostHasSourceTextAvailable ( func )](https://tc39.es/ecma262/#sec-hosthassourcetextavailable)
    fn has_source_text_available(&self, _func: Function) -> bool {
        // The default implementation of HostHasSourceTextAvailable is to
        // return true.
        true
    }

    /// ### [16.2.1.8 HostLoadImportedModule ( referrer, specifier, hostDefined, payload )](https://tc39.es/ecma262/#sec-HostLoadImportedModule)
    ///
    /// The implementation must call `finish_loading_imported_module` with the
    /// same referrer, specifier and payload, synchronously or asynchronously.
    fn load_imported_module(
        &self,
        agent: &mut Agent,
        referrer: Referrer,
        specifier: std::string::String,
        payload: LoadPayload,
    ) {
        let error = agent.throw_exception(
            ExceptionType::TypeError,
            format!("Cannot resolve module specifier {:?}", specifier),
        );
        crate::ecmascript::scripts_and_modules::module::finish_loading_imported_module(
            agent,
            referrer,
            specifier,
            payload,
            Err(error),
        );
    }

    /// ### [27.2.1.9 HostPromiseRejectionTracker ( promise, operation )](https://tc39.es/ecma262/#sec-host-promise-rejection-tracker)
    fn promise_rejection_tracker(
        &self,
        _agent: &mut Agent,
        _promise: Promise,
        _operation: PromiseRejectionOperation,
    ) {
    }

    /// ### [13.3.12.1.1 HostGetImportMetaProperties ( moduleRecord )](https://tc39.es/ecma262/#sec-hostgetimportmetaproperties)
    fn get_import_meta_properties(
        &self,
        _agent: &mut Agent,
        _module: Module,
    ) -> Vec<(PropertyKey, Value)> {
        Vec::new()
    }

    /// ### [13.3.12.1.2 HostFinalizeImportMeta ( importMeta, moduleRecord )](https://tc39.es/ecma262/#sec-hostfinalizeimportmeta)
    fn finalize_import_meta(
        &self,
        _agent: &mut Agent,
        _import_meta: OrdinaryObject,
        _module: Module,
    ) {
    }
}

/// ### [9.5 Jobs and Host Operations to Enqueue Jobs](https://tc39.es/ecma262/#sec-jobs)
#[derive(Debug)]
pub struct Job {
    /// Realm to enter while running the job, if any.
    pub(crate) realm: Option<RealmIdentifier>,
    pub(crate) inner: InnerJob,
}

#[derive(Debug)]
pub(crate) enum InnerJob {
    PromiseReaction(PromiseReactionJob),
    PromiseResolveThenable(PromiseResolveThenableJob),
}

impl Job {
    pub(crate) fn run(self, agent: &mut Agent) -> JsResult<()> {
        let mut pushed_context = false;
        if let Some(realm) = self.realm {
            if agent.current_realm_id_internal() != Some(realm) {
                agent.execution_context_stack.push(ExecutionContext {
                    ecmascript_code: None,
                    function: None,
                    realm,
                    script_or_module: None,
                });
                pushed_context = true;
            }
        }
        let result = match self.inner {
            InnerJob::PromiseReaction(job) => job.run(agent),
            InnerJob::PromiseResolveThenable(job) => job.run(agent),
        };
        if pushed_context {
            agent.execution_context_stack.pop();
        }
        result
    }
}

/// FIFO queues, one per queue name.
#[derive(Debug, Default)]
pub(crate) struct JobQueues {
    pub(crate) promise_jobs: VecDeque<Job>,
    pub(crate) finalization_cleanup: VecDeque<Job>,
}

/// ### [9.7 Agents](https://tc39.es/ecma262/#sec-agents)
#[derive(Debug)]
pub struct Agent {
    pub(crate) heap: Heap,
    pub(crate) options: Options,
    pub(crate) global_symbol_registry: AHashMap<String, Symbol>,
    pub(crate) host_hooks: &'static dyn HostHooks,
    pub(crate) execution_context_stack: Vec<ExecutionContext>,
    pub(crate) job_queues: JobQueues,
    /// \[\[KeptAlive]]
    pub(crate) kept_alive: Vec<Value>,
}

impl Agent {
    pub fn new(options: Options, host_hooks: &'static dyn HostHooks) -> Self {
        Agent {
            heap: Heap::new(),
            options,
            global_symbol_registry: AHashMap::new(),
            host_hooks,
            execution_context_stack: Vec::new(),
            job_queues: JobQueues::default(),
            kept_alive: Vec::new(),
        }
    }

    pub fn feature(&self, feature: Feature) -> bool {
        self.options.features.contains(&feature)
    }

    pub fn current_realm_id(&self) -> RealmIdentifier {
        self.execution_context_stack
            .last()
            .expect("no running execution context")
            .realm
    }

    pub(crate) fn current_realm_id_internal(&self) -> Option<RealmIdentifier> {
        self.execution_context_stack.last().map(|ctx| ctx.realm)
    }

    pub fn current_realm(&self) -> &Realm {
        self.get_realm(self.current_realm_id())
    }

    pub fn current_realm_mut(&mut self) -> &mut Realm {
        self.get_realm_mut(self.current_realm_id())
    }

    pub fn get_realm(&self, id: RealmIdentifier) -> &Realm {
        &self[id]
    }

    pub fn get_realm_mut(&mut self, id: RealmIdentifier) -> &mut Realm {
        &mut self[id]
    }

    pub(crate) fn running_execution_context(&self) -> &ExecutionContext {
        self.execution_context_stack
            .last()
            .expect("no running execution context")
    }

    pub(crate) fn running_execution_context_mut(&mut self) -> &mut ExecutionContext {
        self.execution_context_stack
            .last_mut()
            .expect("no running execution context")
    }

    pub(crate) fn is_strict_mode_code(&self) -> bool {
        self.running_execution_context()
            .ecmascript_code
            .as_ref()
            .map_or(true, |code| code.is_strict_mode)
    }

    /// ### [5.2.3.2 Throw an Exception](https://tc39.es/ecma262/#sec-throw-an-exception)
    ///
    /// Constructs an Error object of the given kind in the current realm,
    /// capturing a synthetic call-site trace as its `stack`.
    pub fn throw_exception(
        &mut self,
        kind: ExceptionType,
        message: impl Into<std::string::String>,
    ) -> JsError {
        let message = String::from_string(self, message.into());
        self.throw_exception_with_message(kind, message)
    }

    pub fn throw_exception_with_static_message(
        &mut self,
        kind: ExceptionType,
        message: &'static str,
    ) -> JsError {
        let message = String::from_static_str(self, message);
        self.throw_exception_with_message(kind, message)
    }

    pub(crate) fn throw_exception_with_message(
        &mut self,
        kind: ExceptionType,
        message: String,
    ) -> JsError {
        let stack = self.capture_stack_trace(kind, message);
        let stack = String::from_string(self, stack);
        self.heap
            .errors
            .push(Some(ErrorHeapData::new(kind, Some(message), Some(stack))));
        let error = Error(ErrorIndex::last(&self.heap.errors));
        JsError::new(error.into_value())
    }

    /// Builds the `stack` string for a new Error from the execution context
    /// stack.
    pub(crate) fn capture_stack_trace(
        &self,
        kind: ExceptionType,
        message: String,
    ) -> std::string::String {
        let mut stack = format!(
            "{}: {}",
            error_kind_name(kind),
            self[message].to_string_lossy()
        );
        for context in self.execution_context_stack.iter().rev() {
            let name = context
                .function
                .and_then(|function| function_name(self, function))
                .unwrap_or_else(|| "<anonymous>".to_string());
            stack.push_str("\n    at ");
            stack.push_str(&name);
        }
        stack
    }

    /// Enqueues a job onto the `PromiseJobs` queue.
    pub(crate) fn enqueue_promise_job(&mut self, job: Job) {
        self.job_queues.promise_jobs.push_back(job);
    }

    /// Drains the job queues in FIFO order. Called between top-level agent
    /// entry points; no job may be interrupted.
    pub fn run_jobs(&mut self) {
        loop {
            let job = self
                .job_queues
                .promise_jobs
                .pop_front()
                .or_else(|| self.job_queues.finalization_cleanup.pop_front());
            let Some(job) = job else {
                break;
            };
            // An abrupt job completion has nowhere to propagate; the error
            // has already been delivered to its promise where applicable.
            let _ = job.run(self);
            // ClearKeptObjects: the KeptAlive set is emptied at the end of
            // every synchronous run-to-completion.
            self.kept_alive.clear();
        }
    }

    /// The resolved specifier a module was registered under; a host helper
    /// for module resolution.
    pub fn module_specifier(&self, module: Module) -> std::string::String {
        let specifier = self[module].specifier;
        self[specifier].to_string_lossy().into_owned()
    }

    /// Creates the throw completion handed to FinishLoadingImportedModule on
    /// a failed module load.
    pub fn throw_module_load_error(&mut self, message: std::string::String) -> JsError {
        self.throw_exception(ExceptionType::TypeError, message)
    }

    pub(crate) fn mark_roots(&self, queues: &mut WorkQueues) {
        for context in &self.execution_context_stack {
            context.mark_values(queues);
        }
        for value in &self.kept_alive {
            value.mark_values(queues);
        }
        for realm in 0..self.heap.realms.len() {
            queues.realms.push(RealmIdentifier::from_index(realm));
        }
    }
}

fn error_kind_name(kind: ExceptionType) -> &'static str {
    match kind {
        ExceptionType::Error => "Error",
        ExceptionType::AggregateError => "AggregateError",
        ExceptionType::EvalError => "EvalError",
        ExceptionType::RangeError => "RangeError",
        ExceptionType::ReferenceError => "ReferenceError",
        ExceptionType::SyntaxError => "SyntaxError",
        ExceptionType::TypeError => "TypeError",
        ExceptionType::UriError => "URIError",
    }
}

fn function_name(agent: &Agent, function: Function) -> Option<std::string::String> {
    let name = match function {
        Function::BuiltinFunction(f) => Some(agent[f].initial_name),
        Function::ECMAScriptFunction(f) => agent[f].name,
        Function::BoundFunction(f) => agent[f].name,
        Function::PromiseResolvingFunction(_) => None,
    }?;
    Some(name.to_string_lossy(agent).into_owned())
}

/// ### [9.4.1 GetActiveScriptOrModule ( )](https://tc39.es/ecma262/#sec-getactivescriptormodule)
pub(crate) fn get_active_script_or_module(agent: &Agent) -> Option<ScriptOrModule> {
    // 1. If the execution context stack is empty, return null.
    // 2. Let ec be the topmost execution context on the execution context
    //    stack whose ScriptOrModule component is not null.
    // 3. If no such execution context exists, return null. Otherwise, return
    //    ec's ScriptOrModule.
    agent
        .execution_context_stack
        .iter()
        .rev()
        .find_map(|context| context.script_or_module)
}

/// ### [9.4.2 ResolveBinding ( name \[ , env \] )](https://tc39.es/ecma262/#sec-resolvebinding)
pub(crate) fn resolve_binding(
    agent: &mut Agent,
    name: String,
    env: Option<EnvironmentIndex>,
) -> JsResult<Reference> {
    let env = env.or_else(|| {
        // 1. If env is not present or env is undefined, then
        //    a. Set env to the running execution context's LexicalEnvironment.
        Some(
            agent
                .running_execution_context()
                .ecmascript_code
                .as_ref()
                .expect("ResolveBinding called without ECMAScript code")
                .lexical_environment,
        )
    });

    // 2. Assert: env is an Environment Record.
    // 3. If the source text matched by the syntactic production that is being
    //    evaluated is contained in strict mode code, let strict be true; else
    //    let strict be false.
    let strict = agent.is_strict_mode_code();

    // 4. Return ? GetIdentifierReference(env, name, strict).
    get_identifier_reference(agent, env, name, strict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::{initialize_default_realm, DefaultHostHooks};

    #[test]
    fn mark_roots_traverses_the_realm() {
        let mut agent = Agent::new(Options::default(), &DefaultHostHooks);
        initialize_default_realm(&mut agent);
        let mut queues = WorkQueues::default();
        agent.mark_roots(&mut queues);
        assert!(!queues.realms.is_empty());
    }
}
