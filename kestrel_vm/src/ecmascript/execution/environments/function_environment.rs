// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{DeclarativeEnvironmentRecord, EnvironmentIndex, FunctionEnvironmentIndex};
use crate::ecmascript::builtins::ecmascript_function::ECMAScriptFunction;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{InternalSlots, Object, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [\[\[ThisBindingStatus]]](https://tc39.es/ecma262/#table-additional-fields-of-function-environment-records)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThisBindingStatus {
    /// This is an ArrowFunction and does not have a local `this` value.
    Lexical,
    /// A `this` binding exists and is initialized.
    Initialized,
    /// A `this` binding exists but is uninitialized.
    Uninitialized,
}

/// ### [9.1.1.3 Function Environment Records](https://tc39.es/ecma262/#sec-function-environment-records)
///
/// A Function Environment Record is a Declarative Environment Record that is
/// used to represent the top-level scope of a function and, if the function
/// is not an ArrowFunction, provides a `this` binding.
#[derive(Debug, Clone)]
pub struct FunctionEnvironmentRecord {
    pub(super) declarative: DeclarativeEnvironmentRecord,

    /// ### \[\[ThisValue]]
    pub(super) this_value: Option<Value>,

    /// ### \[\[ThisBindingStatus]]
    pub(super) this_binding_status: ThisBindingStatus,

    /// ### \[\[FunctionObject]]
    pub(super) function_object: ECMAScriptFunction,

    /// ### \[\[NewTarget]]
    pub(super) new_target: Option<Object>,
}

/// ### [9.1.2.4 NewFunctionEnvironment ( F, newTarget )](https://tc39.es/ecma262/#sec-newfunctionenvironment)
pub(crate) fn new_function_environment(
    agent: &mut Agent,
    function: ECMAScriptFunction,
    new_target: Option<Object>,
) -> FunctionEnvironmentIndex {
    let function_data = &agent[function];
    // 2. Let env be a new Function Environment Record containing no bindings.
    let env = FunctionEnvironmentRecord {
        // 7. Set env.[[OuterEnv]] to F.[[Environment]].
        declarative: DeclarativeEnvironmentRecord::new(Some(function_data.environment)),
        // 3. Set env.[[FunctionObject]] to F.
        function_object: function,
        // 4. If F.[[ThisMode]] is LEXICAL, set env.[[ThisBindingStatus]] to
        //    LEXICAL; otherwise, set env.[[ThisBindingStatus]] to
        //    UNINITIALIZED.
        this_binding_status: if function_data.this_mode
            == crate::ecmascript::builtins::ecmascript_function::ThisMode::Lexical
        {
            ThisBindingStatus::Lexical
        } else {
            ThisBindingStatus::Uninitialized
        },
        this_value: None,
        // 5. Set env.[[NewTarget]] to newTarget.
        new_target,
    };
    // 8. Return env.
    agent.heap.environments.push_function_environment(env)
}

impl FunctionEnvironmentIndex {
    /// ### [9.1.1.3.1 BindThisValue ( V )](https://tc39.es/ecma262/#sec-bindthisvalue)
    pub(crate) fn bind_this_value(self, agent: &mut Agent, value: Value) -> JsResult<Value> {
        let env_rec = agent.heap.environments.get_function_environment(self);
        // 1. Assert: envRec.[[ThisBindingStatus]] is not LEXICAL.
        debug_assert!(env_rec.this_binding_status != ThisBindingStatus::Lexical);
        // 2. If envRec.[[ThisBindingStatus]] is INITIALIZED, throw a
        //    ReferenceError exception.
        if env_rec.this_binding_status == ThisBindingStatus::Initialized {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::ReferenceError,
                "Super constructor may only be called once",
            ));
        }
        let env_rec = agent.heap.environments.get_function_environment_mut(self);
        // 3. Set envRec.[[ThisValue]] to V.
        env_rec.this_value = Some(value);
        // 4. Set envRec.[[ThisBindingStatus]] to INITIALIZED.
        env_rec.this_binding_status = ThisBindingStatus::Initialized;
        // 5. Return V.
        Ok(value)
    }

    /// ### [9.1.1.3.2 HasThisBinding ( )](https://tc39.es/ecma262/#sec-function-environment-records-hasthisbinding)
    pub(crate) fn has_this_binding(self, agent: &Agent) -> bool {
        // 1. If envRec.[[ThisBindingStatus]] is LEXICAL, return false;
        //    otherwise, return true.
        agent
            .heap
            .environments
            .get_function_environment(self)
            .this_binding_status
            != ThisBindingStatus::Lexical
    }

    /// ### [9.1.1.3.3 HasSuperBinding ( )](https://tc39.es/ecma262/#sec-function-environment-records-hassuperbinding)
    pub(crate) fn has_super_binding(self, agent: &Agent) -> bool {
        let env_rec = agent.heap.environments.get_function_environment(self);
        // 1. If envRec.[[ThisBindingStatus]] is LEXICAL, return false.
        if env_rec.this_binding_status == ThisBindingStatus::Lexical {
            return false;
        }
        // 2. If envRec.[[FunctionObject]].[[HomeObject]] is undefined, return
        //    false; otherwise, return true.
        agent[env_rec.function_object].home_object.is_some()
    }

    /// ### [9.1.1.3.4 GetThisBinding ( )](https://tc39.es/ecma262/#sec-function-environment-records-getthisbinding)
    pub(crate) fn get_this_binding(self, agent: &mut Agent) -> JsResult<Value> {
        let env_rec = agent.heap.environments.get_function_environment(self);
        // 1. Assert: envRec.[[ThisBindingStatus]] is not LEXICAL.
        debug_assert!(env_rec.this_binding_status != ThisBindingStatus::Lexical);
        // 2. If envRec.[[ThisBindingStatus]] is UNINITIALIZED, throw a
        //    ReferenceError exception.
        if env_rec.this_binding_status == ThisBindingStatus::Uninitialized {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::ReferenceError,
                "Must call super constructor before accessing 'this'",
            ));
        }
        // 3. Return envRec.[[ThisValue]].
        Ok(env_rec.this_value.expect("initialized this binding"))
    }

    /// ### [9.1.1.3.5 GetSuperBase ( )](https://tc39.es/ecma262/#sec-getsuperbase)
    pub(crate) fn get_super_base(self, agent: &mut Agent) -> JsResult<Option<Object>> {
        let env_rec = agent.heap.environments.get_function_environment(self);
        // 1. Let home be envRec.[[FunctionObject]].[[HomeObject]].
        let Some(home) = agent[env_rec.function_object].home_object else {
            // 2. If home is undefined, return undefined.
            return Ok(None);
        };
        // 4. Return ! home.[[GetPrototypeOf]]().
        Ok(home.internal_prototype(agent))
    }

    pub(crate) fn get_new_target(self, agent: &Agent) -> Option<Object> {
        agent
            .heap
            .environments
            .get_function_environment(self)
            .new_target
    }

    pub(crate) fn get_function_object(self, agent: &Agent) -> ECMAScriptFunction {
        agent
            .heap
            .environments
            .get_function_environment(self)
            .function_object
    }
}

/// ### [9.4.3 GetThisEnvironment ( )](https://tc39.es/ecma262/#sec-getthisenvironment)
pub(crate) fn get_this_environment(agent: &Agent) -> EnvironmentIndex {
    // 1. Let env be the running execution context's LexicalEnvironment.
    let mut env = agent
        .running_execution_context()
        .ecmascript_code
        .as_ref()
        .expect("GetThisEnvironment called without ECMAScript code")
        .lexical_environment;
    // 2. Repeat,
    loop {
        // a. Let exists be env.HasThisBinding().
        if env.has_this_binding(agent) {
            // b. If exists is true, return env.
            return env;
        }
        // c. Let outer be env.[[OuterEnv]].
        // d. Assert: outer is not null.
        // e. Set env to outer.
        env = env
            .get_outer_env(agent)
            .expect("this environment lookup escaped the global environment");
    }
}

impl HeapMark for FunctionEnvironmentRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.declarative.mark_values(queues);
        self.this_value.mark_values(queues);
        self.function_object.mark_values(queues);
        self.new_target.mark_values(queues);
    }
}
