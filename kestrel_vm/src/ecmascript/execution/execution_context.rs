// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::environments::{EnvironmentIndex, PrivateEnvironmentIndex};
use super::RealmIdentifier;
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::scripts_and_modules::ScriptOrModule;
use crate::ecmascript::types::Function;
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [code evaluation state](https://tc39.es/ecma262/#table-state-components-for-ecmascript-code-execution-contexts)
///
/// The additional state components of ECMAScript code execution contexts.
/// The resumable part of the code evaluation state (the suspended VM of a
/// generator or async activation) lives in the corresponding heap data; the
/// components here are the ones every piece of running code needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ECMAScriptCodeEvaluationState {
    /// ### LexicalEnvironment
    pub(crate) lexical_environment: EnvironmentIndex,

    /// ### VariableEnvironment
    pub(crate) variable_environment: EnvironmentIndex,

    /// ### PrivateEnvironment
    pub(crate) private_environment: Option<PrivateEnvironmentIndex>,

    /// Whether the currently evaluated code is strict mode code.
    pub(crate) is_strict_mode: bool,

    /// The source code the currently evaluated code was parsed from.
    pub(crate) source_code: SourceCode,
}

/// ### [9.4 Execution Contexts](https://tc39.es/ecma262/#sec-execution-contexts)
#[derive(Debug, Clone)]
pub(crate) struct ExecutionContext {
    /// ### code evaluation state
    pub(crate) ecmascript_code: Option<ECMAScriptCodeEvaluationState>,

    /// ### Function
    ///
    /// The function object being evaluated, or None for a Script or Module.
    pub(crate) function: Option<Function>,

    /// ### Realm
    pub(crate) realm: RealmIdentifier,

    /// ### ScriptOrModule
    pub(crate) script_or_module: Option<ScriptOrModule>,
}

impl HeapMark for ECMAScriptCodeEvaluationState {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.lexical_environment.mark_values(queues);
        self.variable_environment.mark_values(queues);
        self.private_environment.mark_values(queues);
        self.source_code.mark_values(queues);
    }
}

impl HeapMark for ExecutionContext {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.ecmascript_code.mark_values(queues);
        self.function.mark_values(queues);
        self.realm.mark_values(queues);
        self.script_or_module.mark_values(queues);
    }
}
