// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [16 ECMAScript Language: Scripts and Modules](https://tc39.es/ecma262/#sec-ecmascript-language-scripts-and-modules)

pub mod module;
pub mod script;
pub mod source_code;

use crate::ecmascript::builtins::module::Module;
use crate::heap::mark::{HeapMark, WorkQueues};

/// The ScriptOrModule component of an execution context.
#[derive(Debug, Clone, Copy)]
pub enum ScriptOrModule {
    Script(script::ScriptIdentifier),
    Module(Module),
}

impl HeapMark for ScriptOrModule {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            ScriptOrModule::Script(script) => queues.scripts.push(*script),
            ScriptOrModule::Module(module) => queues.modules.push(*module),
        }
    }
}
