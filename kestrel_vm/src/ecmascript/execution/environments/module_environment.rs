// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ahash::AHashMap;

use super::{DeclarativeEnvironmentRecord, ModuleEnvironmentIndex, OuterEnv};
use crate::ecmascript::builtins::module::Module;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{String, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [9.1.1.5 Module Environment Records](https://tc39.es/ecma262/#sec-module-environment-records)
///
/// A Module Environment Record is a Declarative Environment Record that
/// additionally supports immutable import bindings providing indirect access
/// to bindings in other environments.
#[derive(Debug, Clone, Default)]
pub struct ModuleEnvironmentRecord {
    pub(crate) declarative: DeclarativeEnvironmentRecord,

    /// Import bindings: name → (module, binding name in that module).
    pub(super) indirect_bindings: AHashMap<String, (Module, String)>,
}

impl ModuleEnvironmentRecord {
    /// ### [9.1.2.6 NewModuleEnvironment ( E )](https://tc39.es/ecma262/#sec-newmoduleenvironment)
    pub(crate) fn new(outer_env: OuterEnv) -> Self {
        ModuleEnvironmentRecord {
            declarative: DeclarativeEnvironmentRecord::new(outer_env),
            indirect_bindings: AHashMap::default(),
        }
    }
}

impl ModuleEnvironmentIndex {
    /// ### [9.1.1.5.5 CreateImportBinding ( N, M, N2 )](https://tc39.es/ecma262/#sec-createimportbinding)
    pub(crate) fn create_import_binding(
        self,
        agent: &mut Agent,
        name: String,
        module: Module,
        binding_name: String,
    ) {
        let env_rec = agent.heap.environments.get_module_environment_mut(self);
        // 1. Assert: envRec does not already have a binding for N.
        debug_assert!(!env_rec.declarative.has_binding(name));
        debug_assert!(!env_rec.indirect_bindings.contains_key(&name));
        // 2. Assert: When M.[[Environment]] is instantiated, it will have a
        //    direct binding for N2.
        // 3. Create an immutable indirect binding in envRec for N that
        //    references M and N2 as its target binding and record that the
        //    binding is initialized.
        env_rec.indirect_bindings.insert(name, (module, binding_name));
        // 4. Return unused.
    }

    /// ### [9.1.1.5.1 GetBindingValue ( N, S )](https://tc39.es/ecma262/#sec-module-environment-records-getbindingvalue-n-s)
    pub(crate) fn get_binding_value(
        self,
        agent: &mut Agent,
        name: String,
    ) -> JsResult<Value> {
        // 1. Assert: S is true.
        let env_rec = agent.heap.environments.get_module_environment(self);
        // 2. Assert: envRec has a binding for N.
        // 3. If the binding for N is an indirect binding, then
        if let Some((module, binding_name)) = env_rec.indirect_bindings.get(&name).copied() {
            // a. Let M and N2 be the indirection values provided when this
            //    binding for N was created.
            // b. Let targetEnv be M.[[Environment]].
            let Some(target_env) = agent[module].cyclic.environment else {
                // c. If targetEnv is empty, throw a ReferenceError exception.
                let name = name.to_string_lossy(agent).into_owned();
                return Err(agent.throw_exception(
                    ExceptionType::ReferenceError,
                    format!("Cannot access '{}' before initialization", name),
                ));
            };
            // d. Return ? targetEnv.GetBindingValue(N2, true).
            return target_env.get_binding_value(agent, binding_name);
        }
        // 4. If the binding for N in envRec is an uninitialized binding,
        //    throw a ReferenceError exception.
        let binding = env_rec.declarative.get_binding(name);
        super::declarative_binding_value(agent, binding, name)
    }

    pub(crate) fn has_direct_binding(self, agent: &Agent, name: String) -> bool {
        let env_rec = agent.heap.environments.get_module_environment(self);
        env_rec.declarative.has_binding(name) || env_rec.indirect_bindings.contains_key(&name)
    }
}

impl HeapMark for ModuleEnvironmentRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.declarative.mark_values(queues);
        for (name, (module, binding_name)) in &self.indirect_bindings {
            name.mark_values(queues);
            module.mark_values(queues);
            binding_name.mark_values(queues);
        }
    }
}
