// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ahash::AHashMap;

use super::OuterEnv;
use crate::ecmascript::types::{String, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [9.1.1.1 Declarative Environment Records](https://tc39.es/ecma262/#sec-declarative-environment-records)
///
/// A Declarative Environment Record associates identifier bindings with
/// language values directly: FunctionDeclarations, VariableDeclarations, and
/// Catch clauses.
#[derive(Debug, Clone, Default)]
pub struct DeclarativeEnvironmentRecord {
    /// ### \[\[OuterEnv]]
    pub(super) outer_env: OuterEnv,

    pub(super) bindings: AHashMap<String, Binding>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Binding {
    /// None while the binding is uninitialized.
    pub(crate) value: Option<Value>,
    pub(super) strict: bool,
    pub(super) mutable: bool,
    pub(super) deletable: bool,
}

impl DeclarativeEnvironmentRecord {
    /// ### [9.1.2.2 NewDeclarativeEnvironment ( E )](https://tc39.es/ecma262/#sec-newdeclarativeenvironment)
    pub(crate) fn new(outer_env: OuterEnv) -> Self {
        // 1. Let env be a new Declarative Environment Record containing no
        //    bindings.
        // 2. Set env.[[OuterEnv]] to E.
        // 3. Return env.
        DeclarativeEnvironmentRecord {
            outer_env,
            bindings: AHashMap::default(),
        }
    }

    /// ### [9.1.1.1.1 HasBinding ( N )](https://tc39.es/ecma262/#sec-declarative-environment-records-hasbinding-n)
    pub(crate) fn has_binding(&self, name: String) -> bool {
        // 1. If envRec has a binding for N, return true.
        // 2. Return false.
        self.bindings.contains_key(&name)
    }

    /// ### [9.1.1.1.2 CreateMutableBinding ( N, D )](https://tc39.es/ecma262/#sec-declarative-environment-records-createmutablebinding-n-d)
    pub(crate) fn create_mutable_binding(&mut self, name: String, is_deletable: bool) {
        // 1. Assert: envRec does not already have a binding for N.
        debug_assert!(!self.has_binding(name));
        // 2. Create a mutable binding in envRec for N and record that it is
        //    uninitialized.
        self.bindings.insert(
            name,
            Binding {
                value: None,
                strict: false,
                mutable: true,
                deletable: is_deletable,
            },
        );
    }

    /// ### [9.1.1.1.3 CreateImmutableBinding ( N, S )](https://tc39.es/ecma262/#sec-declarative-environment-records-createimmutablebinding-n-s)
    pub(crate) fn create_immutable_binding(&mut self, name: String, is_strict: bool) {
        // 1. Assert: envRec does not already have a binding for N.
        debug_assert!(!self.has_binding(name));
        // 2. Create an immutable binding in envRec for N and record that it
        //    is uninitialized.
        self.bindings.insert(
            name,
            Binding {
                value: None,
                strict: is_strict,
                mutable: false,
                deletable: false,
            },
        );
    }

    /// ### [9.1.1.1.4 InitializeBinding ( N, V )](https://tc39.es/ecma262/#sec-declarative-environment-records-initializebinding-n-v)
    pub(crate) fn initialize_binding(&mut self, name: String, value: Value) {
        // 1. Assert: envRec must have an uninitialized binding for N.
        let binding = self.bindings.get_mut(&name).expect("binding must exist");
        debug_assert!(binding.value.is_none());
        // 2. Set the bound value for N in envRec to V.
        // 3. Record that the binding for N in envRec has been initialized.
        binding.value = Some(value);
    }

    /// Force-initializes or overwrites a binding, for
    /// CreateGlobalVarBinding-style hoisting where the binding may already
    /// exist.
    pub(crate) fn initialize_or_set_binding(&mut self, name: String, value: Value) {
        if let Some(binding) = self.bindings.get_mut(&name) {
            binding.value = Some(value);
        } else {
            self.bindings.insert(
                name,
                Binding {
                    value: Some(value),
                    strict: false,
                    mutable: true,
                    deletable: false,
                },
            );
        }
    }

    pub(crate) fn get_binding(&self, name: String) -> Option<Binding> {
        self.bindings.get(&name).copied()
    }

    pub(crate) fn set_binding_value(&mut self, name: String, value: Value) {
        let binding = self.bindings.get_mut(&name).expect("binding must exist");
        binding.value = Some(value);
    }

    /// ### [9.1.1.1.7 DeleteBinding ( N )](https://tc39.es/ecma262/#sec-declarative-environment-records-deletebinding-n)
    pub(crate) fn delete_binding(&mut self, name: String) -> bool {
        // 1. Assert: envRec has a binding for N.
        let binding = self.bindings.get(&name).expect("binding must exist");
        // 2. If the binding for N in envRec cannot be deleted, return false.
        if !binding.deletable {
            return false;
        }
        // 3. Remove the binding for N from envRec.
        self.bindings.remove(&name);
        // 4. Return true.
        true
    }
}

impl Binding {
    pub(crate) fn is_strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}

impl HeapMark for DeclarativeEnvironmentRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.outer_env.mark_values(queues);
        for (name, binding) in &self.bindings {
            name.mark_values(queues);
            binding.value.mark_values(queues);
        }
    }
}
