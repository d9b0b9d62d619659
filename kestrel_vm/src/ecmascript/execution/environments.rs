// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.1 Environment Records](https://tc39.es/ecma262/#sec-environment-records)
//!
//! Environment Records define the association of identifiers to variables
//! and functions based on the lexical nesting structure of the code. Every
//! record has an \[\[OuterEnv]] field forming a chain terminated by null.

pub mod declarative_environment;
pub mod function_environment;
pub mod global_environment;
pub mod module_environment;
pub mod object_environment;
pub mod private_environment;

pub(crate) use declarative_environment::{Binding, DeclarativeEnvironmentRecord};
pub(crate) use function_environment::{
    get_this_environment, new_function_environment, FunctionEnvironmentRecord, ThisBindingStatus,
};
pub(crate) use global_environment::{new_global_environment, GlobalEnvironmentRecord};
pub(crate) use module_environment::ModuleEnvironmentRecord;
pub(crate) use object_environment::ObjectEnvironmentRecord;
pub(crate) use private_environment::{
    new_private_environment, resolve_private_identifier, PrivateEnvironmentRecord,
};

use super::agent::ExceptionType;
use super::{Agent, JsResult};
use crate::ecmascript::types::{
    Base, Object, PropertyKey, Reference, ReferencedName, String, Value,
};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub(crate) type DeclarativeEnvironmentIndex = BaseIndex<DeclarativeEnvironmentRecord>;
pub(crate) type FunctionEnvironmentIndex = BaseIndex<FunctionEnvironmentRecord>;
pub(crate) type GlobalEnvironmentIndex = BaseIndex<GlobalEnvironmentRecord>;
pub(crate) type ModuleEnvironmentIndex = BaseIndex<ModuleEnvironmentRecord>;
pub(crate) type ObjectEnvironmentIndex = BaseIndex<ObjectEnvironmentRecord>;
pub(crate) type PrivateEnvironmentIndex = BaseIndex<PrivateEnvironmentRecord>;

/// ### [\[\[OuterEnv]]](https://tc39.es/ecma262/#sec-environment-records)
pub(crate) type OuterEnv = Option<EnvironmentIndex>;

/// Heap storage for every environment record kind.
#[derive(Debug, Default)]
pub struct Environments {
    declarative: Vec<Option<DeclarativeEnvironmentRecord>>,
    function: Vec<Option<FunctionEnvironmentRecord>>,
    global: Vec<Option<GlobalEnvironmentRecord>>,
    module: Vec<Option<ModuleEnvironmentRecord>>,
    object: Vec<Option<ObjectEnvironmentRecord>>,
    private: Vec<Option<PrivateEnvironmentRecord>>,
}

macro_rules! environment_accessors {
    ($field: ident, $record: ty, $index: ty, $get: ident, $get_mut: ident, $push: ident) => {
        impl Environments {
            pub(crate) fn $get(&self, index: $index) -> &$record {
                self.$field
                    .get(index.into_index())
                    .expect("environment index out of bounds")
                    .as_ref()
                    .expect("environment slot empty")
            }

            pub(crate) fn $get_mut(&mut self, index: $index) -> &mut $record {
                self.$field
                    .get_mut(index.into_index())
                    .expect("environment index out of bounds")
                    .as_mut()
                    .expect("environment slot empty")
            }

            pub(crate) fn $push(&mut self, record: $record) -> $index {
                self.$field.push(Some(record));
                <$index>::last(&self.$field)
            }
        }
    };
}

environment_accessors!(
    declarative,
    DeclarativeEnvironmentRecord,
    DeclarativeEnvironmentIndex,
    get_declarative_environment,
    get_declarative_environment_mut,
    push_declarative_environment
);
environment_accessors!(
    function,
    FunctionEnvironmentRecord,
    FunctionEnvironmentIndex,
    get_function_environment,
    get_function_environment_mut,
    push_function_environment
);
environment_accessors!(
    global,
    GlobalEnvironmentRecord,
    GlobalEnvironmentIndex,
    get_global_environment,
    get_global_environment_mut,
    push_global_environment
);
environment_accessors!(
    module,
    ModuleEnvironmentRecord,
    ModuleEnvironmentIndex,
    get_module_environment,
    get_module_environment_mut,
    push_module_environment
);
environment_accessors!(
    object,
    ObjectEnvironmentRecord,
    ObjectEnvironmentIndex,
    get_object_environment,
    get_object_environment_mut,
    push_object_environment
);
environment_accessors!(
    private,
    PrivateEnvironmentRecord,
    PrivateEnvironmentIndex,
    get_private_environment,
    get_private_environment_mut,
    push_private_environment
);

/// A tagged reference to an environment record of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentIndex {
    Declarative(DeclarativeEnvironmentIndex),
    Function(FunctionEnvironmentIndex),
    Global(GlobalEnvironmentIndex),
    Module(ModuleEnvironmentIndex),
    Object(ObjectEnvironmentIndex),
}

/// ### [9.1.2.2 NewDeclarativeEnvironment ( E )](https://tc39.es/ecma262/#sec-newdeclarativeenvironment)
pub(crate) fn new_declarative_environment(
    agent: &mut Agent,
    outer_env: OuterEnv,
) -> DeclarativeEnvironmentIndex {
    agent
        .heap
        .environments
        .push_declarative_environment(DeclarativeEnvironmentRecord::new(outer_env))
}

/// ### [9.1.2.3 NewObjectEnvironment ( O, W, E )](https://tc39.es/ecma262/#sec-newobjectenvironment)
pub(crate) fn new_object_environment(
    agent: &mut Agent,
    binding_object: Object,
    is_with_environment: bool,
    outer_env: OuterEnv,
) -> ObjectEnvironmentIndex {
    agent
        .heap
        .environments
        .push_object_environment(ObjectEnvironmentRecord::new(
            binding_object,
            is_with_environment,
            outer_env,
        ))
}

/// ### [9.1.2.6 NewModuleEnvironment ( E )](https://tc39.es/ecma262/#sec-newmoduleenvironment)
pub(crate) fn new_module_environment(
    agent: &mut Agent,
    outer_env: OuterEnv,
) -> ModuleEnvironmentIndex {
    agent
        .heap
        .environments
        .push_module_environment(ModuleEnvironmentRecord::new(outer_env))
}

/// GetBindingValue for declarative-style bindings, shared between the
/// declarative, function and module record kinds.
pub(crate) fn declarative_binding_value(
    agent: &mut Agent,
    binding: Option<Binding>,
    name: String,
) -> JsResult<Value> {
    // 1. Assert: envRec has a binding for N.
    let binding = binding.expect("binding must exist");
    // 2. If the binding for N in envRec is an uninitialized binding, throw a
    //    ReferenceError exception.
    let Some(value) = binding.value else {
        let name = name.to_string_lossy(agent).into_owned();
        return Err(agent.throw_exception(
            ExceptionType::ReferenceError,
            format!("Cannot access '{}' before initialization", name),
        ));
    };
    // 3. Return the value currently bound to N in envRec.
    Ok(value)
}

/// SetMutableBinding for declarative-style bindings.
fn declarative_set_mutable_binding(
    agent: &mut Agent,
    env: EnvironmentIndex,
    name: String,
    value: Value,
    mut is_strict: bool,
) -> JsResult<()> {
    let binding = env.direct_binding(agent, name);
    let Some(binding) = binding else {
        // 1. If envRec does not have a binding for N, then
        // a. If S is true, throw a ReferenceError exception.
        if is_strict {
            let name = name.to_string_lossy(agent).into_owned();
            return Err(agent.throw_exception(
                ExceptionType::ReferenceError,
                format!("{} is not defined", name),
            ));
        }
        // b. Perform ! envRec.CreateMutableBinding(N, true).
        // c. Perform ! envRec.InitializeBinding(N, V).
        env.direct_record_mut(agent).create_mutable_binding(name, true);
        env.direct_record_mut(agent).initialize_binding(name, value);
        // d. Return unused.
        return Ok(());
    };
    // 2. If the binding for N in envRec is a strict binding, set S to true.
    if binding.is_strict() {
        is_strict = true;
    }
    // 3. If the binding for N in envRec has not yet been initialized, throw a
    //    ReferenceError exception.
    if !binding.is_initialized() {
        let name = name.to_string_lossy(agent).into_owned();
        return Err(agent.throw_exception(
            ExceptionType::ReferenceError,
            format!("Cannot access '{}' before initialization", name),
        ));
    }
    // 4. Else if the binding for N in envRec is a mutable binding, change its
    //    bound value to V.
    if binding.is_mutable() {
        env.direct_record_mut(agent).set_binding_value(name, value);
        return Ok(());
    }
    // 5. Else: this is an attempt to change the value of an immutable
    //    binding. If S is true, throw a TypeError exception.
    if is_strict {
        let name = name.to_string_lossy(agent).into_owned();
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("Cannot assign to constant '{}'", name),
        ));
    }
    Ok(())
}

impl EnvironmentIndex {
    /// Direct access to the declarative record embedded in declarative-style
    /// environment kinds. Global environments redirect to their
    /// \[\[DeclarativeRecord]].
    fn direct_record_mut<'a>(self, agent: &'a mut Agent) -> &'a mut DeclarativeEnvironmentRecord {
        match self {
            EnvironmentIndex::Declarative(index) => {
                agent.heap.environments.get_declarative_environment_mut(index)
            }
            EnvironmentIndex::Function(index) => {
                &mut agent
                    .heap
                    .environments
                    .get_function_environment_mut(index)
                    .declarative
            }
            EnvironmentIndex::Module(index) => {
                &mut agent
                    .heap
                    .environments
                    .get_module_environment_mut(index)
                    .declarative
            }
            EnvironmentIndex::Global(index) => {
                let declarative_record = agent
                    .heap
                    .environments
                    .get_global_environment(index)
                    .declarative_record;
                agent
                    .heap
                    .environments
                    .get_declarative_environment_mut(declarative_record)
            }
            EnvironmentIndex::Object(_) => {
                unreachable!("object environments have no declarative record")
            }
        }
    }

    fn direct_binding(self, agent: &Agent, name: String) -> Option<Binding> {
        match self {
            EnvironmentIndex::Declarative(index) => agent
                .heap
                .environments
                .get_declarative_environment(index)
                .get_binding(name),
            EnvironmentIndex::Function(index) => agent
                .heap
                .environments
                .get_function_environment(index)
                .declarative
                .get_binding(name),
            EnvironmentIndex::Module(index) => agent
                .heap
                .environments
                .get_module_environment(index)
                .declarative
                .get_binding(name),
            EnvironmentIndex::Global(index) => {
                let declarative_record = agent
                    .heap
                    .environments
                    .get_global_environment(index)
                    .declarative_record;
                agent
                    .heap
                    .environments
                    .get_declarative_environment(declarative_record)
                    .get_binding(name)
            }
            EnvironmentIndex::Object(_) => None,
        }
    }

    pub(crate) fn get_outer_env(self, agent: &Agent) -> OuterEnv {
        match self {
            EnvironmentIndex::Declarative(index) => {
                agent
                    .heap
                    .environments
                    .get_declarative_environment(index)
                    .outer_env
            }
            EnvironmentIndex::Function(index) => {
                agent
                    .heap
                    .environments
                    .get_function_environment(index)
                    .declarative
                    .outer_env
            }
            EnvironmentIndex::Module(index) => {
                agent
                    .heap
                    .environments
                    .get_module_environment(index)
                    .declarative
                    .outer_env
            }
            EnvironmentIndex::Global(_) => None,
            EnvironmentIndex::Object(index) => {
                agent
                    .heap
                    .environments
                    .get_object_environment(index)
                    .outer_env
            }
        }
    }

    /// HasBinding ( N )
    pub(crate) fn has_binding(self, agent: &mut Agent, name: String) -> JsResult<bool> {
        match self {
            EnvironmentIndex::Declarative(_)
            | EnvironmentIndex::Function(_) => Ok(self.direct_binding(agent, name).is_some()),
            EnvironmentIndex::Module(index) => Ok(index.has_direct_binding(agent, name)),
            EnvironmentIndex::Global(index) => index.has_binding(agent, name),
            EnvironmentIndex::Object(index) => index.has_binding(agent, name),
        }
    }

    /// CreateMutableBinding ( N, D )
    pub(crate) fn create_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        is_deletable: bool,
    ) -> JsResult<()> {
        match self {
            EnvironmentIndex::Declarative(_)
            | EnvironmentIndex::Function(_)
            | EnvironmentIndex::Module(_) => {
                self.direct_record_mut(agent)
                    .create_mutable_binding(name, is_deletable);
                Ok(())
            }
            EnvironmentIndex::Global(index) => {
                index.create_mutable_binding(agent, name, is_deletable)
            }
            EnvironmentIndex::Object(index) => {
                index.create_mutable_binding(agent, name, is_deletable)
            }
        }
    }

    /// CreateImmutableBinding ( N, S )
    pub(crate) fn create_immutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        is_strict: bool,
    ) -> JsResult<()> {
        match self {
            EnvironmentIndex::Declarative(_)
            | EnvironmentIndex::Function(_)
            | EnvironmentIndex::Module(_) => {
                self.direct_record_mut(agent)
                    .create_immutable_binding(name, is_strict);
                Ok(())
            }
            EnvironmentIndex::Global(index) => {
                index.create_immutable_binding(agent, name, is_strict)
            }
            EnvironmentIndex::Object(_) => {
                unreachable!("object environments never receive immutable bindings")
            }
        }
    }

    /// InitializeBinding ( N, V )
    pub(crate) fn initialize_binding(
        self,
        agent: &mut Agent,
        name: String,
        value: Value,
    ) -> JsResult<()> {
        match self {
            EnvironmentIndex::Declarative(_)
            | EnvironmentIndex::Function(_)
            | EnvironmentIndex::Module(_) => {
                self.direct_record_mut(agent).initialize_binding(name, value);
                Ok(())
            }
            EnvironmentIndex::Global(index) => {
                // 1. Let DclRec be envRec.[[DeclarativeRecord]].
                // 2. If ! DclRec.HasBinding(N) is true, return
                //    ! DclRec.InitializeBinding(N, V).
                if self.direct_binding(agent, name).is_some() {
                    self.direct_record_mut(agent).initialize_binding(name, value);
                    Ok(())
                } else {
                    // 3. Return ? ObjRec.InitializeBinding(N, V).
                    index.object_record(agent).initialize_binding(agent, name, value)
                }
            }
            EnvironmentIndex::Object(index) => index.initialize_binding(agent, name, value),
        }
    }

    /// SetMutableBinding ( N, V, S )
    pub(crate) fn set_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        value: Value,
        is_strict: bool,
    ) -> JsResult<()> {
        match self {
            EnvironmentIndex::Declarative(_)
            | EnvironmentIndex::Function(_)
            | EnvironmentIndex::Module(_) => {
                declarative_set_mutable_binding(agent, self, name, value, is_strict)
            }
            EnvironmentIndex::Global(index) => {
                // 1. Let DclRec be envRec.[[DeclarativeRecord]].
                // 2. If ! DclRec.HasBinding(N) is true, return
                //    ? DclRec.SetMutableBinding(N, V, S).
                if self.direct_binding(agent, name).is_some() {
                    declarative_set_mutable_binding(agent, self, name, value, is_strict)
                } else {
                    // 3. Return ? ObjRec.SetMutableBinding(N, V, S).
                    index
                        .object_record(agent)
                        .set_mutable_binding(agent, name, value, is_strict)
                }
            }
            EnvironmentIndex::Object(index) => {
                index.set_mutable_binding(agent, name, value, is_strict)
            }
        }
    }

    /// GetBindingValue ( N, S )
    pub(crate) fn get_binding_value(
        self,
        agent: &mut Agent,
        name: String,
        is_strict: bool,
    ) -> JsResult<Value> {
        match self {
            EnvironmentIndex::Declarative(_) | EnvironmentIndex::Function(_) => {
                let binding = self.direct_binding(agent, name);
                declarative_binding_value(agent, binding, name)
            }
            EnvironmentIndex::Module(index) => index.get_binding_value(agent, name),
            EnvironmentIndex::Global(index) => {
                // 1. Let DclRec be envRec.[[DeclarativeRecord]].
                // 2. If ! DclRec.HasBinding(N) is true, return
                //    ? DclRec.GetBindingValue(N, S).
                if let Some(binding) = self.direct_binding(agent, name) {
                    declarative_binding_value(agent, Some(binding), name)
                } else {
                    // 3. Return ? ObjRec.GetBindingValue(N, S).
                    index
                        .object_record(agent)
                        .get_binding_value(agent, name, is_strict)
                }
            }
            EnvironmentIndex::Object(index) => index.get_binding_value(agent, name, is_strict),
        }
    }

    /// DeleteBinding ( N )
    pub(crate) fn delete_binding(self, agent: &mut Agent, name: String) -> JsResult<bool> {
        match self {
            EnvironmentIndex::Declarative(_)
            | EnvironmentIndex::Function(_)
            | EnvironmentIndex::Module(_) => Ok(self.direct_record_mut(agent).delete_binding(name)),
            EnvironmentIndex::Global(index) => {
                // 2. If ! DclRec.HasBinding(N) is true, return
                //    ! DclRec.DeleteBinding(N).
                if self.direct_binding(agent, name).is_some() {
                    return Ok(self.direct_record_mut(agent).delete_binding(name));
                }
                // 4. Let globalObject be ObjRec.[[BindingObject]].
                // 5. Let existingProp be ? HasOwnProperty(globalObject, N).
                let object_record = index.object_record(agent);
                // 6. If existingProp is true, then
                //    a. Let status be ? ObjRec.DeleteBinding(N).
                //    b. If status is true and envRec.[[VarNames]] contains N,
                //       remove N from envRec.[[VarNames]].
                let status = object_record.delete_binding(agent, name)?;
                if status {
                    agent
                        .heap
                        .environments
                        .get_global_environment_mut(index)
                        .var_names
                        .remove(&name);
                }
                Ok(status)
            }
            EnvironmentIndex::Object(index) => index.delete_binding(agent, name),
        }
    }

    /// HasThisBinding ( )
    pub(crate) fn has_this_binding(self, agent: &Agent) -> bool {
        match self {
            EnvironmentIndex::Declarative(_) | EnvironmentIndex::Object(_) => false,
            EnvironmentIndex::Function(index) => index.has_this_binding(agent),
            // Module Environment Records and Global Environment Records
            // always have a this binding.
            EnvironmentIndex::Module(_) | EnvironmentIndex::Global(_) => true,
        }
    }

    /// HasSuperBinding ( )
    pub(crate) fn has_super_binding(self, agent: &Agent) -> bool {
        match self {
            EnvironmentIndex::Function(index) => index.has_super_binding(agent),
            _ => false,
        }
    }

    /// WithBaseObject ( )
    pub(crate) fn with_base_object(self, agent: &Agent) -> Option<Object> {
        match self {
            EnvironmentIndex::Object(index) => {
                let env_rec = agent.heap.environments.get_object_environment(index);
                // 1. If envRec.[[IsWithEnvironment]] is true, return
                //    envRec.[[BindingObject]].
                if env_rec.is_with_environment {
                    Some(env_rec.binding_object)
                } else {
                    None
                }
            }
            // 2. Otherwise, return undefined.
            _ => None,
        }
    }

    /// GetThisBinding ( )
    pub(crate) fn get_this_binding(self, agent: &mut Agent) -> JsResult<Value> {
        match self {
            EnvironmentIndex::Function(index) => index.get_this_binding(agent),
            EnvironmentIndex::Global(index) => Ok(index.get_this_binding(agent).into()),
            // In a module this is always undefined.
            EnvironmentIndex::Module(_) => Ok(Value::Undefined),
            EnvironmentIndex::Declarative(_) | EnvironmentIndex::Object(_) => {
                unreachable!("environment kind has no this binding")
            }
        }
    }
}

/// ### [9.1.2.1 GetIdentifierReference ( env, name, strict )](https://tc39.es/ecma262/#sec-getidentifierreference)
pub(crate) fn get_identifier_reference(
    agent: &mut Agent,
    env: Option<EnvironmentIndex>,
    name: String,
    strict: bool,
) -> JsResult<Reference> {
    // 1. If env is null, then
    let Some(env) = env else {
        // a. Return the Reference Record { [[Base]]: UNRESOLVABLE,
        //    [[ReferencedName]]: name, [[Strict]]: strict,
        //    [[ThisValue]]: EMPTY }.
        return Ok(Reference {
            base: Base::Unresolvable,
            referenced_name: ReferencedName::PropertyKey(PropertyKey::String(name)),
            strict,
            this_value: None,
        });
    };
    // 2. Let exists be ? env.HasBinding(name).
    let exists = env.has_binding(agent, name)?;
    // 3. If exists is true, then
    if exists {
        // a. Return the Reference Record { [[Base]]: env,
        //    [[ReferencedName]]: name, [[Strict]]: strict,
        //    [[ThisValue]]: EMPTY }.
        Ok(Reference {
            base: Base::Environment(env),
            referenced_name: ReferencedName::PropertyKey(PropertyKey::String(name)),
            strict,
            this_value: None,
        })
    } else {
        // 4. Else,
        // a. Let outer be env.[[OuterEnv]].
        let outer = env.get_outer_env(agent);
        // b. Return ? GetIdentifierReference(outer, name, strict).
        get_identifier_reference(agent, outer, name, strict)
    }
}

impl HeapMark for EnvironmentIndex {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            EnvironmentIndex::Declarative(index) => queues.declarative_environments.push(*index),
            EnvironmentIndex::Function(index) => queues.function_environments.push(*index),
            EnvironmentIndex::Global(index) => queues.global_environments.push(*index),
            EnvironmentIndex::Module(index) => queues.module_environments.push(*index),
            EnvironmentIndex::Object(index) => queues.object_environments.push(*index),
        }
    }
}

impl HeapMark for PrivateEnvironmentIndex {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.private_environments.push(*self);
    }
}
