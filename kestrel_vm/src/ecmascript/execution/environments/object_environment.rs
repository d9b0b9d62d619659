// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ObjectEnvironmentIndex, OuterEnv};
use crate::ecmascript::abstract_operations::operations_on_objects::{
    define_property_or_throw, get, has_property, set,
};
use crate::ecmascript::abstract_operations::type_conversion::to_boolean;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{
    InternalMethods, Object, PropertyDescriptor, PropertyKey, String, Value,
};
use crate::heap::mark::{HeapMark, WorkQueues};
use crate::heap::WellKnownSymbolIndexes;

/// ### [9.1.1.2 Object Environment Records](https://tc39.es/ecma262/#sec-object-environment-records)
///
/// Each Object Environment Record is associated with an object called its
/// binding object: string identifier names are bound to properties of that
/// object.
#[derive(Debug, Clone)]
pub struct ObjectEnvironmentRecord {
    /// ### \[\[BindingObject]]
    pub(crate) binding_object: Object,

    /// ### \[\[IsWithEnvironment]]
    pub(super) is_with_environment: bool,

    /// ### \[\[OuterEnv]]
    pub(super) outer_env: OuterEnv,
}

impl ObjectEnvironmentRecord {
    /// ### [9.1.2.3 NewObjectEnvironment ( O, W, E )](https://tc39.es/ecma262/#sec-newobjectenvironment)
    pub(crate) fn new(binding_object: Object, is_with_environment: bool, outer_env: OuterEnv) -> Self {
        // 1. Let env be a new Object Environment Record.
        ObjectEnvironmentRecord {
            // 2. Set env.[[BindingObject]] to O.
            binding_object,
            // 3. Set env.[[IsWithEnvironment]] to W.
            is_with_environment,
            // 4. Set env.[[OuterEnv]] to E.
            outer_env,
        }
    }
}

impl ObjectEnvironmentIndex {
    /// ### [9.1.1.2.1 HasBinding ( N )](https://tc39.es/ecma262/#sec-object-environment-records-hasbinding-n)
    pub(crate) fn has_binding(self, agent: &mut Agent, name: String) -> JsResult<bool> {
        let env_rec = agent.heap.environments.get_object_environment(self);
        // 1. Let bindingObject be envRec.[[BindingObject]].
        let binding_object = env_rec.binding_object;
        let is_with_environment = env_rec.is_with_environment;
        let name_key = PropertyKey::from_js_string(agent, name);
        // 2. Let foundBinding be ? HasProperty(bindingObject, N).
        let found_binding = has_property(agent, binding_object, name_key)?;
        // 3. If foundBinding is false, return false.
        if !found_binding {
            return Ok(false);
        }
        // 4. If envRec.[[IsWithEnvironment]] is false, return true.
        if !is_with_environment {
            return Ok(true);
        }
        // 5. Let unscopables be ? Get(bindingObject, @@unscopables).
        let unscopables = get(
            agent,
            binding_object,
            PropertyKey::Symbol(WellKnownSymbolIndexes::Unscopables.into()),
        )?;
        // 6. If unscopables is an Object, then
        if let Ok(unscopables) = Object::try_from(unscopables) {
            // a. Let blocked be ToBoolean(? Get(unscopables, N)).
            let blocked = get(agent, unscopables, name_key)?;
            // b. If blocked is true, return false.
            if to_boolean(agent, blocked) {
                return Ok(false);
            }
        }
        // 7. Return true.
        Ok(true)
    }

    /// ### [9.1.1.2.2 CreateMutableBinding ( N, D )](https://tc39.es/ecma262/#sec-object-environment-records-createmutablebinding-n-d)
    pub(crate) fn create_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        is_deletable: bool,
    ) -> JsResult<()> {
        let binding_object = agent
            .heap
            .environments
            .get_object_environment(self)
            .binding_object;
        let name_key = PropertyKey::from_js_string(agent, name);
        // 2. Perform ? DefinePropertyOrThrow(bindingObject, N,
        //    PropertyDescriptor { [[Value]]: undefined, [[Writable]]: true,
        //    [[Enumerable]]: true, [[Configurable]]: D }).
        define_property_or_throw(
            agent,
            binding_object,
            name_key,
            PropertyDescriptor {
                value: Some(Value::Undefined),
                writable: Some(true),
                enumerable: Some(true),
                configurable: Some(is_deletable),
                ..Default::default()
            },
        )?;
        // 3. Return unused.
        Ok(())
    }

    /// ### [9.1.1.2.4 InitializeBinding ( N, V )](https://tc39.es/ecma262/#sec-object-environment-records-initializebinding-n-v)
    pub(crate) fn initialize_binding(
        self,
        agent: &mut Agent,
        name: String,
        value: Value,
    ) -> JsResult<()> {
        // 1. Perform ? envRec.SetMutableBinding(N, V, false).
        // 2. Return unused.
        self.set_mutable_binding(agent, name, value, false)
    }

    /// ### [9.1.1.2.5 SetMutableBinding ( N, V, S )](https://tc39.es/ecma262/#sec-object-environment-records-setmutablebinding-n-v-s)
    pub(crate) fn set_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        value: Value,
        is_strict: bool,
    ) -> JsResult<()> {
        let binding_object = agent
            .heap
            .environments
            .get_object_environment(self)
            .binding_object;
        let name_key = PropertyKey::from_js_string(agent, name);
        // 1. Let bindingObject be envRec.[[BindingObject]].
        // 2. Let stillExists be ? HasProperty(bindingObject, N).
        let still_exists = has_property(agent, binding_object, name_key)?;
        // 3. If stillExists is false and S is true, throw a ReferenceError
        //    exception.
        if !still_exists && is_strict {
            let name = name.to_string_lossy(agent).into_owned();
            return Err(agent.throw_exception(
                ExceptionType::ReferenceError,
                format!("{} is not defined", name),
            ));
        }
        // 4. Perform ? Set(bindingObject, N, V, S).
        set(agent, binding_object, name_key, value, is_strict)?;
        // 5. Return unused.
        Ok(())
    }

    /// ### [9.1.1.2.6 GetBindingValue ( N, S )](https://tc39.es/ecma262/#sec-object-environment-records-getbindingvalue-n-s)
    pub(crate) fn get_binding_value(
        self,
        agent: &mut Agent,
        name: String,
        is_strict: bool,
    ) -> JsResult<Value> {
        let binding_object = agent
            .heap
            .environments
            .get_object_environment(self)
            .binding_object;
        let name_key = PropertyKey::from_js_string(agent, name);
        // 1. Let bindingObject be envRec.[[BindingObject]].
        // 2. Let value be ? HasProperty(bindingObject, N).
        let value = has_property(agent, binding_object, name_key)?;
        // 3. If value is false, then
        if !value {
            // a. If S is false, return undefined; otherwise throw a
            //    ReferenceError exception.
            if !is_strict {
                return Ok(Value::Undefined);
            }
            let name = name.to_string_lossy(agent).into_owned();
            return Err(agent.throw_exception(
                ExceptionType::ReferenceError,
                format!("{} is not defined", name),
            ));
        }
        // 4. Return ? Get(bindingObject, N).
        get(agent, binding_object, name_key)
    }

    /// ### [9.1.1.2.7 DeleteBinding ( N )](https://tc39.es/ecma262/#sec-object-environment-records-deletebinding-n)
    pub(crate) fn delete_binding(self, agent: &mut Agent, name: String) -> JsResult<bool> {
        let binding_object = agent
            .heap
            .environments
            .get_object_environment(self)
            .binding_object;
        let name_key = PropertyKey::from_js_string(agent, name);
        // 2. Return ? bindingObject.[[Delete]](N).
        binding_object.internal_delete(agent, name_key)
    }
}

impl HeapMark for ObjectEnvironmentRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.binding_object.mark_values(queues);
        self.outer_env.mark_values(queues);
    }
}
