// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ahash::AHashSet;

use super::{
    DeclarativeEnvironmentIndex, GlobalEnvironmentIndex, ObjectEnvironmentIndex,
    ObjectEnvironmentRecord,
};
use crate::ecmascript::abstract_operations::operations_on_objects::{
    define_property_or_throw, has_own_property, set,
};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, Object, PropertyDescriptor, PropertyKey, String, Value,
};
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [9.1.1.4 Global Environment Records](https://tc39.es/ecma262/#sec-global-environment-records)
///
/// The outermost scope shared by all Script elements processed in a realm: a
/// composite of an Object Environment Record over the global object and a
/// Declarative Environment Record for lexical declarations, plus the set of
/// var-declared names.
#[derive(Debug)]
pub struct GlobalEnvironmentRecord {
    /// ### \[\[ObjectRecord]]
    pub(super) object_record: ObjectEnvironmentIndex,

    /// ### \[\[GlobalThisValue]]
    pub(crate) global_this_value: Object,

    /// ### \[\[DeclarativeRecord]]
    pub(super) declarative_record: DeclarativeEnvironmentIndex,

    /// ### \[\[VarNames]]
    pub(super) var_names: AHashSet<String>,
}

/// ### [9.1.2.5 NewGlobalEnvironment ( G, thisValue )](https://tc39.es/ecma262/#sec-newglobalenvironment)
pub(crate) fn new_global_environment(
    agent: &mut Agent,
    global: Object,
    this_value: Object,
) -> GlobalEnvironmentIndex {
    // 1. Let objRec be NewObjectEnvironment(G, false, null).
    let object_record = agent
        .heap
        .environments
        .push_object_environment(ObjectEnvironmentRecord::new(global, false, None));
    // 2. Let dclRec be NewDeclarativeEnvironment(null).
    let declarative_record = agent.heap.environments.push_declarative_environment(
        super::DeclarativeEnvironmentRecord::new(None),
    );
    // 3. Let env be a new Global Environment Record.
    let env = GlobalEnvironmentRecord {
        // 4. Set env.[[ObjectRecord]] to objRec.
        object_record,
        // 5. Set env.[[GlobalThisValue]] to thisValue.
        global_this_value: this_value,
        // 6. Set env.[[DeclarativeRecord]] to dclRec.
        declarative_record,
        // 7. Set env.[[VarNames]] to a new empty List.
        var_names: AHashSet::default(),
        // 8. Set env.[[OuterEnv]] to null. (Implicit: global environments
        //    expose no outer environment.)
    };
    // 9. Return env.
    agent.heap.environments.push_global_environment(env)
}

impl GlobalEnvironmentIndex {
    pub(super) fn object_record(self, agent: &Agent) -> ObjectEnvironmentIndex {
        agent
            .heap
            .environments
            .get_global_environment(self)
            .object_record
    }

    pub(super) fn declarative_record(self, agent: &Agent) -> DeclarativeEnvironmentIndex {
        agent
            .heap
            .environments
            .get_global_environment(self)
            .declarative_record
    }

    fn global_object(self, agent: &Agent) -> Object {
        let object_record = self.object_record(agent);
        agent
            .heap
            .environments
            .get_object_environment(object_record)
            .binding_object
    }

    /// ### [9.1.1.4.1 HasBinding ( N )](https://tc39.es/ecma262/#sec-global-environment-records-hasbinding-n)
    pub(crate) fn has_binding(self, agent: &mut Agent, name: String) -> JsResult<bool> {
        // 1. Let DclRec be envRec.[[DeclarativeRecord]].
        let dcl_rec = self.declarative_record(agent);
        // 2. If ! DclRec.HasBinding(N) is true, return true.
        if agent
            .heap
            .environments
            .get_declarative_environment(dcl_rec)
            .has_binding(name)
        {
            return Ok(true);
        }
        // 3. Let ObjRec be envRec.[[ObjectRecord]].
        // 4. Return ? ObjRec.HasBinding(N).
        self.object_record(agent).has_binding(agent, name)
    }

    /// ### [9.1.1.4.2 CreateMutableBinding ( N, D )](https://tc39.es/ecma262/#sec-global-environment-records-createmutablebinding-n-d)
    pub(crate) fn create_mutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        is_deletable: bool,
    ) -> JsResult<()> {
        let dcl_rec = self.declarative_record(agent);
        // 2. If ! DclRec.HasBinding(N) is true, throw a TypeError exception.
        if agent
            .heap
            .environments
            .get_declarative_environment(dcl_rec)
            .has_binding(name)
        {
            let name = name.to_string_lossy(agent).into_owned();
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                format!("Identifier '{}' has already been declared", name),
            ));
        }
        // 3. Return ! DclRec.CreateMutableBinding(N, D).
        agent
            .heap
            .environments
            .get_declarative_environment_mut(dcl_rec)
            .create_mutable_binding(name, is_deletable);
        Ok(())
    }

    /// ### [9.1.1.4.3 CreateImmutableBinding ( N, S )](https://tc39.es/ecma262/#sec-global-environment-records-createimmutablebinding-n-s)
    pub(crate) fn create_immutable_binding(
        self,
        agent: &mut Agent,
        name: String,
        is_strict: bool,
    ) -> JsResult<()> {
        let dcl_rec = self.declarative_record(agent);
        if agent
            .heap
            .environments
            .get_declarative_environment(dcl_rec)
            .has_binding(name)
        {
            let name = name.to_string_lossy(agent).into_owned();
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                format!("Identifier '{}' has already been declared", name),
            ));
        }
        agent
            .heap
            .environments
            .get_declarative_environment_mut(dcl_rec)
            .create_immutable_binding(name, is_strict);
        Ok(())
    }

    /// ### [9.1.1.4.12 HasVarDeclaration ( N )](https://tc39.es/ecma262/#sec-hasvardeclaration)
    pub(crate) fn has_var_declaration(self, agent: &Agent, name: String) -> bool {
        // 1. If envRec.[[VarNames]] contains N, return true; otherwise return
        //    false.
        agent
            .heap
            .environments
            .get_global_environment(self)
            .var_names
            .contains(&name)
    }

    /// ### [9.1.1.4.13 HasLexicalDeclaration ( N )](https://tc39.es/ecma262/#sec-haslexicaldeclaration)
    pub(crate) fn has_lexical_declaration(self, agent: &Agent, name: String) -> bool {
        // 1. Let DclRec be envRec.[[DeclarativeRecord]].
        // 2. Return ! DclRec.HasBinding(N).
        let dcl_rec = self.declarative_record(agent);
        agent
            .heap
            .environments
            .get_declarative_environment(dcl_rec)
            .has_binding(name)
    }

    /// ### [9.1.1.4.14 HasRestrictedGlobalProperty ( N )](https://tc39.es/ecma262/#sec-hasrestrictedglobalproperty)
    pub(crate) fn has_restricted_global_property(
        self,
        agent: &mut Agent,
        name: String,
    ) -> JsResult<bool> {
        // 1. Let ObjRec be envRec.[[ObjectRecord]].
        // 2. Let globalObject be ObjRec.[[BindingObject]].
        let global_object = self.global_object(agent);
        let name_key = PropertyKey::from_js_string(agent, name);
        // 3. Let existingProp be ? globalObject.[[GetOwnProperty]](N).
        let existing_prop = global_object.internal_get_own_property(agent, name_key)?;
        // 4. If existingProp is undefined, return false.
        let Some(existing_prop) = existing_prop else {
            return Ok(false);
        };
        // 5. If existingProp.[[Configurable]] is true, return false.
        // 6. Return true.
        Ok(existing_prop.configurable != Some(true))
    }

    /// ### [9.1.1.4.15 CanDeclareGlobalVar ( N )](https://tc39.es/ecma262/#sec-candeclareglobalvar)
    pub(crate) fn can_declare_global_var(self, agent: &mut Agent, name: String) -> JsResult<bool> {
        let global_object = self.global_object(agent);
        let name_key = PropertyKey::from_js_string(agent, name);
        // 3. Let hasProperty be ? HasOwnProperty(globalObject, N).
        if has_own_property(agent, global_object, name_key)? {
            // 4. If hasProperty is true, return true.
            return Ok(true);
        }
        // 5. Return ? IsExtensible(globalObject).
        global_object.internal_is_extensible(agent)
    }

    /// ### [9.1.1.4.16 CanDeclareGlobalFunction ( N )](https://tc39.es/ecma262/#sec-candeclareglobalfunction)
    pub(crate) fn can_declare_global_function(
        self,
        agent: &mut Agent,
        name: String,
    ) -> JsResult<bool> {
        let global_object = self.global_object(agent);
        let name_key = PropertyKey::from_js_string(agent, name);
        // 3. Let existingProp be ? globalObject.[[GetOwnProperty]](N).
        let existing_prop = global_object.internal_get_own_property(agent, name_key)?;
        // 4. If existingProp is undefined, return ? IsExtensible(globalObject).
        let Some(existing_prop) = existing_prop else {
            return global_object.internal_is_extensible(agent);
        };
        // 5. If existingProp.[[Configurable]] is true, return true.
        if existing_prop.configurable == Some(true) {
            return Ok(true);
        }
        // 6. If IsDataDescriptor(existingProp) is true and existingProp has
        //    attribute values { [[Writable]]: true, [[Enumerable]]: true },
        //    return true.
        if existing_prop.is_data_descriptor()
            && existing_prop.writable == Some(true)
            && existing_prop.enumerable == Some(true)
        {
            return Ok(true);
        }
        // 7. Return false.
        Ok(false)
    }

    /// ### [9.1.1.4.17 CreateGlobalVarBinding ( N, D )](https://tc39.es/ecma262/#sec-createglobalvarbinding)
    pub(crate) fn create_global_var_binding(
        self,
        agent: &mut Agent,
        name: String,
        is_deletable: bool,
    ) -> JsResult<()> {
        let global_object = self.global_object(agent);
        let name_key = PropertyKey::from_js_string(agent, name);
        // 3. Let hasProperty be ? HasOwnProperty(globalObject, N).
        let has_property = has_own_property(agent, global_object, name_key)?;
        // 4. Let extensible be ? IsExtensible(globalObject).
        let extensible = global_object.internal_is_extensible(agent)?;
        // 5. If hasProperty is false and extensible is true, then
        if !has_property && extensible {
            // a. Perform ? ObjRec.CreateMutableBinding(N, D).
            self.object_record(agent)
                .create_mutable_binding(agent, name, is_deletable)?;
            // b. Perform ? ObjRec.InitializeBinding(N, undefined).
            self.object_record(agent)
                .initialize_binding(agent, name, Value::Undefined)?;
        }
        // 6. If envRec.[[VarNames]] does not contain N, then
        // a. Append N to envRec.[[VarNames]].
        agent
            .heap
            .environments
            .get_global_environment_mut(self)
            .var_names
            .insert(name);
        // 7. Return unused.
        Ok(())
    }

    /// ### [9.1.1.4.18 CreateGlobalFunctionBinding ( N, V, D )](https://tc39.es/ecma262/#sec-createglobalfunctionbinding)
    pub(crate) fn create_global_function_binding(
        self,
        agent: &mut Agent,
        name: String,
        value: Value,
        is_deletable: bool,
    ) -> JsResult<()> {
        let global_object = self.global_object(agent);
        let name_key = PropertyKey::from_js_string(agent, name);
        // 3. Let existingProp be ? globalObject.[[GetOwnProperty]](N).
        let existing_prop = global_object.internal_get_own_property(agent, name_key)?;
        // 4. If existingProp is undefined or existingProp.[[Configurable]] is
        //    true, then
        let desc = if existing_prop
            .map_or(true, |prop| prop.configurable == Some(true))
        {
            // a. Let desc be the PropertyDescriptor { [[Value]]: V,
            //    [[Writable]]: true, [[Enumerable]]: true,
            //    [[Configurable]]: D }.
            PropertyDescriptor {
                value: Some(value),
                writable: Some(true),
                enumerable: Some(true),
                configurable: Some(is_deletable),
                ..Default::default()
            }
        } else {
            // 5. Else, let desc be the PropertyDescriptor { [[Value]]: V }.
            PropertyDescriptor {
                value: Some(value),
                ..Default::default()
            }
        };
        // 6. Perform ? DefinePropertyOrThrow(globalObject, N, desc).
        define_property_or_throw(agent, global_object, name_key, desc)?;
        // 7. Perform ? Set(globalObject, N, V, false).
        set(agent, global_object, name_key, value, false)?;
        // 8. Append N to envRec.[[VarNames]].
        agent
            .heap
            .environments
            .get_global_environment_mut(self)
            .var_names
            .insert(name);
        // 9. Return unused.
        Ok(())
    }

    /// ### [9.1.1.4.11 GetThisBinding ( )](https://tc39.es/ecma262/#sec-global-environment-records-getthisbinding)
    pub(crate) fn get_this_binding(self, agent: &Agent) -> Object {
        // 1. Return envRec.[[GlobalThisValue]].
        agent
            .heap
            .environments
            .get_global_environment(self)
            .global_this_value
    }
}

impl HeapMark for GlobalEnvironmentRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.object_environments.push(self.object_record);
        self.global_this_value.mark_values(queues);
        queues.declarative_environments.push(self.declarative_record);
        for name in &self.var_names {
            name.mark_values(queues);
        }
    }
}
