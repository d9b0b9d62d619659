// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [9.3 Realms](https://tc39.es/ecma262/#sec-code-realms)

pub mod intrinsics;

use std::any::Any;
use std::rc::Rc;

use super::environments::{new_global_environment, GlobalEnvironmentIndex};
use super::{Agent, ExecutionContext, JsResult};
use crate::ecmascript::abstract_operations::operations_on_objects::define_property_or_throw;
use crate::ecmascript::builtins::ordinary::ordinary_object_create_with_intrinsics;
use crate::ecmascript::types::{
    IntoValue, Number, Object, PropertyDescriptor, PropertyKey, Value,
};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub use intrinsics::{Intrinsics, ProtoIntrinsics};

pub type RealmIdentifier = BaseIndex<Realm>;

/// ### [9.3 Realm Record](https://tc39.es/ecma262/#realm-record)
#[derive(Debug)]
pub struct Realm {
    /// ### \[\[Intrinsics]]
    ///
    /// None only while the realm is being bootstrapped.
    intrinsics: Option<Intrinsics>,

    /// ### \[\[GlobalObject]]
    global_object: Option<Object>,

    /// ### \[\[GlobalEnv]]
    global_env: Option<GlobalEnvironmentIndex>,

    /// ### \[\[HostDefined]]
    pub host_defined: Option<Rc<dyn Any>>,
}

impl Realm {
    pub(crate) fn intrinsics(&self) -> &Intrinsics {
        self.intrinsics.as_ref().expect("realm is being bootstrapped")
    }

    pub(crate) fn global_object(&self) -> Object {
        self.global_object.expect("realm has no global object yet")
    }

    pub(crate) fn global_env(&self) -> GlobalEnvironmentIndex {
        self.global_env.expect("realm has no global environment yet")
    }
}

impl core::ops::Index<RealmIdentifier> for Agent {
    type Output = Realm;

    fn index(&self, index: RealmIdentifier) -> &Self::Output {
        self.heap
            .realms
            .get(index.into_index())
            .expect("Realm out of bounds")
            .as_ref()
            .expect("Realm slot empty")
    }
}

impl core::ops::IndexMut<RealmIdentifier> for Agent {
    fn index_mut(&mut self, index: RealmIdentifier) -> &mut Self::Output {
        self.heap
            .realms
            .get_mut(index.into_index())
            .expect("Realm out of bounds")
            .as_mut()
            .expect("Realm slot empty")
    }
}

/// ### [9.3.1 CreateRealm ( )](https://tc39.es/ecma262/#sec-createrealm)
pub(crate) fn create_realm(agent: &mut Agent) -> RealmIdentifier {
    // 1. Let realmRec be a new Realm Record.
    agent.heap.realms.push(Some(Realm {
        // 2. Perform CreateIntrinsics(realmRec): deferred until the realm
        //    identifier exists, since every intrinsic records its realm.
        intrinsics: None,
        // 3. Set realmRec.[[GlobalObject]] to undefined.
        global_object: None,
        // 4. Set realmRec.[[GlobalEnv]] to undefined.
        global_env: None,
        host_defined: None,
    }));
    // 5. Return realmRec.
    RealmIdentifier::last(&agent.heap.realms)
}

/// ### [9.3.3 SetRealmGlobalObject ( realmRec, globalObj, thisValue )](https://tc39.es/ecma262/#sec-setrealmglobalobject)
pub(crate) fn set_realm_global_object(
    agent: &mut Agent,
    realm: RealmIdentifier,
    global_object: Option<Object>,
    this_value: Option<Object>,
) {
    // 1. If globalObj is undefined, then
    let global_object = global_object.unwrap_or_else(|| {
        // a. Assert: realmRec.[[Intrinsics]] is an intrinsics Record.
        // b. Set globalObj to OrdinaryObjectCreate(realmRec.[[Intrinsics]].[[%Object.prototype%]]).
        ordinary_object_create_with_intrinsics(agent, Some(ProtoIntrinsics::Object))
    });
    // 3. If thisValue is undefined, set thisValue to globalObj.
    let this_value = this_value.unwrap_or(global_object);
    // 4. Set realmRec.[[GlobalObject]] to globalObj.
    agent[realm].global_object = Some(global_object);
    // 5. Let newGlobalEnv be NewGlobalEnvironment(globalObj, thisValue).
    let new_global_env = new_global_environment(agent, global_object, this_value);
    // 6. Set realmRec.[[GlobalEnv]] to newGlobalEnv.
    agent[realm].global_env = Some(new_global_env);
    // 7. Return unused.
}

/// ### [9.3.4 SetDefaultGlobalBindings ( realmRec )](https://tc39.es/ecma262/#sec-setdefaultglobalbindings)
pub(crate) fn set_default_global_bindings(
    agent: &mut Agent,
    realm: RealmIdentifier,
) -> JsResult<Object> {
    // 1. Let global be realmRec.[[GlobalObject]].
    let global = agent[realm].global_object();

    // 2. For each property of the Global Object specified in clause 19, do
    //    a. ... Perform ? DefinePropertyOrThrow(global, name, desc).

    // 19.1 Value Properties of the Global Object
    let key = PropertyKey::from_static_str(agent, "globalThis");
    let global_env = agent[realm].global_env();
    let global_this = agent
        .heap
        .environments
        .get_global_environment(global_env)
        .global_this_value;
    define_property_or_throw(
        agent,
        global,
        key,
        PropertyDescriptor {
            value: Some(global_this.into_value()),
            writable: Some(true),
            enumerable: Some(false),
            configurable: Some(true),
            ..Default::default()
        },
    )?;
    for (name, value) in [
        ("undefined", Value::Undefined),
        ("NaN", Number::nan().into_value()),
        ("Infinity", Number::pos_inf().into_value()),
    ] {
        let key = PropertyKey::from_static_str(agent, name);
        define_property_or_throw(
            agent,
            global,
            key,
            PropertyDescriptor {
                value: Some(value),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(false),
                ..Default::default()
            },
        )?;
    }

    // 19.3 Constructor Properties of the Global Object
    let constructors: &[(&'static str, Value)] = &{
        let intrinsics = agent[realm].intrinsics();
        [
            ("AggregateError", intrinsics.aggregate_error().into_value()),
            ("Array", intrinsics.array().into_value()),
            ("ArrayBuffer", intrinsics.array_buffer().into_value()),
            ("BigInt", intrinsics.big_int().into_value()),
            ("Boolean", intrinsics.boolean().into_value()),
            ("DataView", intrinsics.data_view().into_value()),
            ("Error", intrinsics.error().into_value()),
            ("EvalError", intrinsics.eval_error().into_value()),
            ("Number", intrinsics.number().into_value()),
            ("Object", intrinsics.object().into_value()),
            ("Promise", intrinsics.promise().into_value()),
            ("Proxy", intrinsics.proxy().into_value()),
            ("RangeError", intrinsics.range_error().into_value()),
            ("ReferenceError", intrinsics.reference_error().into_value()),
            ("String", intrinsics.string().into_value()),
            ("Symbol", intrinsics.symbol().into_value()),
            ("SyntaxError", intrinsics.syntax_error().into_value()),
            ("TypeError", intrinsics.type_error().into_value()),
            ("URIError", intrinsics.uri_error().into_value()),
        ]
    };
    for (name, value) in constructors {
        let key = PropertyKey::from_static_str(agent, name);
        define_property_or_throw(
            agent,
            global,
            key,
            PropertyDescriptor {
                value: Some(*value),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        )?;
    }

    // 19.4 Other Properties of the Global Object
    let others: &[(&'static str, Value)] = &{
        let intrinsics = agent[realm].intrinsics();
        [("Reflect", intrinsics.reflect().into_value())]
    };
    for (name, value) in others {
        let key = PropertyKey::from_static_str(agent, name);
        define_property_or_throw(
            agent,
            global,
            key,
            PropertyDescriptor {
                value: Some(*value),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        )?;
    }

    // 3. Return global.
    Ok(global)
}

/// ### [9.6 InitializeHostDefinedRealm ( )](https://tc39.es/ecma262/#sec-initializehostdefinedrealm)
pub fn initialize_host_defined_realm(
    agent: &mut Agent,
    create_global_object: Option<impl FnOnce(&mut Agent, RealmIdentifier) -> Object>,
    create_global_this_value: Option<impl FnOnce(&mut Agent, RealmIdentifier) -> Object>,
    initialize_global_object: Option<impl FnOnce(&mut Agent, Object)>,
) {
    // 1. Let realm be CreateRealm().
    let realm = create_realm(agent);
    // 2. Let newContext be a new execution context.
    let new_context = ExecutionContext {
        // 3. Set the Function of newContext to null.
        function: None,
        // 4. Set the Realm of newContext to realm.
        realm,
        // 5. Set the ScriptOrModule of newContext to null.
        script_or_module: None,
        ecmascript_code: None,
    };
    // 6. Push newContext onto the execution context stack.
    agent.execution_context_stack.push(new_context);
    Intrinsics::create(agent, realm);
    // 7. If the host requires use of an exotic object to serve as realm's
    //    global object, let global be such an object created in a
    //    host-defined manner.
    let global = create_global_object.map(|create| create(agent, realm));
    // 8. If the host requires that the this binding in realm's global scope
    //    return an object other than the global object, let thisValue be
    //    such an object created in a host-defined manner.
    let this_value = create_global_this_value.map(|create| create(agent, realm));
    // 9. Perform SetRealmGlobalObject(realm, global, thisValue).
    set_realm_global_object(agent, realm, global, this_value);
    // 10. Let globalObj be ? SetDefaultGlobalBindings(realm).
    let global_obj = set_default_global_bindings(agent, realm)
        .expect("failed to define default global bindings");
    // 11. Create any host-defined global object properties on globalObj.
    if let Some(initialize) = initialize_global_object {
        initialize(agent, global_obj);
    }
    // 12. Return unused.
}

/// Initializes a realm with no host-defined global object customization.
pub fn initialize_default_realm(agent: &mut Agent) {
    let no_global: Option<fn(&mut Agent, RealmIdentifier) -> Object> = None;
    let no_this: Option<fn(&mut Agent, RealmIdentifier) -> Object> = None;
    let no_init: Option<fn(&mut Agent, Object)> = None;
    initialize_host_defined_realm(agent, no_global, no_this, no_init);
}

impl HeapMark for RealmIdentifier {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.realms.push(*self);
    }
}

impl HeapMark for Realm {
    fn mark_values(&self, queues: &mut WorkQueues) {
        if let Some(intrinsics) = &self.intrinsics {
            intrinsics.mark_values(queues);
        }
        self.global_object.mark_values(queues);
        if let Some(global_env) = self.global_env {
            queues.global_environments.push(global_env);
        }
    }
}
