// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [28.2 Proxy Objects](https://tc39.es/ecma262/#sec-proxy-objects)

use crate::ecmascript::builders::BuiltinFunctionBuilder;
use crate::ecmascript::builtins::builtin_function::{
    create_builtin_function, BuiltinFunctionArgs,
};
use crate::ecmascript::builtins::ordinary::ordinary_object_create_with_intrinsics;
use crate::ecmascript::builtins::proxy::proxy_create;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics, RealmIdentifier};
use crate::ecmascript::types::{
    InternalMethods, IntoValue, Object, PropertyDescriptor, PropertyKey, Value,
};

pub(crate) struct ProxyConstructor;
impl Builtin for ProxyConstructor {
    const NAME: &'static str = "Proxy";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [28.2.1.1 Proxy ( target, handler )](https://tc39.es/ecma262/#sec-proxy-target-handler)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    // 1. If NewTarget is undefined, throw a TypeError exception.
    if new_target.is_none() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Proxy constructor requires new",
        ));
    }
    // 2. Return ? ProxyCreate(target, handler).
    Ok(proxy_create(agent, arguments.get(0), arguments.get(1))?.into_value())
}

struct ProxyRevocable;
impl Builtin for ProxyRevocable {
    const NAME: &'static str = "revocable";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(proxy_revocable);
}

struct ProxyRevoker;
impl Builtin for ProxyRevoker {
    const NAME: &'static str = "";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(proxy_revoker_placeholder);
}

/// The revoker closure of the most recent `Proxy.revocable` result. Builtin
/// functions carry no captured state, so the revoked proxy travels through a
/// `revocable` own property on the revoker itself.
fn proxy_revoker_placeholder(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let F be the active function object.
    let function = agent
        .running_execution_context()
        .function
        .expect("revoker is a function call");
    // 2. Let p be F.[[RevocableProxy]]. 3. If p is null, return undefined.
    let key = PropertyKey::from_static_str(agent, "__revocableProxy");
    let proxy = Object::from(function).internal_get(agent, key, this_value)?;
    if let Value::Proxy(proxy) = proxy {
        // 5. Set p.[[ProxyTarget]] and p.[[ProxyHandler]] to null.
        proxy.revoke(agent);
    }
    // 6. Return undefined.
    Ok(Value::Undefined)
}

/// ### [28.2.2.1 Proxy.revocable ( target, handler )](https://tc39.es/ecma262/#sec-proxy.revocable)
fn proxy_revocable(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 1. Let proxy be ? ProxyCreate(target, handler).
    let proxy = proxy_create(agent, arguments.get(0), arguments.get(1))?;
    // 2-4. Let revoker be a new built-in function with [[RevocableProxy]]
    //      slot set to proxy.
    let realm = agent.current_realm_id();
    let revoker = create_builtin_function(
        agent,
        ProxyRevoker::BEHAVIOUR,
        BuiltinFunctionArgs::new(0, "", realm),
    );
    let key = PropertyKey::from_static_str(agent, "__revocableProxy");
    Object::from(revoker).internal_define_own_property(
        agent,
        key,
        PropertyDescriptor {
            value: Some(proxy.into_value()),
            writable: Some(false),
            enumerable: Some(false),
            configurable: Some(false),
            ..Default::default()
        },
    )?;
    // 5. Let result be OrdinaryObjectCreate(%Object.prototype%).
    let result = ordinary_object_create_with_intrinsics(agent, Some(ProtoIntrinsics::Object));
    // 6./7. Define the "proxy" and "revoke" data properties.
    let proxy_key = PropertyKey::from_static_str(agent, "proxy");
    crate::ecmascript::abstract_operations::operations_on_objects::create_data_property_or_throw(
        agent,
        result,
        proxy_key,
        proxy.into_value(),
    )?;
    let revoke_key = PropertyKey::from_static_str(agent, "revoke");
    crate::ecmascript::abstract_operations::operations_on_objects::create_data_property_or_throw(
        agent,
        result,
        revoke_key,
        revoker.into_value(),
    )?;
    // 8. Return result.
    Ok(result.into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let constructor = agent[realm].intrinsics().proxy();
    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_builtin_function_property::<ProxyRevocable>()
        .build();
}
