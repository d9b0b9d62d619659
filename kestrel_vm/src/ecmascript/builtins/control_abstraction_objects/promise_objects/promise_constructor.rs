// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.3 The Promise Constructor](https://tc39.es/ecma262/#sec-promise-constructor)

use super::promise_abstract_operations::promise_capability_records::PromiseCapability;
use super::promise_abstract_operations::promise_resolving_functions::create_resolving_functions;
use crate::ecmascript::abstract_operations::operations_on_objects::call;
use crate::ecmascript::abstract_operations::testing_and_comparison::is_callable;
use crate::ecmascript::builders::BuiltinFunctionBuilder;
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{IntoValue, Object, Value};

pub(crate) struct PromiseConstructor;
impl Builtin for PromiseConstructor {
    const NAME: &'static str = "Promise";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [27.2.3.1 Promise ( executor )](https://tc39.es/ecma262/#sec-promise-executor)
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
            "Promise constructor requires new",
        ));
    }
    // 2. If IsCallable(executor) is false, throw a TypeError exception.
    let executor = arguments.get(0);
    if !is_callable(executor) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Promise executor is not a function",
        ));
    }
    // 3-7. Let promise be a new pending promise; subclassing is not carried.
    let promise = Promise::new_pending(agent);
    // 8. Let resolvingFunctions be CreateResolvingFunctions(promise).
    let (resolve_function, reject_function) = create_resolving_functions(agent, promise);
    // 9. Let completion be Completion(Call(executor, undefined,
    //    « resolvingFunctions.[[Resolve]], resolvingFunctions.[[Reject]] »)).
    let completion = call(
        agent,
        executor,
        Value::Undefined,
        Some(&[
            resolve_function.into_value(),
            reject_function.into_value(),
        ]),
    );
    // 10. If completion is an abrupt completion, then perform
    //     ? Call(resolvingFunctions.[[Reject]], undefined,
    //     « completion.[[Value]] »).
    if let Err(error) = completion {
        PromiseCapability::from_promise(promise).reject(agent, error.value());
    }
    // 11. Return promise.
    Ok(promise.into_value())
}

struct PromiseResolve;
impl Builtin for PromiseResolve {
    const NAME: &'static str = "resolve";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(promise_resolve);
}

/// ### [27.2.4.7 Promise.resolve ( x )](https://tc39.es/ecma262/#sec-promise.resolve)
fn promise_resolve(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 3. Return ? PromiseResolve(C, x).
    Ok(Promise::resolve(agent, arguments.get(0)).into_value())
}

struct PromiseReject;
impl Builtin for PromiseReject {
    const NAME: &'static str = "reject";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(promise_reject);
}

/// ### [27.2.4.6 Promise.reject ( r )](https://tc39.es/ecma262/#sec-promise.reject)
fn promise_reject(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 2. Let promiseCapability be ? NewPromiseCapability(C).
    let capability = PromiseCapability::new(agent);
    // 3. Perform ? Call(promiseCapability.[[Reject]], undefined, « r »).
    capability.reject(agent, arguments.get(0));
    // 4. Return promiseCapability.[[Promise]].
    Ok(capability.promise().into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.promise();
    let prototype = intrinsics.promise_prototype;

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .with_builtin_function_property::<PromiseReject>()
        .with_builtin_function_property::<PromiseResolve>()
        .build();
}
