// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.5 Properties of the Promise Prototype Object](https://tc39.es/ecma262/#sec-properties-of-the-promise-prototype-object)

use super::promise_abstract_operations::promise_capability_records::{
    mark_promise_handled, PromiseCapability,
};
use super::promise_abstract_operations::promise_jobs::new_promise_reaction_job;
use super::promise_abstract_operations::promise_reaction_records::{
    PromiseReaction, PromiseReactionHandler, PromiseReactionRecord, PromiseReactionType,
};
use crate::ecmascript::builders::OrdinaryObjectBuilder;
use crate::ecmascript::builtins::promise::{Promise, PromiseState};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{Function, IntoValue, Value};

/// ### [27.2.5.4.1 PerformPromiseThen ( promise, onFulfilled, onRejected \[ , resultCapability \] )](https://tc39.es/ecma262/#sec-performpromisethen)
///
/// The handler slots accept the engine-internal continuations used by
/// `await` and async generators as well as language functions.
pub(crate) fn inner_promise_then(
    agent: &mut Agent,
    promise: Promise,
    on_fulfilled: PromiseReactionHandler,
    on_rejected: PromiseReactionHandler,
    result_capability: Option<PromiseCapability>,
) {
    // 3./4. Invalid handlers have already been mapped to EMPTY.
    // 5. Let fulfillReaction be the PromiseReaction Record { [[Capability]]:
    //    resultCapability, [[Type]]: FULFILL, [[Handler]]: onFulfilledJobCallback }.
    let fulfill_reaction = PromiseReaction::create(
        agent,
        PromiseReactionRecord {
            capability: result_capability,
            reaction_type: PromiseReactionType::Fulfill,
            handler: on_fulfilled,
        },
    );
    // 6. Let rejectReaction be the PromiseReaction Record { ...[[Type]]:
    //    REJECT... }.
    let reject_reaction = PromiseReaction::create(
        agent,
        PromiseReactionRecord {
            capability: result_capability,
            reaction_type: PromiseReactionType::Reject,
            handler: on_rejected,
        },
    );
    match &mut agent[promise].promise_state {
        // 7. If promise.[[PromiseState]] is PENDING, append the reactions to
        //    the reaction lists.
        PromiseState::Pending {
            fulfill_reactions,
            reject_reactions,
            ..
        } => {
            fulfill_reactions.push(fulfill_reaction);
            reject_reactions.push(reject_reaction);
        }
        // 8. Else if promise.[[PromiseState]] is FULFILLED: enqueue the
        //    fulfil job immediately.
        PromiseState::Fulfilled { promise_result } => {
            let value = *promise_result;
            let job = new_promise_reaction_job(agent, fulfill_reaction, value);
            agent.enqueue_promise_job(job);
        }
        // 9. Else: enqueue the reject job; attaching the first handler to an
        //    already rejected promise notifies the host.
        PromiseState::Rejected { promise_result, .. } => {
            let reason = *promise_result;
            mark_promise_handled(agent, promise);
            let job = new_promise_reaction_job(agent, reject_reaction, reason);
            agent.enqueue_promise_job(job);
        }
    }
}

struct PromisePrototypeThen;
impl Builtin for PromisePrototypeThen {
    const NAME: &'static str = "then";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(promise_prototype_then);
}

/// ### [27.2.5.4 Promise.prototype.then ( onFulfilled, onRejected )](https://tc39.es/ecma262/#sec-promise.prototype.then)
fn promise_prototype_then(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let promise be the this value.
    // 2. If IsPromise(promise) is false, throw a TypeError exception.
    let Value::Promise(promise) = this_value else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Promise.prototype.then called on a non-promise",
        ));
    };
    // 3./4. Let resultCapability be ? NewPromiseCapability(C).
    let result_capability = PromiseCapability::new(agent);
    // 5. Return PerformPromiseThen(promise, onFulfilled, onRejected,
    //    resultCapability).
    let on_fulfilled = match Function::try_from(arguments.get(0)) {
        Ok(callback) => PromiseReactionHandler::JobCallback(callback),
        Err(_) => PromiseReactionHandler::Empty,
    };
    let on_rejected = match Function::try_from(arguments.get(1)) {
        Ok(callback) => PromiseReactionHandler::JobCallback(callback),
        Err(_) => PromiseReactionHandler::Empty,
    };
    inner_promise_then(agent, promise, on_fulfilled, on_rejected, Some(result_capability));
    Ok(result_capability.promise().into_value())
}

struct PromisePrototypeCatch;
impl Builtin for PromisePrototypeCatch {
    const NAME: &'static str = "catch";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(promise_prototype_catch);
}

/// ### [27.2.5.1 Promise.prototype.catch ( onRejected )](https://tc39.es/ecma262/#sec-promise.prototype.catch)
fn promise_prototype_catch(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Return ? Invoke(promise, "then", « undefined, onRejected »).
    let args = [Value::Undefined, arguments.get(0)];
    promise_prototype_then(agent, this_value, ArgumentsList(&args))
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let prototype = agent[realm].intrinsics().promise_prototype;
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<PromisePrototypeCatch>()
        .with_builtin_function_property::<PromisePrototypeThen>()
        .with_to_string_tag("Promise")
        .build();
}
