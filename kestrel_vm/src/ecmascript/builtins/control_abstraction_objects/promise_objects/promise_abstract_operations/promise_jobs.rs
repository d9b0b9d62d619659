// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [27.2.2 Promise Jobs](https://tc39.es/ecma262/#sec-promise-jobs)

use super::promise_capability_records::{settle_promise, PromiseCapability};
use super::promise_reaction_records::{
    PromiseReaction, PromiseReactionHandler, PromiseReactionType,
};
use super::promise_resolving_functions::create_resolving_functions;
use crate::ecmascript::abstract_operations::operations_on_objects::{
    call_function, get_function_realm,
};
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::execution::agent::{InnerJob, Job};
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{Function, IntoValue, Object, Value};

#[derive(Debug)]
pub(crate) struct PromiseReactionJob {
    reaction: PromiseReaction,
    argument: Value,
}

impl PromiseReactionJob {
    pub(crate) fn run(self, agent: &mut Agent) -> JsResult<()> {
        let PromiseReactionJob { reaction, argument } = self;
        let record = agent[reaction];
        // The following are substeps of step 1 of NewPromiseReactionJob.
        let handler_result = match record.handler {
            PromiseReactionHandler::Empty => match record.reaction_type {
                // d.i. If type is FULFILL, let handlerResult be
                //      NormalCompletion(argument).
                PromiseReactionType::Fulfill => Ok(argument),
                // d.ii. Else, let handlerResult be
                //       ThrowCompletion(argument).
                PromiseReactionType::Reject => {
                    Err(crate::ecmascript::execution::agent::JsError::new(argument))
                }
            },
            // e. Else, let handlerResult be
            //    Completion(HostCallJobCallback(handler, undefined,
            //    « argument »)).
            PromiseReactionHandler::JobCallback(handler) => {
                call_function(agent, handler, Value::Undefined, Some(&[argument]))
            }
            // Engine-internal continuations resume the suspended coroutine
            // directly; they carry their own return capability.
            PromiseReactionHandler::Await(await_reaction) => {
                await_reaction.resume(agent, record.reaction_type, argument);
                return Ok(());
            }
            PromiseReactionHandler::AsyncGenerator(generator) => {
                generator.resume_await(agent, record.reaction_type, argument);
                return Ok(());
            }
        };
        // f. If promiseCapability is undefined, then
        let Some(capability) = record.capability else {
            // i. Assert: handlerResult is not an abrupt completion.
            // ii. Return EMPTY.
            return handler_result.map(|_| ());
        };
        // g./h. Settle the derived promise with the handler outcome.
        match handler_result {
            Ok(value) => settle_promise(agent, capability, PromiseReactionType::Fulfill, value),
            Err(error) => {
                settle_promise(agent, capability, PromiseReactionType::Reject, error.value())
            }
        }
        // i. Return ? status.
        Ok(())
    }
}

/// ### [27.2.2.1 NewPromiseReactionJob ( reaction, argument )](https://tc39.es/ecma262/#sec-newpromisereactionjob)
pub(crate) fn new_promise_reaction_job(
    agent: &mut Agent,
    reaction: PromiseReaction,
    argument: Value,
) -> Job {
    // 2. Let handlerRealm be null.
    // 3. If reaction.[[Handler]] is not EMPTY: the realm of the handler
    //    function, or the current realm when the function has none.
    let handler_realm = match agent[reaction].handler {
        PromiseReactionHandler::JobCallback(handler) => {
            Some(get_function_realm(agent, handler).unwrap_or_else(|_| agent.current_realm_id()))
        }
        _ => None,
    };
    // 4. Return the Record { [[Job]]: job, [[Realm]]: handlerRealm }.
    Job {
        realm: handler_realm,
        inner: InnerJob::PromiseReaction(PromiseReactionJob { reaction, argument }),
    }
}

#[derive(Debug)]
pub(crate) struct PromiseResolveThenableJob {
    promise_to_resolve: Promise,
    thenable: Object,
    then: Function,
}

impl PromiseResolveThenableJob {
    pub(crate) fn run(self, agent: &mut Agent) -> JsResult<()> {
        let PromiseResolveThenableJob {
            promise_to_resolve,
            thenable,
            then,
        } = self;
        // The following are substeps of step 1 of
        // NewPromiseResolveThenableJob.
        // a. Let resolvingFunctions be
        //    CreateResolvingFunctions(promiseToResolve).
        let (resolve_function, reject_function) =
            create_resolving_functions(agent, promise_to_resolve);
        // b. Let thenCallResult be Completion(HostCallJobCallback(then,
        //    thenable, « resolvingFunctions.[[Resolve]],
        //    resolvingFunctions.[[Reject]] »)).
        let then_call_result = call_function(
            agent,
            then,
            thenable.into(),
            Some(&[
                resolve_function.into_value(),
                reject_function.into_value(),
            ]),
        );
        // c. If thenCallResult is an abrupt completion, then
        if let Err(error) = then_call_result {
            // i. Return ? Call(resolvingFunctions.[[Reject]], undefined,
            //    « thenCallResult.[[Value]] »).
            let capability = PromiseCapability::from_promise(promise_to_resolve);
            capability.reject(agent, error.value());
        }
        // d. Return ? thenCallResult.
        Ok(())
    }
}

/// ### [27.2.2.2 NewPromiseResolveThenableJob ( promiseToResolve, thenable, then )](https://tc39.es/ecma262/#sec-newpromiseresolvethenablejob)
pub(crate) fn new_promise_resolve_thenable_job(
    agent: &mut Agent,
    promise_to_resolve: Promise,
    thenable: Object,
    then: Function,
) -> Job {
    // 2. Let getThenRealmResult be Completion(GetFunctionRealm(then)).
    // 3. If getThenRealmResult is a normal completion, let thenRealm be
    //    getThenRealmResult.[[Value]]. 4. Else, let thenRealm be the current
    //    Realm Record.
    let then_realm =
        get_function_realm(agent, then).unwrap_or_else(|_| agent.current_realm_id());
    // 6. Return the Record { [[Job]]: job, [[Realm]]: thenRealm }.
    Job {
        realm: Some(then_realm),
        inner: InnerJob::PromiseResolveThenable(PromiseResolveThenableJob {
            promise_to_resolve,
            thenable,
            then,
        }),
    }
}
