// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.1.1 PromiseCapability Records](https://tc39.es/ecma262/#sec-promisecapability-records)
//!
//! Promises here are always native, so the capability holds just the promise
//! and resolves or rejects it directly instead of carrying separate resolve
//! and reject function slots.

use super::promise_jobs::new_promise_resolve_thenable_job;
use super::promise_reaction_records::{PromiseReaction, PromiseReactionType};
use crate::ecmascript::abstract_operations::operations_on_objects::get;
use crate::ecmascript::builtins::promise::{Promise, PromiseState};
use crate::ecmascript::execution::agent::{ExceptionType, PromiseRejectionOperation};
use crate::ecmascript::execution::Agent;
use crate::ecmascript::types::{Object, PropertyKey, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PromiseCapability {
    /// \[\[Promise]]
    promise: Promise,
}

impl PromiseCapability {
    /// ### [27.2.1.5 NewPromiseCapability ( C )](https://tc39.es/ecma262/#sec-newpromisecapability)
    /// with C being the %Promise% intrinsic.
    pub(crate) fn new(agent: &mut Agent) -> Self {
        PromiseCapability {
            promise: Promise::new_pending(agent),
        }
    }

    pub(crate) fn from_promise(promise: Promise) -> Self {
        PromiseCapability { promise }
    }

    pub(crate) fn promise(self) -> Promise {
        self.promise
    }

    /// ### [27.2.1.3.2 Promise Resolve Functions](https://tc39.es/ecma262/#sec-promise-resolve-functions)
    pub(crate) fn resolve(self, agent: &mut Agent, resolution: Value) {
        let promise = self.promise;
        // 5. If alreadyResolved.[[Value]] is true, return undefined.
        let PromiseState::Pending { is_resolved, .. } = &mut agent[promise].promise_state
        else {
            return;
        };
        if *is_resolved {
            return;
        }
        // 6. Set alreadyResolved.[[Value]] to true.
        *is_resolved = true;
        // 7. If SameValue(resolution, promise) is true, then
        if resolution == Value::Promise(promise) {
            // a. Let selfResolutionError be a newly created TypeError object.
            let error = agent.throw_exception_with_static_message(
                ExceptionType::TypeError,
                "Chaining cycle detected for promise",
            );
            // b. Perform RejectPromise(promise, selfResolutionError).
            reject_promise(agent, promise, error.value());
            return;
        }
        // 8. If resolution is not an Object, then
        let Ok(resolution_object) = Object::try_from(resolution) else {
            // a. Perform FulfillPromise(promise, resolution).
            fulfill_promise(agent, promise, resolution);
            return;
        };
        // 9. Let then be Completion(Get(resolution, "then")).
        let then_key = PropertyKey::from_static_str(agent, "then");
        let then = get(agent, resolution_object, then_key);
        let then = match then {
            Ok(then) => then,
            // 10. If then is an abrupt completion, perform
            //     RejectPromise(promise, then.[[Value]]).
            Err(error) => {
                reject_promise(agent, promise, error.value());
                return;
            }
        };
        // 11. Let thenAction be then.[[Value]].
        // 12. If IsCallable(thenAction) is false, then
        let Ok(then_action) = crate::ecmascript::types::Function::try_from(then) else {
            // a. Perform FulfillPromise(promise, resolution).
            fulfill_promise(agent, promise, resolution);
            return;
        };
        // 13. Let thenJobCallback be HostMakeJobCallback(thenAction).
        // 14. Let job be NewPromiseResolveThenableJob(promise, resolution,
        //     thenJobCallback).
        let job = new_promise_resolve_thenable_job(agent, promise, resolution_object, then_action);
        // 15. Perform HostEnqueuePromiseJob(job.[[Job]], job.[[Realm]]).
        agent.enqueue_promise_job(job);
    }

    /// ### [27.2.1.3.1 Promise Reject Functions](https://tc39.es/ecma262/#sec-promise-reject-functions)
    pub(crate) fn reject(self, agent: &mut Agent, reason: Value) {
        let promise = self.promise;
        // 5. If alreadyResolved.[[Value]] is true, return undefined.
        let PromiseState::Pending { is_resolved, .. } = &mut agent[promise].promise_state
        else {
            return;
        };
        if *is_resolved {
            return;
        }
        // 6. Set alreadyResolved.[[Value]] to true.
        *is_resolved = true;
        // 7. Perform RejectPromise(promise, reason).
        reject_promise(agent, promise, reason);
    }
}

/// ### [27.2.1.4 FulfillPromise ( promise, value )](https://tc39.es/ecma262/#sec-fulfillpromise)
pub(crate) fn fulfill_promise(agent: &mut Agent, promise: Promise, value: Value) {
    // 1. Assert: The value of promise.[[PromiseState]] is PENDING.
    // 2. Let reactions be promise.[[PromiseFulfillReactions]].
    let PromiseState::Pending {
        fulfill_reactions, ..
    } = core::mem::replace(
        &mut agent[promise].promise_state,
        // 3-6. Empty the reaction slots and set the state.
        PromiseState::Fulfilled {
            promise_result: value,
        },
    )
    else {
        unreachable!("promise was already settled");
    };
    // 7. Perform TriggerPromiseReactions(reactions, value).
    trigger_promise_reactions(agent, fulfill_reactions, value);
    // 8. Return unused.
}

/// ### [27.2.1.7 RejectPromise ( promise, reason )](https://tc39.es/ecma262/#sec-rejectpromise)
pub(crate) fn reject_promise(agent: &mut Agent, promise: Promise, reason: Value) {
    // 1. Assert: The value of promise.[[PromiseState]] is PENDING.
    // 2. Let reactions be promise.[[PromiseRejectReactions]].
    let PromiseState::Pending {
        reject_reactions, ..
    } = core::mem::replace(
        &mut agent[promise].promise_state,
        // 3-6. Empty the reaction slots and set the state.
        PromiseState::Rejected {
            promise_result: reason,
            is_handled: false,
        },
    )
    else {
        unreachable!("promise was already settled");
    };
    let is_handled = !reject_reactions.is_empty();
    if let PromiseState::Rejected {
        is_handled: handled_slot,
        ..
    } = &mut agent[promise].promise_state
    {
        *handled_slot = is_handled;
    }
    // 7. If promise.[[PromiseIsHandled]] is false, perform
    //    HostPromiseRejectionTracker(promise, "reject").
    if !is_handled {
        let host_hooks = agent.host_hooks;
        host_hooks.promise_rejection_tracker(agent, promise, PromiseRejectionOperation::Reject);
    }
    // 8. Perform TriggerPromiseReactions(reactions, reason).
    trigger_promise_reactions(agent, reject_reactions, reason);
    // 9. Return unused.
}

/// ### [27.2.1.8 TriggerPromiseReactions ( reactions, argument )](https://tc39.es/ecma262/#sec-triggerpromisereactions)
pub(crate) fn trigger_promise_reactions(
    agent: &mut Agent,
    reactions: Vec<PromiseReaction>,
    argument: Value,
) {
    // 1. For each element reaction of reactions, do
    for reaction in reactions {
        // a. Let job be NewPromiseReactionJob(reaction, argument).
        let job = super::promise_jobs::new_promise_reaction_job(agent, reaction, argument);
        // b. Perform HostEnqueuePromiseJob(job.[[Job]], job.[[Realm]]).
        agent.enqueue_promise_job(job);
    }
    // 2. Return unused.
}

/// Used by reaction jobs to settle the derived promise of a `then`.
pub(crate) fn settle_promise(
    agent: &mut Agent,
    capability: PromiseCapability,
    reaction_type: PromiseReactionType,
    value: Value,
) {
    match reaction_type {
        PromiseReactionType::Fulfill => capability.resolve(agent, value),
        PromiseReactionType::Reject => capability.reject(agent, value),
    }
}

/// Part of [27.2.5.4 Promise.prototype.then](https://tc39.es/ecma262/#sec-promise.prototype.then):
/// marking a rejected promise handled notifies the host.
pub(crate) fn mark_promise_handled(agent: &mut Agent, promise: Promise) {
    if let PromiseState::Rejected { is_handled, .. } = &mut agent[promise].promise_state {
        if !*is_handled {
            *is_handled = true;
            let host_hooks = agent.host_hooks;
            host_hooks.promise_rejection_tracker(
                agent,
                promise,
                PromiseRejectionOperation::Handle,
            );
        }
    }
}

impl HeapMark for PromiseCapability {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.promises.push(self.promise);
    }
}
