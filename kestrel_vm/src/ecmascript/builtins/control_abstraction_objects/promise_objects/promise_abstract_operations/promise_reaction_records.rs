// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.2.1.2 PromiseReaction Records](https://tc39.es/ecma262/#sec-promisereaction-records)

use super::promise_capability_records::PromiseCapability;
use crate::ecmascript::builtins::control_abstraction_objects::async_function_objects::await_reaction::AwaitReactionIdentifier;
use crate::ecmascript::builtins::control_abstraction_objects::async_generator_objects::AsyncGenerator;
use crate::ecmascript::execution::Agent;
use crate::ecmascript::types::Function;
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub(crate) type PromiseReaction = BaseIndex<PromiseReactionRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromiseReactionType {
    Fulfill,
    Reject,
}

/// \[\[Handler]]: either a JobCallback Record, EMPTY, or one of the
/// engine-internal continuations that resume a suspended coroutine.
#[derive(Debug, Clone, Copy)]
pub(crate) enum PromiseReactionHandler {
    JobCallback(Function),
    /// Resumes a suspended async function.
    Await(AwaitReactionIdentifier),
    /// Resumes a suspended async generator.
    AsyncGenerator(AsyncGenerator),
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct PromiseReactionRecord {
    /// \[\[Capability]]
    pub(crate) capability: Option<PromiseCapability>,
    /// \[\[Type]]
    pub(crate) reaction_type: PromiseReactionType,
    /// \[\[Handler]]
    pub(crate) handler: PromiseReactionHandler,
}

impl PromiseReaction {
    pub(crate) fn create(agent: &mut Agent, record: PromiseReactionRecord) -> Self {
        agent.heap.promise_reactions.push(Some(record));
        PromiseReaction::last(&agent.heap.promise_reactions)
    }
}

impl core::ops::Index<PromiseReaction> for Agent {
    type Output = PromiseReactionRecord;

    fn index(&self, index: PromiseReaction) -> &Self::Output {
        self.heap
            .promise_reactions
            .get(index.into_index())
            .expect("PromiseReaction out of bounds")
            .as_ref()
            .expect("PromiseReaction slot empty")
    }
}

impl HeapMark for PromiseReaction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.promise_reactions.push(*self);
    }
}

impl HeapMark for PromiseReactionRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        if let Some(capability) = self.capability {
            capability.promise().mark_values(queues);
        }
        match self.handler {
            PromiseReactionHandler::JobCallback(function) => function.mark_values(queues),
            PromiseReactionHandler::Await(reaction) => queues.await_reactions.push(reaction),
            PromiseReactionHandler::AsyncGenerator(generator) => {
                queues.async_generators.push(generator)
            }
            PromiseReactionHandler::Empty => {}
        }
    }
}
