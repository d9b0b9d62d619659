// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_reaction_records::PromiseReaction;
use crate::ecmascript::types::{OrdinaryObject, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

/// \[\[PromiseState]] and its dependent slots.
#[derive(Debug, Clone)]
pub(crate) enum PromiseState {
    Pending {
        /// \[\[PromiseFulfillReactions]]
        fulfill_reactions: Vec<PromiseReaction>,
        /// \[\[PromiseRejectReactions]]
        reject_reactions: Vec<PromiseReaction>,
        /// The promise has been resolved (its fate is sealed) but the
        /// resolution has not yet settled it.
        is_resolved: bool,
    },
    Fulfilled {
        /// \[\[PromiseResult]]
        promise_result: Value,
    },
    Rejected {
        /// \[\[PromiseResult]]
        promise_result: Value,
        /// \[\[PromiseIsHandled]]
        is_handled: bool,
    },
}

#[derive(Debug)]
pub struct PromiseHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    pub(crate) promise_state: PromiseState,
}

impl Default for PromiseState {
    fn default() -> Self {
        PromiseState::Pending {
            fulfill_reactions: Vec::new(),
            reject_reactions: Vec::new(),
            is_resolved: false,
        }
    }
}

impl HeapMark for PromiseHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        match &self.promise_state {
            PromiseState::Pending {
                fulfill_reactions,
                reject_reactions,
                ..
            } => {
                fulfill_reactions.mark_values(queues);
                reject_reactions.mark_values(queues);
            }
            PromiseState::Fulfilled { promise_result }
            | PromiseState::Rejected { promise_result, .. } => {
                promise_result.mark_values(queues);
            }
        }
    }
}
