// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [6.2.12 Private Names](https://tc39.es/ecma262/#sec-private-names)
//!
//! A Private Name is a globally unique specification value with an associated
//! description. It is never exposed to language code; private elements are
//! found by Private Name identity, not by description.

use super::{Function, String, Value};
use crate::ecmascript::execution::Agent;
use crate::heap::indexes::PrivateNameIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct PrivateName(pub(crate) PrivateNameIndex);

#[derive(Debug, Clone)]
pub struct PrivateNameHeapData {
    /// \[\[Description]], e.g. `"#x"`.
    pub(crate) description: String,
}

impl PrivateName {
    pub(crate) fn new(agent: &mut Agent, description: String) -> Self {
        agent
            .heap
            .private_names
            .push(Some(PrivateNameHeapData { description }));
        PrivateName(PrivateNameIndex::last(&agent.heap.private_names))
    }

    pub(crate) fn description(self, agent: &Agent) -> String {
        agent[self].description
    }

    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }
}

/// ### [6.2.10 The PrivateElement Specification Type](https://tc39.es/ecma262/#sec-privateelement-specification-type)
#[derive(Debug, Clone, Copy)]
pub enum PrivateElement {
    /// \[\[Kind]]: field
    Field { key: PrivateName, value: Value },
    /// \[\[Kind]]: method
    Method { key: PrivateName, value: Function },
    /// \[\[Kind]]: accessor
    Accessor {
        key: PrivateName,
        get: Option<Function>,
        set: Option<Function>,
    },
}

impl PrivateElement {
    pub(crate) fn key(&self) -> PrivateName {
        match self {
            PrivateElement::Field { key, .. }
            | PrivateElement::Method { key, .. }
            | PrivateElement::Accessor { key, .. } => *key,
        }
    }
}

impl core::ops::Index<PrivateName> for Agent {
    type Output = PrivateNameHeapData;

    fn index(&self, index: PrivateName) -> &Self::Output {
        self.heap
            .private_names
            .get(index.get_index())
            .expect("PrivateName out of bounds")
            .as_ref()
            .expect("PrivateName slot empty")
    }
}

impl HeapMark for PrivateName {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.private_names.push(*self);
    }
}

impl HeapMark for PrivateElement {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            PrivateElement::Field { key, value } => {
                key.mark_values(queues);
                value.mark_values(queues);
            }
            PrivateElement::Method { key, value } => {
                key.mark_values(queues);
                value.mark_values(queues);
            }
            PrivateElement::Accessor { key, get, set } => {
                key.mark_values(queues);
                get.mark_values(queues);
                set.mark_values(queues);
            }
        }
    }
}
