// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [10.1 Ordinary Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-ordinary-object-internal-methods-and-internal-slots)
//!
//! Exotic and slotted objects keep their named internal slots in their own
//! heap data and defer plain property storage to a lazily created backing
//! ordinary object. An exotic object without a backing object behaves as if
//! it had its intrinsic default prototype and no own (non-exotic) properties.

use super::{Object, OrdinaryObject};
use crate::ecmascript::execution::{Agent, ProtoIntrinsics};
use crate::ecmascript::types::ObjectHeapData;

pub trait InternalSlots: Sized + Copy + Into<Object> {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Object;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject>;

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject);

    fn create_backing_object(self, agent: &mut Agent) -> OrdinaryObject {
        debug_assert!(self.get_backing_object(agent).is_none());
        let prototype = self.internal_prototype(agent);
        agent.heap.objects.push(Some(ObjectHeapData::new(
            self.internal_extensible(agent),
            prototype,
        )));
        let backing_object = OrdinaryObject(crate::heap::indexes::ObjectIndex::last(
            &agent.heap.objects,
        ));
        self.set_backing_object(agent, backing_object);
        backing_object
    }

    fn get_or_create_backing_object(self, agent: &mut Agent) -> OrdinaryObject {
        match self.get_backing_object(agent) {
            Some(backing_object) => backing_object,
            None => self.create_backing_object(agent),
        }
    }

    /// \[\[Prototype]]
    fn internal_prototype(self, agent: &Agent) -> Option<Object> {
        match self.get_backing_object(agent) {
            Some(backing_object) => agent[backing_object].prototype,
            None => Some(
                agent
                    .current_realm()
                    .intrinsics()
                    .get_intrinsic_default_proto(Self::DEFAULT_PROTOTYPE),
            ),
        }
    }

    fn internal_set_prototype(self, agent: &mut Agent, prototype: Option<Object>) {
        if let Some(backing_object) = self.get_backing_object(agent) {
            agent[backing_object].prototype = prototype;
        } else if prototype != self.internal_prototype(agent) {
            let backing_object = self.create_backing_object(agent);
            agent[backing_object].prototype = prototype;
        }
    }

    /// \[\[Extensible]]
    fn internal_extensible(self, agent: &Agent) -> bool {
        self.get_backing_object(agent)
            .map_or(true, |backing_object| agent[backing_object].extensible)
    }

    fn internal_set_extensible(self, agent: &mut Agent, value: bool) {
        let backing_object = self.get_or_create_backing_object(agent);
        agent[backing_object].extensible = value;
    }
}

impl InternalSlots for OrdinaryObject {
    fn get_backing_object(self, _agent: &Agent) -> Option<OrdinaryObject> {
        Some(self)
    }

    fn set_backing_object(self, _agent: &mut Agent, _backing_object: OrdinaryObject) {
        unreachable!("ordinary objects are their own backing object");
    }

    fn internal_prototype(self, agent: &Agent) -> Option<Object> {
        agent[self].prototype
    }

    fn internal_set_prototype(self, agent: &mut Agent, prototype: Option<Object>) {
        agent[self].prototype = prototype;
    }

    fn internal_extensible(self, agent: &Agent) -> bool {
        agent[self].extensible
    }

    fn internal_set_extensible(self, agent: &mut Agent, value: bool) {
        agent[self].extensible = value;
    }
}
