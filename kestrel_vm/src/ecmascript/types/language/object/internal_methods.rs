// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.7.2 Object Internal Methods and Internal Slots](https://tc39.es/ecma262/#sec-object-internal-methods-and-internal-slots)

use super::{InternalSlots, Object, OrdinaryObject, PropertyKey};
use crate::ecmascript::builtins::ordinary::{
    ordinary_define_own_property, ordinary_delete, ordinary_get, ordinary_get_own_property,
    ordinary_has_property, ordinary_own_property_keys, ordinary_set, ordinary_set_prototype_of,
};
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{PropertyDescriptor, Value};

/// The overridable internal-method suite. The default bodies are the ordinary
/// object implementations of 10.1; exotic objects override the methods whose
/// behaviour the specification changes.
pub trait InternalMethods: InternalSlots {
    /// \[\[GetPrototypeOf]]
    fn internal_get_prototype_of(self, agent: &mut Agent) -> JsResult<Option<Object>> {
        // OrdinaryGetPrototypeOf: 1. Return O.[[Prototype]].
        Ok(self.internal_prototype(agent))
    }

    /// \[\[SetPrototypeOf]]
    fn internal_set_prototype_of(
        self,
        agent: &mut Agent,
        prototype: Option<Object>,
    ) -> JsResult<bool> {
        Ok(ordinary_set_prototype_of(agent, self.into(), prototype))
    }

    /// \[\[IsExtensible]]
    fn internal_is_extensible(self, agent: &mut Agent) -> JsResult<bool> {
        // OrdinaryIsExtensible: 1. Return O.[[Extensible]].
        Ok(self.internal_extensible(agent))
    }

    /// \[\[PreventExtensions]]
    fn internal_prevent_extensions(self, agent: &mut Agent) -> JsResult<bool> {
        // OrdinaryPreventExtensions: 1. Set O.[[Extensible]] to false.
        self.internal_set_extensible(agent, false);
        // 2. Return true.
        Ok(true)
    }

    /// \[\[GetOwnProperty]]
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        Ok(self
            .get_backing_object(agent)
            .and_then(|backing_object| ordinary_get_own_property(agent, backing_object, property_key)))
    }

    /// \[\[DefineOwnProperty]]
    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        let backing_object = self.get_or_create_backing_object(agent);
        Ok(ordinary_define_own_property(
            agent,
            backing_object,
            property_key,
            property_descriptor,
        ))
    }

    /// \[\[HasProperty]]
    fn internal_has_property(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        ordinary_has_property(agent, self.into(), property_key)
    }

    /// \[\[Get]]
    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        ordinary_get(agent, self.into(), property_key, receiver)
    }

    /// \[\[Set]]
    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool> {
        ordinary_set(agent, self.into(), property_key, value, receiver)
    }

    /// \[\[Delete]]
    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        match self.get_backing_object(agent) {
            Some(backing_object) => {
                Ok(ordinary_delete(agent, backing_object, property_key))
            }
            // 1. If O does not have an own property with key P, return true.
            None => Ok(true),
        }
    }

    /// \[\[OwnPropertyKeys]]
    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        Ok(match self.get_backing_object(agent) {
            Some(backing_object) => ordinary_own_property_keys(agent, backing_object),
            None => Vec::new(),
        })
    }
}

impl InternalMethods for OrdinaryObject {}

macro_rules! object_dispatch {
    ($value: expr, $x: ident => $body: expr) => {
        match $value {
            Object::Object($x) => $body,
            Object::BoundFunction($x) => $body,
            Object::BuiltinFunction($x) => $body,
            Object::ECMAScriptFunction($x) => $body,
            Object::PromiseResolvingFunction($x) => $body,
            Object::Arguments($x) => $body,
            Object::Array($x) => $body,
            Object::ArrayBuffer($x) => $body,
            Object::ArrayIterator($x) => $body,
            Object::AsyncGenerator($x) => $body,
            Object::DataView($x) => $body,
            Object::Error($x) => $body,
            Object::Generator($x) => $body,
            Object::Module($x) => $body,
            Object::PrimitiveObject($x) => $body,
            Object::Promise($x) => $body,
            Object::Proxy($x) => $body,
            Object::TypedArray($x) => $body,
        }
    };
}

impl InternalSlots for Object {
    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        object_dispatch!(self, x => x.get_backing_object(agent))
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        object_dispatch!(self, x => x.set_backing_object(agent, backing_object))
    }

    fn create_backing_object(self, agent: &mut Agent) -> OrdinaryObject {
        object_dispatch!(self, x => x.create_backing_object(agent))
    }

    fn internal_prototype(self, agent: &Agent) -> Option<Object> {
        object_dispatch!(self, x => x.internal_prototype(agent))
    }

    fn internal_set_prototype(self, agent: &mut Agent, prototype: Option<Object>) {
        object_dispatch!(self, x => x.internal_set_prototype(agent, prototype))
    }

    fn internal_extensible(self, agent: &Agent) -> bool {
        object_dispatch!(self, x => x.internal_extensible(agent))
    }

    fn internal_set_extensible(self, agent: &mut Agent, value: bool) {
        object_dispatch!(self, x => x.internal_set_extensible(agent, value))
    }
}

impl InternalMethods for Object {
    fn internal_get_prototype_of(self, agent: &mut Agent) -> JsResult<Option<Object>> {
        object_dispatch!(self, x => x.internal_get_prototype_of(agent))
    }

    fn internal_set_prototype_of(
        self,
        agent: &mut Agent,
        prototype: Option<Object>,
    ) -> JsResult<bool> {
        object_dispatch!(self, x => x.internal_set_prototype_of(agent, prototype))
    }

    fn internal_is_extensible(self, agent: &mut Agent) -> JsResult<bool> {
        object_dispatch!(self, x => x.internal_is_extensible(agent))
    }

    fn internal_prevent_extensions(self, agent: &mut Agent) -> JsResult<bool> {
        object_dispatch!(self, x => x.internal_prevent_extensions(agent))
    }

    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        object_dispatch!(self, x => x.internal_get_own_property(agent, property_key))
    }

    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        object_dispatch!(self, x => x.internal_define_own_property(agent, property_key, property_descriptor))
    }

    fn internal_has_property(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        object_dispatch!(self, x => x.internal_has_property(agent, property_key))
    }

    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        object_dispatch!(self, x => x.internal_get(agent, property_key, receiver))
    }

    fn internal_set(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        value: Value,
        receiver: Value,
    ) -> JsResult<bool> {
        object_dispatch!(self, x => x.internal_set(agent, property_key, value, receiver))
    }

    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        object_dispatch!(self, x => x.internal_delete(agent, property_key))
    }

    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        object_dispatch!(self, x => x.internal_own_property_keys(agent))
    }
}
