// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder for populating intrinsic constructor functions: static methods
//! and the `.prototype` ↔ `.constructor` wiring, with `.prototype`
//! non-writable and non-configurable.

use crate::ecmascript::builtins::builtin_function::{
    create_builtin_function, Builtin, BuiltinFunction, BuiltinFunctionArgs,
};
use crate::ecmascript::execution::{Agent, RealmIdentifier};
use crate::ecmascript::types::{
    InternalSlots, IntoValue, Object, OrdinaryObject, PropertyDescriptor, PropertyKey, Value,
};
use crate::heap::ObjectEntry;

pub(crate) struct BuiltinFunctionBuilder<'agent> {
    agent: &'agent mut Agent,
    realm: RealmIdentifier,
    this: BuiltinFunction,
    entries: Vec<ObjectEntry>,
}

impl<'agent> BuiltinFunctionBuilder<'agent> {
    /// Populates an already created intrinsic constructor.
    pub(crate) fn new_intrinsic_constructor(
        agent: &'agent mut Agent,
        realm: RealmIdentifier,
        this: BuiltinFunction,
    ) -> Self {
        BuiltinFunctionBuilder {
            agent,
            realm,
            this,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_property(mut self, entry: ObjectEntry) -> Self {
        self.entries.push(entry);
        self
    }

    #[must_use]
    pub(crate) fn with_data_property(mut self, key: PropertyKey, value: Value) -> Self {
        self.entries
            .push(ObjectEntry::new_prototype_data_entry(key, value));
        self
    }

    #[must_use]
    pub(crate) fn with_builtin_function_property<T: Builtin>(mut self) -> Self {
        let function = create_builtin_function(
            self.agent,
            T::BEHAVIOUR,
            BuiltinFunctionArgs::new(T::LENGTH as u32, T::NAME, self.realm),
        );
        let key = PropertyKey::from_static_str(self.agent, T::NAME);
        self.entries.push(ObjectEntry {
            key,
            descriptor: PropertyDescriptor {
                value: Some(function.into_value()),
                writable: Some(T::WRITABLE),
                enumerable: Some(T::ENUMERABLE),
                configurable: Some(T::CONFIGURABLE),
                ..Default::default()
            },
        });
        self
    }

    /// Wires `this.prototype` (non-writable, non-configurable) and
    /// `prototype.constructor` (writable, non-enumerable, configurable).
    #[must_use]
    pub(crate) fn with_prototype_property(mut self, prototype: Object) -> Self {
        let prototype_key = PropertyKey::from_static_str(self.agent, "prototype");
        self.entries.push(ObjectEntry::new_frozen_entry(
            prototype_key,
            prototype.into_value(),
        ));
        let constructor_key = PropertyKey::from_static_str(self.agent, "constructor");
        if let Object::Object(prototype) = prototype {
            let descriptor = PropertyDescriptor {
                value: Some(self.this.into_value()),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            }
            .into_fully_populated();
            self.agent[prototype].define_property(constructor_key, descriptor);
        }
        self
    }

    pub(crate) fn agent(&mut self) -> &mut Agent {
        self.agent
    }

    pub(crate) fn build(self) -> BuiltinFunction {
        let BuiltinFunctionBuilder {
            agent,
            realm: _,
            this,
            entries,
        } = self;
        let backing: OrdinaryObject = this.get_or_create_backing_object(agent);
        for entry in entries {
            let descriptor = entry.descriptor.into_fully_populated();
            agent[backing].define_property(entry.key, descriptor);
        }
        this
    }
}
