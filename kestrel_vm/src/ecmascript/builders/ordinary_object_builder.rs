// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builder for populating intrinsic prototype objects.
//!
//! Prototype member defaults: data properties are `{ [[Writable]]: true,
//! [[Enumerable]]: false, [[Configurable]]: true }`, accessors
//! `{ [[Enumerable]]: false, [[Configurable]]: true }`. Individual entries
//! may override the attribute patch.

use crate::ecmascript::builtins::builtin_function::{
    create_builtin_function, Behaviour, Builtin, BuiltinFunctionArgs, BuiltinGetter,
};
use crate::ecmascript::execution::{Agent, RealmIdentifier};
use crate::ecmascript::types::{
    IntoValue, Object, OrdinaryObject, PropertyDescriptor, PropertyKey, Value,
};
use crate::heap::ObjectEntry;

pub(crate) struct OrdinaryObjectBuilder<'agent> {
    agent: &'agent mut Agent,
    realm: RealmIdentifier,
    this: OrdinaryObject,
    prototype: Option<Object>,
    extensible: bool,
    entries: Vec<ObjectEntry>,
}

impl<'agent> OrdinaryObjectBuilder<'agent> {
    /// Populates an already allocated intrinsic object.
    pub(crate) fn new_intrinsic_object(
        agent: &'agent mut Agent,
        realm: RealmIdentifier,
        this: OrdinaryObject,
    ) -> Self {
        OrdinaryObjectBuilder {
            agent,
            realm,
            this,
            prototype: None,
            extensible: true,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub(crate) fn with_prototype(mut self, prototype: Object) -> Self {
        self.prototype = Some(prototype);
        self
    }

    #[must_use]
    pub(crate) fn with_extensible(mut self, extensible: bool) -> Self {
        self.extensible = extensible;
        self
    }

    #[must_use]
    pub(crate) fn with_property(mut self, entry: ObjectEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Installs a data property with the prototype-member defaults.
    #[must_use]
    pub(crate) fn with_data_property(mut self, key: PropertyKey, value: Value) -> Self {
        self.entries
            .push(ObjectEntry::new_prototype_data_entry(key, value));
        self
    }

    /// Creates the builtin function described by `T` and installs it under
    /// its name.
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

    /// Creates the builtin getter described by `T` and installs it as an
    /// accessor property.
    #[must_use]
    pub(crate) fn with_builtin_function_getter_property<T: BuiltinGetter>(
        mut self,
        key_name: &'static str,
    ) -> Self {
        let getter = create_builtin_function(
            self.agent,
            T::BEHAVIOUR,
            BuiltinFunctionArgs::new(0, T::NAME, self.realm),
        );
        let key = PropertyKey::from_static_str(self.agent, key_name);
        self.entries.push(ObjectEntry::new_prototype_accessor_entry(
            key,
            Some(getter.into()),
            None,
        ));
        self
    }

    /// A `@@toStringTag` entry: `{ [[Writable]]: false, [[Enumerable]]:
    /// false, [[Configurable]]: true }`.
    #[must_use]
    pub(crate) fn with_to_string_tag(mut self, tag: &'static str) -> Self {
        let tag = crate::ecmascript::types::String::from_static_str(self.agent, tag);
        self.entries.push(ObjectEntry {
            key: PropertyKey::Symbol(crate::heap::WellKnownSymbolIndexes::ToStringTag.into()),
            descriptor: PropertyDescriptor {
                value: Some(tag.into_value()),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        });
        self
    }

    pub(crate) fn build(self) -> OrdinaryObject {
        let OrdinaryObjectBuilder {
            agent,
            realm: _,
            this,
            prototype,
            extensible,
            entries,
        } = self;
        let data = &mut agent[this];
        if let Some(prototype) = prototype {
            data.prototype = Some(prototype);
        }
        data.extensible = extensible;
        for entry in entries {
            let descriptor = entry.descriptor.into_fully_populated();
            agent[this].define_property(entry.key, descriptor);
        }
        this
    }

    pub(crate) fn agent(&mut self) -> &mut Agent {
        self.agent
    }
}

/// Creates a standalone intrinsic function (e.g. `%ThrowTypeError%` or the
/// per-prototype method intrinsics that other intrinsics reference).
pub(crate) fn create_intrinsic_function<T: Builtin>(
    agent: &mut Agent,
    realm: RealmIdentifier,
) -> crate::ecmascript::builtins::BuiltinFunction {
    debug_assert!(matches!(T::BEHAVIOUR, Behaviour::Regular(_)));
    create_builtin_function(
        agent,
        T::BEHAVIOUR,
        BuiltinFunctionArgs::new(T::LENGTH as u32, T::NAME, realm),
    )
}
