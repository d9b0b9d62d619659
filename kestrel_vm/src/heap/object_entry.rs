// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::{Function, PropertyDescriptor, PropertyKey, Value};

/// A property blueprint used when creating objects during intrinsic
/// bootstrap. Missing attributes are completed with the usual defaults when
/// the entry is written into property storage.
#[derive(Debug, Clone)]
pub struct ObjectEntry {
    pub key: PropertyKey,
    pub descriptor: PropertyDescriptor,
}

impl ObjectEntry {
    /// A prototype member data property: `{ [[Writable]]: true,
    /// [[Enumerable]]: false, [[Configurable]]: true }`.
    pub(crate) fn new_prototype_data_entry(key: PropertyKey, value: Value) -> Self {
        ObjectEntry {
            key,
            descriptor: PropertyDescriptor {
                value: Some(value),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        }
    }

    /// A prototype member accessor property: `{ [[Enumerable]]: false,
    /// [[Configurable]]: true }`.
    pub(crate) fn new_prototype_accessor_entry(
        key: PropertyKey,
        get: Option<Function>,
        set: Option<Function>,
    ) -> Self {
        ObjectEntry {
            key,
            descriptor: PropertyDescriptor {
                get: Some(get),
                set: Some(set),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        }
    }

    pub(crate) fn new_frozen_entry(key: PropertyKey, value: Value) -> Self {
        ObjectEntry {
            key,
            descriptor: PropertyDescriptor {
                value: Some(value),
                writable: Some(false),
                enumerable: Some(false),
                configurable: Some(false),
                ..Default::default()
            },
        }
    }
}
