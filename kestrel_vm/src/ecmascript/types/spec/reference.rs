// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.2.5 The Reference Record Specification Type](https://tc39.es/ecma262/#sec-reference-record-specification-type)
//!
//! References are produced by identifier and property-access evaluation and
//! consumed by `GetValue` / `PutValue`. They are never first-class language
//! values.

use crate::ecmascript::abstract_operations::operations_on_objects::{
    private_get, private_set, set,
};
use crate::ecmascript::abstract_operations::type_conversion::to_object;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::environments::EnvironmentIndex;
use crate::ecmascript::execution::{get_global_object, Agent, JsResult};
use crate::ecmascript::types::{
    InternalMethods, Object, PrivateName, PropertyKey, String, Value,
};
use crate::heap::mark::{HeapMark, WorkQueues};

/// \[\[Base]]
#[derive(Debug, Clone, Copy)]
pub enum Base {
    Value(Value),
    Environment(EnvironmentIndex),
    Unresolvable,
}

/// \[\[ReferencedName]]
#[derive(Debug, Clone, Copy)]
pub enum ReferencedName {
    PropertyKey(PropertyKey),
    PrivateName(PrivateName),
}

#[derive(Debug, Clone, Copy)]
pub struct Reference {
    /// \[\[Base]]
    pub(crate) base: Base,

    /// \[\[ReferencedName]]
    pub(crate) referenced_name: ReferencedName,

    /// \[\[Strict]]
    pub(crate) strict: bool,

    /// \[\[ThisValue]]
    pub(crate) this_value: Option<Value>,
}

impl Reference {
    /// ### [6.2.5.1 IsPropertyReference ( V )](https://tc39.es/ecma262/#sec-ispropertyreference)
    pub(crate) fn is_property_reference(&self) -> bool {
        match self.base {
            // 1. if V.[[Base]] is unresolvable, return false.
            Base::Unresolvable => false,
            // 2. If V.[[Base]] is an Environment Record, return false; otherwise return true.
            Base::Environment(_) => false,
            Base::Value(_) => true,
        }
    }

    /// ### [6.2.5.2 IsUnresolvableReference ( V )](https://tc39.es/ecma262/#sec-isunresolvablereference)
    pub(crate) fn is_unresolvable_reference(&self) -> bool {
        // 1. If V.[[Base]] is unresolvable, return true; otherwise return false.
        matches!(self.base, Base::Unresolvable)
    }

    /// ### [6.2.5.3 IsSuperReference ( V )](https://tc39.es/ecma262/#sec-issuperreference)
    pub(crate) fn is_super_reference(&self) -> bool {
        // 1. If V.[[ThisValue]] is not empty, return true; otherwise return false.
        self.this_value.is_some()
    }

    /// ### [6.2.5.4 IsPrivateReference ( V )](https://tc39.es/ecma262/#sec-isprivatereference)
    pub(crate) fn is_private_reference(&self) -> bool {
        // 1. If V.[[ReferencedName]] is a Private Name, return true; otherwise return false.
        matches!(self.referenced_name, ReferencedName::PrivateName(_))
    }

    pub(crate) fn property_key(&self) -> PropertyKey {
        match self.referenced_name {
            ReferencedName::PropertyKey(key) => key,
            ReferencedName::PrivateName(_) => unreachable!("private reference has no property key"),
        }
    }

    pub(crate) fn identifier(&self) -> String {
        match self.referenced_name {
            ReferencedName::PropertyKey(PropertyKey::String(name)) => name,
            _ => unreachable!("environment reference name is always a String"),
        }
    }
}

/// ### [6.2.5.5 GetValue ( V )](https://tc39.es/ecma262/#sec-getvalue)
pub fn get_value(agent: &mut Agent, reference: &Reference) -> JsResult<Value> {
    match reference.base {
        Base::Value(base) => {
            // 3. If IsPropertyReference(V) is true, then
            // a. Let baseObj be ? ToObject(V.[[Base]]).
            let base_obj = to_object(agent, base)?;
            // b. If IsPrivateReference(V) is true, then
            if let ReferencedName::PrivateName(private_name) = reference.referenced_name {
                // i. Return ? PrivateGet(baseObj, V.[[ReferencedName]]).
                return private_get(agent, base_obj, private_name);
            }
            // c. Return ? baseObj.[[Get]](V.[[ReferencedName]], GetThisValue(V)).
            let this_value = get_this_value(reference);
            base_obj.internal_get(agent, reference.property_key(), this_value)
        }
        Base::Environment(env) => {
            // 4. Else,
            // a. Assert: base is an Environment Record.
            // b. Return ? base.GetBindingValue(V.[[ReferencedName]], V.[[Strict]]).
            env.get_binding_value(agent, reference.identifier(), reference.strict)
        }
        Base::Unresolvable => {
            // 2. If IsUnresolvableReference(V) is true, throw a ReferenceError exception.
            let name = match reference.referenced_name {
                ReferencedName::PropertyKey(key) => key.as_display_string(agent),
                ReferencedName::PrivateName(name) => {
                    name.description(agent).to_string_lossy(agent).into_owned()
                }
            };
            Err(agent.throw_exception(
                ExceptionType::ReferenceError,
                format!("{} is not defined", name),
            ))
        }
    }
}

/// ### [6.2.5.6 PutValue ( V, W )](https://tc39.es/ecma262/#sec-putvalue)
pub fn put_value(agent: &mut Agent, reference: &Reference, value: Value) -> JsResult<()> {
    match reference.base {
        Base::Unresolvable => {
            // 2. If IsUnresolvableReference(V) is true, then
            if reference.strict {
                // a. If V.[[Strict]] is true, throw a ReferenceError exception.
                let name = reference.property_key().as_display_string(agent);
                return Err(agent.throw_exception(
                    ExceptionType::ReferenceError,
                    format!("{} is not defined", name),
                ));
            }
            // b. Let globalObj be GetGlobalObject().
            let global_obj = get_global_object(agent);
            // c. Perform ? Set(globalObj, V.[[ReferencedName]], W, false).
            set(agent, global_obj, reference.property_key(), value, false)?;
            // d. Return unused.
            Ok(())
        }
        Base::Value(base) => {
            // 3. If IsPropertyReference(V) is true, then
            // a. Let baseObj be ? ToObject(V.[[Base]]).
            let base_obj = to_object(agent, base)?;
            // b. If IsPrivateReference(V) is true, then
            if let ReferencedName::PrivateName(private_name) = reference.referenced_name {
                // i. Return ? PrivateSet(baseObj, V.[[ReferencedName]], W).
                return private_set(agent, base_obj, private_name, value);
            }
            // c. Let succeeded be ? baseObj.[[Set]](V.[[ReferencedName]], W, GetThisValue(V)).
            let this_value = get_this_value(reference);
            let succeeded =
                base_obj.internal_set(agent, reference.property_key(), value, this_value)?;
            // d. If succeeded is false and V.[[Strict]] is true, throw a TypeError exception.
            if !succeeded && reference.strict {
                let name = reference.property_key().as_display_string(agent);
                return Err(agent.throw_exception(
                    ExceptionType::TypeError,
                    format!("Could not set property {}", name),
                ));
            }
            // e. Return unused.
            Ok(())
        }
        Base::Environment(env) => {
            // 4. Else,
            // a. Assert: base is an Environment Record.
            // b. Return ? base.SetMutableBinding(V.[[ReferencedName]], W, V.[[Strict]]).
            env.set_mutable_binding(agent, reference.identifier(), value, reference.strict)
        }
    }
}

/// ### [6.2.5.7 GetThisValue ( V )](https://tc39.es/ecma262/#sec-getthisvalue)
pub fn get_this_value(reference: &Reference) -> Value {
    // 1. Assert: IsPropertyReference(V) is true.
    debug_assert!(reference.is_property_reference());
    // 2. If IsSuperReference(V) is true, return V.[[ThisValue]]; otherwise return V.[[Base]].
    reference.this_value.unwrap_or(match reference.base {
        Base::Value(value) => value,
        _ => unreachable!(),
    })
}

/// ### [6.2.5.8 InitializeReferencedBinding ( V, W )](https://tc39.es/ecma262/#sec-initializereferencedbinding)
pub fn initialize_referenced_binding(
    agent: &mut Agent,
    reference: &Reference,
    value: Value,
) -> JsResult<()> {
    // 1. Assert: IsUnresolvableReference(V) is false.
    debug_assert!(!reference.is_unresolvable_reference());
    // 2. Assert: base is an Environment Record.
    let Base::Environment(env) = reference.base else {
        unreachable!()
    };
    // 3. Return ? base.InitializeBinding(V.[[ReferencedName]], W).
    env.initialize_binding(agent, reference.identifier(), value)
}

/// Builds a property reference for an ordinary (non-super) access.
pub(crate) fn new_property_reference(base: Value, key: PropertyKey, strict: bool) -> Reference {
    Reference {
        base: Base::Value(base),
        referenced_name: ReferencedName::PropertyKey(key),
        strict,
        this_value: None,
    }
}

/// Builds a private property reference.
pub(crate) fn new_private_reference(base: Value, name: PrivateName, strict: bool) -> Reference {
    Reference {
        base: Base::Value(base),
        referenced_name: ReferencedName::PrivateName(name),
        strict,
        this_value: None,
    }
}

/// Builds a super property reference per
/// [MakeSuperPropertyReference](https://tc39.es/ecma262/#sec-makesuperpropertyreference).
pub(crate) fn new_super_reference(
    base: Object,
    key: PropertyKey,
    this_value: Value,
    strict: bool,
) -> Reference {
    Reference {
        base: Base::Value(base.into()),
        referenced_name: ReferencedName::PropertyKey(key),
        strict,
        this_value: Some(this_value),
    }
}

impl HeapMark for Reference {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self.base {
            Base::Value(value) => value.mark_values(queues),
            Base::Environment(env) => env.mark_values(queues),
            Base::Unresolvable => {}
        }
        match self.referenced_name {
            ReferencedName::PropertyKey(key) => key.mark_values(queues),
            ReferencedName::PrivateName(name) => name.mark_values(queues),
        }
        self.this_value.mark_values(queues);
    }
}
