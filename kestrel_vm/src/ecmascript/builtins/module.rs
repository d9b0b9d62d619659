// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.4.6 Module Namespace Exotic Objects](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects)
//!
//! The [`Module`] handle doubles as the module namespace exotic object:
//! null prototype, non-extensible, string keys sorted lexicographically.
//! `Get` of an exported name resolves through the module's binding table,
//! recursively through re-exports, and throws a ReferenceError when the
//! target environment is not yet initialized.

pub mod data;

use crate::ecmascript::builtins::ordinary::set_immutable_prototype;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::scripts_and_modules::module::{resolve_export, ResolveExportResult};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Object, OrdinaryObject, PropertyDescriptor,
    PropertyKey, String, Value,
};
use crate::heap::indexes::ModuleIndex;
use crate::heap::mark::{HeapMark, WorkQueues};
use crate::heap::WellKnownSymbolIndexes;

pub use data::ModuleHeapData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct Module(pub(crate) ModuleIndex);

impl Module {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }

    fn exported_key(self, agent: &Agent, property_key: PropertyKey) -> Option<String> {
        let PropertyKey::String(name) = property_key else {
            return None;
        };
        if agent[self].exports.contains(&name) {
            Some(name)
        } else {
            None
        }
    }

    /// The binding lookup behind `Get`: resolve the export, then read the
    /// target module's environment.
    fn get_export(self, agent: &mut Agent, name: String) -> JsResult<Value> {
        // 10. Let binding be m.ResolveExport(P).
        let binding = resolve_export(agent, self, name, &mut Vec::new());
        // 11. Assert: binding is a ResolvedBinding Record.
        let Some(ResolveExportResult::Resolved { module, binding_name }) = binding else {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::ReferenceError,
                "Could not resolve module export",
            ));
        };
        // 13. Let targetEnv be targetModule.[[Environment]].
        let Some(binding_name) = binding_name else {
            // 12. If binding.[[BindingName]] is NAMESPACE, return
            //     GetModuleNamespace(targetModule).
            return Ok(module.into_value());
        };
        let Some(target_env) = agent[module].cyclic.environment else {
            // 14. If targetEnv is EMPTY, throw a ReferenceError exception.
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::ReferenceError,
                "Cannot access module binding before initialization",
            ));
        };
        // 15. Return ? targetEnv.GetBindingValue(binding.[[BindingName]],
        //     true).
        target_env.get_binding_value(agent, binding_name)
    }
}

impl core::ops::Index<Module> for Agent {
    type Output = ModuleHeapData;

    fn index(&self, index: Module) -> &Self::Output {
        self.heap
            .modules
            .get(index.get_index())
            .expect("Module out of bounds")
            .as_ref()
            .expect("Module slot empty")
    }
}

impl core::ops::IndexMut<Module> for Agent {
    fn index_mut(&mut self, index: Module) -> &mut Self::Output {
        self.heap
            .modules
            .get_mut(index.get_index())
            .expect("Module out of bounds")
            .as_mut()
            .expect("Module slot empty")
    }
}

impl From<Module> for Object {
    fn from(value: Module) -> Self {
        Object::Module(value)
    }
}

impl IntoValue for Module {
    fn into_value(self) -> Value {
        Value::Module(self)
    }
}

impl crate::ecmascript::types::IntoObject for Module {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for Module {
    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }

    /// ### [10.4.6.1 \[\[GetPrototypeOf]] ( )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-getprototypeof)
    fn internal_prototype(self, _agent: &Agent) -> Option<Object> {
        // 1. Return null.
        None
    }

    fn internal_set_prototype(self, _agent: &mut Agent, _prototype: Option<Object>) {}

    /// ### [10.4.6.3 \[\[IsExtensible]] ( )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-isextensible)
    fn internal_extensible(self, _agent: &Agent) -> bool {
        // 1. Return false.
        false
    }

    fn internal_set_extensible(self, _agent: &mut Agent, _value: bool) {}
}

impl InternalMethods for Module {
    /// ### [10.4.6.2 \[\[SetPrototypeOf]] ( V )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-setprototypeof-v)
    fn internal_set_prototype_of(
        self,
        agent: &mut Agent,
        prototype: Option<Object>,
    ) -> JsResult<bool> {
        // 1. Return ! SetImmutablePrototype(O, V).
        set_immutable_prototype(agent, self.into(), prototype)
    }

    /// ### [10.4.6.4 \[\[PreventExtensions]] ( )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-preventextensions)
    fn internal_prevent_extensions(self, _agent: &mut Agent) -> JsResult<bool> {
        // 1. Return true.
        Ok(true)
    }

    /// ### [10.4.6.5 \[\[GetOwnProperty]] ( P )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-getownproperty-p)
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        // 1. If P is a Symbol, return OrdinaryGetOwnProperty(O, P).
        if property_key.is_symbol() {
            return Ok(self.get_backing_object(agent).and_then(|backing_object| {
                crate::ecmascript::builtins::ordinary::ordinary_get_own_property(
                    agent,
                    backing_object,
                    property_key,
                )
            }));
        }
        // 2./3. If P is not an exported name, return undefined.
        let Some(name) = self.exported_key(agent, property_key) else {
            return Ok(None);
        };
        // 4. Let value be ? O.[[Get]](P, O).
        let value = self.get_export(agent, name)?;
        // 5. Return PropertyDescriptor { [[Value]]: value, [[Writable]]:
        //    true, [[Enumerable]]: true, [[Configurable]]: false }.
        Ok(Some(PropertyDescriptor {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(false),
            ..Default::default()
        }))
    }

    /// ### [10.4.6.6 \[\[DefineOwnProperty]] ( P, Desc )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-defineownproperty-p-desc)
    fn internal_define_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        property_descriptor: PropertyDescriptor,
    ) -> JsResult<bool> {
        // 1. If P is a Symbol, return ! OrdinaryDefineOwnProperty(O, P,
        //    Desc).
        if property_key.is_symbol() {
            let backing_object = self.get_or_create_backing_object(agent);
            return Ok(
                crate::ecmascript::builtins::ordinary::ordinary_define_own_property(
                    agent,
                    backing_object,
                    property_key,
                    property_descriptor,
                ),
            );
        }
        // 2. Let current be ? O.[[GetOwnProperty]](P).
        let Some(current) = self.internal_get_own_property(agent, property_key)? else {
            // 3. If current is undefined, return false.
            return Ok(false);
        };
        // 4-7. Only a compatible data descriptor is accepted.
        if property_descriptor.is_accessor_descriptor()
            || property_descriptor.writable == Some(false)
            || property_descriptor.enumerable == Some(false)
            || property_descriptor.configurable == Some(true)
        {
            return Ok(false);
        }
        // 8. If Desc has a [[Value]] field, return SameValue(Desc.[[Value]],
        //    current.[[Value]]).
        if let Some(value) = property_descriptor.value {
            return Ok(
                crate::ecmascript::abstract_operations::testing_and_comparison::same_value(
                    agent,
                    value,
                    current.value.expect("namespace properties are data"),
                ),
            );
        }
        // 9. Return true.
        Ok(true)
    }

    /// ### [10.4.6.7 \[\[HasProperty]] ( P )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-hasproperty-p)
    fn internal_has_property(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        // 1. If P is a Symbol, return ! OrdinaryHasProperty(O, P).
        if property_key.is_symbol() {
            return crate::ecmascript::builtins::ordinary::ordinary_has_property(
                agent,
                self.into(),
                property_key,
            );
        }
        // 2./3. Return whether P is an exported name.
        Ok(self.exported_key(agent, property_key).is_some())
    }

    /// ### [10.4.6.8 \[\[Get]] ( P, Receiver )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-get-p-receiver)
    fn internal_get(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
        receiver: Value,
    ) -> JsResult<Value> {
        // 1. If P is a Symbol, return ! OrdinaryGet(O, P, Receiver).
        if property_key.is_symbol() {
            return crate::ecmascript::builtins::ordinary::ordinary_get(
                agent,
                self.into(),
                property_key,
                receiver,
            );
        }
        // 2./3. If P is not an exported name, return undefined.
        let Some(name) = self.exported_key(agent, property_key) else {
            return Ok(Value::Undefined);
        };
        self.get_export(agent, name)
    }

    /// ### [10.4.6.9 \[\[Set]] ( P, V, Receiver )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-set-p-v-receiver)
    fn internal_set(
        self,
        _agent: &mut Agent,
        _property_key: PropertyKey,
        _value: Value,
        _receiver: Value,
    ) -> JsResult<bool> {
        // 1. Return false.
        Ok(false)
    }

    /// ### [10.4.6.10 \[\[Delete]] ( P )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-delete-p)
    fn internal_delete(self, agent: &mut Agent, property_key: PropertyKey) -> JsResult<bool> {
        // 1. If P is a Symbol, return ! OrdinaryDelete(O, P).
        if property_key.is_symbol() {
            return match self.get_backing_object(agent) {
                Some(backing_object) => Ok(crate::ecmascript::builtins::ordinary::ordinary_delete(
                    agent,
                    backing_object,
                    property_key,
                )),
                None => Ok(true),
            };
        }
        // 2./3. Deleting an export fails; deleting a non-export succeeds.
        Ok(self.exported_key(agent, property_key).is_none())
    }

    /// ### [10.4.6.11 \[\[OwnPropertyKeys]] ( )](https://tc39.es/ecma262/#sec-module-namespace-exotic-objects-ownpropertykeys)
    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        // 1. Let exports be O.[[Exports]]: already sorted lexicographically.
        let mut keys: Vec<PropertyKey> = agent[self]
            .exports
            .iter()
            .map(|name| PropertyKey::String(*name))
            .collect();
        // 2. Let symbolKeys be OrdinaryOwnPropertyKeys(O).
        if let Some(backing_object) = self.get_backing_object(agent) {
            keys.extend(
                backing_object
                    .internal_own_property_keys(agent)?
                    .into_iter()
                    .filter(|key| key.is_symbol()),
            );
        }
        // 3. Return the list-concatenation of exports and symbolKeys.
        Ok(keys)
    }
}

/// ### [10.4.6.12 ModuleNamespaceCreate ( module, exports )](https://tc39.es/ecma262/#sec-modulenamespacecreate)
///
/// Installs the `@@toStringTag` property on the namespace's backing object.
pub(crate) fn module_namespace_create(agent: &mut Agent, module: Module) {
    let backing_object = module.get_or_create_backing_object(agent);
    let tag = String::from_static_str(agent, "Module");
    agent[backing_object].define_property(
        PropertyKey::Symbol(WellKnownSymbolIndexes::ToStringTag.into()),
        PropertyDescriptor {
            value: Some(tag.into_value()),
            writable: Some(false),
            enumerable: Some(false),
            configurable: Some(false),
            ..Default::default()
        },
    );
}

impl HeapMark for Module {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.modules.push(*self);
    }
}
