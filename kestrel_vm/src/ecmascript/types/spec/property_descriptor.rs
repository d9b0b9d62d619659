// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.2.6 The Property Descriptor Specification Type](https://tc39.es/ecma262/#sec-property-descriptor-specification-type)

use crate::ecmascript::abstract_operations::operations_on_objects::{
    create_data_property_or_throw, get, has_property,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::is_callable;
use crate::ecmascript::abstract_operations::type_conversion::to_boolean;
use crate::ecmascript::builtins::ordinary::ordinary_object_create_with_intrinsics;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{Function, IntoValue, Object, PropertyKey, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

/// A partial record of the six property attributes. `None` means the field is
/// absent. For `get` and `set`, `Some(None)` is the present-but-undefined
/// attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// \[\[Value]]
    pub value: Option<Value>,

    /// \[\[Writable]]
    pub writable: Option<bool>,

    /// \[\[Get]]
    pub get: Option<Option<Function>>,

    /// \[\[Set]]
    pub set: Option<Option<Function>>,

    /// \[\[Enumerable]]
    pub enumerable: Option<bool>,

    /// \[\[Configurable]]
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn new_data_descriptor(value: Value) -> Self {
        PropertyDescriptor {
            value: Some(value),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Default::default()
        }
    }

    /// ### [6.2.6.1 IsAccessorDescriptor ( Desc )](https://tc39.es/ecma262/#sec-isaccessordescriptor)
    pub fn is_accessor_descriptor(&self) -> bool {
        // 1. If Desc is undefined, return false.
        // 2. If Desc has a [[Get]] field, return true.
        // 3. If Desc has a [[Set]] field, return true.
        // 4. Return false.
        self.get.is_some() || self.set.is_some()
    }

    /// ### [6.2.6.2 IsDataDescriptor ( Desc )](https://tc39.es/ecma262/#sec-isdatadescriptor)
    pub fn is_data_descriptor(&self) -> bool {
        // 2. If Desc has a [[Value]] field, return true.
        // 3. If Desc has a [[Writable]] field, return true.
        // 4. Return false.
        self.value.is_some() || self.writable.is_some()
    }

    /// ### [6.2.6.3 IsGenericDescriptor ( Desc )](https://tc39.es/ecma262/#sec-isgenericdescriptor)
    pub fn is_generic_descriptor(&self) -> bool {
        // 2. If IsAccessorDescriptor(Desc) is true, return false.
        // 3. If IsDataDescriptor(Desc) is true, return false.
        // 4. Return true.
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    pub fn has_fields(&self) -> bool {
        self.value.is_some()
            || self.writable.is_some()
            || self.get.is_some()
            || self.set.is_some()
            || self.enumerable.is_some()
            || self.configurable.is_some()
    }

    pub fn is_fully_populated(&self) -> bool {
        let populated_data = self.value.is_some() && self.writable.is_some();
        let populated_accessor = self.get.is_some() && self.set.is_some();
        (populated_data ^ populated_accessor)
            && self.enumerable.is_some()
            && self.configurable.is_some()
    }

    /// Fill in the defaults of [CompletePropertyDescriptor](https://tc39.es/ecma262/#sec-completepropertydescriptor).
    pub(crate) fn into_fully_populated(self) -> Self {
        if self.is_accessor_descriptor() {
            PropertyDescriptor {
                get: Some(self.get.unwrap_or(None)),
                set: Some(self.set.unwrap_or(None)),
                enumerable: Some(self.enumerable.unwrap_or(false)),
                configurable: Some(self.configurable.unwrap_or(false)),
                ..Default::default()
            }
        } else {
            PropertyDescriptor {
                value: Some(self.value.unwrap_or(Value::Undefined)),
                writable: Some(self.writable.unwrap_or(false)),
                enumerable: Some(self.enumerable.unwrap_or(false)),
                configurable: Some(self.configurable.unwrap_or(false)),
                ..Default::default()
            }
        }
    }

    /// ### [6.2.6.4 FromPropertyDescriptor ( Desc )](https://tc39.es/ecma262/#sec-frompropertydescriptor)
    pub fn from_property_descriptor(
        desc: Option<Self>,
        agent: &mut Agent,
    ) -> JsResult<Option<Object>> {
        // 1. If Desc is undefined, return undefined.
        let Some(desc) = desc else {
            return Ok(None);
        };
        // 2. Let obj be OrdinaryObjectCreate(%Object.prototype%).
        let obj = ordinary_object_create_with_intrinsics(agent, Some(ProtoIntrinsics::Object));
        // 4. If Desc has a [[Value]] field, then
        if let Some(value) = desc.value {
            // a. Perform ! CreateDataPropertyOrThrow(obj, "value", Desc.[[Value]]).
            let key = PropertyKey::from_static_str(agent, "value");
            create_data_property_or_throw(agent, obj, key, value)?;
        }
        // 5. If Desc has a [[Writable]] field, then
        if let Some(writable) = desc.writable {
            // a. Perform ! CreateDataPropertyOrThrow(obj, "writable", Desc.[[Writable]]).
            let key = PropertyKey::from_static_str(agent, "writable");
            create_data_property_or_throw(agent, obj, key, writable.into())?;
        }
        // 6. If Desc has a [[Get]] field, then
        if let Some(get) = desc.get {
            // a. Perform ! CreateDataPropertyOrThrow(obj, "get", Desc.[[Get]]).
            let key = PropertyKey::from_static_str(agent, "get");
            let get = get.map_or(Value::Undefined, |f| f.into_value());
            create_data_property_or_throw(agent, obj, key, get)?;
        }
        // 7. If Desc has a [[Set]] field, then
        if let Some(set) = desc.set {
            // a. Perform ! CreateDataPropertyOrThrow(obj, "set", Desc.[[Set]]).
            let key = PropertyKey::from_static_str(agent, "set");
            let set = set.map_or(Value::Undefined, |f| f.into_value());
            create_data_property_or_throw(agent, obj, key, set)?;
        }
        // 8. If Desc has an [[Enumerable]] field, then
        if let Some(enumerable) = desc.enumerable {
            let key = PropertyKey::from_static_str(agent, "enumerable");
            create_data_property_or_throw(agent, obj, key, enumerable.into())?;
        }
        // 9. If Desc has a [[Configurable]] field, then
        if let Some(configurable) = desc.configurable {
            let key = PropertyKey::from_static_str(agent, "configurable");
            create_data_property_or_throw(agent, obj, key, configurable.into())?;
        }
        // 10. Return obj.
        Ok(Some(obj))
    }

    /// ### [6.2.6.5 ToPropertyDescriptor ( Obj )](https://tc39.es/ecma262/#sec-topropertydescriptor)
    pub fn to_property_descriptor(agent: &mut Agent, obj: Value) -> JsResult<Self> {
        // 1. If Obj is not an Object, throw a TypeError exception.
        let Ok(obj) = Object::try_from(obj) else {
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Property descriptor must be an object",
            ));
        };
        // 2. Let desc be a new Property Descriptor that initially has no fields.
        let mut desc = PropertyDescriptor::default();
        // 3. Let hasEnumerable be ? HasProperty(Obj, "enumerable").
        let enumerable_key = PropertyKey::from_static_str(agent, "enumerable");
        if has_property(agent, obj, enumerable_key)? {
            // a. Let enumerable be ToBoolean(? Get(Obj, "enumerable")).
            let enumerable = get(agent, obj, enumerable_key)?;
            // b. Set desc.[[Enumerable]] to enumerable.
            desc.enumerable = Some(to_boolean(agent, enumerable));
        }
        // 5. Let hasConfigurable be ? HasProperty(Obj, "configurable").
        let configurable_key = PropertyKey::from_static_str(agent, "configurable");
        if has_property(agent, obj, configurable_key)? {
            let configurable = get(agent, obj, configurable_key)?;
            desc.configurable = Some(to_boolean(agent, configurable));
        }
        // 7. Let hasValue be ? HasProperty(Obj, "value").
        let value_key = PropertyKey::from_static_str(agent, "value");
        if has_property(agent, obj, value_key)? {
            desc.value = Some(get(agent, obj, value_key)?);
        }
        // 9. Let hasWritable be ? HasProperty(Obj, "writable").
        let writable_key = PropertyKey::from_static_str(agent, "writable");
        if has_property(agent, obj, writable_key)? {
            let writable = get(agent, obj, writable_key)?;
            desc.writable = Some(to_boolean(agent, writable));
        }
        // 11. Let hasGet be ? HasProperty(Obj, "get").
        let get_key = PropertyKey::from_static_str(agent, "get");
        if has_property(agent, obj, get_key)? {
            // a. Let getter be ? Get(Obj, "get").
            let getter = get(agent, obj, get_key)?;
            // b. If IsCallable(getter) is false and getter is not undefined,
            //    throw a TypeError exception.
            if !is_callable(getter) && !getter.is_undefined() {
                return Err(
                    agent.throw_exception(ExceptionType::TypeError, "getter is not callable")
                );
            }
            // c. Set desc.[[Get]] to getter.
            desc.get = Some(Function::try_from(getter).ok());
        }
        // 13. Let hasSet be ? HasProperty(Obj, "set").
        let set_key = PropertyKey::from_static_str(agent, "set");
        if has_property(agent, obj, set_key)? {
            let setter = get(agent, obj, set_key)?;
            if !is_callable(setter) && !setter.is_undefined() {
                return Err(
                    agent.throw_exception(ExceptionType::TypeError, "setter is not callable")
                );
            }
            desc.set = Some(Function::try_from(setter).ok());
        }
        // 15. If desc has a [[Get]] field or desc has a [[Set]] field, then
        if (desc.get.is_some() || desc.set.is_some())
            && (desc.value.is_some() || desc.writable.is_some())
        {
            // a. If desc has a [[Value]] field or desc has a [[Writable]]
            //    field, throw a TypeError exception.
            return Err(agent.throw_exception(
                ExceptionType::TypeError,
                "Over-defined property descriptor",
            ));
        }
        // 16. Return desc.
        Ok(desc)
    }
}

impl HeapMark for PropertyDescriptor {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.value.mark_values(queues);
        if let Some(Some(get)) = self.get {
            get.mark_values(queues);
        }
        if let Some(Some(set)) = self.set {
            set.mark_values(queues);
        }
    }
}
