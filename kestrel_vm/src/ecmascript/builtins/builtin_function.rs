// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [10.3 Built-in Function Objects](https://tc39.es/ecma262/#sec-built-in-function-objects)

use core::ops::Deref;

use crate::ecmascript::execution::{
    Agent, ExecutionContext, JsResult, ProtoIntrinsics, RealmIdentifier,
};
use crate::ecmascript::types::{
    Function, InternalMethods, InternalSlots, IntoObject, IntoValue, Object, OrdinaryObject,
    PropertyDescriptor, PropertyKey, String, Value,
};
use crate::heap::indexes::BuiltinFunctionIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

/// The arguments of a builtin function call. Out-of-range reads produce
/// undefined.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentsList<'a>(pub(crate) &'a [Value]);

impl<'a> Deref for ArgumentsList<'a> {
    type Target = &'a [Value];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ArgumentsList<'_> {
    #[inline]
    pub fn get(&self, index: usize) -> Value {
        *self.0.get(index).unwrap_or(&Value::Undefined)
    }
}

pub type RegularFn = fn(&mut Agent, Value, ArgumentsList<'_>) -> JsResult<Value>;
pub type ConstructorFn =
    fn(&mut Agent, Value, ArgumentsList<'_>, Option<Object>) -> JsResult<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Regular(RegularFn),
    Constructor(ConstructorFn),
}

impl Behaviour {
    pub(crate) fn is_constructor(&self) -> bool {
        matches!(self, Behaviour::Constructor(_))
    }
}

/// A statically described builtin function: the name, length and behaviour
/// installed by the intrinsic builders.
pub trait Builtin {
    const NAME: &'static str;
    const LENGTH: u8;
    const BEHAVIOUR: Behaviour;

    /// If the builtin is installed as a property then this controls the
    /// property's attributes.
    const WRITABLE: bool = true;
    const ENUMERABLE: bool = false;
    const CONFIGURABLE: bool = true;
}

/// Marker for builtins installed as getter functions of accessor properties.
pub trait BuiltinGetter: Builtin {}

#[derive(Debug, Clone, Copy)]
#[repr(transparent)]
pub struct BuiltinFunction(pub(crate) BuiltinFunctionIndex);

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for BuiltinFunction {}

#[derive(Debug)]
pub struct BuiltinFunctionHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[Realm]]
    pub(crate) realm: RealmIdentifier,
    /// \[\[InitialName]]
    pub(crate) initial_name: String,
    pub(crate) length: u8,
    pub(crate) behaviour: Behaviour,
}

#[derive(Debug)]
pub struct BuiltinFunctionArgs {
    pub length: u32,
    pub name: &'static str,
    pub realm: RealmIdentifier,
    pub prototype: Option<Object>,
}

impl BuiltinFunctionArgs {
    pub fn new(length: u32, name: &'static str, realm: RealmIdentifier) -> Self {
        Self {
            length,
            name,
            realm,
            prototype: None,
        }
    }
}

impl BuiltinFunction {
    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }
}

impl core::ops::Index<BuiltinFunction> for Agent {
    type Output = BuiltinFunctionHeapData;

    fn index(&self, index: BuiltinFunction) -> &Self::Output {
        self.heap
            .builtin_functions
            .get(index.get_index())
            .expect("BuiltinFunction out of bounds")
            .as_ref()
            .expect("BuiltinFunction slot empty")
    }
}

impl core::ops::IndexMut<BuiltinFunction> for Agent {
    fn index_mut(&mut self, index: BuiltinFunction) -> &mut Self::Output {
        self.heap
            .builtin_functions
            .get_mut(index.get_index())
            .expect("BuiltinFunction out of bounds")
            .as_mut()
            .expect("BuiltinFunction slot empty")
    }
}

impl From<BuiltinFunction> for Object {
    fn from(value: BuiltinFunction) -> Self {
        Object::BuiltinFunction(value)
    }
}

impl IntoObject for BuiltinFunction {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl IntoValue for BuiltinFunction {
    fn into_value(self) -> Value {
        Value::BuiltinFunction(self)
    }
}

impl crate::ecmascript::types::IntoFunction for BuiltinFunction {
    fn into_function(self) -> Function {
        Function::BuiltinFunction(self)
    }
}

impl From<BuiltinFunction> for Function {
    fn from(value: BuiltinFunction) -> Self {
        Function::BuiltinFunction(value)
    }
}

impl InternalSlots for BuiltinFunction {
    const DEFAULT_PROTOTYPE: ProtoIntrinsics = ProtoIntrinsics::Function;

    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }

    fn create_backing_object(self, agent: &mut Agent) -> OrdinaryObject {
        debug_assert!(self.get_backing_object(agent).is_none());
        let prototype = self.internal_prototype(agent);
        let backing_object = OrdinaryObject::create_object(agent, prototype, &[]);
        // Materialize the virtual `length` and `name` properties so that
        // later defines and deletes see them.
        let length_key = PropertyKey::from_static_str(agent, "length");
        let name_key = PropertyKey::from_static_str(agent, "name");
        for key in [length_key, name_key] {
            let descriptor = builtin_virtual_property(agent, self, key)
                .expect("virtual property must exist")
                .into_fully_populated();
            agent[backing_object].define_property(key, descriptor);
        }
        self.set_backing_object(agent, backing_object);
        backing_object
    }
}

impl InternalMethods for BuiltinFunction {
    /// Builtin functions expose `length` and `name` as lazily materialized
    /// own properties.
    fn internal_get_own_property(
        self,
        agent: &mut Agent,
        property_key: PropertyKey,
    ) -> JsResult<Option<PropertyDescriptor>> {
        if let Some(backing_object) = self.get_backing_object(agent) {
            return backing_object.internal_get_own_property(agent, property_key);
        }
        Ok(builtin_virtual_property(agent, self, property_key))
    }

    fn internal_own_property_keys(self, agent: &mut Agent) -> JsResult<Vec<PropertyKey>> {
        if let Some(backing_object) = self.get_backing_object(agent) {
            return backing_object.internal_own_property_keys(agent);
        }
        let length_key = PropertyKey::from_static_str(agent, "length");
        let name_key = PropertyKey::from_static_str(agent, "name");
        Ok(vec![length_key, name_key])
    }
}

fn builtin_virtual_property(
    agent: &mut Agent,
    function: BuiltinFunction,
    property_key: PropertyKey,
) -> Option<PropertyDescriptor> {
    let length_key = PropertyKey::from_static_str(agent, "length");
    let name_key = PropertyKey::from_static_str(agent, "name");
    let value = if property_key == length_key {
        Value::from(crate::ecmascript::types::Number::from(
            agent[function].length as u32,
        ))
    } else if property_key == name_key {
        agent[function].initial_name.into_value()
    } else {
        return None;
    };
    Some(PropertyDescriptor {
        value: Some(value),
        writable: Some(false),
        enumerable: Some(false),
        configurable: Some(true),
        ..Default::default()
    })
}

/// ### [10.3.1 \[\[Call]] and 10.3.2 \[\[Construct]]](https://tc39.es/ecma262/#sec-built-in-function-objects-call-thisargument-argumentslist)
pub(crate) fn builtin_call_or_construct(
    agent: &mut Agent,
    f: BuiltinFunction,
    this_argument: Option<Value>,
    arguments_list: ArgumentsList,
    new_target: Option<Function>,
) -> JsResult<Value> {
    // 1. Let callerContext be the running execution context.
    // 2. If callerContext is not already suspended, suspend callerContext.
    // 3. Let calleeContext be a new execution context.
    let callee_context = ExecutionContext {
        // 8. Perform any necessary implementation-defined initialization of
        //    calleeContext.
        ecmascript_code: None,
        // 4. Set the Function of calleeContext to F.
        function: Some(Function::BuiltinFunction(f)),
        // 5. Let calleeRealm be F.[[Realm]].
        // 6. Set the Realm of calleeContext to calleeRealm.
        realm: agent[f].realm,
        // 7. Set the ScriptOrModule of calleeContext to null.
        script_or_module: None,
    };
    // 9. Push calleeContext onto the execution context stack.
    agent.execution_context_stack.push(callee_context);
    // 10. Let result be the Completion Record that is the result of
    //     evaluating F in a manner that conforms to the specification of F.
    //     If thisArgument is provided, the this value is thisArgument;
    //     otherwise the this value is undefined. If newTarget is provided,
    //     newTarget provides the NewTarget value.
    let result = match agent[f].behaviour {
        Behaviour::Regular(behaviour) => {
            behaviour(agent, this_argument.unwrap_or(Value::Undefined), arguments_list)
        }
        Behaviour::Constructor(behaviour) => behaviour(
            agent,
            this_argument.unwrap_or(Value::Undefined),
            arguments_list,
            new_target.map(|target| target.into_object()),
        ),
    };
    // 11. Remove calleeContext from the execution context stack and restore
    //     callerContext as the running execution context.
    agent.execution_context_stack.pop();
    // 12. Return ? result.
    result
}

/// ### [10.3.4 CreateBuiltinFunction ( behaviour, length, name, realm, prototype, prefix )](https://tc39.es/ecma262/#sec-createbuiltinfunction)
pub fn create_builtin_function(
    agent: &mut Agent,
    behaviour: Behaviour,
    args: BuiltinFunctionArgs,
) -> BuiltinFunction {
    // 2. If realm is not present, set realm to the current Realm Record.
    let realm = args.realm;
    // 7. Set func.[[InitialName]] to null.
    let initial_name = String::from_static_str(agent, args.name);
    // 4-6, 8-13. Allocate the function with its length and name.
    agent.heap.builtin_functions.push(Some(BuiltinFunctionHeapData {
        object_index: None,
        realm,
        initial_name,
        length: args.length as u8,
        behaviour,
    }));
    let f = BuiltinFunction(BuiltinFunctionIndex::last(&agent.heap.builtin_functions));
    // 3. If prototype is not present, set prototype to
    //    realm.[[Intrinsics]].[[%Function.prototype%]]. The default prototype
    //    is materialized lazily; an explicit prototype gets an eager backing
    //    object. This path must stay independent of the realm's intrinsics,
    //    which do not exist yet while the intrinsics themselves bootstrap.
    if let Some(prototype) = args.prototype {
        let backing_object = OrdinaryObject::create_object(agent, Some(prototype), &[]);
        let length_key = PropertyKey::from_static_str(agent, "length");
        let name_key = PropertyKey::from_static_str(agent, "name");
        for key in [length_key, name_key] {
            let descriptor = builtin_virtual_property(agent, f, key)
                .expect("virtual property must exist")
                .into_fully_populated();
            agent[backing_object].define_property(key, descriptor);
        }
        agent[f].object_index = Some(backing_object);
    }
    f
}

impl HeapMark for BuiltinFunction {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.builtin_functions.push(*self);
    }
}

impl HeapMark for BuiltinFunctionHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        queues.realms.push(self.realm);
        self.initial_name.mark_values(queues);
    }
}
