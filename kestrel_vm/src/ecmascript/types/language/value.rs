// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [6.1 ECMAScript Language Types](https://tc39.es/ecma262/#sec-ecmascript-language-types)

use super::{BigInt, Number, PrivateName, String, Symbol};
use crate::ecmascript::abstract_operations::type_conversion::{
    to_big_int, to_int32, to_number, to_numeric, to_object, to_string, to_uint32,
};
use crate::ecmascript::builtins::control_abstraction_objects::async_generator_objects::AsyncGenerator;
use crate::ecmascript::builtins::control_abstraction_objects::generator_objects::Generator;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_resolving_functions::PromiseResolvingFunction;
use crate::ecmascript::builtins::error::Error;
use crate::ecmascript::builtins::indexed_collections::array_objects::ArrayIterator;
use crate::ecmascript::builtins::module::Module;
use crate::ecmascript::builtins::primitive_objects::PrimitiveObject;
use crate::ecmascript::builtins::promise::Promise;
use crate::ecmascript::builtins::proxy::Proxy;
use crate::ecmascript::builtins::typed_array::TypedArray;
use crate::ecmascript::builtins::{
    ArgumentsObject, Array, ArrayBuffer, BoundFunction, BuiltinFunction, DataView,
    ECMAScriptFunction,
};
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{Object, OrdinaryObject};
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [6.1 ECMAScript Language Types](https://tc39.es/ecma262/#sec-ecmascript-language-types)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Value {
    /// ### [6.1.1 The Undefined Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-undefined-type)
    #[default]
    Undefined,

    /// ### [6.1.2 The Null Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-null-type)
    Null,

    /// ### [6.1.3 The Boolean Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-boolean-type)
    Boolean(bool),

    /// ### [6.1.4 The String Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-string-type)
    String(String),

    /// ### [6.1.5 The Symbol Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-symbol-type)
    Symbol(Symbol),

    /// ### [6.1.6.1 The Number Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-number-type)
    Number(Number),

    /// ### [6.1.6.2 The BigInt Type](https://tc39.es/ecma262/#sec-ecmascript-language-types-bigint-type)
    BigInt(BigInt),

    /// ### [6.2.12 Private Names](https://tc39.es/ecma262/#sec-private-names)
    ///
    /// Specification-internal; never observable from language code.
    PrivateName(PrivateName),

    /// ### [6.1.7 The Object Type](https://tc39.es/ecma262/#sec-object-type)
    Object(OrdinaryObject),

    // Function objects.
    BoundFunction(BoundFunction),
    BuiltinFunction(BuiltinFunction),
    ECMAScriptFunction(ECMAScriptFunction),
    PromiseResolvingFunction(PromiseResolvingFunction),

    // Exotic and slotted object variants. The variant tag selects the
    // internal-method suite at construction time.
    Arguments(ArgumentsObject),
    Array(Array),
    ArrayBuffer(ArrayBuffer),
    ArrayIterator(ArrayIterator),
    AsyncGenerator(AsyncGenerator),
    DataView(DataView),
    Error(Error),
    Generator(Generator),
    Module(Module),
    PrimitiveObject(PrimitiveObject),
    Promise(Promise),
    Proxy(Proxy),
    TypedArray(TypedArray),
}

pub trait IntoValue: Sized + Copy {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl Value {
    pub fn from_f64(value: f64) -> Self {
        Value::Number(Number::from(value))
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_boolean(self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_string(self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_symbol(self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    pub fn is_number(self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_bigint(self) -> bool {
        matches!(self, Value::BigInt(_))
    }

    pub fn is_object(self) -> bool {
        Object::try_from(self).is_ok()
    }

    pub fn is_primitive(self) -> bool {
        !self.is_object()
    }

    pub fn to_number(self, agent: &mut Agent) -> JsResult<Number> {
        to_number(agent, self)
    }

    pub fn to_numeric(self, agent: &mut Agent) -> JsResult<Value> {
        to_numeric(agent, self)
    }

    pub fn to_big_int(self, agent: &mut Agent) -> JsResult<BigInt> {
        to_big_int(agent, self)
    }

    pub fn to_int32(self, agent: &mut Agent) -> JsResult<i32> {
        to_int32(agent, self)
    }

    pub fn to_uint32(self, agent: &mut Agent) -> JsResult<u32> {
        to_uint32(agent, self)
    }

    pub fn to_string(self, agent: &mut Agent) -> JsResult<String> {
        to_string(agent, self)
    }

    pub fn to_object(self, agent: &mut Agent) -> JsResult<Object> {
        to_object(agent, self)
    }

    /// A string conversion that never throws, for exception messages and
    /// inspection output. Symbols render as their descriptive string.
    pub fn string_repr(self, agent: &mut Agent) -> String {
        if let Value::Symbol(symbol) = self {
            return symbol.descriptive_string(agent);
        }
        match self.to_string(agent) {
            Ok(result) => result,
            Err(_) => {
                debug_assert!(self.is_object());
                String::from_static_str(agent, "[object Object]")
            }
        }
    }

    /// ### [13.5.3 The `typeof` operator](https://tc39.es/ecma262/#sec-typeof-operator)
    pub fn typeof_string(self, agent: &mut Agent) -> String {
        let name: &'static str = match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::PrivateName(_) => unreachable!("typeof of a Private Name"),
            Value::BoundFunction(_)
            | Value::BuiltinFunction(_)
            | Value::ECMAScriptFunction(_)
            | Value::PromiseResolvingFunction(_) => "function",
            Value::Proxy(proxy) => {
                if proxy.is_callable(agent) {
                    "function"
                } else {
                    "object"
                }
            }
            _ => "object",
        };
        String::from_static_str(agent, name)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Undefined, |v| v.into())
    }
}

impl TryFrom<Value> for String {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::String(string) = value {
            Ok(string)
        } else {
            Err(())
        }
    }
}

impl TryFrom<Value> for Number {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Number(number) = value {
            Ok(number)
        } else {
            Err(())
        }
    }
}

impl TryFrom<Value> for Symbol {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Symbol(symbol) = value {
            Ok(symbol)
        } else {
            Err(())
        }
    }
}

impl HeapMark for Value {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            Value::Undefined | Value::Null | Value::Boolean(_) | Value::Number(_) => {}
            Value::String(x) => x.mark_values(queues),
            Value::Symbol(x) => x.mark_values(queues),
            Value::BigInt(x) => x.mark_values(queues),
            Value::PrivateName(x) => x.mark_values(queues),
            Value::Object(x) => x.mark_values(queues),
            Value::BoundFunction(x) => x.mark_values(queues),
            Value::BuiltinFunction(x) => x.mark_values(queues),
            Value::ECMAScriptFunction(x) => x.mark_values(queues),
            Value::PromiseResolvingFunction(x) => x.mark_values(queues),
            Value::Arguments(x) => x.mark_values(queues),
            Value::Array(x) => x.mark_values(queues),
            Value::ArrayBuffer(x) => x.mark_values(queues),
            Value::ArrayIterator(x) => x.mark_values(queues),
            Value::AsyncGenerator(x) => x.mark_values(queues),
            Value::DataView(x) => x.mark_values(queues),
            Value::Error(x) => x.mark_values(queues),
            Value::Generator(x) => x.mark_values(queues),
            Value::Module(x) => x.mark_values(queues),
            Value::PrimitiveObject(x) => x.mark_values(queues),
            Value::Promise(x) => x.mark_values(queues),
            Value::Proxy(x) => x.mark_values(queues),
            Value::TypedArray(x) => x.mark_values(queues),
        }
    }
}
