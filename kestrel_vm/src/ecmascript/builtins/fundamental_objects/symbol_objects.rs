// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.4 Symbol Objects](https://tc39.es/ecma262/#sec-symbol-objects)

use crate::ecmascript::abstract_operations::type_conversion::to_string;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::primitive_objects::PrimitiveObjectData;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{IntoValue, Object, PropertyKey, Symbol, Value};
use crate::heap::{ObjectEntry, WellKnownSymbolIndexes};

pub(crate) struct SymbolConstructor;
impl Builtin for SymbolConstructor {
    const NAME: &'static str = "Symbol";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [20.4.1.1 Symbol ( \[ description \] )](https://tc39.es/ecma262/#sec-symbol-description)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    // 1. If NewTarget is not undefined, throw a TypeError exception.
    if new_target.is_some() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Symbol is not a constructor",
        ));
    }
    // 2. If description is undefined, let descString be undefined.
    let description = arguments.get(0);
    let descriptor = if description.is_undefined() {
        None
    } else {
        // 3. Else, let descString be ? ToString(description).
        Some(to_string(agent, description)?)
    };
    // 4. Return a new Symbol whose [[Description]] is descString.
    Ok(agent.heap.alloc_symbol(descriptor).into_value())
}

struct SymbolFor;
impl Builtin for SymbolFor {
    const NAME: &'static str = "for";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(symbol_for);
}

/// ### [20.4.2.2 Symbol.for ( key )](https://tc39.es/ecma262/#sec-symbol.for)
fn symbol_for(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 1. Let stringKey be ? ToString(key).
    let string_key = to_string(agent, arguments.get(0))?;
    // 2. For each element e of the GlobalSymbolRegistry List: if SameValue
    //    is true, return e.[[Symbol]].
    if let Some(symbol) = agent.global_symbol_registry.get(&string_key) {
        return Ok(symbol.into_value());
    }
    // 3-5. Generate a new Symbol and append it to the registry.
    let new_symbol = agent.heap.alloc_symbol(Some(string_key));
    agent.global_symbol_registry.insert(string_key, new_symbol);
    // 6. Return newSymbol.
    Ok(new_symbol.into_value())
}

struct SymbolPrototypeToString;
impl Builtin for SymbolPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_to_string);
}

/// ### [20.4.3.3 Symbol.prototype.toString ( )](https://tc39.es/ecma262/#sec-symbol.prototype.tostring)
fn prototype_to_string(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let sym be ? ThisSymbolValue(this value).
    let symbol = this_symbol_value(agent, this_value)?;
    // 2. Return SymbolDescriptiveString(sym).
    Ok(symbol.descriptive_string(agent).into_value())
}

struct SymbolPrototypeValueOf;
impl Builtin for SymbolPrototypeValueOf {
    const NAME: &'static str = "valueOf";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(prototype_value_of);
}

/// ### [20.4.3.4 Symbol.prototype.valueOf ( )](https://tc39.es/ecma262/#sec-symbol.prototype.valueof)
fn prototype_value_of(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    Ok(this_symbol_value(agent, this_value)?.into_value())
}

fn this_symbol_value(agent: &mut Agent, value: Value) -> JsResult<Symbol> {
    match value {
        Value::Symbol(symbol) => Ok(symbol),
        Value::PrimitiveObject(object) => {
            if let PrimitiveObjectData::Symbol(symbol) = object.data(agent) {
                Ok(symbol)
            } else {
                Err(agent.throw_exception_with_static_message(
                    ExceptionType::TypeError,
                    "this is not a Symbol",
                ))
            }
        }
        _ => Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a Symbol",
        )),
    }
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.symbol();
    let prototype = intrinsics.symbol_prototype;

    // 20.4.2 Properties of the Symbol Constructor: the well-known symbols as
    // frozen data properties.
    let mut builder = BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .with_builtin_function_property::<SymbolFor>();
    for (name, symbol) in [
        ("asyncIterator", WellKnownSymbolIndexes::AsyncIterator),
        ("hasInstance", WellKnownSymbolIndexes::HasInstance),
        (
            "isConcatSpreadable",
            WellKnownSymbolIndexes::IsConcatSpreadable,
        ),
        ("iterator", WellKnownSymbolIndexes::Iterator),
        ("match", WellKnownSymbolIndexes::Match),
        ("matchAll", WellKnownSymbolIndexes::MatchAll),
        ("replace", WellKnownSymbolIndexes::Replace),
        ("search", WellKnownSymbolIndexes::Search),
        ("species", WellKnownSymbolIndexes::Species),
        ("split", WellKnownSymbolIndexes::Split),
        ("toPrimitive", WellKnownSymbolIndexes::ToPrimitive),
        ("toStringTag", WellKnownSymbolIndexes::ToStringTag),
        ("unscopables", WellKnownSymbolIndexes::Unscopables),
    ] {
        let key = PropertyKey::from_static_str(builder.agent(), name);
        builder = builder.with_property(ObjectEntry::new_frozen_entry(
            key,
            Symbol::from(symbol).into_value(),
        ));
    }
    builder.build();

    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<SymbolPrototypeToString>()
        .with_builtin_function_property::<SymbolPrototypeValueOf>()
        .with_to_string_tag("Symbol")
        .build();
}
