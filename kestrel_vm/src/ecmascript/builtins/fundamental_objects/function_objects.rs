// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.2 Function Objects](https://tc39.es/ecma262/#sec-function-objects)
//!
//! `%Function.prototype%` is an ordinary object here rather than a callable
//! that returns undefined; the `Function` constructor itself (string
//! compilation) is not carried.

use crate::ecmascript::abstract_operations::operations_on_objects::call;
use crate::ecmascript::builders::OrdinaryObjectBuilder;
use crate::ecmascript::builtins::bound_function::bound_function_create;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{Function, IntoValue, String, Value};

/// The `%ThrowTypeError%` intrinsic function object.
pub(crate) struct ThrowTypeError;

impl Builtin for ThrowTypeError {
    const NAME: &'static str = "";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(throw_type_error);
}

/// ### [10.2.4.1 %ThrowTypeError% ( )](https://tc39.es/ecma262/#sec-%throwtypeerror%)
fn throw_type_error(agent: &mut Agent, _this: Value, _arguments: ArgumentsList) -> JsResult<Value> {
    // 1. Throw a TypeError exception.
    Err(agent.throw_exception_with_static_message(
        ExceptionType::TypeError,
        "'caller', 'callee', and 'arguments' properties may not be accessed on strict mode functions",
    ))
}

struct FunctionPrototypeCall;
impl Builtin for FunctionPrototypeCall {
    const NAME: &'static str = "call";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(function_prototype_call);
}

/// ### [20.2.3.3 Function.prototype.call ( thisArg, ...args )](https://tc39.es/ecma262/#sec-function.prototype.call)
fn function_prototype_call(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let func be the this value.
    // 2. If IsCallable(func) is false, throw a TypeError exception.
    // 3. Perform PrepareForTailCall(). (Tail call context reuse is not
    //    performed.)
    // 4. Return ? Call(func, thisArg, args).
    let this_arg = arguments.get(0);
    let args = if arguments.len() > 1 {
        &arguments[1..]
    } else {
        &[]
    };
    call(agent, this_value, this_arg, Some(args))
}

struct FunctionPrototypeApply;
impl Builtin for FunctionPrototypeApply {
    const NAME: &'static str = "apply";
    const LENGTH: u8 = 2;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(function_prototype_apply);
}

/// ### [20.2.3.1 Function.prototype.apply ( thisArg, argArray )](https://tc39.es/ecma262/#sec-function.prototype.apply)
fn function_prototype_apply(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let this_arg = arguments.get(0);
    let arg_array = arguments.get(1);
    // 3. If argArray is either undefined or null, return ? Call(func,
    //    thisArg).
    if arg_array.is_undefined() || arg_array.is_null() {
        return call(agent, this_value, this_arg, None);
    }
    // 4. Let argList be ? CreateListFromArrayLike(argArray).
    let args = create_list_from_array_like(agent, arg_array)?;
    // 5. Return ? Call(func, thisArg, argList).
    call(agent, this_value, this_arg, Some(&args))
}

/// ### [7.3.20 CreateListFromArrayLike ( obj )](https://tc39.es/ecma262/#sec-createlistfromarraylike)
pub(crate) fn create_list_from_array_like(agent: &mut Agent, obj: Value) -> JsResult<Vec<Value>> {
    use crate::ecmascript::abstract_operations::operations_on_objects::{
        get, length_of_array_like,
    };
    use crate::ecmascript::types::{Object, PropertyKey};
    // 1. If obj is not an Object, throw a TypeError exception.
    let Ok(obj) = Object::try_from(obj) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Arguments list must be an object",
        ));
    };
    // 2. Let len be ? LengthOfArrayLike(obj).
    let len = length_of_array_like(agent, obj)?;
    // 3-4. Get the indexed elements in order.
    let mut list = Vec::with_capacity(len as usize);
    for index in 0..len {
        let next = get(agent, obj, PropertyKey::Integer(index as u32))?;
        list.push(next);
    }
    // 5. Return list.
    Ok(list)
}

struct FunctionPrototypeBind;
impl Builtin for FunctionPrototypeBind {
    const NAME: &'static str = "bind";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(function_prototype_bind);
}

/// ### [20.2.3.2 Function.prototype.bind ( thisArg, ...args )](https://tc39.es/ecma262/#sec-function.prototype.bind)
fn function_prototype_bind(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let Target be the this value.
    // 2. If IsCallable(Target) is false, throw a TypeError exception.
    let Ok(target) = Function::try_from(this_value) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Bind must be called on a function",
        ));
    };
    let this_arg = arguments.get(0);
    let bound_args = if arguments.len() > 1 {
        &arguments[1..]
    } else {
        &[]
    };
    // 3. Let F be ? BoundFunctionCreate(Target, thisArg, args).
    let function = bound_function_create(agent, target, this_arg, bound_args)?;
    // 4-10. The bound name carries a "bound " prefix.
    let name = match target {
        Function::ECMAScriptFunction(f) => agent[f].name,
        Function::BuiltinFunction(f) => Some(agent[f].initial_name),
        Function::BoundFunction(f) => agent[f].name,
        Function::PromiseResolvingFunction(_) => None,
    };
    let name = name.map_or_else(std::string::String::new, |name| {
        name.to_string_lossy(agent).into_owned()
    });
    let bound_name = String::from_string(agent, format!("bound {}", name));
    agent[function].name = Some(bound_name);
    // 11. Return F.
    Ok(function.into_value())
}

struct FunctionPrototypeToString;
impl Builtin for FunctionPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(function_prototype_to_string);
}

/// ### [20.2.3.5 Function.prototype.toString ( )](https://tc39.es/ecma262/#sec-function.prototype.tostring)
fn function_prototype_to_string(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    let Ok(function) = Function::try_from(this_value) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Function.prototype.toString requires a function this value",
        ));
    };
    let text = match function {
        // 2. If func is an ECMAScript function and
        //    HostHasSourceTextAvailable(func) is true, return the source
        //    text.
        Function::ECMAScriptFunction(f) if agent.host_hooks.has_source_text_available(function) => {
            let span = agent[f].source_text;
            let source_code = agent[f].source_code;
            let text = source_code.source_text(agent);
            text.get(span.start as usize..span.end as usize)
                .map(|text| text.to_string())
        }
        _ => None,
    };
    let text = text.unwrap_or_else(|| {
        // 3. Return an implementation-defined String source code
        //    representation: a native-function form.
        "function () { [native code] }".to_string()
    });
    Ok(String::from_string(agent, text).into_value())
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let function_prototype = agent[realm].intrinsics().function_prototype();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, function_prototype)
        .with_builtin_function_property::<FunctionPrototypeApply>()
        .with_builtin_function_property::<FunctionPrototypeBind>()
        .with_builtin_function_property::<FunctionPrototypeCall>()
        .with_builtin_function_property::<FunctionPrototypeToString>()
        .build();
}
