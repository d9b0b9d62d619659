// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [20.5 Error Objects](https://tc39.es/ecma262/#sec-error-objects)

use crate::ecmascript::abstract_operations::operations_on_objects::get;
use crate::ecmascript::abstract_operations::type_conversion::to_string;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::error::{error_create, Error};
use crate::ecmascript::builtins::ordinary::get_prototype_from_constructor;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{
    Function, InternalSlots, IntoValue, Object, PropertyKey, String, Value,
};

/// The shared Error constructor behaviour, parameterised by kind.
fn error_constructor_inner(
    agent: &mut Agent,
    kind: ExceptionType,
    proto_intrinsic: crate::ecmascript::execution::ProtoIntrinsics,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    // 2. Let O be ? OrdinaryCreateFromConstructor(newTarget,
    //    "%XError.prototype%", « [[ErrorData]] »).
    let prototype = match new_target.and_then(|target| Function::try_from(target).ok()) {
        Some(new_target) => get_prototype_from_constructor(agent, new_target, proto_intrinsic)?,
        None => Some(
            agent
                .current_realm()
                .intrinsics()
                .get_intrinsic_default_proto(proto_intrinsic),
        ),
    };
    // 3. If message is not undefined, then
    let message = arguments.get(0);
    let message = if message.is_undefined() {
        None
    } else {
        // a. Let msg be ? ToString(message).
        Some(to_string(agent, message)?)
    };
    // 4. Perform ? InstallErrorCause(O, options).
    let options = arguments.get(1);
    let cause = if let Ok(options) = Object::try_from(options) {
        let cause_key = PropertyKey::from_static_str(agent, "cause");
        let has_cause = crate::ecmascript::abstract_operations::operations_on_objects::has_property(
            agent, options, cause_key,
        )?;
        if has_cause {
            Some(get(agent, options, cause_key)?)
        } else {
            None
        }
    } else {
        None
    };
    let error = error_create(agent, kind, message, cause);
    if let Some(prototype) = prototype {
        error.internal_set_prototype(agent, Some(prototype));
    }
    // 5. Return O.
    Ok(error.into_value())
}

macro_rules! error_constructor {
    ($ctor: ident, $name: literal, $kind: ident) => {
        pub(crate) struct $ctor;
        impl Builtin for $ctor {
            const NAME: &'static str = $name;
            const LENGTH: u8 = 1;
            const BEHAVIOUR: Behaviour = Behaviour::Constructor($ctor::behaviour);
        }
        impl $ctor {
            fn behaviour(
                agent: &mut Agent,
                _this: Value,
                arguments: ArgumentsList,
                new_target: Option<Object>,
            ) -> JsResult<Value> {
                error_constructor_inner(
                    agent,
                    ExceptionType::$kind,
                    crate::ecmascript::execution::ProtoIntrinsics::$kind,
                    arguments,
                    new_target,
                )
            }
        }
    };
}

error_constructor!(ErrorConstructor, "Error", Error);
error_constructor!(EvalErrorConstructor, "EvalError", EvalError);
error_constructor!(RangeErrorConstructor, "RangeError", RangeError);
error_constructor!(ReferenceErrorConstructor, "ReferenceError", ReferenceError);
error_constructor!(SyntaxErrorConstructor, "SyntaxError", SyntaxError);
error_constructor!(TypeErrorConstructor, "TypeError", TypeError);
error_constructor!(UriErrorConstructor, "URIError", UriError);
error_constructor!(AggregateErrorConstructor, "AggregateError", AggregateError);

struct ErrorPrototypeToString;
impl Builtin for ErrorPrototypeToString {
    const NAME: &'static str = "toString";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(error_prototype_to_string);
}

/// ### [20.5.3.4 Error.prototype.toString ( )](https://tc39.es/ecma262/#sec-error.prototype.tostring)
fn error_prototype_to_string(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let O be the this value. 2. If O is not an Object, throw a
    //    TypeError exception.
    let Ok(o) = Object::try_from(this_value) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Error.prototype.toString requires an object this value",
        ));
    };
    // 3. Let name be ? Get(O, "name"); if undefined, "Error".
    let name_key = PropertyKey::from_static_str(agent, "name");
    let name = get(agent, o, name_key)?;
    let name = if name.is_undefined() {
        "Error".to_string()
    } else {
        let name = to_string(agent, name)?;
        name.to_string_lossy(agent).into_owned()
    };
    // 5. Let msg be ? Get(O, "message"); if undefined, the empty String.
    let message_key = PropertyKey::from_static_str(agent, "message");
    let message = get(agent, o, message_key)?;
    let message = if message.is_undefined() {
        std::string::String::new()
    } else {
        let message = to_string(agent, message)?;
        message.to_string_lossy(agent).into_owned()
    };
    // 7-9. Concatenate with ": " when both are non-empty.
    let result = if name.is_empty() {
        message
    } else if message.is_empty() {
        name
    } else {
        format!("{}: {}", name, message)
    };
    Ok(String::from_string(agent, result).into_value())
}

/// The shared `stack` getter installed on `%Error.prototype%`; carried here
/// because the error data holds the captured trace directly.
struct ErrorPrototypeStack;
impl Builtin for ErrorPrototypeStack {
    const NAME: &'static str = "stack";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(error_prototype_stack);
}

fn error_prototype_stack(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    if let Value::Error(error) = this_value {
        let error: Error = error;
        Ok(error
            .stack(agent)
            .map_or(Value::Undefined, |stack| stack.into_value()))
    } else {
        Ok(Value::Undefined)
    }
}

fn bootstrap_native_error(
    agent: &mut Agent,
    realm: RealmIdentifier,
    constructor: crate::ecmascript::builtins::BuiltinFunction,
    prototype: crate::ecmascript::types::OrdinaryObject,
    name: &'static str,
) {
    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .build();
    let name_key = PropertyKey::from_static_str(agent, "name");
    let name_value = String::from_static_str(agent, name).into_value();
    let message_key = PropertyKey::from_static_str(agent, "message");
    let empty_message = String::EMPTY.into_value();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_data_property(name_key, name_value)
        .with_data_property(message_key, empty_message)
        .build();
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let error_constructor = intrinsics.error();
    let error_prototype = intrinsics.error_prototype;
    let natives = [
        (intrinsics.eval_error, intrinsics.eval_error_prototype, "EvalError"),
        (intrinsics.range_error, intrinsics.range_error_prototype, "RangeError"),
        (
            intrinsics.reference_error,
            intrinsics.reference_error_prototype,
            "ReferenceError",
        ),
        (
            intrinsics.syntax_error,
            intrinsics.syntax_error_prototype,
            "SyntaxError",
        ),
        (intrinsics.type_error, intrinsics.type_error_prototype, "TypeError"),
        (intrinsics.uri_error, intrinsics.uri_error_prototype, "URIError"),
        (
            intrinsics.aggregate_error,
            intrinsics.aggregate_error_prototype,
            "AggregateError",
        ),
    ];

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, error_constructor)
        .with_prototype_property(error_prototype.into())
        .build();
    let name_key = PropertyKey::from_static_str(agent, "name");
    let name_value = String::from_static_str(agent, "Error").into_value();
    let message_key = PropertyKey::from_static_str(agent, "message");
    let empty_message = String::EMPTY.into_value();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, error_prototype)
        .with_data_property(name_key, name_value)
        .with_data_property(message_key, empty_message)
        .with_builtin_function_property::<ErrorPrototypeToString>()
        .with_builtin_function_getter_property::<ErrorPrototypeStack>("stack")
        .build();

    for (constructor, prototype, name) in natives {
        bootstrap_native_error(agent, realm, constructor, prototype, name);
    }
}

impl crate::ecmascript::builtins::BuiltinGetter for ErrorPrototypeStack {}
