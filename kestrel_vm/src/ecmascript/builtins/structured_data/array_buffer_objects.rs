// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.1 ArrayBuffer Objects](https://tc39.es/ecma262/#sec-arraybuffer-objects)

use crate::ecmascript::abstract_operations::type_conversion::to_index;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::array_buffer::abstract_operations::allocate_array_buffer;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin, BuiltinGetter};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{Function, IntoValue, Object, Value};

pub(crate) struct ArrayBufferConstructor;
impl Builtin for ArrayBufferConstructor {
    const NAME: &'static str = "ArrayBuffer";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [25.1.4.1 ArrayBuffer ( length )](https://tc39.es/ecma262/#sec-arraybuffer-length)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    // 1. If NewTarget is undefined, throw a TypeError exception.
    let Some(new_target) = new_target else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "ArrayBuffer constructor requires new",
        ));
    };
    // 2. Let byteLength be ? ToIndex(length).
    let byte_length = to_index(agent, arguments.get(0))?;
    // 4. Return ? AllocateArrayBuffer(NewTarget, byteLength).
    let new_target = Function::try_from(new_target).expect("NewTarget is a constructor");
    Ok(allocate_array_buffer(agent, new_target, byte_length as u64)?.into_value())
}

struct ArrayBufferPrototypeGetByteLength;
impl Builtin for ArrayBufferPrototypeGetByteLength {
    const NAME: &'static str = "get byteLength";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(get_byte_length);
}
impl BuiltinGetter for ArrayBufferPrototypeGetByteLength {}

/// ### [25.1.6.2 get ArrayBuffer.prototype.byteLength](https://tc39.es/ecma262/#sec-get-arraybuffer.prototype.bytelength)
fn get_byte_length(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1-3. Perform ? RequireInternalSlot(O, [[ArrayBufferData]]).
    let Value::ArrayBuffer(buffer) = this_value else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not an ArrayBuffer",
        ));
    };
    // 4. If IsDetachedBuffer(O) is true, return +0𝔽.
    // 5. Let length be O.[[ArrayBufferByteLength]].
    // 6. Return 𝔽(length).
    Ok(Value::from_f64(buffer.byte_length(agent) as f64))
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.array_buffer();
    let prototype = intrinsics.array_buffer_prototype;

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .build();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_getter_property::<ArrayBufferPrototypeGetByteLength>("byteLength")
        .with_to_string_tag("ArrayBuffer")
        .build();
}
