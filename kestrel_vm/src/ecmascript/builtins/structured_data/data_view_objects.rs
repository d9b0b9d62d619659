// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.3 DataView Objects](https://tc39.es/ecma262/#sec-dataview-objects)

use crate::ecmascript::abstract_operations::type_conversion::to_index;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::array_buffer::abstract_operations::{
    is_detached_buffer, throw_detached_buffer, ElementType,
};
use crate::ecmascript::builtins::data_view::abstract_operations::{get_view_value, set_view_value};
use crate::ecmascript::builtins::data_view::{DataView, DataViewHeapData};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics, RealmIdentifier};
use crate::ecmascript::types::{
    Function, InternalSlots, IntoValue, Object, Value,
};
use crate::heap::indexes::DataViewIndex;

pub(crate) struct DataViewConstructor;
impl Builtin for DataViewConstructor {
    const NAME: &'static str = "DataView";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [25.3.2.1 DataView ( buffer \[ , byteOffset \[ , byteLength \] \] )](https://tc39.es/ecma262/#sec-dataview-buffer-byteoffset-bytelength)
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
            "DataView constructor requires new",
        ));
    };
    // 2. Perform ? RequireInternalSlot(buffer, [[ArrayBufferData]]).
    let Value::ArrayBuffer(buffer) = arguments.get(0) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "First argument to DataView constructor must be an ArrayBuffer",
        ));
    };
    // 3. Let offset be ? ToIndex(byteOffset).
    let offset = to_index(agent, arguments.get(1))? as usize;
    // 4. If IsDetachedBuffer(buffer) is true, throw a TypeError exception.
    if is_detached_buffer(agent, buffer) {
        return Err(throw_detached_buffer(agent));
    }
    // 5. Let bufferByteLength be ArrayBufferByteLength(buffer, SEQ-CST).
    let buffer_byte_length = buffer.byte_length(agent);
    // 6. If offset > bufferByteLength, throw a RangeError exception.
    if offset > buffer_byte_length {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Start offset is outside the bounds of the buffer",
        ));
    }
    // 8./9. Determine the view byte length.
    let byte_length_arg = arguments.get(2);
    let view_byte_length = if byte_length_arg.is_undefined() {
        // 8.b. Let viewByteLength be bufferByteLength - offset.
        buffer_byte_length - offset
    } else {
        // 9.a. Let viewByteLength be ? ToIndex(byteLength).
        let view_byte_length = to_index(agent, byte_length_arg)? as usize;
        // 9.b. If offset + viewByteLength > bufferByteLength, throw a
        //      RangeError exception.
        if offset + view_byte_length > buffer_byte_length {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Invalid DataView length",
            ));
        }
        view_byte_length
    };
    // 10. Let O be ? OrdinaryCreateFromConstructor(NewTarget,
    //     "%DataView.prototype%", « ... »).
    let new_target = Function::try_from(new_target).expect("NewTarget is a constructor");
    let prototype = crate::ecmascript::builtins::ordinary::get_prototype_from_constructor(
        agent,
        new_target,
        ProtoIntrinsics::DataView,
    )?;
    // 12-14. Set the view's slots.
    agent.heap.data_views.push(Some(DataViewHeapData {
        object_index: None,
        viewed_array_buffer: buffer,
        byte_length: view_byte_length,
        byte_offset: offset,
    }));
    let view = DataView(DataViewIndex::last(&agent.heap.data_views));
    if let Some(prototype) = prototype {
        view.internal_set_prototype(agent, Some(prototype));
    }
    // 15. Return O.
    Ok(view.into_value())
}

macro_rules! data_view_accessors {
    ($getter: ident, $setter: ident, $get_name: literal, $set_name: literal, $get_fn: ident, $set_fn: ident, $element_type: ident) => {
        struct $getter;
        impl Builtin for $getter {
            const NAME: &'static str = $get_name;
            const LENGTH: u8 = 1;
            const BEHAVIOUR: Behaviour = Behaviour::Regular($get_fn);
        }
        fn $get_fn(
            agent: &mut Agent,
            this_value: Value,
            arguments: ArgumentsList,
        ) -> JsResult<Value> {
            // GetViewValue(view, byteOffset, littleEndian, type).
            get_view_value(
                agent,
                this_value,
                arguments.get(0),
                arguments.get(1),
                ElementType::$element_type,
            )
        }

        struct $setter;
        impl Builtin for $setter {
            const NAME: &'static str = $set_name;
            const LENGTH: u8 = 2;
            const BEHAVIOUR: Behaviour = Behaviour::Regular($set_fn);
        }
        fn $set_fn(
            agent: &mut Agent,
            this_value: Value,
            arguments: ArgumentsList,
        ) -> JsResult<Value> {
            // SetViewValue(view, byteOffset, littleEndian, type, value).
            set_view_value(
                agent,
                this_value,
                arguments.get(0),
                arguments.get(2),
                ElementType::$element_type,
                arguments.get(1),
            )
        }
    };
}

data_view_accessors!(GetInt8, SetInt8, "getInt8", "setInt8", get_int8, set_int8, Int8);
data_view_accessors!(GetUint8, SetUint8, "getUint8", "setUint8", get_uint8, set_uint8, Uint8);
data_view_accessors!(GetInt16, SetInt16, "getInt16", "setInt16", get_int16, set_int16, Int16);
data_view_accessors!(GetUint16, SetUint16, "getUint16", "setUint16", get_uint16, set_uint16, Uint16);
data_view_accessors!(GetInt32, SetInt32, "getInt32", "setInt32", get_int32, set_int32, Int32);
data_view_accessors!(GetUint32, SetUint32, "getUint32", "setUint32", get_uint32, set_uint32, Uint32);
data_view_accessors!(
    GetBigInt64,
    SetBigInt64,
    "getBigInt64",
    "setBigInt64",
    get_big_int64,
    set_big_int64,
    BigInt64
);
data_view_accessors!(
    GetBigUint64,
    SetBigUint64,
    "getBigUint64",
    "setBigUint64",
    get_big_uint64,
    set_big_uint64,
    BigUint64
);
data_view_accessors!(
    GetFloat32,
    SetFloat32,
    "getFloat32",
    "setFloat32",
    get_float32,
    set_float32,
    Float32
);
data_view_accessors!(
    GetFloat64,
    SetFloat64,
    "getFloat64",
    "setFloat64",
    get_float64,
    set_float64,
    Float64
);

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.data_view();
    let prototype = intrinsics.data_view_prototype;

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .build();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<GetBigInt64>()
        .with_builtin_function_property::<GetBigUint64>()
        .with_builtin_function_property::<GetFloat32>()
        .with_builtin_function_property::<GetFloat64>()
        .with_builtin_function_property::<GetInt8>()
        .with_builtin_function_property::<GetInt16>()
        .with_builtin_function_property::<GetInt32>()
        .with_builtin_function_property::<GetUint8>()
        .with_builtin_function_property::<GetUint16>()
        .with_builtin_function_property::<GetUint32>()
        .with_builtin_function_property::<SetBigInt64>()
        .with_builtin_function_property::<SetBigUint64>()
        .with_builtin_function_property::<SetFloat32>()
        .with_builtin_function_property::<SetFloat64>()
        .with_builtin_function_property::<SetInt8>()
        .with_builtin_function_property::<SetInt16>()
        .with_builtin_function_property::<SetInt32>()
        .with_builtin_function_property::<SetUint8>()
        .with_builtin_function_property::<SetUint16>()
        .with_builtin_function_property::<SetUint32>()
        .with_to_string_tag("DataView")
        .build();
}
