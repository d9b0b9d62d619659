// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.2 TypedArray Objects](https://tc39.es/ecma262/#sec-typedarray-objects)
//!
//! The abstract `%TypedArray%` constructor plus the eleven concrete
//! constructors, created uniformly from the element-type table.

use crate::ecmascript::abstract_operations::type_conversion::to_index;
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::array_buffer::abstract_operations::{
    allocate_array_buffer, ElementType,
};
use crate::ecmascript::builtins::builtin_function::{
    create_builtin_function, BuiltinFunction, BuiltinFunctionArgs,
};
use crate::ecmascript::builtins::typed_array::{TypedArray, TypedArrayHeapData};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin, BuiltinGetter};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::realm::intrinsics::{typed_array_kind_index, TYPED_ARRAY_KINDS};
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{
    InternalSlots, IntoValue, Object, PropertyKey, Value,
};
use crate::heap::indexes::TypedArrayIndex;
use crate::heap::ObjectEntry;

pub(crate) struct TypedArrayConstructor;
impl Builtin for TypedArrayConstructor {
    const NAME: &'static str = "TypedArray";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(abstract_constructor);
}

/// ### [23.2.1.1 %TypedArray% ( )](https://tc39.es/ecma262/#sec-%typedarray%)
fn abstract_constructor(
    agent: &mut Agent,
    _this: Value,
    _arguments: ArgumentsList,
    _new_target: Option<Object>,
) -> JsResult<Value> {
    // 1. Throw a TypeError exception.
    Err(agent.throw_exception_with_static_message(
        ExceptionType::TypeError,
        "Abstract class TypedArray not directly constructable",
    ))
}

const TYPED_ARRAY_NAMES: [&str; 11] = [
    "Int8Array",
    "Uint8Array",
    "Uint8ClampedArray",
    "Int16Array",
    "Uint16Array",
    "Int32Array",
    "Uint32Array",
    "BigInt64Array",
    "BigUint64Array",
    "Float32Array",
    "Float64Array",
];

/// The shared concrete-constructor behaviour; the element type is recovered
/// from the active function object.
fn concrete_constructor(
    agent: &mut Agent,
    element_type: ElementType,
    arguments: ArgumentsList,
    new_target: Option<Object>,
) -> JsResult<Value> {
    // 1. If NewTarget is undefined, throw a TypeError exception.
    if new_target.is_none() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "TypedArray constructor requires new",
        ));
    }
    let first = arguments.get(0);
    let element_size = element_type.size();
    // 23.2.5.1 steps 4-6: dispatch on the first argument.
    let (buffer, byte_offset, array_length) = match first {
        // c. If firstArgument has an [[ArrayBufferData]] internal slot:
        //    InitializeTypedArrayFromArrayBuffer.
        Value::ArrayBuffer(buffer) => {
            let offset = to_index(agent, arguments.get(1))? as usize;
            if offset % element_size != 0 {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::RangeError,
                    "Start offset is not a multiple of the element size",
                ));
            }
            let buffer_byte_length = buffer.byte_length(agent);
            let length_arg = arguments.get(2);
            let array_length = if length_arg.is_undefined() {
                if (buffer_byte_length - offset.min(buffer_byte_length)) % element_size != 0 {
                    return Err(agent.throw_exception_with_static_message(
                        ExceptionType::RangeError,
                        "Buffer length is not a multiple of the element size",
                    ));
                }
                (buffer_byte_length - offset.min(buffer_byte_length)) / element_size
            } else {
                to_index(agent, length_arg)? as usize
            };
            if offset + array_length * element_size > buffer_byte_length {
                return Err(agent.throw_exception_with_static_message(
                    ExceptionType::RangeError,
                    "Invalid typed array length",
                ));
            }
            (buffer, offset, array_length)
        }
        // d. Otherwise: allocate with a numeric length; iterables are not
        //    carried.
        _ => {
            let length = if first.is_undefined() {
                0
            } else {
                to_index(agent, first)? as usize
            };
            let array_buffer_constructor = agent.current_realm().intrinsics().array_buffer();
            let buffer = allocate_array_buffer(
                agent,
                array_buffer_constructor.into(),
                (length * element_size) as u64,
            )?;
            (buffer, 0, length)
        }
    };
    agent.heap.typed_arrays.push(Some(TypedArrayHeapData {
        object_index: None,
        viewed_array_buffer: buffer,
        element_type,
        byte_offset,
        byte_length: array_length * element_size,
        array_length,
    }));
    let typed_array = TypedArray(TypedArrayIndex::last(&agent.heap.typed_arrays));
    let prototype = agent
        .current_realm()
        .intrinsics()
        .typed_array_prototype_for(element_type);
    typed_array.internal_set_prototype(agent, Some(prototype.into()));
    Ok(typed_array.into_value())
}

macro_rules! concrete_typed_array_behaviour {
    ($name: ident, $element_type: ident) => {
        fn $name(
            agent: &mut Agent,
            _this: Value,
            arguments: ArgumentsList,
            new_target: Option<Object>,
        ) -> JsResult<Value> {
            concrete_constructor(agent, ElementType::$element_type, arguments, new_target)
        }
    };
}

concrete_typed_array_behaviour!(construct_int8_array, Int8);
concrete_typed_array_behaviour!(construct_uint8_array, Uint8);
concrete_typed_array_behaviour!(construct_uint8_clamped_array, Uint8Clamped);
concrete_typed_array_behaviour!(construct_int16_array, Int16);
concrete_typed_array_behaviour!(construct_uint16_array, Uint16);
concrete_typed_array_behaviour!(construct_int32_array, Int32);
concrete_typed_array_behaviour!(construct_uint32_array, Uint32);
concrete_typed_array_behaviour!(construct_big_int64_array, BigInt64);
concrete_typed_array_behaviour!(construct_big_uint64_array, BigUint64);
concrete_typed_array_behaviour!(construct_float32_array, Float32);
concrete_typed_array_behaviour!(construct_float64_array, Float64);

const TYPED_ARRAY_BEHAVIOURS: [Behaviour; 11] = [
    Behaviour::Constructor(construct_int8_array),
    Behaviour::Constructor(construct_uint8_array),
    Behaviour::Constructor(construct_uint8_clamped_array),
    Behaviour::Constructor(construct_int16_array),
    Behaviour::Constructor(construct_uint16_array),
    Behaviour::Constructor(construct_int32_array),
    Behaviour::Constructor(construct_uint32_array),
    Behaviour::Constructor(construct_big_int64_array),
    Behaviour::Constructor(construct_big_uint64_array),
    Behaviour::Constructor(construct_float32_array),
    Behaviour::Constructor(construct_float64_array),
];

/// Creates the eleven concrete constructors during intrinsics creation.
pub(crate) fn create_constructors(
    agent: &mut Agent,
    realm: RealmIdentifier,
    function_prototype: Object,
) -> [BuiltinFunction; 11] {
    core::array::from_fn(|index| {
        create_builtin_function(
            agent,
            TYPED_ARRAY_BEHAVIOURS[index],
            BuiltinFunctionArgs {
                length: 3,
                name: TYPED_ARRAY_NAMES[index],
                realm,
                prototype: Some(function_prototype),
            },
        )
    })
}

struct TypedArrayPrototypeGetLength;
impl Builtin for TypedArrayPrototypeGetLength {
    const NAME: &'static str = "get length";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(get_length);
}
impl BuiltinGetter for TypedArrayPrototypeGetLength {}

/// ### [23.2.3.21 get %TypedArray%.prototype.length](https://tc39.es/ecma262/#sec-get-%typedarray%.prototype.length)
fn get_length(agent: &mut Agent, this_value: Value, _arguments: ArgumentsList) -> JsResult<Value> {
    let Value::TypedArray(typed_array) = this_value else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a TypedArray",
        ));
    };
    Ok(Value::from_f64(agent[typed_array].array_length as f64))
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let abstract_constructor = intrinsics.typed_array();
    let abstract_prototype = intrinsics.typed_array_prototype();
    let constructors = intrinsics.typed_array_constructors;
    let prototypes = intrinsics.typed_array_prototypes;

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, abstract_constructor)
        .with_prototype_property(abstract_prototype.into())
        .build();
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, abstract_prototype)
        .with_builtin_function_getter_property::<TypedArrayPrototypeGetLength>("length")
        .build();

    for element_type in TYPED_ARRAY_KINDS {
        let index = typed_array_kind_index(element_type);
        let constructor = constructors[index];
        let prototype = prototypes[index];
        let element_size = Value::from_f64(element_type.size() as f64);
        let bytes_key = PropertyKey::from_static_str(agent, "BYTES_PER_ELEMENT");
        BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
            .with_prototype_property(prototype.into())
            .with_property(ObjectEntry::new_frozen_entry(bytes_key, element_size))
            .build();
        let bytes_key = PropertyKey::from_static_str(agent, "BYTES_PER_ELEMENT");
        OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
            .with_property(ObjectEntry::new_frozen_entry(bytes_key, element_size))
            .build();
    }
}
