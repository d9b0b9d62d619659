// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.1.3 Abstract Operations for ArrayBuffer Objects](https://tc39.es/ecma262/#sec-abstract-operations-for-arraybuffer-objects)
//!
//! Encoding and decoding go through a fixed 8-byte scratch area. NaN
//! patterns are canonicalised: one bit pattern per float width, byte-swapped
//! for big-endian writes.

use super::data::InternalBuffer;
use super::{ArrayBuffer, ArrayBufferHeapData};
use crate::ecmascript::abstract_operations::type_conversion::{
    to_big_int64, to_big_uint64, to_int32_f64, to_uint32_f64, to_uint8_clamp_f64,
};
use crate::ecmascript::builtins::ordinary::get_prototype_from_constructor;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{
    BigInt, DataBlock, Function, InternalSlots, Number, Value,
};
use crate::heap::indexes::ArrayBufferIndex;

/// The \[\[LittleEndian]] field of the surrounding agent's Agent Record.
pub(crate) const AGENT_LITTLE_ENDIAN: bool = cfg!(target_endian = "little");

/// Canonical NaN encodings, little-endian byte order.
const CANONICAL_NAN_F64: [u8; 8] = [0, 0, 0, 0, 0, 0, 0xF8, 0x7F];
const CANONICAL_NAN_F32: [u8; 4] = [0, 0, 0xC0, 0x7F];

/// A TypedArray element type, with DataView using the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    BigInt64,
    BigUint64,
    Float32,
    Float64,
}

impl ElementType {
    /// The Element Size value of Table 71.
    pub(crate) fn size(self) -> usize {
        match self {
            ElementType::Int8 | ElementType::Uint8 | ElementType::Uint8Clamped => 1,
            ElementType::Int16 | ElementType::Uint16 => 2,
            ElementType::Int32 | ElementType::Uint32 | ElementType::Float32 => 4,
            ElementType::BigInt64 | ElementType::BigUint64 | ElementType::Float64 => 8,
        }
    }

    /// ### [25.1.3.11 IsBigIntElementType ( type )](https://tc39.es/ecma262/#sec-isbigintelementtype)
    pub(crate) fn is_big_int_element_type(self) -> bool {
        matches!(self, ElementType::BigInt64 | ElementType::BigUint64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ordering {
    Unordered,
    SeqCst,
    Init,
}

/// ### [25.1.3.1 AllocateArrayBuffer ( constructor, byteLength )](https://tc39.es/ecma262/#sec-allocatearraybuffer)
pub(crate) fn allocate_array_buffer(
    agent: &mut Agent,
    constructor: Function,
    byte_length: u64,
) -> JsResult<ArrayBuffer> {
    // 1. Let obj be ? OrdinaryCreateFromConstructor(constructor,
    //    "%ArrayBuffer.prototype%", « [[ArrayBufferData]],
    //    [[ArrayBufferByteLength]], [[ArrayBufferDetachKey]] »).
    let prototype =
        get_prototype_from_constructor(agent, constructor, ProtoIntrinsics::ArrayBuffer)?;
    // 2. Let block be ? CreateByteDataBlock(byteLength).
    let block = DataBlock::create_byte_data_block(agent, byte_length)?;
    // 3. Set obj.[[ArrayBufferData]] to block.
    // 4. Set obj.[[ArrayBufferByteLength]] to byteLength.
    agent.heap.array_buffers.push(Some(ArrayBufferHeapData {
        object_index: None,
        buffer: InternalBuffer::FixedLength(block),
    }));
    let buffer = ArrayBuffer(ArrayBufferIndex::last(&agent.heap.array_buffers));
    if let Some(prototype) = prototype {
        buffer.internal_set_prototype(agent, Some(prototype));
    }
    // 5. Return obj.
    Ok(buffer)
}

/// ### [25.1.3.3 IsDetachedBuffer ( arrayBuffer )](https://tc39.es/ecma262/#sec-isdetachedbuffer)
pub(crate) fn is_detached_buffer(agent: &Agent, array_buffer: ArrayBuffer) -> bool {
    // 1. If arrayBuffer.[[ArrayBufferData]] is null, return true.
    // 2. Return false.
    agent[array_buffer].is_detached_buffer()
}

/// ### [25.1.3.4 DetachArrayBuffer ( arrayBuffer )](https://tc39.es/ecma262/#sec-detacharraybuffer)
pub(crate) fn detach_array_buffer(agent: &mut Agent, array_buffer: ArrayBuffer) {
    // 1. Assert: IsSharedArrayBuffer(arrayBuffer) is false.
    debug_assert!(!matches!(
        agent[array_buffer].buffer,
        InternalBuffer::Shared(_)
    ));
    // 2-3. DetachKey handling is not carried; no host sets one.
    // 4. Set arrayBuffer.[[ArrayBufferData]] to null.
    // 5. Set arrayBuffer.[[ArrayBufferByteLength]] to 0.
    agent[array_buffer].buffer = InternalBuffer::Detached;
    // 6. Return unused.
}

/// ### [25.1.3.5 CloneArrayBuffer ( srcBuffer, srcByteOffset, srcLength )](https://tc39.es/ecma262/#sec-clonearraybuffer)
pub(crate) fn clone_array_buffer(
    agent: &mut Agent,
    src_buffer: ArrayBuffer,
    src_byte_offset: usize,
    src_length: usize,
) -> JsResult<ArrayBuffer> {
    // 1. Assert: IsDetachedBuffer(srcBuffer) is false.
    debug_assert!(!is_detached_buffer(agent, src_buffer));
    // 2. Let targetBuffer be ? AllocateArrayBuffer(%ArrayBuffer%,
    //    srcLength).
    let constructor = agent.current_realm().intrinsics().array_buffer();
    let target_buffer = allocate_array_buffer(agent, constructor.into(), src_length as u64)?;
    // 3-5. Perform CopyDataBlockBytes(targetBlock, 0, srcBlock,
    //      srcByteOffset, srcLength).
    let src_bytes: Vec<u8> = agent[src_buffer]
        .block()
        .expect("source buffer is attached")
        .as_slice()[src_byte_offset..src_byte_offset + src_length]
        .to_vec();
    agent[target_buffer]
        .block_mut()
        .expect("buffer was just allocated")
        .as_mut_slice()
        .copy_from_slice(&src_bytes);
    // 6. Return targetBuffer.
    Ok(target_buffer)
}

/// ### [25.1.3.13 RawBytesToNumeric ( type, rawBytes, isLittleEndian )](https://tc39.es/ecma262/#sec-rawbytestonumeric)
pub(crate) fn raw_bytes_to_numeric(
    agent: &mut Agent,
    element_type: ElementType,
    raw_bytes: &[u8],
    is_little_endian: bool,
) -> Value {
    // 1. Let elementSize be the Element Size value specified in Table 71.
    let element_size = element_type.size();
    debug_assert_eq!(raw_bytes.len(), element_size);
    // 2. If isLittleEndian is false, reverse the order of the elements of
    //    rawBytes. The scratch area is the canonical little-endian form.
    let mut scratch = [0u8; 8];
    scratch[..element_size].copy_from_slice(raw_bytes);
    if !is_little_endian {
        scratch[..element_size].reverse();
    }
    match element_type {
        // 3. If type is FLOAT32: an IEEE 754-2019 binary32 NaN value returns
        //    the NaN Number value.
        ElementType::Float32 => {
            let bits = u32::from_le_bytes(scratch[..4].try_into().unwrap());
            Value::from_f64(f32::from_bits(bits) as f64)
        }
        // 4. If type is FLOAT64: likewise for binary64.
        ElementType::Float64 => {
            let bits = u64::from_le_bytes(scratch);
            Value::from_f64(f64::from_bits(bits))
        }
        // 5-6. Interpret as a (two's complement) little-endian integer.
        ElementType::Int8 => Value::from_f64(scratch[0] as i8 as f64),
        ElementType::Uint8 | ElementType::Uint8Clamped => Value::from_f64(scratch[0] as f64),
        ElementType::Int16 => {
            Value::from_f64(i16::from_le_bytes(scratch[..2].try_into().unwrap()) as f64)
        }
        ElementType::Uint16 => {
            Value::from_f64(u16::from_le_bytes(scratch[..2].try_into().unwrap()) as f64)
        }
        ElementType::Int32 => {
            Value::from_f64(i32::from_le_bytes(scratch[..4].try_into().unwrap()) as f64)
        }
        ElementType::Uint32 => {
            Value::from_f64(u32::from_le_bytes(scratch[..4].try_into().unwrap()) as f64)
        }
        // 7. If IsBigIntElementType(type) is true, return the BigInt value
        //    that corresponds to intValue.
        ElementType::BigInt64 => {
            let int_value = i64::from_le_bytes(scratch);
            BigInt::from_i64(agent, int_value).into()
        }
        ElementType::BigUint64 => {
            let int_value = u64::from_le_bytes(scratch);
            BigInt::from_u64(agent, int_value).into()
        }
    }
}

/// ### [25.1.3.16 NumericToRawBytes ( type, value, isLittleEndian )](https://tc39.es/ecma262/#sec-numerictorawbytes)
///
/// Writes into the caller's 8-byte scratch area and returns the element
/// size.
pub(crate) fn numeric_to_raw_bytes(
    agent: &mut Agent,
    element_type: ElementType,
    value: Value,
    is_little_endian: bool,
    scratch: &mut [u8; 8],
) -> usize {
    let element_size = element_type.size();
    match element_type {
        // 1. If type is FLOAT32: convert with roundTiesToEven; NaN uses the
        //    canonical binary32 NaN encoding.
        ElementType::Float32 => {
            let number = value_to_f64(agent, value) as f32;
            if number.is_nan() {
                scratch[..4].copy_from_slice(&CANONICAL_NAN_F32);
            } else {
                scratch[..4].copy_from_slice(&number.to_bits().to_le_bytes());
            }
        }
        // 2. Else if type is FLOAT64: NaN uses the canonical binary64 NaN
        //    encoding.
        ElementType::Float64 => {
            let number = value_to_f64(agent, value);
            if number.is_nan() {
                scratch.copy_from_slice(&CANONICAL_NAN_F64);
            } else {
                scratch.copy_from_slice(&number.to_bits().to_le_bytes());
            }
        }
        // 3. Else: apply the conversion operation of Table 71 and encode as
        //    a little-endian two's complement integer.
        ElementType::Int8 => {
            scratch[0] = to_int32_f64(value_to_f64(agent, value)) as u8;
        }
        ElementType::Uint8 => {
            scratch[0] = to_uint32_f64(value_to_f64(agent, value)) as u8;
        }
        ElementType::Uint8Clamped => {
            scratch[0] = to_uint8_clamp_f64(value_to_f64(agent, value));
        }
        ElementType::Int16 => {
            let int_value = to_int32_f64(value_to_f64(agent, value)) as i16;
            scratch[..2].copy_from_slice(&int_value.to_le_bytes());
        }
        ElementType::Uint16 => {
            let int_value = to_uint32_f64(value_to_f64(agent, value)) as u16;
            scratch[..2].copy_from_slice(&int_value.to_le_bytes());
        }
        ElementType::Int32 => {
            let int_value = to_int32_f64(value_to_f64(agent, value));
            scratch[..4].copy_from_slice(&int_value.to_le_bytes());
        }
        ElementType::Uint32 => {
            let int_value = to_uint32_f64(value_to_f64(agent, value));
            scratch[..4].copy_from_slice(&int_value.to_le_bytes());
        }
        ElementType::BigInt64 => {
            let Value::BigInt(value) = value else {
                unreachable!("BigInt element type requires a BigInt value");
            };
            let int_value = to_big_int64(agent, value);
            scratch.copy_from_slice(&int_value.to_le_bytes());
        }
        ElementType::BigUint64 => {
            let Value::BigInt(value) = value else {
                unreachable!("BigInt element type requires a BigInt value");
            };
            let int_value = to_big_uint64(agent, value);
            scratch.copy_from_slice(&int_value.to_le_bytes());
        }
    }
    // 4. If isLittleEndian is false, reverse the order of the elements of
    //    rawBytes.
    if !is_little_endian {
        scratch[..element_size].reverse();
    }
    // 5. Return rawBytes.
    element_size
}

fn value_to_f64(_agent: &Agent, value: Value) -> f64 {
    match value {
        Value::Number(number) => number.into_f64(),
        _ => unreachable!("numeric conversion happens before buffer writes"),
    }
}

/// ### [25.1.3.15 GetValueFromBuffer ( arrayBuffer, byteIndex, type, isTypedArray, order \[ , isLittleEndian \] )](https://tc39.es/ecma262/#sec-getvaluefrombuffer)
pub(crate) fn get_value_from_buffer(
    agent: &mut Agent,
    array_buffer: ArrayBuffer,
    byte_index: usize,
    element_type: ElementType,
    _is_typed_array: bool,
    _order: Ordering,
    is_little_endian: Option<bool>,
) -> Value {
    // 1. Assert: IsDetachedBuffer(arrayBuffer) is false.
    debug_assert!(!is_detached_buffer(agent, array_buffer));
    // 2. Assert: There are sufficient bytes in arrayBuffer starting at
    //    byteIndex to represent a value of type.
    let element_size = element_type.size();
    // 3. Let block be arrayBuffer.[[ArrayBufferData]].
    // 6. Let rawValue be a List whose elements are bytes from block at
    //    indices in the interval from byteIndex (inclusive) to byteIndex +
    //    elementSize (exclusive).
    let mut raw_value = [0u8; 8];
    raw_value[..element_size].copy_from_slice(
        &agent[array_buffer]
            .block()
            .expect("buffer is attached")
            .as_slice()[byte_index..byte_index + element_size],
    );
    // 8. If isLittleEndian is not present, set isLittleEndian to the value
    //    of the [[LittleEndian]] field of the surrounding agent's Agent
    //    Record.
    let is_little_endian = is_little_endian.unwrap_or(AGENT_LITTLE_ENDIAN);
    // 9. Return RawBytesToNumeric(type, rawValue, isLittleEndian).
    raw_bytes_to_numeric(agent, element_type, &raw_value[..element_size], is_little_endian)
}

/// ### [25.1.3.17 SetValueInBuffer ( arrayBuffer, byteIndex, type, value, isTypedArray, order \[ , isLittleEndian \] )](https://tc39.es/ecma262/#sec-setvalueinbuffer)
pub(crate) fn set_value_in_buffer(
    agent: &mut Agent,
    array_buffer: ArrayBuffer,
    byte_index: usize,
    element_type: ElementType,
    value: Value,
    _is_typed_array: bool,
    _order: Ordering,
    is_little_endian: Option<bool>,
) {
    // 1. Assert: IsDetachedBuffer(arrayBuffer) is false.
    debug_assert!(!is_detached_buffer(agent, array_buffer));
    // 3. Assert: value is a BigInt if IsBigIntElementType(type) is true;
    //    otherwise, value is a Number.
    // 6. If isLittleEndian is not present, set isLittleEndian to the value
    //    of the [[LittleEndian]] field of the surrounding agent's Agent
    //    Record.
    let is_little_endian = is_little_endian.unwrap_or(AGENT_LITTLE_ENDIAN);
    // 7. Let rawBytes be NumericToRawBytes(type, value, isLittleEndian).
    let mut scratch = [0u8; 8];
    let element_size =
        numeric_to_raw_bytes(agent, element_type, value, is_little_endian, &mut scratch);
    // 9. Store the individual bytes of rawBytes into block, starting at
    //    block[byteIndex].
    agent[array_buffer]
        .block_mut()
        .expect("buffer is attached")
        .as_mut_slice()[byte_index..byte_index + element_size]
        .copy_from_slice(&scratch[..element_size]);
    // 10. Return unused.
}

/// Throws the detached-buffer TypeError.
pub(crate) fn throw_detached_buffer(
    agent: &mut Agent,
) -> crate::ecmascript::execution::agent::JsError {
    agent.throw_exception_with_static_message(
        ExceptionType::TypeError,
        "Attempting to access detached ArrayBuffer",
    )
}

/// Coerces a Number/BigInt value for the given element type, per Table 71's
/// conversion column. Throws for BigInt/Number mismatches.
pub(crate) fn coerce_for_element_type(
    agent: &mut Agent,
    element_type: ElementType,
    value: Value,
) -> JsResult<Value> {
    if element_type.is_big_int_element_type() {
        let bigint = crate::ecmascript::abstract_operations::type_conversion::to_big_int(
            agent, value,
        )?;
        Ok(bigint.into())
    } else {
        let number = crate::ecmascript::abstract_operations::type_conversion::to_number(
            agent, value,
        )?;
        Ok(Number::from(number.into_f64()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecmascript::execution::DefaultHostHooks;

    #[test]
    fn nan_canonicalization() {
        let mut agent = Agent::new(Default::default(), &DefaultHostHooks);
        let mut scratch = [0u8; 8];
        let size = numeric_to_raw_bytes(
            &mut agent,
            ElementType::Float64,
            Value::from_f64(f64::NAN),
            true,
            &mut scratch,
        );
        assert_eq!(size, 8);
        assert_eq!(scratch, CANONICAL_NAN_F64);
        let size = numeric_to_raw_bytes(
            &mut agent,
            ElementType::Float32,
            Value::from_f64(f64::NAN),
            false,
            &mut scratch,
        );
        assert_eq!(size, 4);
        let mut expected = CANONICAL_NAN_F32;
        expected.reverse();
        assert_eq!(&scratch[..4], &expected);
    }

    #[test]
    fn non_nan_roundtrip_preserves_bytes() {
        // A read-then-write of the same element type, offset and endianness
        // leaves the bytes unchanged when the value is not NaN.
        let mut agent = Agent::new(Default::default(), &DefaultHostHooks);
        let bytes = [0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
        let value = raw_bytes_to_numeric(&mut agent, ElementType::Float64, &bytes, false);
        let mut scratch = [0u8; 8];
        numeric_to_raw_bytes(&mut agent, ElementType::Float64, value, false, &mut scratch);
        assert_eq!(scratch, bytes);
    }
}
