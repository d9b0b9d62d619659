// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [25.3.1 Abstract Operations With DataView Objects](https://tc39.es/ecma262/#sec-abstract-operations-with-dataview-objects)

use super::DataView;
use crate::ecmascript::abstract_operations::type_conversion::{to_boolean, to_index};
use crate::ecmascript::builtins::array_buffer::abstract_operations::{
    coerce_for_element_type, get_value_from_buffer, is_detached_buffer, set_value_in_buffer,
    throw_detached_buffer, ElementType, Ordering,
};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::Value;

/// ### [25.3.1.1 GetViewValue ( view, requestIndex, isLittleEndian, type )](https://tc39.es/ecma262/#sec-getviewvalue)
pub(crate) fn get_view_value(
    agent: &mut Agent,
    view: Value,
    request_index: Value,
    is_little_endian: Value,
    element_type: ElementType,
) -> JsResult<Value> {
    // 1. Perform ? RequireInternalSlot(view, [[DataView]]).
    let Value::DataView(view) = view else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a DataView",
        ));
    };
    // 3. Let getIndex be ? ToIndex(requestIndex).
    let get_index = to_index(agent, request_index)? as usize;
    // 4. Set isLittleEndian to ToBoolean(isLittleEndian).
    let is_little_endian = to_boolean(agent, is_little_endian);
    // 5. Let buffer be view.[[ViewedArrayBuffer]].
    let buffer = agent[view].viewed_array_buffer;
    // 6. If IsDetachedBuffer(buffer) is true, throw a TypeError exception.
    if is_detached_buffer(agent, buffer) {
        return Err(throw_detached_buffer(agent));
    }
    // 7. Let viewOffset be view.[[ByteOffset]].
    let view_offset = agent[view].byte_offset;
    // 8. Let viewSize be view.[[ByteLength]].
    let view_size = agent[view].byte_length;
    // 9. Let elementSize be the Element Size value specified in Table 71.
    let element_size = element_type.size();
    // 10. If getIndex + elementSize > viewSize, throw a RangeError
    //     exception.
    if get_index + element_size > view_size {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Offset is outside the bounds of the DataView",
        ));
    }
    // 11. Let bufferIndex be getIndex + viewOffset.
    let buffer_index = get_index + view_offset;
    // 12. Return GetValueFromBuffer(buffer, bufferIndex, type, false,
    //     UNORDERED, isLittleEndian).
    Ok(get_value_from_buffer(
        agent,
        buffer,
        buffer_index,
        element_type,
        false,
        Ordering::Unordered,
        Some(is_little_endian),
    ))
}

/// ### [25.3.1.2 SetViewValue ( view, requestIndex, isLittleEndian, type, value )](https://tc39.es/ecma262/#sec-setviewvalue)
pub(crate) fn set_view_value(
    agent: &mut Agent,
    view: Value,
    request_index: Value,
    is_little_endian: Value,
    element_type: ElementType,
    value: Value,
) -> JsResult<Value> {
    // 1. Perform ? RequireInternalSlot(view, [[DataView]]).
    let Value::DataView(view) = view else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not a DataView",
        ));
    };
    // 3. Let getIndex be ? ToIndex(requestIndex).
    let get_index = to_index(agent, request_index)? as usize;
    // 4./5. Coerce the value for the element type.
    let number_value = coerce_for_element_type(agent, element_type, value)?;
    // 6. Set isLittleEndian to ToBoolean(isLittleEndian).
    let is_little_endian = to_boolean(agent, is_little_endian);
    // 7. Let buffer be view.[[ViewedArrayBuffer]].
    let buffer = agent[view].viewed_array_buffer;
    // 8. If IsDetachedBuffer(buffer) is true, throw a TypeError exception.
    if is_detached_buffer(agent, buffer) {
        return Err(throw_detached_buffer(agent));
    }
    let view_offset = agent[view].byte_offset;
    let view_size = agent[view].byte_length;
    let element_size = element_type.size();
    // 12. If getIndex + elementSize > viewSize, throw a RangeError
    //     exception.
    if get_index + element_size > view_size {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::RangeError,
            "Offset is outside the bounds of the DataView",
        ));
    }
    // 13. Let bufferIndex be getIndex + viewOffset.
    let buffer_index = get_index + view_offset;
    // 14. Perform SetValueInBuffer(buffer, bufferIndex, type, numberValue,
    //     false, UNORDERED, isLittleEndian).
    set_value_in_buffer(
        agent,
        buffer,
        buffer_index,
        element_type,
        number_value,
        false,
        Ordering::Unordered,
        Some(is_little_endian),
    );
    // 15. Return undefined.
    Ok(Value::Undefined)
}
