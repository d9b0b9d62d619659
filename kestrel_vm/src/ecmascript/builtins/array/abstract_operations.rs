// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{Array, ArrayHeapData};
use crate::ecmascript::abstract_operations::type_conversion::{to_number, to_uint32};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, Number, Object, PropertyDescriptor, PropertyKey,
};
use crate::heap::indexes::ArrayIndex;

/// ### [10.4.2.2 ArrayCreate ( length \[ , proto \] )](https://tc39.es/ecma262/#sec-arraycreate)
pub fn array_create(
    agent: &mut Agent,
    length: usize,
    capacity: usize,
    proto: Option<Object>,
) -> JsResult<Array> {
    // 1. If length > 2³² - 1, throw a RangeError exception.
    if length > (u32::MAX - 1) as usize {
        return Err(
            agent.throw_exception_with_static_message(ExceptionType::RangeError, "Invalid array length")
        );
    }
    // 2. If proto is not present, set proto to %Array.prototype%.
    // 3. Let A be MakeBasicObject(« [[Prototype]], [[Extensible]] »).
    // 5. Set A.[[DefineOwnProperty]] as specified in 10.4.2.1.
    let mut data = ArrayHeapData {
        // 6. Perform ! OrdinaryDefineOwnProperty(A, "length", ...).
        len: length as u32,
        len_writable: true,
        ..Default::default()
    };
    data.elements = vec![None; capacity];
    agent.heap.arrays.push(Some(data));
    let array = Array(ArrayIndex::last(&agent.heap.arrays));
    // 4. Set A.[[Prototype]] to proto.
    if let Some(proto) = proto {
        array.internal_set_prototype(agent, Some(proto));
    }
    // 7. Return A.
    Ok(array)
}

/// ### [10.4.2.4 ArraySetLength ( A, Desc )](https://tc39.es/ecma262/#sec-arraysetlength)
pub fn array_set_length(
    agent: &mut Agent,
    array: Array,
    descriptor: PropertyDescriptor,
) -> JsResult<bool> {
    // 1. If Desc does not have a [[Value]] field, then
    let Some(descriptor_value) = descriptor.value else {
        // a. Return ! OrdinaryDefineOwnProperty(A, "length", Desc).
        if !descriptor.has_fields() {
            return Ok(true);
        }
        // `length` is non-configurable and non-enumerable.
        if descriptor.configurable == Some(true) || descriptor.enumerable == Some(true) {
            return Ok(false);
        }
        if descriptor.is_accessor_descriptor() {
            return Ok(false);
        }
        if !agent[array].len_writable {
            // Already frozen; only a no-op or [[Writable]]: false passes.
            if descriptor.writable == Some(true) {
                return Ok(false);
            }
        } else if descriptor.writable == Some(false) {
            agent[array].len_writable = false;
        }
        return Ok(true);
    };
    // 2. Let newLenDesc be a copy of Desc.
    // 13. If newLenDesc does not have a [[Writable]] field or
    //     newLenDesc.[[Writable]] is true, let newWritable be true.
    let new_len_writable = descriptor.writable.unwrap_or(true);
    // NOTE: Setting [[Writable]] to false is deferred in case any elements
    // cannot be deleted.
    // 3. Let newLen be ? ToUint32(Desc.[[Value]]).
    let new_len = to_uint32(agent, descriptor_value)?;
    // 4. Let numberLen be ? ToNumber(Desc.[[Value]]).
    let number_len = to_number(agent, descriptor_value)?;
    // 5. If SameValueZero(newLen, numberLen) is false, throw a RangeError
    //    exception.
    if !number_len.same_value_zero(Number::from(new_len)) {
        return Err(
            agent.throw_exception_with_static_message(ExceptionType::RangeError, "Invalid array length")
        );
    }
    // 6. Set newLenDesc.[[Value]] to newLen.
    // 7. Let oldLenDesc be OrdinaryGetOwnProperty(A, "length").
    // 10. Let oldLen be oldLenDesc.[[Value]].
    let old_len = agent[array].len;
    // 12. If oldLenDesc.[[Writable]] is false, return false.
    if !agent[array].len_writable {
        return Ok(false);
    }
    if descriptor.configurable == Some(true)
        || descriptor.enumerable == Some(true)
        || descriptor.is_accessor_descriptor()
    {
        // 16. If succeeded is false, return false.
        return Ok(false);
    }
    // 11. If newLen ≥ oldLen, then
    if new_len >= old_len {
        // a. Return ! OrdinaryDefineOwnProperty(A, "length", newLenDesc).
        agent[array].len = new_len;
        agent[array].len_writable = new_len_writable;
        return Ok(true);
    }
    // 15. Let succeeded be ! OrdinaryDefineOwnProperty(A, "length",
    //     newLenDesc).
    // 17. For each own property key P of A such that P is an array index and
    //     ! ToUint32(P) ≥ newLen, in descending numeric index order, do
    let mut doomed: Vec<u32> = agent[array]
        .element_indices()
        .into_iter()
        .filter(|index| *index >= new_len)
        .collect();
    doomed.sort_unstable_by(|a, b| b.cmp(a));
    for index in doomed {
        // a. Let deleteSucceeded be ! A.[[Delete]](P).
        let delete_succeeded = array
            .internal_delete(agent, PropertyKey::Integer(index))
            .expect("array delete does not throw");
        // b. If deleteSucceeded is false, then
        if !delete_succeeded {
            let data = &mut agent[array];
            // i. Set newLenDesc.[[Value]] to ! ToUint32(P) + 1𝔽.
            data.len = index + 1;
            // ii. If newWritable is false, set newLenDesc.[[Writable]] to
            //     false.
            data.len_writable &= new_len_writable;
            // iii. Perform ! OrdinaryDefineOwnProperty(A, "length",
            //      newLenDesc).
            // iv. Return false.
            return Ok(false);
        }
    }
    let data = &mut agent[array];
    data.len = new_len;
    data.elements.truncate(new_len as usize);
    // 18. If newWritable is false, set the length property's [[Writable]]
    //     attribute to false.
    data.len_writable = new_len_writable;
    // 19. Return true.
    Ok(true)
}
