// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ## [7.4 Operations on Iterator Objects](https://tc39.es/ecma262/#sec-operations-on-iterator-objects)

use super::operations_on_objects::{call, call_function, create_data_property_or_throw, get, get_method};
use super::type_conversion::to_boolean;
use crate::ecmascript::builtins::ordinary::ordinary_object_create_with_intrinsics;
use crate::ecmascript::execution::agent::{ExceptionType, JsError};
use crate::ecmascript::execution::{Agent, JsResult, ProtoIntrinsics};
use crate::ecmascript::types::{Function, IntoValue, Object, PropertyKey, Value};
use crate::heap::mark::{HeapMark, WorkQueues};
use crate::heap::WellKnownSymbolIndexes;

/// ### [7.4.1 Iterator Records](https://tc39.es/ecma262/#sec-iterator-records)
#[derive(Debug, Clone, Copy)]
pub(crate) struct IteratorRecord {
    /// \[\[Iterator]]
    pub(crate) iterator: Object,
    /// \[\[NextMethod]]
    pub(crate) next_method: Value,
}

/// ### [7.4.3 GetIteratorFromMethod ( obj, method )](https://tc39.es/ecma262/#sec-getiteratorfrommethod)
pub(crate) fn get_iterator_from_method(
    agent: &mut Agent,
    obj: Value,
    method: Function,
) -> JsResult<IteratorRecord> {
    // 1. Let iterator be ? Call(method, obj).
    let iterator = call_function(agent, method, obj, None)?;
    // 2. If iterator is not an Object, throw a TypeError exception.
    let Ok(iterator) = Object::try_from(iterator) else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Iterator is not an object",
        ));
    };
    // 3. Let nextMethod be ? Get(iterator, "next").
    let next_key = PropertyKey::from_static_str(agent, "next");
    let next_method = get(agent, iterator, next_key)?;
    // 4. Let iteratorRecord be the Iterator Record { [[Iterator]]: iterator,
    //    [[NextMethod]]: nextMethod, [[Done]]: false }.
    // 5. Return iteratorRecord.
    Ok(IteratorRecord {
        iterator,
        next_method,
    })
}

/// ### [7.4.4 GetIterator ( obj, kind )](https://tc39.es/ecma262/#sec-getiterator)
pub(crate) fn get_iterator(
    agent: &mut Agent,
    obj: Value,
    is_async: bool,
) -> JsResult<IteratorRecord> {
    // 1. If kind is ASYNC, then
    let method = if is_async {
        // a. Let method be ? GetMethod(obj, @@asyncIterator).
        let method = get_method(
            agent,
            obj,
            PropertyKey::Symbol(WellKnownSymbolIndexes::AsyncIterator.into()),
        )?;
        match method {
            Some(method) => Some(method),
            None => {
                // b. If method is undefined, then
                // i. Let syncMethod be ? GetMethod(obj, @@iterator).
                let sync_method = get_method(
                    agent,
                    obj,
                    PropertyKey::Symbol(WellKnownSymbolIndexes::Iterator.into()),
                )?;
                // ii. If syncMethod is undefined, throw a TypeError.
                // iii. Let syncIteratorRecord be
                //      ? GetIteratorFromMethod(obj, syncMethod).
                // iv. Return CreateAsyncFromSyncIterator(syncIteratorRecord).
                // NOTE: Async-from-sync iteration is driven by the VM's
                // iterator plumbing, which awaits the sync results directly.
                sync_method
            }
        }
    } else {
        // 2. Else, let method be ? GetMethod(obj, @@iterator).
        get_method(
            agent,
            obj,
            PropertyKey::Symbol(WellKnownSymbolIndexes::Iterator.into()),
        )?
    };
    // 3. If method is undefined, throw a TypeError exception.
    let Some(method) = method else {
        let name = obj.string_repr(agent).to_string_lossy(agent).into_owned();
        return Err(agent.throw_exception(
            ExceptionType::TypeError,
            format!("{} is not iterable", name),
        ));
    };
    // 4. Return ? GetIteratorFromMethod(obj, method).
    get_iterator_from_method(agent, obj, method)
}

/// ### [7.4.6 IteratorNext ( iteratorRecord \[ , value \] )](https://tc39.es/ecma262/#sec-iteratornext)
pub(crate) fn iterator_next(
    agent: &mut Agent,
    iterator_record: &IteratorRecord,
    value: Option<Value>,
) -> JsResult<Object> {
    // 1./2. Let result be ? Call(iteratorRecord.[[NextMethod]],
    //       iteratorRecord.[[Iterator]] [, « value »]).
    let result = call(
        agent,
        iterator_record.next_method,
        iterator_record.iterator.into(),
        value.as_ref().map(core::slice::from_ref),
    )?;
    // 3. If result is not an Object, throw a TypeError exception.
    Object::try_from(result).map_err(|_| {
        agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Iterator result is not an object",
        )
    })
}

/// ### [7.4.7 IteratorComplete ( iterResult )](https://tc39.es/ecma262/#sec-iteratorcomplete)
pub(crate) fn iterator_complete(agent: &mut Agent, iter_result: Object) -> JsResult<bool> {
    // 1. Return ToBoolean(? Get(iterResult, "done")).
    let done_key = PropertyKey::from_static_str(agent, "done");
    let done = get(agent, iter_result, done_key)?;
    Ok(to_boolean(agent, done))
}

/// ### [7.4.8 IteratorValue ( iterResult )](https://tc39.es/ecma262/#sec-iteratorvalue)
pub(crate) fn iterator_value(agent: &mut Agent, iter_result: Object) -> JsResult<Value> {
    // 1. Return ? Get(iterResult, "value").
    let value_key = PropertyKey::from_static_str(agent, "value");
    get(agent, iter_result, value_key)
}

/// ### [7.4.9 IteratorStep ( iteratorRecord )](https://tc39.es/ecma262/#sec-iteratorstep)
///
/// Returns None when the iterator is done.
pub(crate) fn iterator_step(
    agent: &mut Agent,
    iterator_record: &IteratorRecord,
) -> JsResult<Option<Object>> {
    // 1. Let result be ? IteratorNext(iteratorRecord).
    let result = iterator_next(agent, iterator_record, None)?;
    // 2. Let done be ? IteratorComplete(result).
    let done = iterator_complete(agent, result)?;
    // 3. If done is true, return false.
    if done {
        return Ok(None);
    }
    // 4. Return result.
    Ok(Some(result))
}

/// ### [7.4.11 IteratorClose ( iteratorRecord, completion )](https://tc39.es/ecma262/#sec-iteratorclose)
pub(crate) fn iterator_close(
    agent: &mut Agent,
    iterator: Object,
    completion: JsResult<Value>,
) -> JsResult<Value> {
    // 1. Assert: iteratorRecord.[[Iterator]] is an Object.
    // 2. Let iterator be iteratorRecord.[[Iterator]].
    // 3. Let innerResult be Completion(GetMethod(iterator, "return")).
    let return_key = PropertyKey::from_static_str(agent, "return");
    let inner_result = get_method(agent, iterator.into(), return_key);
    // 4. If innerResult is a normal completion, then
    let inner_result: Result<Value, JsError> = match inner_result {
        Ok(Some(return_method)) => {
            // b. If return is undefined, return ? completion.
            // c. Set innerResult to Completion(Call(return, iterator)).
            call_function(agent, return_method, iterator.into(), None)
        }
        Ok(None) => return completion,
        Err(err) => Err(err),
    };
    // 5. If completion is a throw completion, return ? completion.
    let completion_value = completion?;
    // 6. If innerResult is a throw completion, return ? innerResult.
    let inner_value = inner_result?;
    // 7. If innerResult.[[Value]] is not an Object, throw a TypeError
    //    exception.
    if !inner_value.is_object() {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Iterator returned a non-object value",
        ));
    }
    // 8. Return ? completion.
    Ok(completion_value)
}

/// ### [7.4.14 CreateIterResultObject ( value, done )](https://tc39.es/ecma262/#sec-createiterresultobject)
pub(crate) fn create_iter_result_object(agent: &mut Agent, value: Value, done: bool) -> Object {
    // 1. Let obj be OrdinaryObjectCreate(%Object.prototype%).
    let obj = ordinary_object_create_with_intrinsics(agent, Some(ProtoIntrinsics::Object));
    // 2. Perform ! CreateDataPropertyOrThrow(obj, "value", value).
    let value_key = PropertyKey::from_static_str(agent, "value");
    create_data_property_or_throw(agent, obj, value_key, value)
        .expect("new object rejects no properties");
    // 3. Perform ! CreateDataPropertyOrThrow(obj, "done", done).
    let done_key = PropertyKey::from_static_str(agent, "done");
    create_data_property_or_throw(agent, obj, done_key, done.into())
        .expect("new object rejects no properties");
    // 4. Return obj.
    obj
}

impl HeapMark for IteratorRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.iterator.mark_values(queues);
        self.next_method.mark_values(queues);
    }
}

/// ### [27.1.4.1 %IteratorHelperPrototype%](https://tc39.es/ecma262/#sec-createlistiteratorRecord) —
/// not implemented; list iteration is internal to the VM.
#[allow(dead_code)]
pub(crate) fn if_abrupt_close_iterator(
    agent: &mut Agent,
    value: JsResult<Value>,
    iterator_record: &IteratorRecord,
) -> JsResult<Value> {
    // 1. If value is an abrupt completion, return
    //    ? IteratorClose(iteratorRecord, value).
    if value.is_err() {
        iterator_close(agent, iterator_record.iterator, value)
    } else {
        // 2. Else, set value to value.[[Value]].
        value
    }
}
