// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [23.1 Array Objects](https://tc39.es/ecma262/#sec-array-objects)

use crate::ecmascript::abstract_operations::operations_on_iterator_objects::create_iter_result_object;
use crate::ecmascript::abstract_operations::operations_on_objects::{
    call, create_data_property_or_throw, delete_property_or_throw, get, has_property,
    length_of_array_like, set,
};
use crate::ecmascript::abstract_operations::testing_and_comparison::{
    compare_strings, is_array, is_callable,
};
use crate::ecmascript::abstract_operations::type_conversion::{
    to_object, to_string, to_uint32,
};
use crate::ecmascript::builders::{BuiltinFunctionBuilder, OrdinaryObjectBuilder};
use crate::ecmascript::builtins::array::{array_create, Array};
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{
    InternalMethods, InternalSlots, IntoValue, Number, Object, OrdinaryObject, PropertyKey,
    String, Value,
};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};
use crate::heap::WellKnownSymbolIndexes;

pub(crate) struct ArrayConstructor;
impl Builtin for ArrayConstructor {
    const NAME: &'static str = "Array";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Constructor(constructor);
}

/// ### [23.1.1.1 Array ( ...values )](https://tc39.es/ecma262/#sec-array)
fn constructor(
    agent: &mut Agent,
    _this: Value,
    arguments: ArgumentsList,
    _new_target: Option<Object>,
) -> JsResult<Value> {
    // 3. Let proto be ? GetPrototypeFromConstructor(newTarget,
    //    "%Array.prototype%"): the default prototype is used; subclassing
    //    Array is not carried.
    // 4. If numberOfArgs = 0, return ! ArrayCreate(0, proto).
    if arguments.is_empty() {
        return Ok(array_create(agent, 0, 0, None)?.into_value());
    }
    // 5. Else if numberOfArgs = 1, then
    if arguments.len() == 1 {
        let len = arguments.get(0);
        // b. If len is not a Number, then: a one-element array.
        let Value::Number(len_number) = len else {
            let array = array_create(agent, 1, 1, None)?;
            agent[array].elements[0] = Some(len);
            return Ok(array.into_value());
        };
        // c. Else: let intLen be ! ToUint32(len); if SameValueZero(intLen,
        //    len) is false, throw a RangeError exception.
        let int_len = to_uint32(agent, len)?;
        if !len_number.same_value_zero(Number::from(int_len)) {
            return Err(agent.throw_exception_with_static_message(
                ExceptionType::RangeError,
                "Invalid array length",
            ));
        }
        let array = array_create(agent, int_len as usize, int_len.min(1024) as usize, None)?;
        return Ok(array.into_value());
    }
    // 6. Else: the array is initialized with the argument values.
    let array = array_create(agent, arguments.len(), arguments.len(), None)?;
    for (index, value) in arguments.iter().enumerate() {
        agent[array].elements[index] = Some(*value);
    }
    // 8. Return array.
    Ok(array.into_value())
}

struct ArrayIsArray;
impl Builtin for ArrayIsArray {
    const NAME: &'static str = "isArray";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_is_array);
}

/// ### [23.1.2.2 Array.isArray ( arg )](https://tc39.es/ecma262/#sec-array.isarray)
fn array_is_array(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    // 1. Return ? IsArray(arg).
    Ok(is_array(agent, arguments.get(0))?.into())
}

struct ArrayOf;
impl Builtin for ArrayOf {
    const NAME: &'static str = "of";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_of);
}

/// ### [23.1.2.3 Array.of ( ...items )](https://tc39.es/ecma262/#sec-array.of)
fn array_of(agent: &mut Agent, _this: Value, arguments: ArgumentsList) -> JsResult<Value> {
    let array = array_create(agent, arguments.len(), arguments.len(), None)?;
    for (index, value) in arguments.iter().enumerate() {
        agent[array].elements[index] = Some(*value);
    }
    Ok(array.into_value())
}

struct ArrayPrototypePush;
impl Builtin for ArrayPrototypePush {
    const NAME: &'static str = "push";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_prototype_push);
}

/// ### [23.1.3.23 Array.prototype.push ( ...items )](https://tc39.es/ecma262/#sec-array.prototype.push)
fn array_prototype_push(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let O be ? ToObject(this value).
    let o = to_object(agent, this_value)?;
    // 2. Let len be ? LengthOfArrayLike(O).
    let mut len = length_of_array_like(agent, o)?;
    // 3. Let argCount be the number of elements in items.
    // 4. If len + argCount > 2⁵³ - 1, throw a TypeError exception.
    if len + arguments.len() as i64 > 9007199254740991 {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "Array length exceeds the maximum safe integer",
        ));
    }
    // 5. For each element E of items, do
    for element in arguments.iter() {
        // a. Perform ? Set(O, ! ToString(𝔽(len)), E, true).
        set(agent, o, PropertyKey::Integer(len as u32), *element, true)?;
        // b. Set len to len + 1.
        len += 1;
    }
    // 6. Perform ? Set(O, "length", 𝔽(len), true).
    let length_key = PropertyKey::from_static_str(agent, "length");
    set(agent, o, length_key, Value::from_f64(len as f64), true)?;
    // 7. Return 𝔽(len).
    Ok(Value::from_f64(len as f64))
}

struct ArrayPrototypeJoin;
impl Builtin for ArrayPrototypeJoin {
    const NAME: &'static str = "join";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_prototype_join);
}

/// ### [23.1.3.18 Array.prototype.join ( separator )](https://tc39.es/ecma262/#sec-array.prototype.join)
fn array_prototype_join(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let O be ? ToObject(this value).
    let o = to_object(agent, this_value)?;
    // 2. Let len be ? LengthOfArrayLike(O).
    let len = length_of_array_like(agent, o)?;
    // 3./4. Let sep be "," or ? ToString(separator).
    let separator = arguments.get(0);
    let separator = if separator.is_undefined() {
        ",".to_string()
    } else {
        to_string(agent, separator)?.to_string_lossy(agent).into_owned()
    };
    // 5./6. Concatenate the element strings.
    let mut result = std::string::String::new();
    for index in 0..len {
        if index > 0 {
            result.push_str(&separator);
        }
        let element = get(agent, o, PropertyKey::Integer(index as u32))?;
        if !element.is_undefined() && !element.is_null() {
            let element = to_string(agent, element)?;
            result.push_str(&element.to_string_lossy(agent));
        }
    }
    // 7. Return R.
    Ok(String::from_string(agent, result).into_value())
}

struct ArrayPrototypeIndexOf;
impl Builtin for ArrayPrototypeIndexOf {
    const NAME: &'static str = "indexOf";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_prototype_index_of);
}

/// ### [23.1.3.17 Array.prototype.indexOf ( searchElement \[ , fromIndex \] )](https://tc39.es/ecma262/#sec-array.prototype.indexof)
fn array_prototype_index_of(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    use crate::ecmascript::abstract_operations::testing_and_comparison::is_strictly_equal;
    let o = to_object(agent, this_value)?;
    let len = length_of_array_like(agent, o)?;
    let search_element = arguments.get(0);
    for index in 0..len {
        let key = PropertyKey::Integer(index as u32);
        if has_property(agent, o, key)? {
            let element = get(agent, o, key)?;
            if is_strictly_equal(agent, search_element, element) {
                return Ok(Value::from_f64(index as f64));
            }
        }
    }
    Ok(Value::from_f64(-1.0))
}

struct ArrayPrototypeSort;
impl Builtin for ArrayPrototypeSort {
    const NAME: &'static str = "sort";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_prototype_sort);
}

/// ### [23.1.3.30 Array.prototype.sort ( comparator )](https://tc39.es/ecma262/#sec-array.prototype.sort)
fn array_prototype_sort(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    let comparator = arguments.get(0);
    // 1. If comparator is not undefined and IsCallable(comparator) is false,
    //    throw a TypeError exception.
    if !comparator.is_undefined() && !is_callable(comparator) {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "The comparison function must be either a function or undefined",
        ));
    }
    // 2. Let obj be ? ToObject(this value).
    let obj = to_object(agent, this_value)?;
    // 3. Let len be ? LengthOfArrayLike(obj).
    let len = length_of_array_like(agent, obj)?;
    // 5. Let sortedList be ? SortIndexedProperties(obj, len, SortCompare,
    //    SKIP-HOLES).
    let mut items = Vec::with_capacity(len as usize);
    for index in 0..len {
        let key = PropertyKey::Integer(index as u32);
        if has_property(agent, obj, key)? {
            items.push(get(agent, obj, key)?);
        }
    }
    let item_count = items.len();
    // 23.1.3.30.2 SortCompare, via an insertion sort so that an abrupt
    // comparator completion can propagate out of the sort.
    let mut sorted: Vec<Value> = Vec::with_capacity(item_count);
    for item in items {
        let mut insert_at = sorted.len();
        for (position, other) in sorted.iter().enumerate() {
            if sort_compare(agent, item, *other, comparator)? < 0.0 {
                insert_at = position;
                break;
            }
        }
        sorted.insert(insert_at, item);
    }
    // 6./7. Write the sorted values back, deleting the tail holes.
    for (index, item) in sorted.iter().enumerate() {
        set(agent, obj, PropertyKey::Integer(index as u32), *item, true)?;
    }
    for index in item_count as i64..len {
        delete_property_or_throw(agent, obj, PropertyKey::Integer(index as u32))?;
    }
    // 8. Return obj.
    Ok(obj.into_value())
}

/// ### [23.1.3.30.2 SortCompare ( comparator, x, y )](https://tc39.es/ecma262/#sec-comparearrayelements)
fn sort_compare(
    agent: &mut Agent,
    x: Value,
    y: Value,
    comparator: Value,
) -> JsResult<f64> {
    // 1. If x and y are both undefined, return +0𝔽.
    if x.is_undefined() && y.is_undefined() {
        return Ok(0.0);
    }
    // 2. If x is undefined, return 1𝔽. 3. If y is undefined, return -1𝔽.
    if x.is_undefined() {
        return Ok(1.0);
    }
    if y.is_undefined() {
        return Ok(-1.0);
    }
    // 4. If comparator is not undefined, then
    if !comparator.is_undefined() {
        // a. Let v be ? ToNumber(? Call(comparator, undefined, « x, y »)).
        let v = call(agent, comparator, Value::Undefined, Some(&[x, y]))?;
        let v = v.to_number(agent)?.into_f64();
        // b. If v is NaN, return +0𝔽. c. Return v.
        if v.is_nan() {
            return Ok(0.0);
        }
        return Ok(v);
    }
    // 5./6. Compare the ToString results of x and y with string comparison.
    let x_string = to_string(agent, x)?;
    let y_string = to_string(agent, y)?;
    Ok(match compare_strings(agent, x_string, y_string) {
        core::cmp::Ordering::Less => -1.0,
        core::cmp::Ordering::Equal => 0.0,
        core::cmp::Ordering::Greater => 1.0,
    })
}

struct ArrayPrototypeAt;
impl Builtin for ArrayPrototypeAt {
    const NAME: &'static str = "at";
    const LENGTH: u8 = 1;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_prototype_at);
}

/// ### [23.1.3.1 Array.prototype.at ( index )](https://tc39.es/ecma262/#sec-array.prototype.at)
fn array_prototype_at(
    agent: &mut Agent,
    this_value: Value,
    arguments: ArgumentsList,
) -> JsResult<Value> {
    use crate::ecmascript::abstract_operations::type_conversion::to_integer_or_infinity;
    let o = to_object(agent, this_value)?;
    let len = length_of_array_like(agent, o)?;
    // 3. Let relativeIndex be ? ToIntegerOrInfinity(index).
    let relative_index = to_integer_or_infinity(agent, arguments.get(0))?;
    // 4./5. Negative indices count back from the end.
    let k = if relative_index >= 0.0 {
        relative_index
    } else {
        len as f64 + relative_index
    };
    // 6. If k < 0 or k ≥ len, return undefined.
    if k < 0.0 || k >= len as f64 {
        return Ok(Value::Undefined);
    }
    // 7. Return ? Get(O, ! ToString(𝔽(k))).
    get(agent, o, PropertyKey::Integer(k as u32))
}

// ### [23.1.5 Array Iterator Objects](https://tc39.es/ecma262/#sec-array-iterator-objects)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArrayIterationKind {
    Key,
    Value,
    KeyAndValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct ArrayIterator(pub(crate) BaseIndex<ArrayIteratorHeapData>);

#[derive(Debug)]
pub struct ArrayIteratorHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[IteratedArrayLike]]; None once iteration has finished.
    pub(crate) array: Option<Object>,
    /// \[\[ArrayLikeNextIndex]]
    pub(crate) next_index: i64,
    /// \[\[ArrayLikeIterationKind]]
    pub(crate) kind: ArrayIterationKind,
}

impl ArrayIterator {
    /// ### [23.1.5.1 CreateArrayIterator ( array, kind )](https://tc39.es/ecma262/#sec-createarrayiterator)
    pub(crate) fn create(agent: &mut Agent, array: Object, kind: ArrayIterationKind) -> Self {
        agent.heap.array_iterators.push(Some(ArrayIteratorHeapData {
            object_index: None,
            array: Some(array),
            next_index: 0,
            kind,
        }));
        ArrayIterator(BaseIndex::last(&agent.heap.array_iterators))
    }

    pub(crate) fn get_index(self) -> usize {
        self.0.into_index()
    }
}

impl core::ops::Index<ArrayIterator> for Agent {
    type Output = ArrayIteratorHeapData;

    fn index(&self, index: ArrayIterator) -> &Self::Output {
        self.heap
            .array_iterators
            .get(index.get_index())
            .expect("ArrayIterator out of bounds")
            .as_ref()
            .expect("ArrayIterator slot empty")
    }
}

impl core::ops::IndexMut<ArrayIterator> for Agent {
    fn index_mut(&mut self, index: ArrayIterator) -> &mut Self::Output {
        self.heap
            .array_iterators
            .get_mut(index.get_index())
            .expect("ArrayIterator out of bounds")
            .as_mut()
            .expect("ArrayIterator slot empty")
    }
}

impl From<ArrayIterator> for Object {
    fn from(value: ArrayIterator) -> Self {
        Object::ArrayIterator(value)
    }
}

impl IntoValue for ArrayIterator {
    fn into_value(self) -> Value {
        Value::ArrayIterator(self)
    }
}

impl crate::ecmascript::types::IntoObject for ArrayIterator {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl InternalSlots for ArrayIterator {
    fn get_backing_object(self, agent: &Agent) -> Option<OrdinaryObject> {
        agent[self].object_index
    }

    fn set_backing_object(self, agent: &mut Agent, backing_object: OrdinaryObject) {
        debug_assert!(agent[self].object_index.is_none());
        agent[self].object_index = Some(backing_object);
    }

    fn internal_prototype(self, agent: &Agent) -> Option<Object> {
        match self.get_backing_object(agent) {
            Some(backing_object) => agent[backing_object].prototype,
            None => Some(
                agent
                    .current_realm()
                    .intrinsics()
                    .array_iterator_prototype()
                    .into(),
            ),
        }
    }
}

impl InternalMethods for ArrayIterator {}

impl HeapMark for ArrayIterator {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.array_iterators.push(*self);
    }
}

impl HeapMark for ArrayIteratorHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        self.array.mark_values(queues);
    }
}

pub(crate) struct ArrayPrototypeValues;
impl Builtin for ArrayPrototypeValues {
    const NAME: &'static str = "values";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_prototype_values);
}

/// ### [23.1.3.36 Array.prototype.values ( )](https://tc39.es/ecma262/#sec-array.prototype.values)
fn array_prototype_values(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Let O be ? ToObject(this value).
    let o = to_object(agent, this_value)?;
    // 2. Return CreateArrayIterator(O, VALUE).
    Ok(ArrayIterator::create(agent, o, ArrayIterationKind::Value).into_value())
}

struct ArrayPrototypeKeys;
impl Builtin for ArrayPrototypeKeys {
    const NAME: &'static str = "keys";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_prototype_keys);
}

/// ### [23.1.3.19 Array.prototype.keys ( )](https://tc39.es/ecma262/#sec-array.prototype.keys)
fn array_prototype_keys(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    let o = to_object(agent, this_value)?;
    Ok(ArrayIterator::create(agent, o, ArrayIterationKind::Key).into_value())
}

struct ArrayIteratorPrototypeNext;
impl Builtin for ArrayIteratorPrototypeNext {
    const NAME: &'static str = "next";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(array_iterator_prototype_next);
}

/// ### [23.1.5.2.1 %ArrayIteratorPrototype%.next ( )](https://tc39.es/ecma262/#sec-%arrayiteratorprototype%.next)
fn array_iterator_prototype_next(
    agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    let Value::ArrayIterator(iterator) = this_value else {
        return Err(agent.throw_exception_with_static_message(
            ExceptionType::TypeError,
            "this is not an Array Iterator",
        ));
    };
    let Some(array) = agent[iterator].array else {
        return Ok(create_iter_result_object(agent, Value::Undefined, true).into_value());
    };
    let index = agent[iterator].next_index;
    let kind = agent[iterator].kind;
    // b. Let len be ? LengthOfArrayLike(array).
    let len = length_of_array_like(agent, array)?;
    // d. If index ≥ len, return NormalCompletion(undefined).
    if index >= len {
        agent[iterator].array = None;
        return Ok(create_iter_result_object(agent, Value::Undefined, true).into_value());
    }
    // e. Set array.[[ArrayLikeNextIndex]] to index + 1.
    agent[iterator].next_index = index + 1;
    // f. Yield the result for the iteration kind.
    let result = match kind {
        ArrayIterationKind::Key => Value::from_f64(index as f64),
        ArrayIterationKind::Value => get(agent, array, PropertyKey::Integer(index as u32))?,
        ArrayIterationKind::KeyAndValue => {
            let value = get(agent, array, PropertyKey::Integer(index as u32))?;
            let entry = crate::ecmascript::abstract_operations::operations_on_objects::create_array_from_list(
                agent,
                &[Value::from_f64(index as f64), value],
            );
            entry.into_value()
        }
    };
    Ok(create_iter_result_object(agent, result, false).into_value())
}

/// The self-returning `[@@iterator]` of `%IteratorPrototype%`, shared by the
/// iterator hierarchy.
pub(crate) struct IteratorPrototypeIterator;
impl Builtin for IteratorPrototypeIterator {
    const NAME: &'static str = "[Symbol.iterator]";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(iterator_prototype_iterator);
}

/// ### [27.1.2.1 %IteratorPrototype% \[ @@iterator \] ( )](https://tc39.es/ecma262/#sec-%iteratorprototype%-@@iterator)
fn iterator_prototype_iterator(
    _agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Return the this value.
    Ok(this_value)
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let constructor = intrinsics.array();
    let prototype = intrinsics.array_prototype;
    let iterator_prototype = intrinsics.array_iterator_prototype;
    let values_intrinsic = intrinsics.array_prototype_values();

    BuiltinFunctionBuilder::new_intrinsic_constructor(agent, realm, constructor)
        .with_prototype_property(prototype.into())
        .with_builtin_function_property::<ArrayIsArray>()
        .with_builtin_function_property::<ArrayOf>()
        .build();

    let values_key = PropertyKey::from_static_str(agent, "values");
    let iterator_key = PropertyKey::Symbol(WellKnownSymbolIndexes::Iterator.into());
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, prototype)
        .with_builtin_function_property::<ArrayPrototypeAt>()
        .with_builtin_function_property::<ArrayPrototypeIndexOf>()
        .with_builtin_function_property::<ArrayPrototypeJoin>()
        .with_builtin_function_property::<ArrayPrototypeKeys>()
        .with_builtin_function_property::<ArrayPrototypePush>()
        .with_builtin_function_property::<ArrayPrototypeSort>()
        .with_data_property(values_key, values_intrinsic.into_value())
        .with_data_property(iterator_key, values_intrinsic.into_value())
        .build();

    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, iterator_prototype)
        .with_builtin_function_property::<ArrayIteratorPrototypeNext>()
        .with_to_string_tag("Array Iterator")
        .build();
}
