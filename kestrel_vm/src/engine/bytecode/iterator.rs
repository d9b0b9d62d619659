// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::abstract_operations::operations_on_iterator_objects::{
    iterator_close, iterator_complete, iterator_next, iterator_value, IteratorRecord,
};
use crate::ecmascript::execution::{Agent, JsResult};
use crate::ecmascript::types::{
    InternalMethods, Object, PropertyKey, Value,
};
use crate::heap::mark::{HeapMark, WorkQueues};

/// An active iteration of the VM's iterator stack: `for-in` property
/// enumeration or the language iteration protocol.
#[derive(Debug)]
pub(crate) enum VmIterator {
    ObjectProperties(ObjectPropertiesIterator),
    GenericIterator {
        iterator_record: IteratorRecord,
        done: bool,
    },
}

impl VmIterator {
    pub(crate) fn from_iterator_record(iterator_record: IteratorRecord) -> Self {
        VmIterator::GenericIterator {
            iterator_record,
            done: false,
        }
    }

    /// Step the iteration, returning None once exhausted.
    pub(crate) fn step_value(&mut self, agent: &mut Agent) -> JsResult<Option<Value>> {
        match self {
            VmIterator::ObjectProperties(iterator) => iterator.next(agent),
            VmIterator::GenericIterator {
                iterator_record,
                done,
            } => {
                if *done {
                    return Ok(None);
                }
                let result = iterator_next(agent, iterator_record, None)?;
                if iterator_complete(agent, result)? {
                    *done = true;
                    return Ok(None);
                }
                Ok(Some(iterator_value(agent, result)?))
            }
        }
    }

    /// IteratorClose with a normal completion; enumerators need no closing.
    pub(crate) fn close(self, agent: &mut Agent) -> JsResult<()> {
        if let VmIterator::GenericIterator {
            iterator_record,
            done: false,
        } = self
        {
            iterator_close(agent, iterator_record.iterator, Ok(Value::Undefined))?;
        }
        Ok(())
    }
}

/// ### [14.7.5.9 EnumerateObjectProperties ( O )](https://tc39.es/ecma262/#sec-enumerate-object-properties)
///
/// The enumerable string keys of the object and its prototype chain,
/// snapshot at the start, with shadowed keys visited once.
#[derive(Debug)]
pub(crate) struct ObjectPropertiesIterator {
    keys: Vec<PropertyKey>,
    index: usize,
}

impl ObjectPropertiesIterator {
    pub(crate) fn new(agent: &mut Agent, object: Object) -> JsResult<Self> {
        let mut visited = Vec::new();
        let mut keys = Vec::new();
        let mut target = Some(object);
        while let Some(current) = target {
            for key in current.internal_own_property_keys(agent)? {
                // A shadowing key is visited once; a non-enumerable one
                // suppresses enumerable keys further up the chain.
                if key.is_symbol() || visited.contains(&key) {
                    continue;
                }
                visited.push(key);
                let descriptor = current.internal_get_own_property(agent, key)?;
                if let Some(descriptor) = descriptor {
                    if descriptor.enumerable == Some(true) {
                        keys.push(key);
                    }
                }
            }
            target = current.internal_get_prototype_of(agent)?;
        }
        Ok(ObjectPropertiesIterator { keys, index: 0 })
    }

    fn next(&mut self, agent: &mut Agent) -> JsResult<Option<Value>> {
        let Some(key) = self.keys.get(self.index).copied() else {
            return Ok(None);
        };
        self.index += 1;
        // for-in yields the key string itself.
        Ok(Some(key.into_value(agent)))
    }
}

impl HeapMark for VmIterator {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            VmIterator::ObjectProperties(iterator) => {
                for key in &iterator.keys {
                    key.mark_values(queues);
                }
            }
            VmIterator::GenericIterator {
                iterator_record, ..
            } => iterator_record.mark_values(queues),
        }
    }
}

/// The remaining values of an iterator, for rest elements and spreads.
pub(crate) fn iterator_rest_values(
    agent: &mut Agent,
    iterator: &mut VmIterator,
) -> JsResult<Vec<Value>> {
    let mut values = Vec::new();
    while let Some(value) = iterator.step_value(agent)? {
        values.push(value);
    }
    Ok(values)
}
