// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use ahash::AHashMap;

use crate::ecmascript::types::{OrdinaryObject, PropertyDescriptor, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

/// Element storage of an Array exotic object.
///
/// Indices below `elements.len()` are stored densely with `None` marking
/// holes; far-flung indices of sparse arrays live in a side map so that
/// `a[4294967294] = 1` does not materialize four billion slots. Elements
/// whose property attributes differ from the `{ [[Writable]]: true,
/// [[Enumerable]]: true, [[Configurable]]: true }` default carry an entry in
/// `element_descriptors`.
#[derive(Debug, Default)]
pub struct ArrayHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// The `length` property value.
    pub(crate) len: u32,
    /// The `length` property's [[Writable]] attribute.
    pub(crate) len_writable: bool,
    pub(crate) elements: Vec<Option<Value>>,
    pub(crate) sparse_elements: AHashMap<u32, Value>,
    pub(crate) element_descriptors: AHashMap<u32, PropertyDescriptor>,
}

/// Sparse indices further than this beyond the dense region do not extend
/// the dense storage.
const DENSE_GROWTH_LIMIT: u32 = 256;

impl ArrayHeapData {
    pub(crate) fn element(&self, index: u32) -> Option<Value> {
        if (index as usize) < self.elements.len() {
            self.elements[index as usize]
        } else {
            self.sparse_elements.get(&index).copied()
        }
    }

    pub(crate) fn has_element(&self, index: u32) -> bool {
        self.element(index).is_some()
    }

    pub(crate) fn set_element(&mut self, index: u32, value: Value) {
        let dense_len = self.elements.len() as u32;
        if index < dense_len {
            self.elements[index as usize] = Some(value);
        } else if index < dense_len.saturating_add(DENSE_GROWTH_LIMIT) {
            self.elements.resize(index as usize + 1, None);
            self.elements[index as usize] = Some(value);
        } else {
            self.sparse_elements.insert(index, value);
        }
    }

    pub(crate) fn remove_element(&mut self, index: u32) {
        if (index as usize) < self.elements.len() {
            self.elements[index as usize] = None;
        } else {
            self.sparse_elements.remove(&index);
        }
        self.element_descriptors.remove(&index);
    }

    /// Populated element indices in ascending order.
    pub(crate) fn element_indices(&self) -> Vec<u32> {
        let mut indices: Vec<u32> = self
            .elements
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|_| index as u32))
            .collect();
        indices.extend(self.sparse_elements.keys().copied());
        indices.sort_unstable();
        indices
    }
}

impl HeapMark for ArrayHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        for slot in self.elements.iter().flatten() {
            slot.mark_values(queues);
        }
        for value in self.sparse_elements.values() {
            value.mark_values(queues);
        }
        for descriptor in self.element_descriptors.values() {
            descriptor.mark_values(queues);
        }
    }
}
