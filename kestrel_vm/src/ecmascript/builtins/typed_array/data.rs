// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::builtins::array_buffer::abstract_operations::ElementType;
use crate::ecmascript::builtins::ArrayBuffer;
use crate::ecmascript::types::OrdinaryObject;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone)]
pub struct TypedArrayHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[ViewedArrayBuffer]]
    pub(crate) viewed_array_buffer: ArrayBuffer,
    /// \[\[TypedArrayName]], carried as the element type.
    pub(crate) element_type: ElementType,
    /// \[\[ByteOffset]]
    pub(crate) byte_offset: usize,
    /// \[\[ByteLength]]
    pub(crate) byte_length: usize,
    /// \[\[ArrayLength]]
    pub(crate) array_length: usize,
}

impl HeapMark for TypedArrayHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        self.viewed_array_buffer.mark_values(queues);
    }
}
