// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::builtins::ArrayBuffer;
use crate::ecmascript::types::OrdinaryObject;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone)]
pub struct DataViewHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[ViewedArrayBuffer]]
    pub(crate) viewed_array_buffer: ArrayBuffer,
    /// \[\[ByteLength]]
    pub(crate) byte_length: usize,
    /// \[\[ByteOffset]]
    pub(crate) byte_offset: usize,
}

impl HeapMark for DataViewHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        self.viewed_array_buffer.mark_values(queues);
    }
}
