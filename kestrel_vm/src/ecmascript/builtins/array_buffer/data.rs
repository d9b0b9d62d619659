// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::{DataBlock, OrdinaryObject};
use crate::heap::mark::{HeapMark, WorkQueues};

/// The owned byte block of an ArrayBuffer. Detachment replaces the block
/// with `Detached`. Shared blocks are scaffolded: the type distinguishes
/// them, but no agent-cluster semantics are implemented.
#[derive(Debug, Clone)]
pub(crate) enum InternalBuffer {
    Detached,
    FixedLength(DataBlock),
    Shared(DataBlock),
}

#[derive(Debug, Clone)]
pub struct ArrayBufferHeapData {
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[ArrayBufferData]] and \[\[ArrayBufferByteLength]]
    pub(crate) buffer: InternalBuffer,
}

impl ArrayBufferHeapData {
    pub(crate) fn is_detached_buffer(&self) -> bool {
        matches!(self.buffer, InternalBuffer::Detached)
    }

    pub(crate) fn byte_length(&self) -> usize {
        match &self.buffer {
            InternalBuffer::Detached => 0,
            InternalBuffer::FixedLength(block) | InternalBuffer::Shared(block) => block.len(),
        }
    }

    pub(crate) fn block(&self) -> Option<&DataBlock> {
        match &self.buffer {
            InternalBuffer::Detached => None,
            InternalBuffer::FixedLength(block) | InternalBuffer::Shared(block) => Some(block),
        }
    }

    pub(crate) fn block_mut(&mut self) -> Option<&mut DataBlock> {
        match &mut self.buffer {
            InternalBuffer::Detached => None,
            InternalBuffer::FixedLength(block) | InternalBuffer::Shared(block) => Some(block),
        }
    }
}

impl HeapMark for ArrayBufferHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
    }
}
