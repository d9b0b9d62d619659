// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::types::Object;
use crate::heap::mark::{HeapMark, WorkQueues};

#[derive(Debug, Clone)]
pub struct ProxyHeapData {
    /// \[\[ProxyTarget]]; None once the proxy has been revoked.
    pub(crate) target: Option<Object>,
    /// \[\[ProxyHandler]]; None once the proxy has been revoked.
    pub(crate) handler: Option<Object>,
    /// Whether the proxy target was callable at construction.
    pub(crate) is_callable: bool,
    /// Whether the proxy target was a constructor at construction.
    pub(crate) is_constructor: bool,
}

impl HeapMark for ProxyHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.target.mark_values(queues);
        self.handler.mark_values(queues);
    }
}
