// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod agent;
pub mod default_host_hooks;
pub mod environments;
pub mod execution_context;
pub mod realm;

pub use agent::{Agent, JsResult};
pub use default_host_hooks::DefaultHostHooks;
pub(crate) use execution_context::{ECMAScriptCodeEvaluationState, ExecutionContext};
pub use realm::{
    initialize_default_realm, initialize_host_defined_realm, ProtoIntrinsics, Realm,
    RealmIdentifier,
};

use crate::ecmascript::types::Object;

/// ### [9.4.6 GetGlobalObject ( )](https://tc39.es/ecma262/#sec-getglobalobject)
pub(crate) fn get_global_object(agent: &Agent) -> Object {
    // 1. Let currentRealm be the current Realm Record.
    // 2. Return currentRealm.[[GlobalObject]].
    agent.current_realm().global_object()
}
