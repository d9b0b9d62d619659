// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use kestrel_vm::ecmascript::builtins::promise::Promise;
use kestrel_vm::ecmascript::execution::agent::{
    HostHooks, LoadPayload, PromiseRejectionOperation, Referrer,
};
use kestrel_vm::ecmascript::execution::Agent;
use kestrel_vm::ecmascript::scripts_and_modules::module::{
    finish_loading_imported_module, parse_module,
};
use kestrel_vm::ecmascript::types::String as JsString;

/// File-system module resolution: specifiers resolve relative to the
/// referring module's path.
#[derive(Debug)]
pub(crate) struct CliHostHooks;

impl HostHooks for CliHostHooks {
    fn load_imported_module(
        &self,
        agent: &mut Agent,
        referrer: Referrer,
        specifier: String,
        payload: LoadPayload,
    ) {
        let referrer_path = match referrer {
            Referrer::Module(module) => {
                let referrer_specifier = agent.module_specifier(module);
                PathBuf::from(referrer_specifier)
                    .parent()
                    .map(|parent| parent.to_path_buf())
                    .unwrap_or_default()
            }
            _ => PathBuf::new(),
        };
        let resolved = referrer_path.join(&specifier);
        let resolved = resolved
            .canonicalize()
            .unwrap_or(resolved)
            .to_string_lossy()
            .into_owned();
        let result = std::fs::read_to_string(&resolved)
            .map_err(|error| {
                agent.throw_module_load_error(format!(
                    "Could not load module {}: {}",
                    resolved, error
                ))
            })
            .and_then(|source| {
                let realm = agent.current_realm_id();
                let source_text = JsString::from_string(agent, source);
                let resolved_specifier = JsString::from_string(agent, resolved.clone());
                parse_module(agent, source_text, realm, resolved_specifier).map_err(|errors| {
                    let rendered: Vec<String> =
                        errors.iter().map(|error| error.to_string()).collect();
                    agent.throw_module_load_error(format!(
                        "Parse errors in {}: {}",
                        resolved,
                        rendered.join(", ")
                    ))
                })
            });
        finish_loading_imported_module(agent, referrer, specifier, payload, result);
    }

    fn promise_rejection_tracker(
        &self,
        _agent: &mut Agent,
        _promise: Promise,
        operation: PromiseRejectionOperation,
    ) {
        // A rejection without handlers is reported; a handler attached
        // later retracts the report.
        match operation {
            PromiseRejectionOperation::Reject => {
                eprintln!("Warning: unhandled promise rejection");
            }
            PromiseRejectionOperation::Handle => {
                eprintln!("Note: a rejection handler was attached late");
            }
        }
    }
}
