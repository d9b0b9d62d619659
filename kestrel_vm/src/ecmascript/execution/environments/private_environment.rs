// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::PrivateEnvironmentIndex;
use crate::ecmascript::execution::Agent;
use crate::ecmascript::types::{PrivateName, String};
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [9.2 PrivateEnvironment Records](https://tc39.es/ecma262/#sec-privateenvironment-records)
///
/// Tracks the Private Names created by ClassElements in the nearest
/// containing class, keyed by their `#`-prefixed description.
#[derive(Debug, Clone, Default)]
pub struct PrivateEnvironmentRecord {
    /// ### \[\[OuterPrivateEnvironment]]
    pub(super) outer_private_environment: Option<PrivateEnvironmentIndex>,

    /// ### \[\[Names]]
    pub(super) names: Vec<(String, PrivateName)>,
}

/// ### [9.2.1.1 NewPrivateEnvironment ( outerPrivEnv )](https://tc39.es/ecma262/#sec-newprivateenvironment)
pub(crate) fn new_private_environment(
    agent: &mut Agent,
    outer_private_environment: Option<PrivateEnvironmentIndex>,
) -> PrivateEnvironmentIndex {
    // 1. Let names be a new empty List.
    // 2. Return the PrivateEnvironment Record { [[OuterPrivateEnvironment]]:
    //    outerPrivEnv, [[Names]]: names }.
    agent
        .heap
        .environments
        .push_private_environment(PrivateEnvironmentRecord {
            outer_private_environment,
            names: Vec::new(),
        })
}

impl PrivateEnvironmentIndex {
    pub(crate) fn add_name(self, agent: &mut Agent, description: String, name: PrivateName) {
        agent
            .heap
            .environments
            .get_private_environment_mut(self)
            .names
            .push((description, name));
    }

    pub(crate) fn lookup(self, agent: &Agent, description: String) -> Option<PrivateName> {
        agent
            .heap
            .environments
            .get_private_environment(self)
            .names
            .iter()
            .find(|(entry, _)| *entry == description)
            .map(|(_, name)| *name)
    }

    pub(crate) fn outer(self, agent: &Agent) -> Option<PrivateEnvironmentIndex> {
        agent
            .heap
            .environments
            .get_private_environment(self)
            .outer_private_environment
    }
}

/// ### [9.2.1.2 ResolvePrivateIdentifier ( privEnv, identifier )](https://tc39.es/ecma262/#sec-resolve-private-identifier)
pub(crate) fn resolve_private_identifier(
    agent: &Agent,
    private_environment: PrivateEnvironmentIndex,
    identifier: String,
) -> PrivateName {
    let mut env = private_environment;
    loop {
        // 1. Let names be privEnv.[[Names]].
        // 2. For each Private Name pn of names, do
        //    a. If pn.[[Description]] is identifier, then return pn.
        if let Some(name) = env.lookup(agent, identifier) {
            return name;
        }
        // 3. Let outerPrivEnv be privEnv.[[OuterPrivateEnvironment]].
        // 4. Assert: outerPrivEnv is not null.
        // 5. Return ResolvePrivateIdentifier(outerPrivEnv, identifier).
        env = env
            .outer(agent)
            .expect("private identifier failed to resolve");
    }
}

impl HeapMark for PrivateEnvironmentRecord {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.outer_private_environment.mark_values(queues);
        for (description, name) in &self.names {
            description.mark_values(queues);
            name.mark_values(queues);
        }
    }
}
