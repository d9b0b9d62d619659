// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [27.1 Iteration](https://tc39.es/ecma262/#sec-iteration)

use crate::ecmascript::builders::OrdinaryObjectBuilder;
use crate::ecmascript::builtins::indexed_collections::array_objects::IteratorPrototypeIterator;
use crate::ecmascript::builtins::{ArgumentsList, Behaviour, Builtin};
use crate::ecmascript::execution::{Agent, JsResult, RealmIdentifier};
use crate::ecmascript::types::{PropertyKey, Value};
use crate::heap::WellKnownSymbolIndexes;

struct AsyncIteratorPrototypeAsyncIterator;
impl Builtin for AsyncIteratorPrototypeAsyncIterator {
    const NAME: &'static str = "[Symbol.asyncIterator]";
    const LENGTH: u8 = 0;
    const BEHAVIOUR: Behaviour = Behaviour::Regular(async_iterator_prototype_async_iterator);
}

/// ### [27.1.3.1 %AsyncIteratorPrototype% \[ @@asyncIterator \] ( )](https://tc39.es/ecma262/#sec-asynciteratorprototype-asynciterator)
fn async_iterator_prototype_async_iterator(
    _agent: &mut Agent,
    this_value: Value,
    _arguments: ArgumentsList,
) -> JsResult<Value> {
    // 1. Return the this value.
    Ok(this_value)
}

pub(crate) fn bootstrap(agent: &mut Agent, realm: RealmIdentifier) {
    let intrinsics = agent[realm].intrinsics();
    let iterator_prototype = intrinsics.iterator_prototype();
    let async_iterator_prototype = intrinsics.async_iterator_prototype();

    // %IteratorPrototype%[@@iterator] returns the this value.
    let iterator_fn = crate::ecmascript::builders::ordinary_object_builder::create_intrinsic_function::<
        IteratorPrototypeIterator,
    >(agent, realm);
    let iterator_key = PropertyKey::Symbol(WellKnownSymbolIndexes::Iterator.into());
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, iterator_prototype)
        .with_data_property(
            iterator_key,
            crate::ecmascript::types::IntoValue::into_value(iterator_fn),
        )
        .build();

    let async_iterator_key = PropertyKey::Symbol(WellKnownSymbolIndexes::AsyncIterator.into());
    let async_iterator_fn = crate::ecmascript::builders::ordinary_object_builder::create_intrinsic_function::<
        AsyncIteratorPrototypeAsyncIterator,
    >(agent, realm);
    OrdinaryObjectBuilder::new_intrinsic_object(agent, realm, async_iterator_prototype)
        .with_data_property(
            async_iterator_key,
            crate::ecmascript::types::IntoValue::into_value(async_iterator_fn),
        )
        .build();
}
