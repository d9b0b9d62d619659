// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The slotted heap. Every object kind lives in its own `Vec<Option<T>>`;
//! handles are typed indexes into these vectors. Slots are `Option` so that a
//! future sweep can vacate them without disturbing neighbouring indexes.

pub mod indexes;
pub mod mark;
pub mod object_entry;

use wtf8::Wtf8Buf;

use crate::ecmascript::builtins::arguments::ArgumentsHeapData;
use crate::ecmascript::builtins::array::data::ArrayHeapData;
use crate::ecmascript::builtins::array_buffer::data::ArrayBufferHeapData;
use crate::ecmascript::builtins::bound_function::BoundFunctionHeapData;
use crate::ecmascript::builtins::builtin_function::BuiltinFunctionHeapData;
use crate::ecmascript::builtins::control_abstraction_objects::async_function_objects::await_reaction::AwaitReaction;
use crate::ecmascript::builtins::control_abstraction_objects::async_generator_objects::AsyncGeneratorHeapData;
use crate::ecmascript::builtins::control_abstraction_objects::generator_objects::GeneratorHeapData;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_reaction_records::PromiseReactionRecord;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_resolving_functions::PromiseResolvingFunctionHeapData;
use crate::ecmascript::builtins::data_view::data::DataViewHeapData;
use crate::ecmascript::builtins::ecmascript_function::ECMAScriptFunctionHeapData;
use crate::ecmascript::builtins::error::data::ErrorHeapData;
use crate::ecmascript::builtins::indexed_collections::array_objects::ArrayIteratorHeapData;
use crate::ecmascript::builtins::module::data::ModuleHeapData;
use crate::ecmascript::builtins::primitive_objects::PrimitiveObjectHeapData;
use crate::ecmascript::builtins::promise::data::PromiseHeapData;
use crate::ecmascript::builtins::proxy::data::ProxyHeapData;
use crate::ecmascript::builtins::typed_array::data::TypedArrayHeapData;
use crate::ecmascript::execution::environments::Environments;
use crate::ecmascript::execution::Realm;
use crate::ecmascript::scripts_and_modules::script::Script;
use crate::ecmascript::scripts_and_modules::source_code::SourceCodeHeapData;
use crate::ecmascript::types::{
    BigIntHeapData, ObjectHeapData, PrivateNameHeapData, String, StringHeapData, Symbol,
    SymbolHeapData,
};
use crate::engine::ExecutableHeapData;

use self::indexes::{StringIndex, SymbolIndex};

pub use object_entry::ObjectEntry;

#[derive(Debug)]
pub struct Heap {
    pub(crate) arguments: Vec<Option<ArgumentsHeapData>>,
    pub(crate) array_buffers: Vec<Option<ArrayBufferHeapData>>,
    pub(crate) array_iterators: Vec<Option<ArrayIteratorHeapData>>,
    pub(crate) arrays: Vec<Option<ArrayHeapData>>,
    pub(crate) async_generators: Vec<Option<AsyncGeneratorHeapData>>,
    pub(crate) await_reactions: Vec<Option<AwaitReaction>>,
    pub(crate) bigints: Vec<Option<BigIntHeapData>>,
    pub(crate) bound_functions: Vec<Option<BoundFunctionHeapData>>,
    pub(crate) builtin_functions: Vec<Option<BuiltinFunctionHeapData>>,
    pub(crate) data_views: Vec<Option<DataViewHeapData>>,
    pub(crate) ecmascript_functions: Vec<Option<ECMAScriptFunctionHeapData>>,
    pub(crate) environments: Environments,
    pub(crate) errors: Vec<Option<ErrorHeapData>>,
    pub(crate) executables: Vec<Option<ExecutableHeapData>>,
    pub(crate) generators: Vec<Option<GeneratorHeapData>>,
    pub(crate) modules: Vec<Option<ModuleHeapData>>,
    pub(crate) objects: Vec<Option<ObjectHeapData>>,
    pub(crate) primitive_objects: Vec<Option<PrimitiveObjectHeapData>>,
    pub(crate) private_names: Vec<Option<PrivateNameHeapData>>,
    pub(crate) promise_reactions: Vec<Option<PromiseReactionRecord>>,
    pub(crate) promise_resolving_functions: Vec<Option<PromiseResolvingFunctionHeapData>>,
    pub(crate) promises: Vec<Option<PromiseHeapData>>,
    pub(crate) proxys: Vec<Option<ProxyHeapData>>,
    pub(crate) realms: Vec<Option<Realm>>,
    pub(crate) scripts: Vec<Option<Script>>,
    pub(crate) source_codes: Vec<Option<SourceCodeHeapData>>,
    pub(crate) strings: Vec<Option<StringHeapData>>,
    pub(crate) symbols: Vec<Option<SymbolHeapData>>,
    pub(crate) typed_arrays: Vec<Option<TypedArrayHeapData>>,
}

/// ### [6.1.5.1 Well-Known Symbols](https://tc39.es/ecma262/#sec-well-known-symbols)
///
/// The well-known symbols are seeded into the symbols vector at fixed
/// indexes, shared across all realms in the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum WellKnownSymbolIndexes {
    AsyncIterator = 0,
    HasInstance,
    IsConcatSpreadable,
    Iterator,
    Match,
    MatchAll,
    Replace,
    Search,
    Species,
    Split,
    ToPrimitive,
    ToStringTag,
    Unscopables,
}

const WELL_KNOWN_SYMBOL_DESCRIPTIONS: [&str; 13] = [
    "Symbol.asyncIterator",
    "Symbol.hasInstance",
    "Symbol.isConcatSpreadable",
    "Symbol.iterator",
    "Symbol.match",
    "Symbol.matchAll",
    "Symbol.replace",
    "Symbol.search",
    "Symbol.species",
    "Symbol.split",
    "Symbol.toPrimitive",
    "Symbol.toStringTag",
    "Symbol.unscopables",
];

impl From<WellKnownSymbolIndexes> for Symbol {
    fn from(value: WellKnownSymbolIndexes) -> Self {
        Symbol(SymbolIndex::from_u32_index(value as u32))
    }
}

impl Heap {
    pub fn new() -> Self {
        let mut heap = Heap {
            arguments: Vec::new(),
            array_buffers: Vec::new(),
            array_iterators: Vec::new(),
            arrays: Vec::with_capacity(256),
            async_generators: Vec::new(),
            await_reactions: Vec::new(),
            bigints: Vec::new(),
            bound_functions: Vec::new(),
            builtin_functions: Vec::with_capacity(256),
            data_views: Vec::new(),
            ecmascript_functions: Vec::with_capacity(256),
            environments: Environments::default(),
            errors: Vec::new(),
            executables: Vec::new(),
            generators: Vec::new(),
            modules: Vec::new(),
            objects: Vec::with_capacity(1024),
            primitive_objects: Vec::new(),
            private_names: Vec::new(),
            promise_reactions: Vec::new(),
            promise_resolving_functions: Vec::new(),
            promises: Vec::new(),
            proxys: Vec::new(),
            realms: Vec::with_capacity(1),
            scripts: Vec::with_capacity(1),
            source_codes: Vec::new(),
            strings: Vec::with_capacity(1024),
            symbols: Vec::with_capacity(32),
            typed_arrays: Vec::new(),
        };

        // Seed the empty string at index 0 (String::EMPTY) and the
        // well-known symbols at their fixed indexes.
        heap.strings.push(Some(StringHeapData::from_str("")));
        for description in WELL_KNOWN_SYMBOL_DESCRIPTIONS {
            let descriptor = heap.alloc_str(description);
            heap.symbols.push(Some(SymbolHeapData {
                descriptor: Some(descriptor),
            }));
        }

        heap
    }

    /// Allocate a string, interning it: an existing heap string with equal
    /// contents is reused so that handle equality is string equality.
    pub(crate) fn alloc_str(&mut self, message: &str) -> String {
        if message.is_empty() {
            return String::EMPTY;
        }
        if let Some(existing) = self.find_equal_string(message.as_bytes()) {
            return existing;
        }
        self.strings.push(Some(StringHeapData::from_str(message)));
        String(StringIndex::last(&self.strings))
    }

    pub(crate) fn alloc_wtf8_buf(&mut self, message: Wtf8Buf) -> String {
        if message.len() == 0 {
            return String::EMPTY;
        }
        // The WTF-8 byte representation is canonical, so byte equality is
        // string equality here as well.
        if let Some(existing) = self.find_equal_string(bytes_of_wtf8(&message)) {
            return existing;
        }
        self.strings
            .push(Some(StringHeapData::from_wtf8_buf(message)));
        String(StringIndex::last(&self.strings))
    }

    fn find_equal_string(&self, message: &[u8]) -> Option<String> {
        self.strings
            .iter()
            .position(|slot| {
                slot.as_ref()
                    .is_some_and(|data| bytes_of_wtf8(data.as_wtf8()) == message)
            })
            .map(|index| String(StringIndex::from_index(index)))
    }

    /// Allocate a new unique Symbol.
    pub(crate) fn alloc_symbol(&mut self, descriptor: Option<String>) -> Symbol {
        self.symbols.push(Some(SymbolHeapData { descriptor }));
        Symbol(SymbolIndex::last(&self.symbols))
    }
}

fn bytes_of_wtf8(data: &wtf8::Wtf8) -> &[u8] {
    // SAFETY: Wtf8 is a transparent wrapper over its byte representation.
    unsafe { core::mem::transmute::<&wtf8::Wtf8, &[u8]>(data) }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
