// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::fmt::Debug;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::num::NonZeroU32;

use crate::ecmascript::builtins::arguments::ArgumentsHeapData;
use crate::ecmascript::builtins::array::data::ArrayHeapData;
use crate::ecmascript::builtins::array_buffer::data::ArrayBufferHeapData;
use crate::ecmascript::builtins::bound_function::BoundFunctionHeapData;
use crate::ecmascript::builtins::builtin_function::BuiltinFunctionHeapData;
use crate::ecmascript::builtins::data_view::data::DataViewHeapData;
use crate::ecmascript::builtins::ecmascript_function::ECMAScriptFunctionHeapData;
use crate::ecmascript::builtins::error::data::ErrorHeapData;
use crate::ecmascript::builtins::module::data::ModuleHeapData;
use crate::ecmascript::builtins::primitive_objects::PrimitiveObjectHeapData;
use crate::ecmascript::builtins::promise::data::PromiseHeapData;
use crate::ecmascript::builtins::proxy::data::ProxyHeapData;
use crate::ecmascript::builtins::typed_array::data::TypedArrayHeapData;
use crate::ecmascript::types::{
    BigIntHeapData, ObjectHeapData, PrivateNameHeapData, StringHeapData, SymbolHeapData,
};

/// A typed index to a slot in one of the [`Heap`](crate::Heap) vectors.
///
/// Internally the index is stored in a [`NonZeroU32`] holding the index plus
/// one, so that `Option<BaseIndex<T>>` is pointer-sized.
#[repr(transparent)]
pub struct BaseIndex<T: ?Sized>(NonZeroU32, PhantomData<T>);

impl<T: ?Sized> Clone for BaseIndex<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for BaseIndex<T> {}

impl<T: ?Sized> PartialEq for BaseIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: ?Sized> Eq for BaseIndex<T> {}

impl<T: ?Sized> PartialOrd for BaseIndex<T> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for BaseIndex<T> {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T: ?Sized> Hash for BaseIndex<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T: ?Sized> Debug for BaseIndex<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "BaseIndex({:?})", self.into_index())
    }
}

impl<T: ?Sized> BaseIndex<T> {
    /// Creates an index from a position in a heap vector.
    ///
    /// ## Panics
    /// If the position does not fit in `u32::MAX - 1`.
    pub const fn from_index(value: usize) -> Self {
        assert!(value < u32::MAX as usize);
        // SAFETY: value + 1 cannot overflow to zero.
        Self(
            unsafe { NonZeroU32::new_unchecked(value as u32 + 1) },
            PhantomData,
        )
    }

    pub const fn from_u32_index(value: u32) -> Self {
        assert!(value < u32::MAX);
        // SAFETY: value + 1 cannot overflow to zero.
        Self(unsafe { NonZeroU32::new_unchecked(value + 1) }, PhantomData)
    }

    pub const fn into_index(self) -> usize {
        self.0.get() as usize - 1
    }

    pub const fn into_u32_index(self) -> u32 {
        self.0.get() - 1
    }

    /// The index of the last slot in a heap vector. The vector must be
    /// non-empty.
    pub fn last<U>(vec: &[Option<U>]) -> Self {
        assert!(!vec.is_empty());
        Self::from_index(vec.len() - 1)
    }
}

pub(crate) type ArgumentsIndex = BaseIndex<ArgumentsHeapData>;
pub(crate) type ArrayBufferIndex = BaseIndex<ArrayBufferHeapData>;
pub(crate) type ArrayIndex = BaseIndex<ArrayHeapData>;
pub(crate) type BigIntIndex = BaseIndex<BigIntHeapData>;
pub(crate) type BoundFunctionIndex = BaseIndex<BoundFunctionHeapData>;
pub(crate) type BuiltinFunctionIndex = BaseIndex<BuiltinFunctionHeapData>;
pub(crate) type DataViewIndex = BaseIndex<DataViewHeapData>;
pub(crate) type ECMAScriptFunctionIndex = BaseIndex<ECMAScriptFunctionHeapData>;
pub(crate) type ErrorIndex = BaseIndex<ErrorHeapData>;
pub(crate) type ModuleIndex = BaseIndex<ModuleHeapData>;
pub(crate) type ObjectIndex = BaseIndex<ObjectHeapData>;
pub(crate) type PrimitiveObjectIndex = BaseIndex<PrimitiveObjectHeapData>;
pub(crate) type PrivateNameIndex = BaseIndex<PrivateNameHeapData>;
pub(crate) type PromiseIndex = BaseIndex<PromiseHeapData>;
pub(crate) type ProxyIndex = BaseIndex<ProxyHeapData>;
pub(crate) type StringIndex = BaseIndex<StringHeapData>;
pub(crate) type SymbolIndex = BaseIndex<SymbolHeapData>;
pub(crate) type TypedArrayIndex = BaseIndex<TypedArrayHeapData>;
