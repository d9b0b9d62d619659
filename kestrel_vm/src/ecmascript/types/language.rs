// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod bigint;
pub mod function;
pub mod number;
pub mod object;
pub mod private_name;
pub mod string;
pub mod symbol;
pub mod value;

pub use bigint::{BigInt, BigIntHeapData};
pub use function::{Function, IntoFunction};
pub use number::Number;
pub use object::{
    InternalMethods, InternalSlots, IntoObject, Object, ObjectHeapData, OrdinaryObject,
    PropertyKey,
};
pub use private_name::{PrivateElement, PrivateName, PrivateNameHeapData};
pub use string::{String, StringHeapData};
pub use symbol::{Symbol, SymbolHeapData};
pub use value::{IntoValue, Value};
