// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod data_block;
pub mod property_descriptor;
pub mod reference;

pub use data_block::DataBlock;
pub use property_descriptor::PropertyDescriptor;
pub use reference::{
    get_this_value, get_value, initialize_referenced_binding, put_value, Base, Reference,
    ReferencedName,
};
