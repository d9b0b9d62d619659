// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod boolean_objects;
pub mod error_objects;
pub mod function_objects;
pub mod object_objects;
pub mod symbol_objects;
