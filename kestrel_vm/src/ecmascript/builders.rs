// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod builtin_function_builder;
pub mod ordinary_object_builder;

pub(crate) use builtin_function_builder::BuiltinFunctionBuilder;
pub(crate) use ordinary_object_builder::OrdinaryObjectBuilder;
