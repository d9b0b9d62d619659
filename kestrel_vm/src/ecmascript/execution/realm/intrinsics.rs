// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-realm intrinsics table, keyed by canonical `%X%` names.
//!
//! Creation order matters: `%Object.prototype%` and `%Function.prototype%`
//! exist before any other prototype; `%ThrowTypeError%` before the argument
//! and function machinery that references it. The prototypes are allocated
//! bare first, then every constructor, and only then are members installed,
//! so that forward references between intrinsics always resolve.

use crate::ecmascript::builtins::array_buffer::abstract_operations::ElementType;
use crate::ecmascript::builtins::builtin_function::{
    create_builtin_function, Builtin, BuiltinFunction, BuiltinFunctionArgs,
};
use crate::ecmascript::builtins::{fundamental_objects, indexed_collections, numbers_and_dates, reflection, structured_data, text_processing};
use crate::ecmascript::builtins::control_abstraction_objects::{
    async_generator_objects, generator_objects, iteration, promise_objects,
};
use crate::ecmascript::execution::{Agent, RealmIdentifier};
use crate::ecmascript::types::{Object, ObjectHeapData, OrdinaryObject};
use crate::heap::indexes::ObjectIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

/// Enumeration of intrinsics intended to be used as the \[\[Prototype]]
/// value of an object. Used in GetPrototypeFromConstructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoIntrinsics {
    AggregateError,
    Array,
    ArrayBuffer,
    AsyncGenerator,
    BigInt,
    Boolean,
    DataView,
    Error,
    EvalError,
    Function,
    Generator,
    Number,
    Object,
    Promise,
    RangeError,
    ReferenceError,
    String,
    Symbol,
    SyntaxError,
    TypeError,
    UriError,
}

/// The number of concrete TypedArray constructors.
pub(crate) const TYPED_ARRAY_KINDS: [ElementType; 11] = [
    ElementType::Int8,
    ElementType::Uint8,
    ElementType::Uint8Clamped,
    ElementType::Int16,
    ElementType::Uint16,
    ElementType::Int32,
    ElementType::Uint32,
    ElementType::BigInt64,
    ElementType::BigUint64,
    ElementType::Float32,
    ElementType::Float64,
];

pub(crate) fn typed_array_kind_index(element_type: ElementType) -> usize {
    TYPED_ARRAY_KINDS
        .iter()
        .position(|kind| *kind == element_type)
        .expect("all element types have constructors")
}

#[derive(Debug, Clone)]
pub struct Intrinsics {
    pub(crate) aggregate_error: BuiltinFunction,
    pub(crate) aggregate_error_prototype: OrdinaryObject,
    pub(crate) array: BuiltinFunction,
    pub(crate) array_buffer: BuiltinFunction,
    pub(crate) array_buffer_prototype: OrdinaryObject,
    pub(crate) array_iterator_prototype: OrdinaryObject,
    pub(crate) array_prototype: OrdinaryObject,
    pub(crate) array_prototype_values: BuiltinFunction,
    pub(crate) async_generator_function_prototype: OrdinaryObject,
    pub(crate) async_generator_prototype: OrdinaryObject,
    pub(crate) async_iterator_prototype: OrdinaryObject,
    pub(crate) big_int: BuiltinFunction,
    pub(crate) big_int_prototype: OrdinaryObject,
    pub(crate) boolean: BuiltinFunction,
    pub(crate) boolean_prototype: OrdinaryObject,
    pub(crate) data_view: BuiltinFunction,
    pub(crate) data_view_prototype: OrdinaryObject,
    pub(crate) error: BuiltinFunction,
    pub(crate) error_prototype: OrdinaryObject,
    pub(crate) eval_error: BuiltinFunction,
    pub(crate) eval_error_prototype: OrdinaryObject,
    pub(crate) function_prototype: OrdinaryObject,
    pub(crate) generator_function_prototype: OrdinaryObject,
    pub(crate) generator_prototype: OrdinaryObject,
    pub(crate) iterator_prototype: OrdinaryObject,
    pub(crate) number: BuiltinFunction,
    pub(crate) number_prototype: OrdinaryObject,
    pub(crate) object: BuiltinFunction,
    pub(crate) object_prototype: OrdinaryObject,
    pub(crate) promise: BuiltinFunction,
    pub(crate) promise_prototype: OrdinaryObject,
    pub(crate) proxy: BuiltinFunction,
    pub(crate) range_error: BuiltinFunction,
    pub(crate) range_error_prototype: OrdinaryObject,
    pub(crate) reference_error: BuiltinFunction,
    pub(crate) reference_error_prototype: OrdinaryObject,
    pub(crate) reflect: OrdinaryObject,
    pub(crate) string: BuiltinFunction,
    pub(crate) string_prototype: OrdinaryObject,
    pub(crate) symbol: BuiltinFunction,
    pub(crate) symbol_prototype: OrdinaryObject,
    pub(crate) syntax_error: BuiltinFunction,
    pub(crate) syntax_error_prototype: OrdinaryObject,
    /// %ThrowTypeError%: a frozen function reused as the getter/setter for
    /// `arguments.callee` on unmapped argument objects.
    pub(crate) throw_type_error: BuiltinFunction,
    pub(crate) type_error: BuiltinFunction,
    pub(crate) type_error_prototype: OrdinaryObject,
    pub(crate) typed_array: BuiltinFunction,
    pub(crate) typed_array_prototype: OrdinaryObject,
    pub(crate) typed_array_constructors: [BuiltinFunction; 11],
    pub(crate) typed_array_prototypes: [OrdinaryObject; 11],
    pub(crate) uri_error: BuiltinFunction,
    pub(crate) uri_error_prototype: OrdinaryObject,
}

macro_rules! intrinsic_accessors {
    ($($name: ident: $ty: ty),* $(,)?) => {
        impl Intrinsics {
            $(pub(crate) fn $name(&self) -> $ty {
                self.$name
            })*
        }
    };
}

intrinsic_accessors!(
    aggregate_error: BuiltinFunction,
    array: BuiltinFunction,
    array_buffer: BuiltinFunction,
    array_iterator_prototype: OrdinaryObject,
    array_prototype: OrdinaryObject,
    array_prototype_values: BuiltinFunction,
    async_generator_prototype: OrdinaryObject,
    async_iterator_prototype: OrdinaryObject,
    big_int: BuiltinFunction,
    boolean: BuiltinFunction,
    data_view: BuiltinFunction,
    error: BuiltinFunction,
    eval_error: BuiltinFunction,
    function_prototype: OrdinaryObject,
    generator_prototype: OrdinaryObject,
    iterator_prototype: OrdinaryObject,
    number: BuiltinFunction,
    object: BuiltinFunction,
    object_prototype: OrdinaryObject,
    promise: BuiltinFunction,
    promise_prototype: OrdinaryObject,
    proxy: BuiltinFunction,
    range_error: BuiltinFunction,
    reference_error: BuiltinFunction,
    reflect: OrdinaryObject,
    string: BuiltinFunction,
    symbol: BuiltinFunction,
    syntax_error: BuiltinFunction,
    throw_type_error: BuiltinFunction,
    type_error: BuiltinFunction,
    typed_array: BuiltinFunction,
    typed_array_prototype: OrdinaryObject,
    uri_error: BuiltinFunction,
);

impl Intrinsics {
    pub(crate) fn get_intrinsic_default_proto(&self, proto: ProtoIntrinsics) -> Object {
        let prototype = match proto {
            ProtoIntrinsics::AggregateError => self.aggregate_error_prototype,
            ProtoIntrinsics::Array => self.array_prototype,
            ProtoIntrinsics::ArrayBuffer => self.array_buffer_prototype,
            ProtoIntrinsics::AsyncGenerator => self.async_generator_prototype,
            ProtoIntrinsics::BigInt => self.big_int_prototype,
            ProtoIntrinsics::Boolean => self.boolean_prototype,
            ProtoIntrinsics::DataView => self.data_view_prototype,
            ProtoIntrinsics::Error => self.error_prototype,
            ProtoIntrinsics::EvalError => self.eval_error_prototype,
            ProtoIntrinsics::Function => self.function_prototype,
            ProtoIntrinsics::Generator => self.generator_prototype,
            ProtoIntrinsics::Number => self.number_prototype,
            ProtoIntrinsics::Object => self.object_prototype,
            ProtoIntrinsics::Promise => self.promise_prototype,
            ProtoIntrinsics::RangeError => self.range_error_prototype,
            ProtoIntrinsics::ReferenceError => self.reference_error_prototype,
            ProtoIntrinsics::String => self.string_prototype,
            ProtoIntrinsics::Symbol => self.symbol_prototype,
            ProtoIntrinsics::SyntaxError => self.syntax_error_prototype,
            ProtoIntrinsics::TypeError => self.type_error_prototype,
            ProtoIntrinsics::UriError => self.uri_error_prototype,
        };
        Object::Object(prototype)
    }

    pub(crate) fn typed_array_constructor(&self, element_type: ElementType) -> BuiltinFunction {
        self.typed_array_constructors[typed_array_kind_index(element_type)]
    }

    pub(crate) fn typed_array_prototype_for(&self, element_type: ElementType) -> OrdinaryObject {
        self.typed_array_prototypes[typed_array_kind_index(element_type)]
    }

    /// ### [9.3.2 CreateIntrinsics ( realmRec )](https://tc39.es/ecma262/#sec-createintrinsics)
    pub(crate) fn create(agent: &mut Agent, realm: RealmIdentifier) -> Intrinsics {
        // %Object.prototype% is the root of the ordinary prototype chains
        // and must exist first; %Function.prototype% second.
        let object_prototype = bare_object(agent, None);
        let function_prototype = bare_object(agent, Some(object_prototype.into()));

        // %ThrowTypeError% is a frozen anonymous function.
        let throw_type_error = create_builtin_function(
            agent,
            fundamental_objects::function_objects::ThrowTypeError::BEHAVIOUR,
            BuiltinFunctionArgs {
                length: 0,
                name: "",
                realm,
                prototype: Some(function_prototype.into()),
            },
        );
        let backing = crate::ecmascript::types::InternalSlots::get_or_create_backing_object(
            throw_type_error,
            agent,
        );
        agent[backing].extensible = false;

        // Iteration prototypes.
        let iterator_prototype = bare_object(agent, Some(object_prototype.into()));
        let async_iterator_prototype = bare_object(agent, Some(object_prototype.into()));
        let array_iterator_prototype = bare_object(agent, Some(iterator_prototype.into()));
        let generator_function_prototype = bare_object(agent, Some(function_prototype.into()));
        let generator_prototype = bare_object(agent, Some(iterator_prototype.into()));
        let async_generator_function_prototype =
            bare_object(agent, Some(function_prototype.into()));
        let async_generator_prototype = bare_object(agent, Some(async_iterator_prototype.into()));

        // Fundamental prototypes.
        let boolean_prototype = bare_object(agent, Some(object_prototype.into()));
        let symbol_prototype = bare_object(agent, Some(object_prototype.into()));
        let number_prototype = bare_object(agent, Some(object_prototype.into()));
        let big_int_prototype = bare_object(agent, Some(object_prototype.into()));
        let string_prototype = bare_object(agent, Some(object_prototype.into()));
        let array_prototype = bare_object(agent, Some(object_prototype.into()));
        let error_prototype = bare_object(agent, Some(object_prototype.into()));
        let eval_error_prototype = bare_object(agent, Some(error_prototype.into()));
        let range_error_prototype = bare_object(agent, Some(error_prototype.into()));
        let reference_error_prototype = bare_object(agent, Some(error_prototype.into()));
        let syntax_error_prototype = bare_object(agent, Some(error_prototype.into()));
        let type_error_prototype = bare_object(agent, Some(error_prototype.into()));
        let uri_error_prototype = bare_object(agent, Some(error_prototype.into()));
        let aggregate_error_prototype = bare_object(agent, Some(error_prototype.into()));
        let promise_prototype = bare_object(agent, Some(object_prototype.into()));
        let array_buffer_prototype = bare_object(agent, Some(object_prototype.into()));
        let data_view_prototype = bare_object(agent, Some(object_prototype.into()));
        let typed_array_prototype = bare_object(agent, Some(object_prototype.into()));
        let typed_array_prototypes =
            core::array::from_fn(|_| bare_object(agent, Some(typed_array_prototype.into())));
        let reflect = bare_object(agent, Some(object_prototype.into()));

        // Constructors.
        let function_proto_object: Object = function_prototype.into();
        let mut constructor = |agent: &mut Agent, behaviour, length, name: &'static str| {
            create_builtin_function(
                agent,
                behaviour,
                BuiltinFunctionArgs {
                    length,
                    name,
                    realm,
                    prototype: Some(function_proto_object),
                },
            )
        };
        let object = constructor(
            agent,
            fundamental_objects::object_objects::ObjectConstructor::BEHAVIOUR,
            1,
            "Object",
        );
        let boolean = constructor(
            agent,
            fundamental_objects::boolean_objects::BooleanConstructor::BEHAVIOUR,
            1,
            "Boolean",
        );
        let symbol = constructor(
            agent,
            fundamental_objects::symbol_objects::SymbolConstructor::BEHAVIOUR,
            0,
            "Symbol",
        );
        let number = constructor(
            agent,
            numbers_and_dates::number_objects::NumberConstructor::BEHAVIOUR,
            1,
            "Number",
        );
        let big_int = constructor(
            agent,
            numbers_and_dates::bigint_objects::BigIntConstructor::BEHAVIOUR,
            1,
            "BigInt",
        );
        let string = constructor(
            agent,
            text_processing::string_objects::StringConstructor::BEHAVIOUR,
            1,
            "String",
        );
        let array = constructor(
            agent,
            indexed_collections::array_objects::ArrayConstructor::BEHAVIOUR,
            1,
            "Array",
        );
        let error = constructor(
            agent,
            fundamental_objects::error_objects::ErrorConstructor::BEHAVIOUR,
            1,
            "Error",
        );
        let eval_error = constructor(
            agent,
            fundamental_objects::error_objects::EvalErrorConstructor::BEHAVIOUR,
            1,
            "EvalError",
        );
        let range_error = constructor(
            agent,
            fundamental_objects::error_objects::RangeErrorConstructor::BEHAVIOUR,
            1,
            "RangeError",
        );
        let reference_error = constructor(
            agent,
            fundamental_objects::error_objects::ReferenceErrorConstructor::BEHAVIOUR,
            1,
            "ReferenceError",
        );
        let syntax_error = constructor(
            agent,
            fundamental_objects::error_objects::SyntaxErrorConstructor::BEHAVIOUR,
            1,
            "SyntaxError",
        );
        let type_error = constructor(
            agent,
            fundamental_objects::error_objects::TypeErrorConstructor::BEHAVIOUR,
            1,
            "TypeError",
        );
        let uri_error = constructor(
            agent,
            fundamental_objects::error_objects::UriErrorConstructor::BEHAVIOUR,
            1,
            "URIError",
        );
        let aggregate_error = constructor(
            agent,
            fundamental_objects::error_objects::AggregateErrorConstructor::BEHAVIOUR,
            2,
            "AggregateError",
        );
        let promise = constructor(
            agent,
            promise_objects::promise_constructor::PromiseConstructor::BEHAVIOUR,
            1,
            "Promise",
        );
        let proxy = constructor(
            agent,
            reflection::proxy_constructor::ProxyConstructor::BEHAVIOUR,
            2,
            "Proxy",
        );
        let array_buffer = constructor(
            agent,
            structured_data::array_buffer_objects::ArrayBufferConstructor::BEHAVIOUR,
            1,
            "ArrayBuffer",
        );
        let data_view = constructor(
            agent,
            structured_data::data_view_objects::DataViewConstructor::BEHAVIOUR,
            1,
            "DataView",
        );
        let typed_array = constructor(
            agent,
            indexed_collections::typed_array_objects::TypedArrayConstructor::BEHAVIOUR,
            0,
            "TypedArray",
        );
        let typed_array_constructors =
            indexed_collections::typed_array_objects::create_constructors(
                agent,
                realm,
                function_proto_object,
            );
        let array_prototype_values =
            crate::ecmascript::builders::ordinary_object_builder::create_intrinsic_function::<
                indexed_collections::array_objects::ArrayPrototypeValues,
            >(agent, realm);

        let intrinsics = Intrinsics {
            aggregate_error,
            aggregate_error_prototype,
            array,
            array_buffer,
            array_buffer_prototype,
            array_iterator_prototype,
            array_prototype,
            array_prototype_values,
            async_generator_function_prototype,
            async_generator_prototype,
            async_iterator_prototype,
            big_int,
            big_int_prototype,
            boolean,
            boolean_prototype,
            data_view,
            data_view_prototype,
            error,
            error_prototype,
            eval_error,
            eval_error_prototype,
            function_prototype,
            generator_function_prototype,
            generator_prototype,
            iterator_prototype,
            number,
            number_prototype,
            object,
            object_prototype,
            promise,
            promise_prototype,
            proxy,
            range_error,
            range_error_prototype,
            reference_error,
            reference_error_prototype,
            reflect,
            string,
            string_prototype,
            symbol,
            symbol_prototype,
            syntax_error,
            syntax_error_prototype,
            throw_type_error,
            type_error,
            type_error_prototype,
            typed_array,
            typed_array_prototype,
            typed_array_constructors,
            typed_array_prototypes,
            uri_error,
            uri_error_prototype,
        };

        // Make the table available through the realm before installing
        // members: the installers read intrinsic handles from it.
        agent[realm].intrinsics = Some(intrinsics.clone());

        fundamental_objects::object_objects::bootstrap(agent, realm);
        fundamental_objects::function_objects::bootstrap(agent, realm);
        fundamental_objects::boolean_objects::bootstrap(agent, realm);
        fundamental_objects::symbol_objects::bootstrap(agent, realm);
        fundamental_objects::error_objects::bootstrap(agent, realm);
        numbers_and_dates::number_objects::bootstrap(agent, realm);
        numbers_and_dates::bigint_objects::bootstrap(agent, realm);
        text_processing::string_objects::bootstrap(agent, realm);
        indexed_collections::array_objects::bootstrap(agent, realm);
        iteration::bootstrap(agent, realm);
        generator_objects::bootstrap(agent, realm);
        async_generator_objects::bootstrap(agent, realm);
        promise_objects::promise_constructor::bootstrap(agent, realm);
        promise_objects::promise_prototype::bootstrap(agent, realm);
        structured_data::array_buffer_objects::bootstrap(agent, realm);
        structured_data::data_view_objects::bootstrap(agent, realm);
        indexed_collections::typed_array_objects::bootstrap(agent, realm);
        reflection::reflect_object::bootstrap(agent, realm);
        reflection::proxy_constructor::bootstrap(agent, realm);

        intrinsics
    }
}

fn bare_object(agent: &mut Agent, prototype: Option<Object>) -> OrdinaryObject {
    agent
        .heap
        .objects
        .push(Some(ObjectHeapData::new(true, prototype)));
    OrdinaryObject(ObjectIndex::last(&agent.heap.objects))
}

impl HeapMark for Intrinsics {
    fn mark_values(&self, queues: &mut WorkQueues) {
        let Intrinsics {
            aggregate_error,
            aggregate_error_prototype,
            array,
            array_buffer,
            array_buffer_prototype,
            array_iterator_prototype,
            array_prototype,
            array_prototype_values,
            async_generator_function_prototype,
            async_generator_prototype,
            async_iterator_prototype,
            big_int,
            big_int_prototype,
            boolean,
            boolean_prototype,
            data_view,
            data_view_prototype,
            error,
            error_prototype,
            eval_error,
            eval_error_prototype,
            function_prototype,
            generator_function_prototype,
            generator_prototype,
            iterator_prototype,
            number,
            number_prototype,
            object,
            object_prototype,
            promise,
            promise_prototype,
            proxy,
            range_error,
            range_error_prototype,
            reference_error,
            reference_error_prototype,
            reflect,
            string,
            string_prototype,
            symbol,
            symbol_prototype,
            syntax_error,
            syntax_error_prototype,
            throw_type_error,
            type_error,
            type_error_prototype,
            typed_array,
            typed_array_prototype,
            typed_array_constructors,
            typed_array_prototypes,
            uri_error,
            uri_error_prototype,
        } = self;
        for function in [
            aggregate_error,
            array,
            array_buffer,
            array_prototype_values,
            big_int,
            boolean,
            data_view,
            error,
            eval_error,
            number,
            object,
            promise,
            proxy,
            range_error,
            reference_error,
            string,
            symbol,
            syntax_error,
            throw_type_error,
            type_error,
            typed_array,
            uri_error,
        ] {
            queues.builtin_functions.push(*function);
        }
        queues.builtin_functions.extend(typed_array_constructors);
        for prototype in [
            aggregate_error_prototype,
            array_buffer_prototype,
            array_iterator_prototype,
            array_prototype,
            async_generator_function_prototype,
            async_generator_prototype,
            async_iterator_prototype,
            big_int_prototype,
            boolean_prototype,
            data_view_prototype,
            error_prototype,
            eval_error_prototype,
            function_prototype,
            generator_function_prototype,
            generator_prototype,
            iterator_prototype,
            number_prototype,
            object_prototype,
            promise_prototype,
            range_error_prototype,
            reference_error_prototype,
            reflect,
            string_prototype,
            symbol_prototype,
            syntax_error_prototype,
            type_error_prototype,
            typed_array_prototype,
            uri_error_prototype,
        ] {
            queues.objects.push(*prototype);
        }
        queues.objects.extend(typed_array_prototypes);
    }
}
