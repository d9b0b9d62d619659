// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [15.2.4 Runtime Semantics: InstantiateOrdinaryFunctionObject](https://tc39.es/ecma262/#sec-runtime-semantics-instantiateordinaryfunctionobject)

use oxc_ast::ast;

use crate::ecmascript::builtins::ecmascript_function::{
    make_constructor, ordinary_function_create, set_function_name, ECMAScriptFunction,
    FunctionKind, OrdinaryFunctionCreateParams,
};
use crate::ecmascript::execution::environments::{EnvironmentIndex, PrivateEnvironmentIndex};
use crate::ecmascript::execution::{Agent, ProtoIntrinsics};
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::types::PropertyKey;

pub(crate) fn function_kind_of(function: &ast::Function) -> FunctionKind {
    match (function.r#async, function.generator) {
        (false, false) => FunctionKind::Normal,
        (false, true) => FunctionKind::Generator,
        (true, false) => FunctionKind::Async,
        (true, true) => FunctionKind::AsyncGenerator,
    }
}

/// Instantiates a function declaration or hoistable function expression into
/// a function object closed over `env`.
pub(crate) fn instantiate_function_object(
    agent: &mut Agent,
    function: &ast::Function,
    env: EnvironmentIndex,
    private_env: Option<PrivateEnvironmentIndex>,
    source_code: SourceCode,
) -> ECMAScriptFunction {
    let kind = function_kind_of(function);
    // 1-3. Let F be OrdinaryFunctionCreate(%Function.prototype%, sourceText,
    //      FormalParameters, FunctionBody, NON-LEXICAL-THIS, env,
    //      privateEnv).
    let body = function
        .body
        .as_ref()
        .expect("function declaration always has a body");
    let f = ordinary_function_create(
        agent,
        OrdinaryFunctionCreateParams {
            function_prototype: function_prototype_for_kind(agent, kind),
            source_code,
            source_text: function.span,
            parameters_list: &function.params,
            body,
            is_concise_arrow_function: false,
            kind,
            lexical_this: false,
            env,
            private_env,
        },
    );
    // 4. Perform SetFunctionName(F, name).
    if let Some(identifier) = &function.id {
        let name = PropertyKey::from_str(agent, identifier.name.as_str());
        set_function_name(agent, f, name, None);
    }
    // 5. Perform MakeConstructor(F): generators and async functions are not
    //    constructors.
    if kind == FunctionKind::Normal {
        make_constructor(agent, f, None, None);
    } else if kind == FunctionKind::Generator || kind == FunctionKind::AsyncGenerator {
        // Generators get a `prototype` object inheriting the right
        // generator prototype, without a `constructor` back-link.
        let proto_intrinsic = if kind == FunctionKind::Generator {
            ProtoIntrinsics::Generator
        } else {
            ProtoIntrinsics::AsyncGenerator
        };
        let prototype = agent
            .current_realm()
            .intrinsics()
            .get_intrinsic_default_proto(proto_intrinsic);
        let prototype =
            crate::ecmascript::types::OrdinaryObject::create_object(agent, Some(prototype), &[]);
        let prototype_key = PropertyKey::from_static_str(agent, "prototype");
        let backing = crate::ecmascript::types::InternalSlots::get_or_create_backing_object(f, agent);
        crate::ecmascript::builtins::ordinary::ordinary_define_own_property(
            agent,
            backing,
            prototype_key,
            crate::ecmascript::types::PropertyDescriptor {
                value: Some(crate::ecmascript::types::Value::Object(prototype)),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(false),
                ..Default::default()
            },
        );
    }
    // 6. Return F.
    f
}

pub(crate) fn function_prototype_for_kind(
    agent: &Agent,
    kind: FunctionKind,
) -> Option<crate::ecmascript::types::Object> {
    let intrinsics = agent.current_realm().intrinsics();
    match kind {
        FunctionKind::Normal | FunctionKind::Async => None,
        FunctionKind::Generator => {
            Some(crate::ecmascript::types::Object::Object(
                intrinsics.generator_function_prototype,
            ))
        }
        FunctionKind::AsyncGenerator => Some(crate::ecmascript::types::Object::Object(
            intrinsics.async_generator_function_prototype,
        )),
    }
}
