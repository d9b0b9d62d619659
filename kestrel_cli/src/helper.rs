// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kestrel_vm::ecmascript::builtins::{
    create_builtin_function, ArgumentsList, Behaviour, BuiltinFunctionArgs,
};
use kestrel_vm::ecmascript::execution::{Agent, JsResult};
use kestrel_vm::ecmascript::types::{
    InternalMethods, IntoValue, Object, PropertyDescriptor, PropertyKey, Value,
};
use oxc_diagnostics::OxcDiagnostic;

pub(crate) fn exit_with_parse_errors(errors: Vec<OxcDiagnostic>, path: &str) -> ! {
    eprintln!("Parse errors in {}:", path);
    for error in errors {
        eprintln!("  {}", error);
    }
    std::process::exit(1);
}

/// Installs the host-defined `print` global.
pub(crate) fn initialize_global_object(agent: &mut Agent, global: Object) {
    fn print(agent: &mut Agent, _this: Value, args: ArgumentsList) -> JsResult<Value> {
        if args.is_empty() {
            println!();
        } else {
            let rendered = value_to_display_string(agent, args.get(0));
            println!("{}", rendered);
        }
        Ok(Value::Undefined)
    }
    let realm = agent.current_realm_id();
    let function = create_builtin_function(
        agent,
        Behaviour::Regular(print),
        BuiltinFunctionArgs::new(1, "print", realm),
    );
    let key = PropertyKey::from_static_str(agent, "print");
    global
        .internal_define_own_property(
            agent,
            key,
            PropertyDescriptor {
                value: Some(function.into_value()),
                writable: Some(true),
                enumerable: Some(false),
                configurable: Some(true),
                ..Default::default()
            },
        )
        .expect("could not install print");
}

/// A human-oriented rendering of a value for REPL and error output.
pub(crate) fn value_to_display_string(agent: &mut Agent, value: Value) -> String {
    match value {
        Value::String(string) => format!("\"{}\"", string.to_string_lossy(agent)),
        Value::Error(error) => {
            let key = PropertyKey::from_static_str(agent, "stack");
            let stack = Object::from(error)
                .internal_get(agent, key, value)
                .unwrap_or(Value::Undefined);
            if let Value::String(stack) = stack {
                stack.to_string_lossy(agent).into_owned()
            } else {
                let repr = value.string_repr(agent);
                repr.to_string_lossy(agent).into_owned()
            }
        }
        _ => {
            let repr = value.string_repr(agent);
            repr.to_string_lossy(agent).into_owned()
        }
    }
}
