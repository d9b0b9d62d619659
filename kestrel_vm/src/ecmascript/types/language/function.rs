// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [6.1.7.2 Function objects](https://tc39.es/ecma262/#function-object)

use super::{IntoObject, IntoValue, Object, Value};
use crate::ecmascript::builtins::bound_function::BoundFunction;
use crate::ecmascript::builtins::builtin_function::BuiltinFunction;
use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_resolving_functions::PromiseResolvingFunction;
use crate::ecmascript::builtins::ecmascript_function::ECMAScriptFunction;
use crate::ecmascript::builtins::ArgumentsList;
use crate::ecmascript::execution::{Agent, JsResult};
use crate::heap::mark::{HeapMark, WorkQueues};

/// A callable object handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    BoundFunction(BoundFunction),
    BuiltinFunction(BuiltinFunction),
    ECMAScriptFunction(ECMAScriptFunction),
    PromiseResolvingFunction(PromiseResolvingFunction),
}

pub trait IntoFunction: Sized + Copy {
    fn into_function(self) -> Function;
}

impl IntoFunction for Function {
    fn into_function(self) -> Function {
        self
    }
}

impl Function {
    /// \[\[Call]]
    pub(crate) fn internal_call(
        self,
        agent: &mut Agent,
        this_argument: Value,
        arguments_list: ArgumentsList,
    ) -> JsResult<Value> {
        match self {
            Function::BoundFunction(f) => {
                crate::ecmascript::builtins::bound_function::bound_function_call(
                    agent,
                    f,
                    arguments_list,
                )
            }
            Function::BuiltinFunction(f) => {
                crate::ecmascript::builtins::builtin_function::builtin_call_or_construct(
                    agent,
                    f,
                    Some(this_argument),
                    arguments_list,
                    None,
                )
            }
            Function::ECMAScriptFunction(f) => {
                crate::ecmascript::builtins::ecmascript_function::ecmascript_function_call(
                    agent,
                    f,
                    this_argument,
                    arguments_list,
                )
            }
            Function::PromiseResolvingFunction(f) => {
                crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_resolving_functions::promise_resolving_function_call(
                    agent,
                    f,
                    arguments_list,
                )
            }
        }
    }

    /// \[\[Construct]]
    pub(crate) fn internal_construct(
        self,
        agent: &mut Agent,
        arguments_list: ArgumentsList,
        new_target: Function,
    ) -> JsResult<Object> {
        match self {
            Function::BoundFunction(f) => {
                crate::ecmascript::builtins::bound_function::bound_function_construct(
                    agent,
                    f,
                    arguments_list,
                    new_target,
                )
            }
            Function::BuiltinFunction(f) => {
                let result = crate::ecmascript::builtins::builtin_function::builtin_call_or_construct(
                    agent,
                    f,
                    None,
                    arguments_list,
                    Some(new_target),
                )?;
                let Ok(result) = Object::try_from(result) else {
                    unreachable!("builtin constructor returned a primitive");
                };
                Ok(result)
            }
            Function::ECMAScriptFunction(f) => {
                crate::ecmascript::builtins::ecmascript_function::ecmascript_function_construct(
                    agent,
                    f,
                    arguments_list,
                    new_target,
                )
            }
            Function::PromiseResolvingFunction(_) => {
                unreachable!("promise resolving functions are not constructors")
            }
        }
    }

    pub(crate) fn is_constructor(self, agent: &Agent) -> bool {
        match self {
            Function::BoundFunction(f) => {
                agent[f].bound_target_function.is_constructor(agent)
            }
            Function::BuiltinFunction(f) => agent[f].behaviour.is_constructor(),
            Function::ECMAScriptFunction(f) => agent[f].is_constructor,
            Function::PromiseResolvingFunction(_) => false,
        }
    }
}

impl From<Function> for Object {
    fn from(value: Function) -> Self {
        match value {
            Function::BoundFunction(f) => Object::BoundFunction(f),
            Function::BuiltinFunction(f) => Object::BuiltinFunction(f),
            Function::ECMAScriptFunction(f) => Object::ECMAScriptFunction(f),
            Function::PromiseResolvingFunction(f) => Object::PromiseResolvingFunction(f),
        }
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Object::from(value).into()
    }
}

impl TryFrom<Value> for Function {
    type Error = ();

    fn try_from(value: Value) -> Result<Self, ()> {
        match value {
            Value::BoundFunction(f) => Ok(Function::BoundFunction(f)),
            Value::BuiltinFunction(f) => Ok(Function::BuiltinFunction(f)),
            Value::ECMAScriptFunction(f) => Ok(Function::ECMAScriptFunction(f)),
            Value::PromiseResolvingFunction(f) => Ok(Function::PromiseResolvingFunction(f)),
            _ => Err(()),
        }
    }
}

impl IntoObject for Function {
    fn into_object(self) -> Object {
        self.into()
    }
}

impl IntoValue for Function {
    fn into_value(self) -> Value {
        self.into()
    }
}

impl HeapMark for Function {
    fn mark_values(&self, queues: &mut WorkQueues) {
        Object::from(*self).mark_values(queues);
    }
}
