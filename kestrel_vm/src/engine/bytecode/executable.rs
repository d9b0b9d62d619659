// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::ptr::NonNull;

use oxc_ast::ast;

use super::compiler::CompileContext;
use super::instructions::Instruction;
use crate::ecmascript::builtins::ecmascript_function::ECMAScriptFunction;
use crate::ecmascript::builtins::module::Module;
use crate::ecmascript::execution::Agent;
use crate::ecmascript::scripts_and_modules::script::ScriptIdentifier;
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::types::{String, Value};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

/// Reference to a heap-allocated compiled instruction sequence.
pub(crate) type Executable = BaseIndex<ExecutableHeapData>;

/// A function expression embedded in an outer executable, instantiated when
/// its defining instruction runs.
#[derive(Debug)]
pub(crate) struct FunctionExpression {
    /// SAFETY: The AST is kept alive by `source_code`.
    pub(crate) expression: NonNull<ast::Function<'static>>,
    pub(crate) source_code: SourceCode,
}

/// An arrow function expression embedded in an outer executable.
#[derive(Debug)]
pub(crate) struct ArrowFunctionExpression {
    /// SAFETY: The AST is kept alive by `source_code`.
    pub(crate) expression: NonNull<ast::ArrowFunctionExpression<'static>>,
    pub(crate) source_code: SourceCode,
}

#[derive(Debug)]
pub struct ExecutableHeapData {
    pub(crate) instructions: Box<[Instruction]>,
    pub(crate) constants: Box<[Value]>,
    pub(crate) identifiers: Box<[String]>,
    pub(crate) function_expressions: Box<[FunctionExpression]>,
    pub(crate) arrow_function_expressions: Box<[ArrowFunctionExpression]>,
    /// Compiled class field initializers referenced by the class
    /// instructions.
    pub(crate) class_initializer_bytecodes: Box<[Executable]>,
}

impl Executable {
    /// Compiles the top level of a script.
    pub(crate) fn compile_script(agent: &mut Agent, script: ScriptIdentifier) -> Executable {
        let program = agent[script].ecmascript_code;
        let source_code = agent[script].source_code;
        let is_strict = agent[script].is_strict;
        if agent.options.print_internals {
            eprintln!();
            eprintln!("=== Compiling Script ===");
            eprintln!();
        }
        let mut ctx = CompileContext::new(agent, source_code, is_strict);
        // SAFETY: The program is kept alive by the script's SourceCode.
        ctx.compile_statements(unsafe { &program.as_ref().body });
        ctx.do_implicit_return();
        ctx.finish()
    }

    /// Compiles the top level of a module.
    pub(crate) fn compile_module(agent: &mut Agent, module: Module) -> Executable {
        let program = agent[module].source_text.ecmascript_code;
        let source_code = agent[module].source_text.source_code;
        if agent.options.print_internals {
            eprintln!();
            eprintln!("=== Compiling Module ===");
            eprintln!();
        }
        let mut ctx = CompileContext::new(agent, source_code, true);
        // SAFETY: The program is kept alive by the module's SourceCode.
        ctx.compile_statements(unsafe { &program.as_ref().body });
        ctx.do_implicit_return();
        ctx.finish()
    }

    /// Compiles a function body, with the parameter binding prologue first.
    pub(crate) fn compile_function_body(
        agent: &mut Agent,
        function: ECMAScriptFunction,
    ) -> Executable {
        let data = &agent[function];
        let source_code = data.source_code;
        let is_strict = data.strict;
        let parameters = data
            .formal_parameters
            .expect("default constructors carry pre-compiled bytecode");
        let body = data
            .ecmascript_code
            .expect("default constructors carry pre-compiled bytecode");
        let is_concise = data.is_concise_arrow_function;
        let is_lexical = data.this_mode
            == crate::ecmascript::builtins::ecmascript_function::ThisMode::Lexical;
        let kind = data.kind;
        if agent.options.print_internals {
            eprintln!();
            eprintln!("=== Compiling Function Body ===");
            eprintln!();
        }
        let mut ctx = CompileContext::new(agent, source_code, is_strict);
        ctx.set_generator_kind(kind);
        // SAFETY: Parameters and body are kept alive by the function's
        // SourceCode.
        let parameters = unsafe { parameters.as_ref() };
        let body = unsafe { body.as_ref() };
        ctx.compile_function_declaration_instantiation(parameters, body, is_lexical);
        if is_concise {
            // A concise arrow body is a single expression statement whose
            // value is the return value.
            ctx.compile_concise_body(body);
        } else {
            ctx.compile_statements(&body.statements);
            ctx.do_implicit_return();
        }
        ctx.finish()
    }
}

impl core::ops::Index<Executable> for Agent {
    type Output = ExecutableHeapData;

    fn index(&self, index: Executable) -> &Self::Output {
        self.heap
            .executables
            .get(index.into_index())
            .expect("Executable out of bounds")
            .as_ref()
            .expect("Executable slot empty")
    }
}

impl ExecutableHeapData {
    pub(crate) fn fetch_instruction(&self, ip: usize) -> Option<Instruction> {
        self.instructions.get(ip).cloned()
    }
}

impl HeapMark for ExecutableHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.constants.mark_values(queues);
        self.identifiers.mark_values(queues);
        for function_expression in self.function_expressions.iter() {
            function_expression.source_code.mark_values(queues);
        }
        for arrow in self.arrow_function_expressions.iter() {
            arrow.source_code.mark_values(queues);
        }
        for executable in self.class_initializer_bytecodes.iter() {
            queues.executables.push(*executable);
        }
    }
}
