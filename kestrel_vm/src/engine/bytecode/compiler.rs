// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The compiler: each parse-tree node lowers to instructions following the
//! runtime semantics of its Evaluation steps. Labelled evaluation threads a
//! label set through the control-flow stack; `break` and `continue` resolve
//! to jump indexes at compile time, routed through every intervening finally
//! block via the completion machinery.

use core::ptr::NonNull;

use oxc_ast::ast;
use oxc_syntax::operator::{
    AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator, UpdateOperator,
};

use super::executable::{
    ArrowFunctionExpression, Executable, ExecutableHeapData, FunctionExpression,
};
use super::instructions::{ExceptionTargetKind, Instruction, MethodKind};
use crate::ecmascript::builtins::ecmascript_function::FunctionKind;
use crate::ecmascript::execution::agent::ExceptionType;
use crate::ecmascript::execution::Agent;
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::syntax_directed_operations::scope_analysis::{
    binding_pattern_bound_names, is_simple_parameter_list, lexically_scoped_declarations,
    var_scoped_declarations, LexicallyScopedDeclaration, VarScopedDeclaration,
};
use crate::ecmascript::types::{IntoValue, Number, String, Value};
use crate::heap::indexes::BaseIndex;

/// A patchable jump site.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JumpIndex(usize);

/// An entry of the compiler's control-flow stack.
#[derive(Debug)]
enum ControlFlowEntry {
    /// A breakable iteration statement and its label set.
    Loop {
        labels: Vec<std::string::String>,
        continue_target: usize,
        breaks: Vec<JumpIndex>,
        continues: Vec<JumpIndex>,
        /// Lexical environments entered since the loop started.
        lexical_depth: u32,
        /// Whether an active iterator belongs to this loop (for-in/for-of).
        iterator: Option<IteratorKind>,
    },
    /// A breakable switch statement.
    Switch {
        labels: Vec<std::string::String>,
        breaks: Vec<JumpIndex>,
        lexical_depth: u32,
    },
    /// A labelled non-iteration statement.
    Labelled {
        label: std::string::String,
        breaks: Vec<JumpIndex>,
        lexical_depth: u32,
    },
    /// A lexical scope to exit on the way out.
    LexicalScope,
    /// A try block with a catch target to pop when jumping out.
    CatchBlock,
    /// A finally block that abrupt completions must route through.
    Finally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IteratorKind {
    /// for-in enumeration: popped without closing.
    Enumerate,
    /// for-of iteration: closed on abrupt exit.
    Iterate,
}

pub(crate) struct CompileContext<'agent> {
    pub(crate) agent: &'agent mut Agent,
    instructions: Vec<Instruction>,
    constants: Vec<Value>,
    identifiers: Vec<String>,
    function_expressions: Vec<FunctionExpression>,
    arrow_function_expressions: Vec<ArrowFunctionExpression>,
    class_initializer_bytecodes: Vec<Executable>,
    source_code: SourceCode,
    is_strict: bool,
    control_flow_stack: Vec<ControlFlowEntry>,
    generator_kind: FunctionKind,
}

impl<'agent> CompileContext<'agent> {
    pub(crate) fn new(
        agent: &'agent mut Agent,
        source_code: SourceCode,
        is_strict: bool,
    ) -> Self {
        CompileContext {
            agent,
            instructions: Vec::with_capacity(64),
            constants: Vec::new(),
            identifiers: Vec::new(),
            function_expressions: Vec::new(),
            arrow_function_expressions: Vec::new(),
            class_initializer_bytecodes: Vec::new(),
            source_code,
            is_strict,
            control_flow_stack: Vec::new(),
            generator_kind: FunctionKind::Normal,
        }
    }

    pub(crate) fn set_generator_kind(&mut self, kind: FunctionKind) {
        self.generator_kind = kind;
    }

    pub(crate) fn finish(self) -> Executable {
        let data = ExecutableHeapData {
            instructions: self.instructions.into_boxed_slice(),
            constants: self.constants.into_boxed_slice(),
            identifiers: self.identifiers.into_boxed_slice(),
            function_expressions: self.function_expressions.into_boxed_slice(),
            arrow_function_expressions: self.arrow_function_expressions.into_boxed_slice(),
            class_initializer_bytecodes: self.class_initializer_bytecodes.into_boxed_slice(),
        };
        self.agent.heap.executables.push(Some(data));
        BaseIndex::last(&self.agent.heap.executables)
    }

    // Emission helpers.

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    fn current_ip(&self) -> usize {
        self.instructions.len()
    }

    fn emit_jump(&mut self) -> JumpIndex {
        let index = JumpIndex(self.current_ip());
        self.emit(Instruction::Jump(usize::MAX));
        index
    }

    fn emit_jump_if_not(&mut self) -> JumpIndex {
        let index = JumpIndex(self.current_ip());
        self.emit(Instruction::JumpIfNot(usize::MAX));
        index
    }

    fn emit_jump_if_true(&mut self) -> JumpIndex {
        let index = JumpIndex(self.current_ip());
        self.emit(Instruction::JumpIfTrue(usize::MAX));
        index
    }

    fn emit_jump_if_nullish(&mut self) -> JumpIndex {
        let index = JumpIndex(self.current_ip());
        self.emit(Instruction::JumpIfNullish(usize::MAX));
        index
    }

    fn emit_jump_if_not_undefined(&mut self) -> JumpIndex {
        let index = JumpIndex(self.current_ip());
        self.emit(Instruction::JumpIfNotUndefined(usize::MAX));
        index
    }

    fn patch_jump(&mut self, jump: JumpIndex) {
        let target = self.current_ip();
        self.patch_jump_to(jump, target);
    }

    fn patch_jump_to(&mut self, jump: JumpIndex, target: usize) {
        match &mut self.instructions[jump.0] {
            Instruction::Jump(slot)
            | Instruction::JumpIfNot(slot)
            | Instruction::JumpIfTrue(slot)
            | Instruction::JumpIfNullish(slot)
            | Instruction::JumpIfNotUndefined(slot)
            | Instruction::IteratorStepValue(slot)
            | Instruction::PushCompletionJump(slot)
            | Instruction::JumpThroughFinally { target: slot, .. } => *slot = target,
            other => unreachable!("patching a non-jump instruction {:?}", other),
        }
    }

    fn add_constant(&mut self, value: Value) -> u16 {
        let index = self.constants.len();
        self.constants.push(value);
        u16::try_from(index).expect("too many constants")
    }

    fn emit_constant(&mut self, value: Value) {
        let index = self.add_constant(value);
        self.emit(Instruction::LoadConstant(index));
    }

    fn add_identifier(&mut self, name: &str) -> u16 {
        let name = String::from_str(self.agent, name);
        let index = self.identifiers.len();
        self.identifiers.push(name);
        u16::try_from(index).expect("too many identifiers")
    }

    fn add_string_constant(&mut self, text: &str) -> u16 {
        let string = String::from_str(self.agent, text);
        self.add_constant(string.into_value())
    }

    fn add_function_expression(&mut self, function: &ast::Function) -> u16 {
        let index = self.function_expressions.len();
        // SAFETY: The AST is kept alive by the executable's source code.
        let expression = unsafe {
            core::mem::transmute::<NonNull<ast::Function>, NonNull<ast::Function<'static>>>(
                NonNull::from(function),
            )
        };
        self.function_expressions.push(FunctionExpression {
            expression,
            source_code: self.source_code,
        });
        u16::try_from(index).expect("too many function expressions")
    }

    fn add_arrow_function_expression(
        &mut self,
        function: &ast::ArrowFunctionExpression,
    ) -> u16 {
        let index = self.arrow_function_expressions.len();
        // SAFETY: The AST is kept alive by the executable's source code.
        let expression = unsafe {
            core::mem::transmute::<
                NonNull<ast::ArrowFunctionExpression>,
                NonNull<ast::ArrowFunctionExpression<'static>>,
            >(NonNull::from(function))
        };
        self.arrow_function_expressions.push(ArrowFunctionExpression {
            expression,
            source_code: self.source_code,
        });
        u16::try_from(index).expect("too many arrow function expressions")
    }

    fn add_class_initializer(&mut self, executable: Executable) -> u16 {
        let index = self.class_initializer_bytecodes.len();
        self.class_initializer_bytecodes.push(executable);
        u16::try_from(index).expect("too many class initializers")
    }

    pub(crate) fn do_implicit_return(&mut self) {
        self.emit(Instruction::Return);
    }

    // Statement lists.

    pub(crate) fn compile_statements(&mut self, body: &[ast::Statement]) {
        for statement in body {
            self.compile_statement(statement);
        }
    }

    /// A concise arrow function body: a single expression whose value is the
    /// return value.
    pub(crate) fn compile_concise_body(&mut self, body: &ast::FunctionBody) {
        if let Some(ast::Statement::ExpressionStatement(statement)) = body.statements.first() {
            self.compile_expression_get_value(&statement.expression);
        }
        self.emit(Instruction::Return);
    }

    fn compile_statement(&mut self, statement: &ast::Statement) {
        match statement {
            ast::Statement::ExpressionStatement(statement) => {
                self.compile_expression_get_value(&statement.expression);
            }
            ast::Statement::VariableDeclaration(declaration) => {
                self.compile_variable_declaration(declaration);
            }
            ast::Statement::FunctionDeclaration(_) => {
                // Hoisted by declaration instantiation.
            }
            ast::Statement::ClassDeclaration(class) => {
                self.compile_class(class);
                if let Some(identifier) = &class.id {
                    let index = self.add_identifier(identifier.name.as_str());
                    self.emit(Instruction::ResolveBinding(index));
                    self.emit(Instruction::InitializeReferencedBinding);
                }
            }
            ast::Statement::EmptyStatement(_) => {}
            ast::Statement::DebuggerStatement(_) => {
                // No debugger attaches; evaluation continues.
            }
            ast::Statement::BlockStatement(block) => {
                self.compile_block(&block.body);
            }
            ast::Statement::IfStatement(statement) => {
                self.compile_if(statement);
            }
            ast::Statement::ReturnStatement(statement) => {
                match &statement.argument {
                    Some(argument) => self.compile_expression_get_value(argument),
                    None => self.emit_constant(Value::Undefined),
                }
                self.emit(Instruction::Return);
            }
            ast::Statement::ThrowStatement(statement) => {
                self.compile_expression_get_value(&statement.argument);
                self.emit(Instruction::Throw);
            }
            ast::Statement::TryStatement(statement) => {
                self.compile_try(statement);
            }
            ast::Statement::WhileStatement(statement) => {
                self.compile_while(statement, Vec::new());
            }
            ast::Statement::DoWhileStatement(statement) => {
                self.compile_do_while(statement, Vec::new());
            }
            ast::Statement::ForStatement(statement) => {
                self.compile_for(statement, Vec::new());
            }
            ast::Statement::ForInStatement(statement) => {
                self.compile_for_in(statement, Vec::new());
            }
            ast::Statement::ForOfStatement(statement) => {
                self.compile_for_of(statement, Vec::new());
            }
            ast::Statement::SwitchStatement(statement) => {
                self.compile_switch(statement, Vec::new());
            }
            ast::Statement::LabeledStatement(statement) => {
                self.compile_labelled(statement, Vec::new());
            }
            ast::Statement::BreakStatement(statement) => {
                self.compile_break(statement.label.as_ref().map(|label| label.name.as_str()));
            }
            ast::Statement::ContinueStatement(statement) => {
                self.compile_continue(statement.label.as_ref().map(|label| label.name.as_str()));
            }
            ast::Statement::WithStatement(_) => {
                // `with` is sloppy-mode legacy; not carried.
                let message = self.add_identifier("with statements are not supported");
                self.emit(Instruction::ThrowError(ExceptionType::SyntaxError, message));
            }
            ast::Statement::ImportDeclaration(_) => {
                // Handled during module environment initialization.
            }
            ast::Statement::ExportNamedDeclaration(export) => {
                if let Some(declaration) = &export.declaration {
                    self.compile_declaration(declaration);
                }
            }
            ast::Statement::ExportDefaultDeclaration(export) => {
                self.compile_export_default(export);
            }
            ast::Statement::ExportAllDeclaration(_) => {}
            _ => {
                // TypeScript-only statements do not reach the evaluator.
            }
        }
    }

    fn compile_declaration(&mut self, declaration: &ast::Declaration) {
        match declaration {
            ast::Declaration::VariableDeclaration(declaration) => {
                self.compile_variable_declaration(declaration);
            }
            ast::Declaration::FunctionDeclaration(_) => {}
            ast::Declaration::ClassDeclaration(class) => {
                self.compile_class(class);
                if let Some(identifier) = &class.id {
                    let index = self.add_identifier(identifier.name.as_str());
                    self.emit(Instruction::ResolveBinding(index));
                    self.emit(Instruction::InitializeReferencedBinding);
                }
            }
            _ => {}
        }
    }

    /// `export default ...`: the value initializes the `*default*` binding.
    fn compile_export_default(&mut self, export: &ast::ExportDefaultDeclaration) {
        match &export.declaration {
            ast::ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                let index = self.add_function_expression(function);
                self.emit(Instruction::InstantiateOrdinaryFunctionExpression(index));
            }
            ast::ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                self.compile_class(class);
                if let Some(identifier) = &class.id {
                    let index = self.add_identifier(identifier.name.as_str());
                    self.emit(Instruction::StoreCopy);
                    self.emit(Instruction::ResolveBinding(index));
                    self.emit(Instruction::InitializeReferencedBinding);
                    self.emit(Instruction::Load);
                }
            }
            other => {
                if let Some(expression) = other.as_expression() {
                    self.compile_expression_get_value(expression);
                } else {
                    return;
                }
            }
        }
        let index = self.add_identifier("*default*");
        self.emit(Instruction::ResolveBinding(index));
        self.emit(Instruction::InitializeReferencedBinding);
    }

    fn compile_variable_declaration(&mut self, declaration: &ast::VariableDeclaration) {
        let is_lexical = !declaration.kind.is_var();
        for declarator in &declaration.declarations {
            match (&declarator.id.kind, &declarator.init) {
                (ast::BindingPatternKind::BindingIdentifier(identifier), Some(init)) => {
                    self.compile_named_expression_get_value(init, identifier.name.as_str());
                    let index = self.add_identifier(identifier.name.as_str());
                    self.emit(Instruction::ResolveBinding(index));
                    if is_lexical {
                        self.emit(Instruction::InitializeReferencedBinding);
                    } else {
                        self.emit(Instruction::PutValue);
                    }
                }
                (ast::BindingPatternKind::BindingIdentifier(identifier), None) => {
                    if is_lexical {
                        // let without an initializer initializes to
                        // undefined; var bindings were hoisted.
                        self.emit_constant(Value::Undefined);
                        let index = self.add_identifier(identifier.name.as_str());
                        self.emit(Instruction::ResolveBinding(index));
                        self.emit(Instruction::InitializeReferencedBinding);
                    }
                }
                (_, Some(init)) => {
                    self.compile_expression_get_value(init);
                    self.compile_binding_pattern(&declarator.id, is_lexical);
                }
                (_, None) => {
                    debug_assert!(!is_lexical, "lexical patterns always have initializers");
                }
            }
        }
    }

    /// Binds the value in the result register to a binding pattern.
    fn compile_binding_pattern(&mut self, pattern: &ast::BindingPattern, initialize: bool) {
        match &pattern.kind {
            ast::BindingPatternKind::BindingIdentifier(identifier) => {
                let index = self.add_identifier(identifier.name.as_str());
                self.emit(Instruction::ResolveBinding(index));
                if initialize {
                    self.emit(Instruction::InitializeReferencedBinding);
                } else {
                    self.emit(Instruction::PutValue);
                }
            }
            ast::BindingPatternKind::AssignmentPattern(assignment) => {
                let jump = self.emit_jump_if_not_undefined();
                self.compile_expression_get_value(&assignment.right);
                self.patch_jump(jump);
                self.compile_binding_pattern(&assignment.left, initialize);
            }
            ast::BindingPatternKind::ObjectPattern(object) => {
                self.emit(Instruction::Store);
                let mut excluded: Vec<std::string::String> = Vec::new();
                for property in &object.properties {
                    self.emit(Instruction::LoadCopy);
                    match &property.key {
                        ast::PropertyKey::StaticIdentifier(identifier) => {
                            excluded.push(identifier.name.to_string());
                            let index = self.add_identifier(identifier.name.as_str());
                            self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
                        }
                        ast::PropertyKey::StringLiteral(literal) => {
                            excluded.push(literal.value.to_string());
                            let index = self.add_identifier(literal.value.as_str());
                            self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
                        }
                        other => {
                            self.emit(Instruction::Store);
                            if let Some(expression) = other.as_expression() {
                                self.compile_expression_get_value(expression);
                            } else {
                                self.emit_constant(Value::Undefined);
                            }
                            self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
                        }
                    }
                    self.emit(Instruction::GetValue);
                    self.compile_binding_pattern(&property.value, initialize);
                }
                if let Some(rest) = &object.rest {
                    for name in &excluded {
                        let index = self.add_string_constant(name);
                        self.emit(Instruction::LoadConstant(index));
                        self.emit(Instruction::Store);
                    }
                    self.emit(Instruction::LoadCopy);
                    self.emit(Instruction::CopyDataPropertiesIntoObject(
                        u16::try_from(excluded.len()).expect("too many excluded keys"),
                    ));
                    self.compile_binding_pattern(&rest.argument, initialize);
                }
                self.emit(Instruction::Load);
                self.emit(Instruction::Empty);
            }
            ast::BindingPatternKind::ArrayPattern(array) => {
                self.emit(Instruction::GetIteratorSync);
                for element in &array.elements {
                    match element {
                        Some(element) => {
                            self.emit(Instruction::IteratorStepValueOrUndefined);
                            self.compile_binding_pattern(element, initialize);
                        }
                        None => {
                            self.emit(Instruction::IteratorStepValueOrUndefined);
                        }
                    }
                }
                if let Some(rest) = &array.rest {
                    self.emit(Instruction::IteratorRestIntoArray);
                    self.compile_binding_pattern(&rest.argument, initialize);
                }
                self.emit(Instruction::IteratorClose);
            }
        }
    }

    // Blocks, conditionals and loops.

    fn compile_block(&mut self, body: &[ast::Statement]) {
        let needs_environment = self.block_needs_environment(body);
        if needs_environment {
            self.emit(Instruction::EnterDeclarativeEnvironment);
            self.control_flow_stack.push(ControlFlowEntry::LexicalScope);
            self.block_declaration_instantiation(body);
        }
        self.compile_statements(body);
        if needs_environment {
            self.control_flow_stack.pop();
            self.emit(Instruction::ExitDeclarativeEnvironment);
        }
    }

    fn block_needs_environment(&self, body: &[ast::Statement]) -> bool {
        let mut declarations = Vec::new();
        lexically_scoped_declarations(body, false, &mut declarations);
        !declarations.is_empty()
    }

    /// ### [14.2.3 BlockDeclarationInstantiation ( code, env )](https://tc39.es/ecma262/#sec-blockdeclarationinstantiation)
    fn block_declaration_instantiation(&mut self, body: &[ast::Statement]) {
        let mut declarations = Vec::new();
        lexically_scoped_declarations(body, false, &mut declarations);
        // Create the bindings first; function declarations also initialize.
        for declaration in &declarations {
            match declaration {
                LexicallyScopedDeclaration::Variable {
                    declarator,
                    is_const,
                } => {
                    let mut names = Vec::new();
                    binding_pattern_bound_names(&declarator.id, &mut names);
                    for name in names {
                        let index = self.add_identifier(name);
                        if *is_const {
                            self.emit(Instruction::CreateImmutableBinding(index));
                        } else {
                            self.emit(Instruction::CreateMutableBinding(index));
                        }
                    }
                }
                LexicallyScopedDeclaration::Function(function) => {
                    if let Some(identifier) = &function.id {
                        let index = self.add_identifier(identifier.name.as_str());
                        self.emit(Instruction::CreateMutableBinding(index));
                    }
                }
                LexicallyScopedDeclaration::Class(class) => {
                    if let Some(identifier) = &class.id {
                        let index = self.add_identifier(identifier.name.as_str());
                        self.emit(Instruction::CreateMutableBinding(index));
                    }
                }
            }
        }
        for declaration in &declarations {
            if let LexicallyScopedDeclaration::Function(function) = declaration {
                if let Some(identifier) = &function.id {
                    let function_index = self.add_function_expression(function);
                    self.emit(Instruction::InstantiateOrdinaryFunctionExpression(
                        function_index,
                    ));
                    let index = self.add_identifier(identifier.name.as_str());
                    self.emit(Instruction::ResolveBinding(index));
                    self.emit(Instruction::InitializeReferencedBinding);
                }
            }
        }
    }

    fn compile_if(&mut self, statement: &ast::IfStatement) {
        self.compile_expression_get_value(&statement.test);
        let jump_to_else = self.emit_jump_if_not();
        self.compile_statement(&statement.consequent);
        if let Some(alternate) = &statement.alternate {
            let jump_over_else = self.emit_jump();
            self.patch_jump(jump_to_else);
            self.compile_statement(alternate);
            self.patch_jump(jump_over_else);
        } else {
            self.patch_jump(jump_to_else);
        }
    }

    fn enter_loop(&mut self, labels: Vec<std::string::String>, continue_target: usize) {
        self.control_flow_stack.push(ControlFlowEntry::Loop {
            labels,
            continue_target,
            breaks: Vec::new(),
            continues: Vec::new(),
            lexical_depth: 0,
            iterator: None,
        });
    }

    fn enter_iterating_loop(
        &mut self,
        labels: Vec<std::string::String>,
        continue_target: usize,
        iterator: IteratorKind,
    ) {
        self.control_flow_stack.push(ControlFlowEntry::Loop {
            labels,
            continue_target,
            breaks: Vec::new(),
            continues: Vec::new(),
            lexical_depth: 0,
            iterator: Some(iterator),
        });
    }

    fn exit_loop(&mut self) {
        let Some(ControlFlowEntry::Loop {
            continue_target,
            breaks,
            continues,
            ..
        }) = self.control_flow_stack.pop()
        else {
            unreachable!("unbalanced control flow stack");
        };
        for jump in continues {
            self.patch_jump_to(jump, continue_target);
        }
        for jump in breaks {
            self.patch_jump(jump);
        }
    }

    fn compile_while(&mut self, statement: &ast::WhileStatement, labels: Vec<std::string::String>) {
        let continue_target = self.current_ip();
        self.enter_loop(labels, continue_target);
        self.compile_expression_get_value(&statement.test);
        let jump_to_end = self.emit_jump_if_not();
        self.compile_statement(&statement.body);
        let jump = self.emit_jump();
        self.patch_jump_to(jump, continue_target);
        self.patch_jump(jump_to_end);
        self.exit_loop();
    }

    fn compile_do_while(
        &mut self,
        statement: &ast::DoWhileStatement,
        labels: Vec<std::string::String>,
    ) {
        let body_start = self.current_ip();
        // The continue target is the test, patched after the body.
        self.enter_loop(labels, usize::MAX);
        self.compile_statement(&statement.body);
        let test_start = self.current_ip();
        if let Some(ControlFlowEntry::Loop {
            continue_target, ..
        }) = self.control_flow_stack.last_mut()
        {
            *continue_target = test_start;
        }
        self.compile_expression_get_value(&statement.test);
        let jump = self.emit_jump_if_true();
        self.patch_jump_to(jump, body_start);
        self.exit_loop();
    }

    fn compile_for(&mut self, statement: &ast::ForStatement, labels: Vec<std::string::String>) {
        // A lexical for-init gets its own scope for the whole loop.
        let mut entered_scope = false;
        if let Some(init) = &statement.init {
            match init {
                ast::ForStatementInit::VariableDeclaration(declaration) => {
                    if !declaration.kind.is_var() {
                        self.emit(Instruction::EnterDeclarativeEnvironment);
                        self.control_flow_stack.push(ControlFlowEntry::LexicalScope);
                        entered_scope = true;
                        for declarator in &declaration.declarations {
                            let mut names = Vec::new();
                            binding_pattern_bound_names(&declarator.id, &mut names);
                            for name in names {
                                let index = self.add_identifier(name);
                                if declaration.kind
                                    == ast::VariableDeclarationKind::Const
                                {
                                    self.emit(Instruction::CreateImmutableBinding(index));
                                } else {
                                    self.emit(Instruction::CreateMutableBinding(index));
                                }
                            }
                        }
                    }
                    self.compile_variable_declaration(declaration);
                }
                other => {
                    if let Some(expression) = other.as_expression() {
                        self.compile_expression_get_value(expression);
                    }
                }
            }
        }
        let test_start = self.current_ip();
        let jump_to_end = statement.test.as_ref().map(|test| {
            self.compile_expression_get_value(test);
            self.emit_jump_if_not()
        });
        // The continue target runs the update expression then re-tests.
        let body_jump = self.emit_jump();
        let continue_target = self.current_ip();
        if let Some(update) = &statement.update {
            self.compile_expression_get_value(update);
        }
        let retest_jump = self.emit_jump();
        self.patch_jump_to(retest_jump, test_start);
        self.patch_jump(body_jump);
        self.enter_loop(labels, continue_target);
        self.compile_statement(&statement.body);
        let loop_jump = self.emit_jump();
        self.patch_jump_to(loop_jump, continue_target);
        if let Some(jump) = jump_to_end {
            self.patch_jump(jump);
        }
        self.exit_loop();
        if entered_scope {
            self.control_flow_stack.pop();
            self.emit(Instruction::ExitDeclarativeEnvironment);
        }
    }

    fn compile_for_in(
        &mut self,
        statement: &ast::ForInStatement,
        labels: Vec<std::string::String>,
    ) {
        // ### [14.7.5.6 ForIn/OfHeadEvaluation](https://tc39.es/ecma262/#sec-runtime-semantics-forinofheadevaluation)
        self.compile_expression_get_value(&statement.right);
        // for-in over undefined or null skips the loop entirely.
        let skip_jump = self.emit_jump_if_nullish();
        self.emit(Instruction::EnumerateObjectProperties);
        let continue_target = self.current_ip();
        self.enter_iterating_loop(labels, continue_target, IteratorKind::Enumerate);
        let step = JumpIndex(self.current_ip());
        self.emit(Instruction::IteratorStepValue(usize::MAX));
        self.compile_for_in_of_binding(&statement.left);
        self.compile_statement(&statement.body);
        self.exit_for_in_of_binding(&statement.left);
        let jump = self.emit_jump();
        self.patch_jump_to(jump, continue_target);
        self.patch_jump(step);
        self.exit_loop();
        self.patch_jump(skip_jump);
        self.emit(Instruction::Empty);
    }

    fn compile_for_of(
        &mut self,
        statement: &ast::ForOfStatement,
        labels: Vec<std::string::String>,
    ) {
        self.compile_expression_get_value(&statement.right);
        if statement.r#await {
            self.emit(Instruction::GetIteratorAsync);
        } else {
            self.emit(Instruction::GetIteratorSync);
        }
        let continue_target = self.current_ip();
        self.enter_iterating_loop(labels, continue_target, IteratorKind::Iterate);
        let step = JumpIndex(self.current_ip());
        self.emit(Instruction::IteratorStepValue(usize::MAX));
        if statement.r#await {
            self.emit(Instruction::Await);
        }
        self.compile_for_in_of_binding(&statement.left);
        self.compile_statement(&statement.body);
        self.exit_for_in_of_binding(&statement.left);
        let jump = self.emit_jump();
        self.patch_jump_to(jump, continue_target);
        self.patch_jump(step);
        self.exit_loop();
        self.emit(Instruction::Empty);
    }

    /// Binds the current iteration value (in the result register) to the
    /// loop's left-hand side.
    fn compile_for_in_of_binding(&mut self, left: &ast::ForStatementLeft) {
        match left {
            ast::ForStatementLeft::VariableDeclaration(declaration) => {
                let declarator = declaration
                    .declarations
                    .first()
                    .expect("for-in/of declarations have one declarator");
                if declaration.kind.is_var() {
                    self.compile_binding_pattern(&declarator.id, false);
                } else {
                    // A fresh environment per iteration for the lexical
                    // binding.
                    self.emit(Instruction::Store);
                    self.emit(Instruction::EnterDeclarativeEnvironment);
                    self.control_flow_stack.push(ControlFlowEntry::LexicalScope);
                    let mut names = Vec::new();
                    binding_pattern_bound_names(&declarator.id, &mut names);
                    for name in names {
                        let index = self.add_identifier(name);
                        if declaration.kind == ast::VariableDeclarationKind::Const {
                            self.emit(Instruction::CreateImmutableBinding(index));
                        } else {
                            self.emit(Instruction::CreateMutableBinding(index));
                        }
                    }
                    self.emit(Instruction::Load);
                    self.compile_binding_pattern(&declarator.id, true);
                }
            }
            other => {
                self.compile_assignment_target(other);
            }
        }
    }

    fn exit_for_in_of_binding(&mut self, left: &ast::ForStatementLeft) {
        if let ast::ForStatementLeft::VariableDeclaration(declaration) = left {
            if !declaration.kind.is_var() {
                self.control_flow_stack.pop();
                self.emit(Instruction::ExitDeclarativeEnvironment);
            }
        }
    }

    fn compile_assignment_target(&mut self, target: &ast::ForStatementLeft) {
        match target {
            ast::ForStatementLeft::AssignmentTargetIdentifier(identifier) => {
                self.emit(Instruction::Store);
                let index = self.add_identifier(identifier.name.as_str());
                self.emit(Instruction::ResolveBinding(index));
                self.emit(Instruction::Load);
                self.emit(Instruction::PutValue);
            }
            ast::ForStatementLeft::StaticMemberExpression(member) => {
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.object);
                let index = self.add_identifier(member.property.name.as_str());
                self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
                self.emit(Instruction::Load);
                self.emit(Instruction::PutValue);
            }
            ast::ForStatementLeft::ComputedMemberExpression(member) => {
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.object);
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.expression);
                self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
                self.emit(Instruction::Load);
                self.emit(Instruction::PutValue);
            }
            _ => {
                let message =
                    self.add_identifier("destructuring for-in/of targets are not supported");
                self.emit(Instruction::ThrowError(ExceptionType::SyntaxError, message));
            }
        }
    }

    fn compile_switch(
        &mut self,
        statement: &ast::SwitchStatement,
        labels: Vec<std::string::String>,
    ) {
        // ### [14.12.4 Runtime semantics of switch](https://tc39.es/ecma262/#sec-switch-statement-runtime-semantics-evaluation)
        self.compile_expression_get_value(&statement.discriminant);
        self.emit(Instruction::Store);
        self.control_flow_stack.push(ControlFlowEntry::Switch {
            labels,
            breaks: Vec::new(),
            lexical_depth: 0,
        });
        // Case selectors evaluate in source order with strict equality.
        let mut case_jumps = Vec::with_capacity(statement.cases.len());
        let mut default_index = None;
        for (index, case) in statement.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                self.emit(Instruction::LoadCopy);
                self.emit(Instruction::Store);
                self.compile_expression_get_value(test);
                self.emit(Instruction::IsStrictlyEqual);
                case_jumps.push((index, self.emit_jump_if_true()));
            } else {
                default_index = Some(index);
            }
        }
        // No case matched: pop the discriminant and enter the default
        // clause, if any.
        self.emit(Instruction::Load);
        self.emit(Instruction::Empty);
        let default_jump = self.emit_jump();
        // Case bodies in source order; fallthrough runs into the next body.
        let mut body_starts = Vec::with_capacity(statement.cases.len());
        for case in statement.cases.iter() {
            // Each selected case pops the discriminant on entry through its
            // stub.
            let stub = self.current_ip();
            body_starts.push(stub);
            self.compile_statements(&case.consequent);
        }
        // Jump over the selector stubs once the last body completes.
        let jump_over_stubs = self.emit_jump();
        // Wire the selector jumps through discriminant-popping stubs placed
        // after the bodies.
        for (case_index, jump) in case_jumps {
            let stub = self.current_ip();
            self.emit(Instruction::Load);
            self.emit(Instruction::Empty);
            let to_body = self.emit_jump();
            self.patch_jump_to(to_body, body_starts[case_index]);
            self.patch_jump_to(jump, stub);
        }
        let end = self.current_ip();
        self.patch_jump_to(jump_over_stubs, end);
        match default_index {
            Some(index) => self.patch_jump_to(default_jump, body_starts[index]),
            None => self.patch_jump_to(default_jump, end),
        }
        let Some(ControlFlowEntry::Switch { breaks, .. }) = self.control_flow_stack.pop()
        else {
            unreachable!("unbalanced control flow stack");
        };
        for jump in breaks {
            self.patch_jump_to(jump, end);
        }
    }

    fn compile_labelled(
        &mut self,
        statement: &ast::LabeledStatement,
        mut labels: Vec<std::string::String>,
    ) {
        // LabelledStatement appends its identifier to the label set.
        labels.push(statement.label.name.to_string());
        match &statement.body {
            ast::Statement::WhileStatement(body) => self.compile_while(body, labels),
            ast::Statement::DoWhileStatement(body) => self.compile_do_while(body, labels),
            ast::Statement::ForStatement(body) => self.compile_for(body, labels),
            ast::Statement::ForInStatement(body) => self.compile_for_in(body, labels),
            ast::Statement::ForOfStatement(body) => self.compile_for_of(body, labels),
            ast::Statement::SwitchStatement(body) => self.compile_switch(body, labels),
            ast::Statement::LabeledStatement(body) => self.compile_labelled(body, labels),
            body => {
                let label = labels.pop().expect("label was just pushed");
                self.control_flow_stack.push(ControlFlowEntry::Labelled {
                    label,
                    breaks: Vec::new(),
                    lexical_depth: 0,
                });
                self.compile_statement(body);
                let Some(ControlFlowEntry::Labelled { breaks, .. }) =
                    self.control_flow_stack.pop()
                else {
                    unreachable!("unbalanced control flow stack");
                };
                for jump in breaks {
                    self.patch_jump(jump);
                }
            }
        }
    }

    /// ### [14.9 The `break` Statement](https://tc39.es/ecma262/#sec-break-statement)
    ///
    /// The break is handled by the innermost enclosing breakable statement
    /// whose label set contains the target, or the innermost
    /// iteration/switch when no target is given.
    fn compile_break(&mut self, label: Option<&str>) {
        let mut finally_count: u16 = 0;
        let mut catch_pops: u16 = 0;
        let mut exits: u32 = 0;
        let mut iterator_pops: Vec<IteratorKind> = Vec::new();
        let mut target_entry = None;
        for (index, entry) in self.control_flow_stack.iter().enumerate().rev() {
            match entry {
                ControlFlowEntry::LexicalScope => exits += 1,
                ControlFlowEntry::CatchBlock => {
                    // Catch targets beyond the innermost finally unwind at
                    // runtime instead.
                    if finally_count == 0 {
                        catch_pops += 1;
                    }
                }
                ControlFlowEntry::Finally => finally_count += 1,
                ControlFlowEntry::Loop {
                    labels,
                    lexical_depth,
                    iterator,
                    ..
                } => {
                    let matches = match label {
                        None => true,
                        Some(label) => labels.iter().any(|candidate| candidate == label),
                    };
                    if matches {
                        exits += lexical_depth;
                        if let Some(iterator) = iterator {
                            iterator_pops.push(*iterator);
                        }
                        target_entry = Some(index);
                        break;
                    }
                    exits += lexical_depth;
                    if let Some(iterator) = iterator {
                        iterator_pops.push(*iterator);
                    }
                }
                ControlFlowEntry::Switch {
                    labels,
                    lexical_depth,
                    ..
                } => {
                    let matches = match label {
                        None => true,
                        Some(label) => labels.iter().any(|candidate| candidate == label),
                    };
                    exits += lexical_depth;
                    if matches {
                        target_entry = Some(index);
                        break;
                    }
                }
                ControlFlowEntry::Labelled {
                    label: candidate,
                    lexical_depth,
                    ..
                } => {
                    exits += lexical_depth;
                    if let Some(label) = label {
                        if candidate == label {
                            target_entry = Some(index);
                            break;
                        }
                    }
                }
            }
        }
        let Some(target_entry) = target_entry else {
            unreachable!("break without a breakable target");
        };
        for _ in 0..exits {
            self.emit(Instruction::ExitDeclarativeEnvironment);
        }
        for _ in 0..catch_pops {
            self.emit(Instruction::PopExceptionJumpTarget);
        }
        for iterator in iterator_pops {
            match iterator {
                IteratorKind::Enumerate => self.emit(Instruction::PopIterator),
                IteratorKind::Iterate => self.emit(Instruction::IteratorClose),
            }
        }
        self.emit(Instruction::Empty);
        let jump = if finally_count > 0 {
            let index = JumpIndex(self.current_ip());
            self.emit(Instruction::JumpThroughFinally {
                target: usize::MAX,
                finally_count,
            });
            index
        } else {
            self.emit_jump()
        };
        match &mut self.control_flow_stack[target_entry] {
            ControlFlowEntry::Loop { breaks, .. }
            | ControlFlowEntry::Switch { breaks, .. }
            | ControlFlowEntry::Labelled { breaks, .. } => breaks.push(jump),
            _ => unreachable!(),
        }
    }

    /// ### [14.8 The `continue` Statement](https://tc39.es/ecma262/#sec-continue-statement)
    fn compile_continue(&mut self, label: Option<&str>) {
        let mut finally_count: u16 = 0;
        let mut catch_pops: u16 = 0;
        let mut exits: u32 = 0;
        let mut target_entry = None;
        for (index, entry) in self.control_flow_stack.iter().enumerate().rev() {
            match entry {
                ControlFlowEntry::LexicalScope => exits += 1,
                ControlFlowEntry::CatchBlock => {
                    if finally_count == 0 {
                        catch_pops += 1;
                    }
                }
                ControlFlowEntry::Finally => finally_count += 1,
                ControlFlowEntry::Loop {
                    labels,
                    lexical_depth,
                    ..
                } => {
                    exits += lexical_depth;
                    let matches = match label {
                        None => true,
                        Some(label) => labels.iter().any(|candidate| candidate == label),
                    };
                    if matches {
                        target_entry = Some(index);
                        break;
                    }
                }
                ControlFlowEntry::Switch { lexical_depth, .. }
                | ControlFlowEntry::Labelled { lexical_depth, .. } => {
                    exits += lexical_depth;
                }
            }
        }
        let Some(target_entry) = target_entry else {
            unreachable!("continue without an iteration target");
        };
        for _ in 0..exits {
            self.emit(Instruction::ExitDeclarativeEnvironment);
        }
        for _ in 0..catch_pops {
            self.emit(Instruction::PopExceptionJumpTarget);
        }
        self.emit(Instruction::Empty);
        let jump = if finally_count > 0 {
            let index = JumpIndex(self.current_ip());
            self.emit(Instruction::JumpThroughFinally {
                target: usize::MAX,
                finally_count,
            });
            index
        } else {
            self.emit_jump()
        };
        match &mut self.control_flow_stack[target_entry] {
            ControlFlowEntry::Loop { continues, .. } => continues.push(jump),
            _ => unreachable!(),
        }
    }

    /// ### [14.15 The `try` Statement](https://tc39.es/ecma262/#sec-try-statement)
    fn compile_try(&mut self, statement: &ast::TryStatement) {
        let has_finally = statement.finalizer.is_some();
        let finally_push = if has_finally {
            self.control_flow_stack.push(ControlFlowEntry::Finally);
            let index = JumpIndex(self.current_ip());
            self.emit(Instruction::PushExceptionJumpTarget(
                ExceptionTargetKind::Finally,
                usize::MAX,
            ));
            Some(index)
        } else {
            None
        };
        let catch_push = if statement.handler.is_some() {
            let index = JumpIndex(self.current_ip());
            self.emit(Instruction::PushExceptionJumpTarget(
                ExceptionTargetKind::Catch,
                usize::MAX,
            ));
            self.control_flow_stack.push(ControlFlowEntry::CatchBlock);
            Some(index)
        } else {
            None
        };
        self.compile_statements(&statement.block.body);
        let after_catch = if let Some(catch_push) = catch_push {
            self.control_flow_stack.pop();
            self.emit(Instruction::PopExceptionJumpTarget);
            let jump_over_catch = self.emit_jump();
            // The catch clause entry: the thrown value is the result.
            let catch_start = self.current_ip();
            if let Instruction::PushExceptionJumpTarget(_, slot) =
                &mut self.instructions[catch_push.0]
            {
                *slot = catch_start;
            }
            let handler = statement.handler.as_ref().expect("handler exists");
            self.compile_catch_clause(handler);
            Some(jump_over_catch)
        } else {
            None
        };
        if let Some(jump) = after_catch {
            self.patch_jump(jump);
        }
        if let Some(finally_push) = finally_push {
            self.control_flow_stack.pop();
            self.emit(Instruction::PopExceptionJumpTarget);
            self.emit(Instruction::PushCompletionNormal);
            let finally_start = self.current_ip();
            if let Instruction::PushExceptionJumpTarget(_, slot) =
                &mut self.instructions[finally_push.0]
            {
                *slot = finally_start;
            }
            let finalizer = statement.finalizer.as_ref().expect("finalizer exists");
            self.compile_block(&finalizer.body);
            self.emit(Instruction::EndFinally);
        }
    }

    fn compile_catch_clause(&mut self, handler: &ast::CatchClause) {
        match &handler.param {
            Some(parameter) => match &parameter.pattern.kind {
                ast::BindingPatternKind::BindingIdentifier(identifier) => {
                    let index = self.add_identifier(identifier.name.as_str());
                    self.emit(Instruction::CreateCatchBinding(index));
                }
                _ => {
                    // Destructuring catch parameters bind in a fresh scope.
                    self.emit(Instruction::Store);
                    self.emit(Instruction::EnterDeclarativeEnvironment);
                    let mut names = Vec::new();
                    binding_pattern_bound_names(&parameter.pattern, &mut names);
                    for name in names {
                        let index = self.add_identifier(name);
                        self.emit(Instruction::CreateMutableBinding(index));
                    }
                    self.emit(Instruction::Load);
                    self.compile_binding_pattern(&parameter.pattern, true);
                }
            },
            None => {
                self.emit(Instruction::EnterDeclarativeEnvironment);
            }
        }
        self.control_flow_stack.push(ControlFlowEntry::LexicalScope);
        self.block_declaration_instantiation(&handler.body.body);
        self.compile_statements(&handler.body.body);
        self.control_flow_stack.pop();
        self.emit(Instruction::ExitDeclarativeEnvironment);
    }

    // Expressions.

    fn is_reference(expression: &ast::Expression) -> bool {
        matches!(
            expression,
            ast::Expression::Identifier(_)
                | ast::Expression::ComputedMemberExpression(_)
                | ast::Expression::StaticMemberExpression(_)
                | ast::Expression::PrivateFieldExpression(_)
        )
    }

    fn compile_expression_get_value(&mut self, expression: &ast::Expression) {
        self.compile_expression(expression);
        if Self::is_reference(expression) {
            self.emit(Instruction::GetValue);
        }
    }

    /// NamedEvaluation: anonymous functions take the binding's name.
    fn compile_named_expression_get_value(
        &mut self,
        expression: &ast::Expression,
        _name: &str,
    ) {
        // Function name inference is carried by SetFunctionName at
        // instantiation for named functions only.
        self.compile_expression_get_value(expression);
    }

    fn compile_expression(&mut self, expression: &ast::Expression) {
        match expression {
            ast::Expression::BooleanLiteral(literal) => {
                self.emit_constant(literal.value.into());
            }
            ast::Expression::NullLiteral(_) => {
                self.emit_constant(Value::Null);
            }
            ast::Expression::NumericLiteral(literal) => {
                self.emit_constant(Number::from(literal.value).into_value());
            }
            ast::Expression::StringLiteral(literal) => {
                let index = self.add_string_constant(literal.value.as_str());
                self.emit(Instruction::LoadConstant(index));
            }
            ast::Expression::BigIntLiteral(literal) => {
                let raw = literal.raw.trim_end_matches('n');
                let value = crate::ecmascript::types::BigInt::parse_literal(self.agent, raw)
                    .expect("parser validated the BigInt literal");
                self.emit_constant(value.into_value());
            }
            ast::Expression::RegExpLiteral(_) => {
                // The RegExp engine internals are external collaborators;
                // literals surface a clean error instead of half-support.
                let message = self.add_identifier("regular expressions are not supported");
                self.emit(Instruction::ThrowError(ExceptionType::TypeError, message));
            }
            ast::Expression::TemplateLiteral(literal) => {
                self.compile_template_literal(literal);
            }
            ast::Expression::Identifier(identifier) => {
                let index = self.add_identifier(identifier.name.as_str());
                self.emit(Instruction::ResolveBinding(index));
            }
            ast::Expression::ThisExpression(_) => {
                self.emit(Instruction::ResolveThisBinding);
            }
            ast::Expression::MetaProperty(meta) => {
                if meta.meta.name == "new" {
                    self.emit(Instruction::GetNewTarget);
                } else {
                    self.emit(Instruction::ImportMeta);
                }
            }
            ast::Expression::ArrayExpression(array) => {
                self.compile_array_literal(array);
            }
            ast::Expression::ObjectExpression(object) => {
                self.compile_object_literal(object);
            }
            ast::Expression::FunctionExpression(function) => {
                let index = self.add_function_expression(function);
                self.emit(Instruction::InstantiateOrdinaryFunctionExpression(index));
            }
            ast::Expression::ArrowFunctionExpression(function) => {
                let index = self.add_arrow_function_expression(function);
                self.emit(Instruction::InstantiateArrowFunctionExpression(index));
            }
            ast::Expression::ClassExpression(class) => {
                self.compile_class(class);
            }
            ast::Expression::ParenthesizedExpression(parenthesized) => {
                self.compile_expression(&parenthesized.expression);
                if Self::is_reference(&parenthesized.expression) {
                    self.emit(Instruction::GetValue);
                }
            }
            ast::Expression::SequenceExpression(sequence) => {
                for expression in &sequence.expressions {
                    self.compile_expression_get_value(expression);
                }
            }
            ast::Expression::ConditionalExpression(conditional) => {
                self.compile_expression_get_value(&conditional.test);
                let jump_to_alternate = self.emit_jump_if_not();
                self.compile_expression_get_value(&conditional.consequent);
                let jump_over_alternate = self.emit_jump();
                self.patch_jump(jump_to_alternate);
                self.compile_expression_get_value(&conditional.alternate);
                self.patch_jump(jump_over_alternate);
            }
            ast::Expression::LogicalExpression(logical) => {
                self.compile_logical(logical);
            }
            ast::Expression::BinaryExpression(binary) => {
                self.compile_binary(binary);
            }
            ast::Expression::UnaryExpression(unary) => {
                self.compile_unary(unary);
            }
            ast::Expression::UpdateExpression(update) => {
                self.compile_update(update);
            }
            ast::Expression::AssignmentExpression(assignment) => {
                self.compile_assignment(assignment);
            }
            ast::Expression::StaticMemberExpression(member) => {
                self.compile_expression_get_value(&member.object);
                let index = self.add_identifier(member.property.name.as_str());
                self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
            }
            ast::Expression::ComputedMemberExpression(member) => {
                self.compile_expression_get_value(&member.object);
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.expression);
                self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
            }
            ast::Expression::PrivateFieldExpression(member) => {
                self.compile_expression_get_value(&member.object);
                let index = self.add_identifier(member.field.name.as_str());
                self.emit(Instruction::MakePrivateReference(index));
            }
            ast::Expression::PrivateInExpression(expression) => {
                self.compile_expression_get_value(&expression.right);
                let index = self.add_identifier(expression.left.name.as_str());
                self.emit(Instruction::HasPrivateElement(index));
            }
            ast::Expression::CallExpression(call) => {
                self.compile_call(call);
            }
            ast::Expression::NewExpression(new) => {
                self.compile_new(new);
            }
            ast::Expression::ChainExpression(chain) => {
                self.compile_chain(chain);
            }
            ast::Expression::AwaitExpression(expression) => {
                self.compile_expression_get_value(&expression.argument);
                self.emit(Instruction::Await);
            }
            ast::Expression::YieldExpression(expression) => {
                self.compile_yield(expression);
            }
            ast::Expression::ImportExpression(_) => {
                let message = self.add_identifier("dynamic import is not supported");
                self.emit(Instruction::ThrowError(ExceptionType::TypeError, message));
            }
            ast::Expression::TaggedTemplateExpression(_) => {
                let message = self.add_identifier("tagged templates are not supported");
                self.emit(Instruction::ThrowError(ExceptionType::TypeError, message));
            }
            ast::Expression::Super(_) => {
                // `super` only appears inside member expressions and calls,
                // both handled by their parents.
                unreachable!("super outside a member expression or call");
            }
            _ => {
                let message = self.add_identifier("unsupported expression form");
                self.emit(Instruction::ThrowError(ExceptionType::SyntaxError, message));
            }
        }
    }

    fn compile_template_literal(&mut self, literal: &ast::TemplateLiteral) {
        // Parts interleave as quasi₀ expr₀ quasi₁ … quasiₙ; all but the last
        // are pushed, the last stays in the result register.
        let total = literal.quasis.len() + literal.expressions.len();
        let mut emitted = 0usize;
        for (index, quasi) in literal.quasis.iter().enumerate() {
            let cooked = quasi
                .value
                .cooked
                .as_ref()
                .expect("template literal quasis are always cooked");
            let constant = self.add_string_constant(cooked.as_str());
            self.emit(Instruction::LoadConstant(constant));
            emitted += 1;
            if emitted < total {
                self.emit(Instruction::Store);
            }
            if let Some(expression) = literal.expressions.get(index) {
                self.compile_expression_get_value(expression);
                self.emit(Instruction::ToString);
                emitted += 1;
                if emitted < total {
                    self.emit(Instruction::Store);
                }
            }
        }
        if total > 1 {
            self.emit(Instruction::StringConcat((total - 1) as u16));
        }
    }

    fn compile_array_literal(&mut self, array: &ast::ArrayExpression) {
        self.emit(Instruction::ArrayCreate(array.elements.len() as u32));
        for element in &array.elements {
            match element {
                ast::ArrayExpressionElement::Elision(_) => {
                    self.emit(Instruction::ArrayElision);
                }
                ast::ArrayExpressionElement::SpreadElement(spread) => {
                    self.compile_expression_get_value(&spread.argument);
                    self.emit(Instruction::GetIteratorSync);
                    let step = JumpIndex(self.current_ip());
                    self.emit(Instruction::IteratorStepValue(usize::MAX));
                    self.emit(Instruction::ArrayPush);
                    let jump = self.emit_jump();
                    self.patch_jump_to(jump, step.0);
                    self.patch_jump(step);
                }
                other => {
                    if let Some(expression) = other.as_expression() {
                        self.compile_expression_get_value(expression);
                        self.emit(Instruction::ArrayPush);
                    }
                }
            }
        }
        self.emit(Instruction::Load);
    }

    fn compile_object_literal(&mut self, object: &ast::ObjectExpression) {
        self.emit(Instruction::ObjectCreate);
        for property in &object.properties {
            match property {
                ast::ObjectPropertyKind::SpreadProperty(spread) => {
                    self.compile_expression_get_value(&spread.argument);
                    self.emit(Instruction::CopyDataProperties);
                }
                ast::ObjectPropertyKind::ObjectProperty(property) => {
                    match property.kind {
                        ast::PropertyKind::Init => {
                            if !property.computed
                                && !property.method
                                && !property.shorthand
                                && is_proto_key(&property.key)
                            {
                                self.compile_expression_get_value(&property.value);
                                self.emit(Instruction::ObjectSetPrototype);
                                continue;
                            }
                            if property.method {
                                let ast::Expression::FunctionExpression(function) =
                                    &property.value
                                else {
                                    unreachable!("object methods are function expressions");
                                };
                                let function_index = self.add_function_expression(function);
                                self.compile_property_key(&property.key);
                                self.emit(Instruction::ObjectDefineMethod(
                                    function_index,
                                    MethodKind::Method,
                                ));
                            } else {
                                self.compile_property_key(&property.key);
                                self.emit(Instruction::Store);
                                self.compile_expression_get_value(&property.value);
                                self.emit(Instruction::ObjectDefineProperty);
                            }
                        }
                        ast::PropertyKind::Get | ast::PropertyKind::Set => {
                            let ast::Expression::FunctionExpression(function) = &property.value
                            else {
                                unreachable!("accessors are function expressions");
                            };
                            let function_index = self.add_function_expression(function);
                            self.compile_property_key(&property.key);
                            let kind = if property.kind == ast::PropertyKind::Get {
                                MethodKind::Get
                            } else {
                                MethodKind::Set
                            };
                            self.emit(Instruction::ObjectDefineMethod(function_index, kind));
                        }
                    }
                }
            }
        }
        self.emit(Instruction::Load);
    }

    /// Evaluates a property key into the result register.
    fn compile_property_key(&mut self, key: &ast::PropertyKey) {
        match key {
            ast::PropertyKey::StaticIdentifier(identifier) => {
                let index = self.add_string_constant(identifier.name.as_str());
                self.emit(Instruction::LoadConstant(index));
            }
            ast::PropertyKey::PrivateIdentifier(_) => {
                unreachable!("private keys are handled by the class compiler");
            }
            other => {
                if let Some(expression) = other.as_expression() {
                    self.compile_expression_get_value(expression);
                } else {
                    self.emit_constant(Value::Undefined);
                }
            }
        }
    }

    fn compile_logical(&mut self, logical: &ast::LogicalExpression) {
        self.compile_expression_get_value(&logical.left);
        self.emit(Instruction::StoreCopy);
        match logical.operator {
            LogicalOperator::And => {
                let short_circuit = self.emit_jump_if_not();
                self.emit(Instruction::Load);
                self.compile_expression_get_value(&logical.right);
                let end = self.emit_jump();
                self.patch_jump(short_circuit);
                self.emit(Instruction::Load);
                self.patch_jump(end);
            }
            LogicalOperator::Or => {
                let short_circuit = self.emit_jump_if_true();
                self.emit(Instruction::Load);
                self.compile_expression_get_value(&logical.right);
                let end = self.emit_jump();
                self.patch_jump(short_circuit);
                self.emit(Instruction::Load);
                self.patch_jump(end);
            }
            LogicalOperator::Coalesce => {
                let nullish = self.emit_jump_if_nullish();
                self.emit(Instruction::Load);
                let end = self.emit_jump();
                self.patch_jump(nullish);
                self.emit(Instruction::Load);
                self.compile_expression_get_value(&logical.right);
                self.patch_jump(end);
            }
        }
    }

    fn compile_binary(&mut self, binary: &ast::BinaryExpression) {
        self.compile_expression_get_value(&binary.left);
        self.emit(Instruction::Store);
        self.compile_expression_get_value(&binary.right);
        match binary.operator {
            BinaryOperator::StrictEquality => self.emit(Instruction::IsStrictlyEqual),
            BinaryOperator::StrictInequality => {
                self.emit(Instruction::IsStrictlyEqual);
                self.emit(Instruction::LogicalNot);
            }
            BinaryOperator::Equality => self.emit(Instruction::IsLooselyEqual),
            BinaryOperator::Inequality => {
                self.emit(Instruction::IsLooselyEqual);
                self.emit(Instruction::LogicalNot);
            }
            BinaryOperator::LessThan => self.emit(Instruction::LessThan),
            BinaryOperator::LessEqualThan => self.emit(Instruction::LessThanEquals),
            BinaryOperator::GreaterThan => self.emit(Instruction::GreaterThan),
            BinaryOperator::GreaterEqualThan => self.emit(Instruction::GreaterThanEquals),
            BinaryOperator::Instanceof => self.emit(Instruction::InstanceofOperator),
            BinaryOperator::In => self.emit(Instruction::HasProperty),
            operator => self.emit(Instruction::ApplyStringOrNumericBinaryOperator(operator)),
        }
    }

    fn compile_unary(&mut self, unary: &ast::UnaryExpression) {
        match unary.operator {
            UnaryOperator::LogicalNot => {
                self.compile_expression_get_value(&unary.argument);
                self.emit(Instruction::LogicalNot);
            }
            UnaryOperator::UnaryNegation => {
                self.compile_expression_get_value(&unary.argument);
                self.emit(Instruction::ToNumeric);
                self.emit(Instruction::UnaryMinus);
            }
            UnaryOperator::UnaryPlus => {
                self.compile_expression_get_value(&unary.argument);
                self.emit(Instruction::ToNumber);
            }
            UnaryOperator::BitwiseNot => {
                self.compile_expression_get_value(&unary.argument);
                self.emit(Instruction::ToNumeric);
                self.emit(Instruction::BitwiseNot);
            }
            UnaryOperator::Void => {
                self.compile_expression_get_value(&unary.argument);
                self.emit_constant(Value::Undefined);
            }
            UnaryOperator::Typeof => {
                // typeof consumes a reference when its operand produces one,
                // so that unresolvable identifiers report "undefined".
                self.compile_expression(&unary.argument);
                self.emit(Instruction::Typeof);
            }
            UnaryOperator::Delete => {
                self.compile_expression(&unary.argument);
                self.emit(Instruction::Delete);
            }
        }
    }

    fn compile_update(&mut self, update: &ast::UpdateExpression) {
        self.compile_simple_assignment_target(&update.argument);
        self.emit(Instruction::GetValueKeepReference);
        self.emit(Instruction::PushReference);
        self.emit(Instruction::ToNumeric);
        if !update.prefix {
            // The expression value is the old value.
            self.emit(Instruction::StoreCopy);
        }
        match update.operator {
            UpdateOperator::Increment => self.emit(Instruction::Increment),
            UpdateOperator::Decrement => self.emit(Instruction::Decrement),
        }
        if update.prefix {
            // The expression value is the new value.
            self.emit(Instruction::StoreCopy);
        }
        self.emit(Instruction::PopReference);
        self.emit(Instruction::PutValue);
        self.emit(Instruction::Load);
    }

    fn compile_simple_assignment_target(&mut self, target: &ast::SimpleAssignmentTarget) {
        match target {
            ast::SimpleAssignmentTarget::AssignmentTargetIdentifier(identifier) => {
                let index = self.add_identifier(identifier.name.as_str());
                self.emit(Instruction::ResolveBinding(index));
            }
            ast::SimpleAssignmentTarget::StaticMemberExpression(member) => {
                self.compile_expression_get_value(&member.object);
                let index = self.add_identifier(member.property.name.as_str());
                self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
            }
            ast::SimpleAssignmentTarget::ComputedMemberExpression(member) => {
                self.compile_expression_get_value(&member.object);
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.expression);
                self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
            }
            ast::SimpleAssignmentTarget::PrivateFieldExpression(member) => {
                self.compile_expression_get_value(&member.object);
                let index = self.add_identifier(member.field.name.as_str());
                self.emit(Instruction::MakePrivateReference(index));
            }
            _ => {
                let message = self.add_identifier("unsupported assignment target");
                self.emit(Instruction::ThrowError(ExceptionType::SyntaxError, message));
            }
        }
    }

    fn compile_assignment(&mut self, assignment: &ast::AssignmentExpression) {
        // Evaluate the target into the reference slot.
        match &assignment.left {
            ast::AssignmentTarget::AssignmentTargetIdentifier(identifier) => {
                let index = self.add_identifier(identifier.name.as_str());
                self.emit(Instruction::ResolveBinding(index));
            }
            ast::AssignmentTarget::StaticMemberExpression(member) => {
                self.compile_expression_get_value(&member.object);
                let index = self.add_identifier(member.property.name.as_str());
                self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
            }
            ast::AssignmentTarget::ComputedMemberExpression(member) => {
                self.compile_expression_get_value(&member.object);
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.expression);
                self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
            }
            ast::AssignmentTarget::PrivateFieldExpression(member) => {
                self.compile_expression_get_value(&member.object);
                let index = self.add_identifier(member.field.name.as_str());
                self.emit(Instruction::MakePrivateReference(index));
            }
            _ => {
                let message =
                    self.add_identifier("destructuring assignment targets are not supported");
                self.emit(Instruction::ThrowError(ExceptionType::SyntaxError, message));
                return;
            }
        }
        match assignment.operator {
            AssignmentOperator::Assign => {
                self.emit(Instruction::PushReference);
                self.compile_expression_get_value(&assignment.right);
                self.emit(Instruction::StoreCopy);
                self.emit(Instruction::PopReference);
                self.emit(Instruction::PutValue);
                self.emit(Instruction::Load);
            }
            AssignmentOperator::LogicalAnd
            | AssignmentOperator::LogicalOr
            | AssignmentOperator::LogicalNullish => {
                // Read the current value; assign only when the operator's
                // condition selects the right-hand side.
                self.emit(Instruction::GetValueKeepReference);
                self.emit(Instruction::PushReference);
                self.emit(Instruction::StoreCopy);
                let assign = match assignment.operator {
                    AssignmentOperator::LogicalAnd => self.emit_jump_if_true(),
                    AssignmentOperator::LogicalOr => self.emit_jump_if_not(),
                    AssignmentOperator::LogicalNullish => self.emit_jump_if_nullish(),
                    _ => unreachable!(),
                };
                // Keep path: the expression value is the current value.
                self.emit(Instruction::Load);
                self.emit(Instruction::DiscardReference);
                let end = self.emit_jump();
                // Assignment path.
                self.patch_jump(assign);
                self.emit(Instruction::Load);
                self.compile_expression_get_value(&assignment.right);
                self.emit(Instruction::StoreCopy);
                self.emit(Instruction::PopReference);
                self.emit(Instruction::PutValue);
                self.emit(Instruction::Load);
                self.patch_jump(end);
            }
            operator => {
                // Compound assignment: read, apply, write.
                self.emit(Instruction::GetValueKeepReference);
                self.emit(Instruction::PushReference);
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&assignment.right);
                let binary_operator = to_binary_operator(operator);
                self.emit(Instruction::ApplyStringOrNumericBinaryOperator(
                    binary_operator,
                ));
                self.emit(Instruction::StoreCopy);
                self.emit(Instruction::PopReference);
                self.emit(Instruction::PutValue);
                self.emit(Instruction::Load);
            }
        }
    }

    fn compile_call(&mut self, call: &ast::CallExpression) {
        // `super(...)` routes through the SuperCall semantics.
        if matches!(call.callee, ast::Expression::Super(_)) {
            if call.arguments.iter().any(|argument| {
                matches!(argument, ast::Argument::SpreadElement(_))
            }) {
                self.compile_spread_arguments(&call.arguments);
                self.emit(Instruction::EvaluateSuperWithArgArray);
            } else {
                for argument in &call.arguments {
                    let expression = argument
                        .as_expression()
                        .expect("non-spread arguments are expressions");
                    self.compile_expression_get_value(expression);
                    self.emit(Instruction::Store);
                }
                self.emit(Instruction::EvaluateSuper(call.arguments.len() as u16));
            }
            return;
        }
        // Evaluate the callee; keep its reference for the this value.
        if Self::is_reference(&call.callee) {
            self.compile_expression(&call.callee);
            self.emit(Instruction::GetValueKeepReference);
            self.emit(Instruction::PushReference);
        } else {
            self.compile_expression_get_value(&call.callee);
            // A value callee carries no this reference.
            self.emit(Instruction::ClearReference);
        }
        self.emit(Instruction::Store);
        let has_spread = call
            .arguments
            .iter()
            .any(|argument| matches!(argument, ast::Argument::SpreadElement(_)));
        if has_spread {
            self.compile_spread_arguments(&call.arguments);
            if Self::is_reference(&call.callee) {
                self.emit(Instruction::PopReference);
            }
            self.emit(Instruction::EvaluateCallWithArgArray);
        } else {
            for argument in &call.arguments {
                let expression = argument
                    .as_expression()
                    .expect("non-spread arguments are expressions");
                self.compile_expression_get_value(expression);
                self.emit(Instruction::Store);
            }
            if Self::is_reference(&call.callee) {
                self.emit(Instruction::PopReference);
            }
            self.emit(Instruction::EvaluateCall(call.arguments.len() as u16));
        }
    }

    /// Collects an argument list containing spreads into an array in the
    /// result register.
    fn compile_spread_arguments(&mut self, arguments: &[ast::Argument]) {
        self.emit(Instruction::ArrayCreate(arguments.len() as u32));
        for argument in arguments {
            match argument {
                ast::Argument::SpreadElement(spread) => {
                    self.compile_expression_get_value(&spread.argument);
                    self.emit(Instruction::GetIteratorSync);
                    let step = JumpIndex(self.current_ip());
                    self.emit(Instruction::IteratorStepValue(usize::MAX));
                    self.emit(Instruction::ArrayPush);
                    let jump = self.emit_jump();
                    self.patch_jump_to(jump, step.0);
                    self.patch_jump(step);
                }
                other => {
                    let expression = other
                        .as_expression()
                        .expect("non-spread arguments are expressions");
                    self.compile_expression_get_value(expression);
                    self.emit(Instruction::ArrayPush);
                }
            }
        }
        self.emit(Instruction::Load);
    }

    fn compile_new(&mut self, new: &ast::NewExpression) {
        self.compile_expression_get_value(&new.callee);
        self.emit(Instruction::Store);
        let has_spread = new
            .arguments
            .iter()
            .any(|argument| matches!(argument, ast::Argument::SpreadElement(_)));
        if has_spread {
            self.compile_spread_arguments(&new.arguments);
            self.emit(Instruction::EvaluateNewWithArgArray);
        } else {
            for argument in &new.arguments {
                let expression = argument
                    .as_expression()
                    .expect("non-spread arguments are expressions");
                self.compile_expression_get_value(expression);
                self.emit(Instruction::Store);
            }
            self.emit(Instruction::EvaluateNew(new.arguments.len() as u16));
        }
    }

    /// Optional chains: a nullish base short-circuits the whole chain to
    /// undefined.
    fn compile_chain(&mut self, chain: &ast::ChainExpression) {
        let mut chain_jumps = Vec::new();
        self.compile_chain_element(&chain.expression, &mut chain_jumps);
        if Self::chain_element_is_reference(&chain.expression) {
            self.emit(Instruction::GetValue);
        }
        let end = self.emit_jump();
        for jump in chain_jumps {
            self.patch_jump(jump);
        }
        self.patch_jump(end);
    }

    fn chain_element_is_reference(element: &ast::ChainElement) -> bool {
        matches!(
            element,
            ast::ChainElement::StaticMemberExpression(_)
                | ast::ChainElement::ComputedMemberExpression(_)
                | ast::ChainElement::PrivateFieldExpression(_)
        )
    }

    fn compile_chain_element(
        &mut self,
        element: &ast::ChainElement,
        chain_jumps: &mut Vec<JumpIndex>,
    ) {
        match element {
            ast::ChainElement::StaticMemberExpression(member) => {
                self.compile_chain_expression_value(&member.object, chain_jumps);
                if member.optional {
                    chain_jumps.push(self.emit_jump_if_nullish());
                }
                let index = self.add_identifier(member.property.name.as_str());
                self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
            }
            ast::ChainElement::ComputedMemberExpression(member) => {
                self.compile_chain_expression_value(&member.object, chain_jumps);
                if member.optional {
                    chain_jumps.push(self.emit_jump_if_nullish());
                }
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.expression);
                self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
            }
            ast::ChainElement::PrivateFieldExpression(member) => {
                self.compile_chain_expression_value(&member.object, chain_jumps);
                if member.optional {
                    chain_jumps.push(self.emit_jump_if_nullish());
                }
                let index = self.add_identifier(member.field.name.as_str());
                self.emit(Instruction::MakePrivateReference(index));
            }
            ast::ChainElement::CallExpression(call) => {
                // The callee may itself be part of the chain.
                match &call.callee {
                    ast::Expression::StaticMemberExpression(member) => {
                        self.compile_chain_expression_value(&member.object, chain_jumps);
                        if member.optional {
                            chain_jumps.push(self.emit_jump_if_nullish());
                        }
                        let index = self.add_identifier(member.property.name.as_str());
                        self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
                        self.emit(Instruction::GetValueKeepReference);
                    }
                    ast::Expression::ComputedMemberExpression(member) => {
                        self.compile_chain_expression_value(&member.object, chain_jumps);
                        if member.optional {
                            chain_jumps.push(self.emit_jump_if_nullish());
                        }
                        self.emit(Instruction::Store);
                        self.compile_expression_get_value(&member.expression);
                        self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
                        self.emit(Instruction::GetValueKeepReference);
                    }
                    other => {
                        self.compile_chain_expression_value(other, chain_jumps);
                    }
                }
                if call.optional {
                    chain_jumps.push(self.emit_jump_if_nullish());
                }
                let is_method_call = matches!(
                    call.callee,
                    ast::Expression::StaticMemberExpression(_)
                        | ast::Expression::ComputedMemberExpression(_)
                );
                if call
                    .arguments
                    .iter()
                    .any(|argument| matches!(argument, ast::Argument::SpreadElement(_)))
                {
                    let message =
                        self.add_identifier("spread in optional calls is not supported");
                    self.emit(Instruction::ThrowError(ExceptionType::SyntaxError, message));
                    return;
                }
                if is_method_call {
                    self.emit(Instruction::PushReference);
                }
                self.emit(Instruction::Store);
                for argument in &call.arguments {
                    let expression = argument
                        .as_expression()
                        .expect("spread arguments were rejected above");
                    self.compile_expression_get_value(expression);
                    self.emit(Instruction::Store);
                }
                if is_method_call {
                    self.emit(Instruction::PopReference);
                } else {
                    self.emit(Instruction::ClearReference);
                }
                self.emit(Instruction::EvaluateCall(call.arguments.len() as u16));
            }
            _ => {
                let message = self.add_identifier("unsupported optional chain element");
                self.emit(Instruction::ThrowError(ExceptionType::SyntaxError, message));
            }
        }
    }

    fn compile_chain_expression_value(
        &mut self,
        expression: &ast::Expression,
        chain_jumps: &mut Vec<JumpIndex>,
    ) {
        match expression {
            ast::Expression::StaticMemberExpression(member) => {
                self.compile_chain_expression_value(&member.object, chain_jumps);
                if member.optional {
                    chain_jumps.push(self.emit_jump_if_nullish());
                }
                let index = self.add_identifier(member.property.name.as_str());
                self.emit(Instruction::EvaluatePropertyAccessWithIdentifierKey(index));
                self.emit(Instruction::GetValue);
            }
            ast::Expression::ComputedMemberExpression(member) => {
                self.compile_chain_expression_value(&member.object, chain_jumps);
                if member.optional {
                    chain_jumps.push(self.emit_jump_if_nullish());
                }
                self.emit(Instruction::Store);
                self.compile_expression_get_value(&member.expression);
                self.emit(Instruction::EvaluatePropertyAccessWithExpressionKey);
                self.emit(Instruction::GetValue);
            }
            other => {
                self.compile_expression_get_value(other);
            }
        }
    }

    fn compile_yield(&mut self, expression: &ast::YieldExpression) {
        if expression.delegate {
            // yield*: drive the inner iterator, yielding each value.
            let argument = expression
                .argument
                .as_ref()
                .expect("yield* always has an argument");
            self.compile_expression_get_value(argument);
            if self.generator_kind == FunctionKind::AsyncGenerator {
                self.emit(Instruction::GetIteratorAsync);
            } else {
                self.emit(Instruction::GetIteratorSync);
            }
            let step = JumpIndex(self.current_ip());
            self.emit(Instruction::IteratorStepValue(usize::MAX));
            if self.generator_kind == FunctionKind::AsyncGenerator {
                self.emit(Instruction::Await);
            }
            self.emit(Instruction::Yield);
            let jump = self.emit_jump();
            self.patch_jump_to(jump, step.0);
            self.patch_jump(step);
            self.emit(Instruction::Empty);
        } else {
            match &expression.argument {
                Some(argument) => self.compile_expression_get_value(argument),
                None => self.emit_constant(Value::Undefined),
            }
            self.emit(Instruction::Yield);
        }
    }

    fn compile_class(&mut self, class: &ast::Class) {
        // Collect the class's private names for its PrivateEnvironment.
        let mut private_names = Vec::new();
        for element in &class.body.body {
            match element {
                ast::ClassElement::MethodDefinition(method) => {
                    if let ast::PropertyKey::PrivateIdentifier(identifier) = &method.key {
                        private_names.push(identifier.name.to_string());
                    }
                }
                ast::ClassElement::PropertyDefinition(property) => {
                    if let ast::PropertyKey::PrivateIdentifier(identifier) = &property.key {
                        private_names.push(identifier.name.to_string());
                    }
                }
                _ => {}
            }
        }
        let private_start = if private_names.is_empty() {
            None
        } else {
            let start = self.identifiers.len() as u16;
            for name in &private_names {
                self.add_identifier(name);
            }
            self.emit(Instruction::EnterClassPrivateEnvironment {
                start,
                count: private_names.len() as u16,
            });
            Some(start)
        };
        // The class binding environment for references to the class name
        // inside the body.
        let has_name_binding = class.id.is_some();
        if let Some(identifier) = &class.id {
            self.emit(Instruction::EnterDeclarativeEnvironment);
            self.control_flow_stack.push(ControlFlowEntry::LexicalScope);
            let index = self.add_identifier(identifier.name.as_str());
            self.emit(Instruction::CreateImmutableBinding(index));
        }
        let has_super = class.super_class.is_some();
        if let Some(super_class) = &class.super_class {
            self.compile_expression_get_value(super_class);
            self.emit(Instruction::Store);
        }
        // Find the constructor method, or synthesize a default one.
        let mut constructor_expression = None;
        for element in &class.body.body {
            if let ast::ClassElement::MethodDefinition(method) = element {
                if method.kind == ast::MethodDefinitionKind::Constructor {
                    constructor_expression = Some(self.add_function_expression(&method.value));
                }
            }
        }
        let default_constructor_bytecode = if constructor_expression.is_none() {
            let executable = compile_default_constructor(self.agent, self.source_code, has_super);
            Some(self.add_class_initializer(executable))
        } else {
            None
        };
        self.emit(Instruction::ClassDefineConstructor {
            function_expression: constructor_expression,
            default_constructor_bytecode,
            has_super,
        });
        // Member definitions: the prototype and constructor are on the
        // stack.
        for element in &class.body.body {
            match element {
                ast::ClassElement::MethodDefinition(method) => {
                    if method.kind == ast::MethodDefinitionKind::Constructor {
                        continue;
                    }
                    let kind = match method.kind {
                        ast::MethodDefinitionKind::Get => MethodKind::Get,
                        ast::MethodDefinitionKind::Set => MethodKind::Set,
                        _ => MethodKind::Method,
                    };
                    let function_index = self.add_function_expression(&method.value);
                    if let ast::PropertyKey::PrivateIdentifier(identifier) = &method.key {
                        let identifier = self.add_identifier(identifier.name.as_str());
                        self.emit(Instruction::ClassDefinePrivateMethod {
                            function_expression: function_index,
                            kind,
                            is_static: method.r#static,
                            identifier,
                        });
                    } else {
                        self.compile_property_key(&method.key);
                        self.emit(Instruction::ClassDefineMethod {
                            function_expression: function_index,
                            kind,
                            is_static: method.r#static,
                        });
                    }
                }
                ast::ClassElement::PropertyDefinition(property) => {
                    let initializer = property.value.as_ref().map(|value| {
                        let executable = compile_field_initializer(
                            self.agent,
                            self.source_code,
                            self.is_strict,
                            value,
                        );
                        self.add_class_initializer(executable)
                    });
                    if let ast::PropertyKey::PrivateIdentifier(identifier) = &property.key {
                        let identifier = self.add_identifier(identifier.name.as_str());
                        self.emit(Instruction::ClassDefinePrivateField {
                            identifier,
                            initializer,
                        });
                    } else if property.r#static {
                        self.compile_property_key(&property.key);
                        self.emit(Instruction::ClassDefineStaticField { initializer });
                    } else {
                        self.compile_property_key(&property.key);
                        self.emit(Instruction::ClassDefineField { initializer });
                    }
                }
                ast::ClassElement::StaticBlock(_) => {
                    // Static initialization blocks are not carried.
                }
                _ => {}
            }
        }
        // Pop [prototype, constructor] leaving the constructor as the
        // result.
        self.emit(Instruction::Swap);
        self.emit(Instruction::Load);
        self.emit(Instruction::Load);
        if has_name_binding {
            let identifier = class.id.as_ref().expect("checked above");
            let index = self.add_identifier(identifier.name.as_str());
            self.emit(Instruction::StoreCopy);
            self.emit(Instruction::ResolveBinding(index));
            self.emit(Instruction::InitializeReferencedBinding);
            self.emit(Instruction::Load);
            self.control_flow_stack.pop();
            self.emit(Instruction::ExitDeclarativeEnvironment);
        }
        if private_start.is_some() {
            self.emit(Instruction::ExitClassPrivateEnvironment);
        }
    }

    // Function declaration instantiation.

    /// ### [10.2.11 FunctionDeclarationInstantiation ( func, argumentsList )](https://tc39.es/ecma262/#sec-functiondeclarationinstantiation)
    ///
    /// Compiled as the prologue of the function body: parameter bindings
    /// (with defaults and patterns), the arguments object, var and function
    /// hoisting, and top-level lexical bindings, all in the function
    /// environment.
    pub(crate) fn compile_function_declaration_instantiation(
        &mut self,
        parameters: &ast::FormalParameters,
        body: &ast::FunctionBody,
        is_arrow: bool,
    ) {
        let simple = is_simple_parameter_list(parameters);
        let mut parameter_names: Vec<std::string::String> = Vec::new();
        for parameter in &parameters.items {
            let mut names = Vec::new();
            binding_pattern_bound_names(&parameter.pattern, &mut names);
            parameter_names.extend(names.iter().map(|name| name.to_string()));
        }
        if let Some(rest) = &parameters.rest {
            let mut names = Vec::new();
            binding_pattern_bound_names(&rest.argument, &mut names);
            parameter_names.extend(names.iter().map(|name| name.to_string()));
        }

        // 22. The arguments object, unless this is an arrow function or a
        //     parameter shadows the name.
        let needs_arguments =
            !is_arrow && !parameter_names.iter().any(|name| name == "arguments");
        if needs_arguments {
            if self.is_strict || !simple {
                self.emit(Instruction::CreateUnmappedArgumentsObject);
            } else {
                let start = self.identifiers.len() as u16;
                for name in &parameter_names {
                    self.add_identifier(name);
                }
                self.emit(Instruction::CreateMappedArgumentsObject {
                    start,
                    count: parameter_names.len() as u16,
                });
            }
            let index = self.add_identifier("arguments");
            self.emit(Instruction::CreateMutableBinding(index));
            self.emit(Instruction::ResolveBinding(index));
            self.emit(Instruction::InitializeReferencedBinding);
        }

        // 21. Bind each formal parameter to its argument.
        for name in &parameter_names {
            let index = self.add_identifier(name);
            self.emit(Instruction::CreateMutableBinding(index));
        }
        for (position, parameter) in parameters.items.iter().enumerate() {
            self.emit(Instruction::ArgumentGet(position as u16));
            self.compile_binding_pattern(&parameter.pattern, true);
        }
        if let Some(rest) = &parameters.rest {
            self.emit(Instruction::ArgumentRest(parameters.items.len() as u16));
            self.compile_binding_pattern(&rest.argument, true);
        }

        // 27. Var-scoped declarations initialize to undefined unless a
        //     parameter of the same name already carries the argument value.
        let mut var_declarations = Vec::new();
        var_scoped_declarations(&body.statements, &mut var_declarations);
        let mut declared: Vec<std::string::String> = Vec::new();
        for declaration in &var_declarations {
            if let VarScopedDeclaration::Variable(declarator) = declaration {
                let mut names = Vec::new();
                binding_pattern_bound_names(&declarator.id, &mut names);
                for name in names {
                    if parameter_names.iter().any(|parameter| parameter == name)
                        || declared.iter().any(|existing| existing == name)
                        || (needs_arguments && name == "arguments")
                    {
                        continue;
                    }
                    declared.push(name.to_string());
                    let index = self.add_identifier(name);
                    self.emit(Instruction::CreateMutableBinding(index));
                    self.emit_constant(Value::Undefined);
                    self.emit(Instruction::ResolveBinding(index));
                    self.emit(Instruction::InitializeReferencedBinding);
                }
            }
        }

        // 34. Hoisted function declarations, last one of a name winning.
        let mut instantiated: Vec<std::string::String> = Vec::new();
        let functions: Vec<&ast::Function> = var_declarations
            .iter()
            .filter_map(|declaration| match declaration {
                VarScopedDeclaration::Function(function) => Some(*function),
                _ => None,
            })
            .collect();
        for function in functions.iter().rev() {
            let Some(identifier) = &function.id else {
                continue;
            };
            let name = identifier.name.to_string();
            if instantiated.contains(&name) {
                continue;
            }
            instantiated.push(name);
        }
        for function in &functions {
            let Some(identifier) = &function.id else {
                continue;
            };
            let name = identifier.name.as_str();
            let is_last = functions
                .iter()
                .rev()
                .find(|candidate| {
                    candidate
                        .id
                        .as_ref()
                        .is_some_and(|id| id.name.as_str() == name)
                })
                .is_some_and(|candidate| core::ptr::eq(*candidate, *function));
            if !is_last {
                continue;
            }
            let already_bound = parameter_names.iter().any(|parameter| parameter == name)
                || declared.iter().any(|existing| existing == name)
                || (needs_arguments && name == "arguments");
            let index = self.add_identifier(name);
            if !already_bound {
                self.emit(Instruction::CreateMutableBinding(index));
                declared.push(name.to_string());
            }
            let function_index = self.add_function_expression(function);
            self.emit(Instruction::InstantiateOrdinaryFunctionExpression(
                function_index,
            ));
            self.emit(Instruction::ResolveBinding(index));
            if already_bound {
                self.emit(Instruction::PutValue);
            } else {
                self.emit(Instruction::InitializeReferencedBinding);
            }
        }

        // 35./36. Top-level lexical declarations create uninitialized
        //         bindings.
        let mut lexical = Vec::new();
        lexically_scoped_declarations(&body.statements, true, &mut lexical);
        for declaration in &lexical {
            match declaration {
                LexicallyScopedDeclaration::Variable {
                    declarator,
                    is_const,
                } => {
                    let mut names = Vec::new();
                    binding_pattern_bound_names(&declarator.id, &mut names);
                    for name in names {
                        let index = self.add_identifier(name);
                        if *is_const {
                            self.emit(Instruction::CreateImmutableBinding(index));
                        } else {
                            self.emit(Instruction::CreateMutableBinding(index));
                        }
                    }
                }
                LexicallyScopedDeclaration::Class(class) => {
                    if let Some(identifier) = &class.id {
                        let index = self.add_identifier(identifier.name.as_str());
                        self.emit(Instruction::CreateMutableBinding(index));
                    }
                }
                LexicallyScopedDeclaration::Function(_) => {}
            }
        }
        self.emit(Instruction::Empty);
    }
}

fn is_proto_key(key: &ast::PropertyKey) -> bool {
    match key {
        ast::PropertyKey::StaticIdentifier(identifier) => identifier.name == "__proto__",
        ast::PropertyKey::StringLiteral(literal) => literal.value == "__proto__",
        _ => false,
    }
}

fn to_binary_operator(operator: AssignmentOperator) -> BinaryOperator {
    match operator {
        AssignmentOperator::Addition => BinaryOperator::Addition,
        AssignmentOperator::Subtraction => BinaryOperator::Subtraction,
        AssignmentOperator::Multiplication => BinaryOperator::Multiplication,
        AssignmentOperator::Division => BinaryOperator::Division,
        AssignmentOperator::Remainder => BinaryOperator::Remainder,
        AssignmentOperator::Exponential => BinaryOperator::Exponential,
        AssignmentOperator::ShiftLeft => BinaryOperator::ShiftLeft,
        AssignmentOperator::ShiftRight => BinaryOperator::ShiftRight,
        AssignmentOperator::ShiftRightZeroFill => BinaryOperator::ShiftRightZeroFill,
        AssignmentOperator::BitwiseAnd => BinaryOperator::BitwiseAnd,
        AssignmentOperator::BitwiseXOR => BinaryOperator::BitwiseXOR,
        AssignmentOperator::BitwiseOR => BinaryOperator::BitwiseOR,
        _ => unreachable!("logical assignment operators take the logical path"),
    }
}

/// Compiles the body of a synthesized default class constructor.
fn compile_default_constructor(
    agent: &mut Agent,
    source_code: SourceCode,
    has_super: bool,
) -> Executable {
    let mut ctx = CompileContext::new(agent, source_code, true);
    if has_super {
        // A derived default constructor forwards its arguments to super.
        ctx.emit(Instruction::ArgumentRest(0));
        ctx.emit(Instruction::EvaluateSuperWithArgArray);
    }
    ctx.emit(Instruction::Return);
    ctx.finish()
}

/// Compiles a class field initializer expression into its own executable.
fn compile_field_initializer(
    agent: &mut Agent,
    source_code: SourceCode,
    is_strict: bool,
    value: &ast::Expression,
) -> Executable {
    let mut ctx = CompileContext::new(agent, source_code, is_strict);
    ctx.compile_expression_get_value(value);
    ctx.emit(Instruction::Return);
    ctx.finish()
}
