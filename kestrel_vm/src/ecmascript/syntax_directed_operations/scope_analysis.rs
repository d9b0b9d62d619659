// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [8.2 Scope Analysis](https://tc39.es/ecma262/#sec-syntax-directed-operations-scope-analysis)
//!
//! Static-semantics helpers (`BoundNames`, `VarDeclaredNames`,
//! `VarScopedDeclarations`, `LexicallyScopedDeclarations`) operating purely
//! on the parse-tree shape. The walkers descend statements but never into
//! nested function bodies.

use oxc_ast::ast;

/// ### [8.2.1 BoundNames](https://tc39.es/ecma262/#sec-static-semantics-boundnames)
pub(crate) fn binding_pattern_bound_names<'a>(
    pattern: &'a ast::BindingPattern<'a>,
    names: &mut Vec<&'a str>,
) {
    match &pattern.kind {
        ast::BindingPatternKind::BindingIdentifier(identifier) => {
            names.push(identifier.name.as_str());
        }
        ast::BindingPatternKind::ObjectPattern(object) => {
            for property in &object.properties {
                binding_pattern_bound_names(&property.value, names);
            }
            if let Some(rest) = &object.rest {
                binding_pattern_bound_names(&rest.argument, names);
            }
        }
        ast::BindingPatternKind::ArrayPattern(array) => {
            for element in array.elements.iter().flatten() {
                binding_pattern_bound_names(element, names);
            }
            if let Some(rest) = &array.rest {
                binding_pattern_bound_names(&rest.argument, names);
            }
        }
        ast::BindingPatternKind::AssignmentPattern(assignment) => {
            binding_pattern_bound_names(&assignment.left, names);
        }
    }
}

/// A var-scoped declaration discovered by [`var_scoped_declarations`].
pub(crate) enum VarScopedDeclaration<'a> {
    Variable(&'a ast::VariableDeclarator<'a>),
    Function(&'a ast::Function<'a>),
}

/// ### [8.2.5 VarScopedDeclarations](https://tc39.es/ecma262/#sec-static-semantics-varscopeddeclarations)
///
/// Function declarations are var-scoped only at the top level of a script,
/// function body or module; block-nested functions are lexically scoped.
pub(crate) fn var_scoped_declarations<'a>(
    body: &'a [ast::Statement<'a>],
    out: &mut Vec<VarScopedDeclaration<'a>>,
) {
    for statement in body {
        if let ast::Statement::FunctionDeclaration(function) = statement {
            out.push(VarScopedDeclaration::Function(function));
        }
        collect_var_statements(statement, out);
    }
}

fn collect_var_statements<'a>(
    statement: &'a ast::Statement<'a>,
    out: &mut Vec<VarScopedDeclaration<'a>>,
) {
    match statement {
        ast::Statement::VariableDeclaration(declaration) => {
            if declaration.kind.is_var() {
                for declarator in &declaration.declarations {
                    out.push(VarScopedDeclaration::Variable(declarator));
                }
            }
        }
        ast::Statement::BlockStatement(block) => {
            for statement in &block.body {
                collect_var_statements(statement, out);
            }
        }
        ast::Statement::IfStatement(if_statement) => {
            collect_var_statements(&if_statement.consequent, out);
            if let Some(alternate) = &if_statement.alternate {
                collect_var_statements(alternate, out);
            }
        }
        ast::Statement::DoWhileStatement(do_while) => {
            collect_var_statements(&do_while.body, out);
        }
        ast::Statement::WhileStatement(while_statement) => {
            collect_var_statements(&while_statement.body, out);
        }
        ast::Statement::ForStatement(for_statement) => {
            if let Some(ast::ForStatementInit::VariableDeclaration(declaration)) =
                &for_statement.init
            {
                if declaration.kind.is_var() {
                    for declarator in &declaration.declarations {
                        out.push(VarScopedDeclaration::Variable(declarator));
                    }
                }
            }
            collect_var_statements(&for_statement.body, out);
        }
        ast::Statement::ForInStatement(for_in) => {
            if let ast::ForStatementLeft::VariableDeclaration(declaration) = &for_in.left {
                if declaration.kind.is_var() {
                    for declarator in &declaration.declarations {
                        out.push(VarScopedDeclaration::Variable(declarator));
                    }
                }
            }
            collect_var_statements(&for_in.body, out);
        }
        ast::Statement::ForOfStatement(for_of) => {
            if let ast::ForStatementLeft::VariableDeclaration(declaration) = &for_of.left {
                if declaration.kind.is_var() {
                    for declarator in &declaration.declarations {
                        out.push(VarScopedDeclaration::Variable(declarator));
                    }
                }
            }
            collect_var_statements(&for_of.body, out);
        }
        ast::Statement::WithStatement(with) => {
            collect_var_statements(&with.body, out);
        }
        ast::Statement::SwitchStatement(switch) => {
            for case in &switch.cases {
                for statement in &case.consequent {
                    collect_var_statements(statement, out);
                }
            }
        }
        ast::Statement::LabeledStatement(labeled) => {
            collect_var_statements(&labeled.body, out);
        }
        ast::Statement::TryStatement(try_statement) => {
            for statement in &try_statement.block.body {
                collect_var_statements(statement, out);
            }
            if let Some(handler) = &try_statement.handler {
                for statement in &handler.body.body {
                    collect_var_statements(statement, out);
                }
            }
            if let Some(finalizer) = &try_statement.finalizer {
                for statement in &finalizer.body {
                    collect_var_statements(statement, out);
                }
            }
        }
        _ => {}
    }
}

/// ### [8.2.4 VarDeclaredNames](https://tc39.es/ecma262/#sec-static-semantics-vardeclarednames)
pub(crate) fn var_declared_names<'a>(body: &'a [ast::Statement<'a>]) -> Vec<&'a str> {
    let mut declarations = Vec::new();
    var_scoped_declarations(body, &mut declarations);
    let mut names = Vec::new();
    for declaration in &declarations {
        match declaration {
            VarScopedDeclaration::Variable(declarator) => {
                binding_pattern_bound_names(&declarator.id, &mut names);
            }
            VarScopedDeclaration::Function(function) => {
                if let Some(identifier) = &function.id {
                    names.push(identifier.name.as_str());
                }
            }
        }
    }
    names
}

/// A lexically scoped declaration at the top level of a scope.
pub(crate) enum LexicallyScopedDeclaration<'a> {
    Variable {
        declarator: &'a ast::VariableDeclarator<'a>,
        is_const: bool,
    },
    Function(&'a ast::Function<'a>),
    Class(&'a ast::Class<'a>),
}

/// ### [8.2.7 LexicallyScopedDeclarations](https://tc39.es/ecma262/#sec-static-semantics-lexicallyscopeddeclarations)
///
/// With `top_level` true, function declarations are treated as var-scoped
/// and excluded, per the Script and FunctionBody productions.
pub(crate) fn lexically_scoped_declarations<'a>(
    body: &'a [ast::Statement<'a>],
    top_level: bool,
    out: &mut Vec<LexicallyScopedDeclaration<'a>>,
) {
    for statement in body {
        match statement {
            ast::Statement::VariableDeclaration(declaration) => match declaration.kind {
                ast::VariableDeclarationKind::Let => {
                    for declarator in &declaration.declarations {
                        out.push(LexicallyScopedDeclaration::Variable {
                            declarator,
                            is_const: false,
                        });
                    }
                }
                ast::VariableDeclarationKind::Const => {
                    for declarator in &declaration.declarations {
                        out.push(LexicallyScopedDeclaration::Variable {
                            declarator,
                            is_const: true,
                        });
                    }
                }
                _ => {}
            },
            ast::Statement::FunctionDeclaration(function) if !top_level => {
                out.push(LexicallyScopedDeclaration::Function(function));
            }
            ast::Statement::ClassDeclaration(class) => {
                out.push(LexicallyScopedDeclaration::Class(class));
            }
            _ => {}
        }
    }
}

/// ### [8.2.6 LexicallyDeclaredNames](https://tc39.es/ecma262/#sec-static-semantics-lexicallydeclarednames)
pub(crate) fn lexically_declared_names<'a>(
    body: &'a [ast::Statement<'a>],
    top_level: bool,
) -> Vec<&'a str> {
    let mut declarations = Vec::new();
    lexically_scoped_declarations(body, top_level, &mut declarations);
    let mut names = Vec::new();
    for declaration in &declarations {
        match declaration {
            LexicallyScopedDeclaration::Variable { declarator, .. } => {
                binding_pattern_bound_names(&declarator.id, &mut names);
            }
            LexicallyScopedDeclaration::Function(function) => {
                if let Some(identifier) = &function.id {
                    names.push(identifier.name.as_str());
                }
            }
            LexicallyScopedDeclaration::Class(class) => {
                if let Some(identifier) = &class.id {
                    names.push(identifier.name.as_str());
                }
            }
        }
    }
    names
}

/// ### [15.1.2 IsSimpleParameterList](https://tc39.es/ecma262/#sec-static-semantics-issimpleparameterlist)
pub(crate) fn is_simple_parameter_list(parameters: &ast::FormalParameters) -> bool {
    parameters.rest.is_none()
        && parameters.items.iter().all(|parameter| {
            matches!(
                parameter.pattern.kind,
                ast::BindingPatternKind::BindingIdentifier(_)
            )
        })
}
