// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [16.1 Scripts](https://tc39.es/ecma262/#sec-scripts)

use core::ptr::NonNull;
use std::any::Any;
use std::rc::Rc;

use oxc_ast::ast::Program;
use oxc_diagnostics::OxcDiagnostic;
use oxc_span::SourceType;

use crate::ecmascript::execution::environments::EnvironmentIndex;
use crate::ecmascript::execution::{
    Agent, ECMAScriptCodeEvaluationState, ExecutionContext, JsResult, RealmIdentifier,
};
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::scripts_and_modules::ScriptOrModule;
use crate::ecmascript::syntax_directed_operations::function_definitions::instantiate_function_object;
use crate::ecmascript::syntax_directed_operations::scope_analysis::{
    binding_pattern_bound_names, lexically_scoped_declarations, var_scoped_declarations,
    LexicallyScopedDeclaration, VarScopedDeclaration,
};
use crate::ecmascript::types::{IntoValue, String, Value};
use crate::engine::{Executable, Vm};
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub type HostDefined = Rc<dyn Any>;

pub(crate) type ScriptIdentifier = BaseIndex<Script>;

/// ### [16.1.4 Script Records](https://tc39.es/ecma262/#sec-script-records)
#[derive(Debug)]
pub struct Script {
    /// \[\[Realm]]
    pub(crate) realm: RealmIdentifier,

    /// \[\[ECMAScriptCode]]
    ///
    /// SAFETY: Kept alive by `source_code`; never accessed mutably.
    pub(crate) ecmascript_code: NonNull<Program<'static>>,

    pub(crate) source_code: SourceCode,

    /// Whether the script source begins with a "use strict" directive.
    pub(crate) is_strict: bool,

    /// \[\[HostDefined]]
    pub(crate) host_defined: Option<HostDefined>,
}

/// ### [16.1.5 ParseScript ( sourceText, realm, hostDefined )](https://tc39.es/ecma262/#sec-parse-script)
pub fn parse_script(
    agent: &mut Agent,
    source_text: String,
    realm: RealmIdentifier,
    host_defined: Option<HostDefined>,
) -> Result<ScriptIdentifier, Vec<OxcDiagnostic>> {
    // 1. Let script be ParseText(sourceText, Script).
    let source = source_text.to_string_lossy(agent).into_owned();
    let (source_code, program) =
        SourceCode::parse_source(agent, &source, SourceType::default())?;
    // 2. If script is a List of errors, return script.
    // SAFETY: program is owned by source_code.
    let is_strict = unsafe { program.as_ref() }
        .directives
        .iter()
        .any(|directive| directive.directive == "use strict");
    // 3. Return Script Record { [[Realm]]: realm, [[ECMAScriptCode]]:
    //    script, [[LoadedModules]]: « », [[HostDefined]]: hostDefined }.
    agent.heap.scripts.push(Some(Script {
        realm,
        ecmascript_code: program,
        source_code,
        is_strict,
        host_defined,
    }));
    Ok(ScriptIdentifier::last(&agent.heap.scripts))
}

/// ### [16.1.6 ScriptEvaluation ( scriptRecord )](https://tc39.es/ecma262/#sec-runtime-semantics-scriptevaluation)
pub fn script_evaluation(agent: &mut Agent, script: ScriptIdentifier) -> JsResult<Value> {
    let realm_id = agent[script].realm;
    let is_strict = agent[script].is_strict;
    let source_code = agent[script].source_code;
    // 1. Let globalEnv be scriptRecord.[[Realm]].[[GlobalEnv]].
    let global_env = agent[realm_id].global_env();
    // 2. Let scriptContext be a new ECMAScript code execution context.
    let script_context = ExecutionContext {
        // 3. Set the Function of scriptContext to null.
        function: None,
        // 4. Set the Realm of scriptContext to scriptRecord.[[Realm]].
        realm: realm_id,
        // 5. Set the ScriptOrModule of scriptContext to scriptRecord.
        script_or_module: Some(ScriptOrModule::Script(script)),
        ecmascript_code: Some(ECMAScriptCodeEvaluationState {
            // 6./7. Set the Variable/LexicalEnvironment of scriptContext to
            //       globalEnv.
            lexical_environment: EnvironmentIndex::Global(global_env),
            variable_environment: EnvironmentIndex::Global(global_env),
            // 8. Set the PrivateEnvironment of scriptContext to null.
            private_environment: None,
            is_strict_mode: is_strict,
            source_code,
        }),
    };
    // 9. Suspend the running execution context.
    // 10. Push scriptContext onto the execution context stack.
    agent.execution_context_stack.push(script_context);
    // 11. Let script be scriptRecord.[[ECMAScriptCode]].
    let program = agent[script].ecmascript_code;
    // 12. Let result be
    //     Completion(GlobalDeclarationInstantiation(script, globalEnv)).
    // SAFETY: The program is kept alive by the script's SourceCode.
    let result = global_declaration_instantiation(
        agent,
        unsafe { program.as_ref() },
        global_env,
        source_code,
    )
    // 13. If result is a normal completion, then
    //     a. Set result to Completion(Evaluation of script).
    .and_then(|_| {
        let executable = Executable::compile_script(agent, script);
        let result = Vm::execute(agent, executable, None).into_js_result();
        //     b. If result is a normal completion and result.[[Value]] is
        //        EMPTY, set result to NormalCompletion(undefined).
        result
    });
    // 15. Suspend scriptContext and remove it from the execution context
    //     stack.
    agent.execution_context_stack.pop();
    // 16./17. Resume the suspended context; return ? result.
    result
}

/// ### [16.1.7 GlobalDeclarationInstantiation ( script, env )](https://tc39.es/ecma262/#sec-globaldeclarationinstantiation)
fn global_declaration_instantiation(
    agent: &mut Agent,
    program: &Program,
    env: crate::ecmascript::execution::environments::GlobalEnvironmentIndex,
    source_code: SourceCode,
) -> JsResult<()> {
    use crate::ecmascript::execution::agent::ExceptionType;
    let body = program.body.as_slice();
    // 1. Let lexNames be the LexicallyDeclaredNames of script.
    // 2. Let varNames be the VarDeclaredNames of script.
    let mut lexical = Vec::new();
    lexically_scoped_declarations(body, true, &mut lexical);
    let mut var_declarations = Vec::new();
    var_scoped_declarations(body, &mut var_declarations);

    // 3./4. Conflict checks between lexical names and existing bindings.
    for declaration in &lexical {
        let mut names = Vec::new();
        match declaration {
            LexicallyScopedDeclaration::Variable { declarator, .. } => {
                binding_pattern_bound_names(&declarator.id, &mut names)
            }
            LexicallyScopedDeclaration::Function(function) => {
                if let Some(id) = &function.id {
                    names.push(id.name.as_str());
                }
            }
            LexicallyScopedDeclaration::Class(class) => {
                if let Some(id) = &class.id {
                    names.push(id.name.as_str());
                }
            }
        }
        for name in names {
            let name = String::from_str(agent, name);
            // a. If env.HasVarDeclaration(name) is true, throw a SyntaxError
            //    exception.
            // b. If env.HasLexicalDeclaration(name) is true, throw a
            //    SyntaxError exception.
            if env.has_var_declaration(agent, name)
                || env.has_lexical_declaration(agent, name)
                // c. Let hasRestrictedGlobal be
                //    ? env.HasRestrictedGlobalProperty(name).
                || env.has_restricted_global_property(agent, name)?
            {
                let text = name.to_string_lossy(agent).into_owned();
                return Err(agent.throw_exception(
                    ExceptionType::SyntaxError,
                    format!("Identifier '{}' has already been declared", text),
                ));
            }
        }
    }

    // 5-10. Collect the var-scoped functions (last declaration wins) and
    //       plain var names.
    let mut declared_function_names: Vec<&str> = Vec::new();
    let mut functions_to_initialize = Vec::new();
    for declaration in var_declarations.iter().rev() {
        if let VarScopedDeclaration::Function(function) = declaration {
            let Some(id) = &function.id else { continue };
            let name = id.name.as_str();
            if !declared_function_names.contains(&name) {
                let function_name = String::from_str(agent, name);
                // a.iv.1. Let fnDefinable be
                //         ? env.CanDeclareGlobalFunction(fn).
                if !env.can_declare_global_function(agent, function_name)? {
                    let text = name.to_string();
                    return Err(agent.throw_exception(
                        ExceptionType::TypeError,
                        format!("Cannot declare global function {}", text),
                    ));
                }
                declared_function_names.push(name);
                functions_to_initialize.push(*function);
            }
        }
    }
    functions_to_initialize.reverse();
    let mut declared_var_names: Vec<String> = Vec::new();
    for declaration in &var_declarations {
        if let VarScopedDeclaration::Variable(declarator) = declaration {
            let mut names = Vec::new();
            binding_pattern_bound_names(&declarator.id, &mut names);
            for name in names {
                if declared_function_names.contains(&name) {
                    continue;
                }
                let var_name = String::from_str(agent, name);
                // a.i.1. Let vnDefinable be ? env.CanDeclareGlobalVar(vn).
                if !env.can_declare_global_var(agent, var_name)? {
                    let text = name.to_string();
                    return Err(agent.throw_exception(
                        ExceptionType::TypeError,
                        format!("Cannot declare global variable {}", text),
                    ));
                }
                if !declared_var_names.contains(&var_name) {
                    declared_var_names.push(var_name);
                }
            }
        }
    }

    // 15./16. Create the lexical bindings.
    for declaration in &lexical {
        match declaration {
            LexicallyScopedDeclaration::Variable {
                declarator,
                is_const,
            } => {
                let mut names = Vec::new();
                binding_pattern_bound_names(&declarator.id, &mut names);
                for name in names {
                    let name = String::from_str(agent, name);
                    if *is_const {
                        // b.i. Perform ? env.CreateImmutableBinding(dn,
                        //      true).
                        env.create_immutable_binding(agent, name, true)?;
                    } else {
                        // c.i. Perform ? env.CreateMutableBinding(dn,
                        //      false).
                        env.create_mutable_binding(agent, name, false)?;
                    }
                }
            }
            LexicallyScopedDeclaration::Function(function) => {
                if let Some(id) = &function.id {
                    let name = String::from_str(agent, id.name.as_str());
                    env.create_mutable_binding(agent, name, false)?;
                }
            }
            LexicallyScopedDeclaration::Class(class) => {
                if let Some(id) = &class.id {
                    let name = String::from_str(agent, id.name.as_str());
                    env.create_mutable_binding(agent, name, false)?;
                }
            }
        }
    }

    // 17. For each Parse Node f of functionsToInitialize: instantiate and
    //     bind.
    let env_index = EnvironmentIndex::Global(env);
    for function in functions_to_initialize {
        let function_object =
            instantiate_function_object(agent, function, env_index, None, source_code);
        let name = function
            .id
            .as_ref()
            .expect("hoisted function has a name")
            .name
            .as_str();
        let name = String::from_str(agent, name);
        // c. Perform ? env.CreateGlobalFunctionBinding(fn, fo, false).
        env.create_global_function_binding(
            agent,
            name,
            function_object.into_value(),
            false,
        )?;
    }

    // 18. For each String vn of declaredVarNames: perform
    //     ? env.CreateGlobalVarBinding(vn, false).
    for name in declared_var_names {
        env.create_global_var_binding(agent, name, false)?;
    }

    // 19. Return unused.
    Ok(())
}

impl core::ops::Index<ScriptIdentifier> for Agent {
    type Output = Script;

    fn index(&self, index: ScriptIdentifier) -> &Self::Output {
        self.heap
            .scripts
            .get(index.into_index())
            .expect("Script out of bounds")
            .as_ref()
            .expect("Script slot empty")
    }
}

impl HeapMark for Script {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.realms.push(self.realm);
        self.source_code.mark_values(queues);
    }
}
