// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ### [16.2.1 Module Semantics](https://tc39.es/ecma262/#sec-module-semantics)
//!
//! Cyclic module records move through
//! `unlinked → linking → linked → evaluating → evaluated`. Linking performs
//! binding resolution and initializes the module environment; evaluation
//! uses Tarjan-style strongly-connected-component tracking with per-module
//! DFS indexes so that every member of a cycle settles together.

use std::cell::RefCell;
use std::rc::Rc;

use oxc_ast::ast;
use oxc_diagnostics::OxcDiagnostic;
use oxc_span::SourceType;

use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_capability_records::PromiseCapability;
use crate::ecmascript::builtins::module::data::{
    CyclicModuleRecord, CyclicModuleRecordStatus, ExportEntry, ExportImportName, ImportEntry,
    ImportName, ModuleHeapData, SourceTextModuleData,
};
use crate::ecmascript::builtins::module::{module_namespace_create, Module};
use crate::ecmascript::execution::agent::{ExceptionType, JsError, LoadPayload, Referrer};
use crate::ecmascript::execution::environments::{
    new_module_environment, EnvironmentIndex, ModuleEnvironmentIndex,
};
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
use crate::heap::indexes::ModuleIndex;

/// ### [16.2.1.5.1.1 GraphLoadingState Records](https://tc39.es/ecma262/#graphloadingstate-record)
///
/// Shared mutable state threaded through the host's module resolution
/// callback; resolution may complete synchronously or asynchronously.
#[derive(Debug, Clone)]
pub struct GraphLoadingStateRecord(Rc<RefCell<GraphLoadingStateInner>>);

#[derive(Debug)]
struct GraphLoadingStateInner {
    /// \[\[PromiseCapability]]
    capability: PromiseCapability,
    /// \[\[IsLoading]]
    is_loading: bool,
    /// \[\[PendingModulesCount]]
    pending_modules_count: usize,
    /// \[\[Visited]]
    visited: Vec<Module>,
}

/// ### [16.2.1.6.1 ParseModule ( sourceText, realm, hostDefined )](https://tc39.es/ecma262/#sec-parsemodule)
pub fn parse_module(
    agent: &mut Agent,
    source_text: String,
    realm: RealmIdentifier,
    specifier: String,
) -> Result<Module, Vec<OxcDiagnostic>> {
    // 1. Let body be ParseText(sourceText, Module).
    let source = source_text.to_string_lossy(agent).into_owned();
    let (source_code, program) = SourceCode::parse_source(agent, &source, SourceType::mjs())?;
    // 3-10. Collect requested modules and the import/export entries.
    // SAFETY: program is owned by source_code.
    let body = unsafe { program.as_ref() };
    let mut requested_modules: Vec<String> = Vec::new();
    let mut import_entries = Vec::new();
    let mut local_export_entries = Vec::new();
    let mut indirect_export_entries = Vec::new();
    let mut star_export_entries = Vec::new();

    let mut request = |agent: &mut Agent, requested: &mut Vec<String>, specifier: &str| {
        let specifier = String::from_str(agent, specifier);
        if !requested.contains(&specifier) {
            requested.push(specifier);
        }
        specifier
    };

    for statement in &body.body {
        match statement {
            ast::Statement::ImportDeclaration(import) => {
                let module_request =
                    request(agent, &mut requested_modules, import.source.value.as_str());
                let Some(specifiers) = &import.specifiers else {
                    continue;
                };
                for specifier in specifiers {
                    match specifier {
                        ast::ImportDeclarationSpecifier::ImportSpecifier(specifier) => {
                            let import_name =
                                String::from_str(agent, specifier.imported.name().as_str());
                            let local_name =
                                String::from_str(agent, specifier.local.name.as_str());
                            import_entries.push(ImportEntry {
                                module_request,
                                import_name: ImportName::Name(import_name),
                                local_name,
                            });
                        }
                        ast::ImportDeclarationSpecifier::ImportDefaultSpecifier(specifier) => {
                            let import_name = String::from_static_str(agent, "default");
                            let local_name =
                                String::from_str(agent, specifier.local.name.as_str());
                            import_entries.push(ImportEntry {
                                module_request,
                                import_name: ImportName::Name(import_name),
                                local_name,
                            });
                        }
                        ast::ImportDeclarationSpecifier::ImportNamespaceSpecifier(specifier) => {
                            let local_name =
                                String::from_str(agent, specifier.local.name.as_str());
                            import_entries.push(ImportEntry {
                                module_request,
                                import_name: ImportName::NamespaceObject,
                                local_name,
                            });
                        }
                    }
                }
            }
            ast::Statement::ExportNamedDeclaration(export) => {
                if let Some(source) = &export.source {
                    // Re-exports: `export { a as b } from "mod"`.
                    let module_request =
                        request(agent, &mut requested_modules, source.value.as_str());
                    for specifier in &export.specifiers {
                        let import_name =
                            String::from_str(agent, specifier.local.name().as_str());
                        let export_name =
                            String::from_str(agent, specifier.exported.name().as_str());
                        indirect_export_entries.push(ExportEntry {
                            export_name: Some(export_name),
                            module_request: Some(module_request),
                            import_name: Some(ExportImportName::Name(import_name)),
                            local_name: None,
                        });
                    }
                } else {
                    for specifier in &export.specifiers {
                        let local_name =
                            String::from_str(agent, specifier.local.name().as_str());
                        let export_name =
                            String::from_str(agent, specifier.exported.name().as_str());
                        local_export_entries.push(ExportEntry {
                            export_name: Some(export_name),
                            module_request: None,
                            import_name: None,
                            local_name: Some(local_name),
                        });
                    }
                    if let Some(declaration) = &export.declaration {
                        let mut names = Vec::new();
                        match declaration {
                            ast::Declaration::VariableDeclaration(declaration) => {
                                for declarator in &declaration.declarations {
                                    binding_pattern_bound_names(&declarator.id, &mut names);
                                }
                            }
                            ast::Declaration::FunctionDeclaration(function) => {
                                if let Some(id) = &function.id {
                                    names.push(id.name.as_str());
                                }
                            }
                            ast::Declaration::ClassDeclaration(class) => {
                                if let Some(id) = &class.id {
                                    names.push(id.name.as_str());
                                }
                            }
                            _ => {}
                        }
                        for name in names {
                            let name = String::from_str(agent, name);
                            local_export_entries.push(ExportEntry {
                                export_name: Some(name),
                                module_request: None,
                                import_name: None,
                                local_name: Some(name),
                            });
                        }
                    }
                }
            }
            ast::Statement::ExportDefaultDeclaration(_) => {
                let default = String::from_static_str(agent, "default");
                let star_default = String::from_static_str(agent, "*default*");
                local_export_entries.push(ExportEntry {
                    export_name: Some(default),
                    module_request: None,
                    import_name: None,
                    local_name: Some(star_default),
                });
            }
            ast::Statement::ExportAllDeclaration(export) => {
                let module_request =
                    request(agent, &mut requested_modules, export.source.value.as_str());
                match &export.exported {
                    // `export * as ns from "mod"`.
                    Some(exported) => {
                        let export_name = String::from_str(agent, exported.name().as_str());
                        indirect_export_entries.push(ExportEntry {
                            export_name: Some(export_name),
                            module_request: Some(module_request),
                            import_name: None,
                            local_name: None,
                        });
                    }
                    // `export * from "mod"`.
                    None => star_export_entries.push(ExportEntry {
                        export_name: None,
                        module_request: Some(module_request),
                        import_name: Some(ExportImportName::AllButDefault),
                        local_name: None,
                    }),
                }
            }
            _ => {}
        }
    }

    // 11. Return Source Text Module Record { [[Status]]: UNLINKED, ... }.
    agent.heap.modules.push(Some(ModuleHeapData {
        object_index: None,
        exports: Box::default(),
        cyclic: CyclicModuleRecord {
            realm,
            environment: None,
            status: CyclicModuleRecordStatus::Unlinked,
            evaluation_error: None,
            dfs_index: None,
            dfs_ancestor_index: None,
            requested_modules,
            loaded_modules: Vec::new(),
            top_level_capability: None,
        },
        source_text: SourceTextModuleData {
            ecmascript_code: program,
            source_code,
            compiled_bytecode: None,
            import_entries: import_entries.into_boxed_slice(),
            local_export_entries: local_export_entries.into_boxed_slice(),
            indirect_export_entries: indirect_export_entries.into_boxed_slice(),
            star_export_entries: star_export_entries.into_boxed_slice(),
            import_meta: None,
        },
        specifier,
    }));
    Ok(Module(ModuleIndex::last(&agent.heap.modules)))
}

/// ### [16.2.1.5.1 LoadRequestedModules ( \[ hostDefined \] )](https://tc39.es/ecma262/#sec-LoadRequestedModules)
pub fn load_requested_modules(
    agent: &mut Agent,
    module: Module,
) -> crate::ecmascript::builtins::promise::Promise {
    // 1. Let pc be ! NewPromiseCapability(%Promise%).
    let capability = PromiseCapability::new(agent);
    // 2. Let state be the GraphLoadingState Record { [[IsLoading]]: true,
    //    [[PendingModulesCount]]: 1, [[Visited]]: « », ... }.
    let state = GraphLoadingStateRecord(Rc::new(RefCell::new(GraphLoadingStateInner {
        capability,
        is_loading: true,
        pending_modules_count: 1,
        visited: Vec::new(),
    })));
    // 3. Perform InnerModuleLoading(state, module).
    inner_module_loading(agent, &state, module);
    // 4. Return pc.[[Promise]].
    capability.promise()
}

/// ### [16.2.1.5.1.2 InnerModuleLoading ( state, module )](https://tc39.es/ecma262/#sec-InnerModuleLoading)
fn inner_module_loading(agent: &mut Agent, state: &GraphLoadingStateRecord, module: Module) {
    // 1. Assert: state.[[IsLoading]] is true.
    debug_assert!(state.0.borrow().is_loading);
    // 2. If module is a Cyclic Module Record, module.[[Status]] is NEW, and
    //    state.[[Visited]] does not contain module, then
    let not_visited = !state.0.borrow().visited.contains(&module);
    if not_visited && agent[module].cyclic.status == CyclicModuleRecordStatus::Unlinked {
        // a. Append module to state.[[Visited]].
        state.0.borrow_mut().visited.push(module);
        // b. Let requestedModulesCount be the number of elements in
        //    module.[[RequestedModules]].
        let requested: Vec<String> = agent[module].cyclic.requested_modules.clone();
        // c. Set state.[[PendingModulesCount]] to
        //    state.[[PendingModulesCount]] + requestedModulesCount.
        state.0.borrow_mut().pending_modules_count += requested.len();
        // d. For each String required of module.[[RequestedModules]], do
        for required in requested {
            let loaded = agent[module]
                .cyclic
                .loaded_modules
                .iter()
                .find(|(specifier, _)| *specifier == required)
                .map(|(_, module)| *module);
            if let Some(loaded) = loaded {
                // i. If module.[[LoadedModules]] contains a Record whose
                //    [[Specifier]] is required, perform
                //    InnerModuleLoading(state, record.[[Module]]).
                inner_module_loading(agent, state, loaded);
            } else {
                // ii. Else, perform HostLoadImportedModule(module, required,
                //     state.[[HostDefined]], state).
                let specifier = required.to_string_lossy(agent).into_owned();
                let host_hooks = agent.host_hooks;
                host_hooks.load_imported_module(
                    agent,
                    Referrer::Module(module),
                    specifier,
                    LoadPayload::GraphLoadingState(state.clone()),
                );
            }
            // iii. If state.[[IsLoading]] is false, return unused.
            if !state.0.borrow().is_loading {
                return;
            }
        }
    }
    // 3. Assert: state.[[PendingModulesCount]] ≥ 1.
    // 4. Set state.[[PendingModulesCount]] to
    //    state.[[PendingModulesCount]] - 1.
    let finished = {
        let mut inner = state.0.borrow_mut();
        debug_assert!(inner.pending_modules_count >= 1);
        inner.pending_modules_count -= 1;
        // 5. If state.[[PendingModulesCount]] = 0, set state.[[IsLoading]]
        //    to false.
        if inner.pending_modules_count == 0 {
            inner.is_loading = false;
            true
        } else {
            false
        }
    };
    if finished {
        // 5.b. Perform ! Call(state.[[PromiseCapability]].[[Resolve]],
        //      undefined, « undefined »).
        let capability = state.0.borrow().capability;
        capability.resolve(agent, Value::Undefined);
    }
    // 6. Return unused.
}

/// ### [16.2.1.5.1.3 ContinueModuleLoading ( state, moduleCompletion )](https://tc39.es/ecma262/#sec-ContinueModuleLoading)
fn continue_module_loading(
    agent: &mut Agent,
    state: &GraphLoadingStateRecord,
    module_completion: Result<Module, JsError>,
) {
    // 1. If state.[[IsLoading]] is false, return unused.
    if !state.0.borrow().is_loading {
        return;
    }
    match module_completion {
        // 2. If moduleCompletion is a normal completion, perform
        //    InnerModuleLoading(state, moduleCompletion.[[Value]]).
        Ok(module) => inner_module_loading(agent, state, module),
        // 3. Else: set state.[[IsLoading]] to false and reject the
        //    capability.
        Err(error) => {
            state.0.borrow_mut().is_loading = false;
            let capability = state.0.borrow().capability;
            capability.reject(agent, error.value());
        }
    }
}

/// ### [16.2.1.8.1 FinishLoadingImportedModule ( referrer, specifier, payload, result )](https://tc39.es/ecma262/#sec-FinishLoadingImportedModule)
pub fn finish_loading_imported_module(
    agent: &mut Agent,
    referrer: Referrer,
    specifier: std::string::String,
    payload: LoadPayload,
    result: Result<Module, JsError>,
) {
    // 1. If result is a normal completion: record it in the referrer's
    //    [[LoadedModules]].
    if let Ok(module) = result {
        if let Referrer::Module(referrer) = referrer {
            let specifier = String::from_string(agent, specifier);
            let already_loaded = agent[referrer]
                .cyclic
                .loaded_modules
                .iter()
                .any(|(loaded_specifier, _)| *loaded_specifier == specifier);
            if !already_loaded {
                agent[referrer]
                    .cyclic
                    .loaded_modules
                    .push((specifier, module));
            }
        }
    }
    // 2. If payload is a GraphLoadingState Record, perform
    //    ContinueModuleLoading(payload, result).
    match payload {
        LoadPayload::GraphLoadingState(state) => {
            continue_module_loading(agent, &state, result);
        }
    }
    // 3. Return unused.
}

/// The result of [`resolve_export`].
#[derive(Debug, Clone, Copy)]
pub(crate) enum ResolveExportResult {
    Resolved {
        module: Module,
        /// None means the namespace object itself.
        binding_name: Option<String>,
    },
    Ambiguous,
}

fn get_imported_module(agent: &Agent, module: Module, request: String) -> Module {
    agent[module]
        .cyclic
        .loaded_modules
        .iter()
        .find(|(specifier, _)| *specifier == request)
        .map(|(_, module)| *module)
        .expect("requested module was not loaded")
}

/// ### [16.2.1.6.3 ResolveExport ( exportName \[ , resolveSet \] )](https://tc39.es/ecma262/#sec-resolveexport)
///
/// Walks the re-export graph with a visited set: a circularity returns None
/// (`null`), conflicting star exports return `Ambiguous`.
pub(crate) fn resolve_export(
    agent: &mut Agent,
    module: Module,
    export_name: String,
    resolve_set: &mut Vec<(Module, String)>,
) -> Option<ResolveExportResult> {
    // 1. Assert: module.[[Status]] is not NEW.
    // 2. If resolveSet is not present, let resolveSet be a new empty List.
    // 3. For each Record r of resolveSet: if module and exportName match,
    //    return null (circular import request).
    if resolve_set
        .iter()
        .any(|(visited, name)| *visited == module && *name == export_name)
    {
        return None;
    }
    // 4. Append the Record { [[Module]]: module, [[ExportName]]:
    //    exportName } to resolveSet.
    resolve_set.push((module, export_name));

    // 5. For each ExportEntry Record e of module.[[LocalExportEntries]], do
    let local = agent[module]
        .source_text
        .local_export_entries
        .iter()
        .find(|entry| entry.export_name == Some(export_name))
        .map(|entry| entry.local_name.expect("local exports have local names"));
    if let Some(local_name) = local {
        // a. Return ResolvedBinding Record { [[Module]]: module,
        //    [[BindingName]]: e.[[LocalName]] }.
        return Some(ResolveExportResult::Resolved {
            module,
            binding_name: Some(local_name),
        });
    }

    // 6. For each ExportEntry Record e of
    //    module.[[IndirectExportEntries]], do
    let indirect = agent[module]
        .source_text
        .indirect_export_entries
        .iter()
        .find(|entry| entry.export_name == Some(export_name))
        .map(|entry| {
            (
                entry.module_request.expect("indirect exports have requests"),
                entry.import_name,
            )
        });
    if let Some((module_request, import_name)) = indirect {
        let imported_module = get_imported_module(agent, module, module_request);
        return match import_name {
            // b.ii. If e.[[ImportName]] is ALL: return the namespace binding.
            None => Some(ResolveExportResult::Resolved {
                module: imported_module,
                binding_name: None,
            }),
            // b.iii. Return importedModule.ResolveExport(e.[[ImportName]],
            //        resolveSet).
            Some(ExportImportName::Name(name)) => {
                resolve_export(agent, imported_module, name, resolve_set)
            }
            Some(ExportImportName::AllButDefault) => unreachable!(),
        };
    }

    // 7. If exportName is "default", return null: a default export cannot be
    //    provided by `export *`.
    let default_name = String::from_static_str(agent, "default");
    if export_name == default_name {
        return None;
    }

    // 8. Let starResolution be null.
    let mut star_resolution: Option<ResolveExportResult> = None;
    // 9. For each ExportEntry Record e of module.[[StarExportEntries]], do
    let star_requests: Vec<String> = agent[module]
        .source_text
        .star_export_entries
        .iter()
        .map(|entry| entry.module_request.expect("star exports have requests"))
        .collect();
    for module_request in star_requests {
        // a. Let importedModule be GetImportedModule(module,
        //    e.[[ModuleRequest]]).
        let imported_module = get_imported_module(agent, module, module_request);
        // b. Let resolution be importedModule.ResolveExport(exportName,
        //    resolveSet).
        let resolution = resolve_export(agent, imported_module, export_name, resolve_set);
        match resolution {
            // c. If resolution is AMBIGUOUS, return AMBIGUOUS.
            Some(ResolveExportResult::Ambiguous) => {
                return Some(ResolveExportResult::Ambiguous)
            }
            // d. If resolution is not null, then
            Some(ResolveExportResult::Resolved {
                module: resolved_module,
                binding_name,
            }) => match star_resolution {
                None => {
                    // ii. If starResolution is null, set starResolution to
                    //     resolution.
                    star_resolution = Some(ResolveExportResult::Resolved {
                        module: resolved_module,
                        binding_name,
                    });
                }
                Some(ResolveExportResult::Resolved {
                    module: star_module,
                    binding_name: star_binding,
                }) => {
                    // iii. If the resolutions name different bindings,
                    //      return AMBIGUOUS.
                    let same = star_module == resolved_module
                        && match (star_binding, binding_name) {
                            (None, None) => true,
                            (Some(a), Some(b)) => a == b,
                            _ => false,
                        };
                    if !same {
                        return Some(ResolveExportResult::Ambiguous);
                    }
                }
                Some(ResolveExportResult::Ambiguous) => unreachable!(),
            },
            None => {}
        }
    }
    // 10. Return starResolution.
    star_resolution
}

/// ### [16.2.1.6.2 GetExportedNames ( \[ exportStarSet \] )](https://tc39.es/ecma262/#sec-getexportednames)
pub(crate) fn get_exported_names(
    agent: &mut Agent,
    module: Module,
    export_star_set: &mut Vec<Module>,
) -> Vec<String> {
    // 2. If exportStarSet contains module, return a new empty List.
    if export_star_set.contains(&module) {
        return Vec::new();
    }
    // 3. Append module to exportStarSet.
    export_star_set.push(module);
    let mut exported_names = Vec::new();
    // 5. For each ExportEntry Record e of module.[[LocalExportEntries]] and
    //    [[IndirectExportEntries]]: append e.[[ExportName]].
    for entry in agent[module]
        .source_text
        .local_export_entries
        .iter()
        .chain(agent[module].source_text.indirect_export_entries.iter())
    {
        if let Some(name) = entry.export_name {
            if !exported_names.contains(&name) {
                exported_names.push(name);
            }
        }
    }
    // 7. For each ExportEntry Record e of module.[[StarExportEntries]], do
    let star_requests: Vec<String> = agent[module]
        .source_text
        .star_export_entries
        .iter()
        .map(|entry| entry.module_request.expect("star exports have requests"))
        .collect();
    let default_name = String::from_static_str(agent, "default");
    for module_request in star_requests {
        let imported_module = get_imported_module(agent, module, module_request);
        // b. Let starNames be
        //    requestedModule.GetExportedNames(exportStarSet).
        for name in get_exported_names(agent, imported_module, export_star_set) {
            // c.i. If n is not "default" and exportedNames does not contain
            //      n, append n.
            if name != default_name && !exported_names.contains(&name) {
                exported_names.push(name);
            }
        }
    }
    exported_names
}

/// ### [16.2.1.5.2 Link ( )](https://tc39.es/ecma262/#sec-moduledeclarationlinking)
pub fn link_module(agent: &mut Agent, module: Module) -> JsResult<()> {
    // 1. Assert: module.[[Status]] is one of UNLINKED, LINKED, ...
    // 2. Let stack be a new empty List.
    let mut stack = Vec::new();
    // 3. Let result be Completion(InnerModuleLinking(module, stack, 0)).
    let result = inner_module_linking(agent, module, &mut stack, 0);
    // 4. If result is an abrupt completion, then
    if let Err(error) = result {
        // a. For each Cyclic Module Record m of stack: set m.[[Status]] to
        //    UNLINKED.
        for member in stack {
            let cyclic = &mut agent[member].cyclic;
            cyclic.status = CyclicModuleRecordStatus::Unlinked;
            cyclic.environment = None;
            cyclic.dfs_index = None;
            cyclic.dfs_ancestor_index = None;
        }
        // c. Return ? result.
        return Err(error);
    }
    // 5./6. Assert: module.[[Status]] is LINKED or later; stack is empty.
    Ok(())
}

/// ### [16.2.1.5.2.1 InnerModuleLinking ( module, stack, index )](https://tc39.es/ecma262/#sec-InnerModuleLinking)
fn inner_module_linking(
    agent: &mut Agent,
    module: Module,
    stack: &mut Vec<Module>,
    mut index: u32,
) -> JsResult<u32> {
    // 2. If module.[[Status]] is one of LINKING, LINKED, EVALUATING-ASYNC,
    //    or EVALUATED, return index.
    match agent[module].cyclic.status {
        CyclicModuleRecordStatus::Linking
        | CyclicModuleRecordStatus::Linked
        | CyclicModuleRecordStatus::Evaluating
        | CyclicModuleRecordStatus::Evaluated => return Ok(index),
        CyclicModuleRecordStatus::Unlinked => {}
    }
    // 4. Set module.[[Status]] to LINKING.
    // 5. Set module.[[DFSIndex]] to index.
    // 6. Set module.[[DFSAncestorIndex]] to index.
    {
        let cyclic = &mut agent[module].cyclic;
        cyclic.status = CyclicModuleRecordStatus::Linking;
        cyclic.dfs_index = Some(index);
        cyclic.dfs_ancestor_index = Some(index);
    }
    // 7. Set index to index + 1.
    index += 1;
    // 8. Append module to stack.
    stack.push(module);
    // 9. For each String required of module.[[RequestedModules]], do
    let requested: Vec<String> = agent[module].cyclic.requested_modules.clone();
    for required in requested {
        // a. Let requiredModule be GetImportedModule(module, required).
        let required_module = get_imported_module(agent, module, required);
        // b. Set index to ? InnerModuleLinking(requiredModule, stack,
        //    index).
        index = inner_module_linking(agent, required_module, stack, index)?;
        // c.ii. If requiredModule.[[Status]] is LINKING, set
        //       module.[[DFSAncestorIndex]] to
        //       min(module.[[DFSAncestorIndex]],
        //       requiredModule.[[DFSAncestorIndex]]).
        if agent[required_module].cyclic.status == CyclicModuleRecordStatus::Linking {
            let required_ancestor = agent[required_module]
                .cyclic
                .dfs_ancestor_index
                .expect("linking module has an ancestor index");
            let cyclic = &mut agent[module].cyclic;
            let ancestor = cyclic.dfs_ancestor_index.expect("set above");
            cyclic.dfs_ancestor_index = Some(ancestor.min(required_ancestor));
        }
    }
    // 10. Perform ? module.InitializeEnvironment().
    initialize_environment(agent, module)?;
    // 13. If module.[[DFSAncestorIndex]] = module.[[DFSIndex]], then
    let dfs_index = agent[module].cyclic.dfs_index.expect("set above");
    let ancestor_index = agent[module].cyclic.dfs_ancestor_index.expect("set above");
    if ancestor_index == dfs_index {
        // a. Let done be false. b. Repeat, while done is false: pop the SCC
        //    members and mark them LINKED.
        loop {
            let member = stack.pop().expect("module is on the stack");
            agent[member].cyclic.status = CyclicModuleRecordStatus::Linked;
            if member == module {
                break;
            }
        }
    }
    // 14. Return index.
    Ok(index)
}

/// ### [16.2.1.6.4 InitializeEnvironment ( )](https://tc39.es/ecma262/#sec-source-text-module-record-initialize-environment)
fn initialize_environment(agent: &mut Agent, module: Module) -> JsResult<()> {
    // 1. For each ExportEntry Record e of
    //    module.[[IndirectExportEntries]], do
    let indirect_names: Vec<String> = agent[module]
        .source_text
        .indirect_export_entries
        .iter()
        .filter_map(|entry| entry.export_name)
        .collect();
    for export_name in indirect_names {
        // a. Let resolution be module.ResolveExport(e.[[ExportName]]).
        let resolution = resolve_export(agent, module, export_name, &mut Vec::new());
        // b. If resolution is either null or AMBIGUOUS, throw a SyntaxError
        //    exception.
        if !matches!(resolution, Some(ResolveExportResult::Resolved { .. })) {
            let name = export_name.to_string_lossy(agent).into_owned();
            return Err(agent.throw_exception(
                ExceptionType::SyntaxError,
                format!("Could not resolve re-export {}", name),
            ));
        }
    }

    // 5. Let env be NewModuleEnvironment(realm.[[GlobalEnv]]).
    let realm = agent[module].cyclic.realm;
    let global_env = agent[realm].global_env();
    let env = new_module_environment(agent, Some(EnvironmentIndex::Global(global_env)));
    // 6. Set module.[[Environment]] to env.
    agent[module].cyclic.environment = Some(env);

    // Compute the namespace [[Exports]] now that resolution can succeed:
    // names that resolve unambiguously, sorted lexicographically.
    let candidate_names = get_exported_names(agent, module, &mut Vec::new());
    let mut exports: Vec<String> = candidate_names
        .into_iter()
        .filter(|name| {
            matches!(
                resolve_export(agent, module, *name, &mut Vec::new()),
                Some(ResolveExportResult::Resolved { .. })
            )
        })
        .collect();
    exports.sort_unstable_by(|a, b| {
        crate::ecmascript::abstract_operations::testing_and_comparison::compare_strings(
            agent, *a, *b,
        )
    });
    agent[module].exports = exports.into_boxed_slice();
    module_namespace_create(agent, module);

    // 7. For each ImportEntry Record in of module.[[ImportEntries]], do
    let import_entries: Vec<ImportEntry> =
        agent[module].source_text.import_entries.to_vec();
    for entry in import_entries {
        // a. Let importedModule be GetImportedModule(module,
        //    in.[[ModuleRequest]]).
        let imported_module = get_imported_module(agent, module, entry.module_request);
        match entry.import_name {
            // b. If in.[[ImportName]] is NAMESPACE-OBJECT, then
            ImportName::NamespaceObject => {
                // ii. Perform ! env.CreateImmutableBinding(in.[[LocalName]],
                //     true) and initialize it to the namespace object.
                let record = agent.heap.environments.get_module_environment_mut(env);
                record
                    .declarative
                    .create_immutable_binding(entry.local_name, true);
                record
                    .declarative
                    .initialize_binding(entry.local_name, imported_module.into_value());
            }
            ImportName::Name(import_name) => {
                // c.i. Let resolution be
                //      importedModule.ResolveExport(in.[[ImportName]]).
                let resolution =
                    resolve_export(agent, imported_module, import_name, &mut Vec::new());
                match resolution {
                    Some(ResolveExportResult::Resolved {
                        module: target,
                        binding_name: Some(binding_name),
                    }) => {
                        // c.iv. Perform
                        //       env.CreateImportBinding(in.[[LocalName]],
                        //       resolution.[[Module]],
                        //       resolution.[[BindingName]]).
                        env.create_import_binding(
                            agent,
                            entry.local_name,
                            target,
                            binding_name,
                        );
                    }
                    Some(ResolveExportResult::Resolved {
                        module: target,
                        binding_name: None,
                    }) => {
                        // c.iii. If resolution.[[BindingName]] is NAMESPACE:
                        //        bind the namespace object directly.
                        let record =
                            agent.heap.environments.get_module_environment_mut(env);
                        record
                            .declarative
                            .create_immutable_binding(entry.local_name, true);
                        record
                            .declarative
                            .initialize_binding(entry.local_name, target.into_value());
                    }
                    _ => {
                        // c.ii. If resolution is null or AMBIGUOUS, throw a
                        //       SyntaxError exception.
                        let name = import_name.to_string_lossy(agent).into_owned();
                        return Err(agent.throw_exception(
                            ExceptionType::SyntaxError,
                            format!("Could not resolve import {}", name),
                        ));
                    }
                }
            }
        }
    }

    // 15-24. Instantiate the module's own declarations in env.
    let program = agent[module].source_text.ecmascript_code;
    let source_code = agent[module].source_text.source_code;
    // SAFETY: program is kept alive by the module's SourceCode.
    let body = unsafe { &program.as_ref().body };

    let mut var_declarations = Vec::new();
    var_scoped_declarations(body, &mut var_declarations);
    let mut declared_var_names = Vec::new();
    for declaration in &var_declarations {
        if let VarScopedDeclaration::Variable(declarator) = declaration {
            let mut names = Vec::new();
            binding_pattern_bound_names(&declarator.id, &mut names);
            for name in names {
                let name = String::from_str(agent, name);
                if !declared_var_names.contains(&name) {
                    declared_var_names.push(name);
                    let record = agent.heap.environments.get_module_environment_mut(env);
                    record.declarative.create_mutable_binding(name, false);
                    record
                        .declarative
                        .initialize_binding(name, Value::Undefined);
                }
            }
        }
    }

    let mut lexical = Vec::new();
    lexically_scoped_declarations(body, true, &mut lexical);
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
                    let record = agent.heap.environments.get_module_environment_mut(env);
                    if *is_const {
                        record.declarative.create_immutable_binding(name, true);
                    } else {
                        record.declarative.create_mutable_binding(name, false);
                    }
                }
            }
            LexicallyScopedDeclaration::Class(class) => {
                if let Some(id) = &class.id {
                    let name = String::from_str(agent, id.name.as_str());
                    let record = agent.heap.environments.get_module_environment_mut(env);
                    record.declarative.create_mutable_binding(name, false);
                }
            }
            LexicallyScopedDeclaration::Function(_) => {}
        }
    }

    // Hoisted function declarations initialize to their function objects.
    // Module code is always strict mode code; instantiation runs inside a
    // module context so the functions inherit that strictness.
    agent.execution_context_stack.push(ExecutionContext {
        ecmascript_code: Some(ECMAScriptCodeEvaluationState {
            lexical_environment: EnvironmentIndex::Module(env),
            variable_environment: EnvironmentIndex::Module(env),
            private_environment: None,
            is_strict_mode: true,
            source_code,
        }),
        function: None,
        realm,
        script_or_module: Some(ScriptOrModule::Module(module)),
    });
    for declaration in &var_declarations {
        if let VarScopedDeclaration::Function(function) = declaration {
            let Some(id) = &function.id else { continue };
            let name = String::from_str(agent, id.name.as_str());
            let function_object = instantiate_function_object(
                agent,
                function,
                EnvironmentIndex::Module(env),
                None,
                source_code,
            );
            let record = agent.heap.environments.get_module_environment_mut(env);
            record
                .declarative
                .initialize_or_set_binding(name, function_object.into_value());
        }
    }
    agent.execution_context_stack.pop();

    // The "*default*" binding for `export default` expressions.
    let has_default = body
        .iter()
        .any(|statement| matches!(statement, ast::Statement::ExportDefaultDeclaration(_)));
    if has_default {
        let star_default = String::from_static_str(agent, "*default*");
        let record = agent.heap.environments.get_module_environment_mut(env);
        record.declarative.create_mutable_binding(star_default, false);
    }

    // 25. Return unused.
    Ok(())
}

/// ### [16.2.1.5.3 Evaluate ( )](https://tc39.es/ecma262/#sec-moduleevaluation)
pub fn evaluate_module(
    agent: &mut Agent,
    module: Module,
) -> crate::ecmascript::builtins::promise::Promise {
    // 2. Assert: module.[[Status]] is one of LINKED, EVALUATING-ASYNC, or
    //    EVALUATED.
    // 4. Let capability be ! NewPromiseCapability(%Promise%).
    let capability = PromiseCapability::new(agent);
    // 5. Set module.[[TopLevelCapability]] to capability.
    agent[module].cyclic.top_level_capability = Some(capability);
    // 6. Let result be Completion(InnerModuleEvaluation(module, stack, 0)).
    let mut stack = Vec::new();
    let result = inner_module_evaluation(agent, module, &mut stack, 0);
    match result {
        Ok(_) => {
            // 8. Perform ! Call(capability.[[Resolve]], undefined,
            //    « undefined »).
            capability.resolve(agent, Value::Undefined);
        }
        Err(error) => {
            // 7. If result is an abrupt completion: every stack member
            //    records the same thrown value.
            for member in stack {
                let cyclic = &mut agent[member].cyclic;
                cyclic.status = CyclicModuleRecordStatus::Evaluated;
                cyclic.evaluation_error = Some(error);
            }
            capability.reject(agent, error.value());
        }
    }
    // 9. Return capability.[[Promise]].
    capability.promise()
}

/// ### [16.2.1.5.3.1 InnerModuleEvaluation ( module, stack, index )](https://tc39.es/ecma262/#sec-innermoduleevaluation)
fn inner_module_evaluation(
    agent: &mut Agent,
    module: Module,
    stack: &mut Vec<Module>,
    mut index: u32,
) -> JsResult<u32> {
    match agent[module].cyclic.status {
        CyclicModuleRecordStatus::Evaluated => {
            // 2.c. If module.[[EvaluationError]] is not EMPTY, return
            //      ? module.[[EvaluationError]].
            if let Some(error) = agent[module].cyclic.evaluation_error {
                return Err(error);
            }
            return Ok(index);
        }
        // 3. If module.[[Status]] is EVALUATING, return index.
        CyclicModuleRecordStatus::Evaluating => return Ok(index),
        // 4. Assert: module.[[Status]] is LINKED.
        CyclicModuleRecordStatus::Linked => {}
        _ => unreachable!("module must be linked before evaluation"),
    }
    // 6-8. Set module.[[Status]] to EVALUATING with fresh DFS indexes.
    {
        let cyclic = &mut agent[module].cyclic;
        cyclic.status = CyclicModuleRecordStatus::Evaluating;
        cyclic.dfs_index = Some(index);
        cyclic.dfs_ancestor_index = Some(index);
    }
    // 9. Set index to index + 1.
    index += 1;
    // 10. Append module to stack.
    stack.push(module);
    // 11. For each String required of module.[[RequestedModules]], do
    let requested: Vec<String> = agent[module].cyclic.requested_modules.clone();
    for required in requested {
        let required_module = get_imported_module(agent, module, required);
        index = inner_module_evaluation(agent, required_module, stack, index)?;
        if agent[required_module].cyclic.status == CyclicModuleRecordStatus::Evaluating {
            let required_ancestor = agent[required_module]
                .cyclic
                .dfs_ancestor_index
                .expect("evaluating module has an ancestor index");
            let cyclic = &mut agent[module].cyclic;
            let ancestor = cyclic.dfs_ancestor_index.expect("set above");
            cyclic.dfs_ancestor_index = Some(ancestor.min(required_ancestor));
        }
    }
    // 12. Perform ? module.ExecuteModule().
    execute_module(agent, module)?;
    // 16. If module.[[DFSAncestorIndex]] = module.[[DFSIndex]]: the SCC is
    //     complete and all members become EVALUATED together.
    let dfs_index = agent[module].cyclic.dfs_index.expect("set above");
    let ancestor_index = agent[module].cyclic.dfs_ancestor_index.expect("set above");
    if ancestor_index == dfs_index {
        loop {
            let member = stack.pop().expect("module is on the stack");
            agent[member].cyclic.status = CyclicModuleRecordStatus::Evaluated;
            if member == module {
                break;
            }
        }
    }
    // 17. Return index.
    Ok(index)
}

/// ### [16.2.1.6.5 ExecuteModule ( \[ capability \] )](https://tc39.es/ecma262/#sec-source-text-module-record-execute-module)
fn execute_module(agent: &mut Agent, module: Module) -> JsResult<()> {
    let realm = agent[module].cyclic.realm;
    let source_code = agent[module].source_text.source_code;
    let env = agent[module]
        .cyclic
        .environment
        .expect("module environment was initialized during linking");
    // 1-4. Let moduleContext be a new ECMAScript code execution context.
    let module_context = ExecutionContext {
        ecmascript_code: Some(ECMAScriptCodeEvaluationState {
            // 6. Set the VariableEnvironment and LexicalEnvironment of
            //    moduleContext to module.[[Environment]].
            lexical_environment: EnvironmentIndex::Module(env),
            variable_environment: EnvironmentIndex::Module(env),
            private_environment: None,
            // Module code is always strict mode code.
            is_strict_mode: true,
            source_code,
        }),
        function: None,
        realm,
        // 5. Set the ScriptOrModule of moduleContext to module.
        script_or_module: Some(ScriptOrModule::Module(module)),
    };
    // 8./9. Suspend the running context and push moduleContext.
    agent.execution_context_stack.push(module_context);
    // 10. Let result be Completion(Evaluation of
    //     module.[[ECMAScriptCode]]).
    let executable = match agent[module].source_text.compiled_bytecode {
        Some(executable) => executable,
        None => {
            let executable = Executable::compile_module(agent, module);
            agent[module].source_text.compiled_bytecode = Some(executable);
            executable
        }
    };
    let result = Vm::execute(agent, executable, None).into_js_result();
    // 11. Suspend moduleContext and remove it from the execution context
    //     stack.
    agent.execution_context_stack.pop();
    // 13. Return ? result.
    result.map(|_| ())
}

/// ### [13.3.12.1 Runtime semantics of `import.meta`](https://tc39.es/ecma262/#sec-meta-properties)
pub(crate) fn get_import_meta(
    agent: &mut Agent,
    module: Module,
) -> crate::ecmascript::types::OrdinaryObject {
    // 2. Let importMeta be module.[[ImportMeta]].
    if let Some(import_meta) = agent[module].source_text.import_meta {
        // 4. Return importMeta.
        return import_meta;
    }
    // 3.a. Let importMetaValues be HostGetImportMetaProperties(module).
    let host_hooks = agent.host_hooks;
    let values = host_hooks.get_import_meta_properties(agent, module);
    // 3.b. Let importMeta be OrdinaryObjectCreate(null).
    let import_meta = crate::ecmascript::types::OrdinaryObject::create_object(agent, None, &[]);
    // 3.c. For each Record p of importMetaValues: create the property.
    for (key, value) in values {
        agent[import_meta].define_property(
            key,
            crate::ecmascript::types::PropertyDescriptor::new_data_descriptor(value)
                .into_fully_populated(),
        );
    }
    // 3.d. Perform HostFinalizeImportMeta(importMeta, module).
    host_hooks.finalize_import_meta(agent, import_meta, module);
    // 3.e. Set module.[[ImportMeta]] to importMeta.
    agent[module].source_text.import_meta = Some(import_meta);
    import_meta
}
