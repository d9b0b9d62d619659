// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::ptr::NonNull;

use oxc_ast::ast::Program;

use crate::ecmascript::builtins::control_abstraction_objects::promise_objects::promise_abstract_operations::promise_capability_records::PromiseCapability;
use crate::ecmascript::builtins::module::Module;
use crate::ecmascript::execution::agent::JsError;
use crate::ecmascript::execution::environments::ModuleEnvironmentIndex;
use crate::ecmascript::execution::RealmIdentifier;
use crate::ecmascript::scripts_and_modules::source_code::SourceCode;
use crate::ecmascript::types::{OrdinaryObject, String};
use crate::engine::Executable;
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [16.2.1.4 Cyclic Module Record status](https://tc39.es/ecma262/#sec-cyclic-module-records)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CyclicModuleRecordStatus {
    Unlinked,
    Linking,
    Linked,
    Evaluating,
    Evaluated,
}

/// ### [16.2.2.2 ImportEntry Records](https://tc39.es/ecma262/#table-importentry-record-fields)
#[derive(Debug, Clone)]
pub(crate) struct ImportEntry {
    /// \[\[ModuleRequest]]
    pub(crate) module_request: String,
    /// \[\[ImportName]]
    pub(crate) import_name: ImportName,
    /// \[\[LocalName]]
    pub(crate) local_name: String,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ImportName {
    Name(String),
    /// `import * as ns from "..."`
    NamespaceObject,
}

/// ### [16.2.3.2 ExportEntry Records](https://tc39.es/ecma262/#table-exportentry-records)
#[derive(Debug, Clone)]
pub(crate) struct ExportEntry {
    /// \[\[ExportName]]
    pub(crate) export_name: Option<String>,
    /// \[\[ModuleRequest]]
    pub(crate) module_request: Option<String>,
    /// \[\[ImportName]]
    pub(crate) import_name: Option<ExportImportName>,
    /// \[\[LocalName]]
    pub(crate) local_name: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum ExportImportName {
    Name(String),
    /// `export * from "..."` re-exports.
    AllButDefault,
}

/// The Cyclic Module Record fields of 16.2.1.4.
#[derive(Debug)]
pub(crate) struct CyclicModuleRecord {
    /// \[\[Realm]]
    pub(crate) realm: RealmIdentifier,
    /// \[\[Environment]]
    pub(crate) environment: Option<ModuleEnvironmentIndex>,
    /// \[\[Status]]
    pub(crate) status: CyclicModuleRecordStatus,
    /// \[\[EvaluationError]]
    pub(crate) evaluation_error: Option<JsError>,
    /// \[\[DFSIndex]]
    pub(crate) dfs_index: Option<u32>,
    /// \[\[DFSAncestorIndex]]
    pub(crate) dfs_ancestor_index: Option<u32>,
    /// \[\[RequestedModules]]
    pub(crate) requested_modules: Vec<String>,
    /// \[\[LoadedModules]]
    pub(crate) loaded_modules: Vec<(String, Module)>,
    /// \[\[TopLevelCapability]]
    pub(crate) top_level_capability: Option<PromiseCapability>,
}

/// The Source Text Module Record fields of 16.2.1.6.
#[derive(Debug)]
pub(crate) struct SourceTextModuleData {
    /// \[\[ECMAScriptCode]]
    ///
    /// SAFETY: Kept alive by `source_code`; never accessed mutably.
    pub(crate) ecmascript_code: NonNull<Program<'static>>,
    pub(crate) source_code: SourceCode,
    pub(crate) compiled_bytecode: Option<Executable>,
    /// \[\[ImportEntries]]
    pub(crate) import_entries: Box<[ImportEntry]>,
    /// \[\[LocalExportEntries]]
    pub(crate) local_export_entries: Box<[ExportEntry]>,
    /// \[\[IndirectExportEntries]]
    pub(crate) indirect_export_entries: Box<[ExportEntry]>,
    /// \[\[StarExportEntries]]
    pub(crate) star_export_entries: Box<[ExportEntry]>,
    /// \[\[ImportMeta]]
    pub(crate) import_meta: Option<OrdinaryObject>,
}

#[derive(Debug)]
pub struct ModuleHeapData {
    /// Backing object of the module namespace exotic object.
    pub(crate) object_index: Option<OrdinaryObject>,
    /// \[\[Exports]] of the namespace: sorted lexicographically.
    pub(crate) exports: Box<[String]>,
    pub(crate) cyclic: CyclicModuleRecord,
    pub(crate) source_text: SourceTextModuleData,
    /// \[\[HostDefined]]: the resolved specifier of this module.
    pub(crate) specifier: String,
}

impl HeapMark for ModuleHeapData {
    fn mark_values(&self, queues: &mut WorkQueues) {
        self.object_index.mark_values(queues);
        self.exports.mark_values(queues);
        queues.realms.push(self.cyclic.realm);
        if let Some(environment) = self.cyclic.environment {
            queues.module_environments.push(environment);
        }
        for specifier in &self.cyclic.requested_modules {
            specifier.mark_values(queues);
        }
        for (specifier, module) in &self.cyclic.loaded_modules {
            specifier.mark_values(queues);
            module.mark_values(queues);
        }
        if let Some(capability) = self.cyclic.top_level_capability {
            capability.mark_values(queues);
        }
        self.source_text.source_code.mark_values(queues);
        if let Some(executable) = self.source_text.compiled_bytecode {
            queues.executables.push(executable);
        }
        self.specifier.mark_values(queues);
    }
}
