// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A SourceCode record owns a parsed program: the source string, the arena
//! allocator, and the `Program` allocated inside it. Functions keep
//! references into the AST; those references stay valid for as long as the
//! SourceCode is reachable, which the mark traversal guarantees by treating
//! it as part of every function that points into it.

use core::ptr::NonNull;

use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_diagnostics::OxcDiagnostic;
use oxc_parser::{Parser, ParserReturn};
use oxc_span::SourceType;

use crate::ecmascript::execution::Agent;
use crate::heap::indexes::BaseIndex;
use crate::heap::mark::{HeapMark, WorkQueues};

pub(crate) type SourceCode = BaseIndex<SourceCodeHeapData>;

#[derive(Debug)]
pub struct SourceCodeHeapData {
    /// The source text. Boxed so that `&str` references into it remain valid
    /// while the heap vector grows.
    source: Box<str>,
    /// SAFETY: The program points into `allocator` and `source`; it is
    /// dropped before them.
    program: NonNull<Program<'static>>,
    allocator: NonNull<Allocator>,
}

impl Drop for SourceCodeHeapData {
    fn drop(&mut self) {
        // SAFETY: The program is dropped before the allocator it borrows
        // from; nothing else refers to either by the time heap data drops.
        unsafe {
            drop(Box::from_raw(self.program.as_ptr()));
            drop(Box::from_raw(self.allocator.as_ptr()));
        }
    }
}

impl SourceCodeHeapData {
    pub(crate) fn get_program(&self) -> NonNull<Program<'static>> {
        self.program
    }

    pub(crate) fn source_text(&self) -> &str {
        &self.source
    }
}

impl SourceCode {
    /// Parses the given source string, returning the heap-owned SourceCode
    /// record and a pointer to its Program.
    pub(crate) fn parse_source(
        agent: &mut Agent,
        source: &str,
        source_type: SourceType,
    ) -> Result<(SourceCode, NonNull<Program<'static>>), Vec<OxcDiagnostic>> {
        let source: Box<str> = source.into();
        // SAFETY: The allocator and source are kept alive by the heap data
        // created below; the parser borrows both only for the lifetime of
        // the Program, which is dropped first.
        let allocator = NonNull::from(Box::leak(Box::new(Allocator::default())));
        let source_ref: &'static str =
            unsafe { core::mem::transmute::<&str, &'static str>(&source) };
        let parser = Parser::new(unsafe { allocator.as_ref() }, source_ref, source_type);
        let ParserReturn {
            errors, program, ..
        } = parser.parse();
        if !errors.is_empty() {
            #[allow(clippy::drop_non_drop)]
            drop(program);
            // SAFETY: No references into the allocator remain.
            unsafe { drop(Box::from_raw(allocator.as_ptr())) };
            return Err(errors);
        }
        // SAFETY: The Program's internal references are valid for as long as
        // the allocator lives; the heap data upholds the drop order.
        let program = unsafe {
            core::mem::transmute::<NonNull<Program>, NonNull<Program<'static>>>(NonNull::from(
                Box::leak(Box::new(program)),
            ))
        };
        agent.heap.source_codes.push(Some(SourceCodeHeapData {
            source,
            program,
            allocator,
        }));
        Ok((SourceCode::last(&agent.heap.source_codes), program))
    }

    pub(crate) fn source_text(self, agent: &Agent) -> &str {
        agent
            .heap
            .source_codes
            .get(self.into_index())
            .expect("SourceCode out of bounds")
            .as_ref()
            .expect("SourceCode slot empty")
            .source_text()
    }
}

impl core::ops::Index<SourceCode> for Agent {
    type Output = SourceCodeHeapData;

    fn index(&self, index: SourceCode) -> &Self::Output {
        self.heap
            .source_codes
            .get(index.into_index())
            .expect("SourceCode out of bounds")
            .as_ref()
            .expect("SourceCode slot empty")
    }
}

impl HeapMark for SourceCode {
    fn mark_values(&self, queues: &mut WorkQueues) {
        queues.source_codes.push(*self);
    }
}
