// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The evaluator: each function body, script and module compiles once into a
//! flat [`Executable`] of instructions; the [`Vm`] is the execution
//! context's resumable *codeEvaluationState*, suspended at `await` and
//! `yield` and resumed with `resume`, `resume_throw` or `resume_return`.

pub mod compiler;
pub mod executable;
pub mod instructions;
pub mod iterator;
pub mod vm;

pub(crate) use executable::{Executable, ExecutableHeapData, FunctionExpression};
pub(crate) use instructions::{ExceptionTargetKind, Instruction, MethodKind};
pub(crate) use vm::{ExecutionResult, SuspendedVm, Vm};
