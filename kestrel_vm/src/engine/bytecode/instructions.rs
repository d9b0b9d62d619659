// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use oxc_syntax::operator::BinaryOperator;

use crate::ecmascript::execution::agent::ExceptionType;

/// Exception jump targets mark either a catch clause or a finally block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExceptionTargetKind {
    Catch,
    Finally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MethodKind {
    Method,
    Get,
    Set,
}

/// The instruction set of the evaluator.
///
/// Instructions operate on the VM's result register, value stack, reference
/// slot and iterator stack. Jump payloads are instruction indexes patched in
/// by the compiler.
#[derive(Debug, Clone)]
pub(crate) enum Instruction {
    // Result register and value stack plumbing.
    /// Store a constant as the result value.
    LoadConstant(u16),
    /// Pop the stack into the result value.
    Load,
    /// Copy the top of the stack into the result value.
    LoadCopy,
    /// Push the result value onto the stack, clearing it.
    Store,
    /// Push a copy of the result value onto the stack.
    StoreCopy,
    /// Pop the stack; if the result value is empty, it becomes the popped
    /// value. Implements UpdateEmpty for statement completion values.
    UpdateEmpty,
    /// Clear the result value (the EMPTY completion value).
    Empty,
    /// Swap the two topmost stack values.
    Swap,

    // References and bindings.
    /// ResolveBinding(): the identifier becomes the reference slot.
    ResolveBinding(u16),
    /// ResolveThisBinding() as the result value.
    ResolveThisBinding,
    /// GetNewTarget() as the result value.
    GetNewTarget,
    /// GetValue(reference) as the result value, consuming the reference.
    GetValue,
    /// GetValue without consuming the reference slot.
    GetValueKeepReference,
    /// PutValue(reference, result).
    PutValue,
    /// InitializeReferencedBinding(reference, result).
    InitializeReferencedBinding,
    /// Stash the reference slot on the reference stack.
    PushReference,
    /// Restore the topmost stashed reference into the reference slot.
    PopReference,
    /// Drop the topmost stashed reference.
    DiscardReference,
    /// Clear the reference slot.
    ClearReference,
    /// Property reference `result[identifiers[i]]` from the result value.
    EvaluatePropertyAccessWithIdentifierKey(u16),
    /// Property reference with the base on the stack and the key in the
    /// result value.
    EvaluatePropertyAccessWithExpressionKey,
    /// Private reference `result.#identifiers[i]`.
    MakePrivateReference(u16),
    /// Super property reference with an identifier key.
    MakeSuperPropertyReferenceWithIdentifierKey(u16),
    /// Super property reference with the key in the result value.
    MakeSuperPropertyReferenceWithExpressionKey,
    /// CreateMutableBinding(identifiers[i], false) in the running lexical
    /// environment.
    CreateMutableBinding(u16),
    /// CreateImmutableBinding(identifiers[i], true) in the running lexical
    /// environment.
    CreateImmutableBinding(u16),
    /// NewDeclarativeEnvironment over the running lexical environment.
    EnterDeclarativeEnvironment,
    /// Pop back to the outer lexical environment.
    ExitDeclarativeEnvironment,
    /// Bind the caught exception: a fresh environment with
    /// `identifiers[i]` initialized to the result value.
    CreateCatchBinding(u16),

    // Operators.
    ToNumeric,
    ToNumber,
    ToString,
    Typeof,
    /// The `delete` operator applied to the reference slot.
    Delete,
    UnaryMinus,
    BitwiseNot,
    LogicalNot,
    /// x = pop, y = result.
    IsStrictlyEqual,
    IsLooselyEqual,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
    /// ApplyStringOrNumericBinaryOperator(pop, op, result).
    ApplyStringOrNumericBinaryOperator(BinaryOperator),
    InstanceofOperator,
    /// The `in` operator: key = pop, object = result.
    HasProperty,
    /// `#field in result`.
    HasPrivateElement(u16),
    Increment,
    Decrement,

    // Control flow.
    Jump(usize),
    /// Jump when ToBoolean(result) is false.
    JumpIfNot(usize),
    /// Jump when ToBoolean(result) is true.
    JumpIfTrue(usize),
    /// Jump when the result is undefined or null; used by `?.` chains.
    JumpIfNullish(usize),
    /// Jump when the result is not undefined; used by default values.
    JumpIfNotUndefined(usize),
    Return,
    /// Throw the result value.
    Throw,
    /// Throw a freshly created error of the given kind with
    /// `identifiers[i]` as the message.
    ThrowError(ExceptionType, u16),
    PushExceptionJumpTarget(ExceptionTargetKind, usize),
    PopExceptionJumpTarget,
    /// Record a normal completion before jumping into a finally block.
    PushCompletionNormal,
    /// Record a return completion carrying the result value.
    PushCompletionReturn,
    /// Record a break/continue completion that continues at the target.
    PushCompletionJump(usize),
    /// A break or continue crossing `finally_count` finally blocks: unwind
    /// to the innermost one with a jump completion toward the target.
    JumpThroughFinally {
        target: usize,
        finally_count: u16,
    },
    /// Dispatch the completion recorded on entry to the finally block.
    EndFinally,

    // Object, array, function and class construction.
    /// Push a new ordinary object with %Object.prototype%.
    ObjectCreate,
    /// CreateDataPropertyOrThrow(peek, pop, result): the key below the
    /// value.
    ObjectDefineProperty,
    /// Define a method/getter/setter with the key in the result value and
    /// the object on the stack.
    ObjectDefineMethod(u16, MethodKind),
    /// `__proto__:` in an object literal: sets the prototype of the stack
    /// top from the result value.
    ObjectSetPrototype,
    /// Push a new array with the given capacity hint.
    ArrayCreate(u32),
    /// Append the result value to the array on the stack top.
    ArrayPush,
    /// Append a hole to the array on the stack top.
    ArrayElision,
    /// CopyDataProperties(peek, result) with no excluded names.
    CopyDataProperties,
    /// Copy the result value's enumerable own properties into a fresh
    /// object, excluding the given number of keys popped from the stack.
    CopyDataPropertiesIntoObject(u16),
    InstantiateOrdinaryFunctionExpression(u16),
    InstantiateArrowFunctionExpression(u16),
    /// Create a class constructor; see the compiler's class evaluation.
    ClassDefineConstructor {
        function_expression: Option<u16>,
        /// Compiled body for a synthesized default constructor.
        default_constructor_bytecode: Option<u16>,
        has_super: bool,
    },
    /// Define a class method on the prototype or constructor.
    ClassDefineMethod {
        function_expression: u16,
        kind: MethodKind,
        is_static: bool,
    },
    /// Define a private class method, shared across instances.
    ClassDefinePrivateMethod {
        function_expression: u16,
        kind: MethodKind,
        is_static: bool,
        identifier: u16,
    },
    /// Append an instance field definition to the constructor, with the key
    /// in the result value.
    ClassDefineField {
        initializer: Option<u16>,
    },
    /// Append a private instance field definition to the constructor.
    ClassDefinePrivateField {
        identifier: u16,
        initializer: Option<u16>,
    },
    /// Run a static field initializer against the constructor.
    ClassDefineStaticField {
        initializer: Option<u16>,
    },
    /// Create a PrivateEnvironment holding the class's private names,
    /// `identifiers[start..start + count]`.
    EnterClassPrivateEnvironment {
        start: u16,
        count: u16,
    },
    ExitClassPrivateEnvironment,

    // Arguments and parameter binding.
    CreateUnmappedArgumentsObject,
    /// Mapped arguments over the formal names
    /// `identifiers[start..start + count]`.
    CreateMappedArgumentsObject {
        start: u16,
        count: u16,
    },
    /// The nth argument of the current invocation, or undefined.
    ArgumentGet(u16),
    /// The arguments from index n onwards, as an array.
    ArgumentRest(u16),

    // Calls.
    /// Pop argc arguments then the callee; `this` comes from the reference
    /// slot when one is present.
    EvaluateCall(u16),
    /// Like EvaluateCall with the arguments in an array in the result value.
    EvaluateCallWithArgArray,
    /// Pop argc arguments then the constructor.
    EvaluateNew(u16),
    EvaluateNewWithArgArray,
    /// `super(...)` with argc stack arguments.
    EvaluateSuper(u16),
    EvaluateSuperWithArgArray,

    // Iteration.
    /// GetIterator(result, SYNC) onto the iterator stack.
    GetIteratorSync,
    /// GetIterator(result, ASYNC) onto the iterator stack.
    GetIteratorAsync,
    /// Step the active iterator; jump to the target when done, else the
    /// value becomes the result.
    IteratorStepValue(usize),
    /// Step the active iterator; the result is the value or undefined once
    /// exhausted.
    IteratorStepValueOrUndefined,
    /// Collect the remaining iterator values into an array.
    IteratorRestIntoArray,
    /// IteratorClose(active iterator, NormalCompletion) and pop it.
    IteratorClose,
    /// Pop the active iterator without closing.
    PopIterator,
    /// EnumerateObjectProperties(result) for `for-in`.
    EnumerateObjectProperties,

    // Suspension.
    Await,
    Yield,

    // Modules.
    ImportMeta,
    /// Concatenate the n topmost stack strings with the result string.
    StringConcat(u16),
}
