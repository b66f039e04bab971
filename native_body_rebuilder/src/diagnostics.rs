//! Diagnostics for the rebuild passes.
//!
//! Every recoverable condition in the rebuilder (duplicate module names,
//! malformed tokens, unresolved call targets, inference widening, …) is
//! reported here instead of being printed. The collector is thread-local
//! and disabled by default; the pipeline enables it for the duration of a
//! rebuild and drains it into the published outcome.
//!
//! # Usage
//!
//! - `DiagnosticsCollector::enable()` / `disable()` - toggle collection
//! - `DiagnosticsCollector::take()` - retrieve and clear collected entries
//! - `emit_*` - record one diagnostic (no-op while disabled)

use std::cell::RefCell;
use std::fmt;

/// Why the rebuilder warned.
#[derive(Clone, Debug, PartialEq)]
pub enum DiagnosticReason {
    /// A summary document could not be read or parsed; the batch skipped it.
    /// Contains (path, message).
    DocumentSkipped(String, String),

    /// Two loaded documents share a logical module name; the later one wins.
    DuplicateModule(String),

    /// An instruction with an unrecognized `type` discriminator was dropped.
    /// Contains (function, discriminator).
    UnknownInstructionKind(String, String),

    /// A `long`/`char*` constant token failed to parse; the enclosing
    /// function was dropped. Contains (function, token).
    MalformedConstant(String, String),

    /// A pointer invoke carried no extractable name and its module exports
    /// more than one function; the call site was skipped.
    AmbiguousPointerTarget(String),

    /// No declared signature was found for an exported function; one was
    /// synthesized from the call-site argument count.
    SignatureLookupMiss(String),

    /// A call-site argument type was Unknown; the parameter defaulted to
    /// String. Contains (method, parameter index).
    UnknownArgumentType(String, usize),

    /// A call had fewer operands than its handler expects; nothing was
    /// emitted. Contains (target, expected, got).
    OperandShortfall(String, usize, usize),

    /// The inference worklist hit its pass cap before reaching a fixpoint.
    InferenceCapReached(String),

    /// A value was still Unknown after inference and was forced to Any.
    UnknownForcedToAny(String),

    /// Two incompatible concrete types were joined; the result widened to
    /// Any. Contains (left, right).
    IncompatibleJoin(String, String),

    /// A call targeted a symbol with no registered handler; nothing was
    /// emitted.
    UnknownCallTarget(String),

    /// A return operand could not be resolved to a host local; a void
    /// return was emitted instead.
    UnresolvedReturnOperand(String),

    /// The statement recorded for a call site no longer matches the
    /// resolved invoke; the in-place rewrite was skipped.
    StatementReplacementMismatch(String),
}

impl fmt::Display for DiagnosticReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticReason::DocumentSkipped(path, msg) => {
                write!(f, "skipped summary document '{}': {}", path, msg)
            }
            DiagnosticReason::DuplicateModule(name) => {
                write!(f, "duplicate module name '{}', keeping the later one", name)
            }
            DiagnosticReason::UnknownInstructionKind(func, kind) => {
                write!(f, "dropped instruction of unknown type '{}' in '{}'", kind, func)
            }
            DiagnosticReason::MalformedConstant(func, token) => {
                write!(f, "malformed constant token '{}', dropping function '{}'", token, func)
            }
            DiagnosticReason::AmbiguousPointerTarget(module) => {
                write!(
                    f,
                    "pointer invoke into '{}' has no recoverable target name",
                    module
                )
            }
            DiagnosticReason::SignatureLookupMiss(name) => {
                write!(f, "no declared signature for '{}', synthesizing one", name)
            }
            DiagnosticReason::UnknownArgumentType(method, index) => {
                write!(
                    f,
                    "argument {} of '{}' has unknown type, defaulting to string",
                    index, method
                )
            }
            DiagnosticReason::OperandShortfall(target, expected, got) => {
                write!(
                    f,
                    "'{}' expects {} operands but got {}",
                    target, expected, got
                )
            }
            DiagnosticReason::InferenceCapReached(func) => {
                write!(f, "type inference for '{}' hit the pass cap", func)
            }
            DiagnosticReason::UnknownForcedToAny(value) => {
                write!(f, "'{}' still unknown after inference, forcing any", value)
            }
            DiagnosticReason::IncompatibleJoin(a, b) => {
                write!(f, "incompatible types {} and {} joined to any", a, b)
            }
            DiagnosticReason::UnknownCallTarget(target) => {
                write!(f, "no handler for call target '{}'", target)
            }
            DiagnosticReason::UnresolvedReturnOperand(func) => {
                write!(f, "unresolved return operand in '{}', emitting void return", func)
            }
            DiagnosticReason::StatementReplacementMismatch(method) => {
                write!(f, "statement no longer matches resolved invoke for '{}'", method)
            }
        }
    }
}

thread_local! {
    static COLLECTOR: RefCell<Collector> = const { RefCell::new(Collector { enabled: false, entries: Vec::new() }) };
}

#[derive(Debug)]
struct Collector {
    enabled: bool,
    entries: Vec<DiagnosticReason>,
}

/// Handle to the thread-local diagnostics state.
#[derive(Debug)]
pub struct DiagnosticsCollector;

impl DiagnosticsCollector {
    pub fn enable() {
        COLLECTOR.with(|c| c.borrow_mut().enabled = true);
    }

    pub fn disable() {
        COLLECTOR.with(|c| c.borrow_mut().enabled = false);
    }

    /// Retrieve and clear all collected diagnostics.
    pub fn take() -> Vec<DiagnosticReason> {
        COLLECTOR.with(|c| std::mem::take(&mut c.borrow_mut().entries))
    }
}

pub(crate) fn emit(reason: DiagnosticReason) {
    COLLECTOR.with(|c| {
        let mut c = c.borrow_mut();
        if c.enabled {
            c.entries.push(reason);
        }
    });
}
