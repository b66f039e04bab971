//! Rebuilds synthetic host-language method bodies for native (Node-API)
//! functions, so whole-program analyses can follow data flow through
//! otherwise opaque native code.
//!
//! Inputs: a host program in the object model of
//! [`native_body_rebuilder_model`], and one summary-IR document per native
//! shared library. Output: synthetic methods attached to synthesized
//! classes and files inside the model, with the original call sites rebound
//! to them.
//!
//! The pipeline, leaves first: the summary IR and its loader, the binding
//! declaration indexer, the cross-language call resolver, rule-table-driven
//! type inference, IR-to-host lowering, and the synthetic-method assembler.

// Library code reports failures through Result values and the diagnostics
// collector; only binaries may print to stderr.
#![deny(clippy::print_stderr)]

pub mod api;
pub mod assemble;
pub mod declarations;
pub mod diagnostics;
pub mod infer;
pub mod loader;
pub mod lower;
pub mod naming;
pub mod pipeline;
pub mod resolve;
pub mod stats;
pub mod summary;

pub use api::{load_summary_dir, rebuild_native_bodies, rebuild_native_bodies_with};
pub use diagnostics::{DiagnosticReason, DiagnosticsCollector};
pub use loader::{load_file, load_str, LoadError, SummaryStore};
pub use pipeline::{NativeBodyRebuilder, RebuildConfig, RebuildOutcome};
pub use stats::RebuildStats;
