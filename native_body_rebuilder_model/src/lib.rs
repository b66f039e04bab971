//! Host object model for the native body rebuilder.
//!
//! This crate carries the analyzer-side representation of a host program:
//! files with their import declarations, classes, methods, method bodies
//! (locals plus a CFG of three-address statements), values, types, and
//! signatures. The rebuilder core reads the model to discover cross-language
//! call sites and mutates it to attach the synthetic methods it mints.
//!
//! # Module Organization
//!
//! - `types`: the host type lattice carrier (`Type`)
//! - `signatures`: file/namespace/class/field/method signatures
//! - `value`: locals, constants, right-hand-side expressions, invokes
//! - `stmt`: three-address statements
//! - `cfg`: basic blocks, CFG, method bodies
//! - `imports`: import declarations
//! - `model`: files, classes, methods, and the whole-program container
//! - `error`: model mutation errors

// Library code reports failures through Result values; only binaries may
// print to stderr.
#![deny(clippy::print_stderr)]

pub mod cfg;
pub mod error;
pub mod imports;
pub mod model;
pub mod signatures;
pub mod stmt;
pub mod types;
pub mod value;

pub use cfg::{BasicBlock, Body, Cfg};
pub use error::ModelError;
pub use imports::{ImportDecl, ImportKind};
pub use model::{Class, File, Method, Model};
pub use signatures::{
    ClassSignature, FieldSignature, FileSignature, MethodParameter, MethodSignature,
    MethodSubSignature, NamespaceSignature,
};
pub use stmt::{LValue, Stmt};
pub use types::Type;
pub use value::{Constant, Expr, InvokeExpr, Local, LocalRef, Value};
