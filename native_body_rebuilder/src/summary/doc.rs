//! The on-disk summary-IR document shape.
//!
//! One document describes one native shared library. The same structs back
//! both loading and re-serialization, so a loaded module round-trips to its
//! document form.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level document: one per native shared library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDoc {
    pub hap_name: String,
    pub so_name: String,
    pub module_name: String,
    #[serde(default)]
    pub functions: Vec<FunctionDoc>,
}

/// One exported function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDoc {
    pub name: String,
    /// Positional string key → declared type string.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    #[serde(default)]
    pub instructions: Vec<InstDoc>,
}

/// One instruction, discriminated by `type`. Fields not applicable to the
/// discriminator are absent; unknown discriminators are dropped with a
/// warning at build time rather than failing the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstDoc {
    #[serde(rename = "type")]
    pub kind: String,

    // Call fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argsoperands: Option<Vec<String>>,
    /// Return-variable token → index tag, in document order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rets: Option<IndexMap<String, String>>,

    // Ret field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operand: Option<String>,

    // Phi field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ret: Option<String>,
}

impl InstDoc {
    pub fn call(
        callsite: impl Into<String>,
        target: impl Into<String>,
        operands: Vec<String>,
        argsoperands: Option<Vec<String>>,
        rets: IndexMap<String, String>,
    ) -> Self {
        Self {
            kind: "Call".to_string(),
            callsite: Some(callsite.into()),
            target: Some(target.into()),
            operands: Some(operands),
            argsoperands,
            rets: Some(rets),
            operand: None,
            ret: None,
        }
    }

    pub fn ret(operand: impl Into<String>) -> Self {
        Self {
            kind: "Ret".to_string(),
            callsite: None,
            target: None,
            operands: None,
            argsoperands: None,
            rets: None,
            operand: Some(operand.into()),
            ret: None,
        }
    }

    pub fn phi(ret: impl Into<String>, operands: Vec<String>) -> Self {
        Self {
            kind: "Phi".to_string(),
            callsite: None,
            target: None,
            operands: Some(operands),
            argsoperands: None,
            rets: None,
            operand: None,
            ret: Some(ret.into()),
        }
    }
}
