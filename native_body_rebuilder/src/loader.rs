//! Summary-IR document loading and the module registry.
//!
//! One document is one JSON file describing one native shared library.
//! Loading is forgiving at the batch level: a file that cannot be read or
//! parsed is skipped with a warning and the batch continues. Inside a
//! document, a function whose constant tokens are malformed is dropped with
//! a warning; an instruction with an unknown `type` discriminator is
//! dropped with a warning.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;

use crate::diagnostics::{emit, DiagnosticReason};
use crate::summary::{
    CallInst, FunctionDoc, Inst, InstDoc, ModuleDoc, RetTable, SummaryFunction, SummaryModule,
    ValueTable,
};

/// A document-level load failure. Function- and instruction-level problems
/// never surface here; they are reported through diagnostics.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {message}")]
    Io { path: String, message: String },

    #[error("cannot parse '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Load one summary document from disk.
pub fn load_file(path: &Path) -> Result<SummaryModule, LoadError> {
    let text = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    load_str(&text, &path.display().to_string())
}

/// Load one summary document from an in-memory string. `origin` names the
/// document in parse errors.
pub fn load_str(text: &str, origin: &str) -> Result<SummaryModule, LoadError> {
    let doc: ModuleDoc = serde_json::from_str(text).map_err(|e| LoadError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })?;
    Ok(build_module(doc))
}

fn build_module(doc: ModuleDoc) -> SummaryModule {
    let mut functions = Vec::new();
    for func_doc in &doc.functions {
        match build_function(func_doc) {
            Ok(func) => functions.push(func),
            Err(token) => {
                emit(DiagnosticReason::MalformedConstant(
                    func_doc.name.clone(),
                    token,
                ));
            }
        }
    }
    SummaryModule::new(doc.hap_name, doc.so_name, doc.module_name, functions)
}

/// Build one function, interning every token. A malformed constant token
/// fails the whole function; the offending token is returned.
fn build_function(doc: &FunctionDoc) -> Result<SummaryFunction, String> {
    let mut values = ValueTable::new();

    let mut params: BTreeMap<usize, crate::summary::ValueRef> = BTreeMap::new();
    for (key, decl_ty) in &doc.params {
        if let Ok(pos) = key.parse::<usize>() {
            params.insert(pos, values.intern_parameter(key, decl_ty));
        }
    }

    let mut insts = Vec::new();
    for inst_doc in &doc.instructions {
        // A None here is a dropped instruction, already reported.
        if let Some(inst) = build_inst(&doc.name, inst_doc, &mut values)? {
            insts.push(inst);
        }
    }

    Ok(SummaryFunction::new(
        doc.name.clone(),
        params,
        insts,
        values,
    ))
}

fn intern(values: &mut ValueTable, token: &str) -> Result<crate::summary::ValueRef, String> {
    values.intern(token).map_err(|m| m.0)
}

fn build_inst(
    func_name: &str,
    doc: &InstDoc,
    values: &mut ValueTable,
) -> Result<Option<Inst>, String> {
    match doc.kind.as_str() {
        "Call" => {
            let (Some(target), Some(operand_tokens)) = (&doc.target, &doc.operands) else {
                emit(DiagnosticReason::UnknownInstructionKind(
                    func_name.to_string(),
                    format!("{} (missing fields)", doc.kind),
                ));
                return Ok(None);
            };

            let mut operands = Vec::with_capacity(operand_tokens.len());
            for token in operand_tokens {
                operands.push(intern(values, token)?);
            }

            let args_operands = match &doc.argsoperands {
                Some(tokens) => {
                    let mut tail = Vec::with_capacity(tokens.len());
                    for token in tokens {
                        tail.push(intern(values, token)?);
                    }
                    Some(tail)
                }
                None => None,
            };

            let mut rets = RetTable::new();
            if let Some(ret_map) = &doc.rets {
                for (var_token, tag) in ret_map {
                    rets.insert(tag, intern(values, var_token)?);
                }
            }

            Ok(Some(Inst::Call(CallInst {
                callsite: doc.callsite.clone().unwrap_or_default(),
                target: target.clone(),
                operands,
                args_operands,
                rets,
            })))
        }
        "Ret" => {
            let Some(operand) = &doc.operand else {
                emit(DiagnosticReason::UnknownInstructionKind(
                    func_name.to_string(),
                    format!("{} (missing operand)", doc.kind),
                ));
                return Ok(None);
            };
            Ok(Some(Inst::Ret {
                operand: intern(values, operand)?,
            }))
        }
        "Phi" => {
            let (Some(ret), Some(operand_tokens)) = (&doc.ret, &doc.operands) else {
                emit(DiagnosticReason::UnknownInstructionKind(
                    func_name.to_string(),
                    format!("{} (missing fields)", doc.kind),
                ));
                return Ok(None);
            };
            let mut operands = Vec::with_capacity(operand_tokens.len());
            for token in operand_tokens {
                operands.push(intern(values, token)?);
            }
            Ok(Some(Inst::Phi {
                ret: intern(values, ret)?,
                operands,
            }))
        }
        other => {
            emit(DiagnosticReason::UnknownInstructionKind(
                func_name.to_string(),
                other.to_string(),
            ));
            Ok(None)
        }
    }
}

/// Registry of loaded modules, keyed by logical module name. Insertion
/// order is preserved; duplicate names warn and keep the later module.
#[derive(Debug, Default)]
pub struct SummaryStore {
    modules: IndexMap<String, SummaryModule>,
}

impl SummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: SummaryModule) {
        let name = module.module_name().to_string();
        if self.modules.contains_key(&name) {
            emit(DiagnosticReason::DuplicateModule(name.clone()));
        }
        self.modules.insert(name, module);
    }

    pub fn get(&self, name: &str) -> Option<&SummaryModule> {
        self.modules.get(name)
    }

    /// Resolve a library name from an import source. Tries the exact name
    /// first, then the `lib`-prefix-stripped form, so an import of
    /// `libentry.so` finds a module named either `libentry` or `entry`.
    pub fn resolve(&self, library: &str) -> Option<&SummaryModule> {
        if let Some(module) = self.modules.get(library) {
            return Some(module);
        }
        library
            .strip_prefix("lib")
            .and_then(|stripped| self.modules.get(stripped))
    }

    pub fn modules(&self) -> impl Iterator<Item = &SummaryModule> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Load every `*.json` document in a directory, in name order. Files
    /// that fail to read or parse are skipped with a warning.
    pub fn load_dir(&mut self, dir: &Path) -> Result<(), LoadError> {
        let entries = fs::read_dir(dir).map_err(|e| LoadError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            match load_file(&path) {
                Ok(module) => self.insert(module),
                Err(e) => {
                    emit(DiagnosticReason::DocumentSkipped(
                        path.display().to_string(),
                        e.to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
