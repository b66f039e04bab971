//! Whole-program call-site discovery and resolution.
//!
//! One scan over every method body of every host file. Imports (and
//! run-time loads) feed the per-file alias tables; every statement that
//! contains an invoke is then classified against them.

use once_cell::sync::Lazy;
use regex::Regex;

use indexmap::IndexMap;

use native_body_rebuilder_model::{
    Constant, Expr, FileSignature, InvokeExpr, LValue, Method, MethodSubSignature, Model, Stmt,
    Value,
};

use crate::declarations::DeclaredSignatures;
use crate::diagnostics::{emit, DiagnosticReason};
use crate::loader::SummaryStore;
use crate::naming::{native_library_of, DYNAMIC_LOADER};

use super::aliases::AliasTables;

/// Which host call form the invoke took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    Instance,
    Static,
    Ptr,
}

/// One resolved cross-language call site.
#[derive(Debug)]
pub struct ResolvedCallSite {
    pub file: FileSignature,
    pub class: String,
    pub method: String,
    /// Position of the statement inside the method body.
    pub block: usize,
    pub stmt: usize,
    pub kind: InvokeKind,
    /// Clone of the resolved invoke, kept for identity verification when
    /// the original statement is rewritten.
    pub invoke: InvokeExpr,
    /// Library name as stripped from the import source.
    pub library: String,
    pub exported: String,
    pub declared: Option<MethodSubSignature>,
}

/// Resolved call sites bucketed per library, in discovery order.
#[derive(Debug, Default)]
pub struct ResolvedCallSites {
    by_library: IndexMap<String, Vec<ResolvedCallSite>>,
}

impl ResolvedCallSites {
    fn push(&mut self, site: ResolvedCallSite) {
        self.by_library
            .entry(site.library.clone())
            .or_default()
            .push(site);
    }

    pub fn libraries(&self) -> impl Iterator<Item = (&String, &Vec<ResolvedCallSite>)> {
        self.by_library.iter()
    }

    pub fn for_library(&self, library: &str) -> &[ResolvedCallSite] {
        self.by_library
            .get(library)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedCallSite> {
        self.by_library.values().flatten()
    }

    pub fn total(&self) -> usize {
        self.by_library.values().map(Vec::len).sum()
    }

    /// Call-site counts per invoke variant: (instance, static, pointer).
    pub fn counts_by_kind(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for site in self.iter() {
            match site.kind {
                InvokeKind::Instance => counts.0 += 1,
                InvokeKind::Static => counts.1 += 1,
                InvokeKind::Ptr => counts.2 += 1,
            }
        }
        counts
    }
}

/// Scan the whole model and resolve every cross-language call site.
pub fn resolve_call_sites(
    model: &Model,
    declared: &DeclaredSignatures,
    store: &SummaryStore,
) -> ResolvedCallSites {
    let mut out = ResolvedCallSites::default();

    for file in model.files() {
        let mut tables = AliasTables::from_imports(file.imports());

        // Run-time loads anywhere in the file extend the dynamic table
        // before any call site in the file is classified.
        for class in file.classes() {
            for method in class.methods() {
                collect_dynamic_aliases(method, &mut tables);
            }
        }

        if tables.is_empty() {
            continue;
        }

        for class in file.classes() {
            for method in class.methods() {
                let Some(body) = method.body() else {
                    continue;
                };
                for (block_idx, block) in body.cfg.blocks.iter().enumerate() {
                    for (stmt_idx, stmt) in block.stmts.iter().enumerate() {
                        let Some(invoke) = stmt.invoke() else {
                            continue;
                        };
                        let Some((library, exported, kind)) =
                            classify_invoke(invoke, &tables, store)
                        else {
                            continue;
                        };
                        let declared_sub = declared.lookup(&library, &exported).cloned();
                        out.push(ResolvedCallSite {
                            file: file.sig().clone(),
                            class: class.name().to_string(),
                            method: method.name().to_string(),
                            block: block_idx,
                            stmt: stmt_idx,
                            kind,
                            invoke: invoke.clone(),
                            library,
                            exported,
                            declared: declared_sub,
                        });
                    }
                }
            }
        }
    }

    out
}

/// Record `x = loadNativeModule("lib…")` statements as dynamic aliases.
fn collect_dynamic_aliases(method: &Method, tables: &mut AliasTables) {
    let Some(body) = method.body() else {
        return;
    };
    for block in &body.cfg.blocks {
        for stmt in &block.stmts {
            let Stmt::Assign {
                lhs: LValue::Local(local),
                rhs: Expr::Invoke(InvokeExpr::Static { method: callee, args }),
            } = stmt
            else {
                continue;
            };
            if callee.name() != DYNAMIC_LOADER {
                continue;
            }
            let Some(Value::Constant(Constant::Str(source))) = args.first() else {
                continue;
            };
            let library = native_library_of(source).unwrap_or(source.as_str());
            tables.record_dynamic(local.name(), library);
        }
    }
}

fn classify_invoke(
    invoke: &InvokeExpr,
    tables: &AliasTables,
    store: &SummaryStore,
) -> Option<(String, String, InvokeKind)> {
    match invoke {
        InvokeExpr::Instance { base, .. } => {
            let base_name = base.name();
            if let Some(library) = tables.module_library(base_name) {
                return Some((
                    library.to_string(),
                    invoke.name().to_string(),
                    InvokeKind::Instance,
                ));
            }
            // A named import materializing as an instance invoke: legal,
            // the alias's original export is the target.
            if let Some(alias) = tables.named(base_name) {
                return Some((
                    alias.library.clone(),
                    alias.exported.clone(),
                    InvokeKind::Instance,
                ));
            }
            None
        }
        InvokeExpr::Static { .. } => {
            if invoke.name() == DYNAMIC_LOADER {
                return None;
            }
            let alias = tables.named(invoke.name())?;
            Some((
                alias.library.clone(),
                alias.exported.clone(),
                InvokeKind::Static,
            ))
        }
        InvokeExpr::Ptr { func, .. } => {
            let local_name = func.name();
            if let Some(alias) = tables.named(local_name) {
                return Some((alias.library.clone(), alias.exported.clone(), InvokeKind::Ptr));
            }
            let library = tables.module_library(local_name)?.to_string();
            let exported = recover_pointer_target(invoke, &library, store)?;
            Some((library, exported, InvokeKind::Ptr))
        }
    }
}

static LEADING_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*)\s*\(")
        .expect("leading call pattern")
});

/// Recover the exported name behind a synthetic pointer-invoke token
/// (`%AM0`): take the real name if the front end kept one, otherwise scan
/// the invoke text for the identifier preceding `(`, otherwise default to
/// the module's sole export.
fn recover_pointer_target(
    invoke: &InvokeExpr,
    library: &str,
    store: &SummaryStore,
) -> Option<String> {
    let apparent = invoke.name();
    if !apparent.starts_with('%') {
        return Some(apparent.to_string());
    }

    if let Some(text) = invoke.text() {
        if let Some(caps) = LEADING_CALL.captures(text) {
            let dotted = caps.get(1).map(|m| m.as_str())?;
            return dotted.rsplit('.').next().map(str::to_string);
        }
    }

    let module = store.resolve(library)?;
    if module.function_count() == 1 {
        return module.functions().first().map(|f| f.name().to_string());
    }

    emit(DiagnosticReason::AmbiguousPointerTarget(library.to_string()));
    None
}
