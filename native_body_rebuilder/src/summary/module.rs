//! Summary modules: one per native shared library.

use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::doc::{FunctionDoc, InstDoc, ModuleDoc};
use super::function::SummaryFunction;
use super::inst::Inst;
use super::value::SummaryValue;

/// A loaded summary module: package name, binary name, logical module name,
/// and the exported functions in document order. The logical module name is
/// the key cross-language resolution uses.
#[derive(Debug)]
pub struct SummaryModule {
    hap_name: String,
    so_name: String,
    module_name: String,
    functions: Vec<SummaryFunction>,
}

impl SummaryModule {
    pub fn new(
        hap_name: String,
        so_name: String,
        module_name: String,
        functions: Vec<SummaryFunction>,
    ) -> Self {
        Self {
            hap_name,
            so_name,
            module_name,
            functions,
        }
    }

    pub fn hap_name(&self) -> &str {
        &self.hap_name
    }

    pub fn so_name(&self) -> &str {
        &self.so_name
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn functions(&self) -> &[SummaryFunction] {
        &self.functions
    }

    pub fn function(&self, name: &str) -> Option<&SummaryFunction> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn instruction_count(&self) -> usize {
        self.functions.iter().map(|f| f.instruction_count()).sum()
    }

    /// Re-serialize to the document shape (round-trip surface).
    pub fn to_document(&self) -> ModuleDoc {
        ModuleDoc {
            hap_name: self.hap_name.clone(),
            so_name: self.so_name.clone(),
            module_name: self.module_name.clone(),
            functions: self.functions.iter().map(function_to_doc).collect(),
        }
    }
}

fn function_to_doc(func: &SummaryFunction) -> FunctionDoc {
    let params: BTreeMap<String, String> = func
        .params()
        .iter()
        .map(|(pos, value)| {
            let decl = match &*value.borrow() {
                SummaryValue::Parameter { decl_ty, .. } => decl_ty.clone(),
                other => other.ty().to_string(),
            };
            (pos.to_string(), decl)
        })
        .collect();

    let instructions = func.insts().iter().map(inst_to_doc).collect();

    FunctionDoc {
        name: func.name().to_string(),
        params,
        instructions,
    }
}

fn inst_to_doc(inst: &Inst) -> InstDoc {
    match inst {
        Inst::Call(call) => {
            let mut rets = IndexMap::new();
            for (tag, vars) in call.rets.iter() {
                for var in vars {
                    rets.insert(var.borrow().token(), tag.clone());
                }
            }
            InstDoc::call(
                call.callsite.clone(),
                call.target.clone(),
                call.operands.iter().map(|v| v.borrow().token()).collect(),
                call.args_operands
                    .as_ref()
                    .map(|tail| tail.iter().map(|v| v.borrow().token()).collect()),
                rets,
            )
        }
        Inst::Ret { operand } => InstDoc::ret(operand.borrow().token()),
        Inst::Phi { ret, operands } => InstDoc::phi(
            ret.borrow().token(),
            operands.iter().map(|v| v.borrow().token()).collect(),
        ),
    }
}
