//! Summary-IR instructions: calls into the native-binding API, phi nodes,
//! and returns.

use std::rc::Rc;

use indexmap::IndexMap;

use super::value::{value_is_constant, ValueRef};

/// The return table of a call: return variables grouped by index tag.
///
/// An index tag names the operand slot the returned SSA variable was stored
/// through; tag `"-1"` names the call's own status/return slot. A tag holds
/// more than one variable only for the callback-info primitive, whose
/// argument-vector slot yields one variable per recovered actual argument.
#[derive(Debug, Clone, Default)]
pub struct RetTable {
    by_tag: IndexMap<String, Vec<ValueRef>>,
}

impl RetTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a return variable under the given tag, preserving order.
    pub fn insert(&mut self, tag: &str, var: ValueRef) {
        self.by_tag.entry(tag.to_string()).or_default().push(var);
    }

    /// The first (usually only) return variable at a tag.
    pub fn ret_at(&self, tag: &str) -> Option<&ValueRef> {
        self.by_tag.get(tag).and_then(|vars| vars.first())
    }

    /// All return variables at a tag, in document order.
    pub fn rets_at(&self, tag: &str) -> &[ValueRef] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate `(tag, variables)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<ValueRef>)> {
        self.by_tag.iter()
    }

    /// All return variables across tags, in insertion order.
    pub fn all(&self) -> impl Iterator<Item = &ValueRef> {
        self.by_tag.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// A call into the native-binding API.
#[derive(Debug, Clone)]
pub struct CallInst {
    /// Call-site identifier carried through from the document.
    pub callsite: String,
    /// The target symbol (e.g. `napi_create_int32`).
    pub target: String,
    /// Ordered operand vector.
    pub operands: Vec<ValueRef>,
    /// The variadic tail, when the call carries one separately.
    pub args_operands: Option<Vec<ValueRef>>,
    pub rets: RetTable,
}

impl CallInst {
    pub fn operand(&self, index: usize) -> Option<&ValueRef> {
        self.operands.get(index)
    }
}

/// One summary-IR instruction.
#[derive(Debug, Clone)]
pub enum Inst {
    Call(CallInst),
    /// Function return; the operand is `top` for void.
    Ret { operand: ValueRef },
    /// SSA merge: `ret := phi(operands…)`.
    Phi {
        ret: ValueRef,
        operands: Vec<ValueRef>,
    },
}

impl Inst {
    /// Variables defined by this instruction.
    pub fn defs(&self) -> Vec<ValueRef> {
        match self {
            Inst::Call(call) => call.rets.all().map(Rc::clone).collect(),
            Inst::Ret { .. } => Vec::new(),
            Inst::Phi { ret, .. } => vec![Rc::clone(ret)],
        }
    }

    /// Values used by this instruction (constants included).
    pub fn uses(&self) -> Vec<ValueRef> {
        match self {
            Inst::Call(call) => {
                let mut uses: Vec<ValueRef> = call.operands.iter().map(Rc::clone).collect();
                if let Some(tail) = &call.args_operands {
                    uses.extend(tail.iter().map(Rc::clone));
                }
                uses
            }
            Inst::Ret { operand } => vec![Rc::clone(operand)],
            Inst::Phi { operands, .. } => operands.iter().map(Rc::clone).collect(),
        }
    }

    /// Variable names used by this instruction (constants excluded).
    pub fn used_names(&self) -> Vec<String> {
        self.uses()
            .iter()
            .filter(|v| !value_is_constant(v))
            .filter_map(|v| v.borrow().name())
            .collect()
    }

    pub fn as_call(&self) -> Option<&CallInst> {
        match self {
            Inst::Call(call) => Some(call),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::value::ValueTable;

    #[test]
    fn test_ret_table_groups_by_tag_in_order() {
        let mut table = ValueTable::new();
        let a = table.intern("a").unwrap();
        let b = table.intern("b").unwrap();
        let c = table.intern("c").unwrap();

        let mut rets = RetTable::new();
        rets.insert("3", a);
        rets.insert("3", b);
        rets.insert("-1", c);

        assert_eq!(rets.rets_at("3").len(), 2);
        assert_eq!(rets.rets_at("3")[0].borrow().name().unwrap(), "a");
        assert_eq!(rets.ret_at("-1").unwrap().borrow().name().unwrap(), "c");
        assert!(rets.rets_at("9").is_empty());
    }

    #[test]
    fn test_defs_and_uses_are_total() {
        let mut table = ValueTable::new();
        let env = table.intern("env").unwrap();
        let seven = table.intern("long 7").unwrap();
        let r = table.intern("r").unwrap();

        let mut rets = RetTable::new();
        rets.insert("2", Rc::clone(&r));
        let call = Inst::Call(CallInst {
            callsite: "0".to_string(),
            target: "napi_create_int32".to_string(),
            operands: vec![env, seven],
            args_operands: None,
            rets,
        });

        assert_eq!(call.defs().len(), 1);
        assert_eq!(call.uses().len(), 2);
        assert_eq!(call.used_names(), vec!["env".to_string()]);

        let ret = Inst::Ret {
            operand: Rc::clone(&r),
        };
        assert!(ret.defs().is_empty());
        assert_eq!(ret.used_names(), vec!["r".to_string()]);
    }
}
