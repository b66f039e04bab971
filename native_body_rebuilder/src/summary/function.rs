//! Summary functions: the per-export blueprint unit.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::rc::Rc;

use super::inst::{CallInst, Inst, RetTable};
use super::value::{ValueRef, ValueTable};

/// The binding primitive that surfaces a native callback's actual
/// arguments. Its tag-`"3"` returns are the recovered argument slots.
pub const CALLBACK_INFO_TARGET: &str = "napi_get_cb_info";

/// The index tag under which the callback-info call returns the recovered
/// actual arguments.
pub const REAL_ARGS_TAG: &str = "3";

/// Def/use index over one function: where each variable is defined and
/// which instructions use it.
#[derive(Debug, Default)]
pub struct DefUse {
    defs: HashMap<String, usize>,
    users: HashMap<String, Vec<usize>>,
}

impl DefUse {
    pub fn def_site(&self, name: &str) -> Option<usize> {
        self.defs.get(name).copied()
    }

    /// Instruction indices that use `name`, in instruction order.
    pub fn users_of(&self, name: &str) -> &[usize] {
        self.users.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// One summary function: parameters, instructions, interned values, and the
/// extracted real arguments.
///
/// A loaded function is a blueprint and stays immutable; every call site
/// works on a [`SummaryFunction::deep_copy`] of it.
#[derive(Debug)]
pub struct SummaryFunction {
    name: String,
    params: BTreeMap<usize, ValueRef>,
    insts: Vec<Inst>,
    values: ValueTable,
    real_args: Vec<ValueRef>,
}

impl SummaryFunction {
    pub(crate) fn new(
        name: String,
        params: BTreeMap<usize, ValueRef>,
        insts: Vec<Inst>,
        values: ValueTable,
    ) -> Self {
        let real_args = extract_real_args(&insts);
        Self {
            name,
            params,
            insts,
            values,
            real_args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in positional order.
    pub fn params(&self) -> &BTreeMap<usize, ValueRef> {
        &self.params
    }

    pub fn param(&self, pos: usize) -> Option<&ValueRef> {
        self.params.get(&pos)
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn instruction_count(&self) -> usize {
        self.insts.len()
    }

    /// Variables recovered from the callback-info call; they become the
    /// synthetic method's parameters when no declared signature exists.
    pub fn real_args(&self) -> &[ValueRef] {
        &self.real_args
    }

    /// Look up an interned value by token.
    pub fn value(&self, token: &str) -> Option<ValueRef> {
        self.values.get(token)
    }

    pub fn values(&self) -> &ValueTable {
        &self.values
    }

    /// Build the def/use index for the worklist.
    pub fn def_use(&self) -> DefUse {
        let mut out = DefUse::default();
        for (index, inst) in self.insts.iter().enumerate() {
            for def in inst.defs() {
                if let Some(name) = def.borrow().name() {
                    out.defs.entry(name).or_insert(index);
                }
            }
            for name in inst.used_names() {
                out.users.entry(name).or_default().push(index);
            }
        }
        out
    }

    /// Structural deep copy: fresh variable and parameter objects, shared
    /// constants, rebuilt intern table. The blueprint is never aliased.
    pub fn deep_copy(&self) -> Self {
        let mut values = ValueTable::new();
        let params: BTreeMap<usize, ValueRef> = self
            .params
            .iter()
            .map(|(pos, v)| (*pos, copy_value(v, &mut values)))
            .collect();
        let insts: Vec<Inst> = self
            .insts
            .iter()
            .map(|inst| copy_inst(inst, &mut values))
            .collect();
        let real_args = extract_real_args(&insts);
        Self {
            name: self.name.clone(),
            params,
            insts,
            values,
            real_args,
        }
    }
}

fn extract_real_args(insts: &[Inst]) -> Vec<ValueRef> {
    for inst in insts {
        if let Inst::Call(call) = inst {
            if call.target == CALLBACK_INFO_TARGET {
                return call
                    .rets
                    .rets_at(REAL_ARGS_TAG)
                    .iter()
                    .map(Rc::clone)
                    .collect();
            }
        }
    }
    Vec::new()
}

fn copy_value(old: &ValueRef, values: &mut ValueTable) -> ValueRef {
    let (token, snapshot) = {
        let borrowed = old.borrow();
        (borrowed.token(), borrowed.clone())
    };
    if let Some(existing) = values.get(&token) {
        return existing;
    }
    let copied = if snapshot.is_constant() {
        // Constants are immutable and shared between blueprint and copy.
        Rc::clone(old)
    } else {
        Rc::new(std::cell::RefCell::new(snapshot))
    };
    values.insert(Rc::clone(&copied));
    copied
}

fn copy_inst(inst: &Inst, values: &mut ValueTable) -> Inst {
    match inst {
        Inst::Call(call) => {
            let mut rets = RetTable::new();
            for (tag, vars) in call.rets.iter() {
                for var in vars {
                    rets.insert(tag, copy_value(var, values));
                }
            }
            Inst::Call(CallInst {
                callsite: call.callsite.clone(),
                target: call.target.clone(),
                operands: call
                    .operands
                    .iter()
                    .map(|v| copy_value(v, values))
                    .collect(),
                args_operands: call
                    .args_operands
                    .as_ref()
                    .map(|tail| tail.iter().map(|v| copy_value(v, values)).collect()),
                rets,
            })
        }
        Inst::Ret { operand } => Inst::Ret {
            operand: copy_value(operand, values),
        },
        Inst::Phi { ret, operands } => Inst::Phi {
            ret: copy_value(ret, values),
            operands: operands.iter().map(|v| copy_value(v, values)).collect(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use native_body_rebuilder_model::Type;

    fn sample_function() -> SummaryFunction {
        let mut values = ValueTable::new();
        let env = values.intern_parameter("0", "napi_env");
        let info = values.intern_parameter("1", "napi_callback_info");
        let a = values.intern("a").unwrap();
        let b = values.intern("b").unwrap();
        let r = values.intern("r").unwrap();
        let seven = values.intern("long 7").unwrap();

        let mut cb_rets = RetTable::new();
        cb_rets.insert(REAL_ARGS_TAG, Rc::clone(&a));
        cb_rets.insert(REAL_ARGS_TAG, Rc::clone(&b));
        let cb = Inst::Call(CallInst {
            callsite: "0".to_string(),
            target: CALLBACK_INFO_TARGET.to_string(),
            operands: vec![Rc::clone(&env), Rc::clone(&info)],
            args_operands: None,
            rets: cb_rets,
        });

        let mut create_rets = RetTable::new();
        create_rets.insert("2", Rc::clone(&r));
        let create = Inst::Call(CallInst {
            callsite: "1".to_string(),
            target: "napi_create_int32".to_string(),
            operands: vec![Rc::clone(&env), seven],
            args_operands: None,
            rets: create_rets,
        });

        let ret = Inst::Ret { operand: r };

        let mut params = BTreeMap::new();
        params.insert(0, env);
        params.insert(1, info);
        SummaryFunction::new("add".to_string(), params, vec![cb, create, ret], values)
    }

    #[test]
    fn test_real_args_come_from_callback_info_tag_three() {
        let func = sample_function();
        let names: Vec<_> = func
            .real_args()
            .iter()
            .map(|v| v.borrow().name().unwrap())
            .collect();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_def_use_indexes_defs_and_users() {
        let func = sample_function();
        let du = func.def_use();
        assert_eq!(du.def_site("r"), Some(1));
        assert_eq!(du.users_of("r"), &[2]);
        assert_eq!(du.users_of("0"), &[0, 1]);
    }

    #[test]
    fn test_deep_copy_clones_variables_and_shares_constants() {
        let func = sample_function();
        let copy = func.deep_copy();

        let orig_r = func.value("r").unwrap();
        let copy_r = copy.value("r").unwrap();
        assert!(!Rc::ptr_eq(&orig_r, &copy_r));

        let orig_c = func.value("long 7").unwrap();
        let copy_c = copy.value("long 7").unwrap();
        assert!(Rc::ptr_eq(&orig_c, &copy_c));

        // Refining a type on the copy must not touch the blueprint.
        super::super::value::set_value_ty(&copy_r, Type::Number);
        assert_eq!(orig_r.borrow().ty(), Type::Unknown);
        assert_eq!(copy_r.borrow().ty(), Type::Number);
    }

    #[test]
    fn test_deep_copy_preserves_interning() {
        let copy = sample_function().deep_copy();
        let via_table = copy.value("r").unwrap();
        let via_inst = match &copy.insts()[1] {
            Inst::Call(call) => Rc::clone(call.rets.ret_at("2").unwrap()),
            _ => unreachable!(),
        };
        assert!(Rc::ptr_eq(&via_table, &via_inst));
    }

    #[test]
    fn test_blueprint_without_callback_info_has_no_real_args() {
        let mut values = ValueTable::new();
        let top = values.intern("top").unwrap();
        let f = SummaryFunction::new(
            "noop".to_string(),
            BTreeMap::new(),
            vec![Inst::Ret { operand: top }],
            values,
        );
        assert!(f.real_args().is_empty());
    }
}
