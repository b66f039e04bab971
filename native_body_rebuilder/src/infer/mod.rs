//! Type inference over one summary function.
//!
//! A monotone worklist fixpoint. Calls consult the rule table and join the
//! declared types into their operands and returns; phi nodes unify their
//! operands and result; returns contribute nothing. Every change re-enqueues
//! the changed value's definition and users. A pass cap bounds pathological
//! re-entry; in a correct (monotone) table the cap is never reached.

pub mod lattice;
pub mod rules;

use std::collections::VecDeque;

use indexmap::IndexMap;

use native_body_rebuilder_model::{ClassSignature, Type};

use crate::diagnostics::{emit, DiagnosticReason};
use crate::summary::{set_value_ty, value_is_constant, Inst, SummaryFunction, ValueRef};

use self::lattice::{join, join_all};
use self::rules::rule_for;

/// Default bound on worklist passes, counted in whole-instruction-list
/// multiples.
pub const DEFAULT_MAX_PASSES: usize = 100;

/// Inference inputs beyond the function itself.
#[derive(Debug)]
pub struct InferenceContext {
    /// Class standing in for the module object; seeds parameter 1 and
    /// resolves the rule table's object type.
    pub object_class: ClassSignature,
    /// Refined types for the real arguments, in order. Produced by the
    /// assembler from the observed call-site argument types.
    pub real_arg_types: Vec<Type>,
    pub max_passes: usize,
}

impl InferenceContext {
    pub fn new(object_class: ClassSignature) -> Self {
        Self {
            object_class,
            real_arg_types: Vec::new(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    pub fn with_real_arg_types(mut self, types: Vec<Type>) -> Self {
        self.real_arg_types = types;
        self
    }
}

/// Run inference in place on (a deep copy of) a summary function. Returns
/// the final variable-name → type map.
pub fn infer_types(func: &SummaryFunction, ctx: &InferenceContext) -> IndexMap<String, Type> {
    seed(func, ctx);

    let def_use = func.def_use();
    let inst_count = func.insts().len();
    let mut worklist: VecDeque<usize> = (0..inst_count).collect();
    let mut queued = vec![true; inst_count];
    let budget = ctx.max_passes.saturating_mul(inst_count.max(1));
    let mut processed = 0usize;

    while let Some(index) = worklist.pop_front() {
        queued[index] = false;

        if processed >= budget {
            emit(DiagnosticReason::InferenceCapReached(func.name().to_string()));
            break;
        }
        processed += 1;

        let changed = step(func, index, ctx);
        for name in changed {
            if let Some(def) = def_use.def_site(&name) {
                if !queued[def] {
                    queued[def] = true;
                    worklist.push_back(def);
                }
            }
            for &user in def_use.users_of(&name) {
                if !queued[user] {
                    queued[user] = true;
                    worklist.push_back(user);
                }
            }
        }
    }

    finalize(func)
}

fn seed(func: &SummaryFunction, ctx: &InferenceContext) {
    for (&pos, param) in func.params() {
        match pos {
            // Parameter 0 is the host-environment handle; nothing about the
            // host value space is known for it.
            0 => {}
            // Parameter 1 is the receiver object.
            1 => assign(param, &Type::Class(ctx.object_class.clone())),
            _ => assign(param, &Type::Any),
        };
    }
    for (real_arg, ty) in func.real_args().iter().zip(&ctx.real_arg_types) {
        assign(real_arg, ty);
    }
}

/// Process one instruction; returns the names of values whose type changed.
fn step(func: &SummaryFunction, index: usize, ctx: &InferenceContext) -> Vec<String> {
    let mut changed = Vec::new();
    match &func.insts()[index] {
        Inst::Call(call) => {
            let Some(rule) = rule_for(&call.target) else {
                return changed;
            };
            for &(op_index, rule_ty) in rule.operands {
                if let Some(operand) = call.operand(op_index) {
                    join_into(operand, &rule_ty.to_type(&ctx.object_class), &mut changed);
                }
            }
            for &(tag, rule_ty) in rule.rets {
                for ret in call.rets.rets_at(tag) {
                    join_into(ret, &rule_ty.to_type(&ctx.object_class), &mut changed);
                }
            }
        }
        Inst::Phi { ret, operands } => {
            let operand_tys: Vec<Type> = operands
                .iter()
                .filter(|v| !value_is_constant(v))
                .map(|v| v.borrow().ty())
                .collect();
            let mut merged = join_all(operand_tys.iter());
            merged = join(&merged, &ret.borrow().ty());
            join_into(ret, &merged, &mut changed);
            for operand in operands {
                if !value_is_constant(operand) {
                    join_into(operand, &merged, &mut changed);
                }
            }
        }
        // The return operand keeps whatever type it already has.
        Inst::Ret { .. } => {}
    }
    changed
}

fn join_into(value: &ValueRef, with: &Type, changed: &mut Vec<String>) {
    if value_is_constant(value) {
        return;
    }
    let current = value.borrow().ty();
    let merged = join(&current, with);
    if merged != current {
        set_value_ty(value, merged);
        if let Some(name) = value.borrow().name() {
            changed.push(name);
        }
    }
}

fn assign(value: &ValueRef, ty: &Type) {
    join_into(value, ty, &mut Vec::new());
}

/// Default any still-Unknown value to Any (with a warning) and snapshot the
/// final type map.
fn finalize(func: &SummaryFunction) -> IndexMap<String, Type> {
    let mut map = IndexMap::new();
    for (token, value) in func.values().iter() {
        if value_is_constant(value) {
            continue;
        }
        if value.borrow().ty().is_unknown() {
            emit(DiagnosticReason::UnknownForcedToAny(token.clone()));
            set_value_ty(value, Type::Any);
        }
        map.insert(token.clone(), value.borrow().ty());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;
    use native_body_rebuilder_model::FileSignature;

    fn ctx() -> InferenceContext {
        InferenceContext::new(ClassSignature::new(
            FileSignature::new("app", "@nodeapiFileentry"),
            "@nodeapiClassentry",
        ))
    }

    fn load_function(instructions: &str) -> crate::summary::SummaryModule {
        let text = format!(
            r#"{{"hap_name": "app", "so_name": "libentry.so", "module_name": "entry",
                "functions": [{{"name": "f",
                    "params": {{"0": "napi_env", "1": "napi_callback_info"}},
                    "instructions": {instructions}}}]}}"#
        );
        load_str(&text, "test").unwrap()
    }

    #[test]
    fn test_create_int32_infers_number_return() {
        let module = load_function(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_create_int32",
                 "operands": ["env", "long 7"], "rets": {"r": "2"}},
                {"type": "Ret", "operand": "r"}
            ]"#,
        );
        let func = module.function("f").unwrap().deep_copy();
        let types = infer_types(&func, &ctx());
        assert_eq!(types["r"], Type::Number);
    }

    #[test]
    fn test_string_extract_types_buffer_and_length() {
        let module = load_function(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_get_value_string_utf8",
                 "operands": ["env", "s", "buf", "long 16", "len"],
                 "rets": {"r": "2", "l": "4"}}
            ]"#,
        );
        let func = module.function("f").unwrap().deep_copy();
        let types = infer_types(&func, &ctx());
        assert_eq!(types["s"], Type::String);
        assert_eq!(types["buf"], Type::String);
        assert_eq!(types["r"], Type::String);
        assert_eq!(types["l"], Type::Number);
        assert_eq!(types["len"], Type::Number);
    }

    #[test]
    fn test_phi_unifies_same_types() {
        let module = load_function(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_coerce_to_string",
                 "operands": ["env", "a"], "rets": {"x": "2"}},
                {"type": "Call", "callsite": "1", "target": "napi_coerce_to_string",
                 "operands": ["env", "b"], "rets": {"y": "2"}},
                {"type": "Phi", "ret": "r", "operands": ["x", "y"]},
                {"type": "Ret", "operand": "r"}
            ]"#,
        );
        let func = module.function("f").unwrap().deep_copy();
        let types = infer_types(&func, &ctx());
        assert_eq!(types["x"], Type::String);
        assert_eq!(types["y"], Type::String);
        assert_eq!(types["r"], Type::String);
    }

    #[test]
    fn test_phi_of_incompatible_types_widens_to_any() {
        use crate::diagnostics::DiagnosticsCollector;
        DiagnosticsCollector::enable();
        let _ = DiagnosticsCollector::take();

        let module = load_function(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_coerce_to_string",
                 "operands": ["env", "a"], "rets": {"x": "2"}},
                {"type": "Call", "callsite": "1", "target": "napi_coerce_to_number",
                 "operands": ["env", "b"], "rets": {"y": "2"}},
                {"type": "Phi", "ret": "r", "operands": ["x", "y"]}
            ]"#,
        );
        let func = module.function("f").unwrap().deep_copy();
        let types = infer_types(&func, &ctx());
        assert_eq!(types["r"], Type::Any);
        assert_eq!(types["x"], Type::Any);
        assert_eq!(types["y"], Type::Any);

        let diags = DiagnosticsCollector::take();
        assert!(diags
            .iter()
            .any(|d| matches!(d, DiagnosticReason::IncompatibleJoin(_, _))));
        DiagnosticsCollector::disable();
    }

    #[test]
    fn test_parameter_seeding() {
        let module = load_function(r#"[{"type": "Ret", "operand": "top"}]"#);
        let func = module.function("f").unwrap().deep_copy();
        let types = infer_types(&func, &ctx());
        // Parameter 0 stays unseeded and defaults to Any at finalization;
        // parameter 1 is the receiver object.
        assert_eq!(types["0"], Type::Any);
        assert!(matches!(types["1"], Type::Class(_)));
    }

    #[test]
    fn test_real_args_seed_from_refined_signature() {
        let module = load_function(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_get_cb_info",
                 "operands": ["0", "1"], "rets": {"a": "3", "b": "3"}},
                {"type": "Ret", "operand": "top"}
            ]"#,
        );
        let func = module.function("f").unwrap().deep_copy();
        let context = ctx().with_real_arg_types(vec![Type::Number, Type::String]);
        let types = infer_types(&func, &context);
        assert_eq!(types["a"], Type::Number);
        assert_eq!(types["b"], Type::String);
    }

    #[test]
    fn test_fixpoint_is_order_independent() {
        let body = r#"[
            {"type": "Call", "callsite": "0", "target": "napi_coerce_to_string",
             "operands": ["env", "a"], "rets": {"x": "2"}},
            {"type": "Phi", "ret": "r", "operands": ["x", "y"]},
            {"type": "Call", "callsite": "1", "target": "napi_coerce_to_string",
             "operands": ["env", "b"], "rets": {"y": "2"}}
        ]"#;
        let first = {
            let module = load_function(body);
            let func = module.function("f").unwrap().deep_copy();
            infer_types(&func, &ctx())
        };
        let second = {
            let module = load_function(body);
            let func = module.function("f").unwrap().deep_copy();
            infer_types(&func, &ctx())
        };
        assert_eq!(first, second);
        assert_eq!(first["r"], Type::String);
    }
}
