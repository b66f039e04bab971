//! Lowering: summary IR to a host-language CFG of three-address statements.
//!
//! Each summary function lowers to exactly one straight-line basic block.
//! Instructions are walked in order; every call dispatches on its target
//! name to a handler that appends at most three statements and updates the
//! variable-to-local binding map. The IR never owns host locals: the body
//! owns them, and a per-function look-aside map goes from IR variable name
//! to the bound local.

use std::collections::HashMap;

use native_body_rebuilder_model::{
    BasicBlock, Body, Cfg, ClassSignature, Constant, Expr, FieldSignature, FileSignature,
    InvokeExpr, LValue, Local, LocalRef, MethodSignature, MethodSubSignature, Stmt, Type, Value,
};

use crate::diagnostics::{emit, DiagnosticReason};
use crate::summary::{
    value_is_constant, value_name, value_ty, CallInst, Inst, SummaryFunction, SummaryValue,
    ValueRef, CALLBACK_INFO_TARGET,
};

const NUMBER_CREATE_TARGETS: [&str; 6] = [
    "napi_create_double",
    "napi_create_int32",
    "napi_create_uint32",
    "napi_create_int64",
    "napi_create_bigint_int64",
    "napi_create_bigint_uint64",
];

const NUMBER_EXTRACT_TARGETS: [&str; 6] = [
    "napi_get_value_double",
    "napi_get_value_int32",
    "napi_get_value_uint32",
    "napi_get_value_int64",
    "napi_get_value_bigint_int64",
    "napi_get_value_bigint_uint64",
];

const STRING_CREATE_TARGETS: [&str; 3] = [
    "napi_create_string_utf8",
    "napi_create_string_utf16",
    "napi_create_string_latin1",
];

const STRING_EXTRACT_TARGETS: [&str; 3] = [
    "napi_get_value_string_utf8",
    "napi_get_value_string_utf16",
    "napi_get_value_string_latin1",
];

/// Recognized targets that are modeled as no-ops today: their inference
/// rules stay active, but no statements are emitted for them.
const NOOP_TARGETS: [&str; 13] = [
    "napi_create_object",
    "napi_get_prototype",
    "napi_set_property",
    "napi_get_property",
    "napi_has_property",
    "napi_delete_property",
    "napi_has_own_property",
    "napi_set_named_property",
    "napi_get_named_property",
    "napi_has_named_property",
    "napi_get_all_property_names",
    "napi_has_element",
    "napi_delete_element",
];

const COERCE_TARGETS: [&str; 4] = [
    "napi_coerce_to_bool",
    "napi_coerce_to_number",
    "napi_coerce_to_object",
    "napi_coerce_to_string",
];

const RAW_ALLOCATION_TARGETS: [&str; 4] = crate::infer::rules::RAW_ALLOCATION_TARGETS;

/// Lower one (already type-inferred) summary function into a method body
/// for the given synthetic class and method sub-signature.
pub fn lower_function(
    func: &SummaryFunction,
    class: &ClassSignature,
    sub: &MethodSubSignature,
) -> Body {
    let mut builder = BodyBuilder::new(func, class, sub);
    builder.prologue();
    for inst in func.insts() {
        builder.lower_inst(inst);
    }
    builder.finish()
}

struct BodyBuilder<'a> {
    func: &'a SummaryFunction,
    class: &'a ClassSignature,
    sub: &'a MethodSubSignature,
    locals: Vec<LocalRef>,
    /// Look-aside map: IR variable name → bound host local. Insert-once;
    /// a binding never changes after it is set.
    bindings: HashMap<String, LocalRef>,
    counters: HashMap<&'static str, usize>,
    block: BasicBlock,
}

impl<'a> BodyBuilder<'a> {
    fn new(func: &'a SummaryFunction, class: &'a ClassSignature, sub: &'a MethodSubSignature) -> Self {
        Self {
            func,
            class,
            sub,
            locals: Vec::new(),
            bindings: HashMap::new(),
            counters: HashMap::new(),
            block: BasicBlock::new(),
        }
    }

    fn finish(self) -> Body {
        Body::new(self.locals, Cfg::single_block(self.block))
    }

    /// Bind the method parameters (declared sub-signature first, extracted
    /// real arguments otherwise), then the `this` reference.
    fn prologue(&mut self) {
        if !self.sub.params.is_empty() {
            for (index, param) in self.sub.params.iter().enumerate() {
                let local = self.named_local(&param.name, param.ty.clone());
                self.block.push(Stmt::Assign {
                    lhs: LValue::Local(local.clone()),
                    rhs: Expr::Parameter {
                        index,
                        ty: param.ty.clone(),
                    },
                });
                if let Some(real_arg) = self.func.real_args().get(index) {
                    self.bind(real_arg, &local);
                }
            }
        } else {
            let real_args: Vec<ValueRef> = self.func.real_args().to_vec();
            for (index, real_arg) in real_args.iter().enumerate() {
                let ty = value_ty(real_arg);
                let Some(name) = value_name(real_arg) else {
                    continue;
                };
                let local = self.named_local(&name, ty.clone());
                self.block.push(Stmt::Assign {
                    lhs: LValue::Local(local.clone()),
                    rhs: Expr::Parameter { index, ty },
                });
                self.bind(real_arg, &local);
            }
        }

        let this_local = self.named_local("this", Type::Class(self.class.clone()));
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(this_local),
            rhs: Expr::This {
                class: self.class.clone(),
            },
        });
    }

    fn lower_inst(&mut self, inst: &Inst) {
        match inst {
            Inst::Call(call) => self.lower_call(call),
            Inst::Phi { ret, operands } => self.lower_phi(ret, operands),
            Inst::Ret { operand } => self.lower_ret(operand),
        }
    }

    fn lower_call(&mut self, call: &CallInst) {
        let target = call.target.as_str();
        match target {
            t if NUMBER_CREATE_TARGETS.contains(&t) => {
                self.lower_value_create(call, Type::Number, "number", "2");
            }
            "napi_get_boolean" => {
                self.lower_value_create(call, Type::Boolean, "bool", "2");
            }
            t if STRING_CREATE_TARGETS.contains(&t) => {
                self.lower_value_create(call, Type::String, "string", "3");
            }
            "napi_get_undefined" => {
                self.lower_const_fetch(call, Constant::Undefined, Type::Undefined);
            }
            "napi_get_null" => {
                self.lower_const_fetch(call, Constant::Null, Type::Null);
            }
            t if NUMBER_EXTRACT_TARGETS.contains(&t) => self.lower_value_extract(call),
            "napi_get_value_bool" => self.lower_value_extract(call),
            t if STRING_EXTRACT_TARGETS.contains(&t) => self.lower_string_extract(call),
            "napi_create_array" => self.lower_array_create(call, None),
            "napi_create_array_with_length" => self.lower_array_create(call, Some(1)),
            "napi_get_array_length" => self.lower_array_length(call),
            "napi_is_array" => self.lower_is_array(call),
            "napi_set_element" => self.lower_element_set(call),
            "napi_get_element" => self.lower_element_get(call),
            t if RAW_ALLOCATION_TARGETS.contains(&t) => self.lower_raw_allocation(call),
            "OH_LOG_Print" => self.lower_log_print(call),
            // Callback-info is consumed by the parameter prologue.
            CALLBACK_INFO_TARGET => {}
            t if NOOP_TARGETS.contains(&t) || COERCE_TARGETS.contains(&t) => {}
            other => {
                emit(DiagnosticReason::UnknownCallTarget(other.to_string()));
            }
        }
    }

    /// Value-create family: bind the return to the operand's local, minting
    /// a typed intermediate when the operand is a constant.
    fn lower_value_create(&mut self, call: &CallInst, ty: Type, prefix: &'static str, tag: &str) {
        let Some(operand) = self.required_operand(call, 1) else {
            return;
        };
        let target = self.materialize(&operand, prefix, ty);
        if let Some(ret) = call.rets.ret_at(tag) {
            self.bind(ret, &target);
        }
    }

    /// `napi_get_undefined` / `napi_get_null`: mint a constant-initialized
    /// local for the tag-1 return.
    fn lower_const_fetch(&mut self, call: &CallInst, constant: Constant, ty: Type) {
        let local = self.fresh("const", ty);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(local.clone()),
            rhs: Expr::Constant(constant),
        });
        if let Some(ret) = call.rets.ret_at("1") {
            self.bind(ret, &local);
        }
    }

    /// Number/boolean extract: `target := source`.
    fn lower_value_extract(&mut self, call: &CallInst) {
        let Some(source) = self.required_operand(call, 1) else {
            return;
        };
        let Some(ret) = call.rets.ret_at("2").cloned() else {
            return;
        };
        let target = self.bound_local(&ret);
        let rhs = self.host_rhs(&source);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(target),
            rhs,
        });
    }

    /// String extract: copy into the buffer operand, and define the tag-4
    /// length return as a `length` field read on the source.
    fn lower_string_extract(&mut self, call: &CallInst) {
        let Some(source) = self.required_operand(call, 1) else {
            return;
        };
        let Some(buffer) = self.required_operand(call, 2) else {
            return;
        };

        let source_local = self.materialize(&source, "string", Type::String);
        let buffer_local = self.bound_local(&buffer);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(buffer_local.clone()),
            rhs: Expr::Local(source_local.clone()),
        });
        if let Some(ret) = call.rets.ret_at("2") {
            self.bind(ret, &buffer_local);
        }

        if let Some(length_ret) = call.rets.ret_at("4").cloned() {
            let length_local = self.fresh("length", Type::Number);
            self.block.push(Stmt::Assign {
                lhs: LValue::Local(length_local.clone()),
                rhs: Expr::FieldRef {
                    base: source_local,
                    field: self.length_field("String"),
                },
            });
            self.bind(&length_ret, &length_local);
        }
    }

    fn lower_array_create(&mut self, call: &CallInst, length_operand: Option<usize>) {
        let size = match length_operand {
            Some(index) => {
                let Some(operand) = self.required_operand(call, index) else {
                    return;
                };
                self.host_value(&operand)
            }
            None => Value::Constant(Constant::Number(0)),
        };
        let local = self.fresh("array", Type::any_array());
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(local.clone()),
            rhs: Expr::NewArray {
                elem: Type::Any,
                size,
            },
        });
        if let Some(ret) = call.rets.ret_at("2") {
            self.bind(ret, &local);
        }
    }

    fn lower_array_length(&mut self, call: &CallInst) {
        let Some(array) = self.required_operand(call, 1) else {
            return;
        };
        let array_local = self.materialize(&array, "array", Type::any_array());
        let local = self.fresh("array_length", Type::Number);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(local.clone()),
            rhs: Expr::FieldRef {
                base: array_local,
                field: self.length_field("Array"),
            },
        });
        if let Some(ret) = call.rets.ret_at("2") {
            self.bind(ret, &local);
        }
    }

    fn lower_is_array(&mut self, call: &CallInst) {
        let Some(operand) = self.required_operand(call, 1) else {
            return;
        };
        let value = self.materialize(&operand, "array", Type::any_array());
        let local = self.fresh("is_array", Type::Boolean);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(local.clone()),
            rhs: Expr::InstanceOf {
                value,
                check: Type::any_array(),
            },
        });
        if let Some(ret) = call.rets.ret_at("2") {
            self.bind(ret, &local);
        }
    }

    fn lower_element_set(&mut self, call: &CallInst) {
        let Some(array) = self.required_operand(call, 1) else {
            return;
        };
        let Some(index) = self.required_operand(call, 2) else {
            return;
        };
        let Some(value) = self.required_operand(call, 3) else {
            return;
        };
        let base = self.materialize(&array, "array", Type::any_array());
        let index = self.host_value(&index);
        let rhs = self.host_rhs(&value);
        self.block.push(Stmt::Assign {
            lhs: LValue::ArrayRef { base, index },
            rhs,
        });
    }

    fn lower_element_get(&mut self, call: &CallInst) {
        let Some(array) = self.required_operand(call, 1) else {
            return;
        };
        let Some(index) = self.required_operand(call, 2) else {
            return;
        };
        let base = self.materialize(&array, "array", Type::any_array());
        let index = self.host_value(&index);
        let local = self.fresh("get_element", Type::Any);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(local.clone()),
            rhs: Expr::ArrayRef { base, index },
        });
        if let Some(ret) = call.rets.ret_at("3") {
            self.bind(ret, &local);
        }
    }

    /// Raw allocation: a string local seeded empty, to be overwritten by a
    /// later string-extract into the same buffer.
    fn lower_raw_allocation(&mut self, call: &CallInst) {
        let local = self.fresh("alloc", Type::String);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(local.clone()),
            rhs: Expr::Constant(Constant::Str(String::new())),
        });
        if let Some(ret) = call.rets.ret_at("-1") {
            self.bind(ret, &local);
        }
    }

    /// `OH_LOG_Print(type, level, domain, tag, fmt, …)`: one invoke of the
    /// level-specific platform log method with `(domain, tag, fmt, …)`.
    fn lower_log_print(&mut self, call: &CallInst) {
        if call.operands.len() < 5 {
            emit(DiagnosticReason::OperandShortfall(
                call.target.clone(),
                5,
                call.operands.len(),
            ));
            return;
        }

        let level = match &*call.operands[1].borrow() {
            SummaryValue::Number(n) => *n,
            _ => 4,
        };
        let method_name = match level {
            3 => "debug",
            4 => "info",
            5 => "warn",
            6 => "error",
            7 => "fatal",
            _ => "info",
        };

        let mut args: Vec<Value> = Vec::new();
        for operand in &call.operands[2..] {
            args.push(self.host_value(operand));
        }
        if let Some(tail) = &call.args_operands {
            for operand in tail {
                args.push(self.host_value(operand));
            }
        }

        let sig = MethodSignature::new(
            ClassSignature::new(
                FileSignature::new(&self.class.file.project, "@ohos.hilog"),
                "hilog",
            ),
            MethodSubSignature::new(method_name, Vec::new(), Type::Void),
        );
        self.block.push(Stmt::Invoke(InvokeExpr::Static {
            method: sig,
            args,
        }));
    }

    /// `result := phi(op1, …, opn)`, constant operands skipped.
    fn lower_phi(&mut self, ret: &ValueRef, operands: &[ValueRef]) {
        let variable_operands: Vec<&ValueRef> = operands
            .iter()
            .filter(|v| !value_is_constant(v))
            .collect();
        let mut args: Vec<LocalRef> = Vec::with_capacity(variable_operands.len());
        for operand in variable_operands {
            args.push(self.bound_local(operand));
        }
        let target = self.bound_local(ret);
        self.block.push(Stmt::Assign {
            lhs: LValue::Local(target),
            rhs: Expr::Phi { args },
        });
    }

    fn lower_ret(&mut self, operand: &ValueRef) {
        let stmt = {
            let value = operand.borrow();
            match &*value {
                SummaryValue::Top => Stmt::Return(None),
                SummaryValue::Number(n) => {
                    Stmt::Return(Some(Value::Constant(Constant::Number(*n))))
                }
                SummaryValue::Str(s) => {
                    Stmt::Return(Some(Value::Constant(Constant::Str(s.clone()))))
                }
                SummaryValue::Null => Stmt::Return(Some(Value::Constant(Constant::Null))),
                SummaryValue::Variable { name, .. } | SummaryValue::Parameter { name, .. } => {
                    match self.bindings.get(name) {
                        Some(local) => Stmt::Return(Some(Value::Local(local.clone()))),
                        None => {
                            emit(DiagnosticReason::UnresolvedReturnOperand(
                                self.func.name().to_string(),
                            ));
                            Stmt::Return(None)
                        }
                    }
                }
            }
        };
        self.block.push(stmt);
    }

    // ---- building blocks ----

    /// Operand at `index`, or a shortfall warning.
    fn required_operand(&mut self, call: &CallInst, index: usize) -> Option<ValueRef> {
        match call.operand(index) {
            Some(operand) => Some(operand.clone()),
            None => {
                emit(DiagnosticReason::OperandShortfall(
                    call.target.clone(),
                    index + 1,
                    call.operands.len(),
                ));
                None
            }
        }
    }

    /// A host local for a variable: the bound one, or a fresh local named
    /// after the variable with its inferred type.
    fn bound_local(&mut self, value: &ValueRef) -> LocalRef {
        let name = value_name(value).unwrap_or_else(|| "%top".to_string());
        if let Some(local) = self.bindings.get(&name) {
            return local.clone();
        }
        let local = self.named_local(&name, value_ty(value));
        self.bindings.insert(name, local.clone());
        local
    }

    /// A host local carrying the value: for variables the bound local, for
    /// constants a fresh typed intermediate initialized to the constant.
    fn materialize(&mut self, value: &ValueRef, prefix: &'static str, ty: Type) -> LocalRef {
        if value_is_constant(value) {
            let local = self.fresh(prefix, ty);
            let constant = host_constant(value);
            self.block.push(Stmt::Assign {
                lhs: LValue::Local(local.clone()),
                rhs: Expr::Constant(constant),
            });
            local
        } else {
            self.bound_local(value)
        }
    }

    fn host_value(&mut self, value: &ValueRef) -> Value {
        if value_is_constant(value) {
            Value::Constant(host_constant(value))
        } else {
            Value::Local(self.bound_local(value))
        }
    }

    fn host_rhs(&mut self, value: &ValueRef) -> Expr {
        if value_is_constant(value) {
            Expr::Constant(host_constant(value))
        } else {
            Expr::Local(self.bound_local(value))
        }
    }

    /// Bind an IR variable to a host local. First binding wins.
    fn bind(&mut self, value: &ValueRef, local: &LocalRef) {
        if let Some(name) = value_name(value) {
            self.bindings.entry(name).or_insert_with(|| local.clone());
        }
    }

    fn named_local(&mut self, name: &str, ty: Type) -> LocalRef {
        let local = Local::new(name, ty);
        self.locals.push(local.clone());
        local
    }

    /// Mint a fresh intermediate local; counters are per name prefix.
    fn fresh(&mut self, prefix: &'static str, ty: Type) -> LocalRef {
        let counter = self.counters.entry(prefix).or_insert(0);
        let name = format!("%{}_{}", prefix, *counter);
        *counter += 1;
        self.named_local(&name, ty)
    }

    fn length_field(&self, on: &str) -> FieldSignature {
        FieldSignature::new(
            ClassSignature::new(
                FileSignature::new(&self.class.file.project, "%builtin"),
                on,
            ),
            "length",
            Type::Number,
        )
    }
}

fn host_constant(value: &ValueRef) -> Constant {
    match &*value.borrow() {
        SummaryValue::Number(n) => Constant::Number(*n),
        SummaryValue::Str(s) => Constant::Str(s.clone()),
        SummaryValue::Null => Constant::Null,
        SummaryValue::Top => Constant::Undefined,
        SummaryValue::Variable { .. } | SummaryValue::Parameter { .. } => Constant::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infer::{infer_types, InferenceContext};
    use crate::loader::load_str;

    fn class() -> ClassSignature {
        ClassSignature::new(
            FileSignature::new("app", "@nodeapiFileentry"),
            "@nodeapiClassentry",
        )
    }

    fn lower(instructions: &str, sub: &MethodSubSignature) -> Body {
        let text = format!(
            r#"{{"hap_name": "app", "so_name": "libentry.so", "module_name": "entry",
                "functions": [{{"name": "f",
                    "params": {{"0": "napi_env", "1": "napi_callback_info"}},
                    "instructions": {instructions}}}]}}"#
        );
        let module = load_str(&text, "test").unwrap();
        let func = module.function("f").unwrap().deep_copy();
        let ctx = InferenceContext::new(class())
            .with_real_arg_types(sub.params.iter().map(|p| p.ty.clone()).collect());
        infer_types(&func, &ctx);
        lower_function(&func, &class(), sub)
    }

    fn void_sub() -> MethodSubSignature {
        MethodSubSignature::new("f", Vec::new(), Type::Void)
    }

    fn stmt_strings(body: &Body) -> Vec<String> {
        body.cfg.blocks[0]
            .stmts
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_create_int32_from_constant() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_create_int32",
                 "operands": ["env", "long 7"], "rets": {"r": "2"}},
                {"type": "Ret", "operand": "r"}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        // Prologue binds `this`, then the constant materializes and returns.
        assert_eq!(
            stmts,
            vec![
                "this = this: app/@nodeapiFileentry: @nodeapiClassentry".to_string(),
                "%number_0 = 7".to_string(),
                "return %number_0".to_string(),
            ]
        );
    }

    #[test]
    fn test_string_extract_copies_buffer_and_reads_length() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_get_value_string_utf8",
                 "operands": ["env", "s", "buf", "long 16", "len"],
                 "rets": {"r": "2", "l": "4"}}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        assert!(stmts.contains(&"buf = s".to_string()));
        assert!(stmts.contains(&"%length_0 = s.length".to_string()));
    }

    #[test]
    fn test_array_create_then_length_share_index_zero() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_create_array",
                 "operands": ["env"], "rets": {"a": "2"}},
                {"type": "Call", "callsite": "1", "target": "napi_get_array_length",
                 "operands": ["env", "a"], "rets": {"n": "2"}}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        assert!(stmts.contains(&"%array_0 = newarray (any)[0]".to_string()));
        assert!(stmts.contains(&"%array_length_0 = %array_0.length".to_string()));
    }

    #[test]
    fn test_is_array_emits_instanceof() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_is_array",
                 "operands": ["env", "a"], "rets": {"b": "2"}}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        assert!(stmts.contains(&"%is_array_0 = a instanceof any[]".to_string()));
    }

    #[test]
    fn test_element_set_and_get() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_create_array_with_length",
                 "operands": ["env", "long 2"], "rets": {"a": "2"}},
                {"type": "Call", "callsite": "1", "target": "napi_set_element",
                 "operands": ["env", "a", "long 0", "x"], "rets": {}},
                {"type": "Call", "callsite": "2", "target": "napi_get_element",
                 "operands": ["env", "a", "long 1"], "rets": {"e": "3"}}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        assert!(stmts.contains(&"%array_0 = newarray (any)[2]".to_string()));
        assert!(stmts.contains(&"%array_0[0] = x".to_string()));
        assert!(stmts.contains(&"%get_element_0 = %array_0[1]".to_string()));
    }

    #[test]
    fn test_log_print_level_six_dispatches_to_error() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "OH_LOG_Print",
                 "operands": ["env", "long 6", "dom", "tag", "fmt"],
                 "argsoperands": ["x", "y"], "rets": {}}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        assert!(stmts.contains(&"error(dom, tag, fmt, x, y)".to_string()));
    }

    #[test]
    fn test_log_print_unknown_level_defaults_to_info() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "OH_LOG_Print",
                 "operands": ["env", "long 9", "dom", "tag", "fmt"], "rets": {}}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        assert!(stmts.contains(&"info(dom, tag, fmt)".to_string()));
    }

    #[test]
    fn test_phi_skips_constant_operands() {
        let body = lower(
            r#"[
                {"type": "Phi", "ret": "r", "operands": ["x", "long 1", "y"]},
                {"type": "Ret", "operand": "r"}
            ]"#,
            &void_sub(),
        );
        let stmts = stmt_strings(&body);
        assert!(stmts.contains(&"r = phi(x, y)".to_string()));
    }

    #[test]
    fn test_void_return_for_top_operand() {
        let body = lower(r#"[{"type": "Ret", "operand": "top"}]"#, &void_sub());
        let stmts = stmt_strings(&body);
        assert_eq!(stmts.last().unwrap(), "return");
    }

    #[test]
    fn test_unresolved_return_warns_and_goes_void() {
        use crate::diagnostics::DiagnosticsCollector;
        DiagnosticsCollector::enable();
        let _ = DiagnosticsCollector::take();
        let body = lower(r#"[{"type": "Ret", "operand": "ghost"}]"#, &void_sub());
        let stmts = stmt_strings(&body);
        assert_eq!(stmts.last().unwrap(), "return");
        let diags = DiagnosticsCollector::take();
        assert!(diags
            .iter()
            .any(|d| matches!(d, DiagnosticReason::UnresolvedReturnOperand(_))));
        DiagnosticsCollector::disable();
    }

    #[test]
    fn test_unknown_target_emits_nothing_with_warning() {
        use crate::diagnostics::DiagnosticsCollector;
        DiagnosticsCollector::enable();
        let _ = DiagnosticsCollector::take();
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_mystery",
                 "operands": ["env"], "rets": {}}
            ]"#,
            &void_sub(),
        );
        // Only the `this` prologue statement.
        assert_eq!(body.stmt_count(), 1);
        let diags = DiagnosticsCollector::take();
        assert!(diags
            .iter()
            .any(|d| matches!(d, DiagnosticReason::UnknownCallTarget(t) if t == "napi_mystery")));
        DiagnosticsCollector::disable();
    }

    #[test]
    fn test_noop_handlers_emit_nothing_without_warning() {
        use crate::diagnostics::DiagnosticsCollector;
        DiagnosticsCollector::enable();
        let _ = DiagnosticsCollector::take();
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_set_property",
                 "operands": ["env", "o", "k", "v"], "rets": {}},
                {"type": "Call", "callsite": "1", "target": "napi_coerce_to_number",
                 "operands": ["env", "v"], "rets": {"n": "2"}}
            ]"#,
            &void_sub(),
        );
        assert_eq!(body.stmt_count(), 1);
        // Recognized no-op targets are not "unknown".
        let diags = DiagnosticsCollector::take();
        assert!(!diags
            .iter()
            .any(|d| matches!(d, DiagnosticReason::UnknownCallTarget(_))));
        DiagnosticsCollector::disable();
    }

    #[test]
    fn test_declared_parameters_bind_real_args() {
        let sub = MethodSubSignature::new(
            "f",
            vec![
                native_body_rebuilder_model::MethodParameter::new("a", Type::Number),
                native_body_rebuilder_model::MethodParameter::new("b", Type::Number),
            ],
            Type::Number,
        );
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_get_cb_info",
                 "operands": ["0", "1"], "rets": {"x": "3", "y": "3"}},
                {"type": "Call", "callsite": "1", "target": "napi_get_value_int32",
                 "operands": ["env", "x", "out"], "rets": {"r": "2"}},
                {"type": "Ret", "operand": "r"}
            ]"#,
            &sub,
        );
        let stmts = stmt_strings(&body);
        assert_eq!(stmts[0], "a = parameter0: number");
        assert_eq!(stmts[1], "b = parameter1: number");
        // `x` is bound to the parameter local `a`, so the extract reads `a`.
        assert!(stmts.contains(&"r = a".to_string()));
    }

    #[test]
    fn test_statement_count_is_linear_in_instructions() {
        let body = lower(
            r#"[
                {"type": "Call", "callsite": "0", "target": "napi_create_int32",
                 "operands": ["env", "long 1"], "rets": {"r1": "2"}},
                {"type": "Call", "callsite": "1", "target": "napi_get_value_string_utf8",
                 "operands": ["env", "s", "buf", "long 8", "len"], "rets": {"r2": "2", "l": "4"}},
                {"type": "Phi", "ret": "p", "operands": ["r1", "r2"]},
                {"type": "Ret", "operand": "p"}
            ]"#,
            &void_sub(),
        );
        // 4 instructions, at most 3 statements each, plus the prologue.
        assert!(body.stmt_count() <= 4 * 3 + 1);
    }
}
