//! Stub host models and summary documents shared by the integration tests.

// Each integration binary uses its own slice of these helpers.
#![allow(dead_code)]

use native_body_rebuilder::loader::{load_str, SummaryStore};
use native_body_rebuilder_model::{
    BasicBlock, Body, Cfg, Class, ClassSignature, Constant, Expr, File, FileSignature, ImportDecl,
    InvokeExpr, LValue, Local, Method, MethodSignature, MethodSubSignature, Model, Stmt, Type,
    Value,
};

pub const PROJECT: &str = "app";
pub const HOST_FILE: &str = "pages/Index.ets";
pub const HOST_CLASS: &str = "%dflt";
pub const HOST_METHOD: &str = "onClick";

pub fn host_file_sig() -> FileSignature {
    FileSignature::new(PROJECT, HOST_FILE)
}

/// Signature a host call site carries before resolution: the apparent
/// method name, unknown everything else.
pub fn unresolved_sig(name: &str) -> MethodSignature {
    MethodSignature::new(
        ClassSignature::new(host_file_sig(), HOST_CLASS),
        MethodSubSignature::new(name, Vec::new(), Type::Unknown),
    )
}

/// `base.name(args)` as an assignment `result = base.name(args)`.
pub fn assigned_instance_call(base: &str, name: &str, args: Vec<Value>) -> Stmt {
    Stmt::Assign {
        lhs: LValue::Local(Local::new("result", Type::Unknown)),
        rhs: Expr::Invoke(InvokeExpr::Instance {
            base: Local::new(base, Type::Any),
            method: unresolved_sig(name),
            args,
        }),
    }
}

pub fn number_args(values: &[i64]) -> Vec<Value> {
    values
        .iter()
        .map(|n| Value::Constant(Constant::Number(*n)))
        .collect()
}

/// A model with one host file, one class, and one method holding `stmts`.
pub fn stub_model(imports: Vec<ImportDecl>, stmts: Vec<Stmt>) -> Model {
    let mut model = Model::new(PROJECT);
    let file_sig = host_file_sig();
    let mut file = File::new(file_sig.clone(), HOST_FILE);
    for decl in imports {
        file.add_import(decl);
    }

    let class_sig = ClassSignature::new(file_sig, HOST_CLASS);
    let mut class = Class::new(class_sig.clone());
    let mut block = BasicBlock::new();
    for stmt in stmts {
        block.push(stmt);
    }
    class.add_method(Method::with_body(
        MethodSignature::new(class_sig, MethodSubSignature::new(HOST_METHOD, Vec::new(), Type::Void)),
        Body::new(Vec::new(), Cfg::single_block(block)),
    ));
    file.add_class(class);
    model.add_file(file);
    model
}

/// Add a binding declaration file (`index.d.ts` under the cpp tree) that
/// declares `add(a: number, b: number): number` for `libentry`.
pub fn add_entry_declarations(model: &mut Model) {
    let path = "entry/src/main/cpp/types/libentry/index.d.ts";
    let sig = FileSignature::new(PROJECT, path);
    let mut file = File::new(sig.clone(), path);
    let class_sig = ClassSignature::new(sig, HOST_CLASS);
    let mut class = Class::new(class_sig.clone());
    class.add_method(Method::new(MethodSignature::new(
        class_sig,
        MethodSubSignature::new(
            "add",
            vec![
                native_body_rebuilder_model::MethodParameter::new("a", Type::Number),
                native_body_rebuilder_model::MethodParameter::new("b", Type::Number),
            ],
            Type::Number,
        ),
    )));
    file.add_class(class);
    model.add_file(file);
}

/// The `entry` module document: one export `add` that recovers two
/// arguments, extracts them, and returns a freshly created number.
pub fn entry_doc() -> &'static str {
    r#"{
        "hap_name": "app",
        "so_name": "libentry.so",
        "module_name": "entry",
        "functions": [
            {
                "name": "add",
                "params": {"0": "napi_env", "1": "napi_callback_info"},
                "instructions": [
                    {"type": "Call", "callsite": "0", "target": "napi_get_cb_info",
                     "operands": ["0", "1"], "rets": {"a": "3", "b": "3"}},
                    {"type": "Call", "callsite": "1", "target": "napi_get_value_int32",
                     "operands": ["0", "a", "av"], "rets": {"x": "2"}},
                    {"type": "Call", "callsite": "2", "target": "napi_get_value_int32",
                     "operands": ["0", "b", "bv"], "rets": {"y": "2"}},
                    {"type": "Call", "callsite": "3", "target": "napi_create_int32",
                     "operands": ["0", "long 7"], "rets": {"r": "2"}},
                    {"type": "Ret", "operand": "r"}
                ]
            }
        ]
    }"#
}

pub fn entry_store() -> SummaryStore {
    let mut store = SummaryStore::new();
    store.insert(load_str(entry_doc(), "entry_doc").unwrap());
    store
}

/// The `tools` module document: a string producer and a logging helper.
pub fn tools_doc() -> &'static str {
    r#"{
        "hap_name": "app",
        "so_name": "libtools.so",
        "module_name": "tools",
        "functions": [
            {
                "name": "greet",
                "params": {"0": "napi_env", "1": "napi_callback_info"},
                "instructions": [
                    {"type": "Call", "callsite": "0", "target": "napi_create_string_utf8",
                     "operands": ["0", "char* \"hi\"", "long 2"], "rets": {"s": "3"}},
                    {"type": "Ret", "operand": "s"}
                ]
            },
            {
                "name": "log",
                "params": {"0": "napi_env", "1": "napi_callback_info"},
                "instructions": [
                    {"type": "Call", "callsite": "0", "target": "OH_LOG_Print",
                     "operands": ["0", "long 6", "dom", "tag", "fmt"],
                     "argsoperands": ["x"], "rets": {}},
                    {"type": "Ret", "operand": "top"}
                ]
            }
        ]
    }"#
}

pub fn tools_store() -> SummaryStore {
    let mut store = SummaryStore::new();
    store.insert(load_str(tools_doc(), "tools_doc").unwrap());
    store
}

/// A bare instance invoke statement `base.name(args)`.
pub fn bare_instance_call(base: &str, name: &str, args: Vec<Value>) -> Stmt {
    Stmt::Invoke(InvokeExpr::Instance {
        base: Local::new(base, Type::Any),
        method: unresolved_sig(name),
        args,
    })
}

/// A bare static invoke statement `name(args)`.
pub fn bare_static_call(name: &str, args: Vec<Value>) -> Stmt {
    Stmt::Invoke(InvokeExpr::Static {
        method: unresolved_sig(name),
        args,
    })
}

/// A pointer invoke through `func`, with the source snippet the front end
/// preserved.
pub fn bare_ptr_call(func: &str, text: &str, args: Vec<Value>) -> Stmt {
    Stmt::Invoke(InvokeExpr::Ptr {
        func: Local::new(func, Type::Any),
        method: unresolved_sig("%AM0"),
        args,
        text: Some(text.to_string()),
    })
}

/// `local = loadNativeModule("source")`.
pub fn dynamic_load(local: &str, source: &str) -> Stmt {
    Stmt::Assign {
        lhs: LValue::Local(Local::new(local, Type::Any)),
        rhs: Expr::Invoke(InvokeExpr::Static {
            method: unresolved_sig("loadNativeModule"),
            args: vec![Value::Constant(Constant::Str(source.to_string()))],
        }),
    }
}

/// All statement strings of a method body, in order.
pub fn body_strings(model: &Model, file: &FileSignature, class: &str, method: &str) -> Vec<String> {
    let file = model.file(file).expect("file");
    let class = file.class(class).expect("class");
    let method = class.method(method).expect("method");
    let body = method.body().expect("body");
    body.cfg
        .blocks
        .iter()
        .flat_map(|b| b.stmts.iter().map(|s| s.to_string()))
        .collect()
}
