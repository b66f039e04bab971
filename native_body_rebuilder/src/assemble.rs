//! Synthetic-method assembly: one host method per resolved call site.
//!
//! Each loaded module gets one synthetic file and class. For every resolved
//! call site whose library maps to a loaded module, the blueprint function
//! is deep-copied, its method signature selected and refined from the call
//! site, the copy type-inferred and lowered, and the resulting method
//! registered. The original invoke expression is then rebound to the new
//! signature (and optionally converted to a static invoke in place).

use native_body_rebuilder_model::{
    Class, ClassSignature, File, FileSignature, InvokeExpr, Method, MethodParameter,
    MethodSignature, MethodSubSignature, Model, Type,
};

use crate::diagnostics::{emit, DiagnosticReason};
use crate::infer::{infer_types, InferenceContext, DEFAULT_MAX_PASSES};
use crate::lower::lower_function;
use crate::naming::{CLASS_PREFIX, FILE_PREFIX, FUNCTION_PREFIX};
use crate::resolve::ResolvedCallSite;
use crate::summary::SummaryModule;

/// Assembly knobs, carried down from the rebuild configuration.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Convert the original invoke to a static invoke of the synthetic
    /// method, in addition to rebinding its signature.
    pub rewrite_call_sites: bool,
    pub max_inference_passes: usize,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            rewrite_call_sites: false,
            max_inference_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Make sure the module's synthetic file and class exist; both persist for
/// the whole run. Returns the class signature.
pub fn ensure_synthetic_class(model: &mut Model, module: &SummaryModule) -> ClassSignature {
    let file_name = format!("{}{}", FILE_PREFIX, module.module_name());
    let file_sig = FileSignature::new(model.project(), &file_name);
    let class_name = format!("{}{}", CLASS_PREFIX, module.module_name());
    let class_sig = ClassSignature::new(file_sig.clone(), &class_name);

    match model.file_mut(&file_sig) {
        Some(file) => {
            if file.class(&class_name).is_none() {
                file.add_class(Class::new(class_sig.clone()));
            }
        }
        None => {
            let mut file = File::new(file_sig.clone(), &file_name);
            file.add_class(Class::new(class_sig.clone()));
            model.add_file(file);
        }
    }
    class_sig
}

/// Rebuild one call site. Returns `true` when a synthetic method was minted
/// and attached.
pub fn rebuild_call_site(
    model: &mut Model,
    module: &SummaryModule,
    class_sig: &ClassSignature,
    site: &ResolvedCallSite,
    counter: &mut usize,
    options: &AssembleOptions,
) -> bool {
    let Some(blueprint) = module.function(&site.exported) else {
        return false;
    };
    let copy = blueprint.deep_copy();

    let mut sub = select_sub_signature(site);
    refine_parameter_types(&mut sub, site);

    // Multiple call sites of one export produce distinct methods; the
    // counter is monotone across modules within a rebuild.
    sub.name = format!("{}{}_{}", FUNCTION_PREFIX, site.exported, *counter);
    *counter += 1;

    let ctx = InferenceContext {
        object_class: class_sig.clone(),
        real_arg_types: sub.params.iter().map(|p| p.ty.clone()).collect(),
        max_passes: options.max_inference_passes,
    };
    infer_types(&copy, &ctx);
    let body = lower_function(&copy, class_sig, &sub);

    let method_sig = MethodSignature::new(class_sig.clone(), sub);
    if let Some(class) = model
        .file_mut(&class_sig.file)
        .and_then(|file| file.class_mut(&class_sig.name))
    {
        class.add_method(Method::with_body(method_sig.clone(), body));
    }
    model.register_method(&method_sig);

    rebind_call_site(model, site, &method_sig, options);
    true
}

/// Prefer the declared sub-signature; otherwise synthesize one from the
/// call-site argument count.
fn select_sub_signature(site: &ResolvedCallSite) -> MethodSubSignature {
    if let Some(declared) = &site.declared {
        return declared.clone();
    }
    emit(DiagnosticReason::SignatureLookupMiss(site.exported.clone()));
    let params = (0..site.invoke.args().len())
        .map(|i| MethodParameter::new(format!("p{}", i + 1), Type::Unknown))
        .collect();
    MethodSubSignature::new(site.exported.clone(), params, Type::Unknown)
}

/// Refine each parameter's type from the corresponding call-site argument.
/// Unknown argument types default to String.
fn refine_parameter_types(sub: &mut MethodSubSignature, site: &ResolvedCallSite) {
    let args = site.invoke.args();
    for (index, param) in sub.params.iter_mut().enumerate() {
        let Some(arg) = args.get(index) else {
            continue;
        };
        let arg_ty = arg.ty();
        if arg_ty.is_unknown() {
            emit(DiagnosticReason::UnknownArgumentType(
                site.exported.clone(),
                index,
            ));
            param.ty = Type::String;
        } else {
            param.ty = arg_ty;
        }
    }
}

/// Rebind the original invoke's signature to the synthetic method, and
/// optionally convert it to a static invoke in place. The statement is
/// addressed by its recorded position; identity with the recorded invoke is
/// verified and a mismatch warned, never corrupting the statement.
fn rebind_call_site(
    model: &mut Model,
    site: &ResolvedCallSite,
    new_sig: &MethodSignature,
    options: &AssembleOptions,
) {
    let Ok(method) = model.method_at_mut(&site.file, &site.class, &site.method) else {
        emit(DiagnosticReason::StatementReplacementMismatch(
            site.exported.clone(),
        ));
        return;
    };
    let Some(stmt) = method
        .body_mut()
        .and_then(|body| body.cfg.blocks.get_mut(site.block))
        .and_then(|block| block.stmts.get_mut(site.stmt))
    else {
        emit(DiagnosticReason::StatementReplacementMismatch(
            site.exported.clone(),
        ));
        return;
    };
    let Some(invoke) = stmt.invoke_mut() else {
        emit(DiagnosticReason::StatementReplacementMismatch(
            site.exported.clone(),
        ));
        return;
    };

    if invoke.name() != site.invoke.name() || invoke.args().len() != site.invoke.args().len() {
        emit(DiagnosticReason::StatementReplacementMismatch(
            site.exported.clone(),
        ));
    }

    invoke.set_method(new_sig.clone());
    if options.rewrite_call_sites {
        *invoke = InvokeExpr::Static {
            method: new_sig.clone(),
            args: invoke.args().to_vec(),
        };
    }
}
