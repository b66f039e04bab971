//! Join operation on the host type lattice.
//!
//! The lattice is flat: `Unknown` at the bottom, `Any` at the top, the
//! concrete types side by side in between. Object and array types compare
//! structurally (class signature; element type plus dimensionality).
//!
//! ```text
//! T ⊔ T       = T
//! T ⊔ Unknown = T
//! T ⊔ Any     = Any
//! T ⊔ U       = Any   (incompatible concrete types, with a warning)
//! ```

use native_body_rebuilder_model::Type;

use crate::diagnostics::{emit, DiagnosticReason};

/// Least upper bound of two types.
pub fn join(a: &Type, b: &Type) -> Type {
    match (a, b) {
        (t, u) if t == u => t.clone(),
        (Type::Unknown, t) | (t, Type::Unknown) => t.clone(),
        (Type::Any, _) | (_, Type::Any) => Type::Any,
        (t, u) => {
            emit(DiagnosticReason::IncompatibleJoin(
                t.to_string(),
                u.to_string(),
            ));
            Type::Any
        }
    }
}

/// Join over an iterator; `Unknown` when empty.
pub fn join_all<'a>(types: impl Iterator<Item = &'a Type>) -> Type {
    types.fold(Type::Unknown, |acc, t| join(&acc, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticsCollector;

    #[test]
    fn test_identity_and_bounds() {
        assert_eq!(join(&Type::Number, &Type::Number), Type::Number);
        assert_eq!(join(&Type::Unknown, &Type::String), Type::String);
        assert_eq!(join(&Type::Unknown, &Type::Unknown), Type::Unknown);
        assert_eq!(join(&Type::Boolean, &Type::Any), Type::Any);
    }

    #[test]
    fn test_incompatible_concrete_types_widen_with_warning() {
        DiagnosticsCollector::enable();
        let _ = DiagnosticsCollector::take();
        assert_eq!(join(&Type::String, &Type::Number), Type::Any);
        let diags = DiagnosticsCollector::take();
        assert!(diags
            .iter()
            .any(|d| matches!(d, DiagnosticReason::IncompatibleJoin(_, _))));
        DiagnosticsCollector::disable();
    }

    #[test]
    fn test_array_join_is_structural() {
        let a = Type::array_of(Type::Number, 1);
        let b = Type::array_of(Type::Number, 1);
        assert_eq!(join(&a, &b), a);

        DiagnosticsCollector::disable();
        let c = Type::array_of(Type::Number, 2);
        assert_eq!(join(&a, &c), Type::Any);
    }

    #[test]
    fn test_join_all_of_empty_is_unknown() {
        assert_eq!(join_all(std::iter::empty()), Type::Unknown);
    }
}
