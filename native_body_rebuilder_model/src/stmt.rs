//! Three-address statements.

use std::fmt;

use crate::value::{Expr, InvokeExpr, LocalRef, Value};

/// An assignable position.
#[derive(Debug, Clone)]
pub enum LValue {
    Local(LocalRef),
    /// Array store target `base[index]`.
    ArrayRef { base: LocalRef, index: Value },
}

impl fmt::Display for LValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LValue::Local(l) => write!(f, "{}", l),
            LValue::ArrayRef { base, index } => write!(f, "{}[{}]", base, index),
        }
    }
}

/// A statement in a method body.
#[derive(Debug, Clone)]
pub enum Stmt {
    Assign { lhs: LValue, rhs: Expr },
    /// A bare invoke whose result is discarded.
    Invoke(InvokeExpr),
    /// `return value` or a void return.
    Return(Option<Value>),
}

impl Stmt {
    pub fn contains_invoke(&self) -> bool {
        self.invoke().is_some()
    }

    /// The invoke expression inside this statement, if any.
    pub fn invoke(&self) -> Option<&InvokeExpr> {
        match self {
            Stmt::Invoke(inv) => Some(inv),
            Stmt::Assign {
                rhs: Expr::Invoke(inv),
                ..
            } => Some(inv),
            _ => None,
        }
    }

    pub fn invoke_mut(&mut self) -> Option<&mut InvokeExpr> {
        match self {
            Stmt::Invoke(inv) => Some(inv),
            Stmt::Assign {
                rhs: Expr::Invoke(inv),
                ..
            } => Some(inv),
            _ => None,
        }
    }

    /// The left-hand local of an assignment statement.
    pub fn lhs_local(&self) -> Option<&LocalRef> {
        match self {
            Stmt::Assign {
                lhs: LValue::Local(l),
                ..
            } => Some(l),
            _ => None,
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Assign { lhs, rhs } => write!(f, "{} = {}", lhs, rhs),
            Stmt::Invoke(inv) => write!(f, "{}", inv),
            Stmt::Return(Some(v)) => write!(f, "return {}", v),
            Stmt::Return(None) => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::{ClassSignature, FileSignature, MethodSignature, MethodSubSignature};
    use crate::types::Type;
    use crate::value::{Constant, Local};

    fn invoke() -> InvokeExpr {
        let sig = MethodSignature::new(
            ClassSignature::new(FileSignature::new("p", "f.ets"), "C"),
            MethodSubSignature::new("m", Vec::new(), Type::Void),
        );
        InvokeExpr::Static {
            method: sig,
            args: Vec::new(),
        }
    }

    #[test]
    fn test_invoke_detection_covers_assignments() {
        let bare = Stmt::Invoke(invoke());
        assert!(bare.contains_invoke());

        let assigned = Stmt::Assign {
            lhs: LValue::Local(Local::new("r", Type::Any)),
            rhs: Expr::Invoke(invoke()),
        };
        assert!(assigned.contains_invoke());
        assert!(assigned.lhs_local().is_some());

        let plain = Stmt::Assign {
            lhs: LValue::Local(Local::new("x", Type::Number)),
            rhs: Expr::Constant(Constant::Number(1)),
        };
        assert!(!plain.contains_invoke());
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Stmt::Return(None).to_string(), "return");
        let s = Stmt::Assign {
            lhs: LValue::Local(Local::new("x", Type::Number)),
            rhs: Expr::Constant(Constant::Number(7)),
        };
        assert_eq!(s.to_string(), "x = 7");
    }
}
