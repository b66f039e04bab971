//! Values and expressions appearing in method bodies.
//!
//! Locals are shared handles: the body owns the local table, statements hold
//! `Rc` clones of the same `Local`, and the local's type is interior-mutable
//! so later refinement is visible everywhere the local appears.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::signatures::{ClassSignature, FieldSignature, MethodSignature};
use crate::types::Type;

/// A method-body local variable.
#[derive(Debug)]
pub struct Local {
    name: String,
    ty: RefCell<Type>,
}

/// Shared handle to a [`Local`].
pub type LocalRef = Rc<Local>;

impl Local {
    /// Create a fresh local with the given name and type.
    pub fn new(name: impl Into<String>, ty: Type) -> LocalRef {
        Rc::new(Self {
            name: name.into(),
            ty: RefCell::new(ty),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> Type {
        self.ty.borrow().clone()
    }

    pub fn set_ty(&self, ty: Type) {
        *self.ty.borrow_mut() = ty;
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Number(i64),
    Str(String),
    Boolean(bool),
    Null,
    Undefined,
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Constant::Number(_) => Type::Number,
            Constant::Str(_) => Type::String,
            Constant::Boolean(_) => Type::Boolean,
            Constant::Null => Type::Null,
            Constant::Undefined => Type::Undefined,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Number(n) => write!(f, "{}", n),
            Constant::Str(s) => write!(f, "\"{}\"", s),
            Constant::Boolean(b) => write!(f, "{}", b),
            Constant::Null => write!(f, "null"),
            Constant::Undefined => write!(f, "undefined"),
        }
    }
}

/// An operand: a local or a constant.
#[derive(Debug, Clone)]
pub enum Value {
    Local(LocalRef),
    Constant(Constant),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Local(l) => l.ty(),
            Value::Constant(c) => c.ty(),
        }
    }

    pub fn as_local(&self) -> Option<&LocalRef> {
        match self {
            Value::Local(l) => Some(l),
            Value::Constant(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Local(l) => write!(f, "{}", l),
            Value::Constant(c) => write!(f, "{}", c),
        }
    }
}

/// A call expression, in one of the three host call forms.
#[derive(Debug, Clone)]
pub enum InvokeExpr {
    /// `base.m(args)` through a receiver local.
    Instance {
        base: LocalRef,
        method: MethodSignature,
        args: Vec<Value>,
    },
    /// `m(args)` through a free name.
    Static {
        method: MethodSignature,
        args: Vec<Value>,
    },
    /// A call through a function-typed local. `text` preserves the source
    /// snippet of the call when the front end recorded one.
    Ptr {
        func: LocalRef,
        method: MethodSignature,
        args: Vec<Value>,
        text: Option<String>,
    },
}

impl InvokeExpr {
    pub fn method(&self) -> &MethodSignature {
        match self {
            InvokeExpr::Instance { method, .. }
            | InvokeExpr::Static { method, .. }
            | InvokeExpr::Ptr { method, .. } => method,
        }
    }

    /// Replace the target signature, rebinding the call.
    pub fn set_method(&mut self, sig: MethodSignature) {
        match self {
            InvokeExpr::Instance { method, .. }
            | InvokeExpr::Static { method, .. }
            | InvokeExpr::Ptr { method, .. } => *method = sig,
        }
    }

    pub fn args(&self) -> &[Value] {
        match self {
            InvokeExpr::Instance { args, .. }
            | InvokeExpr::Static { args, .. }
            | InvokeExpr::Ptr { args, .. } => args,
        }
    }

    /// The apparent method name at the call site.
    pub fn name(&self) -> &str {
        self.method().name()
    }

    /// The receiver local for instance invokes, the callee local for
    /// pointer invokes.
    pub fn base(&self) -> Option<&LocalRef> {
        match self {
            InvokeExpr::Instance { base, .. } => Some(base),
            InvokeExpr::Ptr { func, .. } => Some(func),
            InvokeExpr::Static { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            InvokeExpr::Ptr { text, .. } => text.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for InvokeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args()
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            InvokeExpr::Instance { base, .. } => write!(f, "{}.{}({})", base, self.name(), args),
            InvokeExpr::Static { .. } => write!(f, "{}({})", self.name(), args),
            InvokeExpr::Ptr { func, .. } => write!(f, "{}({})", func, args),
        }
    }
}

/// A right-hand side of an assignment (or a bare invoke).
#[derive(Debug, Clone)]
pub enum Expr {
    Constant(Constant),
    Local(LocalRef),
    /// Positional reference to the enclosing method's parameter.
    Parameter { index: usize, ty: Type },
    /// The `this` reference of the enclosing class.
    This { class: ClassSignature },
    /// Field read `base.field`.
    FieldRef { base: LocalRef, field: FieldSignature },
    /// Array read `base[index]`.
    ArrayRef { base: LocalRef, index: Value },
    /// Array allocation `new elem[size]`.
    NewArray { elem: Type, size: Value },
    /// `value instanceof check`.
    InstanceOf { value: LocalRef, check: Type },
    /// SSA merge of the argument locals.
    Phi { args: Vec<LocalRef> },
    Invoke(InvokeExpr),
}

impl Expr {
    pub fn ty(&self) -> Type {
        match self {
            Expr::Constant(c) => c.ty(),
            Expr::Local(l) => l.ty(),
            Expr::Parameter { ty, .. } => ty.clone(),
            Expr::This { class } => Type::Class(class.clone()),
            Expr::FieldRef { field, .. } => field.ty.clone(),
            Expr::ArrayRef { base, .. } => match base.ty() {
                Type::Array { elem, .. } => *elem,
                _ => Type::Any,
            },
            Expr::NewArray { elem, .. } => Type::array_of(elem.clone(), 1),
            Expr::InstanceOf { .. } => Type::Boolean,
            Expr::Phi { args } => args.first().map(|l| l.ty()).unwrap_or(Type::Any),
            Expr::Invoke(inv) => inv.method().sub.return_ty.clone(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(c) => write!(f, "{}", c),
            Expr::Local(l) => write!(f, "{}", l),
            Expr::Parameter { index, ty } => write!(f, "parameter{}: {}", index, ty),
            Expr::This { class } => write!(f, "this: {}", class),
            Expr::FieldRef { base, field } => write!(f, "{}.{}", base, field.name),
            Expr::ArrayRef { base, index } => write!(f, "{}[{}]", base, index),
            Expr::NewArray { elem, size } => write!(f, "newarray ({})[{}]", elem, size),
            Expr::InstanceOf { value, check } => write!(f, "{} instanceof {}", value, check),
            Expr::Phi { args } => {
                write!(f, "phi(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Expr::Invoke(inv) => write!(f, "{}", inv),
        }
    }
}
