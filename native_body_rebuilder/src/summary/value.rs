//! The summary-IR value universe: variables, parameters, and constants.
//!
//! Values are interned per function: two occurrences of the same textual
//! token resolve to the same shared object. Variables and parameters carry
//! an inferred host type that the fixpoint refines in place; constants are
//! immutable and may be shared across copies of a function.

use std::cell::RefCell;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use indexmap::IndexMap;
use native_body_rebuilder_model::Type;

/// One summary-IR operand.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryValue {
    Variable {
        name: String,
        ty: Type,
    },
    Parameter {
        name: String,
        decl_ty: String,
        ty: Type,
    },
    /// Integer constant (`long N` token).
    Number(i64),
    /// String constant (`char* "…"` token).
    Str(String),
    /// The `null` token.
    Null,
    /// The `top` token: an irrelevant/unused slot.
    Top,
}

/// Shared handle to an interned [`SummaryValue`].
pub type ValueRef = Rc<RefCell<SummaryValue>>;

impl SummaryValue {
    /// The textual token form, the intern key.
    pub fn token(&self) -> String {
        match self {
            SummaryValue::Variable { name, .. } | SummaryValue::Parameter { name, .. } => {
                name.clone()
            }
            SummaryValue::Number(n) => format!("long {}", n),
            SummaryValue::Str(s) => format!("char* \"{}\"", s),
            SummaryValue::Null => "null".to_string(),
            SummaryValue::Top => "top".to_string(),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            SummaryValue::Number(_) | SummaryValue::Str(_) | SummaryValue::Null | SummaryValue::Top
        )
    }

    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            SummaryValue::Variable { .. } | SummaryValue::Parameter { .. }
        )
    }

    /// The variable or parameter name; `None` for constants.
    pub fn name(&self) -> Option<String> {
        match self {
            SummaryValue::Variable { name, .. } | SummaryValue::Parameter { name, .. } => {
                Some(name.clone())
            }
            _ => None,
        }
    }

    /// The inferred host type. Constants have fixed types.
    pub fn ty(&self) -> Type {
        match self {
            SummaryValue::Variable { ty, .. } | SummaryValue::Parameter { ty, .. } => ty.clone(),
            SummaryValue::Number(_) => Type::Number,
            SummaryValue::Str(_) => Type::String,
            SummaryValue::Null => Type::Null,
            SummaryValue::Top => Type::Any,
        }
    }
}

/// Refine the inferred type of a variable or parameter. Constants are left
/// untouched.
pub fn set_value_ty(value: &ValueRef, new_ty: Type) {
    let mut v = value.borrow_mut();
    match &mut *v {
        SummaryValue::Variable { ty, .. } | SummaryValue::Parameter { ty, .. } => *ty = new_ty,
        _ => {}
    }
}

pub fn value_ty(value: &ValueRef) -> Type {
    value.borrow().ty()
}

pub fn value_token(value: &ValueRef) -> String {
    value.borrow().token()
}

pub fn value_name(value: &ValueRef) -> Option<String> {
    value.borrow().name()
}

pub fn value_is_constant(value: &ValueRef) -> bool {
    value.borrow().is_constant()
}

/// A constant token that looked like `long …`/`char* …` but failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedToken(pub String);

static LONG_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^long (-?\d+)$").expect("long token pattern"));
static CHAR_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^char\* "(.*)"$"#).expect("char* token pattern"));

/// Per-function intern table. Equal tokens share identity within one
/// function; the table is rebuilt for every deep copy.
#[derive(Debug, Default)]
pub struct ValueTable {
    values: IndexMap<String, ValueRef>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a token, classifying it per the document grammar:
    /// `null`, `top`, `long N`, `char* "…"`, anything else a variable.
    pub fn intern(&mut self, token: &str) -> Result<ValueRef, MalformedToken> {
        if let Some(existing) = self.values.get(token) {
            return Ok(Rc::clone(existing));
        }
        let value = classify_token(token)?;
        let shared = Rc::new(RefCell::new(value));
        self.values.insert(token.to_string(), Rc::clone(&shared));
        Ok(shared)
    }

    /// Intern a parameter under its positional token.
    pub fn intern_parameter(&mut self, token: &str, decl_ty: &str) -> ValueRef {
        if let Some(existing) = self.values.get(token) {
            return Rc::clone(existing);
        }
        let shared = Rc::new(RefCell::new(SummaryValue::Parameter {
            name: token.to_string(),
            decl_ty: decl_ty.to_string(),
            ty: Type::Unknown,
        }));
        self.values.insert(token.to_string(), Rc::clone(&shared));
        shared
    }

    /// Insert an already-built value under its token (deep-copy path).
    pub fn insert(&mut self, value: ValueRef) {
        let token = value.borrow().token();
        self.values.insert(token, value);
    }

    pub fn get(&self, token: &str) -> Option<ValueRef> {
        self.values.get(token).map(Rc::clone)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ValueRef)> {
        self.values.iter()
    }
}

fn classify_token(token: &str) -> Result<SummaryValue, MalformedToken> {
    match token {
        "null" => return Ok(SummaryValue::Null),
        "top" => return Ok(SummaryValue::Top),
        _ => {}
    }
    if token.starts_with("long ") || token == "long" {
        let caps = LONG_TOKEN
            .captures(token)
            .ok_or_else(|| MalformedToken(token.to_string()))?;
        let n = caps[1]
            .parse::<i64>()
            .map_err(|_| MalformedToken(token.to_string()))?;
        return Ok(SummaryValue::Number(n));
    }
    if token.starts_with("char*") {
        let caps = CHAR_TOKEN
            .captures(token)
            .ok_or_else(|| MalformedToken(token.to_string()))?;
        return Ok(SummaryValue::Str(caps[1].to_string()));
    }
    Ok(SummaryValue::Variable {
        name: token.to_string(),
        ty: Type::Unknown,
    })
}
