//! Signatures identifying files, namespaces, classes, fields, and methods.
//!
//! Signatures are plain structural values. Their `Display` forms are the
//! full-string keys used by whole-program tables, so two signatures compare
//! equal exactly when their rendered forms coincide.

use std::fmt;

use crate::types::Type;

/// Identifies one file of the host program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileSignature {
    pub project: String,
    pub name: String,
}

impl FileSignature {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for FileSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.name)
    }
}

/// Identifies a namespace within a file (used for platform namespaces such
/// as the log surface).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceSignature {
    pub file: FileSignature,
    pub name: String,
}

impl NamespaceSignature {
    pub fn new(file: FileSignature, name: impl Into<String>) -> Self {
        Self {
            file,
            name: name.into(),
        }
    }
}

impl fmt::Display for NamespaceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: @namespace {}", self.file, self.name)
    }
}

/// Identifies a class within a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSignature {
    pub file: FileSignature,
    pub name: String,
}

impl ClassSignature {
    pub fn new(file: FileSignature, name: impl Into<String>) -> Self {
        Self {
            file,
            name: name.into(),
        }
    }
}

impl fmt::Display for ClassSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.name)
    }
}

/// Identifies a field of a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSignature {
    pub class: ClassSignature,
    pub name: String,
    pub ty: Type,
}

impl FieldSignature {
    pub fn new(class: ClassSignature, name: impl Into<String>, ty: Type) -> Self {
        Self {
            class,
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for FieldSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {} {}>", self.class, self.ty, self.name)
    }
}

/// One declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    pub name: String,
    pub ty: Type,
}

impl MethodParameter {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for MethodParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// The class-independent part of a method signature: name, parameter list,
/// return type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSubSignature {
    pub name: String,
    pub params: Vec<MethodParameter>,
    pub return_ty: Type,
}

impl MethodSubSignature {
    pub fn new(name: impl Into<String>, params: Vec<MethodParameter>, return_ty: Type) -> Self {
        Self {
            name: name.into(),
            params,
            return_ty,
        }
    }
}

impl fmt::Display for MethodSubSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, "): {}", self.return_ty)
    }
}

/// A fully qualified method signature: declaring class plus sub-signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub class: ClassSignature,
    pub sub: MethodSubSignature,
}

impl MethodSignature {
    pub fn new(class: ClassSignature, sub: MethodSubSignature) -> Self {
        Self { class, sub }
    }

    pub fn name(&self) -> &str {
        &self.sub.name
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.class, self.sub)
    }
}
