//! Import declarations read off host files.

/// The shape of an import declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import M from '...'`
    Default,
    /// `import { f } from '...'` or `import { f as g } from '...'`
    Named,
    /// `import * as M from '...'`
    Namespace,
    /// `import '...'` with no binding.
    SideEffect,
    /// `import M = require('...')`
    EqualsRequire,
}

/// One import declaration: binding kind, the local name it introduces, the
/// original exported name (for aliased named imports), and the source path.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub kind: ImportKind,
    pub local: String,
    pub original: Option<String>,
    pub source: String,
}

impl ImportDecl {
    pub fn default_import(local: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::Default,
            local: local.into(),
            original: None,
            source: source.into(),
        }
    }

    pub fn named(
        local: impl Into<String>,
        original: Option<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind: ImportKind::Named,
            local: local.into(),
            original,
            source: source.into(),
        }
    }

    pub fn namespace(local: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::Namespace,
            local: local.into(),
            original: None,
            source: source.into(),
        }
    }

    pub fn side_effect(source: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::SideEffect,
            local: String::new(),
            original: None,
            source: source.into(),
        }
    }

    pub fn equals_require(local: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::EqualsRequire,
            local: local.into(),
            original: None,
            source: source.into(),
        }
    }

    /// The exported name this import refers to (the alias target for
    /// `import { f as g }`, the local name otherwise).
    pub fn imported_name(&self) -> &str {
        self.original.as_deref().unwrap_or(&self.local)
    }
}
