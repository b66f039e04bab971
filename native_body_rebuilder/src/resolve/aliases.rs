//! Alias tables built from a file's import declarations.

use indexmap::IndexMap;

use native_body_rebuilder_model::{ImportDecl, ImportKind};

use crate::naming::native_library_of;

/// A named-function alias: one local name standing for one exported
/// function of one library.
#[derive(Debug, Clone)]
pub struct NamedAlias {
    pub library: String,
    pub exported: String,
}

/// The three per-file alias tables the resolver consults: whole-module
/// aliases from imports, named-function aliases, and dynamic module aliases
/// from run-time loads.
#[derive(Debug, Default)]
pub struct AliasTables {
    module_alias: IndexMap<String, String>,
    named_alias: IndexMap<String, NamedAlias>,
    dynamic_alias: IndexMap<String, String>,
}

impl AliasTables {
    /// Classify a file's imports. Only imports whose source path carries
    /// the native binary suffix contribute.
    pub fn from_imports(imports: &[ImportDecl]) -> Self {
        let mut tables = Self::default();
        for decl in imports {
            let Some(library) = native_library_of(&decl.source) else {
                continue;
            };
            match decl.kind {
                ImportKind::Default | ImportKind::Namespace | ImportKind::EqualsRequire => {
                    tables
                        .module_alias
                        .insert(decl.local.clone(), library.to_string());
                }
                ImportKind::Named => {
                    let alias = NamedAlias {
                        library: library.to_string(),
                        exported: decl.imported_name().to_string(),
                    };
                    // An aliased import binds both the alias and the
                    // original exported name.
                    if let Some(original) = &decl.original {
                        tables.named_alias.insert(original.clone(), alias.clone());
                    }
                    tables.named_alias.insert(decl.local.clone(), alias);
                }
                ImportKind::SideEffect => {}
            }
        }
        tables
    }

    /// Record a dynamic module alias from a run-time load.
    pub fn record_dynamic(&mut self, local: &str, library: &str) {
        self.dynamic_alias
            .insert(local.to_string(), library.to_string());
    }

    /// The library a whole-module alias (static or dynamic) refers to.
    pub fn module_library(&self, local: &str) -> Option<&str> {
        self.module_alias
            .get(local)
            .or_else(|| self.dynamic_alias.get(local))
            .map(String::as_str)
    }

    pub fn named(&self, local: &str) -> Option<&NamedAlias> {
        self.named_alias.get(local)
    }

    pub fn is_empty(&self) -> bool {
        self.module_alias.is_empty() && self.named_alias.is_empty() && self.dynamic_alias.is_empty()
    }
}
