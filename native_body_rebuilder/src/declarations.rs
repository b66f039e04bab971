//! Indexer over binding declaration files.
//!
//! Native libraries ship declaration-only files next to their source tree
//! (`*.d.ts` under a `cpp` directory). Every exported function declared
//! there is indexed by library (the basename of the file's containing
//! directory) so the assembler can prefer a declared signature over one
//! synthesized from a call site.

use std::path::Path;

use indexmap::IndexMap;

use native_body_rebuilder_model::{MethodSubSignature, Model};

use crate::naming::FUNCTION_PREFIX;

/// Flat index of declared sub-signatures. Each declaration registers under
/// the four key forms the resolver's lookup chain probes; the first
/// registration of a key wins.
#[derive(Debug, Default)]
pub struct DeclaredSignatures {
    by_key: IndexMap<String, MethodSubSignature>,
    exports: IndexMap<String, Vec<String>>,
}

impl DeclaredSignatures {
    /// Look up the declared sub-signature for `library`'s exported `name`,
    /// probing `lib.@nodeapiFunction<name>`, `@nodeapiFunction<name>`,
    /// `lib.<name>`, `<name>` in that order.
    pub fn lookup(&self, library: &str, name: &str) -> Option<&MethodSubSignature> {
        let keys = [
            format!("{}.{}{}", library, FUNCTION_PREFIX, name),
            format!("{}{}", FUNCTION_PREFIX, name),
            format!("{}.{}", library, name),
            name.to_string(),
        ];
        keys.iter().find_map(|key| self.by_key.get(key))
    }

    /// Exported names declared for a library, in declaration order.
    pub fn exports_of(&self, library: &str) -> &[String] {
        self.exports.get(library).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.exports.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }

    fn register(&mut self, library: &str, name: &str, sub: MethodSubSignature) {
        let keys = [
            format!("{}.{}{}", library, FUNCTION_PREFIX, name),
            format!("{}{}", FUNCTION_PREFIX, name),
            format!("{}.{}", library, name),
            name.to_string(),
        ];
        for key in keys {
            self.by_key.entry(key).or_insert_with(|| sub.clone());
        }
        self.exports
            .entry(library.to_string())
            .or_default()
            .push(name.to_string());
    }
}

/// True for declaration-only files shipped with a native source tree.
fn is_declaration_file(path: &str) -> bool {
    path.ends_with(".d.ts") && path.contains("cpp")
}

/// The library key a declaration file contributes to: the basename of its
/// containing directory.
fn library_key(path: &str) -> Option<String> {
    Path::new(path)
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

/// Scan the model for declaration files and index every declared function.
pub fn index_declarations(model: &Model) -> DeclaredSignatures {
    let mut index = DeclaredSignatures::default();
    for file in model.files() {
        if !is_declaration_file(file.path()) {
            continue;
        }
        let Some(library) = library_key(file.path()) else {
            continue;
        };
        for class in file.classes() {
            for method in class.methods() {
                index.register(&library, method.name(), method.sig().sub.clone());
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use native_body_rebuilder_model::{
        Class, ClassSignature, File, FileSignature, Method, MethodParameter, MethodSignature,
        Type,
    };

    fn declaration_model() -> Model {
        let mut model = Model::new("app");
        let sig = FileSignature::new("app", "entry/src/main/cpp/types/libentry/index.d.ts");
        let mut file = File::new(sig.clone(), "entry/src/main/cpp/types/libentry/index.d.ts");
        let class_sig = ClassSignature::new(sig, "%dflt");
        let mut class = Class::new(class_sig.clone());
        class.add_method(Method::new(MethodSignature::new(
            class_sig,
            MethodSubSignature::new(
                "add",
                vec![
                    MethodParameter::new("a", Type::Number),
                    MethodParameter::new("b", Type::Number),
                ],
                Type::Number,
            ),
        )));
        file.add_class(class);
        model.add_file(file);
        model
    }

    #[test]
    fn test_index_keys_by_directory_basename() {
        let index = index_declarations(&declaration_model());
        assert_eq!(index.exports_of("libentry"), &["add".to_string()]);
        assert!(index.exports_of("other").is_empty());
    }

    #[test]
    fn test_lookup_chain() {
        let index = index_declarations(&declaration_model());
        assert!(index.lookup("libentry", "add").is_some());
        // Bare-name fallback serves lookups under the wrong library too.
        assert!(index.lookup("unrelated", "add").is_some());
        assert!(index.lookup("libentry", "missing").is_none());
    }

    #[test]
    fn test_non_declaration_files_are_ignored() {
        let mut model = Model::new("app");
        let sig = FileSignature::new("app", "entry/src/main/ets/pages/Index.ets");
        model.add_file(File::new(sig, "entry/src/main/ets/pages/Index.ets"));
        let index = index_declarations(&model);
        assert!(index.is_empty());
    }
}
