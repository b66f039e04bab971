//! Files, classes, methods, and the whole-program container.

use indexmap::IndexMap;

use crate::cfg::Body;
use crate::error::ModelError;
use crate::imports::ImportDecl;
use crate::signatures::{ClassSignature, FileSignature, MethodSignature};

/// A method of a host class. The body is absent for declaration-only
/// methods (e.g. functions declared in binding declaration files).
#[derive(Debug)]
pub struct Method {
    sig: MethodSignature,
    body: Option<Body>,
}

impl Method {
    pub fn new(sig: MethodSignature) -> Self {
        Self { sig, body: None }
    }

    pub fn with_body(sig: MethodSignature, body: Body) -> Self {
        Self {
            sig,
            body: Some(body),
        }
    }

    pub fn sig(&self) -> &MethodSignature {
        &self.sig
    }

    pub fn set_signature(&mut self, sig: MethodSignature) {
        self.sig = sig;
    }

    pub fn name(&self) -> &str {
        self.sig.name()
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    pub fn set_body(&mut self, body: Body) {
        self.body = Some(body);
    }
}

/// A host class: signature plus its methods in declaration order.
#[derive(Debug)]
pub struct Class {
    sig: ClassSignature,
    methods: IndexMap<String, Method>,
}

impl Class {
    pub fn new(sig: ClassSignature) -> Self {
        Self {
            sig,
            methods: IndexMap::new(),
        }
    }

    pub fn sig(&self) -> &ClassSignature {
        &self.sig
    }

    pub fn name(&self) -> &str {
        &self.sig.name
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.insert(method.name().to_string(), method);
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut Method> {
        self.methods.get_mut(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn methods_mut(&mut self) -> impl Iterator<Item = &mut Method> {
        self.methods.values_mut()
    }
}

/// A host file: signature, on-disk path, imports, classes.
#[derive(Debug)]
pub struct File {
    sig: FileSignature,
    path: String,
    imports: Vec<ImportDecl>,
    classes: IndexMap<String, Class>,
}

impl File {
    pub fn new(sig: FileSignature, path: impl Into<String>) -> Self {
        Self {
            sig,
            path: path.into(),
            imports: Vec::new(),
            classes: IndexMap::new(),
        }
    }

    pub fn sig(&self) -> &FileSignature {
        &self.sig
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn add_import(&mut self, decl: ImportDecl) {
        self.imports.push(decl);
    }

    pub fn imports(&self) -> &[ImportDecl] {
        &self.imports
    }

    pub fn add_class(&mut self, class: Class) {
        self.classes.insert(class.name().to_string(), class);
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    pub fn class_mut(&mut self, name: &str) -> Option<&mut Class> {
        self.classes.get_mut(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    pub fn classes_mut(&mut self) -> impl Iterator<Item = &mut Class> {
        self.classes.values_mut()
    }
}

/// Where a registered method lives inside the model.
#[derive(Debug, Clone)]
struct MethodLoc {
    file: String,
    class: String,
    method: String,
}

/// The whole-program container.
///
/// Files keep insertion order. The method map indexes every registered
/// method by its full signature string so call-graph consumers can go from
/// a rebound invoke signature straight to the method.
#[derive(Debug)]
pub struct Model {
    project: String,
    files: IndexMap<String, File>,
    methods: IndexMap<String, MethodLoc>,
}

impl Model {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            files: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn add_file(&mut self, file: File) {
        self.files.insert(file.sig().to_string(), file);
    }

    pub fn file(&self, sig: &FileSignature) -> Option<&File> {
        self.files.get(&sig.to_string())
    }

    pub fn file_mut(&mut self, sig: &FileSignature) -> Option<&mut File> {
        self.files.get_mut(&sig.to_string())
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn files_mut(&mut self) -> impl Iterator<Item = &mut File> {
        self.files.values_mut()
    }

    /// Record a method in the whole-program method map. The method itself
    /// must already be attached to its class.
    pub fn register_method(&mut self, sig: &MethodSignature) {
        let loc = MethodLoc {
            file: sig.class.file.to_string(),
            class: sig.class.name.clone(),
            method: sig.sub.name.clone(),
        };
        self.methods.insert(sig.to_string(), loc);
    }

    pub fn registered_method_count(&self) -> usize {
        self.methods.len()
    }

    /// Look up a registered method by signature.
    pub fn method(&self, sig: &MethodSignature) -> Option<&Method> {
        let loc = self.methods.get(&sig.to_string())?;
        self.files
            .get(&loc.file)?
            .class(&loc.class)?
            .method(&loc.method)
    }

    /// Mutable method lookup by explicit location, for statement rewriting.
    pub fn method_at_mut(
        &mut self,
        file: &FileSignature,
        class: &str,
        method: &str,
    ) -> Result<&mut Method, ModelError> {
        let file_key = file.to_string();
        let f = self
            .files
            .get_mut(&file_key)
            .ok_or(ModelError::FileNotFound(file_key.clone()))?;
        let c = f.class_mut(class).ok_or_else(|| ModelError::ClassNotFound {
            file: file_key,
            class: class.to_string(),
        })?;
        c.method_mut(method).ok_or_else(|| ModelError::MethodNotFound {
            class: class.to_string(),
            method: method.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::MethodSubSignature;
    use crate::types::Type;

    fn sig(name: &str) -> MethodSignature {
        MethodSignature::new(
            ClassSignature::new(FileSignature::new("p", "f.ets"), "C"),
            MethodSubSignature::new(name, Vec::new(), Type::Void),
        )
    }

    fn model_with_method(name: &str) -> Model {
        let mut model = Model::new("p");
        let file_sig = FileSignature::new("p", "f.ets");
        let mut file = File::new(file_sig.clone(), "f.ets");
        let mut class = Class::new(ClassSignature::new(file_sig, "C"));
        class.add_method(Method::new(sig(name)));
        file.add_class(class);
        model.add_file(file);
        model
    }

    #[test]
    fn test_register_and_lookup_method() {
        let mut model = model_with_method("m");
        let s = sig("m");
        assert!(model.method(&s).is_none());
        model.register_method(&s);
        assert_eq!(model.method(&s).map(|m| m.name()), Some("m"));
    }

    #[test]
    fn test_method_at_mut_reports_missing_class() {
        let mut model = model_with_method("m");
        let err = model
            .method_at_mut(&FileSignature::new("p", "f.ets"), "Nope", "m")
            .unwrap_err();
        assert!(matches!(err, ModelError::ClassNotFound { .. }));
    }

    #[test]
    fn test_files_iterate_in_insertion_order() {
        let mut model = Model::new("p");
        for name in ["b.ets", "a.ets", "c.ets"] {
            model.add_file(File::new(FileSignature::new("p", name), name));
        }
        let names: Vec<_> = model.files().map(|f| f.sig().name.clone()).collect();
        assert_eq!(names, ["b.ets", "a.ets", "c.ets"]);
    }
}
