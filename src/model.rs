//! Data model for parsed declarations and the merged, format-agnostic API model.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Source language of a scanned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
}

impl Language {
    pub fn from_path(path: &Path) -> Option<Language> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("java") => Some(Language::Java),
            _ => None,
        }
    }
}

/// A source file read by the scanner. Immutable once read.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the scanned root; used for modules, locations and diagnostics.
    pub path: PathBuf,
    pub content: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    #[default]
    Package,
    Protected,
    Public,
}

impl Visibility {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Private => Some("private"),
            Visibility::Package => None,
            Visibility::Protected => Some("protected"),
            Visibility::Public => Some("public"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub visibility: Visibility,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_final: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_abstract: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_default: bool,
}

/// Parsed type expression, e.g. `Result<Page<User>>`, `int[]`, `? extends Base`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    /// Name as written (`String`, `java.util.List`, `?`).
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,
    #[serde(skip_serializing_if = "is_zero")]
    pub array_dims: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub varargs: bool,
    /// Bound of a wildcard argument.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<Bound>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Extends(Box<TypeRef>),
    Super(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
            array_dims: 0,
            varargs: false,
            bound: None,
        }
    }

    pub fn with_args(mut self, args: Vec<TypeRef>) -> Self {
        self.args = args;
        self
    }

    /// Last dotted segment of the name.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn is_void(&self) -> bool {
        self.name == "void" && self.array_dims == 0
    }

    pub fn is_array(&self) -> bool {
        self.array_dims > 0 || self.varargs
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "?"
    }

    /// The type a wildcard stands for in documentation: its upper bound,
    /// its lower bound, or `Object`.
    pub fn effective(&self) -> TypeRef {
        if !self.is_wildcard() {
            return self.clone();
        }
        match &self.bound {
            Some(Bound::Extends(t)) | Some(Bound::Super(t)) => (**t).clone(),
            None => TypeRef::named("Object"),
        }
    }

    /// Element type of an array (`User[]` → `User`).
    pub fn element(&self) -> TypeRef {
        TypeRef {
            array_dims: 0,
            varargs: false,
            ..self.clone()
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match &self.bound {
            Some(Bound::Extends(t)) => write!(f, " extends {}", t)?,
            Some(Bound::Super(t)) => write!(f, " super {}", t)?,
            None => {}
        }
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        for _ in 0..self.array_dims {
            f.write_str("[]")?;
        }
        if self.varargs {
            f.write_str("...")?;
        }
        Ok(())
    }
}

/// Parsed Javadoc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocComment {
    /// Description text before the first block tag, one entry per line.
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DocTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocTag {
    /// Tag name without `@` (`param`, `return`, `since`).
    pub name: String,
    pub text: String,
}

impl DocComment {
    /// Description with whitespace collapsed onto a single line.
    pub fn summary(&self) -> String {
        self.description.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// First non-empty description line.
    pub fn title(&self) -> Option<&str> {
        self.description
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.text.as_str())
    }

    /// Description of `@param <name>`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|t| t.name == "param")
            .find_map(|t| {
                let mut parts = t.text.splitn(2, char::is_whitespace);
                if parts.next() == Some(name) {
                    Some(parts.next().unwrap_or("").trim())
                } else {
                    None
                }
            })
    }
}

/// An annotation with its attributes kept as raw source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Name as written (`RequestMapping`, `org.springframework.web.bind.annotation.GetMapping`).
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<AnnotationArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationArg {
    /// `value` for the single unnamed attribute.
    pub key: String,
    pub value: String,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// Raw text of an attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFlavor {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

impl TypeFlavor {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeFlavor::Class => "class",
            TypeFlavor::Interface => "interface",
            TypeFlavor::Enum => "enum",
            TypeFlavor::Record => "record",
            TypeFlavor::Annotation => "@interface",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub flavor: TypeFlavor,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<TypeRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl Param {
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    /// `None` for constructors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDecl {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enum_constant: bool,
    /// `// ...` comment on the declaration's last line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DeclKind {
    Type(TypeDecl),
    Function(FunctionDecl),
    Field(FieldDecl),
}

/// A named, typed unit of source code extracted by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub name: String,
    /// Dotted path of the enclosing type within the module (`Outer.Inner`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub kind: DeclKind,
    pub modifiers: Modifiers,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<DocComment>,
    pub location: SourceLocation,
}

impl Declaration {
    /// Dotted path within the module (`Outer.Inner.name`).
    pub fn path(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}.{}", parent, self.name),
            None => self.name.clone(),
        }
    }

    /// Key that is unique within a module. Functions include their
    /// parameter types so overloads stay distinct.
    pub fn symbol(&self) -> String {
        match &self.kind {
            DeclKind::Function(f) => {
                let params: Vec<String> = f.params.iter().map(|p| p.ty.to_string()).collect();
                format!("{}({})", self.path(), params.join(","))
            }
            _ => self.path(),
        }
    }

    pub fn as_type(&self) -> Option<&TypeDecl> {
        match &self.kind {
            DeclKind::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDecl> {
        match &self.kind {
            DeclKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldDecl> {
        match &self.kind {
            DeclKind::Field(f) => Some(f),
            _ => None,
        }
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }

    /// One-line Java-like signature for display.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        if let Some(kw) = self.modifiers.visibility.keyword() {
            out.push_str(kw);
            out.push(' ');
        }
        if self.modifiers.is_abstract && !matches!(self.kind, DeclKind::Type(TypeDecl { flavor: TypeFlavor::Interface, .. })) {
            out.push_str("abstract ");
        }
        if self.modifiers.is_default {
            out.push_str("default ");
        }
        if self.modifiers.is_static {
            out.push_str("static ");
        }
        if self.modifiers.is_final {
            out.push_str("final ");
        }
        match &self.kind {
            DeclKind::Type(t) => {
                out.push_str(t.flavor.keyword());
                out.push(' ');
                out.push_str(&self.name);
                if !t.type_params.is_empty() {
                    out.push_str(&format!("<{}>", t.type_params.join(", ")));
                }
                if !t.extends.is_empty() {
                    out.push_str(" extends ");
                    out.push_str(&join_types(&t.extends));
                }
                if !t.implements.is_empty() {
                    out.push_str(" implements ");
                    out.push_str(&join_types(&t.implements));
                }
            }
            DeclKind::Function(f) => {
                if !f.type_params.is_empty() {
                    out.push_str(&format!("<{}> ", f.type_params.join(", ")));
                }
                if let Some(ref ret) = f.returns {
                    out.push_str(&ret.to_string());
                    out.push(' ');
                }
                out.push_str(&self.name);
                out.push('(');
                let params: Vec<String> = f
                    .params
                    .iter()
                    .map(|p| format!("{} {}", p.ty, p.name))
                    .collect();
                out.push_str(&params.join(", "));
                out.push(')');
                if !f.throws.is_empty() {
                    out.push_str(" throws ");
                    out.push_str(&join_types(&f.throws));
                }
            }
            DeclKind::Field(f) => {
                if f.enum_constant {
                    return self.name.clone();
                }
                out.push_str(&f.ty.to_string());
                out.push(' ');
                out.push_str(&self.name);
            }
        }
        out
    }
}

fn join_types(types: &[TypeRef]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find an annotation by simple or qualified name.
pub fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations
        .iter()
        .find(|a| a.name == name || a.simple_name() == name)
}

// -- Diagnostics --------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A single file or directory could not be read.
    Access,
    /// A malformed declaration was skipped.
    Parse,
    /// Two declarations in one module share a symbol.
    DuplicateSymbol,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::Access => "access",
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::DuplicateSymbol => "duplicate symbol",
        })
    }
}

/// A non-fatal problem recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: impl Into<PathBuf>, line: Option<usize>, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}: {}", self.path.display(), line, self.kind, self.message),
            None => write!(f, "{}: {}: {}", self.path.display(), self.kind, self.message),
        }
    }
}

// -- API model ----------------------------------------------------------------

/// Document-level metadata shared by all renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Declarations of one package (or directory, for files without a package).
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    declarations: IndexMap<String, Declaration>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            declarations: IndexMap::new(),
        }
    }

    /// Insert by symbol. An existing symbol keeps its position and the
    /// replaced declaration is returned.
    pub(crate) fn insert(&mut self, decl: Declaration) -> Option<Declaration> {
        self.declarations.insert(decl.symbol(), decl)
    }

    /// Remove the members of type `path`, nested types included, that were
    /// not declared in `keep`. Returns the number removed.
    pub(crate) fn remove_members(&mut self, path: &str, keep: &Path) -> usize {
        let nested = format!("{}.", path);
        let before = self.declarations.len();
        self.declarations.retain(|_, d| {
            let inside = d
                .parent
                .as_deref()
                .is_some_and(|p| p == path || p.starts_with(&nested));
            !inside || d.location.path == keep
        });
        before - self.declarations.len()
    }

    pub fn get(&self, symbol: &str) -> Option<&Declaration> {
        self.declarations.get(symbol)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Type declaration by dotted path.
    pub fn get_type(&self, path: &str) -> Option<&Declaration> {
        self.get(path).filter(|d| d.as_type().is_some())
    }

    pub fn types(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations().filter(|d| d.as_type().is_some())
    }

    /// Declarations not enclosed in any type.
    pub fn free_members(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations()
            .filter(|d| d.parent.is_none() && d.as_type().is_none())
    }

    /// Direct members (fields, functions, nested types) of a type.
    pub fn members_of<'a>(&'a self, ty: &'a Declaration) -> impl Iterator<Item = &'a Declaration> + 'a {
        let path = ty.path();
        self.declarations()
            .filter(move |d| d.parent.as_deref() == Some(path.as_str()))
    }

    /// Display name; the default module has no package.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(default)"
        } else {
            &self.name
        }
    }
}

/// The aggregated, cross-referenced representation of all declarations.
#[derive(Debug, Clone, Default)]
pub struct ApiModel {
    pub meta: ProjectMeta,
    modules: IndexMap<String, Module>,
    imports: BTreeMap<PathBuf, Vec<String>>,
    application_names: BTreeMap<PathBuf, String>,
}

impl ApiModel {
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub(crate) fn module_entry(&mut self, name: &str) -> &mut Module {
        self.modules
            .entry(name.to_string())
            .or_insert_with(|| Module::new(name))
    }

    pub fn declaration_count(&self) -> usize {
        self.modules.values().map(Module::len).sum()
    }

    pub(crate) fn set_imports(&mut self, path: PathBuf, imports: Vec<String>) {
        self.imports.insert(path, imports);
    }

    pub fn imports(&self, path: &Path) -> &[String] {
        self.imports.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_application_name(&mut self, path: PathBuf, name: String) {
        self.application_names.insert(path, name);
    }

    pub fn application_name(&self, path: &Path) -> Option<&str> {
        self.application_names.get(path).map(String::as_str)
    }

    /// Module containing a declaration (by identity of location and symbol).
    pub fn module_of(&self, decl: &Declaration) -> Option<&Module> {
        let symbol = decl.symbol();
        self.modules.values().find(|m| {
            m.get(&symbol)
                .is_some_and(|d| d.location == decl.location)
        })
    }

    /// Resolve a type name as seen from `from` to its declaration.
    ///
    /// Lookup order: qualified name, nested type of the enclosing types,
    /// same module, single-type imports, wildcard imports, then a unique
    /// simple name anywhere in the model.
    pub fn resolve_type(&self, name: &str, from: &Declaration) -> Option<&Declaration> {
        let home = self.module_of(from);

        if name.contains('.') {
            if let Some(found) = self.resolve_qualified(name) {
                return Some(found);
            }
            if let Some(found) = home.and_then(|m| m.get_type(name)) {
                return Some(found);
            }
        }

        if let Some(module) = home {
            // Nested types visible from the enclosing chain, innermost first.
            let mut scope = match from.as_type() {
                Some(_) => Some(from.path()),
                None => from.parent.clone(),
            };
            while let Some(path) = scope {
                if let Some(found) = module.get_type(&format!("{}.{}", path, name)) {
                    return Some(found);
                }
                scope = path.rsplit_once('.').map(|(p, _)| p.to_string());
            }
            if let Some(found) = module.get_type(name) {
                return Some(found);
            }
        }

        let imports = self.imports(&from.location.path);
        for import in imports {
            if let Some(prefix) = import.strip_suffix(".*") {
                let candidate = format!("{}.{}", prefix, name);
                if let Some(found) = self.resolve_qualified(&candidate) {
                    return Some(found);
                }
            } else if import.rsplit('.').next() == Some(name.split('.').next().unwrap_or(name)) {
                let rest = name.split_once('.').map(|(_, r)| r);
                let candidate = match rest {
                    Some(rest) => format!("{}.{}", import, rest),
                    None => import.clone(),
                };
                if let Some(found) = self.resolve_qualified(&candidate) {
                    return Some(found);
                }
            }
        }

        let simple = name.rsplit('.').next().unwrap_or(name);
        let mut matches = self
            .modules
            .values()
            .flat_map(|m| m.types())
            .filter(|d| d.name == simple);
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// Resolve `package.Type.Nested` by trying each package prefix.
    fn resolve_qualified(&self, name: &str) -> Option<&Declaration> {
        let mut split = name.len();
        while let Some(dot) = name[..split].rfind('.') {
            let (module, path) = (&name[..dot], &name[dot + 1..]);
            if let Some(found) = self.modules.get(module).and_then(|m| m.get_type(path)) {
                return Some(found);
            }
            split = dot;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(path: &str, line: usize) -> SourceLocation {
        SourceLocation {
            path: PathBuf::from(path),
            line,
            column: 1,
        }
    }

    fn class(name: &str, parent: Option<&str>, path: &str) -> Declaration {
        Declaration {
            name: name.to_string(),
            parent: parent.map(str::to_string),
            kind: DeclKind::Type(TypeDecl {
                flavor: TypeFlavor::Class,
                type_params: Vec::new(),
                extends: Vec::new(),
                implements: Vec::new(),
            }),
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            doc: None,
            location: location(path, 1),
        }
    }

    #[test]
    fn type_ref_display() {
        let t = TypeRef::named("Result").with_args(vec![
            TypeRef::named("Page").with_args(vec![TypeRef::named("User")]),
        ]);
        assert_eq!(t.to_string(), "Result<Page<User>>");

        let mut arr = TypeRef::named("int");
        arr.array_dims = 2;
        assert_eq!(arr.to_string(), "int[][]");

        let wildcard = TypeRef {
            bound: Some(Bound::Extends(Box::new(TypeRef::named("Base")))),
            ..TypeRef::named("?")
        };
        assert_eq!(wildcard.to_string(), "? extends Base");
        assert_eq!(wildcard.effective().name, "Base");
    }

    #[test]
    fn function_symbol_includes_param_types() {
        let decl = Declaration {
            name: "find".to_string(),
            parent: Some("UserService".to_string()),
            kind: DeclKind::Function(FunctionDecl {
                type_params: Vec::new(),
                params: vec![Param {
                    name: "id".to_string(),
                    ty: TypeRef::named("Long"),
                    annotations: Vec::new(),
                }],
                returns: Some(TypeRef::named("User")),
                throws: Vec::new(),
            }),
            modifiers: Modifiers {
                visibility: Visibility::Public,
                ..Default::default()
            },
            annotations: Vec::new(),
            doc: None,
            location: location("UserService.java", 3),
        };
        assert_eq!(decl.symbol(), "UserService.find(Long)");
        assert_eq!(decl.signature(), "public User find(Long id)");
    }

    #[test]
    fn doc_comment_accessors() {
        let doc = DocComment {
            description: "List users\n  by page".to_string(),
            tags: vec![DocTag {
                name: "param".to_string(),
                text: "page  the page index".to_string(),
            }],
        };
        assert_eq!(doc.title(), Some("List users"));
        assert_eq!(doc.summary(), "List users by page");
        assert_eq!(doc.param("page"), Some("the page index"));
        assert_eq!(doc.param("size"), None);
    }

    #[test]
    fn resolve_prefers_same_module_then_imports() {
        let mut model = ApiModel::default();
        model.module_entry("com.a").insert(class("User", None, "com/a/User.java"));
        model.module_entry("com.b").insert(class("User", None, "com/b/User.java"));
        model.module_entry("com.b").insert(class("Holder", None, "com/b/Holder.java"));
        model.module_entry("com.c").insert(class("Client", None, "com/c/Client.java"));
        model.set_imports(PathBuf::from("com/c/Client.java"), vec!["com.a.User".to_string()]);

        let holder = model.module("com.b").unwrap().get("Holder").unwrap().clone();
        let found = model.resolve_type("User", &holder).unwrap();
        assert_eq!(found.location.path, PathBuf::from("com/b/User.java"));

        let client = model.module("com.c").unwrap().get("Client").unwrap().clone();
        let found = model.resolve_type("User", &client).unwrap();
        assert_eq!(found.location.path, PathBuf::from("com/a/User.java"));

        // Ambiguous simple name without an import stays unresolved.
        model.set_imports(PathBuf::from("com/c/Client.java"), Vec::new());
        assert!(model.resolve_type("User", &client).is_none());

        let found = model.resolve_type("com.a.User", &client).unwrap();
        assert_eq!(found.location.path, PathBuf::from("com/a/User.java"));
    }

    #[test]
    fn resolve_nested_type() {
        let mut model = ApiModel::default();
        let module = model.module_entry("app");
        module.insert(class("Outer", None, "app/Outer.java"));
        module.insert(class("Inner", Some("Outer"), "app/Outer.java"));

        let outer = model.module("app").unwrap().get("Outer").unwrap().clone();
        let found = model.resolve_type("Inner", &outer).unwrap();
        assert_eq!(found.path(), "Outer.Inner");
    }

    #[test]
    fn diagnostic_display() {
        let d = Diagnostic::new(DiagnosticKind::Parse, "a.java", Some(4), "expected `;`");
        assert_eq!(d.to_string(), "a.java:4: parse: expected `;`");
    }
}
