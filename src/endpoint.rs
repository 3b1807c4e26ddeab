//! HTTP endpoint extraction for Spring MVC controllers.
//!
//! Works purely on the merged [`ApiModel`]: controller types are found by
//! annotation, request/response shapes by resolving parameter and return
//! types to their declarations and expanding fields (superclasses and
//! generic arguments included).

use crate::model::*;
use crate::project::app_name::PLACEHOLDER;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Nesting depth at which field expansion stops.
const MAX_NESTING: usize = 6;

static RE_STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""((?:[^"\\]|\\.)*)""#).unwrap());

/// Parameter types supplied by the framework rather than the caller.
const FRAMEWORK_TYPES: &[&str] = &[
    "HttpServletRequest",
    "HttpServletResponse",
    "HttpSession",
    "ServletRequest",
    "ServletResponse",
    "BindingResult",
    "Model",
    "ModelMap",
    "RedirectAttributes",
    "MultipartFile",
    "Errors",
];

const FRAMEWORK_PACKAGES: &[&str] = &[
    "org.springframework.web.",
    "javax.servlet.",
    "jakarta.servlet.",
];

/// Types whose value is passed through to their first type argument.
const CARRIER_TYPES: &[&str] = &[
    "ResponseEntity",
    "HttpEntity",
    "Optional",
    "CompletableFuture",
    "CompletionStage",
    "Mono",
    "Callable",
    "DeferredResult",
    "WebAsyncTask",
];

const COLLECTION_TYPES: &[&str] = &[
    "List",
    "ArrayList",
    "LinkedList",
    "Set",
    "HashSet",
    "LinkedHashSet",
    "TreeSet",
    "SortedSet",
    "Collection",
    "Iterable",
    "Flux",
];

const MAP_TYPES: &[&str] = &[
    "Map",
    "HashMap",
    "LinkedHashMap",
    "TreeMap",
    "SortedMap",
    "ConcurrentHashMap",
    "ConcurrentMap",
    "JSONObject",
];

const HTTP_VERBS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

const REQUIRED_MARKERS: &[&str] = &["NotNull", "NotEmpty", "NotBlank"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentType {
    #[serde(rename = "JSON")]
    Json,
    FormData,
}

impl ContentType {
    pub fn label(self) -> &'static str {
        match self {
            ContentType::Json => "JSON",
            ContentType::FormData => "FormData",
        }
    }
}

/// One request or response field, possibly with nested fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldNode {
    pub name: String,
    /// Display type (`String`, `Long`, `List`, `UserVo`).
    #[serde(rename = "type")]
    pub ty: String,
    pub required: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldNode>,
}

impl FieldNode {
    pub fn is_list(&self) -> bool {
        self.ty == "List" || self.ty == "Array"
    }
}

/// A field flattened for tabular output.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub depth: usize,
    pub field: &'a FieldNode,
}

impl Row<'_> {
    /// `--` per nesting level, prepended to the field name in tables.
    pub fn prefix(&self) -> String {
        "--".repeat(self.depth)
    }
}

/// Depth-first flattening of a field tree.
pub fn rows(fields: &[FieldNode]) -> Vec<Row<'_>> {
    fn walk<'a>(fields: &'a [FieldNode], depth: usize, out: &mut Vec<Row<'a>>) {
        for field in fields {
            out.push(Row { depth, field });
            walk(&field.children, depth + 1, out);
        }
    }
    let mut out = Vec::new();
    walk(fields, 0, &mut out);
    out
}

/// An HTTP handler method of a controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub title: String,
    /// Display name of the controller.
    pub controller: String,
    /// Java method name.
    pub handler: String,
    pub path: String,
    pub http_method: String,
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub request: Vec<FieldNode>,
    pub response: Vec<FieldNode>,
    pub location: SourceLocation,
}

impl Endpoint {
    /// `Controller -> Title`.
    pub fn call_location(&self) -> String {
        format!("{} -> {}", self.controller, self.title)
    }

    pub fn request_json(&self) -> String {
        json_sample(&self.request)
    }

    pub fn response_json(&self) -> String {
        json_sample(&self.response)
    }
}

/// Every endpoint in the model, in module and declaration order.
///
/// `exclusions` maps a class (simple or qualified name) to field names
/// hidden from request/response fields; `*` or an empty list hides all
/// of the class's fields.
pub fn collect(model: &ApiModel, exclusions: &IndexMap<String, Vec<String>>) -> Vec<Endpoint> {
    let extractor = Extractor { model, exclusions };
    let mut endpoints = Vec::new();
    for module in model.modules() {
        for controller in module.types().filter(|t| is_controller(t)) {
            for member in module.members_of(controller) {
                let Some(function) = member.as_function() else {
                    continue;
                };
                if function.returns.is_none() || !member.annotations.iter().any(is_mapping) {
                    continue;
                }
                endpoints.push(extractor.endpoint(controller, member, function));
            }
        }
    }
    endpoints
}

pub fn is_controller(decl: &Declaration) -> bool {
    decl.as_type().is_some()
        && decl
            .annotations
            .iter()
            .any(|a| a.simple_name().ends_with("Controller"))
}

fn is_mapping(annotation: &Annotation) -> bool {
    annotation.simple_name().contains("Mapping")
}

/// First path of a mapping annotation (`value` or `path`, arrays reduced to
/// their first element).
fn mapping_path(annotation: &Annotation) -> String {
    annotation
        .attr("value")
        .or_else(|| annotation.attr("path"))
        .and_then(first_string_literal)
        .unwrap_or_default()
}

fn first_string_literal(raw: &str) -> Option<String> {
    RE_STRING_LITERAL
        .captures(raw)
        .map(|caps| caps[1].replace("\\\"", "\""))
}

/// `/app` + class path + method path with exactly one `/` between parts.
pub fn combine_path(parts: &[&str]) -> String {
    let segments: Vec<&str> = parts
        .iter()
        .map(|p| p.trim().trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// HTTP verb(s) of a handler method.
pub fn http_method(method: &Declaration) -> String {
    for annotation in &method.annotations {
        let verb = match annotation.simple_name() {
            "GetMapping" => "GET",
            "PostMapping" => "POST",
            "PutMapping" => "PUT",
            "DeleteMapping" => "DELETE",
            "PatchMapping" => "PATCH",
            "RequestMapping" => {
                let verbs = annotation
                    .attr("method")
                    .map(parse_request_methods)
                    .unwrap_or_default();
                if verbs.is_empty() {
                    return "GET/POST".to_string();
                }
                return verbs;
            }
            _ => continue,
        };
        return verb.to_string();
    }
    "GET/POST".to_string()
}

/// `{RequestMethod.GET, RequestMethod.POST}` → `GET/POST`.
fn parse_request_methods(raw: &str) -> String {
    let mut verbs: Vec<String> = Vec::new();
    for part in raw.replace(['{', '}'], "").split(',') {
        let last = part.trim().rsplit('.').next().unwrap_or("");
        let verb: String = last
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_uppercase();
        if HTTP_VERBS.contains(&verb.as_str()) && !verbs.contains(&verb) {
            verbs.push(verb);
        }
    }
    verbs.join("/")
}

pub fn content_type(function: &FunctionDecl) -> ContentType {
    if function
        .params
        .iter()
        .any(|p| p.annotation("RequestBody").is_some())
    {
        ContentType::Json
    } else {
        ContentType::FormData
    }
}

/// Display name of a type in endpoint tables.
pub fn display_type(ty: &TypeRef) -> String {
    let ty = ty.effective();
    if ty.is_array() {
        return "Array".to_string();
    }
    let simple = ty.simple_name();
    if COLLECTION_TYPES.contains(&simple) {
        return "List".to_string();
    }
    if MAP_TYPES.contains(&simple) {
        return "Object".to_string();
    }
    match simple_display(simple) {
        Some(display) => display.to_string(),
        None => simple.to_string(),
    }
}

/// Display names of JDK value types; `None` for anything else.
fn simple_display(simple: &str) -> Option<&'static str> {
    Some(match simple {
        "int" | "Integer" => "Integer",
        "long" | "Long" => "Long",
        "double" | "Double" => "Double",
        "float" | "Float" => "Float",
        "boolean" | "Boolean" => "Boolean",
        "byte" | "Byte" => "Byte",
        "short" | "Short" => "Short",
        "char" | "Character" => "Character",
        "String" | "CharSequence" => "String",
        "Date" | "LocalDateTime" | "ZonedDateTime" | "OffsetDateTime" | "Instant" | "Timestamp" => "DateTime",
        "LocalDate" => "Date",
        "LocalTime" => "Time",
        "BigDecimal" => "BigDecimal",
        "BigInteger" => "BigInteger",
        "Object" => "Object",
        "Void" | "void" => "Void",
        "UUID" => "String",
        _ => return None,
    })
}

fn is_collection(ty: &TypeRef) -> bool {
    COLLECTION_TYPES.contains(&ty.simple_name())
}

fn has_required_marker(annotations: &[Annotation]) -> bool {
    REQUIRED_MARKERS
        .iter()
        .any(|m| find_annotation(annotations, m).is_some())
}

/// Strip carrier wrappers (`ResponseEntity<T>`, `Optional<T>`, ...).
fn unwrap_carriers(ty: &TypeRef) -> TypeRef {
    let mut ty = ty.effective();
    while CARRIER_TYPES.contains(&ty.simple_name()) && ty.array_dims == 0 {
        match ty.args.first() {
            Some(inner) => ty = inner.effective(),
            None => break,
        }
    }
    ty
}

/// Replace type variables by their bound arguments.
fn substitute(ty: &TypeRef, subst: &HashMap<String, TypeRef>) -> TypeRef {
    let ty = ty.effective();
    if ty.args.is_empty() {
        if let Some(bound) = subst.get(&ty.name) {
            let mut bound = bound.clone();
            bound.array_dims += ty.array_dims;
            bound.varargs |= ty.varargs;
            return bound;
        }
    }
    TypeRef {
        args: ty.args.iter().map(|a| substitute(a, subst)).collect(),
        ..ty
    }
}

/// JSON sample with three-space indentation; leaves show their type and
/// description as a trailing `//` comment.
pub fn json_sample(fields: &[FieldNode]) -> String {
    json_object(fields, 0)
}

fn json_object(fields: &[FieldNode], depth: usize) -> String {
    let indent = "   ".repeat(depth);
    let child_indent = "   ".repeat(depth + 1);
    let mut out = String::from("{\n");
    for (i, field) in fields.iter().enumerate() {
        let comma = if i + 1 < fields.len() { "," } else { "" };
        out.push_str(&format!("{}\"{}\" : ", child_indent, field.name));
        if field.is_list() {
            if field.children.is_empty() {
                out.push_str("[]");
            } else {
                out.push('[');
                out.push_str(&json_object(&field.children, depth + 1));
                out.push(']');
            }
            out.push_str(comma);
        } else if !field.children.is_empty() {
            out.push_str(&json_object(&field.children, depth + 1));
            out.push_str(comma);
        } else {
            out.push_str(&format!("\"{}\"{}", field.ty, comma));
            let description = field.description.trim();
            if !description.is_empty() {
                out.push_str(" //");
                out.push_str(description);
            }
        }
        out.push('\n');
    }
    out.push_str(&indent);
    out.push('}');
    out
}

struct Extractor<'a> {
    model: &'a ApiModel,
    exclusions: &'a IndexMap<String, Vec<String>>,
}

impl<'a> Extractor<'a> {
    fn endpoint(&self, controller: &Declaration, method: &Declaration, function: &FunctionDecl) -> Endpoint {
        let class_path = controller
            .annotations
            .iter()
            .find(|a| is_mapping(a))
            .map(mapping_path)
            .unwrap_or_default();
        let method_path = method
            .annotations
            .iter()
            .find(|a| is_mapping(a))
            .map(mapping_path)
            .unwrap_or_default();
        let application = self
            .model
            .application_name(&method.location.path)
            .unwrap_or(PLACEHOLDER);

        let title = method
            .doc
            .as_ref()
            .and_then(|d| d.title())
            .map(str::to_string)
            .unwrap_or_else(|| method.name.clone());

        let controller_name = controller
            .doc
            .as_ref()
            .and_then(|d| d.title())
            .map(str::to_string)
            .unwrap_or_else(|| {
                controller
                    .name
                    .strip_suffix("Controller")
                    .filter(|s| !s.is_empty())
                    .unwrap_or(&controller.name)
                    .to_string()
            });

        Endpoint {
            title,
            controller: controller_name,
            handler: method.name.clone(),
            path: combine_path(&[application, class_path.as_str(), method_path.as_str()]),
            http_method: http_method(method),
            content_type: content_type(function),
            description: method.doc.as_ref().and_then(details),
            request: self.request_fields(method, function),
            response: self.response_fields(method, function),
            location: method.location.clone(),
        }
    }

    fn request_fields(&self, method: &Declaration, function: &FunctionDecl) -> Vec<FieldNode> {
        let mut fields = Vec::new();
        for param in &function.params {
            if self.is_framework_type(&param.ty, method) {
                continue;
            }
            let ty = param.ty.effective();
            let mut visited = Vec::new();

            if let Some(class) = self.pojo(&ty, method) {
                let args = self.qualify_args(&ty.args, method);
                fields.extend(self.class_fields(class, &args, 0, &mut visited, &[]));
                continue;
            }
            if param.annotation("RequestAttribute").is_some() {
                continue;
            }

            let name = param
                .annotation("RequestParam")
                .or_else(|| param.annotation("PathVariable"))
                .and_then(|a| a.attr("value").or_else(|| a.attr("name")))
                .and_then(first_string_literal)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| param.name.clone());
            let description = method
                .doc
                .as_ref()
                .and_then(|d| d.param(&param.name))
                .unwrap_or("")
                .to_string();

            fields.push(FieldNode {
                name,
                ty: display_type(&ty),
                required: request_required(param),
                description,
                children: self.type_children(&ty, method, 1, &mut visited),
            });
        }
        fields
    }

    fn response_fields(&self, method: &Declaration, function: &FunctionDecl) -> Vec<FieldNode> {
        let Some(ref returns) = function.returns else {
            return Vec::new();
        };
        let ty = unwrap_carriers(returns);
        if ty.is_void() || ty.name == "Void" {
            return Vec::new();
        }
        let mut visited = Vec::new();
        match self.pojo(&ty, method) {
            Some(class) => {
                let args = self.qualify_args(&ty.args, method);
                self.class_fields(class, &args, 0, &mut visited, &[])
            }
            None => self.type_children(&ty, method, 0, &mut visited),
        }
    }

    fn is_framework_type(&self, ty: &TypeRef, from: &Declaration) -> bool {
        let element = ty.element();
        let simple = element.simple_name();
        if FRAMEWORK_TYPES.contains(&simple) {
            return true;
        }
        let qualified = if element.name.contains('.') {
            Some(element.name.clone())
        } else {
            self.model
                .imports(&from.location.path)
                .iter()
                .find(|i| i.rsplit('.').next() == Some(simple))
                .cloned()
        };
        qualified.is_some_and(|q| FRAMEWORK_PACKAGES.iter().any(|p| q.starts_with(p)))
    }

    /// Declaration of a type whose fields are worth expanding.
    fn pojo(&self, ty: &TypeRef, from: &Declaration) -> Option<&'a Declaration> {
        if ty.is_array() || is_collection(ty) || MAP_TYPES.contains(&ty.simple_name()) {
            return None;
        }
        if simple_display(ty.simple_name()).is_some() || ty.name.starts_with("java.") {
            return None;
        }
        self.model
            .resolve_type(&ty.name, from)
            .filter(|d| matches!(d.as_type().map(|t| t.flavor), Some(TypeFlavor::Class | TypeFlavor::Record)))
    }

    /// Nested fields for a value of type `ty` (element fields for arrays and
    /// collections).
    fn type_children(&self, ty: &TypeRef, from: &Declaration, depth: usize, visited: &mut Vec<String>) -> Vec<FieldNode> {
        if depth > MAX_NESTING {
            return Vec::new();
        }
        if ty.is_array() {
            return self.type_children(&ty.element(), from, depth, visited);
        }
        if is_collection(ty) {
            let element = ty
                .args
                .first()
                .map(TypeRef::effective)
                .unwrap_or_else(|| TypeRef::named("Object"));
            return self.type_children(&element, from, depth, visited);
        }
        match self.pojo(ty, from) {
            Some(class) => {
                let args = self.qualify_args(&ty.args, from);
                self.class_fields(class, &args, depth, visited, &[])
            }
            None => Vec::new(),
        }
    }

    /// Rewrite type arguments to the qualified names they resolve to from
    /// `from`, so they keep their meaning once substituted into another
    /// class.
    fn qualify_args(&self, args: &[TypeRef], from: &Declaration) -> Vec<TypeRef> {
        args.iter().map(|arg| self.qualify(arg, from)).collect()
    }

    fn qualify(&self, ty: &TypeRef, from: &Declaration) -> TypeRef {
        let ty = ty.effective();
        let name = self
            .model
            .resolve_type(&ty.name, from)
            .and_then(|decl| self.model.module_of(decl).map(|m| qualified_name(m, decl)))
            .unwrap_or_else(|| ty.name.clone());
        TypeRef {
            name,
            args: self.qualify_args(&ty.args, from),
            ..ty
        }
    }

    /// Fields of `class` followed by those of its superclass chain.
    ///
    /// `inherited` carries exclusions configured on subclasses. `visited`
    /// holds the classes on the current expansion path, cutting cycles.
    fn class_fields(
        &self,
        class: &'a Declaration,
        args: &[TypeRef],
        depth: usize,
        visited: &mut Vec<String>,
        inherited: &[String],
    ) -> Vec<FieldNode> {
        let Some(module) = self.model.module_of(class) else {
            return Vec::new();
        };
        let Some(type_decl) = class.as_type() else {
            return Vec::new();
        };
        let qualified = qualified_name(module, class);
        if visited.contains(&qualified) {
            return Vec::new();
        }

        let mut excluded: Vec<String> = inherited.to_vec();
        if let Some(own) = self
            .exclusions
            .get(&qualified)
            .or_else(|| self.exclusions.get(&class.name))
        {
            if own.is_empty() || own.iter().any(|f| f == "*") {
                return Vec::new();
            }
            excluded.extend(own.iter().cloned());
        }

        let subst: HashMap<String, TypeRef> = type_decl
            .type_params
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let arg = args
                    .get(i)
                    .map(TypeRef::effective)
                    .unwrap_or_else(|| TypeRef::named("Object"));
                (name.clone(), arg)
            })
            .collect();

        visited.push(qualified);
        let is_record = type_decl.flavor == TypeFlavor::Record;
        let mut fields = Vec::new();

        for member in module.members_of(class) {
            let Some(field) = member.as_field() else {
                continue;
            };
            if field.enum_constant || member.modifiers.is_static || (member.modifiers.is_final && !is_record) {
                continue;
            }
            let name = member
                .annotation("JsonProperty")
                .and_then(|a| a.attr("value"))
                .and_then(first_string_literal)
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| member.name.clone());
            if excluded.iter().any(|e| *e == member.name || *e == name) {
                continue;
            }

            let ty = substitute(&field.ty, &subst);
            fields.push(FieldNode {
                name,
                ty: display_type(&ty),
                required: field_required(member),
                description: field_description(member, field),
                children: self.type_children(&ty, class, depth + 1, visited),
            });
        }

        if type_decl.flavor == TypeFlavor::Class {
            if let Some(parent) = type_decl.extends.first() {
                let parent_ty = substitute(parent, &subst);
                if let Some(parent_decl) = self.pojo(&parent_ty, class) {
                    let args = self.qualify_args(&parent_ty.args, class);
                    fields.extend(self.class_fields(parent_decl, &args, depth, visited, &excluded));
                }
            }
        }

        visited.pop();
        fields
    }
}

/// Package-qualified dotted path of a type declaration.
fn qualified_name(module: &Module, decl: &Declaration) -> String {
    if module.name.is_empty() {
        decl.path()
    } else {
        format!("{}.{}", module.name, decl.path())
    }
}

/// Description lines after the title, collapsed onto one line.
fn details(doc: &DocComment) -> Option<String> {
    let mut lines = doc
        .description
        .lines()
        .map(str::trim)
        .skip_while(|l| l.is_empty());
    lines.next()?;
    let rest = lines.collect::<Vec<_>>().join(" ");
    let rest = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    (!rest.is_empty()).then_some(rest)
}

fn request_required(param: &Param) -> bool {
    for name in ["RequestParam", "RequestBody", "PathVariable", "RequestHeader"] {
        if let Some(annotation) = param.annotation(name) {
            if let Some(required) = annotation.attr("required") {
                return required.trim() != "false";
            }
            if annotation.attr("defaultValue").is_some() {
                return false;
            }
            return true;
        }
    }
    has_required_marker(&param.annotations)
}

fn field_required(member: &Declaration) -> bool {
    if has_required_marker(&member.annotations) {
        return true;
    }
    ["ApiModelProperty", "Schema"].iter().any(|name| {
        member
            .annotation(name)
            .and_then(|a| a.attr("required"))
            .is_some_and(|r| r.trim() == "true")
    }) || member
        .annotation("Schema")
        .and_then(|a| a.attr("requiredMode"))
        .is_some_and(|m| m.ends_with("REQUIRED") && !m.ends_with("NOT_REQUIRED"))
}

/// Swagger annotation text, then Javadoc, then the trailing `//` comment.
fn field_description(member: &Declaration, field: &FieldDecl) -> String {
    let from_annotation = member
        .annotation("ApiModelProperty")
        .and_then(|a| a.attr("value").or_else(|| a.attr("notes")))
        .or_else(|| {
            member
                .annotation("Schema")
                .and_then(|a| a.attr("description").or_else(|| a.attr("title")))
        })
        .and_then(first_string_literal)
        .filter(|s| !s.trim().is_empty());
    from_annotation
        .or_else(|| {
            member
                .doc
                .as_ref()
                .map(DocComment::summary)
                .filter(|s| !s.is_empty())
        })
        .or_else(|| field.trailing_comment.clone())
        .unwrap_or_default()
}
