//! Java declaration parser: recursive descent over tokens, bodies skipped.
//!
//! Extracts package, imports, types (class / interface / enum / record /
//! `@interface`), fields, methods, constructors, enum constants and record
//! components with their annotations and Javadoc. Method bodies and field
//! initializers are skipped by bracket balancing.
//!
//! A malformed member produces one diagnostic and is dropped; the parser
//! resyncs at the next `;` or balanced `{ ... }` and carries on.

use crate::model::*;
use crate::parser::javadoc;
use crate::parser::lexer::{self, Tok, Token};
use std::collections::BTreeMap;

/// Result of parsing one Java file.
#[derive(Debug, Default)]
pub struct JavaFile {
    pub package: Option<String>,
    pub imports: Vec<String>,
    pub declarations: Vec<Declaration>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
struct ParseError {
    line: usize,
    message: String,
}

type PResult<T> = Result<T, ParseError>;

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "default",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "sealed",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Reserved words that can never name a declaration or a reference type.
const RESERVED: &[&str] = &[
    "abstract", "assert", "break", "case", "catch", "class", "const", "continue", "default", "do",
    "else", "enum", "extends", "final", "finally", "for", "goto", "if", "implements", "import",
    "instanceof", "interface", "native", "new", "package", "private", "protected", "public",
    "return", "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "volatile", "while", "true", "false", "null",
];

/// Parse one Java source file.
pub fn parse(file: &SourceFile) -> JavaFile {
    let lexed = lexer::lex(&file.content);
    let mut parser = Parser {
        src: &file.content,
        tokens: lexed.tokens,
        pos: 0,
        line_comments: lexed.line_comments,
        file: JavaFile::default(),
        path: file.path.clone(),
    };
    for (line, message) in lexed.errors {
        parser.diag(ParseError { line, message });
    }
    parser.parse_unit();
    parser.file
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    line_comments: BTreeMap<usize, String>,
    file: JavaFile,
    path: std::path::PathBuf,
}

/// Modifiers and annotations collected ahead of a declaration.
struct Prefix {
    start: usize,
    modifiers: Modifiers,
    annotations: Vec<Annotation>,
}

impl<'a> Parser<'a> {
    // -- token helpers --------------------------------------------------------

    /// Next token, skipping doc comments (they are looked up by position).
    fn peek(&self) -> Option<&Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens[self.pos..]
            .iter()
            .filter(|t| t.kind != Tok::Doc)
            .nth(n)
    }

    fn bump(&mut self) -> Option<Token> {
        while self.pos < self.tokens.len() {
            let tok = self.tokens[self.pos].clone();
            self.pos += 1;
            if tok.kind != Tok::Doc {
                return Some(tok);
            }
        }
        None
    }

    fn at_eof(&self) -> bool {
        self.peek().is_none()
    }

    fn is_punct(&self, p: &str) -> bool {
        self.peek_nth_is_punct(0, p)
    }

    fn peek_nth_is_punct(&self, n: usize, p: &str) -> bool {
        self.peek_nth(n)
            .is_some_and(|t| t.kind == Tok::Punct && t.text == p)
    }

    fn is_word(&self, w: &str) -> bool {
        self.peek_nth_is_word(0, w)
    }

    fn peek_nth_is_word(&self, n: usize, w: &str) -> bool {
        self.peek_nth(n)
            .is_some_and(|t| t.kind == Tok::Ident && t.text == w)
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.is_punct(p) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, w: &str) -> bool {
        if self.is_word(w) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn current_line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let message = match self.peek() {
            Some(tok) => format!("expected {}, found `{}`", expected, tok.text),
            None => format!("expected {}, found end of file", expected),
        };
        ParseError {
            line: self.current_line(),
            message,
        }
    }

    /// Consume the next token if it satisfies `pred`.
    fn next_if(&mut self, pred: impl Fn(&Token) -> bool) -> Option<Token> {
        if self.peek().is_some_and(|t| pred(t)) {
            self.bump()
        } else {
            None
        }
    }

    fn expect_punct(&mut self, p: &str) -> PResult<Token> {
        self.next_if(|t| t.kind == Tok::Punct && t.text == p)
            .ok_or_else(|| self.unexpected(&format!("`{}`", p)))
    }

    /// An identifier usable as a declaration name.
    fn expect_name(&mut self) -> PResult<Token> {
        self.next_if(|t| {
            t.kind == Tok::Ident && !is_reserved(&t.text) && !PRIMITIVES.contains(&t.text.as_str())
        })
        .ok_or_else(|| self.unexpected("identifier"))
    }

    fn diag(&mut self, err: ParseError) {
        self.file.diagnostics.push(Diagnostic::new(
            DiagnosticKind::Parse,
            self.path.clone(),
            Some(err.line),
            err.message,
        ));
    }

    /// Last doc comment between two raw token positions.
    fn doc_between(&self, start: usize, end: usize) -> Option<DocComment> {
        // A doc comment directly before `start` belongs to this declaration too.
        let mut from = start;
        while from > 0 && self.tokens[from - 1].kind == Tok::Doc {
            from -= 1;
        }
        self.tokens[from..end.min(self.tokens.len())]
            .iter()
            .rev()
            .find(|t| t.kind == Tok::Doc)
            .map(|t| javadoc::parse(&t.text))
    }

    /// Skip a balanced `{ ... }` starting at the current `{`.
    fn skip_block(&mut self) -> PResult<()> {
        let open = self.expect_punct("{")?;
        let mut depth = 1usize;
        while let Some(tok) = self.bump() {
            if tok.kind != Tok::Punct {
                continue;
            }
            match tok.text.as_str() {
                "{" => depth += 1,
                "}" => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(ParseError {
            line: open.line,
            message: "unterminated block: missing `}`".to_string(),
        })
    }

    /// Skip tokens up to (not including) a `,`/`)` or `;` at bracket depth
    /// zero. Returns the source text skipped.
    fn skip_until(&mut self, stops: &[&str]) -> String {
        let mut depth = 0usize;
        let first = self.peek().map(|t| t.start);
        let mut last_end = None;
        while let Some(tok) = self.peek() {
            if tok.kind == Tok::Punct {
                let text = tok.text.as_str();
                if depth == 0 && (stops.contains(&text) || text == "}") {
                    break;
                }
                match text {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            last_end = Some(tok.end);
            self.bump();
        }
        match (first, last_end) {
            (Some(s), Some(e)) => self.src[s..e].trim().to_string(),
            _ => String::new(),
        }
    }

    /// Resync after an error: consume through the next `;`, or skip the next
    /// balanced block, stopping early at a `}` that closes the enclosing body.
    fn recover(&mut self) {
        while let Some(tok) = self.peek() {
            if tok.kind == Tok::Punct {
                match tok.text.as_str() {
                    ";" => {
                        self.bump();
                        return;
                    }
                    "{" => {
                        if let Err(err) = self.skip_block() {
                            self.diag(err);
                        }
                        return;
                    }
                    "}" => return,
                    _ => {}
                }
            }
            self.bump();
        }
    }

    // -- compilation unit -----------------------------------------------------

    fn parse_unit(&mut self) {
        while let Some(tok) = self.peek() {
            if tok.kind == Tok::Punct && tok.text == ";" {
                self.bump();
                continue;
            }
            if tok.kind == Tok::Punct && tok.text == "}" {
                let line = tok.line;
                self.bump();
                self.diag(ParseError {
                    line,
                    message: "unmatched `}`".to_string(),
                });
                continue;
            }
            let result = if self.is_word("package") {
                self.parse_package()
            } else if self.is_word("import") {
                self.parse_import()
            } else if self.is_word("module")
                || (self.is_word("open") && self.peek_nth_is_word(1, "module"))
            {
                // module-info.java carries no API declarations
                self.recover();
                Ok(())
            } else {
                self.parse_member(None)
            };
            if let Err(err) = result {
                self.diag(err);
                self.recover();
            }
        }
    }

    fn parse_package(&mut self) -> PResult<()> {
        self.bump();
        let name = self.parse_qualified_name()?;
        self.expect_punct(";")?;
        self.file.package = Some(name);
        Ok(())
    }

    fn parse_import(&mut self) -> PResult<()> {
        self.bump();
        let is_static = self.eat_word("static");
        let mut name = self.parse_qualified_name()?;
        if self.eat_punct(".") {
            self.expect_punct("*")?;
            name.push_str(".*");
        }
        self.expect_punct(";")?;
        if !is_static {
            self.file.imports.push(name);
        }
        Ok(())
    }

    fn parse_qualified_name(&mut self) -> PResult<String> {
        let mut name = self.expect_name()?.text;
        while self.is_punct(".") && self.peek_nth(1).is_some_and(|t| t.kind == Tok::Ident) {
            self.bump();
            if let Some(segment) = self.bump() {
                name.push('.');
                name.push_str(&segment.text);
            }
        }
        Ok(name)
    }

    // -- members --------------------------------------------------------------

    /// Parse modifiers and annotations.
    fn parse_prefix(&mut self) -> PResult<Prefix> {
        let start = self.pos;
        let mut modifiers = Modifiers::default();
        let mut annotations = Vec::new();
        loop {
            if self.is_punct("@") && !self.peek_nth_is_word(1, "interface") {
                annotations.push(self.parse_annotation()?);
                continue;
            }
            let Some(tok) = self.peek() else { break };
            if tok.kind != Tok::Ident {
                break;
            }
            let word = tok.text.clone();
            if word == "non" && self.peek_nth_is_punct(1, "-") && self.peek_nth_is_word(2, "sealed") {
                self.bump();
                self.bump();
                self.bump();
                continue;
            }
            if !MODIFIERS.contains(&word.as_str()) {
                break;
            }
            // `default:` inside a switch never reaches here; `default` as an
            // annotation element default value is handled after the params.
            self.bump();
            match word.as_str() {
                "public" => modifiers.visibility = Visibility::Public,
                "protected" => modifiers.visibility = Visibility::Protected,
                "private" => modifiers.visibility = Visibility::Private,
                "static" => modifiers.is_static = true,
                "final" => modifiers.is_final = true,
                "abstract" => modifiers.is_abstract = true,
                "default" => modifiers.is_default = true,
                _ => {}
            }
        }
        Ok(Prefix {
            start,
            modifiers,
            annotations,
        })
    }

    /// Parse one member of a type body (or a top-level declaration when
    /// `parent` is `None`), recovering from errors.
    fn parse_member_recovering(&mut self, parent: Option<&str>, owner: Option<&str>) {
        let result = if self.is_punct("{") {
            // instance initializer
            self.skip_block()
        } else if self.is_word("static") && self.peek_nth_is_punct(1, "{") {
            self.bump();
            self.skip_block()
        } else {
            self.parse_member_in(parent, owner)
        };
        if let Err(err) = result {
            self.diag(err);
            self.recover();
        }
    }

    fn parse_member(&mut self, parent: Option<&str>) -> PResult<()> {
        self.parse_member_in(parent, None)
    }

    /// `owner` is the simple name of the enclosing type, used to detect
    /// constructors.
    fn parse_member_in(&mut self, parent: Option<&str>, owner: Option<&str>) -> PResult<()> {
        let prefix = self.parse_prefix()?;

        let flavor = if self.is_punct("@") && self.peek_nth_is_word(1, "interface") {
            self.bump();
            Some(TypeFlavor::Annotation)
        } else if self.is_word("class") {
            Some(TypeFlavor::Class)
        } else if self.is_word("interface") {
            Some(TypeFlavor::Interface)
        } else if self.is_word("enum") {
            Some(TypeFlavor::Enum)
        } else if self.is_word("record")
            && self.peek_nth(1).is_some_and(|t| t.kind == Tok::Ident)
            && (self.peek_nth_is_punct(2, "(") || self.peek_nth_is_punct(2, "<"))
        {
            Some(TypeFlavor::Record)
        } else {
            None
        };
        if let Some(flavor) = flavor {
            return self.parse_type_decl(flavor, prefix, parent);
        }

        let type_params = if self.is_punct("<") {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        // Constructor: `Owner(` with no return type; compact record
        // constructor: `Owner {`.
        if let (Some(owner), Some(tok)) = (owner, self.peek()) {
            if tok.kind == Tok::Ident && tok.text == owner {
                if self.peek_nth_is_punct(1, "(") {
                    let name = self.expect_name()?;
                    return self.parse_function_rest(prefix, parent, type_params, None, name);
                }
                if self.peek_nth_is_punct(1, "{") {
                    self.bump();
                    return self.skip_block();
                }
            }
        }

        let ty = self.parse_type()?;
        let name = self.expect_name()?;
        if self.is_punct("(") {
            return self.parse_function_rest(prefix, parent, type_params, Some(ty), name);
        }
        if !type_params.is_empty() {
            return Err(self.unexpected("`(`"));
        }
        self.parse_fields_rest(prefix, parent, ty, name)
    }

    fn parse_function_rest(
        &mut self,
        prefix: Prefix,
        parent: Option<&str>,
        type_params: Vec<String>,
        returns: Option<TypeRef>,
        name: Token,
    ) -> PResult<()> {
        let params = self.parse_params()?;
        let mut returns = returns;
        // Legacy `int f()[]`
        while self.is_punct("[") && self.peek_nth_is_punct(1, "]") {
            self.bump();
            self.bump();
            if let Some(ref mut r) = returns {
                r.array_dims += 1;
            }
        }
        let mut throws = Vec::new();
        if self.eat_word("throws") {
            throws = self.parse_type_list()?;
        }
        if self.eat_word("default") {
            // annotation element default value
            self.skip_until(&[";"]);
        }
        let doc = self.doc_between(prefix.start, self.pos);
        if self.is_punct("{") {
            self.skip_block()?;
        } else {
            self.expect_punct(";")?;
        }

        self.file.declarations.push(Declaration {
            name: name.text,
            parent: parent.map(str::to_string),
            kind: DeclKind::Function(FunctionDecl {
                type_params,
                params,
                returns,
                throws,
            }),
            modifiers: prefix.modifiers,
            annotations: prefix.annotations,
            doc,
            location: self.location(name.line, name.column),
        });
        Ok(())
    }

    fn parse_fields_rest(&mut self, prefix: Prefix, parent: Option<&str>, ty: TypeRef, first: Token) -> PResult<()> {
        let doc = self.doc_between(prefix.start, self.pos);
        let mut names = vec![(first, self.parse_dims())];
        loop {
            if self.eat_punct("=") {
                self.skip_initializer();
            }
            if self.is_punct(",") {
                self.bump();
                let name = self.expect_name()?;
                let dims = self.parse_dims();
                names.push((name, dims));
                continue;
            }
            break;
        }
        let end = self.expect_punct(";")?;
        let trailing_comment = self.line_comments.get(&end.line).cloned();

        for (name, dims) in names {
            let mut field_ty = ty.clone();
            field_ty.array_dims += dims;
            self.file.declarations.push(Declaration {
                name: name.text,
                parent: parent.map(str::to_string),
                kind: DeclKind::Field(FieldDecl {
                    ty: field_ty,
                    enum_constant: false,
                    trailing_comment: trailing_comment.clone(),
                }),
                modifiers: prefix.modifiers.clone(),
                annotations: prefix.annotations.clone(),
                doc: doc.clone(),
                location: self.location(name.line, name.column),
            });
        }
        Ok(())
    }

    /// Skip a field initializer. A `,` only ends it when a new declarator
    /// (`name =`, `name,`, `name;`) follows, so `new HashMap<K, V>()` survives.
    fn skip_initializer(&mut self) {
        loop {
            self.skip_until(&[",", ";"]);
            if !self.is_punct(",") {
                return;
            }
            let declarator_follows = self.peek_nth(1).is_some_and(|t| t.kind == Tok::Ident)
                && ["=", ",", ";", "["].iter().any(|p| self.peek_nth_is_punct(2, p));
            if declarator_follows {
                return;
            }
            self.bump();
        }
    }

    fn parse_dims(&mut self) -> usize {
        let mut dims = 0;
        while self.is_punct("[") && self.peek_nth_is_punct(1, "]") {
            self.bump();
            self.bump();
            dims += 1;
        }
        dims
    }

    fn location(&self, line: usize, column: usize) -> SourceLocation {
        SourceLocation {
            path: self.path.clone(),
            line,
            column,
        }
    }

    // -- types ----------------------------------------------------------------

    fn parse_type_decl(&mut self, flavor: TypeFlavor, prefix: Prefix, parent: Option<&str>) -> PResult<()> {
        // `class` / `interface` / `enum` / `record` / `interface` after `@`
        self.bump();
        let name = self.expect_name()?;
        let type_params = if self.is_punct("<") {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        let components = if flavor == TypeFlavor::Record {
            self.parse_params()?
        } else {
            Vec::new()
        };

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        loop {
            if self.eat_word("extends") {
                extends = self.parse_type_list()?;
            } else if self.eat_word("implements") {
                implements = self.parse_type_list()?;
            } else if self.eat_word("permits") {
                self.parse_type_list()?;
            } else {
                break;
            }
        }

        let doc = self.doc_between(prefix.start, self.pos);
        let open = self.expect_punct("{")?;

        let path = match parent {
            Some(p) => format!("{}.{}", p, name.text),
            None => name.text.clone(),
        };
        self.file.declarations.push(Declaration {
            name: name.text.clone(),
            parent: parent.map(str::to_string),
            kind: DeclKind::Type(TypeDecl {
                flavor,
                type_params,
                extends,
                implements,
            }),
            modifiers: prefix.modifiers,
            annotations: prefix.annotations,
            doc,
            location: self.location(name.line, name.column),
        });

        for component in components {
            self.file.declarations.push(Declaration {
                name: component.name,
                parent: Some(path.clone()),
                kind: DeclKind::Field(FieldDecl {
                    ty: component.ty,
                    enum_constant: false,
                    trailing_comment: None,
                }),
                modifiers: Modifiers {
                    visibility: Visibility::Private,
                    is_final: true,
                    ..Default::default()
                },
                annotations: component.annotations,
                doc: None,
                location: self.location(name.line, name.column),
            });
        }

        if flavor == TypeFlavor::Enum {
            self.parse_enum_constants(&path);
        }

        loop {
            if self.eat_punct("}") {
                return Ok(());
            }
            if self.at_eof() {
                self.diag(ParseError {
                    line: open.line,
                    message: format!("unterminated body of `{}`: missing `}}`", name.text),
                });
                return Ok(());
            }
            if self.eat_punct(";") {
                continue;
            }
            self.parse_member_recovering(Some(&path), Some(&name.text));
        }
    }

    fn parse_enum_constants(&mut self, path: &str) {
        loop {
            if self.eat_punct(";") || self.is_punct("}") || self.at_eof() {
                return;
            }
            if let Err(err) = self.parse_enum_constant(path) {
                self.diag(err);
                self.recover();
                return;
            }
        }
    }

    fn parse_enum_constant(&mut self, path: &str) -> PResult<()> {
        let start = self.pos;
        let mut annotations = Vec::new();
        while self.is_punct("@") {
            annotations.push(self.parse_annotation()?);
        }
        let name = self.expect_name()?;
        let doc = self.doc_between(start, self.pos);
        if self.eat_punct("(") {
            self.skip_until(&[")"]);
            self.expect_punct(")")?;
        }
        if self.is_punct("{") {
            self.skip_block()?;
        }
        let trailing_comment = self.line_comments.get(&name.line).cloned();
        self.file.declarations.push(Declaration {
            name: name.text.clone(),
            parent: Some(path.to_string()),
            kind: DeclKind::Field(FieldDecl {
                ty: TypeRef::named(path.rsplit('.').next().unwrap_or(path)),
                enum_constant: true,
                trailing_comment,
            }),
            modifiers: Modifiers {
                visibility: Visibility::Public,
                is_static: true,
                is_final: true,
                ..Default::default()
            },
            annotations,
            doc,
            location: self.location(name.line, name.column),
        });
        if !self.eat_punct(",") && !self.is_punct(";") && !self.is_punct("}") {
            return Err(self.unexpected("`,`, `;` or `}`"));
        }
        Ok(())
    }

    /// `<T, U extends Comparable<U> & Serializable>` → names only.
    fn parse_type_params(&mut self) -> PResult<Vec<String>> {
        self.expect_punct("<")?;
        let mut names = Vec::new();
        loop {
            while self.is_punct("@") {
                self.parse_annotation()?;
            }
            names.push(self.expect_name()?.text);
            if self.eat_word("extends") {
                self.parse_type()?;
                while self.eat_punct("&") {
                    self.parse_type()?;
                }
            }
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct(">")?;
            return Ok(names);
        }
    }

    fn parse_type_list(&mut self) -> PResult<Vec<TypeRef>> {
        let mut types = vec![self.parse_type()?];
        while self.eat_punct(",") {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    fn parse_type(&mut self) -> PResult<TypeRef> {
        while self.is_punct("@") {
            self.parse_annotation()?;
        }

        if self.eat_punct("?") {
            let mut ty = TypeRef::named("?");
            if self.eat_word("extends") {
                ty.bound = Some(Bound::Extends(Box::new(self.parse_type()?)));
            } else if self.eat_word("super") {
                ty.bound = Some(Bound::Super(Box::new(self.parse_type()?)));
            }
            return Ok(ty);
        }

        let first = self
            .next_if(|t| t.kind == Tok::Ident && !is_reserved(&t.text))
            .ok_or_else(|| self.unexpected("type"))?;
        let mut ty = TypeRef::named(first.text);

        loop {
            if self.is_punct("<") {
                self.bump();
                if !self.eat_punct(">") {
                    let mut args = vec![self.parse_type()?];
                    while self.eat_punct(",") {
                        args.push(self.parse_type()?);
                    }
                    self.expect_punct(">")?;
                    ty.args = args;
                }
            }
            if self.is_punct(".") && self.peek_nth(1).is_some_and(|t| t.kind == Tok::Ident || t.text == "@") {
                self.bump();
                while self.is_punct("@") {
                    self.parse_annotation()?;
                }
                let segment = self.expect_name()?.text;
                ty.name.push('.');
                ty.name.push_str(&segment);
                continue;
            }
            break;
        }

        ty.array_dims = self.parse_dims();
        if self.eat_punct("...") {
            ty.varargs = true;
        }
        Ok(ty)
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        if self.eat_punct(")") {
            return Ok(params);
        }
        loop {
            let mut annotations = Vec::new();
            loop {
                if self.is_punct("@") {
                    annotations.push(self.parse_annotation()?);
                } else if !self.eat_word("final") {
                    break;
                }
            }
            let mut ty = self.parse_type()?;
            // Receiver parameter `Foo this`
            if self.eat_word("this") {
                if self.eat_punct(",") {
                    continue;
                }
                self.expect_punct(")")?;
                return Ok(params);
            }
            let name = self.expect_name()?;
            ty.array_dims += self.parse_dims();
            params.push(Param {
                name: name.text,
                ty,
                annotations,
            });
            if self.eat_punct(",") {
                continue;
            }
            self.expect_punct(")")?;
            return Ok(params);
        }
    }

    fn parse_annotation(&mut self) -> PResult<Annotation> {
        self.expect_punct("@")?;
        let name = self.parse_qualified_name()?;
        let mut args = Vec::new();
        if self.eat_punct("(") {
            if !self.eat_punct(")") {
                let named = self.peek().is_some_and(|t| t.kind == Tok::Ident) && self.peek_nth_is_punct(1, "=");
                if named {
                    loop {
                        let key = self.expect_name()?.text;
                        self.expect_punct("=")?;
                        let value = self.skip_until(&[",", ")"]);
                        args.push(AnnotationArg { key, value });
                        if !self.eat_punct(",") {
                            break;
                        }
                    }
                } else {
                    let value = self.skip_until(&[")"]);
                    args.push(AnnotationArg {
                        key: "value".to_string(),
                        value,
                    });
                }
                self.expect_punct(")")?;
            }
        }
        Ok(Annotation { name, args })
    }
}

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse_src(src: &str) -> JavaFile {
        parse(&SourceFile {
            path: PathBuf::from("Test.java"),
            content: src.to_string(),
            language: Language::Java,
        })
    }

    fn symbols(file: &JavaFile) -> Vec<String> {
        file.declarations.iter().map(|d| d.symbol()).collect()
    }

    #[test]
    fn package_imports_and_class() {
        let file = parse_src(
            "package com.demo.web;\n\nimport java.util.List;\nimport com.demo.model.*;\nimport static java.util.Objects.requireNonNull;\n\npublic class UserController {}\n",
        );
        assert_eq!(file.package.as_deref(), Some("com.demo.web"));
        assert_eq!(file.imports, vec!["java.util.List", "com.demo.model.*"]);
        assert_eq!(symbols(&file), vec!["UserController"]);
        assert!(file.diagnostics.is_empty());
    }

    #[test]
    fn members_in_declaration_order() {
        let file = parse_src(
            r#"
/** A user. */
public class User extends BaseEntity implements Serializable {
    private static final long serialVersionUID = 1L;
    /** Display name */
    @NotBlank
    private String name;
    private int age, score[]; // age and scores
    private Map<String, List<Long>> tags = new HashMap<String, List<Long>>();

    public User() { this.name = "x"; }

    public String getName() { return name; }

    public <T extends Comparable<T>> T max(T a, T... rest) throws IOException {
        return a;
    }
}
"#,
        );
        assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
        assert_eq!(
            symbols(&file),
            vec![
                "User",
                "User.serialVersionUID",
                "User.name",
                "User.age",
                "User.score",
                "User.tags",
                "User.User()",
                "User.getName()",
                "User.max(T,T...)",
            ]
        );
        let user = &file.declarations[0];
        assert_eq!(user.doc.as_ref().unwrap().description, "A user.");
        assert_eq!(user.signature(), "public class User extends BaseEntity implements Serializable");

        let name = &file.declarations[2];
        assert_eq!(name.doc.as_ref().unwrap().description, "Display name");
        assert_eq!(name.annotations[0].name, "NotBlank");

        let score = file.declarations[4].as_field().unwrap();
        assert_eq!(score.ty.to_string(), "int[]");
        assert_eq!(score.trailing_comment.as_deref(), Some("age and scores"));

        let tags = file.declarations[5].as_field().unwrap();
        assert_eq!(tags.ty.to_string(), "Map<String, List<Long>>");

        let ctor = file.declarations[6].as_function().unwrap();
        assert!(ctor.returns.is_none());

        let max = file.declarations[8].as_function().unwrap();
        assert_eq!(max.type_params, vec!["T"]);
        assert_eq!(max.throws[0].name, "IOException");
    }

    #[test]
    fn annotations_with_attributes() {
        let file = parse_src(
            r#"
@RestController
@RequestMapping("/users")
class UserController {
    @RequestMapping(value = {"/list", "/all"}, method = {RequestMethod.GET, RequestMethod.POST})
    public List<User> list(@RequestParam(value = "page", required = false) Integer page, HttpServletRequest request) {
        return null;
    }
}
"#,
        );
        assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
        let class = &file.declarations[0];
        assert_eq!(class.annotations[1].attr("value"), Some("\"/users\""));
        let method = &file.declarations[1];
        let mapping = method.annotation("RequestMapping").unwrap();
        assert_eq!(mapping.attr("value"), Some("{\"/list\", \"/all\"}"));
        assert_eq!(
            mapping.attr("method"),
            Some("{RequestMethod.GET, RequestMethod.POST}")
        );
        let params = &method.as_function().unwrap().params;
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].annotation("RequestParam").unwrap().attr("required"), Some("false"));
    }

    #[test]
    fn enum_record_interface_and_nested() {
        let file = parse_src(
            r#"
public enum Status {
    /** Active */
    ACTIVE("a"),
    DISABLED("d") { },
    ;
    private final String code;
    Status(String code) { this.code = code; }
}
record Point(int x, @NotNull Integer y) implements Shape {
    Point { }
}
interface Repo<T, ID> extends Base<T> {
    T find(ID id);
    default void touch() {}
    class Impl {}
}
@interface Marker { String value() default ""; }
"#,
        );
        assert!(file.diagnostics.is_empty(), "{:?}", file.diagnostics);
        assert_eq!(
            symbols(&file),
            vec![
                "Status",
                "Status.ACTIVE",
                "Status.DISABLED",
                "Status.code",
                "Status.Status(String)",
                "Point",
                "Point.x",
                "Point.y",
                "Repo",
                "Repo.find(ID)",
                "Repo.touch()",
                "Repo.Impl",
                "Marker",
                "Marker.value()",
            ]
        );
        assert_eq!(file.declarations[1].doc.as_ref().unwrap().description, "Active");
        assert!(file.declarations[1].as_field().unwrap().enum_constant);
        assert!(file.declarations[10].modifiers.is_default);
        assert_eq!(file.declarations[11].parent.as_deref(), Some("Repo"));
    }

    #[test]
    fn broken_declaration_then_valid_one() {
        let file = parse_src(
            "/** broken */\nvoid broken(int a, {\n}\n/** ok */\nvoid ok() {}\n",
        );
        assert_eq!(symbols(&file), vec!["ok()"]);
        assert_eq!(file.diagnostics.len(), 1);
        assert_eq!(file.diagnostics[0].kind, DiagnosticKind::Parse);
        assert_eq!(file.diagnostics[0].line, Some(2));
        assert_eq!(file.declarations[0].doc.as_ref().unwrap().description, "ok");
    }

    #[test]
    fn broken_field_inside_class_keeps_siblings() {
        let file = parse_src("class A {\n  int = 5;\n  String ok;\n}\n");
        assert_eq!(symbols(&file), vec!["A", "A.ok"]);
        assert_eq!(file.diagnostics.len(), 1);
        assert!(file.diagnostics[0].message.contains("expected identifier"));
    }

    #[test]
    fn unterminated_class_body_keeps_parsed_members() {
        let file = parse_src("class A {\n  int x;\n");
        assert_eq!(symbols(&file), vec!["A", "A.x"]);
        assert_eq!(file.diagnostics.len(), 1);
    }

    #[test]
    fn unknown_statements_are_skipped() {
        let file = parse_src("class A {\n  static { init(); }\n  { x = 1; }\n  void f() { if (a) { b(); } }\n}\n");
        assert_eq!(symbols(&file), vec!["A", "A.f()"]);
        assert!(file.diagnostics.is_empty());
    }
}
