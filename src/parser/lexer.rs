//! Java tokenizer.
//!
//! Produces just enough token structure for declaration parsing: words,
//! literals and single-character punctuation (`>>` is two `>` tokens so
//! nested generics close naturally). Javadoc comments become tokens of
//! their own; `//` comments are kept per line for trailing field docs.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok {
    Ident,
    Str,
    Char,
    Number,
    Punct,
    Doc,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: Tok,
    pub text: String,
    /// Byte offsets into the source.
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    /// Text of the last `//` comment on each line.
    pub line_comments: BTreeMap<usize, String>,
    /// (line, message) for unterminated literals and comments.
    pub errors: Vec<(usize, String)>,
}

struct Cursor<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    i: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).map(|&(_, c)| c)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.i + n).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.i)
            .map(|&(o, _)| o)
            .unwrap_or(self.src.len())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.src[self.offset()..].starts_with(s)
    }
}

pub fn lex(src: &str) -> Lexed {
    let mut out = Lexed::default();
    let mut cur = Cursor {
        src,
        chars: src.char_indices().collect(),
        i: 0,
        line: 1,
        column: 1,
    };

    while let Some(c) = cur.peek() {
        let start = cur.offset();
        let (line, column) = (cur.line, cur.column);

        if c.is_whitespace() {
            cur.bump();
            continue;
        }

        if cur.starts_with("//") {
            while let Some(c) = cur.peek() {
                if c == '\n' {
                    break;
                }
                cur.bump();
            }
            let text = src[start + 2..cur.offset()].trim().to_string();
            out.line_comments.insert(line, text);
            continue;
        }

        if cur.starts_with("/*") {
            let is_doc = cur.starts_with("/**") && !cur.starts_with("/**/");
            cur.bump();
            cur.bump();
            let mut closed = false;
            while cur.peek().is_some() {
                if cur.starts_with("*/") {
                    cur.bump();
                    cur.bump();
                    closed = true;
                    break;
                }
                cur.bump();
            }
            if !closed {
                out.errors.push((line, "unterminated comment".to_string()));
            } else if is_doc {
                push(&mut out, Tok::Doc, src, start, cur.offset(), line, column);
            }
            continue;
        }

        if cur.starts_with("\"\"\"") {
            for _ in 0..3 {
                cur.bump();
            }
            let mut closed = false;
            while cur.peek().is_some() {
                if cur.peek() == Some('\\') {
                    cur.bump();
                    cur.bump();
                    continue;
                }
                if cur.starts_with("\"\"\"") {
                    for _ in 0..3 {
                        cur.bump();
                    }
                    closed = true;
                    break;
                }
                cur.bump();
            }
            if !closed {
                out.errors.push((line, "unterminated text block".to_string()));
            }
            push(&mut out, Tok::Str, src, start, cur.offset(), line, column);
            continue;
        }

        if c == '"' || c == '\'' {
            cur.bump();
            let mut closed = false;
            while let Some(n) = cur.peek() {
                if n == '\n' {
                    break;
                }
                cur.bump();
                if n == '\\' {
                    cur.bump();
                } else if n == c {
                    closed = true;
                    break;
                }
            }
            if !closed {
                let what = if c == '"' { "string" } else { "character" };
                out.errors.push((line, format!("unterminated {} literal", what)));
            }
            let kind = if c == '"' { Tok::Str } else { Tok::Char };
            push(&mut out, kind, src, start, cur.offset(), line, column);
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && cur.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            while let Some(n) = cur.peek() {
                if n.is_ascii_alphanumeric() || n == '_' || n == '.' {
                    cur.bump();
                } else if (n == '+' || n == '-')
                    && matches!(cur.chars.get(cur.i.wrapping_sub(1)), Some((_, 'e' | 'E' | 'p' | 'P')))
                {
                    cur.bump();
                } else {
                    break;
                }
            }
            push(&mut out, Tok::Number, src, start, cur.offset(), line, column);
            continue;
        }

        if is_ident_start(c) {
            while cur.peek().is_some_and(is_ident_part) {
                cur.bump();
            }
            push(&mut out, Tok::Ident, src, start, cur.offset(), line, column);
            continue;
        }

        if cur.starts_with("...") {
            for _ in 0..3 {
                cur.bump();
            }
            push(&mut out, Tok::Punct, src, start, cur.offset(), line, column);
            continue;
        }

        cur.bump();
        push(&mut out, Tok::Punct, src, start, cur.offset(), line, column);
    }

    out
}

fn push(out: &mut Lexed, kind: Tok, src: &str, start: usize, end: usize, line: usize, column: usize) {
    out.tokens.push(Token {
        kind,
        text: src[start..end].to_string(),
        start,
        end,
        line,
        column,
    });
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        lex(src).tokens.into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn splits_generics_closers() {
        assert_eq!(
            texts("Map<String, List<Long>> m;"),
            vec!["Map", "<", "String", ",", "List", "<", "Long", ">", ">", "m", ";"]
        );
    }

    #[test]
    fn doc_comments_are_tokens_block_comments_are_not() {
        let lexed = lex("/* license */\n/** Doc. */\nclass A {}");
        assert_eq!(lexed.tokens[0].kind, Tok::Doc);
        assert_eq!(lexed.tokens[0].line, 2);
        assert_eq!(lexed.tokens[1].text, "class");
    }

    #[test]
    fn line_comments_recorded_by_line() {
        let lexed = lex("int a; // the a\nint b;");
        assert_eq!(lexed.line_comments.get(&1).map(String::as_str), Some("the a"));
        assert_eq!(lexed.tokens.len(), 6);
    }

    #[test]
    fn strings_with_escapes_and_varargs() {
        assert_eq!(
            texts(r#"f("a\"b", 'c', String... xs)"#),
            vec!["f", "(", r#""a\"b""#, ",", "'c'", ",", "String", "...", "xs", ")"]
        );
    }

    #[test]
    fn numbers_stay_whole() {
        assert_eq!(texts("x = 1.5e-3f;"), vec!["x", "=", "1.5e-3f", ";"]);
    }

    #[test]
    fn unterminated_comment_reported() {
        let lexed = lex("class A {\n/* oops");
        assert_eq!(lexed.errors.len(), 1);
        assert_eq!(lexed.errors[0].0, 2);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let lexed = lex("a\n  bb");
        assert_eq!((lexed.tokens[1].line, lexed.tokens[1].column), (2, 3));
    }
}
