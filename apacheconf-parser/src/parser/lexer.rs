//! Lexer for Apache httpd configuration files
//!
//! Produces a lossless token stream: concatenating the text of every token
//! reproduces the input byte for byte.
//!
//! Key features:
//! - Two modes, morphing into each other: *line* mode at the start of a
//!   statement and *value* mode while reading directive arguments
//! - Section tags (`<VirtualHost *:80>`) are split into their parts
//! - The end of every directive is marked by an empty `Text` token
//! - Malformed input becomes an `Error` token instead of aborting

use logos::Logos;
use std::collections::VecDeque;
use std::fmt;

/// Token text; most tokens are short enough to stay inline.
pub type TokenText = smartstring::alias::String;

/// Classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Whitespace, line continuations, end-of-directive markers and bare words
    Text,
    Comment,
    /// `<Name`, `</Name` and the `>` that finishes a section tag
    Tag,
    /// Directive name
    Name,
    Keyword,
    Number,
    /// Section arguments, quoted strings and absolute paths
    String,
    /// Input the lexer could not match
    Error,
}

/// A single lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: TokenText,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// A `Text` token made only of whitespace. Empty tokens don't count.
    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Text
            && !self.text.is_empty()
            && self.text.chars().all(char::is_whitespace)
    }

    /// True when this token terminates the statement it follows: the empty
    /// end-of-directive marker, or a whitespace run starting with newlines.
    pub fn ends_line(&self) -> bool {
        if self.kind != TokenKind::Text {
            return false;
        }
        if self.text.is_empty() {
            return true;
        }
        let rest = self.text.trim_start_matches('\n');
        rest.len() < self.text.len() && rest.chars().all(char::is_whitespace)
    }

    /// `\` followed by a line break
    pub fn is_continuation(&self) -> bool {
        self.kind == TokenKind::Text && matches!(self.text.as_str(), "\\\n" | "\\\r\n")
    }

    pub fn is_tag_open(&self) -> bool {
        self.kind == TokenKind::Tag && self.text.starts_with('<') && !self.text.starts_with("</")
    }

    pub fn is_tag_close(&self) -> bool {
        self.kind == TokenKind::Tag && self.text.starts_with("</")
    }

    /// The `>` finishing either an opening or a closing tag
    pub fn is_tag_end(&self) -> bool {
        self.kind == TokenKind::Tag && self.text.as_str() == ">"
    }

    pub fn newlines(&self) -> usize {
        self.text.matches('\n').count()
    }
}

impl From<(TokenKind, &str)> for Token {
    fn from((kind, text): (TokenKind, &str)) -> Self {
        Self::new(kind, text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Lengths of the pieces of a section tag, `<` included in `name`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TagShape {
    name: usize,
    gap: usize,
    attr: usize,
}

/// Tokens recognised at the start of a statement
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LineToken {
    #[regex(r"\s+")]
    Space,

    #[token("#", lex_comment)]
    Comment,

    #[token("<", lex_tag)]
    Tag(TagShape),

    /// Directive name; switches to value mode
    #[regex(r"[a-zA-Z]\w*")]
    Name,

    #[regex(r"\.+")]
    Dots,
}

/// Tokens recognised inside directive arguments
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum ValueToken {
    #[regex(r"\\\r?\n")]
    Continuation,

    #[token("\\")]
    Backslash,

    #[regex(r"[^\S\n]+")]
    Space,

    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    Quoted,

    #[regex(r#"[^\s"\\]+"#, classify_word)]
    Word(TokenKind),
}

/// Comments run to the end of the line and continue onto the next line
/// while the current one ends with a backslash.
fn lex_comment(lex: &mut logos::Lexer<LineToken>) -> bool {
    let rest = lex.remainder();
    let mut end = 0;
    loop {
        let line_end = rest[end..].find('\n').map_or(rest.len(), |i| end + i);
        let line = rest[end..line_end].trim_end_matches('\r');
        if line.ends_with('\\') && line_end < rest.len() {
            end = line_end + 1;
        } else {
            end = line_end;
            break;
        }
    }
    lex.bump(end);
    true
}

/// `<Name>`, `</Name>` or `<Name attributes>`. The attribute text runs to the
/// last `>` on its line.
fn lex_tag(lex: &mut logos::Lexer<LineToken>) -> Option<TagShape> {
    let rest = lex.remainder();
    let name = rest
        .find(|c: char| c.is_whitespace() || c == '>')
        .unwrap_or(rest.len());
    if name == 0 {
        return None;
    }

    let after = &rest[name..];
    let (gap, attr) = if after.starts_with('>') {
        (0, 0)
    } else {
        let gap = after
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(after.len());
        let line = &after[gap..];
        let line = &line[..line.find('\n').unwrap_or(line.len())];
        (gap, line.rfind('>')?)
    };

    lex.bump(name + gap + attr + 1);
    Some(TagShape {
        name: name + 1,
        gap,
        attr,
    })
}

const KEYWORDS: &[&str] = &[
    "on", "off", "none", "any", "all", "double", "email", "dns", "min", "minimal", "os",
    "productonly", "full", "emerg", "alert", "crit", "error", "warn", "notice", "info", "debug",
    "registry", "script", "inetd", "standalone", "user", "group",
];

fn classify_word(lex: &mut logos::Lexer<ValueToken>) -> TokenKind {
    let word = lex.slice();
    if is_number(word) {
        TokenKind::Number
    } else if is_path(word) {
        TokenKind::String
    } else if KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
        TokenKind::Keyword
    } else {
        TokenKind::Text
    }
}

/// Integers and dotted IPv4 addresses with an optional `/prefix`
fn is_number(word: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if digits(word) {
        return true;
    }
    let (addr, prefix) = match word.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (word, None),
    };
    let octets: Vec<&str> = addr.split('.').collect();
    octets.len() == 4 && octets.iter().all(|o| digits(o)) && prefix.is_none_or(digits)
}

fn is_path(word: &str) -> bool {
    let Some(rest) = word.strip_prefix('/') else {
        return false;
    };
    let mut chars = rest.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c == '*' || c.is_ascii_alphanumeric());
    first_ok
        && rest.len() > 1
        && chars.all(|c| c == '*' || c == '.' || c == '/' || c == '-' || c == '_' || c.is_alphanumeric())
}

enum Mode<'s> {
    Line(logos::Lexer<'s, LineToken>),
    Value(logos::Lexer<'s, ValueToken>),
    Done,
}

/// Streaming lexer over a configuration source
pub struct Lexer<'s> {
    mode: Mode<'s>,
    pending: VecDeque<Token>,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            mode: Mode::Line(LineToken::lexer(source)),
            pending: VecDeque::new(),
        }
    }

    fn next_line(&mut self, mut lex: logos::Lexer<'s, LineToken>) -> Option<Token> {
        let result = lex.next()?;
        let slice = lex.slice();
        let token = match result {
            Ok(LineToken::Name) => {
                self.mode = Mode::Value(lex.morph());
                return Some(Token::new(TokenKind::Name, slice));
            }
            Ok(LineToken::Tag(shape)) => {
                self.split_tag(slice, shape);
                self.pending.pop_front()
            }
            Ok(LineToken::Space | LineToken::Dots) => Some(Token::new(TokenKind::Text, slice)),
            Ok(LineToken::Comment) => Some(Token::new(TokenKind::Comment, slice)),
            Err(()) => Some(Token::new(TokenKind::Error, slice)),
        };
        self.mode = Mode::Line(lex);
        token
    }

    fn next_value(&mut self, mut lex: logos::Lexer<'s, ValueToken>) -> Option<Token> {
        let rest = lex.remainder();
        if rest.is_empty() || rest.starts_with('\n') {
            self.mode = Mode::Line(lex.morph());
            return Some(Token::new(TokenKind::Text, ""));
        }

        let result = lex.next()?;
        let kind = match result {
            Ok(ValueToken::Continuation | ValueToken::Backslash | ValueToken::Space) => {
                TokenKind::Text
            }
            Ok(ValueToken::Quoted) => TokenKind::String,
            Ok(ValueToken::Word(kind)) => kind,
            Err(()) => TokenKind::Error,
        };
        let token = Token::new(kind, lex.slice());
        self.mode = Mode::Value(lex);
        Some(token)
    }

    fn split_tag(&mut self, slice: &str, shape: TagShape) {
        let (name, rest) = slice.split_at(shape.name);
        let (gap, rest) = rest.split_at(shape.gap);
        let (attr, close) = rest.split_at(shape.attr);
        self.pending.push_back(Token::new(TokenKind::Tag, name));
        if !gap.is_empty() {
            self.pending.push_back(Token::new(TokenKind::Text, gap));
        }
        if !attr.is_empty() {
            self.pending.push_back(Token::new(TokenKind::String, attr));
        }
        self.pending.push_back(Token::new(TokenKind::Tag, close));
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }
        match std::mem::replace(&mut self.mode, Mode::Done) {
            Mode::Line(lex) => self.next_line(lex),
            Mode::Value(lex) => self.next_value(lex),
            Mode::Done => None,
        }
    }
}

/// Tokenize a configuration source string
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}
