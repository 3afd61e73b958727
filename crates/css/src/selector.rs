//! Flat selector AST.
//!
//! A selector is kept as the ordered sequence of its simple selectors,
//! combinators and comments, each node carrying the source text it was
//! parsed from. Consumers that need compound selectors split the sequence at
//! combinator nodes themselves.

use core::fmt;

use crate::error::ParseError;
use crate::source::Span;
use crate::token::{CssToken, CssTokenizer, SpannedToken};

// ─────────────────────────────────────────────────────────────────────────────
// Selector AST
// ─────────────────────────────────────────────────────────────────────────────

/// Combinator between compound selectors in a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant
    Descendant,
    /// `>`: parent > child
    Child,
    /// `+`: prev + next
    NextSibling,
    /// `~`: prev ~ subsequent
    SubsequentSibling,
}

/// Attribute selector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Eq,
    /// `[attr~=val]`
    Includes,
    /// `[attr|=val]`
    DashMatch,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

/// `[name op value flag]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    pub op: AttrOp,
    /// Unquoted, unescaped value; `None` for `[attr]`.
    pub value: Option<String>,
    /// The `i` flag was given.
    pub insensitive: bool,
}

/// What a selector node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `#foo`
    Id(String),
    /// `.bar`
    Class(String),
    Attribute(AttributeSelector),
    Combinator(Combinator),
    /// `/* ... */` inside a selector.
    Comment(String),
    /// Type, universal, pseudo-class, pseudo-element, nesting and anything
    /// else that carries no class information.
    Other,
}

/// One node of a selector, with the text it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorNode {
    pub kind: NodeKind,
    pub raw: String,
}

impl SelectorNode {
    pub fn new(kind: NodeKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    pub fn is_combinator(&self) -> bool {
        matches!(self.kind, NodeKind::Combinator(_))
    }
}

impl fmt::Display for SelectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A single complex selector (no commas) as a flat node sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    pub nodes: Vec<SelectorNode>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Parse one complex selector, e.g. `ul > li.active:hover`.
///
/// Leading and trailing whitespace is dropped. A comma is an error: split
/// selector lists with [`split_selector_list`] first.
pub fn parse_selector(input: &str) -> Result<Selector, ParseError> {
    let mut tokenizer = CssTokenizer::new(input);
    let tokens = tokenizer
        .tokenize_all()
        .map_err(|_| invalid(input, "unterminated string or comment"))?;
    let mut parser = SelectorParser {
        input,
        chars: tokenizer.source(),
        tokens: &tokens,
        pos: 0,
        nodes: Vec::new(),
    };
    parser.parse()?;
    Ok(Selector {
        nodes: parser.nodes,
    })
}

/// Split a selector list at top-level commas, trimming each entry and
/// dropping empty ones.
///
/// Commas inside parentheses, brackets, strings and comments do not split.
pub fn split_selector_list(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(q) = quote {
            current.push(ch);
            if ch == '\\' {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                current.push(ch);
            }
            '\\' => {
                current.push(ch);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                current.push(ch);
                let mut prev = '\0';
                for c in chars.by_ref() {
                    current.push(c);
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            '(' | '[' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                push_trimmed(&mut out, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_trimmed(&mut out, &current);
    out
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let trimmed = s.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

fn invalid(selector: &str, reason: &'static str) -> ParseError {
    ParseError::InvalidSelector {
        selector: selector.to_string(),
        reason,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────────────────────────────────────

struct SelectorParser<'a> {
    input: &'a str,
    chars: &'a [char],
    tokens: &'a [SpannedToken],
    pos: usize,
    nodes: Vec<SelectorNode>,
}

impl SelectorParser<'_> {
    fn parse(&mut self) -> Result<(), ParseError> {
        // Start offset of a whitespace run not yet turned into a combinator.
        let mut pending_ws: Option<usize> = None;
        let tokens = self.tokens;

        while let Some(spanned) = tokens.get(self.pos) {
            match &spanned.token {
                CssToken::Whitespace => {
                    pending_ws.get_or_insert(spanned.span.start);
                    self.pos += 1;
                }
                CssToken::Delim(c @ ('>' | '+' | '~')) => {
                    let combinator = match c {
                        '>' => Combinator::Child,
                        '+' => Combinator::NextSibling,
                        _ => Combinator::SubsequentSibling,
                    };
                    let start = pending_ws.take().unwrap_or(spanned.span.start);
                    self.pos += 1;
                    let mut end = spanned.span.end;
                    while let Some(ws) = tokens.get(self.pos) {
                        if ws.token != CssToken::Whitespace {
                            break;
                        }
                        end = ws.span.end;
                        self.pos += 1;
                    }
                    self.push(NodeKind::Combinator(combinator), Span::new(start, end));
                }
                CssToken::Comment(text) => {
                    self.flush_descendant(&mut pending_ws, spanned.span.start);
                    let kind = NodeKind::Comment(text.clone());
                    self.push(kind, spanned.span);
                    self.pos += 1;
                }
                _ => {
                    self.flush_descendant(&mut pending_ws, spanned.span.start);
                    self.parse_simple()?;
                }
            }
        }
        Ok(())
    }

    /// Turn pending whitespace into a descendant combinator, unless it is
    /// leading whitespace or already part of an explicit combinator.
    fn flush_descendant(&mut self, pending_ws: &mut Option<usize>, end: usize) {
        let Some(start) = pending_ws.take() else {
            return;
        };
        match self.nodes.last() {
            Some(last) if !last.is_combinator() => {
                self.push(
                    NodeKind::Combinator(Combinator::Descendant),
                    Span::new(start, end),
                );
            }
            _ => {}
        }
    }

    fn push(&mut self, kind: NodeKind, span: Span) {
        let raw: String = self.chars[span.start..span.end].iter().collect();
        self.nodes.push(SelectorNode::new(kind, raw));
    }

    fn token(&self, pos: usize) -> Option<&CssToken> {
        self.tokens.get(pos).map(|t| &t.token)
    }

    fn span_from(&self, start_pos: usize) -> Span {
        Span::new(
            self.tokens[start_pos].span.start,
            self.tokens[self.pos - 1].span.end,
        )
    }

    fn skip_whitespace(&mut self) {
        while self.token(self.pos) == Some(&CssToken::Whitespace) {
            self.pos += 1;
        }
    }

    fn parse_simple(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;

        let kind = match token {
            CssToken::Delim('.') => match self.token(self.pos) {
                Some(CssToken::Ident(name)) => {
                    let name = name.clone();
                    self.pos += 1;
                    NodeKind::Class(name)
                }
                _ => return Err(invalid(self.input, "expected class name after '.'")),
            },
            CssToken::Hash { value, .. } => NodeKind::Id(value),
            CssToken::LBracket => NodeKind::Attribute(self.parse_attribute()?),
            CssToken::Ident(_) | CssToken::Delim('*') => {
                self.skip_namespace();
                NodeKind::Other
            }
            CssToken::Delim('|') => match self.token(self.pos) {
                Some(CssToken::Ident(_)) | Some(CssToken::Delim('*')) => {
                    self.pos += 1;
                    NodeKind::Other
                }
                _ => return Err(invalid(self.input, "expected name after '|'")),
            },
            CssToken::Delim('&') | CssToken::Numeric(_) => NodeKind::Other,
            CssToken::Colon => {
                self.parse_pseudo()?;
                NodeKind::Other
            }
            CssToken::Delim('#') => return Err(invalid(self.input, "expected id after '#'")),
            CssToken::Comma => return Err(invalid(self.input, "unexpected ','")),
            _ => return Err(invalid(self.input, "unexpected token")),
        };

        let span = self.span_from(start);
        self.push(kind, span);
        Ok(())
    }

    /// `ns|name` and `*|name` after the first name has been consumed.
    fn skip_namespace(&mut self) {
        if self.token(self.pos) == Some(&CssToken::Delim('|')) {
            match self.token(self.pos + 1) {
                Some(CssToken::Ident(_)) | Some(CssToken::Delim('*')) => self.pos += 2,
                _ => {}
            }
        }
    }

    /// Parse after `[` up to and including `]`.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, ParseError> {
        self.skip_whitespace();
        let name = match self.token(self.pos) {
            Some(CssToken::Ident(name)) => name.clone(),
            _ => return Err(invalid(self.input, "expected attribute name")),
        };
        self.pos += 1;
        self.skip_whitespace();

        if self.token(self.pos) == Some(&CssToken::RBracket) {
            self.pos += 1;
            return Ok(AttributeSelector {
                name,
                op: AttrOp::Exists,
                value: None,
                insensitive: false,
            });
        }

        let op = match (self.token(self.pos), self.token(self.pos + 1)) {
            (Some(CssToken::Delim('=')), _) => {
                self.pos += 1;
                AttrOp::Eq
            }
            (Some(CssToken::Delim(c)), Some(CssToken::Delim('='))) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return Err(invalid(self.input, "unknown attribute operator")),
                };
                self.pos += 2;
                op
            }
            (None, _) => return Err(invalid(self.input, "unclosed attribute selector")),
            _ => return Err(invalid(self.input, "expected attribute operator")),
        };
        self.skip_whitespace();

        let value = match self.token(self.pos) {
            Some(CssToken::Ident(v)) | Some(CssToken::String(v)) | Some(CssToken::Numeric(v)) => {
                v.clone()
            }
            _ => return Err(invalid(self.input, "expected attribute value")),
        };
        self.pos += 1;
        self.skip_whitespace();

        let mut insensitive = false;
        if let Some(CssToken::Ident(flag)) = self.token(self.pos) {
            match flag.as_str() {
                "i" | "I" => insensitive = true,
                "s" | "S" => {}
                _ => return Err(invalid(self.input, "unknown attribute flag")),
            }
            self.pos += 1;
            self.skip_whitespace();
        }

        match self.token(self.pos) {
            Some(CssToken::RBracket) => {
                self.pos += 1;
                Ok(AttributeSelector {
                    name,
                    op,
                    value: Some(value),
                    insensitive,
                })
            }
            _ => Err(invalid(self.input, "unclosed attribute selector")),
        }
    }

    /// Parse after the first `:` of a pseudo-class or pseudo-element.
    fn parse_pseudo(&mut self) -> Result<(), ParseError> {
        if self.token(self.pos) == Some(&CssToken::Colon) {
            self.pos += 1;
        }
        match self.token(self.pos) {
            Some(CssToken::Ident(_)) => {
                self.pos += 1;
                Ok(())
            }
            Some(CssToken::Function(_)) => {
                self.pos += 1;
                self.skip_to_matching_rparen()
            }
            _ => Err(invalid(self.input, "expected pseudo-class name")),
        }
    }

    fn skip_to_matching_rparen(&mut self) -> Result<(), ParseError> {
        let mut depth = 1;
        while let Some(token) = self.token(self.pos) {
            match token {
                CssToken::LParen | CssToken::Function(_) => depth += 1,
                CssToken::RParen => depth -= 1,
                _ => {}
            }
            self.pos += 1;
            if depth == 0 {
                return Ok(());
            }
        }
        Err(invalid(self.input, "unclosed parenthesis"))
    }
}
