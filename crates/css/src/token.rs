use crate::error::ParseError;
use crate::source::{LineIndex, Span};

/// CSS token types per CSS Syntax Level 3, with comments kept as tokens.
///
/// Numeric tokens are kept as written: the tree shaker only ever needs to
/// re-emit them, never to compute with them.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    Ident(String),
    Function(String),
    AtKeyword(String),
    Hash { value: String, is_id: bool },
    String(String),
    Url(String),
    /// Number, percentage or dimension, e.g. `30%`, `1.5em`, `-2`.
    Numeric(String),
    Whitespace,
    /// Inner text of a `/* ... */` comment.
    Comment(String),
    Colon,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Delim(char),
    /// `<!--`
    CDO,
    /// `-->`
    CDC,
}

/// A token together with the char range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: CssToken,
    pub span: Span,
}

/// A CSS tokenizer that processes an input string into a stream of `CssToken`s.
pub struct CssTokenizer {
    input: Vec<char>,
    pos: usize,
}

impl CssTokenizer {
    /// Create a new tokenizer from a string input.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// The source as chars; spans index into this slice.
    pub fn source(&self) -> &[char] {
        &self.input
    }

    /// Tokenize the entire input.
    pub fn tokenize_all(&mut self) -> Result<Vec<SpannedToken>, ParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    /// Consume and return the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<SpannedToken>, ParseError> {
        let start = self.pos;
        let token = match self.consume_token()? {
            Some(token) => token,
            None => return Ok(None),
        };
        Ok(Some(SpannedToken {
            token,
            span: Span::new(start, self.pos),
        }))
    }

    fn consume_token(&mut self) -> Result<Option<CssToken>, ParseError> {
        if self.pos >= self.input.len() {
            return Ok(None);
        }

        let ch = self.peek();

        if ch == '/' && self.peek_at(1) == Some('*') {
            return self.consume_comment().map(Some);
        }

        if is_whitespace(ch) {
            self.consume_whitespace();
            return Ok(Some(CssToken::Whitespace));
        }

        if ch == '"' || ch == '\'' {
            return self.consume_string(ch).map(Some);
        }

        if ch == '#' {
            self.pos += 1;
            if self.pos < self.input.len()
                && (is_name_char(self.peek()) || self.starts_valid_escape_at(self.pos))
            {
                let is_id = self.would_start_ident_at(self.pos);
                let value = self.consume_name();
                return Ok(Some(CssToken::Hash { value, is_id }));
            }
            return Ok(Some(CssToken::Delim('#')));
        }

        if ch == '+' || ch == '-' || ch == '.' {
            if self.starts_number_at(self.pos) {
                return Ok(Some(self.consume_numeric()));
            }
            if ch == '-' && self.matches_ahead("-->") {
                self.pos += 3;
                return Ok(Some(CssToken::CDC));
            }
            if ch == '-' && self.would_start_ident_at(self.pos) {
                return Ok(Some(self.consume_ident_like()));
            }
            self.pos += 1;
            return Ok(Some(CssToken::Delim(ch)));
        }

        if ch.is_ascii_digit() {
            return Ok(Some(self.consume_numeric()));
        }

        if ch == '@' {
            self.pos += 1;
            if self.would_start_ident_at(self.pos) {
                return Ok(Some(CssToken::AtKeyword(self.consume_name())));
            }
            return Ok(Some(CssToken::Delim('@')));
        }

        if ch == '<' && self.matches_ahead("<!--") {
            self.pos += 4;
            return Ok(Some(CssToken::CDO));
        }

        let simple = match ch {
            ':' => Some(CssToken::Colon),
            ';' => Some(CssToken::Semicolon),
            ',' => Some(CssToken::Comma),
            '[' => Some(CssToken::LBracket),
            ']' => Some(CssToken::RBracket),
            '(' => Some(CssToken::LParen),
            ')' => Some(CssToken::RParen),
            '{' => Some(CssToken::LBrace),
            '}' => Some(CssToken::RBrace),
            _ => None,
        };
        if let Some(token) = simple {
            self.pos += 1;
            return Ok(Some(token));
        }

        if is_name_start_char(ch) || self.starts_valid_escape_at(self.pos) {
            return Ok(Some(self.consume_ident_like()));
        }

        self.pos += 1;
        Ok(Some(CssToken::Delim(ch)))
    }

    // --- Helper methods ---

    fn peek(&self) -> char {
        self.input[self.pos]
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn matches_ahead(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn error_position(&self, offset: usize) -> crate::source::SourcePosition {
        LineIndex::new(&self.input).position(offset)
    }

    fn consume_comment(&mut self) -> Result<CssToken, ParseError> {
        let start = self.pos;
        self.pos += 2;
        let body_start = self.pos;
        loop {
            if self.pos + 1 >= self.input.len() {
                return Err(ParseError::UnclosedComment {
                    position: self.error_position(start),
                });
            }
            if self.input[self.pos] == '*' && self.input[self.pos + 1] == '/' {
                let text: String = self.input[body_start..self.pos].iter().collect();
                self.pos += 2;
                return Ok(CssToken::Comment(text));
            }
            self.pos += 1;
        }
    }

    fn consume_whitespace(&mut self) {
        while self.pos < self.input.len() && is_whitespace(self.input[self.pos]) {
            self.pos += 1;
        }
    }

    fn consume_string(&mut self, quote: char) -> Result<CssToken, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(ch) = self.peek_at(0) else {
                return Err(ParseError::UnclosedString {
                    position: self.error_position(start),
                });
            };
            self.pos += 1;
            if ch == quote {
                return Ok(CssToken::String(value));
            }
            match ch {
                '\\' => match self.peek_at(0) {
                    // Escaped newline is a line continuation.
                    Some('\n') => self.pos += 1,
                    Some(_) => value.push(self.consume_escape()),
                    None => {}
                },
                '\n' => {
                    return Err(ParseError::UnclosedString {
                        position: self.error_position(start),
                    });
                }
                _ => value.push(ch),
            }
        }
    }

    /// Consume an escape sequence; the backslash is already consumed.
    fn consume_escape(&mut self) -> char {
        let Some(ch) = self.peek_at(0) else {
            return '\u{FFFD}';
        };
        self.pos += 1;
        if !ch.is_ascii_hexdigit() {
            return ch;
        }
        let mut hex = String::from(ch);
        while hex.len() < 6 {
            match self.peek_at(0) {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if self.peek_at(0).is_some_and(is_whitespace) {
            self.pos += 1;
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}')
    }

    fn starts_valid_escape_at(&self, idx: usize) -> bool {
        self.input.get(idx) == Some(&'\\')
            && self.input.get(idx + 1).is_some_and(|&c| c != '\n')
    }

    fn would_start_ident_at(&self, start: usize) -> bool {
        let Some(&ch) = self.input.get(start) else {
            return false;
        };
        if is_name_start_char(ch) {
            return true;
        }
        match ch {
            '-' => match self.input.get(start + 1) {
                Some(&next) if is_name_start_char(next) || next == '-' => true,
                Some('\\') => self.starts_valid_escape_at(start + 1),
                _ => false,
            },
            '\\' => self.starts_valid_escape_at(start),
            _ => false,
        }
    }

    fn starts_number_at(&self, start: usize) -> bool {
        let digit_at = |i: usize| self.input.get(i).is_some_and(|c| c.is_ascii_digit());
        match self.input.get(start) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => {
                digit_at(start + 1)
                    || (self.input.get(start + 1) == Some(&'.') && digit_at(start + 2))
            }
            Some('.') => digit_at(start + 1),
            _ => false,
        }
    }

    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        while self.pos < self.input.len() {
            let ch = self.input[self.pos];
            if is_name_char(ch) {
                name.push(ch);
                self.pos += 1;
            } else if self.starts_valid_escape_at(self.pos) {
                self.pos += 1;
                name.push(self.consume_escape());
            } else {
                break;
            }
        }
        name
    }

    fn consume_numeric(&mut self) -> CssToken {
        let start = self.pos;
        if matches!(self.peek_at(0), Some('+') | Some('-')) {
            self.pos += 1;
        }
        self.consume_digits();
        if self.peek_at(0) == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            self.consume_digits();
        }
        if matches!(self.peek_at(0), Some('e') | Some('E')) {
            let exp_digits = match self.peek_at(1) {
                Some(c) if c.is_ascii_digit() => 1,
                Some('+') | Some('-') if self.peek_at(2).is_some_and(|c| c.is_ascii_digit()) => 2,
                _ => 0,
            };
            if exp_digits > 0 {
                self.pos += exp_digits;
                self.consume_digits();
            }
        }

        if self.would_start_ident_at(self.pos) {
            self.consume_name();
        } else if self.peek_at(0) == Some('%') {
            self.pos += 1;
        }

        CssToken::Numeric(self.input[start..self.pos].iter().collect())
    }

    fn consume_digits(&mut self) {
        while self.peek_at(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_name();

        if self.peek_at(0) == Some('(') {
            self.pos += 1;
            if name.eq_ignore_ascii_case("url") {
                return self.consume_url();
            }
            return CssToken::Function(name);
        }

        CssToken::Ident(name)
    }

    fn consume_url(&mut self) -> CssToken {
        self.consume_whitespace();

        // url("...") is an ordinary function token followed by a string.
        if matches!(self.peek_at(0), Some('"') | Some('\'')) {
            return CssToken::Function("url".to_string());
        }

        let mut url = String::new();
        while let Some(ch) = self.peek_at(0) {
            if ch == ')' {
                self.pos += 1;
                break;
            }
            if is_whitespace(ch) {
                self.consume_whitespace();
                if self.peek_at(0) == Some(')') {
                    self.pos += 1;
                }
                break;
            }
            if self.starts_valid_escape_at(self.pos) {
                self.pos += 1;
                url.push(self.consume_escape());
            } else {
                url.push(ch);
                self.pos += 1;
            }
        }

        CssToken::Url(url)
    }
}

/// Tokenize `input`, keeping only the token kinds.
pub fn tokenize(input: &str) -> Result<Vec<CssToken>, ParseError> {
    Ok(CssTokenizer::new(input)
        .tokenize_all()?
        .into_iter()
        .map(|t| t.token)
        .collect())
}

pub(crate) fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_name_start_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch) || ch.is_ascii_digit() || ch == '-'
}
