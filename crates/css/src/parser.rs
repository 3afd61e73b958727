use crate::error::ParseError;
use crate::selector::split_selector_list;
use crate::source::{LineIndex, SourcePosition, Span};
use crate::token::{CssToken, CssTokenizer, SpannedToken};

/// A CSS declaration (property: value).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Property name as written, e.g. `color`, `-webkit-animation`.
    pub property: String,
    /// Value text with `!important` stripped.
    pub value: String,
    /// Whether `!important` was specified.
    pub important: bool,
    pub source: SourcePosition,
}

/// A CSS style rule: selectors + child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    /// The selector list, split at top-level commas and trimmed.
    pub selectors: Vec<String>,
    /// Declarations, comments and nested rules in the rule body.
    pub nodes: Vec<CssNode>,
    pub source: SourcePosition,
}

/// An at-rule such as `@media`, `@keyframes` or `@import`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtRule {
    /// Name without the `@`, e.g. `media`, `-webkit-keyframes`.
    pub name: String,
    /// Prelude text between the name and the block or `;`, trimmed.
    pub params: String,
    /// Block contents; `None` for statement at-rules like `@import`.
    pub nodes: Option<Vec<CssNode>>,
    pub source: SourcePosition,
}

/// A `/* ... */` comment at rule or declaration level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Inner text, trimmed.
    pub text: String,
    pub source: SourcePosition,
}

/// One node of the stylesheet tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssNode {
    Rule(CssRule),
    AtRule(AtRule),
    Comment(Comment),
    Declaration(Declaration),
}

impl CssNode {
    /// Child nodes, if this node is a container.
    pub fn nodes(&self) -> Option<&Vec<CssNode>> {
        match self {
            CssNode::Rule(rule) => Some(&rule.nodes),
            CssNode::AtRule(at_rule) => at_rule.nodes.as_ref(),
            CssNode::Comment(_) | CssNode::Declaration(_) => None,
        }
    }

    pub fn nodes_mut(&mut self) -> Option<&mut Vec<CssNode>> {
        match self {
            CssNode::Rule(rule) => Some(&mut rule.nodes),
            CssNode::AtRule(at_rule) => at_rule.nodes.as_mut(),
            CssNode::Comment(_) | CssNode::Declaration(_) => None,
        }
    }
}

/// A parsed CSS stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    /// Top-level nodes, in source order.
    pub nodes: Vec<CssNode>,
}

impl Stylesheet {
    /// Visit every declaration in the tree, depth first.
    pub fn walk_declarations<F: FnMut(&Declaration)>(&self, mut f: F) {
        fn walk<F: FnMut(&Declaration)>(nodes: &[CssNode], f: &mut F) {
            for node in nodes {
                if let CssNode::Declaration(decl) = node {
                    f(decl);
                }
                if let Some(children) = node.nodes() {
                    walk(children, f);
                }
            }
        }
        walk(&self.nodes, &mut f);
    }

    /// Count rules anywhere in the tree.
    pub fn rule_count(&self) -> usize {
        fn count(nodes: &[CssNode]) -> usize {
            nodes
                .iter()
                .map(|node| {
                    let own = usize::from(matches!(node, CssNode::Rule(_)));
                    own + node.nodes().map_or(0, |children| count(children))
                })
                .sum()
        }
        count(&self.nodes)
    }
}

/// Parse a complete CSS stylesheet from a string.
pub fn parse_stylesheet(input: &str) -> Result<Stylesheet, ParseError> {
    let mut tokenizer = CssTokenizer::new(input);
    let tokens = tokenizer.tokenize_all()?;
    let chars = tokenizer.source();
    let mut parser = Parser {
        chars,
        tokens: &tokens,
        pos: 0,
        lines: LineIndex::new(chars),
    };
    let nodes = parser.parse_nodes(true)?;
    Ok(Stylesheet { nodes })
}

struct Parser<'a> {
    chars: &'a [char],
    tokens: &'a [SpannedToken],
    pos: usize,
    lines: LineIndex,
}

/// How an item that is not a comment or at-rule ends.
enum ItemEnd {
    /// `{` at this token index: the item is a rule.
    Block(usize),
    /// `;`, `}` or end of input: the item is a declaration.
    Statement(usize),
}

impl Parser<'_> {
    fn token(&self, pos: usize) -> Option<&CssToken> {
        self.tokens.get(pos).map(|t| &t.token)
    }

    fn position_of(&self, pos: usize) -> SourcePosition {
        let offset = self
            .tokens
            .get(pos)
            .map_or(self.chars.len(), |t| t.span.start);
        self.lines.position(offset)
    }

    /// Source text of tokens `start..end`, trimmed.
    fn text(&self, start: usize, end: usize) -> String {
        if start >= end {
            return String::new();
        }
        let span = Span::new(self.tokens[start].span.start, self.tokens[end - 1].span.end);
        self.chars[span.start..span.end]
            .iter()
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Parse nodes until end of input (top level) or an unconsumed `}`.
    fn parse_nodes(&mut self, top_level: bool) -> Result<Vec<CssNode>, ParseError> {
        let mut nodes = Vec::new();

        loop {
            while matches!(
                self.token(self.pos),
                Some(CssToken::Whitespace | CssToken::Semicolon | CssToken::CDO | CssToken::CDC)
            ) {
                self.pos += 1;
            }

            let Some(token) = self.token(self.pos) else {
                return Ok(nodes);
            };

            match token {
                CssToken::RBrace if top_level => {
                    return Err(ParseError::UnexpectedCloseBrace {
                        position: self.position_of(self.pos),
                    });
                }
                CssToken::RBrace => return Ok(nodes),
                CssToken::Comment(text) => {
                    nodes.push(CssNode::Comment(Comment {
                        text: text.trim().to_string(),
                        source: self.position_of(self.pos),
                    }));
                    self.pos += 1;
                }
                CssToken::AtKeyword(name) => {
                    let name = name.clone();
                    nodes.push(CssNode::AtRule(self.parse_at_rule(name)?));
                }
                _ if !top_level && self.at_custom_property() => {
                    let end = self.find_custom_property_end();
                    nodes.push(CssNode::Declaration(self.parse_declaration(end)?));
                }
                _ => match self.find_item_end() {
                    ItemEnd::Block(brace) => nodes.push(CssNode::Rule(self.parse_rule(brace)?)),
                    ItemEnd::Statement(end) if !top_level => {
                        nodes.push(CssNode::Declaration(self.parse_declaration(end)?));
                    }
                    ItemEnd::Statement(end) => {
                        return Err(ParseError::UnknownWord {
                            position: self.position_of(self.pos),
                            word: self.text(self.pos, end),
                        });
                    }
                },
            }
        }
    }

    /// `--name:` starts a custom property, whose value may hold `{}` blocks.
    fn at_custom_property(&self) -> bool {
        let Some(CssToken::Ident(name)) = self.token(self.pos) else {
            return false;
        };
        if !name.starts_with("--") {
            return false;
        }
        let mut pos = self.pos + 1;
        while self.token(pos) == Some(&CssToken::Whitespace) {
            pos += 1;
        }
        self.token(pos) == Some(&CssToken::Colon)
    }

    /// End of a custom property value: the first `;` or `}` outside any
    /// nested brackets, or end of input.
    fn find_custom_property_end(&self) -> usize {
        let mut depth = 0usize;
        let mut pos = self.pos;
        while let Some(token) = self.token(pos) {
            match token {
                CssToken::LParen | CssToken::Function(_) | CssToken::LBracket | CssToken::LBrace => {
                    depth += 1
                }
                CssToken::RParen | CssToken::RBracket => depth = depth.saturating_sub(1),
                CssToken::RBrace if depth == 0 => return pos,
                CssToken::RBrace => depth -= 1,
                CssToken::Semicolon if depth == 0 => return pos,
                _ => {}
            }
            pos += 1;
        }
        pos
    }

    fn find_item_end(&self) -> ItemEnd {
        let mut depth = 0usize;
        let mut pos = self.pos;
        while let Some(token) = self.token(pos) {
            match token {
                CssToken::LParen | CssToken::Function(_) | CssToken::LBracket => depth += 1,
                CssToken::RParen | CssToken::RBracket => depth = depth.saturating_sub(1),
                CssToken::LBrace => return ItemEnd::Block(pos),
                CssToken::Semicolon if depth == 0 => return ItemEnd::Statement(pos),
                CssToken::RBrace => return ItemEnd::Statement(pos),
                _ => {}
            }
            pos += 1;
        }
        ItemEnd::Statement(pos)
    }

    /// Parse the `{ ... }` starting at `self.pos`, consuming both braces.
    fn parse_block(&mut self) -> Result<Vec<CssNode>, ParseError> {
        let open = self.pos;
        self.pos += 1;
        let nodes = self.parse_nodes(false)?;
        if self.token(self.pos) != Some(&CssToken::RBrace) {
            return Err(ParseError::UnclosedBlock {
                position: self.position_of(open),
            });
        }
        self.pos += 1;
        Ok(nodes)
    }

    fn parse_at_rule(&mut self, name: String) -> Result<AtRule, ParseError> {
        let start = self.pos;
        let source = self.position_of(start);
        self.pos += 1;

        let prelude_start = self.pos;
        while let Some(token) = self.token(self.pos) {
            if matches!(token, CssToken::Semicolon | CssToken::LBrace | CssToken::RBrace) {
                break;
            }
            self.pos += 1;
        }
        let params = self.text(prelude_start, self.pos);

        let nodes = match self.token(self.pos) {
            Some(CssToken::LBrace) => Some(self.parse_block()?),
            Some(CssToken::Semicolon) => {
                self.pos += 1;
                None
            }
            _ => None,
        };

        Ok(AtRule {
            name,
            params,
            nodes,
            source,
        })
    }

    fn parse_rule(&mut self, brace: usize) -> Result<CssRule, ParseError> {
        let source = self.position_of(self.pos);
        let prelude = self.text(self.pos, brace);
        let selectors = split_selector_list(&prelude);
        if selectors.is_empty() {
            return Err(ParseError::MissingSelector { position: source });
        }

        self.pos = brace;
        let nodes = self.parse_block()?;
        Ok(CssRule {
            selectors,
            nodes,
            source,
        })
    }

    /// Parse `property: value [!important]` ending before token `end`.
    fn parse_declaration(&mut self, end: usize) -> Result<Declaration, ParseError> {
        let start = self.pos;
        let source = self.position_of(start);
        let unknown_word = |parser: &Self| ParseError::UnknownWord {
            position: source,
            word: parser.text(start, end),
        };

        let property = match self.token(self.pos) {
            Some(CssToken::Ident(name)) => name.clone(),
            _ => return Err(unknown_word(self)),
        };
        self.pos += 1;
        while self.token(self.pos) == Some(&CssToken::Whitespace) {
            self.pos += 1;
        }
        if self.pos >= end || self.token(self.pos) != Some(&CssToken::Colon) {
            return Err(unknown_word(self));
        }
        self.pos += 1;

        let raw_value = self.text(self.pos, end);
        let (value, important) = strip_important(&raw_value);

        self.pos = end;
        if self.token(self.pos) == Some(&CssToken::Semicolon) {
            self.pos += 1;
        }

        Ok(Declaration {
            property,
            value,
            important,
            source,
        })
    }
}

/// Check if the value ends with `!important`, and strip it if so.
fn strip_important(value: &str) -> (String, bool) {
    let lower = value.to_ascii_lowercase();
    if let Some(before) = lower.strip_suffix("important") {
        let before = before.trim_end();
        if let Some(rest) = before.strip_suffix('!') {
            return (value[..rest.len()].trim_end().to_string(), true);
        }
    }
    (value.to_string(), false)
}
