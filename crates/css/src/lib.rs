//! CSS stylesheet and selector parsing for the tree shaker.
//!
//! The stylesheet is parsed into a mutable tree of rules, at-rules, comments
//! and declarations that can be edited in place and serialized back to text.
//! Selectors are parsed separately into a flat node sequence.

pub mod error;
pub mod list;
pub mod parser;
pub mod selector;
pub mod source;
pub mod stringify;
pub mod token;

pub use error::ParseError;
pub use parser::{AtRule, Comment, CssNode, CssRule, Declaration, Stylesheet, parse_stylesheet};
pub use selector::{
    AttrOp, AttributeSelector, Combinator, NodeKind, Selector, SelectorNode, parse_selector,
    split_selector_list,
};
pub use source::SourcePosition;
pub use token::{CssToken, CssTokenizer};
