//! Removal of CSS selectors that cannot match a document, given the set of
//! class names the document uses.
//!
//! A selector is kept only if every class it names (directly or through a
//! `[class...]` attribute selector) is in the used set. Ids and class-free
//! selectors are dropped unless explicitly allowed. An ignore list protects
//! whole selectors, single compound selectors or single simple selectors
//! from removal.
//!
//! [`shake`] applies that policy to a whole [`css::Stylesheet`], then removes
//! emptied `@media` blocks and `@keyframes` no declaration refers to.

pub mod attribute;
pub mod decompose;
pub mod error;
pub mod evaluate;
pub mod ignore;
pub mod options;
pub mod policy;
pub mod shake;
pub mod used;

pub use error::ShakeError;
pub use ignore::{IgnoreEntry, IgnoreList};
pub use options::{ConfigError, FilterConfig, Gates, IgnoreSpec, Options};
pub use policy::SelectorFilter;
pub use shake::{Removal, ShakeReport, shake, shake_css};
pub use used::UsedClasses;
