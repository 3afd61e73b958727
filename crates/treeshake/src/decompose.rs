//! Splitting a selector into its compound selectors.

use core::fmt;

use css::{NodeKind, Selector, SelectorNode};

/// A combinator-free run of nodes borrowed from a [`Selector`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part<'a> {
    pub nodes: Vec<&'a SelectorNode>,
}

impl fmt::Display for Part<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

/// Split `selector` at its combinators.
///
/// Comments belong to no part. Parts that render empty or all-whitespace
/// are dropped, so a selector made only of combinators and comments yields
/// no parts at all.
pub fn decompose(selector: &Selector) -> Vec<Part<'_>> {
    let mut parts = Vec::new();
    let mut current = Part::default();

    for node in &selector.nodes {
        match node.kind {
            NodeKind::Combinator(_) => parts.push(std::mem::take(&mut current)),
            NodeKind::Comment(_) => {}
            NodeKind::Id(_) | NodeKind::Class(_) | NodeKind::Attribute(_) | NodeKind::Other => {
                current.nodes.push(node);
            }
        }
    }
    parts.push(current);

    parts.retain(|part| !part.to_string().trim().is_empty());
    parts
}
