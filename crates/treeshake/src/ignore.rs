//! The ignore list: selectors, compound selectors or single nodes that must
//! never be removed.

use regex::Regex;

/// One ignore entry.
#[derive(Debug, Clone)]
pub enum IgnoreEntry {
    /// Matches text that is exactly equal.
    Literal(String),
    /// Matches text the expression finds a match in.
    Pattern(Regex),
}

impl IgnoreEntry {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            IgnoreEntry::Literal(literal) => literal == text,
            IgnoreEntry::Pattern(regex) => regex.is_match(text),
        }
    }
}

impl PartialEq for IgnoreEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IgnoreEntry::Literal(a), IgnoreEntry::Literal(b)) => a == b,
            (IgnoreEntry::Pattern(a), IgnoreEntry::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Ordered list of ignore entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IgnoreList {
    entries: Vec<IgnoreEntry>,
}

impl IgnoreList {
    pub fn new(entries: Vec<IgnoreEntry>) -> Self {
        Self { entries }
    }

    /// True if `text` is listed literally or any pattern matches it.
    pub fn matches(&self, text: &str) -> bool {
        self.entries.iter().any(|entry| entry.matches(text))
    }

    pub fn push(&mut self, entry: IgnoreEntry) {
        self.entries.push(entry);
    }

    /// Append each string as a literal entry.
    pub fn extend_literals<I: IntoIterator<Item = String>>(&mut self, literals: I) {
        self.entries
            .extend(literals.into_iter().map(IgnoreEntry::Literal));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_exact() {
        let list = IgnoreList::new(vec![IgnoreEntry::Literal(".legacy".into())]);
        assert!(list.matches(".legacy"));
        assert!(!list.matches(".legacy-nav"));
        assert!(!list.matches("legacy"));
    }

    #[test]
    fn test_pattern_uses_search_semantics() {
        let list = IgnoreList::new(vec![IgnoreEntry::Pattern(Regex::new(r"\.js-").unwrap())]);
        assert!(list.matches(".js-toggle"));
        assert!(list.matches("nav .js-toggle:hover"));
        assert!(!list.matches(".toggle"));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        assert!(!IgnoreList::default().matches(""));
    }

    #[test]
    fn test_extend_literals() {
        let mut list = IgnoreList::default();
        list.extend_literals(vec![".a".to_string(), ".b .c".to_string()]);
        assert_eq!(list.len(), 2);
        assert!(list.matches(".b .c"));
    }
}
