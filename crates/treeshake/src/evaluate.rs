//! Keep/drop verdict for one compound selector.

use css::NodeKind;

use crate::attribute::match_attribute;
use crate::decompose::Part;
use crate::ignore::IgnoreList;
use crate::used::UsedClasses;

/// Outcome of evaluating one [`Part`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartVerdict {
    /// The whole part is on the ignore list; it is kept and no further
    /// gate applies to it.
    Ignored,
    Evaluated {
        keep: bool,
        /// A class node, or a matching `[class...]` node, was reached.
        class_seen: bool,
    },
}

/// Fold the nodes of `part` left to right, stopping at the first node that
/// fails.
///
/// Ids pass only with `allow_ids`; classes pass when used; `[class...]`
/// attributes pass when [`match_attribute`] says so (case-folded for the `i`
/// flag); every other node passes. A node on the ignore list always passes.
pub fn evaluate_part(
    part: &Part<'_>,
    ignore: &IgnoreList,
    used: &UsedClasses,
    allow_ids: bool,
) -> PartVerdict {
    if ignore.matches(&part.to_string()) {
        return PartVerdict::Ignored;
    }

    let mut class_seen = false;
    let mut used_upper: Option<UsedClasses> = None;

    for node in &part.nodes {
        if ignore.matches(&node.raw) {
            continue;
        }

        let pass = match &node.kind {
            NodeKind::Id(_) => allow_ids,
            NodeKind::Class(name) => {
                class_seen = true;
                used.contains(name)
            }
            NodeKind::Attribute(attr) => {
                if attr.name != "class" {
                    true
                } else {
                    let value = attr.value.as_deref().unwrap_or_default();
                    let matched = if attr.insensitive {
                        let upper = used_upper.get_or_insert_with(|| used.to_uppercase());
                        match_attribute(attr.op, &value.to_uppercase(), upper)
                    } else {
                        match_attribute(attr.op, value, used)
                    };
                    if matched {
                        class_seen = true;
                    }
                    matched
                }
            }
            NodeKind::Combinator(_) | NodeKind::Comment(_) | NodeKind::Other => true,
        };

        if !pass {
            return PartVerdict::Evaluated {
                keep: false,
                class_seen,
            };
        }
    }

    PartVerdict::Evaluated {
        keep: true,
        class_seen,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose::decompose;
    use crate::ignore::IgnoreEntry;
    use css::parse_selector;
    use regex::Regex;

    fn verdict(input: &str, used: &[&str], ignore: &IgnoreList, allow_ids: bool) -> PartVerdict {
        let selector = parse_selector(input).unwrap();
        let parts = decompose(&selector);
        assert_eq!(parts.len(), 1, "expected a single compound selector");
        evaluate_part(&parts[0], ignore, &UsedClasses::new(used.iter().copied()), allow_ids)
    }

    fn evaluated(keep: bool, class_seen: bool) -> PartVerdict {
        PartVerdict::Evaluated { keep, class_seen }
    }

    #[test]
    fn test_used_class_kept() {
        let none = IgnoreList::default();
        assert_eq!(verdict(".a.b", &["a", "b"], &none, false), evaluated(true, true));
        assert_eq!(verdict("div.a:hover", &["a"], &none, false), evaluated(true, true));
    }

    #[test]
    fn test_unused_class_still_counts_as_seen() {
        let none = IgnoreList::default();
        assert_eq!(verdict(".missing", &["a"], &none, false), evaluated(false, true));
    }

    #[test]
    fn test_short_circuit_skips_later_nodes() {
        let none = IgnoreList::default();
        // `#id` fails first, so `.a` is never looked at.
        assert_eq!(verdict("#id.a", &["a"], &none, false), evaluated(false, false));
        assert_eq!(verdict("#id.a", &["a"], &none, true), evaluated(true, true));
    }

    #[test]
    fn test_non_class_nodes_pass_without_class() {
        let none = IgnoreList::default();
        assert_eq!(verdict("a[href]:hover", &[], &none, false), evaluated(true, false));
    }

    #[test]
    fn test_class_attribute() {
        let none = IgnoreList::default();
        assert_eq!(
            verdict("[class^=btn]", &["btn-primary"], &none, false),
            evaluated(true, true)
        );
        assert_eq!(
            verdict("[class^=nav]", &["btn-primary"], &none, false),
            evaluated(false, false)
        );
        // `[class]` has no operator to match with.
        assert_eq!(verdict("[class]", &["btn"], &none, false), evaluated(false, false));
    }

    #[test]
    fn test_case_insensitive_class_attribute() {
        let none = IgnoreList::default();
        assert_eq!(
            verdict("[class=\"BTN\" i]", &["btn"], &none, false),
            evaluated(true, true)
        );
        assert_eq!(
            verdict("[class=\"BTN\"]", &["btn"], &none, false),
            evaluated(false, false)
        );
    }

    #[test]
    fn test_whole_part_ignored() {
        let ignore = IgnoreList::new(vec![IgnoreEntry::Literal(".x#y".into())]);
        assert_eq!(verdict(".x#y", &[], &ignore, false), PartVerdict::Ignored);
    }

    #[test]
    fn test_single_node_ignored() {
        let ignore = IgnoreList::new(vec![IgnoreEntry::Pattern(Regex::new("^#").unwrap())]);
        assert_eq!(verdict("#app.a", &["a"], &ignore, false), evaluated(true, true));
        let ignore = IgnoreList::new(vec![IgnoreEntry::Literal(".gone".into())]);
        assert_eq!(verdict(".gone.a", &["a"], &ignore, false), evaluated(true, true));
    }
}
