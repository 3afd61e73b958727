//! Matching of `[class <op> "value"]` selectors against the used class set.
//!
//! These are token-based approximations of the CSS attribute operators: the
//! selector value is split into whitespace-separated tokens and each operator
//! decides which tokens must be used classes outright and which only need to
//! be a prefix, suffix or substring of some used class.

use css::AttrOp;

use crate::used::UsedClasses;

/// Decide whether an attribute value could match given the used classes.
///
/// `Exists` (`[class]`) carries no value and never matches.
pub fn match_attribute(op: AttrOp, raw_value: &str, used: &UsedClasses) -> bool {
    let mut values: Vec<&str> = raw_value.split_whitespace().collect();
    if values.is_empty() {
        values.push("");
    }

    match op {
        AttrOp::Eq => all_used(&values, used),
        AttrOp::Includes => values.len() == 1 && used.contains(values[0]),
        AttrOp::DashMatch => {
            let (last, init) = split_last(&values);
            let prefix = format!("{last}-");
            all_used(init, used) && used.iter().any(|u| u.starts_with(&prefix))
        }
        AttrOp::Prefix => {
            let (last, init) = split_last(&values);
            all_used(init, used) && used.iter().any(|u| u.starts_with(last))
        }
        AttrOp::Suffix => {
            let (first, tail) = split_first(&values);
            all_used(tail, used) && used.iter().any(|u| u.ends_with(first))
        }
        AttrOp::Substring => match_substring(&values, used),
        AttrOp::Exists => false,
    }
}

/// `*=`: a single token may sit anywhere inside a used class. With several
/// tokens, the first must end a used class, the last must start one, and
/// every token in between must be used as-is.
fn match_substring(values: &[&str], used: &UsedClasses) -> bool {
    if let [only] = values {
        return used.iter().any(|u| u.contains(*only));
    }

    let (first, rest) = split_first(values);
    let (last, interior) = split_last(rest);
    all_used(interior, used)
        && used.iter().any(|u| u.ends_with(first))
        && used.iter().any(|u| u.starts_with(last))
}

fn all_used(values: &[&str], used: &UsedClasses) -> bool {
    values.iter().all(|v| used.contains(v))
}

// `values` is never empty: `match_attribute` substitutes a single empty token.
fn split_last<'v, 'a>(values: &'v [&'a str]) -> (&'a str, &'v [&'a str]) {
    match values.split_last() {
        Some((last, init)) => (*last, init),
        None => ("", values),
    }
}

fn split_first<'v, 'a>(values: &'v [&'a str]) -> (&'a str, &'v [&'a str]) {
    match values.split_first() {
        Some((first, tail)) => (*first, tail),
        None => ("", values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used() -> UsedClasses {
        UsedClasses::new(["btn", "btn-primary", "is-active"])
    }

    #[test]
    fn test_equality_requires_every_token() {
        assert!(match_attribute(AttrOp::Eq, "btn is-active", &used()));
        assert!(!match_attribute(AttrOp::Eq, "btn missing", &used()));
    }

    #[test]
    fn test_whitespace_equality_single_token_only() {
        assert!(match_attribute(AttrOp::Includes, "btn", &used()));
        assert!(!match_attribute(AttrOp::Includes, "btn is-active", &used()));
        assert!(!match_attribute(AttrOp::Includes, "missing", &used()));
    }

    #[test]
    fn test_dash_match_needs_dash_prefix() {
        assert!(match_attribute(AttrOp::DashMatch, "btn", &used()));
        assert!(match_attribute(AttrOp::DashMatch, "is-active btn", &used()));
        assert!(!match_attribute(AttrOp::DashMatch, "is-active", &used()));
        assert!(!match_attribute(AttrOp::DashMatch, "missing btn", &used()));
    }

    #[test]
    fn test_prefix_without_dash() {
        assert!(match_attribute(AttrOp::Prefix, "is", &used()));
        assert!(match_attribute(AttrOp::Prefix, "btn-p", &used()));
        assert!(!match_attribute(AttrOp::Prefix, "active", &used()));
    }

    #[test]
    fn test_suffix_checks_first_token() {
        assert!(match_attribute(AttrOp::Suffix, "active", &used()));
        assert!(match_attribute(AttrOp::Suffix, "primary btn", &used()));
        assert!(!match_attribute(AttrOp::Suffix, "primary missing", &used()));
        assert!(!match_attribute(AttrOp::Suffix, "is", &used()));
    }

    #[test]
    fn test_substring_single_token() {
        assert!(match_attribute(AttrOp::Substring, "n-pri", &used()));
        assert!(!match_attribute(AttrOp::Substring, "nope", &used()));
    }

    #[test]
    fn test_substring_multi_token() {
        // "-primary" ends "btn-primary", "is" starts "is-active", "btn" is used.
        assert!(match_attribute(AttrOp::Substring, "primary btn is", &used()));
        assert!(match_attribute(AttrOp::Substring, "tn is", &used()));
        assert!(!match_attribute(AttrOp::Substring, "primary missing is", &used()));
        assert!(!match_attribute(AttrOp::Substring, "btn xyz", &used()));
    }

    #[test]
    fn test_exists_never_matches() {
        assert!(!match_attribute(AttrOp::Exists, "", &used()));
    }

    #[test]
    fn test_extra_whitespace_ignored() {
        assert!(match_attribute(AttrOp::Eq, "  btn   is-active ", &used()));
    }
}
