//! User-facing options and their normalization into a [`FilterConfig`].

use regex::Regex;
use serde::Deserialize;

use crate::ignore::{IgnoreEntry, IgnoreList};
use crate::used::UsedClasses;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ignore pattern '{pattern}' is not a valid regular expression: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// An ignore entry as written in configuration: a bare string is an exact
/// selector, `{ "pattern": "..." }` is a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum IgnoreSpec {
    Literal(String),
    Pattern { pattern: String },
}

/// Options as supplied by the caller, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    pub used: Vec<String>,
    pub ignore: Vec<IgnoreSpec>,
    pub allow_ids: bool,
    pub allow_non_class_selectors: bool,
    /// Falls back to `allow_non_class_selectors` when unset.
    pub allow_non_class_combinators: Option<bool>,
}

/// The boolean switches of a resolved configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gates {
    /// Keep compound selectors containing `#id`.
    pub allow_ids: bool,
    /// Keep selectors in which no class was seen at all.
    pub allow_non_class_selectors: bool,
    /// Keep compound selectors in which no class was seen.
    pub allow_non_class_combinators: bool,
}

/// Normalized, immutable configuration for one or more filtering passes.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    pub used: UsedClasses,
    pub ignore: IgnoreList,
    pub gates: Gates,
}

impl Options {
    /// Compile ignore patterns and resolve option defaults.
    pub fn resolve(&self) -> Result<FilterConfig, ConfigError> {
        let mut ignore = IgnoreList::default();
        for spec in &self.ignore {
            let entry = match spec {
                IgnoreSpec::Literal(literal) => IgnoreEntry::Literal(literal.clone()),
                IgnoreSpec::Pattern { pattern } => {
                    let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        source: e,
                    })?;
                    IgnoreEntry::Pattern(regex)
                }
            };
            ignore.push(entry);
        }

        let gates = Gates {
            allow_ids: self.allow_ids,
            allow_non_class_selectors: self.allow_non_class_selectors,
            allow_non_class_combinators: self
                .allow_non_class_combinators
                .unwrap_or(self.allow_non_class_selectors),
        };

        Ok(FilterConfig {
            used: UsedClasses::new(self.used.iter().cloned()),
            ignore,
            gates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Options::default().resolve().unwrap();
        assert!(config.used.is_empty());
        assert!(config.ignore.is_empty());
        assert_eq!(config.gates, Gates::default());
    }

    #[test]
    fn test_combinators_inherit_selectors_gate() {
        let options = Options {
            allow_non_class_selectors: true,
            ..Options::default()
        };
        assert!(options.resolve().unwrap().gates.allow_non_class_combinators);

        let options = Options {
            allow_non_class_selectors: true,
            allow_non_class_combinators: Some(false),
            ..Options::default()
        };
        assert!(!options.resolve().unwrap().gates.allow_non_class_combinators);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "used": ["btn"],
            "ignore": [".legacy", { "pattern": "^\\.js-" }],
            "allowIds": true,
            "allowNonClassCombinators": true
        }"#;
        let options: Options = serde_json::from_str(json).unwrap();
        assert_eq!(options.used, vec!["btn"]);
        assert_eq!(
            options.ignore,
            vec![
                IgnoreSpec::Literal(".legacy".into()),
                IgnoreSpec::Pattern {
                    pattern: "^\\.js-".into()
                },
            ]
        );
        assert!(options.allow_ids);
        assert!(!options.allow_non_class_selectors);
        assert_eq!(options.allow_non_class_combinators, Some(true));

        let config = options.resolve().unwrap();
        assert!(config.ignore.matches(".legacy"));
        assert!(config.ignore.matches(".js-menu"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<Options, _> = serde_json::from_str(r#"{ "usedClasses": [] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_pattern_fails_fast() {
        let options = Options {
            ignore: vec![IgnoreSpec::Pattern {
                pattern: "(".into(),
            }],
            ..Options::default()
        };
        let err = options.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "("));
    }
}
