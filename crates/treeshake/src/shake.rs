//! The rule walk: filters every rule's selectors, drops emptied rules, then
//! prunes empty `@media` blocks and unreferenced `@keyframes`.

use std::collections::HashSet;
use std::sync::OnceLock;

use css::{CssNode, CssRule, SourcePosition, Stylesheet, list, parse_stylesheet};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ShakeError;
use crate::ignore::IgnoreList;
use crate::options::{FilterConfig, Options};
use crate::policy::SelectorFilter;

// ─────────────────────────────────────────────────────────────────────────────
// Removal report
// ─────────────────────────────────────────────────────────────────────────────

/// Something removed from the stylesheet by a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Removal {
    /// Selectors dropped from one rule. The rule itself is gone only if
    /// none of its selectors survived.
    Selectors {
        selectors: Vec<String>,
        position: SourcePosition,
    },
    /// A keyframes block whose animation name is never referenced.
    Keyframes {
        /// At-rule name, e.g. `keyframes` or `-webkit-keyframes`.
        at_rule: String,
        /// Animation name.
        name: String,
        position: SourcePosition,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShakeReport {
    pub removed: Vec<Removal>,
}

impl ShakeReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty()
    }

    /// Total number of selectors dropped across all rules.
    pub fn selector_count(&self) -> usize {
        self.removed
            .iter()
            .map(|r| match r {
                Removal::Selectors { selectors, .. } => selectors.len(),
                Removal::Keyframes { .. } => 0,
            })
            .sum()
    }

    pub fn keyframes_count(&self) -> usize {
        self.removed
            .iter()
            .filter(|r| matches!(r, Removal::Keyframes { .. }))
            .count()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Remove unused selectors, rules, empty `@media` blocks and unreferenced
/// keyframes from `sheet`.
///
/// The pass runs on a copy; `sheet` is only replaced once every selector has
/// been evaluated, so an error leaves it exactly as it was.
pub fn shake(sheet: &mut Stylesheet, config: &FilterConfig) -> Result<ShakeReport, ShakeError> {
    let mut working = sheet.clone();
    let rules_before = working.rule_count();

    let mut pass = Pass {
        config,
        ignore: config.ignore.clone(),
        ignore_next_rule: false,
        removed: Vec::new(),
    };
    pass.filter_nodes(&mut working.nodes, false)?;

    prune_empty_media(&mut working.nodes);

    let animations = used_animations(&working);
    filter_keyframes(&mut working.nodes, &animations, &mut pass.removed);

    let report = ShakeReport {
        removed: pass.removed,
    };
    info!(
        rules_before,
        rules_after = working.rule_count(),
        selectors_removed = report.selector_count(),
        keyframes_removed = report.keyframes_count(),
        "shake pass complete"
    );

    *sheet = working;
    Ok(report)
}

/// Parse `input`, shake it with `options` and render the result.
pub fn shake_css(input: &str, options: &Options) -> Result<(String, ShakeReport), ShakeError> {
    let config = options.resolve()?;
    let mut sheet = parse_stylesheet(input)?;
    let report = shake(&mut sheet, &config)?;
    Ok((sheet.to_string(), report))
}

// ─────────────────────────────────────────────────────────────────────────────
// Rule walk
// ─────────────────────────────────────────────────────────────────────────────

struct Pass<'a> {
    config: &'a FilterConfig,
    /// Grows with the selectors of rules marked by an ignore comment.
    ignore: IgnoreList,
    ignore_next_rule: bool,
    removed: Vec<Removal>,
}

fn ignore_sentinel() -> &'static Regex {
    static SENTINEL: OnceLock<Regex> = OnceLock::new();
    SENTINEL.get_or_init(|| {
        Regex::new(r"^!?\s?uncss:ignore\s?$").expect("sentinel pattern is valid")
    })
}

impl Pass<'_> {
    /// Rebuilds `nodes` from its survivors. On error the list is left
    /// partially drained; callers only ever pass the working copy.
    fn filter_nodes(&mut self, nodes: &mut Vec<CssNode>, in_keyframes: bool) -> Result<(), ShakeError> {
        let mut survivors = Vec::with_capacity(nodes.len());
        for mut node in std::mem::take(nodes) {
            let keep = match &mut node {
                CssNode::Comment(comment) => {
                    if ignore_sentinel().is_match(&comment.text) {
                        self.ignore_next_rule = true;
                    }
                    true
                }
                // Keyframe stops like `from` or `50%` are not class selectors.
                CssNode::Rule(_) if in_keyframes => true,
                CssNode::Rule(rule) => self.filter_rule(rule)?,
                CssNode::AtRule(at_rule) => {
                    let keyframes = at_rule.name.ends_with("keyframes");
                    if let Some(children) = at_rule.nodes.as_mut() {
                        self.filter_nodes(children, keyframes)?;
                    }
                    true
                }
                CssNode::Declaration(_) => true,
            };
            if keep {
                survivors.push(node);
            }
        }
        *nodes = survivors;
        Ok(())
    }

    /// Returns whether the rule survives.
    fn filter_rule(&mut self, rule: &mut CssRule) -> Result<bool, ShakeError> {
        if self.ignore_next_rule {
            self.ignore_next_rule = false;
            self.ignore.extend_literals(rule.selectors.iter().cloned());
        }

        let filter = SelectorFilter {
            used: &self.config.used,
            ignore: &self.ignore,
            gates: self.config.gates,
        };
        let (kept, dropped) = filter.partition(&rule.selectors)?;

        if !dropped.is_empty() {
            debug!(position = %rule.source, selectors = ?dropped, "removing unused selectors");
            self.removed.push(Removal::Selectors {
                selectors: dropped,
                position: rule.source,
            });
        }

        if kept.is_empty() {
            return Ok(false);
        }
        rule.selectors = kept;
        self.filter_nodes(&mut rule.nodes, false)?;
        Ok(true)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// At-rule pruning
// ─────────────────────────────────────────────────────────────────────────────

/// Drop `@media` blocks with no children, innermost first.
fn prune_empty_media(nodes: &mut Vec<CssNode>) {
    nodes.retain_mut(|node| {
        if let Some(children) = node.nodes_mut() {
            prune_empty_media(children);
        }
        match node {
            CssNode::AtRule(at_rule) if at_rule.name == "media" => {
                let empty = at_rule.nodes.as_ref().is_some_and(Vec::is_empty);
                if empty {
                    debug!(position = %at_rule.source, params = %at_rule.params, "removing empty @media");
                }
                !empty
            }
            _ => true,
        }
    });
}

/// Animation names referenced by `animation-name` or `animation` shorthand
/// declarations, vendor-prefixed forms included.
fn used_animations(sheet: &Stylesheet) -> HashSet<String> {
    let mut names = HashSet::new();
    sheet.walk_declarations(|decl| {
        if decl.property.ends_with("animation-name") {
            names.extend(list::comma(&decl.value));
        } else if decl.property.ends_with("animation") {
            for animation in list::comma(&decl.value) {
                if let Some(name) = list::space(&animation).into_iter().next() {
                    names.insert(name);
                }
            }
        }
    });
    names
}

fn filter_keyframes(nodes: &mut Vec<CssNode>, animations: &HashSet<String>, removed: &mut Vec<Removal>) {
    nodes.retain_mut(|node| match node {
        CssNode::AtRule(at_rule)
            if at_rule.name.ends_with("keyframes") && !animations.contains(&at_rule.params) =>
        {
            debug!(position = %at_rule.source, name = %at_rule.params, "removing unused keyframes");
            removed.push(Removal::Keyframes {
                at_rule: at_rule.name.clone(),
                name: at_rule.params.clone(),
                position: at_rule.source,
            });
            false
        }
        _ => {
            if let Some(children) = node.nodes_mut() {
                filter_keyframes(children, animations, removed);
            }
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::IgnoreSpec;

    fn run(css: &str, used: &[&str]) -> (String, ShakeReport) {
        let options = Options {
            used: used.iter().map(ToString::to_string).collect(),
            ..Options::default()
        };
        shake_css(css, &options).unwrap()
    }

    #[test]
    fn test_unused_rule_removed() {
        let (out, report) = run(".a { color: red } .b { color: blue }", &["a"]);
        assert_eq!(out, ".a {\n  color: red;\n}\n");
        assert_eq!(
            report.removed,
            vec![Removal::Selectors {
                selectors: vec![".b".into()],
                position: SourcePosition::new(1, 19),
            }]
        );
    }

    #[test]
    fn test_selector_list_narrowed() {
        let (out, report) = run(".a, .b, .c { margin: 0 }", &["a", "c"]);
        assert_eq!(out, ".a, .c {\n  margin: 0;\n}\n");
        assert_eq!(report.selector_count(), 1);
    }

    #[test]
    fn test_at_prefixed_selector_kept() {
        let mut sheet = parse_stylesheet(".x { color: red }").unwrap();
        if let CssNode::Rule(rule) = &mut sheet.nodes[0] {
            rule.selectors = vec!["@x".into(), ".x".into()];
        }
        let report = shake(&mut sheet, &FilterConfig::default()).unwrap();
        assert_eq!(sheet.to_string(), "@x {\n  color: red;\n}\n");
        assert_eq!(report.selector_count(), 1);
    }

    #[test]
    fn test_keyframes_pruned_by_usage() {
        let css = "\
            .a { animation-name: spin, fade; }\n\
            @keyframes spin { 0% { opacity: 0 } 50% { opacity: .5 } to { opacity: 1 } }\n\
            @keyframes fade-missing { from { opacity: 1 } }\n";
        let (out, report) = run(css, &["a"]);
        assert!(out.contains("@keyframes spin"));
        assert!(out.contains("50% {"));
        assert!(out.contains("to {"));
        assert!(!out.contains("fade-missing"));
        assert_eq!(report.keyframes_count(), 1);
        assert!(matches!(
            &report.removed[0],
            Removal::Keyframes { at_rule, name, .. } if at_rule == "keyframes" && name == "fade-missing"
        ));
    }

    #[test]
    fn test_animation_shorthand_and_prefixes() {
        let css = "\
            .a { -webkit-animation: pulse 1s infinite, wobble 2s; }\n\
            @-webkit-keyframes pulse { to { opacity: 1 } }\n\
            @keyframes wobble { to { opacity: 1 } }\n\
            @keyframes infinite { to { opacity: 1 } }\n";
        let (out, _) = run(css, &["a"]);
        assert!(out.contains("@-webkit-keyframes pulse"));
        assert!(out.contains("@keyframes wobble"));
        assert!(!out.contains("@keyframes infinite"));
    }

    #[test]
    fn test_keyframes_referenced_only_by_removed_rule_are_pruned() {
        let css = ".gone { animation: spin 1s } @keyframes spin { to { opacity: 1 } }";
        let (out, _) = run(css, &[]);
        assert_eq!(out, "");
    }

    #[test]
    fn test_empty_media_removed() {
        let css = "@media (min-width: 1px) { .unused { color: red } } .a { color: blue }";
        let (out, _) = run(css, &["a"]);
        assert_eq!(out, ".a {\n  color: blue;\n}\n");
    }

    #[test]
    fn test_nested_empty_media_collapses() {
        let css = "@media screen { @media (min-width: 1px) { .unused { color: red } } }";
        let (out, _) = run(css, &[]);
        assert_eq!(out, "");
    }

    #[test]
    fn test_other_empty_at_rules_survive() {
        let css = "@supports (display: grid) { .unused { color: red } } @media print { /* keep */ }";
        let (out, _) = run(css, &[]);
        assert_eq!(out, "@supports (display: grid) {}\n@media print {\n  /* keep */\n}\n");
    }

    #[test]
    fn test_ignore_sentinel_applies_to_next_rule_only() {
        let css = "/* uncss:ignore */ .x { color: red } .y { color: blue }";
        let (out, report) = run(css, &[]);
        assert!(out.contains(".x {"));
        assert!(!out.contains(".y"));
        assert_eq!(report.selector_count(), 1);
    }

    #[test]
    fn test_ignore_sentinel_variants() {
        for comment in ["/*! uncss:ignore */", "/*uncss:ignore*/", "/*!uncss:ignore */"] {
            let (out, _) = run(&format!("{comment} .x {{ color: red }}"), &[]);
            assert!(out.contains(".x {"), "{comment}");
        }
        let (out, _) = run("/* uncss:ignore please */ .x { color: red }", &[]);
        assert!(!out.contains(".x {"));
    }

    #[test]
    fn test_ignore_sentinel_persists_for_same_selector() {
        let css = "/* uncss:ignore */ .x { color: red } .x { margin: 0 }";
        let (out, _) = run(css, &[]);
        assert_eq!(out.matches(".x {").count(), 2);
    }

    #[test]
    fn test_sentinel_does_not_leak_into_config() {
        let config = FilterConfig::default();
        let mut sheet = parse_stylesheet("/* uncss:ignore */ .x { color: red }").unwrap();
        shake(&mut sheet, &config).unwrap();
        assert!(config.ignore.is_empty());
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn test_configured_ignore() {
        let options = Options {
            ignore: vec![IgnoreSpec::Pattern {
                pattern: r"^\.js-".into(),
            }],
            ..Options::default()
        };
        let (out, _) = shake_css(".js-menu { color: red } .other { color: blue }", &options).unwrap();
        assert_eq!(out, ".js-menu {\n  color: red;\n}\n");
    }

    #[test]
    fn test_parse_error_leaves_sheet_untouched() {
        let mut sheet = parse_stylesheet(".gone { color: red } .bad, [x { color: red }").unwrap();
        let before = sheet.clone();
        let err = shake(&mut sheet, &FilterConfig::default()).unwrap_err();
        assert!(matches!(err, ShakeError::Parse(_)));
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_config_error_surfaces() {
        let options = Options {
            ignore: vec![IgnoreSpec::Pattern { pattern: "(".into() }],
            ..Options::default()
        };
        let err = shake_css(".a {}", &options).unwrap_err();
        assert!(matches!(err, ShakeError::Config(_)));
    }

    #[test]
    fn test_nested_rules_filtered() {
        let css = ".a { color: red; .b { color: blue } .c { color: green } }";
        let (out, _) = run(css, &["a", "c"]);
        assert_eq!(out, ".a {\n  color: red;\n  .c {\n    color: green;\n  }\n}\n");
    }

    #[test]
    fn test_custom_property_block_value_survives() {
        let (out, _) = run(".a { --theme: { color: red }; } .b { --x: { y: z } }", &["a"]);
        assert_eq!(out, ".a {\n  --theme: { color: red };\n}\n");
    }

    #[test]
    fn test_report_serializes_with_type_tag() {
        let (_, report) = run(".b { color: red }", &[]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["removed"][0]["type"], "selectors");
        assert_eq!(json["removed"][0]["selectors"][0], ".b");
        assert_eq!(json["removed"][0]["position"]["line"], 1);
    }

    #[test]
    fn test_keyframes_report_names_animation() {
        let (_, report) = run("@-webkit-keyframes fade { to { opacity: 0 } }", &[]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["removed"][0]["type"], "keyframes");
        assert_eq!(json["removed"][0]["at_rule"], "-webkit-keyframes");
        assert_eq!(json["removed"][0]["name"], "fade");
    }

    #[test]
    fn test_large_sheet_mostly_removed() {
        let count = 40_000;
        let mut css = String::with_capacity(count * 24);
        for i in 0..count {
            css.push_str(&format!(".c{i} {{ color: red }}\n"));
            if i == count / 2 {
                css.push_str(".keep { color: blue }\n");
            }
        }
        let mut sheet = parse_stylesheet(&css).unwrap();
        let config = Options {
            used: vec!["keep".into()],
            ..Options::default()
        }
        .resolve()
        .unwrap();

        let report = shake(&mut sheet, &config).unwrap();
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(sheet.to_string(), ".keep {\n  color: blue;\n}\n");
        assert_eq!(report.selector_count(), count);
        assert!(matches!(
            report.removed.last(),
            Some(Removal::Selectors { selectors, .. }) if selectors[0] == format!(".c{}", count - 1)
        ));
    }
}
