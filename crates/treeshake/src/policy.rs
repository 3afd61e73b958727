//! Keep/drop verdict for a whole selector.

use css::{ParseError, Selector, parse_selector};
use tracing::trace;

use crate::decompose::decompose;
use crate::evaluate::{PartVerdict, evaluate_part};
use crate::ignore::IgnoreList;
use crate::options::{FilterConfig, Gates};
use crate::used::UsedClasses;

/// Borrowed view of everything a selector verdict depends on.
#[derive(Debug, Clone, Copy)]
pub struct SelectorFilter<'a> {
    pub used: &'a UsedClasses,
    pub ignore: &'a IgnoreList,
    pub gates: Gates,
}

impl<'a> SelectorFilter<'a> {
    pub fn new(config: &'a FilterConfig) -> Self {
        Self {
            used: &config.used,
            ignore: &config.ignore,
            gates: config.gates,
        }
    }

    /// Decide whether the selector `text`, already parsed as `selector`,
    /// should stay in the stylesheet.
    pub fn keep(&self, text: &str, selector: &Selector) -> bool {
        if let Some(verdict) = self.pre_parse_verdict(text) {
            return verdict;
        }

        let mut keep = true;
        let mut class_in_selector = false;

        for part in decompose(selector) {
            let verdict = evaluate_part(&part, self.ignore, self.used, self.gates.allow_ids);
            let part_keep = match verdict {
                PartVerdict::Ignored => true,
                PartVerdict::Evaluated { keep, class_seen } => {
                    class_in_selector |= class_seen;
                    keep && (class_seen || self.gates.allow_non_class_combinators)
                }
            };
            if !part_keep {
                keep = false;
                break;
            }
        }

        if !class_in_selector && !self.gates.allow_non_class_selectors {
            keep = false;
        }

        trace!(selector = text, keep, "evaluated selector");
        keep
    }

    /// Parse `text` and decide whether to keep it.
    ///
    /// At-rule preludes and ignored selectors are kept without being parsed,
    /// so they never cause a parse error.
    pub fn keep_text(&self, text: &str) -> Result<bool, ParseError> {
        if let Some(verdict) = self.pre_parse_verdict(text) {
            return Ok(verdict);
        }
        let selector = parse_selector(text)?;
        Ok(self.keep(text, &selector))
    }

    /// Split a rule's selector list into `(kept, dropped)`, preserving order.
    ///
    /// Every selector is evaluated before anything is returned, so a parse
    /// error leaves no partial result behind.
    pub fn partition(&self, selectors: &[String]) -> Result<(Vec<String>, Vec<String>), ParseError> {
        let mut kept = Vec::with_capacity(selectors.len());
        let mut dropped = Vec::new();
        for selector in selectors {
            if self.keep_text(selector)? {
                kept.push(selector.clone());
            } else {
                dropped.push(selector.clone());
            }
        }
        Ok((kept, dropped))
    }

    fn pre_parse_verdict(&self, text: &str) -> Option<bool> {
        if text.starts_with('@') || self.ignore.matches(text) {
            Some(true)
        } else {
            None
        }
    }
}
