use std::collections::HashSet;

/// Class names the consuming document is known to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsedClasses {
    classes: HashSet<String>,
}

impl UsedClasses {
    pub fn new<I, S>(classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The same set with every entry upper-cased, for `[class=... i]`.
    pub fn to_uppercase(&self) -> UsedClasses {
        Self::new(self.classes.iter().map(|c| c.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse() {
        let used = UsedClasses::new(["a", "b", "a"]);
        assert_eq!(used.len(), 2);
        assert!(used.contains("a"));
        assert!(!used.contains("c"));
    }

    #[test]
    fn test_to_uppercase() {
        let upper = UsedClasses::new(["btn-primary"]).to_uppercase();
        assert!(upper.contains("BTN-PRIMARY"));
        assert!(!upper.contains("btn-primary"));
    }
}
