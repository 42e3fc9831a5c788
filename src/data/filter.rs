use regex::Regex;

use crate::error::{LoadError, Result};

// ---------------------------------------------------------------------------
// Pattern: a column-name predicate
// ---------------------------------------------------------------------------

/// Column-name predicate with explicit "everything" / "nothing" cases.
///
/// Regex matching is anchored at the start of the name only: `px` matches
/// `px_bid`, while `bid` does not.
#[derive(Debug, Clone, Default)]
pub enum Pattern {
    /// Matches every name.
    Always,
    /// Matches no name.
    #[default]
    Never,
    Regex(Regex),
}

impl Pattern {
    /// Compile `pattern` into a [`Pattern::Regex`].
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Pattern::Regex)
            .map_err(|source| LoadError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Always => true,
            Pattern::Never => false,
            // leftmost-first: a match starting at 0 exists iff the first match starts there
            Pattern::Regex(re) => re.find(name).is_some_and(|m| m.start() == 0),
        }
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

impl TryFrom<&str> for Pattern {
    type Error = LoadError;

    fn try_from(pattern: &str) -> Result<Self> {
        Pattern::new(pattern)
    }
}

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// Which container columns are loaded.
///
/// A column is selected when it is the index column, or when it matches
/// `include` and does not match `exclude`.
#[derive(Debug, Clone)]
pub struct ColumnFilter<'a> {
    pub index: Option<&'a str>,
    pub include: &'a Pattern,
    pub exclude: &'a Pattern,
}

impl ColumnFilter<'_> {
    pub fn is_selected(&self, name: &str) -> bool {
        self.index == Some(name) || (self.include.matches(name) && !self.exclude.matches(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_and_never_are_literal() {
        assert!(Pattern::Always.matches(""));
        assert!(Pattern::Always.matches("anything"));
        assert!(!Pattern::Never.matches(""));
        assert!(!Pattern::Never.matches("anything"));
    }

    #[test]
    fn regex_match_is_prefix_anchored() {
        let p = Pattern::new("px").unwrap();
        assert!(p.matches("px"));
        assert!(p.matches("px_bid"));
        assert!(!p.matches("bid_px"));

        let dotstar = Pattern::new(".*").unwrap();
        assert!(dotstar.matches(""));
        assert!(dotstar.matches("qty"));
    }

    #[test]
    fn alternation_still_anchors_at_start() {
        // leftmost match for "ask_bid" is "ask" at 0 even though "bid" is listed first
        let p = Pattern::new("bid|ask").unwrap();
        assert!(p.matches("ask_bid"));
        assert!(!p.matches("mid_bid"));
    }

    #[test]
    fn bad_regex_is_invalid_input() {
        let err = Pattern::new("(").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn selection_with_overlapping_include_exclude() {
        let include = Pattern::new("px|qty").unwrap();
        let exclude = Pattern::new("px_ask").unwrap();
        let filter = ColumnFilter {
            index: Some("ts"),
            include: &include,
            exclude: &exclude,
        };
        let names = ["ts", "px_bid", "px_ask", "qty", "side", "px_ask_size"];
        let selected: Vec<_> = names
            .into_iter()
            .filter(|name| filter.is_selected(name))
            .collect();
        assert_eq!(selected, vec!["ts", "px_bid", "qty"]);
    }

    #[test]
    fn index_is_selected_even_when_excluded() {
        let filter = ColumnFilter {
            index: Some("ts"),
            include: &Pattern::Never,
            exclude: &Pattern::Always,
        };
        assert!(filter.is_selected("ts"));
        assert!(!filter.is_selected("px"));
    }
}
