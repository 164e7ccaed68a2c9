//! Title filtering for listing-search candidates.

use regex::Regex;
use showscout_core::ShowCandidate;
use tracing::debug;

/// Case-insensitive alternation over the configured show aliases, with
/// flexible whitespace inside each alias ("bo  jackson" still matches).
pub struct TitleFilter {
    pattern: Option<Regex>,
}

impl TitleFilter {
    pub fn new(aliases: &[String]) -> Self {
        let parts: Vec<String> = aliases
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(|a| regex::escape(a).replace(' ', r"\s*"))
            .collect();

        let pattern = if parts.is_empty() {
            None
        } else {
            let source = format!(r"(?i)\b(?:{})\b", parts.join("|"));
            Regex::new(&source).ok()
        };

        Self { pattern }
    }

    pub fn matches(&self, title: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(title))
    }

    /// Narrow candidates to title matches. An empty match set falls back
    /// to the full input: a selector or markup change on the listing page
    /// must degrade the feed's precision, not silently zero it out.
    pub fn apply(&self, candidates: Vec<ShowCandidate>) -> Vec<ShowCandidate> {
        let matched: Vec<ShowCandidate> = candidates
            .iter()
            .filter(|c| self.matches(&c.title))
            .cloned()
            .collect();

        if matched.is_empty() {
            debug!(
                total = candidates.len(),
                "No title matches, keeping unfiltered candidate set"
            );
            candidates
        } else {
            matched
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str) -> ShowCandidate {
        ShowCandidate {
            title: title.to_string(),
            url: format!("https://www.whatnot.com/live/{}", title.len()),
            start_raw: None,
            host: String::new(),
            thumbnail: None,
        }
    }

    fn aliases() -> Vec<String> {
        vec![
            "bo jackson battle arena".to_string(),
            "boba".to_string(),
            "tuesday night throwdown".to_string(),
        ]
    }

    #[test]
    fn matches_are_case_insensitive_with_flexible_whitespace() {
        let filter = TitleFilter::new(&aliases());
        assert!(filter.matches("BoBA ep. 12"));
        assert!(filter.matches("BO  JACKSON  BATTLE  ARENA tonight"));
        assert!(filter.matches("the Tuesday Night Throwdown returns"));
        assert!(!filter.matches("random pokemon breaks"));
    }

    #[test]
    fn alias_needs_word_boundary() {
        let filter = TitleFilter::new(&aliases());
        assert!(!filter.matches("bobafett collectibles"));
    }

    #[test]
    fn narrows_to_matching_titles() {
        let filter = TitleFilter::new(&aliases());
        let input = vec![candidate("BoBA ep. 3"), candidate("unrelated show")];
        let out = filter.apply(input);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "BoBA ep. 3");
    }

    #[test]
    fn zero_matches_fall_back_to_full_input() {
        let filter = TitleFilter::new(&aliases());
        let input = vec![candidate("card breaks"), candidate("another show")];
        let out = filter.apply(input.clone());
        assert_eq!(out, input);
    }

    #[test]
    fn empty_alias_list_matches_nothing_and_falls_back() {
        let filter = TitleFilter::new(&[]);
        assert!(!filter.matches("anything"));
        let input = vec![candidate("a show")];
        assert_eq!(filter.apply(input.clone()), input);
    }
}
