use serde::Serialize;

/// How a query matched a piece of text. Ordered weakest to strongest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    None,
    /// Every query character appears in order, but not contiguously.
    Subsequence,
    /// The query is a contiguous substring.
    Substring,
}

impl MatchKind {
    pub fn score(self) -> f32 {
        match self {
            MatchKind::None => 0.0,
            MatchKind::Subsequence => 0.5,
            MatchKind::Substring => 1.0,
        }
    }
}

/// Case-insensitive match of `query` against `text`.
pub fn match_kind(text: &str, query: &str) -> MatchKind {
    let text = text.to_lowercase();
    let query = query.to_lowercase();
    if text.contains(&query) {
        return MatchKind::Substring;
    }
    if is_subsequence(&text, &query) {
        return MatchKind::Subsequence;
    }
    MatchKind::None
}

/// Score in `{0, 0.5, 1}`.
pub fn score(text: &str, query: &str) -> f32 {
    match_kind(text, query).score()
}

fn is_subsequence(text: &str, query: &str) -> bool {
    let mut hay = text.chars();
    query.chars().all(|q| hay.any(|c| c == q))
}

#[cfg(test)]
mod tests {
    use super::{MatchKind, match_kind, score};

    #[test]
    fn substring_is_case_insensitive() {
        assert_eq!(score("Science Center", "sci"), 1.0);
        assert_eq!(score("science center", "SCIENCE"), 1.0);
        assert_eq!(score("Library", "rar"), 1.0);
    }

    #[test]
    fn subsequence_scores_half() {
        // s..c..i spread over "Student Center" is not a match: no 'i'.
        assert_eq!(match_kind("Student Center", "sci"), MatchKind::None);
        assert_eq!(match_kind("Student Center", "stc"), MatchKind::Subsequence);
        assert_eq!(score("Parking Lot 5", "plt"), 0.5);
    }

    #[test]
    fn order_matters_for_subsequence() {
        assert_eq!(match_kind("abc", "cba"), MatchKind::None);
        assert_eq!(match_kind("abc", "ac"), MatchKind::Subsequence);
    }

    #[test]
    fn scores_are_only_the_three_levels() {
        let texts = ["Main Building", "Library", "Lot 12", "", "ümlaut Hall"];
        let queries = ["", "a", "lib", "xyz", "mb", "ÜM", "hall"];
        for t in texts {
            for q in queries {
                let s = score(t, q);
                assert!(s == 0.0 || s == 0.5 || s == 1.0, "{t:?} {q:?} -> {s}");
                let substring = t.to_lowercase().contains(&q.to_lowercase());
                assert_eq!(s == 1.0, substring, "{t:?} {q:?}");
            }
        }
    }
}
