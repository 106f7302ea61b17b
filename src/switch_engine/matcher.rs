//! Word-prefix matching for the overlay's incremental search.
//!
//! A query is split into tokens; a name matches when every token is a prefix
//! of at least one word of the name, in any order. "vi st" therefore matches
//! "Visual Studio Code" and so does "code vi".

/// Case-insensitive multi-token prefix match. An empty query matches
/// everything.
pub fn matches_query(name: &str, query: &str) -> bool {
    let words: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    query_tokens(query)
        .all(|token| words.iter().any(|word| word.starts_with(&token)))
}

/// Query tokens are separated by whitespace, `-`, or `_`.
fn query_tokens(query: &str) -> impl Iterator<Item = String> + '_ {
    query
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_any_name() {
        assert!(matches_query("Visual Studio Code", ""));
        assert!(matches_query("", ""));
        assert!(matches_query("Mail", "   "));
    }

    #[test]
    fn every_token_must_prefix_some_word() {
        assert!(matches_query("Visual Studio Code", "vi st"));
        assert!(matches_query("Visual Studio Code", "code vi"));
        assert!(!matches_query("Visual Studio Code", "xyz"));
        assert!(!matches_query("Visual Studio Code", "vi xyz"));
    }

    #[test]
    fn words_split_at_non_alphanumeric_boundaries() {
        assert!(matches_query("IntelliJ-IDEA_2024.app", "idea"));
        assert!(matches_query("IntelliJ-IDEA_2024.app", "2024 app"));
        assert!(!matches_query("IntelliJ-IDEA_2024.app", "ij"));
    }

    #[test]
    fn tokens_split_at_dash_and_underscore() {
        assert!(matches_query("Visual Studio Code", "vi-st"));
        assert!(matches_query("Visual Studio Code", "vi_st"));
    }

    #[test]
    fn matching_ignores_case() {
        assert!(matches_query("FIREFOX", "fire"));
        assert!(matches_query("firefox", "FIRE"));
    }

    #[test]
    fn token_order_is_irrelevant_and_tokens_may_hit_one_word() {
        // Both tokens are prefixes of the same word; that counts.
        assert!(matches_query("Notes", "no not"));
    }
}
