/// Split a comma-separated model answer into keywords.
///
/// Each piece is trimmed and empty pieces are dropped; order and case are kept.
pub fn parse_keywords(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|kw| !kw.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_trims_and_drops_empty_pieces() {
        assert_eq!(parse_keywords("  ml,  AI ,, robotics"), vec!["ml", "AI", "robotics"]);
    }

    #[test]
    fn test_blank_answer_gives_no_keywords() {
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords(" , ,\n,").is_empty());
    }

    #[test]
    fn test_multiline_answer() {
        assert_eq!(
            parse_keywords("neural networks,\ntransformers,\n attention\n"),
            vec!["neural networks", "transformers", "attention"]
        );
    }

    proptest! {
        #[test]
        fn prop_keywords_are_trimmed_and_non_empty(text in ".{0,200}") {
            for kw in parse_keywords(&text) {
                prop_assert!(!kw.is_empty());
                prop_assert_eq!(kw.trim(), kw.as_str());
                prop_assert!(!kw.contains(','));
            }
        }

        #[test]
        fn prop_clean_terms_survive_in_order(
            terms in prop::collection::vec("[a-zA-Z][a-zA-Z0-9 -]{0,15}[a-zA-Z0-9]", 0..12),
            pad in "[ \t]{0,3}",
        ) {
            let text = terms
                .iter()
                .map(|t| format!("{}{}{}", pad, t, pad))
                .collect::<Vec<_>>()
                .join(",");
            prop_assert_eq!(parse_keywords(&text), terms);
        }
    }
}
