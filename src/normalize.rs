/// The fixed, locale-independent punctuation set stripped from every token.
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Normalizes raw text for the renderer: tokens are split on whitespace,
/// stripped of punctuation, lowercased, and rejoined with single spaces.
/// Tokens that are nothing but punctuation disappear entirely.
///
/// Already-normalized text is a fixed point, so the function can safely be
/// applied more than once.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .filter_map(|token| {
            let cleaned: String = token
                .chars()
                .filter(|c| !PUNCTUATION.contains(*c))
                .flat_map(char::to_lowercase)
                .collect();

            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{normalize, PUNCTUATION};

    #[test]
    fn strips_punctuation_and_lowercases() {
        let out = normalize("The cat sat on the mat. The cat ran.");
        assert_eq!(out, "the cat sat on the mat the cat ran");

        assert!(!out.chars().any(|c| PUNCTUATION.contains(c)));
        assert!(!out.chars().any(|c| c.is_uppercase()));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t\n  "), "");
    }

    #[test]
    fn punctuation_only_tokens_are_dropped() {
        assert_eq!(normalize("hello ... !!! world"), "hello world");
    }

    #[test]
    fn idempotent() {
        for text in [
            "The cat sat on the mat. The cat ran.",
            "Ärger, Überfluss; STRASSE!",
            "don't-stop believing",
            "",
        ] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(normalize("a  b\t\tc\n\nd"), "a b c d");
    }
}
