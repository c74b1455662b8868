use std::collections::{HashMap, HashSet};

use regex::Regex;

/// The stop-word list shipped with the crate, one word per line.
const DEFAULT_STOPWORDS: &str = include_str!("../data/stopwords_en.txt");

/// Splits text into words and turns them into a ranked frequency list.
///
/// Stop-word matching is case-insensitive and also recognizes contractions
/// with their apostrophes stripped, since upstream normalization removes
/// punctuation before the text reaches the tokenizer.
pub struct Tokenizer {
    regex: Regex,
    pub stopwords: HashSet<String>,
    pub min_word_length: usize,
    pub exclude_numbers: bool,
    pub max_words: usize,
}

impl Default for Tokenizer {
    fn default() -> Self {
        let regex = Regex::new("\\w[\\w']*").expect("Unable to compile tokenization regex");

        Tokenizer {
            regex,
            stopwords: stopword_set(DEFAULT_STOPWORDS.lines()),
            min_word_length: 0,
            exclude_numbers: true,
            max_words: 200,
        }
    }
}

fn stopword_set<'a>(words: impl Iterator<Item = &'a str>) -> HashSet<String> {
    let mut set = HashSet::new();
    for word in words {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            continue;
        }
        if word.contains('\'') {
            set.insert(word.replace('\'', ""));
        }
        set.insert(word);
    }
    set
}

impl<'a> Tokenizer {
    pub fn with_stopwords(mut self, words: impl IntoIterator<Item = &'a str>) -> Self {
        self.stopwords = stopword_set(words.into_iter());
        self
    }

    pub fn with_min_word_length(mut self, value: usize) -> Self {
        self.min_word_length = value;
        self
    }

    pub fn with_max_words(mut self, value: usize) -> Self {
        self.max_words = value;
        self
    }

    pub fn with_exclude_numbers(mut self, value: bool) -> Self {
        self.exclude_numbers = value;
        self
    }

    fn tokenize(&'a self, text: &'a str) -> impl IntoIterator<Item = &'a str> {
        let mut iter: Box<dyn Iterator<Item = &str>> = Box::new(
            self.regex
                .find_iter(text)
                .map(|mat| mat.as_str())
                .filter(|word| !word.is_empty()),
        );

        if self.min_word_length > 0 {
            iter = Box::new(iter.filter(|word| {
                let chars = word.chars().count();
                chars >= self.min_word_length
            }));
        }

        if self.exclude_numbers {
            iter = Box::new(iter.filter(move |word| !word.chars().all(char::is_numeric)));
        }

        if !self.stopwords.is_empty() {
            iter = Box::new(iter.filter(|word| {
                let lower_case = word.to_lowercase();
                !self.stopwords.contains(&lower_case)
            }));
        }

        iter
    }

    pub fn get_word_frequencies(&'a self, text: &'a str) -> HashMap<&'a str, usize> {
        let mut frequencies = HashMap::new();

        for word in self.tokenize(text) {
            let entry = frequencies.entry(word).or_insert(0);
            *entry += 1;
        }

        Self::keep_common_case(&frequencies)
    }

    /// Folds casing variants of the same word into the variant that occurs
    /// most often, summing their counts.
    fn keep_common_case(map: &HashMap<&'a str, usize>) -> HashMap<&'a str, usize> {
        type CaseCounts<'a> = HashMap<&'a str, usize>;

        let mut common_cases = HashMap::<String, CaseCounts>::new();
        for (key, val) in map {
            common_cases
                .entry(key.to_lowercase())
                .or_default()
                .insert(*key, *val);
        }

        common_cases
            .values()
            .map(|cases| {
                let mut ranked: Vec<(&str, usize)> = cases
                    .iter()
                    .map(|(case_key, case_val)| (*case_key, *case_val))
                    .collect();

                ranked.sort_by(|a, b| {
                    if a.1 != b.1 {
                        (b.1).cmp(&a.1)
                    } else {
                        (b.0).cmp(a.0)
                    }
                });

                let occurrence_sum = cases.values().sum();

                (ranked.first().expect("case group is never empty").0, occurrence_sum)
            })
            .collect()
    }

    /// Frequencies scaled by the maximum count so the top word has weight
    /// 1.0, ordered by weight descending with lexicographic tie-breaks, and
    /// truncated to `max_words`.
    pub fn get_normalized_word_frequencies(&'a self, text: &'a str) -> Vec<(&'a str, f32)> {
        let frequencies = self.get_word_frequencies(text);

        if frequencies.is_empty() {
            return vec![];
        }

        let max_freq = *frequencies
            .values()
            .max()
            .expect("non-empty map has a max") as f32;

        let mut normalized_freqs: Vec<(&str, f32)> = frequencies
            .into_iter()
            .map(|(key, val)| (key, val as f32 / max_freq))
            .collect();

        normalized_freqs.sort_by(|a, b| {
            if a.1 != b.1 {
                (b.1).partial_cmp(&a.1).expect("weights are never NaN")
            } else {
                (a.0).cmp(b.0)
            }
        });

        if self.max_words > 0 {
            normalized_freqs.truncate(self.max_words);
        }

        normalized_freqs
    }
}

#[cfg(test)]
mod tests {
    use super::Tokenizer;

    #[test]
    fn counts_and_ranks_words() {
        let tokenizer = Tokenizer::default();
        let freqs =
            tokenizer.get_normalized_word_frequencies("the cat sat on the mat the cat ran");

        assert_eq!(freqs.first().map(|(word, _)| *word), Some("cat"));
        assert_eq!(freqs.first().map(|(_, weight)| *weight), Some(1.0));

        let words: Vec<&str> = freqs.iter().map(|(word, _)| *word).collect();
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"on"));
        assert!(words.contains(&"sat"));
        assert!(words.contains(&"mat"));
        assert!(words.contains(&"ran"));
    }

    #[test]
    fn weights_are_non_increasing_and_in_range() {
        let tokenizer = Tokenizer::default();
        let freqs = tokenizer
            .get_normalized_word_frequencies("apple apple apple pear pear plum cherry cherry");

        for pair in freqs.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        for (_, weight) in &freqs {
            assert!(*weight > 0.0 && *weight <= 1.0);
        }
    }

    #[test]
    fn max_words_truncates() {
        let tokenizer = Tokenizer::default().with_max_words(2);
        let freqs =
            tokenizer.get_normalized_word_frequencies("alpha beta gamma delta epsilon zeta");

        assert_eq!(freqs.len(), 2);
    }

    #[test]
    fn stopwords_match_stripped_contractions() {
        // "don't" arrives as "dont" once normalization has removed the
        // apostrophe; the default list still has to catch it.
        let tokenizer = Tokenizer::default();
        let freqs = tokenizer.get_normalized_word_frequencies("dont panic");

        let words: Vec<&str> = freqs.iter().map(|(word, _)| *word).collect();
        assert_eq!(words, vec!["panic"]);
    }

    #[test]
    fn numbers_are_excluded_by_default() {
        let tokenizer = Tokenizer::default();
        let freqs = tokenizer.get_normalized_word_frequencies("route 66 route 66");

        let words: Vec<&str> = freqs.iter().map(|(word, _)| *word).collect();
        assert_eq!(words, vec!["route"]);

        let keep_numbers = Tokenizer::default().with_exclude_numbers(false);
        let freqs = keep_numbers.get_normalized_word_frequencies("route 66 route 66");
        assert_eq!(freqs.len(), 2);
    }

    #[test]
    fn min_word_length_filters_short_tokens() {
        let tokenizer = Tokenizer::default()
            .with_stopwords([])
            .with_min_word_length(3);
        let freqs = tokenizer.get_normalized_word_frequencies("ox owl fox ox");

        let words: Vec<&str> = freqs.iter().map(|(word, _)| *word).collect();
        assert_eq!(words, vec!["fox", "owl"]);
    }

    #[test]
    fn casing_variants_fold_into_most_common() {
        let tokenizer = Tokenizer::default().with_stopwords([]);
        let freqs = tokenizer.get_normalized_word_frequencies("Rust rust Rust crab");

        assert_eq!(freqs.first().map(|(word, _)| *word), Some("Rust"));
        assert_eq!(freqs.first().map(|(_, weight)| *weight), Some(1.0));
    }

    #[test]
    fn ties_break_lexicographically() {
        let tokenizer = Tokenizer::default().with_stopwords([]);
        let freqs = tokenizer.get_normalized_word_frequencies("pear plum apple");

        let words: Vec<&str> = freqs.iter().map(|(word, _)| *word).collect();
        assert_eq!(words, vec!["apple", "pear", "plum"]);
    }
}
