//! Normalisation applied to text before it is embedded.
//!
//! The same `Preprocessor` is used on ingestion and on queries so stored
//! vectors and query vectors live in one embedding space. Stored chunk text
//! and chunk ids are never affected.

use std::borrow::Cow;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "will", "with", "you", "your", "yours", "yourself", "yourselves",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preprocessor {
    remove_stopwords: bool,
    lowercase: bool,
}

impl Preprocessor {
    pub fn new(remove_stopwords: bool, lowercase: bool) -> Self {
        Self {
            remove_stopwords,
            lowercase,
        }
    }

    pub fn is_identity(&self) -> bool {
        !self.remove_stopwords && !self.lowercase
    }

    /// Returns the text to embed for `text`.
    ///
    /// Falls back to the original text when filtering would leave nothing.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.is_identity() {
            return Cow::Borrowed(text);
        }

        let kept: Vec<String> = text
            .split_whitespace()
            .filter(|word| !self.remove_stopwords || !is_stopword(word))
            .map(|word| {
                if self.lowercase {
                    word.to_lowercase()
                } else {
                    word.to_string()
                }
            })
            .collect();

        if kept.is_empty() {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(kept.join(" "))
        }
    }
}

fn is_stopword(word: &str) -> bool {
    let normalised = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    STOPWORDS.binary_search(&normalised.as_str()).is_ok()
}
