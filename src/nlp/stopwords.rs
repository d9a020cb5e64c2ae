//! Stop-word filtering
//!
//! Transformations never propose substitutions for stop-words unless the
//! attack configuration says otherwise. Matching is case-insensitive.

use rustc_hash::FxHashSet;

/// Built-in English stop-words.
const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "ain", "all",
    "almost", "alone", "along", "already", "also", "although", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "aren",
    "aren't", "around", "as", "at", "back", "been", "before", "beforehand", "behind", "being",
    "below", "beside", "besides", "between", "beyond", "both", "but", "by", "can", "cannot",
    "could", "couldn", "couldn't", "d", "didn", "didn't", "doesn", "doesn't", "don", "don't",
    "down", "due", "during", "either", "else", "elsewhere", "empty", "enough", "even", "ever",
    "everyone", "everything", "everywhere", "except", "first", "for", "former", "formerly",
    "from", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "if", "in", "indeed", "into", "is", "isn", "isn't", "it",
    "it's", "its", "itself", "just", "latter", "latterly", "least", "ll", "may", "me",
    "meanwhile", "mightn", "mightn't", "mine", "more", "moreover", "most", "mostly", "must",
    "mustn", "mustn't", "my", "myself", "namely", "needn", "needn't", "neither", "never",
    "nevertheless", "next", "no", "nobody", "none", "noone", "nor", "not", "nothing", "now",
    "nowhere", "o", "of", "off", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "per", "please", "s", "same",
    "shan", "shan't", "she", "she's", "should've", "shouldn", "shouldn't", "somehow",
    "something", "sometime", "somewhere", "such", "t", "than", "that", "that'll", "the",
    "their", "theirs", "them", "themselves", "then", "thence", "there", "thereafter",
    "thereby", "therefore", "therein", "thereupon", "these", "they", "this", "those",
    "through", "throughout", "thru", "thus", "to", "too", "toward", "towards", "under",
    "unless", "until", "up", "upon", "used", "ve", "was", "wasn", "wasn't", "we", "were",
    "weren", "weren't", "what", "whatever", "when", "whence", "whenever", "where",
    "whereafter", "whereas", "whereby", "wherein", "whereupon", "wherever", "whether",
    "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why", "with",
    "within", "without", "won", "won't", "would", "wouldn", "wouldn't", "y", "yet", "you",
    "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

/// Case-insensitive stop-word set.
#[derive(Debug, Clone, Default)]
pub struct StopwordFilter {
    words: FxHashSet<String>,
}

impl StopwordFilter {
    /// Create a filter with the built-in list for `language`.
    ///
    /// Unknown languages yield an empty filter.
    pub fn new(language: &str) -> Self {
        let mut filter = Self::empty();
        filter.extend(Self::built_in_list(language));
        filter
    }

    /// A filter that matches nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a filter from an explicit word list.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::empty();
        filter.extend(words);
        filter
    }

    /// Add more words to the filter.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.words
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
    }

    /// Check if `word` is a stop-word (case-insensitive).
    pub fn is_stopword(&self, word: &str) -> bool {
        if self.words.is_empty() {
            return false;
        }
        self.words.contains(&word.to_lowercase())
    }

    /// Number of words in the filter.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the filter is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Get the built-in stop-word list for a language.
    pub fn built_in_list(language: &str) -> Vec<String> {
        match language.to_lowercase().as_str() {
            "en" | "english" => ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            _ => Vec::new(),
        }
    }
}
