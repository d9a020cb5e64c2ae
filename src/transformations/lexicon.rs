//! Static replacement table.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::pipeline::traits::WordSwap;

/// Word swap backed by a fixed `word -> replacements` table.
///
/// Lookup tries the word as written first, then its lowercase form.
/// Unknown words have no replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordSwapLexicon {
    table: FxHashMap<String, Vec<String>>,
}

impl WordSwapLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a lexicon from a JSON object of string arrays.
    ///
    /// ```
    /// use rapid_textattack::transformations::WordSwapLexicon;
    ///
    /// let lexicon = WordSwapLexicon::from_json(r#"{"good": ["fine", "nice"]}"#).unwrap();
    /// assert_eq!(lexicon.len(), 1);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert<I, S>(&mut self, word: impl Into<String>, replacements: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table
            .entry(word.into())
            .or_default()
            .extend(replacements.into_iter().map(Into::into));
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_entry<I, S>(mut self, word: impl Into<String>, replacements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(word, replacements);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl WordSwap for WordSwapLexicon {
    fn get_replacements(&self, word: &str) -> Result<Vec<String>> {
        let found = self
            .table
            .get(word)
            .or_else(|| self.table.get(&word.to_lowercase()));
        Ok(found.cloned().unwrap_or_default())
    }
}
