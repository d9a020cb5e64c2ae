//! Text segmentation and stop-word handling

pub mod stopwords;
pub mod tokenizer;
