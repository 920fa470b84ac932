//! sentiment-text
//!
//! Text resources behind the scorer's capability traits: a tantivy analyzer
//! tokenizer with English stopwords, a whitespace fallback, and a lexicon
//! polarity/subjectivity classifier.

pub mod lexicon;
pub mod tantivy_utils;
pub mod tokenize;

pub use lexicon::LexiconClassifier;
pub use tokenize::{resolve_tokenizer, AnalyzerTokenizer, WhitespaceTokenizer};
