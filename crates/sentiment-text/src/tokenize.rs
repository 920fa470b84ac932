use std::collections::HashSet;
use std::path::Path;

use tantivy::tokenizer::{TextAnalyzer, TokenStream};
use tracing::{info, warn};

use sentiment_core::config::{expand_path, TextConfig, TokenizerKind};
use sentiment_core::error::{Error, Result};
use sentiment_core::traits::Tokenizer;

use crate::tantivy_utils::{build_analyzer, english_stopwords, FALLBACK_STOPWORDS};

/// Tantivy analyzer chain: simple tokenizer, long-token removal, lowercasing
/// and stopword removal.
#[derive(Clone)]
pub struct AnalyzerTokenizer {
	analyzer: TextAnalyzer,
}

impl AnalyzerTokenizer {
	pub fn new<I: IntoIterator<Item = String>>(stop_words: I) -> Self {
		Self { analyzer: build_analyzer(stop_words) }
	}

	pub fn english() -> Self { Self::new(english_stopwords()) }
}

impl Tokenizer for AnalyzerTokenizer {
	fn name(&self) -> &str { "analyzer" }

	fn tokenize(&self, text: &str) -> Vec<String> {
		// token_stream needs &mut; the analyzer clone is a boxed pipeline copy
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(text);
		let mut tokens = Vec::new();
		while stream.advance() {
			tokens.push(stream.token().text.clone());
		}
		tokens
	}
}

/// Lowercase whitespace split with edge punctuation trimmed and a minimal
/// stopword list.
pub struct WhitespaceTokenizer {
	stop_words: HashSet<String>,
}

impl Default for WhitespaceTokenizer {
	fn default() -> Self { Self::new() }
}

impl WhitespaceTokenizer {
	pub fn new() -> Self {
		Self { stop_words: FALLBACK_STOPWORDS.iter().map(|s| s.to_string()).collect() }
	}
}

impl Tokenizer for WhitespaceTokenizer {
	fn name(&self) -> &str { "whitespace" }

	fn tokenize(&self, text: &str) -> Vec<String> {
		text.split_whitespace()
			.map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
			.filter(|w| !w.is_empty() && !self.stop_words.contains(w))
			.collect()
	}
}

/// Reads a newline-separated stopword file; `#` starts a comment line.
pub fn load_stopwords(path: &Path) -> Result<Vec<String>> {
	let content = std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
	Ok(content
		.lines()
		.map(str::trim)
		.filter(|l| !l.is_empty() && !l.starts_with('#'))
		.map(str::to_lowercase)
		.collect())
}

/// Picks the tokenizer once at startup. A configured stopword file that
/// cannot be read binds the whitespace fallback instead of failing.
pub fn resolve_tokenizer(config: &TextConfig) -> Box<dyn Tokenizer> {
	match config.tokenizer {
		TokenizerKind::Whitespace => {
			info!("using whitespace tokenizer");
			Box::new(WhitespaceTokenizer::new())
		}
		TokenizerKind::Analyzer => {
			let mut words = english_stopwords();
			if let Some(raw) = &config.stopwords_path {
				let path = expand_path(raw);
				match load_stopwords(&path) {
					Ok(extra) => {
						info!(path = %path.display(), extra = extra.len(), "loaded extra stopwords");
						words.extend(extra);
					}
					Err(e) => {
						warn!(error = %e, "stopword resource unavailable; falling back to whitespace tokenizer");
						return Box::new(WhitespaceTokenizer::new());
					}
				}
			}
			Box::new(AnalyzerTokenizer::new(words))
		}
	}
}
