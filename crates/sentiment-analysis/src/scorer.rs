use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

use sentiment_core::config::{ScoringConfig, Settings};
use sentiment_core::traits::{Classifier, Tokenizer};
use sentiment_core::types::{Keyword, Label, SentimentRecord, TextInput, DEFAULT_SOURCE};
use sentiment_text::{resolve_tokenizer, LexiconClassifier};

/// How many keywords the explanation names.
const EXPLAINED_KEYWORDS: usize = 3;

/// Turns one text into a [`SentimentRecord`].
///
/// The classifier and tokenizer are fixed at construction, so `score` is a
/// pure function of its arguments and never fails.
pub struct Scorer<C, T> where C: Classifier, T: Tokenizer {
    classifier: C,
    tokenizer: T,
    options: ScoringConfig,
}

pub type DefaultScorer = Scorer<LexiconClassifier, Box<dyn Tokenizer>>;

impl DefaultScorer {
    /// Lexicon classifier plus whichever tokenizer the text settings resolve to.
    pub fn from_settings(settings: &Settings) -> Self {
        let tokenizer = resolve_tokenizer(&settings.text);
        info!(tokenizer = tokenizer.name(), "scorer ready");
        Scorer::new(LexiconClassifier::new(), tokenizer, settings.scoring.clone())
    }
}

impl<C, T> Scorer<C, T> where C: Classifier, T: Tokenizer {
    pub fn new(classifier: C, tokenizer: T, options: ScoringConfig) -> Self { Self { classifier, tokenizer, options } }

    pub fn options(&self) -> &ScoringConfig { &self.options }

    pub fn tokenizer_name(&self) -> &str { self.tokenizer.name() }

    pub fn label_for(&self, polarity: f64) -> Label {
        if polarity > self.options.positive_threshold {
            Label::Positive
        } else if polarity < self.options.negative_threshold {
            Label::Negative
        } else {
            Label::Neutral
        }
    }

    pub fn score(&self, text: &str, source: Option<&str>, timestamp: Option<DateTime<Utc>>) -> SentimentRecord {
        let source = source.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_SOURCE).to_string();
        if text.trim().is_empty() {
            return SentimentRecord {
                text: text.to_string(),
                source,
                timestamp,
                label: Label::Neutral,
                polarity: 0.0,
                subjectivity: 0.0,
                confidence: 0.0,
                keywords: Vec::new(),
                explanation: "No text to analyze; classified as Neutral. Polarity score: 0.00.".to_string(),
            };
        }

        let window = truncate_chars(text, self.options.max_text_chars);
        let raw = self.classifier.classify(window);
        let polarity = finite_or_zero(raw.polarity).clamp(-1.0, 1.0);
        let subjectivity = finite_or_zero(raw.subjectivity).clamp(0.0, 1.0);
        let label = self.label_for(polarity);
        let confidence = polarity.abs().clamp(0.0, 1.0);
        let keywords = self.extract_keywords(window);
        let explanation = explain(label, &keywords, polarity);
        debug!(%label, polarity, subjectivity, keywords = keywords.len(), "scored text");

        SentimentRecord { text: text.to_string(), source, timestamp, label, polarity, subjectivity, confidence, keywords, explanation }
    }

    pub fn score_input(&self, input: &TextInput) -> SentimentRecord {
        self.score(&input.text, input.source.as_deref(), input.timestamp)
    }

    /// Scores every input, in parallel once the batch passes
    /// `parallel_threshold`. Output order always matches input order.
    pub fn score_all(&self, inputs: &[TextInput]) -> Vec<SentimentRecord> {
        let records: Vec<SentimentRecord> = if inputs.len() > self.options.parallel_threshold {
            inputs.par_iter().map(|input| self.score_input(input)).collect()
        } else {
            inputs.iter().map(|input| self.score_input(input)).collect()
        };
        info!(count = records.len(), "scored batch");
        records
    }

    /// Frequency-ranked alphabetic tokens, ties broken by first occurrence.
    pub fn extract_keywords(&self, text: &str) -> Vec<Keyword> {
        let min_len = self.options.min_token_len;
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let tokens = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|w| w.chars().count() >= min_len && w.chars().all(char::is_alphabetic));
        for (position, token) in tokens.enumerate() {
            counts.entry(token).or_insert((0, position)).0 += 1;
        }
        let mut ranked: Vec<(String, usize, usize)> = counts.into_iter().map(|(w, (count, first))| (w, count, first)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(self.options.top_n);
        ranked.into_iter().map(|(word, count, _)| Keyword::new(word, count as f64)).collect()
    }
}

fn finite_or_zero(x: f64) -> f64 { if x.is_finite() { x } else { 0.0 } }

/// Longest prefix of at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn explain(label: Label, keywords: &[Keyword], polarity: f64) -> String {
    let reason = match label {
        Label::Positive => "The text uses words and phrases indicating approval or satisfaction.",
        Label::Negative => "The text uses words and phrases indicating disapproval or dissatisfaction.",
        Label::Neutral => "The text lacks strong emotional language or balances positive and negative terms.",
    };
    if keywords.is_empty() {
        return format!("Classified as {} with no salient keywords. {} Polarity score: {:.2}.", label, reason, polarity);
    }
    let named: Vec<&str> = keywords.iter().take(EXPLAINED_KEYWORDS).map(|k| k.word.as_str()).collect();
    format!("Classified as {} primarily due to: {}. {} Polarity score: {:.2}.", label, named.join(", "), reason, polarity)
}
