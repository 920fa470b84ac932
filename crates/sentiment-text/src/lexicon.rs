//! Rule-based English opinion lexicon.
//!
//! Each opinion word carries a polarity in `[-1, 1]` and a subjectivity in
//! `[0, 1]`. A negator within [`MODIFIER_WINDOW`] tokens before an opinion
//! word flips and halves its polarity; an intensifier in the same window
//! scales it. The text's polarity is the mean of matched polarities and its
//! subjectivity the mean of matched subjectivities.

use std::collections::HashMap;

use sentiment_core::traits::Classifier;
use sentiment_core::types::Polarity;

/// How many tokens a negator or intensifier reaches forward.
pub const MODIFIER_WINDOW: usize = 3;

const NEGATION_FACTOR: f64 = -0.5;

const OPINION_WORDS: &[(&str, f64, f64)] = &[
	// positive
	("good", 0.7, 0.6), ("great", 0.8, 0.75), ("excellent", 1.0, 1.0), ("amazing", 0.6, 0.9),
	("awesome", 1.0, 1.0), ("fantastic", 0.4, 0.9), ("wonderful", 1.0, 1.0), ("love", 0.5, 0.6),
	("loved", 0.7, 0.8), ("loves", 0.5, 0.6), ("like", 0.3, 0.4), ("liked", 0.3, 0.4),
	("best", 1.0, 0.3), ("better", 0.5, 0.5), ("nice", 0.6, 1.0), ("happy", 0.8, 1.0),
	("glad", 0.5, 1.0), ("pleased", 0.5, 0.8), ("satisfied", 0.5, 0.8), ("recommend", 0.4, 0.5),
	("recommended", 0.4, 0.5), ("perfect", 1.0, 1.0), ("beautiful", 0.85, 1.0), ("brilliant", 0.9, 1.0),
	("superb", 1.0, 1.0), ("outstanding", 0.5, 0.6), ("impressive", 1.0, 1.0), ("enjoy", 0.4, 0.5),
	("enjoyed", 0.4, 0.5), ("fun", 0.3, 0.2), ("helpful", 0.5, 0.6), ("reliable", 0.5, 0.6),
	("fast", 0.2, 0.6), ("easy", 0.43, 0.83), ("delighted", 0.7, 1.0), ("favorite", 0.5, 1.0),
	("positive", 0.23, 0.55), ("pleasant", 0.73, 0.97), ("friendly", 0.38, 0.5), ("smooth", 0.4, 0.6),
	("worth", 0.3, 0.1), ("thanks", 0.2, 0.2), ("thank", 0.2, 0.2), ("incredible", 0.9, 0.9),
	("exceptional", 0.67, 1.0), ("quality", 0.2, 0.3), ("clean", 0.37, 0.69), ("comfortable", 0.4, 0.7),
	("affordable", 0.3, 0.5), ("success", 0.3, 0.0), ("successful", 0.75, 0.95), ("win", 0.8, 0.4),
	("strong", 0.43, 0.73), ("gain", 0.3, 0.3), ("profit", 0.3, 0.3), ("growth", 0.3, 0.3),
	("optimistic", 0.6, 0.8), ("improved", 0.4, 0.5), ("improvement", 0.3, 0.4),
	// negative
	("bad", -0.7, 0.67), ("terrible", -1.0, 1.0), ("awful", -1.0, 1.0), ("horrible", -1.0, 1.0),
	("poor", -0.4, 0.6), ("worst", -1.0, 1.0), ("worse", -0.4, 0.6), ("hate", -0.8, 0.9),
	("hated", -0.9, 0.7), ("disappointing", -0.6, 0.7), ("disappointed", -0.75, 0.75), ("disappointment", -0.6, 0.7),
	("sad", -0.5, 1.0), ("angry", -0.5, 1.0), ("annoying", -0.8, 0.9), ("annoyed", -0.6, 0.8),
	("broken", -0.4, 0.4), ("useless", -0.5, 0.2), ("waste", -0.2, 0.3), ("slow", -0.3, 0.39),
	("expensive", -0.5, 0.7), ("difficult", -0.5, 1.0), ("hard", -0.29, 0.54), ("ugly", -0.7, 1.0),
	("boring", -1.0, 1.0), ("fail", -0.5, 0.3), ("failed", -0.5, 0.3), ("failure", -0.3, 0.3),
	("problem", -0.3, 0.3), ("problems", -0.3, 0.3), ("issue", -0.1, 0.2), ("issues", -0.1, 0.2),
	("wrong", -0.5, 0.9), ("dirty", -0.6, 0.8), ("rude", -0.3, 0.6), ("unhappy", -0.6, 0.9),
	("frustrating", -0.4, 0.7), ("frustrated", -0.7, 0.7), ("mediocre", -0.3, 0.6), ("unreliable", -0.5, 0.6),
	("cheap", -0.1, 0.7), ("stupid", -0.8, 1.0), ("scam", -0.9, 0.8), ("fraud", -0.9, 0.8),
	("crash", -0.6, 0.5), ("loss", -0.4, 0.3), ("decline", -0.3, 0.3), ("weak", -0.38, 0.63),
	("negative", -0.3, 0.4), ("pessimistic", -0.6, 0.8), ("regret", -0.6, 0.7), ("unfortunately", -0.5, 1.0),
	("refund", -0.1, 0.2), ("defective", -0.6, 0.6), ("late", -0.3, 0.6), ("delayed", -0.3, 0.4),
];

const NEGATORS: &[&str] = &["not", "no", "never", "neither", "nor", "nothing", "none", "nobody", "hardly", "barely", "cannot", "without"];

const INTENSIFIERS: &[(&str, f64)] = &[
	("very", 1.3), ("really", 1.2), ("extremely", 1.5), ("incredibly", 1.5), ("absolutely", 1.4),
	("highly", 1.3), ("totally", 1.3), ("so", 1.2), ("quite", 1.1), ("super", 1.3),
	("slightly", 0.5), ("somewhat", 0.7), ("fairly", 0.8),
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
	polarity: f64,
	subjectivity: f64,
}

pub struct LexiconClassifier {
	words: HashMap<String, Entry>,
	intensifiers: HashMap<String, f64>,
}

impl Default for LexiconClassifier {
	fn default() -> Self { Self::new() }
}

impl LexiconClassifier {
	pub fn new() -> Self {
		let words = OPINION_WORDS
			.iter()
			.map(|&(w, polarity, subjectivity)| (w.to_string(), Entry { polarity, subjectivity }))
			.collect();
		let intensifiers = INTENSIFIERS.iter().map(|&(w, m)| (w.to_string(), m)).collect();
		Self { words, intensifiers }
	}

	/// Adds or replaces an opinion word. Values are clamped into range.
	pub fn with_word(mut self, word: &str, polarity: f64, subjectivity: f64) -> Self {
		self.words.insert(
			word.to_lowercase(),
			Entry { polarity: polarity.clamp(-1.0, 1.0), subjectivity: subjectivity.clamp(0.0, 1.0) },
		);
		self
	}

	pub fn len(&self) -> usize { self.words.len() }

	pub fn is_empty(&self) -> bool { self.words.is_empty() }

	fn is_negator(word: &str) -> bool {
		NEGATORS.contains(&word) || word.ends_with("n't") || word.ends_with("n\u{2019}t")
	}
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
	text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
		.map(|w| w.trim_matches(|c: char| c == '\'' || c == '\u{2019}'))
		.filter(|w| !w.is_empty())
		.map(str::to_lowercase)
}

impl Classifier for LexiconClassifier {
	fn classify(&self, text: &str) -> Polarity {
		let mut polarity_sum = 0.0;
		let mut subjectivity_sum = 0.0;
		let mut matched = 0usize;
		let mut negated_at: Option<usize> = None;
		let mut intensity: Option<(usize, f64)> = None;

		for (i, word) in words(text).enumerate() {
			if Self::is_negator(&word) {
				negated_at = Some(i);
				continue;
			}
			if let Some(&m) = self.intensifiers.get(&word) {
				intensity = Some((i, m));
				continue;
			}
			let Some(entry) = self.words.get(&word) else { continue };

			let mut polarity = entry.polarity;
			let mut subjectivity = entry.subjectivity;
			if let Some((at, m)) = intensity.take() {
				if i - at <= MODIFIER_WINDOW {
					polarity *= m;
					subjectivity *= m;
				}
			}
			if let Some(at) = negated_at.take() {
				if i - at <= MODIFIER_WINDOW {
					polarity *= NEGATION_FACTOR;
				}
			}
			polarity_sum += polarity.clamp(-1.0, 1.0);
			subjectivity_sum += subjectivity.clamp(0.0, 1.0);
			matched += 1;
		}

		if matched == 0 {
			return Polarity::default();
		}
		let n = matched as f64;
		Polarity {
			polarity: (polarity_sum / n).clamp(-1.0, 1.0),
			subjectivity: (subjectivity_sum / n).clamp(0.0, 1.0),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn classify(text: &str) -> Polarity { LexiconClassifier::new().classify(text) }

	#[test]
	fn no_opinion_words_is_zero() {
		assert_eq!(classify("The package arrived on Tuesday."), Polarity::default());
		assert_eq!(classify(""), Polarity::default());
		assert_eq!(classify("!!! 123 ..."), Polarity::default());
	}

	#[test]
	fn signs_follow_opinion_words() {
		assert!(classify("I love this product, it's amazing!").polarity > 0.1);
		assert!(classify("This is terrible and disappointing.").polarity < -0.1);
	}

	#[test]
	fn negation_flips_and_dampens() {
		let plain = classify("good").polarity;
		let negated = classify("not good").polarity;
		assert!(negated < 0.0);
		assert!(negated.abs() < plain.abs());
		assert!(classify("it isn't bad").polarity > 0.0);
	}

	#[test]
	fn negation_does_not_reach_past_window() {
		assert!(classify("not that it matters much here but good").polarity > 0.0);
	}

	#[test]
	fn intensifier_scales_and_stays_bounded() {
		assert!(classify("very good").polarity > classify("good").polarity);
		assert!(classify("slightly good").polarity < classify("good").polarity);
		assert!(classify("extremely excellent").polarity <= 1.0);
		assert!(classify("extremely excellent").subjectivity <= 1.0);
	}

	#[test]
	fn custom_words_are_used() {
		let c = LexiconClassifier::new().with_word("grand", 0.9, 0.5);
		assert!(c.classify("grand").polarity > 0.8);
	}
}
