//! Domain types shared by the scorer, the aggregator and the export layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Source assigned to records whose caller supplied no provenance.
pub const DEFAULT_SOURCE: &str = "unknown";

/// Three-way sentiment classification derived from polarity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    /// All labels in display order. Aggregates enumerate this list so that
    /// every label is present even at zero.
    pub const ALL: [Label; 3] = [Label::Positive, Label::Negative, Label::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Positive => "Positive",
            Label::Negative => "Negative",
            Label::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Label::Positive),
            "negative" => Ok(Label::Negative),
            "neutral" => Ok(Label::Neutral),
            other => Err(Error::InvalidLabel(other.to_string())),
        }
    }
}

/// Raw classifier output for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Polarity {
    /// Negative-to-positive strength in `[-1.0, 1.0]`.
    pub polarity: f64,
    /// Opinion-laden vs factual in `[0.0, 1.0]`.
    pub subjectivity: f64,
}

/// A salient token and its in-text weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub weight: f64,
}

impl Keyword {
    pub fn new(word: impl Into<String>, weight: f64) -> Self {
        Self { word: word.into(), weight }
    }
}

/// One unit of caller input before scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextInput {
    pub text: String,
    pub source: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TextInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// The scored form of a single text.
///
/// - `label` is a pure function of `polarity` under the scorer's thresholds
/// - `confidence` grows with `|polarity|` and stays within `[0, 1]`
/// - `keywords` are ordered most salient first
///
/// Fields are flat so the record can be written as one CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub text: String,
    pub source: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub label: Label,
    pub polarity: f64,
    pub subjectivity: f64,
    pub confidence: f64,
    pub keywords: Vec<Keyword>,
    pub explanation: String,
}

/// Ordered, append-only collection of records from one session.
///
/// The batch is owned by the caller and passed by reference to the
/// aggregator; insertion order is analysis order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisBatch {
    records: Vec<SentimentRecord>,
}

impl AnalysisBatch {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, record: SentimentRecord) { self.records.push(record); }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, SentimentRecord> { self.records.iter() }

    pub fn records(&self) -> &[SentimentRecord] { &self.records }
}

impl From<Vec<SentimentRecord>> for AnalysisBatch {
    fn from(records: Vec<SentimentRecord>) -> Self { Self { records } }
}

impl Extend<SentimentRecord> for AnalysisBatch {
    fn extend<I: IntoIterator<Item = SentimentRecord>>(&mut self, iter: I) { self.records.extend(iter); }
}

impl FromIterator<SentimentRecord> for AnalysisBatch {
    fn from_iter<I: IntoIterator<Item = SentimentRecord>>(iter: I) -> Self {
        Self { records: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a AnalysisBatch {
    type Item = &'a SentimentRecord;
    type IntoIter = std::slice::Iter<'a, SentimentRecord>;

    fn into_iter(self) -> Self::IntoIter { self.records.iter() }
}

/// Width of a trend bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Granularity::Day),
            "week" | "weekly" => Ok(Granularity::Week),
            "month" | "monthly" => Ok(Granularity::Month),
            other => Err(Error::InvalidConfig(format!("unknown granularity '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_parses_case_insensitively() {
        assert_eq!("positive".parse::<Label>().expect("label"), Label::Positive);
        assert_eq!(" NEGATIVE ".parse::<Label>().expect("label"), Label::Negative);
        assert_eq!("Neutral".parse::<Label>().expect("label"), Label::Neutral);
        assert!("mixed".parse::<Label>().is_err());
    }

    #[test]
    fn label_serializes_as_capitalized_name() {
        let json = serde_json::to_string(&Label::Positive).expect("json");
        assert_eq!(json, "\"Positive\"");
    }

    #[test]
    fn batch_preserves_insertion_order() {
        let mk = |text: &str| SentimentRecord {
            text: text.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            timestamp: None,
            label: Label::Neutral,
            polarity: 0.0,
            subjectivity: 0.0,
            confidence: 0.0,
            keywords: vec![],
            explanation: String::new(),
        };
        let mut batch = AnalysisBatch::new();
        batch.push(mk("first"));
        batch.extend(vec![mk("second"), mk("third")]);
        let texts: Vec<&str> = batch.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(batch.len(), 3);
    }
}
