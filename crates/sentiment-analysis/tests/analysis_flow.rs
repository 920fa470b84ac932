use chrono::{TimeZone, Utc};
use sentiment_analysis::{aggregate, AggregateOptions, DefaultScorer, Filters};
use sentiment_core::config::Settings;
use sentiment_core::types::{AnalysisBatch, Granularity, Keyword, Label, SentimentRecord, TextInput};

fn scorer() -> DefaultScorer { DefaultScorer::from_settings(&Settings::default()) }

fn with_keywords(source: &str, keywords: &[(&str, f64)]) -> SentimentRecord {
    SentimentRecord {
        text: "x".into(),
        source: source.into(),
        timestamp: None,
        label: Label::Neutral,
        polarity: 0.0,
        subjectivity: 0.0,
        confidence: 0.0,
        keywords: keywords.iter().map(|&(w, n)| Keyword::new(w, n)).collect(),
        explanation: String::new(),
    }
}

#[test]
fn sample_sentences_end_to_end() {
    let s = scorer();
    let mut batch = AnalysisBatch::new();
    for text in ["I love this product, it's amazing!", "This is terrible and disappointing.", "The package arrived on Tuesday."] {
        batch.push(s.score(text, None, None));
    }
    let labels: Vec<Label> = batch.iter().map(|r| r.label).collect();
    assert_eq!(labels, [Label::Positive, Label::Negative, Label::Neutral]);
    assert!(batch.records()[0].explanation.contains("love"));

    let stats = aggregate(&batch, &Filters::none(), &AggregateOptions::default());
    assert_eq!(stats.label_counts.len(), 3);
    assert_eq!(stats.label_counts.values().sum::<usize>(), 3);
    assert_eq!(stats.metrics.total, 3);
    assert_eq!(stats.sources.len(), 1);
    assert!(stats.trend.is_empty());
    assert_eq!(stats.confidence_histogram.iter().map(|b| b.count).sum::<usize>(), 3);
}

#[test]
fn blank_text_is_neutral_with_no_keywords() {
    let s = scorer();
    for text in ["", "   ", "123 !!! 456"] {
        let r = s.score(text, None, None);
        assert_eq!(r.label, Label::Neutral);
        assert_eq!(r.confidence, 0.0);
        assert!(r.keywords.is_empty());
    }
}

#[test]
fn scoring_is_deterministic() {
    let s = scorer();
    let text = "Support was very helpful but delivery was slow.";
    assert_eq!(s.score(text, Some("review"), None), s.score(text, Some("review"), None));
}

#[test]
fn empty_batch_aggregates_to_zeros() {
    let stats = aggregate(&AnalysisBatch::new(), &Filters::none(), &AggregateOptions::default());
    assert!(stats.label_counts.values().all(|&c| c == 0));
    assert_eq!(stats.label_counts.len(), 3);
    assert_eq!(stats.confidence_histogram.len(), 10);
    assert!(stats.confidence_histogram.iter().all(|b| b.count == 0));
    assert!(stats.keywords.is_empty());
    assert!(stats.trend.is_empty());
    assert!(stats.sources.is_empty());
    assert_eq!(stats.metrics.total, 0);
}

#[test]
fn keyword_totals_break_ties_by_peak_weight() {
    let batch: AnalysisBatch = vec![with_keywords("a", &[("good", 2.0)]), with_keywords("a", &[("good", 1.0), ("bad", 3.0)])].into();
    let stats = aggregate(&batch, &Filters::none(), &AggregateOptions::default());
    assert_eq!(stats.keywords, vec![Keyword::new("bad", 3.0), Keyword::new("good", 3.0)]);
}

#[test]
fn full_ties_keep_first_seen_order() {
    let batch: AnalysisBatch = vec![with_keywords("a", &[("zeta", 1.0)]), with_keywords("a", &[("alpha", 1.0)])].into();
    let stats = aggregate(&batch, &Filters::none(), &AggregateOptions::default());
    let words: Vec<&str> = stats.keywords.iter().map(|k| k.word.as_str()).collect();
    assert_eq!(words, ["zeta", "alpha"]);
}

#[test]
fn source_filter_excludes_records_everywhere() {
    let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 9, 0, 0).unwrap();
    let mut records = Vec::new();
    for d in 1..=3 {
        let mut r = with_keywords("review", &[("shipping", 1.0)]);
        r.timestamp = Some(day(d));
        records.push(r);
    }
    for d in 10..=11 {
        let mut r = with_keywords("twitter", &[("hashtag", 1.0)]);
        r.timestamp = Some(day(d));
        records.push(r);
    }
    let batch = AnalysisBatch::from(records);
    let stats = aggregate(&batch, &Filters::none().with_sources(["review"]), &AggregateOptions::default());

    assert_eq!(stats.label_counts.values().sum::<usize>(), 3);
    assert!(stats.keywords.iter().all(|k| k.word != "hashtag"));
    assert_eq!(stats.trend.len(), 3);
    assert!(!stats.sources.contains_key("twitter"));
}

#[test]
fn label_and_week_options_apply() {
    let mut pos = with_keywords("a", &[]);
    pos.label = Label::Positive;
    pos.timestamp = Some(Utc.with_ymd_and_hms(2024, 5, 15, 0, 0, 0).unwrap());
    let mut neg = with_keywords("a", &[]);
    neg.label = Label::Negative;
    neg.timestamp = Some(Utc.with_ymd_and_hms(2024, 5, 16, 0, 0, 0).unwrap());
    let batch = AnalysisBatch::from(vec![pos, neg]);

    let options = AggregateOptions { histogram_buckets: 4, granularity: Granularity::Week, ..AggregateOptions::default() };
    let stats = aggregate(&batch, &Filters::none().with_labels([Label::Positive]), &options);
    assert_eq!(stats.label_counts[&Label::Positive], 1);
    assert_eq!(stats.label_counts[&Label::Negative], 0);
    assert_eq!(stats.confidence_histogram.len(), 4);
    assert_eq!(stats.trend.len(), 1);
    assert_eq!(stats.trend[0].start.to_string(), "2024-05-13");
}

#[test]
fn large_batches_keep_input_order() {
    let s = scorer();
    let inputs: Vec<TextInput> = (0..500)
        .map(|i| TextInput::new(if i % 2 == 0 { format!("great item {}", i) } else { format!("awful item {}", i) }))
        .collect();
    let records = s.score_all(&inputs);
    assert_eq!(records.len(), inputs.len());
    for (input, record) in inputs.iter().zip(&records) {
        assert_eq!(input.text, record.text);
    }
    assert_eq!(records[0].label, Label::Positive);
    assert_eq!(records[1].label, Label::Negative);
}

#[test]
fn stats_serialize_to_json() {
    let batch: AnalysisBatch = vec![with_keywords("a", &[("good", 1.0)])].into();
    let stats = aggregate(&batch, &Filters::none(), &AggregateOptions::default());
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["label_counts"]["Neutral"], 1);
    assert_eq!(json["keywords"][0]["word"], "good");
}
