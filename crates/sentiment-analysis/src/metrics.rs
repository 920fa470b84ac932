use serde::{Deserialize, Serialize};

use sentiment_core::types::{Label, SentimentRecord};

/// Headline numbers for a set of records. All zeros on empty input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub neutral_pct: f64,
    pub avg_confidence: f64,
    pub avg_polarity: f64,
    pub avg_subjectivity: f64,
}

impl MetricsSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a SentimentRecord>,
    {
        let mut m = MetricsSummary::default();
        let (mut confidence, mut polarity, mut subjectivity) = (0.0, 0.0, 0.0);
        for r in records {
            m.total += 1;
            match r.label {
                Label::Positive => m.positive_count += 1,
                Label::Negative => m.negative_count += 1,
                Label::Neutral => m.neutral_count += 1,
            }
            confidence += r.confidence;
            polarity += r.polarity;
            subjectivity += r.subjectivity;
        }
        if m.total == 0 {
            return m;
        }
        let n = m.total as f64;
        m.positive_pct = m.positive_count as f64 / n * 100.0;
        m.negative_pct = m.negative_count as f64 / n * 100.0;
        m.neutral_pct = m.neutral_count as f64 / n * 100.0;
        m.avg_confidence = confidence / n;
        m.avg_polarity = polarity / n;
        m.avg_subjectivity = subjectivity / n;
        m
    }

    /// `(name, value)` pairs in display order, as used by the summary table.
    pub fn rows(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("Total Texts", self.total as f64),
            ("Positive Count", self.positive_count as f64),
            ("Negative Count", self.negative_count as f64),
            ("Neutral Count", self.neutral_count as f64),
            ("Positive %", self.positive_pct),
            ("Negative %", self.negative_pct),
            ("Neutral %", self.neutral_pct),
            ("Average Confidence", self.avg_confidence),
            ("Average Polarity", self.avg_polarity),
            ("Average Subjectivity", self.avg_subjectivity),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub metric: String,
    pub a: f64,
    pub b: f64,
    /// `b - a`
    pub delta: f64,
}

/// Metric-by-metric difference between two summaries.
pub fn compare(a: &MetricsSummary, b: &MetricsSummary) -> Vec<MetricDelta> {
    a.rows()
        .into_iter()
        .zip(b.rows())
        .map(|((metric, va), (_, vb))| MetricDelta { metric: metric.to_string(), a: va, b: vb, delta: vb - va })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub polarity: f64,
    pub subjectivity: f64,
    pub label: Label,
}

/// One point per record, in batch order.
pub fn scatter_points(records: &[SentimentRecord]) -> Vec<ScatterPoint> {
    records
        .iter()
        .map(|r| ScatterPoint { polarity: r.polarity, subjectivity: r.subjectivity, label: r.label })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentiment_core::types::DEFAULT_SOURCE;

    fn record(label: Label, polarity: f64) -> SentimentRecord {
        SentimentRecord {
            text: "t".into(),
            source: DEFAULT_SOURCE.into(),
            timestamp: None,
            label,
            polarity,
            subjectivity: 0.5,
            confidence: polarity.abs(),
            keywords: vec![],
            explanation: String::new(),
        }
    }

    #[test]
    fn empty_summary_is_all_zero() {
        assert_eq!(MetricsSummary::from_records(std::iter::empty()), MetricsSummary::default());
    }

    #[test]
    fn percentages_and_averages() {
        let rs = [record(Label::Positive, 0.6), record(Label::Negative, -0.4), record(Label::Neutral, 0.0), record(Label::Positive, 0.2)];
        let m = MetricsSummary::from_records(&rs);
        assert_eq!(m.total, 4);
        assert_eq!(m.positive_count, 2);
        assert!((m.positive_pct - 50.0).abs() < 1e-9);
        assert!((m.avg_polarity - 0.1).abs() < 1e-9);
        assert!((m.avg_confidence - 0.3).abs() < 1e-9);
        assert!((m.positive_pct + m.negative_pct + m.neutral_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn compare_reports_b_minus_a() {
        let a = MetricsSummary::from_records(&[record(Label::Negative, -0.5)]);
        let b = MetricsSummary::from_records(&[record(Label::Positive, 0.5), record(Label::Positive, 0.7)]);
        let deltas = compare(&a, &b);
        assert_eq!(deltas.len(), a.rows().len());
        let total = deltas.iter().find(|d| d.metric == "Total Texts").unwrap();
        assert_eq!(total.delta, 1.0);
        let pol = deltas.iter().find(|d| d.metric == "Average Polarity").unwrap();
        assert!((pol.delta - 1.1).abs() < 1e-9);
    }

    #[test]
    fn scatter_keeps_batch_order() {
        let rs = [record(Label::Negative, -0.5), record(Label::Positive, 0.3)];
        let pts = scatter_points(&rs);
        assert_eq!(pts[0].label, Label::Negative);
        assert_eq!(pts[1].polarity, 0.3);
    }
}
