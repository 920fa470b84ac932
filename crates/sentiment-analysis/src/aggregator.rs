//! Pure projections from an [`AnalysisBatch`] to display-ready summaries.
//!
//! Nothing here fails: empty input yields zero-filled counts, a fully
//! enumerated zero histogram and empty tables.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

use sentiment_core::config::AggregateConfig;
use sentiment_core::types::{AnalysisBatch, Granularity, Keyword, Label, SentimentRecord};

use crate::metrics::MetricsSummary;

pub type LabelCounts = BTreeMap<Label, usize>;

/// Counts with every label present at zero.
pub fn zero_counts() -> LabelCounts { Label::ALL.iter().map(|&l| (l, 0)).collect() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendBucket {
    pub start: NaiveDate,
    pub counts: LabelCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub label_counts: LabelCounts,
    pub confidence_histogram: Vec<HistogramBucket>,
    pub keywords: Vec<Keyword>,
    pub trend: Vec<TrendBucket>,
    /// Granularity the trend was built at; coarser than requested when the
    /// requested one would exceed `max_trend_buckets`.
    pub trend_granularity: Granularity,
    pub sources: BTreeMap<String, LabelCounts>,
    pub metrics: MetricsSummary,
}

/// Record selection applied before aggregation. `None` means no restriction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub labels: Option<BTreeSet<Label>>,
    pub sources: Option<BTreeSet<String>>,
    /// Inclusive on both ends. Records without a timestamp never match.
    pub date_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl Filters {
    pub fn none() -> Self { Self::default() }

    pub fn with_labels<I: IntoIterator<Item = Label>>(mut self, labels: I) -> Self {
        self.labels = Some(labels.into_iter().collect());
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_date_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.date_range = Some((start, end));
        self
    }

    pub fn matches(&self, record: &SentimentRecord) -> bool {
        if let Some(labels) = &self.labels {
            if !labels.contains(&record.label) { return false; }
        }
        if let Some(sources) = &self.sources {
            if !sources.contains(&record.source) { return false; }
        }
        if let Some((start, end)) = &self.date_range {
            match record.timestamp {
                Some(ts) if ts >= *start && ts <= *end => {}
                _ => return false,
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    pub histogram_buckets: usize,
    pub granularity: Granularity,
    pub max_trend_buckets: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self { Self::from(&AggregateConfig::default()) }
}

impl From<&AggregateConfig> for AggregateOptions {
    fn from(c: &AggregateConfig) -> Self {
        Self { histogram_buckets: c.histogram_buckets, granularity: c.granularity, max_trend_buckets: c.max_trend_buckets }
    }
}

pub fn aggregate(batch: &AnalysisBatch, filters: &Filters, options: &AggregateOptions) -> SummaryStats {
    aggregate_records(batch.records(), filters, options)
}

pub fn aggregate_records(records: &[SentimentRecord], filters: &Filters, options: &AggregateOptions) -> SummaryStats {
    let selected: Vec<&SentimentRecord> = records.iter().filter(|r| filters.matches(r)).collect();

    let mut label_counts = zero_counts();
    let mut sources: BTreeMap<String, LabelCounts> = BTreeMap::new();
    for r in &selected {
        *label_counts.entry(r.label).or_insert(0) += 1;
        *sources.entry(r.source.clone()).or_insert_with(zero_counts).entry(r.label).or_insert(0) += 1;
    }

    let (trend, trend_granularity) = bounded_trend(&selected, options.granularity, options.max_trend_buckets);
    SummaryStats {
        label_counts,
        confidence_histogram: confidence_histogram(&selected, options.histogram_buckets),
        keywords: aggregate_keywords(&selected),
        trend,
        trend_granularity,
        sources,
        metrics: MetricsSummary::from_records(selected.iter().copied()),
    }
}

/// Fixed-width buckets over `[0, 1]`; a confidence of exactly 1.0 lands in
/// the last bucket.
pub fn confidence_histogram(records: &[&SentimentRecord], buckets: usize) -> Vec<HistogramBucket> {
    let buckets = buckets.max(1);
    let width = 1.0 / buckets as f64;
    let mut counts = vec![0usize; buckets];
    for r in records {
        let c = if r.confidence.is_finite() { r.confidence.clamp(0.0, 1.0) } else { 0.0 };
        let index = ((c * buckets as f64).floor() as usize).min(buckets - 1);
        counts[index] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBucket { start: i as f64 * width, end: (i + 1) as f64 * width, count })
        .collect()
}

/// Sums per-record keyword weights. Ordered by total weight, then by the
/// largest single-record weight, then by first appearance in the batch.
pub fn aggregate_keywords(records: &[&SentimentRecord]) -> Vec<Keyword> {
    struct Tally { word: String, total: f64, peak: f64 }

    let mut tallies: Vec<Tally> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for r in records {
        for k in &r.keywords {
            match index.get(&k.word) {
                Some(&i) => {
                    tallies[i].total += k.weight;
                    tallies[i].peak = tallies[i].peak.max(k.weight);
                }
                None => {
                    index.insert(k.word.clone(), tallies.len());
                    tallies.push(Tally { word: k.word.clone(), total: k.weight, peak: k.weight });
                }
            }
        }
    }
    // stable sort keeps first-seen order for full ties
    tallies.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.peak.partial_cmp(&a.peak).unwrap_or(std::cmp::Ordering::Equal))
    });
    tallies.into_iter().map(|t| Keyword::new(t.word, t.total)).collect()
}

/// Start of the bucket holding `date`: the date itself, the Monday on or
/// before it, or the 1st of its month. `None` when that start is not a
/// representable date.
pub fn bucket_start(date: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => Some(date),
        Granularity::Week => date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday()))),
        Granularity::Month => date.with_day(1),
    }
}

fn next_bucket(start: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => start.succ_opt(),
        Granularity::Week => start.checked_add_days(Days::new(7)),
        Granularity::Month => start.checked_add_months(Months::new(1)),
    }
}

fn coarser(granularity: Granularity) -> Option<Granularity> {
    match granularity {
        Granularity::Day => Some(Granularity::Week),
        Granularity::Week => Some(Granularity::Month),
        Granularity::Month => None,
    }
}

/// Number of buckets from `first` to `last` inclusive, both bucket starts.
fn bucket_span(first: NaiveDate, last: NaiveDate, granularity: Granularity) -> u64 {
    let steps = match granularity {
        Granularity::Day => (last - first).num_days(),
        Granularity::Week => (last - first).num_days() / 7,
        Granularity::Month => i64::from(last.year() - first.year()) * 12 + i64::from(last.month()) - i64::from(first.month()),
    };
    u64::try_from(steps).unwrap_or(0).saturating_add(1)
}

fn observe(records: &[&SentimentRecord], granularity: Granularity) -> BTreeMap<NaiveDate, LabelCounts> {
    let mut observed: BTreeMap<NaiveDate, LabelCounts> = BTreeMap::new();
    for r in records {
        let Some(ts) = r.timestamp else { continue };
        let Some(start) = bucket_start(ts.date_naive(), granularity) else { continue };
        *observed.entry(start).or_insert_with(zero_counts).entry(r.label).or_insert(0) += 1;
    }
    observed
}

fn fill(mut observed: BTreeMap<NaiveDate, LabelCounts>, granularity: Granularity) -> Vec<TrendBucket> {
    let (Some(&first), Some(&last)) = (observed.keys().next(), observed.keys().next_back()) else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = Some(first);
    while let Some(start) = cursor {
        if start > last { break; }
        let counts = observed.remove(&start).unwrap_or_else(zero_counts);
        out.push(TrendBucket { start, counts });
        cursor = next_bucket(start, granularity);
    }
    out
}

/// Label counts per time bucket between the first and last observed bucket,
/// gaps included at zero. Records without a timestamp, or whose bucket start
/// falls outside the calendar, are left out.
pub fn trend(records: &[&SentimentRecord], granularity: Granularity) -> Vec<TrendBucket> {
    fill(observe(records, granularity), granularity)
}

/// [`trend`] capped at `max_buckets`. Coarsens Day to Week to Month until the
/// filled span fits; if even months do not fit, only observed buckets are
/// returned.
pub fn bounded_trend(records: &[&SentimentRecord], granularity: Granularity, max_buckets: usize) -> (Vec<TrendBucket>, Granularity) {
    let max_buckets = max_buckets.max(1) as u64;
    let mut current = granularity;
    loop {
        let observed = observe(records, current);
        let span = match (observed.keys().next(), observed.keys().next_back()) {
            (Some(&first), Some(&last)) => bucket_span(first, last, current),
            _ => 0,
        };
        if span <= max_buckets {
            return (fill(observed, current), current);
        }
        match coarser(current) {
            Some(next) => current = next,
            None => {
                warn!(span, max_buckets, "trend span too wide; gaps left unfilled");
                let buckets = observed.into_iter().map(|(start, counts)| TrendBucket { start, counts }).collect();
                return (buckets, current);
            }
        }
    }
}
