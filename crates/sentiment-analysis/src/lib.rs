//! Scoring and aggregation over analysis batches.

pub mod aggregator;
pub mod metrics;
pub mod scorer;

pub use aggregator::{aggregate, aggregate_records, AggregateOptions, Filters, HistogramBucket, LabelCounts, SummaryStats, TrendBucket};
pub use metrics::{compare, scatter_points, MetricDelta, MetricsSummary, ScatterPoint};
pub use scorer::{DefaultScorer, Scorer};
