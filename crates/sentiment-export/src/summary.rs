use std::io::Write;

use sentiment_analysis::metrics::MetricsSummary;
use sentiment_core::error::Result;

use crate::records::round_to_precision;

/// Two-column `Metric,Value` table.
pub fn write_summary_csv<W: Write>(metrics: &MetricsSummary, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["Metric", "Value"])?;
    for (name, value) in metrics.rows() {
        out.write_record([name.to_string(), round_to_precision(value).to_string()])?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}
