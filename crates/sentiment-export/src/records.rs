use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use sentiment_core::data_processor::parse_timestamp;
use sentiment_core::error::{Error, Result};
use sentiment_core::types::{Keyword, SentimentRecord};

/// Decimal places kept for every float column.
pub const FLOAT_PRECISION: i32 = 6;

/// Flat CSV shape of a [`SentimentRecord`]. Column order is the file's.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    text: String,
    label: String,
    confidence: f64,
    polarity: f64,
    subjectivity: f64,
    source: String,
    timestamp: String,
    keywords: String,
    explanation: String,
}

pub fn round_to_precision(x: f64) -> f64 {
    let scale = 10f64.powi(FLOAT_PRECISION);
    (x * scale).round() / scale
}

fn join_keywords(keywords: &[Keyword]) -> String {
    keywords.iter().map(|k| format!("{}:{}", k.word, round_to_precision(k.weight))).collect::<Vec<_>>().join(";")
}

fn split_keywords(raw: &str) -> Result<Vec<Keyword>> {
    raw.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            let (word, weight) = part
                .rsplit_once(':')
                .ok_or_else(|| Error::MalformedRecord(format!("keyword without weight: '{}'", part)))?;
            let weight = weight
                .parse::<f64>()
                .map_err(|_| Error::MalformedRecord(format!("bad keyword weight: '{}'", part)))?;
            Ok(Keyword::new(word, weight))
        })
        .collect()
}

impl From<&SentimentRecord> for Row {
    fn from(r: &SentimentRecord) -> Self {
        Row {
            text: r.text.clone(),
            label: r.label.to_string(),
            confidence: round_to_precision(r.confidence),
            polarity: round_to_precision(r.polarity),
            subjectivity: round_to_precision(r.subjectivity),
            source: r.source.clone(),
            timestamp: r.timestamp.map(|ts| ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)).unwrap_or_default(),
            keywords: join_keywords(&r.keywords),
            explanation: r.explanation.clone(),
        }
    }
}

impl TryFrom<Row> for SentimentRecord {
    type Error = Error;

    fn try_from(row: Row) -> Result<Self> {
        let timestamp = match row.timestamp.trim() {
            "" => None,
            raw => Some(parse_timestamp(raw)?),
        };
        Ok(SentimentRecord {
            label: row.label.parse()?,
            keywords: split_keywords(&row.keywords)?,
            text: row.text,
            confidence: row.confidence,
            polarity: row.polarity,
            subjectivity: row.subjectivity,
            source: row.source,
            timestamp,
            explanation: row.explanation,
        })
    }
}

/// Writes one header row and one row per record.
pub fn write_csv<'a, W, I>(records: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a SentimentRecord>,
{
    let mut out = csv::Writer::from_writer(writer);
    for record in records {
        out.serialize(Row::from(record))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<SentimentRecord>> {
    let mut input = csv::Reader::from_reader(reader);
    input.deserialize::<Row>().map(|row| SentimentRecord::try_from(row?)).collect()
}

pub fn write_json<W: Write>(records: &[SentimentRecord], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush().map_err(serde_json::Error::io)?;
    Ok(())
}

pub fn read_json<R: Read>(reader: R) -> Result<Vec<SentimentRecord>> { Ok(serde_json::from_reader(reader)?) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_six_places() {
        assert_eq!(round_to_precision(0.123_456_789), 0.123_457);
        assert_eq!(round_to_precision(-0.5), -0.5);
    }

    #[test]
    fn keyword_column_format() {
        let kws = vec![Keyword::new("great", 2.0), Keyword::new("fast", 1.0)];
        assert_eq!(join_keywords(&kws), "great:2;fast:1");
        assert_eq!(split_keywords("great:2;fast:1").unwrap(), kws);
        assert!(split_keywords("").unwrap().is_empty());
        assert!(split_keywords("great").is_err());
        assert!(split_keywords("great:lots").is_err());
    }
}
