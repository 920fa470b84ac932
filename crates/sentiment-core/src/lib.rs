#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! sentiment-core
//!
//! Domain types, capability traits, configuration and input loading shared
//! by the scorer, the aggregator and the export layer.

pub mod config;
pub mod data_processor;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{Classifier, Tokenizer};
pub use types::{AnalysisBatch, Granularity, Keyword, Label, Polarity, SentimentRecord, TextInput, DEFAULT_SOURCE};
