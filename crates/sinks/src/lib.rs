#![doc = include_str!("../README.md")]

pub mod columnar;
pub mod error;
pub mod json;
pub mod report;

pub use columnar::ParquetSink;
pub use error::SinkError;
pub use json::JsonBatchSink;
pub use report::HtmlJsonReporter;
