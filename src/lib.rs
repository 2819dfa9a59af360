//! Sales Pipeline
//!
//! Reads a CSV of sales transactions, loads it into an in-memory table and
//! reports the best-selling products, with and without their unit price.

pub mod config;
pub mod error;
pub mod etl;
pub mod query;
pub mod report;
pub mod storage;
pub mod store;
pub mod table;

// Re-exports for convenience
pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError, error_kind};
pub use etl::{Extractor, Loader, Pipeline, PipelineSummary, Transformer};
pub use query::{PricePolicy, TopSellers, TopSellersWithPrice};
pub use storage::{CsvReader, CsvWriter};
pub use store::Store;
pub use table::{Column, ColumnType, Table, Value};
