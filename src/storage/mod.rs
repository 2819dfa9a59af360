//! File system storage operations
//!
//! This module handles reading the transactions CSV and writing the report
//! CSV files.

mod csv_file;

pub use csv_file::{CsvReader, CsvWriter};
