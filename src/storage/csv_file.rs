//! CSV file operations

use crate::error::PipelineError;
use crate::etl::{Extractor, Loader};
use crate::table::Table;

use eyre::Result;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Read a CSV file with a header row into a [`Table`]
pub struct CsvReader {
    path: PathBuf,
}

impl CsvReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the whole file, inferring column types
    pub fn read(&self) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(|e| self.open_error(e))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| self.parse_error(e))?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() {
            return Err(PipelineError::Parse {
                path: self.path.clone(),
                message: "no columns to parse from file".to_string(),
            }
            .into());
        }

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.parse_error(e))?;
            records.push(record.iter().map(str::to_string).collect());
        }

        let table = Table::from_records(headers, records);
        log::info!(
            "Loaded {} rows from '{}'",
            table.len().cyan(),
            self.path.display().bright_black()
        );
        Ok(table)
    }

    fn open_error(&self, err: csv::Error) -> PipelineError {
        let not_found = matches!(
            err.kind(),
            csv::ErrorKind::Io(e) if e.kind() == std::io::ErrorKind::NotFound
        );
        if not_found {
            PipelineError::FileNotFound(self.path.clone())
        } else if err.is_io_error() {
            PipelineError::Io {
                path: self.path.clone(),
                source: err.into(),
            }
        } else {
            self.parse_error(err)
        }
    }

    fn parse_error(&self, err: csv::Error) -> PipelineError {
        PipelineError::Parse {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

// Implement Extractor trait for reading CSV files

impl Extractor for CsvReader {
    type Item = Table;

    fn extract(&self) -> Result<Self::Item> {
        self.read()
    }
}

/// Write a [`Table`] to a CSV file, header first
pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Write the table, replacing any existing file
    ///
    /// Returns the number of data rows written.
    pub fn write(&self, table: &Table) -> Result<usize> {
        let mut writer = csv::Writer::from_path(&self.path).map_err(|e| self.io_error(e))?;

        writer
            .write_record(table.column_names())
            .map_err(|e| self.io_error(e))?;

        for row in table.rows() {
            writer
                .write_record(row.iter().map(|value| value.to_string()))
                .map_err(|e| self.io_error(e))?;
        }

        writer.flush().map_err(|source| PipelineError::Io {
            path: self.path.clone(),
            source,
        })?;

        log::info!(
            "Saved {} row(s) to '{}'",
            table.len().cyan(),
            self.path.display().bright_black()
        );
        Ok(table.len())
    }

    fn io_error(&self, err: csv::Error) -> PipelineError {
        PipelineError::Io {
            path: self.path.clone(),
            source: err.into(),
        }
    }
}

// Implement Loader trait for writing CSV files

impl Loader for CsvWriter {
    type Item = Table;

    fn load(&self, item: &Self::Item) -> Result<usize> {
        self.write(item)
    }
}
