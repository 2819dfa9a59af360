//! Extractor trait for reading data from a source

use eyre::Result;

/// Extractor trait for extracting data from a source
///
/// Implementors define where the data comes from, e.g. a CSV file on disk
/// or an in-memory fixture in tests.
///
/// # Example
/// ```no_run
/// use sales_pipeline::etl::Extractor;
/// use sales_pipeline::table::Table;
/// use eyre::Result;
///
/// struct EmptySource;
///
/// impl Extractor for EmptySource {
///     type Item = Table;
///
///     fn extract(&self) -> Result<Self::Item> {
///         Ok(Table::default())
///     }
/// }
/// ```
pub trait Extractor {
    /// The type of data extracted
    type Item;

    /// Extract data from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (missing file, parsing, etc.)
    fn extract(&self) -> Result<Self::Item>;
}
