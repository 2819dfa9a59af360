//! Loader trait for writing data to destinations

use eyre::Result;

/// Loader trait for loading data to a destination
///
/// # Example
/// ```no_run
/// use sales_pipeline::etl::Loader;
/// use sales_pipeline::table::Table;
/// use eyre::Result;
///
/// struct DiscardLoader;
///
/// impl Loader for DiscardLoader {
///     type Item = Table;
///
///     fn load(&self, item: &Self::Item) -> Result<usize> {
///         Ok(item.len())
///     }
/// }
/// ```
pub trait Loader {
    /// The type of data to load
    type Item: ?Sized;

    /// Load data to the destination
    ///
    /// Returns the number of records written
    ///
    /// # Errors
    /// Returns an error if writing fails (permissions, missing directory, etc.)
    fn load(&self, item: &Self::Item) -> Result<usize>;
}
