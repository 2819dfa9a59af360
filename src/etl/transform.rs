//! Transformer trait for deriving new data from loaded data

use eyre::Result;

/// Transformer trait for read-only transformations
///
/// Implementors borrow their input, so several transformers can run against
/// the same loaded data one after another.
///
/// # Example
/// ```
/// use sales_pipeline::etl::Transformer;
/// use eyre::Result;
///
/// struct RowCount;
///
/// impl Transformer for RowCount {
///     type Input = Vec<i64>;
///     type Output = usize;
///
///     fn transform(&self, input: &Self::Input) -> Result<Self::Output> {
///         Ok(input.len())
///     }
/// }
///
/// assert_eq!(RowCount.transform(&vec![1, 2, 3]).unwrap(), 3);
/// ```
pub trait Transformer {
    /// Input type, borrowed for the duration of the transform
    type Input: ?Sized;

    /// Output type produced by the transformation
    type Output;

    /// Short name used in logs and error messages
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Transform the input
    ///
    /// # Errors
    /// Returns an error if the input does not have the expected shape
    fn transform(&self, input: &Self::Input) -> Result<Self::Output>;
}
