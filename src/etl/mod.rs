//! Core ETL (Extract, Transform, Load) abstractions
//!
//! This module provides the trait definitions the sales pipeline is built
//! from, and the [`Pipeline`] that runs them in order.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::{Pipeline, PipelineSummary};
pub use transform::Transformer;
