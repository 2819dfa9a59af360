//! Pipeline orchestration for the sales report

use super::{Extractor, Loader, Transformer};
use crate::config::PipelineConfig;
use crate::query::{TopSellers, TopSellersWithPrice};
use crate::report::print_table;
use crate::storage::{CsvReader, CsvWriter};
use crate::store::Store;

use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::PathBuf;

/// Sales pipeline that runs Extract, Load, Query and Save in order
///
/// # Example
/// ```no_run
/// use sales_pipeline::config::PipelineConfig;
/// use sales_pipeline::etl::Pipeline;
///
/// # fn example() -> eyre::Result<()> {
/// let pipeline = Pipeline::new(PipelineConfig::default())?;
/// let summary = pipeline.run(&mut std::io::stdout())?;
/// println!("Read {} transactions", summary.rows_extracted);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    config: PipelineConfig,
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub rows_extracted: usize,
    pub top_output: PathBuf,
    pub top_rows: usize,
    pub prices_output: PathBuf,
    pub prices_rows: usize,
}

impl Pipeline {
    /// Create a new pipeline
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the complete pipeline
    ///
    /// Steps:
    /// 1. Extract transactions from the input CSV
    /// 2. Load them into a fresh in-memory store
    /// 3. Run both top-sellers queries against the store
    /// 4. Print both results to `out` and save them as CSV
    ///
    /// # Errors
    /// Returns the first error raised by any stage. Files saved before the
    /// failure are left in place.
    pub fn run(&self, out: &mut impl Write) -> Result<PipelineSummary> {
        let config = &self.config;
        log::info!("Starting sales pipeline");

        // Extract
        log::debug!("Extracting from {}...", config.input.display());
        let transactions = CsvReader::new(&config.input).extract()?;
        let rows_extracted = transactions.len();
        if transactions.is_empty() {
            log::warn!("No transactions in {}, reports will be empty", config.input.display());
        }

        // Load
        let store = Store::load_table(&config.table_name, transactions)?;

        // Query
        let top_sellers = TopSellers::new(&config.table_name, config.limit);
        let with_price =
            TopSellersWithPrice::new(&config.table_name, config.limit, config.price_policy);
        let top = top_sellers.transform(&store)?;
        let prices = with_price.transform(&store)?;
        drop(store);

        // Report
        let title = format!("Top {} best-selling products:", config.limit);
        print_table(out, &title, &top).wrap_err("Failed to print results")?;
        let title = format!("Top {} best-selling products with price:", config.limit);
        print_table(out, &title, &prices).wrap_err("Failed to print results")?;

        // Save
        let top_rows = CsvWriter::new(&config.top_output).load(&top)?;
        let prices_rows = CsvWriter::new(&config.prices_output).load(&prices)?;

        log::info!(
            "✓ Pipeline complete: {} transaction(s) in, {} + {} report row(s) out",
            rows_extracted.cyan(),
            top_rows.cyan(),
            prices_rows.cyan()
        );

        Ok(PipelineSummary {
            rows_extracted,
            top_output: config.top_output.clone(),
            top_rows,
            prices_output: config.prices_output.clone(),
            prices_rows,
        })
    }
}
