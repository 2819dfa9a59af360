//! Pipeline configuration
//!
//! All settings have defaults, so a run needs no configuration at all. A
//! YAML file can override any subset of them, for example:
//!
//! ```yaml
//! input: data/productos_vendidos.csv
//! top_output: out/top5_productos_vendidos.csv
//! prices_output: out/precios_productos.csv
//! table_name: Productos
//! limit: 5
//! price_policy: first
//! ```

use crate::error::PipelineError;
use crate::query::PricePolicy;
use crate::store::DEFAULT_TABLE;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "productos_vendidos.csv";
pub const DEFAULT_TOP_OUTPUT: &str = "top5_productos_vendidos.csv";
pub const DEFAULT_PRICES_OUTPUT: &str = "precios_productos.csv";
pub const DEFAULT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// CSV of sales transactions to read
    pub input: PathBuf,
    /// Destination of the top sellers report
    pub top_output: PathBuf,
    /// Destination of the top sellers report with prices
    pub prices_output: PathBuf,
    /// Name of the in-memory table the transactions are loaded into
    pub table_name: String,
    /// Number of products to report
    pub limit: usize,
    /// Rule for choosing one price per product
    pub price_policy: PricePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            top_output: PathBuf::from(DEFAULT_TOP_OUTPUT),
            prices_output: PathBuf::from(DEFAULT_PRICES_OUTPUT),
            table_name: DEFAULT_TABLE.to_string(),
            limit: DEFAULT_LIMIT,
            price_policy: PricePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Read configuration from a YAML file
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            PipelineError::Config(format!("{}: {}", path.display(), e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Write configuration to a YAML file
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .with_context(|| "Failed to serialize pipeline config to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write pipeline config: {}", path.display()))?;

        Ok(())
    }

    /// Check settings that would otherwise fail deep inside a run
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(PipelineError::Config("limit must be at least 1".to_string()).into());
        }
        if self.table_name.trim().is_empty() {
            return Err(PipelineError::Config("table_name must not be empty".to_string()).into());
        }
        Ok(())
    }
}
