//! Ephemeral in-memory relational store
//!
//! Holds named [`Table`]s for the duration of a run. Table names and column
//! names follow the usual SQL identifier rule of being compared without
//! regard to ASCII case.

use crate::error::PipelineError;
use crate::table::Table;

use eyre::Result;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;

/// Name of the transactions table the pipeline loads into
pub const DEFAULT_TABLE: &str = "Productos";

/// What to do when a table with the same name already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfExists {
    Replace,
    Fail,
}

#[derive(Debug, Default)]
pub struct Store {
    // keyed by lowercased name; the table keeps its original name
    tables: BTreeMap<String, (String, Table)>,
}

impl Store {
    /// Create a fresh, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh store holding `table` under `name`
    ///
    /// This is the load stage of the pipeline.
    pub fn load_table(name: &str, table: Table) -> Result<Self> {
        let schema: Vec<String> = table
            .columns()
            .iter()
            .map(|c| format!("{} {}", c.name, c.ty))
            .collect();
        log::debug!("CREATE TABLE {} ({})", name, schema.join(", "));

        let mut store = Self::new();
        store.create_table(name, table, IfExists::Replace)?;
        log::info!(
            "Table '{}' created in in-memory store ({} rows)",
            name.cyan(),
            store.table(name)?.len()
        );
        Ok(store)
    }

    pub fn create_table(&mut self, name: &str, table: Table, if_exists: IfExists) -> Result<()> {
        if name.trim().is_empty() {
            return Err(PipelineError::storage(name, "table name is empty").into());
        }
        validate_columns(name, &table)?;

        let key = name.to_ascii_lowercase();
        if self.tables.contains_key(&key) {
            match if_exists {
                IfExists::Fail => {
                    return Err(PipelineError::storage(name, "table already exists").into());
                }
                IfExists::Replace => log::debug!("Replacing existing table '{}'", name),
            }
        }

        self.tables.insert(key, (name.to_string(), table));
        Ok(())
    }

    /// Look up a table by name
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(&name.to_ascii_lowercase())
            .map(|(_, table)| table)
            .ok_or_else(|| PipelineError::query(name, format!("no such table: {}", name)).into())
    }

    /// Remove a table, returning whether it existed
    pub fn drop_table(&mut self, name: &str) -> bool {
        self.tables.remove(&name.to_ascii_lowercase()).is_some()
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.values().map(|(name, _)| name.as_str()).collect()
    }
}

fn validate_columns(name: &str, table: &Table) -> Result<()> {
    let mut seen: Vec<String> = Vec::with_capacity(table.columns().len());

    for (idx, column) in table.columns().iter().enumerate() {
        if column.name.trim().is_empty() {
            return Err(
                PipelineError::storage(name, format!("column {} has an empty name", idx + 1))
                    .into(),
            );
        }

        let folded = column.name.to_ascii_lowercase();
        if seen.contains(&folded) {
            return Err(PipelineError::storage(
                name,
                format!("duplicate column name: {}", column.name),
            )
            .into());
        }
        seen.push(folded);
    }

    Ok(())
}
