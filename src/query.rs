//! Top-sellers aggregation queries
//!
//! Both queries group the transactions table by `product_id`, sum
//! `quantity` into `total_vendido`, order by that total descending and keep
//! the first `limit` groups. [`TopSellersWithPrice`] also reports one
//! `unit_price` per product, chosen by a [`PricePolicy`].
//!
//! Ordering is fully deterministic: products with equal totals keep the
//! order in which they first appear in the input, and products whose
//! quantities are all missing sort last.

use crate::error::PipelineError;
use crate::etl::Transformer;
use crate::store::Store;
use crate::table::{Column, ColumnType, Table, Value};

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const PRODUCT_ID: &str = "product_id";
pub const QUANTITY: &str = "quantity";
pub const UNIT_PRICE: &str = "unit_price";
pub const TOTAL_SOLD: &str = "total_vendido";

/// How to pick a single `unit_price` for a product sold at several prices
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PricePolicy {
    /// First non-missing price in input order
    #[default]
    First,
    /// Last non-missing price in input order
    Last,
    /// Lowest price
    Min,
    /// Highest price
    Max,
    /// All prices must agree, otherwise the query fails
    Unique,
}

impl std::fmt::Display for PricePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PricePolicy::First => "first",
            PricePolicy::Last => "last",
            PricePolicy::Min => "min",
            PricePolicy::Max => "max",
            PricePolicy::Unique => "unique",
        };
        f.write_str(name)
    }
}

/// Top products by total quantity sold
#[derive(Debug, Clone)]
pub struct TopSellers {
    table: String,
    limit: usize,
}

impl TopSellers {
    pub fn new(table: impl Into<String>, limit: usize) -> Self {
        Self {
            table: table.into(),
            limit,
        }
    }

    /// Equivalent SQL, for logging
    pub fn sql(&self) -> String {
        format!(
            "SELECT {PRODUCT_ID}, SUM({QUANTITY}) AS {TOTAL_SOLD} FROM {} \
             GROUP BY {PRODUCT_ID} ORDER BY {TOTAL_SOLD} DESC LIMIT {}",
            self.table, self.limit
        )
    }
}

impl Transformer for TopSellers {
    type Input = Store;
    type Output = Table;

    fn name(&self) -> &str {
        "top_sellers"
    }

    fn transform(&self, store: &Store) -> Result<Table> {
        log::debug!("{}", self.sql());
        let source = store.table(&self.table)?;
        let groups = Aggregation::new(self.name(), source, None)?.run(self.limit)?;

        let mut result = Table::new(vec![
            Column::new(PRODUCT_ID, column_type(source, PRODUCT_ID)),
            Column::new(TOTAL_SOLD, total_type(source)),
        ]);
        for group in groups {
            result.push_row(vec![group.key, group.total.into_value()]);
        }

        log::info!("[{}] Query returned {} row(s)", self.name(), result.len());
        Ok(result)
    }
}

/// Top products by total quantity sold, with their unit price
#[derive(Debug, Clone)]
pub struct TopSellersWithPrice {
    table: String,
    limit: usize,
    policy: PricePolicy,
}

impl TopSellersWithPrice {
    pub fn new(table: impl Into<String>, limit: usize, policy: PricePolicy) -> Self {
        Self {
            table: table.into(),
            limit,
            policy,
        }
    }

    /// Equivalent SQL, for logging
    pub fn sql(&self) -> String {
        let price = match self.policy {
            PricePolicy::Min => format!("MIN({UNIT_PRICE}) AS {UNIT_PRICE}"),
            PricePolicy::Max => format!("MAX({UNIT_PRICE}) AS {UNIT_PRICE}"),
            _ => UNIT_PRICE.to_string(),
        };
        format!(
            "SELECT {PRODUCT_ID}, SUM({QUANTITY}) AS {TOTAL_SOLD}, {price} FROM {} \
             GROUP BY {PRODUCT_ID} ORDER BY {TOTAL_SOLD} DESC LIMIT {}",
            self.table, self.limit
        )
    }
}

impl Transformer for TopSellersWithPrice {
    type Input = Store;
    type Output = Table;

    fn name(&self) -> &str {
        "top_sellers_with_price"
    }

    fn transform(&self, store: &Store) -> Result<Table> {
        log::debug!("{} -- price policy: {}", self.sql(), self.policy);
        let source = store.table(&self.table)?;
        let groups = Aggregation::new(self.name(), source, Some(self.policy))?.run(self.limit)?;

        let mut result = Table::new(vec![
            Column::new(PRODUCT_ID, column_type(source, PRODUCT_ID)),
            Column::new(TOTAL_SOLD, total_type(source)),
            Column::new(UNIT_PRICE, column_type(source, UNIT_PRICE)),
        ]);
        for group in groups {
            let price = group.price.unwrap_or(Value::Null);
            result.push_row(vec![group.key, group.total.into_value(), price]);
        }

        log::info!("[{}] Query returned {} row(s)", self.name(), result.len());
        Ok(result)
    }
}

fn column_type(table: &Table, name: &str) -> ColumnType {
    table.column(name).map(|c| c.ty).unwrap_or(ColumnType::Text)
}

fn total_type(table: &Table) -> ColumnType {
    match column_type(table, QUANTITY) {
        ColumnType::Integer => ColumnType::Integer,
        _ => ColumnType::Float,
    }
}

/// Hashable identity of a `product_id` value
#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey {
    Null,
    Integer(i64),
    Float(u64),
    Text(String),
}

impl From<&Value> for GroupKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => GroupKey::Null,
            Value::Integer(i) => GroupKey::Integer(*i),
            // -0.0 groups with 0.0, and every NaN with every other NaN
            Value::Float(f) if *f == 0.0 => GroupKey::Float(0f64.to_bits()),
            Value::Float(f) if f.is_nan() => GroupKey::Float(f64::NAN.to_bits()),
            Value::Float(f) => GroupKey::Float(f.to_bits()),
            Value::Text(s) => GroupKey::Text(s.clone()),
        }
    }
}

/// Running `SUM(quantity)` for one group
#[derive(Debug, Clone, Copy, PartialEq)]
enum Total {
    Empty,
    Integer(i64),
    Float(f64),
}

impl Total {
    fn add(self, value: &Value) -> Option<Self> {
        let total = match (self, value) {
            (total, Value::Null) => total,
            (Total::Empty, Value::Integer(i)) => Total::Integer(*i),
            (Total::Integer(acc), Value::Integer(i)) => Total::Integer(acc.checked_add(*i)?),
            (Total::Empty, v) => Total::Float(v.as_f64()?),
            (Total::Integer(acc), v) => Total::Float(acc as f64 + v.as_f64()?),
            (Total::Float(acc), v) => Total::Float(acc + v.as_f64()?),
        };
        Some(total)
    }

    fn into_value(self) -> Value {
        match self {
            Total::Empty => Value::Null,
            Total::Integer(i) => Value::Integer(i),
            Total::Float(f) => Value::Float(f),
        }
    }

    /// Descending order, missing totals last
    fn cmp_desc(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Total::Empty, Total::Empty) => Ordering::Equal,
            (Total::Empty, _) => Ordering::Greater,
            (_, Total::Empty) => Ordering::Less,
            (Total::Integer(a), Total::Integer(b)) => b.cmp(a),
            (a, b) => b.as_f64().total_cmp(&a.as_f64()),
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Total::Empty => 0.0,
            Total::Integer(i) => *i as f64,
            Total::Float(f) => *f,
        }
    }
}

#[derive(Debug)]
struct Group {
    key: Value,
    total: Total,
    price: Option<Value>,
}

/// One grouping pass over the transactions table
struct Aggregation<'a> {
    query: &'a str,
    table: &'a Table,
    product_idx: usize,
    quantity_idx: usize,
    price: Option<(usize, PricePolicy)>,
}

impl<'a> Aggregation<'a> {
    fn new(query: &'a str, table: &'a Table, policy: Option<PricePolicy>) -> Result<Self> {
        let require = |name: &str| {
            table.column_index(name).ok_or_else(|| {
                PipelineError::query(query, format!("no such column: {}", name))
            })
        };

        let product_idx = require(PRODUCT_ID)?;
        let quantity_idx = require(QUANTITY)?;
        if !table.columns()[quantity_idx].ty.is_numeric() {
            return Err(PipelineError::query(
                query,
                format!("column '{}' is not numeric", QUANTITY),
            )
            .into());
        }

        let price = match policy {
            Some(policy) => {
                let idx = require(UNIT_PRICE)?;
                let numeric_only = matches!(policy, PricePolicy::Min | PricePolicy::Max);
                if numeric_only && !table.columns()[idx].ty.is_numeric() {
                    return Err(PipelineError::query(
                        query,
                        format!("price policy '{}' needs a numeric '{}'", policy, UNIT_PRICE),
                    )
                    .into());
                }
                Some((idx, policy))
            }
            None => None,
        };

        Ok(Self {
            query,
            table,
            product_idx,
            quantity_idx,
            price,
        })
    }

    /// Group, sort and truncate to `limit` groups
    fn run(&self, limit: usize) -> Result<Vec<Group>> {
        let mut index: HashMap<GroupKey, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();

        for row in self.table.rows() {
            let key = &row[self.product_idx];
            let slot = *index.entry(GroupKey::from(key)).or_insert_with(|| {
                groups.push(Group {
                    key: key.clone(),
                    total: Total::Empty,
                    price: None,
                });
                groups.len() - 1
            });
            let group = &mut groups[slot];

            group.total = group.total.add(&row[self.quantity_idx]).ok_or_else(|| {
                PipelineError::query(
                    self.query,
                    format!("sum of '{}' overflows for product {}", QUANTITY, key),
                )
            })?;

            if let Some((price_idx, policy)) = self.price {
                self.pick_price(group, &row[price_idx], policy)?;
            }
        }

        log::debug!(
            "[{}] {} distinct product(s) in {} row(s)",
            self.query,
            groups.len(),
            self.table.len()
        );

        // sort_by is stable, so ties stay in first-appearance order
        groups.sort_by(|a, b| a.total.cmp_desc(&b.total));
        groups.truncate(limit);
        Ok(groups)
    }

    fn pick_price(&self, group: &mut Group, candidate: &Value, policy: PricePolicy) -> Result<()> {
        if candidate.is_null() {
            return Ok(());
        }

        let Some(current) = &group.price else {
            group.price = Some(candidate.clone());
            return Ok(());
        };

        let replace = match policy {
            PricePolicy::First => false,
            PricePolicy::Last => true,
            PricePolicy::Min => numeric_cmp(candidate, current) == Ordering::Less,
            PricePolicy::Max => numeric_cmp(candidate, current) == Ordering::Greater,
            PricePolicy::Unique => {
                if candidate != current {
                    return Err(PipelineError::query(
                        self.query,
                        format!(
                            "product {} has more than one {} ({} and {})",
                            group.key, UNIT_PRICE, current, candidate
                        ),
                    )
                    .into());
                }
                false
            }
        };

        if replace {
            group.price = Some(candidate.clone());
        }
        Ok(())
    }
}

fn numeric_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        _ => {
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
    }
}
