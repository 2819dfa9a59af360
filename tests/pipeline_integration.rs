//! Integration tests for the sales pipeline
//!
//! These tests run the whole pipeline against CSV fixtures written to a
//! temporary directory and check the files it leaves behind.

use eyre::Result;
use sales_pipeline::etl::{Extractor, Transformer};
use sales_pipeline::{
    CsvReader, ErrorKind, Pipeline, PipelineConfig, PricePolicy, Store, TopSellers, Value,
    error_kind,
};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "product_id,quantity,unit_price";

/// Config with every file inside `dir`
fn config_in(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        input: dir.join("productos_vendidos.csv"),
        top_output: dir.join("top5_productos_vendidos.csv"),
        prices_output: dir.join("precios_productos.csv"),
        ..Default::default()
    }
}

fn write_input(config: &PipelineConfig, rows: &[&str]) -> Result<()> {
    let mut content = format!("{}\n", HEADER);
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&config.input, content)?;
    Ok(())
}

fn run(config: &PipelineConfig) -> Result<String> {
    let mut out = Vec::new();
    Pipeline::new(config.clone())?.run(&mut out)?;
    Ok(String::from_utf8(out)?)
}

/// Data lines of an output file, split into fields
fn data_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .skip(1)
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect())
}

#[test]
fn test_reference_scenario() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    write_input(&config, &["A,10,5.0", "B,30,2.0", "A,5,5.0", "C,20,3.0"])?;

    let printed = run(&config)?;

    assert_eq!(
        std::fs::read_to_string(&config.top_output)?,
        "product_id,total_vendido\nB,30\nC,20\nA,15\n"
    );
    assert_eq!(
        std::fs::read_to_string(&config.prices_output)?,
        "product_id,total_vendido,unit_price\nB,30,2.0\nC,20,3.0\nA,15,5.0\n"
    );
    assert!(printed.contains("total_vendido"));
    assert!(printed.contains("unit_price"));

    Ok(())
}

#[test]
fn test_five_rows_when_many_products() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    let rows: Vec<String> = (1..=12)
        .map(|i| format!("P{},{},1.5", i, i * 3))
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    write_input(&config, &rows)?;

    run(&config)?;

    let top = data_rows(&config.top_output)?;
    let prices = data_rows(&config.prices_output)?;
    assert_eq!(top.len(), 5);
    assert_eq!(prices.len(), 5);
    assert_eq!(top[0], vec!["P12", "36"]);
    assert_eq!(top[4], vec!["P8", "24"]);

    Ok(())
}

#[test]
fn test_fewer_products_than_limit() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    write_input(&config, &["X,1,1.0", "Y,2,1.0", "X,4,1.0"])?;

    run(&config)?;

    assert_eq!(data_rows(&config.top_output)?.len(), 2);
    assert_eq!(data_rows(&config.prices_output)?.len(), 2);

    Ok(())
}

#[test]
fn test_totals_are_exact_and_sorted() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    let rows = [
        "101,7,9.99",
        "102,3,1.25",
        "103,11,4.0",
        "101,9,9.99",
        "104,2,0.5",
        "102,3,1.25",
        "105,16,2.0",
        "106,1,3.0",
        "103,5,4.0",
        "104,1000000000000,0.5",
    ];
    write_input(&config, &rows)?;

    run(&config)?;

    let mut expected: HashMap<String, i64> = HashMap::new();
    for row in rows {
        let fields: Vec<&str> = row.split(',').collect();
        *expected.entry(fields[0].to_string()).or_default() += fields[1].parse::<i64>()?;
    }

    let top = data_rows(&config.top_output)?;
    let totals: Vec<i64> = top
        .iter()
        .map(|r| r[1].parse::<i64>())
        .collect::<Result<_, _>>()?;

    for (row, total) in top.iter().zip(&totals) {
        assert_eq!(expected[&row[0]], *total, "total for {}", row[0]);
    }
    assert!(totals.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(top[0], vec!["104", "1000000000002"]);

    Ok(())
}

#[test]
fn test_saved_report_sums_back_to_same_totals() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    write_input(&config, &["A,10,5.0", "B,30,2.0", "A,5,5.0", "C,20,3.0"])?;
    run(&config)?;

    // Re-aggregating a saved report, treating total_vendido as quantity
    let report = std::fs::read_to_string(&config.top_output)?;
    let as_input = report.replacen("total_vendido", "quantity", 1);
    let second = temp.path().join("second.csv");
    std::fs::write(&second, as_input)?;

    let table = CsvReader::new(&second).extract()?;
    let store = Store::load_table("Productos", table)?;
    let again = TopSellers::new("Productos", 5).transform(&store)?;

    let original = CsvReader::new(&config.top_output).extract()?;
    assert_eq!(again.rows(), original.rows());

    Ok(())
}

#[test]
fn test_header_only_input() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    write_input(&config, &[])?;

    let printed = run(&config)?;

    assert_eq!(
        std::fs::read_to_string(&config.top_output)?,
        "product_id,total_vendido\n"
    );
    assert_eq!(
        std::fs::read_to_string(&config.prices_output)?,
        "product_id,total_vendido,unit_price\n"
    );
    assert!(printed.contains("(no rows)"));

    Ok(())
}

#[test]
fn test_varying_prices_report_first_price() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    write_input(&config, &["A,1,4.5", "B,1,2.0", "A,1,3.75", "A,1,6.0"])?;

    run(&config)?;

    let prices = data_rows(&config.prices_output)?;
    assert_eq!(prices[0], vec!["A", "3", "4.5"]);
    assert_eq!(prices[1], vec!["B", "1", "2.0"]);

    Ok(())
}

#[test]
fn test_varying_prices_with_max_policy() -> Result<()> {
    let temp = TempDir::new()?;
    let config = PipelineConfig {
        price_policy: PricePolicy::Max,
        ..config_in(temp.path())
    };
    write_input(&config, &["A,1,4.5", "B,1,2.0", "A,1,3.75", "A,1,6.0"])?;

    run(&config)?;

    assert_eq!(data_rows(&config.prices_output)?[0], vec!["A", "3", "6.0"]);

    Ok(())
}

#[test]
fn test_unique_policy_fails_before_saving() -> Result<()> {
    let temp = TempDir::new()?;
    let config = PipelineConfig {
        price_policy: PricePolicy::Unique,
        ..config_in(temp.path())
    };
    write_input(&config, &["A,1,4.5", "A,1,3.75"])?;

    let err = run(&config).unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::Query));
    assert!(!config.top_output.exists());

    Ok(())
}

#[test]
fn test_extra_columns_are_kept_in_store() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("sales.csv");
    std::fs::write(
        &path,
        "sale_date,product_id,quantity,unit_price\n2024-01-02,A,3,1.0\n2024-01-03,B,4,2.0\n",
    )?;

    let store = Store::load_table("Productos", CsvReader::new(&path).extract()?)?;
    let table = store.table("Productos")?;
    assert_eq!(
        table.column_names(),
        vec!["sale_date", "product_id", "quantity", "unit_price"]
    );
    assert_eq!(table.rows()[0][0], Value::from("2024-01-02"));

    let top = TopSellers::new("Productos", 5).transform(&store)?;
    assert_eq!(top.rows()[0], vec![Value::from("B"), Value::Integer(4)]);

    Ok(())
}

#[test]
fn test_custom_limit() -> Result<()> {
    let temp = TempDir::new()?;
    let config = PipelineConfig {
        limit: 2,
        ..config_in(temp.path())
    };
    write_input(&config, &["A,1,1.0", "B,2,1.0", "C,3,1.0"])?;

    run(&config)?;

    let top = data_rows(&config.top_output)?;
    assert_eq!(top, vec![vec!["C", "3"], vec!["B", "2"]]);

    Ok(())
}

#[test]
fn test_missing_input() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());

    let err = run(&config).unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::FileNotFound));

    Ok(())
}

#[test]
fn test_malformed_input() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    write_input(&config, &["A,1,1.0", "B,2"])?;

    let err = run(&config).unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::Parse));

    Ok(())
}

#[test]
fn test_missing_quantity_column() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    std::fs::write(&config.input, "product_id,qty,unit_price\nA,1,1.0\n")?;

    let err = run(&config).unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::Query));

    Ok(())
}

#[test]
fn test_duplicate_header_is_storage_error() -> Result<()> {
    let temp = TempDir::new()?;
    let config = config_in(temp.path());
    std::fs::write(
        &config.input,
        "product_id,quantity,unit_price,Quantity\nA,1,1.0,2\n",
    )?;

    let err = run(&config).unwrap_err();
    assert_eq!(error_kind(&err), Some(ErrorKind::Storage));

    Ok(())
}

#[test]
fn test_unwritable_output_keeps_earlier_file() -> Result<()> {
    let temp = TempDir::new()?;
    let config = PipelineConfig {
        prices_output: temp.path().join("missing-dir/precios_productos.csv"),
        ..config_in(temp.path())
    };
    write_input(&config, &["A,1,1.0"])?;

    let err = run(&config).unwrap_err();

    assert_eq!(error_kind(&err), Some(ErrorKind::Io));
    assert!(config.top_output.exists());
    assert!(!config.prices_output.exists());

    Ok(())
}
