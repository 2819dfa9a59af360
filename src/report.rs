//! Console rendering of result tables

use crate::table::{Table, Value};

use comfy_table::{Cell, CellAlignment, ContentArrangement, presets::UTF8_FULL_CONDENSED};
use std::io::Write;

/// Render a table as a UTF-8 box drawing
///
/// Numeric cells are right-aligned. An empty table still shows its header.
pub fn render_table(table: &Table) -> String {
    let mut rendered = comfy_table::Table::new();
    rendered
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(table.column_names().into_iter().map(Cell::new));

    for row in table.rows() {
        rendered.add_row(row.iter().map(|value| {
            let cell = Cell::new(value.to_string());
            match value {
                Value::Integer(_) | Value::Float(_) => cell.set_alignment(CellAlignment::Right),
                _ => cell,
            }
        }));
    }

    rendered.to_string()
}

/// Write a titled rendering of `table` to `out`
pub fn print_table(out: &mut impl Write, title: &str, table: &Table) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", render_table(table))?;
    if table.is_empty() {
        writeln!(out, "(no rows)")?;
    }
    Ok(())
}
