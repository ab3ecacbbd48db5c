//! Flat CSV export of the artworks table, one column per stored field.

use std::io::Write;

use anyhow::{Context, Result};
use rusqlite::types::Value as SqlValue;

use crate::artwork::fields::COLUMNS;
use crate::database::ArtworkStore;

// Spreadsheet tools choke on very long cells.
const DESCRIPTION_LIMIT: usize = 500;

/// Writes a header plus every stored artwork to `writer`, in id order.
/// Returns the number of artworks written.
pub fn export_csv<W: Write>(store: &ArtworkStore, writer: W) -> Result<usize> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(COLUMNS.iter().map(|c| c.name))
        .context("Failed to write CSV header")?;

    let written = store.for_each_row(|values| {
        let cells = COLUMNS
            .iter()
            .zip(values)
            .map(|(column, value)| cell(column.name, value));
        out.write_record(cells).context("Failed to write CSV row")
    })?;

    out.flush().context("Failed to flush CSV output")?;
    Ok(written)
}

fn cell(column: &str, value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) => f.to_string(),
        SqlValue::Text(s) if column == "description" => {
            single_line(s).chars().take(DESCRIPTION_LIMIT).collect()
        }
        SqlValue::Text(s) => single_line(s),
        SqlValue::Blob(b) => single_line(&String::from_utf8_lossy(b)),
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}
