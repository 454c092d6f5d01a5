//! Search results formatter
//!
//! Renders a result grid (header row plus one line per record) for humans and
//! a flat JSON document for robot mode. Both backends feed the same shape so
//! callers do not care where the rows came from.

use console::{measure_text_width, style};
use serde::Serialize;

use crate::remote::RemoteResultSet;
use crate::storage::local::Record;

/// Column headers of the local `records` table.
pub const LOCAL_COLUMNS: [&str; 3] = ["identifier", "event_date", "payload"];

/// Header plus rows, ready to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub source: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SearchResults {
    #[must_use]
    pub fn from_local(records: Vec<Record>) -> Self {
        Self {
            source: "local".to_string(),
            columns: LOCAL_COLUMNS.iter().map(ToString::to_string).collect(),
            rows: records
                .into_iter()
                .map(|record| vec![record.identifier, record.event_date, record.payload])
                .collect(),
        }
    }

    #[must_use]
    pub fn from_remote(result: &RemoteResultSet) -> Self {
        Self {
            source: "remote".to_string(),
            columns: result.columns.clone(),
            rows: result.rows.iter().map(|row| row.cells()).collect(),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Aligned grid. The header is always rendered, even with no rows.
    #[must_use]
    pub fn to_grid(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| measure_text_width(c)).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(index) {
                    *width = (*width).max(measure_text_width(cell));
                }
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 3);
        lines.push(
            style(render_line(&self.columns, &widths))
                .bold()
                .to_string(),
        );
        lines.push(
            widths
                .iter()
                .map(|width| "-".repeat(*width))
                .collect::<Vec<_>>()
                .join("  "),
        );
        for row in &self.rows {
            lines.push(render_line(row, &widths));
        }
        let noun = if self.count() == 1 { "row" } else { "rows" };
        lines.push(format!("({} {noun})", self.count()));
        lines.join("\n")
    }
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let fill = width.saturating_sub(measure_text_width(cell));
            format!("{cell}{}", " ".repeat(fill))
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}
