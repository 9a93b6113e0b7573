//! Tabular document and spreadsheet renders of a ledger view.

use rust_decimal::Decimal;
use serde::Serialize;

use cashbook_ledger::{EntryType, LedgerView, ProjectedEntry};

use crate::currency::{format_date, format_inr};
use crate::error::{ExportError, ExportResult};

const HEADERS: [&str; 5] = ["Date", "Remark", "Cash In", "Cash Out", "Balance"];
const EMPTY_CELL: &str = "-";

/// File name for an export: spaces become underscores.
pub fn export_file_name(title: &str, extension: &str) -> String {
    format!("{}.{}", title.replace(' ', "_"), extension)
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

const ALIGN: [Align; 5] = [Align::Left, Align::Left, Align::Right, Align::Right, Align::Right];

fn display_cells(row: &ProjectedEntry) -> [String; 5] {
    let amount = format_inr(row.entry.amount);
    let (cash_in, cash_out) = match row.entry.entry_type {
        EntryType::In => (amount, EMPTY_CELL.to_string()),
        EntryType::Out => (EMPTY_CELL.to_string(), amount),
    };
    [
        format_date(row.entry.date),
        row.entry.remark.clone(),
        cash_in,
        cash_out,
        format_inr(row.balance),
    ]
}

fn pad(cell: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(cell.chars().count()));
    match align {
        Align::Left => format!("{cell}{fill}"),
        Align::Right => format!("{fill}{cell}"),
    }
}

/// Render a plain-text document: title, summary line, then a grid table.
pub fn render_document(title: &str, view: &LedgerView) -> String {
    let body: Vec<[String; 5]> = view.rows.iter().map(display_cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 5]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .zip(ALIGN)
            .map(|((cell, width), align)| pad(cell, width, align))
            .collect();
        padded.join(" | ").trim_end().to_string()
    };

    let summary = view.summary;
    let mut out = String::new();
    out.push_str(title);
    out.push('\n');
    out.push_str(&format!(
        "Total In: {} | Total Out: {} | Net Balance: {}\n\n",
        format_inr(summary.total_in),
        format_inr(summary.total_out),
        format_inr(summary.balance),
    ));

    out.push_str(&line(HEADERS));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for cells in &body {
        out.push_str(&line([&cells[0], &cells[1], &cells[2], &cells[3], &cells[4]]));
        out.push('\n');
    }

    out
}

#[derive(Serialize)]
struct SheetRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Remark")]
    remark: &'a str,
    #[serde(rename = "Cash In")]
    cash_in: Option<Decimal>,
    #[serde(rename = "Cash Out")]
    cash_out: Option<Decimal>,
    #[serde(rename = "Balance")]
    balance: Decimal,
}

/// Render the spreadsheet form as CSV: raw amounts, empty cell for the absent side.
pub fn render_csv(view: &LedgerView) -> ExportResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    if view.rows.is_empty() {
        writer.write_record(HEADERS)?;
    }

    for row in &view.rows {
        let (cash_in, cash_out) = match row.entry.entry_type {
            EntryType::In => (Some(row.entry.amount), None),
            EntryType::Out => (None, Some(row.entry.amount)),
        };
        writer.serialize(SheetRow {
            date: format_date(row.entry.date),
            remark: &row.entry.remark,
            cash_in,
            cash_out,
            balance: row.balance,
        })?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Buffer(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
