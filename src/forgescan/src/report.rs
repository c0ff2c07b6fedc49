//! Tabular report model and CSV writer

use std::fmt;
use std::io::Write;

use csv::{QuoteStyle, Terminator, WriterBuilder};

/// One report cell
///
/// Free text is always quoted on output; plain cells are written bare unless
/// their content would break the row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Plain(String),
    Text(String),
}

impl Cell {
    pub fn plain(value: impl fmt::Display) -> Self {
        Cell::Plain(value.to_string())
    }

    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn empty() -> Self {
        Cell::Plain(String::new())
    }

    /// Cell content without quoting
    pub fn value(&self) -> &str {
        match self {
            Cell::Plain(v) | Cell::Text(v) => v,
        }
    }

    /// Content as it appears in the CSV output
    pub fn render(&self) -> String {
        match self {
            Cell::Text(v) => quote(v),
            Cell::Plain(v) if needs_quotes(v) => quote(v),
            Cell::Plain(v) => v.clone(),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::plain(value)
    }
}

impl From<Option<String>> for Cell {
    fn from(value: Option<String>) -> Self {
        value.map(Cell::Plain).unwrap_or_else(Cell::empty)
    }
}

fn needs_quotes(value: &str) -> bool {
    value.contains([',', '"', '\n', '\r'])
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// A named table of rows, written as one CSV file
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Report {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Report whose header is a fixed list of column names
    pub fn with_columns(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::new(name, columns.iter().map(|c| c.to_string()).collect())
    }

    /// Report name, also the default output file stem
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Append a fully assembled row
    ///
    /// Rows may be longer than the header.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a header column
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Write header and rows as CSV
    pub fn write_to<W: Write>(&self, writer: W) -> crate::Result<()> {
        // Quoting is decided per cell by `Cell::render`
        let mut csv = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);

        csv.write_record(&self.columns)?;
        for row in &self.rows {
            csv.write_record(row.iter().map(Cell::render))?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Render the whole report to a string
    pub fn to_csv_string(&self) -> crate::Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
