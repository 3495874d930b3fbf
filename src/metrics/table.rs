//! Delimited text table with a header row
//!
//! Cells are typed on the way in: numbers become `f64`, `true`/`false`
//! become booleans, empty cells stay empty, anything else is kept as text.

use std::collections::HashMap;

use super::MetricsError;

/// A typed table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// Type a raw cell value
    pub fn coerce(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed {
            "true" | "TRUE" | "True" => return Cell::Bool(true),
            "false" | "FALSE" | "False" => return Cell::Bool(false),
            _ => {}
        }
        if looks_numeric(trimmed) {
            if let Ok(value) = trimmed.parse::<f64>() {
                return Cell::Number(value);
            }
        }
        Cell::Text(raw.to_string())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// Plain decimal or scientific notation only; `f64::from_str` alone would
/// also accept things like "inf", "NaN" or "+5"
fn looks_numeric(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty()
        && digits.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Parse comma-separated text whose first record is the header
    ///
    /// Quoted fields may contain commas, newlines and doubled quotes.
    /// Blank lines are skipped; short rows simply lack the trailing cells.
    pub fn parse(text: &str) -> Result<Table, MetricsError> {
        let mut records = split_records(text).into_iter();
        let headers = records.next().ok_or(MetricsError::MissingHeader)?;

        let mut index = HashMap::new();
        for (position, name) in headers.iter().enumerate() {
            // A repeated column name resolves to its last occurrence
            index.insert(name.clone(), position);
        }

        let rows = records
            .map(|record| record.iter().map(|raw| Cell::coerce(raw)).collect())
            .collect();

        Ok(Table {
            headers,
            index,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, matched exactly
    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Cell of `row` in column `name`; `None` when either is absent
    pub fn get<'a>(&self, row: &'a [Cell], name: &str) -> Option<&'a Cell> {
        self.column(name).and_then(|column| row.get(column))
    }
}

/// Split text into records of raw fields
fn split_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }
    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_coercion() {
        assert_eq!(Cell::coerce(""), Cell::Empty);
        assert_eq!(Cell::coerce("   "), Cell::Empty);
        assert_eq!(Cell::coerce("3"), Cell::Number(3.0));
        assert_eq!(Cell::coerce(" 0.91 "), Cell::Number(0.91));
        assert_eq!(Cell::coerce("-2.5e-3"), Cell::Number(-0.0025));
        assert_eq!(Cell::coerce(".5"), Cell::Number(0.5));
        assert_eq!(Cell::coerce("true"), Cell::Bool(true));
        assert_eq!(Cell::coerce("NaN"), Cell::Text("NaN".to_string()));
        assert_eq!(Cell::coerce("inf"), Cell::Text("inf".to_string()));
        assert_eq!(Cell::coerce("1-2"), Cell::Text("1-2".to_string()));
        assert_eq!(Cell::coerce("yolo"), Cell::Text("yolo".to_string()));
    }

    #[test]
    fn test_parse_header_and_rows() {
        let table = Table::parse("epoch,train/loss\n1,0.9\n2,0.7\n").unwrap();

        assert_eq!(table.headers(), ["epoch".to_string(), "train/loss".to_string()]);
        assert_eq!(table.len(), 2);
        let row = &table.rows()[1];
        assert_eq!(table.get(row, "epoch"), Some(&Cell::Number(2.0)));
        assert_eq!(table.get(row, "train/loss"), Some(&Cell::Number(0.7)));
        assert_eq!(table.get(row, "val/loss"), None);
    }

    #[test]
    fn test_parse_quotes_and_crlf() {
        let table = Table::parse("name,note\r\n\"a, b\",\"say \"\"hi\"\"\"\r\nc,\"multi\nline\"\r\n").unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][0], Cell::Text("a, b".to_string()));
        assert_eq!(table.rows()[0][1], Cell::Text("say \"hi\"".to_string()));
        assert_eq!(table.rows()[1][1], Cell::Text("multi\nline".to_string()));
    }

    #[test]
    fn test_cell_borrow_follows_the_row() {
        let table = Table::parse("epoch,val/loss\n1,0.8\n").unwrap();
        let row: Vec<Cell> = table.rows()[0].clone();
        // The returned cell borrows the row, not the table
        let cell = table.get(&row, "val/loss");
        drop(table);
        assert_eq!(cell, Some(&Cell::Number(0.8)));
    }

    #[test]
    fn test_blank_lines_skipped_and_short_rows_kept() {
        let table = Table::parse("a,b,c\n\n1,2\n\n").unwrap();

        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(table.get(row, "b"), Some(&Cell::Number(2.0)));
        assert_eq!(table.get(row, "c"), None);
    }

    #[test]
    fn test_headers_match_exactly() {
        let table = Table::parse(" epoch,Epoch\n1,2\n").unwrap();
        assert_eq!(table.column("epoch"), None);
        assert_eq!(table.column(" epoch"), Some(0));
        assert_eq!(table.column("Epoch"), Some(1));
    }

    #[test]
    fn test_empty_text_has_no_header() {
        assert!(matches!(Table::parse(""), Err(MetricsError::MissingHeader)));
        assert!(matches!(Table::parse("\n\n"), Err(MetricsError::MissingHeader)));
    }
}
