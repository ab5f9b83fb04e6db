//! Delimited stimulus file parsing
//!
//! A small reader: a header row, then one record per line.
//! Quote characters toggle an "inside quoted field" mode in which the
//! delimiter does not split. Rows whose field count differs from the header
//! are dropped without error.

use ahash::AHashMap;

/// One input row, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: AHashMap<String, String>,
}

impl RawRecord {
    /// Build a record from `(column, value)` pairs
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Field value, or `None` when the column is absent or blank
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Result of parsing one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub records: Vec<RawRecord>,
    /// Rows rejected for a field-count mismatch
    pub dropped_rows: usize,
}

/// Splits delimited text into records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordParser {
    delimiter: char,
    quote: char,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
        }
    }
}

impl RecordParser {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Parse a whole file. Pure function of `text`.
    pub fn parse(&self, text: &str) -> ParsedTable {
        let mut lines = text.trim().lines();

        let headers: Vec<String> = match lines.next() {
            Some(line) => self.split_fields(line).into_iter().map(|h| self.clean(&h)).collect(),
            None => return ParsedTable::default(),
        };
        if headers.len() == 1 && headers[0].is_empty() {
            return ParsedTable::default();
        }

        let mut records = Vec::new();
        let mut dropped_rows = 0;

        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let values = self.split_fields(line);
            if values.len() != headers.len() {
                // header is line 1
                tracing::debug!(
                    line = line_no + 2,
                    expected = headers.len(),
                    found = values.len(),
                    "Dropping malformed row"
                );
                dropped_rows += 1;
                continue;
            }

            let record = RawRecord::from_pairs(
                headers
                    .iter()
                    .cloned()
                    .zip(values.iter().map(|v| self.clean(v))),
            );
            records.push(record);
        }

        ParsedTable {
            headers,
            records,
            dropped_rows,
        }
    }

    /// Split one line into raw fields, honoring quotes
    pub fn split_fields(&self, line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;

        for ch in line.trim_end_matches('\r').chars() {
            if ch == self.quote {
                in_quotes = !in_quotes;
            } else if ch == self.delimiter && !in_quotes {
                fields.push(std::mem::take(&mut current));
            } else {
                current.push(ch);
            }
        }
        fields.push(current);
        fields
    }

    fn clean(&self, value: &str) -> String {
        value.trim().replace(self.quote, "")
    }
}
