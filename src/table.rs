use std::collections::HashMap;

use log::debug;

/// Reader over a comma-separated table held in memory.
///
/// The first line is the header; every following line is a data row. Rows
/// with fewer fields than the header are malformed and skipped silently.
/// Fields are not unquoted or unescaped: a field containing the separator
/// is not handled. This is a documented limitation of the source tables,
/// which never quote fields.
pub struct TableReader<'a> {
    text: &'a str,
    headers: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    row_cap: usize,
}

impl<'a> TableReader<'a> {
    pub fn new(text: &'a str, row_cap: usize) -> Self {
        let headers: Vec<&str> = text
            .lines()
            .next()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .collect();
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (*h, i))
            .collect();
        Self {
            text,
            headers,
            index,
            row_cap,
        }
    }

    pub fn headers(&self) -> &[&'a str] {
        &self.headers
    }

    /// Number of data lines in the blob, before the row cap or malformed
    /// row handling is applied.
    pub fn data_line_count(&self) -> usize {
        self.text.lines().count().saturating_sub(1)
    }

    /// Number of rows an iteration will actually visit.
    pub fn row_count(&self) -> usize {
        self.data_line_count().min(self.row_cap)
    }

    pub fn rows(&self) -> Rows<'a, '_> {
        Rows {
            table: self,
            lines: self.text.lines().skip(1),
            yielded: 0,
        }
    }
}

/// Borrowed view of one data row; field lookup goes through the header
/// index of the owning reader.
pub struct RawRow<'a, 't> {
    table: &'t TableReader<'a>,
    fields: Vec<&'a str>,
}

impl RawRow<'_, '_> {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.table
            .index
            .get(column)
            .map(|i| self.fields[*i].trim())
    }

    /// Numeric cell access; a missing or unparseable cell is 0, never an
    /// error.
    pub fn get_f64(&self, column: &str) -> f64 {
        self.get(column)
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}

pub struct Rows<'a, 't> {
    table: &'t TableReader<'a>,
    lines: std::iter::Skip<std::str::Lines<'a>>,
    yielded: usize,
}

impl<'a, 't> Iterator for Rows<'a, 't> {
    type Item = RawRow<'a, 't>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.yielded >= self.table.row_cap {
                return None;
            }
            let line = self.lines.next()?;
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() < self.table.headers.len() {
                debug!(
                    "skipping malformed row: {} fields, expected {}",
                    fields.len(),
                    self.table.headers.len()
                );
                continue;
            }
            self.yielded += 1;
            return Some(RawRow {
                table: self.table,
                fields,
            });
        }
    }
}
