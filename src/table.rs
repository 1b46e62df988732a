//! Tabular output and CSV encoding
//!
//! Two layouts are supported:
//! - scalar: a single row holding every extracted value of one tag
//! - records: a header row of tag names, then one row per index pairing the
//!   i-th value of every tag
//!
//! Tables are always rectangular; [`Table::from_columns`] refuses columns of
//! unequal length rather than padding them.

use crate::error::{Error, Result};
use crate::extract::Column;

/// Rectangular table of string cells
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    /// One row equal to `values`
    pub fn single_row(values: Vec<String>) -> Self {
        Self { rows: vec![values] }
    }

    /// Header of column names followed by one row per index
    ///
    /// # Errors
    /// Returns [`Error::ShapeMismatch`] naming the first column whose length
    /// differs from the first column's. No table is produced in that case.
    pub fn from_columns(columns: &[Column]) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Ok(Self::default());
        };

        let height = first.len();
        if let Some(bad) = columns.iter().find(|c| c.len() != height) {
            return Err(Error::ShapeMismatch {
                column: bad.name.clone(),
                expected: height,
                found: bad.len(),
            });
        }

        let mut rows = Vec::with_capacity(height + 1);
        rows.push(columns.iter().map(|c| c.name.clone()).collect());
        for i in 0..height {
            rows.push(columns.iter().map(|c| c.values[i].clone()).collect());
        }
        Ok(Self { rows })
    }

    /// All rows, header included
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows, header included
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no rows at all
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of cells per row
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Encode as CSV, `\n`-terminated, quoting cells only where needed
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        if self.width() == 0 {
            // zero-cell rows are bare line terminators
            return Ok(vec![b'\n'; self.rows.len()]);
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        for row in &self.rows {
            writer.write_record(row).map_err(std::io::Error::from)?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(bytes)
    }
}
