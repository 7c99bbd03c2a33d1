//! ---
//! osr_section: "04-result-analysis"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Parsing and aggregation of regression test results."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
//! Labelled (test, type) x (E+, OS, tag) matrices and the aggregations on them.
//!
//! A `None` cell is a blank: no file, no value, or an undefined change.

use std::path::PathBuf;

use osr_logging::{osr_debug, LogContext};

use crate::errors::Result;
use crate::model::{ColumnKey, RowKey, TestStatus};
use crate::osw::{load_osw, parse_success, ResultRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: Vec<RowKey>,
    columns: Vec<ColumnKey>,
    cells: Vec<Vec<Option<T>>>,
}

impl<T> Matrix<T> {
    /// All-blank matrix with the given labels.
    pub fn empty(rows: Vec<RowKey>, columns: Vec<ColumnKey>) -> Self {
        let cells = rows
            .iter()
            .map(|_| columns.iter().map(|_| None).collect())
            .collect();
        Self {
            rows,
            columns,
            cells,
        }
    }

    pub fn rows(&self) -> &[RowKey] {
        &self.rows
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.cells.get(row)?.get(col)?.as_ref()
    }

    pub fn set(&mut self, row: usize, col: usize, value: Option<T>) {
        self.cells[row][col] = value;
    }

    /// Set a cell by label; unknown labels are ignored.
    pub fn set_by_key(&mut self, row: &RowKey, column: &ColumnKey, value: Option<T>) {
        let r = self.rows.iter().position(|k| k == row);
        let c = self.columns.iter().position(|k| k == column);
        if let (Some(r), Some(c)) = (r, c) {
            self.cells[r][c] = value;
        }
    }

    pub fn row_values(&self, row: usize) -> &[Option<T>] {
        &self.cells[row]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = (&RowKey, &[Option<T>])> {
        self.rows
            .iter()
            .zip(self.cells.iter().map(Vec::as_slice))
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            cells: self
                .cells
                .iter()
                .map(|row| row.iter().map(|cell| cell.as_ref().map(&mut f)).collect())
                .collect(),
        }
    }

    /// Cell-wise transformation that also sees blanks and the labels.
    pub fn try_map<U, E>(
        &self,
        mut f: impl FnMut(&RowKey, &ColumnKey, Option<&T>) -> std::result::Result<Option<U>, E>,
    ) -> std::result::Result<Matrix<U>, E> {
        let mut cells = Vec::with_capacity(self.rows.len());
        for (row, values) in self.iter_rows() {
            let mut out = Vec::with_capacity(values.len());
            for (column, value) in self.columns.iter().zip(values) {
                out.push(f(row, column, value.as_ref())?);
            }
            cells.push(out);
        }
        Ok(Matrix {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            cells,
        })
    }

    pub fn retain_rows(&mut self, mut keep: impl FnMut(&RowKey, &[Option<T>]) -> bool) {
        let cells = std::mem::take(&mut self.cells);
        let rows = std::mem::take(&mut self.rows);
        for (row, values) in rows.into_iter().zip(cells) {
            if keep(&row, &values) {
                self.rows.push(row);
                self.cells.push(values);
            }
        }
    }
}

impl<T: Clone> Matrix<T> {
    /// Consecutive row blocks of at most `size` rows, all columns kept.
    pub fn row_chunks(&self, size: usize) -> Vec<Matrix<T>> {
        let size = size.max(1);
        self.rows
            .chunks(size)
            .zip(self.cells.chunks(size))
            .map(|(rows, cells)| Matrix {
                rows: rows.to_vec(),
                columns: self.columns.clone(),
                cells: cells.to_vec(),
            })
            .collect()
    }
}

/// Parse the total site energy of every file in the matrix.
pub fn site_energy_matrix(files: &Matrix<PathBuf>) -> Result<Matrix<f64>> {
    files.try_map(|row, column, path| {
        let record = ResultRecord::from_path(path.map(PathBuf::as_path), &column.openstudio)?;
        if path.is_some() && record.total_site_energy.is_none() {
            osr_debug!(
                context = LogContext::new()
                    .with_test(&row.test)
                    .with_version(&column.openstudio),
                "no site energy for {} ({})",
                row,
                record.status
            );
        }
        Ok(record.total_site_energy)
    })
}

/// Status of every cell; blanks become [`TestStatus::Missing`].
pub fn status_matrix(files: &Matrix<PathBuf>) -> Result<Matrix<TestStatus>> {
    files.try_map(|_, column, path| match path {
        Some(path) => Ok(Some(parse_success(&load_osw(path)?, &column.openstudio))),
        None => Ok(Some(TestStatus::Missing)),
    })
}

/// Release-over-release relative change along each row.
///
/// Each present cell is compared with the last present value to its left, so
/// a run after a failed release is measured against the release before the gap.
/// Blank cells stay blank, as do cells with no earlier value or a zero one.
pub fn pct_change(values: &Matrix<f64>) -> Matrix<f64> {
    let mut out = Matrix::empty(values.rows.clone(), values.columns.clone());
    for (r, row) in values.cells.iter().enumerate() {
        let mut last: Option<f64> = None;
        for (c, cell) in row.iter().enumerate() {
            let Some(cur) = *cell else { continue };
            if let Some(prev) = last.filter(|prev| *prev != 0.0) {
                out.cells[r][c] = Some((cur - prev) / prev);
            }
            last = Some(cur);
        }
    }
    out
}

/// Rows with at least one present cell strictly above `threshold` in magnitude.
pub fn filter_rows_above(values: &Matrix<f64>, threshold: f64) -> Matrix<f64> {
    let mut out = values.clone();
    out.retain_rows(|_, cells| cells.iter().flatten().any(|v| v.abs() > threshold));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileType;

    fn columns(n: usize) -> Vec<ColumnKey> {
        (0..n)
            .map(|i| ColumnKey::new("9.0.0", format!("2.{}.0", i), None))
            .collect()
    }

    fn values(rows: Vec<Vec<Option<f64>>>) -> Matrix<f64> {
        let keys = (0..rows.len())
            .map(|i| RowKey::new(format!("test_{i}"), FileType::Rb))
            .collect();
        let n = rows.first().map(Vec::len).unwrap_or(0);
        let mut m = Matrix::empty(keys, columns(n));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, v) in row.into_iter().enumerate() {
                m.set(r, c, v);
            }
        }
        m
    }

    #[test]
    fn pct_change_follows_definition() {
        let m = values(vec![vec![Some(100.0), Some(110.0), Some(99.0)]]);
        let pct = pct_change(&m);
        assert_eq!(pct.get(0, 0), None);
        assert!((pct.get(0, 1).copied().unwrap() - 0.10).abs() < 1e-12);
        assert!((pct.get(0, 2).copied().unwrap() + 0.10).abs() < 1e-12);
    }

    #[test]
    fn pct_change_blanks_zero_denominators() {
        let m = values(vec![vec![Some(0.0), Some(5.0), Some(5.0)]]);
        let pct = pct_change(&m);
        assert_eq!(pct.get(0, 1), None);
        assert_eq!(pct.get(0, 2), Some(&0.0));
    }

    #[test]
    fn pct_change_bridges_gaps_with_last_present_value() {
        let m = values(vec![
            vec![Some(500.0), None, Some(510.0), None, None],
            vec![None, None, Some(7.0), None, Some(7.7)],
        ]);
        let pct = pct_change(&m);
        assert_eq!(pct.get(0, 1), None);
        assert!((pct.get(0, 2).copied().unwrap() - 0.02).abs() < 1e-12);
        assert_eq!(pct.get(0, 4), None);
        assert_eq!(pct.get(1, 2), None);
        assert_eq!(pct.get(1, 3), None);
        assert!((pct.get(1, 4).copied().unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn row_filter_is_strict_and_ignores_blanks() {
        let m = values(vec![
            vec![None, Some(0.01), Some(-0.002)],
            vec![None, Some(-0.0101), None],
            vec![None, None, None],
        ]);
        let kept = filter_rows_above(&m, 0.01);
        let tests: Vec<&str> = kept.rows().iter().map(|r| r.test.as_str()).collect();
        assert_eq!(tests, vec!["test_1"]);
    }

    #[test]
    fn row_chunks_split_rows_only() {
        let m = values((0..5).map(|i| vec![Some(i as f64), None]).collect());
        let chunks = m.row_chunks(2);
        assert_eq!(
            chunks.iter().map(Matrix::n_rows).collect::<Vec<_>>(),
            vec![2, 2, 1]
        );
        assert!(chunks.iter().all(|c| c.n_cols() == 2));
        assert_eq!(chunks[2].get(0, 0), Some(&4.0));
    }
}
