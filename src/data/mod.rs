//! Row sources for the training engine.
//!
//! The engine only needs what [`RowSource`] describes: a row count, a cursor
//! that yields `batch_size` rows at a time, and a reset. File layout concerns
//! (delimiter, label position, shuffling, train/test splitting policy) stay
//! outside the core; `load_csv` is a minimal numeric-row reader for the
//! common comma-separated case with trailing label columns.

use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::fs;
use std::path::Path;

/// Abstract readable stream of fixed-width numeric rows.
pub trait RowSource {
    /// Total number of rows available.
    fn instances(&self) -> usize;

    /// Rewinds the cursor to the first row.
    fn reset(&mut self);

    /// Yields the next `count` rows and advances the cursor, or `None` when
    /// fewer than `count` rows remain (partial batches are never yielded).
    fn read_rows(&mut self, count: usize) -> Option<Vec<Vec<f64>>>;
}

/// In-memory row source. Every row holds the input features followed by the
/// label columns; the network splits them by its own input/output widths.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Vec<f64>>,
    cursor: usize,
}

impl Dataset {
    pub fn new(rows: Vec<Vec<f64>>) -> Dataset {
        Dataset { rows, cursor: 0 }
    }

    /// Number of columns per row (0 when empty).
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    /// Splits off the first `ratio` fraction of rows as the training set,
    /// leaving the remainder as the held-out set.
    pub fn split(mut self, ratio: f64) -> (Dataset, Dataset) {
        let ratio = ratio.clamp(0.0, 1.0);
        let pivot = (self.rows.len() as f64 * ratio).round() as usize;
        let rest = self.rows.split_off(pivot.min(self.rows.len()));
        (Dataset::new(self.rows), Dataset::new(rest))
    }

    /// Shuffles row order in place.
    pub fn shuffle(&mut self, rng: &mut StdRng) {
        self.rows.shuffle(rng);
        self.cursor = 0;
    }
}

impl RowSource for Dataset {
    fn instances(&self) -> usize {
        self.rows.len()
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn read_rows(&mut self, count: usize) -> Option<Vec<Vec<f64>>> {
        if self.cursor + count > self.rows.len() {
            return None;
        }
        let batch = self.rows[self.cursor..self.cursor + count].to_vec();
        self.cursor += count;
        Some(batch)
    }
}

/// Reads a comma-separated file of numeric rows into a [`Dataset`].
///
/// Every line must parse entirely to `f64` and all rows must share one
/// width. Blank lines are skipped.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| Error::InvalidData(format!("{}: {e}", path.display())))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row: Vec<f64> = line
            .split(',')
            .map(|cell| {
                cell.trim().parse::<f64>().map_err(|_| {
                    Error::InvalidData(format!(
                        "{}: line {}: '{}' is not a number",
                        path.display(),
                        line_no + 1,
                        cell
                    ))
                })
            })
            .collect::<Result<_>>()?;
        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(Error::InvalidData(format!(
                    "{}: line {}: expected {} columns, got {}",
                    path.display(),
                    line_no + 1,
                    first.len(),
                    row.len()
                )));
            }
        }
        rows.push(row);
    }
    Ok(Dataset::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_rows_never_yields_a_partial_batch() {
        let mut data = Dataset::new(vec![vec![1.0], vec![2.0], vec![3.0]]);
        assert_eq!(data.read_rows(2).unwrap(), vec![vec![1.0], vec![2.0]]);
        assert!(data.read_rows(2).is_none());
        data.reset();
        assert!(data.read_rows(3).is_some());
    }

    #[test]
    fn shuffle_is_seed_deterministic_and_rewinds_the_cursor() {
        use rand::SeedableRng;

        let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let mut a = Dataset::new(rows.clone());
        let mut b = Dataset::new(rows.clone());
        a.read_rows(5);
        a.shuffle(&mut StdRng::seed_from_u64(11));
        b.shuffle(&mut StdRng::seed_from_u64(11));
        assert_eq!(a.rows, b.rows);
        // same rows, new order, cursor back at the top
        let mut sorted = a.rows.clone();
        sorted.sort_by(|x, y| x[0].partial_cmp(&y[0]).unwrap());
        assert_eq!(sorted, rows);
        assert_eq!(a.read_rows(20).unwrap().len(), 20);
    }

    #[test]
    fn split_respects_the_ratio() {
        let data = Dataset::new((0..10).map(|i| vec![i as f64]).collect());
        let (train, held_out) = data.split(0.7);
        assert_eq!(train.instances(), 7);
        assert_eq!(held_out.instances(), 3);
        assert_eq!(held_out.rows[0], vec![7.0]);
    }
}
