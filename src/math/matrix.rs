use rand::prelude::*;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Dense row-major f64 matrix.
///
/// Every layer and convolution stage owns its matrices exclusively; there is
/// no sharing between network instances. The arithmetic operator impls panic
/// on incompatible shapes — callers that can be misconfigured from the
/// outside validate shapes first and return `Error::ShapeMismatch` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        Matrix {
            rows: data.len(),
            cols: data.first().map_or(0, |row| row.len()),
            data,
        }
    }

    /// Builds a matrix from a flat row-major slice.
    pub fn from_flat(values: &[f64], rows: usize, cols: usize) -> Matrix {
        assert_eq!(values.len(), rows * cols, "flat length must equal rows*cols");
        let data = values.chunks(cols).map(|chunk| chunk.to_vec()).collect();
        Matrix { rows, cols, data }
    }

    /// Uniform random entries in the symmetric range `[-limit, limit]`.
    ///
    /// The generator is injected so weight initialization is reproducible
    /// under a fixed seed.
    pub fn uniform(rows: usize, cols: usize, limit: f64, rng: &mut StdRng) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = (rng.gen::<f64>() * 2.0 - 1.0) * limit;
            }
        }
        res
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);
        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }
        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix::from_data(
            self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        )
    }

    /// Element-wise (Hadamard) product with a same-shape matrix.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.rows, rhs.rows, "hadamard: row mismatch");
        assert_eq!(self.cols, rhs.cols, "hadamard: col mismatch");
        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(ra, rb)| ra.iter().zip(rb.iter()).map(|(x, y)| x * y).collect())
            .collect();
        Matrix::from_data(data)
    }

    /// Copies out the `height × width` block whose top-left corner is
    /// `(row, col)`.
    pub fn block(&self, row: usize, col: usize, height: usize, width: usize) -> Matrix {
        assert!(row + height <= self.rows && col + width <= self.cols, "block out of bounds");
        let mut res = Matrix::zeros(height, width);
        for i in 0..height {
            for j in 0..width {
                res.data[i][j] = self.data[row + i][col + j];
            }
        }
        res
    }

    /// Writes `src` into the block whose top-left corner is `(row, col)`.
    pub fn set_block(&mut self, row: usize, col: usize, src: &Matrix) {
        assert!(
            row + src.rows <= self.rows && col + src.cols <= self.cols,
            "set_block out of bounds"
        );
        for i in 0..src.rows {
            for j in 0..src.cols {
                self.data[row + i][col + j] = src.data[i][j];
            }
        }
    }

    /// Sum of all entries.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|row| row.iter().sum::<f64>()).sum()
    }

    /// Row-major flattening into a single vector.
    pub fn flatten(&self) -> Vec<f64> {
        self.data.iter().flat_map(|row| row.iter().copied()).collect()
    }

    /// Reinterprets the entries in row-major order as a `rows × cols` matrix.
    pub fn reshape(&self, rows: usize, cols: usize) -> Matrix {
        assert_eq!(self.rows * self.cols, rows * cols, "reshape must preserve element count");
        Matrix::from_flat(&self.flatten(), rows, cols)
    }

    /// True if any entry is NaN or infinite. Backs the overflow guard in
    /// `Network::feedforward`.
    pub fn has_non_finite(&self) -> bool {
        self.data.iter().any(|row| row.iter().any(|x| !x.is_finite()))
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.data {
            let cells: Vec<String> = row.iter().map(|x| format!("{x:>10.4}")).collect();
            writeln!(f, "{}", cells.join(" "))?;
        }
        Ok(())
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] + rhs.data[i][j];
            }
        }
        res
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] - rhs.data[i][j];
            }
        }
        res
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);
        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }
                res.data[i][j] = sum;
            }
        }
        res
    }
}
