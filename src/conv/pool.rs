use crate::error::{Error, Result};
use crate::math::Matrix;

/// Max-pooling reducer.
///
/// Shares the convolution stage's shape contract — the window slides by
/// `stride` over the input and each window reduces to a single output cell —
/// but performs a max-reduction and has no trainable parameters. Pooling
/// records, per output cell, which input coordinate produced the maximum so
/// `backward` can route gradient to exactly that cell.
#[derive(Debug, Clone)]
pub struct PoolLayer {
    pub stride: usize,
    pub input: Matrix,
    pub output: Matrix,
    kernel_rows: usize,
    kernel_cols: usize,
    /// Arg-max source coordinate for each output cell, filled by `pool`.
    argmax: Vec<Vec<(usize, usize)>>,
}

impl PoolLayer {
    /// A zero stride or a window larger than the input is a `ShapeMismatch`.
    pub fn new(
        input_rows: usize,
        input_cols: usize,
        stride: usize,
        kernel_rows: usize,
        kernel_cols: usize,
    ) -> Result<PoolLayer> {
        if stride == 0 {
            return Err(Error::ShapeMismatch {
                operation: "PoolLayer::new".into(),
                detail: "stride must be at least 1".into(),
            });
        }
        if kernel_rows > input_rows || kernel_cols > input_cols {
            return Err(Error::ShapeMismatch {
                operation: "PoolLayer::new".into(),
                detail: format!(
                    "{kernel_rows}x{kernel_cols} window exceeds the {input_rows}x{input_cols} input"
                ),
            });
        }
        let out_rows = (input_rows - kernel_rows) / stride + 1;
        let out_cols = (input_cols - kernel_cols) / stride + 1;
        Ok(PoolLayer {
            stride,
            input: Matrix::zeros(input_rows, input_cols),
            output: Matrix::zeros(out_rows, out_cols),
            kernel_rows,
            kernel_cols,
            argmax: vec![vec![(0, 0); out_cols]; out_rows],
        })
    }

    pub fn set_input(&mut self, matrix: &Matrix) -> Result<()> {
        if matrix.rows != self.input.rows || matrix.cols != self.input.cols {
            return Err(Error::ShapeMismatch {
                operation: "PoolLayer::set_input".into(),
                detail: format!(
                    "expected {}x{} input, got {}x{}",
                    self.input.rows, self.input.cols, matrix.rows, matrix.cols
                ),
            });
        }
        self.input = matrix.clone();
        Ok(())
    }

    /// Max-reduces every window into its output cell and records the winning
    /// source coordinate.
    pub fn pool(&mut self) {
        for oy in 0..self.output.rows {
            for ox in 0..self.output.cols {
                let base_y = oy * self.stride;
                let base_x = ox * self.stride;
                let mut best = self.input.data[base_y][base_x];
                let mut best_at = (base_y, base_x);
                for ky in 0..self.kernel_rows {
                    for kx in 0..self.kernel_cols {
                        let v = self.input.data[base_y + ky][base_x + kx];
                        if v > best {
                            best = v;
                            best_at = (base_y + ky, base_x + kx);
                        }
                    }
                }
                self.output.data[oy][ox] = best;
                self.argmax[oy][ox] = best_at;
            }
        }
    }

    /// Scatters the output-shaped gradient back to the input cells that won
    /// their windows. Must run after `pool` so the arg-max map is current.
    pub fn backward(&self, grad: &Matrix) -> Result<Matrix> {
        if grad.rows != self.output.rows || grad.cols != self.output.cols {
            return Err(Error::ShapeMismatch {
                operation: "PoolLayer::backward".into(),
                detail: format!(
                    "expected {}x{} gradient, got {}x{}",
                    self.output.rows, self.output.cols, grad.rows, grad.cols
                ),
            });
        }
        let mut input_grad = Matrix::zeros(self.input.rows, self.input.cols);
        for oy in 0..grad.rows {
            for ox in 0..grad.cols {
                let (sy, sx) = self.argmax[oy][ox];
                input_grad.data[sy][sx] += grad.data[oy][ox];
            }
        }
        Ok(input_grad)
    }
}
