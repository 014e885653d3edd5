use crate::error::{Error, Result};
use crate::math::Matrix;
use rand::rngs::StdRng;

/// A linear convolution (correlation) stage with stride and zero-padding.
///
/// The input buffer is allocated with the padding baked in: `set_input`
/// writes the caller's unpadded matrix into the interior region, leaving the
/// border at zero. `convolute` is a direct valid correlation — every
/// kernel-sized block advancing by `stride` is reduced to the sum of its
/// element-wise product with the kernel, plus a scalar bias added uniformly.
#[derive(Debug, Clone)]
pub struct ConvLayer {
    pub stride: usize,
    pub padding: usize,
    /// Padded input buffer, (rows + 2·padding) × (cols + 2·padding).
    pub input: Matrix,
    pub kernel: Matrix,
    pub output: Matrix,
    pub bias: f64,
    input_rows: usize,
    input_cols: usize,
}

/// Valid-correlation output extent: floor((input − kernel) / stride) + 1.
fn out_extent(input: usize, kernel: usize, stride: usize) -> usize {
    (input - kernel) / stride + 1
}

impl ConvLayer {
    /// Allocates the padded input buffer, a random kernel in [-1, 1], a
    /// zero output sized by the valid-correlation formula, and a zero bias.
    /// A zero stride or a kernel larger than the padded input is a
    /// `ShapeMismatch`.
    pub fn new(
        input_rows: usize,
        input_cols: usize,
        stride: usize,
        kernel_rows: usize,
        kernel_cols: usize,
        padding: usize,
        rng: &mut StdRng,
    ) -> Result<ConvLayer> {
        if stride == 0 {
            return Err(Error::ShapeMismatch {
                operation: "ConvLayer::new".into(),
                detail: "stride must be at least 1".into(),
            });
        }
        let padded_rows = input_rows + 2 * padding;
        let padded_cols = input_cols + 2 * padding;
        if kernel_rows > padded_rows || kernel_cols > padded_cols {
            return Err(Error::ShapeMismatch {
                operation: "ConvLayer::new".into(),
                detail: format!(
                    "{kernel_rows}x{kernel_cols} kernel exceeds the {padded_rows}x{padded_cols} padded input"
                ),
            });
        }
        let out_rows = out_extent(padded_rows, kernel_rows, stride);
        let out_cols = out_extent(padded_cols, kernel_cols, stride);

        Ok(ConvLayer {
            stride,
            padding,
            input: Matrix::zeros(padded_rows, padded_cols),
            kernel: Matrix::uniform(kernel_rows, kernel_cols, 1.0, rng),
            output: Matrix::zeros(out_rows, out_cols),
            bias: 0.0,
            input_rows,
            input_cols,
        })
    }

    /// Writes the caller's unpadded matrix into the padded buffer's interior,
    /// offset by `padding` on both axes.
    pub fn set_input(&mut self, matrix: &Matrix) -> Result<()> {
        if matrix.rows != self.input_rows || matrix.cols != self.input_cols {
            return Err(Error::ShapeMismatch {
                operation: "ConvLayer::set_input".into(),
                detail: format!(
                    "expected {}x{} input, got {}x{}",
                    self.input_rows, self.input_cols, matrix.rows, matrix.cols
                ),
            });
        }
        self.input.set_block(self.padding, self.padding, matrix);
        Ok(())
    }

    /// Direct correlation pass: O(output_cells × kernel_cells).
    pub fn convolute(&mut self) {
        for oy in 0..self.output.rows {
            for ox in 0..self.output.cols {
                let block = self.input.block(
                    oy * self.stride,
                    ox * self.stride,
                    self.kernel.rows,
                    self.kernel.cols,
                );
                self.output.data[oy][ox] = self.kernel.hadamard(&block).sum() + self.bias;
            }
        }
    }

    /// Backward contract for one stage: consumes the gradient at this
    /// stage's output, updates the kernel (correlation of the gradient with
    /// each kernel-aligned input block, scaled by `rate`) and the bias (the
    /// gradient's total sum, scaled by `bias_rate`), and returns the
    /// gradient with respect to this stage's *unpadded* input.
    pub fn backward(&mut self, grad: &Matrix, rate: f64, bias_rate: f64) -> Result<Matrix> {
        if grad.rows != self.output.rows || grad.cols != self.output.cols {
            return Err(Error::ShapeMismatch {
                operation: "ConvLayer::backward".into(),
                detail: format!(
                    "expected {}x{} gradient, got {}x{}",
                    self.output.rows, self.output.cols, grad.rows, grad.cols
                ),
            });
        }

        let mut kernel_grad = Matrix::zeros(self.kernel.rows, self.kernel.cols);
        let mut input_grad = Matrix::zeros(self.input.rows, self.input.cols);

        for oy in 0..grad.rows {
            for ox in 0..grad.cols {
                let g = grad.data[oy][ox];
                let base_y = oy * self.stride;
                let base_x = ox * self.stride;
                for ky in 0..self.kernel.rows {
                    for kx in 0..self.kernel.cols {
                        kernel_grad.data[ky][kx] += g * self.input.data[base_y + ky][base_x + kx];
                        input_grad.data[base_y + ky][base_x + kx] += g * self.kernel.data[ky][kx];
                    }
                }
            }
        }

        self.kernel = self.kernel.clone() - kernel_grad.map(|x| x * rate);
        self.bias -= bias_rate * grad.sum();

        // The padding border carries no caller data; return the interior.
        Ok(input_grad.block(self.padding, self.padding, self.input_rows, self.input_cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn output_extent_follows_the_valid_correlation_formula() {
        let mut rng = StdRng::seed_from_u64(3);
        let conv = ConvLayer::new(8, 8, 1, 4, 4, 0, &mut rng).unwrap();
        assert_eq!((conv.output.rows, conv.output.cols), (5, 5));

        let padded = ConvLayer::new(8, 8, 2, 3, 3, 1, &mut rng).unwrap();
        // (8 + 2 - 3) / 2 + 1 = 4
        assert_eq!((padded.output.rows, padded.output.cols), (4, 4));
    }

    #[test]
    fn new_rejects_impossible_geometry() {
        let mut rng = StdRng::seed_from_u64(6);
        match ConvLayer::new(2, 2, 1, 5, 5, 0, &mut rng) {
            Err(Error::ShapeMismatch { operation, detail }) => {
                assert_eq!(operation, "ConvLayer::new");
                assert!(detail.contains("5x5"));
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
        assert!(ConvLayer::new(4, 4, 0, 2, 2, 0, &mut rng).is_err());
        // Padding can make an otherwise oversized kernel fit.
        assert!(ConvLayer::new(2, 2, 1, 3, 3, 1, &mut rng).is_ok());
    }

    #[test]
    fn set_input_leaves_the_padding_border_at_zero() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut conv = ConvLayer::new(2, 2, 1, 2, 2, 1, &mut rng).unwrap();
        conv.set_input(&Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]))
            .unwrap();
        assert_eq!(conv.input.data[0], vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(conv.input.data[1][1], 1.0);
        assert_eq!(conv.input.data[2][2], 4.0);
    }

    #[test]
    fn set_input_rejects_a_wrong_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut conv = ConvLayer::new(4, 4, 1, 2, 2, 0, &mut rng).unwrap();
        assert!(conv.set_input(&Matrix::zeros(3, 4)).is_err());
    }
}
