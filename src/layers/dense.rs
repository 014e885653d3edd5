use crate::activation::Activation;
use crate::math::Matrix;
use rand::rngs::StdRng;

/// One stage of the dense stack.
///
/// A layer owns its activations (`contents`, batch × nodes), its *outgoing*
/// weight matrix (this layer's width × the next layer's width), the bias
/// added to the next layer's pre-activation, and `dz`, the activation
/// derivative cached at the pre-activation during the forward pass.
///
/// The weight matrix belongs to the source layer but is shaped by the
/// destination: `init_weights` must see the successor to size it, so
/// initialization runs pairwise from the first to the second-to-last layer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub contents: Matrix,
    pub weights: Matrix,
    pub bias: Matrix,
    pub dz: Matrix,
    /// Momentum accumulator for the outgoing weights; zero-shaped until
    /// `init_weights` runs.
    pub prev_update: Matrix,
    pub activation: Activation,
}

impl Layer {
    /// Zero-filled layer of the given shape.
    pub fn new(rows: usize, cols: usize, activation: Activation) -> Layer {
        Layer {
            contents: Matrix::zeros(rows, cols),
            weights: Matrix::default(),
            bias: Matrix::default(),
            dz: Matrix::zeros(rows, cols),
            prev_update: Matrix::default(),
            activation,
        }
    }

    /// Layer loaded with fixed content (input layer / label buffer use).
    pub fn from_values(values: &[f64], rows: usize, cols: usize, activation: Activation) -> Layer {
        let mut layer = Layer::new(rows, cols, activation);
        layer.contents = Matrix::from_flat(values, rows, cols);
        layer
    }

    /// Number of nodes (columns of `contents`).
    pub fn nodes(&self) -> usize {
        self.contents.cols
    }

    /// Batch size (rows of `contents`).
    pub fn batch_rows(&self) -> usize {
        self.contents.rows
    }

    /// Allocates the outgoing weight matrix sized against the successor and
    /// zeroes the bias. Weights are drawn uniformly from the symmetric range
    /// ±1/√fan_in to break symmetry while staying small.
    pub fn init_weights(&mut self, next: &Layer, rng: &mut StdRng) {
        let fan_in = self.nodes().max(1);
        let limit = 1.0 / (fan_in as f64).sqrt();
        self.weights = Matrix::uniform(self.nodes(), next.nodes(), limit, rng);
        self.bias = Matrix::zeros(self.batch_rows(), next.nodes());
        self.prev_update = Matrix::zeros(self.nodes(), next.nodes());
    }

    /// True once `init_weights` has run.
    pub fn weights_ready(&self) -> bool {
        self.weights.rows > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn init_weights_shapes_against_the_successor() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = Layer::new(4, 3, Activation::Linear);
        let b = Layer::new(4, 5, Activation::Sigmoid);
        a.init_weights(&b, &mut rng);
        assert_eq!((a.weights.rows, a.weights.cols), (3, 5));
        assert_eq!((a.bias.rows, a.bias.cols), (4, 5));
        assert!(a.bias.data.iter().flatten().all(|&x| x == 0.0));
        assert!(a.weights_ready());
    }

    #[test]
    fn from_values_loads_row_major_content() {
        let layer = Layer::from_values(&[1.0, 2.0, 3.0, 4.0], 2, 2, Activation::Linear);
        assert_eq!(layer.contents.data, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }
}
