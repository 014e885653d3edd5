use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::path::Path;

use crate::conv::{ConvLayer, PoolLayer};
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::math::Matrix;
use crate::network::config::NetConfig;
use crate::network::network::Network;

/// A dense network with a convolution/pooling front-end.
///
/// The stage chain is strictly linear: conv → pool → conv → … → conv. Each
/// pooling stage's output feeds the next convolution's input, and the final
/// convolution's output is flattened row-major into dense layer 0.
/// `backpropagate` runs the dense backward pass, reshapes the gradient
/// arriving at the dense input boundary into the last convolution's output
/// shape, and walks it back through every stage: convolutions update their
/// kernel and bias and hand back an input gradient, pooling stages route
/// through their recorded arg-max positions.
///
/// The convolutional front-end processes one sample at a time, so the
/// batch size must be 1.
pub struct ConvNet {
    pub net: Network,
    pub conv_layers: Vec<ConvLayer>,
    pub pool_layers: Vec<PoolLayer>,
    rng: StdRng,
}

impl ConvNet {
    pub fn new(dataset: Dataset, config: NetConfig) -> ConvNet {
        // Separate stream from the dense stack's so adding conv stages does
        // not shift the dense weight draws.
        let rng = StdRng::seed_from_u64(config.seed.wrapping_add(0x636f_6e76));
        ConvNet {
            net: Network::new(dataset, config),
            conv_layers: Vec::new(),
            pool_layers: Vec::new(),
            rng,
        }
    }

    pub fn from_csv<P: AsRef<Path>>(path: P, config: NetConfig) -> Result<ConvNet> {
        Ok(ConvNet {
            rng: StdRng::seed_from_u64(config.seed.wrapping_add(0x636f_6e76)),
            net: Network::from_csv(path, config)?,
            conv_layers: Vec::new(),
            pool_layers: Vec::new(),
        })
    }

    /// Appends a convolution stage for an `input_rows × input_cols` input.
    /// Impossible geometry (zero stride, oversized kernel) is rejected
    /// without touching the stage chain.
    pub fn add_conv_layer(
        &mut self,
        input_rows: usize,
        input_cols: usize,
        stride: usize,
        kernel_rows: usize,
        kernel_cols: usize,
        padding: usize,
    ) -> Result<()> {
        self.conv_layers.push(ConvLayer::new(
            input_rows,
            input_cols,
            stride,
            kernel_rows,
            kernel_cols,
            padding,
            &mut self.rng,
        )?);
        Ok(())
    }

    /// Appends a pooling stage sized against the most recent convolution's
    /// output. Pooling is paired with the convolution it follows.
    pub fn add_pool_layer(&mut self, stride: usize, kernel_rows: usize, kernel_cols: usize) -> Result<()> {
        let last = self.conv_layers.last().ok_or_else(|| Error::ShapeMismatch {
            operation: "add_pool_layer".into(),
            detail: "add a convolution stage before its pooling stage".into(),
        })?;
        self.pool_layers.push(PoolLayer::new(
            last.output.rows,
            last.output.cols,
            stride,
            kernel_rows,
            kernel_cols,
        )?);
        Ok(())
    }

    /// Appends a dense layer (see [`Network::add_layer`]).
    pub fn add_layer(&mut self, nodes: usize, activation: &str) -> Result<()> {
        self.net.add_layer(nodes, activation)
    }

    pub fn init_decay(&mut self, kind: &str, a0: f64, k: f64) {
        self.net.init_decay(kind, a0, k);
    }

    /// Wires the dense stack (pairwise weight init) and checks that the
    /// stage chain's flattened output matches dense layer 0.
    pub fn initialize(&mut self) -> Result<()> {
        if !self.conv_layers.is_empty() {
            if self.net.config().batch_size != 1 {
                return Err(Error::ShapeMismatch {
                    operation: "initialize".into(),
                    detail: "the convolutional front-end requires batch_size 1".into(),
                });
            }
            if self.pool_layers.len() + 1 < self.conv_layers.len() {
                return Err(Error::ShapeMismatch {
                    operation: "initialize".into(),
                    detail: format!(
                        "{} chained convolution stages need at least {} pooling stages",
                        self.conv_layers.len(),
                        self.conv_layers.len() - 1
                    ),
                });
            }
        }
        self.net.initialize()?;
        if let Some(last) = self.conv_layers.last() {
            let flat = last.output.rows * last.output.cols;
            if flat != self.net.input_width() {
                return Err(Error::ShapeMismatch {
                    operation: "initialize".into(),
                    detail: format!(
                        "final convolution flattens to {} values but dense layer 0 has {} nodes",
                        flat,
                        self.net.input_width()
                    ),
                });
            }
        }
        Ok(())
    }

    /// Feeds the raw sample into the first convolution stage.
    pub fn set_input(&mut self, matrix: &Matrix) -> Result<()> {
        match self.conv_layers.first_mut() {
            Some(conv) => conv.set_input(matrix),
            None => Err(Error::ShapeMismatch {
                operation: "set_input".into(),
                detail: "no convolution stage to receive input".into(),
            }),
        }
    }

    pub fn set_labels(&mut self, labels: Matrix) -> Result<()> {
        self.net.set_labels(labels)
    }

    /// Runs the conv/pool chain and flattens the final convolution's output
    /// row-major into dense layer 0.
    pub fn process(&mut self) -> Result<()> {
        let stages = self.conv_layers.len();
        if stages == 0 {
            return Err(Error::ShapeMismatch {
                operation: "process".into(),
                detail: "no convolution stages have been added".into(),
            });
        }
        for i in 0..stages - 1 {
            self.conv_layers[i].convolute();
            let pooled = {
                let pool = &mut self.pool_layers[i];
                pool.set_input(&self.conv_layers[i].output)?;
                pool.pool();
                pool.output.clone()
            };
            self.conv_layers[i + 1].set_input(&pooled)?;
        }
        self.conv_layers[stages - 1].convolute();

        let flat = self.conv_layers[stages - 1].output.flatten();
        if flat.len() != self.net.input_width() {
            return Err(Error::ShapeMismatch {
                operation: "process".into(),
                detail: format!(
                    "flattened output has {} values but dense layer 0 has {} nodes",
                    flat.len(),
                    self.net.input_width()
                ),
            });
        }
        for (c, value) in flat.into_iter().enumerate() {
            self.net.layers[0].contents.data[0][c] = value;
        }
        Ok(())
    }

    pub fn feedforward(&mut self) -> Result<()> {
        self.net.feedforward()
    }

    pub fn cost(&self) -> f64 {
        self.net.cost()
    }

    pub fn accuracy(&self) -> f64 {
        self.net.accuracy()
    }

    /// Dense backward pass, then the stage chain backward pass.
    pub fn backpropagate(&mut self) -> Result<()> {
        let boundary = self.net.backward()?;
        let stages = self.conv_layers.len();
        if stages == 0 {
            return Ok(());
        }

        let (rate, bias_rate) = self.net.effective_rates();
        let last_out = &self.conv_layers[stages - 1].output;
        if boundary.rows * boundary.cols != last_out.rows * last_out.cols {
            return Err(Error::ShapeMismatch {
                operation: "backpropagate".into(),
                detail: format!(
                    "dense boundary gradient has {} values but the final convolution output is {}x{}",
                    boundary.rows * boundary.cols,
                    last_out.rows,
                    last_out.cols
                ),
            });
        }
        let mut grad = boundary.reshape(last_out.rows, last_out.cols);

        for i in (0..stages).rev() {
            grad = self.conv_layers[i].backward(&grad, rate, bias_rate)?;
            if i > 0 {
                grad = self.pool_layers[i - 1].backward(&grad)?;
            }
        }
        Ok(())
    }

    /// Diagnostic dump: convolution/pooling stages followed by the dense
    /// stack.
    pub fn list_net(&self) -> String {
        let mut out = String::new();
        for (i, conv) in self.conv_layers.iter().enumerate() {
            let _ = writeln!(out, "----------------------\nCONVOLUTIONAL LAYER {i}\n----------------------");
            let _ = writeln!(out, "Stride: {}\nPadding: {}", conv.stride, conv.padding);
            let _ = writeln!(out, "Input ({}x{}):\n{}", conv.input.rows, conv.input.cols, conv.input);
            let _ = writeln!(out, "Kernel ({}x{}):\n{}", conv.kernel.rows, conv.kernel.cols, conv.kernel);
            let _ = writeln!(out, "Output ({}x{}):\n{}", conv.output.rows, conv.output.cols, conv.output);
            let _ = writeln!(out, "Bias: {}\n", conv.bias);
            if let Some(pool) = self.pool_layers.get(i) {
                let _ = writeln!(out, "----------------------\nPOOLING LAYER {i}\n----------------------");
                let _ = writeln!(out, "Stride: {}", pool.stride);
                let _ = writeln!(out, "Output ({}x{}):\n{}", pool.output.rows, pool.output.cols, pool.output);
            }
        }
        out.push_str(&self.net.list_net());
        out
    }
}
