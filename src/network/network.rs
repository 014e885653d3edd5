use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt::Write as _;
use std::path::Path;

use crate::activation::Activation;
use crate::data::{self, Dataset, RowSource};
use crate::error::{BatchStatus, Error, Result};
use crate::layers::Layer;
use crate::math::Matrix;
use crate::network::config::NetConfig;
use crate::train::decay::Decay;

/// A feedforward network trained by mini-batch gradient descent.
///
/// The expected call sequence is:
/// construct → `add_layer`(×k) → `init_decay` → `initialize` →
/// {`next_batch` → `feedforward` → `cost`/`accuracy` → `backpropagate`}* →
/// `test`. `train` drives one full epoch of that inner loop, including the
/// validation split.
///
/// Layer 0 is the input buffer (no incoming weights); the last layer is
/// compared against the label matrix. Each layer owns the weight matrix of
/// its *outgoing* edge, shaped by its successor's width.
pub struct Network {
    pub layers: Vec<Layer>,
    labels: Matrix,
    config: NetConfig,
    decay: Decay,
    data: Dataset,
    validation: Dataset,
    initialized: bool,
    epochs: usize,
    batches: usize,
    epoch_cost: f64,
    epoch_acc: f64,
    val_cost: f64,
    val_acc: f64,
    rng: StdRng,
}

impl Network {
    /// Builds an empty network over a row source. The source is split into
    /// training and validation parts by `config.train_ratio`.
    pub fn new(dataset: Dataset, config: NetConfig) -> Network {
        let (train, validation) = dataset.split(config.train_ratio);
        Network {
            layers: Vec::new(),
            labels: Matrix::default(),
            decay: Decay::Constant { a0: config.learning_rate },
            data: train,
            validation,
            initialized: false,
            epochs: 0,
            batches: 0,
            epoch_cost: 0.0,
            epoch_acc: 0.0,
            val_cost: 0.0,
            val_acc: 0.0,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Convenience constructor reading comma-separated numeric rows, with
    /// the label in the trailing columns.
    pub fn from_csv<P: AsRef<Path>>(path: P, config: NetConfig) -> Result<Network> {
        Ok(Network::new(data::load_csv(path)?, config))
    }

    /// Appends a layer of `nodes` columns using the named activation.
    /// An unrecognized name leaves the layer stack untouched.
    pub fn add_layer(&mut self, nodes: usize, activation: &str) -> Result<()> {
        let activation = Activation::from_name(activation)?;
        self.layers.push(Layer::new(self.config.batch_size, nodes, activation));
        Ok(())
    }

    /// Selects the learning-rate decay schedule (see [`Decay::from_name`]).
    pub fn init_decay(&mut self, kind: &str, a0: f64, k: f64) {
        self.decay = Decay::from_name(kind, a0, k);
    }

    /// Allocates weights pairwise across the stack (layer i sized against
    /// layer i+1) and the label matrix. Safe to call twice: the second call
    /// is a no-op, so weights are never re-allocated behind a trained run.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        if self.config.batch_size == 0 {
            return Err(Error::ShapeMismatch {
                operation: "initialize".into(),
                detail: "batch_size must be at least 1".into(),
            });
        }
        if self.layers.len() < 2 {
            return Err(Error::ShapeMismatch {
                operation: "initialize".into(),
                detail: format!(
                    "a network needs an input and an output layer, found {}",
                    self.layers.len()
                ),
            });
        }
        let expected_width = self.input_width() + self.output_width();
        if self.data.instances() > 0 && self.data.width() != expected_width {
            return Err(Error::ShapeMismatch {
                operation: "initialize".into(),
                detail: format!(
                    "data rows have {} columns, network expects {} features + {} labels",
                    self.data.width(),
                    self.input_width(),
                    self.output_width()
                ),
            });
        }
        for i in 0..self.layers.len() - 1 {
            let (head, tail) = self.layers.split_at_mut(i + 1);
            head[i].init_weights(&tail[0], &mut self.rng);
        }
        self.labels = Matrix::zeros(self.config.batch_size, self.output_width());
        self.initialized = true;
        Ok(())
    }

    /// Replaces one layer's activation with a caller-supplied pair.
    /// The derivative must be expressed at the pre-activation value.
    pub fn set_activation(
        &mut self,
        index: usize,
        function: fn(f64) -> f64,
        derivative: fn(f64) -> f64,
    ) {
        assert!(index < self.layers.len(), "layer index {index} out of range");
        self.layers[index].activation = Activation::Custom { function, derivative };
    }

    /// Overwrites the label matrix directly, for callers that feed the input
    /// buffer themselves instead of going through a row source.
    pub fn set_labels(&mut self, labels: Matrix) -> Result<()> {
        if labels.rows != self.labels.rows || labels.cols != self.labels.cols {
            return Err(Error::ShapeMismatch {
                operation: "set_labels".into(),
                detail: format!(
                    "expected {}x{} labels, got {}x{}",
                    self.labels.rows, self.labels.cols, labels.rows, labels.cols
                ),
            });
        }
        self.labels = labels;
        Ok(())
    }

    /// Forward pass: `contents[i] = act_i(contents[i-1]·weights[i-1] +
    /// bias[i-1])`, caching `dz[i]` at the pre-activation along the way.
    /// Any NaN or infinity aborts with `NumericOverflow` unless the config's
    /// `reckless` flag is set.
    pub fn feedforward(&mut self) -> Result<()> {
        self.require_initialized("feedforward")?;

        let act0 = self.layers[0].activation.clone();
        self.layers[0].dz = self.layers[0].contents.map(|x| act0.derivative(x));

        for i in 1..self.layers.len() {
            let z = self.layers[i - 1].contents.clone() * self.layers[i - 1].weights.clone()
                + self.layers[i - 1].bias.clone();
            let act = self.layers[i].activation.clone();
            self.layers[i].contents = z.map(|x| act.function(x));
            self.layers[i].dz = z.map(|x| act.derivative(x));
            if !self.config.reckless
                && (self.layers[i].contents.has_non_finite() || self.layers[i].dz.has_non_finite())
            {
                return Err(Error::NumericOverflow(format!("feedforward (layer {i})")));
            }
        }
        Ok(())
    }

    /// Mean squared error between the output layer and the labels, averaged
    /// over every cell of the batch.
    pub fn cost(&self) -> f64 {
        let out = &self.layers[self.layers.len() - 1].contents;
        let mut sum = 0.0;
        for i in 0..out.rows {
            for j in 0..out.cols {
                let diff = out.data[i][j] - self.labels.data[i][j];
                sum += diff * diff;
            }
        }
        sum / (out.rows * out.cols) as f64
    }

    /// Fraction of batch rows whose predicted class matches the label:
    /// argmax for multi-column outputs, a 0.5 threshold for single-column.
    pub fn accuracy(&self) -> f64 {
        let out = &self.layers[self.layers.len() - 1].contents;
        let mut correct = 0usize;
        for i in 0..out.rows {
            let hit = if out.cols == 1 {
                (out.data[i][0] >= 0.5) == (self.labels.data[i][0] >= 0.5)
            } else {
                argmax(&out.data[i]) == argmax(&self.labels.data[i])
            };
            if hit {
                correct += 1;
            }
        }
        correct as f64 / out.rows as f64
    }

    /// Backward pass with in-place weight and bias updates.
    pub fn backpropagate(&mut self) -> Result<()> {
        self.backward()?;
        Ok(())
    }

    /// Backward pass core. Captures every gradient and delta from the
    /// pre-update snapshot of the stack, then applies all updates; no update
    /// observes a partially-updated stack. Returns the gradient at the
    /// input boundary (`(g_1 · weights_0ᵀ) ⊙ dZ_0`) for convolutional
    /// front-ends to consume.
    pub(crate) fn backward(&mut self) -> Result<Matrix> {
        self.require_initialized("backpropagate")?;
        let l = self.layers.len();
        let out = &self.layers[l - 1].contents;
        if out.rows != self.labels.rows || out.cols != self.labels.cols {
            return Err(Error::ShapeMismatch {
                operation: "backpropagate".into(),
                detail: format!(
                    "output is {}x{} but labels are {}x{}",
                    out.rows, out.cols, self.labels.rows, self.labels.cols
                ),
            });
        }

        // gradients[j] lives at layer l-1-j; deltas[j] belongs to the edge
        // out of layer l-2-j.
        let mut gradients: Vec<Matrix> = Vec::with_capacity(l - 1);
        let mut deltas: Vec<Matrix> = Vec::with_capacity(l - 1);

        let error = self.layers[l - 1].contents.clone() - self.labels.clone();
        gradients.push(error.hadamard(&self.layers[l - 1].dz));
        deltas.push(self.layers[l - 2].contents.transpose() * gradients[0].clone());

        for i in (1..l - 1).rev() {
            let g = (gradients.last().unwrap().clone() * self.layers[i].weights.transpose())
                .hadamard(&self.layers[i].dz);
            deltas.push(self.layers[i - 1].contents.transpose() * g.clone());
            gradients.push(g);
        }

        let input_grad = (gradients.last().unwrap().clone()
            * self.layers[0].weights.transpose())
        .hadamard(&self.layers[0].dz);

        let (rate, bias_rate) = self.effective_rates();

        for (j, (delta, grad)) in deltas.iter().zip(gradients.iter()).enumerate() {
            let i = l - 2 - j;
            let mut update = delta.map(|x| x * rate);
            if self.config.lambda != 0.0 {
                let ridge = self.layers[i].weights.map(|x| x * rate * self.config.lambda);
                update = update + ridge;
            }
            if self.config.momentum != 0.0 {
                let carried = self.layers[i].prev_update.map(|x| x * self.config.momentum);
                update = update + carried;
            }
            self.layers[i].weights = self.layers[i].weights.clone() - update.clone();
            self.layers[i].prev_update = update;
            self.layers[i].bias =
                self.layers[i].bias.clone() - grad.map(|x| x * bias_rate);
        }

        Ok(input_grad)
    }

    /// Rewinds the training cursor to the first row.
    pub fn reset_cursor(&mut self) {
        self.data.reset();
    }

    /// Advances the cursor by `batch_size` rows, refilling the input layer
    /// and the label matrix. Returns `BatchStatus::Exhausted` when fewer
    /// than a full batch remains.
    pub fn next_batch(&mut self) -> Result<BatchStatus> {
        self.require_initialized("next_batch")?;
        let rows = match self.data.read_rows(self.config.batch_size) {
            Some(rows) => rows,
            None => return Ok(BatchStatus::Exhausted),
        };
        self.load_batch(&rows)?;
        self.batches += 1;
        Ok(BatchStatus::Consumed(rows.len()))
    }

    /// One full epoch: for every full batch, forward → cost/accuracy →
    /// backward, then the validation split is evaluated with the updated
    /// weights. Metrics land in the epoch/validation accessors.
    pub fn train(&mut self) -> Result<()> {
        self.require_initialized("train")?;
        self.data.reset();

        let mut cost_sum = 0.0;
        let mut acc_sum = 0.0;
        let mut n = 0usize;
        loop {
            match self.next_batch()? {
                BatchStatus::Exhausted => break,
                BatchStatus::Consumed(_) => {
                    self.feedforward()?;
                    cost_sum += self.cost();
                    acc_sum += self.accuracy();
                    self.backpropagate()?;
                    n += 1;
                }
            }
        }
        if n == 0 {
            return Err(Error::DataExhausted);
        }
        self.epoch_cost = cost_sum / n as f64;
        self.epoch_acc = acc_sum / n as f64;

        if self.validation.instances() >= self.config.batch_size {
            let mut held_out = std::mem::take(&mut self.validation);
            let result = self.evaluate(&mut held_out);
            self.validation = held_out;
            let (cost, acc) = result?;
            self.val_cost = cost;
            self.val_acc = acc;
        }

        self.epochs += 1;
        Ok(())
    }

    /// Loads an independent dataset through the same row contract and
    /// reports (cost, accuracy) without touching trained parameters.
    pub fn test<P: AsRef<Path>>(&mut self, path: P) -> Result<(f64, f64)> {
        let mut held_out = data::load_csv(path)?;
        self.evaluate(&mut held_out)
    }

    /// Forward-only sweep over a row source; mean (cost, accuracy) over its
    /// full batches. Weights and biases are left untouched.
    pub fn evaluate(&mut self, source: &mut dyn RowSource) -> Result<(f64, f64)> {
        self.require_initialized("evaluate")?;
        source.reset();
        let mut cost_sum = 0.0;
        let mut acc_sum = 0.0;
        let mut n = 0usize;
        while let Some(rows) = source.read_rows(self.config.batch_size) {
            self.load_batch(&rows)?;
            self.feedforward()?;
            cost_sum += self.cost();
            acc_sum += self.accuracy();
            n += 1;
        }
        if n == 0 {
            return Err(Error::DataExhausted);
        }
        Ok((cost_sum / n as f64, acc_sum / n as f64))
    }

    /// Diagnostic dump of every layer's shapes, values, and activation name.
    pub fn list_net(&self) -> String {
        let mut out = String::new();
        for (i, layer) in self.layers.iter().enumerate() {
            let role = if i == 0 {
                "INPUT LAYER"
            } else if i == self.layers.len() - 1 {
                "OUTPUT LAYER"
            } else {
                "LAYER"
            };
            let _ = writeln!(out, "----------------------\n{role} {i}\n----------------------");
            let _ = writeln!(out, "Activation: {}", layer.activation.name());
            let _ = writeln!(
                out,
                "Contents ({}x{}):\n{}",
                layer.contents.rows, layer.contents.cols, layer.contents
            );
            if layer.weights_ready() {
                let _ = writeln!(
                    out,
                    "Weights ({}x{}):\n{}",
                    layer.weights.rows, layer.weights.cols, layer.weights
                );
                let _ = writeln!(
                    out,
                    "Bias ({}x{}):\n{}",
                    layer.bias.rows, layer.bias.cols, layer.bias
                );
            }
        }
        out
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn epoch_cost(&self) -> f64 {
        self.epoch_cost
    }

    pub fn epoch_accuracy(&self) -> f64 {
        self.epoch_acc
    }

    pub fn val_cost(&self) -> f64 {
        self.val_cost
    }

    pub fn val_accuracy(&self) -> f64 {
        self.val_acc
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn instances(&self) -> usize {
        self.data.instances()
    }

    pub fn validation_instances(&self) -> usize {
        self.validation.instances()
    }

    pub fn labels(&self) -> &Matrix {
        &self.labels
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn input_width(&self) -> usize {
        self.layers.first().map_or(0, Layer::nodes)
    }

    pub fn output_width(&self) -> usize {
        self.layers.last().map_or(0, Layer::nodes)
    }

    // ── Internals ──────────────────────────────────────────────────────────

    /// Decayed (weight rate, bias rate) for the current step counter. The
    /// bias rate follows the schedule only when `decay_scales_bias` is set.
    pub(crate) fn effective_rates(&self) -> (f64, f64) {
        let rate = self.decay.rate(self.epochs);
        let bias_rate = if self.config.decay_scales_bias {
            self.config.bias_learning_rate * self.decay.factor(self.epochs)
        } else {
            self.config.bias_learning_rate
        };
        (rate, bias_rate)
    }

    fn require_initialized(&self, operation: &str) -> Result<()> {
        if !self.initialized {
            return Err(Error::ShapeMismatch {
                operation: operation.into(),
                detail: "initialize() has not been called".into(),
            });
        }
        Ok(())
    }

    /// Splits each row into features (input width, from the front) and label
    /// (output width, from the back) and writes them into layer 0 and the
    /// label matrix.
    fn load_batch(&mut self, rows: &[Vec<f64>]) -> Result<()> {
        let in_w = self.input_width();
        let out_w = self.output_width();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != in_w + out_w {
                return Err(Error::ShapeMismatch {
                    operation: "next_batch".into(),
                    detail: format!(
                        "row has {} columns, network expects {} features + {} labels",
                        row.len(),
                        in_w,
                        out_w
                    ),
                });
            }
            for c in 0..in_w {
                self.layers[0].contents.data[r][c] = row[c];
            }
            for c in 0..out_w {
                self.labels.data[r][c] = row[in_w + c];
            }
        }
        Ok(())
    }
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
