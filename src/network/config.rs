/// Hyperparameters for a `Network`.
///
/// # Fields
/// - `batch_size`         — rows per mini-batch; partial trailing batches
///                          are skipped
/// - `learning_rate`      — base rate for weight updates (a0 for decay)
/// - `bias_learning_rate` — separate rate for bias updates
/// - `lambda`             — L2 weight-decay coefficient; 0 disables
/// - `momentum`           — fraction of the previous weight update carried
///                          into the next one; 0 gives plain gradient descent
/// - `train_ratio`        — fraction of rows kept for training; the rest is
///                          the validation split
/// - `decay_scales_bias`  — whether the decay schedule also scales the bias
///                          learning rate
/// - `reckless`           — disables the NaN/infinity guard in the forward
///                          pass for performance-tuned runs
/// - `seed`               — seed for weight/kernel initialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetConfig {
    pub batch_size: usize,
    pub learning_rate: f64,
    pub bias_learning_rate: f64,
    pub lambda: f64,
    pub momentum: f64,
    pub train_ratio: f64,
    pub decay_scales_bias: bool,
    pub reckless: bool,
    pub seed: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            batch_size: 1,
            learning_rate: 0.05,
            bias_learning_rate: 0.01,
            lambda: 0.0,
            momentum: 0.0,
            train_ratio: 0.9,
            decay_scales_bias: true,
            reckless: false,
            seed: 0,
        }
    }
}
