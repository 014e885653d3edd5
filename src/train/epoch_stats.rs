use serde::{Deserialize, Serialize};

/// Per-epoch training statistics emitted by `run_training`.
///
/// When a `progress_tx` channel is configured in `RunConfig`, one
/// `EpochStats` value is sent at the end of every completed epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean training cost over all full batches in this epoch.
    pub cost: f64,
    /// Mean training accuracy as a fraction in [0, 1].
    pub accuracy: f64,
    /// Mean cost over the validation split, if one exists.
    pub val_cost: Option<f64>,
    /// Mean accuracy over the validation split, if one exists.
    pub val_accuracy: Option<f64>,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
