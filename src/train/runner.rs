use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use crate::error::Result;
use crate::network::Network;
use crate::train::epoch_stats::EpochStats;

/// Configuration for a `run_training` run.
///
/// # Fields
/// - `epochs`      — total number of full passes over the training data
/// - `progress_tx` — optional channel sender; one `EpochStats` is sent per
///                   completed epoch. If the receiver is dropped the run
///                   terminates early (clean shutdown).
/// - `stop_flag`   — optional atomic flag; when set to `true` from another
///                   thread the run terminates after the current epoch.
pub struct RunConfig {
    pub epochs: usize,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl RunConfig {
    /// Minimal `RunConfig` with no progress channel and no stop flag.
    pub fn new(epochs: usize) -> Self {
        RunConfig {
            epochs,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

/// Drives `config.epochs` epochs of `Network::train` and returns the mean
/// training cost of the last completed epoch.
pub fn run_training(network: &mut Network, config: &RunConfig) -> Result<f64> {
    let mut last_cost = 0.0;

    for epoch in 1..=config.epochs {
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                break;
            }
        }

        let t_start = Instant::now();
        network.train()?;
        let elapsed_ms = t_start.elapsed().as_millis() as u64;

        last_cost = network.epoch_cost();

        let has_validation = network.validation_instances() > 0;
        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            cost: network.epoch_cost(),
            accuracy: network.epoch_accuracy(),
            val_cost: has_validation.then(|| network.val_cost()),
            val_accuracy: has_validation.then(|| network.val_accuracy()),
            elapsed_ms,
        };

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                break;
            }
        }
    }

    Ok(last_cost)
}
