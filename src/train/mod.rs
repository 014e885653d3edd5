pub mod decay;
pub mod epoch_stats;
pub mod runner;

pub use decay::Decay;
pub use epoch_stats::EpochStats;
pub use runner::{run_training, RunConfig};
