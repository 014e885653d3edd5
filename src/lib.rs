pub mod activation;
pub mod conv;
pub mod data;
pub mod error;
pub mod layers;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::activation::Activation;
pub use conv::{ConvLayer, PoolLayer};
pub use data::{Dataset, RowSource};
pub use error::{BatchStatus, Error, Result};
pub use layers::dense::Layer;
pub use math::matrix::Matrix;
pub use network::{ConvNet, NetConfig, Network, NetworkSpec};
pub use train::{run_training, Decay, EpochStats, RunConfig};
