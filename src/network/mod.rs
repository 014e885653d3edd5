pub mod config;
pub mod convnet;
pub mod network;
pub mod spec;

pub use config::NetConfig;
pub use convnet::ConvNet;
pub use network::Network;
pub use spec::{DecaySpec, LayerSpec, NetworkSpec};
