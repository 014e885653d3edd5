use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::Result;
use crate::network::config::NetConfig;
use crate::network::network::Network;

/// Describes one dense layer in a network specification.
///
/// The activation is stored by registry name so a spec stays plain data;
/// unknown names surface as `UnknownActivation` at build time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub nodes: usize,
    pub activation: String,
}

/// Decay schedule entry for a spec (see `Decay::from_name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecaySpec {
    pub kind: String,
    pub a0: f64,
    pub k: f64,
}

/// A serializable description of a dense architecture. Specs can be saved
/// and loaded independently of any training run, making it possible to store
/// architecture configurations before data exists. Trained weights are never
/// part of a spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the file stem.
    pub name: String,
    /// Ordered layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    /// Optional learning-rate decay schedule.
    #[serde(default)]
    pub decay: Option<DecaySpec>,
}

impl NetworkSpec {
    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> std::io::Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Instantiates an initialized network over a dataset.
    pub fn build(&self, dataset: Dataset, config: NetConfig) -> Result<Network> {
        let mut network = Network::new(dataset, config);
        for layer in &self.layers {
            network.add_layer(layer.nodes, &layer.activation)?;
        }
        if let Some(decay) = &self.decay {
            network.init_decay(&decay.kind, decay.a0, decay.k);
        }
        network.initialize()?;
        Ok(network)
    }
}
