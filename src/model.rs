//! Model serialization/deserialization (feature: `serde`).
//!
//! This module defines a versioned on-disk format for `Network`.
//!
//! - Internal `Network`/`Layer` structs are not serialized directly; signal buffers,
//!   targets and ids are runtime state and never reach the file.
//! - Deserialization validates the version, layer shapes, chaining, and that every
//!   parameter is finite. A failed load leaves no partially built network behind.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Activation, Error, Layer, Network, Result};

#[cfg(feature = "serde")]
use std::path::Path;

pub const MODEL_FORMAT_VERSION: u32 = 1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedNetwork {
    pub format_version: u32,
    pub activation: SerializedActivation,
    pub learning_rate: f32,
    pub softmax_output: bool,
    pub input_count: usize,
    pub hidden: Vec<SerializedLayer>,
    pub output: SerializedLayer,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedLayer {
    pub neuron_count: usize,
    pub prev_count: usize,
    pub bias: f32,
    /// Row-major (neuron_count, prev_count).
    pub weights: Vec<f32>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializedActivation {
    Sigmoid,
    ShiftedSigmoid,
    Relu,
    LeakyRelu,
    Linear,
}

impl From<Activation> for SerializedActivation {
    fn from(value: Activation) -> Self {
        match value {
            Activation::Sigmoid => SerializedActivation::Sigmoid,
            Activation::ShiftedSigmoid => SerializedActivation::ShiftedSigmoid,
            Activation::ReLU => SerializedActivation::Relu,
            Activation::LeakyReLU => SerializedActivation::LeakyRelu,
            Activation::Linear => SerializedActivation::Linear,
        }
    }
}

impl From<SerializedActivation> for Activation {
    fn from(value: SerializedActivation) -> Self {
        match value {
            SerializedActivation::Sigmoid => Activation::Sigmoid,
            SerializedActivation::ShiftedSigmoid => Activation::ShiftedSigmoid,
            SerializedActivation::Relu => Activation::ReLU,
            SerializedActivation::LeakyRelu => Activation::LeakyReLU,
            SerializedActivation::Linear => Activation::Linear,
        }
    }
}

impl SerializedNetwork {
    pub fn validate(&self) -> Result<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(Error::InvalidData(format!(
                "unsupported model format_version {}; expected {}",
                self.format_version, MODEL_FORMAT_VERSION
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate >= 0.0) {
            return Err(Error::InvalidData(format!(
                "learning_rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }
        if self.input_count == 0 {
            return Err(Error::InvalidData("input_count must be > 0".to_owned()));
        }
        if self.hidden.is_empty() {
            return Err(Error::InvalidData(
                "serialized network must have at least one hidden layer".to_owned(),
            ));
        }

        let mut prev = self.input_count;
        for (i, layer) in self.hidden.iter().chain([&self.output]).enumerate() {
            layer
                .validate()
                .map_err(|e| Error::InvalidData(format!("layer {i}: {e}")))?;
            if layer.prev_count != prev {
                return Err(Error::InvalidData(format!(
                    "layer {i} prev_count {} does not match previous layer size {prev}",
                    layer.prev_count
                )));
            }
            prev = layer.neuron_count;
        }

        Ok(())
    }
}

impl SerializedLayer {
    fn validate(&self) -> Result<()> {
        if self.neuron_count == 0 || self.prev_count == 0 {
            return Err(Error::InvalidData(format!(
                "layer dims must be > 0, got neuron_count={} prev_count={}",
                self.neuron_count, self.prev_count
            )));
        }

        let expected_w = self
            .neuron_count
            .checked_mul(self.prev_count)
            .ok_or_else(|| Error::InvalidData("layer weight shape overflow".to_owned()))?;
        if self.weights.len() != expected_w {
            return Err(Error::InvalidData(format!(
                "weights length {} does not match neuron_count * prev_count ({} * {})",
                self.weights.len(),
                self.neuron_count,
                self.prev_count
            )));
        }
        if !self.bias.is_finite() || self.weights.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidData(
                "parameters must contain only finite values".to_owned(),
            ));
        }

        Ok(())
    }

    fn into_layer(self) -> Result<Layer> {
        Layer::from_parts(self.neuron_count, self.prev_count, self.weights, self.bias)
    }
}

impl From<&Network> for SerializedNetwork {
    fn from(net: &Network) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            activation: net.activation().into(),
            learning_rate: net.learning_rate(),
            softmax_output: net.softmax_output(),
            input_count: net.input_count(),
            hidden: net.hidden_layers().iter().map(SerializedLayer::from).collect(),
            output: SerializedLayer::from(net.output_layer()),
        }
    }
}

impl From<&Layer> for SerializedLayer {
    fn from(layer: &Layer) -> Self {
        Self {
            neuron_count: layer.neuron_count(),
            prev_count: layer.prev_count(),
            bias: layer.bias(),
            weights: layer.weights().to_vec(),
        }
    }
}

impl TryFrom<SerializedNetwork> for Network {
    type Error = Error;

    fn try_from(value: SerializedNetwork) -> std::result::Result<Self, Self::Error> {
        value.validate()?;

        let hidden = value
            .hidden
            .into_iter()
            .map(SerializedLayer::into_layer)
            .collect::<Result<Vec<_>>>()?;
        let output = value.output.into_layer()?;

        Network::from_parts(
            value.activation.into(),
            value.learning_rate,
            value.softmax_output,
            value.input_count,
            hidden,
            output,
        )
        .map_err(|e| Error::InvalidData(format!("invalid network: {e}")))
    }
}

#[cfg(feature = "serde")]
impl Network {
    /// Serialize the network to a pretty-printed JSON string.
    pub fn to_json_string_pretty(&self) -> Result<String> {
        let ser = SerializedNetwork::from(self);
        serde_json::to_string_pretty(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    /// Serialize the network to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        let ser = SerializedNetwork::from(self);
        serde_json::to_string(&ser)
            .map_err(|e| Error::InvalidData(format!("failed to serialize network: {e}")))
    }

    /// Parse a network from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let ser: SerializedNetwork = serde_json::from_str(s)
            .map_err(|e| Error::InvalidData(format!("failed to parse network json: {e}")))?;
        ser.try_into()
    }

    /// Save the network to a JSON file (pretty-printed).
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let s = self.to_json_string_pretty()?;
        let p = path.as_ref();
        std::fs::write(p, s)
            .map_err(|e| Error::InvalidData(format!("failed to write {}: {e}", p.display())))?;
        Ok(())
    }

    /// Load a network from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = std::fs::read_to_string(p)
            .map_err(|e| Error::InvalidData(format!("failed to read {}: {e}", p.display())))?;
        Self::from_json_str(&s)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    fn small() -> Network {
        let hidden = Layer::from_parts(2, 2, vec![1.0, 2.0, 3.0, 4.0], 0.5).unwrap();
        let output = Layer::from_parts(1, 2, vec![0.25, -0.75], -1.0).unwrap();
        Network::from_parts(Activation::Sigmoid, 0.5, false, 2, vec![hidden], output).unwrap()
    }

    #[test]
    fn golden_json_is_stable_and_roundtrips() {
        let json = small().to_json_string_pretty().unwrap();

        let golden = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/golden/network_v1.json"
        ))
        .trim_end();
        assert_eq!(json, golden);

        let loaded = Network::from_json_str(golden).unwrap();
        assert_eq!(loaded.to_json_string_pretty().unwrap(), golden);
        assert_eq!(loaded.activation(), Activation::Sigmoid);
        assert_eq!(loaded.output_layer().bias(), -1.0);
    }

    #[test]
    fn loaded_network_predicts_like_the_original() {
        let mut net = Network::new(4, 3, 5, 2, Activation::ShiftedSigmoid, 0.1, true).unwrap();
        net.randomize_all_weights(-0.9, 0.9).unwrap();
        let mut loaded = Network::from_json_str(&net.to_json_string().unwrap()).unwrap();
        assert_ne!(loaded.id(), net.id());
        assert!(loaded.softmax_output());

        let input = [0.1, 0.9, -0.4, 0.3];
        let (mut a, mut b) = ([0.0; 3], [0.0; 3]);
        net.predict_into(&input, &mut a).unwrap();
        loaded.predict_into(&input, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn save_and_load_file() {
        let net = small();
        let path = std::env::temp_dir().join(format!("tile_scaler_model_{}.json", std::process::id()));
        net.save_json(&path).unwrap();
        let loaded = Network::load_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(SerializedNetwork::from(&loaded), SerializedNetwork::from(&net));

        assert!(Network::load_json(path.with_extension("missing")).is_err());
    }

    #[test]
    fn rejects_unknown_version() {
        let mut ser = SerializedNetwork::from(&small());
        ser.format_version = 999;
        let err = Network::try_from(ser).unwrap_err();
        assert!(format!("{err}").contains("format_version"));
    }

    #[test]
    fn rejects_broken_shapes_and_values() {
        let base = SerializedNetwork::from(&small());

        let mut short = base.clone();
        short.output.weights.pop();
        assert!(matches!(Network::try_from(short), Err(Error::InvalidData(_))));

        let mut unchained = base.clone();
        unchained.input_count = 3;
        assert!(matches!(Network::try_from(unchained), Err(Error::InvalidData(_))));

        let mut nan = base.clone();
        nan.hidden[0].bias = f32::NAN;
        assert!(matches!(Network::try_from(nan), Err(Error::InvalidData(_))));

        let mut no_hidden = base;
        no_hidden.hidden.clear();
        assert!(matches!(Network::try_from(no_hidden), Err(Error::InvalidData(_))));

        assert!(Network::from_json_str("{not json").is_err());
    }
}
