//! Thread-local working sets for parallel training.
//!
//! A [`NetworkWorkingSet`] mirrors every layer of one [`Network`] with private value,
//! error and bias buffers. Any number of working sets can run forward and backward
//! passes against the same `&Network` at once: they only read the canonical weights.
//! [`NetworkWorkingSet::feed_back`] is the single write into shared state; it adds the
//! working set's signals into the canonical accumulators under each layer's lock.
//!
//! Typical per-sample protocol on a worker:
//!
//! ```rust
//! use tile_scaler::{Activation, NetworkBuilder};
//!
//! # fn main() -> tile_scaler::Result<()> {
//! let mut net = NetworkBuilder::new(2, 1)?
//!     .hidden_layers(4, 1)?
//!     .activation(Activation::Sigmoid)
//!     .learning_rate(0.5)?
//!     .init_range(-0.5, 0.5)?
//!     .build_with_seed(0)?;
//!
//! let mut ws = net.working_set();
//! ws.fetch_bias(&net)?;
//! ws.push_input(&[0.3, 0.7])?;
//! ws.push_target(&[1.0])?;
//! ws.forward(&net)?;
//! ws.backward(&net)?;
//! ws.feed_back(&net)?;
//!
//! // End of the mini-batch, back on the coordinating thread.
//! net.compute_average(1);
//! net.update_weights();
//! net.clear_accumulators();
//! # Ok(())
//! # }
//! ```

use crate::error::expect_len;
use crate::propagate::{backward_layer, forward_layer, softmax};
use crate::{Error, Layer, LayerSlot, Network, NetworkId, Result, loss};

/// Private buffers for one canonical layer.
///
/// The association with the layer is by `(NetworkId, LayerSlot)`; weights are looked up
/// through the network on every pass.
#[derive(Debug, Clone)]
pub struct LayerWorkingSet {
    network: NetworkId,
    slot: LayerSlot,
    neuron_count: usize,
    prev_count: usize,
    bias: f32,
    value: Vec<f32>,
    error: Vec<f32>,
}

impl LayerWorkingSet {
    fn bind(network: NetworkId, slot: LayerSlot, layer: &Layer) -> Self {
        Self {
            network,
            slot,
            neuron_count: layer.neuron_count(),
            prev_count: layer.prev_count(),
            bias: layer.bias(),
            value: vec![0.0; layer.neuron_count()],
            error: vec![0.0; layer.neuron_count()],
        }
    }

    #[inline]
    pub fn slot(&self) -> LayerSlot {
        self.slot
    }

    /// Bias snapshot used by the current pass.
    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    #[inline]
    pub fn value(&self) -> &[f32] {
        &self.value
    }

    #[inline]
    pub fn error(&self) -> &[f32] {
        &self.error
    }

    /// Look up the canonical layer this working set is bound to.
    fn source<'n>(&self, network: &'n Network) -> Result<&'n Layer> {
        if self.network != network.id() {
            return Err(Error::BindingMismatch(format!(
                "{:?} working set belongs to {:?}, used with {:?}",
                self.slot,
                self.network,
                network.id()
            )));
        }
        let layer = network.layer(self.slot).ok_or_else(|| {
            Error::BindingMismatch(format!("{:?} does not exist in the network", self.slot))
        })?;
        if layer.neuron_count() != self.neuron_count || layer.prev_count() != self.prev_count {
            return Err(Error::BindingMismatch(format!(
                "{:?} shape changed from {}x{} to {}x{}",
                self.slot,
                self.neuron_count,
                self.prev_count,
                layer.neuron_count(),
                layer.prev_count()
            )));
        }
        Ok(layer)
    }

    /// Add value and error into the canonical layer while holding its lock.
    fn feed_back(&self, layer: &Layer) {
        let mut signals = layer.lock_signals();
        for (acc, &v) in signals.value.iter_mut().zip(&self.value) {
            *acc += v;
        }
        for (acc, &e) in signals.error.iter_mut().zip(&self.error) {
            *acc += e;
        }
    }
}

/// One [`LayerWorkingSet`] per layer of a [`Network`], plus a private target buffer.
#[derive(Debug, Clone)]
pub struct NetworkWorkingSet {
    network: NetworkId,
    input: LayerWorkingSet,
    hidden: Vec<LayerWorkingSet>,
    output: LayerWorkingSet,
    target: Vec<f32>,
}

impl NetworkWorkingSet {
    pub fn new(network: &Network) -> Self {
        let id = network.id();
        let hidden = network
            .hidden_layers()
            .iter()
            .enumerate()
            .map(|(i, l)| LayerWorkingSet::bind(id, LayerSlot::Hidden(i), l))
            .collect();

        Self {
            network: id,
            input: LayerWorkingSet::bind(id, LayerSlot::Input, network.input_layer()),
            hidden,
            output: LayerWorkingSet::bind(id, LayerSlot::Output, network.output_layer()),
            target: vec![0.0; network.output_count()],
        }
    }

    #[inline]
    pub fn network_id(&self) -> NetworkId {
        self.network
    }

    pub fn layer(&self, slot: LayerSlot) -> Option<&LayerWorkingSet> {
        match slot {
            LayerSlot::Input => Some(&self.input),
            LayerSlot::Hidden(i) => self.hidden.get(i),
            LayerSlot::Output => Some(&self.output),
        }
    }

    /// Output values of the most recent forward pass.
    #[inline]
    pub fn output(&self) -> &[f32] {
        &self.output.value
    }

    #[inline]
    pub fn target(&self) -> &[f32] {
        &self.target
    }

    /// Check that every layer binding still matches `network`.
    pub fn validate(&self, network: &Network) -> Result<()> {
        if self.network != network.id() {
            return Err(Error::BindingMismatch(format!(
                "working set belongs to {:?}, used with {:?}",
                self.network,
                network.id()
            )));
        }
        if self.hidden.len() != network.hidden_depth() {
            return Err(Error::BindingMismatch(format!(
                "working set has {} hidden layers, network has {}",
                self.hidden.len(),
                network.hidden_depth()
            )));
        }
        for ws in self.layers() {
            ws.source(network)?;
        }
        Ok(())
    }

    fn layers(&self) -> impl Iterator<Item = &LayerWorkingSet> {
        std::iter::once(&self.input)
            .chain(self.hidden.iter())
            .chain(std::iter::once(&self.output))
    }

    /// Snapshot the canonical biases for the next pass.
    pub fn fetch_bias(&mut self, network: &Network) -> Result<()> {
        self.validate(network)?;
        for (ws, layer) in self.hidden.iter_mut().zip(network.hidden_layers()) {
            ws.bias = layer.bias();
        }
        self.output.bias = network.output_layer().bias();
        Ok(())
    }

    pub fn push_input(&mut self, data: &[f32]) -> Result<()> {
        expect_len("input", data.len(), self.input.neuron_count)?;
        self.input.value.copy_from_slice(data);
        Ok(())
    }

    pub fn push_target(&mut self, data: &[f32]) -> Result<()> {
        expect_len("target", data.len(), self.target.len())?;
        self.target.copy_from_slice(data);
        Ok(())
    }

    /// Forward pass over this working set's buffers, reading `network`'s weights.
    pub fn forward(&mut self, network: &Network) -> Result<()> {
        self.validate(network)?;
        let act = network.activation();
        let layers = network.hidden_layers();

        for i in 0..self.hidden.len() {
            let (before, rest) = self.hidden.split_at_mut(i);
            let prev: &[f32] = if i == 0 {
                &self.input.value
            } else {
                &before[i - 1].value
            };
            let ws = &mut rest[0];
            forward_layer(layers[i].weights(), ws.bias, prev, &mut ws.value, Some(act));
        }

        let last = self.hidden.len() - 1;
        forward_layer(
            network.output_layer().weights(),
            self.output.bias,
            &self.hidden[last].value,
            &mut self.output.value,
            None,
        );
        if network.softmax_output() {
            softmax(&mut self.output.value);
        }
        Ok(())
    }

    /// Output error and hidden error recurrence over this working set's buffers.
    pub fn backward(&mut self, network: &Network) -> Result<()> {
        self.validate(network)?;
        loss::output_error(&self.output.value, &self.target, &mut self.output.error);

        let layers = network.hidden_layers();
        for i in (0..self.hidden.len()).rev() {
            let (current, downstream) = self.hidden.split_at_mut(i + 1);
            let (next_weights, next_error) = match downstream.first() {
                Some(next) => (layers[i + 1].weights(), next.error.as_slice()),
                None => (
                    network.output_layer().weights(),
                    self.output.error.as_slice(),
                ),
            };
            backward_layer(next_weights, next_error, &mut current[i].error);
        }
        Ok(())
    }

    /// Add this working set's values and errors into the canonical accumulators.
    ///
    /// Each layer is locked while it is added, so concurrent callers are serialized
    /// per layer.
    pub fn feed_back(&self, network: &Network) -> Result<()> {
        self.validate(network)?;
        for ws in self.layers() {
            let layer = ws.source(network)?;
            ws.feed_back(layer);
        }
        Ok(())
    }

    /// Sum of squared differences between the output and this working set's target.
    pub fn loss(&self) -> f32 {
        loss::squared_error(&self.output.value, &self.target)
    }
}
