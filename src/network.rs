use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use rand::Rng;

use crate::error::expect_len;
use crate::propagate::{backward_layer, forward_layer, softmax, update_layer};
use crate::{Activation, Error, Layer, NetworkWorkingSet, Result, loss};

/// Process-unique identity of a [`Network`], used to bind working sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId(u64);

impl NetworkId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Position of a layer inside a [`Network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerSlot {
    Input,
    Hidden(usize),
    Output,
}

/// A fully-connected network: input layer, `hidden_depth` hidden layers, output layer.
///
/// The network owns the canonical weights and signal buffers. The single-threaded
/// methods ([`Network::forward`], [`Network::backward`], [`Network::update_weights`])
/// work on those buffers directly; parallel training goes through
/// [`NetworkWorkingSet`]s that only read the weights.
#[derive(Debug)]
pub struct Network {
    id: NetworkId,
    activation: Activation,
    softmax_output: bool,
    learning_rate: f32,
    input: Layer,
    hidden: Vec<Layer>,
    output: Layer,
    target: Vec<f32>,
}

impl Network {
    /// Build a zero-initialized network.
    ///
    /// Every hidden layer has `hidden_width` neurons. Use [`crate::NetworkBuilder`] for
    /// a more readable call site and optional random initialization.
    pub fn new(
        input_count: usize,
        output_count: usize,
        hidden_width: usize,
        hidden_depth: usize,
        activation: Activation,
        learning_rate: f32,
        softmax_output: bool,
    ) -> Result<Self> {
        if input_count == 0 || output_count == 0 || hidden_width == 0 || hidden_depth == 0 {
            return Err(Error::InvalidConfig(format!(
                "neuron and layer counts must be > 0, got input={input_count} \
                 output={output_count} hidden_width={hidden_width} hidden_depth={hidden_depth}"
            )));
        }
        for (rows, cols) in [
            (hidden_width, input_count),
            (hidden_width, hidden_width),
            (output_count, hidden_width),
        ] {
            if rows.checked_mul(cols).is_none() {
                return Err(Error::InvalidConfig(format!(
                    "layer of {rows}x{cols} weights does not fit in memory"
                )));
            }
        }

        let hidden = (0..hidden_depth)
            .map(|i| Layer::new(hidden_width, if i == 0 { input_count } else { hidden_width }))
            .collect();

        let network = Self::from_parts(
            activation,
            learning_rate,
            softmax_output,
            input_count,
            hidden,
            Layer::new(output_count, hidden_width),
        )?;
        debug!(
            "built network {input_count} -> {hidden_depth}x{hidden_width} -> {output_count} \
             ({activation:?}, softmax={softmax_output})"
        );
        Ok(network)
    }

    /// Assemble a network from existing hidden and output layers.
    ///
    /// Layers must chain: the first hidden layer is fed by `input_count` neurons, every
    /// later layer by the one before it.
    pub fn from_parts(
        activation: Activation,
        learning_rate: f32,
        softmax_output: bool,
        input_count: usize,
        hidden: Vec<Layer>,
        output: Layer,
    ) -> Result<Self> {
        validate_learning_rate(learning_rate)?;
        if input_count == 0 {
            return Err(Error::InvalidConfig("input_count must be > 0".to_owned()));
        }
        if hidden.is_empty() {
            return Err(Error::InvalidConfig(
                "network must have at least one hidden layer".to_owned(),
            ));
        }

        let mut prev = input_count;
        for (i, layer) in hidden.iter().chain(std::iter::once(&output)).enumerate() {
            if layer.neuron_count() == 0 {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} must have at least one neuron"
                )));
            }
            if layer.prev_count() != prev {
                return Err(Error::InvalidConfig(format!(
                    "layer {i} prev_count {} does not match previous layer size {prev}",
                    layer.prev_count()
                )));
            }
            prev = layer.neuron_count();
        }

        let target = vec![0.0; output.neuron_count()];
        Ok(Self {
            id: NetworkId::next(),
            activation,
            softmax_output,
            learning_rate,
            input: Layer::new(input_count, 0),
            hidden,
            output,
            target,
        })
    }

    #[inline]
    pub fn id(&self) -> NetworkId {
        self.id
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.input.neuron_count()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.output.neuron_count()
    }

    /// Width of the first hidden layer.
    #[inline]
    pub fn hidden_width(&self) -> usize {
        self.hidden[0].neuron_count()
    }

    #[inline]
    pub fn hidden_depth(&self) -> usize {
        self.hidden.len()
    }

    #[inline]
    pub fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    pub fn softmax_output(&self) -> bool {
        self.softmax_output
    }

    #[inline]
    pub fn set_softmax_output(&mut self, enabled: bool) {
        self.softmax_output = enabled;
    }

    #[inline]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f32) -> Result<()> {
        validate_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    #[inline]
    pub fn input_layer(&self) -> &Layer {
        &self.input
    }

    #[inline]
    pub fn input_layer_mut(&mut self) -> &mut Layer {
        &mut self.input
    }

    #[inline]
    pub fn hidden_layers(&self) -> &[Layer] {
        &self.hidden
    }

    #[inline]
    pub fn hidden_layer_mut(&mut self, idx: usize) -> Option<&mut Layer> {
        self.hidden.get_mut(idx)
    }

    #[inline]
    pub fn output_layer(&self) -> &Layer {
        &self.output
    }

    #[inline]
    pub fn output_layer_mut(&mut self) -> &mut Layer {
        &mut self.output
    }

    pub fn layer(&self, slot: LayerSlot) -> Option<&Layer> {
        match slot {
            LayerSlot::Input => Some(&self.input),
            LayerSlot::Hidden(i) => self.hidden.get(i),
            LayerSlot::Output => Some(&self.output),
        }
    }

    /// All layers in propagation order, with their slots.
    pub fn layers(&self) -> impl Iterator<Item = (LayerSlot, &Layer)> {
        std::iter::once((LayerSlot::Input, &self.input))
            .chain(
                self.hidden
                    .iter()
                    .enumerate()
                    .map(|(i, l)| (LayerSlot::Hidden(i), l)),
            )
            .chain(std::iter::once((LayerSlot::Output, &self.output)))
    }

    pub fn layer_mut(&mut self, slot: LayerSlot) -> Option<&mut Layer> {
        match slot {
            LayerSlot::Input => Some(&mut self.input),
            LayerSlot::Hidden(i) => self.hidden.get_mut(i),
            LayerSlot::Output => Some(&mut self.output),
        }
    }

    fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        std::iter::once(&mut self.input)
            .chain(self.hidden.iter_mut())
            .chain(std::iter::once(&mut self.output))
    }

    /// Current training target.
    #[inline]
    pub fn target(&self) -> &[f32] {
        &self.target
    }

    /// Allocate a working set bound to this network.
    pub fn working_set(&self) -> NetworkWorkingSet {
        NetworkWorkingSet::new(self)
    }

    /// Randomize the weights and bias of every hidden layer and the output layer.
    pub fn randomize_all_weights(&mut self, min: f32, max: f32) -> Result<()> {
        self.randomize_all_weights_with_rng(min, max, &mut rand::thread_rng())
    }

    pub fn randomize_all_weights_with_rng<R: Rng + ?Sized>(
        &mut self,
        min: f32,
        max: f32,
        rng: &mut R,
    ) -> Result<()> {
        self.output.randomize_with_rng(min, max, rng)?;
        for layer in &mut self.hidden {
            layer.randomize_with_rng(min, max, rng)?;
        }
        Ok(())
    }

    pub fn set_all_weights(&mut self, weight: f32) {
        for layer in self.layers_mut() {
            layer.set_all_weights(weight);
        }
    }

    pub fn push_input(&mut self, data: &[f32]) -> Result<()> {
        expect_len("input", data.len(), self.input_count())?;
        self.input.signals_mut().value.copy_from_slice(data);
        Ok(())
    }

    pub fn push_target(&mut self, data: &[f32]) -> Result<()> {
        expect_len("target", data.len(), self.output_count())?;
        self.target.copy_from_slice(data);
        Ok(())
    }

    /// One-hot target for class `label`.
    pub fn push_target_label(&mut self, label: usize) -> Result<()> {
        if label >= self.output_count() {
            return Err(Error::InvalidShape(format!(
                "label {label} out of range for {} outputs",
                self.output_count()
            )));
        }
        for (i, t) in self.target.iter_mut().enumerate() {
            *t = if i == label { 1.0 } else { 0.0 };
        }
        Ok(())
    }

    /// Forward pass over the network's own buffers.
    ///
    /// Hidden layers apply the activation to their averaged sums; the output layer only
    /// averages, then optionally applies softmax.
    pub fn forward(&mut self) {
        let act = self.activation;

        for i in 0..self.hidden.len() {
            let (before, rest) = self.hidden.split_at_mut(i);
            let prev: &[f32] = if i == 0 {
                &self.input.signals_mut().value
            } else {
                &before[i - 1].signals_mut().value
            };
            let (weights, bias, signals) = rest[0].parts_mut();
            forward_layer(weights, bias, prev, &mut signals.value, Some(act));
        }

        let last = self.hidden.len() - 1;
        let prev = &self.hidden[last].signals_mut().value;
        let (weights, bias, signals) = self.output.parts_mut();
        forward_layer(weights, bias, prev, &mut signals.value, None);
        if self.softmax_output {
            softmax(&mut signals.value);
        }
    }

    /// Output error against the current target, then the error recurrence from the last
    /// hidden layer back to the first. Weights are not touched.
    pub fn backward(&mut self) {
        {
            let s = self.output.signals_mut();
            loss::output_error(&s.value, &self.target, &mut s.error);
        }

        for i in (0..self.hidden.len()).rev() {
            let (current, downstream) = self.hidden.split_at_mut(i + 1);
            let next = downstream.first_mut().unwrap_or(&mut self.output);
            let (next_weights, _, next_signals) = next.parts_mut();
            backward_layer(
                next_weights,
                &next_signals.error,
                &mut current[i].signals_mut().error,
            );
        }
    }

    /// Apply the update rule to the output layer, then to every hidden layer in order.
    pub fn update_weights(&mut self) {
        let lr = self.learning_rate;
        let act = self.activation;

        {
            let last = self.hidden.len() - 1;
            let prev = &self.hidden[last].signals_mut().value;
            let (weights, bias, signals) = self.output.params_mut();
            update_layer(
                weights,
                bias,
                &signals.value,
                &signals.error,
                prev,
                lr,
                act,
            );
        }

        for i in 0..self.hidden.len() {
            let (before, rest) = self.hidden.split_at_mut(i);
            let prev: &[f32] = if i == 0 {
                &self.input.signals_mut().value
            } else {
                &before[i - 1].signals_mut().value
            };
            let (weights, bias, signals) = rest[0].params_mut();
            update_layer(
                weights,
                bias,
                &signals.value,
                &signals.error,
                prev,
                lr,
                act,
            );
        }
    }

    /// Sum of squared differences between the output and the current target.
    pub fn loss(&mut self) -> f32 {
        loss::squared_error(self.output.value(), &self.target)
    }

    /// Output values of the most recent forward pass.
    #[inline]
    pub fn output(&mut self) -> &[f32] {
        self.output.value()
    }

    pub fn find_largest_output(&mut self) -> usize {
        loss::argmax(self.output.value())
    }

    /// Run `input` through the network and return the index of the largest output.
    pub fn classify(&mut self, input: &[f32]) -> Result<usize> {
        self.push_input(input)?;
        self.forward();
        Ok(self.find_largest_output())
    }

    /// Shape-checked inference into a caller buffer.
    pub fn predict_into(&mut self, input: &[f32], out: &mut [f32]) -> Result<()> {
        expect_len("output buffer", out.len(), self.output_count())?;
        self.push_input(input)?;
        self.forward();
        out.copy_from_slice(self.output.value());
        Ok(())
    }

    /// Divide every layer's accumulated value and error by `count`.
    pub fn compute_average(&mut self, count: usize) {
        let n = count as f32;
        for layer in self.layers_mut() {
            let s = layer.signals_mut();
            for v in s.value.iter_mut() {
                *v /= n;
            }
            for e in s.error.iter_mut() {
                *e /= n;
            }
        }
    }

    /// Zero every layer's value and error. Weights and biases are untouched.
    pub fn clear_accumulators(&mut self) {
        for layer in self.layers_mut() {
            layer.clear_values();
        }
    }
}

impl Clone for Network {
    /// The clone owns separate weights, so it gets a fresh id and working sets bound to
    /// `self` will not bind to it.
    fn clone(&self) -> Self {
        Self {
            id: NetworkId::next(),
            activation: self.activation,
            softmax_output: self.softmax_output,
            learning_rate: self.learning_rate,
            input: self.input.clone(),
            hidden: self.hidden.clone(),
            output: self.output.clone(),
            target: self.target.clone(),
        }
    }
}

fn validate_learning_rate(lr: f32) -> Result<()> {
    if !(lr.is_finite() && lr >= 0.0) {
        return Err(Error::InvalidConfig(format!(
            "learning rate must be finite and >= 0, got {lr}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!((a - b).abs() <= tol, "a={a} b={b}");
    }

    fn two_hidden() -> Network {
        Network::new(2, 2, 3, 2, Activation::Linear, 0.0, false).unwrap()
    }

    #[test]
    fn rejects_invalid_configuration() {
        let act = Activation::Sigmoid;
        assert!(Network::new(0, 2, 3, 1, act, 0.1, false).is_err());
        assert!(Network::new(2, 0, 3, 1, act, 0.1, false).is_err());
        assert!(Network::new(2, 2, 0, 1, act, 0.1, false).is_err());
        assert!(Network::new(2, 2, 3, 0, act, 0.1, false).is_err());
        assert!(Network::new(2, 2, 3, 1, act, -0.1, false).is_err());
        assert!(Network::new(2, 2, 3, 1, act, f32::NAN, false).is_err());
        assert!(Network::new(2, 2, 3, 1, act, 0.0, false).is_ok());
    }

    #[test]
    fn rejects_weight_counts_that_overflow() {
        let act = Activation::Linear;
        let wide = usize::MAX / 2 + 1;
        for net in [
            Network::new(2, 1, wide, 1, act, 0.0, false),
            Network::new(wide, 1, 2, 1, act, 0.0, false),
            Network::new(1, wide, 2, 1, act, 0.0, false),
        ] {
            assert!(matches!(net, Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn topology_matches_counts() {
        let net = Network::new(4, 2, 5, 3, Activation::ReLU, 0.1, false).unwrap();
        assert_eq!(net.input_layer().prev_count(), 0);
        assert_eq!(net.hidden_layers()[0].prev_count(), 4);
        assert_eq!(net.hidden_layers()[1].prev_count(), 5);
        assert_eq!(net.hidden_layers()[2].prev_count(), 5);
        assert_eq!(net.output_layer().prev_count(), 5);
        assert_eq!(net.output_count(), 2);
        assert_eq!(net.target().len(), 2);
    }

    #[test]
    fn from_parts_rejects_broken_chain() {
        let hidden = vec![Layer::new(3, 2), Layer::new(3, 4)];
        let out = Layer::new(1, 3);
        assert!(Network::from_parts(Activation::Linear, 0.0, false, 2, hidden, out).is_err());

        let hidden = vec![Layer::new(3, 2)];
        let out = Layer::new(1, 4);
        assert!(Network::from_parts(Activation::Linear, 0.0, false, 2, hidden, out).is_err());
    }

    #[test]
    fn push_rejects_wrong_lengths() {
        let mut net = two_hidden();
        assert!(net.push_input(&[1.0]).is_err());
        assert!(net.push_target(&[1.0, 2.0, 3.0]).is_err());
        assert!(net.push_target_label(2).is_err());
        net.push_target_label(1).unwrap();
        assert_eq!(net.target(), &[0.0, 1.0]);
    }

    #[test]
    fn forward_is_deterministic() {
        let mut net = Network::new(3, 2, 4, 2, Activation::Sigmoid, 0.1, false).unwrap();
        net.randomize_all_weights(-1.0, 1.0).unwrap();
        net.push_input(&[0.2, -0.4, 0.9]).unwrap();

        net.forward();
        let first = net.output().to_vec();
        net.forward();
        let second = net.output().to_vec();
        assert_eq!(
            first.iter().map(|v| v.to_bits()).collect::<Vec<_>>(),
            second.iter().map(|v| v.to_bits()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn softmax_output_sums_to_one() {
        let mut net = Network::new(3, 5, 4, 1, Activation::LeakyReLU, 0.1, true).unwrap();
        net.randomize_all_weights(-3.0, 3.0).unwrap();
        net.push_input(&[10.0, -7.0, 3.5]).unwrap();
        net.forward();
        let sum: f32 = net.output().iter().sum();
        assert_close(sum, 1.0, 1e-5);
    }

    #[test]
    fn output_layer_skips_activation() {
        // With ReLU, a negative averaged sum would clamp to zero if the output applied it.
        let mut net = Network::new(1, 1, 1, 1, Activation::ReLU, 0.0, false).unwrap();
        net.set_all_weights(1.0);
        net.output_layer_mut().set_bias(-5.0);
        net.push_input(&[1.0]).unwrap();
        net.forward();
        assert_close(net.output()[0], -4.0, 1e-6);
    }

    #[test]
    fn backward_matches_manual_transpose_product() {
        let mut net = two_hidden();
        // Downstream weights for hidden[0] are hidden[1]'s; for hidden[1] the output's.
        net.hidden_layer_mut(1)
            .unwrap()
            .weights_mut()
            .copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        net.output_layer_mut()
            .weights_mut()
            .copy_from_slice(&[1.0, -1.0, 0.5, 2.0, 0.0, -2.0]);

        {
            let s = net.output_layer_mut().signals_mut();
            s.value.copy_from_slice(&[0.25, 0.75]);
        }
        net.push_target(&[1.0, 0.0]).unwrap();
        net.backward();

        // Output error = target - value.
        let out_err = [0.75_f32, -0.75];
        assert_eq!(net.output_layer_mut().error(), &out_err);

        // hidden[1].error[i] = sum_j out_err[j] * out_w[j][i]
        let w_out = [[1.0_f32, -1.0, 0.5], [2.0, 0.0, -2.0]];
        let mut h1 = [0.0_f32; 3];
        for (i, h) in h1.iter_mut().enumerate() {
            *h = out_err[0] * w_out[0][i] + out_err[1] * w_out[1][i];
        }
        let got_h1 = net.hidden_layer_mut(1).unwrap().error().to_vec();
        for i in 0..3 {
            assert_close(got_h1[i], h1[i], 1e-6);
        }

        // hidden[0].error[i] = sum_j h1[j] * w1[j][i]
        let w1 = [[1.0_f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let got_h0 = net.hidden_layer_mut(0).unwrap().error().to_vec();
        for i in 0..3 {
            let expected: f32 = (0..3).map(|j| h1[j] * w1[j][i]).sum();
            assert_close(got_h0[i], expected, 1e-5);
        }
    }

    #[test]
    fn identity_network_reproduces_one_hot_input() {
        let mut net = Network::new(4, 4, 4, 1, Activation::Linear, 0.0, false).unwrap();
        // Identity rows scaled by prev_count cancel the averaging divisor.
        for layer in [0usize, 1] {
            let l = if layer == 0 {
                net.hidden_layer_mut(0).unwrap()
            } else {
                net.output_layer_mut()
            };
            l.set_all_weights(0.0);
            for i in 0..4 {
                l[i][i] = 4.0;
            }
            l.set_bias(0.0);
        }

        net.push_input(&[1.0, 0.0, 0.0, 0.0]).unwrap();
        net.push_target(&[1.0, 0.0, 0.0, 0.0]).unwrap();
        net.forward();
        assert_eq!(net.output(), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(net.loss(), 0.0);

        // Learning rate 0 keeps parameters fixed.
        let before = net.output_layer().weights().to_vec();
        net.backward();
        net.update_weights();
        assert_eq!(net.output_layer().weights(), before.as_slice());
    }

    #[test]
    fn update_uses_derivative_at_activated_value() {
        let mut net = Network::new(1, 1, 1, 1, Activation::Sigmoid, 1.0, false).unwrap();
        net.set_all_weights(0.0);
        net.push_input(&[2.0]).unwrap();
        net.push_target(&[1.0]).unwrap();
        net.forward();
        net.backward();

        // Output value = (0 * h + 0) / 1 = 0, error = 1.
        // Output coeff = lr * s'(0) * 1 where s'(y) = y(1-y) = 0, so output weights stay.
        // Output bias += lr * s'(bias=0) * 1 = 0.
        net.update_weights();
        assert_eq!(net.output_layer().weights(), &[0.0]);
        assert_eq!(net.output_layer().bias(), 0.0);
    }

    #[test]
    fn average_then_clear_leaves_zero() {
        for n in [0usize, 1, 3, 1000] {
            let mut net = two_hidden();
            net.randomize_all_weights(-1.0, 1.0).unwrap();
            net.push_input(&[0.5, -0.5]).unwrap();
            net.push_target(&[1.0, 0.0]).unwrap();
            net.forward();
            net.backward();

            net.compute_average(n);
            net.clear_accumulators();
            for (_, layer) in net.layers() {
                let s = layer.lock_signals();
                assert!(s.value.iter().all(|&v| v == 0.0));
                assert!(s.error.iter().all(|&e| e == 0.0));
            }
        }
    }

    #[test]
    fn compute_average_divides_signals() {
        let mut net = two_hidden();
        {
            let s = net.output_layer_mut().signals_mut();
            s.value.copy_from_slice(&[4.0, 8.0]);
            s.error.copy_from_slice(&[-2.0, 6.0]);
        }
        net.compute_average(2);
        assert_eq!(net.output_layer_mut().value(), &[2.0, 4.0]);
        assert_eq!(net.output_layer_mut().error(), &[-1.0, 3.0]);
    }

    #[test]
    fn output_and_loss_read_in_one_expression() {
        let mut net = Network::new(2, 2, 2, 1, Activation::Linear, 0.0, false).unwrap();
        net.set_all_weights(1.0);
        net.push_input(&[1.0, 3.0]).unwrap();
        net.push_target(&[0.0, 0.0]).unwrap();
        net.forward();

        // Hidden = (1 + 3) / 2 = 2 per neuron, output = (2 + 2) / 2 = 2.
        let combined = net.output()[0] + net.loss();
        assert_close(combined, 2.0 + 8.0, 1e-6);
        assert_eq!(net.find_largest_output(), 0);
    }

    #[test]
    fn clone_gets_new_identity_and_same_weights() {
        let mut net = two_hidden();
        net.randomize_all_weights(-1.0, 1.0).unwrap();
        let copy = net.clone();
        assert_ne!(net.id(), copy.id());
        assert_eq!(net.output_layer().weights(), copy.output_layer().weights());
    }

    #[test]
    fn classify_returns_argmax() {
        let mut net = Network::new(2, 3, 2, 1, Activation::Linear, 0.0, false).unwrap();
        net.set_all_weights(0.0);
        net.output_layer_mut()[2].copy_from_slice(&[1.0, 1.0]);
        net.hidden_layer_mut(0).unwrap().set_all_weights(1.0);
        assert_eq!(net.classify(&[1.0, 1.0]).unwrap(), 2);

        let mut out = [0.0; 3];
        net.predict_into(&[1.0, 1.0], &mut out).unwrap();
        assert_eq!(out[0], 0.0);
        assert!(out[2] > 0.0);
        assert!(net.predict_into(&[1.0, 1.0], &mut [0.0; 2]).is_err());
    }
}
