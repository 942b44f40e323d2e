use std::ops::{Index, IndexMut};

use parking_lot::{Mutex, MutexGuard};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::{Error, Result};

/// Per-neuron signals of a layer: activations and backpropagated error.
///
/// In batched training these double as accumulators: working sets add their
/// per-sample signals into them and the network averages them before updating.
#[derive(Debug, Clone, PartialEq)]
pub struct Signals {
    pub value: Vec<f32>,
    pub error: Vec<f32>,
}

impl Signals {
    fn zeros(len: usize) -> Self {
        Self {
            value: vec![0.0; len],
            error: vec![0.0; len],
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.value.fill(0.0);
        self.error.fill(0.0);
    }
}

/// One fully-connected stage of the network.
///
/// The layer is the canonical owner of its trainable state. Signals sit behind a
/// mutex so that working sets holding only `&Layer` can accumulate into them; an
/// exclusive owner reaches them without locking through [`Layer::signals_mut`].
#[derive(Debug)]
pub struct Layer {
    neuron_count: usize,
    prev_count: usize,
    /// Row-major matrix with shape (neuron_count, prev_count).
    weights: Vec<f32>,
    /// Shared by every neuron of the layer.
    bias: f32,
    signals: Mutex<Signals>,
}

impl Layer {
    /// A zeroed layer of `neuron_count` neurons fed by `prev_count` neurons.
    ///
    /// The input layer uses `prev_count == 0` and carries no weights. The caller keeps
    /// `neuron_count * prev_count` within `usize`; [`Layer::from_parts`] checks it.
    #[inline]
    pub fn new(neuron_count: usize, prev_count: usize) -> Self {
        Self {
            neuron_count,
            prev_count,
            weights: vec![0.0; neuron_count * prev_count],
            bias: 0.0,
            signals: Mutex::new(Signals::zeros(neuron_count)),
        }
    }

    /// Rebuild a layer from stored parameters. Signals start zeroed.
    pub fn from_parts(
        neuron_count: usize,
        prev_count: usize,
        weights: Vec<f32>,
        bias: f32,
    ) -> Result<Self> {
        if neuron_count == 0 {
            return Err(Error::InvalidConfig(
                "layer neuron_count must be > 0".to_owned(),
            ));
        }
        let expected = neuron_count
            .checked_mul(prev_count)
            .ok_or_else(|| Error::InvalidConfig("layer weight shape overflow".to_owned()))?;
        if weights.len() != expected {
            return Err(Error::InvalidShape(format!(
                "weights length {} does not match neuron_count * prev_count ({} * {})",
                weights.len(),
                neuron_count,
                prev_count
            )));
        }
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InvalidData(
                "layer parameters must be finite".to_owned(),
            ));
        }

        Ok(Self {
            neuron_count,
            prev_count,
            weights,
            bias,
            signals: Mutex::new(Signals::zeros(neuron_count)),
        })
    }

    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    #[inline]
    pub fn prev_count(&self) -> usize {
        self.prev_count
    }

    #[inline]
    pub fn bias(&self) -> f32 {
        self.bias
    }

    #[inline]
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }

    #[inline]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    #[inline]
    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    /// Incoming weights of neuron `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f32] {
        let start = i * self.prev_count;
        &self.weights[start..start + self.prev_count]
    }

    #[inline]
    pub fn row_mut(&mut self, i: usize) -> &mut [f32] {
        let start = i * self.prev_count;
        &mut self.weights[start..start + self.prev_count]
    }

    /// Lock-free access for an exclusive owner.
    #[inline]
    pub fn signals_mut(&mut self) -> &mut Signals {
        self.signals.get_mut()
    }

    /// Lock the signals for shared access.
    ///
    /// The lock is not reentrant: drop the guard before locking the same layer again.
    #[inline]
    pub fn lock_signals(&self) -> MutexGuard<'_, Signals> {
        self.signals.lock()
    }

    /// Current activations (or accumulated activations during batched training).
    #[inline]
    pub fn value(&mut self) -> &[f32] {
        &self.signals.get_mut().value
    }

    /// Current error signal (or accumulated error during batched training).
    #[inline]
    pub fn error(&mut self) -> &[f32] {
        &self.signals.get_mut().error
    }

    /// Zero value and error. Weights and bias are untouched.
    #[inline]
    pub fn clear_values(&mut self) {
        self.signals.get_mut().clear();
    }

    /// Deterministic fill of every weight. The bias is left as is.
    pub fn set_all_weights(&mut self, weight: f32) {
        self.weights.fill(weight);
    }

    /// Draw every weight and the bias independently from `[min, max]`.
    pub fn randomize_weights_and_bias(&mut self, min: f32, max: f32) -> Result<()> {
        self.randomize_with_rng(min, max, &mut rand::thread_rng())
    }

    pub fn randomize_with_rng<R: Rng + ?Sized>(
        &mut self,
        min: f32,
        max: f32,
        rng: &mut R,
    ) -> Result<()> {
        let dist = uniform_range(min, max)?;
        for w in self.weights.iter_mut() {
            *w = dist.sample(rng);
        }
        self.bias = dist.sample(rng);
        Ok(())
    }

    /// Split borrow used by the propagation code: weights read-only, signals mutable.
    #[inline]
    pub(crate) fn parts_mut(&mut self) -> (&[f32], f32, &mut Signals) {
        (&self.weights, self.bias, self.signals.get_mut())
    }

    /// Split borrow used by the update: weights and bias mutable, signals read-only.
    #[inline]
    pub(crate) fn params_mut(&mut self) -> (&mut [f32], &mut f32, &Signals) {
        (&mut self.weights, &mut self.bias, self.signals.get_mut())
    }
}

pub(crate) fn uniform_range(min: f32, max: f32) -> Result<Uniform<f32>> {
    if !(min.is_finite() && max.is_finite()) || min > max {
        return Err(Error::InvalidConfig(format!(
            "weight range must be finite with min <= max, got [{min}, {max}]"
        )));
    }
    Ok(Uniform::new_inclusive(min, max))
}

impl Clone for Layer {
    fn clone(&self) -> Self {
        Self {
            neuron_count: self.neuron_count,
            prev_count: self.prev_count,
            weights: self.weights.clone(),
            bias: self.bias,
            signals: Mutex::new(self.signals.lock().clone()),
        }
    }
}

impl Index<usize> for Layer {
    type Output = [f32];

    #[inline]
    fn index(&self, i: usize) -> &[f32] {
        self.row(i)
    }
}

impl IndexMut<usize> for Layer {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut [f32] {
        self.row_mut(i)
    }
}
