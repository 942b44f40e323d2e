//! Network builder.
//!
//! `NetworkBuilder` is the recommended way to define a network. The topology is always
//! `input -> hidden x depth -> output` with one activation shared by the hidden layers.
//!
//! Weights start at zero unless an initial range is given with
//! [`NetworkBuilder::init_range`], in which case every hidden/output weight and bias is
//! drawn uniformly from that range.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::layer::uniform_range;
use crate::{Activation, Error, Network, Result};

#[derive(Debug, Clone)]
/// Builder for a `Network`.
///
/// Example:
///
/// ```rust
/// use tile_scaler::{Activation, NetworkBuilder};
///
/// # fn main() -> tile_scaler::Result<()> {
/// let net = NetworkBuilder::new(64, 64)?
///     .hidden_layers(128, 2)?
///     .activation(Activation::LeakyReLU)
///     .init_range(-0.9, 0.9)?
///     .build_with_seed(0)?;
/// assert_eq!(net.hidden_depth(), 2);
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    input_count: usize,
    output_count: usize,
    hidden_width: usize,
    hidden_depth: usize,
    activation: Activation,
    learning_rate: f32,
    softmax_output: bool,
    init_range: Option<(f32, f32)>,
}

impl NetworkBuilder {
    /// Start building a network with `input_count` inputs and `output_count` outputs.
    ///
    /// Defaults: one hidden layer as wide as the input, `LeakyReLU`, learning rate 0,
    /// no softmax, zero weights.
    pub fn new(input_count: usize, output_count: usize) -> Result<Self> {
        if input_count == 0 || output_count == 0 {
            return Err(Error::InvalidConfig(format!(
                "input and output counts must be > 0, got {input_count} and {output_count}"
            )));
        }
        Ok(Self {
            input_count,
            output_count,
            hidden_width: input_count,
            hidden_depth: 1,
            activation: Activation::default(),
            learning_rate: 0.0,
            softmax_output: false,
            init_range: None,
        })
    }

    /// Set the hidden stack: `depth` layers of `width` neurons each.
    pub fn hidden_layers(mut self, width: usize, depth: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidConfig("hidden width must be > 0".to_owned()));
        }
        if depth == 0 {
            return Err(Error::InvalidConfig("hidden depth must be >= 1".to_owned()));
        }
        self.hidden_width = width;
        self.hidden_depth = depth;
        Ok(self)
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Result<Self> {
        if !(learning_rate.is_finite() && learning_rate >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be finite and >= 0, got {learning_rate}"
            )));
        }
        self.learning_rate = learning_rate;
        Ok(self)
    }

    pub fn softmax_output(mut self, enabled: bool) -> Self {
        self.softmax_output = enabled;
        self
    }

    /// Draw initial weights and biases uniformly from `[min, max]`.
    pub fn init_range(mut self, min: f32, max: f32) -> Result<Self> {
        uniform_range(min, max)?;
        self.init_range = Some((min, max));
        Ok(self)
    }

    /// Build using the thread-local RNG.
    pub fn build(self) -> Result<Network> {
        self.build_with_rng(&mut rand::thread_rng())
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Network> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        let mut net = Network::new(
            self.input_count,
            self.output_count,
            self.hidden_width,
            self.hidden_depth,
            self.activation,
            self.learning_rate,
            self.softmax_output,
        )?;
        if let Some((min, max)) = self.init_range {
            debug!("initializing weights uniformly in [{min}, {max}]");
            net.randomize_all_weights_with_rng(min, max, rng)?;
        }
        Ok(net)
    }
}
