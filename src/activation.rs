//! Activation functions.
//!
//! A hidden layer computes an averaged pre-activation value `z = (W x + b) / P` and then
//! applies an activation function element-wise: `y = activation(z)`.
//!
//! Only the *post-activation* outputs `y` are kept in a layer's signal buffer. The weight
//! update therefore needs the derivative expressed in terms of `y`, which is what
//! [`Activation::grad_from_output`] returns. The same function is also applied to the
//! layer bias during the update.

/// Negative-side slope of [`Activation::LeakyReLU`].
pub const LEAKY_RELU_SLOPE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Element-wise activation function.
pub enum Activation {
    Sigmoid,
    /// Sigmoid rescaled to the range `[-1, 1]`.
    ShiftedSigmoid,
    ReLU,
    /// ReLU with a fixed negative slope of [`LEAKY_RELU_SLOPE`].
    #[default]
    LeakyReLU,
    /// Identity.
    Linear,
}

impl Activation {
    pub const ALL: [Activation; 5] = [
        Activation::Sigmoid,
        Activation::ShiftedSigmoid,
        Activation::ReLU,
        Activation::LeakyReLU,
        Activation::Linear,
    ];

    #[inline]
    pub fn forward(self, x: f32) -> f32 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::ShiftedSigmoid => sigmoid(x) * 2.0 - 1.0,
            Activation::ReLU => {
                if x > 0.0 {
                    x
                } else {
                    0.0
                }
            }
            Activation::LeakyReLU => {
                if x > 0.0 {
                    x
                } else {
                    x * LEAKY_RELU_SLOPE
                }
            }
            Activation::Linear => x,
        }
    }

    /// Derivative of the activation with respect to its input, expressed in terms
    /// of the cached post-activation output `y`.
    #[inline]
    pub fn grad_from_output(self, y: f32) -> f32 {
        match self {
            Activation::Sigmoid => y * (1.0 - y),
            Activation::ShiftedSigmoid => {
                let s = (y + 1.0) / 2.0;
                s * (1.0 - s)
            }
            Activation::ReLU => {
                if y > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::LeakyReLU => {
                if y > 0.0 {
                    1.0
                } else {
                    LEAKY_RELU_SLOPE
                }
            }
            Activation::Linear => 1.0,
        }
    }
}

#[inline]
fn sigmoid(x: f32) -> f32 {
    // Numerically stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
