//! Per-layer propagation kernels.
//!
//! These operate on plain slices so the same code drives both the network's own
//! buffers and the buffers of a [`crate::NetworkWorkingSet`]. Shapes are validated
//! by callers; the kernels only `debug_assert!` them.

use crate::Activation;
use crate::dot::dot;

/// Forward pass of one layer.
///
/// For each neuron `i`: `out[i] = f((dot(row_i, prev) + bias) / prev_count)`, where `f` is
/// `activation` or the identity when `None` (the output layer).
#[inline]
pub(crate) fn forward_layer(
    weights: &[f32],
    bias: f32,
    prev: &[f32],
    out: &mut [f32],
    activation: Option<Activation>,
) {
    let prev_count = prev.len();
    debug_assert!(prev_count > 0);
    debug_assert_eq!(weights.len(), out.len() * prev_count);

    let divisor = prev_count as f32;
    for (i, o) in out.iter_mut().enumerate() {
        let row = &weights[i * prev_count..(i + 1) * prev_count];
        let z = (dot(row, prev, prev_count) + bias) / divisor;
        *o = match activation {
            Some(act) => act.forward(z),
            None => z,
        };
    }
}

/// Error recurrence: `error[i] = sum_j next_error[j] * next_weights[j][i]`.
///
/// `next_weights` is the downstream layer's row-major matrix, whose rows have
/// `error.len()` entries.
#[inline]
pub(crate) fn backward_layer(next_weights: &[f32], next_error: &[f32], error: &mut [f32]) {
    let n = error.len();
    debug_assert_eq!(next_weights.len(), next_error.len() * n);

    error.fill(0.0);
    for (j, &e) in next_error.iter().enumerate() {
        let row = &next_weights[j * n..(j + 1) * n];
        for (err, &w) in error.iter_mut().zip(row) {
            *err += e * w;
        }
    }
}

/// Weight and bias update for one layer.
///
/// The derivative is taken at the activated value for the weights and at the bias
/// itself for the bias, which is updated once per neuron.
#[inline]
pub(crate) fn update_layer(
    weights: &mut [f32],
    bias: &mut f32,
    value: &[f32],
    error: &[f32],
    prev: &[f32],
    learning_rate: f32,
    activation: Activation,
) {
    let prev_count = prev.len();
    debug_assert_eq!(value.len(), error.len());
    debug_assert_eq!(weights.len(), value.len() * prev_count);

    for (i, (&v, &e)) in value.iter().zip(error).enumerate() {
        let coeff = learning_rate * activation.grad_from_output(v) * e;
        *bias += learning_rate * activation.grad_from_output(*bias) * e;

        let row = &mut weights[i * prev_count..(i + 1) * prev_count];
        for (w, &p) in row.iter_mut().zip(prev) {
            *w += coeff * p;
        }
    }
}

/// In-place softmax. The maximum is subtracted before exponentiating.
pub fn softmax(values: &mut [f32]) {
    let Some(max) = values.iter().copied().reduce(f32::max) else {
        return;
    };

    let mut sum = 0.0_f32;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in values.iter_mut() {
        *v /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_averages_by_prev_count() {
        // Two neurons, three inputs.
        let weights = [1.0, 1.0, 1.0, 0.0, 2.0, 0.0];
        let prev = [1.0, 2.0, 3.0];
        let mut out = [0.0; 2];
        forward_layer(&weights, 0.0, &prev, &mut out, None);
        assert_eq!(out, [2.0, 4.0 / 3.0]);

        forward_layer(&weights, 3.0, &prev, &mut out, Some(Activation::ReLU));
        assert_eq!(out, [3.0, 7.0 / 3.0]);
    }

    #[test]
    fn backward_is_transpose_product() {
        // Downstream layer: 2 neurons fed by 3.
        let next_weights = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let next_error = [0.5, -1.0];
        let mut error = [9.0; 3];
        backward_layer(&next_weights, &next_error, &mut error);
        assert_eq!(error, [0.5 - 4.0, 1.0 - 5.0, 1.5 - 6.0]);
    }

    #[test]
    fn update_moves_weights_along_error() {
        let mut weights = [0.0, 0.0];
        let mut bias = 0.0;
        update_layer(
            &mut weights,
            &mut bias,
            &[1.0],
            &[0.5],
            &[2.0, -1.0],
            0.1,
            Activation::Linear,
        );
        assert!((weights[0] - 0.1).abs() < 1e-6);
        assert!((weights[1] + 0.05).abs() < 1e-6);
        assert!((bias - 0.05).abs() < 1e-6);
    }

    #[test]
    fn zero_learning_rate_leaves_parameters_untouched() {
        let mut weights = [0.3, -0.2];
        let mut bias = 0.1;
        update_layer(
            &mut weights,
            &mut bias,
            &[0.4],
            &[7.0],
            &[1.0, 1.0],
            0.0,
            Activation::Sigmoid,
        );
        assert_eq!(weights, [0.3, -0.2]);
        assert_eq!(bias, 0.1);
    }

    #[test]
    fn softmax_sums_to_one_for_large_inputs() {
        let mut v = [1000.0, 999.0, -50.0, 3.0];
        softmax(&mut v);
        let sum: f32 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(v.iter().all(|x| x.is_finite() && *x >= 0.0));
        assert!(v[0] > v[1]);
    }

    #[test]
    fn softmax_of_empty_is_noop() {
        let mut v: [f32; 0] = [];
        softmax(&mut v);
    }
}
