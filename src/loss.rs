//! Loss and accuracy helpers.
//!
//! These are small, allocation-free helpers used like:
//!
//! - run a forward pass
//! - compute the output error via [`output_error`]
//! - backpropagate and update
//!
//! [`squared_error`] is the loss reported by training and evaluation.

/// Sum of squared differences between `pred` and `target`.
///
/// No `1/N` scaling is applied.
#[inline]
pub fn squared_error(pred: &[f32], target: &[f32]) -> f32 {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );

    let mut sum = 0.0_f32;
    for (&p, &t) in pred.iter().zip(target) {
        let diff = p - t;
        sum += diff * diff;
    }
    sum
}

/// Output-layer error signal: `error[i] = target[i] - pred[i]`.
///
/// With a softmax output this is the softmax + cross-entropy gradient shortcut;
/// otherwise it is the (negated) squared-error residual. Updates add it, so the sign
/// points toward the target.
#[inline]
pub fn output_error(pred: &[f32], target: &[f32], error: &mut [f32]) {
    assert_eq!(
        pred.len(),
        target.len(),
        "pred len {} does not match target len {}",
        pred.len(),
        target.len()
    );
    assert_eq!(
        pred.len(),
        error.len(),
        "pred len {} does not match error len {}",
        pred.len(),
        error.len()
    );

    for ((e, &p), &t) in error.iter_mut().zip(pred).zip(target) {
        *e = t - p;
    }
}

/// Index of the largest value; the first one wins on ties. Returns 0 for an empty slice.
#[inline]
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
