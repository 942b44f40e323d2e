//! Contiguous training data.
//!
//! `Dataset` keeps inputs and targets in two row-major buffers so the training loops can
//! hand out sample slices without allocating. Tile sampling appends to it (see
//! [`crate::tiles`]).

use crate::{Error, Result};

/// A supervised dataset: inputs (X) and targets (Y).
///
/// Stored as contiguous buffers with row-major layout:
/// - `inputs.len() == len * input_dim`
/// - `targets.len() == len * target_dim`
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Vec<f32>,
    targets: Vec<f32>,
    input_dim: usize,
    target_dim: usize,
}

impl Dataset {
    /// An empty dataset that accepts samples of the given dimensions.
    pub fn new(input_dim: usize, target_dim: usize) -> Result<Self> {
        check_dims(input_dim, target_dim)?;
        Ok(Self {
            inputs: Vec::new(),
            targets: Vec::new(),
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from flat buffers.
    ///
    /// `inputs` is `(len, input_dim)` and `targets` is `(len, target_dim)`.
    pub fn from_flat(
        inputs: Vec<f32>,
        targets: Vec<f32>,
        input_dim: usize,
        target_dim: usize,
    ) -> Result<Self> {
        check_dims(input_dim, target_dim)?;
        if !inputs.len().is_multiple_of(input_dim) {
            return Err(Error::InvalidData(format!(
                "inputs length {} is not divisible by input_dim {}",
                inputs.len(),
                input_dim
            )));
        }
        let len = inputs.len() / input_dim;
        if targets.len() != len * target_dim {
            return Err(Error::InvalidData(format!(
                "targets length {} does not match len * target_dim ({} * {})",
                targets.len(),
                len,
                target_dim
            )));
        }

        Ok(Self {
            inputs,
            targets,
            input_dim,
            target_dim,
        })
    }

    /// Build a dataset from per-sample rows (copies into contiguous storage).
    pub fn from_rows(inputs: &[Vec<f32>], targets: &[Vec<f32>]) -> Result<Self> {
        if inputs.len() != targets.len() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.len(),
                targets.len()
            )));
        }
        let (Some(first_in), Some(first_t)) = (inputs.first(), targets.first()) else {
            return Err(Error::InvalidData("rows must not be empty".to_owned()));
        };

        let mut data = Self::new(first_in.len(), first_t.len())?;
        data.inputs.reserve(inputs.len() * data.input_dim);
        data.targets.reserve(targets.len() * data.target_dim);
        for (x, y) in inputs.iter().zip(targets) {
            data.push(x, y)?;
        }
        Ok(data)
    }

    /// Append one sample.
    pub fn push(&mut self, input: &[f32], target: &[f32]) -> Result<()> {
        if input.len() != self.input_dim || target.len() != self.target_dim {
            return Err(Error::InvalidData(format!(
                "sample has shape ({}, {}), dataset expects ({}, {})",
                input.len(),
                target.len(),
                self.input_dim,
                self.target_dim
            )));
        }
        self.inputs.extend_from_slice(input);
        self.targets.extend_from_slice(target);
        Ok(())
    }

    /// Drop every sample, keeping the dimensions.
    pub fn clear(&mut self) {
        self.inputs.clear();
        self.targets.clear();
    }

    #[inline]
    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.inputs.len() / self.input_dim
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.target_dim
    }

    #[inline]
    /// Returns the `idx`-th input row.
    ///
    /// Panics if `idx >= len`.
    pub fn input(&self, idx: usize) -> &[f32] {
        let start = idx * self.input_dim;
        &self.inputs[start..start + self.input_dim]
    }

    #[inline]
    /// Returns the `idx`-th target row.
    ///
    /// Panics if `idx >= len`.
    pub fn target(&self, idx: usize) -> &[f32] {
        let start = idx * self.target_dim;
        &self.targets[start..start + self.target_dim]
    }
}

fn check_dims(input_dim: usize, target_dim: usize) -> Result<()> {
    if input_dim == 0 || target_dim == 0 {
        return Err(Error::InvalidData(format!(
            "input_dim and target_dim must be > 0, got {input_dim} and {target_dim}"
        )));
    }
    Ok(())
}
