// ============================================================
// Layer 4 — Row Batcher
// ============================================================
// Stacks row samples into one float tensor:
//
//   Input:  N samples of D values each
//   Output: Tensor [N, D]
//
// The rows are flattened in order and reshaped through
// TensorData, so row i of the tensor is sample i.
//
// Reference: Burn Book §4 (Batcher)

use anyhow::{bail, Result};
use burn::{prelude::*, tensor::TensorData};

use crate::data::synthetic::RowSample;

/// Creates batches on one device.
#[derive(Clone, Debug)]
pub struct RowBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> RowBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack `items` into a [N, D] tensor. All rows must have the same length.
    pub fn batch(&self, items: &[RowSample]) -> Result<Tensor<B, 2>> {
        let Some(first) = items.first() else {
            bail!("cannot build a batch from zero samples");
        };
        let dim = first.dim();
        if let Some(bad) = items.iter().find(|item| item.dim() != dim) {
            bail!("ragged batch: expected rows of {dim} values, found one with {}", bad.dim());
        }

        let flat: Vec<f32> = items.iter().flat_map(|item| item.values.iter().copied()).collect();
        let data = TensorData::new(flat, [items.len(), dim]);
        Ok(Tensor::from_data(data, &self.device))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    fn row(values: &[f32]) -> RowSample {
        RowSample { values: values.to_vec() }
    }

    #[test]
    fn test_batch_shape_and_order() {
        let batcher = RowBatcher::<NdArray>::new(Default::default());
        let tensor  = batcher.batch(&[row(&[1.0, 2.0]), row(&[3.0, 4.0]), row(&[5.0, 6.0])]).unwrap();
        assert_eq!(tensor.dims(), [3, 2]);
        assert_eq!(tensor.to_data().to_vec::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let batcher = RowBatcher::<NdArray>::new(Default::default());
        assert!(batcher.batch(&[]).is_err());
    }

    #[test]
    fn test_ragged_batch_rejected() {
        let batcher = RowBatcher::<NdArray>::new(Default::default());
        assert!(batcher.batch(&[row(&[1.0, 2.0]), row(&[3.0])]).is_err());
    }
}
