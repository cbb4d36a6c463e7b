//! Deformable-convolution sampling operations for the Burn deep learning framework
//!
//! This crate provides the interpolation core of a deformable convolution:
//! bilinear sampling of square feature maps at per-pixel learned offsets,
//! expressed entirely in differentiable Burn tensor operations so that
//! autodiff backends can train through it. Predicting the offsets is an
//! ordinary convolution and stays outside this crate.

use burn::prelude::*;

mod deform;
mod error;
mod layout;
mod repeat;
mod sample;

// Convenient re-exports
pub use deform::deform_sample_2d;
pub use error::{DeformOpsError, DeformOpsResult};
pub use layout::{to_b_h_w_c, to_bc_h_w, to_bc_h_w_2};
pub use repeat::{repeat_elements, tile_2d};
pub use sample::{batch_map_coordinates, batch_map_offsets};

/// Deformable sampling on Burn tensors
pub trait DeformOps<B: Backend> {
    /// Resample the feature map at its grid positions displaced by the
    /// given per-pixel, per-channel offsets.
    fn deform_sample(self, offsets: Tensor<B, 4>) -> DeformOpsResult<Tensor<B, 4>>;
}

impl<B: Backend> DeformOps<B> for Tensor<B, 4> {
    fn deform_sample(self, offsets: Tensor<B, 4>) -> DeformOpsResult<Tensor<B, 4>> {
        deform_sample_2d(self, offsets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{
        backend::{ndarray::NdArray, Autodiff},
        tensor::Tensor,
    };

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_deform_ops_trait() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::random(
            [2, 5, 5, 3],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let offsets = Tensor::<TestBackend, 4>::zeros([2, 5, 5, 6], &device);

        let result = x.clone().deform_sample(offsets).unwrap();
        assert_eq!(result.dims(), x.dims());
    }
}
