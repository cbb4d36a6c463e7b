//! Deformed feature-map sampling, the boundary surface consumed by a
//! deformable-convolution layer. The offsets themselves come from an
//! ordinary convolution upstream; this module only resamples.

use burn::prelude::*;

use crate::{
    error::DeformOpsResult,
    layout::{to_b_h_w_c, to_bc_h_w, to_bc_h_w_2},
    sample::batch_map_offsets,
};

/// Resamples `x` at its regular grid positions displaced by per-pixel,
/// per-channel learned offsets.
///
/// Every channel of every batch element is treated as an independent square
/// 2D image and sampled bilinearly at `grid + offset`, with out-of-range
/// positions clamped to the border.
///
/// # Shapes
/// - `x`: `[batch, h, w, channels]` with `h == w`
/// - `offsets`: `[batch, h, w, 2 * channels]`
/// - output: `[batch, h, w, channels]`
///
/// # Errors
///
/// Propagates shape errors from the sampler.
pub fn deform_sample_2d<B: Backend>(
    x: Tensor<B, 4>,
    offsets: Tensor<B, 4>,
) -> DeformOpsResult<Tensor<B, 4>> {
    let x_shape = x.dims();
    let [_, h, w, _] = x_shape;

    // offsets: (b*c, h, w, 2)
    let offsets = to_bc_h_w_2(offsets, x_shape);

    // x: (b*c, h, w)
    let x = to_bc_h_w(x, x_shape);

    // sampled: (b*c, h*w), one value per grid point
    let sampled = batch_map_offsets(x, offsets, 1)?;

    let [bc, _] = sampled.dims();
    Ok(to_b_h_w_c(sampled.reshape([bc, h, w]), x_shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArray, Autodiff};

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn zero_offsets_return_the_input_exactly() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1, Int>::arange(0..54, &device)
            .float()
            .reshape([2, 3, 3, 3]);
        let offsets = Tensor::<TestBackend, 4>::zeros([2, 3, 3, 6], &device);

        let result = deform_sample_2d(x.clone(), offsets).unwrap();

        assert_eq!(result.dims(), x.dims());
        assert_eq!(
            result.into_data().to_vec::<f32>().unwrap(),
            x.into_data().to_vec::<f32>().unwrap()
        );
    }

    #[test]
    fn output_keeps_the_channel_last_layout() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 4>::random(
            [2, 4, 4, 3],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let offsets = Tensor::<TestBackend, 4>::random(
            [2, 4, 4, 6],
            burn::tensor::Distribution::Normal(0.0, 0.5),
            &device,
        );

        let result = deform_sample_2d(x, offsets).unwrap();
        assert_eq!(result.dims(), [2, 4, 4, 3]);
    }

    #[test]
    fn large_offsets_stay_inside_the_feature_map() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1, Int>::arange(0..16, &device)
            .float()
            .reshape([1, 4, 4, 1]);
        // Offsets far past either border must clamp to the corner pixels.
        let towards_origin = Tensor::<TestBackend, 4>::zeros([1, 4, 4, 2], &device) - 100.0;
        let towards_far_edge = Tensor::<TestBackend, 4>::zeros([1, 4, 4, 2], &device) + 100.0;

        let low = deform_sample_2d(x.clone(), towards_origin).unwrap();
        let high = deform_sample_2d(x, towards_far_edge).unwrap();

        let low = low.into_data().to_vec::<f32>().unwrap();
        let high = high.into_data().to_vec::<f32>().unwrap();
        assert!(low.iter().all(|&v| v == 0.0));
        assert!(high.iter().all(|&v| v == 15.0));
    }

    #[test]
    fn gradients_flow_back_to_the_offsets() {
        let device = Default::default();
        let x = Tensor::<TestBackend, 1, Int>::arange(0..16, &device)
            .float()
            .reshape([1, 4, 4, 1]);
        let offsets =
            (Tensor::<TestBackend, 4>::zeros([1, 4, 4, 2], &device) + 0.25).require_grad();

        let result = deform_sample_2d(x, offsets.clone()).unwrap();
        let grads = result.sum().backward();

        assert!(offsets.grad(&grads).is_some());
    }
}
