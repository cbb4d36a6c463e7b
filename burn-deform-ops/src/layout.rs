//! # Layout Adapters
//!
//! Reinterprets channel-last feature maps as stacks of independent 2D images
//! and back, so every channel of every batch element can be resampled on its
//! own. Each adapter is an axis permute followed by a reshape; `to_bc_h_w`
//! and `to_b_h_w_c` form an exact inverse pair.

use burn::prelude::*;

/// `(b, h, w, c)` -> `(b*c, h, w)`.
///
/// `x_shape` is the `[b, h, w, c]` shape of the feature map.
pub fn to_bc_h_w<B: Backend>(x: Tensor<B, 4>, x_shape: [usize; 4]) -> Tensor<B, 3> {
    let [b, h, w, c] = x_shape;
    x.permute([0, 3, 1, 2]).reshape([b * c, h, w])
}

/// `(b, h, w, 2c)` -> `(b*c, h, w, 2)`.
///
/// `x_shape` is the `[b, h, w, c]` shape of the feature map the offsets
/// belong to, not the shape of `x` itself. The reshape reinterprets the
/// transposed buffer in row-major order.
pub fn to_bc_h_w_2<B: Backend>(x: Tensor<B, 4>, x_shape: [usize; 4]) -> Tensor<B, 4> {
    let [b, h, w, c] = x_shape;
    x.permute([0, 3, 1, 2]).reshape([b * c, h, w, 2])
}

/// `(b*c, h, w)` -> `(b, h, w, c)`. Inverse of [`to_bc_h_w`].
pub fn to_b_h_w_c<B: Backend>(x: Tensor<B, 3>, x_shape: [usize; 4]) -> Tensor<B, 4> {
    let [b, h, w, c] = x_shape;
    x.reshape([b, c, h, w]).permute([0, 2, 3, 1])
}
