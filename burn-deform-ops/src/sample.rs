//! # Batched Bilinear Sampling
//!
//! Samples a stack of square 2D feature maps at continuous coordinates, the
//! interpolation core of deformable convolution. Every step is a plain Burn
//! tensor operation (clamp, floor/ceil, gather, elementwise arithmetic), so
//! autodiff backends differentiate through the whole chain.

use burn::prelude::*;

use crate::{
    error::{DeformOpsError, DeformOpsResult},
    repeat::{repeat_elements, tile_2d},
};

/// Samples each feature map of a `(n, s, s)` stack at `(n, p, 2)` floating
/// point `(row, col)` coordinates, returning `(n, p)` values.
///
/// Coordinates are clamped to `[0, s - 1]` before use, so out-of-range
/// queries saturate at the border instead of wrapping or failing. Each point
/// is blended bilinearly from its four integer-lattice neighbors; when a
/// coordinate component is already integral, floor and ceil coincide and the
/// blend degenerates to the exact lattice value. Point `p` of image `n` only
/// ever reads pixels of image `n`.
///
/// Only linear interpolation (`order = 1`) is implemented; other values of
/// `_order` are accepted without effect.
///
/// # Errors
///
/// Returns [`DeformOpsError::InvalidTensorShape`] if the last dimension of
/// `coords` is not 2.
pub fn batch_map_coordinates<B: Backend>(
    input: Tensor<B, 3>,
    coords: Tensor<B, 3>,
    _order: usize,
) -> DeformOpsResult<Tensor<B, 2>> {
    let device = input.device();
    let [batch, size, _] = input.dims();
    let [coord_batch, n_points, components] = coords.dims();
    if components != 2 {
        return Err(DeformOpsError::InvalidTensorShape {
            expected: format!("[{coord_batch}, {n_points}, 2]"),
            actual: format!("{:?}", coords.dims()),
        });
    }

    let coords = coords.clamp(0.0, (size - 1) as f64);
    let coords_lt = coords.clone().floor();
    let coords_rb = coords.clone().ceil();
    // Fractional position relative to the top-left neighbor, in [0, 1].
    let frac = coords - coords_lt.clone();

    let lt = coords_lt.int();
    let rb = coords_rb.int();
    let lt_row = lt.clone().slice([0..batch, 0..n_points, 0..1]);
    let lt_col = lt.slice([0..batch, 0..n_points, 1..2]);
    let rb_row = rb.clone().slice([0..batch, 0..n_points, 0..1]);
    let rb_col = rb.slice([0..batch, 0..n_points, 1..2]);

    // Gather through a flat index so every lookup stays inside its own image
    // of the stack.
    let input_flat = input.reshape([batch * size * size]);
    let batch_idx = repeat_elements(
        Tensor::<B, 1, Int>::arange(0..batch as i64, &device),
        n_points,
    )
    .mul_scalar((size * size) as i64);
    let gather_vals = |rows: Tensor<B, 3, Int>, cols: Tensor<B, 3, Int>| -> Tensor<B, 2> {
        let rows = rows.reshape([batch * n_points]);
        let cols = cols.reshape([batch * n_points]);
        let indices = batch_idx.clone() + rows.mul_scalar(size as i64) + cols;
        input_flat
            .clone()
            .gather(0, indices)
            .reshape([batch, n_points])
    };

    let vals_lt = gather_vals(lt_row.clone(), lt_col.clone());
    let vals_rb = gather_vals(rb_row.clone(), rb_col.clone());
    let vals_lb = gather_vals(lt_row, rb_col);
    let vals_rt = gather_vals(rb_row, lt_col);

    let frac_row = frac
        .clone()
        .slice([0..batch, 0..n_points, 0..1])
        .reshape([batch, n_points]);
    let frac_col = frac
        .slice([0..batch, 0..n_points, 1..2])
        .reshape([batch, n_points]);

    // Blend along the row axis first, then between the two resulting rows.
    let vals_top = vals_lt.clone() + (vals_rt - vals_lt) * frac_row.clone();
    let vals_bottom = vals_lb.clone() + (vals_rb - vals_lb) * frac_row;
    Ok(vals_top.clone() + (vals_bottom - vals_top) * frac_col)
}

/// Samples each feature map of a `(n, s, s)` stack at its regular grid
/// positions displaced by `(n, s, s, 2)` per-pixel offsets, returning
/// `(n, s*s)` values in row-major point order.
///
/// The fixed grid is the row-major `ij` Cartesian product of `[0, s)` with
/// itself, identical for every image of the stack. Only linear interpolation
/// is implemented; see [`batch_map_coordinates`].
///
/// # Errors
///
/// Returns [`DeformOpsError::InvalidTensorShape`] if the last dimension of
/// `offsets` is not 2, or a sampling error from [`batch_map_coordinates`].
pub fn batch_map_offsets<B: Backend>(
    input: Tensor<B, 3>,
    offsets: Tensor<B, 4>,
    order: usize,
) -> DeformOpsResult<Tensor<B, 2>> {
    let device = input.device();
    let [batch, size, _] = input.dims();
    if offsets.dims()[3] != 2 {
        return Err(DeformOpsError::InvalidTensorShape {
            expected: format!("[{batch}, {size}, {size}, 2]"),
            actual: format!("{:?}", offsets.dims()),
        });
    }

    let grid = tile_2d(coordinate_grid::<B>(size, &device), batch);
    let coords = offsets.reshape([batch, size * size, 2]) + grid;

    batch_map_coordinates(input, coords, order)
}

/// Builds the fixed `(s*s, 2)` sampling grid: all `(row, col)` positions of
/// an `s` x `s` image in row-major order, as floats.
fn coordinate_grid<B: Backend>(size: usize, device: &Device<B>) -> Tensor<B, 2> {
    let rows = Tensor::<B, 1, Int>::arange(0..size as i64, device)
        .reshape([size, 1])
        .repeat_dim(1, size);
    let cols = Tensor::<B, 1, Int>::arange(0..size as i64, device)
        .reshape([1, size])
        .repeat_dim(0, size);

    let grid: Tensor<B, 3> = Tensor::stack(vec![rows.float(), cols.float()], 2);
    grid.reshape([size * size, 2])
}
