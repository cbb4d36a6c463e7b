//! Repetition helpers in the spirit of `np.repeat` and `np.tile`, which Burn
//! does not expose directly.

use burn::{prelude::*, tensor::BasicOps};

/// Repeats every element of a 1D tensor `repeats` consecutive times.
///
/// `[a, b]` with `repeats = 3` becomes `[a, a, a, b, b, b]` (element-wise
/// repeat, not a whole-tensor tile).
pub fn repeat_elements<B: Backend, K>(tensor: Tensor<B, 1, K>, repeats: usize) -> Tensor<B, 1, K>
where
    K: BasicOps<B>,
{
    let [len] = tensor.dims();
    tensor
        .unsqueeze_dim::<2>(1)
        .repeat_dim(1, repeats)
        .reshape([len * repeats])
}

/// Stacks `repeats` identical copies of a 2D tensor into a 3D tensor of
/// shape `(repeats, rows, cols)`.
pub fn tile_2d<B: Backend, K>(tensor: Tensor<B, 2, K>, repeats: usize) -> Tensor<B, 3, K>
where
    K: BasicOps<B>,
{
    tensor.unsqueeze::<3>().repeat_dim(0, repeats)
}
