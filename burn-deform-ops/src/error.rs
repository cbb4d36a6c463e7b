use thiserror::Error;

/// The error type for `burn-deform-ops` operations.
///
/// Tensor ranks are fixed by Burn's const generics, so only data-dependent
/// shape properties can fail at runtime.
#[derive(Error, Debug)]
pub enum DeformOpsError {
    /// Error for when an input tensor has an invalid shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },
}

/// A specialized `Result` type for `burn-deform-ops` operations.
pub type DeformOpsResult<T> = Result<T, DeformOpsError>;
