//! Declares the error type surfaced by the codec.

use std::array::TryFromSliceError;

use thiserror::Error;

/// Represents every failure the codec reports at a batch boundary.
///
/// All stream operations validate their buffers up front and emit one of
/// these variants before touching the output; once an error is returned
/// the contents of the output buffer are undefined and the batch must be
/// retried with corrected buffers.
#[derive(Error, Debug)]
pub enum Ecm2Error {
    #[error("the input buffer does not hold enough data for the requested sectors")]
    NotEnoughInputData,

    #[error("the output buffer is too small for the processed stream")]
    NotEnoughOutputSpace,

    #[error("the sector index buffer is smaller than the sector count")]
    NotEnoughIndexSpace,

    #[error("the sector index is empty, malformed or does not match the sector count")]
    WrongIndexData,

    #[error("failed to convert slice to array: {0}")]
    SliceConversion(#[from] TryFromSliceError),

    #[error("an internal logic error occurred: {0}")]
    Internal(String),
}
