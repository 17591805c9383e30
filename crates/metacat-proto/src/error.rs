//! Wire-level error types.

use thiserror::Error;

/// Errors raised while encoding or decoding entity envelopes.
#[derive(Debug, Error)]
pub enum Error {
    /// The bytes are not a valid protobuf encoding of an envelope.
    #[error("decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Encoding into the output buffer failed.
    #[error("encode error: {0}")]
    Encode(#[from] prost::EncodeError),

    /// The envelope exceeds the size limit.
    #[error("envelope size {size} exceeds maximum {max}")]
    TooLarge { size: usize, max: usize },

    /// The envelope carries no payload.
    #[error("envelope has no payload")]
    EmptyEnvelope,
}
