//! Wire-layer error types.

/// Errors that can occur while encoding or decoding a NOODLES frame.
///
/// One error variant per failure seam, with `#[from]` conversions from the
/// underlying codec.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] ciborium::ser::Error<std::io::Error>),

    #[error("failed to decode message: {0}")]
    Decode(#[from] ciborium::de::Error<std::io::Error>),

    #[error("top-level frame must be a CBOR array")]
    NotAFrame,

    #[error("frame has an odd number of elements; tag/payload pairs must alternate")]
    UnbalancedFrame,

    #[error("tag is not a non-negative integer")]
    InvalidTag,

    #[error("unknown message tag: {0}")]
    UnknownTag(u64),

    #[error("payload for tag {tag} failed to decode into its expected shape: {source}")]
    PayloadShape {
        tag: u64,
        #[source]
        source: ciborium::de::Error<std::io::Error>,
    },
}
