//! # noodles_wire
//!
//! CBOR wire framing and per-kind payload shapes for the NOODLES
//! collaborative scene protocol: the tag table, the message envelope, the
//! array-framing codec, and the component record/delta types the registry
//! stores and the dispatcher exchanges with method handlers.

pub mod error;
pub mod exception;
pub mod frame;
pub mod message;
pub mod records;
pub mod tag;

pub use error::WireError;
pub use exception::{codes, MethodException};
pub use frame::{
    decode_client_frame, decode_client_payload, decode_raw_frame, decode_server_frame,
    decode_server_payload, encode_client_frame, encode_frame,
};
pub use message::{ClientMessage, IntroMessage, InvokeMethodMessage, MethodValue, ServerMessage};

pub use ciborium::value::Value as CborValue;
