//! The NOODLES wire tag table.
//!
//! This is a self-consistent tag numbering owned entirely by this server: no
//! claim of wire compatibility with any particular upstream NOODLES client
//! is made, only internal consistency between what the encoder writes and
//! the decoder reads.

#![allow(clippy::unreadable_literal)]

pub const METHOD_CREATE: u64 = 0;
pub const METHOD_DELETE: u64 = 1;
pub const SIGNAL_CREATE: u64 = 2;
pub const SIGNAL_DELETE: u64 = 3;
pub const ENTITY_CREATE: u64 = 4;
pub const ENTITY_UPDATE: u64 = 5;
pub const ENTITY_DELETE: u64 = 6;
pub const PLOT_CREATE: u64 = 7;
pub const PLOT_UPDATE: u64 = 8;
pub const PLOT_DELETE: u64 = 9;
pub const BUFFER_CREATE: u64 = 10;
pub const BUFFER_DELETE: u64 = 11;
pub const BUFFER_VIEW_CREATE: u64 = 12;
pub const BUFFER_VIEW_DELETE: u64 = 13;
pub const MATERIAL_CREATE: u64 = 14;
pub const MATERIAL_UPDATE: u64 = 15;
pub const MATERIAL_DELETE: u64 = 16;
pub const IMAGE_CREATE: u64 = 17;
pub const IMAGE_DELETE: u64 = 18;
pub const TEXTURE_CREATE: u64 = 19;
pub const TEXTURE_DELETE: u64 = 20;
pub const SAMPLER_CREATE: u64 = 21;
pub const SAMPLER_DELETE: u64 = 22;
pub const LIGHT_CREATE: u64 = 23;
pub const LIGHT_UPDATE: u64 = 24;
pub const LIGHT_DELETE: u64 = 25;
pub const GEOMETRY_CREATE: u64 = 26;
pub const GEOMETRY_DELETE: u64 = 27;
pub const TABLE_CREATE: u64 = 28;
pub const TABLE_UPDATE: u64 = 29;
pub const TABLE_DELETE: u64 = 30;
pub const DOCUMENT_UPDATE: u64 = 31;
pub const DOCUMENT_RESET: u64 = 32;
pub const SIGNAL_INVOKE: u64 = 33;
pub const METHOD_REPLY: u64 = 34;
pub const INIT_DONE: u64 = 35;

/// Client→server tags. These alias the server→client numbering space
/// (both start at 0) because the two directions are never decoded with the
/// same decoder: a session picks the C→S or S→C table based on which side
/// of the connection it is.
pub mod client_to_server {
    pub const INTRO_MESSAGE: u64 = 0;
    pub const INVOKE_METHOD: u64 = 1;
}
