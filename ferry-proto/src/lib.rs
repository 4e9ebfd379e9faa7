//! Wire protocol for ferry requester↔provider communication.
//!
//! Every logical message is a fixed 5-byte header (1 tag byte + 4-byte
//! big-endian length) followed by exactly `length` payload bytes, suitable
//! for any reliable byte stream. File content travels in segments: a
//! header, the content bytes, and one trailing mod-32 checksum byte.

mod codec;
mod message;

pub use codec::{
    WireError, checksum, expect_file_header, read_header, write_header, write_request,
    write_segment,
};
pub use message::{
    CHECKSUM_DIVISOR, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_REQUEST_LEN, HEADER_LEN, Header, TAG_FILE,
};
