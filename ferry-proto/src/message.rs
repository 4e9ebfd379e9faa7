//! Message header and protocol constants.

/// Tag byte identifying a file-transfer message.
///
/// The only tag this protocol speaks. A receiver seeing any other value
/// must abort the exchange.
pub const TAG_FILE: u8 = b'f';

/// Encoded header size: one tag byte plus a 4-byte length.
pub const HEADER_LEN: usize = 5;

/// Modulus for the one-byte segment checksum.
pub const CHECKSUM_DIVISOR: u32 = 32;

/// Default number of content bytes per segment.
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Default upper bound on a request's declared name length, in bytes.
pub const DEFAULT_MAX_REQUEST_LEN: u32 = 4096;

/// Fixed-size header preceding every logical message.
///
/// `len` is the exact number of payload bytes that follow the header on
/// the stream. Its meaning depends on position in the exchange: request
/// name length, announced total file size (0 = file absent), or segment
/// content length (the trailing checksum byte is *not* counted).
///
/// On the wire the length is big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::exhaustive_structs)] // the wire format is fixed
pub struct Header {
    /// Message class discriminator. Only [`TAG_FILE`] is valid.
    pub tag: u8,
    /// Payload byte count for this message.
    pub len: u32,
}

impl Header {
    /// A file-transfer header with the given payload length.
    pub const fn file(len: u32) -> Self {
        Self { tag: TAG_FILE, len }
    }

    /// Serializes the header to its 5-byte wire form.
    pub fn encode(self) -> [u8; HEADER_LEN] {
        let len = self.len.to_be_bytes();
        [self.tag, len[0], len[1], len[2], len[3]]
    }

    /// Deserializes a header from its 5-byte wire form.
    pub const fn decode(buf: [u8; HEADER_LEN]) -> Self {
        Self {
            tag: buf[0],
            len: u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
        }
    }
}
