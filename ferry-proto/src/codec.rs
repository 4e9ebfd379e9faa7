//! Header and segment codec over any `Read`/`Write` stream.

use std::io::{self, Read, Write};

use crate::message::{CHECKSUM_DIVISOR, HEADER_LEN, Header, TAG_FILE};

/// Errors from moving frames across a stream.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    /// The peer closed the stream before a full frame was transferred.
    #[error("peer closed the connection mid-frame")]
    Closed,

    /// A header carried a tag other than [`TAG_FILE`].
    #[error("unexpected message tag 0x{0:02x}")]
    BadTag(u8),

    /// Underlying transport failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Writes the 5-byte header. All bytes reach the writer or the call fails.
pub fn write_header(w: &mut impl Write, header: Header) -> Result<(), WireError> {
    w.write_all(&header.encode())?;
    Ok(())
}

/// Reads exactly one 5-byte header.
pub fn read_header(r: &mut impl Read) -> Result<Header, WireError> {
    let mut buf = [0u8; HEADER_LEN];
    r.read_exact(&mut buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            WireError::Closed
        } else {
            WireError::Io(e)
        }
    })?;
    Ok(Header::decode(buf))
}

/// Reads a header and checks that it carries the file-transfer tag.
pub fn expect_file_header(r: &mut impl Read) -> Result<Header, WireError> {
    let header = read_header(r)?;
    if header.tag != TAG_FILE {
        return Err(WireError::BadTag(header.tag));
    }
    Ok(header)
}

/// One-byte segment checksum: sum of the content bytes mod 32.
///
/// The sum may wrap; 32 divides 2^32, so the wrapped value is still
/// correct mod 32.
pub fn checksum(content: &[u8]) -> u8 {
    let sum = content
        .iter()
        .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)));
    (sum % CHECKSUM_DIVISOR) as u8
}

/// Writes a request frame: header plus the raw resource-name bytes.
pub fn write_request(w: &mut impl Write, name: &[u8]) -> Result<(), WireError> {
    write_header(w, Header::file(frame_len(name)?))?;
    w.write_all(name)?;
    Ok(())
}

/// Writes one segment: header, content bytes, one trailing checksum byte.
///
/// The header length counts the content only, not the checksum byte.
pub fn write_segment(w: &mut impl Write, content: &[u8]) -> Result<(), WireError> {
    write_header(w, Header::file(frame_len(content)?))?;
    w.write_all(content)?;
    w.write_all(&[checksum(content)])?;
    Ok(())
}

/// Payload length as a wire `u32`.
fn frame_len(payload: &[u8]) -> Result<u32, WireError> {
    u32::try_from(payload.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "payload exceeds u32::MAX").into())
}
