//! Error types for ferry transfers.

use std::io;
use std::path::PathBuf;

use ferry_proto::WireError;

/// Alias for `Result<T, ferry::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by requester and provider operations.
///
/// Every failure is terminal for the current exchange. The provider
/// isolates it to one connection; the requester surfaces it to the
/// caller. A file the provider does not have is *not* an error — see
/// [`Outcome::Absent`](crate::Outcome::Absent).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Could not connect to the provider.
    #[error("failed to connect to {addr}")]
    Connect {
        /// The address that was dialed.
        addr: String,
        /// The underlying socket error.
        #[source]
        source: io::Error,
    },

    /// Could not bind the listening socket.
    #[error("failed to bind {addr}")]
    Bind {
        /// The address that was bound.
        addr: String,
        /// The underlying socket error.
        #[source]
        source: io::Error,
    },

    /// Accepting an inbound connection failed.
    #[error("failed to accept a connection")]
    Accept(#[source] io::Error),

    /// The peer closed the stream before a full frame was transferred.
    #[error("peer closed the connection mid-frame")]
    ConnectionClosed,

    /// Fewer bytes were written to the stream than requested.
    #[error("short write on the session stream")]
    ShortWrite,

    /// The peer broke the protocol.
    #[error("protocol violation: {0}")]
    Protocol(#[from] Violation),

    /// A segment's trailing checksum byte disagreed with its content.
    #[error("segment checksum mismatch: computed {computed}, received {received}")]
    ChecksumMismatch {
        /// Checksum recomputed over the received content.
        computed: u8,
        /// Checksum byte the peer sent.
        received: u8,
    },

    /// Reading or writing a local file failed.
    #[error("local file I/O failed on {path}")]
    File {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// Generic transport failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Ways a peer can break the protocol. Each aborts the exchange.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Violation {
    /// A header carried a tag other than the file-transfer tag.
    #[error("unexpected message tag 0x{0:02x}")]
    BadTag(u8),

    /// A request declared a zero-length resource name.
    #[error("request declared an empty resource name")]
    EmptyRequest,

    /// A request's declared name length exceeded the configured bound.
    #[error("request length {len} exceeds maximum {max}")]
    OversizedRequest {
        /// Declared name length.
        len: u32,
        /// Configured maximum.
        max: u32,
    },

    /// A resource name was not a bare file name under the served root.
    #[error("invalid resource name {0:?}")]
    BadName(String),

    /// Segments would overrun the announced total size.
    #[error("segments overrun announced size: {received} of {announced} received, next segment {segment}")]
    Oversend {
        /// Total size announced in the existence reply.
        announced: u64,
        /// Content bytes received so far.
        received: u64,
        /// Declared length of the overrunning segment.
        segment: u64,
    },
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        match e {
            WireError::Closed => Self::ConnectionClosed,
            WireError::BadTag(tag) => Self::Protocol(Violation::BadTag(tag)),
            WireError::Io(source) => Self::Io(source),
            // `WireError` is `#[non_exhaustive]`; no other variants exist today.
            _ => unreachable!("unhandled WireError variant"),
        }
    }
}
