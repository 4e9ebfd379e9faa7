//! Provider state machine: serve files to requesters.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::Read as _;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::thread;

use ferry_proto::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_REQUEST_LEN, Header, expect_file_header, write_header,
    write_segment,
};
use tracing::{debug, info, trace, warn};

use crate::error::{Error, Result, Violation};
use crate::session::{Listener, Session};

/// Provider configuration.
#[derive(Debug, Clone)]
#[allow(clippy::exhaustive_structs)]
pub struct ServerConfig {
    /// Directory requested names are resolved under.
    pub root: PathBuf,

    /// Maximum content bytes per segment. The final segment of a file may
    /// be shorter.
    pub chunk_size: usize,

    /// Upper bound on a request's declared name length. Requests claiming
    /// more are rejected before any allocation of that size.
    pub max_request_len: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_request_len: DEFAULT_MAX_REQUEST_LEN,
        }
    }
}

/// A bound provider, ready to accept requesters.
#[derive(Debug)]
pub struct Server {
    listener: Listener,
    config: ServerConfig,
}

impl Server {
    /// Binds the listening socket.
    pub fn bind(addr: impl ToSocketAddrs + Display, config: ServerConfig) -> Result<Self> {
        let listener = Listener::bind(addr)?;
        Ok(Self { listener, config })
    }

    /// Address the provider is listening on.
    ///
    /// Useful when bound to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts and serves connections until the listener itself fails.
    ///
    /// Each connection is served on its own thread; nothing is shared
    /// between them. A failure while serving one requester is logged and
    /// does not stop the accept loop.
    pub fn serve_forever(&self) -> Result<()> {
        info!(
            root = %self.config.root.display(),
            chunk_size = self.config.chunk_size,
            "provider listening"
        );
        loop {
            let (session, peer) = self.listener.accept()?;
            debug!(%peer, "connection accepted");
            let config = self.config.clone();
            thread::spawn(move || {
                if let Err(e) = serve_connection(session, &config) {
                    warn!(%peer, error = %e, "exchange failed");
                }
            });
        }
    }

    /// Accepts one connection and serves it to completion on the calling
    /// thread.
    pub fn serve_one(&self) -> Result<()> {
        let (session, peer) = self.listener.accept()?;
        debug!(%peer, "connection accepted");
        serve_connection(session, &self.config)
    }
}

/// Serves one requester end to end, then closes the session.
///
/// The session is closed on every exit path; an error here is fatal to
/// this exchange only.
fn serve_connection(mut session: Session, config: &ServerConfig) -> Result<()> {
    let result = exchange(&mut session, config);
    session.close();
    result
}

/// One full exchange: request in, existence reply out, segments out.
fn exchange(session: &mut Session, config: &ServerConfig) -> Result<()> {
    let request = expect_file_header(session)?;
    if request.len == 0 {
        return Err(Violation::EmptyRequest.into());
    }
    if request.len > config.max_request_len {
        return Err(Violation::OversizedRequest {
            len: request.len,
            max: config.max_request_len,
        }
        .into());
    }

    let mut raw_name = vec![0u8; request.len as usize];
    session.read_exact(&mut raw_name)?;
    let name = validate_name(raw_name)?;
    debug!(name, "file requested");

    let path = config.root.join(&name);
    let Some(size) = regular_file_size(&path) else {
        write_header(session, Header::file(0))?;
        info!(name, "requested file absent");
        return Ok(());
    };
    let announced = u32::try_from(size).map_err(|_| Error::File {
        path: path.clone(),
        source: std::io::Error::new(
            std::io::ErrorKind::FileTooLarge,
            "file size exceeds the protocol's 32-bit length field",
        ),
    })?;

    write_header(session, Header::file(announced))?;
    send_file(session, &path, size, config.chunk_size)?;
    info!(name, bytes = size, "file sent");
    Ok(())
}

/// Size of the file at `path`, or `None` if it is absent or not a regular
/// file.
///
/// An existing empty file also announces size 0 on the wire, which the
/// requester cannot distinguish from absence. Inherent to the protocol.
fn regular_file_size(path: &Path) -> Option<u64> {
    let meta = fs::metadata(path).ok()?;
    meta.is_file().then_some(meta.len())
}

/// Accepts only bare UTF-8 file names that cannot escape the served root.
///
/// A single trailing NUL is tolerated for peers sending C-style
/// terminated strings.
fn validate_name(raw: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(raw)
        .map_err(|e| Violation::BadName(String::from_utf8_lossy(e.as_bytes()).into_owned()))?;
    let name = text.strip_suffix('\0').unwrap_or(&text);
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(Violation::BadName(name.to_owned()).into());
    }
    Ok(name.to_owned())
}

/// Reads `path` in chunks of at most `chunk_size` bytes and sends each as
/// one checksummed segment, stopping exactly at `size` bytes.
fn send_file(session: &mut Session, path: &Path, size: u64, chunk_size: usize) -> Result<()> {
    let file_err = |source| Error::File {
        path: path.to_owned(),
        source,
    };
    let mut file = File::open(path).map_err(file_err)?;
    let mut chunk = vec![0u8; chunk_size.max(1)];

    let mut sent: u64 = 0;
    while sent < size {
        // Cap the read at the announced size so a file that grew after
        // the stat never over-sends.
        let remaining = usize::try_from(size - sent).unwrap_or(usize::MAX);
        let want = chunk.len().min(remaining);
        let n = file.read(&mut chunk[..want]).map_err(file_err)?;
        if n == 0 {
            // File shrank after the stat; the announced size can no
            // longer be honored.
            return Err(file_err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "file truncated during transfer",
            )));
        }
        write_segment(session, &chunk[..n])?;
        sent += n as u64;
        trace!(n, sent, size, "segment sent");
    }
    Ok(())
}
