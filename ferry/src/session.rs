//! Blocking transport session over TCP.
//!
//! A [`Session`] owns one stream for its lifetime and is solely
//! responsible for closing it, on success or failure. All reads and
//! writes block until completion, transport error, or peer closure.

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use crate::error::{Error, Result};

/// One reliable, ordered byte-stream connection to a peer.
#[derive(Debug)]
pub struct Session {
    stream: TcpStream,
}

impl Session {
    /// Connects to a provider.
    pub fn connect(addr: impl ToSocketAddrs + Display) -> Result<Self> {
        let stream = TcpStream::connect(&addr).map_err(|source| Error::Connect {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self { stream })
    }

    pub(crate) const fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Reads exactly `buf.len()` bytes into `buf`.
    ///
    /// Fails with [`Error::ConnectionClosed`] if the peer closes the
    /// stream first.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::ConnectionClosed
            } else {
                Error::Io(e)
            }
        })
    }

    /// Writes all of `bytes` to the stream.
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes).map_err(|e| {
            if e.kind() == io::ErrorKind::WriteZero {
                Error::ShortWrite
            } else {
                Error::Io(e)
            }
        })
    }

    /// Shuts the connection down in both directions.
    ///
    /// Idempotent; failures after a prior error are ignored. Dropping the
    /// session releases the socket either way.
    pub fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

// The proto codec works over any `Read`/`Write`, so a session is one.
impl Read for Session {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Session {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Listening socket that yields one [`Session`] per inbound connection.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Binds and starts listening on `addr`.
    pub fn bind(addr: impl ToSocketAddrs + Display) -> Result<Self> {
        let inner = TcpListener::bind(&addr).map_err(|source| Error::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(Self { inner })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Blocks for one inbound connection.
    pub fn accept(&self) -> Result<(Session, SocketAddr)> {
        let (stream, peer) = self.inner.accept().map_err(Error::Accept)?;
        Ok((Session::from_stream(stream), peer))
    }
}
