//! Requester state machine: fetch one file from a provider.

use std::fmt::Display;
use std::fs::{self, File};
use std::io::Write as _;
use std::net::ToSocketAddrs;
use std::path::{Path, PathBuf};

use ferry_proto::{checksum, expect_file_header, write_request};
use tracing::{debug, trace};

use crate::error::{Error, Result, Violation};
use crate::session::Session;

/// Outcome of a fetch that completed without error.
#[derive(Debug)]
#[allow(clippy::exhaustive_enums)] // closed set: a fetch ends one of two ways
pub enum Outcome {
    /// The provider does not have the requested file. Not an error.
    Absent,

    /// The file was received and every segment verified.
    Received {
        /// Where the received file was written.
        path: PathBuf,
        /// Total content bytes received.
        len: u64,
    },
}

/// Options for [`fetch`].
#[derive(Debug, Clone)]
#[allow(clippy::exhaustive_structs)]
pub struct FetchOptions {
    /// Directory the received file is written into.
    pub out_dir: PathBuf,

    /// File name for the received file.
    ///
    /// Defaults to `received_<name>`, so a fetched file never clobbers a
    /// local file of the same name.
    pub file_name: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            file_name: None,
        }
    }
}

/// Requests `name` from the provider at `addr` and receives it.
///
/// One complete exchange: connect, send the request, read the existence
/// reply, then receive segments until exactly the announced size has
/// arrived. Every segment's checksum is verified before its content is
/// written out. Any failure after the output file has been created removes
/// the partial file before the error is returned; no retries are made at
/// this layer.
pub fn fetch(
    addr: impl ToSocketAddrs + Display,
    name: &str,
    options: &FetchOptions,
) -> Result<Outcome> {
    if name.is_empty() {
        return Err(Violation::EmptyRequest.into());
    }

    let mut session = Session::connect(addr)?;
    write_request(&mut session, name.as_bytes())?;
    debug!(name, "request sent, awaiting existence reply");

    let reply = expect_file_header(&mut session)?;
    if reply.len == 0 {
        session.close();
        debug!(name, "provider does not have the file");
        return Ok(Outcome::Absent);
    }

    let total = u64::from(reply.len);
    debug!(name, total, "provider has the file, receiving");

    let file_name = match &options.file_name {
        Some(custom) => custom.clone(),
        None => format!("received_{name}"),
    };
    let path = options.out_dir.join(file_name);
    let result = receive_into(&mut session, &path, total);
    session.close();

    match result {
        Ok(()) => Ok(Outcome::Received { path, len: total }),
        Err(e) => {
            // Never leave a corrupt partial file behind.
            let _ = fs::remove_file(&path);
            Err(e)
        }
    }
}

/// Receives segments into `path` until exactly `total` content bytes have
/// arrived.
///
/// The loop terminates on the byte count, never on stream EOF. A segment
/// that would push the count past `total` is an over-send and aborts the
/// exchange.
fn receive_into(session: &mut Session, path: &Path, total: u64) -> Result<()> {
    let mut file = File::create(path).map_err(|source| Error::File {
        path: path.to_owned(),
        source,
    })?;

    let mut received: u64 = 0;
    while received < total {
        let header = expect_file_header(session)?;
        let seg_len = u64::from(header.len);
        if received + seg_len > total {
            return Err(Violation::Oversend {
                announced: total,
                received,
                segment: seg_len,
            }
            .into());
        }

        // Content plus the one trailing checksum byte. The buffer is
        // sized per segment; the final one may be shorter.
        let mut buf = vec![0u8; header.len as usize + 1];
        session.read_exact(&mut buf)?;

        let (content, trailer) = buf.split_at(header.len as usize);
        let computed = checksum(content);
        if computed != trailer[0] {
            return Err(Error::ChecksumMismatch {
                computed,
                received: trailer[0],
            });
        }

        file.write_all(content).map_err(|source| Error::File {
            path: path.to_owned(),
            source,
        })?;
        received += seg_len;
        trace!(seg_len, received, total, "segment verified");
    }

    Ok(())
}
