//! Minimal point-to-point file retrieval over TCP.
//!
//! A requester connects to a provider, asks for a file by name, and either
//! learns it does not exist or receives its contents in checksummed
//! segments. The wire format lives in [`ferry_proto`]; this crate provides
//! the blocking transport session and the two protocol state machines.
//!
//! # Quick start
//!
//! ```no_run
//! use ferry::{FetchOptions, Outcome, fetch};
//!
//! match fetch("127.0.0.1:8080", "a.txt", &FetchOptions::default())? {
//!     Outcome::Absent => println!("provider does not have it"),
//!     Outcome::Received { path, len } => {
//!         println!("wrote {len} bytes to {}", path.display());
//!     }
//! }
//! # Ok::<(), ferry::Error>(())
//! ```
//!
//! The provider side is [`Server`]: bind an address, point it at a root
//! directory, and call [`Server::serve_forever`].

mod client;
mod error;
mod server;
mod session;

pub use client::{FetchOptions, Outcome, fetch};
pub use error::{Error, Result, Violation};
pub use server::{Server, ServerConfig};
pub use session::{Listener, Session};
