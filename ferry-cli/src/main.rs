//! CLI for the ferry file-transfer protocol.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ferry::{FetchOptions, Outcome, Server, ServerConfig, fetch};

#[derive(Parser)]
#[command(name = "ferry", version, about = "Point-to-point file transfer over TCP")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a file from a provider.
    ///
    /// Writes the file as `received_<name>` in the output directory.
    Get {
        /// Name of the file to request.
        name: String,

        /// Provider address.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,

        /// Directory to write the received file into.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        /// File name for the received file (default: `received_<name>`).
        #[arg(long)]
        out_name: Option<String>,
    },

    /// Serve files to requesters until killed.
    Serve {
        /// Address to listen on.
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,

        /// Directory requested files are resolved under.
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Maximum content bytes per segment.
        #[arg(long, default_value_t = ferry_proto::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Maximum accepted request-name length in bytes.
        #[arg(long, default_value_t = ferry_proto::DEFAULT_MAX_REQUEST_LEN)]
        max_request: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Command::Get {
            name,
            addr,
            out_dir,
            out_name,
        } => {
            let opts = FetchOptions {
                out_dir,
                file_name: out_name,
            };
            match fetch(addr.as_str(), &name, &opts)? {
                Outcome::Absent => println!("{name}: file does not exist on the provider"),
                Outcome::Received { path, len } => {
                    println!("received {} ({len} bytes)", path.display());
                }
            }
        }
        Command::Serve {
            addr,
            root,
            chunk_size,
            max_request,
        } => {
            let config = ServerConfig {
                root,
                chunk_size,
                max_request_len: max_request,
            };
            Server::bind(addr.as_str(), config)?.serve_forever()?;
        }
    }
    Ok(())
}
