//! Print or write the OpenAPI document as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::path::PathBuf;

use clap::Parser;
use escrow_market::ApiDoc;
use utoipa::OpenApi;

/// `openapi-dump` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "openapi-dump",
    about = "Export the escrow marketplace OpenAPI document",
    version
)]
struct CliArgs {
    /// Write the document to this file instead of stdout.
    #[arg(long, value_name = "path")]
    output: Option<PathBuf>,
    /// Emit single-line JSON.
    #[arg(long)]
    compact: bool,
}

fn main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let doc = ApiDoc::openapi();
    let json = if args.compact {
        doc.to_json()
    } else {
        doc.to_pretty_json()
    }
    .map_err(|error| io::Error::other(format!("serialise OpenAPI document: {error}")))?;

    match args.output {
        Some(path) => std::fs::write(&path, format!("{json}\n")),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
