// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # hashledger
//!
//! Entry point for the `hashledger` binary. Parses CLI arguments, sets up
//! logging, opens the ledger store in the data directory and dispatches to
//! a command handler.
//!
//! The binary owns the single chain instance for the duration of one
//! command: load, act, persist.

mod cli;
mod commands;
mod logging;

use std::io;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use hashledger::{DigestAlgorithm, LedgerStore};

use cli::{Commands, HashledgerCli};
use logging::LogFormat;

fn main() -> Result<ExitCode> {
    let cli = HashledgerCli::parse();

    if let Commands::Version = cli.command {
        print_version();
        return Ok(ExitCode::SUCCESS);
    }

    logging::init_logging(
        "hashledger=info,hashledger_cli=info",
        LogFormat::from_str_lossy(&cli.log_format),
    );

    let db_path = cli.data_dir.join("db");
    if cli.command.creates_chain() {
        std::fs::create_dir_all(&db_path).with_context(|| {
            format!("failed to create data directory: {}", db_path.display())
        })?;
    } else if !db_path.exists() {
        bail!(
            "no chain in {}; run `hashledger init`",
            cli.data_dir.display()
        );
    }
    let store = LedgerStore::open(&db_path)
        .with_context(|| format!("failed to open ledger at {}", db_path.display()))?;
    tracing::debug!(path = %db_path.display(), "ledger store opened");

    let algorithm = cli.algorithm.as_str();
    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Init(args) => commands::init(&store, algorithm, args.force, &mut out)?,
        Commands::Append(args) => commands::append(&store, algorithm, &args.payload, &mut out)?,
        Commands::Edit(args) => commands::edit(
            &store,
            args.position,
            &args.payload,
            !args.no_recompute,
            &mut out,
        )?,
        Commands::Relink(args) => commands::relink(&store, args.from, &mut out)?,
        Commands::Validate => {
            if !commands::validate(&store, &mut out)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Show(args) => commands::show(&store, args.json, &mut out)?,
        Commands::Demo(args) => commands::demo(&store, algorithm, args.records, &mut out)?,
        Commands::Version => print_version(),
    }

    store.flush().context("failed to flush ledger store")?;
    Ok(ExitCode::SUCCESS)
}

/// Prints version information to stdout.
fn print_version() {
    println!("hashledger {}", env!("CARGO_PKG_VERSION"));
    println!("digest     {}", DigestAlgorithm::default());
}
