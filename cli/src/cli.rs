//! # CLI Interface
//!
//! Defines the command-line argument structure for `hashledger` using
//! `clap` derive. Every subcommand operates on the chain stored in the
//! data directory.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tamper-evident append-only ledger.
///
/// Keeps a hash-chained ledger in a local data directory. Records can be
/// appended, edited in place (to see tampering get caught), validated and
/// repaired.
#[derive(Parser, Debug)]
#[command(
    name = "hashledger",
    about = "Tamper-evident append-only ledger",
    version,
    propagate_version = true
)]
pub struct HashledgerCli {
    /// Directory holding the ledger database. Created on first use.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "HASHLEDGER_DATA_DIR",
        default_value = ".hashledger"
    )]
    pub data_dir: PathBuf,

    /// Digest algorithm for newly created chains: sha256 or blake3.
    ///
    /// Ignored for an existing chain, which keeps the algorithm it was
    /// created with.
    #[arg(long, global = true, env = "HASHLEDGER_ALGORITHM", default_value = "sha256")]
    pub algorithm: String,

    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "HASHLEDGER_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new chain holding only the genesis record.
    Init(InitArgs),
    /// Append a record. The payload is parsed as JSON when possible and kept
    /// as a raw string otherwise.
    Append(AppendArgs),
    /// Replace the payload of an existing record.
    Edit(EditArgs),
    /// Relink every record from a position to the tip.
    Relink(RelinkArgs),
    /// Check chain integrity. Exits with status 1 when the chain is broken.
    Validate,
    /// Print the chain.
    Show(ShowArgs),
    /// Append records with random `{"amount": n}` payloads.
    Demo(DemoArgs),
    /// Print version information and exit.
    Version,
}

impl Commands {
    /// Whether the command may create a chain in an empty data directory.
    /// The rest only read or modify an existing one.
    pub fn creates_chain(&self) -> bool {
        matches!(
            self,
            Commands::Init(_) | Commands::Append(_) | Commands::Demo(_)
        )
    }
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing chain.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `append` subcommand.
#[derive(Parser, Debug)]
pub struct AppendArgs {
    /// Record payload, e.g. '{"amount": 42}' or 'plain text'.
    pub payload: String,
}

/// Arguments for the `edit` subcommand.
#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Position of the record to edit.
    pub position: u64,

    /// New payload, parsed like `append`.
    pub payload: String,

    /// Leave the stored digest untouched instead of recomputing it.
    #[arg(long)]
    pub no_recompute: bool,
}

/// Arguments for the `relink` subcommand.
#[derive(Parser, Debug)]
pub struct RelinkArgs {
    /// First position to relink.
    #[arg(long, default_value_t = 1)]
    pub from: u64,
}

/// Arguments for the `show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Print the full chain as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Number of records to append.
    #[arg(long, short = 'n', default_value_t = 5)]
    pub records: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        HashledgerCli::command().debug_assert();
    }

    #[test]
    fn only_writers_create_a_chain() {
        let parse = |args: &[&str]| {
            HashledgerCli::try_parse_from(args.iter().copied())
                .expect("parse")
                .command
        };
        assert!(parse(&["hashledger", "init"]).creates_chain());
        assert!(parse(&["hashledger", "append", "x"]).creates_chain());
        assert!(parse(&["hashledger", "demo"]).creates_chain());
        assert!(!parse(&["hashledger", "validate"]).creates_chain());
        assert!(!parse(&["hashledger", "show"]).creates_chain());
        assert!(!parse(&["hashledger", "edit", "1", "x"]).creates_chain());
        assert!(!parse(&["hashledger", "relink"]).creates_chain());
    }

    #[test]
    fn parses_edit_with_global_flags() {
        let cli = HashledgerCli::try_parse_from([
            "hashledger",
            "edit",
            "2",
            "{\"amount\": 1}",
            "--no-recompute",
            "--data-dir",
            "/tmp/ledger",
        ])
        .expect("parse");

        assert_eq!(cli.data_dir, PathBuf::from("/tmp/ledger"));
        match cli.command {
            Commands::Edit(args) => {
                assert_eq!(args.position, 2);
                assert!(args.no_recompute);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
