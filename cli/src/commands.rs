//! # Command Handlers
//!
//! One function per subcommand. Each takes the opened store and a writer
//! for its output so the handlers can be driven from tests without a
//! terminal.

use std::io::Write;

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde_json::json;

use hashledger::{Chain, DigestAlgorithm, LedgerStore, Payload};

/// Number of digest characters shown in the table view.
const DIGEST_PREVIEW_LEN: usize = 20;

/// Parse a `--algorithm` value. Only called when a chain is about to be
/// created; an existing chain keeps its own algorithm.
fn parse_algorithm(name: &str) -> Result<DigestAlgorithm> {
    name.parse()
        .with_context(|| format!("invalid --algorithm value: {name}"))
}

/// Load the stored chain, failing when the store is empty. Never writes.
pub fn load_existing(store: &LedgerStore) -> Result<Chain> {
    match store.load_chain().context("failed to load chain")? {
        Some(chain) => Ok(chain),
        None => bail!("no chain found; run `hashledger init`"),
    }
}

/// Load the stored chain, creating and saving a genesis-only chain with
/// `algorithm` when the store is empty.
pub fn load_or_create(store: &LedgerStore, algorithm: &str) -> Result<Chain> {
    match store.load_chain().context("failed to load chain")? {
        Some(chain) => Ok(chain),
        None => {
            let algorithm = parse_algorithm(algorithm)?;
            let chain = Chain::with_algorithm(algorithm);
            store.save_chain(&chain).context("failed to save genesis")?;
            tracing::info!(%algorithm, "created new chain");
            Ok(chain)
        }
    }
}

pub fn init(store: &LedgerStore, algorithm: &str, force: bool, out: &mut impl Write) -> Result<()> {
    if store.record_count() > 0 && !force {
        bail!("a chain already exists; pass --force to replace it");
    }
    let algorithm = parse_algorithm(algorithm)?;
    let chain = Chain::with_algorithm(algorithm);
    store.save_chain(&chain).context("failed to save genesis")?;
    writeln!(out, "Chain initialized ({algorithm}).")?;
    writeln!(out, "  Genesis digest : {}", chain.latest().digest())?;
    Ok(())
}

pub fn append(
    store: &LedgerStore,
    algorithm: &str,
    payload: &str,
    out: &mut impl Write,
) -> Result<()> {
    let mut chain = load_or_create(store, algorithm)?;
    let record = chain
        .append(Payload::parse(payload))
        .context("failed to append record")?;
    store.put_record(record).context("failed to persist record")?;
    writeln!(out, "Appended record {} ({})", record.position(), record.digest())?;
    Ok(())
}

pub fn edit(
    store: &LedgerStore,
    position: u64,
    payload: &str,
    recompute: bool,
    out: &mut impl Write,
) -> Result<()> {
    let mut chain = load_existing(store)?;
    let tip = chain.latest().position();
    let Some(record) = chain.get_mut(position) else {
        bail!("no record at position {position} (tip is {tip})");
    };

    if recompute {
        record
            .set_payload_and_recompute(Payload::parse(payload))
            .context("failed to recompute digest")?;
    } else {
        record.set_payload(Payload::parse(payload));
    }
    store.put_record(record).context("failed to persist record")?;

    let note = if recompute { "digest recomputed" } else { "digest left stale" };
    writeln!(out, "Edited record {position} ({note})")?;
    Ok(())
}

pub fn relink(store: &LedgerStore, from: u64, out: &mut impl Write) -> Result<()> {
    let mut chain = load_existing(store)?;
    chain
        .relink_from(from)
        .with_context(|| format!("failed to relink from position {from}"))?;
    store.save_chain(&chain).context("failed to save chain")?;
    writeln!(out, "Relinked records {}..={}", from.max(1), chain.latest().position())?;
    Ok(())
}

/// Returns whether the chain is valid so the caller can pick an exit code.
pub fn validate(store: &LedgerStore, out: &mut impl Write) -> Result<bool> {
    let chain = load_existing(store)?;
    match chain.verify() {
        Ok(()) => {
            writeln!(out, "Chain is VALID ({} records)", chain.len())?;
            Ok(true)
        }
        Err(fault) => {
            writeln!(out, "Chain is BROKEN: {fault}")?;
            Ok(false)
        }
    }
}

pub fn show(store: &LedgerStore, as_json: bool, out: &mut impl Write) -> Result<()> {
    let chain = load_existing(store)?;
    if as_json {
        serde_json::to_writer_pretty(&mut *out, &chain).context("failed to encode chain")?;
        writeln!(out)?;
        return Ok(());
    }

    for record in chain.records() {
        let marker = if record.is_consistent() { " " } else { "!" };
        writeln!(
            out,
            "{marker} #{:<4} prev={:<20} hash={:<20} data={}",
            record.position(),
            preview(record.previous_digest()),
            preview(record.digest()),
            record.payload().display_text(),
        )?;
    }
    let status = if chain.validate() { "VALID" } else { "BROKEN" };
    writeln!(out, "{} records, chain is {status}", chain.len())?;
    Ok(())
}

pub fn demo(
    store: &LedgerStore,
    algorithm: &str,
    count: u32,
    out: &mut impl Write,
) -> Result<()> {
    let mut chain = load_or_create(store, algorithm)?;
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let amount: u32 = rng.gen_range(0..100);
        let record = chain
            .append(json!({ "amount": amount }))
            .context("failed to append record")?;
        store.put_record(record).context("failed to persist record")?;
        writeln!(out, "Appended record {} amount={amount}", record.position())?;
    }
    Ok(())
}

fn preview(digest: &str) -> &str {
    match digest.char_indices().nth(DIGEST_PREVIEW_LEN) {
        Some((end, _)) => &digest[..end],
        None => digest,
    }
}
