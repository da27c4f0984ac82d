//! adminkb - local knowledge retrieval for M365 admin assistants
//!
//! adminkb provides:
//! - A document store loaded from a directory of plain-text files
//! - Keyword/topic relevance scoring over the stored documents
//! - Cited <context> block rendering for model prompts
//! - Unified output format (jsonl/json/md/raw)

use anyhow::Result;
use clap::Parser;

mod backends;
mod cli;
mod core;
mod kb;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
