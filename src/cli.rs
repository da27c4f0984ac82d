//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use crate::core::render::{OutputFormat, RenderConfig};
use crate::core::tokenizer::TokenModel;
use crate::kb::{KnowledgeBase, LoadReport};

/// adminkb - local knowledge retrieval for M365 admin assistants.
#[derive(Parser, Debug)]
#[command(name = "adminkb")]
#[command(
    author,
    version,
    about,
    long_about = r#"adminkb loads a directory of plain-text admin documentation, ranks the
documents against a query, and renders the best matches as a cited
<context> block ready to inject into a model prompt.

Each command prints a ResultSet in the selected format (default: jsonl).

Output formats:
- jsonl: one JSON object per line (best for piping into tools/LLMs)
- json: a single JSON array
- md: human-friendly Markdown
- raw: excerpts only (for `context`, exactly the injectable text)

Examples:
    adminkb search "create user account"
    adminkb context "user cannot access sharepoint" --stats
    adminkb docs
    adminkb status
"#
)]
pub struct Cli {
    /// Knowledge directory holding one document per text file.
    #[arg(
        long,
        global = true,
        env = "ADMINKB_DATA_DIR",
        default_value = "knowledge",
        value_name = "DIR",
        long_help = "Knowledge directory holding one document per text file.\n\n\
Each file becomes one document; its path relative to this directory is the\n\
citation label shown to end users. Reads the ADMINKB_DATA_DIR environment\n\
variable when the flag is not given."
    )]
    pub data_dir: PathBuf,

    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for ResultSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw (excerpts only)\n\n\
Tip: use raw with the context command to get exactly the text to inject\n\
into a prompt."
    )]
    pub format: String,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored stderr diagnostics. Useful when piping to files or when\n\
your terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Suppress load warnings on stderr. Machine-readable results are still\n\
printed to stdout."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Report the load summary and every skipped file on stderr."
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank documents against a query and list the selected hits.
    #[command(
        long_about = "Score every document against QUERY (substring match, topic keyword\n\
co-occurrence, keyword density) and emit the documents the selection policy\n\
keeps: the top two for queries with more than two words, otherwise the\n\
single best match. Blank queries and queries matching nothing emit no items.\n\n\
Examples:\n\
  adminkb search \"create user account\"\n\
  adminkb search \"dlp alert\" --format md\n"
    )]
    Search {
        /// Free-text query.
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Render the cited context block for a query.
    #[command(
        long_about = "Run the same selection as `search`, then serialize the winners as\n\
<context source=\"...\"> blocks with a parallel list of source labels.\n\
This is the text an assistant injects into its prompt.\n\n\
Examples:\n\
  adminkb context \"user cannot access sharepoint\" --format raw\n\
  adminkb context \"assign a license\" --stats --token-model gpt-4o\n"
    )]
    Context {
        /// Free-text query.
        #[arg(value_name = "QUERY")]
        query: String,

        /// Show context statistics on stderr.
        #[arg(
            long,
            long_help = "Print context statistics (source count, characters, estimated tokens)\n\
to stderr."
        )]
        stats: bool,

        /// Token model for estimation (cl100k/o200k/heuristic).
        #[arg(
            long,
            default_value = "cl100k",
            value_name = "MODEL",
            long_help = "Token model used for the --stats estimate.\n\n\
Supported values:\n\
- cl100k (default; GPT-4 family)\n\
- o200k (GPT-4o native)\n\
- heuristic (fast, no BPE encoding)"
        )]
        token_model: String,
    },

    /// List all loaded documents with size, mtime, and fingerprint.
    #[command(
        long_about = "List every loaded document with its citation, size, modification time,\n\
and XXH3 content fingerprint. Use this to verify what a running assistant\n\
actually has in memory.\n\n\
Example:\n\
  adminkb docs --format md\n"
    )]
    Docs,

    /// Check knowledge-base health and topic coverage.
    #[command(
        long_about = "Report knowledge directory presence, document count, size and token\n\
totals, per-topic coverage, and whether an external documentation source\n\
is configured.\n\n\
Example:\n\
  adminkb status\n"
    )]
    Status,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Parse output format
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    let mut kb = KnowledgeBase::open(&cli.data_dir);
    let report = kb.init();
    report_load(&kb, &report, cli.quiet, cli.verbose);

    match cli.command {
        Commands::Search { query } => crate::kb::api::run_search(&kb, &query, render_config),

        Commands::Context {
            query,
            stats,
            token_model,
        } => {
            let model: TokenModel = token_model.parse().unwrap_or_default();
            crate::kb::api::run_context(&kb, &query, stats, model, render_config)
        }

        Commands::Docs => crate::kb::api::run_docs(&kb, render_config),

        Commands::Status => crate::kb::api::run_status(&kb, &report, render_config),
    }
}

/// Report load problems on stderr; the summary only under --verbose
fn report_load(kb: &KnowledgeBase, report: &LoadReport, quiet: bool, verbose: bool) {
    if quiet {
        return;
    }

    if report.missing_dir {
        eprintln!(
            "{} knowledge directory not found: {}",
            "warning:".yellow().bold(),
            kb.data_dir().display()
        );
        return;
    }

    if verbose {
        eprintln!(
            "Loaded {} documents from {}",
            report.loaded,
            kb.data_dir().display()
        );
        for skipped in &report.skipped {
            eprintln!("  skipped {}: {}", skipped.path, skipped.reason);
        }
        for lossy in &report.lossy {
            eprintln!("  lossy UTF-8 conversion: {}", lossy);
        }
    } else if !report.skipped.is_empty() {
        eprintln!(
            "{} skipped {} unreadable or empty files (run with --verbose for details)",
            "warning:".yellow().bold(),
            report.skipped.len()
        );
    }
}
