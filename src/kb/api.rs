//! Command runners for the knowledge base
//!
//! Each runner builds a unified ResultSet and prints it through the
//! renderer; statistics and health warnings go to stderr so stdout stays
//! machine-readable.

use anyhow::Result;
use colored::Colorize;

use crate::core::model::{KbError, Meta, ResultItem, ResultSet};
use crate::core::render::{RenderConfig, Renderer};
use crate::core::tokenizer::{count_tokens, estimate_tokens_heuristic, TokenModel};
use crate::core::util::truncate_string;
use crate::kb::score::ADMIN_TOPICS;
use crate::kb::{KnowledgeBase, LoadReport};

/// Excerpt cap for search hit listings
const HIT_EXCERPT_BYTES: usize = 240;

/// Run the search command: rank + selection policy, one item per hit
pub fn run_search(kb: &KnowledgeBase, query: &str, config: RenderConfig) -> Result<()> {
    let mut result_set = ResultSet::new();

    for hit in kb.ranked(query) {
        let (excerpt, truncated) = truncate_string(&hit.doc.content, HIT_EXCERPT_BYTES);
        let item = ResultItem::hit(hit.doc.citation.clone(), hit.score, excerpt).with_meta(Meta {
            mtime_ms: hit.doc.meta.mtime_ms,
            size: Some(hit.doc.meta.size),
            hash: Some(hit.doc.meta.hash.clone()),
            truncated,
        });
        result_set.push(item);
    }

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&result_set));

    Ok(())
}

/// Run the context command: the rendered block plus its source labels.
///
/// In raw format stdout is exactly the prompt-injectable text. With
/// `stats` the item/character/token counts go to stderr.
pub fn run_context(
    kb: &KnowledgeBase,
    query: &str,
    stats: bool,
    token_model: TokenModel,
    config: RenderConfig,
) -> Result<()> {
    let rendered = kb.render_context(query);

    if stats {
        let tokens = count_tokens(&rendered.content, token_model);
        eprintln!("{}", "Context statistics:".bold());
        eprintln!("   Sources: {}", rendered.sources.len());
        eprintln!("   Characters: {}", rendered.content.len());
        eprintln!("   Estimated tokens: {} ({})", tokens, token_model);
        eprintln!();
    }

    let mut result_set = ResultSet::new();
    result_set.push(ResultItem::context(rendered.content, rendered.sources));

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&result_set));

    Ok(())
}

/// Run the docs command: list every loaded document with its metadata
pub fn run_docs(kb: &KnowledgeBase, config: RenderConfig) -> Result<()> {
    let mut result_set = ResultSet::new();

    for doc in kb.documents() {
        let item = ResultItem::doc(doc.citation.clone()).with_meta(Meta {
            mtime_ms: doc.meta.mtime_ms,
            size: Some(doc.meta.size),
            hash: Some(doc.meta.hash.clone()),
            truncated: false,
        });
        result_set.push(item);
    }

    result_set.sort_by_citation();

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&result_set));

    Ok(())
}

/// Run the status command: knowledge-base health check
pub fn run_status(kb: &KnowledgeBase, report: &LoadReport, config: RenderConfig) -> Result<()> {
    let mut result_set = ResultSet::new();

    let dir_display = kb.data_dir().display().to_string();
    if report.missing_dir {
        result_set.push(ResultItem::error(KbError::new(
            "MISSING_DIR",
            format!("knowledge directory not found: {}", dir_display),
        )));
    } else {
        result_set.push(ResultItem::status(format!(
            "✓ knowledge directory: {}",
            dir_display
        )));
    }

    let total_chars: usize = kb.documents().iter().map(|d| d.content.len()).sum();
    let estimated_tokens: usize = kb
        .documents()
        .iter()
        .map(|d| estimate_tokens_heuristic(&d.content))
        .sum();
    let loaded_at = chrono::DateTime::from_timestamp_millis(report.loaded_at_ms)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| report.loaded_at_ms.to_string());

    result_set.push(
        ResultItem::status(format!(
            "documents: {} ({} chars, ~{} tokens, loaded {})",
            kb.documents().len(),
            total_chars,
            estimated_tokens,
            loaded_at
        ))
        .with_data(serde_json::json!({
            "documents": kb.documents().len(),
            "total_chars": total_chars,
            "estimated_tokens": estimated_tokens,
            "skipped": report.skipped.len(),
            "loaded_at": loaded_at,
        })),
    );

    let coverage: Vec<(&str, usize)> = ADMIN_TOPICS
        .iter()
        .map(|topic| {
            let docs = kb
                .documents()
                .iter()
                .filter(|d| {
                    let citation = d.citation.to_lowercase();
                    let content = d.content.to_lowercase();
                    topic
                        .keywords
                        .iter()
                        .any(|k| citation.contains(k) || content.contains(k))
                })
                .count();
            (topic.name, docs)
        })
        .collect();

    let coverage_line = coverage
        .iter()
        .map(|(name, count)| format!("{} {}", name, count))
        .collect::<Vec<_>>()
        .join(", ");
    let coverage_json: serde_json::Map<String, serde_json::Value> = coverage
        .iter()
        .map(|(name, count)| (name.to_string(), serde_json::json!(count)))
        .collect();

    result_set.push(
        ResultItem::status(format!("topic coverage: {}", coverage_line))
            .with_data(serde_json::json!({ "topics": coverage_json })),
    );

    result_set.push(ResultItem::status(
        "external documentation search: not configured",
    ));

    let renderer = Renderer::with_config(config);
    println!("{}", renderer.render(&result_set));

    if report.missing_dir {
        eprintln!(
            "\n{} knowledge directory is missing; every query will come back empty",
            "warning:".yellow().bold()
        );
    }

    Ok(())
}
