//! Context renderer
//!
//! Serializes selected documents into the tagged text block that gets
//! injected into a model prompt, plus the parallel list of source labels
//! used for citations on the outgoing reply.

use crate::kb::{RenderedContext, SearchResult};

/// Format one document with its citation for inclusion in context
pub fn format_document(content: &str, citation: &str) -> String {
    format!("<context source=\"{}\">\n{}\n</context>", citation, content)
}

/// Render search results into a single context block.
///
/// Blocks appear in rank order, separated by a blank line; `sources`
/// holds the citation labels 1:1 in the same order. No results renders to
/// the empty context.
pub fn render(results: &[SearchResult]) -> RenderedContext {
    if results.is_empty() {
        return RenderedContext {
            content: String::new(),
            sources: Vec::new(),
        };
    }

    let mut content = String::new();
    let mut sources = Vec::new();

    for result in results {
        content.push_str(&format_document(&result.content, &result.citation));
        content.push_str("\n\n");
        sources.push(result.citation.clone());
    }

    RenderedContext {
        content: content.trim().to_string(),
        sources,
    }
}
