//! Knowledge base module - The local retrieval engine
//!
//! Loads a directory of plain-text admin documentation, scores documents
//! against queries, and renders the winners as a cited context block:
//!
//! ```text
//! "How do I create a user account?"
//!   ↓ score: substring + topic co-occurrence + keyword density
//! top 1–2 documents
//!   ↓ render
//! <context source="users.md">...</context>  +  ["users.md"]
//! ```
//!
//! The store is read-only between loads; `init` replaces it wholesale, so
//! a query never observes a partially loaded set.

pub mod api;
pub mod context;
pub mod score;
pub mod store;

use std::path::{Path, PathBuf};

use crate::backends::external::{is_m365_query, DocSearch};
pub use store::{Document, LoadReport};

/// A selected document, score stripped: what the orchestration layer sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub content: String,
    pub citation: String,
}

/// The context block handed to the prompt, with its source labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContext {
    pub content: String,
    pub sources: Vec<String>,
}

/// The knowledge base: document store, scorer, and context renderer
/// behind one facade.
pub struct KnowledgeBase {
    data_dir: PathBuf,
    docs: Vec<Document>,
    external: Option<Box<dyn DocSearch>>,
}

impl KnowledgeBase {
    /// Create an empty knowledge base rooted at `data_dir`.
    ///
    /// Nothing is loaded until [`init`](Self::init) runs.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            docs: Vec::new(),
            external: None,
        }
    }

    /// Attach an external documentation search capability
    pub fn with_external(mut self, external: Box<dyn DocSearch>) -> Self {
        self.external = Some(external);
        self
    }

    /// Load (or reload) every document under the data directory.
    ///
    /// The store is swapped in one assignment after the walk completes; a
    /// missing directory leaves it empty and is reported, not fatal.
    pub fn init(&mut self) -> LoadReport {
        let (docs, report) = store::load_dir(&self.data_dir);
        self.docs = docs;
        report
    }

    /// The configured knowledge directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Borrow the loaded documents in store order
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    /// Defensive copy of every loaded document, for diagnostics
    pub fn all_documents(&self) -> Vec<Document> {
        self.docs.clone()
    }

    /// Rank all documents against `query` and keep the selection policy's
    /// top 1–2, scores included (diagnostic surface).
    pub fn ranked(&self, query: &str) -> Vec<score::ScoredHit<'_>> {
        score::select(query, &self.docs)
    }

    /// Search the local store: selection-narrowed results with scores
    /// stripped. Empty and whitespace-only queries return nothing.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        self.ranked(query)
            .into_iter()
            .map(|hit| SearchResult {
                content: hit.doc.content.clone(),
                citation: hit.doc.citation.clone(),
            })
            .collect()
    }

    /// Render the context block for `query`.
    ///
    /// Local results come first; if an external source is attached and the
    /// query is M365-related, its results follow with `"{provider}: ..."`
    /// source labels. Provider failures degrade to local-only context.
    pub fn render_context(&self, query: &str) -> RenderedContext {
        let mut results = self.search(query);

        if let Some(external) = &self.external {
            if is_m365_query(query) {
                if let Ok(extra) = external.search(query) {
                    results.extend(extra.into_iter().map(|r| SearchResult {
                        content: r.content,
                        citation: format!("{}: {}", external.name(), r.citation),
                    }));
                }
            }
        }

        context::render(&results)
    }
}
