//! External documentation search capability
//!
//! The knowledge base can be extended with a live documentation source
//! (e.g. a Microsoft Learn search service). The capability is injected as
//! a trait object so it can be supplied, mocked, or omitted; nothing in
//! this repository wires in a live provider.

use anyhow::Result;

use crate::kb::SearchResult;

/// A pluggable external documentation search source.
///
/// Providers handle their own transport; a provider error degrades the
/// rendered context to local-only results rather than failing the query.
pub trait DocSearch: Send + Sync {
    /// Display name, used to label external citations (`"{name}: {citation}"`)
    fn name(&self) -> &str;

    /// Search the external source for documents relevant to `query`
    fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Terms that mark a query as M365/Azure related.
///
/// External providers are only consulted for such queries; everything
/// else is answerable from the local knowledge base alone.
const M365_TERMS: &[&str] = &[
    "microsoft 365",
    "m365",
    "office 365",
    "o365",
    "azure",
    "azure ad",
    "entra",
    "sharepoint",
    "teams",
    "exchange",
    "onedrive",
    "intune",
    "defender",
    "compliance",
    "power platform",
    "dynamics",
    "graph api",
    "powershell",
];

/// Check whether a query is worth sending to an external M365 source
pub fn is_m365_query(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    M365_TERMS.iter().any(|term| query_lower.contains(term))
}
