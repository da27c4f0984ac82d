//! Relevance scorer
//!
//! Ranks knowledge documents against a free-text query with three additive
//! signals:
//!
//! 1. Direct substring match: the lower-cased document content contains the
//!    lower-cased query verbatim (+100).
//! 2. Topic co-occurrence: for each admin topic, `q` keywords present in
//!    the query times `d` keywords present in the document (citation or
//!    content), times 10.
//! 3. Keyword density: every occurrence of each query token longer than
//!    two characters, times 5. Tokens are escaped before pattern
//!    construction, so `a+b (x` counts literally.
//!
//! Only documents with a positive score are returned. The sort is stable
//! descending, so equal scores keep store order (sorted path order).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::kb::store::Document;

/// One administrative topic and its relevance keywords
pub struct Topic {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// The six M365 administration topics used to bias relevance
pub const ADMIN_TOPICS: &[Topic] = &[
    Topic {
        name: "user-management",
        keywords: &[
            "user",
            "account",
            "password",
            "license",
            "mailbox",
            "group",
            "permission",
            "access",
            "offboard",
            "onboard",
            "provision",
        ],
    },
    Topic {
        name: "security",
        keywords: &[
            "security",
            "dlp",
            "policy",
            "alert",
            "incident",
            "threat",
            "compliance",
            "risk",
            "breach",
            "mfa",
            "conditional access",
        ],
    },
    Topic {
        name: "troubleshooting",
        keywords: &[
            "troubleshoot",
            "error",
            "issue",
            "problem",
            "fix",
            "resolve",
            "debug",
            "investigate",
            "logs",
            "trace",
        ],
    },
    Topic {
        name: "exchange",
        keywords: &[
            "email",
            "mail",
            "exchange",
            "message",
            "delivery",
            "transport",
            "smtp",
            "quarantine",
        ],
    },
    Topic {
        name: "sharepoint",
        keywords: &[
            "sharepoint",
            "site",
            "document",
            "library",
            "collaboration",
            "teams",
            "onedrive",
        ],
    },
    Topic {
        name: "licensing",
        keywords: &[
            "license",
            "subscription",
            "billing",
            "cost",
            "usage",
            "analytics",
            "optimization",
        ],
    },
];

/// Scoring weights
const SUBSTRING_BONUS: u32 = 100;
const TOPIC_WEIGHT: u32 = 10;
const DENSITY_WEIGHT: u32 = 5;

/// Query tokens this short contribute nothing to keyword density
const MIN_TOKEN_CHARS: usize = 3;

// Whitespace-collapsed keyword forms ("conditional access" also matches
// "conditionalaccess" in queries), precomputed per topic.
static COLLAPSED_KEYWORDS: Lazy<Vec<Vec<String>>> = Lazy::new(|| {
    ADMIN_TOPICS
        .iter()
        .map(|topic| {
            topic
                .keywords
                .iter()
                .map(|k| k.split_whitespace().collect::<String>())
                .collect()
        })
        .collect()
});

/// A document with its per-query relevance score
#[derive(Debug, Clone, Copy)]
pub struct ScoredHit<'a> {
    pub doc: &'a Document,
    pub score: u32,
}

/// Per-query state, computed once and applied to every document
struct QueryProfile {
    lower: String,
    density: Vec<Regex>,
    topic_query_hits: Vec<usize>,
}

impl QueryProfile {
    /// Build the profile, or None for an empty/whitespace-only query
    fn build(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }

        let lower = query.to_lowercase();

        let density = lower
            .split_whitespace()
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .map(|token| {
                Regex::new(&regex::escape(token)).expect("escaped literal is a valid pattern")
            })
            .collect();

        let topic_query_hits = ADMIN_TOPICS
            .iter()
            .zip(COLLAPSED_KEYWORDS.iter())
            .map(|(topic, collapsed)| {
                topic
                    .keywords
                    .iter()
                    .zip(collapsed.iter())
                    .filter(|(keyword, collapsed)| {
                        lower.contains(*keyword) || lower.contains(collapsed.as_str())
                    })
                    .count()
            })
            .collect();

        Some(Self {
            lower,
            density,
            topic_query_hits,
        })
    }

    fn score_document(&self, doc: &Document) -> u32 {
        let content = doc.content.to_lowercase();
        let citation = doc.citation.to_lowercase();
        let mut score = 0u32;

        // Direct content match gets the highest score
        if content.contains(&self.lower) {
            score += SUBSTRING_BONUS;
        }

        // Topic co-occurrence
        for (topic_idx, topic) in ADMIN_TOPICS.iter().enumerate() {
            let query_hits = self.topic_query_hits[topic_idx];
            if query_hits == 0 {
                continue;
            }

            let doc_hits = topic
                .keywords
                .iter()
                .filter(|keyword| citation.contains(*keyword) || content.contains(*keyword))
                .count();

            score += (query_hits * doc_hits) as u32 * TOPIC_WEIGHT;
        }

        // Keyword density (non-overlapping literal occurrences)
        for pattern in &self.density {
            score += pattern.find_iter(&content).count() as u32 * DENSITY_WEIGHT;
        }

        score
    }
}

/// Score a single document against a query.
///
/// Returns 0 for empty queries and for documents matching none of the
/// three signals.
pub fn score(query: &str, doc: &Document) -> u32 {
    match QueryProfile::build(query) {
        Some(profile) => profile.score_document(doc),
        None => 0,
    }
}

/// Rank every document with a positive score, best first.
///
/// The sort is stable, so equal scores keep store order.
pub fn rank<'a>(query: &str, docs: &'a [Document]) -> Vec<ScoredHit<'a>> {
    let profile = match QueryProfile::build(query) {
        Some(p) => p,
        None => return Vec::new(),
    };

    let mut hits: Vec<ScoredHit<'a>> = docs
        .iter()
        .filter_map(|doc| {
            let score = profile.score_document(doc);
            (score > 0).then_some(ScoredHit { doc, score })
        })
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits
}

/// Rank and apply the selection policy: queries with more than two
/// whitespace tokens may return the top two documents, everything else
/// returns at most the single best one.
pub fn select<'a>(query: &str, docs: &'a [Document]) -> Vec<ScoredHit<'a>> {
    let mut hits = rank(query, docs);
    let token_count = query.split_whitespace().count();

    let keep = if hits.len() > 1 && token_count > 2 {
        2
    } else {
        1
    };
    hits.truncate(keep);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::store::DocMeta;

    fn doc(citation: &str, content: &str) -> Document {
        Document {
            content: content.to_string(),
            citation: citation.to_string(),
            meta: DocMeta {
                size: content.len() as u64,
                mtime_ms: None,
                hash: String::new(),
            },
        }
    }

    #[test]
    fn test_substring_match_scores_at_least_100() {
        let d = doc("notes.md", "To Reset The Dashboard, press the red button.");
        assert!(score("reset the dashboard", &d) >= 100);
    }

    #[test]
    fn test_no_signal_scores_zero() {
        let d = doc("notes.md", "completely unrelated text");
        assert_eq!(score("zzzz", &d), 0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let d = doc("users.md", "Create a new user account.");
        assert_eq!(score("", &d), 0);
        assert_eq!(score("   ", &d), 0);
    }

    #[test]
    fn test_create_user_account_breakdown() {
        let d = doc("users.md", "Create a new user account in the tenant.");
        // No verbatim substring ("create user account" vs "create a new
        // user account"). Topic: "user" and "account" in both query and
        // document (2 * 2 * 10). Density: create/user/account once each
        // (3 * 5).
        assert_eq!(score("create user account", &d), 55);
    }

    #[test]
    fn test_topic_co_occurrence_without_substring() {
        // Query mentions "mailbox" and "license" (user-management topic);
        // the document covers the topic via its citation and content.
        let d = doc(
            "user-guide.md",
            "Assign a mailbox and set a password for the account.",
        );
        let s = score("mailbox license setup", &d);
        assert!(s > 0);
    }

    #[test]
    fn test_topic_match_via_citation_only() {
        let d = doc("security.md", "Follow the steps in this guide.");
        // "security" present in the query and in the citation
        assert!(score("security review", &d) > 0);
    }

    #[test]
    fn test_collapsed_keyword_matches() {
        let d = doc("policies.md", "Configure conditional access for admins.");
        // The collapsed form "conditionalaccess" must hit the
        // "conditional access" keyword
        assert!(score("conditionalaccess rules", &d) > 0);
    }

    #[test]
    fn test_density_counts_every_occurrence() {
        let a = doc("a.md", "backup backup backup");
        let b = doc("b.md", "backup");
        // 3 occurrences vs 1, density weight 5
        assert_eq!(score("backup", &a) - score("backup", &b), 10);
    }

    #[test]
    fn test_short_tokens_do_not_count_for_density() {
        let d = doc("a.md", "go go go go");
        // "go" is 2 chars: the substring bonus still fires, but four
        // occurrences add no density
        assert_eq!(score("go", &d), 100);
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let d = doc("notes.md", "calculate a+b (x times) per run");
        let s = score("a+b (x", &d);
        // Substring match fires; the "a+b" and "(x" tokens count literally
        assert!(s >= 100);
    }

    #[test]
    fn test_rank_sorts_descending() {
        let docs = vec![
            doc("weak.md", "One mention of backup."),
            doc("strong.md", "backup backup backup backup"),
        ];
        let hits = rank("backup", &docs);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].doc.citation, "strong.md");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_rank_ties_keep_store_order() {
        let docs = vec![doc("first.md", "backup plan"), doc("second.md", "backup plan")];
        let hits = rank("backup", &docs);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, hits[1].score);
        assert_eq!(hits[0].doc.citation, "first.md");
    }

    #[test]
    fn test_rank_excludes_zero_scores() {
        let docs = vec![
            doc("hit.md", "password rotation schedule"),
            doc("miss.md", "unrelated cooking recipe"),
        ];
        let hits = rank("password rotation", &docs);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc.citation, "hit.md");
    }

    #[test]
    fn test_select_short_query_returns_one() {
        let docs = vec![
            doc("a.md", "mailbox quota limits"),
            doc("b.md", "mailbox retention rules"),
        ];
        // Two tokens: at most one result even with two scoring docs
        let hits = select("mailbox rules", &docs);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_select_long_query_returns_two() {
        let docs = vec![
            doc("a.md", "mailbox quota limits"),
            doc("b.md", "mailbox retention rules"),
            doc("c.md", "mailbox migration steps"),
        ];
        // Three tokens and multiple scoring docs: top two
        let hits = select("mailbox quota retention", &docs);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn test_select_long_query_single_match_returns_one() {
        let docs = vec![
            doc("a.md", "mailbox quota limits"),
            doc("b.md", "unrelated cooking recipe"),
        ];
        let hits = select("mailbox quota limits please", &docs);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_select_empty_query_returns_nothing() {
        let docs = vec![doc("a.md", "anything")];
        assert!(select("", &docs).is_empty());
        assert!(select("   ", &docs).is_empty());
    }

    #[test]
    fn test_topics_table_shape() {
        assert_eq!(ADMIN_TOPICS.len(), 6);
        let names: Vec<_> = ADMIN_TOPICS.iter().map(|t| t.name).collect();
        assert!(names.contains(&"user-management"));
        assert!(names.contains(&"licensing"));
        // Only multi-word keyword collapses to a distinct form
        assert!(COLLAPSED_KEYWORDS[1].contains(&"conditionalaccess".to_string()));
    }
}
