//! Document store and loader
//!
//! Loads every readable text file under the knowledge directory into
//! memory. Each file becomes one immutable document whose citation is its
//! root-relative path. Per-file problems are collected as skip reasons,
//! never errors: a knowledge base with a bad file in it still loads.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::core::file_reader::read_file_safe;
use crate::core::paths::make_relative;
use crate::core::util::{fingerprint, get_mtime_ms, now_ms};

/// Per-document metadata, shown by `docs` listings
#[derive(Debug, Clone)]
pub struct DocMeta {
    /// Content size in bytes (after trimming)
    pub size: u64,
    /// Source file modification time in milliseconds since epoch
    pub mtime_ms: Option<i64>,
    /// XXH3 fingerprint of the trimmed content
    pub hash: String,
}

/// One loaded knowledge document
#[derive(Debug, Clone)]
pub struct Document {
    /// Full trimmed text of the source file
    pub content: String,
    /// Source label: path relative to the knowledge root
    pub citation: String,
    /// Listing metadata
    pub meta: DocMeta,
}

/// A file that did not become a document, with the reason
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Outcome of one load pass over the knowledge directory
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Number of documents loaded
    pub loaded: usize,
    /// Files dropped, with reasons
    pub skipped: Vec<SkippedFile>,
    /// Files loaded through lossy UTF-8 conversion
    pub lossy: Vec<String>,
    /// The knowledge directory does not exist
    pub missing_dir: bool,
    /// When this load pass ran (milliseconds since epoch)
    pub loaded_at_ms: i64,
}

/// Load all documents under `dir`.
///
/// Walked paths are sorted before loading, so store order (and therefore
/// score tie-breaking) is deterministic across platforms. Hidden files and
/// ignore rules are respected as in any other directory walk.
///
/// A missing directory is not an error: the store comes back empty and the
/// report says so.
pub fn load_dir(dir: &Path) -> (Vec<Document>, LoadReport) {
    let mut report = LoadReport {
        loaded_at_ms: now_ms(),
        ..Default::default()
    };

    if !dir.is_dir() {
        report.missing_dir = true;
        return (Vec::new(), report);
    }

    let mut paths: Vec<PathBuf> = WalkBuilder::new(dir)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.into_path())
        .collect();
    paths.sort();

    let mut docs = Vec::new();

    for path in paths {
        let citation = match make_relative(&path, dir) {
            Some(rel) => rel,
            None => continue,
        };

        let read = read_file_safe(&path);
        let content = match read.content {
            Some(c) => c,
            None => {
                report.skipped.push(SkippedFile {
                    path: citation,
                    reason: read
                        .skip_reason
                        .unwrap_or_else(|| "Unreadable".to_string()),
                });
                continue;
            }
        };

        if read.lossy_conversion {
            report.lossy.push(citation.clone());
        }

        let trimmed = content.trim();
        if trimmed.is_empty() {
            report.skipped.push(SkippedFile {
                path: citation,
                reason: "Empty after trimming".to_string(),
            });
            continue;
        }

        let meta = DocMeta {
            size: trimmed.len() as u64,
            mtime_ms: get_mtime_ms(&path).ok(),
            hash: fingerprint(trimmed.as_bytes()),
        };

        docs.push(Document {
            content: trimmed.to_string(),
            citation,
            meta,
        });
    }

    report.loaded = docs.len();
    (docs, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_dir() {
        let temp = tempdir().unwrap();
        let (docs, report) = load_dir(&temp.path().join("nope"));
        assert!(docs.is_empty());
        assert!(report.missing_dir);
        assert_eq!(report.loaded, 0);
    }

    #[test]
    fn test_load_empty_dir() {
        let temp = tempdir().unwrap();
        let (docs, report) = load_dir(temp.path());
        assert!(docs.is_empty());
        assert!(!report.missing_dir);
    }

    #[test]
    fn test_load_trims_and_counts() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("users.md"),
            "\n  Create a new user account in the tenant.  \n",
        )
        .unwrap();

        let (docs, report) = load_dir(temp.path());
        assert_eq!(report.loaded, 1);
        assert_eq!(docs[0].citation, "users.md");
        assert_eq!(docs[0].content, "Create a new user account in the tenant.");
        assert_eq!(docs[0].meta.size, docs[0].content.len() as u64);
        assert_eq!(docs[0].meta.hash.len(), 16);
    }

    #[test]
    fn test_load_skips_empty_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("empty.md"), "   \n\t\n").unwrap();
        fs::write(temp.path().join("real.md"), "content").unwrap();

        let (docs, report) = load_dir(temp.path());
        assert_eq!(report.loaded, 1);
        assert_eq!(docs[0].citation, "real.md");
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, "empty.md");
    }

    #[test]
    fn test_load_order_is_sorted_by_path() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("zz.md"), "z").unwrap();
        fs::write(temp.path().join("aa.md"), "a").unwrap();
        fs::create_dir(temp.path().join("guides")).unwrap();
        fs::write(temp.path().join("guides/mm.md"), "m").unwrap();

        let (docs, _) = load_dir(temp.path());
        let citations: Vec<_> = docs.iter().map(|d| d.citation.as_str()).collect();
        assert_eq!(citations, vec!["aa.md", "guides/mm.md", "zz.md"]);
    }

    #[test]
    fn test_load_nested_citation_is_relative_path() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("security")).unwrap();
        fs::write(temp.path().join("security/mfa.md"), "Require MFA.").unwrap();

        let (docs, _) = load_dir(temp.path());
        assert_eq!(docs[0].citation, "security/mfa.md");
    }

    #[test]
    fn test_load_skips_hidden_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join(".hidden.md"), "secret").unwrap();
        fs::write(temp.path().join("visible.md"), "visible").unwrap();

        let (docs, _) = load_dir(temp.path());
        let citations: Vec<_> = docs.iter().map(|d| d.citation.as_str()).collect();
        assert_eq!(citations, vec!["visible.md"]);
    }

    #[test]
    fn test_load_skips_binary_with_reason() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("blob.bin"), [0u8, 1, 2, 0, 3]).unwrap();

        let (docs, report) = load_dir(temp.path());
        assert!(docs.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.contains("Binary"));
    }

    #[test]
    fn test_duplicate_content_allowed() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.md"), "same words").unwrap();
        fs::write(temp.path().join("b.md"), "same words").unwrap();

        let (docs, report) = load_dir(temp.path());
        assert_eq!(report.loaded, 2);
        assert_eq!(docs[0].meta.hash, docs[1].meta.hash);
    }
}
