//! Unified file reading for knowledge documents
//!
//! Provides consistent handling for:
//! - Non-UTF-8 files (lossy conversion)
//! - Binary files (skipped)
//! - Unreadable files (skipped with reason)
//!
//! Knowledge documents are loaded whole: their full text is what gets
//! scored and injected into prompts, so there is no truncation here.

use std::fs;
use std::io::Read;
use std::path::Path;

/// Result of reading a knowledge file
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The file content (if successfully read)
    pub content: Option<String>,

    /// Whether lossy UTF-8 conversion was used
    pub lossy_conversion: bool,

    /// Whether the file was skipped
    pub skipped: bool,

    /// Reason for skipping (if skipped)
    pub skip_reason: Option<String>,
}

impl FileReadResult {
    /// Create a successful read result
    pub fn success(content: String) -> Self {
        Self {
            content: Some(content),
            lossy_conversion: false,
            skipped: false,
            skip_reason: None,
        }
    }

    /// Create a skipped result
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            content: None,
            lossy_conversion: false,
            skipped: true,
            skip_reason: Some(reason.into()),
        }
    }

    /// Mark as lossy conversion
    pub fn with_lossy(mut self) -> Self {
        self.lossy_conversion = true;
        self
    }
}

/// Read a knowledge file safely.
///
/// Unreadable and binary files are skipped with a reason instead of
/// failing the load; invalid UTF-8 is converted lossily.
pub fn read_file_safe(path: &Path) -> FileReadResult {
    let bytes = match read_file_bytes(path) {
        Ok(b) => b,
        Err(e) => {
            return FileReadResult::skipped(format!("Cannot read file: {}", e));
        }
    };

    // Binary sniff: null bytes in the first 8KB
    let check_len = std::cmp::min(8192, bytes.len());
    if bytes[..check_len].contains(&0) {
        return FileReadResult::skipped("Binary file (contains null bytes)");
    }

    match String::from_utf8(bytes) {
        Ok(content) => FileReadResult::success(content),
        Err(e) => {
            let content = String::from_utf8_lossy(e.as_bytes()).into_owned();
            FileReadResult::success(content).with_lossy()
        }
    }
}

fn read_file_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let size = file.metadata().map(|m| m.len() as usize).unwrap_or(0);

    let mut reader = std::io::BufReader::new(file);
    let mut buffer = Vec::with_capacity(size);
    reader.read_to_end(&mut buffer)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_success() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("users.md");
        fs::write(&file_path, "Create a new user account.").unwrap();

        let result = read_file_safe(&file_path);
        assert!(!result.skipped);
        assert_eq!(result.content, Some("Create a new user account.".to_string()));
        assert!(!result.lossy_conversion);
    }

    #[test]
    fn test_read_file_binary_skipped() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("blob.bin");

        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(&[0x00, 0x01, 0x02, 0x00, 0x03]).unwrap();

        let result = read_file_safe(&file_path);
        assert!(result.skipped);
        assert!(result.skip_reason.unwrap().contains("Binary"));
    }

    #[test]
    fn test_read_file_lossy_conversion() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("invalid_utf8.txt");

        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(&[0xFF, 0xFE, 0x48, 0x65, 0x6C, 0x6C, 0x6F])
            .unwrap();

        let result = read_file_safe(&file_path);
        assert!(!result.skipped);
        assert!(result.lossy_conversion);
        assert!(result.content.unwrap().contains("Hello"));
    }

    #[test]
    fn test_read_nonexistent_file() {
        let result = read_file_safe(Path::new("/nonexistent/file.txt"));
        assert!(result.skipped);
        assert!(result.skip_reason.is_some());
    }

    #[test]
    fn test_read_empty_file() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("empty.md");
        fs::write(&file_path, "").unwrap();

        // Empty files read fine; the loader drops them after trimming.
        let result = read_file_safe(&file_path);
        assert!(!result.skipped);
        assert_eq!(result.content, Some(String::new()));
    }
}
