// src/utils.rs
use std::path::{Path, PathBuf};

use crate::types::InputMode;

/// Build a timestamped report file path inside `base`
pub fn report_file_path(base: &Path, mode: InputMode) -> PathBuf {
    base.join(format!(
        "scamguard_{}_report_{}.txt",
        mode,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Shorten user-supplied content for log lines
pub fn preview_for_log(content: &str, max_chars: usize) -> String {
    let trimmed = content.trim();
    let mut chars = trimmed.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_file_path() {
        let path = report_file_path(Path::new("reports"), InputMode::Url);
        let name = path.file_name().unwrap().to_str().unwrap();

        assert!(path.starts_with("reports"));
        assert!(name.starts_with("scamguard_url_report_"));
        assert!(name.ends_with(".txt"));
        // scamguard_url_report_ + YYYYmmdd_HHMMSS + .txt
        assert_eq!(name.len(), "scamguard_url_report_".len() + 15 + 4);
    }

    #[test]
    fn test_preview_for_log() {
        assert_eq!(preview_for_log("  short  ", 10), "short");
        assert_eq!(preview_for_log("abcdefghij", 10), "abcdefghij");
        assert_eq!(preview_for_log("abcdefghijk", 10), "abcdefghij...");
        assert_eq!(preview_for_log("ééééé", 3), "ééé...");
    }
}
