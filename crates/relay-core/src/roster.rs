//! Configured upstream list
//!
//! The roster file is a line-oriented list, one upstream token per line.
//! Lines starting with `#` or `//` are comments; blank lines are
//! ignored. A token starting with `http` is a peer relay URL, anything
//! else is treated as a DeepL API key.

use std::path::Path;

use crate::error::CoreError;

/// The full configured upstream list, re-read at the start of every
/// refresh cycle. Superset of the pool's alive sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    pub keys: Vec<String>,
    pub urls: Vec<String>,
}

impl Roster {
    /// Parse roster contents from a string.
    pub fn parse(contents: &str) -> Result<Self, CoreError> {
        let mut roster = Roster::default();

        for line in contents.lines() {
            let token = line.trim();
            if token.is_empty() || token.starts_with('#') || token.starts_with("//") {
                continue;
            }

            if token.starts_with("http") {
                roster.urls.push(token.to_string());
            } else {
                roster.keys.push(token.to_string());
            }
        }

        if roster.keys.is_empty() && roster.urls.is_empty() {
            return Err(CoreError::ConfigUnavailable(
                "upstream list is empty".to_string(),
            ));
        }

        Ok(roster)
    }

    /// Load and parse the roster file. An unreadable file and an empty
    /// list are both `ConfigUnavailable`: at startup that is fatal, on a
    /// scheduled refresh the previous pool contents are retained.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigUnavailable(format!("{}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn classifies_keys_and_urls() {
        let roster = Roster::parse(
            "abc123:fx\nhttps://relay.example.com/translate\ndef456\nhttp://10.0.0.1:1188/translate\n",
        )
        .unwrap();
        assert_eq!(roster.keys, vec!["abc123:fx", "def456"]);
        assert_eq!(
            roster.urls,
            vec![
                "https://relay.example.com/translate",
                "http://10.0.0.1:1188/translate"
            ]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let roster = Roster::parse("# a comment\n\n  \n// another\nabc123\n").unwrap();
        assert_eq!(roster.keys, vec!["abc123"]);
        assert!(roster.urls.is_empty());
    }

    #[test]
    fn empty_after_filtering_is_unavailable() {
        let err = Roster::parse("# only comments\n//here\n\n").unwrap_err();
        assert!(matches!(err, CoreError::ConfigUnavailable(_)));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = Roster::load(Path::new("/nonexistent/apis.txt")).unwrap_err();
        assert!(matches!(err, CoreError::ConfigUnavailable(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "abc123\nhttps://relay.example.com").unwrap();
        let roster = Roster::load(file.path()).unwrap();
        assert_eq!(roster.keys.len(), 1);
        assert_eq!(roster.urls.len(), 1);
    }
}
