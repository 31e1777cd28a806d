//! H1 title extraction from README files.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

/// Matches `# Title` on a trimmed line (a single `#` marker only).
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\s+(.+)$").expect("H1 regex"));

/// Outcome of reading a README's display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleOutcome {
    /// The first H1 heading, trimmed.
    Found(String),
    /// The file was readable but has no H1 heading.
    NotFound,
    /// The file could not be read.
    ReadError(String),
}

impl TitleOutcome {
    /// The title, if one was found.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Found(title) => Some(title),
            Self::NotFound | Self::ReadError(_) => None,
        }
    }

    /// Consume the outcome, yielding the title if one was found.
    pub fn into_title(self) -> Option<String> {
        match self {
            Self::Found(title) => Some(title),
            Self::NotFound | Self::ReadError(_) => None,
        }
    }
}

/// Extract the first H1 heading from Markdown text.
pub fn extract_title(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .map(str::trim)
        .find_map(|line| H1_RE.captures(line).map(|caps| caps[1].trim().to_string()))
        .filter(|title| !title.is_empty())
}

/// Read a README and extract its display title.
///
/// Read failures are reported as [`TitleOutcome::ReadError`], never as a Rust
/// error: a bad README must not abort a run.
pub fn read_title(path: &Path) -> TitleOutcome {
    match std::fs::read_to_string(path) {
        Ok(content) => match extract_title(&content) {
            Some(title) => TitleOutcome::Found(title),
            None => {
                debug!(path = %path.display(), "no H1 heading");
                TitleOutcome::NotFound
            }
        },
        Err(e) => {
            debug!(path = %path.display(), error = %e, "README unreadable");
            TitleOutcome::ReadError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_h1() {
        let md = "Intro text\n\n# Platformer Demo\n\n# Second\n";
        assert_eq!(extract_title(md).as_deref(), Some("Platformer Demo"));
    }

    #[test]
    fn ignores_deeper_headings() {
        let md = "## Not a title\n### Nor this\n# Real Title  \n";
        assert_eq!(extract_title(md).as_deref(), Some("Real Title"));
    }

    #[test]
    fn requires_space_after_marker() {
        assert_eq!(extract_title("#hashtag\n"), None);
        assert_eq!(extract_title("#   \n"), None);
    }

    #[test]
    fn accepts_indented_heading() {
        assert_eq!(extract_title("   # Indented\n").as_deref(), Some("Indented"));
    }

    #[test]
    fn read_title_distinguishes_outcomes() {
        let tmp = tempfile::tempdir().unwrap();

        let with_title = tmp.path().join("a.md");
        std::fs::write(&with_title, "# Networking Overview\nBody\n").unwrap();
        assert_eq!(
            read_title(&with_title),
            TitleOutcome::Found("Networking Overview".into())
        );

        let without_title = tmp.path().join("b.md");
        std::fs::write(&without_title, "Just prose.\n").unwrap();
        assert_eq!(read_title(&without_title), TitleOutcome::NotFound);

        let missing = tmp.path().join("missing.md");
        assert!(matches!(read_title(&missing), TitleOutcome::ReadError(_)));
        assert_eq!(read_title(&missing).title(), None);
    }
}
