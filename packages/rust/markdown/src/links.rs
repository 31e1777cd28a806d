//! Markdown link extraction.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Matches `[text](target)` anywhere in a line.
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link regex"));

/// A single inline Markdown link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownLink {
    /// Link text between the brackets.
    pub text: String,
    /// Raw target between the parentheses.
    pub target: String,
}

impl MarkdownLink {
    /// Whether the target points outside the filesystem (`https:`, `mailto:`,
    /// ...) or at an in-page fragment.
    pub fn is_external(&self) -> bool {
        self.target.starts_with('#') || has_uri_scheme(&self.target)
    }
}

/// Extract every `[text](target)` occurrence, in document order.
pub fn extract_links(markdown: &str) -> Vec<MarkdownLink> {
    LINK_RE
        .captures_iter(markdown)
        .map(|caps| MarkdownLink {
            text: caps[1].to_string(),
            target: caps[2].to_string(),
        })
        .collect()
}

/// Whether `target` starts with a URI scheme.
///
/// Absolute (`/a/b`) and relative (`a/b`) paths fail to parse without a base
/// URL and are therefore treated as local.
pub fn has_uri_scheme(target: &str) -> bool {
    Url::parse(target).is_ok()
}
