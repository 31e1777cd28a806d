//! Markdown helpers: README title extraction and link extraction.
//!
//! The outline renderer reads display titles through [`read_title`]; the link
//! validator re-parses the rendered outline through [`extract_links`].

mod links;
mod title;

pub use links::{MarkdownLink, extract_links, has_uri_scheme};
pub use title::{TitleOutcome, extract_title, read_title};
