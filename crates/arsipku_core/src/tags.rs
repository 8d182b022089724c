//! crates/arsipku_core/src/tags.rs
//!
//! Tag list helpers: case-insensitive de-duplication and parsing of the
//! comma-separated tag input on the annotation form.

use crate::domain::{Document, Tag};
use std::collections::HashSet;

/// Removes tags whose name repeats an earlier one, ignoring case. The first
/// occurrence wins and order is preserved.
pub fn dedup_tags<I>(tags: I) -> Vec<Tag>
where
    I: IntoIterator<Item = Tag>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter(|tag| seen.insert(tag.tag_name.to_lowercase()))
        .collect()
}

/// Name-only variant of [`dedup_tags`].
pub fn dedup_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(Into::into)
        .filter(|name: &String| seen.insert(name.to_lowercase()))
        .collect()
}

/// Splits `"sejarah, Budaya ,  sejarah"` into `["sejarah", "Budaya"]`.
/// Blank entries are dropped.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    dedup_names(
        input
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty()),
    )
}

/// Every distinct tag name across a list of documents, for the tag sidebar.
pub fn collect_tag_names(documents: &[Document]) -> Vec<String> {
    dedup_names(
        documents
            .iter()
            .flat_map(|doc| doc.tags())
            .map(|tag| tag.tag_name),
    )
}
