use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-defined label attached to assets and attribution groups.
///
/// `color` is a presentation hint only; the engine never reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Tag {
    /// Create a tag with a freshly allocated id.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: format!("tag-{}", Uuid::new_v4()),
            name: name.into(),
            color: color.into(),
        }
    }

    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// Insert `id` into an ordered id set. Returns `false` if it was already present.
pub(crate) fn insert_id(ids: &mut Vec<String>, id: &str) -> bool {
    if ids.iter().any(|existing| existing == id) {
        return false;
    }
    ids.push(id.to_string());
    true
}

/// Remove `id` from an ordered id set. Returns `true` if something was removed.
pub(crate) fn remove_id(ids: &mut Vec<String>, id: &str) -> bool {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    ids.len() != before
}

/// Collapse duplicates while keeping first-seen order.
pub(crate) fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
