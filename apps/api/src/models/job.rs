use serde::{Deserialize, Serialize};

/// Lifecycle state of a job posting. The store itself never inspects
/// this; it is closed here to give handlers exhaustive matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Archived,
}

/// A job posting. `order` is an integer position used for list display
/// and drag-reordering; the store does not enforce uniqueness across
/// records, so callers must not assume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status: JobStatus,
    pub tags: Vec<String>,
    pub order: i64,
}

impl Job {
    /// Collapses duplicate tags while keeping first-seen order.
    pub fn dedup_tags(tags: Vec<String>) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
    }
}
