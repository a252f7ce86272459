use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

/// One submitted response, appended verbatim; the payload is opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEntry {
    pub id: String,
    pub ts: i64,
    pub response: Value,
}

/// An assessment form, keyed by job id (one per job). `responses` is
/// absent until the first submission and append-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Defaulted on deserialization because PUT bodies may omit it;
    /// the handler always overwrites it with the path's job id.
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Vec<ResponseEntry>>,
}

impl Assessment {
    /// Empty shell used when a submission arrives before any save.
    pub fn shell(job_id: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            sections: Vec::new(),
            responses: None,
        }
    }
}
