use serde::{Deserialize, Serialize};

/// Pipeline stage of a candidate. Stored as a plain lowercase string;
/// the store stays agnostic and only the handler layer matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Applied,
    Screen,
    Tech,
    Offer,
    Hired,
    Rejected,
}

pub const ALL_STAGES: [Stage; 6] = [
    Stage::Applied,
    Stage::Screen,
    Stage::Tech,
    Stage::Offer,
    Stage::Hired,
    Stage::Rejected,
];

/// A candidate in the pipeline. `job_id` is a weak reference: the
/// store neither validates it nor cascades deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub email: String,
    pub job_id: String,
    pub stage: Stage,
}
