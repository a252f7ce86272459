//! One-time dataset seeding for an empty store.

use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::models::assessment::{Assessment, Question, QuestionKind, Section};
use crate::models::candidate::{Candidate, ALL_STAGES};
use crate::models::job::{Job, JobStatus};
use crate::store::{Store, StoreError};

const TITLES: [&str; 4] = ["Engineer", "Designer", "Manager", "SRE"];
const TAG_POOL: [&str; 7] = [
    "frontend", "backend", "devops", "design", "hr", "senior", "junior",
];

/// Populates an empty store with 25 jobs, 1000 candidates and one
/// sample assessment. A store that already holds jobs is left alone,
/// so running the startup check twice never duplicates records.
/// Returns whether seeding happened.
pub fn seed_if_empty(store: &Store, rng: &mut impl Rng) -> Result<bool, StoreError> {
    if store.count::<Job>()? > 0 {
        return Ok(false);
    }
    info!("store is empty, seeding sample dataset");

    let jobs: Vec<Job> = (1..=25)
        .map(|i| Job {
            id: Uuid::new_v4().to_string(),
            title: format!("Job {i} - {}", TITLES[i % TITLES.len()]),
            slug: format!("job-{i}"),
            status: if i % 5 == 0 {
                JobStatus::Archived
            } else {
                JobStatus::Active
            },
            tags: random_tags(rng),
            order: i as i64,
        })
        .collect();
    store.bulk_insert(&jobs)?;

    let candidates: Vec<Candidate> = (1..=1000)
        .map(|i| Candidate {
            id: Uuid::new_v4().to_string(),
            name: format!("Candidate {i}"),
            email: format!("cand{i}@example.com"),
            job_id: jobs[rng.gen_range(0..jobs.len())].id.clone(),
            stage: ALL_STAGES[rng.gen_range(0..ALL_STAGES.len())],
        })
        .collect();
    store.bulk_insert(&candidates)?;

    store.put(&sample_assessment(&jobs[0].id))?;

    info!(
        jobs = jobs.len(),
        candidates = candidates.len(),
        "seed complete"
    );
    Ok(true)
}

/// 1-3 tags drawn from the fixed pool, duplicates collapsed.
fn random_tags(rng: &mut impl Rng) -> Vec<String> {
    let k = rng.gen_range(1..=3);
    let drawn = (0..k)
        .map(|_| TAG_POOL[rng.gen_range(0..TAG_POOL.len())].to_string())
        .collect();
    Job::dedup_tags(drawn)
}

fn sample_assessment(job_id: &str) -> Assessment {
    Assessment {
        job_id: job_id.to_string(),
        sections: vec![Section {
            id: "s1".to_string(),
            title: "General".to_string(),
            questions: vec![
                Question {
                    id: "q1".to_string(),
                    kind: QuestionKind::Single,
                    text: "Do you have experience?".to_string(),
                    options: Some(vec!["Yes".to_string(), "No".to_string()]),
                    required: true,
                },
                Question {
                    id: "q2".to_string(),
                    kind: QuestionKind::Text,
                    text: "Describe your background".to_string(),
                    options: None,
                    required: false,
                },
            ],
        }],
        responses: None,
    }
}
