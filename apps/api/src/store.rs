//! Embedded persistent store backed by redb.
//!
//! Three keyed collections (`jobs`, `candidates`, `assessments`) hold
//! JSON-serialized records under string keys. All mutation flows
//! through a single write-transaction primitive, so a failing
//! multi-record operation leaves nothing behind. Iteration order is
//! redb key order (lexicographic by id), which is the documented
//! ordering for unsorted listings.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition, WriteTransaction};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

const META: TableDefinition<'static, &'static str, u64> = TableDefinition::new("meta");
const SCHEMA_VERSION: u64 = 1;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record {id} in {collection}")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// A merge produced a record that no longer matches the collection's
    /// shape (e.g. a patch with a wrongly-typed field).
    #[error("invalid record for {collection}: {reason}")]
    Invalid {
        collection: &'static str,
        reason: String,
    },

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// A record type persisted in one of the store's collections.
///
/// The store only ever sees JSON documents; this trait supplies the
/// collection name and the primary key.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;
    fn key(&self) -> &str;
}

impl Record for crate::models::job::Job {
    const COLLECTION: &'static str = "jobs";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for crate::models::candidate::Candidate {
    const COLLECTION: &'static str = "candidates";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Record for crate::models::assessment::Assessment {
    const COLLECTION: &'static str = "assessments";
    fn key(&self) -> &str {
        &self.job_id
    }
}

fn table_of<R: Record>() -> TableDefinition<'static, &'static str, Vec<u8>> {
    TableDefinition::new(R::COLLECTION)
}

#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Opens (or creates) the database file and ensures all collection
    /// tables plus the schema-version marker exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(backend)?;
        let store = Self { db: Arc::new(db) };

        store.with_write(|txn| {
            txn.open_table(table_of::<crate::models::job::Job>())
                .map_err(backend)?;
            txn.open_table(table_of::<crate::models::candidate::Candidate>())
                .map_err(backend)?;
            txn.open_table(table_of::<crate::models::assessment::Assessment>())
                .map_err(backend)?;
            let mut meta = txn.open_table(META).map_err(backend)?;
            meta.insert("schema_version", SCHEMA_VERSION)
                .map_err(backend)?;
            Ok(())
        })?;

        info!("store opened at {}", path.as_ref().display());
        Ok(store)
    }

    /// Runs `body` inside one write transaction: commit on `Ok`, abort
    /// on `Err`. No mutation made by a failed body is observable.
    fn with_write<T>(
        &self,
        body: impl FnOnce(&WriteTransaction) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let txn = self.db.begin_write().map_err(backend)?;
        match body(&txn) {
            Ok(out) => {
                txn.commit().map_err(backend)?;
                Ok(out)
            }
            Err(e) => {
                let _ = txn.abort();
                Err(e)
            }
        }
    }

    pub fn count<R: Record>(&self) -> Result<usize, StoreError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(table_of::<R>()).map_err(backend)?;
        let mut n = 0;
        for item in table.iter().map_err(backend)? {
            item.map_err(backend)?;
            n += 1;
        }
        Ok(n)
    }

    pub fn get<R: Record>(&self, id: &str) -> Result<Option<R>, StoreError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(table_of::<R>()).map_err(backend)?;
        let raw = table.get(id).map_err(backend)?.map(|g| g.value());
        match raw {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Full scan in key order. Filtering and pagination belong to the
    /// handler layer, not here.
    pub fn list<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(table_of::<R>()).map_err(backend)?;
        let mut out = Vec::new();
        for item in table.iter().map_err(backend)? {
            let (_key, value) = item.map_err(backend)?;
            out.push(serde_json::from_slice(&value.value())?);
        }
        Ok(out)
    }

    /// Scans `R`'s collection for the first record whose JSON `field`
    /// equals `value`. Used to locate a job by its `order` during
    /// reorder.
    pub fn find_by_field<R: Record>(
        &self,
        field: &str,
        value: &Value,
    ) -> Result<Option<R>, StoreError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(table_of::<R>()).map_err(backend)?;
        for item in table.iter().map_err(backend)? {
            let (_key, raw) = item.map_err(backend)?;
            let doc: Value = serde_json::from_slice(&raw.value())?;
            if doc.get(field) == Some(value) {
                return Ok(Some(serde_json::from_value(doc)?));
            }
        }
        Ok(None)
    }

    /// Upsert by primary key, full replace.
    pub fn put<R: Record>(&self, record: &R) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(record)?;
        let key = record.key().to_string();
        self.with_write(|txn| {
            let mut table = txn.open_table(table_of::<R>()).map_err(backend)?;
            table.insert(key.as_str(), bytes).map_err(backend)?;
            Ok(())
        })
    }

    /// Shallow-merges `patch` into the record at `id` and persists the
    /// merged document. Fields not named in the patch keep their stored
    /// values exactly. Fails with `NotFound` when `id` is absent and
    /// with `Invalid` when the merged document no longer typechecks as
    /// `R`; either failure aborts the transaction.
    pub fn update<R: Record>(&self, id: &str, patch: &Map<String, Value>) -> Result<R, StoreError> {
        self.with_write(|txn| {
            let mut table = txn.open_table(table_of::<R>()).map_err(backend)?;
            let raw = table
                .get(id)
                .map_err(backend)?
                .map(|g| g.value())
                .ok_or_else(|| StoreError::NotFound {
                    collection: R::COLLECTION,
                    id: id.to_string(),
                })?;

            let mut doc: Value = serde_json::from_slice(&raw)?;
            let obj = doc.as_object_mut().ok_or_else(|| StoreError::Invalid {
                collection: R::COLLECTION,
                reason: "stored record is not a JSON object".to_string(),
            })?;
            for (field, value) in patch {
                obj.insert(field.clone(), value.clone());
            }

            let merged: R =
                serde_json::from_value(doc.clone()).map_err(|e| StoreError::Invalid {
                    collection: R::COLLECTION,
                    reason: e.to_string(),
                })?;
            table
                .insert(id, serde_json::to_vec(&doc)?)
                .map_err(backend)?;
            Ok(merged)
        })
    }

    /// Inserts many records in one transaction. Seeder only.
    pub fn bulk_insert<R: Record>(&self, records: &[R]) -> Result<(), StoreError> {
        let mut encoded = Vec::with_capacity(records.len());
        for record in records {
            encoded.push((record.key().to_string(), serde_json::to_vec(record)?));
        }
        self.with_write(|txn| {
            let mut table = txn.open_table(table_of::<R>()).map_err(backend)?;
            for (key, bytes) in encoded {
                table.insert(key.as_str(), bytes).map_err(backend)?;
            }
            Ok(())
        })
    }

    /// Atomically sets job `a_id`'s order to `to` and job `b_id`'s
    /// order to `from` inside one transaction. Either both writes land
    /// or, if anything fails partway, neither is visible.
    pub fn swap_job_orders(
        &self,
        a_id: &str,
        b_id: &str,
        from: i64,
        to: i64,
    ) -> Result<(), StoreError> {
        self.with_write(|txn| {
            let mut table = txn
                .open_table(table_of::<crate::models::job::Job>())
                .map_err(backend)?;
            set_order(&mut table, a_id, to)?;
            set_order(&mut table, b_id, from)?;
            Ok(())
        })
    }
}

fn set_order(
    table: &mut redb::Table<'_, &'static str, Vec<u8>>,
    id: &str,
    order: i64,
) -> Result<(), StoreError> {
    let raw = table
        .get(id)
        .map_err(backend)?
        .map(|g| g.value())
        .ok_or_else(|| StoreError::NotFound {
            collection: "jobs",
            id: id.to_string(),
        })?;
    let mut doc: Value = serde_json::from_slice(&raw)?;
    doc["order"] = Value::from(order);
    table
        .insert(id, serde_json::to_vec(&doc)?)
        .map_err(backend)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{Job, JobStatus};
    use serde_json::json;
    use tempfile::TempDir;

    fn test_store() -> (Store, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    fn job(id: &str, order: i64) -> Job {
        Job {
            id: id.to_string(),
            title: format!("Job {id}"),
            slug: format!("job-{id}"),
            status: JobStatus::Active,
            tags: vec!["backend".to_string()],
            order,
        }
    }

    #[test]
    fn test_put_then_get_roundtrip() {
        let (store, _dir) = test_store();
        let j = job("a", 1);
        store.put(&j).unwrap();
        assert_eq!(store.get::<Job>("a").unwrap(), Some(j));
    }

    #[test]
    fn test_get_missing_is_none() {
        let (store, _dir) = test_store();
        assert_eq!(store.get::<Job>("nope").unwrap(), None);
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.redb");
        {
            let store = Store::open(&path).unwrap();
            store.put(&job("a", 1)).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert_eq!(store.count::<Job>().unwrap(), 1);
    }

    #[test]
    fn test_update_merges_only_named_fields() {
        let (store, _dir) = test_store();
        let original = job("a", 7);
        store.put(&original).unwrap();

        let mut patch = Map::new();
        patch.insert("title".to_string(), json!("Renamed"));
        let merged: Job = store.update("a", &patch).unwrap();

        assert_eq!(merged.title, "Renamed");
        assert_eq!(merged.slug, original.slug);
        assert_eq!(merged.status, original.status);
        assert_eq!(merged.tags, original.tags);
        assert_eq!(merged.order, original.order);
        // And the persisted copy matches what was returned.
        assert_eq!(store.get::<Job>("a").unwrap(), Some(merged));
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let (store, _dir) = test_store();
        let err = store
            .update::<Job>("ghost", &Map::new())
            .expect_err("must fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_update_rejects_wrongly_typed_patch() {
        let (store, _dir) = test_store();
        store.put(&job("a", 1)).unwrap();

        let mut patch = Map::new();
        patch.insert("order".to_string(), json!("not a number"));
        let err = store.update::<Job>("a", &patch).expect_err("must fail");
        assert!(matches!(err, StoreError::Invalid { .. }));

        // Aborted transaction: the stored record is untouched.
        assert_eq!(store.get::<Job>("a").unwrap().unwrap().order, 1);
    }

    #[test]
    fn test_bulk_insert_and_count() {
        let (store, _dir) = test_store();
        let jobs: Vec<Job> = (0..10).map(|i| job(&format!("j{i}"), i)).collect();
        store.bulk_insert(&jobs).unwrap();
        assert_eq!(store.count::<Job>().unwrap(), 10);
    }

    #[test]
    fn test_find_by_field_matches_order() {
        let (store, _dir) = test_store();
        store.put(&job("a", 3)).unwrap();
        store.put(&job("b", 9)).unwrap();

        let found: Option<Job> = store.find_by_field("order", &json!(9)).unwrap();
        assert_eq!(found.unwrap().id, "b");
        let missing: Option<Job> = store.find_by_field("order", &json!(42)).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_swap_job_orders_swaps_both() {
        let (store, _dir) = test_store();
        store.put(&job("a", 1)).unwrap();
        store.put(&job("b", 2)).unwrap();

        store.swap_job_orders("a", "b", 1, 2).unwrap();

        assert_eq!(store.get::<Job>("a").unwrap().unwrap().order, 2);
        assert_eq!(store.get::<Job>("b").unwrap().unwrap().order, 1);
    }

    #[test]
    fn test_swap_rolls_back_when_second_write_fails() {
        let (store, _dir) = test_store();
        store.put(&job("a", 1)).unwrap();

        // "b" does not exist, so the second write inside the
        // transaction fails; the first must not be visible either.
        let err = store.swap_job_orders("a", "ghost", 1, 2).expect_err("must fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(store.get::<Job>("a").unwrap().unwrap().order, 1);
    }

    #[test]
    fn test_list_is_key_ordered() {
        let (store, _dir) = test_store();
        store.put(&job("c", 1)).unwrap();
        store.put(&job("a", 2)).unwrap();
        store.put(&job("b", 3)).unwrap();

        let ids: Vec<String> = store.list::<Job>().unwrap().into_iter().map(|j| j.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
