use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use crate::errors::BackendError;
use crate::record::{Fields, Record};

/// A [`RecordStore`](super::RecordStore) that keeps everything in memory.
/// Documents of each collection are held in insertion order.
#[derive(Default)]
pub struct MemoryDb {
    collections: RwLock<HashMap<&'static str, Vec<Record>>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

impl super::RecordStore for MemoryDb {
    fn insert(&self, collection: &'static str, fields: Fields) -> BoxFuture<Result<Uuid, BackendError>> {
        async move {
            let id = Uuid::new_v4();
            let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);

            collections
                .entry(collection)
                .or_default()
                .push(Record::new(id, fields));

            Ok(id)
        }
        .boxed()
    }

    fn find(
        &self,
        collection: &'static str,
        filter: Fields,
        sort: &'static [&'static str],
    ) -> BoxFuture<Result<Vec<Record>, BackendError>> {
        async move {
            let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);

            let mut matches: Vec<Record> = collections
                .get(collection)
                .map(|records| {
                    records
                        .iter()
                        .filter(|record| matches_filter(record, &filter))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            // stable, so ties keep insertion order
            matches.sort_by(|a, b| compare_by(a, b, sort));

            Ok(matches)
        }
        .boxed()
    }

    fn find_by_id(&self, collection: &'static str, id: &Uuid) -> BoxFuture<Result<Option<Record>, BackendError>> {
        let id = *id;

        async move {
            let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);

            Ok(collections
                .get(collection)
                .and_then(|records| records.iter().find(|record| record.id == id))
                .cloned())
        }
        .boxed()
    }

    fn update_by_id(
        &self,
        collection: &'static str,
        id: &Uuid,
        set: Fields,
    ) -> BoxFuture<Result<u64, BackendError>> {
        let id = *id;

        async move {
            let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);

            let record = collections
                .get_mut(collection)
                .and_then(|records| records.iter_mut().find(|record| record.id == id));

            match record {
                Some(record) => {
                    record.fields.extend(set);
                    Ok(1)
                }
                None => Ok(0),
            }
        }
        .boxed()
    }

    fn delete_by_id(&self, collection: &'static str, id: &Uuid) -> BoxFuture<Result<u64, BackendError>> {
        let id = *id;

        async move {
            let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);

            let records = match collections.get_mut(collection) {
                Some(records) => records,
                None => return Ok(0),
            };

            let before = records.len();
            records.retain(|record| record.id != id);

            Ok((before - records.len()) as u64)
        }
        .boxed()
    }

    fn count(&self, collection: &'static str) -> BoxFuture<Result<i64, BackendError>> {
        async move {
            let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);

            Ok(collections.get(collection).map_or(0, |records| records.len() as i64))
        }
        .boxed()
    }
}

fn matches_filter(record: &Record, filter: &Fields) -> bool {
    filter
        .iter()
        .all(|(field, value)| record.fields.get(field) == Some(value))
}

fn compare_by(a: &Record, b: &Record, sort: &[&str]) -> Ordering {
    sort.iter()
        .map(|field| a.get(field).cmp(b.get(field)))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
