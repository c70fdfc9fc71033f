//! The generic create/read/update/delete logic shared by every entity.
//!
//! A [`ResourceService`] is instantiated once per [`Schema`]; it owns the
//! entity’s field whitelist and default-value policy and translates
//! requests into [`RecordStore`] calls. After every write it reads the
//! record back, so callers always see what is durably stored.

use std::sync::Arc;

use log::{debug, o, Logger};
use schema::Schema;

use crate::db::RecordStore;
use crate::errors::{parse_id, BackendError};
use crate::record::{truthy_text, Fields, Input, Record};

pub struct ResourceService {
    schema: &'static Schema,
    store: Arc<dyn RecordStore>,
    logger: Logger,
}

impl ResourceService {
    pub fn new(schema: &'static Schema, store: Arc<dyn RecordStore>, logger: &Logger) -> Self {
        ResourceService {
            schema,
            store,
            logger: logger.new(o!("resource" => schema.resource)),
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Returns every record whose fields equal the given values, in the
    /// schema’s declared order. An empty filter matches everything.
    pub async fn search(&self, filter: Fields) -> Result<Vec<Record>, BackendError> {
        debug!(self.logger, "Searching..."; "filter" => ?filter);

        self.store
            .find(self.schema.collection, filter, self.schema.fields)
            .await
    }

    /// Stores a new record built from the declared fields of `input`.
    /// Missing or falsy fields become empty strings; unknown keys and any
    /// supplied identifier are ignored.
    pub async fn create(&self, input: &Input) -> Result<Option<Record>, BackendError> {
        let fields: Fields = self
            .schema
            .fields
            .iter()
            .map(|field| ((*field).to_owned(), truthy_text(input, field).unwrap_or_default()))
            .collect();

        let id = self.store.insert(self.schema.collection, fields).await?;
        debug!(self.logger, "Created record"; "id" => %id);

        self.store.find_by_id(self.schema.collection, &id).await
    }

    /// Looks a record up by its identifier. `Ok(None)` means there is no
    /// such record.
    pub async fn read(&self, id: &str) -> Result<Option<Record>, BackendError> {
        let id = parse_id(id)?;

        self.store.find_by_id(self.schema.collection, &id).await
    }

    /// Overwrites the declared fields that are present and truthy in
    /// `input`; everything else keeps its stored value, so sending an empty
    /// string does not clear a field. `Ok(None)` means there is no such
    /// record.
    pub async fn update(&self, id: &str, input: &Input) -> Result<Option<Record>, BackendError> {
        let id = parse_id(id)?;
        let collection = self.schema.collection;

        if self.store.find_by_id(collection, &id).await?.is_none() {
            debug!(self.logger, "Nothing to update"; "id" => %id);
            return Ok(None);
        }

        let set: Fields = self
            .schema
            .fields
            .iter()
            .filter_map(|field| truthy_text(input, field).map(|value| ((*field).to_owned(), value)))
            .collect();

        if !set.is_empty() {
            debug!(self.logger, "Updating record"; "id" => %id, "fields" => set.len());
            self.store.update_by_id(collection, &id, set).await?;
        }

        self.store.find_by_id(collection, &id).await
    }

    /// Removes a record permanently. Returns how many records were
    /// removed, which is 0 when there was nothing to remove.
    pub async fn delete(&self, id: &str) -> Result<u64, BackendError> {
        let id = parse_id(id)?;

        let count = self.store.delete_by_id(self.schema.collection, &id).await?;
        debug!(self.logger, "Deleted"; "id" => %id, "count" => count);

        Ok(count)
    }
}
