use std::sync::Arc;

use schema::{Fields, Schema};
use serde_json::Value;
use url::{form_urlencoded, Url};

use crate::backend::{Backend, Method};
use crate::error::{PageError, TransportError};

/// A record as the pages see it. Identifiers stay opaque strings.
pub type Entry = schema::Record<String>;

/// Typed access to one resource of the backend.
#[derive(Clone)]
pub struct ResourceClient {
    schema: &'static Schema,
    backend: Arc<dyn Backend>,
}

impl ResourceClient {
    pub fn new(schema: &'static Schema, backend: Arc<dyn Backend>) -> Self {
        ResourceClient { schema, backend }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Records whose fields equal every pair in `filter`.
    pub async fn search(&self, filter: &Fields) -> Result<Vec<Entry>, PageError> {
        let mut path = format!("/{}", self.schema.resource);

        if !filter.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(filter.iter())
                .finish();
            path.push('?');
            path.push_str(&query);
        }

        let value = self.backend.fetch(Method::Get, &path, None).await?;
        decode(&path, value)
    }

    pub async fn create(&self, fields: &Fields) -> Result<Entry, PageError> {
        let path = format!("/{}", self.schema.resource);
        let value = self
            .backend
            .fetch(Method::Post, &path, Some(body(fields)))
            .await?;
        decode(&path, value)
    }

    pub async fn read(&self, id: &str) -> Result<Entry, PageError> {
        let path = self.item_path(Method::Get, id)?;
        let value = self.backend.fetch(Method::Get, &path, None).await?;
        decode(&path, value)
    }

    /// Sends `fields` as a sparse patch and returns the stored result.
    pub async fn update(&self, id: &str, fields: &Fields) -> Result<Entry, PageError> {
        let path = self.item_path(Method::Put, id)?;
        let value = self
            .backend
            .fetch(Method::Put, &path, Some(body(fields)))
            .await?;
        decode(&path, value)
    }

    /// Returns how many records were removed.
    pub async fn delete(&self, id: &str) -> Result<u64, PageError> {
        let path = self.item_path(Method::Delete, id)?;
        let value = self.backend.fetch(Method::Delete, &path, None).await?;
        decode(&path, value)
    }

    /// `/<resource>/<id>` with `id` percent-encoded as one path segment.
    fn item_path(&self, method: Method, id: &str) -> Result<String, PageError> {
        let failure = |source: url::ParseError| PageError::TransportFailure {
            method,
            path: format!("/{}/{}", self.schema.resource, id),
            source: TransportError::Url(source),
        };

        let mut url = Url::parse("http://localhost/").map_err(failure)?;
        url.path_segments_mut()
            .map_err(|()| failure(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .clear()
            .push(self.schema.resource)
            .push(id);

        Ok(url.path().to_owned())
    }
}

fn body(fields: &Fields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect(),
    )
}

fn decode<T: serde::de::DeserializeOwned>(path: &str, value: Value) -> Result<T, PageError> {
    serde_json::from_value(value).map_err(|source| PageError::Decode {
        path: path.to_owned(),
        source,
    })
}
