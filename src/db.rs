use futures::future::BoxFuture;
use uuid::Uuid;

use crate::errors::BackendError;
use crate::record::{Fields, Record};

mod memory;

pub use memory::MemoryDb;

/// A set of document collections. Each document is a flat map of string
/// fields under an identifier the store assigns on insertion.
///
/// Every call is a round trip; implementations do not cache.
pub trait RecordStore: Send + Sync {
    /// Stores a new document and returns its identifier.
    fn insert(&self, collection: &'static str, fields: Fields) -> BoxFuture<Result<Uuid, BackendError>>;

    /// Returns the documents whose fields equal every entry in `filter`,
    /// ordered ascending by the fields in `sort` and then by insertion.
    fn find(
        &self,
        collection: &'static str,
        filter: Fields,
        sort: &'static [&'static str],
    ) -> BoxFuture<Result<Vec<Record>, BackendError>>;

    fn find_by_id(&self, collection: &'static str, id: &Uuid) -> BoxFuture<Result<Option<Record>, BackendError>>;

    /// Overwrites the given fields of a document, leaving the others
    /// alone. Returns the number of documents matched.
    fn update_by_id(
        &self,
        collection: &'static str,
        id: &Uuid,
        set: Fields,
    ) -> BoxFuture<Result<u64, BackendError>>;

    /// Returns the number of documents removed.
    fn delete_by_id(&self, collection: &'static str, id: &Uuid) -> BoxFuture<Result<u64, BackendError>>;

    fn count(&self, collection: &'static str) -> BoxFuture<Result<i64, BackendError>>;
}

pub use self::postgres::*;

mod postgres {
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use sqlx::postgres::PgPool;
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::errors::BackendError;
    use crate::record::{Fields, Record};

    /// A [`RecordStore`](super::RecordStore) keeping every collection in
    /// the `documents` table, one JSONB body per row.
    pub struct PgDb {
        pool: PgPool,
    }

    impl PgDb {
        pub fn new(pool: PgPool) -> Self {
            PgDb { pool }
        }
    }

    // these can be simplified once async functions in traits are usable with `dyn`
    impl super::RecordStore for PgDb {
        fn insert(&self, collection: &'static str, fields: Fields) -> BoxFuture<Result<Uuid, BackendError>> {
            async move {
                let query = sqlx::query_as(include_str!("queries/insert.sql"));

                let (id,): (Uuid,) = query
                    .bind(collection)
                    .bind(Json(fields))
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

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
                let query = sqlx::query_as::<_, (Uuid, serde_json::Value)>(include_str!("queries/find.sql"));

                let rows = query
                    .bind(collection)
                    .bind(Json(filter))
                    .bind(sort.iter().map(|field| field.to_string()).collect::<Vec<_>>())
                    .fetch_all(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                rows.into_iter().map(|(id, body)| decode(id, body)).collect()
            }
            .boxed()
        }

        fn find_by_id(&self, collection: &'static str, id: &Uuid) -> BoxFuture<Result<Option<Record>, BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query_as::<_, (Uuid, serde_json::Value)>(include_str!("queries/find_by_id.sql"));

                let row = query
                    .bind(collection)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                row.map(|(id, body)| decode(id, body)).transpose()
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
                let query = sqlx::query(include_str!("queries/update_by_id.sql"));

                let count = query
                    .bind(collection)
                    .bind(id)
                    .bind(Json(set))
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                Ok(count)
            }
            .boxed()
        }

        fn delete_by_id(&self, collection: &'static str, id: &Uuid) -> BoxFuture<Result<u64, BackendError>> {
            let id = *id;

            async move {
                let query = sqlx::query(include_str!("queries/delete_by_id.sql"));

                let count = query
                    .bind(collection)
                    .bind(id)
                    .execute(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();

                Ok(count)
            }
            .boxed()
        }

        fn count(&self, collection: &'static str) -> BoxFuture<Result<i64, BackendError>> {
            async move {
                let query = sqlx::query_as::<_, (i64,)>(include_str!("queries/count.sql"));

                let (count,) = query
                    .bind(collection)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

                Ok(count)
            }
            .boxed()
        }
    }

    fn decode(id: Uuid, body: serde_json::Value) -> Result<Record, BackendError> {
        let fields: Fields =
            serde_json::from_value(body).map_err(|source| BackendError::CorruptDocument { id, source })?;

        Ok(Record::new(id, fields))
    }

    fn map_sqlx_error(error: sqlx::Error) -> BackendError {
        BackendError::Sqlx { source: error }
    }
}
