use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, Reply, WithStatus};
use warp::Filter;

use super::response::SuccessResponse;
use crate::db::RecordStore;

/// `GET /healthz`: build info plus the number of records per collection.
/// Answers 503 when the store cannot be queried.
pub fn make_healthz_route(
    store: Arc<dyn RecordStore>,
    logger: Arc<Logger>,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    warp::path("healthz")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(move || healthz(store.clone(), logger.clone()))
}

async fn healthz(store: Arc<dyn RecordStore>, logger: Arc<Logger>) -> Result<WithStatus<Json>, Infallible> {
    let mut collections = BTreeMap::new();
    let mut status = StatusCode::OK;

    for schema in schema::ALL.iter() {
        match store.count(schema.collection).await {
            Ok(count) => {
                collections.insert(schema.collection, count);
            }
            Err(e) => {
                error!(logger, "Store unavailable"; "collection" => schema.collection, "error" => %e);
                status = StatusCode::SERVICE_UNAVAILABLE;
                break;
            }
        }
    }

    let reply = SuccessResponse::Healthz {
        name: info::NAME,
        revision: info::REVISION,
        timestamp: info::BUILD_TIMESTAMP,
        version: info::VERSION,
        collections: if status.is_success() { Some(collections) } else { None },
    };

    Ok(with_status(json(&reply), status))
}

type TerminationFuture<'a> = BoxFuture<'a, ()>;

/// Starts a graceful shutdown of every server.
pub type TerminationFunctionWrapper<'a> = Arc<dyn Fn() -> TerminationFuture<'a> + Send + Sync + 'a>;

/// `POST /terminate`
pub fn make_termination_route<'a>(
    terminate: TerminationFunctionWrapper<'a>,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + 'a {
    warp::path("terminate")
        .and(warp::path::end())
        .and(warp::post())
        .and_then(move || {
            let terminate = terminate.clone();

            async move {
                terminate().await;
                Ok::<_, Infallible>(StatusCode::NO_CONTENT)
            }
            .boxed()
        })
}
