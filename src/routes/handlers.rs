use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::debug;
use serde_json::Value;
use warp::{
    http::StatusCode,
    reject,
    reply::{json, with_header, with_status, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::record::{input_from_value, Fields};
use crate::routes::{
    rejection::{Context, Rejection},
    response::SuccessResponse,
};

const SERVER_TIMING_HEADER: &str = "server-timing";
type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {
        let start = Instant::now();

        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    };
}

pub async fn search(environment: Environment, filter: HashMap<String, String>) -> RouteResult {
    timed! {
        let resource = environment.resource();
        let filter: Fields = filter.into_iter().collect();
        debug!(environment.logger, "Searching records..."; "resource" => resource, "filter" => ?filter);

        let records = environment
            .service
            .search(filter)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::search(resource), e))?;

        json(&records)
    }
}

pub async fn create(environment: Environment, body: Value) -> RouteResult {
    timed! {
        let resource = environment.resource();
        debug!(environment.logger, "Creating record..."; "resource" => resource);

        let created = environment
            .service
            .create(&input_from_value(body))
            .await
            .map_err(|e: BackendError| Rejection::new(Context::create(resource), e))?;

        match created {
            Some(record) => {
                let location = format!("/{}/{}", resource, record.id);

                Box::new(with_header(
                    with_status(json(&record), StatusCode::CREATED),
                    "location",
                    location,
                )) as Box<dyn Reply>
            }
            None => Box::new(with_status(json(&()), StatusCode::NOT_FOUND)) as Box<dyn Reply>,
        }
    }
}

pub async fn read(environment: Environment, id: String) -> RouteResult {
    timed! {
        let resource = environment.resource();
        let error_handler = |e: BackendError| Rejection::new(Context::read(resource, id.clone()), e);
        debug!(environment.logger, "Reading record..."; "resource" => resource, "id" => &id);

        let option = environment.service.read(&id).await.map_err(error_handler)?;

        match option {
            Some(record) => with_status(json(&record), StatusCode::OK),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

pub async fn update(environment: Environment, id: String, body: Value) -> RouteResult {
    timed! {
        let resource = environment.resource();
        let error_handler = |e: BackendError| Rejection::new(Context::update(resource, id.clone()), e);
        debug!(environment.logger, "Updating record..."; "resource" => resource, "id" => &id);

        let option = environment
            .service
            .update(&id, &input_from_value(body))
            .await
            .map_err(error_handler)?;

        match option {
            Some(record) => with_status(json(&record), StatusCode::OK),
            None => with_status(json(&()), StatusCode::NOT_FOUND),
        }
    }
}

pub async fn delete(environment: Environment, id: String) -> RouteResult {
    timed! {
        let resource = environment.resource();
        let error_handler = |e: BackendError| Rejection::new(Context::delete(resource, id.clone()), e);
        debug!(environment.logger, "Deleting record..."; "resource" => resource, "id" => &id);

        let count = environment.service.delete(&id).await.map_err(error_handler)?;

        json(&SuccessResponse::Deleted(count))
    }
}

fn format_server_timing(seconds: Duration) -> String {
    format!("handler;dur={}", seconds.as_secs_f64() * 1000.0)
}
