use std::sync::Arc;

use log::{error, Logger};
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};

use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod rejection;
mod response;

pub use internal::*;

/// The largest request body to accept. Records are a handful of short
/// strings, so anything bigger is not a record.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

/// Renders a failed request. Only errors raised by our own handlers are
/// handled here; anything else (unknown paths, wrong methods, unreadable
/// bodies) is left for warp to answer.
pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    use BackendError::*;

    match e {
        InvalidIdentifier(..) => StatusCode::BAD_REQUEST,
        CorruptDocument { .. } | Sqlx { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

mod internal {
    use std::collections::HashMap;

    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{body, delete as d, get as g, path as p, path::param as par, post, put, query};

    use super::{handlers, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    pub type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
        ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
        ($route_variable:ident; $first:expr, $($rest:expr),+) => (
            let $route_variable = $route_variable.and($first);
            route_filter!($route_variable; $($rest),+);
        )
    }

    macro_rules! route {
        ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
            pub fn $name(environment: Environment) -> Route {
                let resource = environment.resource();

                let $route_variable = warp::any()
                    .map(move || environment.clone())
                    .and(p(resource));

                route_filter!($route_variable; $($filters),+);

                $route_variable.and_then(handlers::$handler)
                    .boxed()
            }
        );
    }

    route!(make_search_route => search, rt; end(), g(), query::<HashMap<String, String>>());
    route!(make_create_route => create, rt; end(), post(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<serde_json::Value>());
    route!(make_read_route => read, rt; par::<String>(), end(), g());
    route!(make_update_route => update, rt; par::<String>(), end(), put(), body::content_length_limit(MAX_CONTENT_LENGTH), body::json::<serde_json::Value>());
    route!(make_delete_route => delete, rt; par::<String>(), end(), d());

    /// Every route of one resource.
    pub fn make_resource_routes(environment: Environment) -> Route {
        make_search_route(environment.clone())
            .or(make_create_route(environment.clone()))
            .unify()
            .or(make_read_route(environment.clone()))
            .unify()
            .or(make_update_route(environment.clone()))
            .unify()
            .or(make_delete_route(environment))
            .unify()
            .boxed()
    }
}
