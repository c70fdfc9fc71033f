use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use log::{info, initialize_logger, warn, Logger};
use schema::{LOGIN, RECIPE};
use tokio::sync::mpsc;
use warp::Filter;

use cookbook::config::{get_variable, parse_variable_or, StoreKind};
use cookbook::db::{MemoryDb, PgDb, RecordStore};
use cookbook::environment::Environment;
use cookbook::routes;
use cookbook::seed::seed_demo_data;
use cookbook::service::ResourceService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    #[cfg(feature = "env_logging")]
    let _guard = log::initialize_env_logger();

    let logger = initialize_logger("server");

    let main_port: u16 = parse_variable_or("BACKEND_PORT", 3000);
    let admin_port: u16 = parse_variable_or("BACKEND_ADMIN_PORT", 3001);
    let store_kind: StoreKind = parse_variable_or("BACKEND_STORE", StoreKind::Postgres);

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port, "store" => ?store_kind);
    let logger = Arc::new(logger);

    let store = create_store(&logger, store_kind).await;
    seed_demo_data(&logger, &store).await?;

    let recipes = Arc::new(ResourceService::new(&RECIPE, store.clone(), &logger));
    let logins = Arc::new(ResourceService::new(&LOGIN, store.clone(), &logger));

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate: routes::admin::TerminationFunctionWrapper<'static> = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            // a closed channel means shutdown is already under way
            let _ = termination_sender.send(()).await;
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();
        let logger = logger.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    info!(logger, "Received Ctrl+C");
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let logger2 = logger.clone();

        let cors = warp::cors()
            .allow_any_origin()
            .allow_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allow_header("content-type");

        let routes = routes::make_resource_routes(Environment::new(logger.clone(), recipes))
            .or(routes::make_resource_routes(Environment::new(logger.clone(), logins)))
            .recover(move |r| routes::format_rejection(logger2.clone(), r))
            .with(cors);

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::admin::make_healthz_route(store, logger.clone())
            .or(routes::admin::make_termination_route(terminate));

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Exiting gracefully...");

    Ok(())
}

async fn create_store(logger: &Logger, kind: StoreKind) -> Arc<dyn RecordStore> {
    match kind {
        StoreKind::Postgres => {
            info!(logger, "Creating database pool...");
            let connection_string = get_variable("BACKEND_DB_CONNECTION_STRING");
            let pool = sqlx::PgPool::connect(&connection_string)
                .await
                .expect("create database pool from BACKEND_DB_CONNECTION_STRING");

            Arc::new(PgDb::new(pool))
        }
        StoreKind::Memory => {
            warn!(logger, "Using the in-memory store; nothing will be persisted");

            Arc::new(MemoryDb::new())
        }
    }
}
