pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod record;
pub mod routes;
pub mod seed;
pub mod service;
