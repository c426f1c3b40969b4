//! Product catalog REST API: items with option values and images, behind
//! bearer-token authentication, with filtered and paginated listings.

pub mod config;
pub mod db;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod requests;
pub mod resources;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
