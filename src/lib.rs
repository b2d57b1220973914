pub mod config;
pub mod db;
pub mod error;
pub mod hosting;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod report;
pub mod routes;
pub mod state;
