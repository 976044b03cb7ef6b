pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod planner;
pub mod routes;
pub mod services;
pub mod state;
