pub mod cli;
pub mod config;
pub mod engine;
pub mod geo;
pub mod ingest;
pub mod parallel;
pub mod registry;
pub mod server;
pub mod views;
