pub mod audit;
pub mod config;
pub mod engine;
pub mod generator;
pub mod store;
