//! User Enrichment API Library
//!
//! Stores user records and enriches them with inferred age, gender and
//! nationality from external name-inference APIs, exposing CRUD endpoints with
//! filtering and pagination.
//!
//! # Modules
//!
//! - `config`: Configuration management (environment and YAML templates).
//! - `db`: Database connection pool and schema synchronization.
//! - `enrichment`: Name-inference client.
//! - `errors`: Error handling types.
//! - `filters`: Query parameter to filter/page translation.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models.
//! - `repository`: User storage contract and its PostgreSQL implementation.
//! - `routes`: Router assembly and OpenAPI document.

pub mod config;
pub mod db;
pub mod enrichment;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
