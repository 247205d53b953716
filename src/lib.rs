//! libris: cache-backed client for a library catalog REST service.
//!
//! Reads go through a shared [`cache::EntityCache`] that de-duplicates
//! in-flight requests and fans results out to subscribers. Writes run as
//! [`query::Mutation`]s and invalidate cached reads by tag once they succeed.
//! [`routes::Router`] resolves loader data before a route mounts.

pub mod application;
pub mod cache;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod infra;
pub mod query;
pub mod routes;
pub mod transport;

pub use client::LibraryClient;
