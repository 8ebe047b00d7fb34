//! Question-answering job service.
//!
//! Exposes the building blocks (config, state, error handling, the job
//! engine, routes) so integration tests and the binary entrypoint can
//! both assemble the same application.

pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
