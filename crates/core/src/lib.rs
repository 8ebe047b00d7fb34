//! Domain building blocks for the question-answering job service.
//!
//! Nothing in this crate touches the database: job identifiers, the status
//! state machine, domain errors, and the external command executor live
//! here so they can be tested in isolation.

pub mod error;
pub mod executor;
pub mod status;
pub mod types;
