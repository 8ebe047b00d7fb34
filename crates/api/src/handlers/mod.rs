//! HTTP handlers.

pub mod jobs;
pub mod status;
