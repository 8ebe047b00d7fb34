//! Row models.

pub mod job;
