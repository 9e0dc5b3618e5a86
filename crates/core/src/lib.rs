//! Domain types and collaborator interfaces for the stock analysis service.
//!
//! Nothing here performs I/O. The API crate drives jobs with these types;
//! the engine crate implements the collaborator traits.

pub mod action;
pub mod artifact;
pub mod engine;
pub mod error;
pub mod job;
pub mod job_events;
pub mod progress;
pub mod request;
pub mod ticker;
pub mod types;
