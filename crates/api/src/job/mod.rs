//! Analysis job execution.
//!
//! A job is one ticker analysis tied to a single WebSocket connection. The
//! [`JobRunner`] owns its state machine and is the only writer of progress
//! events.

pub mod runner;

pub use runner::{JobContext, JobError, JobRunner};
