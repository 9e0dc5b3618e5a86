//! Concrete collaborators for the analysis service.
//!
//! - [`CommandEngine`] runs the external analysis pipeline as a child process.
//! - [`SimulatedEngine`] stands in for it in development, writing a
//!   placeholder report after a fixed delay.
//! - [`FsArtifactStore`] reads reports back from the output directory.
//! - [`FinnhubValidator`] looks ticker symbols up on Finnhub.

pub mod command;
pub mod finnhub;
pub mod simulated;
pub mod store;

pub use command::CommandEngine;
pub use finnhub::FinnhubValidator;
pub use simulated::SimulatedEngine;
pub use store::FsArtifactStore;
