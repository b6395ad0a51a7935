pub mod config;
pub mod dataset;
pub mod deployment;
pub mod diagnostics;
pub mod drift;
pub mod error;
pub mod handle;
pub mod ingestion;
pub mod io;
pub mod manifest;
pub mod model;
pub mod paths;
pub mod reporting;
pub mod scoring;
pub mod training;

pub use error::{PipelineError, Result};
