pub mod diagnostics;
pub mod prediction;
pub mod scoring;
pub mod summary;
