//! Shared pipeline stages.
//!
//! - **decode**: load rasters and probe their encoding by content
//! - **eligibility**: decide whether a candidate is a processable source
//! - **discovery**: expand files, directories and glob patterns into candidates
//! - **batch**: run a per-file job over many candidates with bounded concurrency

pub mod batch;
pub mod decode;
pub mod discovery;
pub mod eligibility;

// Re-exports for convenient access
pub use batch::{run_batch, BatchEntry};
pub use decode::ImageDecoder;
pub use discovery::{Discovered, FileDiscovery};
pub use eligibility::{Eligibility, EligibilityFilter, Rejection, Severity};
