//! High-level service facade for osmgrid operations.
//!
//! [`ExtractService`] wires the fetch orchestrator, the merge coordinator and
//! the cleanup coordinator into one call: partition, fetch, merge, clean up.
//!
//! # Example
//!
//! ```ignore
//! use osmgrid::service::{ExtractRequest, ExtractService, ServiceConfig};
//!
//! let config = ServiceConfig::builder().work_dir("out").build();
//! let service = ExtractService::new(&config)?;
//! let tiles = service.plan(&request)?;
//! ```

mod config;
mod error;
mod facade;

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::ServiceError;
pub use facade::{ExtractReport, ExtractRequest, ExtractService, HttpExtractService};
