//! Merging tile files into one output.
//!
//! [`TileMerger`] is the seam; [`CommandMerger`] shells out to an external
//! tool such as `osmconvert`. [`MergeCoordinator`] wraps a merger and never
//! fails: it reports a [`MergeResult`] instead.

mod command;
mod coordinator;
mod types;

pub use command::{CommandMerger, DEFAULT_MERGE_COMMAND};
pub use coordinator::MergeCoordinator;
pub use types::{MergeError, MergeResult, TileMerger};
