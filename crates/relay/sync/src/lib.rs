//! # btc-mirror-sync
//!
//! The header relay. A [`Synchronizer`] pass reads the mirror and the live chain, finds the most
//! recent height where they agree, and submits the live headers above it as one contiguous
//! [`SubmissionBatch`].
//!
//! A pass keeps nothing between runs. Restarting the process or running again after a failure
//! recomputes everything from the two remote sources.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod errors;
pub use errors::{SyncConfigError, SyncError};

mod config;
pub use config::{GasSchedule, SyncConfig};

mod cache;
pub use cache::HashCache;

mod reconcile;
pub use reconcile::{ReconciliationResult, find_common_height};

mod batch;
pub use batch::SubmissionBatch;

mod synchronizer;
pub use synchronizer::{MirrorStatus, SyncOutcome, Synchronizer};
