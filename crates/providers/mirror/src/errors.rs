//! Errors for the mirror-contract client and the fee guard.

use alloy_primitives::U256;
use alloy_transport::TransportError;
use thiserror::Error;

/// An error raised by a [`MirrorProvider`](crate::MirrorProvider).
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The destination RPC failed to serve a read.
    #[error("mirror rpc error: {0}")]
    Transport(#[from] TransportError),
    /// The contract returned data that does not match its ABI.
    #[error("failed to decode mirror return data: {0}")]
    Decode(#[from] alloy_sol_types::Error),
    /// The submission transaction could not be sent.
    #[error("failed to send submission: {0}")]
    Send(#[source] TransportError),
    /// The contract reported a height that does not fit a [`Height`](btc_mirror_bitcoin::Height).
    #[error("mirror height {0} overflows u64")]
    HeightOverflow(U256),
}

/// A [`Result`] alias for mirror-contract calls.
pub type MirrorResult<T> = Result<T, MirrorError>;

/// An error raised while reading a fee oracle.
#[derive(Debug, Error)]
pub enum FeeGuardError {
    /// The oracle read failed.
    #[error("fee oracle rpc error: {0}")]
    Transport(#[from] TransportError),
    /// The oracle returned data that does not match its ABI.
    #[error("failed to decode fee oracle return data: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}
