//! The fee guard.
//!
//! On rollups that settle to L1, the cost of a submission tracks the L1 base fee. The guard reads
//! a [`FeeOracle`] and tells the relay to skip the run when the estimate is above a ceiling.

use crate::{FeeGuardError, bindings::IGasPriceOracle::l1BaseFeeCall};
use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use tracing::{debug, warn};

/// One gwei, in wei.
pub const GWEI: u64 = 1_000_000_000;

/// A source of fee estimates, in gwei.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeeOracle: Debug + Send + Sync {
    /// Returns the current fee estimate, in gwei.
    async fn current_fee_estimate(&self) -> Result<u64, FeeGuardError>;
}

#[async_trait]
impl<T: FeeOracle + ?Sized> FeeOracle for Arc<T> {
    async fn current_fee_estimate(&self) -> Result<u64, FeeGuardError> {
        (**self).current_fee_estimate().await
    }
}

/// Converts wei to gwei, rounding half up. Saturates at [`u64::MAX`].
pub fn wei_to_gwei(wei: U256) -> u64 {
    let gwei = wei.saturating_add(U256::from(GWEI / 2)) / U256::from(GWEI);
    u64::try_from(gwei).unwrap_or(u64::MAX)
}

/// A [`FeeOracle`] reading `l1BaseFee()` from an OP Stack `GasPriceOracle`.
#[derive(Clone)]
pub struct L1BaseFeeOracle<P = DynProvider> {
    provider: P,
    address: Address,
}

impl<P> Debug for L1BaseFeeOracle<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L1BaseFeeOracle").field("address", &self.address).finish()
    }
}

impl<P: Provider> L1BaseFeeOracle<P> {
    /// Creates an oracle reading the predeploy at
    /// [`GAS_PRICE_ORACLE_ADDRESS`](crate::GAS_PRICE_ORACLE_ADDRESS).
    pub const fn new(provider: P) -> Self {
        Self::with_address(provider, crate::GAS_PRICE_ORACLE_ADDRESS)
    }

    /// Creates an oracle reading the contract at `address`.
    pub const fn with_address(provider: P, address: Address) -> Self {
        Self { provider, address }
    }
}

#[async_trait]
impl<P: Provider> FeeOracle for L1BaseFeeOracle<P> {
    async fn current_fee_estimate(&self) -> Result<u64, FeeGuardError> {
        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(l1BaseFeeCall {}.abi_encode());
        let data = self.provider.call(tx).await?;
        let wei = l1BaseFeeCall::abi_decode_returns(&data)?;
        Ok(wei_to_gwei(wei))
    }
}

/// The verdict of a [`FeeGuard`] check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeDecision {
    /// Go ahead. `observed` is `None` when no oracle is configured.
    Proceed {
        /// The observed fee, in gwei.
        observed: Option<u64>,
    },
    /// The fee is above the ceiling; submit nothing this run.
    Skip {
        /// The observed fee, in gwei.
        observed: u64,
        /// The configured ceiling, in gwei.
        ceiling: u64,
    },
}

/// Compares a [`FeeOracle`] estimate to a ceiling.
///
/// A guard without an oracle always proceeds.
#[derive(Debug, Clone)]
pub struct FeeGuard {
    oracle: Option<Arc<dyn FeeOracle>>,
    ceiling_gwei: u64,
}

impl FeeGuard {
    /// A guard that never skips.
    pub const fn disabled() -> Self {
        Self { oracle: None, ceiling_gwei: u64::MAX }
    }

    /// A guard skipping whenever `oracle` reports more than `ceiling_gwei`.
    pub fn new(oracle: impl FeeOracle + 'static, ceiling_gwei: u64) -> Self {
        Self { oracle: Some(Arc::new(oracle)), ceiling_gwei }
    }

    /// Returns the ceiling, or `None` if the guard is disabled.
    pub const fn ceiling_gwei(&self) -> Option<u64> {
        if self.oracle.is_some() { Some(self.ceiling_gwei) } else { None }
    }

    /// Reads the oracle and decides.
    pub async fn check(&self) -> Result<FeeDecision, FeeGuardError> {
        let Some(oracle) = &self.oracle else {
            return Ok(FeeDecision::Proceed { observed: None });
        };

        let observed = oracle.current_fee_estimate().await?;
        let ceiling = self.ceiling_gwei;
        if observed > ceiling {
            warn!(target: "fee_guard", observed, ceiling, "Fee above ceiling, skipping submission");
            return Ok(FeeDecision::Skip { observed, ceiling });
        }

        debug!(target: "fee_guard", observed, ceiling, "Fee within ceiling");
        Ok(FeeDecision::Proceed { observed: Some(observed) })
    }
}

impl Default for FeeGuard {
    fn default() -> Self {
        Self::disabled()
    }
}
