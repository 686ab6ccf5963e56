//! Solidity bindings for the contracts the relay talks to.

use alloy_primitives::{Address, address};
use alloy_sol_types::sol;

/// The Optimism `GasPriceOracle` predeploy.
pub const GAS_PRICE_ORACLE_ADDRESS: Address =
    address!("0x420000000000000000000000000000000000000F");

sol! {
    /// The on-chain Bitcoin header mirror.
    interface IBtcMirror {
        /// Returns the height of the latest accepted block.
        function getLatestBlockHeight() external view returns (uint256);

        /// Returns the hash recorded at `number`.
        function getBlockHash(uint256 number) external view returns (bytes32);

        /// Extends the mirror with consecutive 80-byte headers starting at `blockHeight`.
        function submit(uint256 blockHeight, bytes calldata blockHeaders) external;
    }

    /// The L1 fee oracle exposed by OP Stack chains.
    interface IGasPriceOracle {
        /// Returns the latest known L1 base fee, in wei.
        function l1BaseFee() external view returns (uint256);
    }
}
