//! # btc-mirror-bitcoin
//!
//! Read access to the live Bitcoin chain for the header relay.
//!
//! - [`RpcTransport`] is a generic JSON-RPC request/response client. [`HttpTransport`] is the
//!   production implementation: one POST per call, a process-local id counter, and no retries.
//! - [`SourceChainProvider`] is the typed adapter contract the relay consumes: tip height,
//!   hash-at-height and header-at-hash. [`BitcoinRpcClient`] implements it over any transport.
//!
//! With the `test-utils` feature, [`test_utils::InMemoryBitcoinNode`] serves a synthetic chain
//! behind the same transport trait.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod errors;
pub use errors::{RpcError, SourceError, SourceResult};

mod transport;
pub use transport::{
    API_KEY_HEADER, HttpTransport, JSONRPC_VERSION, JsonRpcErrorObject, JsonRpcRequest,
    JsonRpcResponse, RpcTransport,
};

mod types;
pub use types::{BlockHash, BlockHeader, BlockJson, HEADER_SIZE, HeaderParseError, Height};

mod config;
pub use config::{BitcoinNetwork, BitcoinRpcConfig};

mod client;
pub use client::{BitcoinMethod, BitcoinRpcClient, SourceChainProvider};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
