//! On-chain collaborators: the pool-state oracle and deployment config.
//!
//! The pool's own pricing math stays on-chain; this crate only reads state
//! (batched `eth_call`s) and hands back immutable [`PoolState`] snapshots
//! for the quoter to simulate against.
//!
//! [`PoolState`]: powerperp_domain::PoolState

/// Pool contract ABI fragments.
pub mod abi;
/// Networks and deployment addresses.
pub mod config;
/// Pool-state oracle.
pub mod oracle;

pub use config::{DeploymentConfig, Network};
pub use oracle::{OracleError, PoolStateOracle, RpcPoolOracle};
