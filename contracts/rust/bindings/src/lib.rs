//! Rust bindings for the Kroma rollup contracts.
//!
//! [`bindings`] is generated by `kroma-bindings-gen` from the forge artifacts: one module per
//! contract, each expanding `alloy::sol!` over the embedded ABI and creation bytecode. A binding
//! exposes `deploy`/`deploy_builder`, a call builder per method (`.call()` for reads, `.send()`
//! for transactions) and a typed filter per event.
//!
//! The hand-written modules around them add the shared `Types` structs, the per-contract
//! registry metadata used by genesis tooling, the predeploy address table and event helpers.

pub mod bindings;
pub mod events;
pub mod predeploys;
pub mod registry;
pub mod types;

pub use bindings::*;
