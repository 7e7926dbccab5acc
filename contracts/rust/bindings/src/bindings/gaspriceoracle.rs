// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.

//! Binding for the `GasPriceOracle` contract.

alloy::sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    GasPriceOracle,
    "artifacts/GasPriceOracle.json"
);
