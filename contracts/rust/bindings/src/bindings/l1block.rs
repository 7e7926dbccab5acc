// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.

//! Binding for the `L1Block` contract.

alloy::sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    L1Block,
    "artifacts/L1Block.json"
);
