// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.

//! Binding for the `KromaL1Block` contract.

alloy::sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    KromaL1Block,
    "artifacts/KromaL1Block.json"
);
