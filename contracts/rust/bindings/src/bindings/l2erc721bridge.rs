// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.

//! Binding for the `L2ERC721Bridge` contract.

alloy::sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    L2ERC721Bridge,
    "artifacts/L2ERC721Bridge.json"
);
