// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.

//! Binding for the `ZKMerkleTrie` contract.

alloy::sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    ZKMerkleTrie,
    "artifacts/ZKMerkleTrie.json"
);
