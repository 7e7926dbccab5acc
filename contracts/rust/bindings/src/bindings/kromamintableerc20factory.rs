// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.

//! Binding for the `KromaMintableERC20Factory` contract.

alloy::sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    KromaMintableERC20Factory,
    "artifacts/KromaMintableERC20Factory.json"
);
