// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.

//! Contract bindings, one module per contract.

pub mod gaspriceoracle;
pub mod kromal1block;
pub mod kromamintableerc20;
pub mod kromamintableerc20factory;
pub mod l1block;
pub mod l1standardbridge;
pub mod l2erc721bridge;
pub mod l2outputoracle;
pub mod l2tol1messagepasser;
pub mod mintmanager;
pub mod protocolvault;
pub mod proxyadmin;
pub mod securitycouncil;
pub mod upgradegovernor;
pub mod validatorpool;
pub mod validatorrewardvault;
pub mod zkmerkletrie;
pub mod zkproofverifier;
pub mod zktriehasher;

pub use self::{
    gaspriceoracle::GasPriceOracle,
    kromal1block::KromaL1Block,
    kromamintableerc20::KromaMintableERC20,
    kromamintableerc20factory::KromaMintableERC20Factory,
    l1block::L1Block,
    l1standardbridge::L1StandardBridge,
    l2erc721bridge::L2ERC721Bridge,
    l2outputoracle::L2OutputOracle,
    l2tol1messagepasser::L2ToL1MessagePasser,
    mintmanager::MintManager,
    protocolvault::ProtocolVault,
    proxyadmin::ProxyAdmin,
    securitycouncil::SecurityCouncil,
    upgradegovernor::UpgradeGovernor,
    validatorpool::ValidatorPool,
    validatorrewardvault::ValidatorRewardVault,
    zkmerkletrie::ZKMerkleTrie,
    zkproofverifier::ZKProofVerifier,
    zktriehasher::ZKTrieHasher,
};

/// Registry metadata of each contract, keyed by contract name.
pub(crate) const METADATA: &[(&str, &str)] = &[
    ("CrossDomainMessenger", include_str!("../../artifacts/more/CrossDomainMessenger.json")),
    ("GasPriceOracle", include_str!("../../artifacts/more/GasPriceOracle.json")),
    ("MintManager", include_str!("../../artifacts/more/MintManager.json")),
    ("ZKProofVerifier", include_str!("../../artifacts/more/ZKProofVerifier.json")),
    ("ZKTrieHasher", include_str!("../../artifacts/more/ZKTrieHasher.json")),
];
