//! Addresses of the L2 predeploys and the beacon deposit contract.

use std::{collections::BTreeMap, sync::LazyLock};

use alloy::primitives::{address, b256, bytes, Address, Bytes, B256};

pub const PROXY_ADMIN: Address = address!("4200000000000000000000000000000000000000");
pub const WETH9: Address = address!("4200000000000000000000000000000000000001");
pub const L1_BLOCK: Address = address!("4200000000000000000000000000000000000002");
pub const L2_TO_L1_MESSAGE_PASSER: Address = address!("4200000000000000000000000000000000000003");
pub const L2_CROSS_DOMAIN_MESSENGER: Address =
    address!("4200000000000000000000000000000000000004");
pub const GAS_PRICE_ORACLE: Address = address!("4200000000000000000000000000000000000005");
pub const PROTOCOL_VAULT: Address = address!("4200000000000000000000000000000000000006");
pub const L1_FEE_VAULT: Address = address!("4200000000000000000000000000000000000007");
pub const VALIDATOR_REWARD_VAULT: Address = address!("4200000000000000000000000000000000000008");
pub const L2_STANDARD_BRIDGE: Address = address!("4200000000000000000000000000000000000009");
pub const GOVERNANCE_TOKEN: Address = address!("4200000000000000000000000000000000000010");
pub const L2_ERC721_BRIDGE: Address = address!("420000000000000000000000000000000000000A");
pub const KROMA_MINTABLE_ERC20_FACTORY: Address =
    address!("420000000000000000000000000000000000000B");
pub const KROMA_MINTABLE_ERC721_FACTORY: Address =
    address!("420000000000000000000000000000000000000C");

/// Deposit contract on the execution layer for the beacon chain.
pub const BEACON_DEPOSIT_CONTRACT: Address = address!("4242424242424242424242424242424242424242");
pub const BEACON_DEPOSIT_CONTRACT_CODE: Bytes = bytes!("3373fffffffffffffffffffffffffffffffffffffffe14604d57602036146024575f5ffd5b5f35801560495762001fff810690815414603c575f5ffd5b62001fff01545f5260205ff35b5f5ffd5b62001fff42064281555f359062001fff015500");
pub const BEACON_DEPOSIT_CONTRACT_CODE_HASH: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");

static PREDEPLOYS: LazyLock<BTreeMap<&'static str, Address>> = LazyLock::new(|| {
    BTreeMap::from([
        ("ProxyAdmin", PROXY_ADMIN),
        ("WETH9", WETH9),
        ("L1Block", L1_BLOCK),
        ("L2ToL1MessagePasser", L2_TO_L1_MESSAGE_PASSER),
        ("L2CrossDomainMessenger", L2_CROSS_DOMAIN_MESSENGER),
        ("GasPriceOracle", GAS_PRICE_ORACLE),
        ("ProtocolVault", PROTOCOL_VAULT),
        ("L1FeeVault", L1_FEE_VAULT),
        ("ValidatorRewardVault", VALIDATOR_REWARD_VAULT),
        ("L2StandardBridge", L2_STANDARD_BRIDGE),
        ("GovernanceToken", GOVERNANCE_TOKEN),
        ("L2ERC721Bridge", L2_ERC721_BRIDGE),
        ("KromaMintableERC20Factory", KROMA_MINTABLE_ERC20_FACTORY),
        ("KromaMintableERC721Factory", KROMA_MINTABLE_ERC721_FACTORY),
    ])
});

/// Every predeploy keyed by contract name.
pub fn predeploys() -> &'static BTreeMap<&'static str, Address> {
    &PREDEPLOYS
}

pub fn by_name(name: &str) -> Option<Address> {
    PREDEPLOYS.get(name).copied()
}

/// Whether the predeploy at `addr` sits behind a proxy. Only WETH9 is deployed bare.
pub fn is_proxied(addr: Address) -> bool {
    addr != WETH9
}
