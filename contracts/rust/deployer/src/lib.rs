use std::{collections::HashMap, io::Write, time::Duration};

use alloy::{
    contract::RawCallBuilder,
    network::{Ethereum, EthereumWallet},
    primitives::{Address, U256},
    providers::{
        fillers::{FillProvider, JoinFill, WalletFiller},
        utils::JoinedRecommendedFillers,
        Provider, ProviderBuilder, RootProvider,
    },
    rpc::{
        client::RpcClient,
        types::{Log, TransactionReceipt},
    },
    signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner},
    transports::http::reqwest::Url,
};
use anyhow::{anyhow, ensure, Context, Result};
use clap::{builder::OsStr, Parser};
use derive_more::{derive::Deref, Display};
use kroma_bindings::{
    events::parse_log, KromaMintableERC20Factory, L2OutputOracle, ProxyAdmin, ValidatorPool,
};

pub mod builder;

/// Type alias that connects to providers with recommended fillers and wallet
/// use `<HttpProviderWithWallet as WalletProvider>::wallet()` to access internal wallet
/// use `<HttpProviderWithWallet as WalletProvider>::default_signer_address(&provider)` to get wallet address
pub type HttpProviderWithWallet = FillProvider<
    JoinFill<JoinedRecommendedFillers, WalletFiller<EthereumWallet>>,
    RootProvider,
    Ethereum,
>;

/// a handy thin wrapper around wallet builder and provider builder that directly
/// returns an instantiated `Provider` with default fillers with wallet, ready to send tx
pub fn build_provider(
    mnemonic: String,
    account_index: u32,
    url: Url,
    poll_interval: Option<Duration>,
) -> Result<HttpProviderWithWallet> {
    let signer = build_signer(mnemonic, account_index)?;
    let wallet = EthereumWallet::from(signer);

    // alloy guesses the polling interval from the RPC url, which is wrong for a local node
    // reached through docker. Allow overriding it.
    if let Some(interval) = poll_interval {
        tracing::info!("Using custom L1 poll interval: {interval:?}");
        let client = RpcClient::new_http(url.clone()).with_poll_interval(interval);
        Ok(ProviderBuilder::new().wallet(wallet).on_client(client))
    } else {
        tracing::info!("Using default L1 poll interval");
        Ok(ProviderBuilder::new().wallet(wallet).on_http(url))
    }
}

pub fn build_signer(mnemonic: String, account_index: u32) -> Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .index(account_index)
        .context("wrong mnemonic or index")?
        .build()
        .context("fail to build signer")
}

/// similar to [`build_provider()`] but using a random wallet
pub fn build_random_provider(url: Url) -> Result<HttpProviderWithWallet> {
    let signer = MnemonicBuilder::<English>::default()
        .build_random()
        .context("fail to build signer")?;
    let wallet = EthereumWallet::from(signer);
    Ok(ProviderBuilder::new().wallet(wallet).on_http(url))
}

/// Set of predeployed contracts.
#[derive(Clone, Debug, Parser)]
pub struct DeployedContracts {
    /// Use an already-deployed ProxyAdmin.sol instead of deploying a new one.
    #[clap(long, env = Contract::ProxyAdmin)]
    proxy_admin: Option<Address>,

    /// Use an already-deployed ValidatorPool.sol instead of deploying a new one.
    #[clap(long, env = Contract::ValidatorPool)]
    validator_pool: Option<Address>,

    /// Use an already-deployed L2OutputOracle.sol instead of deploying a new one.
    #[clap(long, env = Contract::L2OutputOracle)]
    l2_output_oracle: Option<Address>,

    /// Use an already-deployed KromaMintableERC20Factory.sol instead of deploying a new one.
    #[clap(long, env = Contract::KromaMintableERC20Factory)]
    kroma_mintable_erc20_factory: Option<Address>,
}

/// An identifier for a particular contract.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Contract {
    #[display("KROMA_PROXY_ADMIN_ADDRESS")]
    ProxyAdmin,
    #[display("KROMA_VALIDATOR_POOL_ADDRESS")]
    ValidatorPool,
    #[display("KROMA_L2_OUTPUT_ORACLE_ADDRESS")]
    L2OutputOracle,
    #[display("KROMA_MINTABLE_ERC20_FACTORY_ADDRESS")]
    KromaMintableERC20Factory,
}

impl From<Contract> for OsStr {
    fn from(c: Contract) -> OsStr {
        c.to_string().into()
    }
}

/// Cache of contracts predeployed or deployed during this current run.
#[derive(Deref, Debug, Clone, Default)]
pub struct Contracts(HashMap<Contract, Address>);

impl From<DeployedContracts> for Contracts {
    fn from(deployed: DeployedContracts) -> Self {
        let mut m = HashMap::new();
        if let Some(addr) = deployed.proxy_admin {
            m.insert(Contract::ProxyAdmin, addr);
        }
        if let Some(addr) = deployed.validator_pool {
            m.insert(Contract::ValidatorPool, addr);
        }
        if let Some(addr) = deployed.l2_output_oracle {
            m.insert(Contract::L2OutputOracle, addr);
        }
        if let Some(addr) = deployed.kroma_mintable_erc20_factory {
            m.insert(Contract::KromaMintableERC20Factory, addr);
        }
        Self(m)
    }
}

impl Contracts {
    pub fn new() -> Self {
        Contracts(HashMap::new())
    }

    pub fn address(&self, contract: Contract) -> Option<Address> {
        self.0.get(&contract).copied()
    }

    /// Deploy a contract (with logging and cached deployments)
    ///
    /// The deployment `tx` will be sent only if contract `name` is not already deployed;
    /// otherwise this function will just return the predeployed address.
    pub async fn deploy<T, P>(
        &mut self,
        name: Contract,
        tx: RawCallBuilder<T, P>,
    ) -> Result<Address>
    where
        P: Provider,
    {
        if let Some(addr) = self.0.get(&name) {
            tracing::info!("skipping deployment of {name}, already deployed at {addr:#x}");
            return Ok(*addr);
        }
        tracing::info!("deploying {name}");
        let pending_tx = tx.send().await?;
        let tx_hash = *pending_tx.tx_hash();
        tracing::info!(%tx_hash, "waiting for tx to be mined");
        let receipt = pending_tx.get_receipt().await?;
        tracing::info!(%receipt.gas_used, %tx_hash, "tx mined");
        let addr = receipt
            .contract_address
            .ok_or(alloy::contract::Error::ContractNotDeployed)?;

        tracing::info!("deployed {name} at {addr:#x}");

        self.0.insert(name, addr);
        Ok(addr)
    }

    /// Write a .env file, one line per contract in declaration order.
    pub fn write(&self, mut w: impl Write) -> Result<()> {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort();
        for (contract, address) in entries {
            writeln!(w, "{contract}={address:#x}")?;
        }
        Ok(())
    }
}

/// Constructor arguments of `ValidatorPool`.
#[derive(Clone, Debug)]
pub struct ValidatorPoolParams {
    pub l2_output_oracle: Address,
    pub portal: Address,
    pub trusted_validator: Address,
    pub min_bond_amount: U256,
    pub max_unbond: U256,
    pub non_penalty_period: U256,
    pub penalty_period: U256,
}

/// Constructor arguments of `L2OutputOracle`.
#[derive(Clone, Debug)]
pub struct L2OutputOracleParams {
    pub validator_pool: Address,
    pub colosseum: Address,
    pub submission_interval: U256,
    pub l2_block_time: U256,
    pub starting_block_number: U256,
    pub starting_timestamp: U256,
    pub finalization_period_seconds: U256,
}

pub async fn deploy_proxy_admin(
    provider: impl Provider,
    contracts: &mut Contracts,
    owner: Address,
) -> Result<Address> {
    let addr = contracts
        .deploy(
            Contract::ProxyAdmin,
            ProxyAdmin::deploy_builder(&provider, owner),
        )
        .await?;

    let proxy_admin = ProxyAdmin::new(addr, &provider);
    let actual = proxy_admin.owner().call().await?._0;
    ensure!(actual == owner, "ProxyAdmin owner is {actual}, expected {owner}");
    Ok(addr)
}

pub async fn deploy_validator_pool(
    provider: impl Provider,
    contracts: &mut Contracts,
    params: &ValidatorPoolParams,
) -> Result<Address> {
    let addr = contracts
        .deploy(
            Contract::ValidatorPool,
            ValidatorPool::deploy_builder(
                &provider,
                params.l2_output_oracle,
                params.portal,
                params.trusted_validator,
                params.min_bond_amount,
                params.max_unbond,
                params.non_penalty_period,
                params.penalty_period,
            ),
        )
        .await?;

    // post deploy verification checks
    let pool = ValidatorPool::new(addr, &provider);
    ensure!(
        pool.L2_ORACLE().call().await?._0 == params.l2_output_oracle,
        "ValidatorPool at {addr} points to the wrong L2OutputOracle"
    );
    ensure!(
        pool.TRUSTED_VALIDATOR().call().await?._0 == params.trusted_validator,
        "ValidatorPool at {addr} has the wrong trusted validator"
    );
    Ok(addr)
}

pub async fn deploy_l2_output_oracle(
    provider: impl Provider,
    contracts: &mut Contracts,
    params: &L2OutputOracleParams,
) -> Result<Address> {
    let addr = contracts
        .deploy(
            Contract::L2OutputOracle,
            L2OutputOracle::deploy_builder(
                &provider,
                params.validator_pool,
                params.colosseum,
                params.submission_interval,
                params.l2_block_time,
                params.starting_block_number,
                params.starting_timestamp,
                params.finalization_period_seconds,
            ),
        )
        .await?;

    // post deploy verification checks
    let oracle = L2OutputOracle::new(addr, &provider);
    ensure!(
        oracle.VALIDATOR_POOL().call().await?._0 == params.validator_pool,
        "L2OutputOracle at {addr} points to the wrong ValidatorPool"
    );
    ensure!(
        oracle.SUBMISSION_INTERVAL().call().await?._0 == params.submission_interval,
        "L2OutputOracle at {addr} has the wrong submission interval"
    );
    Ok(addr)
}

pub async fn deploy_mintable_erc20_factory(
    provider: impl Provider,
    contracts: &mut Contracts,
    bridge: Address,
) -> Result<Address> {
    let addr = contracts
        .deploy(
            Contract::KromaMintableERC20Factory,
            KromaMintableERC20Factory::deploy_builder(&provider, bridge),
        )
        .await?;

    let factory = KromaMintableERC20Factory::new(addr, &provider);
    ensure!(
        factory.BRIDGE().call().await?._0 == bridge,
        "KromaMintableERC20Factory at {addr} points to the wrong bridge"
    );
    Ok(addr)
}

/// Create a `KromaMintableERC20` through the factory and return the new token's address.
pub async fn create_mintable_erc20(
    provider: impl Provider,
    factory: Address,
    remote_token: Address,
    name: &str,
    symbol: &str,
) -> Result<Address> {
    let factory = KromaMintableERC20Factory::new(factory, &provider);
    let receipt = factory
        .createKromaMintableERC20(remote_token, name.to_string(), symbol.to_string())
        .send()
        .await?
        .get_receipt()
        .await?;
    ensure!(
        receipt.status(),
        "createKromaMintableERC20 reverted in tx {}",
        receipt.transaction_hash
    );
    let token = created_token(receipt.inner.logs())?;
    tracing::info!(%token, %remote_token, symbol, "created KromaMintableERC20");
    Ok(token)
}

/// Address of the token announced by the first `KromaMintableERC20Created` event in `logs`.
fn created_token(logs: &[Log]) -> Result<Address> {
    logs.iter()
        .find_map(|log| {
            parse_log::<KromaMintableERC20Factory::KromaMintableERC20Created>(log).ok()
        })
        .map(|event| event.localToken)
        .context("no KromaMintableERC20Created event in receipt")
}

pub async fn transfer_ownership(
    provider: impl Provider,
    target: Contract,
    addr: Address,
    new_owner: Address,
) -> Result<TransactionReceipt> {
    let receipt = match target {
        Contract::ProxyAdmin => {
            tracing::info!(%addr, %new_owner, "Transfer ProxyAdmin ownership");
            let proxy_admin = ProxyAdmin::new(addr, &provider);
            proxy_admin
                .transferOwnership(new_owner)
                .send()
                .await?
                .get_receipt()
                .await?
        },
        _ => return Err(anyhow!("{target:?} is not Ownable, can't transfer ownership!")),
    };
    let tx_hash = receipt.transaction_hash;
    tracing::info!(%receipt.gas_used, %tx_hash, "ownership transferred");
    Ok(receipt)
}

pub async fn is_contract(provider: impl Provider, address: Address) -> Result<bool> {
    if address == Address::ZERO {
        return Ok(false);
    }

    let code = provider.get_code_at(address).await?;
    if code.is_empty() {
        return Ok(false);
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use alloy::{
        consensus::{Receipt, ReceiptEnvelope, ReceiptWithBloom},
        primitives::{address, Bloom, Bytes, LogData, B256},
        providers::ProviderBuilder,
        sol_types::{SolEvent, SolValue},
        transports::mock::Asserter,
    };

    use super::*;

    const OWNER: Address = address!("00000000000000000000000000000000000000a1");
    const TX_HASH: B256 = B256::repeat_byte(0x77);

    fn mocked() -> (Asserter, impl Provider) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .on_mocked_client(asserter.clone());
        (asserter, provider)
    }

    fn receipt(contract_address: Option<Address>) -> TransactionReceipt {
        TransactionReceipt {
            inner: ReceiptEnvelope::Legacy(ReceiptWithBloom {
                receipt: Receipt {
                    status: true.into(),
                    cumulative_gas_used: 1_000_000,
                    logs: vec![],
                },
                logs_bloom: Bloom::ZERO,
            }),
            transaction_hash: TX_HASH,
            transaction_index: Some(0),
            block_hash: Some(B256::repeat_byte(0xbb)),
            block_number: Some(1),
            gas_used: 1_000_000,
            effective_gas_price: 1,
            blob_gas_used: None,
            blob_gas_price: None,
            from: OWNER,
            to: None,
            contract_address,
        }
    }

    /// Queue the responses to one deployment transaction that is sent and mined.
    pub(crate) fn push_deployment(asserter: &Asserter, contract_address: Option<Address>) {
        let receipt = receipt(contract_address);
        asserter.push_success(&TX_HASH);
        // the receipt is looked up once before waiting and once after confirmation
        asserter.push_success(&receipt);
        asserter.push_success(&receipt);
    }

    /// Queue the return value of one view call.
    pub(crate) fn push_call(asserter: &Asserter, value: impl SolValue) {
        asserter.push_success(&Bytes::from(value.abi_encode()));
    }

    #[test]
    fn test_contract_env_names() {
        assert_eq!(
            Contract::ProxyAdmin.to_string(),
            "KROMA_PROXY_ADMIN_ADDRESS"
        );
        assert_eq!(
            Contract::L2OutputOracle.to_string(),
            "KROMA_L2_OUTPUT_ORACLE_ADDRESS"
        );
        assert_eq!(
            OsStr::from(Contract::KromaMintableERC20Factory),
            "KROMA_MINTABLE_ERC20_FACTORY_ADDRESS"
        );
    }

    #[test]
    fn test_deployed_contracts_from_args() {
        let pool = Address::repeat_byte(0x22);
        let arg = pool.to_string();
        let deployed =
            DeployedContracts::try_parse_from(["deployer", "--validator-pool", arg.as_str()]).unwrap();
        let contracts = Contracts::from(deployed);
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts.address(Contract::ValidatorPool), Some(pool));
        assert_eq!(contracts.address(Contract::L2OutputOracle), None);
    }

    #[test]
    fn test_write_env_file() -> Result<()> {
        let mut contracts = Contracts::new();
        contracts
            .0
            .insert(Contract::KromaMintableERC20Factory, Address::repeat_byte(0x04));
        contracts.0.insert(Contract::ProxyAdmin, Address::repeat_byte(0xab));
        contracts.0.insert(Contract::L2OutputOracle, Address::repeat_byte(0x03));

        let mut out = Vec::new();
        contracts.write(&mut out)?;
        assert_eq!(
            String::from_utf8(out)?,
            "KROMA_PROXY_ADMIN_ADDRESS=0xabababababababababababababababababababab\n\
             KROMA_L2_OUTPUT_ORACLE_ADDRESS=0x0303030303030303030303030303030303030303\n\
             KROMA_MINTABLE_ERC20_FACTORY_ADDRESS=0x0404040404040404040404040404040404040404\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_deploy_skips_known_contract() -> Result<()> {
        // no queued responses: any RPC would fail the test
        let (_asserter, provider) = mocked();
        let existing = Address::repeat_byte(0x11);
        let mut contracts = Contracts::new();
        contracts.0.insert(Contract::ProxyAdmin, existing);

        let addr = contracts
            .deploy(
                Contract::ProxyAdmin,
                ProxyAdmin::deploy_builder(&provider, OWNER),
            )
            .await?;
        assert_eq!(addr, existing);
        Ok(())
    }

    #[tokio::test]
    async fn test_deploy_sends_and_records() -> Result<()> {
        let (asserter, provider) = mocked();
        let deployed = Address::repeat_byte(0x5a);
        push_deployment(&asserter, Some(deployed));

        let mut contracts = Contracts::new();
        let addr = contracts
            .deploy(
                Contract::ProxyAdmin,
                ProxyAdmin::deploy_builder(&provider, OWNER),
            )
            .await?;
        assert_eq!(addr, deployed);
        assert_eq!(contracts.address(Contract::ProxyAdmin), Some(deployed));
        assert!(asserter.read_q().is_empty());

        // recorded: a second deploy sends nothing
        let again = contracts
            .deploy(
                Contract::ProxyAdmin,
                ProxyAdmin::deploy_builder(&provider, OWNER),
            )
            .await?;
        assert_eq!(again, deployed);
        Ok(())
    }

    #[tokio::test]
    async fn test_deploy_without_contract_address() {
        let (asserter, provider) = mocked();
        push_deployment(&asserter, None);

        let mut contracts = Contracts::new();
        let err = contracts
            .deploy(
                Contract::ProxyAdmin,
                ProxyAdmin::deploy_builder(&provider, OWNER),
            )
            .await
            .unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<alloy::contract::Error>(),
                Some(alloy::contract::Error::ContractNotDeployed)
            ),
            "{err:#}"
        );
        assert!(contracts.is_empty());
    }

    #[tokio::test]
    async fn test_deploy_proxy_admin_checks_owner() -> Result<()> {
        let (asserter, provider) = mocked();
        let mut contracts = Contracts::new();
        contracts.0.insert(Contract::ProxyAdmin, Address::repeat_byte(0x11));

        push_call(&asserter, OWNER);
        let addr = deploy_proxy_admin(&provider, &mut contracts, OWNER).await?;
        assert_eq!(addr, Address::repeat_byte(0x11));

        push_call(&asserter, Address::ZERO);
        let err = deploy_proxy_admin(&provider, &mut contracts, OWNER)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ProxyAdmin owner"), "{err}");
        Ok(())
    }

    #[tokio::test]
    async fn test_is_contract() -> Result<()> {
        let (asserter, provider) = mocked();

        // zero address short-circuits without a request
        assert!(!is_contract(&provider, Address::ZERO).await?);

        asserter.push_success(&Bytes::new());
        assert!(!is_contract(&provider, Address::repeat_byte(0x01)).await?);

        asserter.push_success(&Bytes::from_static(&[0x60, 0x80]));
        assert!(is_contract(&provider, Address::repeat_byte(0x02)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_transfer_ownership_of_non_ownable() {
        let (_asserter, provider) = mocked();
        let err = transfer_ownership(
            &provider,
            Contract::ValidatorPool,
            Address::repeat_byte(0x01),
            OWNER,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not Ownable"));
    }

    #[test]
    fn test_created_token() -> Result<()> {
        let event = KromaMintableERC20Factory::KromaMintableERC20Created {
            localToken: Address::repeat_byte(0x0c),
            remoteToken: Address::repeat_byte(0x0d),
            deployer: OWNER,
        };
        let log = |data: LogData| Log {
            inner: alloy::primitives::Log {
                address: Address::repeat_byte(0xfa),
                data,
            },
            ..Default::default()
        };
        let unrelated = log(LogData::new_unchecked(vec![], Bytes::new()));

        let logs = vec![unrelated.clone(), log(event.encode_log_data())];
        assert_eq!(created_token(&logs)?, Address::repeat_byte(0x0c));
        assert!(created_token(&[unrelated]).is_err());
        Ok(())
    }
}
