//! builder pattern for deploying the Kroma L1 contracts

use alloy::{
    primitives::{Address, U256},
    providers::{Provider, WalletProvider},
};
use anyhow::{ensure, Context, Result};
use derive_builder::Builder;

use crate::{Contract, Contracts, L2OutputOracleParams, ValidatorPoolParams};

/// Convenient handler that builds all the input arguments ready to be deployed.
/// - `deployer`: deployer's wallet provider
/// - `proxy_admin_owner`: owner of the ProxyAdmin, same as deployer if None
/// - `portal`: KromaPortal the validator pool pays rewards through
/// - `colosseum`: Colosseum allowed to delete challenged outputs
/// - `trusted_validator`: validator allowed to submit when no one is bonded
/// - `min_bond_amount`: minimum bond to submit an output
/// - `max_unbond`: maximum number of outputs unbonded in one call
/// - `non_penalty_period`/`penalty_period`: submission periods of the validator round
/// - `submission_interval`: number of L2 blocks between outputs
/// - `l2_block_time`: L2 block time in seconds
/// - `starting_block_number`/`starting_timestamp`: first L2 block covered by the oracle
/// - `finalization_period_seconds`: challenge window of an output
/// - `l1_standard_bridge`: bridge the mintable token factory mints for
/// - `multisig`: new owner of the ProxyAdmin
#[derive(Builder, Clone)]
#[builder(setter(strip_option))]
pub struct DeployerArgs<P: Provider + WalletProvider> {
    deployer: P,
    #[builder(default)]
    proxy_admin_owner: Option<Address>,
    #[builder(default)]
    portal: Option<Address>,
    #[builder(default)]
    colosseum: Option<Address>,
    #[builder(default)]
    trusted_validator: Option<Address>,
    #[builder(default)]
    min_bond_amount: Option<U256>,
    #[builder(default)]
    max_unbond: Option<U256>,
    #[builder(default)]
    non_penalty_period: Option<U256>,
    #[builder(default)]
    penalty_period: Option<U256>,
    #[builder(default)]
    submission_interval: Option<U256>,
    #[builder(default)]
    l2_block_time: Option<U256>,
    #[builder(default)]
    starting_block_number: Option<U256>,
    #[builder(default)]
    starting_timestamp: Option<U256>,
    #[builder(default)]
    finalization_period_seconds: Option<U256>,
    #[builder(default)]
    l1_standard_bridge: Option<Address>,
    #[builder(default)]
    multisig: Option<Address>,
}

impl<P: Provider + WalletProvider> DeployerArgs<P> {
    /// deploy target contracts
    pub async fn deploy(&self, contracts: &mut Contracts, target: Contract) -> Result<()> {
        let provider = &self.deployer;
        let admin = provider.default_signer_address();
        match target {
            Contract::ProxyAdmin => {
                let owner = self.proxy_admin_owner.unwrap_or(admin);
                let addr = crate::deploy_proxy_admin(provider, contracts, owner).await?;

                if let Some(multisig) = self.multisig {
                    crate::transfer_ownership(provider, target, addr, multisig).await?;
                }
            },
            Contract::ValidatorPool | Contract::L2OutputOracle => {
                self.deploy_output_contracts(contracts).await?;
            },
            Contract::KromaMintableERC20Factory => {
                let bridge = self.l1_standard_bridge.context(
                    "L1StandardBridge address must be set when deploying the mintable token \
                     factory",
                )?;
                crate::deploy_mintable_erc20_factory(provider, contracts, bridge).await?;
            },
        }
        Ok(())
    }

    /// Deploy `ValidatorPool` and `L2OutputOracle`.
    ///
    /// Each contract takes the other's address as a constructor argument, so the address of
    /// whichever is missing is predicted from the deployer's nonce. The pool is deployed first.
    async fn deploy_output_contracts(&self, contracts: &mut Contracts) -> Result<()> {
        let pool = self.validator_pool_params(Address::ZERO)?;
        let oracle = self.l2_output_oracle_params(Address::ZERO)?;

        let provider = &self.deployer;
        let deployer = provider.default_signer_address();
        let known_pool = contracts.address(Contract::ValidatorPool);
        let known_oracle = contracts.address(Contract::L2OutputOracle);
        let (pool_addr, oracle_addr) = match (known_pool, known_oracle) {
            (Some(pool), Some(oracle)) => (pool, oracle),
            (pool, oracle) => {
                let nonce = provider.get_transaction_count(deployer).await?;
                match (pool, oracle) {
                    (Some(pool), _) => (pool, deployer.create(nonce)),
                    (None, Some(oracle)) => (deployer.create(nonce), oracle),
                    (None, None) => (deployer.create(nonce), deployer.create(nonce + 1)),
                }
            },
        };
        tracing::info!(%pool_addr, %oracle_addr, "output contract addresses");

        let pool = ValidatorPoolParams {
            l2_output_oracle: oracle_addr,
            ..pool
        };
        let deployed = crate::deploy_validator_pool(provider, contracts, &pool).await?;
        ensure!(
            deployed == pool_addr,
            "ValidatorPool deployed at {deployed}, expected {pool_addr}"
        );

        let oracle = L2OutputOracleParams {
            validator_pool: pool_addr,
            ..oracle
        };
        let deployed = crate::deploy_l2_output_oracle(provider, contracts, &oracle).await?;
        ensure!(
            deployed == oracle_addr,
            "L2OutputOracle deployed at {deployed}, expected {oracle_addr}"
        );
        Ok(())
    }

    fn validator_pool_params(&self, l2_output_oracle: Address) -> Result<ValidatorPoolParams> {
        Ok(ValidatorPoolParams {
            l2_output_oracle,
            portal: self
                .portal
                .context("KromaPortal address must be set when deploying the validator pool")?,
            trusted_validator: self
                .trusted_validator
                .context("Trusted validator must be set when deploying the validator pool")?,
            min_bond_amount: self
                .min_bond_amount
                .context("Minimum bond amount must be set when deploying the validator pool")?,
            max_unbond: self
                .max_unbond
                .context("Max unbond must be set when deploying the validator pool")?,
            non_penalty_period: self
                .non_penalty_period
                .context("Non-penalty period must be set when deploying the validator pool")?,
            penalty_period: self
                .penalty_period
                .context("Penalty period must be set when deploying the validator pool")?,
        })
    }

    fn l2_output_oracle_params(&self, validator_pool: Address) -> Result<L2OutputOracleParams> {
        Ok(L2OutputOracleParams {
            validator_pool,
            colosseum: self
                .colosseum
                .context("Colosseum address must be set when deploying the output oracle")?,
            submission_interval: self
                .submission_interval
                .context("Submission interval must be set when deploying the output oracle")?,
            l2_block_time: self
                .l2_block_time
                .context("L2 block time must be set when deploying the output oracle")?,
            starting_block_number: self.starting_block_number.unwrap_or_default(),
            starting_timestamp: self
                .starting_timestamp
                .context("Starting timestamp must be set when deploying the output oracle")?,
            finalization_period_seconds: self.finalization_period_seconds.context(
                "Finalization period must be set when deploying the output oracle",
            )?,
        })
    }

    /// Deploy all contracts
    pub async fn deploy_all(&self, contracts: &mut Contracts) -> Result<()> {
        self.deploy(contracts, Contract::ProxyAdmin).await?;
        self.deploy(contracts, Contract::ValidatorPool).await?;
        if self.l1_standard_bridge.is_some() {
            self.deploy(contracts, Contract::KromaMintableERC20Factory)
                .await?;
        } else {
            tracing::info!("no L1StandardBridge given, skipping the mintable token factory");
        }
        Ok(())
    }
}
