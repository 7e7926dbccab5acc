//! Structs of the Solidity `Types` library shared across the Kroma contracts.
//!
//! Each binding module carries its own copy of the structs its ABI mentions. The canonical ones
//! are re-exported here so callers don't need to know which contract happened to define them.

use alloy::{
    primitives::{keccak256, B256, U256},
    sol,
    sol_types::SolValue,
};

pub use crate::bindings::{
    l2outputoracle::Types::CheckpointOutput,
    validatorpool::Types::Bond,
    zkproofverifier::Types::{
        BlockHeaderRLP, OutputRootProof, PublicInput, PublicInputProof, ZKEVMProof, ZKVMProof,
    },
};

sol! {
    /// A withdrawal initiated on L2 through the `L2ToL1MessagePasser`.
    #[sol(all_derives)]
    struct WithdrawalTransaction {
        uint256 nonce;
        address sender;
        address target;
        uint256 value;
        uint256 gasLimit;
        bytes data;
    }

    /// State of an output challenge in the `Colosseum`.
    #[sol(all_derives)]
    struct Challenge {
        uint8 turn;
        uint64 timeoutAt;
        address asserter;
        address challenger;
        bytes32[] segments;
        uint256 segSize;
        uint256 segStart;
        bytes32 l1Head;
    }
}

/// The only output root version Kroma commits to.
pub const OUTPUT_ROOT_V0: B256 = B256::ZERO;

/// Mask selecting the nonce bits of a versioned nonce.
pub const NONCE_MASK: U256 = U256::from_limbs([u64::MAX, u64::MAX, u64::MAX, u64::MAX >> 16]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    #[error("unknown output root proof version {0}")]
    UnknownOutputRootVersion(B256),
}

impl OutputRootProof {
    /// Computes the L2 output root committed to by this proof.
    ///
    /// The preimage is `version ‖ stateRoot ‖ messagePasserStorageRoot ‖ latestBlockhash ‖
    /// nextBlockHash`.
    pub fn output_root(&self) -> Result<B256, TypesError> {
        if self.version != OUTPUT_ROOT_V0 {
            return Err(TypesError::UnknownOutputRootVersion(self.version));
        }
        let mut preimage = [0u8; 32 * 5];
        for (chunk, word) in preimage.chunks_exact_mut(32).zip([
            self.version,
            self.stateRoot,
            self.messagePasserStorageRoot,
            self.latestBlockhash,
            self.nextBlockHash,
        ]) {
            chunk.copy_from_slice(word.as_slice());
        }
        Ok(keccak256(preimage))
    }
}

impl WithdrawalTransaction {
    /// The withdrawal hash proven and finalized on L1.
    pub fn hash(&self) -> B256 {
        let encoded = (
            self.nonce,
            self.sender,
            self.target,
            self.value,
            self.gasLimit,
            self.data.clone(),
        )
            .abi_encode_params();
        keccak256(encoded)
    }
}

/// Packs a message version into the top 16 bits of a nonce.
pub fn encode_versioned_nonce(nonce: U256, version: u16) -> U256 {
    (U256::from(version) << 240) | nonce
}

/// Splits a versioned nonce into `(nonce, version)`.
pub fn decode_versioned_nonce(versioned: U256) -> (U256, u16) {
    let version = (versioned >> 240usize).to::<u16>();
    (versioned & NONCE_MASK, version)
}
