//! Per-contract metadata generated alongside the bindings.
//!
//! For every contract listed in `artifacts/more/`, the generator records the canonical storage
//! layout, the deployed (runtime) bytecode and whether that bytecode carries immutable
//! references. Genesis and migration tooling use these to lay out predeploy state without
//! running the constructor.

use std::{collections::BTreeMap, collections::HashMap, sync::LazyLock};

use alloy::{
    hex,
    primitives::{b256, Bytes, B256, U256},
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::bindings::METADATA;

/// Code hash of the canonical `Create2Deployer` predeploy.
pub const CREATE2_DEPLOYER_CODE_HASH: B256 =
    b256!("b0550b5b431e30d38000efb7107aaa0ade03d48a7198a140edda9d27134468b2");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{0}: storage layout not found")]
    StorageLayoutNotFound(String),
    #[error("{0}: deployed bytecode not found")]
    DeployedBytecodeNotFound(String),
    #[error("{0}: invalid deployed bytecode")]
    InvalidDeployedBytecode(String),
    #[error("{0}: immutable reference not found")]
    ImmutableReferenceNotFound(String),
}

/// Storage layout as emitted by solc, with AST ids canonicalised by the generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLayout {
    #[serde(default, deserialize_with = "null_as_default")]
    pub storage: Vec<StorageLayoutEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub types: BTreeMap<String, StorageLayoutType>,
}

// solc emits `null` rather than an empty list for contracts without storage.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StorageLayout {
    /// Look up a storage variable by its source label.
    pub fn entry(&self, label: &str) -> Option<&StorageLayoutEntry> {
        self.storage.iter().find(|entry| entry.label == label)
    }

    /// Look up a type by its solc type identifier, e.g. `t_mapping(t_address,t_uint256)`.
    pub fn layout_type(&self, name: &str) -> Option<&StorageLayoutType> {
        self.types.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLayoutEntry {
    pub ast_id: u64,
    pub contract: String,
    pub label: String,
    pub offset: u64,
    pub slot: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl StorageLayoutEntry {
    /// The storage slot as a number. solc encodes it as a decimal string.
    pub fn slot(&self) -> Option<U256> {
        self.slot.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLayoutType {
    pub encoding: String,
    pub label: String,
    pub number_of_bytes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<StorageLayoutEntry>>,
}

/// Contents of an `artifacts/more/<Name>.json` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractMetadata {
    pub storage_layout: StorageLayout,
    pub deployed_bytecode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_source_map: Option<String>,
    pub has_immutable_references: bool,
}

static REGISTRY: LazyLock<HashMap<&'static str, ContractMetadata>> = LazyLock::new(|| {
    METADATA
        .iter()
        .map(|(name, raw)| {
            let metadata = serde_json::from_str(raw).unwrap_or_else(|err| {
                panic!("{name}: malformed embedded contract metadata: {err}")
            });
            (*name, metadata)
        })
        .collect()
});

/// Names of every contract with registry metadata, sorted.
pub fn contracts() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Returns the storage layout of a contract by name.
pub fn storage_layout(name: &str) -> Result<&'static StorageLayout, RegistryError> {
    REGISTRY
        .get(name)
        .map(|metadata| &metadata.storage_layout)
        .ok_or_else(|| RegistryError::StorageLayoutNotFound(name.to_string()))
}

/// Returns the deployed bytecode of a contract by name.
///
/// Only contracts with registry metadata are known. `Create2Deployer` is not among them and
/// yields [`RegistryError::DeployedBytecodeNotFound`]; its code is identified by
/// [`CREATE2_DEPLOYER_CODE_HASH`] instead.
pub fn deployed_bytecode(name: &str) -> Result<Bytes, RegistryError> {
    let code = REGISTRY
        .get(name)
        .map(|metadata| metadata.deployed_bytecode.as_str())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| RegistryError::DeployedBytecodeNotFound(name.to_string()))?;
    if !is_hex(code) {
        return Err(RegistryError::InvalidDeployedBytecode(name.to_string()));
    }
    hex::decode(code)
        .map(Bytes::from)
        .map_err(|_| RegistryError::InvalidDeployedBytecode(name.to_string()))
}

/// Returns whether the deployed bytecode of a contract has immutable references.
pub fn has_immutable_references(name: &str) -> Result<bool, RegistryError> {
    REGISTRY
        .get(name)
        .map(|metadata| metadata.has_immutable_references)
        .ok_or_else(|| RegistryError::ImmutableReferenceNotFound(name.to_string()))
}

/// Whether `s` is an even-length hex string, with or without a `0x` prefix.
pub fn is_hex(s: &str) -> bool {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    digits.len() % 2 == 0 && digits.bytes().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_every_entry_loads() {
        assert_eq!(
            contracts(),
            vec![
                "CrossDomainMessenger",
                "GasPriceOracle",
                "MintManager",
                "ZKProofVerifier",
                "ZKTrieHasher"
            ]
        );
        for name in contracts() {
            storage_layout(name).unwrap();
            has_immutable_references(name).unwrap();
        }
    }

    #[test]
    fn test_mint_manager_layout() {
        let layout = storage_layout("MintManager").unwrap();
        let share_of = layout.entry("shareOf").unwrap();
        assert_eq!(share_of.slot(), Some(U256::from(2)));
        assert_eq!(share_of.ast_id, 1003);
        assert_eq!(share_of.ty, "t_mapping(t_address,t_uint256)");

        let mapping = layout.layout_type(&share_of.ty).unwrap();
        assert_eq!(mapping.encoding, "mapping");
        assert_eq!(mapping.key.as_deref(), Some("t_address"));
        assert_eq!(mapping.value.as_deref(), Some("t_uint256"));

        assert!(layout.entry("doesNotExist").is_none());
    }

    #[test]
    fn test_deployed_bytecode() {
        let code = deployed_bytecode("MintManager").unwrap();
        assert!(!code.is_empty());
        // PUSH1 0x80 PUSH1 0x40 MSTORE
        assert_eq!(&code[..5], &[0x60, 0x80, 0x60, 0x40, 0x52]);
        assert!(has_immutable_references("MintManager").unwrap());
        assert!(!has_immutable_references("GasPriceOracle").unwrap());

        // abstract contracts have no runtime code but are still known
        assert!(deployed_bytecode("CrossDomainMessenger").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_contract() {
        assert_eq!(
            storage_layout("Nope").unwrap_err(),
            RegistryError::StorageLayoutNotFound("Nope".into())
        );
        assert_eq!(
            deployed_bytecode("Nope").unwrap_err(),
            RegistryError::DeployedBytecodeNotFound("Nope".into())
        );
        assert_eq!(
            deployed_bytecode("Create2Deployer").unwrap_err(),
            RegistryError::DeployedBytecodeNotFound("Create2Deployer".into())
        );
        assert_eq!(
            has_immutable_references("Nope").unwrap_err(),
            RegistryError::ImmutableReferenceNotFound("Nope".into())
        );
        assert_eq!(
            storage_layout("Nope").unwrap_err().to_string(),
            "Nope: storage layout not found"
        );
    }

    #[test]
    fn test_null_layout() {
        let layout: StorageLayout =
            serde_json::from_str(r#"{"storage": null, "types": null}"#).unwrap();
        assert_eq!(layout, StorageLayout::default());
        let layout: StorageLayout = serde_json::from_str("{}").unwrap();
        assert!(layout.storage.is_empty());
    }

    #[rstest]
    #[case("", true)]
    #[case("0x", true)]
    #[case("0x6080", true)]
    #[case("6080", true)]
    #[case("0xABcd", true)]
    #[case("0x608", false)]
    #[case("0x60zz", false)]
    #[case("0x 60", false)]
    fn test_is_hex(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_hex(input), expected);
    }
}
