//! Source templates for the generated binding modules.

const HEADER: &str = "// Code generated by kroma-bindings-gen - DO NOT EDIT.
// This file is a generated binding and any manual changes will be lost.
";

/// Module name of a contract's binding, e.g. `l2outputoracle` for `L2OutputOracle`.
pub fn module_name(contract: &str) -> String {
    contract.to_lowercase()
}

pub fn binding(contract: &str) -> String {
    format!(
        r#"{HEADER}
//! Binding for the `{contract}` contract.

alloy::sol!(
    #[allow(missing_docs)]
    #[sol(rpc, all_derives)]
    {contract},
    "artifacts/{contract}.json"
);
"#
    )
}

/// `src/bindings/mod.rs` for the given bound contracts and registry entries.
///
/// Both lists are emitted in the order given; callers pass them sorted.
pub fn bindings_mod(contracts: &[String], metadata: &[String]) -> String {
    let mut out = format!("{HEADER}\n//! Contract bindings, one module per contract.\n\n");
    for contract in contracts {
        out.push_str(&format!("pub mod {};\n", module_name(contract)));
    }

    out.push_str("\npub use self::{\n");
    for contract in contracts {
        out.push_str(&format!("    {}::{contract},\n", module_name(contract)));
    }
    out.push_str("};\n");

    out.push_str("\n/// Registry metadata of each contract, keyed by contract name.\n");
    out.push_str("pub(crate) const METADATA: &[(&str, &str)] = &[\n");
    for name in metadata {
        out.push_str(&format!(
            "    (\"{name}\", include_str!(\"../../artifacts/more/{name}.json\")),\n"
        ));
    }
    out.push_str("];\n");
    out
}
