//! Canonical storage layouts.
//!
//! solc numbers AST nodes in compilation order, so the ids in a storage layout change whenever
//! an unrelated file is added to the build. Before the layout is committed, every id is replaced
//! by a deterministic one: storage variables get `1000..` in slot order, then ids embedded in
//! type identifiers (`t_struct(Bond)4321_storage`) continue the sequence in sorted type order.

use std::{collections::BTreeMap, path::Path, sync::LazyLock};

use kroma_bindings::registry::{StorageLayout, StorageLayoutEntry, StorageLayoutType};
use regex::Regex;

const FIRST_AST_ID: u64 = 1000;

static TYPE_AST_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(t_[\w_]+\([\w]+\))(\d+)(_[\w]+)?$").unwrap());

pub fn canonicalize_ast_ids(layout: &StorageLayout, monorepo_base: &str) -> StorageLayout {
    let mut next_id = FIRST_AST_ID;
    let mut ast_ids = BTreeMap::new();
    for entry in &layout.storage {
        ast_ids.insert(entry.ast_id, next_id);
        next_id += 1;
    }

    // `types` is ordered, so renumbering is deterministic.
    let mut type_remappings = BTreeMap::new();
    for old in layout.types.keys() {
        let Some(id) = TYPE_AST_ID.captures(old).and_then(|caps| caps.get(2)) else {
            continue;
        };
        let new = format!("{}{next_id}{}", &old[..id.start()], &old[id.end()..]);
        type_remappings.insert(old.clone(), new);
        next_id += 1;
    }

    let canonical_entry = |entry: &StorageLayoutEntry| StorageLayoutEntry {
        ast_id: ast_ids.get(&entry.ast_id).copied().unwrap_or(entry.ast_id),
        contract: relative_contract(&entry.contract, monorepo_base),
        label: entry.label.clone(),
        offset: entry.offset,
        slot: entry.slot.clone(),
        ty: replace_type(&type_remappings, &entry.ty),
    };

    let storage = layout.storage.iter().map(&canonical_entry).collect();
    let types = layout
        .types
        .iter()
        .map(|(old, ty)| {
            let replace = |t: &Option<String>| {
                t.as_deref()
                    .map(|t| replace_type(&type_remappings, t))
            };
            let ty = StorageLayoutType {
                encoding: ty.encoding.clone(),
                label: ty.label.clone(),
                number_of_bytes: ty.number_of_bytes.clone(),
                key: replace(&ty.key),
                value: replace(&ty.value),
                base: replace(&ty.base),
                members: ty
                    .members
                    .as_ref()
                    .map(|members| members.iter().map(&canonical_entry).collect()),
            };
            (replace_type(&type_remappings, old), ty)
        })
        .collect();

    StorageLayout { storage, types }
}

/// Absolute source paths show up when two imported contracts share a name.
fn relative_contract(contract: &str, monorepo_base: &str) -> String {
    if !Path::new(contract).is_absolute() {
        return contract.to_string();
    }
    contract
        .replacen(monorepo_base, "", 1)
        .trim_start_matches('/')
        .to_string()
}

fn replace_type(remappings: &BTreeMap<String, String>, ty: &str) -> String {
    if let Some(new) = remappings.get(ty) {
        return new.clone();
    }
    // composite types, e.g. mappings whose value is a remapped struct
    for (old, new) in remappings {
        if ty.contains(old.as_str()) {
            return ty.replacen(old.as_str(), new, 1);
        }
    }
    ty.to_string()
}
