use serde_json::Value;

use super::export::{array, at, i64_at, nonzero_i64_at, str_at, truthy};
use crate::entities::{Currency, InventoryItem};

pub(super) fn extract_inventory(root: &Value) -> Vec<InventoryItem> {
    array(root, &["inventory"])
        .iter()
        .filter_map(|item| {
            let definition = at(item, &["definition"])?;
            let attuned = truthy(item, &["isAttuned"]);
            Some(InventoryItem {
                name: str_at(definition, &["name"]).unwrap_or("Unknown Item").to_string(),
                is_magic_item: truthy(definition, &["magic"]) || truthy(definition, &["canAttune"]) || attuned,
                quantity: i64_at(item, &["quantity"])
                    .and_then(|quantity| u32::try_from(quantity).ok())
                    .filter(|quantity| *quantity > 0)
                    .unwrap_or(1),
                equipped: truthy(item, &["equipped"]),
                attuned,
                notes: None,
            })
        })
        .collect()
}

pub(super) fn extract_currency(root: &Value) -> Currency {
    Currency {
        gold: nonzero_i64_at(root, &["currencies", "gp"]).unwrap_or(0),
    }
}
