use regex::Regex;
use std::sync::OnceLock;

use grimoire_domain::MagicItemRecord;

use super::clamp_name;
use crate::wiki::page::WikiPage;

const RARITIES: [&str; 6] = ["Common", "Uncommon", "Rare", "Very Rare", "Legendary", "Artifact"];

struct ItemPatterns {
    item_type: Regex,
    rarity: Regex,
    attunement_by: Regex,
    attunement: Regex,
    attunement_line: Regex,
}

fn patterns() -> &'static ItemPatterns {
    static PATTERNS: OnceLock<ItemPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ItemPatterns {
        item_type: Regex::new(
            r"(?i)(?:^|\n)(Weapon|Armor|Potion|Ring|Rod|Staff|Wand|Wondrous item)(?:\s*\(([^)]+)\))?",
        )
        .expect("valid regex"),
        rarity: Regex::new(&format!("(?i)({})", RARITIES.join("|"))).expect("valid regex"),
        attunement_by: Regex::new(r"(?i)requires attunement by ([^.\n]+)").expect("valid regex"),
        attunement: Regex::new(r"(?i)requires attunement").expect("valid regex"),
        attunement_line: Regex::new(r"(?i)requires attunement[^\n]*").expect("valid regex"),
    })
}

fn item_type(text: &str) -> Option<String> {
    let captures = patterns().item_type.captures(text)?;
    let base = captures.get(1)?.as_str();
    Some(match captures.get(2) {
        Some(subtype) => format!("{} ({})", base, subtype.as_str()),
        None => base.to_string(),
    })
}

fn attunement(text: &str) -> Option<String> {
    let patterns = patterns();
    if let Some(captures) = patterns.attunement_by.captures(text) {
        let who = captures
            .get(1)
            .map(|value| value.as_str().trim().trim_end_matches(')').trim())
            .unwrap_or("");
        return Some(who.to_string());
    }
    patterns.attunement.is_match(text).then(|| "Yes".to_string())
}

pub fn parse_item(page: &WikiPage, requested_name: &str) -> MagicItemRecord {
    let text = page.text.as_str();
    let patterns = patterns();
    let rarity_match = patterns.rarity.find(text);
    let rarity = rarity_match.and_then(|found| {
        RARITIES
            .iter()
            .find(|rarity| rarity.eq_ignore_ascii_case(found.as_str()))
            .map(|rarity| rarity.to_string())
    });

    // Description follows the rarity and any attunement clause.
    let description = match rarity_match {
        Some(found) => {
            let mut rest = &text[found.end()..];
            if let Some(clause) = patterns.attunement_line.find(rest) {
                rest = &rest[clause.end()..];
            }
            rest.trim().to_string()
        }
        None => text.trim().to_string(),
    };

    MagicItemRecord {
        name: clamp_name(page.title.as_deref().unwrap_or(requested_name)),
        item_type: item_type(text),
        rarity,
        requires_attunement: attunement(text),
        description,
        properties: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: &str) -> WikiPage {
        WikiPage {
            title: Some("Cloak of Protection".to_string()),
            text: text.to_string(),
            linked_spells: Vec::new(),
        }
    }

    #[test]
    fn reads_type_rarity_attunement_and_description() {
        let item = parse_item(
            &page("Wondrous Item (cloak), uncommon (requires attunement by a wizard)\nYou gain a +1 bonus to AC."),
            "cloak",
        );
        assert_eq!(item.name, "Cloak of Protection");
        assert_eq!(item.item_type.as_deref(), Some("Wondrous Item (cloak)"));
        assert_eq!(item.rarity.as_deref(), Some("Uncommon"));
        assert_eq!(item.requires_attunement.as_deref(), Some("a wizard"));
        assert_eq!(item.description, "You gain a +1 bonus to AC.");
    }

    #[test]
    fn plain_attunement_and_very_rare() {
        let item = parse_item(
            &page("Armor (plate), very rare (requires attunement)\nResistance to fire."),
            "x",
        );
        assert_eq!(item.rarity.as_deref(), Some("Very Rare"));
        assert_eq!(item.requires_attunement.as_deref(), Some("Yes"));
        assert_eq!(item.description, "Resistance to fire.");
    }

    #[test]
    fn untitled_pages_take_requested_name_and_whole_text() {
        let untitled = WikiPage {
            title: None,
            text: "An odd trinket.".to_string(),
            linked_spells: Vec::new(),
        };
        let item = parse_item(&untitled, "Trinket");
        assert_eq!(item.name, "Trinket");
        assert_eq!(item.rarity, None);
        assert_eq!(item.description, "An odd trinket.");
    }
}
