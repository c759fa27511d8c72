use regex::Regex;
use std::sync::OnceLock;

use crate::value_objects::ReferenceKind;

fn apostrophes() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"['’]").expect("valid regex"))
}

fn disallowed() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid regex"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn hyphen_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("valid regex"))
}

/// Wiki page slug for a display name. Only ASCII word characters survive.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let trimmed = lower.trim();
    let no_quotes = apostrophes().replace_all(trimmed, "");
    let cleaned = disallowed().replace_all(&no_quotes, "");
    let hyphenated = whitespace_runs().replace_all(&cleaned, "-");
    hyphen_runs().replace_all(&hyphenated, "-").into_owned()
}

/// `{base}/{prefix}:{slug}`
pub fn url_for(base: &str, kind: ReferenceKind, name: &str) -> String {
    format!(
        "{}/{}:{}",
        base.trim_end_matches('/'),
        kind.wiki_prefix(),
        slugify(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_follow_wiki_conventions() {
        assert_eq!(slugify("Pass Without Trace"), "pass-without-trace");
        assert_eq!(slugify("Bag of Holding"), "bag-of-holding");
        assert_eq!(slugify("Tasha’s Hideous Laughter"), "tashas-hideous-laughter");
        assert_eq!(slugify("  Melf's Acid Arrow "), "melfs-acid-arrow");
        assert_eq!(slugify("Armor of Agathys (2024)"), "armor-of-agathys-2024");
        assert_eq!(slugify("Tenser's  --  Disk"), "tensers-disk");
    }

    #[test]
    fn slugify_is_idempotent() {
        for name in ["Pass Without Trace", "Mordenkainen’s Sword", "Ring of Protection +1"] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn urls_use_kind_prefix() {
        assert_eq!(
            url_for("https://dnd2024.wikidot.com/", ReferenceKind::MagicItem, "Bag of Holding"),
            "https://dnd2024.wikidot.com/magic-item:bag-of-holding"
        );
        assert_eq!(
            url_for("https://dnd2024.wikidot.com", ReferenceKind::Spell, "Fire Bolt"),
            "https://dnd2024.wikidot.com/spell:fire-bolt"
        );
    }
}
