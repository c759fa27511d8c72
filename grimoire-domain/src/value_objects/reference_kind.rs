// Reference kind value object

use serde::{Deserialize, Serialize};

/// The three kinds of shared reference data a character can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Spell,
    MagicItem,
    Feat,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 3] = [
        ReferenceKind::Spell,
        ReferenceKind::MagicItem,
        ReferenceKind::Feat,
    ];

    /// Record-store table holding this kind.
    pub fn table(&self) -> &'static str {
        match self {
            ReferenceKind::Spell => "spells",
            ReferenceKind::MagicItem => "magic_items",
            ReferenceKind::Feat => "feats",
        }
    }

    /// Wiki page category prefix (`/{prefix}:{slug}`).
    pub fn wiki_prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Spell => "spell",
            ReferenceKind::MagicItem => "magic-item",
            ReferenceKind::Feat => "feat",
        }
    }

    /// Singular human-readable name, for messages.
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Spell => "spell",
            ReferenceKind::MagicItem => "magic item",
            ReferenceKind::Feat => "feat",
        }
    }

    /// Review bucket name used by the operator-facing API.
    pub fn bucket(&self) -> &'static str {
        match self {
            ReferenceKind::Spell => "spells",
            ReferenceKind::MagicItem => "items",
            ReferenceKind::Feat => "feats",
        }
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "spells" | "spell" => Ok(ReferenceKind::Spell),
            "items" | "item" | "magic_items" | "magic-item" => Ok(ReferenceKind::MagicItem),
            "feats" | "feat" => Ok(ReferenceKind::Feat),
            other => Err(format!("unknown reference kind '{}'", other)),
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.bucket())
    }
}
