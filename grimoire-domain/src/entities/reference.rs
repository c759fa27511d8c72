use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::benefits::FeatBenefits;
use crate::error::RecordError;
use crate::value_objects::ReferenceKind;

pub const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellRecord {
    pub name: String,
    pub level: u8,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub casting_time: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub components: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    pub description: String,
    #[serde(default)]
    pub higher_levels: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicItemRecord {
    pub name: String,
    #[serde(default, rename = "type")]
    pub item_type: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub requires_attunement: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatRecord {
    pub name: String,
    #[serde(default)]
    pub prerequisites: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub benefits: Option<FeatBenefits>,
}

/// A reference row of any kind. Serializes as the bare row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReferenceRecord {
    Spell(SpellRecord),
    MagicItem(MagicItemRecord),
    Feat(FeatRecord),
}

impl ReferenceRecord {
    /// Decodes a row of a known kind. Untagged decoding would be ambiguous.
    pub fn from_value(kind: ReferenceKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ReferenceKind::Spell => ReferenceRecord::Spell(serde_json::from_value(value)?),
            ReferenceKind::MagicItem => ReferenceRecord::MagicItem(serde_json::from_value(value)?),
            ReferenceKind::Feat => ReferenceRecord::Feat(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            ReferenceRecord::Spell(_) => ReferenceKind::Spell,
            ReferenceRecord::MagicItem(_) => ReferenceKind::MagicItem,
            ReferenceRecord::Feat(_) => ReferenceKind::Feat,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ReferenceRecord::Spell(spell) => &spell.name,
            ReferenceRecord::MagicItem(item) => &item.name,
            ReferenceRecord::Feat(feat) => &feat.name,
        }
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        let kind = self.kind();
        let name = self.name().trim();
        if name.is_empty() {
            return Err(RecordError::MissingName(kind));
        }
        match self {
            ReferenceRecord::Spell(spell) => {
                if spell.level > 9 {
                    return Err(RecordError::LevelOutOfRange {
                        name: name.to_string(),
                        level: i64::from(spell.level),
                    });
                }
                if spell.description.trim().is_empty() {
                    return Err(RecordError::MissingDescription {
                        kind,
                        name: name.to_string(),
                    });
                }
            }
            ReferenceRecord::MagicItem(_) | ReferenceRecord::Feat(_) => {}
        }
        Ok(())
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl From<SpellRecord> for ReferenceRecord {
    fn from(record: SpellRecord) -> Self {
        ReferenceRecord::Spell(record)
    }
}

impl From<MagicItemRecord> for ReferenceRecord {
    fn from(record: MagicItemRecord) -> Self {
        ReferenceRecord::MagicItem(record)
    }
}

impl From<FeatRecord> for ReferenceRecord {
    fn from(record: FeatRecord) -> Self {
        ReferenceRecord::Feat(record)
    }
}

/// Identity of a stored reference row, as returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceHandle {
    pub id: String,
    #[serde(default)]
    pub level: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_by_kind_and_validates_spell_bounds() {
        let record = ReferenceRecord::from_value(
            ReferenceKind::Spell,
            json!({"name": "Wish", "level": 10, "description": "Anything."}),
        )
        .expect("decodes");
        assert_eq!(
            record.validate(),
            Err(RecordError::LevelOutOfRange {
                name: "Wish".to_string(),
                level: 10
            })
        );
    }

    #[test]
    fn feat_rows_keep_their_kind() {
        let record = ReferenceRecord::from_value(
            ReferenceKind::Feat,
            json!({"name": "Alert", "description": "Always on watch."}),
        )
        .expect("decodes");
        assert_eq!(record.kind(), ReferenceKind::Feat);
        assert!(record.validate().is_ok());
        assert_eq!(record.to_value().expect("encodes")["name"], "Alert");
    }
}
