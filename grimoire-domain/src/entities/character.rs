use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::asi::AbilityScoreImprovement;
use crate::value_objects::Ability;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLevel {
    #[serde(rename = "class")]
    pub class_name: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subclass: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScore {
    pub score: i64,
    pub proficient: bool,
}

impl Default for AbilityScore {
    fn default() -> Self {
        Self {
            score: 10,
            proficient: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: AbilityScore,
    pub dexterity: AbilityScore,
    pub constitution: AbilityScore,
    pub intelligence: AbilityScore,
    pub wisdom: AbilityScore,
    pub charisma: AbilityScore,
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> AbilityScore {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn get_mut(&mut self, ability: Ability) -> &mut AbilityScore {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Charisma => &mut self.charisma,
        }
    }
}

/// Core character row before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterCore {
    pub user_id: String,
    pub name: String,
    pub level: u32,
    pub classes: Vec<ClassLevel>,
    pub species: String,
    #[serde(default)]
    pub background: Option<String>,
    pub max_hp: i64,
    pub speed: i64,
    pub abilities: AbilityScores,
    #[serde(default)]
    pub spellcasting_ability: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProficiency {
    pub skill_name: String,
    pub expertise: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSpell {
    pub name: String,
    /// Spell level as read from the export. Used to resolve the reference row.
    pub level: u8,
    pub is_prepared: bool,
    pub always_prepared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureSource {
    Species,
    Class,
    Background,
}

impl FeatureSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureSource::Species => "species",
            FeatureSource::Class => "class",
            FeatureSource::Background => "background",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetCadence {
    Short,
    Long,
    Dawn,
}

impl ResetCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetCadence::Short => "short",
            ResetCadence::Long => "long",
            ResetCadence::Dawn => "dawn",
        }
    }

    /// Export reset type ids: 1 short rest, 2 and 3 long rest, 4 dawn.
    pub fn from_export_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(ResetCadence::Short),
            2 | 3 => Some(ResetCadence::Long),
            4 => Some(ResetCadence::Dawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFeature {
    pub name: String,
    pub source: FeatureSource,
    pub description: String,
    #[serde(default)]
    pub max_uses: Option<i64>,
    #[serde(default)]
    pub reset_on: Option<ResetCadence>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatSource {
    Background,
    Level,
}

impl FeatSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatSource::Background => "background",
            FeatSource::Level => "level",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatSelection {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub choice_type: Option<i64>,
    #[serde(default)]
    pub sub_type: Option<i64>,
    #[serde(default)]
    pub option_value: Option<String>,
    #[serde(default)]
    pub option_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatChoices {
    pub selections: Vec<FeatSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spells_chosen: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability_choice: Option<Ability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterFeat {
    pub name: String,
    pub source: FeatSource,
    #[serde(default)]
    pub choices: Option<FeatChoices>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub name: String,
    pub is_magic_item: bool,
    pub quantity: u32,
    pub equipped: bool,
    pub attuned: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Currency {
    pub gold: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenseType {
    Darkvision,
    Blindsight,
    Tremorsense,
    Truesight,
}

impl SenseType {
    pub const ALL: [SenseType; 4] = [
        SenseType::Darkvision,
        SenseType::Blindsight,
        SenseType::Tremorsense,
        SenseType::Truesight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SenseType::Darkvision => "darkvision",
            SenseType::Blindsight => "blindsight",
            SenseType::Tremorsense => "tremorsense",
            SenseType::Truesight => "truesight",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.trim().to_lowercase();
        SenseType::ALL.into_iter().find(|sense| sense.as_str() == lower)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSense {
    pub sense_type: SenseType,
    pub range: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Normalized character graph produced from one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformedCharacter {
    pub character: CharacterCore,
    pub skills: Vec<SkillProficiency>,
    pub spells: Vec<CharacterSpell>,
    pub features: Vec<CharacterFeature>,
    pub feats: Vec<CharacterFeat>,
    pub ability_score_improvements: Vec<AbilityScoreImprovement>,
    pub inventory: Vec<InventoryItem>,
    pub currency: Currency,
    pub senses: Vec<CharacterSense>,
    pub class_specific: Map<String, Value>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl TransformedCharacter {
    pub fn name(&self) -> &str {
        &self.character.name
    }

    pub fn magic_items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.inventory.iter().filter(|item| item.is_magic_item)
    }
}
