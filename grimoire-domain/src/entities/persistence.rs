// Rows written to the record store when a character is saved

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entities::asi::AbilityScoreImprovement;
use crate::entities::character::{FeatChoices, TransformedCharacter};
use crate::value_objects::{Ability, CharacterId};

/// Child collections in the order they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStep {
    Skills,
    Spells,
    Features,
    Feats,
    Inventory,
    Currency,
    Senses,
    ClassSpecific,
}

impl SaveStep {
    pub const ALL: [SaveStep; 8] = [
        SaveStep::Skills,
        SaveStep::Spells,
        SaveStep::Features,
        SaveStep::Feats,
        SaveStep::Inventory,
        SaveStep::Currency,
        SaveStep::Senses,
        SaveStep::ClassSpecific,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            SaveStep::Skills => "character_skills",
            SaveStep::Spells => "character_spells",
            SaveStep::Features => "character_features",
            SaveStep::Feats => "character_feats",
            SaveStep::Inventory => "character_inventory",
            SaveStep::Currency => "character_currency",
            SaveStep::Senses => "character_senses",
            SaveStep::ClassSpecific => "character_class_specific",
        }
    }
}

impl std::fmt::Display for SaveStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

pub const CHARACTERS_TABLE: &str = "characters";

/// Where an interrupted save stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveProgress {
    pub character_id: CharacterId,
    pub completed: Vec<SaveStep>,
    #[serde(default)]
    pub failed_step: Option<SaveStep>,
}

impl SaveProgress {
    pub fn new(character_id: CharacterId) -> Self {
        Self {
            character_id,
            completed: Vec::new(),
            failed_step: None,
        }
    }

    pub fn is_completed(&self, step: SaveStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn remaining(&self) -> Vec<SaveStep> {
        SaveStep::ALL
            .into_iter()
            .filter(|step| !self.is_completed(*step))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRow {
    pub user_id: String,
    pub name: String,
    pub level: u32,
    pub classes: Value,
    pub species: String,
    pub background: Option<String>,
    pub max_hp: i64,
    pub speed: i64,
    pub strength: i64,
    pub dexterity: i64,
    pub constitution: i64,
    pub intelligence: i64,
    pub wisdom: i64,
    pub charisma: i64,
    pub save_strength: bool,
    pub save_dexterity: bool,
    pub save_constitution: bool,
    pub save_intelligence: bool,
    pub save_wisdom: bool,
    pub save_charisma: bool,
    pub spellcasting_ability: Option<String>,
    pub ability_score_improvements: Vec<AbilityScoreImprovement>,
}

impl CharacterRow {
    pub fn from_character(character: &TransformedCharacter, user_id: &str) -> Result<Self, serde_json::Error> {
        let core = &character.character;
        let score = |ability: Ability| core.abilities.get(ability);
        Ok(Self {
            user_id: user_id.to_string(),
            name: core.name.clone(),
            level: core.level,
            classes: serde_json::to_value(&core.classes)?,
            species: core.species.clone(),
            background: core.background.clone(),
            max_hp: core.max_hp,
            speed: core.speed,
            strength: score(Ability::Strength).score,
            dexterity: score(Ability::Dexterity).score,
            constitution: score(Ability::Constitution).score,
            intelligence: score(Ability::Intelligence).score,
            wisdom: score(Ability::Wisdom).score,
            charisma: score(Ability::Charisma).score,
            save_strength: score(Ability::Strength).proficient,
            save_dexterity: score(Ability::Dexterity).proficient,
            save_constitution: score(Ability::Constitution).proficient,
            save_intelligence: score(Ability::Intelligence).proficient,
            save_wisdom: score(Ability::Wisdom).proficient,
            save_charisma: score(Ability::Charisma).proficient,
            spellcasting_ability: core.spellcasting_ability.clone(),
            ability_score_improvements: character.ability_score_improvements.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRow {
    pub character_id: CharacterId,
    pub skill_name: String,
    pub expertise: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellLinkRow {
    pub character_id: CharacterId,
    pub spell_id: String,
    pub is_prepared: bool,
    pub always_prepared: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub character_id: CharacterId,
    pub name: String,
    pub source: String,
    pub description: String,
    pub max_uses: Option<i64>,
    pub reset_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatLinkRow {
    pub character_id: CharacterId,
    pub feat_id: String,
    pub source: String,
    pub choices: Option<FeatChoices>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub character_id: CharacterId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mundane_item_name: Option<String>,
    pub quantity: u32,
    pub equipped: bool,
    pub attuned: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRow {
    pub character_id: CharacterId,
    pub gold: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseRow {
    pub character_id: CharacterId,
    pub sense_type: String,
    pub range: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSpecificRow {
    pub character_id: CharacterId,
    pub data: Map<String, Value>,
}

/// One child collection ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildRows {
    Skills(Vec<SkillRow>),
    Spells(Vec<SpellLinkRow>),
    Features(Vec<FeatureRow>),
    Feats(Vec<FeatLinkRow>),
    Inventory(Vec<InventoryRow>),
    Currency(CurrencyRow),
    Senses(Vec<SenseRow>),
    ClassSpecific(ClassSpecificRow),
}

impl ChildRows {
    pub fn step(&self) -> SaveStep {
        match self {
            ChildRows::Skills(_) => SaveStep::Skills,
            ChildRows::Spells(_) => SaveStep::Spells,
            ChildRows::Features(_) => SaveStep::Features,
            ChildRows::Feats(_) => SaveStep::Feats,
            ChildRows::Inventory(_) => SaveStep::Inventory,
            ChildRows::Currency(_) => SaveStep::Currency,
            ChildRows::Senses(_) => SaveStep::Senses,
            ChildRows::ClassSpecific(_) => SaveStep::ClassSpecific,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChildRows::Skills(rows) => rows.len(),
            ChildRows::Spells(rows) => rows.len(),
            ChildRows::Features(rows) => rows.len(),
            ChildRows::Feats(rows) => rows.len(),
            ChildRows::Inventory(rows) => rows.len(),
            ChildRows::Senses(rows) => rows.len(),
            ChildRows::Currency(_) | ChildRows::ClassSpecific(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows as a JSON array, the shape bulk inserts take.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            ChildRows::Skills(rows) => serde_json::to_value(rows),
            ChildRows::Spells(rows) => serde_json::to_value(rows),
            ChildRows::Features(rows) => serde_json::to_value(rows),
            ChildRows::Feats(rows) => serde_json::to_value(rows),
            ChildRows::Inventory(rows) => serde_json::to_value(rows),
            ChildRows::Currency(row) => serde_json::to_value([row]),
            ChildRows::Senses(rows) => serde_json::to_value(rows),
            ChildRows::ClassSpecific(row) => serde_json::to_value([row]),
        }
    }
}
