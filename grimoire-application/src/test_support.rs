// Fixtures shared by the command tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Map;
use tokio::sync::RwLock;
use tokio::time::Instant;

use grimoire_domain::{
    url_for, AbilityScore, AbilityScores, AuthUser, CharacterCore, CharacterFeature, CharacterSpell, ClassLevel,
    Currency, ExportSource, FeatRecord, FeatureSource, InventoryItem, ReferenceKind, ReferenceRecord, ReferenceScraper,
    ResetCadence, RuntimeConfig, ScrapeFailure, ScrapedReference, SkillProficiency, SpellRecord, TransformedCharacter,
    UserId, WikiConfig,
};
use grimoire_infrastructure::MemoryStore;

use crate::{AppState, Metrics};

const TEST_WIKI: &str = "https://wiki.test";

/// Serves canned records by (kind, name) and fails everything else.
#[derive(Default)]
pub struct ScriptedScraper {
    records: HashMap<(ReferenceKind, String), ReferenceRecord>,
    latency: Duration,
    requests: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedScraper {
    pub fn with(mut self, record: impl Into<ReferenceRecord>) -> Self {
        let record = record.into();
        self.records.insert((record.kind(), record.name().to_string()), record);
        self
    }

    /// Makes every scrape take `latency` before answering.
    pub fn slow(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Every scrape so far, as `prefix:Name`.
    pub fn requested(&self) -> Vec<String> {
        self.requested_at().into_iter().map(|(request, _)| request).collect()
    }

    /// Every scrape so far with the instant it started.
    pub fn requested_at(&self) -> Vec<(String, Instant)> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ReferenceScraper for ScriptedScraper {
    async fn scrape(&self, kind: ReferenceKind, name: &str) -> Result<ScrapedReference, ScrapeFailure> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((format!("{}:{}", kind.wiki_prefix(), name), Instant::now()));
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let url = url_for(TEST_WIKI, kind, name);
        match self.records.get(&(kind, name.to_string())) {
            Some(record) => Ok(ScrapedReference {
                record: record.clone(),
                attempted_urls: vec![url],
            }),
            None => Err(ScrapeFailure::new("HTTP 404: Not Found", vec![url])),
        }
    }
}

/// Serves canned exports by character id.
#[derive(Default)]
pub struct StubExports {
    exports: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StubExports {
    pub fn with(mut self, character_id: &str, raw: &str) -> Self {
        self.exports.insert(character_id.to_string(), raw.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ExportSource for StubExports {
    async fn fetch_export(&self, character_id: &str) -> anyhow::Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(character_id.to_string());
        }
        self.exports
            .get(character_id)
            .cloned()
            .ok_or_else(|| anyhow!("character service responded 404 Not Found"))
    }
}

/// State over one in-memory store signed in as `tester`, with no throttle.
pub fn test_state(scraper: Arc<dyn ReferenceScraper>) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_user(AuthUser {
        id: UserId("tester".to_string()),
        email: None,
    }));
    let state = AppState {
        config: RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 5,
            default_user_id: None,
            wiki: WikiConfig {
                primary_base: TEST_WIKI.to_string(),
                relay_url: None,
                fallback_delay_ms: 0,
                throttle_ms: 0,
                ..WikiConfig::default()
            },
        },
        reference_repo: store.clone(),
        character_repo: store.clone(),
        auth: store.clone(),
        scraper,
        exports: Arc::new(StubExports::default()),
        sessions: Arc::new(RwLock::new(HashMap::new())),
        metrics: Arc::new(Metrics::default()),
    };
    (state, store)
}

pub fn spell_record(name: &str, level: u8) -> SpellRecord {
    SpellRecord {
        name: name.to_string(),
        level,
        school: Some("Evocation".to_string()),
        casting_time: Some("Action".to_string()),
        range: Some("60 feet".to_string()),
        components: Some("V, S".to_string()),
        duration: Some("Instantaneous".to_string()),
        description: format!("{} does what it says.", name),
        higher_levels: None,
    }
}

pub fn feat_record(name: &str, description: &str) -> FeatRecord {
    FeatRecord {
        name: name.to_string(),
        prerequisites: None,
        description: description.to_string(),
        benefits: None,
    }
}

/// A level 2 wizard with one known cantrip, one unknown spell and mundane gear only.
pub fn wizard_character() -> TransformedCharacter {
    let mut abilities = AbilityScores::default();
    abilities.intelligence = AbilityScore {
        score: 18,
        proficient: true,
    };
    TransformedCharacter {
        character: CharacterCore {
            user_id: "tester".to_string(),
            name: "Mira".to_string(),
            level: 2,
            classes: vec![ClassLevel {
                class_name: "Wizard".to_string(),
                level: 2,
                subclass: None,
            }],
            species: "Human".to_string(),
            background: Some("Sage".to_string()),
            max_hp: 12,
            speed: 30,
            abilities,
            spellcasting_ability: Some("intelligence".to_string()),
        },
        skills: vec![
            SkillProficiency {
                skill_name: "Arcana".to_string(),
                expertise: false,
            },
            SkillProficiency {
                skill_name: "History".to_string(),
                expertise: false,
            },
        ],
        spells: vec![
            CharacterSpell {
                name: "Fire Bolt".to_string(),
                level: 0,
                is_prepared: false,
                always_prepared: false,
            },
            CharacterSpell {
                name: "Magic Missile".to_string(),
                level: 1,
                is_prepared: true,
                always_prepared: false,
            },
        ],
        features: vec![CharacterFeature {
            name: "Arcane Recovery".to_string(),
            source: FeatureSource::Class,
            description: "Recover spell slots on a short rest.".to_string(),
            max_uses: Some(1),
            reset_on: Some(ResetCadence::Long),
        }],
        feats: Vec::new(),
        ability_score_improvements: Vec::new(),
        inventory: vec![
            InventoryItem {
                name: "Quarterstaff".to_string(),
                is_magic_item: false,
                quantity: 1,
                equipped: true,
                attuned: false,
                notes: None,
            },
            InventoryItem {
                name: "Spellbook".to_string(),
                is_magic_item: false,
                quantity: 1,
                equipped: false,
                attuned: false,
                notes: None,
            },
        ],
        currency: Currency { gold: 15 },
        senses: Vec::new(),
        class_specific: Map::new(),
        warnings: Vec::new(),
    }
}
