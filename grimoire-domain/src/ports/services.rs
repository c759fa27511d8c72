use async_trait::async_trait;

use crate::entities::{BenefitCapability, FeatBenefits, ReferenceRecord};
use crate::error::ScrapeFailure;
use crate::value_objects::{ReferenceKind, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthSession: Send + Sync {
    /// The signed-in user, or `None` when there is no session.
    async fn current_user(&self) -> anyhow::Result<Option<AuthUser>>;
}

/// A parsed reference page together with every URL tried to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedReference {
    pub record: ReferenceRecord,
    pub attempted_urls: Vec<String>,
}

impl ScrapedReference {
    pub fn source_url(&self) -> String {
        self.attempted_urls.join(" → ")
    }
}

#[async_trait]
pub trait ReferenceScraper: Send + Sync {
    async fn scrape(&self, kind: ReferenceKind, name: &str) -> Result<ScrapedReference, ScrapeFailure>;
}

pub trait BenefitExtractor: Send + Sync {
    fn capabilities(&self) -> &'static [BenefitCapability];

    /// Mines `text`. `linked_spells` are spell names linked from the page.
    fn extract(&self, text: &str, linked_spells: &[String]) -> FeatBenefits;
}

/// Fetches a raw character export from D&D Beyond by character id.
#[async_trait]
pub trait ExportSource: Send + Sync {
    async fn fetch_export(&self, character_id: &str) -> anyhow::Result<String>;
}
