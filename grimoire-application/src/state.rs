use std::collections::HashMap;
use std::sync::Arc;

use grimoire_domain::ports::{AuthSession, CharacterRepository, ExportSource, ReferenceRepository, ReferenceScraper};
use grimoire_domain::{RuntimeConfig, SessionId};
use tokio::sync::RwLock;

use crate::session::ImportSession;
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub reference_repo: Arc<dyn ReferenceRepository>,
    pub character_repo: Arc<dyn CharacterRepository>,
    pub auth: Arc<dyn AuthSession>,
    pub scraper: Arc<dyn ReferenceScraper>,
    pub exports: Arc<dyn ExportSource>,
    pub sessions: Arc<RwLock<HashMap<SessionId, ImportSession>>>,
    pub metrics: Arc<Metrics>,
}
