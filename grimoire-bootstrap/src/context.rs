use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::sync::RwLock;
use tracing::{info, warn};

use grimoire_application::{AppState, Metrics};
use grimoire_domain::{AuthSession, CharacterRepository, ReferenceRepository};
use grimoire_infrastructure::{
    AppConfig, BeyondExportClient, HeuristicBenefitExtractor, MemoryStore, RelayTransport, RestStore, WikiScraper,
};

pub struct AppContext {
    pub state: AppState,
}

struct Stores {
    references: Arc<dyn ReferenceRepository>,
    characters: Arc<dyn CharacterRepository>,
    auth: Arc<dyn AuthSession>,
}

impl AppContext {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let store_config = config.to_store_config();

        let client = Client::builder()
            .timeout(Duration::from_secs(runtime_config.request_timeout_seconds.max(3)))
            .build()?;

        let stores = if store_config.is_remote() {
            let store = Arc::new(RestStore::new(client.clone(), &store_config)?);
            info!("record store at {}", store_config.url.as_deref().unwrap_or_default());
            Stores {
                references: store.clone(),
                characters: store.clone(),
                auth: store,
            }
        } else {
            warn!("no store_url configured, records are kept in memory");
            let store = Arc::new(MemoryStore::new());
            Stores {
                references: store.clone(),
                characters: store.clone(),
                auth: store,
            }
        };

        let transport = Arc::new(RelayTransport::with_timeout(
            &runtime_config.wiki,
            runtime_config.request_timeout_seconds,
        )?);
        let scraper = Arc::new(WikiScraper::new(
            transport,
            &runtime_config.wiki,
            Arc::new(HeuristicBenefitExtractor),
        ));

        let state = AppState {
            config: runtime_config,
            reference_repo: stores.references,
            character_repo: stores.characters,
            auth: stores.auth,
            scraper,
            exports: Arc::new(BeyondExportClient::new(client, &config.character_service_url)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
