use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use grimoire_domain::{
    url_for, BenefitExtractor, ReferenceKind, ReferenceScraper, ScrapeFailure, ScrapedReference, WikiConfig,
};

use super::fetcher::WikiFetcher;
use super::parsers::parse_reference;
use super::transport::PageTransport;

/// Fetches a reference page from the wiki and parses it into a record.
pub struct WikiScraper {
    fetcher: WikiFetcher,
    base_url: String,
    extractor: Arc<dyn BenefitExtractor>,
}

impl WikiScraper {
    pub fn new(transport: Arc<dyn PageTransport>, config: &WikiConfig, extractor: Arc<dyn BenefitExtractor>) -> Self {
        Self {
            fetcher: WikiFetcher::new(transport, config),
            base_url: config.primary_base.clone(),
            extractor,
        }
    }
}

#[async_trait]
impl ReferenceScraper for WikiScraper {
    async fn scrape(&self, kind: ReferenceKind, name: &str) -> Result<ScrapedReference, ScrapeFailure> {
        let url = url_for(&self.base_url, kind, name);
        let page = self.fetcher.fetch(&url).await?;
        match parse_reference(kind, &page.html, name, self.extractor.as_ref()) {
            Ok(record) => {
                debug!("parsed {} \"{}\" from {}", kind.label(), record.name(), url);
                Ok(ScrapedReference {
                    record,
                    attempted_urls: page.attempted_urls,
                })
            }
            Err(err) => {
                warn!("could not parse {} \"{}\": {}", kind.label(), name, err);
                Err(ScrapeFailure::new(err.to_string(), page.attempted_urls))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wiki::benefits::HeuristicBenefitExtractor;
    use crate::wiki::fetcher::tests::{test_config, ScriptedTransport};
    use grimoire_domain::ReferenceRecord;

    const FIREBALL: &str = "<html><body><div class=\"page-title\">Fireball</div><div id=\"page-content\">\
        <p>Level 3 Evocation</p><p>Casting Time: Action</p><p>Range: 150 feet</p><p>Components: V, S, M</p>\
        <p>Duration: Instantaneous</p><p>A bright streak flashes from you to a point you choose.</p></div></body></html>";

    fn scraper(transport: Arc<ScriptedTransport>) -> WikiScraper {
        WikiScraper::new(transport, &test_config(), Arc::new(HeuristicBenefitExtractor))
    }

    #[tokio::test]
    async fn scrapes_spell_from_slugged_url() {
        let transport = Arc::new(ScriptedTransport::default().with("https://dnd2024.wikidot.com/spell:fireball", 200, FIREBALL));
        let scraped = scraper(transport).scrape(ReferenceKind::Spell, "Fireball").await.expect("scrapes");
        assert_eq!(scraped.source_url(), "https://dnd2024.wikidot.com/spell:fireball");
        match scraped.record {
            ReferenceRecord::Spell(spell) => {
                assert_eq!(spell.name, "Fireball");
                assert_eq!(spell.level, 3);
            }
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[tokio::test]
    async fn parse_failures_keep_attempted_urls() {
        let transport = Arc::new(ScriptedTransport::default().with(
            "https://dnd2024.wikidot.com/spell:nameless",
            200,
            "<html><body><div id=\"page-content\"><p>Duration: 1 minute</p><p>Text</p></div></body></html>",
        ));
        let failure = scraper(transport).scrape(ReferenceKind::Spell, "Nameless").await.unwrap_err();
        assert_eq!(failure.message, "Failed to extract spell name from page");
        assert_eq!(failure.source_url(), "https://dnd2024.wikidot.com/spell:nameless");
    }

    #[tokio::test]
    async fn mirror_fallback_is_reported_in_source_url() {
        let transport = Arc::new(
            ScriptedTransport::default()
                .with("https://dnd2024.wikidot.com/magic-item:bag-of-holding", 404, "")
                .with(
                    "https://dnd5e.wikidot.com/magic-item:bag-of-holding",
                    200,
                    "<html><body><div id=\"page-content\"><p>Wondrous Item, uncommon</p><p>This bag is bigger inside.</p></div></body></html>",
                ),
        );
        let scraped = scraper(transport)
            .scrape(ReferenceKind::MagicItem, "Bag of Holding")
            .await
            .expect("mirror serves");
        assert_eq!(
            scraped.source_url(),
            "https://dnd2024.wikidot.com/magic-item:bag-of-holding → https://dnd5e.wikidot.com/magic-item:bag-of-holding"
        );
        assert_eq!(scraped.record.name(), "Bag of Holding");
    }
}
