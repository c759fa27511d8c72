// HTML -> reference record parsers

pub mod feat;
pub mod item;
pub mod spell;

pub use feat::*;
pub use item::*;
pub use spell::*;

use thiserror::Error;
use tracing::warn;

use grimoire_domain::{truncate_chars, BenefitExtractor, RecordError, ReferenceKind, ReferenceRecord, MAX_NAME_LEN};

use super::page::parse_page;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Could not find page content")]
    MissingContent,
    #[error("Failed to extract {0} name from page")]
    MissingName(&'static str),
    #[error("invalid selector {0}")]
    Selector(String),
    #[error(transparent)]
    Record(#[from] RecordError),
}

pub(crate) fn clamp_name(name: &str) -> String {
    let truncated = truncate_chars(name, MAX_NAME_LEN);
    if truncated.len() != name.len() {
        warn!(
            "name truncated from {} to {} chars: \"{}\"",
            name.chars().count(),
            MAX_NAME_LEN,
            name
        );
    }
    truncated
}

/// Parses a fetched page for `kind`. Items and feats without a title take the requested name.
pub fn parse_reference(
    kind: ReferenceKind,
    html: &str,
    requested_name: &str,
    extractor: &dyn BenefitExtractor,
) -> Result<ReferenceRecord, ParseError> {
    let page = parse_page(html)?;
    let record = match kind {
        ReferenceKind::Spell => ReferenceRecord::Spell(parse_spell(&page)?),
        ReferenceKind::MagicItem => ReferenceRecord::MagicItem(parse_item(&page, requested_name)),
        ReferenceKind::Feat => ReferenceRecord::Feat(parse_feat(&page, requested_name, extractor)),
    };
    record.validate()?;
    Ok(record)
}
