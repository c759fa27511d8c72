use std::time::Duration;

use tracing::{info, warn};

use grimoire_domain::{
    extract_reference_names, ApprovedBatch, CommitReport, FailEntry, NamedFailure, ReferenceKind, ReviewBoard,
    ReviewBucket, ReviewEntry, ReviewStatus, TransformedCharacter,
};

use crate::{AppError, AppState};

/// Looks up which referenced names are missing and scrapes a candidate for each.
/// Kinds run concurrently; names within a kind are fetched one at a time.
pub async fn prepare_imports(state: &AppState, character: &TransformedCharacter) -> Result<ReviewBoard, AppError> {
    let names = extract_reference_names(character);
    info!(
        "preparing imports for \"{}\": {} spells, {} items, {} feats",
        character.name(),
        names.spells.len(),
        names.items.len(),
        names.feats.len()
    );
    let (spells, items, feats) = tokio::try_join!(
        prepare_kind(state, ReferenceKind::Spell, &names.spells),
        prepare_kind(state, ReferenceKind::MagicItem, &names.items),
        prepare_kind(state, ReferenceKind::Feat, &names.feats),
    )?;
    Ok(ReviewBoard { spells, items, feats })
}

async fn prepare_kind(state: &AppState, kind: ReferenceKind, names: &[String]) -> Result<ReviewBucket, AppError> {
    let mut bucket = ReviewBucket::default();
    if names.is_empty() {
        return Ok(bucket);
    }
    let found = state.reference_repo.existing_names(kind, names).await?;
    let throttle = Duration::from_millis(state.config.wiki.throttle_ms);

    let mut fetched = 0usize;
    for name in names {
        if found.contains(name) {
            bucket.existing.push(name.clone());
            continue;
        }
        if fetched > 0 && !throttle.is_zero() {
            tokio::time::sleep(throttle).await;
        }
        fetched += 1;
        match state.scraper.scrape(kind, name).await {
            Ok(scraped) => {
                state.metrics.record_scrape(true);
                let source_url = scraped.source_url();
                bucket.candidates.push(ReviewEntry::new(scraped.record, source_url));
            }
            Err(failure) => {
                state.metrics.record_scrape(false);
                warn!("could not scrape {} \"{}\": {}", kind.label(), name, failure);
                bucket.failed.push(FailEntry {
                    name: name.clone(),
                    error: failure.message.clone(),
                    source_url: failure.source_url(),
                    status: ReviewStatus::Pending,
                });
            }
        }
    }
    info!(
        "{}: {} existing, {} candidates, {} failed",
        kind.table(),
        bucket.existing.len(),
        bucket.candidates.len(),
        bucket.failed.len()
    );
    Ok(bucket)
}

/// Upserts every approved record keyed on name. Failures are collected, not raised.
pub async fn commit_approved(state: &AppState, batch: &ApprovedBatch) -> CommitReport {
    let mut report = CommitReport::default();
    for kind in ReferenceKind::ALL {
        let kind_report = report.get_mut(kind);
        for record in batch.get(kind) {
            match state.reference_repo.upsert_reference(record).await {
                Ok(()) => kind_report.inserted.push(record.name().to_string()),
                Err(err) => {
                    warn!("failed to insert {} \"{}\": {}", kind.label(), record.name(), err);
                    kind_report.failed.push(NamedFailure {
                        name: record.name().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
    }
    state
        .metrics
        .record_commit(report.total_inserted(), report.total_failed());
    report
}
