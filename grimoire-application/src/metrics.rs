use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    imports_started: AtomicU64,
    import_errors: AtomicU64,
    scrapes_ok: AtomicU64,
    scrapes_failed: AtomicU64,
    references_committed: AtomicU64,
    reference_commit_errors: AtomicU64,
    characters_saved: AtomicU64,
    save_errors: AtomicU64,
}

impl Metrics {
    pub fn record_import(&self) {
        self.imports_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_import_error(&self) {
        self.import_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scrape(&self, ok: bool) {
        let counter = if ok { &self.scrapes_ok } else { &self.scrapes_failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit(&self, inserted: usize, failed: usize) {
        self.references_committed
            .fetch_add(inserted as u64, Ordering::Relaxed);
        self.reference_commit_errors
            .fetch_add(failed as u64, Ordering::Relaxed);
    }

    pub fn record_save(&self, ok: bool) {
        let counter = if ok { &self.characters_saved } else { &self.save_errors };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("grimoire_imports_total", &self.imports_started),
            ("grimoire_import_errors_total", &self.import_errors),
            ("grimoire_scrapes_ok_total", &self.scrapes_ok),
            ("grimoire_scrapes_failed_total", &self.scrapes_failed),
            ("grimoire_references_committed_total", &self.references_committed),
            ("grimoire_reference_commit_errors_total", &self.reference_commit_errors),
            ("grimoire_characters_saved_total", &self.characters_saved),
            ("grimoire_save_errors_total", &self.save_errors),
        ];
        counters
            .iter()
            .map(|(name, value)| {
                format!(
                    "# TYPE {name} counter\n{name} {}\n",
                    value.load(Ordering::Relaxed)
                )
            })
            .collect()
    }
}
