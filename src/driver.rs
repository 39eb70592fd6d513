use std::path::PathBuf;

use log::{debug, info, warn};

use crate::{
    bbox::{BoundingBox, RESOLUTION_M},
    config::Config,
    error::FetchError,
    property::PropertyRecord,
    provider::ImageRequester,
    store::ImageStore,
};

/// Progress is logged on successful records whose index is a multiple of this.
pub const PROGRESS_EVERY: usize = 200;

#[derive(Debug)]
pub enum FetchOutcome {
    Saved(PathBuf),
    Failed(FetchError),
    /// Downloading was disabled; nothing was requested.
    Skipped,
}

/// What happened to each record, in input order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(String, FetchOutcome)>,
    /// Record indices at which a "Downloaded" progress line was logged.
    /// Always multiples of [`PROGRESS_EVERY`], in increasing order.
    pub progress_reports: Vec<usize>,
}

impl RunSummary {
    pub fn saved(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Saved(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Skipped))
    }

    fn count(&self, pred: impl Fn(&FetchOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

pub fn is_progress_index(idx: usize) -> bool {
    idx % PROGRESS_EVERY == 0
}

/// Marks every record as skipped without touching the provider.
pub fn skip_all(records: &[PropertyRecord]) -> RunSummary {
    info!("Downloading disabled, skipping image download");
    info!("Pass --download with provider credentials to fetch images");
    RunSummary {
        outcomes: records
            .iter()
            .map(|r| (r.id.clone(), FetchOutcome::Skipped))
            .collect(),
        progress_reports: Vec::new(),
    }
}

pub struct Driver<'a, R: ImageRequester> {
    config: &'a Config,
    requester: R,
    store: ImageStore,
}

impl<'a, R: ImageRequester> Driver<'a, R> {
    pub fn new(config: &'a Config, requester: R, store: ImageStore) -> Driver<'a, R> {
        Driver {
            config,
            requester,
            store,
        }
    }

    /// Processes records in order. A failed record is logged and never
    /// stops the ones after it.
    pub fn run(&self, records: &[PropertyRecord]) -> RunSummary {
        if !self.config.download {
            return skip_all(records);
        }

        let total = records.len();
        let mut summary = RunSummary::default();
        for (idx, record) in records.iter().enumerate() {
            debug!(
                "[{}/{}] {} ({}, {})",
                idx, total, record.id, record.lat, record.lon
            );
            match self.fetch_one(record) {
                Ok(path) => {
                    debug!("Saved {}", path.to_string_lossy());
                    if is_progress_index(idx) {
                        info!("Downloaded {}/{}", idx, total);
                        summary.progress_reports.push(idx);
                    }
                    summary
                        .outcomes
                        .push((record.id.clone(), FetchOutcome::Saved(path)));
                }
                Err(e) => {
                    warn!("Failed for ID {} | {}", record.id, e);
                    summary
                        .outcomes
                        .push((record.id.clone(), FetchOutcome::Failed(e)));
                }
            }
        }

        info!(
            "Image download complete: {} saved, {} failed under {}",
            summary.saved(),
            summary.failed(),
            self.store.root().to_string_lossy()
        );
        summary
    }

    fn fetch_one(&self, record: &PropertyRecord) -> Result<PathBuf, FetchError> {
        let bbox = BoundingBox::around(record.lat, record.lon)?;
        let size = bbox.dimensions(RESOLUTION_M);
        let bytes = self.requester.request_image(&bbox, size)?;
        self.store.save(&record.id, &bytes)
    }
}
