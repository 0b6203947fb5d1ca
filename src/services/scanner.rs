//! Unlinked asset scanner
//!
//! Pages through every asset in an environment ordered by creation time and
//! asks the repository, one asset at a time, whether any entry links to it.
//! Assets with zero linking entries become report entries.
//!
//! A failure while fetching a page or checking one of its assets ends the
//! scan early; whatever was collected up to that point is still returned and
//! the failure is recorded on the [ScanOutcome].

use tracing::{debug, info, warn};

use super::report::{SpaceContext, UnlinkedAssetReportEntry};
use super::repository::{AssetQuery, AssetRecord, ContentRepository, RepositoryError};
use crate::config::Config;

/// Entries requested per reference check; only existence matters
const LINK_CHECK_LIMIT: usize = 1;

/// When to stop paginating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// Stop after a page shorter than the page size
    ShortPage,
    /// Stop only on an empty page
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    pub page_size: usize,
    pub mode: PaginationMode,
}

impl ScanSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.page_size.max(1),
            mode: if config.strict_pagination {
                PaginationMode::Strict
            } else {
                PaginationMode::ShortPage
            },
        }
    }
}

/// Progress notifications emitted while scanning
#[derive(Debug)]
pub enum ScanEvent<'a> {
    PageFetched { skip: usize, count: usize },
    UnlinkedFound(&'a UnlinkedAssetReportEntry),
    /// A page fetch failed, or with `asset_id` set, a reference check in the page at `skip`
    BatchFailed {
        skip: usize,
        asset_id: Option<&'a str>,
        error: &'a RepositoryError,
    },
}

/// Result of a scan
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Unlinked assets in scan order
    pub unlinked: Vec<UnlinkedAssetReportEntry>,
    pub assets_scanned: usize,
    pub pages_fetched: usize,
    /// Set when a batch failure cut the scan short
    pub truncated_by: Option<RepositoryError>,
}

impl ScanOutcome {
    pub fn is_truncated(&self) -> bool {
        self.truncated_by.is_some()
    }
}

/// Scanner over a [ContentRepository]
pub struct UnlinkedAssetScanner<R> {
    repository: R,
    context: SpaceContext,
    settings: ScanSettings,
}

impl<R: ContentRepository> UnlinkedAssetScanner<R> {
    pub fn new(repository: R, context: SpaceContext, settings: ScanSettings) -> Self {
        Self {
            repository,
            context,
            settings,
        }
    }

    pub fn from_config(repository: R, config: &Config) -> Self {
        Self::new(
            repository,
            SpaceContext {
                space_id: config.space_id.clone(),
                environment_id: config.environment_id.clone(),
                locale: config.locale.clone(),
            },
            ScanSettings::from_config(config),
        )
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Scan without progress reporting
    pub async fn scan(&self) -> ScanOutcome {
        self.scan_with_progress(|_| {}).await
    }

    /// Scan every asset, calling `on_event` as pages arrive and unlinked assets are found
    pub async fn scan_with_progress<F>(&self, mut on_event: F) -> ScanOutcome
    where
        F: FnMut(ScanEvent<'_>),
    {
        let page_size = self.settings.page_size;
        let mut outcome = ScanOutcome::default();
        let mut skip = 0usize;

        info!(
            space_id = %self.context.space_id,
            environment_id = %self.context.environment_id,
            page_size,
            mode = ?self.settings.mode,
            "Starting unlinked asset scan"
        );

        loop {
            let query = AssetQuery::page(skip, page_size);
            let page = match self.repository.list_assets(&query).await {
                Ok(page) => page,
                Err(error) => {
                    self.truncate(&mut outcome, skip, None, error, &mut on_event);
                    break;
                }
            };

            let count = page.items.len();
            outcome.pages_fetched += 1;
            debug!(skip, count, total = ?page.total, "Fetched asset page");
            on_event(ScanEvent::PageFetched { skip, count });

            if count == 0 {
                break;
            }

            let checked = self.process_page(&page.items, &mut outcome, &mut on_event).await;
            if let Err((asset_id, error)) = checked {
                self.truncate(&mut outcome, skip, Some(asset_id), error, &mut on_event);
                break;
            }

            skip += page_size;

            if count < page_size && self.settings.mode == PaginationMode::ShortPage {
                break;
            }
        }

        info!(
            assets_scanned = outcome.assets_scanned,
            pages_fetched = outcome.pages_fetched,
            unlinked = outcome.unlinked.len(),
            truncated = outcome.is_truncated(),
            "Unlinked asset scan finished"
        );
        outcome
    }

    /// Check every asset in a page; on failure, returns the asset whose check failed
    async fn process_page<'p, F>(
        &self,
        assets: &'p [AssetRecord],
        outcome: &mut ScanOutcome,
        on_event: &mut F,
    ) -> Result<(), (&'p str, RepositoryError)>
    where
        F: FnMut(ScanEvent<'_>),
    {
        for asset in assets {
            let links = self
                .repository
                .count_entries_linking_to(asset.id(), LINK_CHECK_LIMIT)
                .await
                .map_err(|error| (asset.id(), error))?;
            outcome.assets_scanned += 1;

            if links == 0 {
                let entry = UnlinkedAssetReportEntry::from_asset(asset, &self.context);
                debug!(asset_id = %entry.id, title = %entry.title, "Unlinked asset");
                on_event(ScanEvent::UnlinkedFound(&entry));
                outcome.unlinked.push(entry);
            }
        }
        Ok(())
    }

    fn truncate<F>(
        &self,
        outcome: &mut ScanOutcome,
        skip: usize,
        asset_id: Option<&str>,
        error: RepositoryError,
        on_event: &mut F,
    ) where
        F: FnMut(ScanEvent<'_>),
    {
        warn!(
            skip,
            asset_id = ?asset_id,
            error = %error,
            collected = outcome.unlinked.len(),
            "Asset batch failed; ending scan with partial results"
        );
        on_event(ScanEvent::BatchFailed {
            skip,
            asset_id,
            error: &error,
        });
        outcome.truncated_by = Some(error);
    }
}
