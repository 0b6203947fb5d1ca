//! Scanner services and the Contentful integration

pub mod console;
pub mod contentful;
pub mod file_utils;
pub mod logging;
pub mod report;
pub mod repository;
pub mod scanner;

pub use console::ConsoleReporter;
pub use contentful::ContentfulClient;
pub use logging::{LogFormat, init_tracing};
pub use report::{ReportError, ReportWriter, SpaceContext, UnlinkedAssetReportEntry};
pub use repository::{
    AssetPage, AssetQuery, AssetRecord, ContentRepository, RepositoryError,
};
pub use scanner::{PaginationMode, ScanEvent, ScanOutcome, ScanSettings, UnlinkedAssetScanner};
