//! Human-readable console output: banner, scan progress and final summary.
//!
//! Writes to any [Write] sink so the text can be captured; the binary uses stdout.

use std::io::{self, Write};
use std::path::Path;

use super::report::UnlinkedAssetReportEntry;
use super::scanner::{ScanEvent, ScanOutcome};

const RULE: &str = "────────────────────────────────────────────────────────────";

pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn banner(&mut self, space_id: &str, environment_id: &str) -> io::Result<()> {
        writeln!(self.out, "🔍 Scanning for unlinked assets...")?;
        writeln!(self.out, "Space: {}", space_id)?;
        writeln!(self.out, "Environment: {}", environment_id)?;
        writeln!(self.out)
    }

    /// Render one scan progress event
    pub fn progress(&mut self, event: &ScanEvent<'_>) -> io::Result<()> {
        match event {
            ScanEvent::PageFetched { skip, count } if *count > 0 => writeln!(
                self.out,
                "📄 Checking assets {}-{}...",
                skip + 1,
                skip + count
            ),
            ScanEvent::PageFetched { .. } => Ok(()),
            ScanEvent::UnlinkedFound(entry) => {
                writeln!(self.out, "   ❌ Unlinked: {} ({})", entry.title, entry.id)
            }
            ScanEvent::BatchFailed {
                skip,
                asset_id: None,
                error,
            } => writeln!(
                self.out,
                "⚠️  Error fetching assets at offset {}: {}",
                skip, error
            ),
            ScanEvent::BatchFailed {
                skip,
                asset_id: Some(asset_id),
                error,
            } => writeln!(
                self.out,
                "⚠️  Error checking references for asset {} (page at offset {}): {}",
                asset_id, skip, error
            ),
        }
    }

    /// Final summary after the report has been written
    pub fn summary(&mut self, outcome: &ScanOutcome, report_path: &Path) -> io::Result<()> {
        let file_name = report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| report_path.display().to_string());

        writeln!(self.out)?;
        writeln!(self.out, "✅ Scan complete!")?;
        writeln!(self.out, "Scanned {} assets.", outcome.assets_scanned)?;
        writeln!(self.out, "Found {} unlinked assets.", outcome.unlinked.len())?;
        writeln!(self.out, "Results saved to: {}", file_name)?;

        if let Some(error) = &outcome.truncated_by {
            writeln!(
                self.out,
                "⚠️  The scan stopped early ({}); the report may be incomplete.",
                error
            )?;
        }

        if outcome.unlinked.is_empty() {
            writeln!(self.out)?;
            writeln!(
                self.out,
                "🎉 No unlinked assets found! Your media library is well organized."
            )?;
            return Ok(());
        }

        writeln!(self.out)?;
        writeln!(self.out, "📋 Unlinked assets:")?;
        writeln!(self.out, "{}", RULE)?;
        for (index, entry) in outcome.unlinked.iter().enumerate() {
            self.entry(index + 1, entry)?;
            writeln!(self.out, "{}", RULE)?;
        }
        Ok(())
    }

    fn entry(&mut self, number: usize, entry: &UnlinkedAssetReportEntry) -> io::Result<()> {
        writeln!(self.out, "{}. {}", number, entry.title)?;
        writeln!(self.out, "   ID: {}", entry.id)?;
        writeln!(self.out, "   Type: {}", entry.content_type)?;
        writeln!(self.out, "   Size: {}", entry.file_size)?;
        writeln!(self.out, "   Created: {}", entry.created_at)?;
        writeln!(self.out, "   Link: {}", entry.contentful_url)
    }
}
