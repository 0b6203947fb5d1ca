//! Unlinked asset report entries and the JSON report writer

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::info;

use super::file_utils::{UNKNOWN, file_size_label, file_timestamp, format_locale_date};
use super::repository::AssetRecord;

/// Report file name prefix
pub const REPORT_PREFIX: &str = "unlinked-assets-";

const UNTITLED: &str = "Untitled";
const NO_URL: &str = "No URL";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where an asset lives, used to build console deep links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceContext {
    pub space_id: String,
    pub environment_id: String,
    pub locale: String,
}

impl SpaceContext {
    /// Web app link for an asset
    pub fn asset_url(&self, asset_id: &str) -> String {
        format!(
            "https://app.contentful.com/spaces/{}/environments/{}/assets/{}",
            self.space_id, self.environment_id, asset_id
        )
    }
}

/// One asset no entry links to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlinkedAssetReportEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub content_type: String,
    pub file_size: String,
    pub created_at: String,
    pub updated_at: String,
    pub contentful_url: String,
}

impl UnlinkedAssetReportEntry {
    pub fn from_asset(asset: &AssetRecord, ctx: &SpaceContext) -> Self {
        let title = asset
            .fields
            .title
            .as_ref()
            .and_then(|t| localized_text(t, &ctx.locale))
            .unwrap_or(UNTITLED)
            .to_string();

        let file = asset
            .fields
            .file
            .as_ref()
            .and_then(|f| localized(f, &ctx.locale));
        let file_str = |key: &str| file.and_then(|f| f.get(key)).and_then(JsonValue::as_str);

        Self {
            id: asset.id().to_string(),
            title,
            url: file_str("url").unwrap_or(NO_URL).to_string(),
            content_type: file_str("contentType").unwrap_or(UNKNOWN).to_string(),
            file_size: file_size_label(file.and_then(|f| f.pointer("/details/size"))),
            created_at: format_locale_date(asset.sys.created_at.as_deref()),
            updated_at: format_locale_date(asset.sys.updated_at.as_deref()),
            contentful_url: ctx.asset_url(asset.id()),
        }
    }
}

/// Resolve a possibly-localized field value.
///
/// A plain string, or an object that is itself a file descriptor, is the raw
/// value. A locale map yields the requested locale, else its first non-null
/// value.
fn localized<'a>(value: &'a JsonValue, locale: &str) -> Option<&'a JsonValue> {
    match value {
        JsonValue::Null => None,
        JsonValue::Object(map) => {
            if map.contains_key("url") || map.contains_key("contentType") {
                return Some(value);
            }
            map.get(locale)
                .filter(|v| !v.is_null())
                .or_else(|| map.values().find(|v| !v.is_null()))
        }
        other => Some(other),
    }
}

/// Resolve a possibly-localized text field to a non-empty string.
///
/// A locale map yields the requested locale when it holds text, else the
/// first non-empty string in the map.
fn localized_text<'a>(value: &'a JsonValue, locale: &str) -> Option<&'a str> {
    let non_empty = |v: &'a JsonValue| v.as_str().filter(|s| !s.is_empty());
    match value {
        JsonValue::Object(map) => map
            .get(locale)
            .and_then(non_empty)
            .or_else(|| map.values().find_map(non_empty)),
        other => non_empty(other),
    }
}

/// Report file name for a run started at `at`
pub fn report_file_name(at: DateTime<Utc>) -> String {
    format!("{}{}.json", REPORT_PREFIX, file_timestamp(at))
}

/// Writes the final report as a pretty-printed JSON array
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Serialize `entries` to `unlinked-assets-<timestamp>.json` and return the path
    pub async fn write(
        &self,
        entries: &[UnlinkedAssetReportEntry],
        at: DateTime<Utc>,
    ) -> Result<PathBuf, ReportError> {
        let path = self.output_dir.join(report_file_name(at));
        let json = serde_json::to_string_pretty(entries)?;

        tokio::fs::write(&path, json)
            .await
            .map_err(|source| ReportError::Write {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), entries = entries.len(), "Report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn ctx() -> SpaceContext {
        SpaceContext {
            space_id: "S".into(),
            environment_id: "E".into(),
            locale: "en-US".into(),
        }
    }

    fn asset(value: JsonValue) -> AssetRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_deep_link_template() {
        assert_eq!(
            ctx().asset_url("A"),
            "https://app.contentful.com/spaces/S/environments/E/assets/A"
        );
    }

    #[test]
    fn test_full_entry() {
        let record = asset(json!({
            "sys": {
                "id": "asset-2",
                "createdAt": "2024-03-09T12:00:00.000Z",
                "updatedAt": "2024-04-10T12:00:00.000Z"
            },
            "fields": {
                "title": { "en-US": "Banner" },
                "file": { "en-US": {
                    "url": "//images.ctfassets.net/S/asset-2/banner.jpg",
                    "contentType": "image/jpeg",
                    "details": { "size": 1536 }
                }}
            }
        }));

        let entry = UnlinkedAssetReportEntry::from_asset(&record, &ctx());
        assert_eq!(
            entry,
            UnlinkedAssetReportEntry {
                id: "asset-2".into(),
                title: "Banner".into(),
                url: "//images.ctfassets.net/S/asset-2/banner.jpg".into(),
                content_type: "image/jpeg".into(),
                file_size: "1.50 KB".into(),
                created_at: "3/9/2024".into(),
                updated_at: "4/10/2024".into(),
                contentful_url: "https://app.contentful.com/spaces/S/environments/E/assets/asset-2"
                    .into(),
            }
        );
    }

    #[test]
    fn test_missing_fields_fall_back() {
        let record = asset(json!({ "sys": { "id": "x" } }));
        let entry = UnlinkedAssetReportEntry::from_asset(&record, &ctx());
        assert_eq!(entry.title, "Untitled");
        assert_eq!(entry.url, "No URL");
        assert_eq!(entry.content_type, "Unknown");
        assert_eq!(entry.file_size, "Unknown");
        assert_eq!(entry.created_at, "Unknown");
    }

    #[test]
    fn test_title_fallback_chain() {
        let title_of = |title: serde_json::Value| {
            let record = asset(json!({ "sys": { "id": "a" }, "fields": { "title": title } }));
            UnlinkedAssetReportEntry::from_asset(&record, &ctx()).title
        };

        assert_eq!(title_of(json!({ "en-US": "Localized", "de-DE": "Lokal" })), "Localized");
        assert_eq!(title_of(json!("Raw title")), "Raw title");
        assert_eq!(title_of(json!({ "de-DE": "Nur Deutsch" })), "Nur Deutsch");
        assert_eq!(title_of(json!({ "en-US": "" })), "Untitled");
        assert_eq!(title_of(json!({ "de-DE": "", "es-ES": 42, "fr-FR": "Titre" })), "Titre");
        assert_eq!(title_of(json!({ "en-US": "", "fr-FR": "Titre" })), "Titre");
    }

    #[test]
    fn test_unlocalized_file_descriptor() {
        let record = asset(json!({
            "sys": { "id": "flat" },
            "fields": { "file": {
                "url": "https://cdn/x.pdf",
                "contentType": "application/pdf",
                "details": { "size": 0 }
            }}
        }));
        let entry = UnlinkedAssetReportEntry::from_asset(&record, &ctx());
        assert_eq!(entry.url, "https://cdn/x.pdf");
        assert_eq!(entry.content_type, "application/pdf");
        assert_eq!(entry.file_size, "0 Bytes");
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = asset(json!({ "sys": { "id": "x" } }));
        let entry = UnlinkedAssetReportEntry::from_asset(&record, &ctx());
        let value = serde_json::to_value(&entry).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "id",
            "title",
            "url",
            "contentType",
            "fileSize",
            "createdAt",
            "updatedAt",
            "contentfulUrl",
        ] {
            assert!(keys.contains(&key), "missing key {}", key);
        }
        assert_eq!(keys.len(), 8);
    }

    #[test]
    fn test_report_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(report_file_name(at), "unlinked-assets-2024-01-15T10-30-00.json");
    }

    #[tokio::test]
    async fn test_write_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(dir.path().join("does-not-exist"));
        let result = writer.write(&[], Utc::now()).await;
        assert!(matches!(result, Err(ReportError::Write { .. })));
    }
}
