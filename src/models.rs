//! Data models for Microsoft Graph API payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Metadata of a SharePoint site as returned by the site lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

impl fmt::Display for SiteMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .display_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("-");
        let url = self.web_url.as_deref().unwrap_or("-");
        write!(f, "{}\t{}\t{}", self.id, name, url)
    }
}

/// Managed path a site lives under: `/sites/` or `/teams/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SiteCollection {
    #[default]
    Sites,
    Teams,
}

impl SiteCollection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteCollection::Sites => "sites",
            SiteCollection::Teams => "teams",
        }
    }
}

impl fmt::Display for SiteCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteCollection {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sites" => Ok(SiteCollection::Sites),
            "teams" => Ok(SiteCollection::Teams),
            _ => Err(GraphError::InvalidSiteCollection(s.to_string())),
        }
    }
}

/// Folder facet of a drive item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: Option<u64>,
}

/// File facet of a drive item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// A file or folder inside a drive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub folder: Option<FolderFacet>,
    #[serde(default)]
    pub file: Option<FileFacet>,
    /// Short-lived pre-authenticated URL, only present when explicitly selected.
    #[serde(default, rename = "@microsoft.graph.downloadUrl")]
    pub download_url: Option<String>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

impl fmt::Display for DriveItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size_str = self
            .size
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        let kind = if self.is_folder() {
            "folder"
        } else {
            self.file
                .as_ref()
                .and_then(|file| file.mime_type.as_deref())
                .unwrap_or("-")
        };
        let name = self.name.as_deref().unwrap_or("-");
        write!(f, "{}\t{}\t{}\t{}", self.id, size_str, kind, name)
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Collection response for children listings and searches.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveItemList {
    #[serde(default)]
    pub value: Vec<DriveItem>,
    #[serde(default, rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Server-issued handle for a resumable upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub upload_url: String,
    #[serde(default)]
    pub expiration_date_time: Option<String>,
    #[serde(default)]
    pub next_expected_ranges: Vec<String>,
}

impl UploadSession {
    /// Offset the server expects the first range to start at.
    pub fn next_expected_start(&self) -> Option<u64> {
        first_range_start(&self.next_expected_ranges)
    }
}

/// Body of a `202 Accepted` reply to an intermediate upload range.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatus {
    #[serde(default)]
    pub expiration_date_time: Option<String>,
    #[serde(default)]
    pub next_expected_ranges: Vec<String>,
}

impl UploadStatus {
    /// Offset the server expects the next range to start at.
    pub fn next_expected_start(&self) -> Option<u64> {
        first_range_start(&self.next_expected_ranges)
    }
}

/// Start of the first range in a list like `["10485760-", "20000000-20000999"]`.
fn first_range_start(ranges: &[String]) -> Option<u64> {
    ranges.first()?.split('-').next()?.trim().parse().ok()
}

/// How the server resolves a name collision on upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictBehavior {
    #[default]
    Fail,
    Replace,
    Rename,
}

impl ConflictBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictBehavior::Fail => "fail",
            ConflictBehavior::Replace => "replace",
            ConflictBehavior::Rename => "rename",
        }
    }
}

impl fmt::Display for ConflictBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictBehavior {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(ConflictBehavior::Fail),
            "replace" => Ok(ConflictBehavior::Replace),
            "rename" => Ok(ConflictBehavior::Rename),
            _ => Err(GraphError::InvalidConflictBehavior(s.to_string())),
        }
    }
}

/// Client credentials used for the OAuth2 exchange.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Read credentials from `OFFICE_CLIENT_ID`, `OFFICE_CLIENT_SECRET` and `OFFICE_TENANT_ID`.
    pub fn from_env() -> Result<Self, GraphError> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| GraphError::MissingEnvVar(name.to_string()))
        };
        Ok(Self {
            client_id: var("OFFICE_CLIENT_ID")?,
            client_secret: var("OFFICE_CLIENT_SECRET")?,
            tenant_id: var("OFFICE_TENANT_ID")?,
        })
    }
}

/// OAuth2 token response.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_site_metadata_display_prefers_display_name() {
        let site: SiteMetadata = serde_json::from_str(
            r#"{"id": "contoso,1,2", "name": "mkt", "displayName": "Marketing"}"#,
        )
        .unwrap();

        let display = format!("{}", site);
        assert!(display.starts_with("contoso,1,2\tMarketing"));
        assert!(display.ends_with("\t-"));
    }

    #[test]
    fn test_drive_item_deserialize() {
        let json = r#"{
            "id": "01ABC",
            "name": "report.xlsx",
            "size": 2048,
            "webUrl": "https://contoso.sharepoint.com/sites/Marketing/report.xlsx",
            "file": {"mimeType": "application/vnd.ms-excel"},
            "@microsoft.graph.downloadUrl": "https://download.example/abc"
        }"#;

        let item: DriveItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "01ABC");
        assert_eq!(item.name.as_deref(), Some("report.xlsx"));
        assert_eq!(item.size, Some(2048));
        assert!(!item.is_folder());
        assert_eq!(
            item.download_url.as_deref(),
            Some("https://download.example/abc")
        );
    }

    #[test]
    fn test_drive_item_display_folder() {
        let item: DriveItem =
            serde_json::from_str(r#"{"id": "F1", "name": "Docs", "folder": {"childCount": 3}}"#)
                .unwrap();

        let display = format!("{}", item);
        assert!(display.contains("F1"));
        assert!(display.contains("folder"));
        assert!(display.contains("Docs"));
    }

    #[test]
    fn test_conflict_behavior_serde() {
        let json = serde_json::to_string(&ConflictBehavior::Rename).unwrap();
        assert_eq!(json, "\"rename\"");
        assert_eq!(ConflictBehavior::default(), ConflictBehavior::Fail);
    }

    #[test]
    fn test_next_expected_start() {
        let status: UploadStatus =
            serde_json::from_str(r#"{"nextExpectedRanges": ["10485760-", "30000000-30000999"]}"#)
                .unwrap();
        assert_eq!(status.next_expected_start(), Some(10_485_760));

        let session: UploadSession =
            serde_json::from_str(r#"{"uploadUrl": "https://upload.example/1"}"#).unwrap();
        assert_eq!(session.next_expected_start(), None);

        assert_eq!(first_range_start(&["0-99".to_string()]), Some(0));
        assert_eq!(first_range_start(&["abc-".to_string()]), None);
    }

    #[test]
    fn test_site_collection_from_str() {
        assert_eq!("Teams".parse::<SiteCollection>().unwrap(), SiteCollection::Teams);
        assert_eq!(SiteCollection::default().as_str(), "sites");
        assert!("personal".parse::<SiteCollection>().is_err());
    }

    #[test]
    fn test_conflict_behavior_from_str() {
        assert_eq!(
            "Replace".parse::<ConflictBehavior>().unwrap(),
            ConflictBehavior::Replace
        );
        assert!("overwrite".parse::<ConflictBehavior>().is_err());
    }
}
