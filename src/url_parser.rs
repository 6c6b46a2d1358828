//! Parser for SharePoint site URLs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{GraphError, Result};
use crate::models::SiteCollection;

/// `https://<host>/<sites|teams>/<name>` with optional trailing path, query or fragment.
static SITE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([a-zA-Z0-9.-]+)/(sites|teams)/([^/?#]+)")
        .expect("Invalid site URL regex")
});

/// Hostname, managed path and name of a SharePoint site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAddress {
    pub hostname: String,
    pub collection: SiteCollection,
    pub site_name: String,
}

/// Split a SharePoint site URL into hostname, managed path and site name.
///
/// Supports the following URL formats:
/// - `https://contoso.sharepoint.com/sites/<NAME>`
/// - `https://contoso.sharepoint.com/teams/<NAME>`
/// - either of the above followed by a library path, e.g. `/Shared%20Documents/...`
///
/// # Examples
///
/// ```
/// use sharepoint_drive::url_parser::parse_site_url;
///
/// let address = parse_site_url("https://contoso.sharepoint.com/sites/Marketing").unwrap();
/// assert_eq!(address.hostname, "contoso.sharepoint.com");
/// assert_eq!(address.site_name, "Marketing");
/// ```
pub fn parse_site_url(url: &str) -> Result<SiteAddress> {
    let trimmed = url.trim();

    if let Some(captures) = SITE_URL_REGEX.captures(trimmed) {
        if let (Some(hostname), Some(collection), Some(site_name)) =
            (captures.get(1), captures.get(2), captures.get(3))
        {
            return Ok(SiteAddress {
                hostname: hostname.as_str().to_string(),
                collection: collection.as_str().parse()?,
                site_name: site_name.as_str().to_string(),
            });
        }
    }

    Err(GraphError::InvalidSiteUrl(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sites_url() {
        let address = parse_site_url("https://contoso.sharepoint.com/sites/Marketing").unwrap();
        assert_eq!(address.hostname, "contoso.sharepoint.com");
        assert_eq!(address.collection, SiteCollection::Sites);
        assert_eq!(address.site_name, "Marketing");
    }

    #[test]
    fn test_parse_with_library_path() {
        let address = parse_site_url(
            "https://contoso.sharepoint.com/sites/Marketing/Shared%20Documents/Forms/AllItems.aspx",
        )
        .unwrap();
        assert_eq!(address.site_name, "Marketing");
    }

    #[test]
    fn test_parse_with_whitespace() {
        let address = parse_site_url("  https://contoso.sharepoint.com/teams/Ops  ").unwrap();
        assert_eq!(address.collection, SiteCollection::Teams);
        assert_eq!(address.site_name, "Ops");
    }

    #[test]
    fn test_invalid_url() {
        assert!(parse_site_url("https://contoso.sharepoint.com/").is_err());
        assert!(parse_site_url("contoso.sharepoint.com/sites/Marketing").is_err());
        assert!(parse_site_url("").is_err());
    }
}
