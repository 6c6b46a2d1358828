//! Site resource: lookups that return SharePoint site metadata.

use crate::error::Result;
use crate::models::{SiteCollection, SiteMetadata};
use crate::session::{error_for_status, GraphSession};

/// Client for the Graph `site` resource.
#[derive(Debug, Clone)]
pub struct Site {
    base_url: String,
    session: GraphSession,
}

impl Site {
    pub fn new(base_url: impl Into<String>, session: GraphSession) -> Self {
        Self {
            base_url: base_url.into(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a site under `/sites/` from its hostname and name.
    ///
    /// # Arguments
    /// * `hostname` - SharePoint host, e.g. `contoso.sharepoint.com`
    /// * `site_name` - site name under `/sites/`, e.g. `Marketing`
    pub async fn get_site_by_relative_url(
        &self,
        hostname: &str,
        site_name: &str,
    ) -> Result<SiteMetadata> {
        self.get_site_by_path(hostname, SiteCollection::Sites, site_name)
            .await
    }

    /// Resolve a site from its hostname, managed path and name, e.g.
    /// `contoso.sharepoint.com` + `teams` + `Ops` for `/teams/Ops`.
    pub async fn get_site_by_path(
        &self,
        hostname: &str,
        collection: SiteCollection,
        site_name: &str,
    ) -> Result<SiteMetadata> {
        self.fetch(&format!(
            "{}/sites/{}:/{}/{}",
            self.base_url, hostname, collection, site_name
        ))
        .await
    }

    /// Root site of the tenant.
    pub async fn get_tenant_root_site(&self) -> Result<SiteMetadata> {
        self.fetch(&format!("{}/sites/root", self.base_url)).await
    }

    /// Team site associated with a Microsoft 365 group.
    pub async fn get_group_team_site(&self, group_id: &str) -> Result<SiteMetadata> {
        self.fetch(&format!("{}/groups/{}/sites/root", self.base_url, group_id))
            .await
    }

    async fn fetch(&self, url: &str) -> Result<SiteMetadata> {
        let response = self.session.get(url).await?.send().await?;
        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }
}
