//! SharePoint service: one authenticated scope bound to a single site.

use std::future::Future;
use std::path::Path;

use tracing::info;

use crate::auth::GraphAuthProvider;
use crate::drive_items::DriveItems;
use crate::error::Result;
use crate::factory::{DriveItemsSitesFactory, ResourceFactory, SitesFactory, GRAPH_API_V1_URL};
use crate::models::{ConflictBehavior, DriveItem, DriveItemList, SiteCollection, SiteMetadata};
use crate::session::GraphSession;
use crate::site::Site;
use crate::url_parser::SiteAddress;

/// Files strictly smaller than this go through a single PUT.
pub const SMALL_UPLOAD_THRESHOLD: u64 = 4_000_000;

/// Which upload path a file of a given size takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    Simple,
    Session,
}

impl UploadStrategy {
    pub fn for_size(byte_size: u64) -> Self {
        if byte_size < SMALL_UPLOAD_THRESHOLD {
            UploadStrategy::Simple
        } else {
            UploadStrategy::Session
        }
    }
}

/// Entry point for working with the document library of one SharePoint site.
///
/// Construction performs no I/O. [`open`](Self::open) authenticates and resolves
/// the site; [`run`](Self::run) does the same and closes the transport when the
/// body finishes, whatever its outcome.
///
/// # Example
///
/// ```no_run
/// use sharepoint_drive::{GraphAuthProvider, SharePointService};
///
/// # async fn example() -> sharepoint_drive::Result<()> {
/// let auth = GraphAuthProvider::from_env()?;
/// let service = SharePointService::new(auth, "contoso.sharepoint.com", "Marketing");
///
/// let children = service
///     .run(|sharepoint| async move { sharepoint.list_children("root").await })
///     .await?;
/// println!("{} items", children.value.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SharePointService {
    auth: GraphAuthProvider,
    hostname: String,
    collection: SiteCollection,
    site_name: String,
    graph_root: String,
}

impl SharePointService {
    pub fn new(
        auth: GraphAuthProvider,
        hostname: impl Into<String>,
        site_name: impl Into<String>,
    ) -> Self {
        Self {
            auth,
            hostname: hostname.into(),
            collection: SiteCollection::Sites,
            site_name: site_name.into(),
            graph_root: GRAPH_API_V1_URL.to_string(),
        }
    }

    /// Service for a site parsed with [`parse_site_url`](crate::parse_site_url).
    pub fn from_address(auth: GraphAuthProvider, address: SiteAddress) -> Self {
        Self::new(auth, address.hostname, address.site_name).with_collection(address.collection)
    }

    /// Look the site up under `/teams/` instead of `/sites/`, or back.
    pub fn with_collection(mut self, collection: SiteCollection) -> Self {
        self.collection = collection;
        self
    }

    /// Point every resource at another Graph root.
    pub fn with_graph_root(mut self, root: &str) -> Self {
        self.graph_root = root.trim_end_matches('/').to_string();
        self
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn collection(&self) -> SiteCollection {
        self.collection
    }

    pub fn site_name(&self) -> &str {
        &self.site_name
    }

    /// Authenticate, open the transport session and resolve the site.
    ///
    /// If resolving the site fails, the transport opened here is closed before
    /// the error is returned.
    pub async fn open(&self) -> Result<SharePointSession> {
        let auth_header = self.auth.auth().await?;
        let session = GraphSession::open(auth_header)?;
        self.resolve(session).await
    }

    /// Resolve the site over `session`, closing it if the lookup fails.
    pub(crate) async fn resolve(&self, session: GraphSession) -> Result<SharePointSession> {
        let site = SitesFactory::new()
            .with_root(&self.graph_root)
            .create(&session);

        let metadata = match site
            .get_site_by_path(&self.hostname, self.collection, &self.site_name)
            .await
        {
            Ok(metadata) => metadata,
            Err(e) => {
                session.close().await;
                return Err(e);
            }
        };
        info!(
            site_id = %metadata.id,
            hostname = %self.hostname,
            collection = %self.collection,
            "resolved site"
        );

        let drive_items = DriveItemsSitesFactory::new(metadata.id.clone())
            .with_root(&self.graph_root)
            .create(&session);

        Ok(SharePointSession {
            session,
            metadata,
            site,
            drive_items,
        })
    }

    /// Run `body` against an open session, then close the transport.
    ///
    /// The transport is closed whether `body` succeeds or fails, and the body's
    /// result is returned unchanged.
    pub async fn run<F, Fut, T>(&self, body: F) -> Result<T>
    where
        F: FnOnce(SharePointSession) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let sharepoint = self.open().await?;
        let transport = sharepoint.transport().clone();

        let result = body(sharepoint).await;
        transport.close().await;
        result
    }
}

/// An open scope on one site. Clones share the same transport session.
#[derive(Debug, Clone)]
pub struct SharePointSession {
    session: GraphSession,
    metadata: SiteMetadata,
    site: Site,
    drive_items: DriveItems,
}

impl SharePointSession {
    pub fn site_id(&self) -> &str {
        &self.metadata.id
    }

    /// Metadata returned when the site was resolved.
    pub fn site_metadata(&self) -> &SiteMetadata {
        &self.metadata
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn drive_items(&self) -> &DriveItems {
        &self.drive_items
    }

    pub fn transport(&self) -> &GraphSession {
        &self.session
    }

    pub async fn list_children(&self, item_id: &str) -> Result<DriveItemList> {
        self.drive_items.list_children(item_id).await
    }

    pub async fn search(&self, query: &str) -> Result<DriveItemList> {
        self.drive_items.search(query).await
    }

    /// Upload a local file, replacing an existing file of the same name.
    pub async fn upload_file<P: AsRef<Path>>(
        &self,
        file_path: P,
        file_name: &str,
    ) -> Result<DriveItem> {
        self.upload_file_with_conflict(file_path, file_name, ConflictBehavior::Replace)
            .await
    }

    /// Upload a local file. `conflict_behavior` applies to the upload-session path.
    pub async fn upload_file_with_conflict<P: AsRef<Path>>(
        &self,
        file_path: P,
        file_name: &str,
        conflict_behavior: ConflictBehavior,
    ) -> Result<DriveItem> {
        let content = tokio::fs::read(file_path.as_ref()).await?;
        let byte_size = content.len() as u64;
        let strategy = UploadStrategy::for_size(byte_size);
        info!(file_name, byte_size, ?strategy, "uploading file");

        match strategy {
            UploadStrategy::Simple => self.drive_items.upload_small(content, file_name).await,
            UploadStrategy::Session => {
                self.drive_items
                    .upload_large(content, byte_size, file_name, conflict_behavior)
                    .await
            }
        }
    }

    /// Download an item and write it to `destination`. Returns the bytes written.
    pub async fn download_file<P: AsRef<Path>>(
        &self,
        item_id: &str,
        destination: P,
    ) -> Result<u64> {
        let content = self.drive_items.download(item_id).await?;
        tokio::fs::write(destination.as_ref(), &content).await?;
        Ok(content.len() as u64)
    }

    /// Close the transport. Every clone of this session becomes unusable.
    pub async fn close(self) {
        self.session.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::models::Credentials;
    use reqwest::header::HeaderMap;

    fn service_for(server: &mockito::ServerGuard) -> SharePointService {
        let auth = GraphAuthProvider::new(Credentials::new("client", "secret", "tenant"));
        SharePointService::new(auth, "contoso.sharepoint.com", "Marketing")
            .with_graph_root(&server.url())
    }

    #[tokio::test]
    async fn test_failed_site_lookup_closes_transport() {
        let mut server = mockito::Server::new_async().await;
        let lookup = server
            .mock("GET", "/sites/contoso.sharepoint.com:/sites/Marketing")
            .with_status(403)
            .with_body("accessDenied")
            .expect(1)
            .create_async()
            .await;

        let session = GraphSession::open(HeaderMap::new()).unwrap();
        let err = service_for(&server)
            .resolve(session.clone())
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::ApiError { status: 403, .. }));
        assert!(session.is_closed().await);
        lookup.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_keeps_transport_open_on_success() {
        let mut server = mockito::Server::new_async().await;
        let _lookup = server
            .mock("GET", "/sites/contoso.sharepoint.com:/teams/Marketing")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "TEAM1"}"#)
            .create_async()
            .await;

        let session = GraphSession::open(HeaderMap::new()).unwrap();
        let sharepoint = service_for(&server)
            .with_collection(SiteCollection::Teams)
            .resolve(session.clone())
            .await
            .unwrap();

        assert_eq!(sharepoint.site_id(), "TEAM1");
        assert!(!session.is_closed().await);
    }

    #[test]
    fn test_upload_strategy_boundary() {
        assert_eq!(UploadStrategy::for_size(0), UploadStrategy::Simple);
        assert_eq!(UploadStrategy::for_size(3_999_999), UploadStrategy::Simple);
        assert_eq!(UploadStrategy::for_size(4_000_000), UploadStrategy::Session);
        assert_eq!(UploadStrategy::for_size(60_000_001), UploadStrategy::Session);
    }
}
