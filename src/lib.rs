//! sharepoint_drive - An async client for SharePoint document libraries over Microsoft Graph.
//!
//! This library provides functionality to:
//! - Authenticate with the OAuth2 client-credentials grant
//! - Resolve a SharePoint site from its hostname, managed path (`sites` or `teams`) and name
//! - List, search, upload and download drive items of a site, group, drive, user or `me`
//!
//! # Example
//!
//! ```no_run
//! use sharepoint_drive::{Credentials, GraphAuthProvider, SharePointService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let auth = GraphAuthProvider::new(Credentials::new("client-id", "secret", "tenant-id"));
//!     let service = SharePointService::new(auth, "contoso.sharepoint.com", "Marketing");
//!
//!     let items = service
//!         .run(|sharepoint| async move { sharepoint.search("budget").await })
//!         .await?;
//!     for item in items.value {
//!         println!("{}", item);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod drive_items;
pub mod error;
pub mod factory;
pub mod models;
pub mod service;
pub mod session;
pub mod site;
pub mod url_parser;

// Re-exports for convenience
pub use auth::GraphAuthProvider;
pub use drive_items::DriveItems;
pub use error::{GraphError, Result};
pub use factory::{
    DriveItemsDrivesFactory, DriveItemsGroupsFactory, DriveItemsMeFactory,
    DriveItemsSitesFactory, DriveItemsUsersFactory, ResourceFactory, SitesFactory,
    GRAPH_API_V1_URL,
};
pub use models::{
    ConflictBehavior, Credentials, DriveItem, DriveItemList, SiteCollection, SiteMetadata,
};
pub use service::{SharePointService, SharePointSession, UploadStrategy};
pub use session::GraphSession;
pub use site::Site;
pub use url_parser::{parse_site_url, SiteAddress};
