//! Factories that bind resource clients to a container's base URL.
//!
//! Each factory only composes a URL; no request is made and identifiers are
//! not validated. A malformed identifier surfaces when the server rejects the
//! first request made with it.

use crate::drive_items::DriveItems;
use crate::session::GraphSession;
use crate::site::Site;

/// Root of the Microsoft Graph v1.0 API.
pub const GRAPH_API_V1_URL: &str = "https://graph.microsoft.com/v1.0";

/// Build a resource client bound to a shared session.
pub trait ResourceFactory {
    type Resource;

    fn create(&self, session: &GraphSession) -> Self::Resource;
}

fn trim_root(root: &str) -> String {
    root.trim_end_matches('/').to_string()
}

/// Factory for the [`Site`] resource. Its base URL is the API root.
#[derive(Debug, Clone)]
pub struct SitesFactory {
    root: String,
}

impl SitesFactory {
    pub fn new() -> Self {
        Self {
            root: GRAPH_API_V1_URL.to_string(),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = trim_root(root);
        self
    }
}

impl Default for SitesFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceFactory for SitesFactory {
    type Resource = Site;

    fn create(&self, session: &GraphSession) -> Site {
        Site::new(self.root.clone(), session.clone())
    }
}

/// Drive items of a SharePoint site: `/sites/{site_id}`.
#[derive(Debug, Clone)]
pub struct DriveItemsSitesFactory {
    root: String,
    site_id: String,
}

impl DriveItemsSitesFactory {
    pub fn new(site_id: impl Into<String>) -> Self {
        Self {
            root: GRAPH_API_V1_URL.to_string(),
            site_id: site_id.into(),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = trim_root(root);
        self
    }
}

impl ResourceFactory for DriveItemsSitesFactory {
    type Resource = DriveItems;

    fn create(&self, session: &GraphSession) -> DriveItems {
        let url = format!("{}/sites/{}", self.root, self.site_id);
        DriveItems::new(url, session.clone())
    }
}

/// Drive items of a Microsoft 365 group: `/groups/{group_id}`.
#[derive(Debug, Clone)]
pub struct DriveItemsGroupsFactory {
    root: String,
    group_id: String,
}

impl DriveItemsGroupsFactory {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            root: GRAPH_API_V1_URL.to_string(),
            group_id: group_id.into(),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = trim_root(root);
        self
    }
}

impl ResourceFactory for DriveItemsGroupsFactory {
    type Resource = DriveItems;

    fn create(&self, session: &GraphSession) -> DriveItems {
        let url = format!("{}/groups/{}", self.root, self.group_id);
        DriveItems::new(url, session.clone())
    }
}

/// Items of a drive addressed directly: `/drives/{drive_id}`.
#[derive(Debug, Clone)]
pub struct DriveItemsDrivesFactory {
    root: String,
    drive_id: String,
}

impl DriveItemsDrivesFactory {
    pub fn new(drive_id: impl Into<String>) -> Self {
        Self {
            root: GRAPH_API_V1_URL.to_string(),
            drive_id: drive_id.into(),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = trim_root(root);
        self
    }
}

impl ResourceFactory for DriveItemsDrivesFactory {
    type Resource = DriveItems;

    fn create(&self, session: &GraphSession) -> DriveItems {
        let url = format!("{}/drives/{}", self.root, self.drive_id);
        DriveItems::new(url, session.clone())
    }
}

/// OneDrive of a user: `/users/{user_id}`.
#[derive(Debug, Clone)]
pub struct DriveItemsUsersFactory {
    root: String,
    user_id: String,
}

impl DriveItemsUsersFactory {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            root: GRAPH_API_V1_URL.to_string(),
            user_id: user_id.into(),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = trim_root(root);
        self
    }
}

impl ResourceFactory for DriveItemsUsersFactory {
    type Resource = DriveItems;

    fn create(&self, session: &GraphSession) -> DriveItems {
        let url = format!("{}/users/{}", self.root, self.user_id);
        DriveItems::new(url, session.clone())
    }
}

/// OneDrive of the signed-in account: `/me`.
#[derive(Debug, Clone)]
pub struct DriveItemsMeFactory {
    root: String,
}

impl DriveItemsMeFactory {
    pub fn new() -> Self {
        Self {
            root: GRAPH_API_V1_URL.to_string(),
        }
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.root = trim_root(root);
        self
    }
}

impl Default for DriveItemsMeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceFactory for DriveItemsMeFactory {
    type Resource = DriveItems;

    fn create(&self, session: &GraphSession) -> DriveItems {
        DriveItems::new(format!("{}/me", self.root), session.clone())
    }
}
