//! Error types for the sharepoint_drive crate.

use thiserror::Error;

/// Errors that can occur when interacting with Microsoft Graph.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The token endpoint answered with a non-success status. Carries the raw body.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// A Graph call answered with a non-success status. Carries the raw body.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Download metadata could not be fetched or carried no download URL.
    #[error("Content error: {0}")]
    ContentError(String),

    #[error("Transport session is closed")]
    SessionClosed,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid SharePoint site URL: {0}")]
    InvalidSiteUrl(String),

    #[error("Invalid site collection: {0} (expected sites or teams)")]
    InvalidSiteCollection(String),

    #[error("Invalid conflict behavior: {0} (expected fail, replace or rename)")]
    InvalidConflictBehavior(String),
}

/// Result type alias for GraphError.
pub type Result<T> = std::result::Result<T, GraphError>;
