//! Error types for Sceptre.
use std::fmt::{self, Debug, Formatter};
use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

macro_rules! impl_debug_for_error {
    ($($t:ty),*) => {
        $(
            impl Debug for $t {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                    // Errors returned from main are shown through Debug, but thiserror only generates Display.
                    write!(f, "{}", self)
                }
            }
        )*
    };
}

/// Errors raised while building the page registry at startup.
#[derive(Error)]
pub enum DiscoveryError {
    #[error("Pages directory does not exist: {path}")]
    MissingDirectory { path: PathBuf },

    #[error("Invalid pattern for page discovery: {pattern}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to walk pages directory")]
    Walk(#[from] glob::GlobError),

    #[error("Failed to read page template: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Page path is not valid UTF-8: {path}")]
    InvalidName { path: PathBuf },

    #[error("Page `{name}` is registered more than once")]
    DuplicatePage { name: String },
}

#[derive(Error)]
pub enum TemplateError {
    #[error("Failed to read root template: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{id}` is not a valid attachment point id, only ASCII letters, digits, `-` and `_` are allowed")]
    InvalidAttachmentId { id: String },

    #[error("Root template `{template}` has no element with id `{id}` to mount pages into")]
    MissingAttachmentPoint { template: String, id: String },
}

#[derive(Error)]
pub enum VersionError {
    #[error("Assets directory does not exist: {path}")]
    MissingDirectory { path: PathBuf },

    #[error("Failed to read asset file: {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list assets directory: {path}")]
    ListFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum InertiaError {
    #[error("No page named `{component}` was found")]
    PageNotFound { component: String },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("Failed to serialize page object")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to mount page into the root template")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}

impl IntoResponse for InertiaError {
    fn into_response(self) -> Response {
        let status = match self {
            InertiaError::PageNotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!(name: "inertia", "{}", self);

        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}

impl_debug_for_error!(DiscoveryError, TemplateError, VersionError);
