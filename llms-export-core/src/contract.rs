//! # contract: pages and the source they are loaded from
//!
//! This module defines the [`Page`] model handed to the exporter and the
//! [`ContentSource`] trait that enumerates pages and fetches their body text.
//!
//! ## Interface & Extensibility
//! - Implement [`ContentSource`] to export pages from somewhere other than the
//!   local filesystem (see [`crate::loader::FsContentSource`]).
//! - Pages are plain data; body text is fetched lazily through the source so
//!   that enumerating a large tree stays cheap.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so tests can script page lists and
//!   failing fetches with `MockContentSource`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::openapi::ApiSchema;

/// One unit of documentation content.
#[derive(Debug, Clone)]
pub struct Page {
    /// Path segments that address the page, e.g. `["godoxy", "setup"]`.
    pub slugs: Vec<String>,
    /// Public URL, e.g. `/docs/godoxy/setup`.
    pub url: String,
    /// File path relative to the content root, always `/`-separated.
    pub path: String,
    pub data: PageData,
}

/// Page payload: regular content or an API reference page.
#[derive(Debug, Clone)]
pub enum PageData {
    Doc(DocData),
    OpenApi(ApiData),
}

#[derive(Debug, Clone)]
pub struct DocData {
    pub title: String,
    pub description: Option<String>,
    /// Absolute location of the source file on disk.
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ApiData {
    pub title: String,
    pub description: Option<String>,
    /// Schema of the document this operation belongs to, shared by all its pages.
    pub schema: Arc<ApiSchema>,
}

impl Page {
    pub fn title(&self) -> &str {
        match &self.data {
            PageData::Doc(doc) => &doc.title,
            PageData::OpenApi(api) => &api.title,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match &self.data {
            PageData::Doc(doc) => doc.description.as_deref(),
            PageData::OpenApi(api) => api.description.as_deref(),
        }
    }

    pub fn is_api_reference(&self) -> bool {
        matches!(self.data, PageData::OpenApi(_))
    }

    pub fn first_slug(&self) -> Option<&str> {
        self.slugs.first().map(String::as_str)
    }
}

/// Processing stage of a page's body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStage {
    /// The source file verbatim.
    Raw,
    /// Body without frontmatter or MDX module statements.
    Processed,
}

/// Errors raised while loading pages or fetching their text.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("page {path} has no title in its frontmatter")]
    MissingTitle { path: String },
    #[error("failed to load OpenAPI document {}: {message}", .path.display())]
    OpenApi { path: PathBuf, message: String },
    #[error("page {path} has no body text")]
    NoText { path: String },
    #[error("{0}")]
    Other(String),
}

/// Enumerates pages and fetches their body text.
///
/// Implemented by the filesystem loader and by test mocks. The trait is
/// `Send + Sync` so one source can back many concurrent exports.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// All known pages, in a stable order.
    fn pages(&self) -> Vec<Page>;

    /// Fetches the body text of `page` at the given processing stage.
    async fn get_text(&self, page: &Page, stage: TextStage) -> Result<String, SourceError>;
}

/// Looks up the page addressed by `slugs`.
pub fn find_page<S>(source: &S, slugs: &[&str]) -> Option<Page>
where
    S: ContentSource + ?Sized,
{
    source
        .pages()
        .into_iter()
        .find(|page| page.slugs.iter().map(String::as_str).eq(slugs.iter().copied()))
}
