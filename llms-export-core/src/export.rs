//! Formats a single page as a plain-text record.

use tracing::debug;

use crate::config::GitConfig;
use crate::contract::{ContentSource, Page, PageData, SourceError, TextStage};
use crate::section::{category_name, classify};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to serialize schema of {path}: {source}")]
    Schema {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Renders `page` as LLM text.
///
/// API reference pages render as their pretty-printed bundled schema. Every
/// other page renders as a heading with its category and title, its URL, the
/// raw source URL, its description and its processed body text.
pub async fn llm_text<S>(source: &S, git: &GitConfig, page: &Page) -> Result<String, ExportError>
where
    S: ContentSource + ?Sized,
{
    if let PageData::OpenApi(api) = &page.data {
        return serde_json::to_string_pretty(&api.schema.bundled).map_err(|e| {
            ExportError::Schema {
                path: page.path.clone(),
                source: e,
            }
        });
    }

    let section = classify(page.first_slug());
    let category = category_name(section.key());
    let processed = source.get_text(page, TextStage::Processed).await?;
    debug!(path = %page.path, %section, bytes = processed.len(), "Exporting page");

    Ok(format!(
        "# {category}: {title}\nURL: {url}\nSource: {source_url}\n\n{description}\n\n{processed}",
        title = page.title(),
        url = page.url,
        source_url = git.source_url(&page.path),
        description = page.description().unwrap_or_default(),
    ))
}

/// Open-graph image location for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub segments: Vec<String>,
    pub url: String,
}

pub fn page_image(page: &Page) -> PageImage {
    let mut segments = page.slugs.clone();
    segments.push("image.png".to_string());
    let url = format!("/og/docs/{}", segments.join("/"));
    PageImage { segments, url }
}
