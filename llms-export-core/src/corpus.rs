//! Aggregates every page of a section into one text corpus.
//!
//! Pages are filtered by the section their first slug classifies to, exported
//! concurrently, and joined with blank lines in page order. The first failed
//! export fails the whole corpus; no partial output is produced.

use futures::future::try_join_all;
use tracing::{error, info};

use crate::config::GitConfig;
use crate::contract::{ContentSource, Page};
use crate::export::{llm_text, ExportError};
use crate::section::{classify, Section};

/// Pages whose first slug classifies to `section`, in source order.
pub fn section_pages<S>(source: &S, section: Section) -> Vec<Page>
where
    S: ContentSource + ?Sized,
{
    source
        .pages()
        .into_iter()
        .filter(|page| classify(page.first_slug()) == section)
        .collect()
}

pub async fn aggregate<S>(source: &S, git: &GitConfig, section: Section) -> Result<String, ExportError>
where
    S: ContentSource + ?Sized,
{
    let pages = section_pages(source, section);
    info!(%section, pages = pages.len(), "[EXPORT] Exporting section");

    let exports = pages.iter().map(|page| llm_text(source, git, page));
    let records = try_join_all(exports).await.map_err(|e| {
        error!(%section, error = %e, "[EXPORT][ERROR] Section export failed");
        e
    })?;

    let corpus = records.join("\n\n");
    info!(%section, bytes = corpus.len(), "[EXPORT] Section exported");
    Ok(corpus)
}
