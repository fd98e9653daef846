use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Site-wide settings shared by the loader and the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, shown in logs and the CLI.
    pub title: String,
    /// URL prefix of every page.
    pub base_url: String,
    /// Root directory of the markdown/MDX tree.
    pub content_dir: PathBuf,
    pub git: GitConfig,
    /// OpenAPI documents rendered as API reference pages.
    pub openapi: Vec<OpenApiDocument>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "GoDoxy".to_string(),
            base_url: "/docs".to_string(),
            content_dir: PathBuf::from("content/docs"),
            git: GitConfig::default(),
            openapi: Vec::new(),
        }
    }
}

impl SiteConfig {
    pub fn trace_loaded(&self) {
        info!(
            title = %self.title,
            content_dir = %self.content_dir.display(),
            openapi_documents = self.openapi.len(),
            "Loaded SiteConfig"
        );
        debug!(?self, "SiteConfig loaded (full debug)");
    }
}

/// Repository the wiki content is published from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    pub user: String,
    pub repo: String,
    pub branch: String,
    /// Host serving raw file contents.
    pub raw_host: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            user: "yusing".to_string(),
            repo: "godoxy".to_string(),
            branch: "main".to_string(),
            raw_host: "raw.githubusercontent.com".to_string(),
        }
    }
}

impl GitConfig {
    /// Canonical raw URL of a page file relative to `content/docs`.
    pub fn source_url(&self, page_path: &str) -> String {
        format!(
            "https://{}/{}/{}-wiki/refs/heads/{}/content/docs/{}",
            self.raw_host, self.user, self.repo, self.branch, page_path
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// Location of the JSON or YAML document.
    pub path: PathBuf,
    /// Virtual directory the generated pages live in.
    #[serde(default = "default_openapi_base_dir")]
    pub base_dir: String,
}

fn default_openapi_base_dir() -> String {
    "openapi/(generated)".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_url_uses_wiki_repository() {
        let git = GitConfig::default();
        assert_eq!(
            git.source_url("godoxy/setup.md"),
            "https://raw.githubusercontent.com/yusing/godoxy-wiki/refs/heads/main/content/docs/godoxy/setup.md"
        );
    }

    #[test]
    fn source_url_follows_configured_branch() {
        let git = GitConfig {
            branch: "dev".to_string(),
            ..GitConfig::default()
        };
        assert!(git.source_url("a.md").contains("/refs/heads/dev/"));
    }
}
