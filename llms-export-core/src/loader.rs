//! Filesystem-backed [`ContentSource`].
//!
//! Pages are discovered once, when the source is loaded: every `.md`/`.mdx`
//! file under the content directory becomes a page (its frontmatter supplies
//! the title and description), and every operation of each configured OpenAPI
//! document becomes an API reference page. Body text is read from disk only
//! when it is requested.

use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::config::{OpenApiDocument, SiteConfig};
use crate::contract::{ApiData, ContentSource, DocData, Page, PageData, SourceError, TextStage};
use crate::openapi::ApiSchema;

static MDX_ESM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(import|export)\s").expect("MDX statement regex is valid"));
static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bfrom\s+(?:'[^']*'|"[^"]*")"#).expect("from clause regex is valid")
});
static BARE_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^import\s+['"]"#).expect("bare import regex is valid"));

#[derive(Debug, Default, Deserialize)]
struct Frontmatter {
    title: Option<String>,
    description: Option<String>,
}

/// Pages loaded from a content directory and OpenAPI documents.
#[derive(Debug, Clone)]
pub struct FsContentSource {
    pages: Vec<Page>,
}

impl FsContentSource {
    /// Scans the content directory and OpenAPI documents named by `config`.
    pub fn load(config: &SiteConfig) -> Result<Self, SourceError> {
        info!(content_dir = %config.content_dir.display(), "[LOAD] Scanning content directory");
        let mut pages = load_docs(&config.content_dir, &config.base_url)?;
        let docs = pages.len();

        for document in &config.openapi {
            let api_pages = load_openapi(document, &config.base_url).map_err(|e| {
                error!(error = %e, document = %document.path.display(), "[LOAD][ERROR] OpenAPI document failed to load");
                e
            })?;
            pages.extend(api_pages);
        }

        info!(
            docs,
            api_reference = pages.len() - docs,
            "[LOAD] Content source ready"
        );
        Ok(Self { pages })
    }
}

#[async_trait]
impl ContentSource for FsContentSource {
    fn pages(&self) -> Vec<Page> {
        self.pages.clone()
    }

    async fn get_text(&self, page: &Page, stage: TextStage) -> Result<String, SourceError> {
        let PageData::Doc(doc) = &page.data else {
            return Err(SourceError::NoText {
                path: page.path.clone(),
            });
        };
        let raw = tokio::fs::read_to_string(&doc.file)
            .await
            .map_err(|e| SourceError::Io {
                path: doc.file.clone(),
                source: e,
            })?;
        debug!(path = %page.path, ?stage, bytes = raw.len(), "Read page text");
        Ok(match stage {
            TextStage::Raw => raw,
            TextStage::Processed => processed_text(&raw),
        })
    }
}

fn load_docs(root: &Path, base_url: &str) -> Result<Vec<Page>, SourceError> {
    let mut pages = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| SourceError::Io {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_markdown = matches!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("md" | "mdx")
        );
        if !is_markdown {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| SourceError::Other(e.to_string()))?;
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let raw = fs::read_to_string(entry.path()).map_err(|e| SourceError::Io {
            path: entry.path().to_path_buf(),
            source: e,
        })?;
        let frontmatter = parse_frontmatter(&raw, &path)?;
        let title = frontmatter
            .title
            .ok_or_else(|| SourceError::MissingTitle { path: path.clone() })?;

        let slugs = slugs_for(&path);
        debug!(path = %path, ?slugs, "Discovered page");
        pages.push(Page {
            url: page_url(base_url, &slugs),
            slugs,
            path,
            data: PageData::Doc(DocData {
                title,
                description: frontmatter.description,
                file: entry.path().to_path_buf(),
            }),
        });
    }
    Ok(pages)
}

fn load_openapi(document: &OpenApiDocument, base_url: &str) -> Result<Vec<Page>, SourceError> {
    let schema = Arc::new(ApiSchema::load(&document.path)?);
    let dir = document.base_dir.trim_matches('/');
    let base_slugs: Vec<String> = dir
        .split('/')
        .filter(|s| !s.is_empty() && !is_route_group(s))
        .map(str::to_string)
        .collect();

    let pages = schema
        .operations()
        .into_iter()
        .map(|op| {
            let slug = op.slug();
            let mut slugs = base_slugs.clone();
            slugs.push(slug.clone());
            Page {
                url: page_url(base_url, &slugs),
                slugs,
                path: format!("{dir}/{slug}.mdx"),
                data: PageData::OpenApi(ApiData {
                    title: op.title(),
                    description: op.description.clone(),
                    schema: Arc::clone(&schema),
                }),
            }
        })
        .collect::<Vec<_>>();
    info!(
        document = %document.path.display(),
        operations = pages.len(),
        "[LOAD] OpenAPI document loaded"
    );
    Ok(pages)
}

fn parse_frontmatter(raw: &str, path: &str) -> Result<Frontmatter, SourceError> {
    match split_frontmatter(raw).0 {
        Some(yaml) if !yaml.trim().is_empty() => {
            serde_yaml::from_str(yaml).map_err(|e| SourceError::Frontmatter {
                path: path.to_string(),
                source: e,
            })
        }
        _ => Ok(Frontmatter::default()),
    }
}

/// Splits a leading `---` YAML block from the body.
pub fn split_frontmatter(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))
    else {
        return (None, text);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

/// Body text with frontmatter and top-level MDX `import`/`export` statements
/// removed. Fenced code blocks are copied untouched.
pub fn processed_text(raw: &str) -> String {
    let (_, body) = split_frontmatter(raw);
    let mut out = String::with_capacity(body.len());
    let mut fence: Option<&str> = None;
    let mut statement: Option<Statement> = None;

    for line in body.split_inclusive('\n') {
        if let Some(open) = statement {
            statement = open.feed(line);
            continue;
        }
        let trimmed = line.trim_start();
        if let Some(marker) = fence {
            if trimmed.starts_with(marker) {
                fence = None;
            }
            out.push_str(line);
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
        } else if trimmed.starts_with("~~~") {
            fence = Some("~~~");
        } else if MDX_ESM.is_match(line) {
            statement = Statement {
                import: line.starts_with("import"),
                depth: 0,
            }
            .feed(line);
            continue;
        }
        out.push_str(line);
    }

    out.trim_start_matches(&['\n', '\r'][..])
        .trim_end_matches(&['\n', '\r'][..])
        .to_string()
}

/// A top-level `import`/`export` statement that may span several lines.
#[derive(Debug, Clone, Copy)]
struct Statement {
    import: bool,
    /// Open `{`/`[`/`(` count.
    depth: i32,
}

impl Statement {
    /// Consumes one line of the statement. Returns `None` once it has ended.
    fn feed(self, line: &str) -> Option<Self> {
        if line.trim().is_empty() {
            return None;
        }
        let depth = self.depth + bracket_delta(line);
        let trimmed = line.trim_end();
        if FROM_CLAUSE.is_match(trimmed) {
            return None;
        }
        if depth <= 0 {
            if trimmed.ends_with(';') || BARE_IMPORT.is_match(trimmed) {
                return None;
            }
            // An import is only complete once its `from` clause is seen.
            if !self.import && !trimmed.ends_with(&['=', ','][..]) {
                return None;
            }
        }
        Some(Self { depth, ..self })
    }
}

fn bracket_delta(line: &str) -> i32 {
    line.chars()
        .map(|c| match c {
            '{' | '[' | '(' => 1,
            '}' | ']' | ')' => -1,
            _ => 0,
        })
        .sum()
}

fn is_route_group(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('(') && segment.ends_with(')')
}

/// Slugs for a content-relative file path: extension stripped, route groups
/// removed, trailing `index` dropped.
pub fn slugs_for(path: &str) -> Vec<String> {
    let stem = match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => path,
    };
    let mut slugs: Vec<String> = stem
        .split('/')
        .filter(|s| !s.is_empty() && !is_route_group(s))
        .map(str::to_string)
        .collect();
    if slugs.last().is_some_and(|s| s == "index") {
        slugs.pop();
    }
    slugs
}

/// Joins `base_url` with the slugs; the empty slug list addresses `base_url`.
pub fn page_url(base_url: &str, slugs: &[String]) -> String {
    if slugs.is_empty() {
        return base_url.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), slugs.join("/"))
}
