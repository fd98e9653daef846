//! Loading and bundling of OpenAPI documents.
//!
//! A document is parsed from JSON or YAML, then every `$ref` that points at
//! another file is replaced by the referenced value so the result is one
//! self-contained ("bundled") document. Refs local to a document (`#/...`)
//! and remote refs (`https://...`) are kept as written.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::contract::SourceError;

const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// A loaded OpenAPI document.
#[derive(Debug, Clone)]
pub struct ApiSchema {
    /// Location the document was loaded from.
    pub document: PathBuf,
    /// The document with external references inlined.
    pub bundled: Value,
}

/// One `paths.<path>.<method>` entry of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub method: String,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
}

impl Operation {
    /// Page slug for this operation.
    pub fn slug(&self) -> String {
        match &self.operation_id {
            Some(id) => slugify(id),
            None => slugify(&format!("{} {}", self.method, self.path)),
        }
    }

    /// Page title: summary, then operation id, then `METHOD /path`.
    pub fn title(&self) -> String {
        self.summary
            .clone()
            .or_else(|| self.operation_id.clone())
            .unwrap_or_else(|| format!("{} {}", self.method.to_uppercase(), self.path))
    }
}

impl ApiSchema {
    /// Loads and bundles the document at `path`.
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        info!(document = %path.display(), "Loading OpenAPI document");
        let document = canonical(path)?;
        let mut bundled = read_document(&document)?;
        let base = document.parent().unwrap_or(Path::new(".")).to_path_buf();
        let mut stack = vec![document.clone()];
        bundle(&mut bundled, &base, &mut stack)?;
        Ok(Self { document, bundled })
    }

    /// Operations in document order.
    pub fn operations(&self) -> Vec<Operation> {
        let Some(paths) = self.bundled.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };
        let mut operations = Vec::new();
        for (path, item) in paths {
            let Some(item) = item.as_object() else {
                continue;
            };
            for (method, op) in item {
                if !HTTP_METHODS.contains(&method.as_str()) {
                    continue;
                }
                let field = |name: &str| op.get(name).and_then(Value::as_str).map(str::to_string);
                operations.push(Operation {
                    method: method.clone(),
                    path: path.clone(),
                    operation_id: field("operationId"),
                    summary: field("summary"),
                    description: field("description"),
                });
            }
        }
        operations
    }
}

fn canonical(path: &Path) -> Result<PathBuf, SourceError> {
    fs::canonicalize(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_document(path: &Path) -> Result<Value, SourceError> {
    let text = fs::read_to_string(path).map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let parsed = if is_json {
        serde_json::from_str(&text).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(&text).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| SourceError::OpenApi {
        path: path.to_path_buf(),
        message,
    })
}

/// Returns the target of a `$ref` object pointing at another local file.
fn external_ref(value: &Value) -> Option<String> {
    let reference = value.as_object()?.get("$ref")?.as_str()?;
    if reference.starts_with('#') {
        return None;
    }
    if reference.contains("://") {
        debug!(reference = %reference, "Keeping remote $ref");
        return None;
    }
    Some(reference.to_string())
}

fn bundle(value: &mut Value, base: &Path, stack: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    if let Some(reference) = external_ref(value) {
        let (file, pointer) = match reference.split_once('#') {
            Some((file, pointer)) => (file, Some(pointer)),
            None => (reference.as_str(), None),
        };
        let target = canonical(&base.join(file))?;
        if stack.contains(&target) {
            return Err(SourceError::OpenApi {
                path: target,
                message: format!("cyclic reference {reference}"),
            });
        }
        debug!(reference = %reference, target = %target.display(), "Inlining external $ref");

        let document = read_document(&target)?;
        let mut resolved = match pointer.filter(|p| !p.is_empty()) {
            Some(pointer) => document.pointer(pointer).cloned().ok_or_else(|| {
                SourceError::OpenApi {
                    path: target.clone(),
                    message: format!("pointer {pointer} does not resolve"),
                }
            })?,
            None => document,
        };

        let target_base = target.parent().unwrap_or(Path::new(".")).to_path_buf();
        stack.push(target);
        bundle(&mut resolved, &target_base, stack)?;
        stack.pop();

        *value = resolved;
        return Ok(());
    }

    match value {
        Value::Object(map) => {
            for child in map.values_mut() {
                bundle(child, base, stack)?;
            }
        }
        Value::Array(items) => {
            for child in items {
                bundle(child, base, stack)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Lowercase ASCII alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
