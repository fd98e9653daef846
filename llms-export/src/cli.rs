//! Command-line interface for llms-export.
//!
//! All export logic lives in `llms-export-core`; this module parses
//! arguments, loads configuration and content, and dispatches to the core or
//! to the HTTP server.
//!
//! For programmatic and integration use, call [`run`] with a constructed
//! [`Cli`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llms_export_core::contract::{find_page, ContentSource};
use llms_export_core::corpus::aggregate;
use llms_export_core::export::{llm_text, page_image};
use llms_export_core::loader::FsContentSource;
use llms_export_core::section::{classify, Section};

use crate::load_config::{load_config, CliConfig};
use crate::server::{serve, AppState};

/// CLI for llms-export: plain-text exports of a documentation tree.
#[derive(Parser)]
#[clap(
    name = "llms-export",
    version,
    about = "Export documentation pages as plain text for LLM ingestion"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve /llms-full.txt and per-page .mdx exports over HTTP
    Serve {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Address to listen on, overrides the config file
        #[clap(long)]
        bind: Option<String>,
    },
    /// Print the corpus of one documentation section
    Export {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Section key: godoxy or impl
        #[clap(long, default_value = "godoxy", value_parser = parse_section)]
        section: Section,
        /// Write to this file instead of stdout
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Print one page as LLM text
    Page {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Slugs of the page, e.g. `godoxy setup`; none for the index page
        slugs: Vec<String>,
    },
    /// List all pages with their section, URL and image URL
    Pages {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

fn parse_section(key: &str) -> Result<Section, String> {
    Section::from_key(key).ok_or_else(|| format!("unknown section `{key}`, expected godoxy or impl"))
}

fn load_source(config: &CliConfig) -> Result<FsContentSource> {
    FsContentSource::load(&config.site).with_context(|| {
        format!(
            "Failed to load content from {}",
            config.site.content_dir.display()
        )
    })
}

/// Async CLI entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Serve { config, bind } => {
            let config = load_config(config)?;
            let source = load_source(&config)?;
            let bind = bind.unwrap_or(config.server.bind);
            tracing::info!(command = "serve", bind = %bind, "Starting server");
            let state = Arc::new(AppState {
                source: Arc::new(source),
                git: config.site.git,
            });
            serve(state, &bind).await
        }
        Commands::Export {
            config,
            section,
            output,
        } => {
            let config = load_config(config)?;
            let source = load_source(&config)?;
            let corpus = aggregate(&source, &config.site.git, section)
                .await
                .with_context(|| format!("Failed to export section {section}"))?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, corpus)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!(command = "export", output = %path.display(), "Corpus written");
                }
                None => println!("{corpus}"),
            }
            Ok(())
        }
        Commands::Page { config, slugs } => {
            let config = load_config(config)?;
            let source = load_source(&config)?;
            let slugs: Vec<&str> = slugs.iter().map(String::as_str).collect();
            let page = find_page(&source, &slugs)
                .with_context(|| format!("No page at /{}", slugs.join("/")))?;
            let text = llm_text(&source, &config.site.git, &page).await?;
            println!("{text}");
            Ok(())
        }
        Commands::Pages { config } => {
            let config = load_config(config)?;
            let source = load_source(&config)?;
            for page in source.pages() {
                let section = classify(page.first_slug());
                println!(
                    "{section}\t{url}\t{image}\t{path}",
                    url = page.url,
                    image = page_image(&page).url,
                    path = page.path,
                );
            }
            Ok(())
        }
    }
}
