use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use llms_export_core::config::GitConfig;
use llms_export_core::contract::{
    ContentSource, DocData, MockContentSource, Page, PageData, SourceError, TextStage,
};
use llms_export_core::corpus::{aggregate, section_pages};
use llms_export_core::section::Section;
use tokio::sync::Barrier;

fn page(slugs: &[&str], title: &str) -> Page {
    let path = format!("{}.md", slugs.join("/"));
    Page {
        slugs: slugs.iter().map(|s| s.to_string()).collect(),
        url: format!("/docs/{}", slugs.join("/")),
        path: path.clone(),
        data: PageData::Doc(DocData {
            title: title.to_string(),
            description: None,
            file: PathBuf::from(path),
        }),
    }
}

#[tokio::test]
async fn zero_pages_yield_empty_corpus() {
    let mut source = MockContentSource::new();
    source.expect_pages().return_const(Vec::<Page>::new());
    source.expect_get_text().never();

    let corpus = aggregate(&source, &GitConfig::default(), Section::Primary)
        .await
        .unwrap();
    assert_eq!(corpus, "");
}

#[tokio::test]
async fn corpus_keeps_page_order_and_filters_section() {
    let mut source = MockContentSource::new();
    source.expect_pages().return_const(vec![
        page(&["godoxy", "a"], "A"),
        page(&["impl", "b"], "B"),
        page(&["godoxy", "c"], "C"),
    ]);
    source
        .expect_get_text()
        .returning(|page, _| Ok(format!("body of {}", page.title())));

    let corpus = aggregate(&source, &GitConfig::default(), Section::Primary)
        .await
        .unwrap();
    let records: Vec<&str> = corpus.split("\n\n# ").collect();
    assert_eq!(records.len(), 2, "corpus: {corpus}");
    assert!(records[0].starts_with("# GoDoxy: A"));
    assert!(records[0].ends_with("body of A"));
    assert!(records[1].starts_with("GoDoxy: C"));
    assert!(!corpus.contains("body of B"));

    let impl_corpus = aggregate(&source, &GitConfig::default(), Section::Implementation)
        .await
        .unwrap();
    assert!(impl_corpus.starts_with("# GoDoxy Implementation: B"));
    assert!(impl_corpus.ends_with("body of B"));
}

#[test]
fn unknown_first_segments_belong_to_primary_section() {
    let mut source = MockContentSource::new();
    source.expect_pages().return_const(vec![
        page(&["misc", "x"], "X"),
        page(&[], "Index"),
        page(&["impl"], "Impl"),
    ]);

    let titles: Vec<String> = section_pages(&source, Section::Primary)
        .iter()
        .map(|p| p.title().to_string())
        .collect();
    assert_eq!(titles, vec!["X", "Index"]);
}

#[tokio::test]
async fn one_failing_page_fails_the_corpus() {
    let pages: Vec<Page> = (0..6)
        .map(|i| page(&["godoxy", format!("p{i}").as_str()], &format!("P{i}")))
        .collect();

    let mut source = MockContentSource::new();
    source.expect_pages().return_const(pages);
    source.expect_get_text().returning(|page, _| {
        if page.title() == "P3" {
            Err(SourceError::Other("disk on fire".to_string()))
        } else {
            Ok("ok".to_string())
        }
    });

    let err = aggregate(&source, &GitConfig::default(), Section::Primary)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("disk on fire"));
}

/// Every fetch waits until all fetches have started, so the export only
/// finishes if they are issued concurrently.
struct BarrierSource {
    pages: Vec<Page>,
    barrier: Barrier,
    fetched: AtomicUsize,
}

#[async_trait]
impl ContentSource for BarrierSource {
    fn pages(&self) -> Vec<Page> {
        self.pages.clone()
    }

    async fn get_text(&self, page: &Page, _stage: TextStage) -> Result<String, SourceError> {
        self.barrier.wait().await;
        self.fetched.fetch_add(1, Ordering::SeqCst);
        Ok(page.title().to_lowercase())
    }
}

#[tokio::test]
async fn fetches_run_concurrently() {
    let pages: Vec<Page> = (0..4)
        .map(|i| page(&["godoxy", format!("p{i}").as_str()], &format!("P{i}")))
        .collect();
    let source = BarrierSource {
        barrier: Barrier::new(pages.len()),
        pages,
        fetched: AtomicUsize::new(0),
    };

    let corpus = tokio::time::timeout(
        Duration::from_secs(5),
        aggregate(&source, &GitConfig::default(), Section::Primary),
    )
    .await
    .expect("fetches should not wait on each other")
    .unwrap();

    assert_eq!(source.fetched.load(Ordering::SeqCst), 4);
    let bodies: Vec<&str> = corpus
        .lines()
        .filter(|line| line.starts_with('p'))
        .collect();
    assert_eq!(bodies, vec!["p0", "p1", "p2", "p3"]);
}
