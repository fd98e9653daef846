use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Creates a small wiki tree and a config file pointing at it.
fn create_site() -> (TempDir, PathBuf) {
    let dir = tempdir().expect("Creating temp dir failed");
    let docs = dir.path().join("content/docs");
    write(
        &docs,
        "godoxy/setup.md",
        "---\ntitle: Setup\ndescription: How to install\n---\nStep 1...\n",
    );
    write(&docs, "impl/routes.md", "---\ntitle: Routes\n---\nRoute table.\n");
    let config = dir.path().join("site.yaml");
    fs::write(&config, "content_dir: content/docs\n").expect("Writing temp config failed");
    (dir, config)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("llms-export").expect("Binary exists");
    cmd.env_remove("LLMS_EXPORT_BIND").env_remove("LLMS_EXPORT_BRANCH");
    cmd
}

#[test]
fn export_prints_primary_corpus() {
    let (_dir, config) = create_site();

    cmd()
        .arg("export")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(
            predicate::str::starts_with("# GoDoxy: Setup\nURL: /docs/godoxy/setup\n")
                .and(predicate::str::contains("How to install\n\nStep 1..."))
                .and(predicate::str::contains("Route table.").not()),
        );
}

#[test]
fn export_writes_implementation_section_to_file() {
    let (dir, config) = create_site();
    let output = dir.path().join("impl.txt");

    cmd()
        .args(["export", "--section", "impl", "--config"])
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let corpus = fs::read_to_string(output).unwrap();
    assert!(corpus.starts_with("# GoDoxy Implementation: Routes\n"));
    assert!(corpus.ends_with("Route table."));
}

#[test]
fn export_rejects_unknown_section() {
    let (_dir, config) = create_site();

    cmd()
        .args(["export", "--section", "blog", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown section"));
}

#[test]
fn page_prints_one_record() {
    let (_dir, config) = create_site();

    cmd()
        .arg("page")
        .arg("--config")
        .arg(&config)
        .args(["impl", "routes"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# GoDoxy Implementation: Routes\n"));

    cmd()
        .arg("page")
        .arg("--config")
        .arg(&config)
        .args(["godoxy", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No page at /godoxy/missing"));
}

#[test]
fn pages_lists_sections_and_image_urls() {
    let (_dir, config) = create_site();

    cmd()
        .arg("pages")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(
            predicate::str::contains(
                "godoxy\t/docs/godoxy/setup\t/og/docs/godoxy/setup/image.png\tgodoxy/setup.md",
            )
            .and(predicate::str::contains(
                "impl\t/docs/impl/routes\t/og/docs/impl/routes/image.png\timpl/routes.md",
            )),
        );
}

#[test]
fn missing_config_fails() {
    cmd()
        .args(["export", "--config", "/definitely/not/here.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let msg = format!("{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use llms_export::cli::{run, Cli, Commands};

    let cli = Cli {
        command: Commands::Pages {
            config: PathBuf::from("dummy.yaml"),
        },
    };

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
