use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::{create_dir_all, read_to_string, write};
use tempfile::tempdir;

use repo_pretrain::contract::PretrainRecord;

fn make_repo(root: &std::path::Path, name: &str) -> std::path::PathBuf {
    let repo = root.join(name);
    create_dir_all(repo.join("src")).unwrap();
    write(repo.join("README.md"), format!("# {name}")).unwrap();
    write(repo.join("src/main.rs"), "fn main() {}").unwrap();
    repo
}

#[test]
fn from_gitingest_writes_one_json_line_per_repository_to_stdout() {
    let tmp = tempdir().unwrap();
    let repo = make_repo(tmp.path(), "alpha");

    let mut cmd = Command::cargo_bin("repo-pretrain").expect("Binary exists");
    let assert = cmd
        .arg("from-gitingest")
        .arg("--input")
        .arg(&repo)
        .arg("--include_pattern")
        .arg("*.rs")
        .assert()
        .success()
        .stderr(predicate::str::contains("Read 1 repositories, 0 failed."));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout: {stdout}");
    let record: PretrainRecord = serde_json::from_str(lines[0]).expect("valid JSON record");
    assert_eq!(record.meta.repository, repo.display().to_string());
    assert!(record.content.contains("FILE: src/main.rs"));
    assert!(!record.content.contains("README.md"));
}

#[test]
fn from_gitingest_continues_past_failed_repository_and_writes_file() {
    let tmp = tempdir().unwrap();
    let beta = make_repo(tmp.path(), "beta");
    let gamma = make_repo(tmp.path(), "gamma");
    let list = tmp.path().join("repos.txt");
    write(
        &list,
        format!(
            "{}\nhttp://127.0.0.1:9/unreachable.git\n\n{}\n",
            beta.display(),
            gamma.display()
        ),
    )
    .unwrap();
    let out = tmp.path().join("records.jsonl");

    let mut cmd = Command::cargo_bin("repo-pretrain").expect("Binary exists");
    cmd.arg("from-gitingest")
        .arg("--input_list")
        .arg(&list)
        .arg("-o")
        .arg(&out)
        .arg("-l")
        .arg("ERROR")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("Read 2 repositories, 1 failed.")
                .and(predicate::str::contains("http://127.0.0.1:9/unreachable.git")),
        );

    let written = read_to_string(&out).unwrap();
    let repositories: Vec<String> = written
        .lines()
        .map(|l| serde_json::from_str::<PretrainRecord>(l).unwrap().meta.repository)
        .collect();
    assert_eq!(
        repositories,
        vec![beta.display().to_string(), gamma.display().to_string()]
    );
}

#[test]
fn from_gitingest_fails_on_missing_config_file() {
    let mut cmd = Command::cargo_bin("repo-pretrain").expect("Binary exists");
    cmd.arg("from-gitingest")
        .arg("--config")
        .arg("/definitely/not/here.yaml")
        .assert()
        .failure();
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
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
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[test]
fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use repo_pretrain::cli::{run, Cli, Commands, ReadArgs};

    // A dummy config path makes run() fail after the initial event.
    let cli = Cli {
        logging_level: None,
        command: Commands::FromGitingest(ReadArgs {
            config: Some(std::path::PathBuf::from("dummy.yaml")),
            ..ReadArgs::default()
        }),
    };

    let result = run(cli);
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
