use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("comment-sentiment").unwrap();
    cmd.env_remove("YOUTUBE_API_KEY").env_remove("HF_TOKEN");
    cmd
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        "[app]\ncache_dir = {:?}\n\n[classical]\nvectorizer_path = {:?}\nmodel_path = {:?}\ntest_size = 0.25\n",
        dir.join("cache").display().to_string(),
        dir.join("artifacts/vectorizer.json").display().to_string(),
        dir.join("artifacts/model.json").display().to_string(),
    );
    fs::write(&path, content).unwrap();
    path
}

fn write_dataset(dir: &Path) -> std::path::PathBuf {
    let mut csv = String::from("text,label\n");
    let rows = [
        ("I love this video", "positive"),
        ("great content, love it", "positive"),
        ("amazing and helpful", "positive"),
        ("best tutorial, great work", "positive"),
        ("hate this so much", "negative"),
        ("terrible audio, awful", "negative"),
        ("worst video ever", "negative"),
        ("awful editing, hate it", "negative"),
        ("it is a video", "neutral"),
        ("uploaded on tuesday", "neutral"),
        ("the video is ten minutes", "neutral"),
        ("watching from home", "neutral"),
    ];
    for (text, label) in rows {
        csv.push_str(&format!("\"{}\",{}\n", text, label));
    }
    let path = dir.join("labeled.csv");
    fs::write(&path, csv).unwrap();
    path
}

#[test]
fn clean_arguments() {
    cli()
        .args(["clean", "Check this out!! http://x.co @joe #fun 😀 AMAZING!!!"])
        .assert()
        .success()
        .stdout("check this out!! amazing!!!\n");
}

#[test]
fn clean_stdin() {
    cli()
        .arg("clean")
        .write_stdin("Hello   WORLD\nvisit www.example.com now\n")
        .assert()
        .success()
        .stdout("hello world\nvisit now\n");
}

#[test]
fn train_writes_artifacts() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let dataset = write_dataset(temp.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("train")
        .arg("--csv")
        .arg(&dataset)
        .assert()
        .success()
        .stdout(predicate::str::contains("precision"))
        .stdout(predicate::str::contains("accuracy"));

    assert!(temp.path().join("artifacts/vectorizer.json").exists());
    assert!(temp.path().join("artifacts/model.json").exists());
}

#[test]
fn train_missing_csv_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    cli()
        .arg("--config")
        .arg(&config)
        .args(["train", "--csv"])
        .arg(temp.path().join("missing.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}

#[test]
fn config_show_defaults() {
    let temp = TempDir::new().unwrap();

    cli()
        .arg("--config")
        .arg(temp.path().join("absent.toml"))
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[neural]"))
        .stdout(predicate::str::contains("neutral_lower = 0.45"));
}

#[test]
fn config_path_prints_override() {
    cli()
        .args(["--config", "custom/config.toml", "config", "path"])
        .assert()
        .success()
        .stdout("custom/config.toml\n");
}

#[test]
fn report_without_runs_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    cli()
        .arg("--config")
        .arg(&config)
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No saved runs"));
}

#[test]
fn analyze_requires_a_source() {
    cli().arg("analyze").assert().failure();
}

#[test]
fn report_rejects_path_like_run_ids() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());

    cli()
        .arg("--config")
        .arg(&config)
        .args(["report", "--run", "20241231120000-../../x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid run ID"));
}

fn write_comments(dir: &Path) -> std::path::PathBuf {
    let comments = serde_json::json!([
        {
            "author": "a",
            "text": "Loved it!! https://x.co",
            "likeCount": 3,
            "publishedAt": "2024-05-01T12:00:00Z",
            "updatedAt": "2024-05-01T12:00:00Z"
        },
        {
            "author": "b",
            "text": "hmm @someone",
            "likeCount": 0,
            "publishedAt": "2024-05-02T12:00:00Z",
            "updatedAt": "2024-05-02T12:00:00Z"
        }
    ]);
    let path = dir.join("comments.json");
    fs::write(&path, comments.to_string()).unwrap();
    path
}

#[tokio::test(flavor = "multi_thread")]
async fn analyze_input_against_hosted_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/distilbert-base-uncased-finetuned-sst-2-english"))
        .and(body_partial_json(serde_json::json!({
            "inputs": ["loved it!!", "hmm"],
            "parameters": {"truncation": true}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            [{"label": "POSITIVE", "score": 0.98}, {"label": "NEGATIVE", "score": 0.02}],
            [{"label": "NEGATIVE", "score": 0.51}, {"label": "POSITIVE", "score": 0.49}]
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let mut content = fs::read_to_string(&config).unwrap();
    content.push_str(&format!("\n[neural]\nendpoint = {:?}\n", server.uri()));
    fs::write(&config, content).unwrap();
    let comments = write_comments(temp.path());

    let mut cmd = cli();
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("--input")
        .arg(&comments)
        .arg("--json");
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("\"neural_label\": \"positive\""))
        .stdout(predicate::str::contains("\"neural_label\": \"neutral\""))
        .stderr(predicate::str::contains("unavailable"));

    assert!(temp.path().join("cache/latest_comments_with_preds.csv").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn analyze_input_fails_on_invalid_scores() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            [{"label": "POSITIVE", "score": 1.7}],
            [{"label": "NEGATIVE", "score": 0.9}]
        ])))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path());
    let mut content = fs::read_to_string(&config).unwrap();
    content.push_str(&format!("\n[neural]\nendpoint = {:?}\n", server.uri()));
    fs::write(&config, content).unwrap();
    let comments = write_comments(temp.path());

    let mut cmd = cli();
    cmd.arg("--config")
        .arg(&config)
        .arg("analyze")
        .arg("--input")
        .arg(&comments)
        .arg("--no-save");
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap();

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0, 1]"));
}
