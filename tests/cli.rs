use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use std::path::Path;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command with logging off and the user config directory pointed at `config_home`
fn get_transcript(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("get-transcript").unwrap();
    cmd.env_remove("YT_TRANSCRIPT_LOG")
        .env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home);
    cmd
}

async fn youtube_stub(with_captions: bool) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"<script>{"INNERTUBE_API_KEY": "k3y"}</script>"#),
        )
        .mount(&server)
        .await;

    let mut player = json!({ "playabilityStatus": { "status": "OK" } });
    if with_captions {
        // Caption track URLs are absolute, so they point back at the stub
        player["captions"] = json!({
            "playerCaptionsTracklistRenderer": {
                "captionTracks": [{
                    "baseUrl": format!("{}/api/timedtext?v=dQw4w9WgXcQ&lang=en&fmt=srv3", server.uri()),
                    "name": { "runs": [{ "text": "English" }] },
                    "languageCode": "en"
                }]
            }
        });
    }
    Mock::given(method("POST"))
        .and(path("/youtubei/v1/player"))
        .and(query_param("key", "k3y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(player))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<transcript><text start="0.5" dur="2.25">Never gonna</text><text start="2.75" dur="1.5">give you up</text></transcript>"#,
        ))
        .mount(&server)
        .await;

    server
}

fn config_home(yaml: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("yt-transcript");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(app_dir.join("config.yaml"), yaml).unwrap();
    dir
}

fn config_home_for(server: &MockServer) -> tempfile::TempDir {
    config_home(&format!("http:\n  base_url: {}\n", server.uri()))
}

#[test]
fn no_arguments_prints_missing_video_id() {
    let home = tempfile::tempdir().unwrap();
    get_transcript(home.path())
        .assert()
        .code(1)
        .stdout("{\"error\": \"Missing video id\"}\n");
}

#[test]
fn stderr_is_quiet_by_default() {
    let home = tempfile::tempdir().unwrap();
    get_transcript(home.path())
        .assert()
        .failure()
        .stderr(predicate::str::is_empty());
}

#[test]
fn lone_double_dash_is_treated_as_the_video_id() {
    // `--` is not a valid id, so the fetch fails, but not with a missing-argument error
    let home = config_home("http:\n  base_url: http://127.0.0.1:9\n  timeout_secs: 5\n");
    get_transcript(home.path())
        .arg("--")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Missing video id").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn prints_transcript_as_json_array() {
    let server = youtube_stub(true).await;
    let home = config_home_for(&server);

    let output = get_transcript(home.path())
        .arg("dQw4w9WgXcQ")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "[{\"text\": \"Never gonna\", \"start\": 0.5, \"duration\": 2.25}, {\"text\": \"give you up\", \"start\": 2.75, \"duration\": 1.5}]\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn config_yaml_in_working_directory_is_ignored() {
    let server = youtube_stub(true).await;
    let home = config_home_for(&server);

    // Belongs to some other tool and does not match our schema
    let workdir = tempfile::tempdir().unwrap();
    std::fs::write(workdir.path().join("config.yaml"), "languages:\n  en:\n    weight: 1\n").unwrap();

    let output = get_transcript(home.path())
        .current_dir(workdir.path())
        .arg("dQw4w9WgXcQ")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8(output.stdout).unwrap().starts_with("[{\"text\": \"Never gonna\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_runs_print_identical_output() {
    let server = youtube_stub(true).await;
    let home = config_home_for(&server);

    let run = || {
        get_transcript(home.path())
            .arg("dQw4w9WgXcQ")
            .output()
            .unwrap()
            .stdout
    };

    assert_eq!(run(), run());
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_transcripts_exit_non_zero() {
    let server = youtube_stub(false).await;
    let home = config_home_for(&server);

    let output = get_transcript(home.path())
        .arg("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    let message = document["error"].as_str().unwrap();
    assert!(message.contains("watch?v=dQw4w9WgXcQ!"));
    assert!(message.ends_with("Subtitles are disabled for this video"));
}

#[test]
fn broken_config_is_reported_as_json() {
    let home = config_home("languages: {not: a list}\n");

    get_transcript(home.path())
        .arg("dQw4w9WgXcQ")
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("{\"error\": \"Failed to parse config file"));
}
