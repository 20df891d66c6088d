use std::path::Path;
use std::process::{Command, Output};

use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "cli-test-token";

/// Run the CLI binary against `api_url`, keeping all state under `data_dir`.
pub fn run_cli(args: &[&str], data_dir: &Path, api_url: &str) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_storyfeed"));
    cmd.args(args);
    cmd.arg("--api-url").arg(api_url);
    cmd.arg("--data-dir").arg(data_dir);
    cmd.env_remove("STORYFEED_API_URL");
    cmd.env_remove("STORYFEED_DATA_DIR");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub fn run_cli_success(args: &[&str], data_dir: &Path, api_url: &str) -> String {
    let output = run_cli(args, data_dir, api_url);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and parse its stdout as JSON.
pub fn run_cli_json(args: &[&str], data_dir: &Path, api_url: &str) -> Value {
    let stdout = run_cli_success(args, data_dir, api_url);
    serde_json::from_str(stdout.trim()).expect("stdout is not JSON")
}

pub fn api_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}", server.address().port())
}

pub fn story(n: usize) -> Value {
    json!({
        "id": format!("story-{n}"),
        "name": format!("user {n}"),
        "description": format!("story number {n}"),
        "photoUrl": format!("https://example.com/{n}.jpg"),
        "createdAt": "2024-05-01T10:00:00.000Z",
        "lat": null,
        "lon": null
    })
}

fn stories_body(stories: Vec<Value>) -> Value {
    json!({
        "error": false,
        "message": "Stories fetched successfully",
        "listStory": stories
    })
}

pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("email=dimas%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": false,
            "message": "success",
            "loginResult": {
                "userId": "user-yj5pc_LARC_AgK61",
                "name": "Dimas",
                "token": TOKEN
            }
        })))
        .mount(server)
        .await;
}

/// Serve 12 stories in pages of 5: 5, 5, 2, then empty.
pub async fn mount_pages(server: &MockServer) {
    let pages: [(u32, std::ops::RangeInclusive<usize>); 4] =
        [(1, 1..=5), (2, 6..=10), (3, 11..=12), (4, 1..=0)];

    for (page, range) in pages {
        Mock::given(method("GET"))
            .and(path("/stories"))
            .and(query_param("page", page.to_string()))
            .and(query_param("size", "5"))
            .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(stories_body(range.map(story).collect())),
            )
            .mount(server)
            .await;
    }
}

/// Serve all 12 stories as one initial load of 15.
pub async fn mount_initial_load(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/stories"))
        .and(query_param("page", "1"))
        .and(query_param("size", "15"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(stories_body((1..=12).map(story).collect())),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_located(server: &MockServer) {
    let mut located = story(1);
    located["lat"] = json!(-6.2);
    located["lon"] = json!(106.8);

    Mock::given(method("GET"))
        .and(path("/stories"))
        .and(query_param("location", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stories_body(vec![located])))
        .mount(server)
        .await;
}

/// Log in through the CLI so later commands find a session.
pub fn login(data_dir: &Path, api_url: &str) {
    run_cli_success(
        &[
            "login",
            "--email",
            "dimas@example.com",
            "--password",
            "secret123",
        ],
        data_dir,
        api_url,
    );
}
