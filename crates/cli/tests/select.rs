// Integration tests for `pagesel select` and `pagesel page`.
// Run with: cargo test -p pagesel-cli --test select

use std::path::PathBuf;
use std::process::{Command, Output};

use httpmock::prelude::*;

struct Env {
    server: MockServer,
    _dir: tempfile::TempDir,
    config: PathBuf,
}

impl Env {
    /// Mock API plus a settings file with retries disabled.
    fn new() -> Self {
        let server = MockServer::start();
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("settings.json");
        std::fs::write(
            &config,
            r#"{
    // no backoff in tests
    "source.maxRetries": 0,
    "source.timeoutSecs": 5
}"#,
        )
        .unwrap();
        Self { server, _dir: dir, config }
    }

    fn pagesel(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_pagesel"));
        cmd.env("PAGESEL_API_BASE", format!("{}/api/v1", self.server.base_url()));
        cmd.env("PAGESEL_CONFIG", &self.config);
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.pagesel().args(args).output().expect("failed to run pagesel")
    }

    /// Serve page `page` of a `total`-row dataset with ids starting at 1.
    fn serve_page(&self, page: usize, limit: usize, total: usize) -> httpmock::Mock<'_> {
        let start = (page - 1) * limit + 1;
        let end = (page * limit).min(total);
        let data: Vec<serde_json::Value> = (start..=end)
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "title": format!("Artwork {}", id),
                    "place_of_origin": "Japan",
                    "artist_display": "Katsushika Hokusai",
                    "inscriptions": null,
                    "date_start": 1830,
                    "date_end": 1832
                })
            })
            .collect();
        let body = serde_json::json!({
            "pagination": { "total": total, "limit": limit, "current_page": page },
            "data": data
        });
        self.server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/artworks")
                .query_param("page", page.to_string())
                .query_param("limit", limit.to_string());
            then.status(200).json_body(body);
        })
    }
}

fn stdout_ids(output: &Output) -> Vec<u64> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| line.parse().unwrap())
        .collect()
}

fn assert_code(output: &Output, code: i32) {
    assert_eq!(
        output.status.code(),
        Some(code),
        "expected exit {}, got {:?}\nstderr: {}",
        code,
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn select_first_spans_two_pages() {
    let env = Env::new();
    let one = env.serve_page(1, 12, 100);
    let two = env.serve_page(2, 12, 100);
    let three = env.serve_page(3, 12, 100);

    let output = env.run(&["select", "--first", "20"]);
    assert_code(&output, 0);
    assert_eq!(stdout_ids(&output), (1..=20).collect::<Vec<_>>());
    one.assert_calls(1);
    two.assert_calls(1);
    three.assert_calls(0);
}

#[test]
fn target_on_a_page_boundary_stops_there() {
    let env = Env::new();
    env.serve_page(1, 12, 100);
    env.serve_page(2, 12, 100);
    let three = env.serve_page(3, 12, 100);

    let output = env.run(&["select", "--first", "24", "--json"]);
    assert_code(&output, 0);
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["pages_visited"], 2);
    three.assert_calls(0);
}

#[test]
fn deselected_row_shortens_the_next_page() {
    let env = Env::new();
    env.serve_page(1, 12, 100);
    env.serve_page(2, 12, 100);

    let output = env.run(&["select", "--first", "20", "--deselect", "3", "--json"]);
    assert_code(&output, 0);

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let selected: Vec<u64> = serde_json::from_value(body["selected"].clone()).unwrap();
    let mut expected: Vec<u64> = (1..=12).filter(|id| *id != 3).collect();
    expected.extend(13..=19);
    assert_eq!(selected, expected);
    assert_eq!(body["deselected"], serde_json::json!([3]));
    assert_eq!(body["pages_visited"], 2);
    assert_eq!(body["total"], 100);
}

#[test]
fn pages_flag_limits_visits() {
    let env = Env::new();
    env.serve_page(1, 12, 100);
    let two = env.serve_page(2, 12, 100);

    let output = env.run(&["select", "--first", "30", "--pages", "1"]);
    assert_code(&output, 0);
    assert_eq!(stdout_ids(&output).len(), 12);
    two.assert_calls(0);
}

#[test]
fn target_past_the_last_page_stops_at_total() {
    let env = Env::new();
    env.serve_page(1, 12, 15);
    env.serve_page(2, 12, 15);

    let output = env.run(&["select", "--first", "40"]);
    assert_code(&output, 0);
    assert_eq!(stdout_ids(&output), (1..=15).collect::<Vec<_>>());
}

#[test]
fn non_numeric_target_exits_2() {
    let env = Env::new();
    let one = env.serve_page(1, 12, 100);

    for bad in ["twenty", "-5", "2.5", ""] {
        let output = env.run(&["select", "--first", bad]);
        assert_code(&output, 2);
        assert!(output.stdout.is_empty());
    }
    one.assert_calls(0);
}

#[test]
fn zero_target_selects_nothing() {
    let env = Env::new();
    env.serve_page(1, 12, 100);

    let output = env.run(&["select", "--first", "0"]);
    assert_code(&output, 0);
    assert!(output.stdout.is_empty());
}

#[test]
fn upstream_failure_exits_50() {
    let env = Env::new();
    env.server.mock(|when, then| {
        when.method(GET).path("/api/v1/artworks");
        then.status(503).body("busy");
    });

    let output = env.run(&["select", "--first", "5"]);
    assert_code(&output, 50);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load artworks"), "stderr: {}", stderr);
    assert!(stderr.contains("HTTP 503"), "stderr: {}", stderr);
}

#[test]
fn missing_endpoint_exits_51() {
    let env = Env::new();
    env.server.mock(|when, then| {
        when.method(GET).path("/api/v1/artworks");
        then.status(404).body("not found");
    });

    let output = env.run(&["page", "1"]);
    assert_code(&output, 51);
}

#[test]
fn page_json_lists_items() {
    let env = Env::new();
    env.serve_page(2, 5, 12);

    let output = env.run(&["page", "2", "--page-size", "5", "--json"]);
    assert_code(&output, 0);

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["number"], 2);
    assert_eq!(body["page_size"], 5);
    assert_eq!(body["total_pages"], 3);
    let ids: Vec<u64> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![6, 7, 8, 9, 10]);
}

#[test]
fn page_zero_is_a_usage_error() {
    let env = Env::new();
    let output = env.run(&["page", "0"]);
    assert_code(&output, 2);
}
