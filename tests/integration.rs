use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;

const SENTINEL: &str = "# Start of SvelteKit documentation";

fn docs_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("docs-mcp");
    path
}

fn setup_test_env_with_port(port: u16) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let corpora_dir = root.join("corpora");
    fs::create_dir_all(&corpora_dir).unwrap();

    fs::write(
        corpora_dir.join("plain.txt"),
        "# Intro\nHello\n# Routing\nUse the router for paths.",
    )
    .unwrap();

    fs::write(
        corpora_dir.join("svelte.txt"),
        format!(
            "# Runes\nUse $state for reactive state.\n\n# Snippets\nReusable markup blocks.\n{}\n# Routing\nFilesystem-based router.\n\n# Load\nload functions fetch data.",
            SENTINEL
        ),
    )
    .unwrap();

    let big = (0..600)
        .map(|i| format!("# Section {i}\nLorem ipsum dolor sit amet, entry {i}."))
        .collect::<Vec<_>>()
        .join("\n");
    fs::write(corpora_dir.join("big.txt"), big).unwrap();

    let config_content = format!(
        r##"[server]
bind = "127.0.0.1:{port}"

[corpora.plain]
path = "corpora/plain.txt"

[corpora.svelte]
path = "corpora/svelte.txt"
docs_url = "https://svelte.dev/docs"

[corpora.svelte.partition]
sentinel = "{SENTINEL}"
names = ["svelte", "kit"]

[corpora.big]
path = "corpora/big.txt"
docs_url = "https://big.example.com/docs"

[corpora.ghost]
path = "corpora/does-not-exist.txt"
"##
    );

    let config_path = root.join("docs.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn setup_test_env() -> (TempDir, PathBuf) {
    setup_test_env_with_port(7332)
}

fn run_docs(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = docs_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run docs-mcp binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_lookup_section_match() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_docs(&config_path, &["lookup", "plain", "--topic", "routing"]);
    assert!(success, "lookup failed: stderr={}", stderr);
    assert_eq!(stdout, "# Routing\nUse the router for paths.\n");
}

#[test]
fn test_lookup_no_match_returns_whole_corpus() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) =
        run_docs(&config_path, &["lookup", "plain", "--topic", "xyz-not-present"]);
    assert!(success);
    assert_eq!(stdout, "# Intro\nHello\n# Routing\nUse the router for paths.\n");
}

#[test]
fn test_lookup_default_topic_is_overview() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docs(&config_path, &["lookup", "plain"]);
    assert!(success);
    assert!(stdout.contains("# Intro"));
    assert!(stdout.contains("# Routing"));
}

#[test]
fn test_lookup_truncates_with_notice() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docs(&config_path, &["lookup", "big"]);
    assert!(success);
    assert!(stdout.contains("content truncated"));
    assert!(stdout.contains("https://big.example.com/docs"));

    let notice_at = stdout.find("\n\n... (content truncated").unwrap();
    assert_eq!(stdout[..notice_at].chars().count(), 8000);
}

#[test]
fn test_lookup_first_partition_by_default() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docs(&config_path, &["lookup", "svelte"]);
    assert!(success);
    assert!(stdout.contains("# Runes"));
    assert!(!stdout.contains(SENTINEL));
    assert!(!stdout.contains("Filesystem-based router"));
}

#[test]
fn test_lookup_second_partition() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docs(
        &config_path,
        &["lookup", "svelte", "--partition", "kit", "--topic", "router"],
    );
    assert!(success);
    assert_eq!(stdout, "# Routing\nFilesystem-based router.\n");
}

#[test]
fn test_lookup_invalid_partition_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) =
        run_docs(&config_path, &["lookup", "svelte", "--partition", "react"]);
    assert!(!success);
    assert!(stderr.contains("not valid"), "stderr={}", stderr);
}

#[test]
fn test_lookup_missing_file_reports_read_error() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_docs(&config_path, &["lookup", "ghost"]);
    assert!(!success);
    assert!(stdout.is_empty());
    assert!(stderr.contains("failed to read corpus 'ghost'"), "stderr={}", stderr);
}

#[test]
fn test_lookup_unknown_corpus() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_docs(&config_path, &["lookup", "react"]);
    assert!(!success);
    assert!(stderr.contains("corpus not found: react"));
}

#[test]
fn test_corpora_lists_health() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docs(&config_path, &["corpora"]);
    assert!(success);
    let ghost = stdout.lines().find(|l| l.starts_with("ghost")).unwrap();
    assert!(ghost.contains("false"));
    let plain = stdout.lines().find(|l| l.starts_with("plain")).unwrap();
    assert!(plain.contains("true"));
}

#[test]
fn test_tools_lists_corpus_tools() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_docs(&config_path, &["tools"]);
    assert!(success);
    for name in ["svelte_docs", "plain_docs", "crate_docs", "list_corpora"] {
        assert!(stdout.contains(name), "missing {} in {}", name, stdout);
    }
}

#[test]
fn test_invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("docs.toml");
    fs::write(&config_path, "[filter]\nmax_chars = 0\n").unwrap();

    let (_, stderr, success) = run_docs(&config_path, &["corpora"]);
    assert!(!success);
    assert!(stderr.contains("max_chars"));
}

#[test]
fn test_missing_config_uses_defaults() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("absent.toml");

    let (stdout, _, success) = run_docs(&config_path, &["corpora"]);
    assert!(success);
    assert!(stdout.contains("No corpora configured"));
}

// ============ HTTP server ============

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn start_server(config_path: &Path) -> std::process::Child {
    Command::new(docs_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(["serve", "http"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap_or_else(|e| panic!("Failed to start server: {}", e))
}

fn wait_for_server(port: u16) {
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        std::thread::sleep(std::time::Duration::from_millis(100));
        if let Ok(resp) = reqwest::blocking::get(&url) {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

#[test]
fn test_server_health_and_tool_list() {
    let port = find_free_port();
    let (_tmp, config_path) = setup_test_env_with_port(port);
    let mut server = start_server(&config_path);
    wait_for_server(port);

    let body: serde_json::Value = reqwest::blocking::get(format!("http://127.0.0.1:{}/health", port))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    let body: serde_json::Value =
        reqwest::blocking::get(format!("http://127.0.0.1:{}/tools/list", port))
            .unwrap()
            .json()
            .unwrap();
    let tools = body["tools"].as_array().unwrap();
    let svelte = tools.iter().find(|t| t["name"] == "svelte_docs").unwrap();
    assert_eq!(
        svelte["parameters"]["properties"]["partition"]["enum"],
        serde_json::json!(["svelte", "kit"])
    );

    server.kill().ok();
    server.wait().ok();
}

#[test]
fn test_server_lookup_and_error_paths() {
    let port = find_free_port();
    let (_tmp, config_path) = setup_test_env_with_port(port);
    let mut server = start_server(&config_path);
    wait_for_server(port);

    let client = reqwest::blocking::Client::new();
    let call = |tool: &str, params: serde_json::Value| {
        client
            .post(format!("http://127.0.0.1:{}/tools/{}", port, tool))
            .json(&params)
            .send()
            .unwrap()
    };

    let resp = call("plain_docs", serde_json::json!({ "topic": "routing" }));
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["result"], "# Routing\nUse the router for paths.");

    let resp = call("ghost_docs", serde_json::json!({}));
    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["error"]["code"], "read_error");

    let resp = call("svelte_docs", serde_json::json!({ "partition": "react" }));
    assert_eq!(resp.status(), 400);

    let resp = call("no_such_tool", serde_json::json!({}));
    assert_eq!(resp.status(), 404);

    // A failed lookup must not take the server down.
    let resp = call("svelte_docs", serde_json::json!({ "partition": "kit", "topic": "load" }));
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().unwrap();
    assert_eq!(body["result"], "# Load\nload functions fetch data.");

    server.kill().ok();
    server.wait().ok();
}

// ============ MCP over stdio ============

fn read_response(reader: &mut impl BufRead, id: i64) -> serde_json::Value {
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).unwrap();
        assert!(n > 0, "server closed stdout before responding to id {}", id);
        let msg: serde_json::Value = serde_json::from_str(line.trim())
            .unwrap_or_else(|e| panic!("non-JSON line on stdout: {:?} ({})", line, e));
        if msg["id"] == id {
            return msg;
        }
    }
}

#[test]
fn test_stdio_mcp_session() {
    let (_tmp, config_path) = setup_test_env();

    let mut child = Command::new(docs_binary())
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(["-v", "serve", "stdio"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    let mut send = |msg: serde_json::Value| {
        writeln!(stdin, "{}", msg).unwrap();
        stdin.flush().unwrap();
    };

    send(serde_json::json!({
        "jsonrpc": "2.0", "id": 1, "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "integration-test", "version": "0.0.0" }
        }
    }));
    let init = read_response(&mut stdout, 1);
    assert_eq!(init["result"]["serverInfo"]["name"], "docs-mcp");

    send(serde_json::json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }));

    send(serde_json::json!({
        "jsonrpc": "2.0", "id": 2, "method": "tools/call",
        "params": { "name": "plain_docs", "arguments": { "topic": "routing" } }
    }));
    let result = read_response(&mut stdout, 2);
    assert_eq!(result["result"]["isError"], false);
    assert_eq!(
        result["result"]["content"][0]["text"],
        "# Routing\nUse the router for paths."
    );

    send(serde_json::json!({
        "jsonrpc": "2.0", "id": 3, "method": "tools/call",
        "params": { "name": "ghost_docs", "arguments": {} }
    }));
    let result = read_response(&mut stdout, 3);
    assert_eq!(result["result"]["isError"], true);
    let text = result["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("failed to read corpus 'ghost'"));

    // Still serving after the failed call.
    send(serde_json::json!({ "jsonrpc": "2.0", "id": 4, "method": "tools/list" }));
    let list = read_response(&mut stdout, 4);
    assert!(list["result"]["tools"].as_array().unwrap().len() >= 6);

    child.kill().ok();
    child.wait().ok();
}
