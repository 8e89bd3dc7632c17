//! CLI Integration Tests
//!
//! Runs the `jrpc` binary as a child process.
//!
//! Test Scenarios:
//! 1. URL and argument validation
//! 2. `serve` startup, `call` and `notify` against it
//! 3. Error replies and connection failures reported on stderr

use std::net::TcpListener;
use std::process::{Child, Command, Output, Stdio};
use std::thread::sleep;
use std::time::Duration;

// ============================================================================
// Test Helpers
// ============================================================================

fn jrpc() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_jrpc"));
    command.env_remove("JRPC_URL");
    command
}

/// A port nothing is listening on right now.
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

/// A `jrpc serve` child process, killed on drop.
struct DemoServer {
    child: Child,
    url: String,
}

impl DemoServer {
    fn start(extra: &[&str]) -> Self {
        let port = free_port();
        let bind = format!("127.0.0.1:{}", port);
        let child = jrpc()
            .args(["serve", "-b", &bind])
            .args(extra)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap();
        let server = Self {
            child,
            url: format!("http://{}", bind),
        };
        server.wait_until_ready();
        server
    }

    fn wait_until_ready(&self) {
        for _ in 0..100 {
            if std::net::TcpStream::connect(self.url.trim_start_matches("http://")).is_ok() {
                return;
            }
            sleep(Duration::from_millis(50));
        }
        panic!("jrpc serve did not start listening on {}", self.url);
    }

    fn call(&self, args: &[&str]) -> Output {
        jrpc().arg("call").args(args).args(["-u", &self.url]).output().unwrap()
    }
}

impl Drop for DemoServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ============================================================================
// Argument Validation Tests
// ============================================================================

#[test]
fn test_call_missing_http_prefix() {
    let output = jrpc()
        .args(["call", "version", "-u", "127.0.0.1:8080"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("must start with http://"));
}

#[test]
fn test_call_rejects_https_before_connecting() {
    let output = jrpc()
        .args(["call", "version", "-u", "https://127.0.0.1:1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("Invalid server URL"), "stderr: {}", stderr);
    assert!(stderr.contains("which is not supported"), "stderr: {}", stderr);
    assert!(!stderr.contains("unsupported URL scheme"), "stderr: {}", stderr);
}

#[test]
fn test_https_url_from_environment_is_rejected() {
    let output = jrpc()
        .args(["notify", "echo", "-a", "1"])
        .env("JRPC_URL", "https://127.0.0.1:1")
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("which is not supported"));
}

#[test]
fn test_call_with_invalid_json_args() {
    let output = jrpc()
        .args(["call", "echo", "-a", "{not json", "-u", "http://127.0.0.1:1"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid JSON in args"));
}

#[test]
fn test_serve_with_invalid_bind_address() {
    let output = jrpc().args(["serve", "-b", "not-an-address"]).output().unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid bind address"));
}

#[test]
fn test_serve_with_unknown_params_policy() {
    let output = jrpc()
        .args(["serve", "--params-policy", "lenient"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_help_lists_subcommands() {
    let output = jrpc().arg("--help").output().unwrap();
    let help = stdout(&output);
    for command in ["serve", "call", "notify"] {
        assert!(help.contains(command), "help output misses {}: {}", command, help);
    }
}

#[test]
fn test_call_command_connection_refused() {
    let url = format!("http://127.0.0.1:{}", free_port());
    let output = jrpc()
        .args(["call", "version", "-u", &url])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("jsonrpc:"));
}

// ============================================================================
// Serve + Call Tests
// ============================================================================

#[test]
fn test_call_prints_raw_json() {
    let server = DemoServer::start(&[]);

    let output = server.call(&["add", "-a", r#"{"a": 1.5, "b": 2}"#]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "3.5");

    let output = server.call(&["echo", "-a", r#"{"k":[1,2]}"#]);
    assert_eq!(stdout(&output), r#"{"k":[1,2]}"#);
}

#[test]
fn test_call_without_args() {
    let server = DemoServer::start(&[]);

    let output = server.call(&["version"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), format!("\"{}\"", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_call_reports_error_reply() {
    let server = DemoServer::start(&[]);

    let output = server.call(&["nope"]);
    assert!(!output.status.success());
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("Method not found (code -32601)"));
}

#[test]
fn test_params_policy_flag() {
    let strict = DemoServer::start(&[]);
    let output = strict.call(&["echo", "-a", "0"]);
    assert!(stderr(&output).contains("code -32602"));

    let lenient = DemoServer::start(&["--params-policy", "decode-only"]);
    let output = lenient.call(&["echo", "-a", "0"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "0");
}

#[test]
fn test_call_timeout() {
    let server = DemoServer::start(&[]);

    let output = server.call(&["sleep", "-a", "10000", "--timeout-ms", "100"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("context deadline exceeded"));
}

#[test]
fn test_notify_prints_nothing() {
    let server = DemoServer::start(&[]);

    let output = jrpc()
        .args(["notify", "echo", "-a", "\"hello\"", "-u", &server.url])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_url_from_environment() {
    let server = DemoServer::start(&[]);

    let output = jrpc()
        .args(["call", "version"])
        .env("JRPC_URL", &server.url)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
}
