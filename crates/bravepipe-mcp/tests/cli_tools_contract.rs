use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::process::Output;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("axum serve");
    });
    addr
}

fn fixture() -> Router {
    Router::new()
        .route(
            "/res/v1/web/search",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                if q.get("q").map(String::as_str) == Some("limit") {
                    return Err((StatusCode::TOO_MANY_REQUESTS, "slow down"));
                }
                Ok(Json(serde_json::json!({
                    "web": {"results": [
                        {"title": "Rust", "url": "https://www.rust-lang.org/", "description": "A language"},
                        {"title": "Crates"}
                    ]}
                })))
            }),
        )
        .route(
            "/page",
            get(|| async {
                (
                    [("content-type", "text/html")],
                    "<html><head><script>var secret = 1;</script></head><body><p>Hello</p></body></html>",
                )
            }),
        )
}

async fn run(addr: SocketAddr, args: &[&str]) -> Output {
    let bin = assert_cmd::cargo::cargo_bin!("bravepipe");
    tokio::process::Command::new(bin)
        .args(args)
        .env_remove("BRAVEPIPE_BRAVE_API_KEY")
        .env_remove("BRAVEPIPE_ENV_FILE")
        .env("BRAVE_API_KEY", "test-key")
        .env("BRAVEPIPE_BRAVE_ENDPOINT", format!("http://{addr}/res/v1"))
        .env("BRAVEPIPE_LOG", "error")
        .output()
        .await
        .expect("run bravepipe")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).trim_end().to_string()
}

#[tokio::test]
async fn search_prints_numbered_results() {
    let addr = serve(fixture()).await;
    let out = run(addr, &["search", "--query", "rust", "--count", "2", "--offset", "4"]).await;
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "[Result 5]\n  Title: Rust\n  URL: https://www.rust-lang.org/\n  Description: A language\n\n\
         [Result 6]\n  Title: Crates\n  URL: No URL available\n  Description: No description available"
    );
}

#[tokio::test]
async fn search_failures_are_text_with_success_exit() {
    let addr = serve(fixture()).await;
    let out = run(addr, &["search", "--query", "limit"]).await;
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "Search error: Rate limit exceeded - please wait before trying again"
    );

    let out = run(addr, &["search", "--query", "rust", "--count", "50"]).await;
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "Search error: Invalid request - count must be between 1 and 20"
    );
}

#[tokio::test]
async fn fetch_prints_visible_text() {
    let addr = serve(fixture()).await;
    let out = run(addr, &["fetch", "--url", &format!("http://{addr}/page")]).await;
    assert!(out.status.success());
    assert_eq!(stdout(&out), "Hello");

    let out = run(addr, &["fetch", "--url", &format!("http://{addr}/missing")]).await;
    assert_eq!(stdout(&out), "Error fetching website: HTTP 404 Not Found");

    let out = run(addr, &["fetch", "--url", "not-a-valid-url"]).await;
    assert_eq!(stdout(&out), "Invalid URL format");
}

#[test]
fn missing_key_is_a_startup_error() {
    let bin = assert_cmd::cargo::cargo_bin!("bravepipe");
    let out = std::process::Command::new(bin)
        .args(["fetch", "--url", "https://example.com"])
        .env_remove("BRAVEPIPE_BRAVE_API_KEY")
        .env_remove("BRAVE_API_KEY")
        .env_remove("BRAVEPIPE_ENV_FILE")
        .output()
        .expect("run bravepipe fetch");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("BRAVE_API_KEY"));
}
