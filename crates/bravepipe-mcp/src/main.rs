use anyhow::Result;
use bravepipe::Toolbox;
use bravepipe_local::{apply_env_overrides, brave_api_key_from_env, config_from_env};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bravepipe")]
#[command(about = "Brave web search + website fetch (MCP stdio server)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as an MCP stdio server (for Cursor / MCP clients).
    #[cfg(feature = "stdio")]
    McpStdio,
    /// Run one web search and print the formatted results.
    Search(SearchCmd),
    /// Fetch one website and print its visible text.
    Fetch(FetchCmd),
    /// Diagnose configuration issues (json; no secrets).
    Doctor(DoctorCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct SearchCmd {
    #[arg(long)]
    query: String,
    /// Results per page (1-20).
    #[arg(long, allow_negative_numbers = true)]
    count: Option<i64>,
    /// Zero-based result offset.
    #[arg(long, allow_negative_numbers = true)]
    offset: Option<i64>,
    /// Overrides BRAVEPIPE_SEARCH_LANG for this call.
    #[arg(long)]
    search_lang: Option<String>,
}

#[derive(clap::Args, Debug)]
struct FetchCmd {
    #[arg(long)]
    url: String,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[cfg(feature = "stdio")]
mod mcp {
    use bravepipe::Toolbox;
    use rmcp::{
        handler::server::router::tool::ToolRouter as RmcpToolRouter,
        handler::server::wrapper::Parameters,
        model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
        tool, tool_handler, tool_router,
        transport::stdio,
        ErrorData as McpError, ServiceExt,
    };
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema, Default)]
    struct BraveWebSearchArgs {
        /// Search query (required).
        #[serde(default)]
        query: String,
        /// Number of results, 1-20 (default: 10).
        #[serde(default)]
        count: Option<i64>,
        /// Result offset for pagination (default: 0).
        #[serde(default)]
        offset: Option<i64>,
        /// Search language, e.g. "en" (default: server configuration).
        #[serde(default)]
        search_lang: Option<String>,
    }

    #[derive(Debug, Deserialize, JsonSchema, Default)]
    struct FetchWebsiteArgs {
        /// Absolute http(s) URL to fetch (required).
        #[serde(default)]
        url: String,
    }

    fn text_result(text: String) -> CallToolResult {
        CallToolResult::success(vec![Content::text(text)])
    }

    #[derive(Clone)]
    pub(crate) struct BravepipeMcp {
        tool_router: RmcpToolRouter<Self>,
        tools: Toolbox,
    }

    #[tool_router]
    impl BravepipeMcp {
        pub(crate) fn new(tools: Toolbox) -> Self {
            Self {
                tool_router: Self::tool_router(),
                tools,
            }
        }

        #[tool(
            description = "Search the web with the Brave Search API. Returns numbered results with title, URL and description."
        )]
        async fn brave_web_search(
            &self,
            params: Parameters<Option<BraveWebSearchArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            let text = self
                .tools
                .search(&args.query, args.count, args.offset, args.search_lang)
                .await;
            Ok(text_result(text))
        }

        #[tool(
            description = "Fetch a website and return its visible text (scripts, styles and page chrome removed)."
        )]
        async fn fetch_website(
            &self,
            params: Parameters<Option<FetchWebsiteArgs>>,
        ) -> Result<CallToolResult, McpError> {
            let args = params.0.unwrap_or_default();
            Ok(text_result(self.tools.fetch_document(&args.url).await))
        }
    }

    #[tool_handler]
    impl rmcp::ServerHandler for BravepipeMcp {
        fn get_info(&self) -> ServerInfo {
            ServerInfo {
                instructions: Some(
                    "Brave web search and website fetch. Tools always return plain text; failures are described in the text."
                        .to_string(),
                ),
                capabilities: ServerCapabilities::builder().enable_tools().build(),
                ..Default::default()
            }
        }
    }

    pub(crate) async fn serve_stdio(tools: Toolbox) -> Result<(), McpError> {
        let running = BravepipeMcp::new(tools)
            .serve(stdio())
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        // Runs until the client closes stdin.
        running
            .waiting()
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(())
    }

}

/// Load `KEY=VALUE` lines from `BRAVEPIPE_ENV_FILE`, if set.
///
/// MCP hosts rarely start servers from an interactive shell, so this gives one place
/// to keep the API key. Variables already present in the process are never overridden,
/// and values are never logged.
fn load_env_file() {
    let Some(path) = std::env::var("BRAVEPIPE_ENV_FILE")
        .ok()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
    else {
        return;
    };
    let Ok(txt) = std::fs::read_to_string(&path) else {
        return;
    };
    for line in txt.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };
        let k = k.trim();
        if !k.is_empty() && std::env::var_os(k).is_none() {
            std::env::set_var(k, v.trim());
        }
    }
}

/// Logs go to stderr: stdout is the MCP JSON-RPC channel.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("BRAVEPIPE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn toolbox_from_env() -> Result<Toolbox> {
    let config = config_from_env()?;
    tracing::debug!(?config, "resolved configuration");
    Ok(Toolbox::from_config(config)?)
}

fn doctor_payload() -> serde_json::Value {
    let key_present = brave_api_key_from_env().is_some();
    let resolved = apply_env_overrides(bravepipe::core::Config::new(
        brave_api_key_from_env().unwrap_or_default(),
    ));
    let (configured, error) = match &resolved {
        Ok(cfg) => (cfg.redacted(), None),
        Err(e) => (
            bravepipe::core::Config::new(String::new()).redacted(),
            Some(e.to_string()),
        ),
    };
    let mut checks = vec![serde_json::json!({
        "name": "brave_api_key",
        "ok": key_present,
        "hint": if key_present { "" } else { "Set BRAVE_API_KEY (or BRAVEPIPE_BRAVE_API_KEY)." },
    })];
    checks.push(serde_json::json!({
        "name": "env_overrides",
        "ok": error.is_none(),
        "error": error,
    }));
    serde_json::json!({
        "schema_version": 1,
        "kind": "doctor",
        "ok": key_present && resolved.is_ok(),
        "name": "bravepipe",
        "version": env!("CARGO_PKG_VERSION"),
        "features": { "stdio": cfg!(feature = "stdio") },
        "configured": configured,
        "checks": checks,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_file();
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        #[cfg(feature = "stdio")]
        Commands::McpStdio => {
            let tools = toolbox_from_env()?;
            tracing::info!("starting MCP stdio server");
            mcp::serve_stdio(tools)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        }
        Commands::Search(args) => {
            let tools = toolbox_from_env()?;
            let text = tools
                .search(&args.query, args.count, args.offset, args.search_lang)
                .await;
            println!("{text}");
        }
        Commands::Fetch(args) => {
            let tools = toolbox_from_env()?;
            println!("{}", tools.fetch_document(&args.url).await);
        }
        Commands::Doctor(args) => {
            let payload = doctor_payload();
            match args.output.to_ascii_lowercase().as_str() {
                "text" => {
                    println!(
                        "bravepipe {} ({})",
                        env!("CARGO_PKG_VERSION"),
                        if payload["ok"].as_bool() == Some(true) { "ok" } else { "not ok" }
                    );
                    if let Some(checks) = payload["checks"].as_array() {
                        for c in checks {
                            let ok = c["ok"].as_bool().unwrap_or(false);
                            println!(
                                "- {}: {}",
                                c["name"].as_str().unwrap_or("?"),
                                if ok { "ok" } else { "fail" }
                            );
                        }
                    }
                }
                _ => println!("{payload}"),
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "bravepipe",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("bravepipe {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{v}"),
            }
        }
    }

    Ok(())
}
