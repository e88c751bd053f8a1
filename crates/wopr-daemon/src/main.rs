//! `woprd` — the WOPR daemon binary.
//!
//! A thin entry point: resolves the home directory and config, builds
//! every subsystem singleton in construction order (leaf stores, then
//! the queue, then the executor, then the executor registered with the
//! queue, then the scheduler, then the gateway router), binds the HTTP
//! listener, and waits for a shutdown signal.
//!
//! Grounded on `astrid-cli/src/daemon_main.rs` for the overall shape
//! (parse args, init logging, build, serve, wait-for-signal, tear down)
//! and on `astrid-kernel/src/server/paths.rs`/`lib.rs` for the
//! construction-order discipline spec.md §9's "circular-import dance"
//! note calls for: leaf stores, then the queue, then the executor, then
//! the executor wired into the queue.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use wopr_audit::AuditLog;
use wopr_config::Config;
use wopr_core::dirs::WoprHome;
use wopr_events::EventBus;
use wopr_executor::InjectionExecutor;
use wopr_gateway::ws::{spawn_event_forwarder, spawn_heartbeat, OpenAuth, StaticTokenAuth, WsAuth, WsHub};
use wopr_gateway::AppState;
use wopr_hooks::{ContextRegistry, MiddlewareChain};
use wopr_llm::{EchoProvider, ProviderRegistry};
use wopr_queue::QueueManager;
use wopr_scheduler::{Scheduler, TriggerStore};
use wopr_security::{PolicyEngine, SecurityConfig};
use wopr_sessions::{ConversationLog, SessionStore};
use wopr_storage::FileKvStore;

/// Minute-tick cadence for the scheduler's cron/one-shot sweep (§4.10).
const SCHEDULER_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// WOPR daemon — background agent runtime server.
#[derive(Parser)]
#[command(name = "woprd")]
#[command(author, version, about = "WOPR daemon: personal AI agent runtime server")]
struct Args {
    /// Override the daemon home directory (defaults to `$WOPR_HOME`/`~/.wopr`).
    #[arg(long)]
    home: Option<std::path::PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let log_config = wopr_telemetry::LogConfig::new(level).with_format(wopr_telemetry::LogFormat::Compact);
    if let Err(error) = wopr_telemetry::setup_logging(&log_config) {
        eprintln!("failed to initialize logging: {error}");
    }

    let home = match &args.home {
        Some(path) => WoprHome::from_path(path),
        None => WoprHome::resolve()?,
    };
    home.ensure()?;

    let config = Arc::new(Config::load(home.root())?);
    let security_config = load_security_config(&home, &config)?;

    // Leaf stores.
    let events = Arc::new(EventBus::new());
    let sessions = Arc::new(SessionStore::new(Arc::new(FileKvStore::new(home.sessions_dir()))));
    let log = Arc::new(ConversationLog::new(home.sessions_dir()));
    let security = Arc::new(PolicyEngine::new(security_config));
    let context = Arc::new(ContextRegistry::new());
    let middleware = Arc::new(MiddlewareChain::new());
    let audit = Arc::new(AuditLog::new(home.root().join("audit.jsonl")));

    let providers = Arc::new(ProviderRegistry::new());
    providers.register("echo", Arc::new(EchoProvider::new("echo-model")));

    // The queue, then the executor, then the executor registered with
    // the queue — the construction order spec.md §9 calls for, since
    // `QueueManager` and `InjectionExecutor` would otherwise need to
    // know about each other before either exists.
    let queue = Arc::new(QueueManager::new(Arc::clone(&events)));
    let executor = Arc::new(InjectionExecutor::new(
        Arc::clone(&security),
        Arc::clone(&context),
        Arc::clone(&middleware),
        Arc::clone(&sessions),
        Arc::clone(&log),
        Arc::clone(&providers),
        Arc::clone(&events),
        Arc::clone(&audit),
        &config.executor,
    ));
    queue.set_executor(executor)?;

    let trigger_store = Arc::new(TriggerStore::new(Arc::new(FileKvStore::new(home.root().join("triggers")))));
    let scheduler = Arc::new(Scheduler::new(trigger_store, Arc::clone(&queue), Arc::clone(&audit)));

    let ws = Arc::new(WsHub::new());
    let ws_auth = resolve_ws_auth();
    let capability_limiter = Arc::new(wopr_gateway::capabilities::RateLimiter::default());

    let state = AppState {
        config: Arc::clone(&config),
        sessions,
        log,
        queue,
        security,
        providers,
        middleware,
        context,
        scheduler: Arc::clone(&scheduler),
        events: Arc::clone(&events),
        ws: Arc::clone(&ws),
        ws_auth,
        audit,
        capability_limiter,
    };

    let heartbeat_handle = spawn_heartbeat(
        Arc::clone(&ws),
        Duration::from_secs(config.gateway.heartbeat_interval_secs),
        Duration::from_secs(config.gateway.heartbeat_timeout_secs),
        config.gateway.backpressure_threshold,
    );
    let forwarder_handle = spawn_event_forwarder(Arc::clone(&ws), Arc::clone(&events));
    let scheduler_handle = Arc::clone(&scheduler).spawn(SCHEDULER_TICK_INTERVAL);

    let router = wopr_gateway::build(state);
    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let bound_addr = listener.local_addr()?;
    std::fs::write(home.port_file(), bound_addr.port().to_string())?;
    std::fs::write(home.pid_file(), std::process::id().to_string())?;

    tracing::info!(addr = %bound_addr, "woprd listening");

    let serve_result = axum::serve(listener, router).with_graceful_shutdown(shutdown::wait_for_signal()).await;

    heartbeat_handle.abort();
    forwarder_handle.abort();
    scheduler_handle.abort();
    let _ = std::fs::remove_file(home.pid_file());
    let _ = std::fs::remove_file(home.port_file());

    tracing::info!("woprd stopped");
    serve_result?;
    Ok(())
}

/// Load `{home}/security.json`, if present; otherwise start from a
/// permissive policy seeded with the compiled/config-file enforcement
/// level (so the first run honors `config.toml`'s `enforcement` value
/// rather than silently defaulting to `enforce` via `security.json`
/// absence).
fn load_security_config(home: &WoprHome, config: &Config) -> anyhow::Result<SecurityConfig> {
    let path = home.security_config_path();
    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Ok(SecurityConfig { enforcement: Some(config.enforcement), ..SecurityConfig::permissive() })
        }
        Err(error) => Err(error.into()),
    }
}

/// `WOPR_GATEWAY_TOKEN` gates `/ws` auth; unset means any local client
/// can subscribe (single-user deployments).
fn resolve_ws_auth() -> Arc<dyn WsAuth> {
    match std::env::var("WOPR_GATEWAY_TOKEN") {
        Ok(token) if !token.is_empty() => Arc::new(StaticTokenAuth::new(token)),
        _ => Arc::new(OpenAuth),
    }
}
