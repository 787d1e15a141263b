//! switchyard demo server.
//!
//! ```text
//! $ curl http://localhost:9999/
//! <h1>Hello Switchyard</h1>
//! $ curl http://localhost:9999/hello/alice
//! hello alice, you're at /hello/alice
//! $ curl http://localhost:9999/assets/css/site.css
//! {"filepath":"css/site.css"}
//! $ curl http://localhost:9999/panic
//! Internal Server Error
//! $ curl http://localhost:9999/world
//! 404 NOT FOUND: /world
//! ```

use std::path::PathBuf;

use axum::http::StatusCode;
use clap::Parser;
use serde_json::json;

use switchyard::config::{load_config, ServerConfig};
use switchyard::observability::{logging, metrics};
use switchyard::{lifecycle, logger, net, recovery, Context, Engine, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Trie router demo server", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Per-version middleware for the `/v2` group.
fn only_for_v2() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |ctx: &mut Context| {
        tracing::info!(path = %ctx.path(), "v2 group middleware");
        ctx.next();
    }
}

fn build_engine() -> Engine {
    let mut engine = Engine::new();
    engine.use_middleware(logger());
    engine.use_middleware(recovery());

    engine.get("/", |c: &mut Context| {
        c.html(StatusCode::OK, "<h1>Hello Switchyard</h1>");
    });
    engine.get("/panic", |c: &mut Context| {
        let names = ["switchyard"];
        let index = c
            .query("index")
            .and_then(|i| i.parse::<usize>().ok())
            .unwrap_or(100);
        c.string(StatusCode::OK, names[index]);
    });
    engine.get("/hello/:name", |c: &mut Context| {
        let name = c.param("name").unwrap_or_default().to_string();
        c.string(StatusCode::OK, format!("hello {name}, you're at {}\n", c.path()));
    });
    engine.get("/assets/*filepath", |c: &mut Context| {
        let filepath = c.param("filepath").unwrap_or_default().to_string();
        c.json(StatusCode::OK, &json!({ "filepath": filepath }));
    });

    {
        let mut v1 = engine.group("/v1");
        v1.get("/hello", |c: &mut Context| {
            let name = c.query("name").unwrap_or_default();
            c.string(StatusCode::OK, format!("hello {name}, you're at {}\n", c.path()));
        });
    }
    {
        let mut v2 = engine.group("/v2");
        v2.use_middleware(only_for_v2());
        v2.get("/hello/:name", |c: &mut Context| {
            let name = c.param("name").unwrap_or_default().to_string();
            c.string(StatusCode::OK, format!("hello {name}, you're at {}\n", c.path()));
        });
        v2.post("/login", |c: &mut Context| {
            let body = json!({
                "username": c.post_form("username"),
                "password": c.post_form("password"),
            });
            c.json(StatusCode::OK, &body);
        });
    }

    engine
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("switchyard v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = build_engine();
    for (method, pattern) in engine.routes() {
        tracing::info!("Route {:>6} - {pattern}", method.as_str());
    }

    let listener = net::bind(&config.listener).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        lifecycle::wait_for_termination().await;
        shutdown.trigger();
    });

    HttpServer::new(config, engine)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
