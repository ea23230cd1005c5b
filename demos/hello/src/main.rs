use std::path::PathBuf;
use std::time::Instant;

use axum::extract::{Path, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use axum::routing::get;
use clap::Parser;
use sceptre::middleware::{add_prop, version_check};
use sceptre::server::{DEFAULT_PORT, ServeOptions, serve};
use sceptre::{
    Inertia, InertiaError, InertiaOptions, InertiaRequest, InertiaResponse, init_logging, props,
};
use tower_http::services::ServeDir;
use tracing::error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Expose the server to the network
    #[arg(long)]
    host: bool,

    /// Port to listen on, the next free one is used if it is taken
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory containing `index.html`, `pages` and `assets`
    #[arg(long, default_value = env!("CARGO_MANIFEST_DIR"))]
    root: PathBuf,
}

async fn index(
    State(inertia): State<Inertia>,
    request: InertiaRequest,
) -> Result<InertiaResponse, InertiaError> {
    inertia.render(&request, "Index", props! { "name" => "world" })
}

async fn greet(
    State(inertia): State<Inertia>,
    Path(name): Path<String>,
    request: InertiaRequest,
) -> Result<InertiaResponse, InertiaError> {
    inertia.render(&request, "Index", props! { "name" => name })
}

async fn stamp_request(mut request: Request, next: Next) -> Response {
    add_prop(&mut request, "req", chrono::Local::now().to_string());
    next.run(request).await
}

fn app(inertia: Inertia, assets: PathBuf) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/{name}", get(greet))
        .nest_service("/assets", ServeDir::new(assets))
        .layer(middleware::from_fn(stamp_request))
        .layer(middleware::from_fn_with_state(inertia.clone(), version_check))
        .with_state(inertia)
}

fn options(root: PathBuf) -> InertiaOptions {
    InertiaOptions {
        root_dir: root,
        ..Default::default()
    }
}

fn engine(options: InertiaOptions) -> Result<Inertia, InertiaError> {
    Inertia::builder(options)
        .share("start", chrono::Local::now().to_string())
        .param("Title", "Example App")
        .build()
}

#[tokio::main]
async fn main() {
    let start_time = Instant::now();
    let cli = Cli::parse();

    init_logging(env!("CARGO_CRATE_NAME"));

    let options = options(cli.root);
    let assets = options.assets_path();

    let inertia = match engine(options) {
        Ok(inertia) => inertia,
        Err(err) => {
            error!(name: "inertia", "{}", err);
            std::process::exit(1);
        }
    };

    let router = app(inertia, assets);

    if let Err(err) = serve(
        router,
        ServeOptions {
            host: cli.host,
            port: cli.port,
            label: "Demo".into(),
            start_time,
        },
    )
    .await
    {
        error!(name: "server", "{}", err);
        std::process::exit(1);
    }
}
