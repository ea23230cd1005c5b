//! Helpers to serve an Inertia application.
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::response::Response;
use colored::Colorize;
use local_ip_address::local_ip;
use tokio::net::TcpSocket;
use tokio::signal;
use tower_http::trace::{DefaultMakeSpan, OnResponse, TraceLayer};
use tracing::{Level, Span, debug, info};

use crate::logging::{FormatElapsedTimeOptions, format_elapsed_time};

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// Expose the server to the network by binding `0.0.0.0` instead of `127.0.0.1`.
    pub host: bool,
    /// First port to try, the next free one is used if it is taken.
    pub port: u16,
    /// Shown in the startup banner, e.g. `Development`.
    pub label: String,
    /// When the application started booting, used to report the startup time.
    pub start_time: Instant,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            host: false,
            port: DEFAULT_PORT,
            label: "Application".into(),
            start_time: Instant::now(),
        }
    }
}

pub fn log_server_start(start_time: Instant, host: bool, addr: SocketAddr, server_type: &str) {
    info!(name: "SKIP_FORMAT", "");
    let elapsed_time = format_elapsed_time(
        Ok(start_time.elapsed()),
        &FormatElapsedTimeOptions::default_startup(),
    )
    .map(|elapsed| elapsed.to_string())
    .unwrap_or_default();
    info!(name: "SKIP_FORMAT", "{} {}", "Sceptre".bold().bright_purple(), format!("{} server started in {}", server_type, elapsed_time));
    info!(name: "SKIP_FORMAT", "");

    let port = addr.port();
    let url = format!("\x1b]8;;http://localhost:{port}\x1b\\http://localhost:{port}\x1b]8;;\x1b\\")
        .bold()
        .underline()
        .bright_blue();
    let network_url = match (host, local_ip()) {
        (true, Ok(local_ip)) => {
            format!("\x1b]8;;http://{local_ip}:{port}\x1b\\http://{local_ip}:{port}\x1b]8;;\x1b\\")
                .bold()
                .underline()
                .bright_magenta()
        }
        (true, Err(_)) => "Could not determine the local network address".dimmed(),
        (false, _) => "Use --host to expose the server to your network".dimmed(),
    };
    info!(name: "SKIP_FORMAT", "  {}    {}", "Local".bold(), url);
    info!(name: "SKIP_FORMAT", "  {}  {}", "Network".bold(), network_url);
    info!(name: "SKIP_FORMAT", "");

    info!(name: "server", "{}", "waiting for requests...".dimmed());
}

/// Logs every response as `status uri latency`.
#[derive(Clone, Debug)]
pub struct CustomOnResponse;

impl OnResponse<Body> for CustomOnResponse {
    fn on_response(self, response: &Response<Body>, latency: Duration, _span: &Span) {
        let status = response.status();

        // Skip informational responses
        if status.is_informational() {
            return;
        }

        let status = if status.is_server_error() {
            status.to_string().red()
        } else if status.is_client_error() {
            status.to_string().yellow()
        } else {
            status.to_string().green()
        };

        let uri = response
            .extensions()
            .get::<Uri>()
            .map(Uri::to_string)
            .unwrap_or_default()
            .bold();

        let latency = format_elapsed_time(Ok(latency), &FormatElapsedTimeOptions::default())
            .map(|latency| latency.to_string())
            .unwrap_or_default();

        info!(name: "", "{} {} {}", status, uri, latency);
    }
}

/// Copies the request URI into the response extensions, so [`CustomOnResponse`] can log it.
async fn record_uri(request: Request, next: Next) -> Response {
    let uri = request.uri().clone();
    let mut response = next.run(request).await;
    response.extensions_mut().insert(uri);
    response
}

pub async fn find_open_port(address: &IpAddr, starting_port: u16) -> std::io::Result<u16> {
    let mut port = starting_port;

    loop {
        let socket = new_socket(address)?;
        match socket.bind(SocketAddr::new(*address, port)) {
            Ok(_) => {
                debug!("Found open port: {}", port);
                return Ok(port);
            }
            Err(error) if port < u16::MAX => {
                debug!(
                    "Port {} is already in use or failed to bind ({}), trying next one",
                    port, error
                );
                port += 1;
            }
            Err(error) => return Err(error),
        }
    }
}

fn new_socket(address: &IpAddr) -> std::io::Result<TcpSocket> {
    match address {
        IpAddr::V4(_) => TcpSocket::new_v4(),
        IpAddr::V6(_) => TcpSocket::new_v6(),
    }
}

/// Serves `router` until Ctrl+C or SIGTERM, with request logging.
pub async fn serve(router: Router, options: ServeOptions) -> std::io::Result<()> {
    let addr = if options.host {
        IpAddr::from([0, 0, 0, 0])
    } else {
        IpAddr::from([127, 0, 0, 1])
    };

    let port = find_open_port(&addr, options.port).await?;
    let socket = new_socket(&addr)?;
    socket.set_reuseaddr(true)?;
    socket.bind(SocketAddr::new(addr, port))?;

    let listener = socket.listen(1024)?;
    let local_addr = listener.local_addr()?;

    debug!("listening on {}", local_addr);

    let router = router
        .layer(middleware::from_fn(record_uri))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(CustomOnResponse),
        );

    log_server_start(options.start_time, options.host, local_addr, &options.label);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(name: "server", "shutting down");
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, SocketAddr};

    use super::find_open_port;

    #[tokio::test]
    async fn test_find_open_port_skips_taken_ports() {
        let addr = IpAddr::from([127, 0, 0, 1]);
        let taken = std::net::TcpListener::bind(SocketAddr::new(addr, 0)).unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let port = find_open_port(&addr, taken_port).await.unwrap();

        assert_ne!(port, taken_port);
        assert!(port > taken_port);
    }
}
