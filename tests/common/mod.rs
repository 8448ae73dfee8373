//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use pomf_router::config::{RouterConfig, ServerConfig};
use pomf_router::http::HttpServer;
use pomf_router::lifecycle::Shutdown;

/// A canned answer for one request path.
#[derive(Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn load(uploads: f64, downloads: f64) -> Self {
        Self::ok(format!(r#"{{"uploads":{},"downloads":{}}}"#, uploads, downloads))
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Start a mock storage server answering by request path. Unknown paths get 404.
pub async fn start_storage_server(routes: Vec<(&'static str, Reply)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes: Arc<HashMap<&'static str, Reply>> = Arc::new(routes.into_iter().collect());

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let routes = routes.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]);
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let reply = routes.get(path.as_str()).cloned().unwrap_or_else(|| Reply::status(404));
                        tokio::time::sleep(reply.delay).await;

                        let response = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            reply.status,
                            status_text(reply.status),
                            reply.body.len(),
                            reply.body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// An address nothing listens on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn server(name: &str, addr: SocketAddr) -> ServerConfig {
    ServerConfig {
        name: name.into(),
        url: format!("http://{}", addr),
        lat: None,
        lon: None,
    }
}

/// Config with the given servers and short probe deadlines.
pub fn config_with(servers: Vec<ServerConfig>) -> RouterConfig {
    let mut config = RouterConfig::default();
    config.servers = servers;
    config.routing.probe_timeout_ms = 300;
    config.routing.health_timeout_ms = 300;
    config
}

/// Run the router on an ephemeral port. Returns its address and the shutdown handle.
pub async fn start_router(config: RouterConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let (_tx, updates) = tokio::sync::mpsc::unbounded_channel();

    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, updates, rx).await;
    });

    (addr, shutdown)
}

/// A client that reports redirects instead of following them.
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
