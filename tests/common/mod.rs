//! Shared helpers for the CLI integration tests.

// Each test binary uses a different subset.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Run verse against `data_dir` with colors off.
pub fn verse(data_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("verse");
    cmd.env_remove("VERSE_API_BASE")
        .env("NO_COLOR", "1")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// A request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// One scripted reply, matched on method and path.
pub struct Route {
    pub method: &'static str,
    pub path: &'static str,
    pub status: u16,
    pub body: String,
}

pub fn route(method: &'static str, path: &'static str, status: u16, body: &str) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

/// Envelope with `code` 200 around `data`.
pub fn ok(data: &str) -> String {
    format!(r#"{{"code":200,"message":"success","data":{data}}}"#)
}

/// A minimal HTTP/1.1 backend on its own thread and runtime.
///
/// Unknown routes get a 404. Every request is recorded.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockBackend {
    pub fn start(routes: Vec<Route>) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let routes = Arc::new(routes);
        let (addr_tx, addr_rx) = mpsc::channel();

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();

                while let Ok((socket, _)) = listener.accept().await {
                    let routes = routes.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let _ = serve(socket, &routes, &recorded).await;
                    });
                }
            });
        });

        let addr = addr_rx.recv().unwrap();
        Self { addr, requests }
    }

    /// Base URL with the `/api` prefix the backend mounts its routes under.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve(
    mut socket: TcpStream,
    routes: &[Route],
    recorded: &Mutex<Vec<Recorded>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("authorization") {
                authorization = Some(value.to_string());
            }
        }
    }

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let (status, reply) = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));

    recorded.lock().unwrap().push(Recorded {
        method,
        path,
        authorization,
        body,
    });

    let response = format!(
        "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
        reply.len()
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}
