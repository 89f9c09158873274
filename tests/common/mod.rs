//! Shared test support: a minimal HTTP stub server.
//!
//! The suite needs deterministic catalog behavior (canned envelopes,
//! scripted failures, hit counting), so requests go to a local listener
//! instead of the live API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// One canned response.
#[derive(Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

impl StubResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            body: body.as_bytes().to_vec(),
            content_type: "application/json",
        }
    }

    pub fn bytes(body: &[u8]) -> Self {
        Self {
            status: 200,
            body: body.to_vec(),
            content_type: "application/octet-stream",
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            content_type: "text/plain",
        }
    }
}

/// Minimal HTTP server for tests. Routes are exact path matches (query
/// string excluded); a path can serve a sequence of responses, with the
/// last one repeating. Hits are counted per path and full request targets
/// are recorded in arrival order, so tests can assert on retry counts and
/// pagination offsets.
pub struct StubServer {
    addr: String,
    routes: Arc<Mutex<HashMap<String, Vec<StubResponse>>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    /// Bind an ephemeral local port and start serving.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = format!(
            "http://{}",
            listener.local_addr().expect("Failed to read local addr")
        );

        let routes: Arc<Mutex<HashMap<String, Vec<StubResponse>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let hits: Arc<Mutex<HashMap<String, usize>>> = Arc::new(Mutex::new(HashMap::new()));
        let requests: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let server_routes = routes.clone();
        let server_hits = hits.clone();
        let server_requests = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    break;
                };
                let routes = server_routes.clone();
                let hits = server_hits.clone();
                let requests = server_requests.clone();
                tokio::spawn(handle_connection(socket, routes, hits, requests));
            }
        });

        Self {
            addr,
            routes,
            hits,
            requests,
        }
    }

    /// Absolute URL for a path on this server.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Base URL, for pointing catalog options at the stub.
    pub fn base_url(&self) -> String {
        self.addr.clone()
    }

    /// Serve the same response for every request to `path`.
    pub fn route(&self, path: &str, response: StubResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), vec![response]);
    }

    /// Serve a sequence of responses for `path`; the last one repeats.
    pub fn route_sequence(&self, path: &str, responses: Vec<StubResponse>) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), responses);
    }

    /// How many requests hit `path` (query string ignored).
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    /// Full request targets (path plus query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn handle_connection(
    mut socket: tokio::net::TcpStream,
    routes: Arc<Mutex<HashMap<String, Vec<StubResponse>>>>,
    hits: Arc<Mutex<HashMap<String, usize>>>,
    requests: Arc<Mutex<Vec<String>>>,
) {
    // Read until the end of the request head; GETs carry no body.
    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                data.extend_from_slice(&buf[..n]);
                if data.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => return,
        }
    }

    let head = String::from_utf8_lossy(&data);
    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
    let path = target.split('?').next().unwrap_or("/").to_string();

    requests.lock().unwrap().push(target);
    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let response = {
        let mut routes = routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => Some(queue.remove(0)),
            Some(queue) => queue.first().cloned(),
            None => None,
        }
    };

    let (status, body, content_type) = match response {
        Some(r) => (r.status, r.body, r.content_type),
        None => (404, b"not found".to_vec(), "text/plain"),
    };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason_phrase(status),
        content_type,
        body.len()
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(&body).await;
    let _ = socket.shutdown().await;
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
