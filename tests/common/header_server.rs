//! Minimal HTTP/1.1 server for integration tests.
//!
//! Routes:
//! - `/`          200 `text/html; charset=utf-8` with a small body
//! - `/missing`   404 `application/json`
//! - `/redirect`  301 to `/`
//! - `/endless`   200 whose body never ends (until the peer hangs up)
//! - `/download`  200 with `Content-Disposition`
//! - `/continue`  `100 Continue` followed by 200
//! - `/echo`      200 echoing the request method and `X-Marker` header
//! - anything else: 404 `text/plain`
//!
//! [`start_connect_proxy`] is a separate stand-in for an HTTPS proxy.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub struct HeaderServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    connections: Arc<AtomicUsize>,
}

impl HeaderServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Number of TCP connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread. It runs until the process exits.
pub fn start() -> HeaderServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let connections = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&connections);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::spawn(move || handle(stream));
        }
    });
    HeaderServer {
        base_url: format!("http://127.0.0.1:{}", port),
        connections,
    }
}

/// A URL on a port nobody listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

/// A forward proxy that accepts every `CONNECT` with a bare 200 and then
/// hangs up, so no TLS handshake can follow.
pub struct ConnectProxy {
    /// e.g. "http://127.0.0.1:12345"
    pub url: String,
    tunnels: Arc<AtomicUsize>,
}

impl ConnectProxy {
    /// Number of `CONNECT` requests answered so far.
    pub fn tunnels(&self) -> usize {
        self.tunnels.load(Ordering::SeqCst)
    }
}

pub fn start_connect_proxy() -> ConnectProxy {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let tunnels = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&tunnels);
    thread::spawn(move || {
        for mut stream in listener.incoming().flatten() {
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
                let mut buf = [0u8; 4096];
                let n = match stream.read(&mut buf) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => n,
                };
                if !buf[..n].starts_with(b"CONNECT ") {
                    return;
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = stream.write_all(
                    b"HTTP/1.1 200 Connection established\r\nProxy-Agent: connect-proxy\r\n\r\n",
                );
            });
        }
    });
    ConnectProxy {
        url: format!("http://127.0.0.1:{}", port),
        tunnels,
    }
}

fn handle(mut stream: TcpStream) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
    let (method, path, marker) = parse_request(&request);

    match path.as_str() {
        "/" => {
            let body = "<html><body>hello</body></html>";
            respond(
                &mut stream,
                "200 OK",
                &[
                    ("Content-Type", "text/html; charset=utf-8".to_string()),
                    ("Content-Length", body.len().to_string()),
                    ("X-Served-By", "header-server".to_string()),
                ],
                body.as_bytes(),
            );
        }
        "/missing" => {
            let body = r#"{"message":"Not Found"}"#;
            respond(
                &mut stream,
                "404 Not Found",
                &[
                    ("Content-Type", "application/json".to_string()),
                    ("Content-Length", body.len().to_string()),
                ],
                body.as_bytes(),
            );
        }
        "/redirect" => respond(
            &mut stream,
            "301 Moved Permanently",
            &[
                ("Location", "/".to_string()),
                ("Content-Length", "0".to_string()),
            ],
            b"",
        ),
        "/endless" => endless(&mut stream),
        "/download" => {
            let body = b"%PDF-1.4 fake";
            respond(
                &mut stream,
                "200 OK",
                &[
                    ("Content-Type", "application/pdf".to_string()),
                    (
                        "Content-Disposition",
                        "attachment; filename=\"report.pdf\"".to_string(),
                    ),
                    ("Content-Length", body.len().to_string()),
                ],
                body,
            );
        }
        "/continue" => {
            let _ = stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n");
            respond(
                &mut stream,
                "200 OK",
                &[
                    ("Content-Type", "text/plain".to_string()),
                    ("Content-Length", "2".to_string()),
                ],
                b"ok",
            );
        }
        "/echo" => respond(
            &mut stream,
            "200 OK",
            &[
                ("Content-Type", "text/plain".to_string()),
                ("Content-Length", "0".to_string()),
                ("X-Request-Method", method),
                ("X-Echo-Marker", marker.unwrap_or_default()),
            ],
            b"",
        ),
        _ => respond(
            &mut stream,
            "404 Not Found",
            &[
                ("Content-Type", "text/plain".to_string()),
                ("Content-Length", "0".to_string()),
            ],
            b"",
        ),
    }
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[(&str, String)], body: &[u8]) {
    let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\n", status);
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Sends headers, then body bytes until the client disconnects (or 30s pass).
fn endless(stream: &mut TcpStream) {
    let head = "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n";
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    let chunk = [0x5au8; 16 * 1024];
    let started = Instant::now();
    while started.elapsed() < Duration::from_secs(30) {
        if stream.write_all(&chunk).is_err() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

/// Returns (method, path, X-Marker header value).
fn parse_request(request: &str) -> (String, String, Option<String>) {
    let mut lines = request.lines();
    let mut first = lines.next().unwrap_or("").split_whitespace();
    let method = first.next().unwrap_or("").to_string();
    let path = first.next().unwrap_or("/").to_string();
    let mut marker = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("x-marker") {
                marker = Some(value.trim().to_string());
            }
        }
    }
    (method, path, marker)
}
