//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed routes registered at runtime (so descriptor pages can link to
//! the server's own URL). A route can refuse the first N requests by closing
//! the connection without a response, stall before answering, or cut its
//! body short to simulate a source dying mid-transfer. Unknown paths get 404.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Close the first `drop_first` connections right after reading the request.
    pub drop_first: usize,
    /// Announce the full length but send only this many body bytes.
    pub cut_body_at: Option<usize>,
    /// Wait this long before sending anything.
    pub delay: Option<Duration>,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            drop_first: 0,
            cut_body_at: None,
            delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!("status {}", status).into_bytes(),
            drop_first: 0,
            cut_body_at: None,
            delay: None,
        }
    }

    pub fn dropping_first(mut self, n: usize) -> Self {
        self.drop_first = n;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn cut_at(mut self, n: usize) -> Self {
        self.cut_body_at = Some(n);
        self
    }
}

#[derive(Default)]
struct State {
    routes: HashMap<String, Route>,
    hits: HashMap<String, usize>,
}

/// Running server. It lives until the test process exits.
#[derive(Clone)]
pub struct TestServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl TestServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Absolute URL for `path` (which starts with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, path: &str, route: Route) -> String {
        self.state
            .lock()
            .unwrap()
            .routes
            .insert(path.to_string(), route);
        self.url(path)
    }

    /// Requests received for `path`, dropped ones included.
    pub fn hits(&self, path: &str) -> usize {
        self.state.lock().unwrap().hits.get(path).copied().unwrap_or(0)
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(path) = read_request_path(&mut stream) else {
        return;
    };

    let (route, hit) = {
        let mut st = state.lock().unwrap();
        let hit = {
            let count = st.hits.entry(path.clone()).or_insert(0);
            *count += 1;
            *count
        };
        (st.routes.get(&path).cloned(), hit)
    };
    let route = route.unwrap_or_else(|| Route::status(404));

    if let Some(delay) = route.delay {
        thread::sleep(delay);
    }
    if hit <= route.drop_first {
        // Empty reply: curl reports CURLE_GOT_NOTHING.
        return;
    }

    let sent = route.cut_body_at.unwrap_or(route.body.len()).min(route.body.len());
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        route.status,
        reason(route.status),
        route.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&route.body[..sent]);
    let _ = stream.flush();
}

/// Read up to the end of the request head and return the request path.
fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 || buf.len() > 64 * 1024 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = std::str::from_utf8(&buf).ok()?;
    let line = head.lines().next()?;
    let mut parts = line.split_whitespace();
    let _method = parts.next()?;
    parts.next().map(str::to_string)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
