//! Blocking fixture server for integration tests.
//!
//! One request per connection, GET only. Routes match when every needle is a
//! substring of the request target (path plus query). First match wins;
//! anything unmatched gets a 404.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use glean::pacing::Sleeper;

const MAX_HEADER_SIZE: usize = 32 * 1024;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

struct Route {
    needles: Vec<String>,
    status: u16,
    body: String,
}

#[derive(Default)]
pub struct FixtureBuilder {
    routes: Vec<Route>,
}

impl FixtureBuilder {
    pub fn route(mut self, needles: &[&str], status: u16, body: impl Into<String>) -> Self {
        self.routes.push(Route {
            needles: needles.iter().map(|n| n.to_string()).collect(),
            status,
            body: body.into(),
        });
        self
    }

    pub fn start(self) -> FixtureServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture server");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(self.routes);

        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                serve(stream, &routes, &seen);
            }
        });

        FixtureServer {
            base_url: format!("http://127.0.0.1:{}", port),
            requests,
        }
    }
}

pub struct FixtureServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FixtureServer {
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::default()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Request targets containing `needle`, in arrival order.
    pub fn targets_matching(&self, needle: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.target)
            .filter(|t| t.contains(needle))
            .collect()
    }
}

fn serve(mut stream: TcpStream, routes: &[Route], seen: &Mutex<Vec<RecordedRequest>>) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    let (status, body) = routes
        .iter()
        .find(|r| r.needles.iter().all(|n| request.target.contains(n.as_str())))
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, r#"{"message":"404 Not Found"}"#.to_string()));

    seen.lock().unwrap().push(request);

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body.as_bytes());
    let _ = stream.flush();
}

fn read_request(stream: &mut impl Read) -> Option<RecordedRequest> {
    let mut buf = Vec::with_capacity(1024);
    let mut byte = [0u8; 1];
    while !buf.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(0) | Err(_) => return None,
            Ok(_) => buf.push(byte[0]),
        }
        if buf.len() > MAX_HEADER_SIZE {
            return None;
        }
    }

    let mut headers = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut headers);
    match req.parse(&buf) {
        Ok(httparse::Status::Complete(_)) => {}
        _ => return None,
    }

    Some(RecordedRequest {
        target: req.path.unwrap_or("/").to_string(),
        headers: req
            .headers
            .iter()
            .map(|h| (h.name.to_string(), String::from_utf8_lossy(h.value).to_string()))
            .collect(),
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Records pauses instead of taking them.
#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn pauses(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

/// One raw issue as upstream lists it.
pub fn raw_issue(iid: u64, labels: &[&str], notes: u64) -> serde_json::Value {
    serde_json::json!({
        "id": 5000 + iid,
        "iid": iid,
        "title": format!("Issue {}", iid),
        "description": format!("Body of issue {}", iid),
        "state": "opened",
        "created_at": format!("2024-02-{:02}T12:00:00.000Z", (iid % 28) + 1),
        "updated_at": "2024-03-01T08:00:00.000Z",
        "labels": labels,
        "author": { "id": 1, "name": "Rae Doe", "username": "rae" },
        "assignees": [],
        "user_notes_count": notes,
        "upvotes": 0,
        "downvotes": 0,
        "merge_requests_count": 0,
        "web_url": format!("https://gitlab.example/g/p/-/issues/{}", iid),
        "confidential": false
    })
}

/// JSON array body for issues `range`.
pub fn page_body(range: std::ops::Range<u64>) -> String {
    let items: Vec<_> = range.map(|iid| raw_issue(iid, &[], 0)).collect();
    serde_json::Value::Array(items).to_string()
}
