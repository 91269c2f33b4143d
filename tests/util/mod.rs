use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use patchy::api::{ApiError, ApiOp, SearchApi};
use patchy::model::SearchResult;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Captures tracing output for tests.
#[allow(dead_code)]
pub struct TestTracing {
    buffer: std::sync::Arc<Mutex<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestTracing {
    pub fn new() -> Self {
        Self {
            buffer: std::sync::Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.buffer.clone();
        let make_writer = move || TestWriter(writer.clone());
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(make_writer)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).to_string()
    }

    /// Assert that the captured log output contains the provided substring.
    pub fn assert_contains(&self, needle: &str) {
        let out = self.output();
        assert!(
            out.contains(needle),
            "expected logs to contain `{needle}`, got:\n{out}"
        );
    }
}

struct TestWriter(std::sync::Arc<Mutex<Vec<u8>>>);

impl std::io::Write for TestWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[allow(dead_code)]
pub fn hit(id: &str, text: &str) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        text: text.to_string(),
        url: format!("https://lore.example/{id}"),
    }
}

/// Scripted outcome of one search: latency, then hits or an HTTP status.
#[derive(Clone)]
#[allow(dead_code)]
pub struct Scripted {
    pub delay: Duration,
    pub outcome: Result<Vec<SearchResult>, u16>,
}

/// In-memory [`SearchApi`] that records every call.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    searches: Mutex<HashMap<String, Scripted>>,
    results: Mutex<HashMap<String, SearchResult>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, query: &str, delay_ms: u64, hits: Vec<SearchResult>) {
        self.searches.lock().insert(
            query.to_string(),
            Scripted {
                delay: Duration::from_millis(delay_ms),
                outcome: Ok(hits),
            },
        );
    }

    pub fn fail(&self, query: &str, status: u16) {
        self.searches.lock().insert(
            query.to_string(),
            Scripted {
                delay: Duration::ZERO,
                outcome: Err(status),
            },
        );
    }

    pub fn store(&self, result: SearchResult) {
        self.results.lock().insert(result.id.clone(), result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl SearchApi for FakeApi {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        self.calls.lock().push(format!("search:{query}"));
        let scripted = self.searches.lock().get(query).cloned();
        let Some(scripted) = scripted else {
            return Ok(Vec::new());
        };
        tokio::time::sleep(scripted.delay).await;
        scripted.outcome.map_err(|status| ApiError::Status {
            op: ApiOp::Search,
            status,
        })
    }

    async fn get_result(&self, id: &str) -> Result<SearchResult, ApiError> {
        self.calls.lock().push(format!("result:{id}"));
        let found = self.results.lock().get(id).cloned();
        found.ok_or_else(|| ApiError::NotFound { id: id.to_string() })
    }
}

/// A canned HTTP response for [`StubServer`].
#[allow(dead_code)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

/// One-connection-per-response HTTP stub. Records request lines.
#[allow(dead_code)]
pub struct StubServer {
    pub base: String,
    requests: std::sync::Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl StubServer {
    /// Serve `responses` in order, one per connection.
    pub async fn start(responses: Vec<StubResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = std::sync::Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                if let Some(line) = head.lines().next() {
                    seen.lock().push(line.to_string());
                }
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    response.status,
                    response.body.len(),
                    response.body
                );
                let _ = stream.write_all(reply.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self {
            base: format!("http://{addr}/api"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}
