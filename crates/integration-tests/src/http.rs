//! Local HTTP stub for exercising the Supabase backends over real sockets.
//!
//! Each route answers a fixed status and body; unmatched paths get a `404`.
//! Every request is recorded so tests can assert on method, path, query,
//! headers and body.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use cyberguard_client::ClientConfig;
use cyberguard_client::supabase::SupabaseClient;

use crate::lock;

/// Anon key the stubbed client is configured with.
pub const ANON_KEY: &str = "stub-anon-key";

/// A canned answer for one path.
#[derive(Debug, Clone)]
pub struct StubRoute {
    path: String,
    status: u16,
    body: String,
}

impl StubRoute {
    /// Answer requests for `path` (query excluded) with `status` and `body`.
    #[must_use]
    pub fn new(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status,
            body: body.into(),
        }
    }
}

/// A request received by a [`StubServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    /// Value of header `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Body parsed as JSON, `Null` when it is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

/// HTTP/1.1 server on a random local port.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    /// Start serving `routes`.
    ///
    /// # Errors
    ///
    /// Returns the bind error.
    pub async fn start(routes: impl IntoIterator<Item = StubRoute>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let routes: Arc<Vec<StubRoute>> = Arc::new(routes.into_iter().collect());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(serve(stream, routes, recorded));
            }
        });

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    /// Start serving a single route.
    ///
    /// # Errors
    ///
    /// Returns the bind error.
    pub async fn single(
        path: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> std::io::Result<Self> {
        Self::start([StubRoute::new(path, status, body)]).await
    }

    /// Base URL of the server.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A Supabase client pointed at this server.
    ///
    /// # Errors
    ///
    /// Returns the configuration error for an unusable base URL.
    pub fn client(&self) -> Result<SupabaseClient, cyberguard_client::ConfigError> {
        let config = ClientConfig::new(&self.url(), SecretString::from(ANON_KEY))?;
        Ok(SupabaseClient::new(&config))
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: Arc<Vec<StubRoute>>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Ok(request) = read_request(&mut stream).await else {
        return;
    };

    let (status, body) = routes
        .iter()
        .find(|route| route.path == request.path)
        .map_or((404, String::new()), |route| {
            (route.status, route.body.clone())
        });
    lock(&recorded).push(request);

    let response = format!(
        "HTTP/1.1 {status} Stub\r\n\
         content-type: application/json\r\n\
         content-length: {}\r\n\
         connection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<RecordedRequest> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default();
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (target.to_owned(), None),
    };

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
        }
    }

    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await?;

    Ok(RecordedRequest {
        method,
        path,
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
