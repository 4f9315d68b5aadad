//! HTTP tile fetcher backed by reqwest.

use super::discard_partial;
use super::types::{FetchError, TileFetcher};
use crate::coord::BoundingBox;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace, warn};

/// Default map API endpoint (OpenStreetMap editing API, `map` call).
pub const DEFAULT_ENDPOINT: &str = "https://www.openstreetmap.org/api/0.6/map";

/// Default User-Agent string.
///
/// The OpenStreetMap API asks clients to identify themselves.
pub const DEFAULT_USER_AGENT: &str = concat!("osmgrid/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

/// Decimal places used when embedding coordinates in the request URL.
pub const COORDINATE_PRECISION: usize = 6;

/// Builds the request URL for a bounding box.
///
/// Coordinates are embedded as `bbox=<west>,<south>,<east>,<north>`.
///
/// # Example
///
/// ```
/// use osmgrid::coord::BoundingBox;
/// use osmgrid::provider::map_url;
///
/// let url = map_url("https://api.example.com/map", &BoundingBox::new(1.0, 0.0, 0.5, 0.0));
/// assert_eq!(url, "https://api.example.com/map?bbox=0.000000,0.000000,0.500000,1.000000");
/// ```
pub fn map_url(endpoint: &str, bbox: &BoundingBox) -> String {
    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!(
        "{endpoint}{separator}bbox={west:.p$},{south:.p$},{east:.p$},{north:.p$}",
        west = bbox.west,
        south = bbox.south,
        east = bbox.east,
        north = bbox.north,
        p = COORDINATE_PRECISION,
    )
}

/// Tile fetcher that downloads map data over HTTP.
///
/// The response body is streamed straight into the destination file, so a
/// tile's payload is never held in memory as a whole.
#[derive(Clone)]
pub struct HttpTileFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTileFetcher {
    /// Creates a fetcher for `endpoint` with the default timeout and User-Agent.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_options(
            endpoint,
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            DEFAULT_USER_AGENT,
        )
    }

    /// Creates a fetcher with a custom request timeout and User-Agent.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::ClientInit` if the HTTP client cannot be built.
    pub fn with_options(
        endpoint: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::ClientInit(e.to_string()))?;

        Ok(Self::from_client(client, endpoint))
    }

    /// Creates a fetcher around an already configured client.
    pub fn from_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// The base endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Request URL for `bbox`.
    pub fn url_for(&self, bbox: &BoundingBox) -> String {
        map_url(&self.endpoint, bbox)
    }

    /// Sends the request and streams the body into `file`.
    async fn download_into(
        &self,
        url: &str,
        file: &mut File,
        destination: &Path,
    ) -> Result<u64, FetchError> {
        let mut response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(url = url, status = resp.status().as_u16(), "HTTP response received");
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(FetchError::Transfer(e.to_string()));
            }
        };

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let write_error = |e: std::io::Error| FetchError::Write {
            path: destination.to_path_buf(),
            reason: e.to_string(),
        };

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transfer(format!("Failed to read response: {}", e)))?
        {
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_error)?;

        trace!(url = url, bytes = written, "HTTP response body written");
        Ok(written)
    }
}

impl TileFetcher for HttpTileFetcher {
    async fn fetch(&self, bbox: &BoundingBox, destination: &Path) -> Result<u64, FetchError> {
        let url = self.url_for(bbox);
        trace!(url = %url, destination = %destination.display(), "Fetching tile");

        let mut file = File::create(destination)
            .await
            .map_err(|e| FetchError::FileOpen {
                path: destination.to_path_buf(),
                reason: e.to_string(),
            })?;

        let result = self.download_into(&url, &mut file, destination).await;
        drop(file);

        if result.is_err() {
            discard_partial(destination).await;
        }
        result
    }

    fn name(&self) -> &str {
        "HTTP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serves one canned HTTP response and returns the request line received.
    async fn serve_once(status: &'static str, body: &'static [u8]) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.unwrap();

            let text = String::from_utf8_lossy(&request).to_string();
            text.lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}/api/0.6/map", addr), handle)
    }

    fn test_fetcher(endpoint: &str) -> HttpTileFetcher {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpTileFetcher::from_client(client, endpoint)
    }

    #[test]
    fn test_map_url_order_is_west_south_east_north() {
        let bbox = BoundingBox::new(40.6920, 40.6881, -74.0423, -74.0485);
        assert_eq!(
            map_url(DEFAULT_ENDPOINT, &bbox),
            "https://www.openstreetmap.org/api/0.6/map?bbox=-74.048500,40.688100,-74.042300,40.692000"
        );
    }

    #[test]
    fn test_map_url_appends_to_existing_query() {
        let bbox = BoundingBox::new(1.0, 0.0, 1.0, 0.0);
        assert_eq!(
            map_url("http://localhost/map?format=xml", &bbox),
            "http://localhost/map?format=xml&bbox=0.000000,0.000000,1.000000,1.000000"
        );
    }

    #[test]
    fn test_new_uses_endpoint() {
        let fetcher = HttpTileFetcher::new(DEFAULT_ENDPOINT).unwrap();
        assert_eq!(fetcher.endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(fetcher.name(), "HTTP");
    }

    #[tokio::test]
    async fn test_fetch_streams_body_to_file() {
        const BODY: &[u8] = b"<osm version=\"0.6\"></osm>";
        let (endpoint, server) = serve_once("200 OK", BODY).await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("tile_0.osm");
        std::fs::write(&dest, "stale content that is longer than the payload").unwrap();

        let fetcher = test_fetcher(&endpoint);
        let bbox = BoundingBox::new(1.0, 0.0, 0.5, 0.0);
        let written = fetcher.fetch(&bbox, &dest).await.unwrap();

        assert_eq!(written, BODY.len() as u64);
        assert_eq!(
            std::fs::read_to_string(&dest).unwrap(),
            "<osm version=\"0.6\"></osm>"
        );

        let request_line = server.await.unwrap();
        assert_eq!(
            request_line,
            "GET /api/0.6/map?bbox=0.000000,0.000000,0.500000,1.000000 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_fetch_error_status_leaves_empty_file() {
        let (endpoint, server) = serve_once("509 Bandwidth Limit Exceeded", b"slow down").await;
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("tile_1.osm");

        let fetcher = test_fetcher(&endpoint);
        let result = fetcher
            .fetch(&BoundingBox::new(1.0, 0.0, 1.0, 0.0), &dest)
            .await;

        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 509, .. })
        ));
        assert!(dest.exists());
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transfer_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("tile_0.osm");
        let fetcher = test_fetcher(&format!("http://{}/map", addr));

        let result = fetcher
            .fetch(&BoundingBox::new(1.0, 0.0, 1.0, 0.0), &dest)
            .await;

        assert!(matches!(result, Err(FetchError::Transfer(_))));
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_fetch_unwritable_destination_is_file_open_error() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing-dir").join("tile_0.osm");
        let fetcher = test_fetcher("http://127.0.0.1:9/map");

        let result = fetcher
            .fetch(&BoundingBox::new(1.0, 0.0, 1.0, 0.0), &dest)
            .await;

        assert!(matches!(result, Err(FetchError::FileOpen { .. })));
        assert!(!dest.exists());
    }

    #[test]
    fn test_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTileFetcher>();
    }
}
