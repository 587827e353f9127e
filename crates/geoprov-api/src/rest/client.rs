// GeoServer REST/OWS HTTP client
//
// Wraps `reqwest::Client` with GeoServer URL construction, Basic auth on
// every request, and status checking. Endpoint groups (workspaces,
// datastores, feature types, uploads, OWS export) are implemented as inherent
// methods in sibling files to keep this module focused on transport mechanics.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use reqwest::header::CONTENT_LENGTH;
use serde::Serialize;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Server-side directory prefix used when pointing a shapefile store at a
/// path inside GeoServer's data directory.
pub const DEFAULT_DATA_DIR: &str = "data_dir";

/// Raw HTTP client for a GeoServer instance.
///
/// `base_url` is the web application root (e.g. `http://host:8080/geoserver`);
/// REST calls go to `{base}/rest/...` and WFS exports to `{base}/ows`.
pub struct GeoServerClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    data_dir: String,
    timeout: Duration,
    cancel: Option<CancellationToken>,
}

impl GeoServerClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let mut client = Self::with_client(http, base_url, credentials)?;
        client.timeout = transport.timeout;
        Ok(client)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: Credentials,
    ) -> Result<Self, Error> {
        if base_url.cannot_be_a_base() {
            return Err(Error::CannotBeABase {
                url: base_url.to_string(),
            });
        }
        Ok(Self {
            http,
            base_url,
            credentials,
            data_dir: DEFAULT_DATA_DIR.to_owned(),
            timeout: TransportConfig::default().timeout,
            cancel: None,
        })
    }

    /// Override the server-side data directory prefix used in store URLs.
    pub fn with_data_dir(mut self, data_dir: impl Into<String>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Abort in-flight requests and downloads once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The GeoServer web application root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    pub fn data_dir(&self) -> &str {
        &self.data_dir
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/rest/{segments...}`, percent-encoding each segment.
    pub(crate) fn rest_url(&self, segments: &[&str]) -> Result<Url, Error> {
        self.endpoint_url("rest", segments)
    }

    /// Build `{base}/ows`.
    pub(crate) fn ows_url(&self) -> Result<Url, Error> {
        self.endpoint_url("ows", &[])
    }

    fn endpoint_url(&self, root: &str, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::CannotBeABase {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .push(root)
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Run `fut` unless the cancellation token fires first.
    pub(crate) async fn cancellable<F: Future>(&self, fut: F) -> Result<F::Output, Error> {
        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => Err(Error::Cancelled),
                out = fut => Ok(out),
            },
            None => Ok(fut.await),
        }
    }

    /// Attach credentials and send, mapping transport failures.
    pub(crate) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        let request = self.credentials.apply(builder);
        self.cancellable(request.send())
            .await?
            .map_err(|e| self.transport_error(e))
    }

    pub(crate) fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    /// `GET url` and report whether the resource exists.
    ///
    /// 2xx means present, 404 means absent; anything else is a rejection.
    pub(crate) async fn exists(&self, url: Url) -> Result<bool, Error> {
        debug!("GET {}", url);
        let resp = self.send(self.http.get(url.clone())).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Err(rejection(resp, &url).await)
    }

    /// Send a POST request with JSON body, requiring a success status.
    pub(crate) async fn post_json(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("POST {}", url);
        let resp = self.send(self.http.post(url.clone()).json(body)).await?;
        ensure_success(resp, &url).await.map(drop)
    }

    /// Stream a local file as the body of a PUT request, requiring a
    /// success status.
    ///
    /// The file is read chunk by chunk; `Content-Length` comes from its
    /// metadata.
    pub(crate) async fn put_file(&self, url: Url, path: &Path) -> Result<u64, Error> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(Error::io(path))?;
        let len = file.metadata().await.map_err(Error::io(path))?.len();
        debug!("PUT {} ({} bytes from {})", url, len, path.display());

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let request = self
            .http
            .put(url.clone())
            .header(CONTENT_LENGTH, len)
            .body(body);
        let resp = self.send(request).await?;
        ensure_success(resp, &url).await?;
        Ok(len)
    }
}

/// Pass a success response through; turn anything else into `Error::Rejected`.
pub(crate) async fn ensure_success(
    resp: reqwest::Response,
    url: &Url,
) -> Result<reqwest::Response, Error> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(rejection(resp, url).await)
    }
}

async fn rejection(resp: reqwest::Response, url: &Url) -> Error {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message: String = body.trim().chars().take(200).collect();
    Error::Rejected {
        status,
        url: url.to_string(),
        message,
    }
}

/// Reject an empty identifier before any request is built.
pub(crate) fn require(field: &'static str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        Err(Error::EmptyIdentifier { field })
    } else {
        Ok(())
    }
}
