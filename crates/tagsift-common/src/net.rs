//! Document retrieval for tagsift.
//!
//! Provides simple blocking loaders used by the command-line front end to get
//! raw markup into the parser: local files, `http(s)://` URLs and `data:` URLs.
//! None of this is part of the parser or query contract; it only hands text
//! over to them.
use std::fs;
use std::path::Path;
use std::time::Duration;

use base64::Engine;
use thiserror::Error;

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("tagsift/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for document retrieval.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {source}")]
    Request {
        /// URL that was requested.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP error {status} for {url}")]
    Status {
        /// URL that was requested.
        url: String,
        /// Status code returned by the server.
        status: reqwest::StatusCode,
    },

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// A `data:` URL was malformed or used an unsupported encoding.
    #[error("invalid data URL: {0}")]
    DataUrl(String),

    /// A local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// A parsed `data:` URL that can be decoded into raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataURL {
    /// The full raw `data:` URL string (e.g. `data:text/html;base64,...`).
    pub raw_data: String,
}

impl DataURL {
    /// Create a new `DataURL` from a raw data URL string.
    #[must_use]
    pub const fn new(raw_data: String) -> Self {
        Self { raw_data }
    }

    /// The media type declared before the payload, e.g. `text/html`.
    ///
    /// Returns `None` when the URL has no comma separating metadata from data.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        let data_url = self.raw_data.trim_start_matches("data:");
        let metadata = &data_url[..data_url.find(',')?];
        Some(metadata.split(';').next().unwrap_or_default())
    }

    /// Decode the data URL payload into raw bytes.
    ///
    /// Supports base64 payloads and percent-encoded payloads.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::DataUrl`] if the comma separator is missing or
    /// the payload cannot be decoded.
    pub fn decode(&self) -> Result<Vec<u8>, FetchError> {
        let data_url = self.raw_data.trim_start_matches("data:");
        let Some((metadata, data)) = data_url.split_once(',') else {
            return Err(FetchError::DataUrl("missing comma".to_string()));
        };

        if metadata.ends_with(";base64") {
            base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| FetchError::DataUrl(format!("base64 decode error: {e}")))
        } else {
            percent_decode(data)
        }
    }
}

/// Decode `%XX` escapes; every other byte is copied through.
fn percent_decode(data: &str) -> Result<Vec<u8>, FetchError> {
    let bytes = data.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = data
                .get(i + 1..i + 3)
                .ok_or_else(|| FetchError::DataUrl("truncated percent escape".to_string()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| FetchError::DataUrl(format!("bad percent escape %{hex}")))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Fetch a URL and return its body as text.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created, the request
/// fails, the response has a non-success status, or the body cannot be decoded.
pub fn fetch_text(url: &str) -> Result<String, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(FetchError::Client)?;

    tracing::debug!(url = url, "fetching document");
    let response = client
        .get(url)
        .send()
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response.text().map_err(FetchError::Body)
}

/// Decode a `data:` URL and return its payload as text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, matching how
/// the parser treats any other malformed input.
///
/// # Errors
///
/// Returns an error if the data URL cannot be decoded.
pub fn fetch_text_from_data_url(url: &str) -> Result<String, FetchError> {
    let bytes = DataURL::new(url.to_string()).decode()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Load a document from a URL (`http://`, `https://`, `data:`) or a file path.
///
/// # Errors
///
/// Returns an error if the document cannot be retrieved.
pub fn load_source(source: &str) -> Result<String, FetchError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_text(source)
    } else if source.starts_with("data:") {
        fetch_text_from_data_url(source)
    } else {
        let path = source.strip_prefix("file://").unwrap_or(source);
        read_file(Path::new(path))
    }
}

/// Read a local file as text, replacing invalid UTF-8.
fn read_file(path: &Path) -> Result<String, FetchError> {
    let bytes = fs::read(path).map_err(|source| FetchError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
