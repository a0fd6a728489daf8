//! HTTP implementation of the remote store

use crate::protocol::{
    parse_list_response, ListRequest, RemoveRequest, HASH_HEADER, LIST_ENDPOINT, PATH_HEADER,
    REMOVE_ENDPOINT, SITE_HEADER, TOKEN_HEADER, UPLOAD_ENDPOINT,
};
use async_trait::async_trait;
use pubsync_config::RemoteConfig;
use pubsync_types::{
    AccessToken, Credentials, Error, Fingerprint, Manifest, RemoteStore, Result, TimeoutConfig,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

/// Longest response body excerpt carried in an error message
const MAX_BODY_EXCERPT: usize = 200;

/// Remote store backed by the publishing HTTP API
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    http: Client,
    base_url: String,
}

impl HttpRemoteStore {
    /// Create a client for the API under `base_url`
    pub fn new(base_url: &str, timeouts: &TimeoutConfig, user_agent: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::config(
                "Remote base URL must start with http:// or https://",
            ));
        }

        let http = Client::builder()
            .timeout(timeouts.request_timeout)
            .connect_timeout(timeouts.connect_timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    /// Create a client from the `remote` configuration section
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.timeouts, &config.user_agent)
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self, credentials: &Credentials) -> Result<Manifest> {
        let url = self.endpoint(LIST_ENDPOINT);
        debug!(url = %url, "Listing remote files");

        let response = self
            .http
            .post(&url)
            .json(&ListRequest {
                id: credentials.site(),
                token: credentials.token().expose(),
            })
            .send()
            .await
            .map_err(request_error)?;

        let response = check_status(response, credentials.token(), false).await?;
        let body = response.bytes().await.map_err(request_error)?;
        parse_list_response(&body)
    }

    async fn upload(
        &self,
        credentials: &Credentials,
        path: &str,
        bytes: Vec<u8>,
        fingerprint: &Fingerprint,
    ) -> Result<()> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        insert_header(&mut headers, HASH_HEADER, &fingerprint.to_hex(), false)?;
        insert_header(&mut headers, SITE_HEADER, credentials.site(), false)?;
        insert_header(&mut headers, PATH_HEADER, path, false)?;
        insert_header(&mut headers, TOKEN_HEADER, credentials.token().expose(), true)?;

        let url = self.endpoint(UPLOAD_ENDPOINT);
        debug!(url = %url, path = %path, size = bytes.len(), "Uploading file");

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(request_error)?;

        check_status(response, credentials.token(), false).await?;
        Ok(())
    }

    async fn remove(&self, credentials: &Credentials, path: &str) -> Result<()> {
        let url = self.endpoint(REMOVE_ENDPOINT);
        debug!(url = %url, path = %path, "Removing file");

        let response = self
            .http
            .post(&url)
            .json(&RemoveRequest {
                id: credentials.site(),
                path,
                token: credentials.token().expose(),
            })
            .send()
            .await
            .map_err(request_error)?;

        // Already gone counts as removed.
        check_status(response, credentials.token(), true).await?;
        Ok(())
    }
}

/// Add a header whose value is sent as raw UTF-8
fn insert_header(
    headers: &mut HeaderMap,
    name: &'static str,
    value: &str,
    sensitive: bool,
) -> Result<()> {
    let mut header_value = HeaderValue::from_bytes(value.as_bytes()).map_err(|_| {
        Error::protocol(format!(
            "Value for header '{}' contains characters that cannot be sent",
            name
        ))
    })?;
    header_value.set_sensitive(sensitive);
    headers.insert(HeaderName::from_static(name), header_value);
    Ok(())
}

/// Map a failed request to a transport or protocol error
fn request_error(error: reqwest::Error) -> Error {
    if error.is_decode() {
        Error::protocol(format!("Undecodable response: {}", error))
    } else {
        Error::transport(error.to_string())
    }
}

/// Turn non-success statuses into errors
///
/// The access token is redacted from the body excerpt.
async fn check_status(
    response: Response,
    token: &AccessToken,
    not_found_ok: bool,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() || (not_found_ok && status == StatusCode::NOT_FOUND) {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let body = token.redact(&body);
    let excerpt = excerpt(&body);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::auth(format!(
            "Remote store rejected the credentials ({}): {}",
            status, excerpt
        ))),
        _ => Err(Error::protocol(format!(
            "Unexpected status {}: {}",
            status, excerpt
        ))),
    }
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    if body.len() <= MAX_BODY_EXCERPT {
        return body;
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pubsync_types::ErrorKind;

    #[test]
    fn test_rejects_non_http_base_url() {
        let timeouts = TimeoutConfig::default();
        let error = HttpRemoteStore::new("ftp://example.com", &timeouts, "test").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let timeouts = TimeoutConfig::default();
        let store = HttpRemoteStore::new("https://example.com/", &timeouts, "test").unwrap();
        assert_eq!(store.base_url(), "https://example.com");
        assert_eq!(store.endpoint(LIST_ENDPOINT), "https://example.com/api/list");
    }

    #[test]
    fn test_from_default_config() {
        let store = HttpRemoteStore::from_config(&RemoteConfig::default()).unwrap();
        assert_eq!(store.base_url(), pubsync_config::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_control_character_header_is_rejected() {
        let mut headers = HeaderMap::new();
        let error = insert_header(&mut headers, PATH_HEADER, "a\nb.md", false).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Protocol);
        assert!(headers.is_empty());

        insert_header(&mut headers, PATH_HEADER, "notes/café.md", false).unwrap();
        assert_eq!(
            headers.get(PATH_HEADER).unwrap().as_bytes(),
            "notes/café.md".as_bytes()
        );
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(150);
        let cut = excerpt(&body);
        assert!(cut.len() <= MAX_BODY_EXCERPT);
        assert!(body.starts_with(cut));
        assert_eq!(excerpt("  short  "), "short");
    }
}
