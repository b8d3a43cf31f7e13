//! Artworks HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One request per
//! page: `GET {api_base}/artworks?page={n}&limit={size}`.

use std::thread;
use std::time::Duration;

use pagesel_engine::{FetchError, PageResponse, PageSource};

use crate::artwork::Artwork;

const USER_AGENT: &str = concat!("pagesel/", env!("CARGO_PKG_VERSION"));

/// Connection options for [`ArticClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_base: String,
    pub timeout: Duration,
    /// Retries after the first attempt for 429, 5xx and network errors.
    pub max_retries: u32,
    /// First backoff delay; doubles after each retry.
    pub initial_backoff: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_base: "https://api.artic.edu/api/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

/// Artworks API client (blocking).
#[derive(Clone)]
pub struct ArticClient {
    http: reqwest::blocking::Client,
    api_base: String,
    max_retries: u32,
    initial_backoff: Duration,
}

#[derive(serde::Deserialize)]
struct ArtworksResponse {
    data: Vec<Artwork>,
    pagination: Pagination,
}

#[derive(serde::Deserialize)]
struct Pagination {
    total: usize,
}

impl ArticClient {
    pub fn new(opts: ClientOptions) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(opts.timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: opts.api_base.trim_end_matches('/').to_string(),
            max_retries: opts.max_retries,
            initial_backoff: opts.initial_backoff,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Fetch one page of artworks (1-based).
    pub fn fetch_artworks(&self, page: usize, limit: usize) -> Result<PageResponse<Artwork>, FetchError> {
        let url = format!("{}/artworks", self.api_base);
        let text = self.get_with_retry(|http| {
            http.get(&url).query(&[
                ("page", page.to_string()),
                ("limit", limit.to_string()),
            ])
        })?;

        let body: ArtworksResponse = serde_json::from_str(&text).map_err(|e| {
            FetchError::Parse(format!(
                "unexpected artworks response: {} (body: {})",
                e,
                &text[..floor_char_boundary(&text, 200)],
            ))
        })?;

        Ok(PageResponse {
            items: body.data,
            total: body.pagination.total,
        })
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// GET with retry + exponential backoff. Returns the response body.
    fn get_with_retry(
        &self,
        build_request: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<String, FetchError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            let result = build_request(&self.http).send();

            let retry_after = match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    if resp.status().is_success() {
                        return resp.text().map_err(|e| FetchError::Network(e.to_string()));
                    }

                    let retryable = status == 429 || status >= 500;
                    let wait = if status == 429 {
                        resp.headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .map(Duration::from_secs)
                    } else {
                        None
                    };
                    let body = resp.text().unwrap_or_default();

                    if !retryable || attempt >= self.max_retries {
                        return Err(FetchError::Http(status, body));
                    }
                    log::warn!(
                        "retry {}/{} (HTTP {})",
                        attempt + 1,
                        self.max_retries,
                        status,
                    );
                    wait
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(FetchError::Network(e.to_string()));
                    }
                    log::warn!("retry {}/{} ({})", attempt + 1, self.max_retries, e);
                    None
                }
            };

            thread::sleep(retry_after.unwrap_or(backoff));
            backoff *= 2;
            attempt += 1;
        }
    }
}

impl PageSource<Artwork> for ArticClient {
    fn fetch_page(&self, page: usize, page_size: usize) -> Result<PageResponse<Artwork>, FetchError> {
        self.fetch_artworks(page, page_size)
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer, max_retries: u32) -> ArticClient {
        ArticClient::new(ClientOptions {
            api_base: format!("{}/api/v1/", server.base_url()),
            timeout: Duration::from_secs(5),
            max_retries,
            initial_backoff: Duration::from_millis(0),
        })
        .unwrap()
    }

    fn artworks_body(ids: &[u64], total: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "title": format!("Artwork {}", id),
                    "place_of_origin": "France",
                    "artist_display": "Unknown",
                    "inscriptions": null,
                    "date_start": 1890,
                    "date_end": 1891
                })
            })
            .collect();
        serde_json::json!({
            "pagination": { "total": total, "limit": ids.len(), "current_page": 1 },
            "data": data
        })
    }

    #[test]
    fn test_fetch_page_query_params() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v1/artworks")
                .query_param("page", "3")
                .query_param("limit", "12");
            then.status(200).json_body(artworks_body(&[101, 102], 126_000));
        });

        let page = client(&server, 0).fetch_page(3, 12).unwrap();
        mock.assert();
        assert_eq!(page.total, 126_000);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id, 101);
        assert_eq!(page.items[1].title.as_deref(), Some("Artwork 102"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let server = MockServer::start();
        let c = client(&server, 0);
        assert!(c.api_base().ends_with("/api/v1"));
    }

    #[test]
    fn test_not_found_fails_without_retry() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/artworks");
            then.status(404).body("no such page");
        });

        let err = client(&server, 3).fetch_page(1, 12).unwrap_err();
        assert_eq!(err, FetchError::Http(404, "no such page".into()));
        mock.assert_calls(1);
    }

    #[test]
    fn test_server_error_is_retried_then_fails() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/v1/artworks");
            then.status(503).body("busy");
        });

        let err = client(&server, 2).fetch_page(1, 12).unwrap_err();
        assert_eq!(err, FetchError::Http(503, "busy".into()));
        mock.assert_calls(3);
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/v1/artworks");
            then.status(200).json_body(serde_json::json!({ "data": "nope" }));
        });

        let err = client(&server, 0).fetch_page(1, 12).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)), "got {:?}", err);
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        let c = ArticClient::new(ClientOptions {
            api_base: "http://127.0.0.1:1".into(),
            timeout: Duration::from_secs(2),
            max_retries: 0,
            initial_backoff: Duration::from_millis(0),
        })
        .unwrap();
        assert!(matches!(c.fetch_page(1, 12), Err(FetchError::Network(_))));
    }

    #[test]
    fn test_floor_char_boundary() {
        assert_eq!(floor_char_boundary("abc", 200), 3);
        let s = "é".repeat(150);
        let idx = floor_char_boundary(&s, 201);
        assert!(s.is_char_boundary(idx));
        assert_eq!(idx, 200);
    }
}
