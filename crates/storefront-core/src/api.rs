// HTTP client for the marketplace backend (`/purchase`, `/sell`, `/items/{id}`).
//
// The client reports what the server said and nothing more: the status code
// and, when the body is a JSON reply, its parsed form. Deciding whether that
// counts as success is the executor's job.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::context::ItemRecord;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Purchase,
    Sell,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Purchase => "purchase",
            Endpoint::Sell => "sell",
        }
    }
}

/// Body of a purchase/sell response: `{"status": "ok"|..., "message": ...}`.
///
/// Only string values count; a field of any other type reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiReply {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl ApiReply {
    /// Read a reply out of a response body. `None` when the body is not JSON.
    pub fn from_body(body: &str) -> Option<ApiReply> {
        let value = serde_json::from_str::<Value>(body).ok()?;
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Some(ApiReply {
            status: text("status"),
            message: text("message"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// `None` when the body was not a JSON reply.
    pub reply: Option<ApiReply>,
}

impl ApiResponse {
    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },
}

// ---------------------------------------------------------------------------
// MarketApi
// ---------------------------------------------------------------------------

#[async_trait]
pub trait MarketApi: Send + Sync {
    /// POST a JSON body to a submission endpoint.
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<ApiResponse, ApiError>;

    /// GET the item record used by the fetch-based buy page.
    async fn fetch_item(&self, item_id: &str) -> Result<ItemRecord, ApiError>;
}

/// Resolve the configured base URL. Absolute URLs are used as-is; relative
/// ones (`/api`) are resolved against the page origin.
pub fn resolve_base_url(base_url: &str, page_origin: &str) -> Result<Url, ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let url = match Url::parse(base_url) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let origin = Url::parse(page_origin)
                .map_err(|e| invalid(format!("page origin `{page_origin}`: {e}")))?;
            origin.join(base_url).map_err(|e| invalid(e.to_string()))?
        }
        Err(e) => return Err(invalid(e.to_string())),
    };

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid(format!("unsupported URL `{url}`")));
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// HttpMarketApi
// ---------------------------------------------------------------------------

pub struct HttpMarketApi {
    http: reqwest::Client,
    base: Url,
}

impl HttpMarketApi {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpMarketApi { http, base })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let base = resolve_base_url(&config.base_url, &config.page_origin)?;
        Self::new(base, Duration::from_secs(config.request_timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base, tolerating a trailing slash.
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl MarketApi for HttpMarketApi {
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&[endpoint.path()]);
        debug!(%url, "POST submission");

        let response = self.http.post(url).json(&body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let reply = ApiReply::from_body(&text);
        if reply.is_none() {
            warn!(status, "response body is not JSON");
        }
        Ok(ApiResponse { status, reply })
    }

    async fn fetch_item(&self, item_id: &str) -> Result<ItemRecord, ApiError> {
        let url = self.url_for(&["items", item_id]);
        debug!(%url, "GET item");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<ItemRecord>().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP exchange and hand back the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            request
        });

        (addr, handle)
    }

    /// Read headers plus a Content-Length body.
    async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn client_for(addr: SocketAddr, path: &str) -> HttpMarketApi {
        let base = Url::parse(&format!("http://{addr}{path}")).unwrap();
        HttpMarketApi::new(base, Duration::from_secs(5)).unwrap()
    }

    // -- URL handling --

    #[test]
    fn relative_base_resolves_against_origin() {
        let url = resolve_base_url("/api", "https://diavora.github.io").unwrap();
        assert_eq!(url.as_str(), "https://diavora.github.io/api");
    }

    #[test]
    fn absolute_base_is_kept() {
        let url = resolve_base_url("https://abc.ngrok-free.app/api", "http://ignored").unwrap();
        assert_eq!(url.as_str(), "https://abc.ngrok-free.app/api");
    }

    #[test]
    fn unusable_base_is_rejected() {
        assert!(matches!(
            resolve_base_url("mailto:shop@example.com", "https://x"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            resolve_base_url("/api", "not an origin"),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn url_for_handles_trailing_slash() {
        let with_slash =
            HttpMarketApi::new(Url::parse("http://h/api/").unwrap(), Duration::from_secs(1)).unwrap();
        let without =
            HttpMarketApi::new(Url::parse("http://h/api").unwrap(), Duration::from_secs(1)).unwrap();
        assert_eq!(with_slash.url_for(&["purchase"]).as_str(), "http://h/api/purchase");
        assert_eq!(without.url_for(&["purchase"]).as_str(), "http://h/api/purchase");
        assert_eq!(without.url_for(&["items", "42"]).as_str(), "http://h/api/items/42");
    }

    #[test]
    fn from_config_uses_timeout_and_base() {
        let config = ApiConfig {
            base_url: "/api".into(),
            page_origin: "http://localhost:8000".into(),
            request_timeout_secs: 3,
        };
        let api = HttpMarketApi::from_config(&config).unwrap();
        assert_eq!(api.base_url().as_str(), "http://localhost:8000/api");
    }

    // -- Mock server exchanges --

    #[tokio::test]
    async fn post_sends_json_and_parses_reply() {
        let (addr, server) =
            serve_once("200 OK", r#"{"status":"ok","message":"Покупка оформлена"}"#).await;
        let api = client_for(addr, "/api");

        let response = api
            .post(
                Endpoint::Purchase,
                serde_json::json!({"itemId": "42", "initData": "query_id=1"}),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert!(response.is_http_success());
        let reply = response.reply.unwrap();
        assert_eq!(reply.status.as_deref(), Some("ok"));
        assert_eq!(reply.message.as_deref(), Some("Покупка оформлена"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/purchase HTTP/1.1"));
        assert!(request.contains(r#""itemId":"42""#));
        assert!(request.contains(r#""initData":"query_id=1""#));
    }

    #[tokio::test]
    async fn post_reports_error_status_with_reply() {
        let (addr, _server) = serve_once(
            "403 Forbidden",
            r#"{"status":"error","message":"Ошибка аутентификации"}"#,
        )
        .await;
        let api = client_for(addr, "/api");

        let response = api.post(Endpoint::Sell, serde_json::json!({})).await.unwrap();
        assert_eq!(response.status, 403);
        assert!(!response.is_http_success());
        assert_eq!(
            response.reply.and_then(|r| r.message).as_deref(),
            Some("Ошибка аутентификации")
        );
    }

    #[tokio::test]
    async fn post_keeps_message_when_status_is_not_a_string() {
        let (addr, _server) = serve_once(
            "400 Bad Request",
            r#"{"status":400,"message":"Недостаточно средств"}"#,
        )
        .await;
        let api = client_for(addr, "/api");

        let response = api.post(Endpoint::Purchase, serde_json::json!({})).await.unwrap();
        let reply = response.reply.unwrap();
        assert_eq!(reply.status, None);
        assert_eq!(reply.message.as_deref(), Some("Недостаточно средств"));
    }

    #[tokio::test]
    async fn post_keeps_ok_status_when_message_is_not_a_string() {
        let (addr, _server) = serve_once("200 OK", r#"{"status":"ok","message":42}"#).await;
        let api = client_for(addr, "/api");

        let response = api.post(Endpoint::Purchase, serde_json::json!({})).await.unwrap();
        let reply = response.reply.unwrap();
        assert_eq!(reply.status.as_deref(), Some("ok"));
        assert_eq!(reply.message, None);
    }

    #[test]
    fn reply_from_body_reads_string_fields_only() {
        assert_eq!(
            ApiReply::from_body(r#"{"status":"error","message":"нет"}"#),
            Some(ApiReply {
                status: Some("error".into()),
                message: Some("нет".into()),
            })
        );
        assert_eq!(
            ApiReply::from_body(r#"{"status":null,"message":["x"]}"#),
            Some(ApiReply::default())
        );
        assert_eq!(ApiReply::from_body("[1,2]"), Some(ApiReply::default()));
        assert_eq!(ApiReply::from_body("<html>"), None);
    }

    #[tokio::test]
    async fn post_with_non_json_body_has_no_reply() {
        let (addr, _server) = serve_once("502 Bad Gateway", "<html>tunnel offline</html>").await;
        let api = client_for(addr, "/api");

        let response = api.post(Endpoint::Sell, serde_json::json!({})).await.unwrap();
        assert_eq!(response.status, 502);
        assert!(response.reply.is_none());
    }

    #[tokio::test]
    async fn post_to_closed_port_is_request_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = client_for(addr, "/api");
        let err = api
            .post(Endpoint::Purchase, serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Request(_)));
    }

    #[tokio::test]
    async fn fetch_item_parses_record() {
        let (addr, server) = serve_once(
            "200 OK",
            r#"{"name":"Щит","description":"Крепкий","price":1500,"server":"EU","seller":"vasya"}"#,
        )
        .await;
        let api = client_for(addr, "/api");

        let record = api.fetch_item("9").await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Щит"));
        assert_eq!(record.seller.as_deref(), Some("vasya"));
        assert_eq!(record.price, Some(serde_json::json!(1500)));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/items/9 HTTP/1.1"));
    }

    #[tokio::test]
    async fn fetch_item_non_success_is_status_error() {
        let (addr, _server) = serve_once("404 Not Found", "{}").await;
        let api = client_for(addr, "/api");

        let err = api.fetch_item("missing").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404 }));
    }
}
