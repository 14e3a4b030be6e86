//! Google Sheets v4 REST adapter

use crate::error::SourceError;
use crate::source::{CellGrid, CellRange, SheetMeta, SheetSource, SpreadsheetMetadata};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sheetlens_model::SpreadsheetId;
use std::time::Duration;

/// Public API root
pub const DEFAULT_ENDPOINT: &str = "https://sheets.googleapis.com";

/// Default response size limit
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

const METADATA_FIELDS: &str =
    "properties.title,sheets.properties(title,gridProperties(rowCount,columnCount))";

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u32,
    #[serde(default)]
    column_count: u32,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Reads spreadsheets through the Sheets REST API
#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    access_token: Option<String>,
    max_payload_bytes: usize,
}

impl GoogleSheetsSource {
    /// Create source against `endpoint` with a request timeout
    ///
    /// # Errors
    /// - `SourceError::Transport` if the endpoint is not a URL or the client
    ///   cannot be built
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SourceError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| SourceError::Transport(format!("invalid endpoint {endpoint}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sheetlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: None,
            access_token: None,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        })
    }

    /// With API key sent as the `key` query parameter
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With OAuth bearer token, preferred over the API key
    #[inline]
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// With response size limit
    #[inline]
    #[must_use]
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    fn url(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| SourceError::Transport(format!("endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match (&self.access_token, &self.api_key) {
            (Some(token), _) => request.bearer_auth(token),
            (None, Some(key)) => request.query(&[("key", key)]),
            (None, None) => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, SourceError> {
        let request = self.authorize(self.client.get(url).query(query));
        let mut response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body_with_limit(&mut response, self.max_payload_bytes)
                .await
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            return Err(map_status(status, body, self.max_payload_bytes));
        }

        let body = read_body_with_limit(&mut response, self.max_payload_bytes).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn map_status(status: StatusCode, body: String, limit: usize) -> SourceError {
    let detail = if body.is_empty() {
        status.to_string()
    } else {
        body
    };
    match status {
        StatusCode::UNAUTHORIZED => SourceError::Unauthorized(detail),
        StatusCode::FORBIDDEN => SourceError::AccessDenied(detail),
        StatusCode::NOT_FOUND => SourceError::NotFound(detail),
        StatusCode::PAYLOAD_TOO_LARGE => SourceError::PayloadTooLarge {
            limit,
            observed: 0,
        },
        StatusCode::TOO_MANY_REQUESTS => SourceError::RateLimited,
        _ => SourceError::Transport(format!("{status}: {detail}")),
    }
}

/// Read a response body, failing once it exceeds `limit` bytes
async fn read_body_with_limit(
    response: &mut reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, SourceError> {
    if let Some(length) = response.content_length() {
        if length > limit as u64 {
            return Err(SourceError::PayloadTooLarge {
                limit,
                observed: length,
            });
        }
    }

    let mut out = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if out.len().saturating_add(chunk.len()) > limit {
            return Err(SourceError::PayloadTooLarge {
                limit,
                observed: (out.len() + chunk.len()) as u64,
            });
        }
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

#[async_trait]
impl SheetSource for GoogleSheetsSource {
    async fn metadata(&self, id: &SpreadsheetId) -> Result<SpreadsheetMetadata, SourceError> {
        let url = self.url(&["v4", "spreadsheets", id.as_str()])?;
        let response: MetadataResponse = self.get_json(url, &[("fields", METADATA_FIELDS)]).await?;

        Ok(SpreadsheetMetadata {
            id: id.clone(),
            title: response.properties.title,
            sheets: response
                .sheets
                .into_iter()
                .map(|entry| {
                    let props = entry.properties;
                    SheetMeta::new(
                        props.title,
                        props.grid_properties.row_count,
                        props.grid_properties.column_count,
                    )
                })
                .collect(),
        })
    }

    async fn fetch_range(
        &self,
        id: &SpreadsheetId,
        range: &CellRange,
    ) -> Result<CellGrid, SourceError> {
        let a1 = range.to_a1();
        let url = self.url(&["v4", "spreadsheets", id.as_str(), "values", &a1])?;
        let response: ValueRange = self
            .get_json(url, &[("valueRenderOption", "FORMULA")])
            .await?;

        Ok(response
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response, returning the base URL and the raw request
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            request
        });
        (format!("http://{addr}"), handle)
    }

    fn source(base: &str) -> GoogleSheetsSource {
        GoogleSheetsSource::new(base, Duration::from_secs(5))
            .unwrap()
            .with_api_key("test-key")
    }

    #[tokio::test]
    async fn metadata_is_decoded() {
        let body = r#"{"properties":{"title":"Budget"},"sheets":[{"properties":{"title":"Data","gridProperties":{"rowCount":120,"columnCount":8}}}]}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let meta = source(&base).metadata(&SpreadsheetId::new("abc")).await.unwrap();
        assert_eq!(meta.title, "Budget");
        assert_eq!(meta.sheets, vec![SheetMeta::new("Data", 120, 8)]);

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v4/spreadsheets/abc?"));
        assert!(request.contains("key=test-key"));
    }

    #[tokio::test]
    async fn values_keep_formula_text() {
        let body = r#"{"range":"Data!A1:B2","values":[["=SUM(A1:A3)", 4],[null,"x"]]}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let grid = source(&base)
            .fetch_range(&SpreadsheetId::new("abc"), &CellRange::new("Data", 0, 2, 2))
            .await
            .unwrap();
        assert_eq!(grid, vec![vec!["=SUM(A1:A3)", "4"], vec!["", "x"]]);

        let request = server.await.unwrap();
        assert!(request.contains("valueRenderOption=FORMULA"));
        assert!(request.contains("/values/'Data'!A1:B2") || request.contains("/values/%27Data%27!A1:B2"));
    }

    #[tokio::test]
    async fn forbidden_maps_to_access_denied() {
        let (base, _server) = serve_once("403 Forbidden", r#"{"error":"not shared"}"#).await;
        let err = source(&base)
            .metadata(&SpreadsheetId::new("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn oversized_error_body_falls_back_to_status() {
        let (base, _server) =
            serve_once("403 Forbidden", r#"{"error":"a long explanation of the refusal"}"#).await;
        let err = source(&base)
            .with_max_payload_bytes(8)
            .metadata(&SpreadsheetId::new("abc"))
            .await
            .unwrap_err();
        assert_eq!(err, SourceError::AccessDenied("403 Forbidden".to_string()));
    }

    #[tokio::test]
    async fn unauthorized_maps_to_unauthorized() {
        let (base, _server) = serve_once("401 Unauthorized", "").await;
        let err = source(&base)
            .metadata(&SpreadsheetId::new("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let (base, _server) = serve_once("200 OK", r#"{"values":[["=A1","=A2","=A3"]]}"#).await;
        let err = source(&base)
            .with_max_payload_bytes(8)
            .fetch_range(&SpreadsheetId::new("abc"), &CellRange::new("Data", 0, 1, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::PayloadTooLarge { limit: 8, .. }));
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            map_status(StatusCode::TOO_MANY_REQUESTS, String::new(), 1),
            SourceError::RateLimited
        );
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, "gone".into(), 1),
            SourceError::NotFound(ref d) if d == "gone"
        ));
        assert!(matches!(
            map_status(StatusCode::PAYLOAD_TOO_LARGE, String::new(), 5),
            SourceError::PayloadTooLarge { limit: 5, .. }
        ));
    }
}
