// src/orchestrator/stage_client.rs
//! HTTP clients for the four collaborating services

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, trace};

use crate::config::ServiceUrls;
use crate::types::{
    CoverLetterRequest, CoverLetterResponse, ParseRequest, ParsedResume, RankRequest,
    RankResponse, SearchRequest, SearchResponse,
};

use super::{PipelineStages, StageError};

const PARSE_ENDPOINT: &str = "/parse_resume";
const RANK_ENDPOINT: &str = "/rank_jobs";
const SEARCH_ENDPOINT: &str = "/job_search";
const COVER_LETTER_ENDPOINT: &str = "/generate_cover_letter";

/// POSTs JSON to one service and normalises its answer.
pub struct StageClient {
    client: reqwest::Client,
    service: &'static str,
    base_url: String,
}

impl StageClient {
    pub fn new(client: reqwest::Client, service: &'static str, base_url: &str) -> Self {
        Self {
            client,
            service,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn post_json<B, R>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<R, StageError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        info!("Calling {} service: {}", self.service, url);

        let response = self
            .client
            .post(&url)
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| self.unavailable(&url, &e))?;

        let status = response.status();
        trace!("{} responded with {}", self.service, status);

        let text = response
            .text()
            .await
            .map_err(|e| self.unavailable(&url, &e))?;

        if !status.is_success() {
            error!("{} returned {}: {}", self.service, status, text);
            return Err(StageError::UpstreamError {
                service: self.service.to_string(),
                url,
                status: status.as_u16(),
                body: raw_body(&text),
                detail: None,
            });
        }

        serde_json::from_str(&text).map_err(|e| StageError::UpstreamError {
            service: self.service.to_string(),
            url,
            status: status.as_u16(),
            body: raw_body(&text),
            detail: Some(format!("undecodable response: {}", e)),
        })
    }

    fn unavailable(&self, url: &str, error: &reqwest::Error) -> StageError {
        error!("{} unreachable at {}: {}", self.service, url, error);
        StageError::UpstreamUnavailable {
            service: self.service.to_string(),
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Keep the upstream payload verbatim: JSON when it parses, a string otherwise.
fn raw_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// The pipeline stages as remote services.
pub struct HttpStages {
    parser: StageClient,
    ranker: StageClient,
    search: StageClient,
    cover_letter: StageClient,
}

impl HttpStages {
    pub fn new(urls: &ServiceUrls, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            parser: StageClient::new(client.clone(), "resume_parser", &urls.resume_parser),
            ranker: StageClient::new(client.clone(), "ranker", &urls.ranker),
            search: StageClient::new(client.clone(), "job_search", &urls.job_search),
            cover_letter: StageClient::new(client, "cover_letter", &urls.cover_letter),
        })
    }
}

#[async_trait]
impl PipelineStages for HttpStages {
    async fn parse(&self, raw_text: &str) -> Result<ParsedResume, StageError> {
        let body = ParseRequest {
            raw_text: raw_text.to_string(),
        };
        self.parser.post_json(PARSE_ENDPOINT, &[], &body).await
    }

    async fn rank(&self, request: &RankRequest) -> Result<RankResponse, StageError> {
        self.ranker.post_json(RANK_ENDPOINT, &[], request).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, StageError> {
        self.search.post_json(SEARCH_ENDPOINT, &[], request).await
    }

    async fn draft(
        &self,
        request: &CoverLetterRequest,
        save_file: bool,
    ) -> Result<CoverLetterResponse, StageError> {
        let as_file = if save_file { "true" } else { "false" };
        self.cover_letter
            .post_json(COVER_LETTER_ENDPOINT, &[("as_file", as_file)], request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one canned HTTP response and returns its base URL.
    async fn one_shot_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}", addr)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                return;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&buffer);
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
                if buffer.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn client(base_url: &str) -> StageClient {
        StageClient::new(reqwest::Client::new(), "job_search", base_url)
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let result: Result<Value, StageError> = client("http://127.0.0.1:1")
            .post_json(SEARCH_ENDPOINT, &[], &json!({}))
            .await;

        match result {
            Err(StageError::UpstreamUnavailable { service, url, .. }) => {
                assert_eq!(service, "job_search");
                assert_eq!(url, "http://127.0.0.1:1/job_search");
            }
            other => panic!("expected UpstreamUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_body_is_kept_verbatim() {
        let base_url = one_shot_server("503 Service Unavailable", r#"{"detail":"quota exceeded"}"#).await;
        let result: Result<Value, StageError> = client(&base_url)
            .post_json(SEARCH_ENDPOINT, &[], &json!({"resume": {}}))
            .await;

        match result {
            Err(StageError::UpstreamError { status, body, detail, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(body, json!({"detail": "quota exceeded"}));
                assert!(detail.is_none());
            }
            other => panic!("expected UpstreamError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_success_is_an_upstream_error() {
        let base_url = one_shot_server("200 OK", "not json").await;
        let result: Result<SearchResponse, StageError> = client(&base_url)
            .post_json(SEARCH_ENDPOINT, &[], &json!({}))
            .await;

        match result {
            Err(StageError::UpstreamError { status, body, detail, .. }) => {
                assert_eq!(status, 200);
                assert_eq!(body, json!("not json"));
                assert!(detail.is_some());
            }
            other => panic!("expected UpstreamError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_success_decodes() {
        let base_url = one_shot_server(
            "200 OK",
            r#"{"query":"rust jobs","engine":"heuristic","degraded":true,"jobs":[]}"#,
        )
        .await;
        let response: SearchResponse = client(&format!("{}/", base_url))
            .post_json(SEARCH_ENDPOINT, &[], &json!({}))
            .await
            .unwrap();
        assert_eq!(response.query, "rust jobs");
        assert!(response.degraded);
    }
}
