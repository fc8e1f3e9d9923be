use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use scanview_core::{BackendStatus, DatasetMap, JobHash, MatchPage, QueryError, QueryPlan};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ApiError, CompileOutcome, FailureKind, SubmitOutcome};

pub const DEFAULT_BASE_URL: &str = "http://localhost/api";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Root of the service API; endpoint paths are appended to it.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 16 * 1024 * 1024,
        }
    }
}

/// HTTP contract of the scan service.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// `GET /job/{hash}`: the raw query a job was submitted with.
    async fn job_query(&self, hash: &JobHash) -> Result<String, ApiError>;

    /// `GET /backend/datasets`.
    async fn datasets(&self) -> Result<DatasetMap, ApiError>;

    /// `GET /matches/{hash}?offset=&limit=`: one page of a job's matches.
    async fn matches(
        &self,
        hash: &JobHash,
        offset: usize,
        limit: usize,
    ) -> Result<MatchPage, ApiError>;

    /// `GET /backend`.
    async fn backend_status(&self) -> Result<BackendStatus, ApiError>;

    /// `POST /query` with `method = "parse"`.
    async fn compile(
        &self,
        raw_query: &str,
        taint: Option<&str>,
    ) -> Result<CompileOutcome, ApiError>;

    /// `POST /query` with `method = "query"`.
    async fn submit(&self, raw_query: &str, taint: Option<&str>)
        -> Result<SubmitOutcome, ApiError>;
}

#[derive(Deserialize)]
struct JobResponse {
    raw_yara: String,
}

#[derive(Deserialize)]
struct DatasetsResponse {
    #[serde(default)]
    datasets: DatasetMap,
}

#[derive(Deserialize)]
struct SubmitResponse {
    query_hash: String,
}

#[derive(Deserialize, Default)]
struct RejectionBody {
    detail: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    method: &'a str,
    raw_yara: &'a str,
    taint: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ClientSettings,
    base_url: Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::new(
                FailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base_url,
            client,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = self.read_body(response).await?;
        decode(&body)
    }

    async fn post_query(&self, request: &QueryRequest<'_>) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let url = self.endpoint(&["query"])?;
        let payload = serde_json::to_vec(request)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_server_error() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        let body = self.read_body(response).await?;
        Ok((status, body))
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, ApiError> {
        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn job_query(&self, hash: &JobHash) -> Result<String, ApiError> {
        let url = self.endpoint(&["job", hash.as_str()])?;
        let job: JobResponse = self.get_json(url).await?;
        Ok(job.raw_yara)
    }

    async fn datasets(&self) -> Result<DatasetMap, ApiError> {
        let url = self.endpoint(&["backend", "datasets"])?;
        let response: DatasetsResponse = self.get_json(url).await?;
        Ok(response.datasets)
    }

    async fn matches(
        &self,
        hash: &JobHash,
        offset: usize,
        limit: usize,
    ) -> Result<MatchPage, ApiError> {
        let mut url = self.endpoint(&["matches", hash.as_str()])?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    async fn backend_status(&self) -> Result<BackendStatus, ApiError> {
        let url = self.endpoint(&["backend"])?;
        self.get_json(url).await
    }

    async fn compile(
        &self,
        raw_query: &str,
        taint: Option<&str>,
    ) -> Result<CompileOutcome, ApiError> {
        let request = QueryRequest {
            method: "parse",
            raw_yara: raw_query,
            taint,
        };
        let (status, body) = self.post_query(&request).await?;
        if status.is_success() {
            Ok(CompileOutcome::Plan(QueryPlan(decode(&body)?)))
        } else {
            Ok(CompileOutcome::Rejected(rejection(status, &body)))
        }
    }

    async fn submit(
        &self,
        raw_query: &str,
        taint: Option<&str>,
    ) -> Result<SubmitOutcome, ApiError> {
        let request = QueryRequest {
            method: "query",
            raw_yara: raw_query,
            taint,
        };
        let (status, body) = self.post_query(&request).await?;
        if status.is_success() {
            let response: SubmitResponse = decode(&body)?;
            Ok(SubmitOutcome::Accepted(JobHash::new(response.query_hash)))
        } else {
            Ok(SubmitOutcome::Rejected(rejection(status, &body)))
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

/// Turns a 4xx answer into a user-facing query error.
fn rejection(status: StatusCode, body: &[u8]) -> QueryError {
    let parsed: RejectionBody = serde_json::from_slice(body).unwrap_or_default();
    let message = parsed
        .detail
        .or(parsed.error)
        .unwrap_or_else(|| status.to_string());
    QueryError::new(message)
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ReqwestApiClient {
        ReqwestApiClient::new(ClientSettings {
            base_url: base_url.to_string(),
            ..ClientSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_segments_with_or_without_trailing_slash() {
        let url = client("http://host/api").endpoint(&["job", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/job/abc");
        let url = client("http://host/api/").endpoint(&["job", "abc"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/job/abc");
    }

    #[test]
    fn endpoint_escapes_hash_segments() {
        let url = client("http://host/api")
            .endpoint(&["matches", "a/b c"])
            .unwrap();
        assert_eq!(url.as_str(), "http://host/api/matches/a%2Fb%20c");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ReqwestApiClient::new(ClientSettings {
            base_url: "not a url".to_string(),
            ..ClientSettings::default()
        })
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }

    #[test]
    fn rejection_prefers_detail_then_error_then_status() {
        let status = StatusCode::BAD_REQUEST;
        assert_eq!(
            rejection(status, br#"{"detail": "unexpected $end"}"#).message,
            "unexpected $end"
        );
        assert_eq!(rejection(status, br#"{"error": "nope"}"#).message, "nope");
        assert_eq!(rejection(status, b"<html>").message, "400 Bad Request");
    }
}
