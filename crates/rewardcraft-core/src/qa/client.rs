use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::service::QaError;
use rewardcraft_types::{HealthStatus, RetrieveRequest, RetrieveResponse};

/// HTTP client for a remote QA service exposing `POST /retrieve` and `GET /health`.
#[derive(Debug, Clone)]
pub struct QaClient {
	http: Client,
	base_url: String,
}

impl QaClient {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, QaError> {
		let http = Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| QaError::Backend(e.to_string()))?;
		Ok(Self { http, base_url: base_url.into() })
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url.trim_end_matches('/'), path)
	}

	pub async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse, QaError> {
		if request.queries.is_empty() {
			return Err(QaError::NoQueries);
		}
		let resp = self
			.http
			.post(self.endpoint("retrieve"))
			.json(request)
			.send()
			.await
			.map_err(|e| QaError::Backend(e.to_string()))?;
		let status = resp.status();
		if status == StatusCode::BAD_REQUEST {
			return Err(QaError::NoQueries);
		}
		if !status.is_success() {
			let body = resp.text().await.unwrap_or_default();
			return Err(QaError::Backend(format!("HTTP {}: {}", status.as_u16(), body)));
		}
		resp.json::<RetrieveResponse>()
			.await
			.map_err(|e| QaError::Backend(e.to_string()))
	}

	pub async fn health(&self) -> Result<HealthStatus, QaError> {
		let resp = self
			.http
			.get(self.endpoint("health"))
			.send()
			.await
			.map_err(|e| QaError::Backend(e.to_string()))?;
		let status = resp.status();
		if !status.is_success() {
			return Err(QaError::Backend(format!("HTTP {}", status.as_u16())));
		}
		resp.json::<HealthStatus>()
			.await
			.map_err(|e| QaError::Backend(e.to_string()))
	}
}
