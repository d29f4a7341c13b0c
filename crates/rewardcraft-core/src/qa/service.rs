use thiserror::Error;

use super::answerer::Answerer;
use rewardcraft_types::{Document, HealthStatus, Passage, RetrieveRequest, RetrieveResponse};

pub const SERVICE_NAME: &str = "QA API";

/// Prefix for an answer that could not be produced.
pub const ANSWER_ERROR_PREFIX: &str = "Error getting answer:";

#[derive(Debug, Error)]
pub enum QaError {
	/// The request itself is unusable.
	#[error("No queries provided")]
	NoQueries,
	#[error("Error answering question: {0}")]
	Backend(String),
}

impl QaError {
	/// HTTP status a server front-end should report for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			QaError::NoQueries => 400,
			QaError::Backend(_) => 500,
		}
	}
}

/// Batch front for an [`Answerer`].
///
/// A failing query never fails the batch: its slot carries an inline error
/// string in place of the answer.
pub struct QaService<A> {
	answerer: A,
	service: String,
}

impl<A: Answerer> QaService<A> {
	pub fn new(answerer: A) -> Self {
		Self { answerer, service: SERVICE_NAME.to_string() }
	}

	pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
		self.service = name.into();
		self
	}

	/// Answers one question, folding failures into the returned text.
	pub async fn answer(&self, question: &str) -> String {
		match self.answerer.ask(question).await {
			Ok(answer) => answer.trim().to_string(),
			Err(err) => {
				tracing::warn!(question, "answerer failed: {:#}", err);
				format!("{} {}", ANSWER_ERROR_PREFIX, err)
			}
		}
	}

	pub async fn retrieve(&self, request: &RetrieveRequest) -> Result<RetrieveResponse, QaError> {
		if request.queries.is_empty() {
			return Err(QaError::NoQueries);
		}
		tracing::debug!(queries = request.queries.len(), return_scores = request.return_scores, "retrieve");

		// One query at a time, in request order.
		let mut result = Vec::with_capacity(request.queries.len());
		for query in &request.queries {
			let contents = self.answer(query).await;
			let passage = if request.return_scores {
				Passage::Scored { document: Document { contents }, score: 1.0 }
			} else {
				Passage::Plain { contents }
			};
			result.push(vec![passage]);
		}
		Ok(RetrieveResponse { result })
	}

	pub fn health(&self) -> HealthStatus {
		HealthStatus { status: "healthy".to_string(), service: self.service.clone() }
	}
}
