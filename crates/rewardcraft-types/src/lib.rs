use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabled::Tabled;

/// One model rollout waiting to be scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollout {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Full generated text, possibly spanning several conversational turns.
	pub transcript: String,
	/// Reference data supplied by the harness. Only `target` is read.
	pub ground_truth: Map<String, Value>,
}

impl Rollout {
	pub fn new(transcript: impl Into<String>, ground_truth: Map<String, Value>) -> Self {
		Self { id: None, transcript: transcript.into(), ground_truth }
	}

	pub fn with_id(id: impl Into<String>, transcript: impl Into<String>, ground_truth: Map<String, Value>) -> Self {
		Self { id: Some(id.into()), transcript: transcript.into(), ground_truth }
	}

	/// Shorthand for the common `{"target": ...}` ground truth.
	pub fn with_target(id: impl Into<String>, transcript: impl Into<String>, target: impl Into<String>) -> Self {
		let mut ground_truth = Map::new();
		ground_truth.insert("target".to_string(), Value::String(target.into()));
		Self::with_id(id, transcript, ground_truth)
	}
}

/// How a rollout fared before any degenerate-output penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
	Correct,
	Incorrect,
	ExtractionMiss,
}

impl Outcome {
	pub fn as_str(&self) -> &'static str {
		match self {
			Outcome::Correct => "correct",
			Outcome::Incorrect => "incorrect",
			Outcome::ExtractionMiss => "miss",
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardRecord {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub score: f64,
	pub outcome: Outcome,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub extracted: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub target: Option<String>,
	pub degenerate: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
	pub total: usize,
	pub correct: usize,
	pub incorrect: usize,
	pub extraction_misses: usize,
	pub degenerate: usize,
	pub mean_reward: f64,
	pub accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
	pub records: Vec<RewardRecord>,
	pub summary: BatchSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
struct SummaryRow {
	id: String,
	outcome: String,
	score: f64,
	degenerate: String,
	extracted: String,
	target: String,
}

impl BatchResult {
	pub fn summarize(records: &[RewardRecord]) -> BatchSummary {
		let total = records.len();
		let mut summary = BatchSummary { total, ..BatchSummary::default() };
		let mut score_sum = 0.0f64;

		for r in records {
			match r.outcome {
				Outcome::Correct => summary.correct += 1,
				Outcome::Incorrect => summary.incorrect += 1,
				Outcome::ExtractionMiss => summary.extraction_misses += 1,
			}
			if r.degenerate {
				summary.degenerate += 1;
			}
			score_sum += r.score;
		}

		if total > 0 {
			summary.mean_reward = score_sum / total as f64;
			summary.accuracy = summary.correct as f64 / total as f64;
		}
		summary
	}

	pub fn summary_table(&self) -> String {
		use tabled::Table;
		let rows: Vec<SummaryRow> = self.records.iter().map(|r| {
			SummaryRow {
				id: r.id.clone().unwrap_or_else(|| "-".to_string()),
				outcome: match &r.error {
					Some(_) => "error".to_string(),
					None => r.outcome.as_str().to_string(),
				},
				score: r.score,
				degenerate: if r.degenerate { "✓" } else { " " }.to_string(),
				extracted: truncate(r.extracted.clone().unwrap_or_default(), 48),
				target: truncate(r.target.clone().unwrap_or_default(), 48),
			}
		}).collect();

		let table = Table::new(rows);
		let table_str = table.to_string();

		let summary_text = format!(
			"Total: {}  Correct: {}  Incorrect: {}  Misses: {}  Degenerate: {}  Accuracy: {:.1}%  Mean reward: {:.3}",
			self.summary.total,
			self.summary.correct,
			self.summary.incorrect,
			self.summary.extraction_misses,
			self.summary.degenerate,
			self.summary.accuracy * 100.0,
			self.summary.mean_reward
		);

		format!("{}\n\n{}\n", table_str, summary_text)
	}
}

fn truncate(s: String, max_len: usize) -> String {
	if s.chars().count() <= max_len {
		return s;
	}
	let mut truncated = s.chars().take(max_len.saturating_sub(1)).collect::<String>();
	truncated.push('…');
	truncated
}

// Question-answering collaborator wire types.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
	pub queries: Vec<String>,
	/// Accepted for compatibility; the collaborator always returns one answer.
	#[serde(default = "default_topk")]
	pub topk: Option<u32>,
	#[serde(default)]
	pub return_scores: bool,
}

fn default_topk() -> Option<u32> {
	Some(1)
}

impl RetrieveRequest {
	pub fn new<I, S>(queries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			queries: queries.into_iter().map(Into::into).collect(),
			topk: default_topk(),
			return_scores: false,
		}
	}

	pub fn return_scores(mut self, yes: bool) -> Self {
		self.return_scores = yes;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub contents: String,
}

/// A single answer, shaped like a retrieval hit so search-style consumers can read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Passage {
	Scored { document: Document, score: f64 },
	Plain { contents: String },
}

impl Passage {
	pub fn contents(&self) -> &str {
		match self {
			Passage::Scored { document, .. } => &document.contents,
			Passage::Plain { contents } => contents,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResponse {
	/// One entry per query, in request order.
	pub result: Vec<Vec<Passage>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
	pub status: String,
	pub service: String,
}
