use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};

use crate::datasource::DataSource;
use crate::ground_truth::GroundTruth;
use crate::scorer::Scorer;
use rewardcraft_types::{BatchResult, Outcome, RewardRecord, Rollout};

pub struct RewardBatchBuilder {
	data_source: Option<Arc<dyn DataSource>>,
	scorer: Option<Arc<dyn Scorer>>,
	concurrency: usize,
}

impl Default for RewardBatchBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl RewardBatchBuilder {
	pub fn new() -> Self {
		Self {
			data_source: None,
			scorer: None,
			concurrency: 8,
		}
	}

	pub fn data_source(mut self, data_source: Arc<dyn DataSource>) -> Self {
		self.data_source = Some(data_source);
		self
	}

	pub fn scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
		self.scorer = Some(scorer);
		self
	}

	pub fn concurrency(mut self, n: usize) -> Self {
		self.concurrency = n.max(1);
		self
	}

	pub fn build(self) -> Result<RewardBatch> {
		Ok(RewardBatch {
			data_source: self.data_source.ok_or_else(|| anyhow::anyhow!("data_source must be set"))?,
			scorer: self.scorer.ok_or_else(|| anyhow::anyhow!("scorer must be set"))?,
			concurrency: self.concurrency,
		})
	}
}

/// Scores a batch of rollouts concurrently. Records come back in input order.
pub struct RewardBatch {
	data_source: Arc<dyn DataSource>,
	scorer: Arc<dyn Scorer>,
	concurrency: usize,
}

impl RewardBatch {
	pub fn builder() -> RewardBatchBuilder {
		RewardBatchBuilder::new()
	}

	pub async fn run(&self) -> Result<BatchResult> {
		let rollouts = self.data_source.load().await?;
		tracing::info!(
			rollouts = rollouts.len(),
			scorer = self.scorer.name(),
			concurrency = self.concurrency,
			"scoring batch"
		);
		let records = self.score_rollouts(rollouts).await;
		let summary = BatchResult::summarize(&records);
		tracing::info!(
			mean_reward = summary.mean_reward,
			accuracy = summary.accuracy,
			misses = summary.extraction_misses,
			"batch scored"
		);
		Ok(BatchResult { records, summary })
	}

	async fn score_rollouts(&self, rollouts: Vec<Rollout>) -> Vec<RewardRecord> {
		let scorer = self.scorer.clone();
		let stream = stream::iter(rollouts.into_iter()).map(move |rollout| {
			let scorer = scorer.clone();
			async move {
				let id = rollout.id.clone();
				let scored = tokio::task::spawn_blocking(move || {
					let ground_truth = GroundTruth::from(rollout.ground_truth);
					let target = ground_truth.target().map(str::to_string);
					scorer.score(&rollout.transcript, &ground_truth).into_record(rollout.id, target)
				})
				.await;
				match scored {
					Ok(record) => record,
					Err(err) => {
						tracing::error!(id = ?id, "scoring task failed: {}", err);
						RewardRecord {
							id,
							score: 0.0,
							outcome: Outcome::ExtractionMiss,
							extracted: None,
							target: None,
							degenerate: false,
							error: Some(err.to_string()),
						}
					}
				}
			}
		});

		stream.buffered(self.concurrency).collect().await
	}
}
