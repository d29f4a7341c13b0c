use anyhow::Result;
use rewardcraft_types::BatchResult;

/// Helper to assert the batch mean reward meets a threshold.
///
/// Use this in your `#[tokio::test]` functions.
///
/// # Example
/// ```ignore
/// #[tokio::test]
/// async fn test_policy_rollouts() -> Result<()> {
///     let batch = RewardBatch::builder()
///         .data_source(data)
///         .scorer(Arc::new(TaggedAnswerScorer::default()))
///         .build()?;
///
///     let result = batch.run().await?;
///
///     assert_mean_reward(&result, 0.8)?;
///     Ok(())
/// }
/// ```
pub fn assert_mean_reward(result: &BatchResult, min_mean_reward: f64) -> Result<()> {
    if result.summary.mean_reward < min_mean_reward {
        anyhow::bail!(
            "Reward check failed: mean reward {:.3} is below threshold {:.3}\n{}",
            result.summary.mean_reward,
            min_mean_reward,
            result.summary_table()
        );
    }
    Ok(())
}

/// Helper to assert the share of exactly-correct answers meets a threshold.
pub fn assert_accuracy(result: &BatchResult, min_accuracy: f64) -> Result<()> {
    if result.summary.accuracy < min_accuracy {
        anyhow::bail!(
            "Reward check failed: accuracy {:.1}% is below threshold {:.1}%\n{}",
            result.summary.accuracy * 100.0,
            min_accuracy * 100.0,
            result.summary_table()
        );
    }
    Ok(())
}

/// Helper to assert every rollout carried an extractable answer.
pub fn assert_no_extraction_misses(result: &BatchResult) -> Result<()> {
    if result.summary.extraction_misses > 0 {
        anyhow::bail!(
            "Reward check failed: {}/{} rollouts had no extractable answer\n{}",
            result.summary.extraction_misses,
            result.summary.total,
            result.summary_table()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewardcraft_types::{Outcome, RewardRecord};

    fn result(outcomes: &[(Outcome, f64)]) -> BatchResult {
        let records: Vec<RewardRecord> = outcomes
            .iter()
            .map(|(outcome, score)| RewardRecord {
                id: None,
                score: *score,
                outcome: *outcome,
                extracted: None,
                target: None,
                degenerate: false,
                error: None,
            })
            .collect();
        let summary = BatchResult::summarize(&records);
        BatchResult { records, summary }
    }

    #[test]
    fn test_thresholds() {
        let r = result(&[(Outcome::Correct, 1.1), (Outcome::Incorrect, 0.1)]);
        assert!(assert_mean_reward(&r, 0.6).is_ok());
        assert!(assert_mean_reward(&r, 0.7).is_err());
        assert!(assert_accuracy(&r, 0.5).is_ok());
        assert!(assert_accuracy(&r, 0.51).is_err());
        assert!(assert_no_extraction_misses(&r).is_ok());
    }

    #[test]
    fn test_miss_reported_with_table() {
        let r = result(&[(Outcome::ExtractionMiss, 0.0)]);
        let err = assert_no_extraction_misses(&r).unwrap_err().to_string();
        assert!(err.contains("1/1"));
        assert!(err.contains("Mean reward"));
    }
}
