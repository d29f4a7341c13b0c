use crate::ground_truth::GroundTruth;
use crate::score::RewardBreakdown;

/// A reward function over one transcript. Implementations must not panic or
/// fail: every failure mode is expressed in the returned breakdown.
pub trait Scorer: Send + Sync {
	fn name(&self) -> &'static str;
	fn score(&self, transcript: &str, ground_truth: &GroundTruth) -> RewardBreakdown;
}
