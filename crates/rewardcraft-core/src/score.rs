//! Partial-credit reward policy for tagged answers.
//!
//! | extraction | verdict   | base            |
//! |------------|-----------|-----------------|
//! | miss       | -         | `0.0`, returned as is |
//! | found      | correct   | `correct_score` |
//! | found      | incorrect | `format_score`  |
//!
//! A transcript that repeats the legacy `[answer]` token more than
//! [`DEGENERATE_MARKER_LIMIT`] times additionally loses `format_score`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::extract::Extractor;
use crate::ground_truth::GroundTruth;
use crate::scorer::Scorer;
use crate::verify::is_correct;
use rewardcraft_types::{Outcome, RewardRecord};

pub const DEFAULT_FORMAT_SCORE: f64 = 0.1;
pub const DEFAULT_CORRECT_SCORE: f64 = 1.1;
pub const DEFAULT_PARTIAL_SCORE: f64 = 0.5;
pub const DEFAULT_LOG_SAMPLE_RATE: f64 = 1.0 / 3.0;

/// Holdover token from an older bracketed answer format. Counted, never extracted.
pub const LEGACY_ANSWER_MARKER: &str = "[answer]";
pub const DEGENERATE_MARKER_LIMIT: usize = 5;

/// Answer matching mode. Accepted for interface compatibility; scoring is
/// always exact regardless of the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
	#[default]
	Strict,
	Flexible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
	#[serde(default)]
	pub method: MatchMethod,
	#[serde(default = "default_format_score")]
	pub format_score: f64,
	#[serde(default = "default_correct_score")]
	pub correct_score: f64,
	/// Not read by the current policy.
	#[serde(default = "default_partial_score")]
	pub partial_score: f64,
	/// Probability that a call emits its diagnostic log lines.
	#[serde(default = "default_log_sample_rate")]
	pub log_sample_rate: f64,
}

fn default_format_score() -> f64 {
	DEFAULT_FORMAT_SCORE
}

fn default_correct_score() -> f64 {
	DEFAULT_CORRECT_SCORE
}

fn default_partial_score() -> f64 {
	DEFAULT_PARTIAL_SCORE
}

fn default_log_sample_rate() -> f64 {
	DEFAULT_LOG_SAMPLE_RATE
}

impl Default for ScoreConfig {
	fn default() -> Self {
		Self {
			method: MatchMethod::default(),
			format_score: DEFAULT_FORMAT_SCORE,
			correct_score: DEFAULT_CORRECT_SCORE,
			partial_score: DEFAULT_PARTIAL_SCORE,
			log_sample_rate: DEFAULT_LOG_SAMPLE_RATE,
		}
	}
}

impl ScoreConfig {
	pub fn format_score(mut self, value: f64) -> Self {
		self.format_score = value;
		self
	}

	pub fn correct_score(mut self, value: f64) -> Self {
		self.correct_score = value;
		self
	}

	pub fn log_sample_rate(mut self, rate: f64) -> Self {
		self.log_sample_rate = rate;
		self
	}

	/// Convenience for tests and batch jobs that want no sampled diagnostics.
	pub fn quiet(self) -> Self {
		self.log_sample_rate(0.0)
	}
}

/// Everything the policy decided for one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardBreakdown {
	pub extracted: Option<String>,
	pub outcome: Outcome,
	pub base: f64,
	pub penalty: f64,
	pub degenerate: bool,
	pub score: f64,
}

impl RewardBreakdown {
	pub fn correct(&self) -> bool {
		self.outcome == Outcome::Correct
	}

	pub fn into_record(self, id: Option<String>, target: Option<String>) -> RewardRecord {
		RewardRecord {
			id,
			score: self.score,
			outcome: self.outcome,
			extracted: self.extracted,
			target,
			degenerate: self.degenerate,
			error: None,
		}
	}
}

/// Non-overlapping count of [`LEGACY_ANSWER_MARKER`] in the raw transcript.
pub fn count_legacy_markers(transcript: &str) -> usize {
	transcript.matches(LEGACY_ANSWER_MARKER).count()
}

pub fn is_degenerate(transcript: &str) -> bool {
	count_legacy_markers(transcript) > DEGENERATE_MARKER_LIMIT
}

fn should_log(rate: f64) -> bool {
	if rate.is_nan() || rate <= 0.0 {
		return false;
	}
	if rate >= 1.0 {
		return true;
	}
	rand::thread_rng().gen_bool(rate)
}

/// Scores `<answer>` tagged transcripts against `ground_truth.target`.
#[derive(Debug, Clone, Default)]
pub struct TaggedAnswerScorer {
	extractor: Extractor,
	config: ScoreConfig,
}

impl TaggedAnswerScorer {
	pub fn new(config: ScoreConfig) -> Self {
		Self { extractor: Extractor::default(), config }
	}

	pub fn with_extractor(mut self, extractor: Extractor) -> Self {
		self.extractor = extractor;
		self
	}

	pub fn config(&self) -> &ScoreConfig {
		&self.config
	}

	pub fn compute(&self, transcript: &str, ground_truth: &GroundTruth) -> f64 {
		self.breakdown(transcript, ground_truth).score
	}

	pub fn breakdown(&self, transcript: &str, ground_truth: &GroundTruth) -> RewardBreakdown {
		let cfg = &self.config;
		let do_log = should_log(cfg.log_sample_rate);
		if do_log {
			tracing::info!(transcript, ground_truth = ?ground_truth.fields(), "scoring rollout");
		}

		let Some(answer) = self.extractor.extract(transcript) else {
			return RewardBreakdown {
				extracted: None,
				outcome: Outcome::ExtractionMiss,
				base: 0.0,
				penalty: 0.0,
				degenerate: false,
				score: 0.0,
			};
		};

		let target = ground_truth.target();
		if target.is_none() {
			tracing::warn!("ground truth has no string `target`; answer counted as incorrect");
		}
		let correct = target.is_some_and(|t| is_correct(&answer, t));
		if do_log {
			tracing::info!(answer = %answer, target = ?target, correct, "verified answer");
		}

		let base = if correct { cfg.correct_score } else { cfg.format_score };
		let degenerate = is_degenerate(transcript);
		let penalty = if degenerate { cfg.format_score } else { 0.0 };
		let score = base - penalty;

		if do_log {
			tracing::info!(score, degenerate, "final score");
		}

		RewardBreakdown {
			extracted: Some(answer),
			outcome: if correct { Outcome::Correct } else { Outcome::Incorrect },
			base,
			penalty,
			degenerate,
			score,
		}
	}
}

impl Scorer for TaggedAnswerScorer {
	fn name(&self) -> &'static str {
		"tagged_answer"
	}

	fn score(&self, transcript: &str, ground_truth: &GroundTruth) -> RewardBreakdown {
		self.breakdown(transcript, ground_truth)
	}
}

/// Reward entry point for training loops.
///
/// `method` and `partial_score` are accepted but do not affect the result.
pub fn compute_score(
	solution: &str,
	ground_truth: &GroundTruth,
	method: MatchMethod,
	format_score: f64,
	correct_score: f64,
	partial_score: f64,
) -> f64 {
	let config = ScoreConfig {
		method,
		format_score,
		correct_score,
		partial_score,
		log_sample_rate: DEFAULT_LOG_SAMPLE_RATE,
	};
	TaggedAnswerScorer::new(config).compute(solution, ground_truth)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn scorer() -> TaggedAnswerScorer {
		TaggedAnswerScorer::new(ScoreConfig::default().quiet())
	}

	#[test]
	fn test_correct_answer() {
		let gt = GroundTruth::from_target("D");
		assert_eq!(scorer().compute("Assistant: <answer>D</answer>", &gt), 1.1);
	}

	#[test]
	fn test_wrong_but_tagged() {
		let gt = GroundTruth::from_target("D");
		let b = scorer().breakdown("Assistant: <answer>C</answer>", &gt);
		assert_eq!(b.score, 0.1);
		assert_eq!(b.outcome, Outcome::Incorrect);
		assert_eq!(b.extracted.as_deref(), Some("C"));
	}

	#[test]
	fn test_miss_scores_zero_even_if_degenerate() {
		let gt = GroundTruth::from_target("D");
		let transcript = format!("no turn marker {}", "[answer]".repeat(10));
		let b = scorer().breakdown(&transcript, &gt);
		assert_eq!(b.score, 0.0);
		assert_eq!(b.outcome, Outcome::ExtractionMiss);
		assert!(!b.degenerate);
	}

	#[test]
	fn test_penalty_on_correct() {
		let gt = GroundTruth::from_target("D");
		let transcript = format!("Assistant: {}<answer>D</answer>", "[answer]".repeat(6));
		let b = scorer().breakdown(&transcript, &gt);
		assert!(b.degenerate);
		assert_eq!(b.base, 1.1);
		assert_eq!(b.penalty, 0.1);
		assert!((b.score - 1.0).abs() < 1e-12);
	}

	#[test]
	fn test_penalty_on_incorrect_yields_zero() {
		let gt = GroundTruth::from_target("D");
		let transcript = format!("Assistant: <answer>C</answer>{}", "[answer]".repeat(7));
		assert!(scorer().compute(&transcript, &gt).abs() < 1e-12);
	}

	#[test]
	fn test_five_markers_not_penalized() {
		let gt = GroundTruth::from_target("D");
		let transcript = format!("Assistant: <answer>D</answer>{}", "[answer]".repeat(5));
		assert_eq!(scorer().compute(&transcript, &gt), 1.1);
	}

	#[test]
	fn test_markers_before_delimiter_still_count() {
		let gt = GroundTruth::from_target("D");
		let transcript = format!("{} Assistant: <answer>D</answer>", "[answer]".repeat(6));
		assert!((scorer().compute(&transcript, &gt) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn test_count_legacy_markers() {
		assert_eq!(count_legacy_markers(""), 0);
		assert_eq!(count_legacy_markers("[answer]x[answer]"), 2);
		assert_eq!(count_legacy_markers("<answer>x</answer>"), 0);
		assert_eq!(count_legacy_markers("[answer][answer]"), 2);
	}

	#[test]
	fn test_missing_target_is_incorrect() {
		let gt = GroundTruth::default();
		assert_eq!(scorer().compute("Assistant: <answer>D</answer>", &gt), 0.1);
	}

	#[test]
	fn test_custom_scores() {
		let s = TaggedAnswerScorer::new(ScoreConfig::default().quiet().format_score(0.2).correct_score(2.0));
		let gt = GroundTruth::from_target("D");
		assert_eq!(s.compute("Assistant: <answer>D</answer>", &gt), 2.0);
		assert_eq!(s.compute("Assistant: <answer>E</answer>", &gt), 0.2);
	}

	#[test]
	fn test_sampling_never_changes_score() {
		let gt = GroundTruth::from_target("D");
		let transcript = "Assistant: <answer>D</answer>";
		for rate in [0.0, 0.5, 1.0, -3.0, 7.0, f64::NAN] {
			let s = TaggedAnswerScorer::new(ScoreConfig::default().log_sample_rate(rate));
			for _ in 0..20 {
				assert_eq!(s.compute(transcript, &gt), 1.1);
			}
		}
	}

	#[test]
	fn test_should_log_bounds() {
		assert!(!should_log(0.0));
		assert!(!should_log(-1.0));
		assert!(!should_log(f64::NAN));
		assert!(should_log(1.0));
		assert!(should_log(2.0));
	}

	#[test]
	fn test_compute_score_ignores_method_and_partial() {
		let gt = GroundTruth::from_target("D");
		let transcript = "Assistant: <answer>The answer is D</answer>";
		for method in [MatchMethod::Strict, MatchMethod::Flexible] {
			for partial in [0.0, 0.5, 0.9] {
				assert_eq!(compute_score(transcript, &gt, method, 0.1, 1.1, partial), 0.1);
			}
		}
	}

	#[test]
	fn test_scorer_trait_name() {
		assert_eq!(Scorer::name(&scorer()), "tagged_answer");
	}
}
