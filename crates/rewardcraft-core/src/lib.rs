//! rewardcraft-core: rule-based reward scoring for RL training loops.
//! Extract the final `<answer>` from a transcript, verify it against the
//! ground truth, and map the outcome to a partial-credit reward.
//! See `examples/score_rollouts.rs` for a quickstart.

pub mod config;
pub mod datasource;
pub mod extract;
pub mod ground_truth;
pub mod qa;
pub mod runner;
pub mod score;
pub mod scorer;
pub mod testing;
pub mod verify;

pub use config::{ConfigError, RewardConfig};
pub use datasource::{DataSource, JsonlDataSource, VecDataSource};
pub use extract::{extract_answer, ExtractionMiss, Extractor, RoleDelimiter, DEFAULT_DELIMITERS};
pub use ground_truth::GroundTruth;
pub use qa::{Answerer, QaClient, QaError, QaService};
pub use runner::{RewardBatch, RewardBatchBuilder};
pub use score::{compute_score, MatchMethod, RewardBreakdown, ScoreConfig, TaggedAnswerScorer};
pub use scorer::Scorer;
pub use verify::is_correct;
pub use rewardcraft_types::{BatchResult, BatchSummary, Outcome, RewardRecord, Rollout};
