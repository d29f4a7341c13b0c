use std::sync::Arc;

use rewardcraft_core::{
    JsonlDataSource, RewardBatch, Rollout, ScoreConfig, Scorer, TaggedAnswerScorer, VecDataSource,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Example 1: Inline rollouts
    let rollouts = vec![
        Rollout::with_target("0", "User: 2+2?\nAssistant: <answer>4</answer>", "4"),
        Rollout::with_target("1", "User: 2+3?\nAssistant: <answer>6</answer>", "5"),
        Rollout::with_target("2", "User: 3+3?\nAssistant: six", "6"),
    ];
    let data = Arc::new(VecDataSource::new(rollouts));

    let scorer: Arc<dyn Scorer> = Arc::new(TaggedAnswerScorer::new(ScoreConfig::default().quiet()));

    let batch = RewardBatch::builder()
        .data_source(data)
        .scorer(scorer.clone())
        .concurrency(8)
        .build()?;

    let result = batch.run().await?;
    println!("{}", result.summary_table());

    // Example 2: Load from JSONL file if provided
    if let Some(path) = std::env::args().nth(1) {
        let batch = RewardBatch::builder()
            .data_source(Arc::new(JsonlDataSource::new(path)))
            .scorer(scorer)
            .build()?;
        let result = batch.run().await?;
        println!("{}", result.summary_table());
    }

    Ok(())
}
