use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

use rewardcraft_types::Rollout;

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn load(&self) -> Result<Vec<Rollout>>;
}

pub struct VecDataSource {
    rollouts: Vec<Rollout>,
}

impl VecDataSource {
    pub fn new(rollouts: Vec<Rollout>) -> Self {
        Self { rollouts }
    }
}

#[async_trait]
impl DataSource for VecDataSource {
    async fn load(&self) -> Result<Vec<Rollout>> {
        Ok(self.rollouts.clone())
    }
}

const TRANSCRIPT_KEYS: [&str; 3] = ["transcript", "solution_str", "response"];

/// Read JSONL where each line looks like:
/// - {"id": "...", "transcript": "...", "ground_truth": {"target": "D"}}
/// - {"solution_str": "...", "ground_truth": "D"}
/// - {"response": "...", "reward_model": {"ground_truth": {"target": "D"}}}
pub struct JsonlDataSource {
    path: PathBuf,
}

impl JsonlDataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for JsonlDataSource {
    async fn load(&self) -> Result<Vec<Rollout>> {
        let content = tokio_fs_read_to_string(&self.path).await?;
        let mut rollouts = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)
                .with_context(|| format!("Invalid JSON on line {}", idx + 1))?;
            let rollout = parse_rollout(&value).with_context(|| format!("Line {}", idx + 1))?;
            rollouts.push(rollout);
        }
        tracing::debug!(path = ?self.path, count = rollouts.len(), "loaded rollouts");
        Ok(rollouts)
    }
}

fn parse_rollout(value: &Value) -> Result<Rollout> {
    let obj = value
        .as_object()
        .ok_or_else(|| anyhow!("expected object"))?;
    let transcript = TRANSCRIPT_KEYS
        .iter()
        .find_map(|k| obj.get(*k))
        .ok_or_else(|| anyhow!("missing 'transcript'"))?
        .as_str()
        .ok_or_else(|| anyhow!("'transcript' must be a string"))?
        .to_string();
    let ground_truth = obj
        .get("ground_truth")
        .or_else(|| obj.get("reward_model").and_then(|rm| rm.get("ground_truth")))
        .ok_or_else(|| anyhow!("missing 'ground_truth'"))?;
    let ground_truth = match ground_truth {
        Value::Object(map) => map.clone(),
        Value::String(target) => {
            let mut map = Map::new();
            map.insert("target".to_string(), Value::String(target.clone()));
            map
        }
        other => bail!("'ground_truth' must be an object or string, got {}", other),
    };
    let id = obj.get("id").and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });
    Ok(Rollout {
        id,
        transcript,
        ground_truth,
    })
}

#[cfg(not(feature = "sync-fs"))]
async fn tokio_fs_read_to_string(path: &PathBuf) -> Result<String> {
    use tokio::fs;
    fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {:?}", path))
}

#[cfg(feature = "sync-fs")]
async fn tokio_fs_read_to_string(path: &PathBuf) -> Result<String> {
    use std::fs;
    use tokio::task;
    let path_clone = path.clone();
    let content = task::spawn_blocking(move || {
        fs::read_to_string(&path_clone).with_context(|| format!("Failed to read {:?}", path_clone))
    })
    .await
    .map_err(|e| anyhow!(e))??;
    Ok(content)
}
