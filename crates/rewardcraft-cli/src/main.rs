use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use rewardcraft_core::{
	Extractor, JsonlDataSource, QaClient, RewardBatch, RewardConfig, TaggedAnswerScorer,
};
use rewardcraft_core::config::QaConfig;
use rewardcraft_types::{Passage, RetrieveRequest};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rewardcraft", about = "Score tagged model answers for RL training")]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// YAML or JSON configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Enable debug logging (RUST_LOG takes precedence)
	#[arg(short, long, global = true, action = ArgAction::SetTrue)]
	verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
	/// Score a JSONL file of rollouts
	Score(ScoreArgs),
	/// Print the answer extracted from one transcript
	Extract(ExtractArgs),
	/// Send questions to a QA service
	Ask(AskArgs),
	/// Check that a QA service is up
	Health(HealthArgs),
}

#[derive(Debug, Clone, Parser)]
struct ScoreArgs {
	/// JSONL file with lines like { "id"?: string, "transcript": string, "ground_truth": { "target": string } }
	#[arg(long)]
	data: Option<PathBuf>,

	/// Concurrency (rollouts in-flight)
	#[arg(long)]
	concurrency: Option<usize>,

	/// Reward for a well-tagged but wrong answer
	#[arg(long)]
	format_score: Option<f64>,

	/// Reward for a correct answer
	#[arg(long)]
	correct_score: Option<f64>,

	/// Fraction of calls that log their diagnostics (0.0..=1.0)
	#[arg(long)]
	log_sample_rate: Option<f64>,

	/// Output JSON result to a file
	#[arg(long)]
	json_out: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
struct ExtractArgs {
	/// Transcript text
	#[arg(long, conflicts_with = "file")]
	transcript: Option<String>,

	/// Read the transcript from a file
	#[arg(long)]
	file: Option<PathBuf>,
}

#[derive(Debug, Clone, Parser)]
struct AskArgs {
	/// QA service base URL (falls back to `qa.url` in the config)
	#[arg(long)]
	url: Option<String>,

	/// Question to ask; repeat for a batch
	#[arg(long = "question", required = true)]
	questions: Vec<String>,

	/// Accepted by the service for compatibility
	#[arg(long, default_value_t = 1)]
	topk: u32,

	/// Ask for scored passages
	#[arg(long, action = ArgAction::SetTrue)]
	return_scores: bool,
}

#[derive(Debug, Clone, Parser)]
struct HealthArgs {
	/// QA service base URL (falls back to `qa.url` in the config)
	#[arg(long)]
	url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let default_level = if cli.verbose { "debug" } else { "info" };
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
		)
		.with_writer(std::io::stderr)
		.init();

	let config = match &cli.config {
		Some(path) => RewardConfig::from_path(path)?,
		None => RewardConfig::default(),
	};

	match cli.command {
		Commands::Score(args) => score(args, config).await?,
		Commands::Extract(args) => extract(args).await?,
		Commands::Ask(args) => ask(args, config).await?,
		Commands::Health(args) => health(args, config).await?,
	}
	Ok(())
}

async fn score(args: ScoreArgs, mut config: RewardConfig) -> Result<()> {
	if let Some(n) = args.concurrency {
		config.concurrency = n;
	}
	if let Some(v) = args.format_score {
		config.scoring.format_score = v;
	}
	if let Some(v) = args.correct_score {
		config.scoring.correct_score = v;
	}
	if let Some(v) = args.log_sample_rate {
		config.scoring.log_sample_rate = v;
	}
	config.validate()?;

	let path = args
		.data
		.or_else(|| config.data.as_ref().map(|d| d.path.clone()))
		.context("no data file: pass --data or set `data.path` in the config")?;

	let batch = RewardBatch::builder()
		.data_source(Arc::new(JsonlDataSource::new(path)))
		.scorer(Arc::new(TaggedAnswerScorer::new(config.scoring.clone())))
		.concurrency(config.concurrency)
		.build()?;

	let result = batch.run().await?;
	println!("{}", result.summary_table());

	if let Some(path) = args.json_out {
		let json = serde_json::to_string_pretty(&result)?;
		tokio::fs::write(&path, json)
			.await
			.with_context(|| format!("Failed to write {:?}", path))?;
		tracing::info!(path = ?path, "wrote JSON results");
	}

	Ok(())
}

async fn extract(args: ExtractArgs) -> Result<()> {
	let transcript = match (args.transcript, args.file) {
		(Some(text), _) => text,
		(None, Some(path)) => tokio::fs::read_to_string(&path)
			.await
			.with_context(|| format!("Failed to read {:?}", path))?,
		(None, None) => anyhow::bail!("pass --transcript or --file"),
	};

	let answer = Extractor::default().try_extract(&transcript)?;
	println!("{answer}");
	Ok(())
}

fn qa_client(url: Option<String>, config: &RewardConfig) -> Result<QaClient> {
	let qa = match url {
		Some(url) => QaConfig {
			url,
			timeout_secs: config.qa.as_ref().map_or(30, |q| q.timeout_secs),
		},
		None => config
			.qa
			.clone()
			.context("no QA service: pass --url or set `qa.url` in the config")?,
	};
	Ok(QaClient::new(qa.url, Duration::from_secs(qa.timeout_secs))?)
}

async fn ask(args: AskArgs, config: RewardConfig) -> Result<()> {
	let client = qa_client(args.url, &config)?;
	let mut request = RetrieveRequest::new(args.questions.clone()).return_scores(args.return_scores);
	request.topk = Some(args.topk);

	let response = client.retrieve(&request).await?;
	for (question, passages) in args.questions.iter().zip(&response.result) {
		println!("Q: {question}");
		for passage in passages {
			match passage {
				Passage::Scored { document, score } => println!("A ({score:.2}): {}", document.contents),
				Passage::Plain { contents } => println!("A: {contents}"),
			}
		}
		println!();
	}
	Ok(())
}

async fn health(args: HealthArgs, config: RewardConfig) -> Result<()> {
	let client = qa_client(args.url, &config)?;
	let status = client.health().await?;
	println!("{} ({}): {}", status.service, client.base_url(), status.status);
	Ok(())
}
