//! Locates the final `<answer>…</answer>` span in the assistant's turn.
//!
//! Extraction runs in two steps:
//! 1. find the assistant-turn boundary by trying each [`RoleDelimiter`] in order
//!    and keep only the text after the first occurrence of the one that matched;
//! 2. collect every `<answer>…</answer>` span in what remains and return the
//!    trimmed contents of the last one.
//!
//! Tags that appear before the boundary are never looked at, and a model that
//! answers more than once is judged on its final answer.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// Non-greedy, dot matches newline, tags are case-sensitive.
static ANSWER_PATTERN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?s)<answer>(.*?)</answer>").unwrap());

/// A chat-template convention for where the assistant's turn begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDelimiter {
	pub name: &'static str,
	pub marker: &'static str,
}

impl RoleDelimiter {
	pub const fn new(name: &'static str, marker: &'static str) -> Self {
		Self { name, marker }
	}

	/// Everything strictly after the first occurrence of the marker.
	fn split<'a>(&self, transcript: &'a str) -> Option<&'a str> {
		transcript.split_once(self.marker).map(|(_, after)| after)
	}
}

/// Plain `Assistant:` label.
pub const PLAIN_LABEL: RoleDelimiter = RoleDelimiter::new("plain", "Assistant:");
/// Llama 3 style end-of-turn plus assistant header.
pub const LLAMA3_HEADER: RoleDelimiter = RoleDelimiter::new(
	"llama3",
	"<|eot_id|><|start_header_id|>assistant<|end_header_id|>",
);
/// ChatML `<|im_start|>assistant` marker.
pub const CHATML: RoleDelimiter = RoleDelimiter::new("chatml", "<|im_start|>assistant");

/// Priority order used by [`Extractor::default`].
pub const DEFAULT_DELIMITERS: [RoleDelimiter; 3] = [PLAIN_LABEL, LLAMA3_HEADER, CHATML];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractionMiss {
	#[error("no role delimiter found")]
	NoRoleDelimiter,
	#[error("no answer tag found after the role delimiter")]
	NoAnswerTag,
}

#[derive(Debug, Clone)]
pub struct Extractor {
	delimiters: Vec<RoleDelimiter>,
}

impl Default for Extractor {
	fn default() -> Self {
		Self { delimiters: DEFAULT_DELIMITERS.to_vec() }
	}
}

impl Extractor {
	/// Builds an extractor that tries `delimiters` in the given order.
	pub fn with_delimiters<I>(delimiters: I) -> Self
	where
		I: IntoIterator<Item = RoleDelimiter>,
	{
		Self { delimiters: delimiters.into_iter().collect() }
	}

	pub fn delimiters(&self) -> &[RoleDelimiter] {
		&self.delimiters
	}

	/// Returns the extracted answer, or `None` on any miss.
	pub fn extract(&self, transcript: &str) -> Option<String> {
		self.try_extract(transcript).ok()
	}

	pub fn try_extract(&self, transcript: &str) -> Result<String, ExtractionMiss> {
		let Some((delimiter, turn)) = self.assistant_turn(transcript) else {
			tracing::info!("no role delimiter found");
			return Err(ExtractionMiss::NoRoleDelimiter);
		};

		match ANSWER_PATTERN.captures_iter(turn).last() {
			Some(caps) => Ok(caps[1].trim().to_string()),
			None => {
				tracing::info!(delimiter = delimiter.name, "no answer tag found");
				Err(ExtractionMiss::NoAnswerTag)
			}
		}
	}

	fn assistant_turn<'a>(&self, transcript: &'a str) -> Option<(&RoleDelimiter, &'a str)> {
		self.delimiters
			.iter()
			.find_map(|d| d.split(transcript).map(|turn| (d, turn)))
	}
}

/// Extracts with the default delimiter priority.
pub fn extract_answer(transcript: &str) -> Option<String> {
	Extractor::default().extract(transcript)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_plain_label_wins_over_chatml() {
		let transcript = "<|im_start|>assistant <answer>X</answer> Assistant: nothing tagged";
		assert_eq!(
			Extractor::default().try_extract(transcript),
			Err(ExtractionMiss::NoAnswerTag)
		);
		let chatml_only = Extractor::with_delimiters([CHATML]);
		assert_eq!(chatml_only.extract(transcript), Some("X".to_string()));
	}

	#[test]
	fn test_last_span_wins() {
		let transcript = "Assistant: <answer>A</answer> blah <answer>B</answer>";
		assert_eq!(extract_answer(transcript), Some("B".to_string()));
	}

	#[test]
	fn test_trims_but_keeps_inner_text() {
		assert_eq!(extract_answer("Assistant: <answer>  D \n</answer>"), Some("D".to_string()));
		assert_eq!(
			extract_answer("Assistant: <answer>\n  two  words\n</answer>"),
			Some("two  words".to_string())
		);
	}

	#[test]
	fn test_multiline_span() {
		let transcript = "Assistant: <think>hmm</think><answer>line one\nline two</answer>";
		assert_eq!(extract_answer(transcript), Some("line one\nline two".to_string()));
	}

	#[test]
	fn test_tags_before_delimiter_ignored() {
		let transcript = "User: example <answer>A</answer>\nAssistant: I am not sure.";
		assert_eq!(
			Extractor::default().try_extract(transcript),
			Err(ExtractionMiss::NoAnswerTag)
		);
	}

	#[test]
	fn test_splits_on_first_delimiter_occurrence() {
		let transcript = "Assistant: <answer>A</answer> Assistant: <answer>B</answer>";
		assert_eq!(extract_answer(transcript), Some("B".to_string()));
		let transcript = "Assistant: <answer>A</answer> Assistant: nothing";
		assert_eq!(extract_answer(transcript), Some("A".to_string()));
	}

	#[test]
	fn test_no_delimiter() {
		assert_eq!(
			Extractor::default().try_extract("<answer>D</answer>"),
			Err(ExtractionMiss::NoRoleDelimiter)
		);
	}

	#[test]
	fn test_unclosed_tag_ignored() {
		let transcript = "Assistant: <answer>A</answer> then <answer>B";
		assert_eq!(extract_answer(transcript), Some("A".to_string()));
		assert_eq!(extract_answer("Assistant: <answer>B"), None);
	}

	#[test]
	fn test_tags_are_case_sensitive() {
		assert_eq!(extract_answer("Assistant: <ANSWER>D</ANSWER>"), None);
	}

	#[test]
	fn test_llama3_header() {
		let transcript = "<|start_header_id|>user<|end_header_id|>Q?<answer>no</answer>\
			<|eot_id|><|start_header_id|>assistant<|end_header_id|>\n<answer>C</answer><|eot_id|>";
		assert_eq!(extract_answer(transcript), Some("C".to_string()));
	}

	#[test]
	fn test_bare_eot_without_header_falls_through() {
		let transcript = "<|eot_id|> <|im_start|>assistant\n<answer>C</answer>";
		assert_eq!(extract_answer(transcript), Some("C".to_string()));
		assert_eq!(extract_answer("<|eot_id|> <answer>C</answer>"), None);
	}

	#[test]
	fn test_chatml() {
		let transcript = "<|im_start|>user\n<answer>x</answer><|im_end|>\n<|im_start|>assistant\n<answer>E</answer><|im_end|>";
		assert_eq!(extract_answer(transcript), Some("E".to_string()));
	}

	#[test]
	fn test_custom_delimiters() {
		let extractor = Extractor::with_delimiters([RoleDelimiter::new("gemma", "<start_of_turn>model")]);
		let transcript = "Assistant: <answer>A</answer><start_of_turn>model\n<answer>B</answer>";
		assert_eq!(extractor.extract(transcript), Some("B".to_string()));
		assert_eq!(extractor.delimiters().len(), 1);
	}

	#[test]
	fn test_empty_span_is_an_answer() {
		assert_eq!(extract_answer("Assistant: <answer>   </answer>"), Some(String::new()));
	}
}
