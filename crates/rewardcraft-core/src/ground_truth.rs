use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reference answer bundle handed over by the training harness.
///
/// Only the `target` field takes part in scoring. It is read verbatim: a
/// JSON string is the only accepted shape, anything else counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundTruth(Map<String, Value>);

impl GroundTruth {
	pub const TARGET_KEY: &'static str = "target";

	pub fn new(fields: Map<String, Value>) -> Self {
		Self(fields)
	}

	pub fn from_target(target: impl Into<String>) -> Self {
		let mut fields = Map::new();
		fields.insert(Self::TARGET_KEY.to_string(), Value::String(target.into()));
		Self(fields)
	}

	pub fn target(&self) -> Option<&str> {
		self.0.get(Self::TARGET_KEY).and_then(Value::as_str)
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn fields(&self) -> &Map<String, Value> {
		&self.0
	}
}

impl From<Map<String, Value>> for GroundTruth {
	fn from(fields: Map<String, Value>) -> Self {
		Self(fields)
	}
}

impl From<&str> for GroundTruth {
	fn from(target: &str) -> Self {
		Self::from_target(target)
	}
}
