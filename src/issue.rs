//! Typed rule violations (§6). Every evaluator ultimately produces a `Vec<Issue>`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
  Warn,
  Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
  Pole,
  Midspan,
}

/// Machine-readable context identifying the rows implicated by an issue.
///
/// Kept as a loosely-typed JSON object per §6 ("context: { ...typed fields
/// per rule, including `attachmentIds`/`measureIds` when applicable }") —
/// each rule contributes whatever fields are meaningful to it, and the
/// `attachment_ids`/`measure_ids` helpers below are the two fields every
/// consumer can rely on being named consistently across rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueContext(pub Map<String, Value>);

impl IssueContext {
  pub fn new() -> Self {
    IssueContext::default()
  }

  pub fn with_attachment_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
    let ids: Vec<Value> = ids.into_iter().map(Value::from).collect();
    if !ids.is_empty() {
      self.0.insert("attachmentIds".to_string(), Value::Array(ids));
    }
    self
  }

  pub fn with_measure_ids(mut self, ids: impl IntoIterator<Item = String>) -> Self {
    let ids: Vec<Value> = ids.into_iter().map(Value::from).collect();
    if !ids.is_empty() {
      self.0.insert("measureIds".to_string(), Value::Array(ids));
    }
    self
  }

  pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.0.insert(key.to_string(), value.into());
    self
  }

  pub fn attachment_ids(&self) -> Vec<String> {
    self.string_array("attachmentIds")
  }

  pub fn measure_ids(&self) -> Vec<String> {
    self.string_array("measureIds")
  }

  fn string_array(&self, key: &str) -> Vec<String> {
    self
      .0
      .get(key)
      .and_then(Value::as_array)
      .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
      .unwrap_or_default()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
  pub severity: Severity,
  pub entity_type: EntityType,
  pub entity_id: String,
  pub entity_name: String,
  pub rule_code: &'static str,
  pub message: String,
  pub context: IssueContext,
}

impl Issue {
  /// The canonical dedup key for the global dedup step (§4.6):
  /// `(severity, entityType, entityId, ruleCode, message, sorted
  /// attachmentIds, sorted measureIds)`.
  pub fn dedup_key(&self) -> String {
    let mut attachment_ids = self.context.attachment_ids();
    attachment_ids.sort();
    let mut measure_ids = self.context.measure_ids();
    measure_ids.sort();
    format!(
      "{:?}|{:?}|{}|{}|{}|{}|{}",
      self.severity,
      self.entity_type,
      self.entity_id,
      self.rule_code,
      self.message,
      attachment_ids.join(","),
      measure_ids.join(","),
    )
  }
}
