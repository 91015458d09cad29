//! A single wire reading within a midspan measurement (§3). Measures have
//! no explicit category: they classify as [`Category::Wire`] (§4.1).

use crate::classify::{classify, Category, ClassifyInput, Classification};
use crate::units::round_to_inch;
use serde::{Deserialize, Deserializer, Serialize};

/// Identifies a measure for dedup/grouping purposes.
///
/// Measures sometimes lack an explicit `id`; in that case identity is the
/// composite `(traceId, wireId, proposedIn)` (§9 Design Notes). Both forms
/// project to a stable string for use as a dedup/map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MeasureKey {
  Explicit(String),
  Composite(String, String, Option<i32>),
}

impl MeasureKey {
  pub fn as_stable_string(&self) -> String {
    match self {
      MeasureKey::Explicit(id) => format!("id:{id}"),
      MeasureKey::Composite(trace_id, wire_id, proposed_in) => {
        format!("composite:{trace_id}|{wire_id}|{proposed_in:?}")
      }
    }
  }
}

/// Parses a JSON number as inches, rounding to the nearest whole inch
/// (§3: midspan measurements may arrive fractional and are rounded on
/// ingestion, never at comparison time).
fn deserialize_rounded_inches<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<f64> = Option::deserialize(deserializer)?;
  Ok(raw.map(round_to_inch))
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Measure {
  pub id: Option<String>,
  pub owner: String,
  pub label: String,
  pub trace_id: Option<String>,
  pub trace_type: String,
  pub cable_type: String,
  pub name: String,
  pub trace_label: String,
  pub wire_id: Option<String>,
  #[serde(deserialize_with = "deserialize_rounded_inches")]
  pub existing_in: Option<i32>,
  #[serde(deserialize_with = "deserialize_rounded_inches")]
  pub proposed_in: Option<i32>,
  pub trace_proposed: bool,
}

impl Measure {
  pub fn key(&self) -> MeasureKey {
    match &self.id {
      Some(id) => MeasureKey::Explicit(id.clone()),
      None => MeasureKey::Composite(
        self.trace_id.clone().unwrap_or_default(),
        self.wire_id.clone().unwrap_or_default(),
        self.proposed_in,
      ),
    }
  }

  pub fn effective_height(&self) -> Option<i32> {
    self.proposed_in.or(self.existing_in)
  }

  pub fn classify(&self) -> Classification {
    classify(&ClassifyInput {
      category: Category::Wire,
      owner: &self.owner,
      label: &self.label,
      trace_type: &self.trace_type,
      cable_type: &self.cable_type,
      name: &self.name,
      trace_label: &self.trace_label,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_measure_key_explicit() {
    let m = Measure {
      id: Some("M1".into()),
      ..Measure::default()
    };
    assert_eq!(m.key(), MeasureKey::Explicit("M1".into()));
  }

  #[test]
  fn test_measure_key_composite() {
    let m = Measure {
      id: None,
      trace_id: Some("T1".into()),
      wire_id: Some("W1".into()),
      proposed_in: Some(200),
      ..Measure::default()
    };
    assert_eq!(
      m.key(),
      MeasureKey::Composite("T1".into(), "W1".into(), Some(200))
    );
  }

  #[test]
  fn test_rounding_on_deserialize() {
    let json = r#"{"proposedIn": 180.6, "existingIn": 180.4}"#;
    let m: Measure = serde_json::from_str(json).unwrap();
    assert_eq!(m.proposed_in, Some(181));
    assert_eq!(m.existing_in, Some(180));
  }

  #[test]
  fn test_stable_string_distinguishes_kinds() {
    let explicit = MeasureKey::Explicit("X".into());
    let composite = MeasureKey::Composite("X".into(), "".into(), None);
    assert_ne!(explicit.as_stable_string(), composite.as_stable_string());
  }
}
