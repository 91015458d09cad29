//! A midspan: a measurement point between two poles recording wire heights
//! along a span (§3).

use crate::model::ids::{ConnectionId, MidspanId, PoleId};
use crate::model::measure::Measure;
use serde::{Deserialize, Serialize};

/// Right-of-way classification driving the ground-clearance minimum
/// (§GLOSSARY). `driveway` folds into `Default` per §4.4 — the raw text is
/// what actually matters for the driveway override, so it is preserved
/// verbatim in `row_type_raw` rather than given its own variant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowType {
  #[default]
  Default,
  Pedestrian,
  Highway,
  Farm,
  Rail,
}

/// Classifies a raw ROW-type string into a [`RowType`] at ingestion time.
/// Token matching is case-insensitive substring, same spirit as the
/// attachment/measure classifier but over a much smaller vocabulary.
pub fn classify_row_type(raw: &str) -> RowType {
  let text = raw.to_lowercase();
  if text.contains("pedestrian") {
    RowType::Pedestrian
  } else if text.contains("highway") {
    RowType::Highway
  } else if text.contains("farm") {
    RowType::Farm
  } else if text.contains("rail") {
    RowType::Rail
  } else {
    RowType::Default
  }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Midspan {
  pub midspan_id: MidspanId,
  pub connection_id: ConnectionId,
  pub a_pole_id: Option<PoleId>,
  pub b_pole_id: Option<PoleId>,
  pub lat: Option<f64>,
  pub lon: Option<f64>,
  pub row_type_raw: String,
  pub measures: Vec<Measure>,
}

impl Midspan {
  /// The classified ROW type, derived from `row_type_raw` on read (§3:
  /// entities are immutable through evaluation, so this is computed
  /// on-demand rather than cached as a second source of truth).
  pub fn row_type(&self) -> RowType {
    classify_row_type(&self.row_type_raw)
  }

  /// §4.4 MIDSPAN.MISSING_ROW.
  pub fn is_missing_row_type(&self) -> bool {
    self.row_type_raw.trim().is_empty()
  }

  /// §4.4: raw row text matching `/drive\s*way/` forces the default
  /// minimum regardless of what [`Self::row_type`] otherwise resolved to.
  /// Whitespace is stripped before matching so "Drive Way" and "driveway"
  /// are both caught by a plain substring check.
  pub fn is_driveway_override(&self) -> bool {
    let collapsed: String = self
      .row_type_raw
      .to_lowercase()
      .chars()
      .filter(|c| !c.is_whitespace())
      .collect();
    collapsed.contains("driveway")
  }
}
