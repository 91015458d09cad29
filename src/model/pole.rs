//! A pole: a vertical support structure carrying wires, equipment, and
//! guys (§3).

use crate::model::attachment::Attachment;
use crate::model::ids::PoleId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pole {
  pub pole_id: PoleId,
  pub scid: String,
  pub pole_tag: String,
  pub pole_spec: String,
  pub proposed_pole_spec: String,
  pub pole_owner: String,
  pub display_name: String,
  pub lat: Option<f64>,
  pub lon: Option<f64>,
  pub pole_replacement: bool,
  pub pole_replacement_is_taller: bool,
  pub attachments: Vec<Attachment>,
}

impl Pole {
  /// §4.3 POLE.MISSING_ID: no `poleSpec`, `poleTag`, or `scid` at all.
  pub fn is_missing_identifiers(&self) -> bool {
    self.pole_spec.trim().is_empty()
      && self.pole_tag.trim().is_empty()
      && self.scid.trim().is_empty()
  }

  pub fn name_for_display(&self) -> &str {
    if !self.display_name.is_empty() {
      &self.display_name
    } else if !self.pole_tag.is_empty() {
      &self.pole_tag
    } else {
      &self.pole_id
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_identifiers_all_blank() {
    let p = Pole::default();
    assert!(p.is_missing_identifiers());
  }

  #[test]
  fn test_missing_identifiers_one_present() {
    let p = Pole {
      scid: "123".into(),
      ..Pole::default()
    };
    assert!(!p.is_missing_identifiers());
  }
}
