//! A guy line: an independent record referencing a pole by id, no
//! ownership (§3).

use crate::model::ids::{AnchorId, PoleId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuyLine {
  pub pole_id: PoleId,
  pub anchor_id: Option<AnchorId>,
  pub anchor_type: String,
  pub trace_id: Option<String>,
  pub existing_in: Option<i32>,
  pub proposed_in: Option<i32>,
  pub trace_proposed: bool,
  pub owner: String,
}

impl GuyLine {
  pub fn effective_height(&self) -> Option<i32> {
    self.proposed_in.or(self.existing_in)
  }
}
