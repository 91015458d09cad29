//! An attachment: a wire, piece of equipment, or guy affixed to a pole at a
//! measured height (§3).

use crate::classify::{classify, ClassifyInput, Classification};
use crate::model::ids::AttachmentId;
use serde::{Deserialize, Serialize};

pub use crate::classify::Category as AttachmentCategory;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attachment {
  pub id: AttachmentId,
  pub category: AttachmentCategory,
  pub owner: String,
  pub label: String,
  pub trace_id: Option<String>,
  pub trace_type: String,
  pub cable_type: String,
  pub name: String,
  pub trace_label: String,
  pub existing_in: Option<i32>,
  pub proposed_in: Option<i32>,
  pub is_moved: bool,
  pub is_new: bool,
}

impl Attachment {
  /// The effective proposed height, falling back to `existing_in` when
  /// `proposed_in` is absent (§3 invariants).
  pub fn effective_height(&self) -> Option<i32> {
    self.proposed_in.or(self.existing_in)
  }

  pub fn classify(&self) -> Classification {
    classify(&ClassifyInput {
      category: self.category,
      owner: &self.owner,
      label: &self.label,
      trace_type: &self.trace_type,
      cable_type: &self.cable_type,
      name: &self.name,
      trace_label: &self.trace_label,
    })
  }

  /// Stationary per §4.3 POLE.HOLE_BUFFER: not moved and not new.
  pub fn is_stationary(&self) -> bool {
    !self.is_moved && !self.is_new
  }
}
