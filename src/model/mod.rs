//! The normalized domain model (§3): poles, their attachments, midspans
//! and their measures, spans, and guy lines. All entities are constructed
//! once from the parsed survey document and are immutable through
//! evaluation (§3 Lifecycle) — the QC engine may be re-run many times
//! against the same `Model` with different `Rules`.

mod attachment;
mod guy;
mod ids;
mod measure;
mod midspan;
mod pole;
mod span;

pub use attachment::{Attachment, AttachmentCategory};
pub use guy::GuyLine;
pub use ids::{AnchorId, ConnectionId, MidspanId, PoleId};
pub use measure::{Measure, MeasureKey};
pub use midspan::{classify_row_type, Midspan, RowType};
pub use pole::Pole;
pub use span::Span;

use serde::{Deserialize, Serialize};

/// The whole normalized job: every entity needed by the three evaluators.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Model {
  pub poles: Vec<Pole>,
  pub midspans: Vec<Midspan>,
  pub spans: Vec<Span>,
  pub guy_lines: Vec<GuyLine>,
}

impl Model {
  pub fn pole_by_id(&self, pole_id: &str) -> Option<&Pole> {
    self.poles.iter().find(|p| p.pole_id == pole_id)
  }

  pub fn midspan_by_id(&self, midspan_id: &str) -> Option<&Midspan> {
    self.midspans.iter().find(|m| m.midspan_id == midspan_id)
  }
}
