//! Snapshot of the roll-up `Summary` for a small synthetic
//! multi-pole/multi-midspan job, to catch accidental drift in the
//! pass/warn/fail counts the engine derives (§4.6, §8).

use pole_qc::engine::run_qc;
use pole_qc::model::{Attachment, AttachmentCategory, Measure, Midspan, Model, Pole, Span};
use pole_qc::rules::Rules;

fn wire(id: &str, owner: &str, label: &str, proposed_in: i32) -> Attachment {
  Attachment {
    id: id.to_string(),
    category: AttachmentCategory::Wire,
    owner: owner.to_string(),
    label: label.to_string(),
    proposed_in: Some(proposed_in),
    ..Attachment::default()
  }
}

fn job() -> Model {
  let mut model = Model::default();
  model.poles.push(Pole {
    pole_id: "P1".into(),
    pole_tag: "1234".into(),
    attachments: vec![
      wire("P1-COMM", "Acme", "Fiber", 180),
      wire("P1-PWR", "PowerCo", "Neutral", 260),
    ],
    ..Pole::default()
  });
  model.poles.push(Pole { pole_id: "P2".into(), ..Pole::default() });
  model.spans.push(Span {
    connection_id: "C1".into(),
    a_node_id: "P1".into(),
    b_node_id: "P2".into(),
    a_is_pole: true,
    b_is_pole: true,
    ..Span::default()
  });
  model.midspans.push(Midspan {
    midspan_id: "M1".into(),
    connection_id: "C1".into(),
    row_type_raw: "Commercial Driveway".into(),
    measures: vec![Measure {
      id: Some("M1-COMM".into()),
      owner: "Acme".into(),
      label: "Fiber".into(),
      proposed_in: Some(150),
      ..Measure::default()
    }],
    ..Midspan::default()
  });
  model
}

#[test]
fn snapshot_summary_of_synthetic_job() {
  let result = run_qc(&job(), &Rules::default());
  insta::assert_debug_snapshot!(result.summary);
}
