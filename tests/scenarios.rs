//! End-to-end scenario tests seeded directly from the six concrete
//! examples: each builds a `Model`, runs the whole engine through
//! `run_qc`, and checks the issue(s) it is supposed to produce.

use pole_qc::engine::{run_qc, Status};
use pole_qc::model::{Attachment, AttachmentCategory, Measure, Midspan, Model, Pole, Span};
use pole_qc::rules::Rules;
use pole_qc::Severity;

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

#[test]
fn scenario_lowest_comm_too_low() {
  let mut model = Model::default();
  model.poles.push(Pole {
    pole_id: "P1".into(),
    attachments: vec![wire("A1", "Acme", "Fiber", 180)],
    ..Pole::default()
  });
  let result = run_qc(&model, &Rules::default());
  let pole = result.poles_by_id.get("P1").unwrap();
  assert_eq!(pole.status, Status::Fail);
  let hit = pole.issues.iter().find(|i| i.rule_code == "POLE.MIN_COMM").unwrap();
  assert_eq!(hit.severity, Severity::Fail);
  assert!(hit.context.attachment_ids().contains(&"A1".to_string()));
}

#[test]
fn scenario_comm_to_power_adss_exemption() {
  let mut model = Model::default();
  model.poles.push(Pole {
    pole_id: "P1".into(),
    attachments: vec![
      wire("ADSS1", "Acme", "ADSS Fiber", 330),
      wire("FIBER1", "Other", "Fiber", 330),
      wire("PWR1", "PowerCo", "Neutral", 360),
    ],
    ..Pole::default()
  });
  let result = run_qc(&model, &Rules::default());
  let pole = result.poles_by_id.get("P1").unwrap();
  assert!(!pole.issues.iter().any(|i| i.rule_code == "POLE.COMM_TO_POWER" && i.context.attachment_ids().contains(&"ADSS1".to_string())));
  assert!(pole.issues.iter().any(|i| i.rule_code == "POLE.COMM_TO_POWER" && i.context.attachment_ids().contains(&"FIBER1".to_string())));
}

#[test]
fn scenario_hole_reuse_allowed() {
  let mut model = Model::default();
  model.poles.push(Pole {
    pole_id: "P1".into(),
    attachments: vec![
      Attachment {
        id: "STATIONARY".into(),
        category: AttachmentCategory::Wire,
        label: "Fiber".into(),
        proposed_in: Some(240),
        ..Attachment::default()
      },
      Attachment {
        id: "MOVED".into(),
        category: AttachmentCategory::Wire,
        label: "Fiber".into(),
        existing_in: Some(300),
        proposed_in: Some(240),
        is_moved: true,
        ..Attachment::default()
      },
    ],
    ..Pole::default()
  });
  let result = run_qc(&model, &Rules::default());
  let pole = result.poles_by_id.get("P1").unwrap();
  assert!(!pole.issues.iter().any(|i| i.rule_code == "POLE.HOLE_BUFFER"));
}

#[test]
fn scenario_midspan_driveway_override() {
  let mut model = Model::default();
  model.midspans.push(Midspan {
    midspan_id: "M1".into(),
    row_type_raw: "Commercial Driveway".into(),
    measures: vec![Measure { id: Some("C1".into()), label: "Fiber".into(), proposed_in: Some(180), ..Measure::default() }],
    ..Midspan::default()
  });
  let result = run_qc(&model, &Rules::default());
  let midspan = result.midspans_by_id.get("M1").unwrap();
  let hit = midspan.issues.iter().find(|i| i.rule_code == "MIDSPAN.MIN_COMM").unwrap();
  assert!(hit.message.contains("15' 6\""), "threshold should be the default 186in minimum: {}", hit.message);
}

#[test]
fn scenario_endpoint_ordering_reversal() {
  let mut model = Model::default();
  model.poles.push(Pole {
    pole_id: "PA".into(),
    attachments: vec![wire("A-X", "X", "Fiber", 300), wire("A-Y", "Y", "Fiber", 280)],
    ..Pole::default()
  });
  model.poles.push(Pole {
    pole_id: "PB".into(),
    attachments: vec![wire("B-X", "X", "Fiber", 280), wire("B-Y", "Y", "Fiber", 300)],
    ..Pole::default()
  });
  model.spans.push(Span {
    connection_id: "C1".into(),
    a_node_id: "PA".into(),
    b_node_id: "PB".into(),
    a_is_pole: true,
    b_is_pole: true,
    ..Span::default()
  });
  let result = run_qc(&model, &Rules::default());
  let pa = result.poles_by_id.get("PA").unwrap();
  let pb = result.poles_by_id.get("PB").unwrap();
  assert!(pa.issues.iter().any(|i| i.rule_code == "ORDER.COMM.ENDPOINTS" && i.severity == Severity::Fail));
  assert!(pb.issues.iter().any(|i| i.rule_code == "ORDER.COMM.ENDPOINTS" && i.severity == Severity::Fail));
  assert!(pa.has_comm_order_issue);
  assert!(pb.has_comm_order_issue);
}

#[test]
fn scenario_midspan_same_height_different_owners() {
  let mut model = Model::default();
  model.midspans.push(Midspan {
    midspan_id: "M1".into(),
    measures: vec![
      Measure { id: Some("X".into()), owner: "AcmeFiber".into(), label: "Fiber".into(), proposed_in: Some(210), ..Measure::default() },
      Measure { id: Some("Y".into()), owner: "OtherTelecom".into(), label: "Fiber".into(), proposed_in: Some(210), ..Measure::default() },
    ],
    ..Midspan::default()
  });
  let result = run_qc(&model, &Rules::default());
  let midspan = result.midspans_by_id.get("M1").unwrap();
  assert!(midspan.issues.iter().any(|i| i.rule_code == "MIDSPAN.COMM_SEP" && i.severity == Severity::Fail));
}

#[test]
fn determinism_across_repeated_runs() {
  let mut model = Model::default();
  model.poles.push(Pole {
    pole_id: "P1".into(),
    attachments: vec![wire("A1", "Acme", "Fiber", 180), wire("A2", "PowerCo", "Neutral", 260)],
    ..Pole::default()
  });
  let rules = Rules::default();
  let a = run_qc(&model, &rules);
  let b = run_qc(&model, &rules);
  assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::to_value(&b).unwrap());
}
