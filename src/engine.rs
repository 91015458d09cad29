//! The QC engine (§4.6): orchestrates the three evaluators, merges their
//! output per entity, deduplicates globally, and derives pass/warn/fail
//! status.

use crate::eval::{midspan as midspan_eval, ordering, pole as pole_eval};
use crate::issue::{EntityType, Issue, Severity};
use crate::model::Model;
use crate::rules::Rules;
use hashbrown::HashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Pass,
  Warn,
  Fail,
}

/// Pass if no issue, else warn if no FAIL issue, else fail (§4.6 status
/// derivation law). The same law applies uniformly to poles and midspans.
fn derive_status(issues: &[Issue]) -> Status {
  if issues.iter().any(|i| i.severity == Severity::Fail) {
    Status::Fail
  } else if issues.iter().any(|i| i.severity == Severity::Warn) {
    Status::Warn
  } else {
    Status::Pass
  }
}

/// Removes duplicate issues by the canonical dedup key (§4.6), keeping the
/// first occurrence and otherwise preserving order.
fn dedup_issues(issues: Vec<Issue>) -> Vec<Issue> {
  let mut seen = HashSet::new();
  issues
    .into_iter()
    .filter(|issue| seen.insert(issue.dedup_key()))
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoleResult {
  pub status: Status,
  pub issues: Vec<Issue>,
  pub has_comm_order_issue: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MidspanResult {
  pub status: Status,
  pub issues: Vec<Issue>,
  pub has_comm_order_issue: bool,
}

/// Per-entity pass/warn/fail/unknown roll-up (§4.6, §6). `unknown` has no
/// producer in this engine today — every pole/midspan this crate sees
/// resolves to pass, warn, or fail — but the field is part of the external
/// interface contract and stays present (always zero) for that reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCounts {
  pub pass: usize,
  pub warn: usize,
  pub fail: usize,
  pub unknown: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCounts {
  pub warn: usize,
  pub fail: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub poles: EntityCounts,
  pub midspans: EntityCounts,
  pub issues: IssueCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QcResult {
  /// §6: `polesById: map<PoleId, {status, issues, hasCommOrderIssue}>`.
  /// An `IndexMap` keeps lookups id-keyed while preserving the
  /// deterministic (sorted-by-id) insertion order built in `run_qc`.
  pub poles_by_id: IndexMap<String, PoleResult>,
  /// §6: `midspansById: map<MidspanId, {status, issues, hasCommOrderIssue}>`.
  pub midspans_by_id: IndexMap<String, MidspanResult>,
  /// The flat global issue list (§6), in the same order the per-entity
  /// buckets were built: every pole's issues, then every midspan's.
  pub issues: Vec<Issue>,
  pub summary: Summary,
}

fn is_order_issue(issue: &Issue) -> bool {
  issue.rule_code.starts_with("ORDER.COMM")
}

/// Runs every rule in the engine against `model` under `rules` and returns
/// a complete `QcResult` (§4.6). Total and deterministic: the same
/// `(model, rules)` pair always yields byte-identical output (§8).
pub fn run_qc(model: &Model, rules: &Rules) -> QcResult {
  let ordering_issues = ordering::evaluate(model);

  let mut pole_entries: Vec<(String, PoleResult)> = model
    .poles
    .iter()
    .map(|pole| {
      let mut issues = pole_eval::evaluate(pole, &rules.pole);
      issues.extend(
        ordering_issues
          .iter()
          .filter(|i| i.entity_type == EntityType::Pole && i.entity_id == pole.pole_id)
          .cloned(),
      );
      let issues = dedup_issues(issues);
      let status = derive_status(&issues);
      let has_comm_order_issue = issues.iter().any(is_order_issue);
      (pole.pole_id.clone(), PoleResult { status, issues, has_comm_order_issue })
    })
    .collect();

  let mut midspan_entries: Vec<(String, MidspanResult)> = model
    .midspans
    .iter()
    .map(|midspan| {
      let mut issues = midspan_eval::evaluate(midspan, &rules.midspan);
      issues.extend(
        ordering_issues
          .iter()
          .filter(|i| i.entity_type == EntityType::Midspan && i.entity_id == midspan.midspan_id)
          .cloned(),
      );
      let issues = dedup_issues(issues);
      let status = derive_status(&issues);
      let has_comm_order_issue = issues.iter().any(is_order_issue);
      (midspan.midspan_id.clone(), MidspanResult { status, issues, has_comm_order_issue })
    })
    .collect();

  pole_entries.sort_by(|a, b| a.0.cmp(&b.0));
  midspan_entries.sort_by(|a, b| a.0.cmp(&b.0));

  let mut summary = Summary::default();
  for (_, p) in &pole_entries {
    match p.status {
      Status::Pass => summary.poles.pass += 1,
      Status::Warn => summary.poles.warn += 1,
      Status::Fail => summary.poles.fail += 1,
    }
    for issue in &p.issues {
      match issue.severity {
        Severity::Warn => summary.issues.warn += 1,
        Severity::Fail => summary.issues.fail += 1,
      }
    }
  }
  for (_, m) in &midspan_entries {
    match m.status {
      Status::Pass => summary.midspans.pass += 1,
      Status::Warn => summary.midspans.warn += 1,
      Status::Fail => summary.midspans.fail += 1,
    }
    for issue in &m.issues {
      match issue.severity {
        Severity::Warn => summary.issues.warn += 1,
        Severity::Fail => summary.issues.fail += 1,
      }
    }
  }

  let issues: Vec<Issue> = pole_entries
    .iter()
    .flat_map(|(_, p)| p.issues.iter().cloned())
    .chain(midspan_entries.iter().flat_map(|(_, m)| m.issues.iter().cloned()))
    .collect();

  let poles_by_id: IndexMap<String, PoleResult> = pole_entries.into_iter().collect();
  let midspans_by_id: IndexMap<String, MidspanResult> = midspan_entries.into_iter().collect();

  QcResult { poles_by_id, midspans_by_id, issues, summary }
}
