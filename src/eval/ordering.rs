//! Span-ordering evaluation (§4.5): checks that the relative vertical
//! order of same-span communications owners is preserved across both pole
//! endpoints and the midspan measurement between them.
//!
//! The connection index is built once per `run_qc` call and iterated in
//! insertion order (`IndexMap`) so that issue emission order — and
//! therefore post-dedup ordering — is reproducible across runs (§4.5,
//! §8 determinism).

use crate::classify::Kind;
use crate::issue::{EntityType, Issue, IssueContext, Severity};
use crate::model::{ConnectionId, Midspan, Model, Pole, Span};
use crate::text::normalize_owner_key;
use indexmap::IndexMap;

/// One owner's comm height at a single node, with the ids of every
/// attachment/measure that contributed it (ties at the same height are
/// kept together rather than arbitrarily picking one).
#[derive(Debug, Clone)]
struct OwnerHeight {
  height: i32,
  ids: Vec<String>,
}

type OwnerHeights = IndexMap<String, OwnerHeight>;

/// Keeps the maximum height per owner key (§4.5 Step 1); ties at that
/// height concatenate ids rather than arbitrarily picking one.
fn record(map: &mut OwnerHeights, owner_key: String, height: i32, id: String) {
  match map.get_mut(&owner_key) {
    Some(existing) if height > existing.height => {
      existing.height = height;
      existing.ids = vec![id];
    }
    Some(existing) if height == existing.height => existing.ids.push(id),
    Some(_) => {}
    None => {
      map.insert(owner_key, OwnerHeight { height, ids: vec![id] });
    }
  }
}

fn pole_comm_owner_heights(pole: &Pole) -> OwnerHeights {
  let mut map = OwnerHeights::new();
  for a in &pole.attachments {
    let c = a.classify();
    if c.kind != Kind::Comm || c.is_comm_drop {
      continue;
    }
    let Some(height) = a.proposed_in else { continue };
    let owner_key = normalize_owner_key(&c.owner);
    if owner_key.is_empty() {
      continue;
    }
    record(&mut map, owner_key, height, a.id.clone());
  }
  map
}

fn midspan_comm_owner_heights(midspan: &Midspan) -> OwnerHeights {
  let mut map = OwnerHeights::new();
  for m in &midspan.measures {
    let c = m.classify();
    if c.kind != Kind::Comm || c.is_comm_drop {
      continue;
    }
    let Some(height) = m.proposed_in else { continue };
    let owner_key = normalize_owner_key(&c.owner);
    if owner_key.is_empty() {
      continue;
    }
    if let Some(id) = &m.id {
      record(&mut map, owner_key, height, id.clone());
    }
  }
  map
}

struct ConnectionEntry<'a> {
  connection_id: ConnectionId,
  a: Option<OwnerHeights>,
  a_pole: Option<&'a Pole>,
  b: Option<OwnerHeights>,
  b_pole: Option<&'a Pole>,
  midspan: Option<&'a Midspan>,
}

fn build_connection_index(model: &Model) -> IndexMap<ConnectionId, ConnectionEntry<'_>> {
  let mut index: IndexMap<ConnectionId, ConnectionEntry<'_>> = IndexMap::new();
  for span in &model.spans {
    let a_pole = if span.a_is_pole { model.pole_by_id(&span.a_node_id) } else { None };
    let b_pole = if span.b_is_pole { model.pole_by_id(&span.b_node_id) } else { None };
    index.insert(
      span.connection_id.clone(),
      ConnectionEntry {
        connection_id: span.connection_id.clone(),
        a: a_pole.map(pole_comm_owner_heights),
        a_pole,
        b: b_pole.map(pole_comm_owner_heights),
        b_pole,
        midspan: None,
      },
    );
  }
  for midspan in &model.midspans {
    match index.get_mut(&midspan.connection_id) {
      Some(entry) => entry.midspan = Some(midspan),
      None => {
        index.insert(
          midspan.connection_id.clone(),
          ConnectionEntry {
            connection_id: midspan.connection_id.clone(),
            a: None,
            a_pole: None,
            b: None,
            b_pole: None,
            midspan: Some(midspan),
          },
        );
      }
    }
  }
  index
}

fn issue(
  severity: Severity,
  entity_type: EntityType,
  entity_id: String,
  entity_name: String,
  rule_code: &'static str,
  message: String,
  context: IssueContext,
) -> Issue {
  Issue { severity, entity_type, entity_id, entity_name, rule_code, message, context }
}

/// Every unordered pair of owners present in both `a` and `b` whose
/// relative order disagrees between the two sides.
fn reversed_pairs<'a>(a: &'a OwnerHeights, b: &'a OwnerHeights) -> Vec<(&'a str, &'a OwnerHeight, &'a OwnerHeight, &'a str, &'a OwnerHeight, &'a OwnerHeight)> {
  let mut out = Vec::new();
  let keys: Vec<&String> = a.keys().collect();
  for i in 0..keys.len() {
    for j in (i + 1)..keys.len() {
      let (k1, k2) = (keys[i].as_str(), keys[j].as_str());
      let (Some(a1), Some(a2)) = (a.get(k1), a.get(k2)) else { continue };
      let (Some(b1), Some(b2)) = (b.get(k1), b.get(k2)) else { continue };
      if a1.height == a2.height || b1.height == b2.height {
        continue;
      }
      let a_order = a1.height > a2.height;
      let b_order = b1.height > b2.height;
      if a_order != b_order {
        out.push((k1, a1, a2, k2, b1, b2));
      }
    }
  }
  out
}

/// `true` iff `k1`'s recorded height is above `k2`'s; `None` if either
/// owner is absent from `map` or the two are tied (ambiguous, §4.5).
fn order_of<'a>(map: &'a OwnerHeights, k1: &str, k2: &str) -> Option<(bool, &'a OwnerHeight, &'a OwnerHeight)> {
  let h1 = map.get(k1)?;
  let h2 = map.get(k2)?;
  if h1.height == h2.height {
    return None;
  }
  Some((h1.height > h2.height, h1, h2))
}

/// A local `entity|id|ruleCode|connectionId|sortedPairKey` dedup, per §4.5.
fn emission_key(entity_type: EntityType, entity_id: &str, rule_code: &str, connection_id: &str, k1: &str, k2: &str) -> String {
  let (p1, p2) = if k1 <= k2 { (k1, k2) } else { (k2, k1) };
  format!("{entity_type:?}|{entity_id}|{rule_code}|{connection_id}|{p1},{p2}")
}

/// Evaluates ORDER.COMM.ENDPOINTS and ORDER.COMM.MIDSPAN across every span
/// connection in the model. Returns pole-attributed issues for endpoint
/// reversals and midspan-attributed issues for midspan reversals; the
/// engine merges these into the per-entity issue lists like any other
/// evaluator output and derives `hasCommOrderIssue` from their presence.
pub fn evaluate(model: &Model) -> Vec<Issue> {
  let index = build_connection_index(model);
  let mut issues = Vec::new();
  let mut seen = std::collections::HashSet::new();
  let mut emit = |issues: &mut Vec<Issue>, i: Issue, key: String| {
    if seen.insert(key) {
      issues.push(i);
    }
  };

  for entry in index.values() {
    // Step 3: ORDER.COMM.ENDPOINTS, only when both endpoints carry at
    // least two distinct comm owners each.
    if let (Some(a), Some(b), Some(a_pole), Some(b_pole)) = (&entry.a, &entry.b, entry.a_pole, entry.b_pole) {
      if a.len() >= 2 && b.len() >= 2 {
        for (k1, a1, a2, k2, b1, b2) in reversed_pairs(a, b) {
          let ids: Vec<String> = a1.ids.iter().chain(a2.ids.iter()).chain(b1.ids.iter()).chain(b2.ids.iter()).cloned().collect();
          let msg = format!(
            "Communications order between {k1} and {k2} reverses between the two ends of connection {}.",
            entry.connection_id
          );
          let key_a = emission_key(EntityType::Pole, &a_pole.pole_id, "ORDER.COMM.ENDPOINTS", &entry.connection_id, k1, k2);
          emit(
            &mut issues,
            issue(
              Severity::Fail,
              EntityType::Pole,
              a_pole.pole_id.clone(),
              a_pole.name_for_display().to_string(),
              "ORDER.COMM.ENDPOINTS",
              msg.clone(),
              IssueContext::new().with_attachment_ids(ids.clone()).with("connectionId", entry.connection_id.clone()),
            ),
            key_a,
          );
          let key_b = emission_key(EntityType::Pole, &b_pole.pole_id, "ORDER.COMM.ENDPOINTS", &entry.connection_id, k1, k2);
          emit(
            &mut issues,
            issue(
              Severity::Fail,
              EntityType::Pole,
              b_pole.pole_id.clone(),
              b_pole.name_for_display().to_string(),
              "ORDER.COMM.ENDPOINTS",
              msg,
              IssueContext::new().with_attachment_ids(ids).with("connectionId", entry.connection_id.clone()),
            ),
            key_b,
          );
        }
      }
    }

    // Step 4: ORDER.COMM.MIDSPAN, for every owner pair present at the
    // midspan itself.
    let Some(midspan) = entry.midspan else { continue };
    let mid = midspan_comm_owner_heights(midspan);
    let keys: Vec<&String> = mid.keys().collect();
    for i in 0..keys.len() {
      for j in (i + 1)..keys.len() {
        let (k1, k2) = (keys[i].as_str(), keys[j].as_str());
        let a_order = entry.a.as_ref().and_then(|a| order_of(a, k1, k2));
        let b_order = entry.b.as_ref().and_then(|b| order_of(b, k1, k2));

        let (reference, severity, contributors): (bool, Severity, Vec<(&Pole, &OwnerHeight, &OwnerHeight)>) =
          match (a_order, b_order) {
            (Some((ao, a1, a2)), Some((bo, b1, b2))) if ao != bo => {
              // Endpoints disagree outright: report the conflict without
              // needing the midspan's own reading.
              let ids: Vec<String> = a1.ids.iter().chain(a2.ids.iter()).chain(b1.ids.iter()).chain(b2.ids.iter()).cloned().collect();
              let key = emission_key(EntityType::Midspan, &midspan.midspan_id, "ORDER.COMM.MIDSPAN", &entry.connection_id, k1, k2);
              emit(
                &mut issues,
                issue(
                  Severity::Fail,
                  EntityType::Midspan,
                  midspan.midspan_id.clone(),
                  midspan.midspan_id.clone(),
                  "ORDER.COMM.MIDSPAN",
                  format!(
                    "Communications order between {k1} and {k2} disagrees between the two endpoints of connection {}.",
                    entry.connection_id
                  ),
                  IssueContext::new().with_attachment_ids(ids).with("connectionId", entry.connection_id.clone()),
                ),
                key,
              );
              continue;
            }
            (Some((ao, a1, a2)), Some((_, b1, b2))) => {
              (ao, Severity::Fail, vec![(entry.a_pole.unwrap(), a1, a2), (entry.b_pole.unwrap(), b1, b2)])
            }
            (Some((ao, a1, a2)), None) => (ao, Severity::Warn, vec![(entry.a_pole.unwrap(), a1, a2)]),
            (None, Some((bo, b1, b2))) => (bo, Severity::Warn, vec![(entry.b_pole.unwrap(), b1, b2)]),
            (None, None) => continue,
          };

        let Some((mid_order, m1, m2)) = order_of(&mid, k1, k2) else { continue };
        if mid_order == reference {
          continue;
        }

        let measure_ids: Vec<String> = m1.ids.iter().chain(m2.ids.iter()).cloned().collect();
        let contributor_ids: Vec<String> =
          contributors.iter().flat_map(|(_, h1, h2)| h1.ids.iter().chain(h2.ids.iter())).cloned().collect();
        let key = emission_key(EntityType::Midspan, &midspan.midspan_id, "ORDER.COMM.MIDSPAN", &entry.connection_id, k1, k2);
        emit(
          &mut issues,
          issue(
            severity,
            EntityType::Midspan,
            midspan.midspan_id.clone(),
            midspan.midspan_id.clone(),
            "ORDER.COMM.MIDSPAN",
            format!(
              "Communications order between {k1} and {k2} at the midspan disagrees with the reference order on connection {}.",
              entry.connection_id
            ),
            IssueContext::new()
              .with_attachment_ids(contributor_ids.clone())
              .with_measure_ids(measure_ids)
              .with("connectionId", entry.connection_id.clone()),
          ),
          key,
        );

        for (pole, h1, h2) in &contributors {
          let ids: Vec<String> = h1.ids.iter().chain(h2.ids.iter()).cloned().collect();
          let key = emission_key(EntityType::Pole, &pole.pole_id, "ORDER.COMM.MIDSPAN", &entry.connection_id, k1, k2);
          emit(
            &mut issues,
            issue(
              severity,
              EntityType::Pole,
              pole.pole_id.clone(),
              pole.name_for_display().to_string(),
              "ORDER.COMM.MIDSPAN",
              format!(
                "Communications order between {k1} and {k2} in the midspan of connection {} disagrees with this pole's order.",
                entry.connection_id
              ),
              IssueContext::new().with_attachment_ids(ids).with("connectionId", entry.connection_id.clone()),
            ),
            key,
          );
        }
      }
    }
  }

  issues
}
