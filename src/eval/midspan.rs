//! Midspan-local rule evaluation (§4.4). Mirrors the Pole Evaluator's
//! structure but operates over a midspan's `Measure`s rather than a pole's
//! `Attachment`s, and the comm-to-comm separation has a single threshold
//! rather than a same-owner/different-owner split.

use crate::classify::Kind;
use crate::issue::{EntityType, Issue, IssueContext, Severity};
use crate::model::{Measure, Midspan, RowType};
use crate::rules::MidspanRules;
use crate::text::normalize_owner_key;
use crate::units::{fmt_ft_in, fmt_sep_in};
use hashbrown::HashMap;

struct Classified<'a> {
  measure: &'a Measure,
  kind: Kind,
  owner_key: String,
  is_adss: bool,
}

fn classify_all(midspan: &Midspan) -> Vec<Classified<'_>> {
  midspan
    .measures
    .iter()
    .map(|m| {
      let c = m.classify();
      Classified { measure: m, kind: c.kind, owner_key: normalize_owner_key(&c.owner), is_adss: c.is_adss }
    })
    .collect()
}

fn issue(
  severity: Severity,
  midspan: &Midspan,
  rule_code: &'static str,
  message: String,
  context: IssueContext,
) -> Issue {
  Issue {
    severity,
    entity_type: EntityType::Midspan,
    entity_id: midspan.midspan_id.clone(),
    entity_name: midspan.midspan_id.clone(),
    rule_code,
    message,
    context,
  }
}

fn min_comm_threshold(midspan: &Midspan, rules: &MidspanRules) -> i32 {
  if midspan.is_driveway_override() {
    return rules.min_comm_default_in;
  }
  match midspan.row_type() {
    RowType::Default => rules.min_comm_default_in,
    RowType::Pedestrian => rules.min_comm_pedestrian_in,
    RowType::Highway => rules.min_comm_highway_in,
    RowType::Farm => rules.min_comm_farm_in,
    RowType::Rail => rules.min_comm_rail_in,
  }
}

/// Evaluates every midspan-local rule for one midspan, returning the full
/// issue list (§4.4 contract).
pub fn evaluate(midspan: &Midspan, rules: &MidspanRules) -> Vec<Issue> {
  let classified = classify_all(midspan);
  let mut issues = Vec::new();
  missing_row(midspan, rules, &mut issues);
  min_comm(midspan, rules, &classified, &mut issues);
  min_power_only(midspan, rules, &classified, &mut issues);
  comm_sep(midspan, rules, &classified, &mut issues);
  comm_to_power(midspan, rules, &classified, &mut issues);
  adss_top(midspan, rules, &classified, &mut issues);
  issues
}

/// MIDSPAN.MISSING_ROW (WARN).
fn missing_row(midspan: &Midspan, rules: &MidspanRules, issues: &mut Vec<Issue>) {
  if rules.warn_missing_row_type && midspan.is_missing_row_type() {
    issues.push(issue(
      Severity::Warn,
      midspan,
      "MIDSPAN.MISSING_ROW",
      "Midspan is missing a right-of-way type.".to_string(),
      IssueContext::new(),
    ));
  }
}

const POWER_KINDS: [Kind; 4] = [Kind::PowerPrimary, Kind::PowerNeutral, Kind::PowerSecondary, Kind::PowerOther];

/// MIDSPAN.MIN_COMM (FAIL).
fn min_comm(midspan: &Midspan, rules: &MidspanRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let comms: Vec<&Classified> = classified.iter().filter(|c| c.kind == Kind::Comm && c.measure.proposed_in.is_some()).collect();
  let Some(min_height) = comms.iter().filter_map(|c| c.measure.proposed_in).min() else {
    return;
  };
  let threshold = min_comm_threshold(midspan, rules);
  if min_height < threshold {
    let offenders: Vec<String> = comms
      .iter()
      .filter(|c| c.measure.proposed_in == Some(min_height))
      .filter_map(|c| c.measure.id.clone())
      .collect();
    issues.push(issue(
      Severity::Fail,
      midspan,
      "MIDSPAN.MIN_COMM",
      format!(
        "Lowest communications measure is at {}, below the minimum of {}.",
        fmt_ft_in(min_height), fmt_ft_in(threshold)
      ),
      IssueContext::new().with_measure_ids(offenders),
    ));
  }
}

/// MIDSPAN.MIN_POWER_ONLY (FAIL): when a midspan carries no communications
/// measure at all, the lowest power wire must clear the row-type comm
/// minimum plus an extra 12" (§4.4: `min(power.proposed) >= reqComm + 12`).
fn min_power_only(midspan: &Midspan, rules: &MidspanRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let has_comm = classified.iter().any(|c| c.kind == Kind::Comm);
  if has_comm {
    return;
  }
  let power: Vec<&Classified> = classified
    .iter()
    .filter(|c| POWER_KINDS.contains(&c.kind) && c.measure.proposed_in.is_some())
    .collect();
  let Some(min_height) = power.iter().filter_map(|c| c.measure.proposed_in).min() else {
    return;
  };
  let threshold = min_comm_threshold(midspan, rules) + 12;
  if min_height < threshold {
    let offenders: Vec<String> = power
      .iter()
      .filter(|c| c.measure.proposed_in == Some(min_height))
      .filter_map(|c| c.measure.id.clone())
      .collect();
    issues.push(issue(
      Severity::Fail,
      midspan,
      "MIDSPAN.MIN_POWER_ONLY",
      format!(
        "Midspan carries no communications measure; the lowest power wire at {} is below the minimum of {}.",
        fmt_ft_in(min_height), fmt_ft_in(threshold)
      ),
      IssueContext::new().with_measure_ids(offenders),
    ));
  }
}

struct CommGroup {
  owner_key: String,
  height: i32,
  is_installing_company: bool,
  ids: Vec<String>,
}

fn dedup_comm_groups(classified: &[Classified<'_>], installing_company_key: &str) -> Vec<CommGroup> {
  let mut groups: Vec<CommGroup> = Vec::new();
  let mut index: HashMap<(String, i32), usize> = HashMap::new();
  for c in classified {
    if c.kind != Kind::Comm {
      continue;
    }
    let Some(height) = c.measure.proposed_in else { continue };
    let key = (c.owner_key.clone(), height);
    match index.get(&key) {
      Some(&i) => {
        if let Some(id) = &c.measure.id {
          groups[i].ids.push(id.clone());
        }
      }
      None => {
        index.insert(key.clone(), groups.len());
        groups.push(CommGroup {
          owner_key: c.owner_key.clone(),
          height,
          is_installing_company: !installing_company_key.is_empty() && c.owner_key == installing_company_key,
          ids: c.measure.id.clone().into_iter().collect(),
        });
      }
    }
  }
  groups
}

/// MIDSPAN.COMM_SEP (FAIL). A pair involving the configured installing
/// company uses `installingCompanyCommSepIn` instead of the ordinary
/// `commSepIn` threshold.
fn comm_sep(midspan: &Midspan, rules: &MidspanRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let installing_company_key = normalize_owner_key(&rules.installing_company);
  let groups = dedup_comm_groups(classified, &installing_company_key);
  for i in 0..groups.len() {
    for j in (i + 1)..groups.len() {
      let (a, b) = (&groups[i], &groups[j]);
      let delta = (a.height - b.height).abs();
      let same_owner = !a.owner_key.is_empty() && a.owner_key == b.owner_key;
      if same_owner && delta == 0 {
        continue;
      }
      let required = if a.is_installing_company || b.is_installing_company {
        rules.comm_sep_in.max(rules.installing_company_comm_sep_in)
      } else {
        rules.comm_sep_in
      };
      if delta < required {
        issues.push(issue(
          Severity::Fail,
          midspan,
          "MIDSPAN.COMM_SEP",
          format!(
            "Communications measures at {} and {} are separated by {}, below the minimum of {}.",
            fmt_ft_in(a.height), fmt_ft_in(b.height), fmt_sep_in(delta), fmt_sep_in(required)
          ),
          IssueContext::new().with_measure_ids(a.ids.iter().chain(b.ids.iter()).cloned()),
        ));
      }
    }
  }
}

/// MIDSPAN.COMM_TO_POWER (FAIL).
fn comm_to_power(midspan: &Midspan, rules: &MidspanRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let low_power = classified
    .iter()
    .filter(|c| POWER_KINDS.contains(&c.kind))
    .filter_map(|c| c.measure.proposed_in)
    .min();
  let Some(low_power) = low_power else { return };

  for c in classified.iter().filter(|c| c.kind == Kind::Comm) {
    let Some(height) = c.measure.proposed_in else { continue };
    let required = if c.is_adss { rules.adss_comm_to_power_sep_in } else { rules.comm_to_power_sep_in };
    let sep = low_power - height;
    if sep < required {
      issues.push(issue(
        Severity::Fail,
        midspan,
        "MIDSPAN.COMM_TO_POWER",
        format!(
          "Communications measure at {} is separated from the lowest power at {} by {}, below the minimum of {}.",
          fmt_ft_in(height), fmt_ft_in(low_power), fmt_sep_in(sep), fmt_sep_in(required)
        ),
        IssueContext::new().with_measure_ids(c.measure.id.clone().into_iter().collect::<Vec<_>>()),
      ));
    }
  }
}

/// MIDSPAN.ADSS_TOP (FAIL, when enforced).
fn adss_top(midspan: &Midspan, rules: &MidspanRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  if !rules.enforce_adss_highest {
    return;
  }
  let comms: Vec<&Classified> = classified.iter().filter(|c| c.kind == Kind::Comm && c.measure.proposed_in.is_some()).collect();
  if !comms.iter().any(|c| c.is_adss) {
    return;
  }
  let Some(top_height) = comms.iter().filter_map(|c| c.measure.proposed_in).max() else {
    return;
  };
  let top_items: Vec<&&Classified> = comms.iter().filter(|c| c.measure.proposed_in == Some(top_height)).collect();
  if top_items.iter().any(|c| c.is_adss) {
    return;
  }
  let Some(highest_adss_height) = comms.iter().filter(|c| c.is_adss).filter_map(|c| c.measure.proposed_in).max() else {
    return;
  };
  let highest_adss_items: Vec<&&Classified> = comms
    .iter()
    .filter(|c| c.is_adss && c.measure.proposed_in == Some(highest_adss_height))
    .collect();
  let ids: Vec<String> = top_items
    .iter()
    .chain(highest_adss_items.iter())
    .filter_map(|c| c.measure.id.clone())
    .collect();
  issues.push(issue(
    Severity::Fail,
    midspan,
    "MIDSPAN.ADSS_TOP",
    format!(
      "An ADSS cable at {} is not the highest communications measure; a non-ADSS measure sits at {}.",
      fmt_ft_in(highest_adss_height), fmt_ft_in(top_height)
    ),
    IssueContext::new().with_measure_ids(ids),
  ));
}

#[cfg(test)]
mod tests {
  use super::*;

  fn measure(id: &str, label: &str, proposed_in: Option<i32>) -> Measure {
    Measure { id: Some(id.to_string()), label: label.to_string(), proposed_in, ..Measure::default() }
  }

  #[test]
  fn test_scenario_midspan_driveway_override() {
    let midspan = Midspan {
      midspan_id: "M1".into(),
      row_type_raw: "Highway Driveway".into(),
      measures: vec![measure("C1", "Fiber", Some(150))],
      ..Midspan::default()
    };
    let rules = MidspanRules::default();
    let issues = evaluate(&midspan, &rules);
    let hits: Vec<&Issue> = issues.iter().filter(|i| i.rule_code == "MIDSPAN.MIN_COMM").collect();
    assert_eq!(hits.len(), 1, "driveway override should apply the default minimum, not the highway minimum");
  }

  #[test]
  fn test_scenario_same_height_different_owners_fails() {
    let mut midspan = Midspan { midspan_id: "M1".into(), ..Midspan::default() };
    midspan.measures.push(Measure { id: Some("A".into()), owner: "AcmeFiber".into(), label: "Fiber".into(), proposed_in: Some(200), ..Measure::default() });
    midspan.measures.push(Measure { id: Some("B".into()), owner: "OtherTelecom".into(), label: "Fiber".into(), proposed_in: Some(200), ..Measure::default() });
    let rules = MidspanRules::default();
    let issues = evaluate(&midspan, &rules);
    assert!(issues.iter().any(|i| i.rule_code == "MIDSPAN.COMM_SEP"));
  }

  #[test]
  fn test_min_power_only_flags_when_no_comm_present() {
    let midspan = Midspan {
      midspan_id: "M1".into(),
      measures: vec![measure("P1", "Neutral", Some(100))],
      ..Midspan::default()
    };
    let rules = MidspanRules::default();
    let issues = evaluate(&midspan, &rules);
    assert!(issues.iter().any(|i| i.rule_code == "MIDSPAN.MIN_POWER_ONLY"));
  }

  #[test]
  fn test_missing_row_warns() {
    let midspan = Midspan { midspan_id: "M1".into(), ..Midspan::default() };
    let issues = evaluate(&midspan, &MidspanRules::default());
    assert!(issues.iter().any(|i| i.rule_code == "MIDSPAN.MISSING_ROW" && i.severity == Severity::Warn));
  }

  /// §4.4: "install min = max(base, installingCompanyCommSepIn)". A base
  /// `commSepIn` stricter than the installing-company allowance must still
  /// apply when the installing company participates in the pair.
  #[test]
  fn test_comm_sep_installing_company_uses_max_of_base_and_install() {
    let mut midspan = Midspan { midspan_id: "M1".into(), ..Midspan::default() };
    midspan.measures.push(Measure { id: Some("A".into()), owner: "Acme".into(), label: "Fiber".into(), proposed_in: Some(200), ..Measure::default() });
    midspan.measures.push(Measure { id: Some("B".into()), owner: "Other".into(), label: "Fiber".into(), proposed_in: Some(206), ..Measure::default() });
    let rules = MidspanRules {
      comm_sep_in: 10,
      installing_company: "Acme".into(),
      installing_company_comm_sep_in: 4,
      ..MidspanRules::default()
    };
    let issues = evaluate(&midspan, &rules);
    assert!(
      issues.iter().any(|i| i.rule_code == "MIDSPAN.COMM_SEP"),
      "delta of 6 is below the base commSepIn of 10 and must still fail even though it clears installingCompanyCommSepIn"
    );
  }
}
