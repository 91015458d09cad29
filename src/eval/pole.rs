//! Pole-local rule evaluation (§4.3).
//!
//! `evaluate` never consults any other pole or midspan — only the
//! Span-Ordering evaluator crosses entities (§9 Design Notes: evaluator
//! isolation). Every rule here silently skips when a field it needs is
//! absent (§7); nothing in this module returns a `Result`.

use crate::classify::Kind;
use crate::issue::{EntityType, Issue, IssueContext, Severity};
use crate::model::{Attachment, Pole};
use crate::rules::PoleRules;
use crate::text::normalize_owner_key;
use crate::units::{fmt_ft_in, fmt_sep_in};
use hashbrown::HashMap;

struct Classified<'a> {
  attachment: &'a Attachment,
  kind: Kind,
  owner_key: String,
  is_adss: bool,
  is_riser: bool,
  is_transformer: bool,
  is_comm_drop: bool,
  is_drip_loop: bool,
}

fn classify_all(pole: &Pole) -> Vec<Classified<'_>> {
  pole
    .attachments
    .iter()
    .map(|a| {
      let c = a.classify();
      Classified {
        attachment: a,
        kind: c.kind,
        owner_key: normalize_owner_key(&c.owner),
        is_adss: c.is_adss,
        is_riser: c.is_riser,
        is_transformer: c.is_transformer,
        is_comm_drop: c.is_comm_drop,
        is_drip_loop: c.is_drip_loop,
      }
    })
    .collect()
}

fn issue(
  severity: Severity,
  pole: &Pole,
  rule_code: &'static str,
  message: String,
  context: IssueContext,
) -> Issue {
  Issue {
    severity,
    entity_type: EntityType::Pole,
    entity_id: pole.pole_id.clone(),
    entity_name: pole.name_for_display().to_string(),
    rule_code,
    message,
    context,
  }
}

/// Evaluates every pole-local rule for one pole, returning the full issue
/// list (§4.3 contract: `evaluatePole(pole, rules) -> issues`; final
/// per-entity status is derived by the engine after merging ordering
/// issues and deduplicating, §4.6).
pub fn evaluate(pole: &Pole, rules: &PoleRules) -> Vec<Issue> {
  let classified = classify_all(pole);
  let mut issues = Vec::new();
  missing_id(pole, rules, &mut issues);
  min_comm(pole, rules, &classified, &mut issues);
  comm_sep(pole, rules, &classified, &mut issues);
  adss_top(pole, rules, &classified, &mut issues);
  comm_to_power(pole, rules, &classified, &mut issues);
  comm_to_streetlight(pole, rules, &classified, &mut issues);
  hole_buffer(pole, rules, &classified, &mut issues);
  equip_move(pole, rules, &classified, &mut issues);
  power_order(pole, rules, &classified, &mut issues);
  ns_below_xfmr(pole, rules, &classified, &mut issues);
  issues
}

/// POLE.MISSING_ID (WARN).
fn missing_id(pole: &Pole, rules: &PoleRules, issues: &mut Vec<Issue>) {
  if rules.warn_missing_pole_identifiers && pole.is_missing_identifiers() {
    issues.push(issue(
      Severity::Warn,
      pole,
      "POLE.MISSING_ID",
      format!("Pole {} is missing a SCID, pole tag, and pole spec.", pole.name_for_display()),
      IssueContext::new(),
    ));
  }
}

/// POLE.MIN_COMM (FAIL).
fn min_comm(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let comms: Vec<&Classified> = classified
    .iter()
    .filter(|c| c.kind == Kind::Comm && c.attachment.proposed_in.is_some())
    .collect();
  let Some(&min_height) = comms.iter().filter_map(|c| c.attachment.proposed_in).collect::<Vec<_>>().iter().min() else {
    return;
  };
  if min_height < rules.min_lowest_comm_attach_in {
    let offenders: Vec<&Classified> = comms
      .iter()
      .copied()
      .filter(|c| c.attachment.proposed_in == Some(min_height))
      .collect();
    issues.push(issue(
      Severity::Fail,
      pole,
      "POLE.MIN_COMM",
      format!(
        "Lowest communications attachment is at {}, below the minimum of {}.",
        fmt_ft_in(min_height),
        fmt_ft_in(rules.min_lowest_comm_attach_in)
      ),
      IssueContext::new().with_attachment_ids(offenders.iter().map(|c| c.attachment.id.clone())),
    ));
  }
}

struct CommGroup {
  owner_key: String,
  height: i32,
  ids: Vec<String>,
}

fn dedup_comm_groups(classified: &[Classified<'_>]) -> Vec<CommGroup> {
  let mut groups: Vec<CommGroup> = Vec::new();
  let mut index: HashMap<(String, i32), usize> = HashMap::new();
  for c in classified {
    if c.kind != Kind::Comm {
      continue;
    }
    let Some(height) = c.attachment.proposed_in else {
      continue;
    };
    let key = (c.owner_key.clone(), height);
    match index.get(&key) {
      Some(&i) => groups[i].ids.push(c.attachment.id.clone()),
      None => {
        index.insert(key.clone(), groups.len());
        groups.push(CommGroup {
          owner_key: c.owner_key.clone(),
          height,
          ids: vec![c.attachment.id.clone()],
        });
      }
    }
  }
  groups
}

/// POLE.COMM_SEP_DIFF / POLE.COMM_SEP_SAME (FAIL).
fn comm_sep(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let groups = dedup_comm_groups(classified);
  for i in 0..groups.len() {
    for j in (i + 1)..groups.len() {
      let (a, b) = (&groups[i], &groups[j]);
      let delta = (a.height - b.height).abs();
      let same_owner = !a.owner_key.is_empty() && a.owner_key == b.owner_key;
      let ctx = || {
        IssueContext::new().with_attachment_ids(a.ids.iter().chain(b.ids.iter()).cloned())
      };
      if same_owner {
        if delta != 0 && delta < rules.comm_sep_same_in {
          issues.push(issue(
            Severity::Fail,
            pole,
            "POLE.COMM_SEP_SAME",
            format!(
              "Communications attachments from the same owner at {} and {} are separated by {}, below the minimum of {}.",
              fmt_ft_in(a.height), fmt_ft_in(b.height), fmt_sep_in(delta), fmt_sep_in(rules.comm_sep_same_in)
            ),
            ctx(),
          ));
        }
      } else if !a.owner_key.is_empty() && !b.owner_key.is_empty() && delta < rules.comm_sep_diff_in {
        issues.push(issue(
          Severity::Fail,
          pole,
          "POLE.COMM_SEP_DIFF",
          format!(
            "Communications attachments from different owners at {} and {} are separated by {}, below the minimum of {}.",
            fmt_ft_in(a.height), fmt_ft_in(b.height), fmt_sep_in(delta), fmt_sep_in(rules.comm_sep_diff_in)
          ),
          ctx(),
        ));
      }
    }
  }
}

/// POLE.ADSS_TOP (FAIL, when enforced).
fn adss_top(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  if !rules.enforce_adss_highest {
    return;
  }
  let comms: Vec<&Classified> = classified
    .iter()
    .filter(|c| c.kind == Kind::Comm && c.attachment.proposed_in.is_some())
    .collect();
  if !comms.iter().any(|c| c.is_adss) {
    return;
  }
  let Some(top_height) = comms.iter().filter_map(|c| c.attachment.proposed_in).max() else {
    return;
  };
  let top_items: Vec<&&Classified> = comms.iter().filter(|c| c.attachment.proposed_in == Some(top_height)).collect();
  if top_items.iter().any(|c| c.is_adss) {
    return;
  }
  let Some(highest_adss_height) = comms.iter().filter(|c| c.is_adss).filter_map(|c| c.attachment.proposed_in).max() else {
    return;
  };
  let highest_adss_items: Vec<&&Classified> = comms
    .iter()
    .filter(|c| c.is_adss && c.attachment.proposed_in == Some(highest_adss_height))
    .collect();
  let ids = top_items
    .iter()
    .chain(highest_adss_items.iter())
    .map(|c| c.attachment.id.clone());
  issues.push(issue(
    Severity::Fail,
    pole,
    "POLE.ADSS_TOP",
    format!(
      "An ADSS cable at {} is not the highest communications attachment; a non-ADSS attachment sits at {}.",
      fmt_ft_in(highest_adss_height), fmt_ft_in(top_height)
    ),
    IssueContext::new().with_attachment_ids(ids),
  ));
}

const POWER_OWNER_HEURISTIC_TOKENS: &[&str] = &["electric", "power", "energy", "utility", "coop"];

fn most_common_power_owner_key(classified: &[Classified<'_>]) -> Option<String> {
  let power_kinds = [Kind::PowerPrimary, Kind::PowerNeutral, Kind::PowerSecondary, Kind::PowerOther];
  let mut counts: Vec<(String, usize)> = Vec::new();
  for c in classified {
    if power_kinds.contains(&c.kind) && !c.owner_key.is_empty() {
      match counts.iter_mut().find(|(k, _)| *k == c.owner_key) {
        Some((_, n)) => *n += 1,
        None => counts.push((c.owner_key.clone(), 1)),
      }
    }
  }
  counts.into_iter().max_by_key(|(_, n)| *n).map(|(k, _)| k)
}

enum RiserOwnership {
  Power,
  Comm,
  Unknown,
}

fn riser_ownership(c: &Classified<'_>, pole: &Pole, most_common_power_owner: &Option<String>) -> RiserOwnership {
  if c.owner_key.is_empty() {
    return RiserOwnership::Unknown;
  }
  if let Some(pk) = most_common_power_owner {
    if &c.owner_key == pk {
      return RiserOwnership::Power;
    }
  }
  let pole_owner_key = normalize_owner_key(&pole.pole_owner);
  if !pole_owner_key.is_empty() && c.owner_key == pole_owner_key {
    return RiserOwnership::Power;
  }
  let owner_text = c.attachment.owner.to_lowercase();
  if POWER_OWNER_HEURISTIC_TOKENS.iter().any(|t| owner_text.contains(t)) {
    return RiserOwnership::Power;
  }
  RiserOwnership::Comm
}

/// POLE.COMM_TO_POWER (FAIL, or WARN for a riser of unknown ownership).
fn comm_to_power(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let power_kinds = [Kind::PowerPrimary, Kind::PowerNeutral, Kind::PowerSecondary, Kind::PowerOther];
  let low_power_candidates: Vec<i32> = classified
    .iter()
    .filter(|c| power_kinds.contains(&c.kind) || c.kind == Kind::PowerDripLoop)
    .filter_map(|c| c.attachment.proposed_in)
    .collect();
  let Some(low_power) = low_power_candidates.into_iter().min() else {
    return;
  };

  let most_common_power_owner = most_common_power_owner_key(classified);

  for c in classified {
    let Some(height) = c.attachment.proposed_in else {
      continue;
    };
    let severity = if c.kind == Kind::Comm {
      Severity::Fail
    } else if c.is_riser {
      match riser_ownership(c, pole, &most_common_power_owner) {
        RiserOwnership::Power => continue,
        RiserOwnership::Comm => Severity::Fail,
        RiserOwnership::Unknown => Severity::Warn,
      }
    } else {
      continue;
    };
    let required = if c.is_adss { rules.adss_comm_to_power_sep_in } else { rules.comm_to_power_sep_in };
    let sep = low_power - height;
    if sep < required {
      issues.push(issue(
        severity,
        pole,
        "POLE.COMM_TO_POWER",
        format!(
          "Communications facility at {} is separated from the lowest power at {} by {}, below the minimum of {}.",
          fmt_ft_in(height), fmt_ft_in(low_power), fmt_sep_in(sep), fmt_sep_in(required)
        ),
        IssueContext::new().with_attachment_ids([c.attachment.id.clone()]),
      ));
    }
  }
}

/// POLE.COMM_TO_STREETLIGHT (FAIL).
fn comm_to_streetlight(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  let comms: Vec<&Classified> = classified.iter().filter(|c| c.kind == Kind::Comm).collect();
  let streetlights: Vec<&Classified> = classified.iter().filter(|c| c.kind == Kind::Streetlight).collect();
  for comm in &comms {
    let Some(comm_h) = comm.attachment.proposed_in else { continue };
    for sl in &streetlights {
      let Some(sl_h) = sl.attachment.proposed_in else { continue };
      let delta = (comm_h - sl_h).abs();
      if delta < rules.comm_to_streetlight_sep_in {
        issues.push(issue(
          Severity::Fail,
          pole,
          "POLE.COMM_TO_STREETLIGHT",
          format!(
            "Communications attachment at {} is separated from a streetlight at {} by {}, below the minimum of {}.",
            fmt_ft_in(comm_h), fmt_ft_in(sl_h), fmt_sep_in(delta), fmt_sep_in(rules.comm_to_streetlight_sep_in)
          ),
          IssueContext::new().with_attachment_ids([comm.attachment.id.clone(), sl.attachment.id.clone()]),
        ));
      }
    }
  }
}

/// POLE.HOLE_BUFFER (FAIL; skipped on pole replacements).
fn hole_buffer(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  if pole.pole_replacement {
    return;
  }
  let buffer = rules.moved_hole_buffer_in;
  let relevant: Vec<&Classified> = classified
    .iter()
    .filter(|c| !c.is_drip_loop && !c.is_comm_drop && c.attachment.proposed_in.is_some())
    .collect();

  let stationary: Vec<&&Classified> = relevant.iter().filter(|c| c.attachment.is_stationary()).collect();
  let moved: Vec<&&Classified> = relevant
    .iter()
    .filter(|c| c.attachment.is_moved && c.attachment.existing_in.is_some())
    .collect();
  let moved_or_new: Vec<&&Classified> = relevant
    .iter()
    .filter(|c| c.attachment.is_moved || c.attachment.is_new)
    .collect();

  let mut existing_hole_heights: Vec<i32> = stationary.iter().map(|c| c.attachment.proposed_in.unwrap()).collect();
  existing_hole_heights.extend(moved.iter().map(|c| c.attachment.existing_in.unwrap()));

  let candidates: Vec<&&Classified> = moved_or_new
    .iter()
    .copied()
    .filter(|c| !existing_hole_heights.contains(&c.attachment.proposed_in.unwrap()))
    .collect();

  let mut flag = |a_id: String, b_id: String, a_h: i32, b_h: i32, issues: &mut Vec<Issue>| {
    let delta = (a_h - b_h).abs();
    if delta != 0 && delta < buffer {
      issues.push(issue(
        Severity::Fail,
        pole,
        "POLE.HOLE_BUFFER",
        format!(
          "New hole at {} is within {} of another hole at {}, below the minimum buffer of {}.",
          fmt_ft_in(a_h), fmt_sep_in(delta), fmt_ft_in(b_h), fmt_sep_in(buffer)
        ),
        IssueContext::new().with_attachment_ids([a_id, b_id]),
      ));
    }
  };

  for cand in &candidates {
    let cand_h = cand.attachment.proposed_in.unwrap();
    for m in &moved {
      flag(cand.attachment.id.clone(), m.attachment.id.clone(), cand_h, m.attachment.existing_in.unwrap(), issues);
    }
    for s in &stationary {
      flag(cand.attachment.id.clone(), s.attachment.id.clone(), cand_h, s.attachment.proposed_in.unwrap(), issues);
    }
  }
  for i in 0..candidates.len() {
    for j in (i + 1)..candidates.len() {
      let a = &candidates[i];
      let b = &candidates[j];
      flag(
        a.attachment.id.clone(),
        b.attachment.id.clone(),
        a.attachment.proposed_in.unwrap(),
        b.attachment.proposed_in.unwrap(),
        issues,
      );
    }
  }
}

/// POLE.EQUIP_MOVE (WARN on a replacement pole, FAIL otherwise; streetlights
/// and a taller replacement are exempt entirely).
fn equip_move(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  if !rules.enforce_equipment_move {
    return;
  }
  for c in classified {
    if c.attachment.category != crate::classify::Category::Equipment {
      continue;
    }
    if !c.attachment.is_moved || c.is_drip_loop || c.is_riser || c.kind == Kind::Streetlight {
      continue;
    }
    if pole.pole_replacement && pole.pole_replacement_is_taller {
      continue;
    }
    let severity = if pole.pole_replacement { Severity::Warn } else { Severity::Fail };
    issues.push(issue(
      severity,
      pole,
      "POLE.EQUIP_MOVE",
      format!("Equipment attachment {} was moved.", c.attachment.id),
      IssueContext::new().with_attachment_ids([c.attachment.id.clone()]),
    ));
  }
}

/// POLE.POWER_ORDER (FAIL, when enforced).
fn power_order(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  if !rules.enforce_power_order {
    return;
  }
  let eligible = |c: &&Classified, kind: Kind| {
    c.kind == kind && !c.attachment.is_new && c.attachment.existing_in.is_some() && c.attachment.proposed_in.is_some()
  };
  let neutrals: Vec<&Classified> = classified.iter().filter(|c| eligible(c, Kind::PowerNeutral)).collect();
  let secondaries: Vec<&Classified> = classified.iter().filter(|c| eligible(c, Kind::PowerSecondary)).collect();
  if neutrals.is_empty() || secondaries.is_empty() {
    return;
  }
  let max_by = |items: &[&Classified], f: fn(&Attachment) -> i32| -> (i32, Vec<String>) {
    let max_v = items.iter().map(|c| f(c.attachment)).max().unwrap();
    let ids = items.iter().filter(|c| f(c.attachment) == max_v).map(|c| c.attachment.id.clone()).collect();
    (max_v, ids)
  };
  let (n_me, n_me_ids) = max_by(&neutrals, |a| a.existing_in.unwrap());
  let (s_me, s_me_ids) = max_by(&secondaries, |a| a.existing_in.unwrap());
  let (n_mp, n_mp_ids) = max_by(&neutrals, |a| a.proposed_in.unwrap());
  let (s_mp, s_mp_ids) = max_by(&secondaries, |a| a.proposed_in.unwrap());

  if s_me > n_me && n_mp > s_mp {
    issues.push(issue(
      Severity::Fail,
      pole,
      "POLE.POWER_ORDER",
      "Neutral and secondary order was reversed between existing and proposed.".to_string(),
      IssueContext::new().with_attachment_ids(n_me_ids.into_iter().chain(s_mp_ids).chain(n_mp_ids.clone())),
    ));
  } else if n_me > s_me && s_mp > n_mp {
    issues.push(issue(
      Severity::Fail,
      pole,
      "POLE.POWER_ORDER",
      "Neutral and secondary order was reversed between existing and proposed.".to_string(),
      IssueContext::new().with_attachment_ids(s_me_ids.into_iter().chain(n_mp_ids).chain(s_mp_ids)),
    ));
  }
}

/// POLE.NS_BELOW_XFMR (FAIL, optional).
fn ns_below_xfmr(pole: &Pole, rules: &PoleRules, classified: &[Classified<'_>], issues: &mut Vec<Issue>) {
  if !rules.enforce_neutral_secondary_below_transformer {
    return;
  }
  let transformers: Vec<&Classified> = classified
    .iter()
    .filter(|c| c.is_transformer && c.attachment.proposed_in.is_some())
    .collect();
  if transformers.is_empty() {
    return;
  }
  let min_xfmr = transformers.iter().filter_map(|c| c.attachment.proposed_in).min().unwrap();
  let xfmr_ids: Vec<String> = transformers
    .iter()
    .filter(|c| c.attachment.proposed_in == Some(min_xfmr))
    .map(|c| c.attachment.id.clone())
    .collect();

  for c in classified {
    if !matches!(c.kind, Kind::PowerNeutral | Kind::PowerSecondary) {
      continue;
    }
    let Some(h) = c.attachment.proposed_in else { continue };
    if h >= min_xfmr {
      issues.push(issue(
        Severity::Fail,
        pole,
        "POLE.NS_BELOW_XFMR",
        format!(
          "Neutral/secondary at {} is not below the transformer at {}.",
          fmt_ft_in(h), fmt_ft_in(min_xfmr)
        ),
        IssueContext::new().with_attachment_ids(std::iter::once(c.attachment.id.clone()).chain(xfmr_ids.clone())),
      ));
    }
  }
}
