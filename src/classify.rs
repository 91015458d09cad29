//! Pure classification of an attachment or measure into a semantic [`Kind`]
//! plus a set of independent boolean facets.
//!
//! [`classify`] has no hidden state: it concatenates every textual field of
//! the input, lower-cases it, and runs a fixed precedence list of
//! token-presence checks per §4.1. Two inputs with identical text and
//! category always classify identically.

use crate::text::fold_case;
use serde::{Deserialize, Serialize};

/// The coarse attachment/measure category driving kind precedence.
///
/// Measures in this crate never carry an explicit category (§3: "measures
/// default to Wire"); [`ClassifyInput::for_measure`] bakes that default in
/// at the call site rather than making `Category` itself optional.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
  #[default]
  Wire,
  Equipment,
  Guy,
}

/// The semantic kind a classified item resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
  PowerPrimary,
  PowerNeutral,
  PowerSecondary,
  PowerOther,
  PowerDripLoop,
  StreetlightDripLoop,
  Streetlight,
  Riser,
  Equipment,
  Comm,
  Guy,
  Other,
}

/// The textual fields classification reads, concatenated and lower-cased.
///
/// All fields are optional since every field on `Attachment`/`Measure` is
/// independently optional (§3); an absent field contributes nothing to the
/// concatenated text.
#[derive(Debug, Default, Clone)]
pub struct ClassifyInput<'a> {
  pub category: Category,
  pub owner: &'a str,
  pub label: &'a str,
  pub trace_type: &'a str,
  pub cable_type: &'a str,
  pub name: &'a str,
  pub trace_label: &'a str,
}

impl<'a> ClassifyInput<'a> {
  /// Builds the concatenated, lower-cased text classification matches
  /// against: label, traceType, cableType, name, traceLabel, owner,
  /// category, in that order, space-separated.
  fn concatenated_text(&self) -> String {
    let category_text = match self.category {
      Category::Wire => "wire",
      Category::Equipment => "equipment",
      Category::Guy => "guy",
    };
    fold_case(&format!(
      "{} {} {} {} {} {} {}",
      self.label,
      self.trace_type,
      self.cable_type,
      self.name,
      self.trace_label,
      self.owner,
      category_text,
    ))
  }
}

/// The output of classification: a `kind` plus independent boolean facets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
  pub owner: String,
  pub kind: Kind,
  pub is_adss: bool,
  pub is_down_guy: bool,
  pub is_riser: bool,
  pub is_transformer: bool,
  pub is_comm_drop: bool,
  pub is_drip_loop: bool,
  pub is_street_light: bool,
  pub is_street_light_drip_loop: bool,
  pub is_street_light_feed: bool,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  needles.iter().any(|n| haystack.contains(n))
}

/// True iff `word` appears in `text` as a standalone alphanumeric token
/// (not as a substring of a larger word like "dropwire").
fn has_standalone_word(text: &str, word: &str) -> bool {
  text
    .split(|c: char| !c.is_ascii_alphanumeric())
    .any(|tok| tok == word)
}

const COMM_TOKENS: &[&str] = &[
  "communication",
  "comm",
  "catv",
  "fiber",
  "telephone",
  "tel",
  "coax",
  "cable",
  "adss",
  "drop",
];

fn looks_comm(text: &str) -> bool {
  contains_any(text, COMM_TOKENS)
}

/// Classifies an attachment or measure per §4.1. Pure, total, and
/// deterministic: the same `input` always yields the same `Classification`.
pub fn classify(input: &ClassifyInput<'_>) -> Classification {
  let text = input.concatenated_text();

  let has_streetlight = contains_any(&text, &["streetlight", "street light"]);
  let has_feed_text = contains_any(&text, &["street light feed", "streetlight feed"]);
  let has_driploop = contains_any(&text, &["drip loop", "driploop"]);
  let has_riser = contains_any(&text, &["riser"]);
  let has_transformer = contains_any(&text, &["transformer", "xfmr"]);
  let has_down_guy = contains_any(&text, &["down guy", "down-guy", "downguy"]);
  let is_adss = text.contains("adss");

  let other_comm_indicator = COMM_TOKENS
    .iter()
    .filter(|&&t| t != "drop")
    .any(|t| text.contains(t));
  let is_comm_drop = has_standalone_word(&text, "drop") && other_comm_indicator;

  let kind = match input.category {
    Category::Equipment => {
      if has_streetlight && !has_feed_text {
        Kind::Streetlight
      } else if has_driploop {
        if has_streetlight {
          Kind::StreetlightDripLoop
        } else {
          Kind::PowerDripLoop
        }
      } else if has_riser {
        Kind::Riser
      } else {
        Kind::Equipment
      }
    }
    Category::Wire => {
      if contains_any(&text, &["primary", "transmission"]) {
        Kind::PowerPrimary
      } else if text.contains("neutral") {
        Kind::PowerNeutral
      } else if contains_any(&text, &["secondary", "triplex"])
        || (text.contains("service") && !looks_comm(&text))
        || has_feed_text
      {
        Kind::PowerSecondary
      } else if contains_any(&text, &["power", "electric", "supply"]) {
        Kind::PowerOther
      } else if looks_comm(&text) {
        Kind::Comm
      } else {
        Kind::Other
      }
    }
    Category::Guy => Kind::Guy,
  };

  let is_street_light = matches!(kind, Kind::Streetlight | Kind::StreetlightDripLoop);
  let is_street_light_drip_loop = matches!(kind, Kind::StreetlightDripLoop);
  let is_street_light_feed = input.category == Category::Wire && has_feed_text;
  let is_drip_loop = matches!(kind, Kind::PowerDripLoop | Kind::StreetlightDripLoop);

  Classification {
    owner: input.owner.to_string(),
    kind,
    is_adss,
    is_down_guy: has_down_guy,
    is_riser: has_riser,
    is_transformer: has_transformer,
    is_comm_drop,
    is_drip_loop,
    is_street_light,
    is_street_light_drip_loop,
    is_street_light_feed,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input<'a>(category: Category, label: &'a str) -> ClassifyInput<'a> {
    ClassifyInput {
      category,
      label,
      ..ClassifyInput::default()
    }
  }

  #[test]
  fn test_wire_primary() {
    let c = classify(&input(Category::Wire, "Primary"));
    assert_eq!(c.kind, Kind::PowerPrimary);
  }

  #[test]
  fn test_wire_neutral() {
    let c = classify(&input(Category::Wire, "Neutral"));
    assert_eq!(c.kind, Kind::PowerNeutral);
  }

  #[test]
  fn test_wire_secondary_via_service_non_comm() {
    let c = classify(&input(Category::Wire, "Service Drop"));
    // "service" and looks_comm is true here because "drop" is a comm token,
    // so the service branch is NOT taken; looks_comm wins -> comm, unless
    // isCommDrop logic intervenes at the rule layer (not here).
    assert_eq!(c.kind, Kind::Comm);
  }

  #[test]
  fn test_wire_secondary_plain_service() {
    let c = classify(&input(Category::Wire, "Service"));
    assert_eq!(c.kind, Kind::PowerSecondary);
  }

  #[test]
  fn test_wire_street_light_feed_is_power_secondary() {
    let c = classify(&input(Category::Wire, "Street Light Feed"));
    assert_eq!(c.kind, Kind::PowerSecondary);
    assert!(c.is_street_light_feed);
    assert!(!c.is_street_light);
  }

  #[test]
  fn test_wire_comm() {
    for text in ["Communication", "CATV", "Fiber Optic", "Telephone"] {
      let c = classify(&input(Category::Wire, text));
      assert_eq!(c.kind, Kind::Comm, "{text} should classify as comm");
    }
  }

  #[test]
  fn test_comm_drop_requires_standalone_drop_and_other_indicator() {
    let c = classify(&input(Category::Wire, "Comm Drop"));
    assert!(c.is_comm_drop);
    let c = classify(&input(Category::Wire, "Service Drop"));
    // "drop" standalone, and "drop" itself is a comm indicator but the
    // *other* indicator requirement excludes self-match: no other comm
    // token present, so not a comm drop (this is what keeps ordinary
    // power service drops from being misclassified as comm drops).
    assert!(!c.is_comm_drop);
  }

  #[test]
  fn test_equipment_streetlight() {
    let c = classify(&input(Category::Equipment, "Streetlight"));
    assert_eq!(c.kind, Kind::Streetlight);
    assert!(c.is_street_light);
  }

  #[test]
  fn test_equipment_streetlight_feed_is_not_streetlight_kind() {
    let c = classify(&input(Category::Equipment, "Streetlight Feed"));
    assert_ne!(c.kind, Kind::Streetlight);
  }

  #[test]
  fn test_equipment_streetlight_drip_loop() {
    let c = classify(&input(Category::Equipment, "Streetlight Feed Drip Loop"));
    assert_eq!(c.kind, Kind::StreetlightDripLoop);
    assert!(c.is_drip_loop);
    assert!(c.is_street_light);
  }

  #[test]
  fn test_equipment_power_drip_loop() {
    let c = classify(&input(Category::Equipment, "Drip Loop"));
    assert_eq!(c.kind, Kind::PowerDripLoop);
    assert!(c.is_drip_loop);
    assert!(!c.is_street_light);
  }

  #[test]
  fn test_equipment_riser() {
    let c = classify(&input(Category::Equipment, "Riser"));
    assert_eq!(c.kind, Kind::Riser);
    assert!(c.is_riser);
  }

  #[test]
  fn test_equipment_plain() {
    let c = classify(&input(Category::Equipment, "Transformer"));
    assert_eq!(c.kind, Kind::Equipment);
    assert!(c.is_transformer);
  }

  #[test]
  fn test_guy() {
    let c = classify(&input(Category::Guy, "Down Guy"));
    assert_eq!(c.kind, Kind::Guy);
    assert!(c.is_down_guy);
  }

  #[test]
  fn test_adss_facet() {
    let c = classify(&input(Category::Wire, "ADSS Fiber"));
    assert!(c.is_adss);
    assert_eq!(c.kind, Kind::Comm);
  }

  #[test]
  fn test_classification_totality() {
    for category in [Category::Wire, Category::Equipment, Category::Guy] {
      for label in ["", "random text", "Primary Neutral Riser Comm Guy"] {
        let _ = classify(&input(category, label));
      }
    }
  }
}
