//! Rule configuration: the recognized tunables (§4.2) grouped into a Pole
//! block and a Midspan block, plus JSON persistence (§4.7/§6).
//!
//! The engine is re-run every time a tunable changes (§1, §9); `Rules` is
//! therefore a plain, cheap-to-clone value with no internal state tied to
//! a particular run.

use serde::{Deserialize, Serialize};

/// Pole-local tunables (§4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoleRules {
  pub min_lowest_comm_attach_in: i32,
  pub comm_sep_diff_in: i32,
  pub comm_sep_same_in: i32,
  pub comm_to_power_sep_in: i32,
  pub adss_comm_to_power_sep_in: i32,
  pub comm_to_streetlight_sep_in: i32,
  pub moved_hole_buffer_in: i32,
  pub enforce_adss_highest: bool,
  pub enforce_equipment_move: bool,
  pub enforce_power_order: bool,
  pub enforce_neutral_secondary_below_transformer: bool,
  pub warn_missing_pole_identifiers: bool,
}

impl Default for PoleRules {
  fn default() -> Self {
    PoleRules {
      min_lowest_comm_attach_in: 192,
      comm_sep_diff_in: 12,
      comm_sep_same_in: 4,
      comm_to_power_sep_in: 40,
      adss_comm_to_power_sep_in: 30,
      comm_to_streetlight_sep_in: 12,
      moved_hole_buffer_in: 4,
      enforce_adss_highest: true,
      enforce_equipment_move: true,
      enforce_power_order: true,
      enforce_neutral_secondary_below_transformer: false,
      warn_missing_pole_identifiers: true,
    }
  }
}

/// Midspan-local tunables (§4.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MidspanRules {
  pub min_comm_default_in: i32,
  pub min_comm_pedestrian_in: i32,
  pub min_comm_highway_in: i32,
  pub min_comm_farm_in: i32,
  pub min_comm_rail_in: i32,
  pub comm_sep_in: i32,
  pub comm_to_power_sep_in: i32,
  pub adss_comm_to_power_sep_in: i32,
  pub installing_company: String,
  pub installing_company_comm_sep_in: i32,
  pub enforce_adss_highest: bool,
  pub warn_missing_row_type: bool,
}

impl Default for MidspanRules {
  fn default() -> Self {
    MidspanRules {
      min_comm_default_in: 186,
      min_comm_pedestrian_in: 114,
      min_comm_highway_in: 216,
      min_comm_farm_in: 216,
      min_comm_rail_in: 282,
      comm_sep_in: 4,
      comm_to_power_sep_in: 30,
      adss_comm_to_power_sep_in: 12,
      installing_company: String::new(),
      installing_company_comm_sep_in: 4,
      enforce_adss_highest: true,
      warn_missing_row_type: true,
    }
  }
}

/// The full recognized tunable set: a Pole block and a Midspan block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
  pub pole: PoleRules,
  pub midspan: MidspanRules,
}

pub mod io {
  //! The `katapultQcRules` JSON persistence schema (§6), with per-field
  //! fallback to defaults and truthiness/numeric coercion (§7).
  //!
  //! This is the one place in the crate that treats malformed input as a
  //! hard error (an unreadable file or invalid JSON syntax) rather than a
  //! silent skip — see SPEC_FULL.md §4.7 for why that split is intentional.

  use super::{MidspanRules, PoleRules, Rules};
  use color_eyre::eyre::WrapErr;
  use color_eyre::Result;
  use serde_json::Value;
  use std::path::Path;

  const SCHEMA: &str = "katapultQcRules";
  const SCHEMA_VERSION: u32 = 1;

  fn coerce_i32(value: Option<&Value>, default: i32) -> i32 {
    match value {
      Some(Value::Number(n)) => n.as_i64().map(|v| v as i32).unwrap_or(default),
      Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
      _ => default,
    }
  }

  fn coerce_bool(value: Option<&Value>, default: bool) -> bool {
    match value {
      Some(Value::Bool(b)) => *b,
      Some(Value::Null) => false,
      Some(Value::Number(n)) => n.as_f64().map(|v| v != 0.0).unwrap_or(default),
      Some(Value::String(s)) => !s.is_empty(),
      Some(Value::Array(a)) => !a.is_empty(),
      Some(Value::Object(o)) => !o.is_empty(),
      None => default,
    }
  }

  fn coerce_string(value: Option<&Value>, default: &str) -> String {
    match value {
      Some(Value::String(s)) => s.clone(),
      Some(Value::Null) | None => default.to_string(),
      Some(other) => other.to_string(),
    }
  }

  fn coerce_pole(v: Option<&Value>) -> PoleRules {
    let defaults = PoleRules::default();
    let obj = v.and_then(Value::as_object);
    let get = |key: &str| obj.and_then(|o| o.get(key));
    PoleRules {
      min_lowest_comm_attach_in: coerce_i32(
        get("minLowestCommAttachIn"),
        defaults.min_lowest_comm_attach_in,
      ),
      comm_sep_diff_in: coerce_i32(get("commSepDiffIn"), defaults.comm_sep_diff_in),
      comm_sep_same_in: coerce_i32(get("commSepSameIn"), defaults.comm_sep_same_in),
      comm_to_power_sep_in: coerce_i32(get("commToPowerSepIn"), defaults.comm_to_power_sep_in),
      adss_comm_to_power_sep_in: coerce_i32(
        get("adssCommToPowerSepIn"),
        defaults.adss_comm_to_power_sep_in,
      ),
      comm_to_streetlight_sep_in: coerce_i32(
        get("commToStreetLightSepIn"),
        defaults.comm_to_streetlight_sep_in,
      ),
      moved_hole_buffer_in: coerce_i32(get("movedHoleBufferIn"), defaults.moved_hole_buffer_in),
      enforce_adss_highest: coerce_bool(get("enforceAdssHighest"), defaults.enforce_adss_highest),
      enforce_equipment_move: coerce_bool(
        get("enforceEquipmentMove"),
        defaults.enforce_equipment_move,
      ),
      enforce_power_order: coerce_bool(get("enforcePowerOrder"), defaults.enforce_power_order),
      enforce_neutral_secondary_below_transformer: coerce_bool(
        get("enforceNeutralSecondaryBelowTransformer"),
        defaults.enforce_neutral_secondary_below_transformer,
      ),
      warn_missing_pole_identifiers: coerce_bool(
        get("warnMissingPoleIdentifiers"),
        defaults.warn_missing_pole_identifiers,
      ),
    }
  }

  fn coerce_midspan(v: Option<&Value>) -> MidspanRules {
    let defaults = MidspanRules::default();
    let obj = v.and_then(Value::as_object);
    let get = |key: &str| obj.and_then(|o| o.get(key));
    MidspanRules {
      min_comm_default_in: coerce_i32(get("minCommDefaultIn"), defaults.min_comm_default_in),
      min_comm_pedestrian_in: coerce_i32(
        get("minCommPedestrianIn"),
        defaults.min_comm_pedestrian_in,
      ),
      min_comm_highway_in: coerce_i32(get("minCommHighwayIn"), defaults.min_comm_highway_in),
      min_comm_farm_in: coerce_i32(get("minCommFarmIn"), defaults.min_comm_farm_in),
      min_comm_rail_in: coerce_i32(get("minCommRailIn"), defaults.min_comm_rail_in),
      comm_sep_in: coerce_i32(get("commSepIn"), defaults.comm_sep_in),
      comm_to_power_sep_in: coerce_i32(get("commToPowerSepIn"), defaults.comm_to_power_sep_in),
      adss_comm_to_power_sep_in: coerce_i32(
        get("adssCommToPowerSepIn"),
        defaults.adss_comm_to_power_sep_in,
      ),
      installing_company: coerce_string(get("installingCompany"), &defaults.installing_company),
      installing_company_comm_sep_in: coerce_i32(
        get("installingCompanyCommSepIn"),
        defaults.installing_company_comm_sep_in,
      ),
      enforce_adss_highest: coerce_bool(get("enforceAdssHighest"), defaults.enforce_adss_highest),
      warn_missing_row_type: coerce_bool(
        get("warnMissingRowType"),
        defaults.warn_missing_row_type,
      ),
    }
  }

  /// Parses a `katapultQcRules` JSON document into `Rules`, falling back to
  /// the default value of any field that is missing or of the wrong shape
  /// to coerce (§7). Does not touch the filesystem; see
  /// [`load_rules_file`] for the disk-reading entry point.
  pub fn parse_rules(doc: &Value) -> Rules {
    let rules = doc.get("rules");
    Rules {
      pole: coerce_pole(rules.and_then(|r| r.get("pole"))),
      midspan: coerce_midspan(rules.and_then(|r| r.get("midspan"))),
    }
  }

  /// Reads and parses a `katapultQcRules` document from disk. Unlike
  /// per-field coercion, a missing file or invalid JSON syntax is a hard
  /// error — there is nothing sensible to fall back to.
  pub fn load_rules_file(path: &Path) -> Result<Rules> {
    let contents = std::fs::read_to_string(path)
      .wrap_err_with(|| format!("reading rules file {}", path.display()))?;
    let doc: Value = serde_json::from_str(&contents)
      .wrap_err_with(|| format!("parsing rules JSON in {}", path.display()))?;
    Ok(parse_rules(&doc))
  }

  /// Serializes `rules` into the persisted `katapultQcRules` shape,
  /// stamping `exportedAt` with the caller-supplied ISO-8601 timestamp.
  /// Kept as a pure mapping (no wall-clock access) so it is unit-testable.
  pub fn export_rules(rules: &Rules, exported_at: &str) -> Value {
    serde_json::json!({
      "schema": SCHEMA,
      "schemaVersion": SCHEMA_VERSION,
      "exportedAt": exported_at,
      "rules": {
        "pole": rules.pole,
        "midspan": rules.midspan,
      },
    })
  }

  #[cfg(test)]
  mod tests {
    use super::*;

    #[test]
    fn test_parse_rules_empty_doc_is_all_defaults() {
      let doc = serde_json::json!({});
      assert_eq!(parse_rules(&doc), Rules::default());
    }

    #[test]
    fn test_parse_rules_partial_override() {
      let doc = serde_json::json!({
        "rules": { "pole": { "minLowestCommAttachIn": 200 } }
      });
      let rules = parse_rules(&doc);
      assert_eq!(rules.pole.min_lowest_comm_attach_in, 200);
      assert_eq!(rules.pole.comm_sep_diff_in, PoleRules::default().comm_sep_diff_in);
    }

    #[test]
    fn test_coerce_bool_truthiness() {
      let doc = serde_json::json!({
        "rules": { "pole": { "enforceAdssHighest": 0, "enforceEquipmentMove": "" } }
      });
      let rules = parse_rules(&doc);
      assert!(!rules.pole.enforce_adss_highest);
      assert!(!rules.pole.enforce_equipment_move);
    }

    #[test]
    fn test_coerce_numeric_string() {
      let doc = serde_json::json!({
        "rules": { "midspan": { "commSepIn": "7" } }
      });
      let rules = parse_rules(&doc);
      assert_eq!(rules.midspan.comm_sep_in, 7);
    }

    #[test]
    fn test_export_then_parse_round_trip() {
      let mut rules = Rules::default();
      rules.pole.min_lowest_comm_attach_in = 201;
      rules.midspan.installing_company = "Acme".to_string();
      let doc = export_rules(&rules, "2026-01-01T00:00:00Z");
      let parsed = parse_rules(&doc);
      assert_eq!(parsed, rules);
      assert_eq!(doc["schema"], SCHEMA);
      assert_eq!(doc["exportedAt"], "2026-01-01T00:00:00Z");
    }
  }
}
