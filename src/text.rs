//! Case-folding and alphanumeric-stripping text normalization.
//!
//! Owner keys and classification tokens are matched case-insensitively and
//! ignoring punctuation. This module is the single place both the
//! classifier and the span-ordering evaluator go through for that, so the
//! collation behavior (see Open Question in SPEC_FULL.md) is one knob, not
//! several copies of the same regex-ish logic.

/// Lower-cases and strips every byte that is not ASCII alphanumeric.
///
/// This is the normalization used for owner grouping keys: `"AT&T"` and
/// `"ATT"` both normalize to `"att"` and therefore collide. That is
/// intentional current behavior (see SPEC_FULL.md Open Questions) — a
/// pluggable [`CollationStrategy`] is left as an extension point, not
/// implemented.
pub fn normalize_owner_key(s: &str) -> String {
  s.chars()
    .filter(|c| c.is_ascii_alphanumeric())
    .flat_map(|c| c.to_lowercase())
    .collect()
}

/// Lower-cases a string for substring token matching in the classifier.
/// Unlike [`normalize_owner_key`] this keeps whitespace and punctuation,
/// since the classifier matches on phrases like `"street light feed"`.
pub fn fold_case(s: &str) -> String {
  s.to_lowercase()
}

/// A pluggable collation strategy for owner-key grouping.
///
/// Not used by the default pipeline (see Open Questions); documented here
/// as the extension seam a future configurable collation strategy would
/// hang off of.
pub trait CollationStrategy {
  fn normalize(&self, s: &str) -> String;
}

/// The strategy implemented today: strip to `[a-z0-9]+`, case-folded.
pub struct StripAlphanumeric;

impl CollationStrategy for StripAlphanumeric {
  fn normalize(&self, s: &str) -> String {
    normalize_owner_key(s)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_owner_key() {
    assert_eq!(normalize_owner_key("AT&T"), "att");
    assert_eq!(normalize_owner_key("ATT"), "att");
    assert_eq!(normalize_owner_key("  Duke Energy  "), "dukeenergy");
    assert_eq!(normalize_owner_key(""), "");
  }

  #[test]
  fn test_fold_case() {
    assert_eq!(fold_case("Street Light Feed"), "street light feed");
  }

  #[test]
  fn test_strip_alphanumeric_strategy() {
    let strategy = StripAlphanumeric;
    assert_eq!(strategy.normalize("AT&T"), "att");
  }
}
