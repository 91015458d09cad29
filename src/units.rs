//! Inch <-> feet-inches conversion and rounding.
//!
//! All rule comparisons in this crate happen on integer inches (§3). This
//! module is the only place that converts between that internal
//! representation and the feet-inches notation used in human-facing issue
//! messages (§6).

/// Rounds a possibly-fractional inch measurement to the nearest whole inch.
///
/// Midspan measurements may arrive interpolated from photos and therefore
/// fractional; pole attachment heights are treated as already whole. Ties
/// round away from zero, matching the behavior of `f64::round`.
pub fn round_to_inch(inches: f64) -> i32 {
  inches.round() as i32
}

/// Formats a whole-inch height as feet-inches notation, e.g. `16' 0"`.
///
/// `ft = floor(in / 12)`, `i = round(in - ft * 12)`. Negative heights are
/// not a domain concept here; callers are expected to pass non-negative
/// inches, but the formula does not special-case negatives beyond normal
/// integer arithmetic.
pub fn fmt_ft_in(inches: i32) -> String {
  let ft = inches.div_euclid(12);
  let i = inches - ft * 12;
  format!("{ft}' {i}\"")
}

/// Formats a separation in inches with a trailing `"`, e.g. `4"`.
pub fn fmt_sep_in(inches: i32) -> String {
  format!("{inches}\"")
}

/// Parses feet-inches notation back into whole inches.
///
/// Accepts the exact shape produced by [`fmt_ft_in`]: `{feet}' {inches}"`.
/// Returns `None` if the string does not match that shape.
pub fn parse_ft_in(s: &str) -> Option<i32> {
  let s = s.trim();
  let (ft_part, rest) = s.split_once('\'')?;
  let ft: i32 = ft_part.trim().parse().ok()?;
  let in_part = rest.trim().strip_suffix('"')?;
  let i: i32 = in_part.trim().parse().ok()?;
  Some(ft * 12 + i)
}
