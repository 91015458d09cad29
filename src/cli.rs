use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, about = "Deterministic QC rule engine for utility-pole joint-use surveys")]
pub struct Cli {
  /// Path to the normalized model JSON to evaluate.
  #[arg(short, long, value_name = "FILE")]
  pub model: PathBuf,

  /// Path to a `katapultQcRules` JSON document. Missing fields fall back
  /// to built-in defaults; omit entirely to run with all defaults.
  #[arg(short, long, value_name = "FILE")]
  pub rules: Option<PathBuf>,

  /// Writes the resolved rules (defaults merged with any `--rules`
  /// override) back out in `katapultQcRules` shape, for inspection or to
  /// seed a rules file to edit.
  #[arg(long, value_name = "FILE")]
  pub export_rules: Option<PathBuf>,
}
