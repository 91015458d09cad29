mod cli;

use clap::Parser;
use cli::Cli;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use pole_qc::engine::run_qc;
use pole_qc::model::Model;
use pole_qc::rules::{io as rules_io, Rules};
use std::fs;
use tracing::{debug, info};

fn main() -> Result<()> {
  color_eyre::install()?;
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let args = Cli::parse();

  let model = {
    let _span = tracing::info_span!("load_model", path = %args.model.display()).entered();
    let contents = fs::read_to_string(&args.model)
      .wrap_err_with(|| format!("reading model file {}", args.model.display()))?;
    let model: Model = serde_json::from_str(&contents)
      .wrap_err_with(|| format!("parsing model file {}", args.model.display()))?;
    info!(poles = model.poles.len(), midspans = model.midspans.len(), "loaded model");
    model
  };

  let rules = {
    let _span = tracing::info_span!("load_rules").entered();
    match &args.rules {
      Some(path) => {
        let rules = rules_io::load_rules_file(path)
          .wrap_err_with(|| format!("loading rules file {}", path.display()))?;
        info!(path = %path.display(), "loaded rules override");
        rules
      }
      None => {
        debug!("no rules file given, using built-in defaults");
        Rules::default()
      }
    }
  };

  let result = {
    let _span = tracing::info_span!("run_qc").entered();
    let result = run_qc(&model, &rules);
    info!(
      poles_failing = result.summary.poles.fail,
      midspans_failing = result.summary.midspans.fail,
      issues = result.issues.len(),
      "qc complete"
    );
    result
  };

  println!("{}", serde_json::to_string_pretty(&result).wrap_err("serializing QcResult")?);

  if let Some(path) = &args.export_rules {
    let now = time::OffsetDateTime::now_utc()
      .format(&time::format_description::well_known::Rfc3339)
      .wrap_err("formatting export timestamp")?;
    let doc = rules_io::export_rules(&rules, &now);
    let text = serde_json::to_string_pretty(&doc).wrap_err("serializing exported rules")?;
    fs::write(path, text).wrap_err_with(|| format!("writing rules export to {}", path.display()))?;
    info!(path = %path.display(), "exported resolved rules");
  }

  Ok(())
}
