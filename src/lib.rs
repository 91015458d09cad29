//! # pole-qc
//!
//! `pole-qc` is a deterministic quality-control rule engine for utility-pole
//! joint-use surveys. It ingests a normalized `Model` describing poles,
//! their attachments and guying, midspan measurements, and the spans that
//! connect poles together, and produces a `QcResult`: a pass/warn/fail
//! status for every pole and midspan together with the typed rule
//! violations that back it up.
//!
//! ## Examples
//!
//! **Library**
//!
//! ```
//! use pole_qc::model::{Model, Pole, Attachment, AttachmentCategory};
//! use pole_qc::rules::Rules;
//! use pole_qc::engine::run_qc;
//!
//! let mut model = Model::default();
//! model.poles.push(Pole {
//!     pole_id: "P1".into(),
//!     attachments: vec![Attachment {
//!         id: "A1".into(),
//!         category: AttachmentCategory::Wire,
//!         label: "Comm Drop".into(),
//!         proposed_in: Some(180),
//!         ..Attachment::default()
//!     }],
//!     ..Pole::default()
//! });
//!
//! let result = run_qc(&model, &Rules::default());
//! assert_eq!(result.summary.poles.fail, 1);
//! ```
//!
//! **CLI**
//!
//! ```bash
//! $ pole-qc --model job.json --rules rules.json
//! ```
//!
//! This crate provides both a library and a CLI. The library is the whole
//! system: the CLI (behind the `cli` feature) is a thin wrapper that reads
//! JSON from disk and prints the `QcResult` as JSON — it contains no QC
//! logic of its own.
//!
//! ## Scope
//!
//! This crate does **not** parse a raw survey export into a `Model` (that
//! is the job of an external document reader), does not render maps or
//! scenes, and does not persist rules to a database — it only defines and
//! accepts the JSON shape those collaborators would produce or consume.
//! See `rules::io` for the one JSON contract this crate does own.
//!
//! ## References
//!
//! - Rule codes are stable identifiers; see [`issue::Issue`] and
//!   [`engine::run_qc`].
//! - Classification is a pure function; see [`classify::classify`].
pub mod classify;
pub mod engine;
pub mod eval;
pub mod issue;
pub mod model;
pub mod rules;
pub mod text;
pub mod units;

pub use crate::classify::{classify, Classification, Kind};
pub use crate::engine::{run_qc, QcResult, Status};
pub use crate::issue::{EntityType, Issue, Severity};
pub use crate::model::Model;
pub use crate::rules::Rules;
