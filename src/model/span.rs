//! A span: the logical link between two endpoints, which may be poles or
//! other node types (§GLOSSARY). Spans reference poles weakly by id — no
//! ownership (§3).

use crate::model::ids::ConnectionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Span {
  pub connection_id: ConnectionId,
  pub a_node_id: String,
  pub b_node_id: String,
  pub a_is_pole: bool,
  pub b_is_pole: bool,
  pub a_lat: Option<f64>,
  pub a_lon: Option<f64>,
  pub b_lat: Option<f64>,
  pub b_lon: Option<f64>,
}
