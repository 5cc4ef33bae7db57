//! Stored metadata schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub id: String,
    pub model: String,
    pub timestamp: DateTime<Utc>,
    pub seed: u64,
    pub dt: f64,
    pub duration: f64,
    pub integrator: String,
    pub controller: String,
    pub metrics: BTreeMap<String, f64>,
}
