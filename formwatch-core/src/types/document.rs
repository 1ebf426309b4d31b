use crate::types::{Extensions, Journey, Settings};

/// Top-level journey document: one monitored site, its settings and journeys.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MonitorDocument {
    /// Document format version (e.g. "1.0.0").
    pub formwatch: String,

    pub info: Info,

    #[serde(default)]
    pub settings: Settings,

    pub journeys: Vec<Journey>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl MonitorDocument {
    pub fn journey(&self, journey_id: &str) -> Option<&Journey> {
        self.journeys.iter().find(|j| j.journey_id == journey_id)
    }
}

/// Human-facing metadata. `title` names the monitor in `inspect` output.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Info {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub version: String,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}
