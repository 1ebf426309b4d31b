use crate::types::{Extensions, StepDefinition};

/// One end-to-end user flow through a form. Steps run in array order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Journey {
    #[serde(rename = "journeyId")]
    pub journey_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Page the browser opens before the first step.
    pub url: String,

    pub steps: Vec<StepDefinition>,

    #[serde(flatten, default)]
    pub extensions: Extensions,
}

impl Journey {
    pub fn step(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }
}
