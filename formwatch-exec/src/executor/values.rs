use std::collections::BTreeMap;
use std::sync::Arc;

use formwatch_core::{GeneratorKind, InputValue, Journey};

use crate::generate::{GenerateError, ValueGenerator};
use crate::secrets::{SecretError, SecretRef, SecretRefParseError, SecretValue, SecretsProvider};

pub const REDACTED: &str = "<redacted>";

/// An action input ready to be typed into the page.
#[derive(Debug, Clone)]
pub enum ResolvedValue {
    Literal(String),
    Generated { kind: GeneratorKind, value: String },
    Secret { reference: SecretRef, value: SecretValue },
}

impl ResolvedValue {
    /// The raw value.
    pub fn expose(&self) -> &str {
        match self {
            ResolvedValue::Literal(v) | ResolvedValue::Generated { value: v, .. } => v,
            ResolvedValue::Secret { value, .. } => value.expose(),
        }
    }

    /// Safe to log or put in an alert.
    pub fn display(&self) -> &str {
        match self {
            ResolvedValue::Secret { .. } => REDACTED,
            other => other.expose(),
        }
    }
}

/// Inputs for one journey attempt, keyed by step id.
#[derive(Debug, Clone, Default)]
pub struct ResolvedValues {
    values: BTreeMap<String, ResolvedValue>,
}

impl ResolvedValues {
    pub fn insert(&mut self, step_id: impl Into<String>, value: ResolvedValue) {
        self.values.insert(step_id.into(), value);
    }

    pub fn get(&self, step_id: &str) -> Option<&ResolvedValue> {
        self.values.get(step_id)
    }

    pub fn generated(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .filter_map(|(step_id, v)| match v {
                ResolvedValue::Generated { value, .. } => Some((step_id.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Replaces every secret value occurring in `text`.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for v in self.values.values() {
            if let ResolvedValue::Secret { .. } = v {
                let secret = v.expose();
                if !secret.is_empty() && out.contains(secret) {
                    out = out.replace(secret, REDACTED);
                }
            }
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    #[error("step {step_id}: {source}")]
    Generate {
        step_id: String,
        source: GenerateError,
    },
    #[error("step {step_id}: {source}")]
    SecretRef {
        step_id: String,
        source: SecretRefParseError,
    },
    #[error("step {step_id}: {source}")]
    Secret {
        step_id: String,
        source: SecretError,
    },
}

/// Turns document input values into concrete strings. Called once per attempt so generated
/// values are fresh each time.
pub struct ValueResolver {
    generator: Arc<dyn ValueGenerator>,
    secrets: Arc<dyn SecretsProvider>,
}

impl ValueResolver {
    pub fn new(generator: Arc<dyn ValueGenerator>, secrets: Arc<dyn SecretsProvider>) -> Self {
        Self { generator, secrets }
    }

    pub async fn resolve(&self, journey: &Journey) -> Result<ResolvedValues, ValueError> {
        let mut out = ResolvedValues::default();
        for step in &journey.steps {
            let Some(input) = step.action.input() else {
                continue;
            };
            let step_id = step.step_id.as_str();
            let resolved = match input {
                InputValue::Literal(v) => ResolvedValue::Literal(v.clone()),
                InputValue::Generated { generate } => {
                    let value = self.generator.generate(*generate).map_err(|source| {
                        ValueError::Generate {
                            step_id: step_id.to_string(),
                            source,
                        }
                    })?;
                    tracing::info!(step_id, generator = generate.as_str(), value = %value, "generated input");
                    ResolvedValue::Generated {
                        kind: *generate,
                        value,
                    }
                }
                InputValue::Secret { secret } => {
                    let reference =
                        SecretRef::parse(secret).map_err(|source| ValueError::SecretRef {
                            step_id: step_id.to_string(),
                            source,
                        })?;
                    let value = self.secrets.get(&reference).await.map_err(|source| {
                        ValueError::Secret {
                            step_id: step_id.to_string(),
                            source,
                        }
                    })?;
                    if value.is_empty() {
                        tracing::warn!(step_id, secret = %reference, "secret resolved to an empty value");
                    }
                    ResolvedValue::Secret { reference, value }
                }
            };
            out.insert(step_id, resolved);
        }
        Ok(out)
    }
}
