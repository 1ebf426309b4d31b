mod error;
mod provider;
mod r#ref;
mod value;

pub use error::SecretError;
pub use provider::{CompositeProvider, EnvSecretsProvider, FileSecretsProvider, SecretsProvider};
pub use r#ref::{SecretRef, SecretRefParseError};
pub use value::SecretValue;
