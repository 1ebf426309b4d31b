use std::path::PathBuf;

use async_trait::async_trait;

use crate::secrets::{SecretError, SecretRef, SecretValue};

#[async_trait]
pub trait SecretsProvider: Send + Sync {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError>;
}

/// Asks each provider in turn; `NotFound` falls through to the next one.
#[derive(Default)]
pub struct CompositeProvider {
    providers: Vec<Box<dyn SecretsProvider>>,
}

impl CompositeProvider {
    pub fn new(providers: Vec<Box<dyn SecretsProvider>>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl SecretsProvider for CompositeProvider {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError> {
        for p in &self.providers {
            match p.get(secret_ref).await {
                Ok(v) => return Ok(v),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(SecretError::NotFound(secret_ref.clone()))
    }
}

/// Resolves `secrets://NAME` from the process environment.
#[derive(Debug, Clone)]
pub struct EnvSecretsProvider {
    pub scheme: String,
    pub env_prefix: Option<String>,
}

impl Default for EnvSecretsProvider {
    fn default() -> Self {
        Self {
            scheme: "secrets".to_string(),
            env_prefix: None,
        }
    }
}

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError> {
        if secret_ref.scheme != self.scheme {
            return Err(SecretError::NotFound(secret_ref.clone()));
        }
        let key = match &self.env_prefix {
            None => secret_ref.id.clone(),
            Some(p) => format!("{p}{}", secret_ref.id),
        };
        match std::env::var(&key) {
            Ok(v) => Ok(SecretValue::new(v)),
            Err(std::env::VarError::NotPresent) => Err(SecretError::NotFound(secret_ref.clone())),
            Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::NotUtf8(secret_ref.clone())),
        }
    }
}

/// Reads `<base_dir>/<id>`; a single trailing newline is stripped.
#[derive(Debug, Clone)]
pub struct FileSecretsProvider {
    pub scheme: String,
    pub base_dir: PathBuf,
}

impl FileSecretsProvider {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            scheme: "secrets".to_string(),
            base_dir: base_dir.into(),
        }
    }
}

#[async_trait]
impl SecretsProvider for FileSecretsProvider {
    async fn get(&self, secret_ref: &SecretRef) -> Result<SecretValue, SecretError> {
        if secret_ref.scheme != self.scheme {
            return Err(SecretError::NotFound(secret_ref.clone()));
        }
        if secret_ref.id.split(['/', '\\']).any(|part| part == "..") {
            return Err(SecretError::provider(
                secret_ref.clone(),
                "secret id must not leave the secrets directory",
            ));
        }
        let path = self.base_dir.join(&secret_ref.id);
        let mut bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SecretError::NotFound(secret_ref.clone()))
            }
            Err(e) => return Err(SecretError::provider(secret_ref.clone(), e.to_string())),
        };
        if bytes.ends_with(b"\n") {
            bytes.pop();
            if bytes.ends_with(b"\r") {
                bytes.pop();
            }
        }
        SecretValue::from_utf8(bytes).ok_or_else(|| SecretError::NotUtf8(secret_ref.clone()))
    }
}
