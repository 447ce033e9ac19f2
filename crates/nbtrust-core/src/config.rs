use nbtrust_canonical::{DigestAlg, ValidationError};
use nbtrust_store::StoreOptions;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::errors::TrustError;
use crate::secret::{default_data_dir, ensure_secret, read_secret, DATABASE_FILE};
use crate::trust::Trust;

/// Everything needed to open a [`Trust`].
///
/// Unset paths fall back to the data directory: the database to
/// `<data_dir>/nbsignatures.db` and the secret to `<data_dir>/notebook_secret`.
/// When `create` is set and no secret file exists yet, one is generated.
///
/// ```rust
/// use nbtrust_core::TrustConfig;
///
/// let config: TrustConfig = serde_json::from_str(
///     r#"{"dataDir": "/srv/jupyter", "algorithm": "sha512", "cacheSize": 1024}"#,
/// ).unwrap();
/// assert_eq!(config.store.cache_size, 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrustConfig {
    /// Jupyter data directory; [`default_data_dir`] when unset.
    pub data_dir: Option<PathBuf>,
    /// Explicit database location.
    pub database: Option<PathBuf>,
    /// Explicit signing secret.
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    /// Signature algorithm (default `sha256`).
    pub algorithm: DigestAlg,
    /// Store options, flattened into the same object.
    #[serde(flatten)]
    pub store: StoreOptions,
}

impl fmt::Debug for TrustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustConfig")
            .field("data_dir", &self.data_dir)
            .field("database", &self.database)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("algorithm", &self.algorithm)
            .field("store", &self.store)
            .finish()
    }
}

impl TrustConfig {
    /// Config rooted at `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Rejects values that cannot work.
    pub fn validate(&self) -> Result<(), TrustError> {
        self.store.validate()?;
        if self.secret.as_deref() == Some("") {
            return Err(ValidationError::Empty("secret").into());
        }
        Ok(())
    }

    /// Effective data directory.
    pub fn data_dir(&self) -> Result<PathBuf, TrustError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    /// Effective database location.
    pub fn database_path(&self) -> Result<PathBuf, TrustError> {
        match &self.database {
            Some(database) => Ok(database.clone()),
            None => Ok(self.data_dir()?.join(DATABASE_FILE)),
        }
    }

    /// Effective signing secret.
    pub async fn resolve_secret(&self) -> Result<SecretString, TrustError> {
        if let Some(secret) = &self.secret {
            return Ok(SecretString::from(secret.as_str()));
        }
        let dir = self.data_dir()?;
        if self.store.create {
            ensure_secret(&dir).await
        } else {
            read_secret(&dir).await
        }
    }

    /// Validates the config and opens a [`Trust`] from it.
    pub async fn open(&self) -> Result<Trust, TrustError> {
        self.validate()?;
        let secret = self.resolve_secret().await?;
        Trust::open(self.database_path()?, secret, self.algorithm, self.store.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_paths_override_data_dir() {
        let config = TrustConfig {
            database: Some(PathBuf::from("/var/lib/trust.db")),
            ..TrustConfig::in_dir("/srv/jupyter")
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/var/lib/trust.db"));

        let config = TrustConfig::in_dir("/srv/jupyter");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/srv/jupyter/nbsignatures.db")
        );
    }

    #[test]
    fn empty_secret_rejected() {
        let config = TrustConfig {
            secret: Some(String::new()),
            ..TrustConfig::default()
        };
        assert!(matches!(config.validate(), Err(TrustError::Validation(_))));
    }

    #[test]
    fn store_options_are_validated() {
        let mut config = TrustConfig::default();
        config.store.cache_size = 0;
        assert!(matches!(config.validate(), Err(TrustError::Store(_))));
    }

    #[test]
    fn secret_is_never_serialized_or_printed() {
        let config = TrustConfig {
            secret: Some("hunter2".into()),
            ..TrustConfig::default()
        };
        assert!(!serde_json::to_string(&config).unwrap().contains("hunter2"));
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn deserializes_flattened_store_options() {
        let config: TrustConfig = serde_json::from_str(
            r#"{"secret": "s3cr3t", "algorithm": "sha384", "readonly": true, "cull": false}"#,
        )
        .unwrap();
        assert_eq!(config.algorithm, DigestAlg::Sha384);
        assert!(config.store.readonly);
        assert!(!config.store.cull);
        assert_eq!(config.store.cache_size, 65535);
        assert_eq!(config.secret.as_deref(), Some("s3cr3t"));
    }
}
