//! One-call wrappers: open a [`Trust`] from a config, run one operation, close.
//!
//! The store is closed even when the operation fails; the operation's error
//! wins over a close error.

use nbtrust_canonical::Value;
use secrecy::ExposeSecret;
use std::future::Future;

use crate::config::TrustConfig;
use crate::errors::TrustError;
use crate::notebook::{AsNotebook, NotebookSource};
use crate::secret::SecretCache;
use crate::trust::Trust;

async fn finish<T>(trust: Trust, result: Result<T, TrustError>) -> Result<T, TrustError> {
    let closed = trust.close().await;
    let value = result?;
    closed?;
    Ok(value)
}

/// Signs one notebook. See [`Trust::sign`].
pub async fn sign<N: AsNotebook + ?Sized>(
    notebook: &N,
    config: &TrustConfig,
) -> Result<bool, TrustError> {
    let trust = config.open().await?;
    let result = trust.sign(notebook).await;
    finish(trust, result).await
}

/// Checks one notebook. See [`Trust::check`].
pub async fn check<N: AsNotebook + ?Sized>(
    notebook: &N,
    config: &TrustConfig,
) -> Result<bool, TrustError> {
    let trust = config.open().await?;
    let result = trust.check(notebook).await;
    finish(trust, result).await
}

/// Unsigns one notebook. See [`Trust::unsign`].
pub async fn unsign<N: AsNotebook + ?Sized>(
    notebook: &N,
    config: &TrustConfig,
) -> Result<bool, TrustError> {
    let trust = config.open().await?;
    let result = trust.unsign(notebook).await;
    finish(trust, result).await
}

/// Filters notebooks down to the trusted ones. See [`Trust::filter`].
pub async fn filter<T: AsNotebook>(
    items: Vec<T>,
    config: &TrustConfig,
) -> Result<Vec<T>, TrustError> {
    let trust = config.open().await?;
    let result = trust.filter(items).await;
    finish(trust, result).await
}

/// Filters items through an accessor. See [`Trust::filter_with`].
pub async fn filter_with<T, F, Fut>(
    items: Vec<T>,
    accessor: F,
    config: &TrustConfig,
) -> Result<Vec<T>, TrustError>
where
    F: Fn(&T) -> Fut,
    Fut: Future<Output = Option<NotebookSource>>,
{
    let trust = config.open().await?;
    let result = trust.filter_with(items, accessor).await;
    finish(trust, result).await
}

/// Digest of `doc` without opening the store.
///
/// Uses the configured secret, or the one in the data directory.
pub async fn digest(doc: &Value, config: &TrustConfig) -> Result<String, TrustError> {
    config.validate()?;
    if config.secret.is_some() {
        let secret = config.resolve_secret().await?;
        return Ok(nbtrust_canonical::digest(
            doc,
            secret.expose_secret().as_bytes(),
            config.algorithm,
        )?);
    }
    SecretCache::new(config.data_dir()?)
        .digest(doc, config.algorithm)
        .await
}
