//! Resolution of the per-installation signing secret.
//!
//! The secret lives in `notebook_secret` inside the Jupyter data directory,
//! next to the `nbsignatures.db` database. Secrets are held as
//! [`SecretString`] so they never end up in logs or debug output.

use base64::Engine;
use nbtrust_canonical::{DigestAlg, Value};
use rand::RngCore;
use secrecy::zeroize::Zeroizing;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::errors::TrustError;

/// File name of the secret inside the data directory.
pub const SECRET_FILE: &str = "notebook_secret";

/// File name of the signature database inside the data directory.
pub const DATABASE_FILE: &str = "nbsignatures.db";

/// Random bytes in a generated secret.
pub const SECRET_BYTES: usize = 1024;

/// Jupyter data directory for this host.
///
/// `JUPYTER_DATA_DIR` wins when set. Otherwise:
/// - macOS: `~/Library/Jupyter`
/// - Windows: `%APPDATA%\jupyter`, or `~\.jupyter\data` without `APPDATA`
/// - elsewhere: `$XDG_DATA_HOME/jupyter`, or `~/.local/share/jupyter`
pub fn default_data_dir() -> Result<PathBuf, TrustError> {
    if let Some(dir) = env::var_os("JUPYTER_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if cfg!(target_os = "macos") {
        return Ok(home_dir()?.join("Library").join("Jupyter"));
    }
    if cfg!(windows) {
        return match env::var_os("APPDATA") {
            Some(appdata) => Ok(PathBuf::from(appdata).join("jupyter")),
            None => Ok(home_dir()?.join(".jupyter").join("data")),
        };
    }
    let base = match env::var_os("XDG_DATA_HOME") {
        Some(base) => PathBuf::from(base),
        None => home_dir()?.join(".local").join("share"),
    };
    Ok(base.join("jupyter"))
}

fn home_dir() -> Result<PathBuf, TrustError> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env::var_os(var)
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| TrustError::Secret(format!("cannot locate home directory: {var} is unset")))
}

/// Generates a fresh secret: 1024 random bytes, base64 encoded.
pub fn generate_secret() -> SecretString {
    let mut bytes = Zeroizing::new(vec![0u8; SECRET_BYTES]);
    rand::thread_rng().fill_bytes(&mut bytes);
    SecretString::from(base64::engine::general_purpose::STANDARD.encode(bytes.as_slice()))
}

/// Reads the secret stored in `dir`. The file content is used verbatim as
/// the MAC key.
pub async fn read_secret(dir: &Path) -> Result<SecretString, TrustError> {
    let path = dir.join(SECRET_FILE);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| TrustError::io(&path, e))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| TrustError::Secret(format!("{} is not valid UTF-8", path.display())))?;
    Ok(SecretString::from(text))
}

/// Reads the secret stored in `dir`, generating and persisting one first if
/// none exists. New secret files are only readable by the owner.
pub async fn ensure_secret(dir: &Path) -> Result<SecretString, TrustError> {
    let path = dir.join(SECRET_FILE);
    match write_new_secret(&path).await {
        Ok(secret) => {
            info!(path = %path.display(), "generated new notebook secret");
            Ok(secret)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => read_secret(dir).await,
        Err(e) => Err(TrustError::io(&path, e)),
    }
}

async fn write_new_secret(path: &Path) -> std::io::Result<SecretString> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    let secret = generate_secret();
    file.write_all(secret.expose_secret().as_bytes()).await?;
    file.flush().await?;
    Ok(secret)
}

/// Lazily loaded secret for one data directory.
///
/// The secret is read on first [`resolve`](Self::resolve) and cached until
/// [`refresh`](Self::refresh) is called.
#[derive(Debug)]
pub struct SecretCache {
    dir: PathBuf,
    cached: RwLock<Option<SecretString>>,
}

impl SecretCache {
    /// Cache for the secret stored in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cached: RwLock::new(None),
        }
    }

    /// Cache for the secret in [`default_data_dir`].
    pub fn from_default_dir() -> Result<Self, TrustError> {
        Ok(Self::new(default_data_dir()?))
    }

    /// Data directory this cache reads from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the cached secret, reading it on first use.
    pub async fn resolve(&self) -> Result<SecretString, TrustError> {
        if let Some(secret) = self.cached.read().await.as_ref() {
            return Ok(secret.clone());
        }
        let mut slot = self.cached.write().await;
        if let Some(secret) = slot.as_ref() {
            return Ok(secret.clone());
        }
        let secret = read_secret(&self.dir).await?;
        debug!(dir = %self.dir.display(), "loaded notebook secret");
        *slot = Some(secret.clone());
        Ok(secret)
    }

    /// Re-reads the secret from disk, replacing the cached one.
    pub async fn refresh(&self) -> Result<SecretString, TrustError> {
        let mut slot = self.cached.write().await;
        let secret = read_secret(&self.dir).await?;
        debug!(dir = %self.dir.display(), "reloaded notebook secret");
        *slot = Some(secret.clone());
        Ok(secret)
    }

    /// Digest of `doc` keyed with this directory's secret.
    pub async fn digest(&self, doc: &Value, algorithm: DigestAlg) -> Result<String, TrustError> {
        let secret = self.resolve().await?;
        Ok(nbtrust_canonical::digest(
            doc,
            secret.expose_secret().as_bytes(),
            algorithm,
        )?)
    }
}
