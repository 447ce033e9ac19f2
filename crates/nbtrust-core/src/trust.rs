use futures::future::try_join_all;
use nbtrust_canonical::{DigestAlg, Value};
use nbtrust_store::{SignatureStore, StoreOptions};
use secrecy::{ExposeSecret, SecretString};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::TrustError;
use crate::notebook::{is_trusted_format, load, AsNotebook, NotebookRef, NotebookSource};
use crate::secret::{default_data_dir, read_secret, DATABASE_FILE};

/// Signs and checks notebooks against one signature store with one secret.
///
/// Every operation first resolves its argument to a document (reading the
/// file for path references) and requires a numeric `nbformat >= 3`.
/// Documents that fail that check are never trusted: the operation returns
/// `false` without touching the store.
pub struct Trust {
    store: SignatureStore,
    secret: SecretString,
    algorithm: DigestAlg,
}

impl std::fmt::Debug for Trust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trust")
            .field("algorithm", &self.algorithm)
            .field("options", self.store.options())
            .finish_non_exhaustive()
    }
}

impl Trust {
    /// Opens the database at `database` and signs with `secret`.
    pub async fn open(
        database: impl AsRef<Path>,
        secret: SecretString,
        algorithm: DigestAlg,
        options: StoreOptions,
    ) -> Result<Self, TrustError> {
        let store = SignatureStore::open(database, options).await?;
        Ok(Self::with_store(store, secret, algorithm))
    }

    /// Opens `<dir>/nbsignatures.db` with the secret from
    /// `<dir>/notebook_secret`. `None` uses [`default_data_dir`].
    pub async fn from_data_dir(
        dir: Option<&Path>,
        algorithm: DigestAlg,
        options: StoreOptions,
    ) -> Result<Self, TrustError> {
        let dir: PathBuf = match dir {
            Some(dir) => dir.to_path_buf(),
            None => default_data_dir()?,
        };
        let secret = read_secret(&dir).await?;
        Self::open(dir.join(DATABASE_FILE), secret, algorithm, options).await
    }

    /// Wraps an already opened store.
    pub fn with_store(store: SignatureStore, secret: SecretString, algorithm: DigestAlg) -> Self {
        Self {
            store,
            secret,
            algorithm,
        }
    }

    /// Algorithm used for new and checked signatures.
    pub fn algorithm(&self) -> DigestAlg {
        self.algorithm
    }

    /// The underlying signature store.
    pub fn store(&self) -> &SignatureStore {
        &self.store
    }

    /// Digest of `doc` under this instance's secret and algorithm. Does not
    /// check the format marker.
    pub fn digest(&self, doc: &Value) -> Result<String, TrustError> {
        Ok(nbtrust_canonical::digest(
            doc,
            self.secret.expose_secret().as_bytes(),
            self.algorithm,
        )?)
    }

    /// Marks a notebook as trusted. Returns whether a new signature was
    /// recorded; `false` if it was already trusted or is not a trustable
    /// notebook.
    pub async fn sign<N: AsNotebook + ?Sized>(&self, notebook: &N) -> Result<bool, TrustError> {
        let notebook = notebook.as_notebook();
        let Some(signature) = self.signature_of(notebook).await? else {
            return Ok(false);
        };
        let path = notebook.path().map(|p| p.display().to_string());
        Ok(self
            .store
            .store_with_path(&signature, self.algorithm.as_str(), path.as_deref())
            .await?)
    }

    /// Whether a notebook is trusted.
    pub async fn check<N: AsNotebook + ?Sized>(&self, notebook: &N) -> Result<bool, TrustError> {
        let Some(signature) = self.signature_of(notebook.as_notebook()).await? else {
            return Ok(false);
        };
        Ok(self.store.check(&signature, self.algorithm.as_str()).await?)
    }

    /// Revokes trust in a notebook. Returns whether a signature was removed.
    pub async fn unsign<N: AsNotebook + ?Sized>(&self, notebook: &N) -> Result<bool, TrustError> {
        let Some(signature) = self.signature_of(notebook.as_notebook()).await? else {
            return Ok(false);
        };
        Ok(self.store.remove(&signature, self.algorithm.as_str()).await?)
    }

    /// Keeps the trusted notebooks, in input order.
    ///
    /// All checks run concurrently; the first error aborts the whole filter.
    pub async fn filter<T: AsNotebook>(&self, items: Vec<T>) -> Result<Vec<T>, TrustError> {
        let verdicts = try_join_all(items.iter().map(|item| self.check(item))).await?;
        Ok(retain_trusted(items, verdicts))
    }

    /// Like [`filter`](Self::filter), mapping each item to its notebook
    /// through `accessor` first. Items the accessor maps to `None` are
    /// dropped.
    pub async fn filter_with<T, F, Fut>(
        &self,
        items: Vec<T>,
        accessor: F,
    ) -> Result<Vec<T>, TrustError>
    where
        F: Fn(&T) -> Fut,
        Fut: Future<Output = Option<NotebookSource>>,
    {
        let checks = items.iter().map(|item| {
            let source = accessor(item);
            async move {
                match source.await {
                    Some(source) => self.check(&source).await,
                    None => Ok(false),
                }
            }
        });
        let verdicts = try_join_all(checks).await?;
        Ok(retain_trusted(items, verdicts))
    }

    /// Closes the underlying store.
    pub async fn close(self) -> Result<(), TrustError> {
        Ok(self.store.close().await?)
    }

    async fn signature_of(&self, notebook: NotebookRef<'_>) -> Result<Option<String>, TrustError> {
        let doc = load(notebook).await?;
        if !is_trusted_format(&doc) {
            debug!(
                path = ?notebook.path(),
                "not a trustable notebook format; reporting untrusted"
            );
            return Ok(None);
        }
        self.digest(&doc).map(Some)
    }
}

fn retain_trusted<T>(items: Vec<T>, verdicts: Vec<bool>) -> Vec<T> {
    items
        .into_iter()
        .zip(verdicts)
        .filter_map(|(item, trusted)| trusted.then_some(item))
        .collect()
}
