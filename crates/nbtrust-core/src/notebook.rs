use nbtrust_canonical::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::errors::TrustError;

/// Lowest `nbformat` major version that carries trust.
pub const MIN_NBFORMAT: i32 = 3;

/// A notebook to operate on, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub enum NotebookRef<'a> {
    /// A notebook file, read and parsed on use.
    Path(&'a Path),
    /// An already parsed notebook.
    Document(&'a Value),
}

impl NotebookRef<'_> {
    /// Source path, if this refers to a file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(*path),
            Self::Document(_) => None,
        }
    }
}

/// Owned counterpart of [`NotebookRef`], produced by filter accessors.
#[derive(Debug, Clone, PartialEq)]
pub enum NotebookSource {
    /// A notebook file.
    Path(PathBuf),
    /// An already parsed notebook.
    Document(Value),
}

impl From<PathBuf> for NotebookSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for NotebookSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Value> for NotebookSource {
    fn from(doc: Value) -> Self {
        Self::Document(doc)
    }
}

/// Anything that can be viewed as a notebook reference.
///
/// Strings are treated as file paths.
pub trait AsNotebook {
    /// Borrows `self` as a notebook reference.
    fn as_notebook(&self) -> NotebookRef<'_>;
}

impl AsNotebook for NotebookRef<'_> {
    fn as_notebook(&self) -> NotebookRef<'_> {
        *self
    }
}

impl AsNotebook for NotebookSource {
    fn as_notebook(&self) -> NotebookRef<'_> {
        match self {
            Self::Path(path) => NotebookRef::Path(path),
            Self::Document(doc) => NotebookRef::Document(doc),
        }
    }
}

impl AsNotebook for Value {
    fn as_notebook(&self) -> NotebookRef<'_> {
        NotebookRef::Document(self)
    }
}

impl AsNotebook for Path {
    fn as_notebook(&self) -> NotebookRef<'_> {
        NotebookRef::Path(self)
    }
}

impl AsNotebook for PathBuf {
    fn as_notebook(&self) -> NotebookRef<'_> {
        NotebookRef::Path(self)
    }
}

impl AsNotebook for str {
    fn as_notebook(&self) -> NotebookRef<'_> {
        NotebookRef::Path(Path::new(self))
    }
}

impl AsNotebook for String {
    fn as_notebook(&self) -> NotebookRef<'_> {
        NotebookRef::Path(Path::new(self))
    }
}

impl<T: AsNotebook + ?Sized> AsNotebook for &T {
    fn as_notebook(&self) -> NotebookRef<'_> {
        (**self).as_notebook()
    }
}

/// Resolves a reference to a parsed document, reading the file if needed.
pub async fn load(notebook: NotebookRef<'_>) -> Result<Cow<'_, Value>, TrustError> {
    match notebook {
        NotebookRef::Document(doc) => Ok(Cow::Borrowed(doc)),
        NotebookRef::Path(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| TrustError::io(path, e))?;
            Ok(Cow::Owned(Value::from_json_slice(&bytes)?))
        }
    }
}

/// Whether `doc` is a notebook whose format can be trusted: a mapping with a
/// numeric `nbformat` of at least 3.
pub fn is_trusted_format(doc: &Value) -> bool {
    match doc.get("nbformat") {
        Some(Value::Integer(n)) => {
            !n.is_negative() && n.to_i64().map_or(true, |n| n >= i64::from(MIN_NBFORMAT))
        }
        Some(Value::Float(f)) => *f >= f64::from(MIN_NBFORMAT),
        _ => false,
    }
}
