use std::borrow::Cow;

use crate::value::Value;

/// Key of the top-level mapping holding notebook metadata.
pub const METADATA_KEY: &str = "metadata";
/// Key inside `metadata` holding the embedded signature.
pub const SIGNATURE_KEY: &str = "signature";

/// Returns the document without `metadata.signature`.
///
/// Only the top-level `metadata` mapping is touched; a `signature` key on a
/// cell or nested object is part of the signed content. The caller's value
/// is never modified: when there is nothing to strip the input is borrowed,
/// otherwise a copy is made.
pub fn omit_signature(document: &Value) -> Cow<'_, Value> {
    let has_signature = document
        .get(METADATA_KEY)
        .and_then(Value::as_mapping)
        .is_some_and(|meta| meta.contains_key(SIGNATURE_KEY));
    if !has_signature {
        return Cow::Borrowed(document);
    }

    let mut stripped = document.clone();
    if let Some(meta) = stripped
        .as_mapping_mut()
        .and_then(|map| map.get_mut(METADATA_KEY))
        .and_then(Value::as_mapping_mut)
    {
        meta.remove(SIGNATURE_KEY);
    }
    Cow::Owned(stripped)
}
