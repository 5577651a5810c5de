use thiserror::Error;

/// The error returned by [`minimum`](crate::ScapegoatMap::minimum) and
/// [`maximum`](crate::ScapegoatMap::maximum) on an empty map.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("empty tree has no extreme entry")]
pub struct EmptyTreeError;

/// Errors produced while bulk-loading a serialized key-value document.
///
/// Loading failures never surface as core-tree errors; a map built by the
/// loader is only handed back once every entry has been inserted.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The document could not be read.
    #[error("i/o error reading key-value document: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed JSON.
    #[error("malformed key-value document: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed, but its top-level value is not an object.
    #[error("top-level value of a key-value document must be an object")]
    NotAnObject,
}
