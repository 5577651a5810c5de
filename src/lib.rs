//! # Ordered collections built on a weight-balanced scapegoat tree
//!
//! `scapegoat-collections` provides [`ScapegoatMap`], a map sorted by key
//! that keeps itself balanced without storing any per-node balance metadata:
//! no color bits, no heights, no rotation counts.  Instead, an insertion
//! that lands too deep triggers a rebuild of one "scapegoat" subtree, and
//! accumulated deletions eventually trigger one rebuild of the whole tree.
//! Lookup, insertion, and deletion are amortized O(log n).
//!
//! The key order is a pluggable [`Comparator`] strategy, so the map works
//! uniformly over built-in and user-defined key types; [`NaturalOrder`]
//! covers any `K: Ord`.
//!
//! The [`load_document`] family of functions bulk-loads a map from a
//! serialized key-value document (a JSON object), inserting entries in
//! document order.

#![warn(missing_docs)]

mod error;
mod load;
mod scapegoat;

pub use error::{EmptyTreeError, LoadError};
pub use load::{load_document, load_path, load_str};
pub use scapegoat::{
    Comparator, Iter, NaturalOrder, Postorder, Preorder, ScapegoatMap, DEFAULT_ALPHA,
};
