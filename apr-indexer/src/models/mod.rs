//! Upstream record shapes and their response envelopes
//!
//! Every numeric scalar arrives from the indexers as a decimal string.
//! Fields are decoded leniently: a malformed or missing value becomes zero
//! instead of failing the whole page.

pub mod farming;
pub mod numeric;
pub mod pool;
pub mod position;

pub use farming::*;
pub use pool::*;
pub use position::*;

use serde::de::DeserializeOwned;

/// Item that can serve as a keyset-pagination cursor
pub trait Cursor {
    /// Key compared against `id_gt` on the next request
    fn cursor(&self) -> &str;
}

/// Response envelope of a paginated dataset
pub trait Page: DeserializeOwned {
    type Item: Cursor;

    fn into_items(self) -> Vec<Self::Item>;
}
