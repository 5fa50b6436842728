//! Typed cache keys
//!
//! Keys are hashable composites of the query kind plus a canonical
//! parameter representation, so distinct queries can never collide the way
//! ad-hoc string concatenation could. Correlation ids are deliberately not
//! part of any key: two commands requesting the same data share one entry.

/// Kind of a cached query, used for bulk invalidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Elements,
    Execution,
    Catalog,
}

/// Derived key identifying one cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryCacheKey {
    /// One page of a display form's elements; page coordinates are part of
    /// the key, so every page is a distinct entry
    Elements {
        display_form: String,
        offset: usize,
        limit: usize,
    },
    /// One execution, identified by its definition's fingerprint
    Execution { fingerprint: String },
    /// The workspace catalog (one per session)
    Catalog,
}

impl QueryCacheKey {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryCacheKey::Elements { .. } => QueryKind::Elements,
            QueryCacheKey::Execution { .. } => QueryKind::Execution,
            QueryCacheKey::Catalog => QueryKind::Catalog,
        }
    }
}
