//! The query service consumed by command handlers
//!
//! Typed entry points over the dedup cache: each derives the cache key for
//! its query, chooses the backend call variant from capability flags, and
//! maps loader failures into the engine error taxonomy. Correlation ids are
//! traced but never keyed on.

use std::sync::Arc;

use gridboard_core::errors::{GridboardError, Result};
use gridboard_core::fingerprint::fingerprint_of;
use gridboard_core::model::{Catalog, ElementsPage, ExecutionData, ExecutionDefinition};
use gridboard_core_types::{CorrelationId, ObjRef};

use crate::backend::{AnalyticalBackend, ElementsOptions, ElementsValueMode};
use crate::query::cache::{QueryCache, QueryError, QueryValue};
use crate::query::key::{QueryCacheKey, QueryKind};

/// Cached access to expensive backend reads
///
/// Cheap to clone; all clones share one cache and one backend handle.
#[derive(Clone)]
pub struct QueryService {
    backend: Arc<dyn AnalyticalBackend>,
    cache: Arc<QueryCache>,
}

impl QueryService {
    pub fn new(backend: Arc<dyn AnalyticalBackend>) -> Self {
        Self {
            backend,
            cache: Arc::new(QueryCache::new()),
        }
    }

    /// One page of a display form's elements
    ///
    /// The value mode (URIs vs primary values) follows the backend's
    /// capability flags.
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` when the underlying load fails; the failed
    /// entry is evicted so a retry re-invokes the backend.
    pub async fn elements(
        &self,
        display_form: &ObjRef,
        offset: usize,
        limit: usize,
        correlation_id: &CorrelationId,
    ) -> Result<Arc<ElementsPage>> {
        let key = QueryCacheKey::Elements {
            display_form: display_form.as_key(),
            offset,
            limit,
        };
        tracing::debug!(correlation = %correlation_id, key = ?key, "elements query");

        let mode = if self.backend.capabilities().supports_element_uris {
            ElementsValueMode::Uris
        } else {
            ElementsValueMode::PrimaryValues
        };
        let backend = self.backend.clone();
        let display_form = display_form.clone();

        let value = self
            .cache
            .get_or_load(key, move || {
                let backend = backend.clone();
                let display_form = display_form.clone();
                async move {
                    let page = backend
                        .list_elements(
                            &display_form,
                            ElementsOptions {
                                offset,
                                limit,
                                mode,
                            },
                        )
                        .await
                        .map_err(|e| QueryError(e.to_string()))?;
                    Ok(QueryValue::Elements(Arc::new(page)))
                }
            })
            .await
            .map_err(|e| GridboardError::QueryFailed { reason: e.0 })?;

        match value {
            QueryValue::Elements(page) => Ok(page),
            _ => Err(GridboardError::invariant("elements key resolved to a non-elements value")),
        }
    }

    /// Execution data for a definition, keyed by the definition fingerprint
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` on load failure, `Serialization` (fatal) if
    /// the definition cannot be fingerprinted.
    pub async fn execution(
        &self,
        definition: &ExecutionDefinition,
        correlation_id: &CorrelationId,
    ) -> Result<Arc<ExecutionData>> {
        let fingerprint = fingerprint_of(definition)?;
        let key = QueryCacheKey::Execution {
            fingerprint: fingerprint.as_str().to_string(),
        };
        tracing::debug!(correlation = %correlation_id, %fingerprint, "execution query");

        let backend = self.backend.clone();
        let definition = definition.clone();

        let value = self
            .cache
            .get_or_load(key, move || {
                let backend = backend.clone();
                let definition = definition.clone();
                async move {
                    let data = backend
                        .run_query(&definition)
                        .await
                        .map_err(|e| QueryError(e.to_string()))?;
                    Ok(QueryValue::Execution(Arc::new(data)))
                }
            })
            .await
            .map_err(|e| GridboardError::QueryFailed { reason: e.0 })?;

        match value {
            QueryValue::Execution(data) => Ok(data),
            _ => Err(GridboardError::invariant("execution key resolved to a non-execution value")),
        }
    }

    /// The workspace catalog
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` when the underlying load fails.
    pub async fn catalog(&self, correlation_id: &CorrelationId) -> Result<Arc<Catalog>> {
        tracing::debug!(correlation = %correlation_id, "catalog query");
        let backend = self.backend.clone();

        let value = self
            .cache
            .get_or_load(QueryCacheKey::Catalog, move || {
                let backend = backend.clone();
                async move {
                    let catalog = backend
                        .load_catalog()
                        .await
                        .map_err(|e| QueryError(e.to_string()))?;
                    Ok(QueryValue::Catalog(Arc::new(catalog)))
                }
            })
            .await
            .map_err(|e| GridboardError::QueryFailed { reason: e.0 })?;

        match value {
            QueryValue::Catalog(catalog) => Ok(catalog),
            _ => Err(GridboardError::invariant("catalog key resolved to a non-catalog value")),
        }
    }

    /// Remove every cached entry of the given kind
    pub fn invalidate(&self, kind: QueryKind) -> usize {
        let removed = self.cache.invalidate(|key| key.kind() == kind);
        tracing::debug!(?kind, removed, "query cache invalidated");
        removed
    }

    /// Remove cached element pages of one display form
    pub fn invalidate_elements_for(&self, display_form: &ObjRef) -> usize {
        let wanted = display_form.as_key();
        self.cache.invalidate(|key| {
            matches!(key, QueryCacheKey::Elements { display_form, .. } if display_form == &wanted)
        })
    }

    /// Backend capability flags
    pub fn capabilities(&self) -> crate::backend::BackendCapabilities {
        self.backend.capabilities()
    }
}
