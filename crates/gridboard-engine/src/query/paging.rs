//! Paging adapters for element listings
//!
//! [`ElementsPager`] walks a display form's elements through the query
//! service: every page it touches is a distinct derived cache key, so pages
//! are shared across commands like any other cached read.
//! [`InMemoryPager`] wraps an already-fully-loaded collection and slices it
//! without ever re-querying the backend.

use std::sync::Arc;

use gridboard_core::errors::Result;
use gridboard_core::model::{Element, ElementsPage};
use gridboard_core_types::{CorrelationId, ObjRef};

use crate::query::service::QueryService;

/// Cursor over the pages of one display form's element listing
pub struct ElementsPager {
    service: QueryService,
    display_form: ObjRef,
    page_size: usize,
    correlation_id: CorrelationId,
    current: Arc<ElementsPage>,
}

impl ElementsPager {
    /// Load the first page and return a positioned pager
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` when the first page cannot be loaded.
    pub async fn first(
        service: QueryService,
        display_form: ObjRef,
        page_size: usize,
        correlation_id: CorrelationId,
    ) -> Result<Self> {
        let current = service
            .elements(&display_form, 0, page_size, &correlation_id)
            .await?;
        Ok(Self {
            service,
            display_form,
            page_size,
            correlation_id,
            current,
        })
    }

    /// The page the cursor is on
    pub fn current(&self) -> &ElementsPage {
        &self.current
    }

    /// Advance to the next page; returns false when already on the last one
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` when the page cannot be loaded.
    pub async fn next(&mut self) -> Result<bool> {
        if !self.current.has_next() {
            return Ok(false);
        }
        let offset = self.current.offset + self.current.elements.len();
        self.current = self
            .service
            .elements(&self.display_form, offset, self.page_size, &self.correlation_id)
            .await?;
        Ok(true)
    }

    /// Jump to an arbitrary zero-based page index
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` when the page cannot be loaded.
    pub async fn go_to(&mut self, page_index: usize) -> Result<()> {
        let offset = page_index * self.page_size;
        self.current = self
            .service
            .elements(&self.display_form, offset, self.page_size, &self.correlation_id)
            .await?;
        Ok(())
    }

    /// Collect every element across all pages, starting from page zero
    ///
    /// # Errors
    ///
    /// Returns `QueryFailed` when any page cannot be loaded.
    pub async fn all(&mut self) -> Result<Vec<Element>> {
        self.go_to(0).await?;
        let mut elements = self.current.elements.clone();
        while self.next().await? {
            elements.extend(self.current.elements.iter().cloned());
        }
        Ok(elements)
    }
}

/// Paging over a collection that is already fully in memory
///
/// Mirrors the pager surface so callers can page over stashed or
/// pre-resolved element lists without touching the backend.
#[derive(Debug, Clone)]
pub struct InMemoryPager {
    elements: Vec<Element>,
    page_size: usize,
    page_index: usize,
}

impl InMemoryPager {
    pub fn new(elements: Vec<Element>, page_size: usize) -> Self {
        Self {
            elements,
            page_size: page_size.max(1),
            page_index: 0,
        }
    }

    /// The page the cursor is on
    pub fn current(&self) -> ElementsPage {
        let offset = self.page_index * self.page_size;
        let end = (offset + self.page_size).min(self.elements.len());
        let slice = if offset < self.elements.len() {
            self.elements[offset..end].to_vec()
        } else {
            Vec::new()
        };
        ElementsPage {
            elements: slice,
            offset,
            limit: self.page_size,
            total: self.elements.len(),
        }
    }

    /// Advance to the next page; returns false when already on the last one
    pub fn next(&mut self) -> bool {
        if !self.current().has_next() {
            return false;
        }
        self.page_index += 1;
        true
    }

    /// Jump to an arbitrary zero-based page index
    pub fn go_to(&mut self, page_index: usize) {
        self.page_index = page_index;
    }

    /// Every element of the wrapped collection
    pub fn all(&self) -> &[Element] {
        &self.elements
    }
}
