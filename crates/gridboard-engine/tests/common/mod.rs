//! Shared fixtures: a counting stub backend and dashboard builders

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use gridboard_core::model::{
    Catalog, CatalogItem, CatalogItemType, Element, ElementsPage, ExecutionData,
    ExecutionDefinition, Item, Measure, Widget, WidgetKind,
};
use gridboard_core::state::DashboardState;
use gridboard_core_types::{ObjRef, WidgetId};
use gridboard_engine::{
    AnalyticalBackend, BackendCapabilities, BackendError, ElementsOptions, ExportArtifact,
};

/// Backend stub that counts calls and serves canned data
#[allow(dead_code)]
pub struct StubBackend {
    catalog: Catalog,
    elements: HashMap<String, Vec<Element>>,
    data: ExecutionData,
    supports_export: bool,
    /// When set, queries park forever; used by cancellation tests
    block_queries: bool,
    pub run_query_calls: AtomicUsize,
    pub list_elements_calls: AtomicUsize,
    pub load_catalog_calls: AtomicUsize,
    pub export_calls: AtomicUsize,
}

impl StubBackend {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
            elements: HashMap::new(),
            data: ExecutionData {
                columns: vec!["amount".to_string()],
                rows: vec![vec![42.0]],
            },
            supports_export: false,
            block_queries: false,
            run_query_calls: AtomicUsize::new(0),
            list_elements_calls: AtomicUsize::new(0),
            load_catalog_calls: AtomicUsize::new(0),
            export_calls: AtomicUsize::new(0),
        }
    }

    #[allow(dead_code)]
    pub fn with_display_form(mut self, id: &str) -> Self {
        self.catalog.items.push(CatalogItem {
            item_ref: ObjRef::identifier(id),
            title: id.to_string(),
            item_type: CatalogItemType::DisplayForm,
        });
        self
    }

    #[allow(dead_code)]
    pub fn with_elements(mut self, display_form_id: &str, values: &[&str]) -> Self {
        let elements = values
            .iter()
            .map(|v| Element {
                title: v.to_string(),
                value: v.to_string(),
            })
            .collect();
        self.elements
            .insert(ObjRef::identifier(display_form_id).as_key(), elements);
        self
    }

    #[allow(dead_code)]
    pub fn with_export(mut self) -> Self {
        self.supports_export = true;
        self
    }

    #[allow(dead_code)]
    pub fn blocking_queries(mut self) -> Self {
        self.block_queries = true;
        self
    }

    async fn maybe_block(&self) {
        if self.block_queries {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl AnalyticalBackend for StubBackend {
    async fn run_query(
        &self,
        _definition: &ExecutionDefinition,
    ) -> Result<ExecutionData, BackendError> {
        self.run_query_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_block().await;
        Ok(self.data.clone())
    }

    async fn list_elements(
        &self,
        display_form: &ObjRef,
        options: ElementsOptions,
    ) -> Result<ElementsPage, BackendError> {
        self.list_elements_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_block().await;
        let all = self
            .elements
            .get(&display_form.as_key())
            .ok_or_else(|| BackendError::NotFound {
                reference: display_form.as_key(),
            })?;
        let end = (options.offset + options.limit).min(all.len());
        let page = if options.offset < all.len() {
            all[options.offset..end].to_vec()
        } else {
            Vec::new()
        };
        Ok(ElementsPage {
            elements: page,
            offset: options.offset,
            limit: options.limit,
            total: all.len(),
        })
    }

    async fn load_catalog(&self) -> Result<Catalog, BackendError> {
        self.load_catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_block().await;
        Ok(self.catalog.clone())
    }

    async fn export_artifact(
        &self,
        reference: &ObjRef,
        format: &str,
    ) -> Result<ExportArtifact, BackendError> {
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_block().await;
        Ok(ExportArtifact {
            uri: format!("export://{}.{format}", reference.as_key()),
        })
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities {
            supports_element_uris: false,
            supports_export: self.supports_export,
        }
    }
}

#[allow(dead_code)]
pub fn stub(backend: StubBackend) -> Arc<StubBackend> {
    Arc::new(backend)
}

/// Simple execution definition over one measure
#[allow(dead_code)]
pub fn definition(measure_id: &str) -> ExecutionDefinition {
    ExecutionDefinition {
        measures: vec![Measure::simple(
            measure_id,
            ObjRef::identifier(format!("m.{measure_id}")),
        )],
        attributes: vec![],
        filters: vec![],
        sort_by: vec![],
    }
}

/// Layout item hosting an insight widget
#[allow(dead_code)]
pub fn insight_item(widget_id: &str) -> Item {
    Item::new(Widget {
        id: WidgetId::from(widget_id),
        title: format!("Insight {widget_id}"),
        kind: WidgetKind::Insight {
            definition: definition(widget_id),
        },
    })
}

/// Layout item hosting a rich-text widget (no backend interaction)
#[allow(dead_code)]
pub fn rich_text_item(widget_id: &str) -> Item {
    Item::new(Widget {
        id: WidgetId::from(widget_id),
        title: format!("Text {widget_id}"),
        kind: WidgetKind::RichText {
            content: "hello".to_string(),
        },
    })
}

#[allow(dead_code)]
pub fn initial_state() -> DashboardState {
    DashboardState::with_initial_tab("Overview")
}
