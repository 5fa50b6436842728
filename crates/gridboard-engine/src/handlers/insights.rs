//! Insight and backend command family

use chrono::Utc;

use gridboard_core::errors::{GridboardError, Result};
use gridboard_core::events::EventPayload;
use gridboard_core::fingerprint::fingerprint_of;
use gridboard_core::model::{ExecutionDefinition, WidgetKind};
use gridboard_core::state::InsightCacheEntry;
use gridboard_core_types::{ObjRef, WidgetId};

use crate::context::HandlerContext;
use crate::query::QueryKind;

fn insight_definition(ctx: &HandlerContext, widget_id: &WidgetId) -> Result<ExecutionDefinition> {
    ctx.read(|state| {
        let widget = state.active_layout()?.widget(widget_id)?;
        match &widget.kind {
            WidgetKind::Insight { definition } => Ok(definition.clone()),
            _ => Err(GridboardError::WidgetNotInsight {
                widget_id: widget_id.clone(),
            }),
        }
    })
}

/// Re-run the widget's execution and cache the result under its fingerprint
///
/// The execution itself goes through the query service, so concurrent
/// refreshes of widgets sharing one definition dedup into a single backend
/// call.
pub(super) async fn refresh_insight_widget(
    ctx: &HandlerContext,
    widget_id: &WidgetId,
) -> Result<EventPayload> {
    let definition = insight_definition(ctx, widget_id)?;
    let fingerprint = fingerprint_of(&definition)?;

    let data = ctx
        .cancellable(ctx.queries().execution(&definition, ctx.correlation_id()))
        .await?;

    ctx.write(|state| {
        // The widget may have been removed while the execution ran
        state.active_layout()?.widget(widget_id)?;
        state.insights.insert(
            widget_id.clone(),
            InsightCacheEntry {
                fingerprint: fingerprint.clone(),
                data: (*data).clone(),
                refreshed_at: Utc::now(),
            },
        );
        Ok(EventPayload::InsightWidgetRefreshed {
            widget_id: widget_id.clone(),
            fingerprint: fingerprint.clone(),
        })
    })
}

/// Export the widget's data as a backend artifact
pub(super) async fn export_insight_widget(
    ctx: &HandlerContext,
    widget_id: &WidgetId,
    format: &str,
) -> Result<EventPayload> {
    if !ctx.queries().capabilities().supports_export {
        return Err(GridboardError::ExportNotSupported);
    }
    // Existence and kind check up front; exports are not cached
    insight_definition(ctx, widget_id)?;

    ctx.write(|state| {
        state.ui.exporting = true;
        Ok(())
    })?;

    let reference = ObjRef::identifier(widget_id.as_str());
    let backend = ctx.backend().clone();
    let result = ctx
        .cancellable(async {
            backend
                .export_artifact(&reference, format)
                .await
                .map_err(|e| GridboardError::Backend {
                    reason: e.to_string(),
                })
        })
        .await;

    ctx.write(|state| {
        state.ui.exporting = false;
        Ok(())
    })?;

    let artifact = result?;
    Ok(EventPayload::InsightWidgetExported {
        widget_id: widget_id.clone(),
        uri: artifact.uri,
    })
}

/// Drop the cached catalog and load a fresh one into the store
pub(super) async fn reload_catalog(ctx: &HandlerContext) -> Result<EventPayload> {
    ctx.queries().invalidate(QueryKind::Catalog);
    let catalog = ctx
        .cancellable(ctx.queries().catalog(ctx.correlation_id()))
        .await?;

    ctx.write(|state| {
        state.catalog = Some((*catalog).clone());
        Ok(EventPayload::CatalogReloaded {
            item_count: catalog.items.len(),
        })
    })
}
