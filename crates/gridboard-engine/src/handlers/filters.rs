//! Filter context command family
//!
//! Adding a filter validates its display form against the cached catalog;
//! changing a selection can optionally validate the chosen elements against
//! the backend's element listing. Both validations run outside the store
//! lock; the mutation itself is a single write step that re-resolves its
//! target.

use std::collections::HashSet;

use gridboard_core::errors::{GridboardError, Result};
use gridboard_core::events::EventPayload;
use gridboard_core::model::{AttributeFilter, DateFilter};
use gridboard_core_types::ObjRef;

use crate::context::HandlerContext;
use crate::query::ElementsPager;

/// Page size used when validating selections against element listings
const VALIDATION_PAGE_SIZE: usize = 500;

pub(super) async fn add_attribute_filter(
    ctx: &HandlerContext,
    local_id: &str,
    display_form: &ObjRef,
    index: Option<usize>,
) -> Result<EventPayload> {
    let catalog = ctx
        .cancellable(ctx.queries().catalog(ctx.correlation_id()))
        .await?;
    if !catalog.has_display_form(display_form) {
        return Err(GridboardError::DisplayFormNotInCatalog {
            display_form: display_form.as_key(),
        });
    }

    ctx.write(|state| {
        state.filter_context.add(
            AttributeFilter {
                local_id: local_id.to_string(),
                display_form: display_form.clone(),
                elements: Vec::new(),
                negative: false,
            },
            index,
        )?;
        Ok(EventPayload::AttributeFilterAdded {
            local_id: local_id.to_string(),
        })
    })
}

pub(super) fn remove_attribute_filter(
    ctx: &HandlerContext,
    local_id: &str,
) -> Result<EventPayload> {
    ctx.write(|state| {
        state.filter_context.remove(local_id)?;
        Ok(EventPayload::AttributeFilterRemoved {
            local_id: local_id.to_string(),
        })
    })
}

pub(super) fn move_attribute_filter(
    ctx: &HandlerContext,
    local_id: &str,
    to: usize,
) -> Result<EventPayload> {
    ctx.write(|state| {
        state.filter_context.move_filter(local_id, to)?;
        Ok(EventPayload::AttributeFilterMoved {
            local_id: local_id.to_string(),
            to,
        })
    })
}

pub(super) async fn change_attribute_filter_selection(
    ctx: &HandlerContext,
    local_id: &str,
    elements: &[String],
    negative: bool,
    validate_elements: bool,
) -> Result<EventPayload> {
    let display_form = ctx.read(|state| {
        state
            .filter_context
            .find(local_id)
            .map(|f| f.display_form.clone())
            .ok_or_else(|| GridboardError::FilterNotFound {
                local_id: local_id.to_string(),
            })
    })?;

    if validate_elements && !elements.is_empty() {
        ctx.cancellable(validate_selection(ctx, &display_form, elements))
            .await?;
    }

    ctx.write(|state| {
        // Re-resolve after the await; the filter is the mutation target
        let filter = state.filter_context.find_mut(local_id)?;
        filter.elements = elements.to_vec();
        filter.negative = negative;
        Ok(EventPayload::AttributeFilterSelectionChanged {
            local_id: local_id.to_string(),
            element_count: elements.len(),
        })
    })
}

/// Check that every selected element exists in the display form's listing
async fn validate_selection(
    ctx: &HandlerContext,
    display_form: &ObjRef,
    elements: &[String],
) -> Result<()> {
    let mut wanted: HashSet<&str> = elements.iter().map(String::as_str).collect();
    let mut pager = ElementsPager::first(
        ctx.queries().clone(),
        display_form.clone(),
        VALIDATION_PAGE_SIZE,
        ctx.correlation_id().clone(),
    )
    .await?;

    loop {
        for element in &pager.current().elements {
            wanted.remove(element.value.as_str());
        }
        if wanted.is_empty() || !pager.next().await? {
            break;
        }
    }

    if wanted.is_empty() {
        Ok(())
    } else {
        let mut unknown: Vec<&str> = wanted.into_iter().collect();
        unknown.sort_unstable();
        Err(GridboardError::UnknownElements {
            detail: unknown.join(", "),
        })
    }
}

pub(super) fn change_date_filter_selection(
    ctx: &HandlerContext,
    filter: &Option<DateFilter>,
) -> Result<EventPayload> {
    ctx.write(|state| {
        state.filter_context.date_filter = filter.clone();
        Ok(EventPayload::DateFilterSelectionChanged {
            cleared: filter.is_none(),
        })
    })
}
