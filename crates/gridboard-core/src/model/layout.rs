//! Layout model: sections, items and widgets
//!
//! A layout is an ordered list of sections; each section holds an ordered
//! list of items; each item hosts exactly one widget. All index-based
//! helpers here are bounds-checked and return typed errors so that command
//! handlers never mutate on invalid input.

use gridboard_core_types::{ObjRef, WidgetId};
use serde::{Deserialize, Serialize};

use crate::errors::{GridboardError, Result};
use crate::model::execution::ExecutionDefinition;

/// Section header with optional title and description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SectionHeader {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }
}

/// Kind of widget hosted by a layout item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetKind {
    /// Visualization backed by an execution definition
    Insight { definition: ExecutionDefinition },
    /// Single-measure KPI
    Kpi { measure: ObjRef },
    /// Free-form rich text, no backend interaction
    RichText { content: String },
}

/// A widget placed on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: WidgetId,
    pub title: String,
    pub kind: WidgetKind,
}

/// One layout item hosting a widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub widget: Widget,
}

impl Item {
    pub fn new(widget: Widget) -> Self {
        Self { widget }
    }
}

/// One layout section: a header plus an ordered list of items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub header: SectionHeader,
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(header: SectionHeader) -> Self {
        Self {
            header,
            items: Vec::new(),
        }
    }
}

/// The dashboard layout of one tab
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub sections: Vec<Section>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sections
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Get a section by index
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` if `index >= section_count()`.
    pub fn section(&self, index: usize) -> Result<&Section> {
        self.sections
            .get(index)
            .ok_or(GridboardError::SectionIndexOutOfBounds {
                index,
                count: self.sections.len(),
            })
    }

    /// Get a mutable section by index
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` if `index >= section_count()`.
    pub fn section_mut(&mut self, index: usize) -> Result<&mut Section> {
        let count = self.sections.len();
        self.sections
            .get_mut(index)
            .ok_or(GridboardError::SectionIndexOutOfBounds { index, count })
    }

    /// Insert a section at `index`; `None` appends at the end
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` if `index > section_count()`.
    pub fn insert_section(&mut self, index: Option<usize>, section: Section) -> Result<usize> {
        let at = index.unwrap_or(self.sections.len());
        if at > self.sections.len() {
            return Err(GridboardError::SectionIndexOutOfBounds {
                index: at,
                count: self.sections.len(),
            });
        }
        self.sections.insert(at, section);
        Ok(at)
    }

    /// Remove the section at `index` and return it
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` if `index >= section_count()`.
    pub fn remove_section(&mut self, index: usize) -> Result<Section> {
        self.section(index)?;
        Ok(self.sections.remove(index))
    }

    /// Move the section at `from` to position `to`
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` if either index is out of range.
    pub fn move_section(&mut self, from: usize, to: usize) -> Result<()> {
        self.section(from)?;
        if to >= self.sections.len() {
            return Err(GridboardError::SectionIndexOutOfBounds {
                index: to,
                count: self.sections.len(),
            });
        }
        let section = self.sections.remove(from);
        self.sections.insert(to, section);
        Ok(())
    }

    /// Insert items into the section at `section_index` starting at
    /// `item_index`; `None` appends
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` or `ItemIndexOutOfBounds`.
    pub fn insert_items(
        &mut self,
        section_index: usize,
        item_index: Option<usize>,
        items: Vec<Item>,
    ) -> Result<usize> {
        let section = self.section_mut(section_index)?;
        let at = item_index.unwrap_or(section.items.len());
        if at > section.items.len() {
            return Err(GridboardError::ItemIndexOutOfBounds {
                section: section_index,
                index: at,
                count: section.items.len(),
            });
        }
        section.items.splice(at..at, items);
        Ok(at)
    }

    /// Remove the item at the given coordinates and return it
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` or `ItemIndexOutOfBounds`.
    pub fn remove_item(&mut self, section_index: usize, item_index: usize) -> Result<Item> {
        let section = self.section_mut(section_index)?;
        if item_index >= section.items.len() {
            return Err(GridboardError::ItemIndexOutOfBounds {
                section: section_index,
                index: item_index,
                count: section.items.len(),
            });
        }
        Ok(section.items.remove(item_index))
    }

    /// Move an item between coordinates (possibly across sections)
    ///
    /// # Errors
    ///
    /// Returns `SectionIndexOutOfBounds` or `ItemIndexOutOfBounds`.
    pub fn move_item(
        &mut self,
        from_section: usize,
        from_item: usize,
        to_section: usize,
        to_item: Option<usize>,
    ) -> Result<()> {
        // Validate target section before removing anything
        self.section(to_section)?;
        let item = self.remove_item(from_section, from_item)?;
        match self.insert_items(to_section, to_item, vec![item]) {
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Find a widget by id, returning `(section_index, item_index)`
    pub fn find_widget(&self, widget_id: &WidgetId) -> Option<(usize, usize)> {
        for (si, section) in self.sections.iter().enumerate() {
            for (ii, item) in section.items.iter().enumerate() {
                if &item.widget.id == widget_id {
                    return Some((si, ii));
                }
            }
        }
        None
    }

    /// Get a widget by id
    ///
    /// # Errors
    ///
    /// Returns `WidgetNotFound` if no item hosts the widget.
    pub fn widget(&self, widget_id: &WidgetId) -> Result<&Widget> {
        let (si, ii) = self
            .find_widget(widget_id)
            .ok_or_else(|| GridboardError::WidgetNotFound {
                widget_id: widget_id.clone(),
            })?;
        Ok(&self.sections[si].items[ii].widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(id: &str) -> Widget {
        Widget {
            id: WidgetId::from(id),
            title: format!("widget {id}"),
            kind: WidgetKind::RichText {
                content: String::new(),
            },
        }
    }

    fn layout_with_sections(n: usize) -> Layout {
        let mut layout = Layout::new();
        for i in 0..n {
            layout
                .insert_section(None, Section::new(SectionHeader::titled(format!("s{i}"))))
                .unwrap();
        }
        layout
    }

    #[test]
    fn test_insert_section_appends_on_none() {
        let mut layout = layout_with_sections(2);
        let at = layout
            .insert_section(None, Section::new(SectionHeader::titled("tail")))
            .unwrap();
        assert_eq!(at, 2);
        assert_eq!(layout.section_count(), 3);
    }

    #[test]
    fn test_insert_section_rejects_gap() {
        let mut layout = layout_with_sections(1);
        let result = layout.insert_section(Some(5), Section::default());
        assert!(matches!(
            result,
            Err(GridboardError::SectionIndexOutOfBounds { index: 5, count: 1 })
        ));
    }

    #[test]
    fn test_move_section_reorders() {
        let mut layout = layout_with_sections(3);
        layout.move_section(0, 2).unwrap();
        assert_eq!(layout.sections[2].header.title.as_deref(), Some("s0"));
    }

    #[test]
    fn test_move_item_across_sections() {
        let mut layout = layout_with_sections(2);
        layout
            .insert_items(0, None, vec![Item::new(widget("w1"))])
            .unwrap();

        layout.move_item(0, 0, 1, None).unwrap();
        assert!(layout.sections[0].items.is_empty());
        assert_eq!(layout.sections[1].items.len(), 1);
        assert_eq!(layout.find_widget(&WidgetId::from("w1")), Some((1, 0)));
    }

    #[test]
    fn test_remove_item_out_of_bounds() {
        let mut layout = layout_with_sections(1);
        let result = layout.remove_item(0, 0);
        assert!(matches!(
            result,
            Err(GridboardError::ItemIndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_widget_lookup() {
        let mut layout = layout_with_sections(1);
        layout
            .insert_items(0, None, vec![Item::new(widget("w1"))])
            .unwrap();

        assert!(layout.widget(&WidgetId::from("w1")).is_ok());
        assert!(matches!(
            layout.widget(&WidgetId::from("nope")),
            Err(GridboardError::WidgetNotFound { .. })
        ));
    }
}
