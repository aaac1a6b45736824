//! The page image: measurement of its layout box and the click routing that
//! turns clicks into table outlines or deselection.

use super::event::{PointerEvent, PointerKind};
use crate::domain::Rect;
use crate::render::geometry::MeasuredElement;
use crate::session::state::{AnnotationStore, OutlineStep};

/// Layout information of the rendered page image element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PageImageElement {
    /// Unrotated layout box on screen; `None` until laid out
    pub layout: Option<Rect>,
}

impl MeasuredElement for PageImageElement {
    fn bounding_rect(&self) -> Option<Rect> {
        self.layout
    }
}

/// What a pointer event on the page image did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageAction {
    None,
    Outline(OutlineStep),
    Deselected,
    RowAdded(Option<usize>),
    ColumnAdded(Option<usize>),
}

/// Routes pointer events on the page image into the annotation store.
///
/// A plain click outlines while nothing is selected and deselects
/// otherwise. With a table selected, Shift+click adds a row boundary and
/// Ctrl+click a column boundary.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableOutlineController;

impl TableOutlineController {
    pub fn on_pointer(&self, store: &mut AnnotationStore, event: &mut PointerEvent) -> PageAction {
        if event.is_propagation_stopped() {
            return PageAction::None;
        }
        match event.kind {
            // Native image drag and text selection would fight the outline gesture
            PointerKind::Down | PointerKind::DragStart => {
                event.prevent_default();
                PageAction::None
            }
            PointerKind::Click => {
                event.prevent_default();
                self.on_click(store, event)
            }
            PointerKind::Move | PointerKind::Up => PageAction::None,
        }
    }

    fn on_click(&self, store: &mut AnnotationStore, event: &PointerEvent) -> PageAction {
        if store.selected_table().is_none() {
            return PageAction::Outline(store.outline_table(event.position));
        }
        if event.modifiers.shift() {
            PageAction::RowAdded(store.add_row(event.position))
        } else if event.modifiers.control() {
            PageAction::ColumnAdded(store.add_column(event.position))
        } else {
            store.select_table(None);
            PageAction::Deselected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageImage, Point, Selection};
    use crate::render::geometry::page_offset;
    use crate::widget::event::Modifiers;

    fn store() -> AnnotationStore {
        let mut store = AnnotationStore::new(PageImage::new("p1.jpg", "p1.jpg", 800, 600));
        let element = PageImageElement {
            layout: Some(Rect::new(100.0, 50.0, 900.0, 650.0)),
        };
        store.set_document_position(page_offset(&element).unwrap());
        store
    }

    fn click(controller: &TableOutlineController, store: &mut AnnotationStore, x: f32, y: f32) -> PageAction {
        let mut event = PointerEvent::click(Point::new(x, y));
        let action = controller.on_pointer(store, &mut event);
        assert!(event.is_default_prevented());
        action
    }

    #[test]
    fn test_click_without_selection_outlines() {
        let controller = TableOutlineController;
        let mut store = store();
        assert_eq!(
            click(&controller, &mut store, 150.0, 120.0),
            PageAction::Outline(OutlineStep::Started {
                anchor: Point::new(50.0, 70.0)
            })
        );
        let action = click(&controller, &mut store, 400.0, 300.0);
        assert!(matches!(action, PageAction::Outline(OutlineStep::Completed(_))));
        assert!(matches!(store.selection(), Selection::TableSelected(_)));
    }

    #[test]
    fn test_background_click_deselects() {
        let controller = TableOutlineController;
        let mut store = store();
        click(&controller, &mut store, 150.0, 120.0);
        click(&controller, &mut store, 400.0, 300.0);
        let tables = store.tables().len();
        assert_eq!(click(&controller, &mut store, 600.0, 500.0), PageAction::Deselected);
        assert_eq!(store.selection(), Selection::NoSelection);
        assert_eq!(store.tables().len(), tables);
    }

    #[test]
    fn test_shift_click_adds_row() {
        let controller = TableOutlineController;
        let mut store = store();
        click(&controller, &mut store, 150.0, 120.0);
        click(&controller, &mut store, 400.0, 300.0);
        let mut event = PointerEvent::click(Point::new(200.0, 200.0)).with_modifiers(Modifiers {
            shift: true,
            control: false,
        });
        assert_eq!(controller.on_pointer(&mut store, &mut event), PageAction::RowAdded(Some(0)));
        assert!(store.selected_table().is_some());
    }

    #[test]
    fn test_native_drag_is_suppressed() {
        let controller = TableOutlineController;
        let mut store = store();
        let mut event = PointerEvent::new(PointerKind::DragStart, Point::new(150.0, 120.0));
        assert_eq!(controller.on_pointer(&mut store, &mut event), PageAction::None);
        assert!(event.is_default_prevented());
        assert!(store.tables().is_empty());
    }

    #[test]
    fn test_stopped_event_is_ignored() {
        let controller = TableOutlineController;
        let mut store = store();
        let mut event = PointerEvent::click(Point::new(150.0, 120.0));
        event.stop_propagation();
        assert_eq!(controller.on_pointer(&mut store, &mut event), PageAction::None);
        assert!(!store.interaction().is_outlining());
    }
}
