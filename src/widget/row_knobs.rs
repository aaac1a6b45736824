//! Row knobs: one handle per row boundary of the selected table, placed just
//! left of the outline in the table's own frame. Clicking a knob toggles the
//! row selection, dragging it moves the boundary.

use super::event::{PointerEvent, PointerKind};
use crate::domain::{Point, Rect};
use crate::render::geometry::{frame_to_document, knob};
use crate::session::state::AnnotationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Clicking selects the row
    Pointer,
    /// Row is selected; the knob can be dragged or clicked to deselect
    Grab,
}

/// A knob as laid out on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knob {
    /// Row boundary index in the selected table
    pub index: usize,
    pub center: Point,
    pub bounds: Rect,
    pub selected: bool,
}

impl Knob {
    pub fn cursor(&self) -> Cursor {
        if self.selected {
            Cursor::Grab
        } else {
            Cursor::Pointer
        }
    }

    pub fn hint(&self) -> &'static str {
        if self.selected {
            "Drag to move the row, click to deselect"
        } else {
            "Click to select the row"
        }
    }
}

/// Lay out the knobs of the selected table.
///
/// Pure function of the store: an unmeasured page or no selected table
/// yields no knobs.
pub fn layout(store: &AnnotationStore) -> Vec<Knob> {
    let Some(transform) = store.view_transform() else {
        return Vec::new();
    };
    let Some(table) = store.selected_table_outline() else {
        return Vec::new();
    };
    let pivot = store.page().center();
    let selected_row = store.selected_row();

    table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, &y)| {
            let frame = Point::new(table.outline.left - knob::OFFSET, y);
            let center = transform.to_screen(frame_to_document(frame, table.rotation, pivot));
            Knob {
                index,
                center,
                bounds: Rect::centered(center, knob::SIZE),
                selected: selected_row == Some(index),
            }
        })
        .collect()
}

/// Topmost knob under `position`
pub fn hit_test(knobs: &[Knob], position: Point) -> Option<&Knob> {
    knobs.iter().rev().find(|knob| knob.bounds.contains_point(position))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct KnobDrag {
    index: usize,
    moved: bool,
}

/// What a pointer event on the knobs did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnobAction {
    None,
    /// Row selection toggled; `true` when the row is now selected
    Toggled(bool),
    /// Dragged row now lives at this index
    Moved(usize),
    DragEnded { moved: bool },
}

/// Pointer handling for the knob layer, which sits above the page image.
///
/// Events the knobs consume stop propagating so the page never treats a
/// knob click as a background click.
#[derive(Debug, Default, Clone)]
pub struct RowKnobController {
    drag: Option<KnobDrag>,
    /// Release point of the last drag that moved a row; the click that
    /// follows it there is not a knob or page click
    swallow_click_at: Option<Point>,
}

impl RowKnobController {
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Forget any drag in progress, e.g. when the page unmounts
    pub fn reset(&mut self) {
        self.drag = None;
        self.swallow_click_at = None;
    }

    pub fn on_pointer(&mut self, store: &mut AnnotationStore, event: &mut PointerEvent) -> KnobAction {
        match event.kind {
            PointerKind::Down => {
                // A new press starts a new gesture
                self.swallow_click_at = None;
                let knobs = layout(store);
                let Some(hit) = hit_test(&knobs, event.position) else {
                    return KnobAction::None;
                };
                self.drag = Some(KnobDrag {
                    index: hit.index,
                    moved: false,
                });
                event.prevent_default();
                event.stop_propagation();
                KnobAction::None
            }
            PointerKind::Move => {
                let Some(drag) = self.drag.as_mut() else {
                    return KnobAction::None;
                };
                event.stop_propagation();
                match store.move_row(drag.index, event.position) {
                    Some(index) => {
                        drag.index = index;
                        drag.moved = true;
                        KnobAction::Moved(index)
                    }
                    None => KnobAction::None,
                }
            }
            PointerKind::Up => {
                let Some(drag) = self.drag.take() else {
                    return KnobAction::None;
                };
                event.stop_propagation();
                self.swallow_click_at = drag.moved.then_some(event.position);
                KnobAction::DragEnded { moved: drag.moved }
            }
            PointerKind::Click => {
                if self.swallow_click_at.take() == Some(event.position) {
                    event.stop_propagation();
                    return KnobAction::None;
                }
                let knobs = layout(store);
                let Some(hit) = hit_test(&knobs, event.position) else {
                    return KnobAction::None;
                };
                event.stop_propagation();
                let index = hit.index;
                store.select_row(index);
                KnobAction::Toggled(store.selected_row() == Some(index))
            }
            PointerKind::DragStart => {
                if self.drag.is_some() {
                    event.prevent_default();
                    event.stop_propagation();
                }
                KnobAction::None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PageImage, Selection};

    /// Page at (100, 50), table (50,70)-(300,250) with rows at 120 and 180
    fn store() -> AnnotationStore {
        let mut store = AnnotationStore::new(PageImage::new("p1.jpg", "p1.jpg", 800, 600));
        store.set_document_position(Point::new(100.0, 50.0));
        store.outline_table(Point::new(150.0, 120.0));
        store.outline_table(Point::new(400.0, 300.0));
        store.insert_row_at(120.0);
        store.insert_row_at(180.0);
        store
    }

    fn knob_center(store: &AnnotationStore, index: usize) -> Point {
        layout(store)[index].center
    }

    #[test]
    fn test_layout_left_of_outline() {
        let store = store();
        let knobs = layout(&store);
        assert_eq!(knobs.len(), 2);
        assert_eq!(knobs[0].center, Point::new(100.0 + 50.0 - knob::OFFSET, 50.0 + 120.0));
        assert_eq!(knobs[1].center.y, 50.0 + 180.0);
        assert!(knobs.iter().all(|knob| !knob.selected));
        assert_eq!(knobs[0].cursor(), Cursor::Pointer);
    }

    #[test]
    fn test_selected_knob_affordance() {
        let mut store = store();
        store.select_row(1);
        let knobs = layout(&store);
        assert_eq!(knobs[0].hint(), "Click to select the row");
        assert_eq!(knobs[1].cursor(), Cursor::Grab);
        assert_eq!(knobs[1].hint(), "Drag to move the row, click to deselect");
    }

    #[test]
    fn test_layout_is_pure() {
        let store = store();
        assert_eq!(layout(&store), layout(&store));
    }

    #[test]
    fn test_layout_empty_without_selection() {
        let mut store = store();
        store.select_table(None);
        assert!(layout(&store).is_empty());

        let unmeasured = AnnotationStore::new(PageImage::new("p2.jpg", "p2.jpg", 10, 10));
        assert!(layout(&unmeasured).is_empty());
    }

    #[test]
    fn test_layout_follows_page_rotation() {
        let mut store = store();
        store.rotate(180.0);
        let knobs = layout(&store);
        // Half turn about the page center (400, 300)
        let doc = Point::new(50.0 - knob::OFFSET, 120.0);
        assert!((knobs[0].center.x - (100.0 + 800.0 - doc.x)).abs() < 1e-3);
        assert!((knobs[0].center.y - (50.0 + 600.0 - doc.y)).abs() < 1e-3);
    }

    #[test]
    fn test_click_toggles_row() {
        let mut store = store();
        let mut controller = RowKnobController::default();
        let at = knob_center(&store, 1);

        let mut event = PointerEvent::click(at);
        assert_eq!(controller.on_pointer(&mut store, &mut event), KnobAction::Toggled(true));
        assert!(event.is_propagation_stopped());
        assert!(matches!(store.selection(), Selection::RowSelected(_, 1)));
        assert!(layout(&store)[1].selected);

        let mut event = PointerEvent::click(at);
        assert_eq!(controller.on_pointer(&mut store, &mut event), KnobAction::Toggled(false));
        assert!(matches!(store.selection(), Selection::TableSelected(_)));
    }

    #[test]
    fn test_click_off_knob_passes_through() {
        let mut store = store();
        let mut controller = RowKnobController::default();
        let mut event = PointerEvent::click(Point::new(600.0, 500.0));
        assert_eq!(controller.on_pointer(&mut store, &mut event), KnobAction::None);
        assert!(!event.is_propagation_stopped());
    }

    #[test]
    fn test_drag_moves_row_and_swallows_click() {
        let mut store = store();
        let mut controller = RowKnobController::default();
        let at = knob_center(&store, 0);

        let mut down = PointerEvent::new(PointerKind::Down, at);
        controller.on_pointer(&mut store, &mut down);
        assert!(controller.is_dragging());
        assert!(down.is_default_prevented());

        // Past the other boundary: the row is re-sorted to index 1
        let mut drag = PointerEvent::new(PointerKind::Move, Point::new(at.x, 50.0 + 200.0));
        assert_eq!(controller.on_pointer(&mut store, &mut drag), KnobAction::Moved(1));
        assert_eq!(store.selected_table_outline().unwrap().rows(), &[180.0, 200.0]);
        assert!(matches!(store.selection(), Selection::RowSelected(_, 1)));

        let mut up = PointerEvent::new(PointerKind::Up, Point::new(at.x, 250.0));
        assert_eq!(
            controller.on_pointer(&mut store, &mut up),
            KnobAction::DragEnded { moved: true }
        );

        let mut click = PointerEvent::click(Point::new(at.x, 250.0));
        assert_eq!(controller.on_pointer(&mut store, &mut click), KnobAction::None);
        assert!(click.is_propagation_stopped());
        assert!(matches!(store.selection(), Selection::RowSelected(_, 1)));
    }

    #[test]
    fn test_drag_without_click_does_not_swallow_next_press() {
        let mut store = store();
        let mut controller = RowKnobController::default();
        let at = knob_center(&store, 0);
        let release = Point::new(at.x, 50.0 + 150.0);
        for mut event in [
            PointerEvent::new(PointerKind::Down, at),
            PointerEvent::new(PointerKind::Move, release),
            PointerEvent::new(PointerKind::Up, release),
        ] {
            controller.on_pointer(&mut store, &mut event);
        }

        // No click followed the drag; a later press and click elsewhere
        // reaches the page
        let background = Point::new(600.0, 500.0);
        controller.on_pointer(&mut store, &mut PointerEvent::new(PointerKind::Down, background));
        let mut click = PointerEvent::click(background);
        assert_eq!(controller.on_pointer(&mut store, &mut click), KnobAction::None);
        assert!(!click.is_propagation_stopped());
    }

    #[test]
    fn test_bare_click_after_drag_is_not_swallowed() {
        let mut store = store();
        let mut controller = RowKnobController::default();
        let at = knob_center(&store, 0);
        let release = Point::new(at.x, 50.0 + 150.0);
        for mut event in [
            PointerEvent::new(PointerKind::Down, at),
            PointerEvent::new(PointerKind::Move, release),
            PointerEvent::new(PointerKind::Up, release),
        ] {
            controller.on_pointer(&mut store, &mut event);
        }

        let mut click = PointerEvent::click(Point::new(600.0, 500.0));
        controller.on_pointer(&mut store, &mut click);
        assert!(!click.is_propagation_stopped());
    }

    #[test]
    fn test_press_without_move_still_clicks() {
        let mut store = store();
        let mut controller = RowKnobController::default();
        let at = knob_center(&store, 0);
        for kind in [PointerKind::Down, PointerKind::Up] {
            controller.on_pointer(&mut store, &mut PointerEvent::new(kind, at));
        }
        let mut click = PointerEvent::click(at);
        assert_eq!(controller.on_pointer(&mut store, &mut click), KnobAction::Toggled(true));
    }
}
