//! Virtual mouse

use page_dom::{Document, MouseEvent, MouseEventKind};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mouse bound to one page, tracking its pointer position
pub struct Mouse {
    document: Arc<Document>,
    position: Mutex<(f64, f64)>,
}

impl Mouse {
    pub(crate) fn new(document: Arc<Document>) -> Self {
        Self {
            document,
            position: Mutex::new((0.0, 0.0)),
        }
    }

    /// Current pointer position
    pub fn position(&self) -> (f64, f64) {
        *self.position.lock()
    }

    /// Move the pointer to `(x, y)`
    pub fn move_to(&self, x: f64, y: f64) -> MouseEvent {
        *self.position.lock() = (x, y);
        self.document
            .dispatch_mouse_event(MouseEventKind::MouseMoved, x, y)
    }

    /// Press the button at the current position
    pub fn down(&self) -> MouseEvent {
        let (x, y) = self.position();
        self.document
            .dispatch_mouse_event(MouseEventKind::MousePressed, x, y)
    }

    /// Release the button at the current position
    pub fn up(&self) -> MouseEvent {
        let (x, y) = self.position();
        self.document
            .dispatch_mouse_event(MouseEventKind::MouseReleased, x, y)
    }

    /// Move, press, release and click at `(x, y)`
    pub fn click(&self, x: f64, y: f64) -> Vec<MouseEvent> {
        let mut events = vec![self.move_to(x, y), self.down(), self.up()];
        // The click goes to the target the press and release agree on
        let (pressed, released) = (events[1].target, events[2].target);
        if pressed == released {
            events.push(
                self.document
                    .dispatch_mouse_event(MouseEventKind::Click, x, y),
            );
        }
        events
    }
}
